// IRefIndex MITAB 2.6 Parser

use super::config::IRefIndexConfig;
use super::fields::{self, column, MIN_COLUMNS};
use super::models::InteractionRecord;
use super::{IRefIndexError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{debug, info, warn};

/// Lines between progress messages on large files
const PROGRESS_INTERVAL: usize = 1_000_000;

// ============================================================================
// Line Outcome
// ============================================================================

/// Why a line produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Header,
    /// A final reference carries one of the excluded prefixes
    Excluded { prefix: &'static str },
    TaxonFiltered,
    /// A final reference had nothing after its colon
    Unresolvable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Record(InteractionRecord),
    Skipped(SkipReason),
}

/// Per-file parse counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub header_lines: usize,
    /// Excluded rows keyed by the matching reference prefix
    pub excluded: BTreeMap<String, usize>,
    pub taxon_filtered: usize,
    pub unresolvable: usize,
    pub records: usize,
    /// Whether the requested taxon occurred in any data row, before filters
    pub taxon_seen: bool,
    /// Parsing stopped at the configured limit with records left unread
    pub limit_reached: bool,
}

impl ParseStats {
    pub fn excluded_total(&self) -> usize {
        self.excluded.values().sum()
    }

    /// Lines that were neither blank nor a `#` header
    pub fn data_rows(&self) -> usize {
        self.lines_read - self.blank_lines - self.header_lines
    }

    fn count(&mut self, parsed: &ParsedLine) {
        match parsed {
            ParsedLine::Record(_) => self.records += 1,
            ParsedLine::Skipped(SkipReason::Blank) => self.blank_lines += 1,
            ParsedLine::Skipped(SkipReason::Header) => self.header_lines += 1,
            ParsedLine::Skipped(SkipReason::Excluded { prefix }) => {
                *self.excluded.entry(prefix.trim_end_matches(':').to_string()).or_default() += 1;
            },
            ParsedLine::Skipped(SkipReason::TaxonFiltered) => self.taxon_filtered += 1,
            ParsedLine::Skipped(SkipReason::Unresolvable) => self.unresolvable += 1,
        }
    }
}

// ============================================================================
// MITAB Parser
// ============================================================================

/// Fixed-column MITAB 2.6 row parser
#[derive(Debug, Clone, Default)]
pub struct MitabParser {
    taxon: Option<String>,
    parse_limit: Option<usize>,
}

impl MitabParser {
    /// Parser keeping rows where both partners belong to `taxon`, or every
    /// row when `taxon` is `None`
    pub fn new(taxon: Option<&str>) -> Self {
        Self {
            taxon: taxon.map(str::to_string),
            parse_limit: None,
        }
    }

    pub fn from_config(config: &IRefIndexConfig) -> Self {
        Self {
            taxon: config.taxon_filter().map(str::to_string),
            parse_limit: config.parse_limit,
        }
    }

    /// Stop after `limit` retained records
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.parse_limit = Some(limit);
        self
    }

    /// Parse one line. `line_num` is 1-based and only used in errors.
    pub fn parse_line(&self, line: &str, line_num: usize) -> Result<ParsedLine> {
        self.classify_line(line, line_num).map(|(parsed, _)| parsed)
    }

    /// Lazily parse every line of `reader`
    pub fn records<R: BufRead>(&self, reader: R) -> MitabRecords<R> {
        info!(
            taxon = self.taxon.as_deref().unwrap_or("*"),
            limit = ?self.parse_limit,
            "Starting MITAB parsing"
        );

        MitabRecords {
            parser: self.clone(),
            reader,
            buf: String::new(),
            line_num: 0,
            stats: ParseStats::default(),
            done: false,
        }
    }

    /// Parse one line and report whether it mentions the requested taxon on
    /// either side, before any filter is applied
    fn classify_line(&self, line: &str, line_num: usize) -> Result<(ParsedLine, bool)> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(skip) = Self::non_data(line) {
            return Ok((ParsedLine::Skipped(skip), false));
        }

        let columns = Self::split(line, line_num)?;
        let mentions = self.mentions_taxon(&columns);
        Ok((self.parse_columns(&columns, line_num)?, mentions))
    }

    fn non_data(line: &str) -> Option<SkipReason> {
        if line.trim().is_empty() {
            Some(SkipReason::Blank)
        } else if line.starts_with('#') {
            Some(SkipReason::Header)
        } else {
            None
        }
    }

    fn split(line: &str, line_num: usize) -> Result<Vec<&str>> {
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < MIN_COLUMNS {
            return Err(IRefIndexError::MalformedRecord {
                line: line_num,
                columns: columns.len(),
                expected: MIN_COLUMNS,
            });
        }
        Ok(columns)
    }

    /// True if the requested taxon appears on either side of the row
    fn mentions_taxon(&self, columns: &[&str]) -> bool {
        match &self.taxon {
            Some(taxon) => [column::TAXON_A, column::TAXON_B]
                .iter()
                .any(|&i| fields::extract_taxon(columns[i]) == Some(taxon.as_str())),
            None => true,
        }
    }

    fn parse_columns(&self, columns: &[&str], line_num: usize) -> Result<ParsedLine> {
        let reference_a = columns[column::FINAL_REFERENCE_A].trim();
        let reference_b = columns[column::FINAL_REFERENCE_B].trim();

        for reference in [reference_a, reference_b] {
            if let Some(prefix) = fields::excluded_prefix(reference) {
                debug!(line = line_num, reference, "Skipping excluded reference");
                return Ok(ParsedLine::Skipped(SkipReason::Excluded { prefix }));
            }
        }

        let taxon_a = fields::extract_taxon(columns[column::TAXON_A]).unwrap_or_default();
        let taxon_b = fields::extract_taxon(columns[column::TAXON_B]).unwrap_or_default();

        if let Some(taxon) = &self.taxon {
            if taxon_a != taxon.as_str() || taxon_b != taxon.as_str() {
                return Ok(ParsedLine::Skipped(SkipReason::TaxonFiltered));
            }
        }

        let partner_a = fields::extract_identifier(reference_a);
        let partner_b = fields::extract_identifier(reference_b);

        let (partner_a, partner_b) = match (partner_a, partner_b) {
            (Some(a), Some(b)) => (a, b),
            (a, _) => {
                let (side, reference) = if a.is_none() {
                    ('A', reference_a)
                } else {
                    ('B', reference_b)
                };
                let err = IRefIndexError::UnresolvableIdentifier {
                    line: line_num,
                    side,
                    reference: reference.to_string(),
                };
                warn!("{}; row skipped", err);
                return Ok(ParsedLine::Skipped(SkipReason::Unresolvable));
            },
        };

        let record = InteractionRecord::new(partner_a, partner_b)
            .with_pmid(fields::extract_pmid(columns[column::PUBLICATIONS]).unwrap_or_default())
            .with_method(fields::extract_method(columns[column::METHOD]).unwrap_or_default())
            .with_taxa(taxon_a, taxon_b)
            .with_relationship_id(
                fields::extract_rigid(columns[column::INTERACTION_IDS]).unwrap_or_default(),
            );

        Ok(ParsedLine::Record(record))
    }
}

// ============================================================================
// Streaming Iterator
// ============================================================================

/// Single-pass iterator over the retained records of a MITAB stream
///
/// Yields `Err` once and then stops on the first IO or malformed-row error.
pub struct MitabRecords<R> {
    parser: MitabParser,
    reader: R,
    buf: String,
    line_num: usize,
    stats: ParseStats,
    done: bool,
}

impl<R> MitabRecords<R> {
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn into_stats(self) -> ParseStats {
        self.stats
    }
}

impl<R: BufRead> MitabRecords<R> {
    fn next_line(&mut self) -> Result<Option<ParsedLine>> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }

        self.line_num += 1;
        self.stats.lines_read += 1;
        if self.line_num % PROGRESS_INTERVAL == 0 {
            info!(
                lines = self.line_num,
                records = self.stats.records,
                "MITAB parsing progress"
            );
        }

        let (parsed, mentions) = self.parser.classify_line(&self.buf, self.line_num)?;
        self.stats.taxon_seen |= mentions;
        Ok(Some(parsed))
    }

    /// True if the unread remainder would have yielded another record
    ///
    /// Lines read here are not counted in the stats. A row that fails to
    /// parse counts as pending.
    fn record_pending(&mut self) -> Result<bool> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(false);
            }
            match self.parser.classify_line(&self.buf, self.line_num + 1) {
                Ok((ParsedLine::Skipped(_), _)) => continue,
                Ok((ParsedLine::Record(_), _)) | Err(_) => return Ok(true),
            }
        }
    }
}

impl<R: BufRead> Iterator for MitabRecords<R> {
    type Item = Result<InteractionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if let Some(limit) = self.parser.parse_limit {
                if self.stats.records >= limit {
                    self.done = true;
                    match self.record_pending() {
                        Ok(true) => {
                            info!("Reached parse limit of {} records", limit);
                            self.stats.limit_reached = true;
                        },
                        Ok(false) => {},
                        Err(e) => return Some(Err(e)),
                    }
                    break;
                }
            }

            match self.next_line() {
                Ok(Some(parsed)) => {
                    self.stats.count(&parsed);
                    if let ParsedLine::Record(record) = parsed {
                        return Some(Ok(record));
                    }
                },
                Ok(None) => {
                    self.done = true;
                    info!(
                        lines = self.stats.lines_read,
                        records = self.stats.records,
                        excluded = self.stats.excluded_total(),
                        taxon_filtered = self.stats.taxon_filtered,
                        unresolvable = self.stats.unresolvable,
                        "Finished MITAB parsing"
                    );
                },
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                },
            }
        }
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Build a 42-column MITAB row with the interesting columns filled in
    fn row(ref_a: &str, ref_b: &str, pmid: &str, method: &str, taxa: &str, taxb: &str, ids: &str) -> String {
        let mut cols = vec!["-".to_string(); 42];
        cols[column::METHOD] = method.to_string();
        cols[column::PUBLICATIONS] = pmid.to_string();
        cols[column::TAXON_A] = taxa.to_string();
        cols[column::TAXON_B] = taxb.to_string();
        cols[column::INTERACTION_IDS] = ids.to_string();
        cols[column::FINAL_REFERENCE_A] = ref_a.to_string();
        cols[column::FINAL_REFERENCE_B] = ref_b.to_string();
        cols.join("\t")
    }

    fn human_row(ref_a: &str, ref_b: &str, pmid: &str) -> String {
        row(
            ref_a,
            ref_b,
            pmid,
            "psi-mi:\"MI:0018\"(two hybrid)",
            "taxid:9606(Homo sapiens)",
            "taxid:9606(Homo sapiens)",
            "rigid:RIG1|edgetype:X|irigid:42",
        )
    }

    #[test]
    fn test_parse_line_extracts_fields() {
        let parser = MitabParser::new(None);
        let line = human_row("uniprotkb:P12345", "uniprotkb:Q67890", "pubmed:1|pubmed:111");

        let parsed = parser.parse_line(&line, 1).unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Record(
                InteractionRecord::new("P12345", "Q67890")
                    .with_pmid("111")
                    .with_method("two hybrid")
                    .with_taxa("9606", "9606")
                    .with_relationship_id("RIG1")
            )
        );
    }

    #[test]
    fn test_parse_line_exactly_min_columns() {
        let parser = MitabParser::new(None);
        let line = human_row("uniprotkb:P12345", "uniprotkb:Q67890", "pubmed:1");
        let truncated: Vec<&str> = line.split('\t').take(MIN_COLUMNS).collect();

        let parsed = parser.parse_line(&truncated.join("\t"), 1).unwrap();
        assert!(matches!(parsed, ParsedLine::Record(_)));
    }

    #[test]
    fn test_parse_line_too_few_columns() {
        let parser = MitabParser::new(None);
        let line = vec!["x"; 39].join("\t");

        let err = parser.parse_line(&line, 7).unwrap_err();
        match err {
            IRefIndexError::MalformedRecord {
                line,
                columns,
                expected,
            } => {
                assert_eq!(line, 7);
                assert_eq!(columns, 39);
                assert_eq!(expected, 40);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_line_skips_blank_and_header() {
        let parser = MitabParser::new(None);
        assert_eq!(parser.parse_line("", 1).unwrap(), ParsedLine::Skipped(SkipReason::Blank));
        assert_eq!(parser.parse_line("\r\n", 1).unwrap(), ParsedLine::Skipped(SkipReason::Blank));
        assert_eq!(
            parser.parse_line("#uidA\tuidB\taltA", 1).unwrap(),
            ParsedLine::Skipped(SkipReason::Header)
        );
    }

    #[test]
    fn test_parse_line_excludes_complexes() {
        let parser = MitabParser::new(None);
        let line = human_row("complex:CPX-9999", "uniprotkb:P12345", "pubmed:1");
        assert_eq!(
            parser.parse_line(&line, 1).unwrap(),
            ParsedLine::Skipped(SkipReason::Excluded { prefix: "complex:" })
        );

        let line = human_row("uniprotkb:P12345", "pdb:1ABC", "pubmed:1");
        assert_eq!(
            parser.parse_line(&line, 1).unwrap(),
            ParsedLine::Skipped(SkipReason::Excluded { prefix: "pdb:" })
        );
    }

    #[test]
    fn test_parse_line_taxon_filter_requires_both_sides() {
        let parser = MitabParser::new(Some("9606"));
        let mixed = row(
            "uniprotkb:P12345",
            "uniprotkb:Q67890",
            "pubmed:1",
            "-",
            "taxid:9606",
            "taxid:10090",
            "-",
        );
        assert_eq!(
            parser.parse_line(&mixed, 1).unwrap(),
            ParsedLine::Skipped(SkipReason::TaxonFiltered)
        );

        let human = human_row("uniprotkb:P12345", "uniprotkb:Q67890", "pubmed:1");
        assert!(matches!(parser.parse_line(&human, 2).unwrap(), ParsedLine::Record(_)));
    }

    #[test]
    fn test_parse_line_unresolvable_identifier() {
        let parser = MitabParser::new(None);
        let line = human_row("uniprotkb:", "uniprotkb:Q67890", "pubmed:1");
        assert_eq!(
            parser.parse_line(&line, 1).unwrap(),
            ParsedLine::Skipped(SkipReason::Unresolvable)
        );

        let line = human_row("uniprotkb:P12345", "noprefix", "pubmed:1");
        assert_eq!(
            parser.parse_line(&line, 1).unwrap(),
            ParsedLine::Skipped(SkipReason::Unresolvable)
        );
    }

    #[test]
    fn test_parse_line_missing_values_are_empty() {
        let parser = MitabParser::new(None);
        let line = row("uniprotkb:P12345", "uniprotkb:Q67890", "-", "-", "-", "-", "-");

        let ParsedLine::Record(record) = parser.parse_line(&line, 1).unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(record.pmid, "");
        assert_eq!(record.method, "");
        assert_eq!(record.taxon_a, "");
        assert_eq!(record.relationship_id, "");
    }

    #[test]
    fn test_records_iterator_and_stats() {
        let input = [
            "#uidA\tuidB".to_string(),
            human_row("uniprotkb:P12345", "uniprotkb:Q67890", "pubmed:111"),
            human_row("complex:CPX-9999", "uniprotkb:P12345", "pubmed:333"),
            String::new(),
            human_row("uniprotkb:P12345", "uniprotkb:Q67890", "pubmed:222"),
        ]
        .join("\n");

        let parser = MitabParser::new(Some("9606"));
        let mut records = parser.records(Cursor::new(input));
        let parsed: Vec<InteractionRecord> = records.by_ref().collect::<Result<_>>().unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].pmid, "111");
        assert_eq!(parsed[1].pmid, "222");

        let stats = records.stats();
        assert_eq!(stats.lines_read, 5);
        assert_eq!(stats.header_lines, 1);
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.excluded.get("complex"), Some(&1));
        assert_eq!(stats.records, 2);
        assert_eq!(stats.data_rows(), 3);
        assert!(stats.taxon_seen);
    }

    #[test]
    fn test_records_taxon_seen_before_filtering() {
        let mixed = row(
            "uniprotkb:P12345",
            "uniprotkb:Q67890",
            "pubmed:1",
            "-",
            "taxid:9606",
            "taxid:10090",
            "-",
        );

        let mut records = MitabParser::new(Some("10090")).records(Cursor::new(mixed.clone()));
        assert!(records.by_ref().next().is_none());
        assert!(records.stats().taxon_seen);
        assert_eq!(records.stats().taxon_filtered, 1);

        let mut records = MitabParser::new(Some("7227")).records(Cursor::new(mixed));
        assert!(records.by_ref().next().is_none());
        assert!(!records.stats().taxon_seen);
    }

    #[test]
    fn test_records_stops_on_malformed_row() {
        let input = format!(
            "{}\nshort\trow\n{}",
            human_row("uniprotkb:P1", "uniprotkb:P2", "pubmed:1"),
            human_row("uniprotkb:P3", "uniprotkb:P4", "pubmed:2"),
        );

        let mut records = MitabParser::new(None).records(Cursor::new(input));
        assert!(records.next().unwrap().is_ok());
        let err = records.next().unwrap().unwrap_err();
        assert!(matches!(err, IRefIndexError::MalformedRecord { line: 2, columns: 2, .. }));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_records_parse_limit() {
        let input = (1..=5)
            .map(|i| human_row("uniprotkb:P12345", "uniprotkb:Q67890", &format!("pubmed:{i}")))
            .collect::<Vec<_>>()
            .join("\n");

        let mut records = MitabParser::new(None).with_limit(2).records(Cursor::new(input));
        let parsed: Vec<_> = records.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(records.stats().limit_reached);
        assert_eq!(records.stats().lines_read, 2);
    }

    #[test]
    fn test_limit_equal_to_record_count_is_not_reached() {
        let input = format!(
            "{}\n\n#trailer\n{}\n",
            human_row("uniprotkb:P12345", "uniprotkb:Q67890", "pubmed:1"),
            human_row("complex:CPX-1", "uniprotkb:Q67890", "pubmed:2"),
        );

        let mut records = MitabParser::new(None).with_limit(1).records(Cursor::new(input));
        assert_eq!(records.by_ref().count(), 1);
        assert!(!records.stats().limit_reached);
    }

    #[test]
    fn test_records_and_parse_line_agree() {
        let lines = [
            "#uidA\tuidB".to_string(),
            human_row("uniprotkb:P12345", "uniprotkb:Q67890", "pubmed:111"),
            human_row("pdb:1ABC", "uniprotkb:P12345", "pubmed:2"),
        ];
        let parser = MitabParser::new(Some("9606"));

        let expected: Vec<InteractionRecord> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| match parser.parse_line(line, i + 1).unwrap() {
                ParsedLine::Record(record) => Some(record),
                ParsedLine::Skipped(_) => None,
            })
            .collect();
        let streamed: Vec<InteractionRecord> = parser
            .records(Cursor::new(lines.join("\n")))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(streamed, expected);
    }
}
