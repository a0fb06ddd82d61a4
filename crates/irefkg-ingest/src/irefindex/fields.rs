// MITAB 2.6 column extractors
//
// Each extractor takes one raw column value and returns the piece of it the
// pipeline keeps. They are pure functions so the quirks of each column can be
// tested in isolation.

/// 0-based column positions in an IRefIndex MITAB 2.6 row
pub mod column {
    /// `method`: interaction detection method, e.g. `psi-mi:"MI:0018"(two hybrid)`
    pub const METHOD: usize = 6;
    /// `pmids`: publication references, e.g. `pubmed:10688190|pubmed:11283351`
    pub const PUBLICATIONS: usize = 8;
    /// `taxa`: organism of interactor A, e.g. `taxid:9606(Homo sapiens)`
    pub const TAXON_A: usize = 9;
    /// `taxb`: organism of interactor B
    pub const TAXON_B: usize = 10;
    /// `interactionIdentifier`: `rigid:...|edgetype:X|irigid:...`
    pub const INTERACTION_IDS: usize = 13;
    /// `finalReferenceA`, e.g. `uniprotkb:P12345`
    pub const FINAL_REFERENCE_A: usize = 38;
    /// `finalReferenceB`
    pub const FINAL_REFERENCE_B: usize = 39;
}

/// Smallest column count a row needs for every extracted column to exist
pub const MIN_COLUMNS: usize = column::FINAL_REFERENCE_B + 1;

/// Reference prefixes that never resolve to a single protein node
pub const EXCLUDED_PREFIXES: &[&str] = &["complex:", "pdb:", "flybase:"];

/// Excluded prefix of a final reference that names a complex, a structure or
/// a FlyBase record instead of a single protein
pub fn excluded_prefix(reference: &str) -> Option<&'static str> {
    EXCLUDED_PREFIXES
        .iter()
        .copied()
        .find(|prefix| reference.starts_with(prefix))
}

/// Identifier part of a `prefix:identifier` reference (text after the first
/// colon). `None` when there is no colon or nothing follows it.
///
/// `uniprotkb:P12345` -> `P12345`, `refseq:NP_000001.1` -> `NP_000001.1`
pub fn extract_identifier(reference: &str) -> Option<&str> {
    reference
        .split_once(':')
        .map(|(_, id)| id.trim())
        .filter(|id| !id.is_empty())
}

/// Last publication ID of a `|`-separated, `db:id` reference list
///
/// `pubmed:1234|pubmed:5678` -> `5678`. Only one PMID is kept per row; rows
/// that repeat a pair contribute the others during aggregation.
pub fn extract_pmid(field: &str) -> Option<&str> {
    field
        .rsplit('|')
        .next()
        .and_then(|last| last.rsplit(':').next())
        .map(str::trim)
        .filter(|pmid| !pmid.is_empty() && *pmid != "-")
}

/// Text inside the first pair of parentheses
///
/// `psi-mi:"MI:0018"(two hybrid)` -> `two hybrid`
pub fn extract_method(field: &str) -> Option<&str> {
    let open = field.find('(')?;
    let rest = &field[open + 1..];
    let close = rest.find(')')?;
    let method = &rest[..close];
    (!method.is_empty()).then_some(method)
}

/// Digits following the first `taxid:` that is followed by digits
///
/// `taxid:9606(Homo sapiens)` -> `9606`, `taxid:-1` -> `None`
pub fn extract_taxon(field: &str) -> Option<&str> {
    value_after(field, "taxid:", |rest| {
        rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())
    })
}

/// IRefIndex RIGID: text following `rigid:` up to the next `|`
///
/// `rigid:3h9gSyCnmLWd2E+5EsntSB4qRUQ|edgetype:X` -> `3h9gSyCnmLWd2E+5EsntSB4qRUQ`
pub fn extract_rigid(field: &str) -> Option<&str> {
    value_after(field, "rigid:", |rest| rest.find('|').unwrap_or(rest.len()))
}

/// First non-empty value following `marker`, where `value_len` measures how
/// much of the remaining text belongs to the value. Later occurrences of the
/// marker are tried when an earlier one carries no value.
fn value_after<'a>(field: &'a str, marker: &str, value_len: impl Fn(&str) -> usize) -> Option<&'a str> {
    field.match_indices(marker).find_map(|(start, _)| {
        let rest = &field[start + marker.len()..];
        let value = &rest[..value_len(rest)];
        (!value.is_empty()).then_some(value)
    })
}
