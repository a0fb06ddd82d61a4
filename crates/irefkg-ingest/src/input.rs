//! MITAB input opening
//!
//! IRefIndex publishes releases as `{taxon}.mitab.{date}.txt.zip`; mirrors and
//! local caches often hold gzip or plain text copies. The format is picked from
//! the file extension.
//!
//! # Supported Formats
//!
//! - **Plain** text: streamed through a buffered reader
//! - **Gzip** (.gz): streamed through flate2
//! - **Zip** (.zip): the first `.txt` entry (else the first file entry) is
//!   extracted into memory

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use tracing::{debug, info};

/// Compression of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Plain,
    Gzip,
    Zip,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("gz") => InputFormat::Gzip,
            Some("zip") => InputFormat::Zip,
            _ => InputFormat::Plain,
        }
    }
}

/// Open a MITAB file as a line reader, decompressing when needed
///
/// The returned reader owns the file handle; dropping it closes the file.
pub fn open_mitab(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path);
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    info!(path = %path.display(), format = ?format, "Opening MITAB input");

    let reader: Box<dyn BufRead> = match format {
        InputFormat::Plain => Box::new(BufReader::new(file)),
        InputFormat::Gzip => Box::new(BufReader::new(GzDecoder::new(file))),
        InputFormat::Zip => {
            let (name, contents) = read_zip_entry(file)
                .with_context(|| format!("Failed to read zip archive {}", path.display()))?;
            debug!(entry = %name, bytes = contents.len(), "Extracted MITAB entry from zip");
            Box::new(Cursor::new(contents))
        },
    };

    Ok(reader)
}

/// Pick the MITAB entry of a zip archive and read it
fn read_zip_entry<R: Read + std::io::Seek>(source: R) -> Result<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(source).context("Failed to read zip archive")?;

    let mut fallback = None;
    let mut chosen = None;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read zip entry at index {}", i))?;
        if entry.is_dir() {
            continue;
        }
        if entry.name().to_ascii_lowercase().ends_with(".txt") {
            chosen = Some(i);
            break;
        }
        fallback.get_or_insert(i);
    }

    let Some(index) = chosen.or(fallback) else {
        bail!("Zip archive contains no files");
    };

    let mut entry = archive
        .by_index(index)
        .with_context(|| format!("Failed to read zip entry at index {}", index))?;
    let name = entry.name().to_string();
    let mut contents = Vec::new();
    entry
        .read_to_end(&mut contents)
        .with_context(|| format!("Failed to read zip entry: {}", name))?;

    Ok((name, contents))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn read_all(mut reader: Box<dyn BufRead>) -> String {
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_input_format_from_path() {
        assert_eq!(InputFormat::from_path(Path::new("9606.mitab.txt")), InputFormat::Plain);
        assert_eq!(InputFormat::from_path(Path::new("9606.mitab.txt.gz")), InputFormat::Gzip);
        assert_eq!(InputFormat::from_path(Path::new("9606.mitab.08-28-2023.txt.ZIP")), InputFormat::Zip);
        assert_eq!(InputFormat::from_path(Path::new("mitab")), InputFormat::Plain);
    }

    #[test]
    fn test_open_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        assert_eq!(read_all(open_mitab(&path).unwrap()), "line one\nline two\n");
    }

    #[test]
    fn test_open_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"gz line\n").unwrap();
        encoder.finish().unwrap();

        assert_eq!(read_all(open_mitab(&path).unwrap()), "gz line\n");
    }

    #[test]
    fn test_open_zip_prefers_txt_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        writer.start_file("README", options).unwrap();
        writer.write_all(b"not mitab").unwrap();
        writer.start_file("9606.mitab.txt", options).unwrap();
        writer.write_all(b"zip line\n").unwrap();
        writer.finish().unwrap();

        assert_eq!(read_all(open_mitab(&path).unwrap()), "zip line\n");
    }

    #[test]
    fn test_open_zip_falls_back_to_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        writer.start_file("9606.mitab", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"only entry\n").unwrap();
        writer.finish().unwrap();

        assert_eq!(read_all(open_mitab(&path).unwrap()), "only entry\n");
    }

    #[test]
    fn test_open_empty_zip_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        zip::ZipWriter::new(File::create(&path).unwrap()).finish().unwrap();

        assert!(open_mitab(&path).is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_mitab("/nonexistent/9606.mitab.txt").err().unwrap();
        assert!(err.to_string().contains("Failed to open"));
    }
}
