//! Raw File Loader Module
//! Reads the delimited finance export into a DataFrame using Polars,
//! skipping the leading metadata rows and dropping the trailing footnotes.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("cannot read input file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse delimited input: {0}")]
    Csv(#[from] PolarsError),
}

/// Load the raw export.
///
/// The first `skip_rows` lines are export metadata; the line after them is
/// the header. The last `footer_rows` data rows are footnote text and are
/// sliced off after the read. Values stay untyped here; the cleaner parses
/// them.
pub fn load_raw(
    path: &Path,
    skip_rows: usize,
    footer_rows: usize,
) -> Result<DataFrame, LoaderError> {
    // Surface a missing/unreadable file as an I/O error rather than a
    // parse error.
    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Err(LoaderError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a file", path.display()),
        )));
    }

    let df = LazyCsvReader::new(path)
        .with_skip_rows(skip_rows)
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .with_truncate_ragged_lines(true)
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    let height = df.height();
    let kept = height.saturating_sub(footer_rows);
    let df = df.slice(0, kept);

    info!(
        rows = kept,
        skipped = skip_rows,
        footer = footer_rows,
        "loaded {}",
        path.display()
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(contents.as_bytes()).expect("write fixture");
        f
    }

    #[test]
    fn skips_metadata_and_drops_footer() {
        let mut text = String::new();
        for i in 0..5 {
            text.push_str(&format!("export metadata line {i}\n"));
        }
        text.push_str("name,value\n");
        text.push_str("a,1\nb,2\nc,3\n");
        text.push_str("notes,\nsource: somewhere,\n- : missing,\nend of file,\n");

        let f = fixture(&text);
        let df = load_raw(f.path(), 5, 4).expect("load");
        assert_eq!(df.height(), 3);
        assert!(df.column("name").is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_raw(Path::new("/no/such/file.csv"), 5, 4).unwrap_err();
        assert!(matches!(err, LoaderError::Io(_)));
    }
}
