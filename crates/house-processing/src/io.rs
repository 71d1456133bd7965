//! Tabular I/O for raw and cleaned datasets.

use crate::cleaner::DataCleaner;
use crate::config::CleaningConfig;
use crate::error::{ProcessingError, Result, ResultExt};
use crate::types::CleaningSummary;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Cell values read as missing, in addition to empty fields.
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read a CSV file with a header row.
///
/// Empty fields and any of [`NA_TOKENS`] become nulls, so a numeric column
/// with an `NA` cell still parses as numeric.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProcessingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )));
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .map_parse_options(|opts| {
            opts.with_null_values(Some(NullValues::AllColumns(
                NA_TOKENS.iter().map(|t| (*t).into()).collect(),
            )))
        })
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("While opening {}", path.display()))?
        .finish()
        .context(format!("While parsing {}", path.display()))?;

    info!("Loaded {} with shape {:?}", path.display(), df.shape());
    Ok(df)
}

/// Write a frame as CSV, creating missing parent directories.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .context(format!("While creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("While creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}

/// Load a raw CSV, clean it and write the result.
///
/// Returns the summary of the cleaning run.
pub fn process_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CleaningConfig,
) -> Result<CleaningSummary> {
    let raw = load_csv(input)?;
    let cleaned = DataCleaner::new(config.clone()).clean(&raw)?;

    let mut data = cleaned.data;
    write_csv(&mut data, output)?;

    Ok(cleaned.summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("processed").join("out.csv");
        let mut df = df![
            "price" => [1.0, 2.0],
            "location" => ["Urban", "Rural"],
        ]
        .unwrap();

        write_csv(&mut df, &path).unwrap();
        assert!(path.exists());

        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.shape(), (2, 2));
        assert_eq!(loaded.get_column_names(), df.get_column_names());
    }

    #[test]
    fn test_load_csv_reads_na_tokens_as_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(
            &path,
            "id,sqft,price\n1,1200,100\n2,NA,200\n3,1500,NaN\n4,1300,150\n5,n/a,175\n",
        )
        .unwrap();

        let df = load_csv(&path).unwrap();
        let sqft = df.column("sqft").unwrap();
        assert!(crate::utils::is_numeric_dtype(sqft.dtype()));
        assert_eq!(sqft.null_count(), 2);
        assert_eq!(df.column("price").unwrap().null_count(), 1);
    }

    #[test]
    fn test_na_tokens_are_imputed_end_to_end() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let output = dir.path().join("clean.csv");
        fs::write(
            &input,
            "id,sqft,price\n1,1200,100\n2,NA,200\n3,1500,NaN\n4,1300,150\n",
        )
        .unwrap();

        let summary = process_file(&input, &output, &CleaningConfig::default()).unwrap();
        assert_eq!(summary.missing_before, 2);
        assert_eq!(summary.imputations.len(), 2);

        let cleaned = load_csv(&output).unwrap();
        let total_nulls: usize = cleaned.get_columns().iter().map(|c| c.null_count()).sum();
        assert_eq!(total_nulls, 0);
        assert!(cleaned.height() >= 3);
    }

    #[test]
    fn test_load_csv_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_csv(dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
