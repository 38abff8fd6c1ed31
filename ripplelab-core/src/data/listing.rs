//! Exchange listing files — merge per-exchange symbol lists into
//! provider-native symbols.
//!
//! Listing files are headerless `name,code` CSV, one file per exchange,
//! paired with a provider suffix (`.ss` for Shanghai, `.sz` for Shenzhen).

use crate::error::DataError;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[allow(dead_code)]
    name: String,
    code: String,
}

/// Merge listing files into suffixed symbols (`600690` + `.ss` → `600690.ss`).
///
/// `files` and `suffixes` must pair up one-to-one.
pub fn stock_list(files: &[&Path], suffixes: &[&str]) -> Result<Vec<String>, DataError> {
    if files.len() != suffixes.len() {
        return Err(DataError::InvalidArgument(format!(
            "{} listing files but {} suffixes",
            files.len(),
            suffixes.len()
        )));
    }

    let mut symbols = Vec::new();
    for (path, suffix) in files.iter().zip(suffixes) {
        if !path.is_file() {
            return Err(DataError::MissingFile(path.to_path_buf()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        for record in reader.deserialize::<ListingRow>() {
            let row = record.map_err(|e| DataError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            symbols.push(format!("{}{}", row.code, suffix));
        }
    }
    info!(files = files.len(), symbols = symbols.len(), "merged listing files");
    Ok(symbols)
}
