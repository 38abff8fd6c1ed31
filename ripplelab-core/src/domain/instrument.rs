//! Stock identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Exchange-prefixed stock identifier, e.g. `SH600690` or `SZ000001`.
///
/// Instrument files are named `{EXCHANGE}{CODE}.csv`; the id is the file stem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockId(String);

impl StockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the id from an instrument file path (`data/SH600690.csv` → `SH600690`).
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn id_from_path_strips_extension_and_dirs() {
        let path = PathBuf::from("data/SH600690.csv");
        assert_eq!(StockId::from_path(&path), Some(StockId::new("SH600690")));
    }

    #[test]
    fn id_from_extensionless_path() {
        let path = PathBuf::from("SZ000001");
        assert_eq!(StockId::from_path(&path), Some(StockId::new("SZ000001")));
    }
}
