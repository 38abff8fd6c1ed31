//! Exclusion set — instruments skipped for known bad source data.
//!
//! An explicit configuration value passed into the pipeline and the ranker,
//! not a module-level constant. Matches on the `{EXCHANGE}{CODE}` file stem.
//! Loadable from TOML:
//!
//! ```toml
//! excluded = ["SZ131809", "SH600629"]
//! ```

use crate::domain::StockId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Instruments with corrupt source data in the historical dump. These files
/// parse but carry garbage prices (repo-quality bond/repo listings mostly).
const KNOWN_BAD: &[&str] = &[
    "SZ131809", "SZ131800", "SH120485", "SH202001", "SH202007", "SH202003",
    "SZ131801", "SH120520", "SH201008", "SH201010", "SZ131805", "SZ131804",
    "SH204014", "SZ131806", "SZ131802", "SH204028", "SH600629", "SH120509",
    "SZ000592", "SH120519", "SZ131803", "SZ000650", "SZ002272", "SZ000578",
    "SH600137", "SH204007",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    excluded: BTreeSet<StockId>,
}

impl ExclusionSet {
    /// Empty set: nothing excluded.
    pub fn none() -> Self {
        Self::default()
    }

    /// The built-in list of known-bad instruments.
    pub fn known_bad() -> Self {
        Self::from_ids(KNOWN_BAD.iter().map(|id| StockId::new(*id)))
    }

    pub fn from_ids(ids: impl IntoIterator<Item = StockId>) -> Self {
        Self {
            excluded: ids.into_iter().collect(),
        }
    }

    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, crate::DataError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::DataError::Malformed {
            path: path.to_path_buf(),
            reason: format!("parse exclusion TOML: {e}"),
        })
    }

    pub fn contains(&self, id: &StockId) -> bool {
        self.excluded.contains(id)
    }

    /// Match an instrument file path by its stem.
    pub fn contains_path(&self, path: &Path) -> bool {
        StockId::from_path(path)
            .map(|id| self.contains(&id))
            .unwrap_or(false)
    }

    pub fn insert(&mut self, id: StockId) {
        self.excluded.insert(id);
    }

    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn known_bad_contains_seed_entries() {
        let set = ExclusionSet::known_bad();
        assert!(set.contains(&StockId::new("SZ131809")));
        assert!(set.contains(&StockId::new("SH600137")));
        assert!(!set.contains(&StockId::new("SH600690")));
    }

    #[test]
    fn matches_on_file_stem() {
        let set = ExclusionSet::known_bad();
        assert!(set.contains_path(&PathBuf::from("data/SZ131809.csv")));
        assert!(!set.contains_path(&PathBuf::from("data/SH600690.csv")));
    }

    #[test]
    fn parses_toml() {
        let set: ExclusionSet = toml::from_str(r#"excluded = ["SH000001", "SZ999999"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&StockId::new("SH000001")));
    }

    #[test]
    fn none_is_empty() {
        assert!(ExclusionSet::none().is_empty());
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclusions.toml");
        std::fs::write(&path, "excluded = [\"SH600629\"]\n").unwrap();
        let set = ExclusionSet::from_file(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains_path(&PathBuf::from("data/SH600629.csv")));
    }
}
