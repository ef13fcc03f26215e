//! Reference dataset of known QR codes.
//!
//! Loaded once at startup from the same JSON document the generator side
//! uses (`{"qrCodes": [{"name", "text", "color"}, ...]}`). A decoded
//! payload is matched against an entry's `text` by exact string equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// One known QR code: display name, exact payload text, and overlay color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Human-readable name shown in the seen list
    pub name: String,
    /// Exact-match payload text
    pub text: String,
    /// Overlay color as a CSS hex string, e.g. `#ff0000`
    pub color: String,
}

#[derive(Deserialize)]
struct ReferenceFile {
    #[serde(rename = "qrCodes")]
    qr_codes: Vec<ReferenceEntry>,
}

/// Ordered set of reference entries with exact-payload lookup.
///
/// An empty set is valid: decoding still works, nothing matches.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceSet {
    /// Build a set from entries
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    /// Load the dataset from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse the dataset from a JSON string
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        let file: ReferenceFile = serde_json::from_str(raw)?;
        Ok(Self {
            entries: file.qr_codes,
        })
    }

    /// Find the entry whose `text` equals `payload` exactly
    pub fn lookup(&self, payload: &str) -> Option<&ReferenceEntry> {
        self.entries.iter().find(|e| e.text == payload)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the set holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in dataset order
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.iter()
    }
}

/// Error loading or parsing a JSON dataset (reference set or replay
/// session).
#[derive(Debug)]
pub enum DatasetError {
    /// File could not be read
    Io(std::io::Error),
    /// Document was not valid JSON of the expected shape
    Parse(serde_json::Error),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "failed to read dataset: {err}"),
            DatasetError::Parse(err) => write!(f, "failed to parse dataset: {err}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io(err) => Some(err),
            DatasetError::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io(err)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "qrCodes": [
            { "name": "Booth 1", "text": "HELLO", "color": "#ff0000" },
            { "name": "Booth 2", "text": "WORLD", "color": "#00ff00" }
        ]
    }"##;

    #[test]
    fn test_parse_and_lookup() {
        let set = ReferenceSet::from_json_str(SAMPLE).unwrap();
        assert_eq!(set.len(), 2);

        let entry = set.lookup("HELLO").unwrap();
        assert_eq!(entry.name, "Booth 1");
        assert_eq!(entry.color, "#ff0000");

        assert!(set.lookup("hello").is_none(), "lookup is exact-match");
        assert!(set.lookup("UNKNOWN123").is_none());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ReferenceSet::from_json_str("not json"),
            Err(DatasetError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_set_is_usable() {
        let set = ReferenceSet::default();
        assert!(set.is_empty());
        assert!(set.lookup("anything").is_none());
    }
}
