//! Unified Result Model
//!
//! Every command maps its output to [`ResultItem`]s collected in a
//! [`ResultSet`] before rendering.

use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A log file found by `files`
    File,
    /// A line returned by `tail`
    Line,
    /// A line matched by `search`
    Match,
    /// A parsed query from `query`
    Query,
    /// Totals for the command
    Summary,
    Error,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Modification time, "YYYY-MM-DD HH:MM:SS" local time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_time: Option<String>,

    /// Permitted root the file lives under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

impl Meta {
    fn is_empty(&self) -> bool {
        self == &Meta::default()
    }
}

/// Error information for a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub code: String,
    pub message: String,
}

impl ItemError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub kind: Kind,

    /// File path (relative to its root for `file`, absolute for `match`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Bare file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// 1-based line number in the original file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,

    /// Line content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured payload for `query` and `summary` items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ItemError>,
}

impl ResultItem {
    fn empty(kind: Kind) -> Self {
        Self {
            kind,
            path: None,
            name: None,
            line: None,
            excerpt: None,
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new file result
    pub fn file(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            name: Some(name.into()),
            ..Self::empty(Kind::File)
        }
    }

    /// Create a new tail line result
    pub fn line(name: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            excerpt: Some(excerpt.into()),
            ..Self::empty(Kind::Line)
        }
    }

    /// Create a new match result
    pub fn match_result(path: impl Into<String>, line: u64, excerpt: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            line: Some(line),
            excerpt: Some(excerpt.into()),
            ..Self::empty(Kind::Match)
        }
    }

    pub fn query(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(Kind::Query)
        }
    }

    pub fn summary(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(Kind::Summary)
        }
    }

    /// Create a new error result
    pub fn error(error: ItemError) -> Self {
        Self {
            errors: vec![error],
            ..Self::empty(Kind::Error)
        }
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ResultItem>) {
        self.items.extend(items);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_item_file() {
        let item = ResultItem::file("nginx/access.log", "access.log");
        assert_eq!(item.kind, Kind::File);
        assert_eq!(item.path.as_deref(), Some("nginx/access.log"));
        assert_eq!(item.name.as_deref(), Some("access.log"));
    }

    #[test]
    fn test_match_result_serializes_compactly() {
        let item = ResultItem::match_result("/var/log/app.log", 42, "ERROR boom");
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(
            v,
            json!({
                "kind": "match",
                "path": "/var/log/app.log",
                "line": 42,
                "excerpt": "ERROR boom"
            })
        );
    }

    #[test]
    fn test_meta_is_serialized_when_present() {
        let item = ResultItem::file("a.log", "a.log").with_meta(Meta {
            size: Some(10),
            mod_time: Some("2024-01-01 00:00:00".to_string()),
            root: None,
        });
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["meta"]["size"], 10);
        assert_eq!(v["meta"]["mod_time"], "2024-01-01 00:00:00");
        assert!(v["meta"].get("root").is_none());
    }

    #[test]
    fn test_result_item_error() {
        let item = ResultItem::error(ItemError::new("IO_ERROR", "boom")).with_path("x.log");
        assert_eq!(item.kind, Kind::Error);
        assert_eq!(item.errors.len(), 1);
        assert_eq!(item.errors[0].code, "IO_ERROR");
        assert_eq!(item.path.as_deref(), Some("x.log"));
    }

    #[test]
    fn test_result_item_round_trips_through_json() {
        let item = ResultItem::summary(json!({"count": 3}));
        let text = serde_json::to_string(&item).unwrap();
        let back: ResultItem = serde_json::from_str(&text).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_result_set_collects() {
        let set: ResultSet = (1..=3)
            .map(|n| ResultItem::line("app.log", format!("line {n}")))
            .collect();
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
    }
}
