//! Resource URI - addressing for the stock collection and its items
//!
//! Format: `<authority>/<path>[/<id>]`, optionally written with a
//! `content://` scheme which is dropped on parse.
//!
//! Examples:
//! - `stockapp/stock`
//! - `stockapp/stock/7`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SCHEME: &str = "content://";

/// A parsed resource identifier.
///
/// The URI only knows its authority and path segments; deciding whether it
/// names the collection or an item is the router's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceUri {
    /// Authority (first segment)
    pub authority: String,
    /// Path below the authority, without leading or trailing slashes
    pub path: String,
}

impl ResourceUri {
    pub fn new(authority: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            path: path.into(),
        }
    }

    /// Parse a URI string into a ResourceUri
    ///
    /// Expected format: `<authority>/<path>`
    pub fn parse(uri: &str) -> Result<Self> {
        let trimmed = uri.strip_prefix(SCHEME).unwrap_or(uri).trim_end_matches('/');

        let (authority, path) = trimmed
            .split_once('/')
            .ok_or_else(|| Error::UnrecognizedResource(uri.to_string()))?;

        if authority.is_empty() || path.is_empty() || path.split('/').any(str::is_empty) {
            return Err(Error::UnrecognizedResource(uri.to_string()));
        }

        Ok(Self::new(authority, path))
    }

    /// Path segments below the authority
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/')
    }

    /// Append a numeric id as a new trailing segment
    pub fn with_appended_id(&self, id: i64) -> Self {
        Self::new(self.authority.clone(), format!("{}/{}", self.path, id))
    }

    /// Whether `other` is this URI or lies below it.
    ///
    /// Matching is per segment: `a/stock` covers `a/stock/3` but not `a/stockroom`.
    pub fn covers(&self, other: &ResourceUri) -> bool {
        if self.authority != other.authority {
            return false;
        }
        match other.path.strip_prefix(self.path.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with('/'),
            None => false,
        }
    }

    pub fn to_uri_string(&self) -> String {
        format!("{}/{}", self.authority, self.path)
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ResourceUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ResourceUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ResourceUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceUri::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_parse() {
        let uri = ResourceUri::parse("stockapp/stock/7").unwrap();
        assert_eq!(uri.authority, "stockapp");
        assert_eq!(uri.path, "stock/7");
        assert_eq!(uri.segments().collect::<Vec<_>>(), vec!["stock", "7"]);
    }

    #[test]
    fn test_scheme_is_optional() {
        let plain = ResourceUri::parse("stockapp/stock").unwrap();
        let schemed = ResourceUri::parse("content://stockapp/stock/").unwrap();
        assert_eq!(plain, schemed);
        assert_eq!(schemed.to_uri_string(), "stockapp/stock");
    }

    #[test]
    fn test_appended_id() {
        let collection = ResourceUri::new("stockapp", "stock");
        assert_eq!(collection.with_appended_id(12).to_string(), "stockapp/stock/12");
    }

    #[test]
    fn test_covers_by_segment() {
        let collection = ResourceUri::new("stockapp", "stock");
        assert!(collection.covers(&collection));
        assert!(collection.covers(&collection.with_appended_id(3)));
        assert!(!collection.covers(&ResourceUri::new("stockapp", "stockroom")));
        assert!(!collection.covers(&ResourceUri::new("other", "stock/3")));
        assert!(!collection.with_appended_id(3).covers(&collection));
    }

    #[test]
    fn test_invalid_uri() {
        assert!(ResourceUri::parse("stockapp").is_err());
        assert!(ResourceUri::parse("/stock").is_err());
        assert!(ResourceUri::parse("stockapp//3").is_err());
        assert!(ResourceUri::parse("").is_err());
    }
}
