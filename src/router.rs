//! Resource Router - classifies resource identifiers
//!
//! `<authority>/stock` is the collection, `<authority>/stock/<digits>` a
//! single item. Anything else is rejected.

use crate::schema::{self, PATH_STOCK};
use crate::uri::ResourceUri;
use crate::{Error, Result};

/// Operation target resolved from a resource identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Every record in the table
    Collection,
    /// One record, by `_id`
    ItemById(i64),
}

impl Route {
    pub fn is_collection(&self) -> bool {
        matches!(self, Route::Collection)
    }
}

/// Immutable matcher for one authority and collection path.
#[derive(Debug, Clone)]
pub struct ResourceRouter {
    collection: ResourceUri,
}

impl ResourceRouter {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            collection: ResourceUri::new(authority, PATH_STOCK),
        }
    }

    pub fn authority(&self) -> &str {
        &self.collection.authority
    }

    /// Identifier of the whole collection
    pub fn collection_uri(&self) -> &ResourceUri {
        &self.collection
    }

    /// Identifier of a single item
    pub fn item_uri(&self, id: i64) -> ResourceUri {
        self.collection.with_appended_id(id)
    }

    /// Classify a resource identifier string
    pub fn classify(&self, resource: &str) -> Result<Route> {
        let uri = ResourceUri::parse(resource)?;
        self.classify_uri(&uri)
    }

    /// Classify an already parsed identifier
    pub fn classify_uri(&self, uri: &ResourceUri) -> Result<Route> {
        let unrecognized = || Error::UnrecognizedResource(uri.to_uri_string());

        if uri.authority != self.collection.authority {
            return Err(unrecognized());
        }

        let mut segments = uri.segments();
        if segments.next() != Some(self.collection.path.as_str()) {
            return Err(unrecognized());
        }

        match (segments.next(), segments.next()) {
            (None, _) => Ok(Route::Collection),
            (Some(id), None) => parse_id(id)
                .map(Route::ItemById)
                .ok_or_else(|| Error::MalformedId(id.to_string())),
            (Some(_), Some(_)) => Err(unrecognized()),
        }
    }

    /// Content type of the resource
    pub fn content_type(&self, resource: &str) -> Result<String> {
        Ok(match self.classify(resource)? {
            Route::Collection => schema::collection_content_type(self.authority()),
            Route::ItemById(_) => schema::item_content_type(self.authority()),
        })
    }
}

impl Default for ResourceRouter {
    fn default() -> Self {
        Self::new(schema::DEFAULT_AUTHORITY)
    }
}

/// Item ids are plain decimal digits
fn parse_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
