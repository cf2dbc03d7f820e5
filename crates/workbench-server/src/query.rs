//! Query string normalization.
//!
//! Clients sometimes repeat a parameter. Every lookup goes through
//! [`QueryParams::first_of`], which takes the first occurrence.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

/// All query pairs of a request, in order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value given for `name`, if any.
    pub fn first_of(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First value given for `name`, treating an empty value as absent.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.first_of(name).filter(|value| !value.is_empty())
    }

    /// Whether `name` appears at all, with or without a value.
    pub fn has(&self, name: &str) -> bool {
        self.first_of(name).is_some()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        Ok(Self(pairs))
    }
}
