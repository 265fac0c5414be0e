//! Search query extractor
//!
//! Validates the `q` parameter before it reaches the service layer.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use validator::Validate;

use crate::response::ApiError;

/// Raw search parameters with validation rules
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    /// Substring to look for, matched case-insensitively
    #[validate(length(min = 1, max = 100, message = "query must be 1-100 characters"))]
    pub q: String,
}

/// Validated search query
#[derive(Debug, Clone)]
pub struct SearchQuery(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<SearchParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        params.validate()?;

        Ok(SearchQuery(params.q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_rejected() {
        let params = SearchParams { q: String::new() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_oversized_query_rejected() {
        let params = SearchParams { q: "x".repeat(101) };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_normal_query_accepted() {
        let params = SearchParams {
            q: "deadlift".to_string(),
        };
        assert!(params.validate().is_ok());
    }
}
