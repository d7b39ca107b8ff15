//! Search cluster error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search cluster returned {status} for {index}: {body}")]
    Status {
        status: u16,
        index: String,
        body: String,
    },

    #[error("Invalid search URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = SearchError::Status {
            status: 404,
            index: "search-traces-alias".to_string(),
            body: "index_not_found_exception".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Search cluster returned 404 for search-traces-alias: index_not_found_exception"
        );
    }
}
