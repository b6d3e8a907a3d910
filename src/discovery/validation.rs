use thiserror::Error;

/// Shortest accepted query, in characters after trimming
pub const MIN_QUERY_CHARS: usize = 10;
/// Longest accepted query, in characters after trimming
pub const MAX_QUERY_CHARS: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryValidationError {
    #[error("Search query is required")]
    Missing,

    #[error("Please describe what you're looking for (at least {min} characters, got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Keep it under {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
}

/// A query that passed the length checks. Holds the trimmed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, QueryValidationError> {
        let trimmed = raw.trim();
        let actual = trimmed.chars().count();

        if actual < MIN_QUERY_CHARS {
            return Err(QueryValidationError::TooShort {
                min: MIN_QUERY_CHARS,
                actual,
            });
        }
        if actual > MAX_QUERY_CHARS {
            return Err(QueryValidationError::TooLong {
                max: MAX_QUERY_CHARS,
                actual,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Like [`SearchQuery::parse`] but treats a missing or blank field as its own error
    pub fn parse_field(raw: Option<&str>) -> Result<Self, QueryValidationError> {
        match raw {
            Some(s) if !s.trim().is_empty() => Self::parse(s),
            _ => Err(QueryValidationError::Missing),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
