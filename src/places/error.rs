use thiserror::Error;

/// Error taxonomy for place-source operations.
///
/// Callers treat `MalformedResponse` the same as `UpstreamUnavailable`;
/// both mean the upstream could not deliver usable data. All variants
/// surface as structured failure results, never process-terminating
/// faults.
#[derive(Error, Debug)]
pub enum PlaceSourceError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("No match found for \"{0}\"")]
    NotFound(String),
}

impl PlaceSourceError {
    /// Whether this is a "no match" outcome rather than an upstream fault
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlaceSourceError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, PlaceSourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        assert!(PlaceSourceError::NotFound("x".to_string()).is_not_found());
        assert!(!PlaceSourceError::UpstreamUnavailable("x".to_string()).is_not_found());
        assert!(!PlaceSourceError::MalformedResponse("x".to_string()).is_not_found());
    }

    #[test]
    fn test_display_carries_underlying_message() {
        let err = PlaceSourceError::UpstreamUnavailable("primary timed out".to_string());
        assert!(err.to_string().contains("primary timed out"));
    }
}
