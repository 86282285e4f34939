//! Error types.
//!
//! `replace` only fails when a `Throw` policy was selected somewhere (globally,
//! on the filter, or by an `error(...)`/`empty(...)` control filter in the
//! chain). Everything else degrades to a substituted string.

use thiserror::Error;

/// Error type produced by filter transforms and policy handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// A filter failed and the active policy asked for the error to propagate.
    ///
    /// `source` is the error the filter raised (or the one the policy handler
    /// supplied), so callers can downcast it.
    #[error("filter `{filter}` failed: {source}")]
    Filter {
        filter: String,
        #[source]
        source: BoxError,
    },

    /// A filter produced an empty value under a `Throw` empty policy.
    #[error("filter `{filter}` produced an empty value")]
    EmptyValue { filter: String },

    /// A filter definition was rejected at registration time.
    #[error("invalid filter definition: {0}")]
    InvalidFilter(String),
}

impl Error {
    /// The error raised inside the filter, if this is a [`Error::Filter`].
    pub fn filter_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Filter { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Name of the filter that raised this error, if any.
    pub fn filter_name(&self) -> Option<&str> {
        match self {
            Error::Filter { filter, .. } | Error::EmptyValue { filter } => Some(filter),
            Error::InvalidFilter(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn filter_error_keeps_original_source() {
        let err = Error::Filter { filter: "explode".into(), source: Box::new(Boom) };
        assert_eq!(err.to_string(), "filter `explode` failed: boom");
        assert_eq!(err.filter_name(), Some("explode"));
        assert!(err.filter_source().unwrap().downcast_ref::<Boom>().is_some());
    }

    #[test]
    fn invalid_filter_has_no_filter_name() {
        let err = Error::InvalidFilter("missing name".into());
        assert!(err.filter_name().is_none());
        assert!(err.filter_source().is_none());
    }
}
