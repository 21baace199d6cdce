//! Unified error types.
//!
//! Two layers, matching the dispatch failure policy:
//!
//! - [`Error`] is fatal. It aborts the dispatch and surfaces from
//!   [`exec`](crate::DispatchStack::exec). Producing a response out of one
//!   is the hosting integration's job, not the engine's.
//! - [`Rejection`] is what an asynchronous handler rejects *with*. Only its
//!   `Error` variant is fatal; a plain reason is logged and swallowed, and
//!   a reasonless rejection is swallowed without a trace.

use thiserror::Error;

/// A boxed application error, propagated verbatim through the dispatch.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal dispatch failures.
#[derive(Debug, Error)]
pub enum Error {
    /// An implicit-advance (asynchronous) handler invoked its continuation.
    #[error("Middleware next() is unsupported")]
    NextUnsupported,

    /// A plugin lookup for a name nothing has stored under.
    #[error("Plugin \"{0}\" doesn't exist")]
    PluginMissing(String),

    /// An Error-kind rejection raised by an application handler.
    #[error("{0}")]
    Handler(BoxError),
}

/// Why an asynchronous handler rejected.
#[derive(Debug)]
pub enum Rejection {
    /// Error-kind reason: fatal, the dispatch aborts and the error
    /// surfaces verbatim.
    Error(BoxError),
    /// Plain reason: written to the informational channel once, then the
    /// dispatch continues as if the handler had resolved.
    Reason(String),
    /// No reason given: the dispatch continues and nothing is logged.
    Silent,
}

impl Rejection {
    /// Fatal rejection carrying `err`.
    pub fn error(err: impl Into<BoxError>) -> Self {
        Self::Error(err.into())
    }

    /// Soft rejection carrying an informational `reason`.
    pub fn reason(reason: impl Into<String>) -> Self {
        Self::Reason(reason.into())
    }
}

impl From<&str> for Rejection {
    fn from(reason: &str) -> Self {
        Self::Reason(reason.to_owned())
    }
}

impl From<String> for Rejection {
    fn from(reason: String) -> Self {
        Self::Reason(reason)
    }
}

/// Lets handlers use `?` on engine results — a missing plugin aborts the
/// dispatch rather than soft-failing.
impl From<Error> for Rejection {
    fn from(err: Error) -> Self {
        Self::Error(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_dispatch_contract() {
        assert_eq!(
            Error::NextUnsupported.to_string(),
            "Middleware next() is unsupported"
        );
        assert_eq!(
            Error::PluginMissing("acl".to_owned()).to_string(),
            "Plugin \"acl\" doesn't exist"
        );
    }

    #[test]
    fn handler_errors_surface_verbatim() {
        let err = Error::Handler("backend unreachable".into());
        assert_eq!(err.to_string(), "backend unreachable");
    }

    #[test]
    fn plugin_lookup_failures_become_fatal_rejections() {
        let rejection = Rejection::from(Error::PluginMissing("acl".to_owned()));
        assert!(matches!(rejection, Rejection::Error(_)));
    }
}
