// Error types for the notification stream

use thiserror::Error;

/// Result type alias for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors that can occur while opening or polling a stream
#[derive(Debug, Error)]
pub enum StreamError {
    /// No resolvable principal; the stream is never opened
    #[error("Authentication required")]
    Unauthenticated,

    /// A single poll-cycle query failed; recovered locally by the poll loop
    #[error("Query '{query}' failed: {source}")]
    TransientQuery {
        query: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The stream could not be established
    #[error("Stream setup failed: {0}")]
    Setup(#[from] anyhow::Error),
}

impl StreamError {
    /// Create a transient query error
    pub fn query(query: &'static str, source: anyhow::Error) -> Self {
        StreamError::TransientQuery { query, source }
    }

    /// Create a setup error
    pub fn setup(msg: impl Into<String>) -> Self {
        StreamError::Setup(anyhow::anyhow!(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StreamError::query("unread_notifications", anyhow::anyhow!("pool timed out"));
        assert!(matches!(err, StreamError::TransientQuery { query: "unread_notifications", .. }));
        assert_eq!(
            err.to_string(),
            "Query 'unread_notifications' failed: pool timed out"
        );

        assert_eq!(
            StreamError::setup("resolver unavailable").to_string(),
            "Stream setup failed: resolver unavailable"
        );
    }
}
