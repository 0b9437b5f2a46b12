use std::time::Duration;

/// Why a session could not be opened. Each kind calls for a different fix,
/// so they are never collapsed into one message.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("service unreachable at {uri}: {detail} (is the database running?)")]
    ServiceUnreachable { uri: String, detail: String },

    #[error("authentication failed for user '{user}': {detail} (check username and password)")]
    AuthenticationFailed { user: String, detail: String },

    #[error("unknown connection failure: {0}")]
    UnknownFailure(String),
}

impl ConnectionError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceUnreachable { .. } => "service_unreachable",
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::UnknownFailure(_) => "unknown_failure",
        }
    }

    /// Maps a driver error onto the connection taxonomy.
    pub fn classify(err: &neo4rs::Error, uri: &str, user: &str) -> Self {
        let detail = err.to_string();
        match err {
            neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => {
                Self::ServiceUnreachable {
                    uri: uri.to_string(),
                    detail,
                }
            }
            neo4rs::Error::AuthenticationError(_) => Self::AuthenticationFailed {
                user: user.to_string(),
                detail,
            },
            _ => Self::classify_message(detail, uri, user),
        }
    }

    fn classify_message(detail: String, uri: &str, user: &str) -> Self {
        let lower = detail.to_lowercase();
        if lower.contains("unauthorized")
            || lower.contains("authentication")
            || lower.contains("security")
        {
            Self::AuthenticationFailed {
                user: user.to_string(),
                detail,
            }
        } else if lower.contains("connection refused")
            || lower.contains("connection reset")
            || lower.contains("unavailable")
            || lower.contains("dns")
        {
            Self::ServiceUnreachable {
                uri: uri.to_string(),
                detail,
            }
        } else {
            Self::UnknownFailure(detail)
        }
    }
}

/// Failure of a single metric query. Always carries the query text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error("query execution failed: {detail}")]
    ExecutionFailed { query: String, detail: String },

    #[error("query timed out after {timeout:?}")]
    Timeout { query: String, timeout: Duration },

    #[error("session already closed")]
    SessionClosed { query: String },

    #[error("unexpected result shape: {detail}")]
    UnexpectedShape { query: String, detail: String },

    #[error("query returned no rows where one was expected")]
    EmptyResultUnexpected { query: String },
}

impl QueryError {
    pub fn query(&self) -> &str {
        match self {
            Self::ExecutionFailed { query, .. }
            | Self::Timeout { query, .. }
            | Self::SessionClosed { query }
            | Self::UnexpectedShape { query, .. }
            | Self::EmptyResultUnexpected { query } => query,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExecutionFailed { .. } => "query_execution_failed",
            Self::Timeout { .. } => "timeout",
            Self::SessionClosed { .. } => "session_closed",
            Self::UnexpectedShape { .. } => "unexpected_shape",
            Self::EmptyResultUnexpected { .. } => "empty_result_unexpected",
        }
    }
}
