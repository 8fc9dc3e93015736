use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures talking to the REST backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("request timed out")]
    Timeout,
}

/// Failures on the realtime (WebSocket) side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RealtimeError {
    #[error("no auth token available")]
    NotAuthenticated,

    #[error("connection is not open")]
    NotConnected,

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("location error: {0}")]
    Location(String),

    #[error("connection closed")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum DigitaskError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Realtime(#[from] RealtimeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("server.api_base_url is empty".into());
        assert_eq!(
            err.to_string(),
            "config validation error: server.api_base_url is empty"
        );
    }

    #[test]
    fn api_error_display() {
        let err = ApiError::Status {
            status: 403,
            message: "You do not have permission".into(),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 403: You do not have permission"
        );
        assert_eq!(ApiError::NotAuthenticated.to_string(), "not authenticated");
        assert_eq!(ApiError::Timeout.to_string(), "request timed out");
    }

    #[test]
    fn realtime_error_display() {
        assert_eq!(
            RealtimeError::NotConnected.to_string(),
            "connection is not open"
        );
        assert_eq!(
            RealtimeError::Connect("refused".into()).to_string(),
            "connect failed: refused"
        );
    }

    #[test]
    fn digitask_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: DigitaskError = config_err.into();
        assert!(matches!(err, DigitaskError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn digitask_error_from_api_and_realtime() {
        let err: DigitaskError = ApiError::Network("reset".into()).into();
        assert!(matches!(err, DigitaskError::Api(_)));
        assert_eq!(err.to_string(), "network error: reset");

        let err: DigitaskError = RealtimeError::NotConnected.into();
        assert!(matches!(err, DigitaskError::Realtime(_)));
    }

    #[test]
    fn digitask_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: DigitaskError = io_err.into();
        assert!(matches!(err, DigitaskError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
