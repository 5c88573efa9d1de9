use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Errors raised outside the classified request/response path.
///
/// The lifecycle operations never return these; they only surface while
/// loading configuration or from a transport adapter, where the connector
/// folds them into a `FAILED` outcome.
#[derive(Error, Diagnostic, Debug)]
pub enum ConnectorError {
    #[error("Missing configuration variable: {0}")]
    #[diagnostic(
        code(connector::config::missing),
        help("set it in the environment or in a .env file")
    )]
    MissingConfig(String),

    #[error("Env file error: {0}")]
    #[diagnostic(code(connector::config::env_file))]
    EnvFile(#[from] dotenvy::Error),

    #[error("Invalid API base URL: {0}")]
    #[diagnostic(code(connector::config::api_base))]
    InvalidApiBase(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    #[diagnostic(code(connector::transport))]
    Transport(String),

    #[cfg(feature = "http-reqwest")]
    #[error("HTTP request failed: {0}")]
    #[diagnostic(code(connector::transport::http))]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConnectorError::MissingConfig("STRIPE_API_KEY".into());
        assert_eq!(
            error.to_string(),
            "Missing configuration variable: STRIPE_API_KEY"
        );
    }

    #[test]
    fn test_diagnostic_code() {
        let error = ConnectorError::Transport("connection reset".into());
        let code = error.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("connector::transport"));
    }

    #[test]
    fn test_url_error_conversion() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let error: ConnectorError = parse_err.into();
        assert!(matches!(error, ConnectorError::InvalidApiBase(_)));
    }
}
