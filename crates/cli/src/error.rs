//! CLI error types.

use std::fmt;

use error_stack::Report;
use justpremium_adapter_common::error::AdapterError;

#[derive(Debug)]
pub enum CliError {
    /// Configuration file error
    Config(String),
    /// IO error
    Io(std::io::Error),
    /// JSON input or output error
    Json(String),
    /// HTTP request error
    Http(String),
    /// Error raised by the adapter library
    Adapter(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Json(msg) => write!(f, "JSON error: {}", msg),
            CliError::Http(msg) => write!(f, "HTTP error: {}", msg),
            CliError::Adapter(msg) => write!(f, "Adapter error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err.to_string())
    }
}

impl From<ureq::Error> for CliError {
    fn from(err: ureq::Error) -> Self {
        CliError::Http(err.to_string())
    }
}

impl From<Report<AdapterError>> for CliError {
    fn from(report: Report<AdapterError>) -> Self {
        match report.current_context() {
            AdapterError::Configuration { .. } => CliError::Config(format!("{report:?}")),
            _ => CliError::Adapter(format!("{report:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cli_error_display() {
        assert_eq!(
            format!("{}", CliError::Config("test".into())),
            "Configuration error: test"
        );
        assert_eq!(
            format!("{}", CliError::Json("test".into())),
            "JSON error: test"
        );
        assert_eq!(
            format!("{}", CliError::Http("test".into())),
            "HTTP error: test"
        );
        assert_eq!(
            format!("{}", CliError::Adapter("test".into())),
            "Adapter error: test"
        );
    }

    #[test]
    fn test_cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        match cli_err {
            CliError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_cli_error_from_adapter_report() {
        let report = Report::new(AdapterError::Configuration {
            message: "bad".to_string(),
        });
        assert!(matches!(CliError::from(report), CliError::Config(_)));

        let report = Report::new(AdapterError::BidResponse {
            message: "bad".to_string(),
        });
        assert!(matches!(CliError::from(report), CliError::Adapter(_)));
    }

    #[test]
    fn test_cli_error_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.source().is_some());

        let config_err = CliError::Config("test".into());
        assert!(config_err.source().is_none());
    }
}
