//! Error handling and display for the CLI.

use std::fmt;

use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Not authenticated. Run `diver ucp login` to authenticate.")]
    NotAuthenticated,

    #[error("Control plane error: {error}")]
    Application { status: u16, error: ApplicationError },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an application error from a decoded envelope.
    pub fn application(status: u16, error: ApplicationError) -> Self {
        Self::Application { status, error }
    }

    /// Replace a `NotFound` message with one naming the missing resource.
    pub fn or_not_found(self, message: impl FnOnce() -> String) -> Self {
        match self {
            Self::NotFound(_) => Self::NotFound(message()),
            other => other,
        }
    }
}

/// An error reported by the control plane in its own response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationError {
    pub message: String,
    pub code: Option<String>,
}

impl ApplicationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// Response bytes did not match the expected schema.
#[derive(Debug, Error)]
#[error("Failed to decode {context}: {source}")]
pub struct DecodeError {
    pub context: String,
    pub source: serde_json::Error,
}

impl DecodeError {
    pub fn new(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::NotAuthenticated => {
                eprintln!(
                    "\n{}",
                    "Hint: Run `diver ucp login` to authenticate.".yellow()
                );
            }
            CliError::Application { status: 403, .. } => {
                eprintln!(
                    "\n{}",
                    "Hint: Your account may not have a grant for this resource.".yellow()
                );
            }
            CliError::Transport(_) => {
                eprintln!(
                    "\n{}",
                    "Hint: Check your network connection and the UCP URL (`diver ucp status`)."
                        .yellow()
                );
            }
            CliError::Decode(_) => {
                eprintln!(
                    "\n{}",
                    "Hint: The control plane may be running an unsupported API version.".yellow()
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_display_includes_code() {
        let err = ApplicationError::with_code("token expired", "UNAUTHORIZED");
        assert_eq!(err.to_string(), "token expired (UNAUTHORIZED)");
        assert_eq!(ApplicationError::new("access denied").to_string(), "access denied");
    }

    #[test]
    fn or_not_found_only_rewrites_not_found() {
        let err = CliError::NotFound("/services/web".to_string())
            .or_not_found(|| "Service 'web' not found".to_string());
        assert!(matches!(err, CliError::NotFound(ref m) if m == "Service 'web' not found"));

        let err = CliError::NotAuthenticated.or_not_found(|| "unused".to_string());
        assert!(matches!(err, CliError::NotAuthenticated));
    }
}
