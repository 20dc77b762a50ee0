//! Error handling for the CLI application

use std::fmt;

/// CLI-level failures that end the run
#[derive(Debug)]
pub enum CliError {
    /// The pipeline could not be set up from the given configuration
    SetupFailed(String),
    /// A sentence could not be normalized and `--on-error abort` is active
    SentenceFailed { sentence: String, reason: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::SetupFailed(config) => write!(f, "Setup failed for configuration: {config}"),
            CliError::SentenceFailed { sentence, reason } => {
                write!(f, "Normalization failed for [{sentence}]: {reason}")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_failed_display() {
        let error = CliError::SetupFailed("af/config.toml".to_string());
        assert_eq!(
            error.to_string(),
            "Setup failed for configuration: af/config.toml"
        );
    }

    #[test]
    fn test_sentence_failed_display() {
        let error = CliError::SentenceFailed {
            sentence: "3koeie".to_string(),
            reason: "rule TOKENIZE produced no output".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Normalization failed for [3koeie]: rule TOKENIZE produced no output"
        );
    }

    #[test]
    fn test_converts_into_cli_result() {
        let failure: CliResult<()> = Err(CliError::SetupFailed("x".to_string()).into());
        let err = failure.unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }
}
