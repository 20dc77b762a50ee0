//! The normalize filter: stdin in, one result per sentence out

use crate::error::{CliError, CliResult};
use crate::input::{InputMode, LineReader};
use crate::output::{JsonFormatter, LinksFormatter, OutputFormatter, TextFormatter};
use anyhow::Context;
use clap::Args;
use lectern_core::Normalizer;
use std::io::{self, BufRead};
use std::path::PathBuf;

/// Arguments for the normalize filter
#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Normalizer configuration file
    #[arg(short, long, value_name = "FILE", env = "LECTERN_CONFIG")]
    pub config: PathBuf,

    /// Directory that relative paths in the configuration resolve against
    #[arg(short, long, value_name = "DIR")]
    pub path_prefix: Option<PathBuf>,

    /// Treat all of stdin as one text spread across multiple lines
    #[arg(short, long)]
    pub multi_line_text: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// What to do with a sentence that cannot be normalized
    #[arg(long, value_enum, default_value = "skip")]
    pub on_error: OnError,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One normalized sentence per line
    Text,
    /// One JSON object per sentence with the input and its normalization
    Json,
    /// Token and word link table per sentence
    Links,
}

/// Policy for sentences that fail classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OnError {
    /// Log a warning and emit nothing for the sentence
    Skip,
    /// Stop with a non-zero exit status
    Abort,
}

/// Counts reported at the end of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub sentences: usize,
    pub skipped: usize,
}

impl NormalizeArgs {
    /// Execute the normalize filter over standard input
    pub fn execute(&self) -> CliResult<()> {
        self.init_logging()?;

        log::debug!("Arguments: {:?}", self);

        let normalizer = Normalizer::setup(&self.config, self.path_prefix.as_deref())
            .with_context(|| CliError::SetupFailed(self.config.display().to_string()))?;
        log::info!("Loaded {:?}", normalizer);

        let mode = if self.multi_line_text {
            InputMode::MultiLine
        } else {
            InputMode::SingleLine
        };

        let stdout = io::stdout().lock();
        let mut formatter: Box<dyn OutputFormatter> = match self.format {
            OutputFormat::Text => Box::new(TextFormatter::new(stdout)),
            OutputFormat::Json => Box::new(JsonFormatter::new(stdout)),
            OutputFormat::Links => Box::new(LinksFormatter::new(stdout)),
        };

        let summary = normalize_stream(
            &normalizer,
            io::stdin().lock(),
            mode,
            self.format,
            self.on_error,
            formatter.as_mut(),
        )?;

        log::info!(
            "Normalized {} sentences, skipped {}",
            summary.sentences - summary.skipped,
            summary.skipped
        );
        Ok(())
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) -> CliResult<()> {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
                .try_init()?;
        }

        Ok(())
    }
}

/// Split every logical input from `reader` into sentences and normalize each
///
/// An input that is not valid UTF-8 cannot be split; it goes to the
/// normalizer whole and fails as one sentence under the `on_error` policy.
/// Output is flushed once the input is exhausted, and also before an abort so
/// that sentences already normalized are not lost.
pub fn normalize_stream<R: BufRead>(
    normalizer: &Normalizer,
    reader: R,
    mode: InputMode,
    format: OutputFormat,
    on_error: OnError,
    formatter: &mut dyn OutputFormatter,
) -> CliResult<RunSummary> {
    let mut summary = RunSummary::default();

    for input in LineReader::new(reader, mode) {
        let input = input?;
        let sentences: Vec<Vec<u8>> = match String::from_utf8(input) {
            Ok(text) => normalizer
                .split_sentences(&text)
                .into_iter()
                .map(String::into_bytes)
                .collect(),
            Err(err) => vec![err.into_bytes()],
        };

        for sentence in sentences {
            summary.sentences += 1;
            let result = normalizer
                .normalize_utterance_bytes(&sentence)
                .map(|utt| match format {
                    OutputFormat::Links => utt.show_links(),
                    OutputFormat::Text | OutputFormat::Json => utt.linearize_words(),
                });
            let sentence = String::from_utf8_lossy(&sentence);

            match result {
                Ok(output) => formatter.format_sentence(&sentence, &output)?,
                Err(err) => match on_error {
                    OnError::Skip => {
                        log::warn!("Skipping sentence [{}]: {}", sentence, err);
                        summary.skipped += 1;
                    }
                    OnError::Abort => {
                        formatter.finish()?;
                        return Err(CliError::SentenceFailed {
                            sentence: sentence.into_owned(),
                            reason: err.to_string(),
                        }
                        .into());
                    }
                },
            }
        }
    }

    formatter.finish()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::Grammar;
    use std::io::Cursor;

    const TOKENIZER: &str = r#"
name = "tokenizer"
order = ["TOKENIZE"]

[[rules.TOKENIZE.rewrites]]
pattern = "[a-z]+"
output = 'tokens { name: "${0}" wordid: "${0}" } '

[[rules.TOKENIZE.rewrites]]
pattern = "[.] ?| "
"#;

    const VERBALIZER: &str = r#"
name = "verbalizer"
order = ["VERBALIZE"]
[rules.VERBALIZE]
passthrough = true
"#;

    fn normalizer() -> Normalizer {
        Normalizer::builder()
            .tokenizer(Grammar::from_toml_str(TOKENIZER).unwrap())
            .verbalizer(Grammar::from_toml_str(VERBALIZER).unwrap())
            .build()
            .unwrap()
    }

    fn run(input: &str, mode: InputMode, on_error: OnError) -> (CliResult<RunSummary>, String) {
        let normalizer = normalizer();
        let mut buffer = Vec::new();
        let result = {
            let mut formatter = TextFormatter::new(&mut buffer);
            normalize_stream(
                &normalizer,
                Cursor::new(input),
                mode,
                OutputFormat::Text,
                on_error,
                &mut formatter,
            )
        };
        (result, String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn test_single_line_inputs_are_split_and_normalized() {
        let (result, output) = run("een twee. drie\nvier\n", InputMode::SingleLine, OnError::Skip);
        assert_eq!(
            result.unwrap(),
            RunSummary {
                sentences: 3,
                skipped: 0
            }
        );
        assert_eq!(output, "een twee\ndrie\nvier\n");
    }

    #[test]
    fn test_multi_line_input_is_joined_before_splitting() {
        let (result, output) = run("een\ntwee. drie\n", InputMode::MultiLine, OnError::Skip);
        assert_eq!(result.unwrap().sentences, 2);
        assert_eq!(output, "een twee\ndrie\n");
    }

    #[test]
    fn test_failing_sentence_is_skipped() {
        let (result, output) = run("een\nEEN\ntwee\n", InputMode::SingleLine, OnError::Skip);
        assert_eq!(
            result.unwrap(),
            RunSummary {
                sentences: 3,
                skipped: 1
            }
        );
        assert_eq!(output, "een\ntwee\n");
    }

    #[test]
    fn test_malformed_line_fails_alone() {
        let normalizer = normalizer();
        let mut buffer = Vec::new();
        let summary = {
            let mut formatter = TextFormatter::new(&mut buffer);
            normalize_stream(
                &normalizer,
                Cursor::new(&b"een\n\xff\xfe twee\ndrie\n"[..]),
                InputMode::SingleLine,
                OutputFormat::Text,
                OnError::Skip,
                &mut formatter,
            )
            .unwrap()
        };
        assert_eq!(
            summary,
            RunSummary {
                sentences: 3,
                skipped: 1
            }
        );
        assert_eq!(String::from_utf8(buffer).unwrap(), "een\ndrie\n");
    }

    #[test]
    fn test_failing_sentence_aborts_after_flushing_earlier_output() {
        let (result, output) = run("een\nEEN\ntwee\n", InputMode::SingleLine, OnError::Abort);
        let err = result.unwrap_err();
        match err.downcast_ref::<CliError>() {
            Some(CliError::SentenceFailed { sentence, .. }) => assert_eq!(sentence, "EEN"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(output, "een\n");
    }
}
