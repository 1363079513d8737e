//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error on line {line}: {message}\n\n{snippet}")]
    Config {
        line: usize,
        message: String,
        snippet: String,
    },

    #[error("no primary data source configured")]
    NoPrimary,

    #[error("more than one primary data source: {0:?}")]
    MultiplePrimaries(Vec<String>),

    #[error("data source \"{0}\" is configured more than once")]
    DuplicateDataSource(String),

    #[error("data source name can't be empty")]
    EmptyName,
}

impl Error {
    /// Point at the line in the config file that failed to parse.
    pub fn config(source: &str, err: toml::de::Error) -> Self {
        let span = err.span().unwrap_or(0..0);
        let line = source[..span.start.min(source.len())]
            .chars()
            .filter(|c| *c == '\n')
            .count()
            + 1;
        let snippet = source
            .lines()
            .nth(line - 1)
            .map(|l| l.to_string())
            .unwrap_or_default();

        Self::Config {
            line,
            message: err.message().to_string(),
            snippet,
        }
    }
}
