//! Shared application context and the CLI error taxonomy.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use atelier_client::{ApiClient, ClientError};
use atelier_console::ActionError;
use url::Url;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ActionError> for CliError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Validation(message) => Self::validation(message),
            ActionError::Conflict => Self::validation(
                "the entity changed on the server; refresh and retry",
            ),
            ActionError::AlreadyInProgress => {
                Self::validation("another action for this entity is still in flight")
            }
            ActionError::NotFound => Self::failure(anyhow!("entity not found")),
            ActionError::Timeout => Self::failure(anyhow!("request timed out")),
            ActionError::Network(message) => Self::failure(anyhow!(message)),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::failure(err)
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: ApiClient,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the context from global CLI options.
    pub(crate) fn new(
        api_url: Url,
        api_key: Option<String>,
        timeout_secs: u64,
        trace_id: &str,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let mut builder = ApiClient::builder(api_url)
            .timeout(Duration::from_secs(timeout_secs))
            .request_id(trace_id);
        if let Some(key) = api_key {
            let trimmed = key.trim();
            if trimmed.is_empty() {
                return Err(CliError::validation("API key cannot be an empty string"));
            }
            builder = builder.api_key(trimmed);
        }
        Ok(Self {
            client: builder.build()?,
            output,
        })
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
