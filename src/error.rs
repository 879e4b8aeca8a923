use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }
}

/// Diagnostic context attached to a failed quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub symbol: String,
    pub request_target: String,
}

/// Failure of a single quote lookup, from the HTTP call up to the page boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    /// Transport failure or a non-success HTTP status.
    #[error("{message}")]
    Network {
        message: String,
        details: Option<ErrorDetails>,
    },
    /// The payload arrived but is structurally wrong or incomplete.
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<ErrorDetails>,
    },
    /// The request or its reply could not cross the boundary channel.
    #[error("{message}")]
    Boundary {
        message: String,
        details: Option<ErrorDetails>,
    },
}

impl QuoteError {
    pub fn network<T: Into<String>>(msg: T) -> Self {
        QuoteError::Network {
            message: msg.into(),
            details: None,
        }
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        QuoteError::Validation {
            message: msg.into(),
            details: None,
        }
    }

    pub fn boundary<T: Into<String>>(msg: T) -> Self {
        QuoteError::Boundary {
            message: msg.into(),
            details: None,
        }
    }

    /// Attach `{symbol, requestTarget}`, replacing whatever was there before.
    pub fn with_details(mut self, symbol: &str, request_target: &str) -> Self {
        let slot = match &mut self {
            QuoteError::Network { details, .. }
            | QuoteError::Validation { details, .. }
            | QuoteError::Boundary { details, .. } => details,
        };
        *slot = Some(ErrorDetails {
            symbol: symbol.to_string(),
            request_target: request_target.to_string(),
        });
        self
    }

    pub fn message(&self) -> &str {
        match self {
            QuoteError::Network { message, .. }
            | QuoteError::Validation { message, .. }
            | QuoteError::Boundary { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            QuoteError::Network { details, .. }
            | QuoteError::Validation { details, .. }
            | QuoteError::Boundary { details, .. } => details.as_ref(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, QuoteError::Validation { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, QuoteError::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_survive_display() {
        let err = QuoteError::validation("Insufficient price data available")
            .with_details("AAPL", "https://example.test/chart/AAPL");

        assert_eq!(err.to_string(), "Insufficient price data available");
        let details = err.details().expect("details attached");
        assert_eq!(details.symbol, "AAPL");
        assert_eq!(details.request_target, "https://example.test/chart/AAPL");
        assert!(err.is_validation());
    }

    #[test]
    fn client_build_errors_keep_their_source() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("relative url is rejected");

        assert!(matches!(AppError::from(err), AppError::Reqwest(_)));
    }
}
