use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::{ErrorDetails, QuoteError};
use crate::records::QuoteRecord;

pub const DEFAULT_ERROR_MESSAGE: &str = "Error loading data";

/// Page -> background request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryRequest {
    #[serde(rename = "GET_STOCK_DATA")]
    GetStockData { symbol: String },
}

/// Failure shape delivered to the page, whatever layer the failure came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ErrorEnvelope {
    pub fn message(&self) -> &str {
        &self.error
    }

    fn with_symbol(mut self, symbol: &str) -> Self {
        if self.details.is_none() {
            self.details = Some(ErrorDetails {
                symbol: symbol.to_string(),
                request_target: "GET_STOCK_DATA".to_string(),
            });
        }
        self
    }
}

impl From<&QuoteError> for ErrorEnvelope {
    fn from(err: &QuoteError) -> Self {
        let message = err.message().trim();
        ErrorEnvelope {
            error: if message.is_empty() {
                DEFAULT_ERROR_MESSAGE.to_string()
            } else {
                message.to_string()
            },
            details: err.details().cloned(),
        }
    }
}

impl From<QuoteError> for ErrorEnvelope {
    fn from(err: QuoteError) -> Self {
        ErrorEnvelope::from(&err)
    }
}

/// Background -> page reply, `{success: true, data}` or `{success: false, error, details?}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResponse", try_from = "WireResponse")]
pub enum BoundaryResponse {
    Success(QuoteRecord),
    Failure(ErrorEnvelope),
}

impl BoundaryResponse {
    pub fn into_result(self) -> Result<QuoteRecord, ErrorEnvelope> {
        match self {
            BoundaryResponse::Success(record) => Ok(record),
            BoundaryResponse::Failure(envelope) => Err(envelope),
        }
    }
}

impl From<Result<QuoteRecord, QuoteError>> for BoundaryResponse {
    fn from(outcome: Result<QuoteRecord, QuoteError>) -> Self {
        match outcome {
            Ok(record) => BoundaryResponse::Success(record),
            Err(err) => BoundaryResponse::Failure(ErrorEnvelope::from(&err)),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<QuoteRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<ErrorDetails>,
}

impl From<BoundaryResponse> for WireResponse {
    fn from(response: BoundaryResponse) -> Self {
        match response {
            BoundaryResponse::Success(record) => WireResponse {
                success: true,
                data: Some(record),
                error: None,
                details: None,
            },
            BoundaryResponse::Failure(envelope) => WireResponse {
                success: false,
                data: None,
                error: Some(envelope.error),
                details: envelope.details,
            },
        }
    }
}

impl TryFrom<WireResponse> for BoundaryResponse {
    type Error = String;

    fn try_from(wire: WireResponse) -> Result<Self, Self::Error> {
        match (wire.success, wire.data) {
            (true, Some(record)) => Ok(BoundaryResponse::Success(record)),
            (true, None) => Err("successful response is missing `data`".to_string()),
            (false, _) => Ok(BoundaryResponse::Failure(ErrorEnvelope {
                error: wire
                    .error
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
                details: wire.details,
            })),
        }
    }
}

/// One in-flight request together with the slot its reply goes to.
#[derive(Debug)]
pub struct BoundaryMessage {
    pub request: BoundaryRequest,
    pub reply: oneshot::Sender<BoundaryResponse>,
}

pub type BoundaryReceiver = mpsc::Receiver<BoundaryMessage>;

/// Page-side handle onto the background context.
#[derive(Debug, Clone)]
pub struct BoundaryClient {
    tx: mpsc::Sender<BoundaryMessage>,
}

pub fn boundary_channel(capacity: usize) -> (BoundaryClient, BoundaryReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (BoundaryClient { tx }, rx)
}

impl BoundaryClient {
    /// Deliver a request and wait for its reply; channel failures become boundary errors.
    pub async fn send(&self, request: BoundaryRequest) -> Result<BoundaryResponse, QuoteError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(BoundaryMessage { request, reply })
            .await
            .map_err(|_| QuoteError::boundary("Could not reach the background context"))?;

        response
            .await
            .map_err(|_| QuoteError::boundary("Background context dropped the request"))
    }
}

/// Where the page gets quote data from.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn get_stock_data(&self, symbol: &str) -> Result<QuoteRecord, ErrorEnvelope>;
}

#[async_trait]
impl QuoteSource for BoundaryClient {
    async fn get_stock_data(&self, symbol: &str) -> Result<QuoteRecord, ErrorEnvelope> {
        let request = BoundaryRequest::GetStockData {
            symbol: symbol.to_string(),
        };
        match self.send(request).await {
            Ok(response) => response.into_result(),
            Err(err) => {
                log::error!("Boundary failure for {symbol}: {err}");
                Err(ErrorEnvelope::from(&err).with_symbol(symbol))
            }
        }
    }
}
