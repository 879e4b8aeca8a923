use std::collections::HashMap;

use crate::gateway::{ErrorEnvelope, QuoteSource};
use crate::records::QuoteRecord;

pub mod position;
pub mod render;
pub mod sparkline;

pub use position::{place, Placement, Rect, Size, Viewport};
pub use render::{render_error_html, render_loading_html, render_quote_html, render_quote_text};
pub use sparkline::{render_sparkline, sparkline_points};

pub const DEFAULT_TOOLTIP_SIZE: Size = Size {
    width: 280.0,
    height: 220.0,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipState {
    Hidden,
    Loading { symbol: String },
    Shown { symbol: String },
    Error { symbol: String, message: String },
}

/// Identifies one hover; results carrying an outdated ticket are never rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTicket {
    generation: u64,
    symbol: String,
}

impl HoverTicket {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// Page-side tooltip: one visible at a time, plus a page-lifetime quote cache.
pub struct TooltipController {
    state: TooltipState,
    generation: u64,
    placement: Option<Placement>,
    content: String,
    local: HashMap<String, QuoteRecord>,
    tooltip_size: Size,
}

impl Default for TooltipController {
    fn default() -> Self {
        Self::new()
    }
}

impl TooltipController {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_TOOLTIP_SIZE)
    }

    pub fn with_size(tooltip_size: Size) -> Self {
        Self {
            state: TooltipState::Hidden,
            generation: 0,
            placement: None,
            content: String::new(),
            local: HashMap::new(),
            tooltip_size,
        }
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != TooltipState::Hidden
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn local_data(&self, symbol: &str) -> Option<&QuoteRecord> {
        self.local.get(symbol)
    }

    /// Show the loading placeholder next to `anchor` and start a new hover.
    pub fn hover_enter(&mut self, symbol: &str, anchor: Rect, viewport: Viewport) -> HoverTicket {
        self.generation += 1;
        self.placement = Some(place(anchor, self.tooltip_size, viewport));
        self.content = render_loading_html();
        self.state = TooltipState::Loading {
            symbol: symbol.to_string(),
        };

        HoverTicket {
            generation: self.generation,
            symbol: symbol.to_string(),
        }
    }

    /// Deliver the outcome of a hover's lookup. Returns whether it was rendered.
    ///
    /// Successful data is kept locally even when the hover it belongs to has ended.
    pub fn complete(
        &mut self,
        ticket: &HoverTicket,
        outcome: Result<QuoteRecord, ErrorEnvelope>,
    ) -> bool {
        if let Ok(record) = &outcome {
            self.local.insert(ticket.symbol.clone(), record.clone());
        }

        let current = ticket.generation == self.generation
            && matches!(&self.state, TooltipState::Loading { symbol } if *symbol == ticket.symbol);
        if !current {
            log::debug!("Discarding stale result for {}", ticket.symbol);
            return false;
        }

        match outcome {
            Ok(record) => {
                self.content = render_quote_html(&record);
                self.state = TooltipState::Shown {
                    symbol: ticket.symbol.clone(),
                };
            }
            Err(envelope) => {
                log::warn!("Quote for {} failed: {}", ticket.symbol, envelope.message());
                self.content = render_error_html(envelope.message(), &ticket.symbol);
                self.state = TooltipState::Error {
                    symbol: ticket.symbol.clone(),
                    message: envelope.error,
                };
            }
        }
        true
    }

    pub fn hover_leave(&mut self) {
        self.generation += 1;
        self.state = TooltipState::Hidden;
        self.placement = None;
        self.content.clear();
    }

    /// Enter, resolve (local cache first, then `source`) and render in one go.
    pub async fn hover<S>(
        &mut self,
        source: &S,
        symbol: &str,
        anchor: Rect,
        viewport: Viewport,
    ) -> &TooltipState
    where
        S: QuoteSource + ?Sized,
    {
        let ticket = self.hover_enter(symbol, anchor, viewport);
        let outcome = match self.local_data(symbol) {
            Some(record) => Ok(record.clone()),
            None => source.get_stock_data(symbol).await,
        };
        self.complete(&ticket, outcome);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::sample_record;
    use crate::error::ErrorDetails;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ANCHOR: Rect = Rect {
        left: 100.0,
        top: 100.0,
        width: 40.0,
        height: 16.0,
    };
    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 720.0,
        scroll_x: 0.0,
        scroll_y: 0.0,
    };

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl QuoteSource for CountingSource {
        async fn get_stock_data(&self, symbol: &str) -> Result<QuoteRecord, ErrorEnvelope> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ErrorEnvelope {
                    error: "Quote fetch failed: 404".to_string(),
                    details: Some(ErrorDetails {
                        symbol: symbol.to_string(),
                        request_target: "GET_STOCK_DATA".to_string(),
                    }),
                })
            } else {
                Ok(sample_record(symbol, 42.0))
            }
        }
    }

    #[test]
    fn enter_shows_loading_at_placement() {
        let mut controller = TooltipController::new();
        let ticket = controller.hover_enter("AAPL", ANCHOR, VIEWPORT);

        assert_eq!(ticket.symbol(), "AAPL");
        assert_eq!(
            controller.state(),
            &TooltipState::Loading {
                symbol: "AAPL".to_string()
            }
        );
        assert!(controller.content().contains("Loading"));
        assert_eq!(
            controller.placement(),
            Some(Placement {
                left: 100.0,
                top: 121.0
            })
        );
    }

    #[test]
    fn late_result_after_leave_is_not_rendered() {
        let mut controller = TooltipController::new();
        let ticket = controller.hover_enter("AAPL", ANCHOR, VIEWPORT);
        controller.hover_leave();

        let rendered = controller.complete(&ticket, Ok(sample_record("AAPL", 42.0)));

        assert!(!rendered);
        assert_eq!(controller.state(), &TooltipState::Hidden);
        assert!(controller.content().is_empty());
        assert!(controller.local_data("AAPL").is_some());
    }

    #[test]
    fn result_for_previous_symbol_is_not_rendered() {
        let mut controller = TooltipController::new();
        let stale = controller.hover_enter("AAPL", ANCHOR, VIEWPORT);
        controller.hover_leave();
        let _current = controller.hover_enter("MSFT", ANCHOR, VIEWPORT);

        assert!(!controller.complete(&stale, Ok(sample_record("AAPL", 42.0))));
        assert_eq!(
            controller.state(),
            &TooltipState::Loading {
                symbol: "MSFT".to_string()
            }
        );
    }

    #[tokio::test]
    async fn local_cache_avoids_second_request() {
        let source = CountingSource::default();
        let mut controller = TooltipController::new();

        controller.hover(&source, "NVDA", ANCHOR, VIEWPORT).await;
        controller.hover_leave();
        let state = controller.hover(&source, "NVDA", ANCHOR, VIEWPORT).await;

        assert_eq!(
            state,
            &TooltipState::Shown {
                symbol: "NVDA".to_string()
            }
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(controller.content().contains("$42.00"));
    }

    #[tokio::test]
    async fn failure_renders_message_and_symbol() {
        let source = CountingSource {
            fail: true,
            ..CountingSource::default()
        };
        let mut controller = TooltipController::new();

        let state = controller.hover(&source, "ZZZZ", ANCHOR, VIEWPORT).await.clone();

        assert_eq!(
            state,
            TooltipState::Error {
                symbol: "ZZZZ".to_string(),
                message: "Quote fetch failed: 404".to_string()
            }
        );
        assert!(controller.content().contains("Quote fetch failed: 404"));
        assert!(controller.content().contains("ZZZZ"));
        assert!(controller.local_data("ZZZZ").is_none());
    }

    #[test]
    fn leave_hides_from_any_state() {
        let mut controller = TooltipController::new();
        let ticket = controller.hover_enter("AMD", ANCHOR, VIEWPORT);
        controller.complete(&ticket, Ok(sample_record("AMD", 100.0)));
        assert!(controller.is_visible());

        controller.hover_leave();

        assert!(!controller.is_visible());
        assert_eq!(controller.placement(), None);
    }
}
