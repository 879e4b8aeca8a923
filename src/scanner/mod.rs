use std::cell::RefCell;
use std::collections::HashSet;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::{sleep_until, Instant};

use crate::config::ScannerConfig;
use crate::dom::{Document, NodeId, NodeKind};

pub mod debounce;
pub mod lexer;

pub use debounce::{CoalescingTimer, DEFAULT_DEBOUNCE};
pub use lexer::{find_tickers, TickerMatch, MAX_TICKER_LEN, STOP_WORDS};

/// Subtrees whose text is never shown to the reader.
const SKIPPED_TAGS: &[&str] = &["script", "style"];

/// "Something changed under the watched root." Carries nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChanged;

/// Matches found in one text node during the collect phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRewrite {
    pub node: NodeId,
    pub matches: Vec<TickerMatch>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub text_nodes_rewritten: usize,
    pub markers_created: usize,
}

pub struct TickerScanner {
    stop_words: HashSet<String>,
    debounce: Duration,
}

impl Default for TickerScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl TickerScanner {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|word| word.to_string()).collect(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        let mut scanner = Self::new();
        scanner
            .stop_words
            .extend(config.extra_stop_words.iter().cloned());
        scanner.debounce = config.debounce;
        scanner
    }

    /// Quiet period [`TickerScanner::watch`] waits for before re-scanning.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Collect then rewrite. Already-marked text is left alone, so repeated scans are no-ops.
    pub fn scan(&self, document: &mut Document, root: NodeId) -> ScanReport {
        let pending = self.collect(document, root);
        let report = apply_rewrites(document, pending);
        if report.markers_created > 0 {
            log::debug!(
                "Scan wrapped {} tickers across {} text nodes",
                report.markers_created,
                report.text_nodes_rewritten
            );
        }
        report
    }

    /// Read-only pass: every visible, unmarked text node under `root` with at least one match.
    pub fn collect(&self, document: &Document, root: NodeId) -> Vec<PendingRewrite> {
        let mut pending = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            match document.kind(node) {
                NodeKind::Element(element) => {
                    if element.marker.is_some()
                        || SKIPPED_TAGS.contains(&element.tag.as_str())
                    {
                        continue;
                    }
                    stack.extend(document.children(node).iter().rev().copied());
                }
                NodeKind::Text(text) => {
                    let matches = find_tickers(text, |token| self.is_stop_word(token));
                    if !matches.is_empty() {
                        pending.push(PendingRewrite { node, matches });
                    }
                }
            }
        }

        pending
    }

    /// Re-scan `root` once per burst of change signals, after the debounce period of quiet.
    ///
    /// Returns the number of scan passes run. Ends when `changes` is exhausted; a burst
    /// still pending at that point gets its scan once its quiet period elapses.
    pub async fn watch<S>(
        &self,
        document: &RefCell<Document>,
        root: NodeId,
        mut changes: S,
    ) -> usize
    where
        S: Stream<Item = DocumentChanged> + Unpin,
    {
        let mut timer = CoalescingTimer::new(self.debounce);
        let mut passes = 0;

        loop {
            let deadline = timer.deadline();
            tokio::select! {
                change = changes.next() => match change {
                    Some(DocumentChanged) => timer.signal(Instant::now()),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if timer.fire_if_due(Instant::now()) {
                        self.scan(&mut document.borrow_mut(), root);
                        passes += 1;
                    }
                }
            }
        }

        if let Some(deadline) = timer.deadline() {
            sleep_until(deadline).await;
            timer.cancel();
            self.scan(&mut document.borrow_mut(), root);
            passes += 1;
        }

        passes
    }
}

fn apply_rewrites(document: &mut Document, pending: Vec<PendingRewrite>) -> ScanReport {
    let mut report = ScanReport::default();

    for PendingRewrite { node, matches } in pending {
        let Some(text) = document.text(node).map(str::to_string) else {
            continue;
        };

        let mut fragments = Vec::with_capacity(matches.len() * 2 + 1);
        let mut cursor = 0;
        for ticker in &matches {
            if ticker.start > cursor {
                fragments.push(document.create_text(&text[cursor..ticker.start]));
            }
            fragments.push(document.create_marker(&ticker.text));
            cursor = ticker.end;
        }
        if cursor < text.len() {
            fragments.push(document.create_text(&text[cursor..]));
        }

        if document.replace_with(node, &fragments) {
            report.text_nodes_rewritten += 1;
            report.markers_created += matches.len();
        } else {
            log::warn!("Text node {node:?} was detached before it could be rewritten");
        }
    }

    report
}
