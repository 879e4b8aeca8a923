/// Longest run of capitals still treated as a ticker.
pub const MAX_TICKER_LEN: usize = 5;

/// Common English words and auxiliaries that collide with real symbols.
pub const STOP_WORDS: &[&str] = &[
    "A", "I", "THE", "IN", "ON", "AT", "TO", "FOR", "OF", "AND", "OR", "BUT", "IS", "ARE", "WAS",
    "WERE", "BE", "BEEN", "BEING", "HAVE", "HAS", "HAD", "DO", "DOES", "DID", "WILL", "WOULD",
    "SHALL", "SHOULD", "MAY", "MIGHT", "MUST", "CAN", "COULD", "GET", "GOT", "GETS", "GETTING",
];

/// A candidate symbol located by byte offsets inside one text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}')
}

/// Find ticker-shaped tokens in `text`, left to right.
pub fn find_tickers<F>(text: &str, is_stop_word: F) -> Vec<TickerMatch>
where
    F: Fn(&str) -> bool,
{
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut matches = Vec::new();
    let mut idx = 0;

    while idx < chars.len() {
        if !chars[idx].1.is_ascii_uppercase() {
            idx += 1;
            continue;
        }

        let start = idx;
        while idx < chars.len() && chars[idx].1.is_ascii_uppercase() {
            idx += 1;
        }
        let end = idx;

        if end - start > MAX_TICKER_LEN {
            continue;
        }

        let before = start.checked_sub(1).map(|pos| chars[pos].1);
        let after = chars.get(end).map(|&(_, ch)| ch);
        let after_next = chars.get(end + 1).map(|&(_, ch)| ch);

        if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
            continue;
        }
        if before == Some('.') || after == Some('.') {
            continue;
        }
        // Possessives and contractions ("NASA's") glue the run to lowercase text.
        if after.is_some_and(is_apostrophe) && after_next.is_some_and(char::is_lowercase) {
            continue;
        }

        let start_byte = chars[start].0;
        let end_byte = chars.get(end).map_or(text.len(), |&(pos, _)| pos);
        let token = &text[start_byte..end_byte];
        if is_stop_word(token) {
            continue;
        }

        matches.push(TickerMatch {
            text: token.to_string(),
            start: start_byte,
            end: end_byte,
        });
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_stop_word(token: &str) -> bool {
        STOP_WORDS.contains(&token)
    }

    fn symbols(text: &str) -> Vec<String> {
        find_tickers(text, default_stop_word)
            .into_iter()
            .map(|m| m.text)
            .collect()
    }

    #[test]
    fn finds_symbols_between_lowercase_words() {
        let matches = find_tickers("AAPL rose 2% as GOOGL fell", default_stop_word);
        assert_eq!(
            matches,
            vec![
                TickerMatch {
                    text: "AAPL".to_string(),
                    start: 0,
                    end: 4
                },
                TickerMatch {
                    text: "GOOGL".to_string(),
                    start: 16,
                    end: 21
                },
            ]
        );
    }

    #[test]
    fn skips_stop_words() {
        assert!(symbols("GET").is_empty());
        assert!(symbols("I think IS and A are words").is_empty());
        assert_eq!(symbols("GET MSFT now"), vec!["MSFT"]);
    }

    #[test]
    fn rejects_runs_embedded_in_words() {
        assert!(symbols("McDONALD").is_empty());
        assert!(symbols("iPHONE sales").is_empty());
        assert!(symbols("ABCDEF is too long").is_empty());
        assert!(symbols("model X1 and B2B").is_empty());
        assert!(symbols("snake_CASE").is_empty());
    }

    #[test]
    fn rejects_period_adjacent_runs() {
        assert!(symbols("the U.S. economy").is_empty());
        assert!(symbols("end of TSLA.").is_empty());
        assert!(symbols(".NET developers").is_empty());
    }

    #[test]
    fn rejects_possessive_glued_to_lowercase() {
        assert!(symbols("NASA's budget").is_empty());
        assert!(symbols("IBM\u{2019}s results").is_empty());
        assert_eq!(symbols("'AMD' shares"), vec!["AMD"]);
    }

    #[test]
    fn offsets_are_bytes_in_unicode_text() {
        let text = "€ gains: NVDA, AMD";
        let matches = find_tickers(text, default_stop_word);
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert_eq!(&text[m.start..m.end], m.text);
        }
    }

    #[test]
    fn punctuation_bounds_are_accepted() {
        assert_eq!(symbols("(TSLA), \"META\"; AMZN!"), vec!["TSLA", "META", "AMZN"]);
    }
}
