//! Search-index tokenizer.
//!
//! Turns a URL or a link name into the comma-separated token string stored
//! in the `pieces` field of a token document. Every word contributes all of
//! its prefixes and all of its contiguous substrings, which makes both prefix
//! and infix lookups an exact token match on the index side.

/// Maximum length, in characters, of a tokenized field.
///
/// Matches the per-field size limit of the index backend.
pub const MAX_PIECES_LEN: usize = 1_048_000;

/// Substrings removed from the input before it is split into words.
///
/// Applied in this order, each one removed everywhere it occurs.
pub const DENYLIST: [&str; 23] = [
    "http://", "https://", "mailto://", ".", "/", ".com", ".net", ".gov", ".org", ".edu", "html",
    "htm", "asp", "%20", "?", "!", "&", "=", "-", "#", "%", "~", "_",
];

const SEPARATOR: char = ',';

/// Removes every [`DENYLIST`] entry from `text`.
pub fn strip_denylist(text: &str) -> String {
    let mut cleaned = text.to_string();
    for entry in DENYLIST {
        if cleaned.contains(entry) {
            cleaned = cleaned.replace(entry, "");
        }
    }
    cleaned
}

/// Iterates over the tokens of `text` in emission order.
///
/// For each word and each length `n` from 1 to the word length, yields the
/// prefix of length `n` followed by every substring of length `n` from left
/// to right. Duplicates are kept.
pub fn tokens(text: &str) -> Tokens {
    Tokens {
        words: strip_denylist(text)
            .split_whitespace()
            .map(|w| w.chars().collect())
            .collect(),
        word: 0,
        cursor: 1,
        start: None,
    }
}

/// Iterator returned by [`tokens`].
#[derive(Debug, Clone)]
pub struct Tokens {
    words: Vec<Vec<char>>,
    word: usize,
    cursor: usize,
    // None: the prefix for `cursor` has not been emitted yet.
    start: Option<usize>,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let chars = self.words.get(self.word)?;
            let len = chars.len();

            if self.cursor > len {
                self.word += 1;
                self.cursor = 1;
                self.start = None;
                continue;
            }

            match self.start {
                None => {
                    self.start = Some(0);
                    return Some(chars[..self.cursor].iter().collect());
                }
                Some(s) if s + self.cursor <= len => {
                    self.start = Some(s + 1);
                    return Some(chars[s..s + self.cursor].iter().collect());
                }
                Some(_) => {
                    self.cursor += 1;
                    self.start = None;
                }
            }
        }
    }
}

/// Tokenizes `text` into the delimited string stored by the index.
///
/// The result is cut at [`MAX_PIECES_LEN`] characters; a token cut in half by
/// the limit is kept as-is. Empty input yields an empty string.
pub fn pieces(text: &str) -> String {
    let mut out = String::new();
    let mut len = 0usize;

    for token in tokens(text) {
        if len > 0 {
            out.push(SEPARATOR);
            len += 1;
        }
        len += token.chars().count();
        out.push_str(&token);

        // Everything past the limit is discarded anyway.
        if len >= MAX_PIECES_LEN {
            break;
        }
    }

    if len > MAX_PIECES_LEN
        && let Some((cut, _)) = out.char_indices().nth(MAX_PIECES_LEN)
    {
        out.truncate(cut);
    }

    out
}

/// Splits a stored `pieces` string back into its tokens.
pub fn split_pieces(pieces: &str) -> impl Iterator<Item = &str> {
    pieces.split(SEPARATOR).filter(|t| !t.is_empty())
}
