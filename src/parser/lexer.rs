//! Lexer for course queries
//!
//! Splits a query into whitespace-delimited tokens. Punctuation stays
//! attached to the word it follows; the grammar decides what it means.
//! Every token keeps its byte span so quoted literals can be recovered
//! from the source with their internal spacing intact.

use std::ops::Range;

/// A whitespace-delimited slice of the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token text
    pub text: &'a str,
    /// Byte range in the source
    pub span: Range<usize>,
}

impl<'a> Token<'a> {
    pub fn new(text: &'a str, span: Range<usize>) -> Self {
        Self { text, span }
    }

    /// Returns the token without a trailing `punct`, or `None` if it does
    /// not end with `punct`.
    pub fn strip_suffix(&self, punct: char) -> Option<Token<'a>> {
        let text = self.text.strip_suffix(punct)?;
        Some(Token {
            text,
            span: self.span.start..self.span.end - punct.len_utf8(),
        })
    }

    /// Splits off a trailing clause separator (`,` `;` `.`).
    pub fn split_punct(&self) -> (Token<'a>, Option<char>) {
        for punct in [',', ';', '.'] {
            if let Some(stripped) = self.strip_suffix(punct) {
                return (stripped, Some(punct));
            }
        }
        (self.clone(), None)
    }
}

/// Tokenizes a query string.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in source.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token::new(&source[s..idx], s..idx));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }

    if let Some(s) = start {
        tokens.push(Token::new(&source[s..], s..source.len()));
    }

    tokens
}

/// Counts double quotes not preceded by an escaping backslash.
pub fn unescaped_quotes(text: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            count += 1;
        }
    }
    count
}

/// True if the last character of `text` is an unescaped double quote.
pub fn ends_with_unescaped_quote(text: &str) -> bool {
    let mut escaped = false;
    let mut closing = false;
    for ch in text.chars() {
        closing = ch == '"' && !escaped;
        escaped = !escaped && ch == '\\';
    }
    closing
}
