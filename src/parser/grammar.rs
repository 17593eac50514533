//! Query grammar validator
//!
//! Recursive descent over the token stream, one step per clause:
//!
//! ```text
//! In courses dataset <id>, find all entries; show <display>.
//! In courses dataset <id>, find entries whose <filter>; show <display>[; sort in ascending order by <field>].
//! ```
//!
//! The first violated clause aborts the parse.

use crate::schema::Field;

use super::ast::{FilterExpr, Query, SortSpec};
use super::errors::{Clause, ParseError, ParseResult};
use super::filter::FilterBuilder;
use super::lexer::{tokenize, unescaped_quotes, Token};

/// Words that may not be used as a dataset id
pub const RESERVED_WORDS: [&str; 28] = [
    "In", "dataset", "find", "all", "show", "and", "or", "sort", "by", "entries", "is", "the",
    "of", "whose", "not", "greater", "than", "less", "equal", "to", "includes", "does", "include",
    "begins", "with", "begin", "ends", "end",
];

/// Checks a dataset id: non-empty, no `*` or `_`, not a reserved word.
pub fn validate_dataset_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("Dataset id must not be empty".to_string());
    }
    if id.contains('*') || id.contains('_') {
        return Err(format!("Dataset id '{}' may not contain '*' or '_'", id));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(format!("Dataset id '{}' may not contain whitespace", id));
    }
    if RESERVED_WORDS.contains(&id) {
        return Err(format!("Dataset id '{}' is a reserved word", id));
    }
    Ok(())
}

/// Entry point for query parsing
pub struct QueryParser;

impl QueryParser {
    /// Parses a query sentence into a `Query`
    pub fn parse(source: &str) -> ParseResult<Query> {
        let tokens = tokenize(source);
        let mut cursor = Cursor::new(&tokens);

        let dataset_id = cursor.dataset_clause()?;
        let filter = cursor.filter_clause(source)?;
        let (display, order_follows) = cursor.display_clause()?;
        let sort = if order_follows {
            Some(cursor.order_clause()?)
        } else {
            None
        };
        cursor.terminator()?;

        Query::new(dataset_id, filter, display, sort)
    }
}

/// Position within the token stream
struct Cursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Cursor<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn expect_word(&mut self, clause: Clause, word: &str) -> ParseResult<()> {
        match self.next() {
            Some(token) if token.text == word => Ok(()),
            other => Err(ParseError::unexpected(
                clause,
                &format!("'{}'", word),
                other.map(|t| t.text),
            )),
        }
    }

    /// `In courses dataset <id>,`
    fn dataset_clause(&mut self) -> ParseResult<String> {
        self.expect_word(Clause::Dataset, "In")?;
        self.expect_word(Clause::Dataset, "courses")?;
        self.expect_word(Clause::Dataset, "dataset")?;

        let token = self.next().ok_or_else(|| {
            ParseError::unexpected(Clause::Dataset, "a dataset id", None)
        })?;
        let id = token.strip_suffix(',').ok_or_else(|| {
            ParseError::unexpected(Clause::Dataset, "dataset id followed by ','", Some(token.text))
        })?;

        validate_dataset_id(id.text)
            .map_err(|reason| ParseError::malformed(Clause::Dataset, reason).with_token(id.text))?;

        Ok(id.text.to_string())
    }

    /// `find all entries;` or `find entries whose <filter>;`
    fn filter_clause(&mut self, source: &str) -> ParseResult<FilterExpr> {
        self.expect_word(Clause::Filter, "find")?;

        match self.next().map(|t| t.text) {
            Some("all") => {
                self.expect_word(Clause::Filter, "entries;")?;
                Ok(FilterExpr::All)
            }
            Some("entries") => {
                self.expect_word(Clause::Filter, "whose")?;
                let clause_tokens = self.take_filter_tokens()?;
                FilterBuilder::new(&clause_tokens, source).build()
            }
            other => Err(ParseError::unexpected(
                Clause::Filter,
                "'all entries;' or 'entries whose'",
                other,
            )),
        }
    }

    /// Collects filter tokens up to the first `;` outside a quoted literal.
    /// The `;` itself is dropped.
    fn take_filter_tokens(&mut self) -> ParseResult<Vec<Token<'a>>> {
        let mut collected = Vec::new();
        let mut in_literal = false;

        while let Some(token) = self.next() {
            if unescaped_quotes(token.text) % 2 == 1 {
                in_literal = !in_literal;
            }

            if !in_literal {
                if let Some(stripped) = token.strip_suffix(';') {
                    if !stripped.text.is_empty() {
                        collected.push(stripped);
                    }
                    return Ok(collected);
                }
            }
            collected.push(token.clone());
        }

        Err(ParseError::malformed(
            Clause::Filter,
            "Filter clause must end with ';'",
        ))
    }

    /// `show <field>(, [and] <field>)*` ending in `.` or `;`.
    ///
    /// Returns the fields and whether an order clause follows.
    fn display_clause(&mut self) -> ParseResult<(Vec<Field>, bool)> {
        self.expect_word(Clause::Display, "show")?;

        let mut fields = Vec::new();
        let mut saw_and = false;

        loop {
            let token = self
                .next()
                .ok_or_else(|| ParseError::unexpected(Clause::Display, "a display field", None))?;

            if token.text == "and" {
                if fields.is_empty() || saw_and {
                    return Err(ParseError::unexpected(
                        Clause::Display,
                        "a display field",
                        Some(token.text),
                    ));
                }
                saw_and = true;
                continue;
            }

            let (word, punct) = token.split_punct();
            let field = Field::from_name(word.text)
                .ok_or_else(|| ParseError::unknown_field(Clause::Display, word.text))?;
            fields.push(field);

            match punct {
                Some(',') => saw_and = false,
                Some(end) => {
                    if fields.len() > 1 && !saw_and {
                        return Err(ParseError::malformed(
                            Clause::Display,
                            "The last display field must be preceded by 'and'",
                        )
                        .with_token(token.text));
                    }
                    return Ok((fields, end == ';'));
                }
                None if self.at_end() => {
                    return Err(ParseError::malformed(
                        Clause::Terminator,
                        "Query must end with '.'",
                    ))
                }
                None => {
                    return Err(ParseError::unexpected(
                        Clause::Display,
                        "',' after display field",
                        self.peek().map(|t| t.text),
                    ))
                }
            }
        }
    }

    /// `sort in ascending order by <field>.`
    fn order_clause(&mut self) -> ParseResult<SortSpec> {
        for word in ["sort", "in", "ascending", "order", "by"] {
            self.expect_word(Clause::Order, word)?;
        }

        let token = self
            .next()
            .ok_or_else(|| ParseError::unexpected(Clause::Order, "a sort field", None))?;
        let (word, punct) = token.split_punct();

        let field = Field::from_name(word.text)
            .ok_or_else(|| ParseError::unknown_field(Clause::Order, word.text))?;

        match punct {
            Some('.') => Ok(SortSpec::asc(field)),
            None if self.at_end() => Err(ParseError::malformed(
                Clause::Terminator,
                "Query must end with '.'",
            )),
            _ => Err(ParseError::unexpected(
                Clause::Order,
                "sort field followed by '.'",
                Some(token.text),
            )),
        }
    }

    fn terminator(&mut self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::malformed(
                Clause::Terminator,
                "Unexpected text after the final '.'",
            )
            .with_token(token.text)),
        }
    }
}
