//! Filter expression builder
//!
//! Turns the tokens of a filter clause (between `whose` and the closing
//! `;`) into AND-groups joined by OR, then folds them into a `FilterExpr`.
//! Any failure aborts the whole expression; no partial groups escape.

use crate::schema::{Field, FieldKind};

use super::ast::{FilterExpr, NumericOp, Predicate, TextOp};
use super::errors::{ParseError, ParseResult};
use super::lexer::{ends_with_unescaped_quote, Token};

/// Builds a filter expression from clause tokens
pub struct FilterBuilder<'a> {
    tokens: &'a [Token<'a>],
    source: &'a str,
    pos: usize,
}

impl<'a> FilterBuilder<'a> {
    /// `source` is the full query the token spans index into.
    pub fn new(tokens: &'a [Token<'a>], source: &'a str) -> Self {
        Self {
            tokens,
            source,
            pos: 0,
        }
    }

    /// Builds the folded filter expression
    pub fn build(mut self) -> ParseResult<FilterExpr> {
        let groups = self.build_groups()?;
        Ok(FilterExpr::from_groups(groups))
    }

    /// Builds the OR-of-AND groups. Every group is non-empty.
    pub fn build_groups(&mut self) -> ParseResult<Vec<Vec<Predicate>>> {
        if self.tokens.is_empty() {
            return Err(ParseError::invalid_filter("Filter expression is empty"));
        }

        let mut groups = Vec::new();
        let mut current = vec![self.parse_atom()?];

        while let Some(token) = self.next() {
            match token.text {
                "and" => current.push(self.parse_atom()?),
                "or" => {
                    groups.push(std::mem::take(&mut current));
                    current.push(self.parse_atom()?);
                }
                other => {
                    return Err(ParseError::invalid_filter(format!(
                        "Expected 'and' or 'or' between conditions, found '{}'",
                        other
                    ))
                    .with_token(other))
                }
            }
        }

        groups.push(current);
        Ok(groups)
    }

    fn next(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek_text(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|t| t.text)
    }

    fn expect_word(&mut self, word: &str) -> ParseResult<()> {
        match self.next() {
            Some(token) if token.text == word => Ok(()),
            Some(token) => Err(ParseError::invalid_filter(format!(
                "Expected '{}', found '{}'",
                word, token.text
            ))
            .with_token(token.text)),
            None => Err(ParseError::invalid_filter(format!(
                "Expected '{}', found end of filter",
                word
            ))),
        }
    }

    fn parse_atom(&mut self) -> ParseResult<Predicate> {
        let token = self
            .next()
            .ok_or_else(|| ParseError::invalid_filter("Connective must be followed by a condition"))?;

        let field = Field::from_name(token.text).ok_or_else(|| {
            ParseError::invalid_filter(format!("'{}' is not a known field", token.text))
                .with_token(token.text)
        })?;

        match field.kind() {
            FieldKind::Numeric => {
                let op = self.parse_numeric_op()?;
                let value = self.parse_number()?;
                Ok(Predicate::numeric(field, op, value))
            }
            FieldKind::Textual => {
                let op = self.parse_text_op()?;
                let value = self.parse_string()?;
                Ok(Predicate::text(field, op, value))
            }
        }
    }

    /// `is [not] equal to | greater than | less than`
    fn parse_numeric_op(&mut self) -> ParseResult<NumericOp> {
        self.expect_word("is")?;

        let negated = self.peek_text() == Some("not");
        if negated {
            self.pos += 1;
        }

        let relation = self.next().map(|t| t.text);
        let op = match (relation, negated) {
            (Some("equal"), false) => NumericOp::Eq,
            (Some("equal"), true) => NumericOp::NotEq,
            (Some("greater"), false) => NumericOp::Gt,
            (Some("greater"), true) => NumericOp::NotGt,
            (Some("less"), false) => NumericOp::Lt,
            (Some("less"), true) => NumericOp::NotLt,
            (other, _) => {
                return Err(ParseError::invalid_filter(format!(
                    "Expected 'equal to', 'greater than' or 'less than', found '{}'",
                    other.unwrap_or("end of filter")
                )))
            }
        };

        let joiner = if matches!(op, NumericOp::Eq | NumericOp::NotEq) {
            "to"
        } else {
            "than"
        };
        self.expect_word(joiner)?;

        Ok(op)
    }

    fn parse_number(&mut self) -> ParseResult<f64> {
        let token = self
            .next()
            .ok_or_else(|| ParseError::invalid_filter("Expected a number, found end of filter"))?;

        parse_decimal(token.text).ok_or_else(|| {
            ParseError::invalid_filter(format!("'{}' is not a number", token.text))
                .with_token(token.text)
        })
    }

    fn parse_text_op(&mut self) -> ParseResult<TextOp> {
        let token = self
            .next()
            .ok_or_else(|| ParseError::invalid_filter("Expected an operator, found end of filter"))?;

        match token.text {
            "is" => {
                if self.peek_text() == Some("not") {
                    self.pos += 1;
                    Ok(TextOp::IsNot)
                } else {
                    Ok(TextOp::Is)
                }
            }
            "includes" => Ok(TextOp::Includes),
            "begins" => {
                self.expect_word("with")?;
                Ok(TextOp::BeginsWith)
            }
            "ends" => {
                self.expect_word("with")?;
                Ok(TextOp::EndsWith)
            }
            "does" => {
                self.expect_word("not")?;
                match self.next().map(|t| t.text) {
                    Some("include") => Ok(TextOp::NotIncludes),
                    Some("begin") => {
                        self.expect_word("with")?;
                        Ok(TextOp::NotBeginsWith)
                    }
                    Some("end") => {
                        self.expect_word("with")?;
                        Ok(TextOp::NotEndsWith)
                    }
                    other => Err(ParseError::invalid_filter(format!(
                        "Expected 'include', 'begin with' or 'end with', found '{}'",
                        other.unwrap_or("end of filter")
                    ))),
                }
            }
            other => Err(ParseError::invalid_filter(format!(
                "'{}' is not a text operator",
                other
            ))
            .with_token(other)),
        }
    }

    /// A double-quoted literal spanning one or more tokens, closed by the
    /// first token ending in an unescaped quote.
    fn parse_string(&mut self) -> ParseResult<String> {
        let first = self
            .next()
            .ok_or_else(|| ParseError::invalid_filter("Expected a quoted string, found end of filter"))?;

        if !first.text.starts_with('"') {
            return Err(ParseError::invalid_filter(format!(
                "String literal must be double-quoted, found '{}'",
                first.text
            ))
            .with_token(first.text));
        }

        let start = first.span.start + 1;
        let mut last = first;
        // The opening quote cannot also close the literal.
        let mut closed = ends_with_unescaped_quote(&first.text[1..]);
        while !closed {
            last = self.next().ok_or_else(|| {
                ParseError::invalid_filter("Unterminated string literal").with_token(first.text)
            })?;
            closed = ends_with_unescaped_quote(last.text);
        }

        let end = last.span.end - 1;
        unescape_literal(&self.source[start..end])
    }
}

/// Parses `-?digits[.digits]` as an f64.
fn parse_decimal(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return None;
    }

    text.parse().ok()
}

/// Resolves `\"` and `\\` escapes; rejects `*` and unescaped quotes.
fn unescape_literal(raw: &str) -> ParseResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(esc @ ('"' | '\\')) => out.push(esc),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '"' => {
                return Err(ParseError::invalid_filter(
                    "String literal contains an unescaped quote",
                ))
            }
            '*' => {
                return Err(ParseError::invalid_filter(
                    "String literal may not contain '*'",
                ))
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::ParseErrorCode;

    fn groups(source: &str) -> ParseResult<Vec<Vec<Predicate>>> {
        let tokens = tokenize(source);
        FilterBuilder::new(&tokens, source).build_groups()
    }

    #[test]
    fn test_single_numeric_atom() {
        let g = groups("Average is greater than 90").unwrap();
        assert_eq!(
            g,
            vec![vec![Predicate::numeric(Field::Average, NumericOp::Gt, 90.0)]]
        );
    }

    #[test]
    fn test_negated_numeric_ops() {
        let g = groups("Pass is not less than 10 and Fail is not equal to -2.5").unwrap();
        assert_eq!(
            g,
            vec![vec![
                Predicate::numeric(Field::Pass, NumericOp::NotLt, 10.0),
                Predicate::numeric(Field::Fail, NumericOp::NotEq, -2.5),
            ]]
        );
    }

    #[test]
    fn test_every_text_operator() {
        let cases = [
            ("is", TextOp::Is),
            ("is not", TextOp::IsNot),
            ("includes", TextOp::Includes),
            ("does not include", TextOp::NotIncludes),
            ("begins with", TextOp::BeginsWith),
            ("does not begin with", TextOp::NotBeginsWith),
            ("ends with", TextOp::EndsWith),
            ("does not end with", TextOp::NotEndsWith),
        ];
        for (phrase, op) in cases {
            let source = format!("Title {} \"x\"", phrase);
            let g = groups(&source).unwrap();
            assert_eq!(g, vec![vec![Predicate::text(Field::Title, op, "x")]]);
        }
    }

    #[test]
    fn test_multi_token_literal_keeps_spacing() {
        let g = groups("Title is \"intro  to comp sci\" and Department is \"cpsc\"").unwrap();
        assert_eq!(
            g,
            vec![vec![
                Predicate::text(Field::Title, TextOp::Is, "intro  to comp sci"),
                Predicate::text(Field::Department, TextOp::Is, "cpsc"),
            ]]
        );
    }

    #[test]
    fn test_or_starts_new_group() {
        let g = groups(
            "Department is \"cpsc\" and Average is greater than 80 or Department is \"math\"",
        )
        .unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g[0].len(), 2);
        assert_eq!(g[1].len(), 1);
    }

    #[test]
    fn test_escaped_quote_in_literal() {
        let g = groups(r#"Title is "say \"hi\" now""#).unwrap();
        assert_eq!(
            g,
            vec![vec![Predicate::text(Field::Title, TextOp::Is, "say \"hi\" now")]]
        );
    }

    #[test]
    fn test_empty_literal() {
        let g = groups("Instructor is \"\"").unwrap();
        assert_eq!(g, vec![vec![Predicate::text(Field::Instructor, TextOp::Is, "")]]);
    }

    #[test]
    fn test_rejections() {
        let bad = [
            "",
            "and Average is equal to 1",
            "Average is equal to 1 and",
            "Average is equal to 1 or",
            "Average is equal to 1 Pass is equal to 2",
            "Year is equal to 2015",
            "Average is equal 1",
            "Average equals 1",
            "Average is equal to ninety",
            "Average is equal to 90abc",
            "Average is equal to",
            "Title is cpsc",
            "Title is \"cpsc",
            "Title is \"cp*sc\"",
            "Title is \"a\"b\"",
            "Title contains \"a\"",
            "Title does not match \"a\"",
            "Title is greater than \"a\"",
            "Average is \"90\"",
        ];
        for source in bad {
            let err = groups(source).unwrap_err();
            assert_eq!(
                err.code(),
                ParseErrorCode::InvalidFilterExpression,
                "expected rejection for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_build_folds_groups() {
        let source = "Average is less than 50 or Average is greater than 90";
        let tokens = tokenize(source);
        let expr = FilterBuilder::new(&tokens, source).build().unwrap();
        assert!(matches!(expr, FilterExpr::Or(_, _)));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("90"), Some(90.0));
        assert_eq!(parse_decimal("-3.25"), Some(-3.25));
        assert_eq!(parse_decimal("1e5"), None);
        assert_eq!(parse_decimal("."), None);
        assert_eq!(parse_decimal("5."), None);
        assert_eq!(parse_decimal("NaN"), None);
    }
}
