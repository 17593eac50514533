//! Query front end for courseql
//!
//! Turns an English-shaped query sentence into a typed `Query`.
//!
//! # Pipeline
//!
//! 1. Lexer: whitespace tokens with byte spans
//! 2. Grammar: clause-by-clause recursive descent
//! 3. Filter builder: predicate atoms grouped into OR-of-ANDs
//!
//! Parsing either yields a complete `Query` or the first violated clause.
//! There is no partial result.

mod ast;
mod errors;
mod explain;
mod filter;
mod grammar;
mod lexer;

pub use ast::{Condition, FilterExpr, NumericOp, Predicate, Query, SortSpec, TextOp};
pub use errors::{Clause, ParseError, ParseErrorCode, ParseResult, Severity};
pub use explain::ExplainQuery;
pub use filter::FilterBuilder;
pub use grammar::{validate_dataset_id, QueryParser, RESERVED_WORDS};
pub use lexer::{tokenize, Token};
