//! Price filter expression parsing.
//!
//! # Responsibility
//! - Turn a raw expression such as `>9.99` into a comparator and threshold.
//! - Evaluate the parsed predicate against book prices.
//!
//! # Invariants
//! - Exactly one comparator (`>` or `<`) immediately followed by a number.
//! - No whitespace tolerance and no compound predicates.

use crate::model::book::Book;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Strict comparison applied to a book price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    GreaterThan,
    LessThan,
}

impl Comparator {
    fn from_char(value: char) -> Option<Self> {
        match value {
            '>' => Some(Self::GreaterThan),
            '<' => Some(Self::LessThan),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::GreaterThan => '>',
            Self::LessThan => '<',
        }
    }
}

/// Parsed price predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFilter {
    pub comparator: Comparator,
    pub threshold: f64,
}

impl PriceFilter {
    /// Parses `expr := ('>' | '<') number`.
    ///
    /// # Errors
    /// - `TooShort` when the expression has at most one character.
    /// - `UnsupportedOperator` when the first character is not `>`/`<`.
    /// - `InvalidNumber` when the remainder is not a finite `f64`.
    pub fn parse(expr: &str) -> Result<Self, FilterParseError> {
        let mut chars = expr.chars();
        let first = match chars.next() {
            Some(first) if expr.len() > 1 => first,
            _ => return Err(FilterParseError::TooShort(expr.to_string())),
        };
        let comparator = Comparator::from_char(first)
            .ok_or(FilterParseError::UnsupportedOperator(first))?;

        let literal = chars.as_str();
        let threshold = literal
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| FilterParseError::InvalidNumber(literal.to_string()))?;

        Ok(Self {
            comparator,
            threshold,
        })
    }

    /// Returns whether `price` satisfies the comparison.
    pub fn matches(&self, price: f64) -> bool {
        match self.comparator {
            Comparator::GreaterThan => price > self.threshold,
            Comparator::LessThan => price < self.threshold,
        }
    }

    /// Keeps matching books, preserving their order.
    pub fn apply(&self, books: impl IntoIterator<Item = Book>) -> Vec<Book> {
        books
            .into_iter()
            .filter(|book| self.matches(book.price))
            .collect()
    }
}

impl FromStr for PriceFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for PriceFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.comparator.symbol(), self.threshold)
    }
}

/// Malformed or unsupported filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    TooShort(String),
    UnsupportedOperator(char),
    InvalidNumber(String),
}

impl Display for FilterParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort(expr) => write!(
                f,
                "filter `{expr}` is too short; expected a comparator followed by a number"
            ),
            Self::UnsupportedOperator(op) => {
                write!(f, "unsupported filter operator `{op}`; expected `>` or `<`")
            }
            Self::InvalidNumber(literal) => {
                write!(f, "invalid filter threshold `{literal}`")
            }
        }
    }
}

impl Error for FilterParseError {}
