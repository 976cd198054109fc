//! Seam between the dependency graph and whatever evaluates formulas.
//!
//! The sheet never looks inside a formula. It only needs the references a
//! formula reads, a way to compute its value from the values of those
//! references, and the canonical text to show back to the user.

use std::fmt;

use crate::cell::CellValue;
use crate::error::FormulaParseError;
use crate::position::Position;

/// Looks up the value of a referenced cell while a formula is evaluated.
///
/// The sheet's resolver only ever answers with `Number` or `Error`.
pub type Resolver<'a> = dyn Fn(Position) -> CellValue + 'a;

/// A parsed formula
pub trait Formula: fmt::Debug {
    /// Compute the formula's value
    fn evaluate(&self, resolver: &Resolver<'_>) -> CellValue;

    /// Positions the formula reads, in order of appearance.
    /// Invalid positions may be present; the sheet filters them out.
    fn references(&self) -> Vec<Position>;

    /// Canonical expression text, without the leading formula sign
    fn expression(&self) -> String;
}

/// Turns expression text into a [`Formula`]
pub trait FormulaParser {
    /// Parse `expression` (the text after the formula sign)
    fn parse(&self, expression: &str) -> Result<Box<dyn Formula>, FormulaParseError>;
}

