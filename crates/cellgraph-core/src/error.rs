use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::position::Position;

/// Error categories a computed value can carry
///
/// These are values, not failures: they flow through dependent formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// #REF! - Reference to a position outside the grid
    Ref,
    /// #VALUE! - Operand that is not a number
    Value,
    /// #DIV/0! - Division by zero
    Div0,
    /// #ARITHM! - Any other non-finite arithmetic result
    Arith,
}

impl CellError {
    /// Display form, also accepted as a literal by the formula language
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Ref => "#REF!",
            CellError::Value => "#VALUE!",
            CellError::Div0 => "#DIV/0!",
            CellError::Arith => "#ARITHM!",
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection reported by a formula parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (at offset {offset})")]
pub struct FormulaParseError {
    pub message: String,
    pub offset: usize,
}

impl FormulaParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Structural errors: the operation is rejected and the sheet is left unchanged
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("Invalid position: {0:?}")]
    InvalidPosition(String),

    #[error("Circular dependency through {position}")]
    CircularDependency { position: Position },

    #[error("Formula syntax error in {position}: {source}")]
    FormulaSyntax {
        position: Position,
        #[source]
        source: FormulaParseError,
    },
}

impl SheetError {
    pub(crate) fn invalid_position(pos: Position) -> Self {
        SheetError::InvalidPosition(format!("({}, {})", pos.row, pos.col))
    }

    /// Short machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SheetError::InvalidPosition(_) => "INVALID_POSITION",
            SheetError::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            SheetError::FormulaSyntax { .. } => "FORMULA_SYNTAX",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(CellError::Ref.to_string(), "#REF!");
        assert_eq!(CellError::Value.to_string(), "#VALUE!");
        assert_eq!(CellError::Div0.to_string(), "#DIV/0!");
        assert_eq!(CellError::Arith.to_string(), "#ARITHM!");
    }

    #[test]
    fn test_sheet_error_messages() {
        let err = SheetError::CircularDependency {
            position: Position::new(0, 1),
        };
        assert_eq!(err.to_string(), "Circular dependency through B1");
        assert_eq!(err.code(), "CIRCULAR_DEPENDENCY");

        let err = SheetError::FormulaSyntax {
            position: Position::new(2, 0),
            source: FormulaParseError::new("Unexpected input: ')'", 3),
        };
        assert_eq!(
            err.to_string(),
            "Formula syntax error in A3: Unexpected input: ')' (at offset 3)"
        );
        assert_eq!(
            SheetError::invalid_position(Position::NONE).to_string(),
            "Invalid position: \"(-1, -1)\""
        );
    }
}
