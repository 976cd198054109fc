pub mod cell;
pub mod error;
pub mod formula;
pub mod position;
pub mod print;
pub mod sheet;

#[cfg(test)]
mod testing;

pub use cell::{Cell, CellContent, CellValue, ESCAPE_SIGN, FORMULA_SIGN};
pub use error::{CellError, FormulaParseError, SheetError};
pub use formula::{Formula, FormulaParser, Resolver};
pub use position::{col_from_label, col_to_label, Position, Size};
pub use sheet::{CellView, Sheet};
