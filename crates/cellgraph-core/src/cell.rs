use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::HashSet;
use std::fmt;

use crate::error::{CellError, FormulaParseError};
use crate::formula::{Formula, FormulaParser};
use crate::position::Position;

/// Leading character that turns cell input into a formula
pub const FORMULA_SIGN: char = '=';
/// Leading character that forces the rest of the input to be read as text
pub const ESCAPE_SIGN: char = '\'';

/// Represents the value a cell produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(CellError),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl CellValue {
    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Check if this value is an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// The content of a cell: exactly one of three variants
#[derive(Debug, Default)]
pub enum CellContent {
    #[default]
    Empty,
    /// Raw user text, escape sign included
    Text(String),
    Formula(Box<dyn Formula>),
}

impl CellContent {
    /// Classify user input. Only formulas go through the parser.
    pub fn from_input(
        input: &str,
        parser: &dyn FormulaParser,
    ) -> Result<Self, FormulaParseError> {
        if input.is_empty() {
            return Ok(CellContent::Empty);
        }

        match input.strip_prefix(FORMULA_SIGN) {
            // A lone "=" is plain text
            Some(expression) if !expression.is_empty() => {
                Ok(CellContent::Formula(parser.parse(expression)?))
            }
            _ => Ok(CellContent::Text(input.to_string())),
        }
    }

    /// Text shown when editing the cell
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format!("{}{}", FORMULA_SIGN, formula.expression()),
        }
    }

    /// Valid references in order of first appearance
    pub fn referenced_cells(&self) -> Vec<Position> {
        match self {
            CellContent::Empty | CellContent::Text(_) => Vec::new(),
            CellContent::Formula(formula) => {
                let mut seen = HashSet::new();
                formula
                    .references()
                    .into_iter()
                    .filter(|pos| pos.is_valid() && seen.insert(*pos))
                    .collect()
            }
        }
    }

    /// Check if this is a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }

    /// Check if this content is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }
}

/// One node of the dependency graph
///
/// Edges are stored as positions on both endpoints; the sheet owns every
/// cell and is the only code that rewires them.
#[derive(Debug, Default)]
pub struct Cell {
    content: CellContent,
    /// Memoized formula value. Filled through `&self` on first read, reset
    /// only by the sheet's mutation paths.
    cache: OnceCell<CellValue>,
    /// Cells this cell's formula reads
    outgoing: HashSet<Position>,
    /// Cells whose formulas read this cell
    incoming: HashSet<Position>,
}

impl Cell {
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn referenced_cells(&self) -> Vec<Position> {
        self.content.referenced_cells()
    }

    /// Cells this cell reads
    pub fn dependencies(&self) -> &HashSet<Position> {
        &self.outgoing
    }

    /// Cells that read this cell
    pub fn dependents(&self) -> &HashSet<Position> {
        &self.incoming
    }

    /// Empty and text cells have nothing to cache and are always fresh.
    pub fn is_cached(&self) -> bool {
        match self.content {
            CellContent::Formula(_) => self.cache.get().is_some(),
            CellContent::Empty | CellContent::Text(_) => true,
        }
    }

    /// Value that needs no formula evaluation, or the memoized formula value
    pub(crate) fn settled_value(&self) -> Option<CellValue> {
        match &self.content {
            CellContent::Empty => Some(CellValue::Text(String::new())),
            CellContent::Text(text) => {
                let text = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                Some(CellValue::Text(text.to_string()))
            }
            CellContent::Formula(_) => self.cache.get().cloned(),
        }
    }

    /// Memoize the formula value computed by `compute`
    pub(crate) fn cached_or_init(&self, compute: impl FnOnce(&dyn Formula) -> CellValue) -> CellValue {
        match &self.content {
            CellContent::Formula(formula) => self.cache.get_or_init(|| compute(formula.as_ref())).clone(),
            _ => self.settled_value().unwrap_or_default(),
        }
    }

    /// Swap in new content and outgoing edges, returning the old edges
    pub(crate) fn replace(&mut self, content: CellContent, outgoing: HashSet<Position>) -> HashSet<Position> {
        self.content = content;
        self.cache.take();
        std::mem::replace(&mut self.outgoing, outgoing)
    }

    /// Drop the memoized value; returns whether there was one
    pub(crate) fn invalidate(&mut self) -> bool {
        self.cache.take().is_some()
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.incoming.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.incoming.remove(&pos);
    }
}
