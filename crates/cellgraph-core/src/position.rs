use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::SheetError;

static A1_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<letters>[A-Z]+)(?<digits>[0-9]+)$").expect("valid A1 pattern"));

/// Cell position (0-indexed internally)
///
/// Positions coming from outside the graph may be invalid; [`Position::NONE`]
/// is the sentinel every failed parse produces.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Maximum number of rows
    pub const MAX_ROWS: i32 = 16_384;
    /// Maximum number of columns
    pub const MAX_COLS: i32 = 16_384;

    /// The invalid position
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Check if this position lies inside the grid
    pub fn is_valid(&self) -> bool {
        (0..Self::MAX_ROWS).contains(&self.row) && (0..Self::MAX_COLS).contains(&self.col)
    }

    /// Create from A1 notation (e.g., "A1" -> (0, 0), "B2" -> (1, 1))
    ///
    /// Anything that is not a complete, in-range reference yields [`Position::NONE`].
    pub fn from_a1(notation: &str) -> Self {
        Self::parse_a1(notation).unwrap_or(Self::NONE)
    }

    fn parse_a1(notation: &str) -> Option<Self> {
        let caps = A1_PATTERN.captures(notation)?;
        let col = col_from_label(&caps["letters"])?;
        let row: i32 = caps["digits"].parse().ok()?;

        let pos = Position::new(row.checked_sub(1)?, col);
        pos.is_valid().then_some(pos)
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1"); invalid positions render as ""
    pub fn to_a1(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl FromStr for Position {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| SheetError::InvalidPosition(s.to_string()))
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: i32) -> String {
    let mut label = String::new();
    let mut n = col as i64 + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
///
/// Returns `None` for non-letters and for labels past the grid width.
pub fn col_from_label(label: &str) -> Option<i32> {
    let mut col: i32 = 0;

    for c in label.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(c as i32 - 'A' as i32 + 1)?;
        if col > Position::MAX_COLS {
            return None;
        }
    }

    if col == 0 {
        None
    } else {
        Some(col - 1) // Convert to 0-indexed
    }
}

/// Extent of a rectangular area anchored at A1
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    pub const fn new(rows: i32, cols: i32) -> Self {
        Size { rows, cols }
    }
}
