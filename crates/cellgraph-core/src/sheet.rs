use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, trace};

use crate::cell::{Cell, CellContent, CellValue};
use crate::error::{CellError, SheetError};
use crate::formula::{Formula, FormulaParser};
use crate::position::{Position, Size};

/// A single sheet: every cell plus the edges between them
///
/// Cells live in a map keyed by position; dependency edges are position sets
/// stored on both endpoints. All mutation goes through [`Sheet::set_cell`] and
/// [`Sheet::clear_cell`], which keep the graph acyclic and the two edge sets
/// mirrored.
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    parser: Box<dyn FormulaParser>,
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

impl Sheet {
    /// Create an empty sheet that parses formulas with `parser`
    pub fn new(parser: impl FormulaParser + 'static) -> Self {
        Self {
            cells: HashMap::new(),
            parser: Box::new(parser),
        }
    }

    /// Set the text of a cell
    ///
    /// Fails without touching the sheet if the position is invalid, the
    /// formula does not parse, or the new references would close a cycle.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        ensure_valid(pos)?;

        let content = CellContent::from_input(text, self.parser.as_ref())
            .map_err(|source| SheetError::FormulaSyntax {
                position: pos,
                source,
            })?;

        if let Some(cell) = self.cells.get(&pos) {
            if cell.text() == content.text() {
                return Ok(());
            }
        }

        let refs = content.referenced_cells();

        // Materialize the cell and everything it references before the
        // cycle check so the traversal sees the complete graph.
        let mut vivified = Vec::new();
        for p in std::iter::once(pos).chain(refs.iter().copied()) {
            if !self.cells.contains_key(&p) {
                self.cells.insert(p, Cell::default());
                vivified.push(p);
            }
        }

        if self.would_create_cycle(pos, &refs) {
            for p in vivified {
                self.cells.remove(&p);
            }
            debug!(cell = %pos, "rejected formula: circular dependency");
            return Err(SheetError::CircularDependency { position: pos });
        }

        debug!(cell = %pos, refs = refs.len(), "set cell");
        self.commit(pos, content, refs);
        Ok(())
    }

    /// Reset a cell to empty, same as setting `""`
    ///
    /// The entry stays in the sheet as a blank cell; clearing a position that
    /// was never set does nothing.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        ensure_valid(pos)?;

        let Some(cell) = self.cells.get(&pos) else {
            return Ok(());
        };
        if !cell.content().is_empty() {
            debug!(cell = %pos, "clear cell");
            self.commit(pos, CellContent::Empty, Vec::new());
        }
        Ok(())
    }

    /// Get a read-only view of a cell, if it exists
    pub fn get_cell(&self, pos: Position) -> Result<Option<CellView<'_>>, SheetError> {
        ensure_valid(pos)?;
        Ok(self.cells.get(&pos).map(|cell| CellView {
            sheet: self,
            position: pos,
            cell,
        }))
    }

    /// Smallest area anchored at A1 that holds every non-empty cell
    pub fn printable_size(&self) -> Size {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.content().is_empty())
            .fold(Size::default(), |size, (pos, _)| {
                Size::new(size.rows.max(pos.row + 1), size.cols.max(pos.col + 1))
            })
    }

    /// Positions of every cell the sheet holds, blank placeholders included
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.keys().copied()
    }

    /// Number of cells the sheet holds
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cell(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// True if any of `refs` already depends, directly or transitively, on
    /// `pos`: walk the existing dependent edges out of `pos` and look for one
    /// of the new references. A self-reference is caught on the first step.
    fn would_create_cycle(&self, pos: Position, refs: &[Position]) -> bool {
        if refs.is_empty() {
            return false;
        }
        let targets: HashSet<Position> = refs.iter().copied().collect();
        let mut stack = vec![pos];
        let mut visited = HashSet::from([pos]);

        while let Some(current) = stack.pop() {
            if targets.contains(&current) {
                return true;
            }
            if let Some(cell) = self.cells.get(&current) {
                for dependent in cell.dependents() {
                    if visited.insert(*dependent) {
                        stack.push(*dependent);
                    }
                }
            }
        }

        false
    }

    /// Swap the content in, rewire edges on both endpoints, then invalidate
    fn commit(&mut self, pos: Position, content: CellContent, refs: Vec<Position>) {
        let outgoing: HashSet<Position> = refs.into_iter().collect();
        let old = self
            .cells
            .entry(pos)
            .or_default()
            .replace(content, outgoing.clone());

        for dep in old {
            if let Some(cell) = self.cells.get_mut(&dep) {
                cell.remove_dependent(pos);
            }
        }
        for dep in outgoing {
            self.cells.entry(dep).or_default().add_dependent(pos);
        }

        self.invalidate(pos);
    }

    /// Drop memoized values of `pos` and everything that depends on it
    fn invalidate(&mut self, pos: Position) {
        let mut stack = vec![pos];
        let mut visited = HashSet::from([pos]);
        let mut dropped = 0usize;

        while let Some(current) = stack.pop() {
            let Some(cell) = self.cells.get_mut(&current) else {
                continue;
            };
            if cell.invalidate() {
                dropped += 1;
            }
            // Keep walking through blank and text cells: their dependents
            // may still hold cached values.
            for dep in cell.dependents() {
                if visited.insert(*dep) {
                    stack.push(*dep);
                }
            }
        }

        trace!(cell = %pos, visited = visited.len(), dropped, "invalidated dependents");
    }

    /// Value of the cell at `pos`; absent cells read as empty text
    fn evaluate(&self, pos: Position) -> CellValue {
        let Some(cell) = self.cells.get(&pos) else {
            return CellValue::default();
        };
        if let Some(value) = cell.settled_value() {
            return value;
        }
        self.prime(pos);
        cell.cached_or_init(|formula| self.compute(formula))
    }

    /// Fill the caches of every uncached formula `root` reads, dependencies
    /// first, so evaluating a long chain never nests formula evaluations.
    fn prime(&self, root: Position) {
        let mut stack = vec![(root, false)];

        while let Some((current, expanded)) = stack.pop() {
            let Some(cell) = self.cells.get(&current) else {
                continue;
            };
            if cell.is_cached() {
                continue;
            }
            if expanded {
                cell.cached_or_init(|formula| self.compute(formula));
                continue;
            }
            stack.push((current, true));
            stack.extend(cell.dependencies().iter().map(|dep| (*dep, false)));
        }
    }

    fn compute(&self, formula: &dyn Formula) -> CellValue {
        formula.evaluate(&|pos: Position| self.resolve(pos))
    }

    /// What a formula sees when it reads `pos`: a number or an error
    fn resolve(&self, pos: Position) -> CellValue {
        if !pos.is_valid() {
            return CellError::Ref.into();
        }
        if !self.cells.contains_key(&pos) {
            return CellValue::Number(0.0);
        }

        match self.evaluate(pos) {
            CellValue::Text(text) => parse_number(&text),
            value => value,
        }
    }
}

fn ensure_valid(pos: Position) -> Result<(), SheetError> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(SheetError::invalid_position(pos))
    }
}

/// Text read by a formula: blank is zero, anything but a full finite number
/// is a #VALUE! error
fn parse_number(text: &str) -> CellValue {
    if text.is_empty() {
        return CellValue::Number(0.0);
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellError::Value.into(),
    }
}

/// Read-only handle to one cell of a sheet
#[derive(Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    position: Position,
    cell: &'a Cell,
}

impl<'a> CellView<'a> {
    pub fn position(&self) -> Position {
        self.position
    }

    /// Computed value.
    ///
    /// Formula values are memoized on first read, so this fills caches even
    /// though it only needs shared access to the sheet.
    pub fn value(&self) -> CellValue {
        self.sheet.evaluate(self.position)
    }

    pub fn text(&self) -> String {
        self.cell.text()
    }

    pub fn referenced_cells(&self) -> Vec<Position> {
        self.cell.referenced_cells()
    }

    /// Cells this cell reads
    pub fn dependencies(&self) -> &'a HashSet<Position> {
        self.cell.dependencies()
    }

    /// Cells that read this cell
    pub fn dependents(&self) -> &'a HashSet<Position> {
        self.cell.dependents()
    }

    pub fn is_cached(&self) -> bool {
        self.cell.is_cached()
    }

    pub fn content(&self) -> &'a CellContent {
        self.cell.content()
    }
}

impl fmt::Debug for CellView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellView")
            .field("position", &self.position)
            .field("cell", self.cell)
            .finish()
    }
}
