use cellgraph_core::{CellError, Position};

/// Abstract Syntax Tree for formula expressions
///
/// Parentheses are not kept in the tree; [`std::fmt::Display`] puts back the
/// ones needed to parse the same tree again.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    Number(f64),
    Error(CellError),

    /// Cell reference (e.g., A1). Holds [`Position::NONE`] for references
    /// past the edge of the grid.
    CellRef(Position),

    // Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    // Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Get the precedence of this operator (higher = binds tighter)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Pow => 3,
        }
    }

    /// Check if this operator is right-associative
    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOp::Pow)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Pos, // +
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl Expr {
    /// Create a cell reference expression
    pub fn cell_ref(row: i32, col: i32) -> Self {
        Expr::CellRef(Position::new(row, col))
    }

    /// Create a binary expression
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Cell references in order of appearance, duplicates included
    pub fn references(&self) -> Vec<Position> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<Position>) {
        match self {
            Expr::CellRef(pos) => refs.push(*pos),
            Expr::Binary { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
            Expr::Unary { operand, .. } => operand.collect_references(refs),
            Expr::Number(_) | Expr::Error(_) => {}
        }
    }

    /// Whether this expression, as an operand of `parent`, must be wrapped
    fn needs_parens(&self, parent: BinaryOp, side: Side) -> bool {
        let Expr::Binary { op, .. } = self else {
            return false;
        };
        match op.precedence().cmp(&parent.precedence()) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => match side {
                Side::Left => parent.is_right_associative(),
                Side::Right => !parent.is_right_associative(),
            },
        }
    }

    fn fmt_operand(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        parent: BinaryOp,
        side: Side,
    ) -> std::fmt::Result {
        if self.needs_parens(parent, side) {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Shortest text that parses back to the same f64
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Error(e) => write!(f, "{}", e),
            Expr::CellRef(pos) if pos.is_valid() => write!(f, "{}", pos),
            Expr::CellRef(_) => write!(f, "{}", CellError::Ref),
            Expr::Binary { left, op, right } => {
                left.fmt_operand(f, *op, Side::Left)?;
                write!(f, "{}", op)?;
                right.fmt_operand(f, *op, Side::Right)
            }
            Expr::Unary { op, operand } => {
                write!(f, "{}", op)?;
                if matches!(**operand, Expr::Binary { .. }) {
                    write!(f, "({})", operand)
                } else {
                    write!(f, "{}", operand)
                }
            }
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Pow => write!(f, "^"),
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Pos => write!(f, "+"),
        }
    }
}
