use crate::ast::{BinaryOp, Expr, UnaryOp};
use cellgraph_core::{CellError, CellValue, Position};

/// Evaluator for formula AST
pub struct Evaluator<F>
where
    F: Fn(Position) -> CellValue,
{
    get_cell_value: F,
}

impl<F> Evaluator<F>
where
    F: Fn(Position) -> CellValue,
{
    pub fn new(get_cell_value: F) -> Self {
        Self { get_cell_value }
    }

    /// Evaluate an expression AST to a number or an error
    pub fn evaluate(&self, expr: &Expr) -> CellValue {
        match expr {
            Expr::Number(n) => CellValue::Number(*n),
            Expr::Error(e) => CellValue::Error(*e),

            Expr::CellRef(pos) => match (self.get_cell_value)(*pos) {
                CellValue::Text(_) => CellValue::Error(CellError::Value),
                value => value,
            },

            Expr::Binary { left, op, right } => self.evaluate_binary(left, *op, right),

            Expr::Unary { op, operand } => self.evaluate_unary(*op, operand),
        }
    }

    fn evaluate_binary(&self, left: &Expr, op: BinaryOp, right: &Expr) -> CellValue {
        let left_val = self.evaluate(left);
        let right_val = self.evaluate(right);

        // Propagate errors, leftmost first
        let (a, b) = match (left_val, right_val) {
            (CellValue::Error(e), _) | (_, CellValue::Error(e)) => return CellValue::Error(e),
            (left_val, right_val) => match (left_val.as_number(), right_val.as_number()) {
                (Some(a), Some(b)) => (a, b),
                _ => return CellValue::Error(CellError::Value),
            },
        };

        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    return CellValue::Error(CellError::Div0);
                }
                a / b
            }
            BinaryOp::Pow => a.powf(b),
        };

        finite(result)
    }

    fn evaluate_unary(&self, op: UnaryOp, operand: &Expr) -> CellValue {
        let value = self.evaluate(operand);

        match (op, value.as_number()) {
            (_, None) if value.is_error() => value,
            (_, None) => CellValue::Error(CellError::Value),
            (UnaryOp::Neg, Some(n)) => finite(-n),
            (UnaryOp::Pos, Some(n)) => finite(n),
        }
    }
}

fn finite(result: f64) -> CellValue {
    if result.is_finite() {
        CellValue::Number(result)
    } else {
        CellValue::Error(CellError::Arith)
    }
}
