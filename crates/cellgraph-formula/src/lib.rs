pub mod ast;
pub mod evaluator;
pub mod parser_nom;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use evaluator::Evaluator;
pub use parser_nom::NomParser;

use cellgraph_core::{CellValue, Formula, FormulaParseError, Position, Resolver};

/// A formula parsed into an AST, ready to be stored in a cell
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    ast: Expr,
}

impl ParsedFormula {
    pub fn new(ast: Expr) -> Self {
        Self { ast }
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}

impl Formula for ParsedFormula {
    fn evaluate(&self, resolver: &Resolver<'_>) -> CellValue {
        Evaluator::new(resolver).evaluate(&self.ast)
    }

    fn references(&self) -> Vec<Position> {
        self.ast.references()
    }

    fn expression(&self) -> String {
        self.ast.to_string()
    }
}

/// Parse a formula expression (the text after the formula sign)
pub fn parse_formula(expression: &str) -> Result<ParsedFormula, FormulaParseError> {
    NomParser::new().parse_ast(expression).map(ParsedFormula::new)
}

/// Parse and evaluate a formula expression
pub fn evaluate_formula(
    expression: &str,
    get_cell_value: impl Fn(Position) -> CellValue,
) -> Result<CellValue, FormulaParseError> {
    let ast = NomParser::new().parse_ast(expression)?;
    Ok(Evaluator::new(get_cell_value).evaluate(&ast))
}

/// Extract cell references from a formula expression, in order of appearance
pub fn extract_references(expression: &str) -> Result<Vec<Position>, FormulaParseError> {
    parse_formula(expression).map(|formula| formula.references())
}
