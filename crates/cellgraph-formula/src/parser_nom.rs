//! Nom-based formula parser.
//!
//! Parses the text after the formula sign straight into an [`Expr`] tree.
//! Grammar, loosest binding first:
//!
//! ```text
//! expression     := additive
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := power (('*' | '/') power)*
//! power          := unary ('^' power)?
//! unary          := ('+' | '-') unary | primary
//! primary        := '(' expression ')' | error | number | cell_ref
//! ```
//!
//! Formulas nested past [`MAX_NESTING`] levels, or whose tree would grow
//! taller than [`MAX_HEIGHT`], are rejected as syntax errors.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, one_of},
    combinator::{map, map_opt, opt, recognize, value},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use cellgraph_core::{CellError, Formula, FormulaParseError, FormulaParser, Position};

// =============================================================================
// Helper Combinators
// =============================================================================

/// Skip whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an unsigned decimal number (integer or float); sign is a unary operator
fn parse_number(input: &str) -> IResult<&str, Expr> {
    map_opt(
        recognize(tuple((
            take_while1(|c: char| c.is_ascii_digit()),
            opt(pair(char('.'), take_while(|c: char| c.is_ascii_digit()))),
            opt(tuple((
                one_of("eE"),
                opt(one_of("+-")),
                take_while1(|c: char| c.is_ascii_digit()),
            ))),
        ))),
        |num_str: &str| {
            num_str
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Expr::Number)
        },
    )(input)
}

/// Parse an error literal
fn parse_error_literal(input: &str) -> IResult<&str, Expr> {
    alt((
        value(Expr::Error(CellError::Div0), tag("#DIV/0!")),
        value(Expr::Error(CellError::Value), tag("#VALUE!")),
        value(Expr::Error(CellError::Ref), tag("#REF!")),
        value(Expr::Error(CellError::Arith), tag("#ARITHM!")),
    ))(input)
}

/// Parse a cell reference (e.g., A1, AA10); out-of-grid references become [`Position::NONE`]
fn parse_cell_ref(input: &str) -> IResult<&str, Expr> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_uppercase()),
            take_while1(|c: char| c.is_ascii_digit()),
        )),
        |notation: &str| Expr::CellRef(Position::from_a1(notation)),
    )(input)
}

// =============================================================================
// Operator Parsers
// =============================================================================

fn parse_additive_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        value(BinaryOp::Add, char('+')),
        value(BinaryOp::Sub, char('-')),
    ))(input)
}

fn parse_multiplicative_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        value(BinaryOp::Mul, char('*')),
        value(BinaryOp::Div, char('/')),
    ))(input)
}

// =============================================================================
// Expression Parsers (Precedence Climbing)
// =============================================================================

/// Deepest chain of parentheses, prefix signs and exponents the parser descends into
pub const MAX_NESTING: usize = 100;

/// Tallest expression tree a formula may produce
pub const MAX_HEIGHT: usize = 512;

/// An expression with the height of its tree; leaves have height 1
type Node = (Expr, usize);

type ParseErr<'a> = nom::Err<nom::error::Error<&'a str>>;

fn too_deep(input: &str) -> ParseErr<'_> {
    nom::Err::Failure(nom::error::Error::new(input, ErrorKind::TooLarge))
}

fn leaf(expr: Expr) -> Node {
    (expr, 1)
}

fn join<'a>(input: &'a str, left: Node, op: BinaryOp, right: Node) -> Result<Node, ParseErr<'a>> {
    let height = left.1.max(right.1) + 1;
    if height > MAX_HEIGHT {
        return Err(too_deep(input));
    }
    Ok((Expr::binary(left.0, op, right.0), height))
}

/// Parse a primary expression (literals, cell refs, parentheses)
fn parse_primary(input: &str, depth: usize) -> IResult<&str, Node> {
    let (input, _) = multispace0(input)?;

    alt((
        // Parenthesized expression; grouping lives in the tree shape
        delimited(
            char('('),
            |i| parse_expression_at(i, depth + 1),
            preceded(multispace0, char(')')),
        ),
        map(parse_error_literal, leaf),
        map(parse_number, leaf),
        map(parse_cell_ref, leaf),
    ))(input)
}

/// Parse a unary expression (prefix - or +)
fn parse_unary(input: &str, depth: usize) -> IResult<&str, Node> {
    let (input, _) = multispace0(input)?;
    if depth > MAX_NESTING {
        return Err(too_deep(input));
    }

    let sign = opt(alt((
        value(UnaryOp::Neg, char('-')),
        value(UnaryOp::Pos, char('+')),
    )))(input)?;
    match sign {
        (input, Some(op)) => {
            let (input, (operand, height)) = parse_unary(input, depth + 1)?;
            if height >= MAX_HEIGHT {
                return Err(too_deep(input));
            }
            Ok((input, (Expr::unary(op, operand), height + 1)))
        }
        (input, None) => parse_primary(input, depth),
    }
}

/// Parse power expressions (right-associative)
fn parse_power(input: &str, depth: usize) -> IResult<&str, Node> {
    let (input, base) = parse_unary(input, depth)?;
    let (input, _) = multispace0(input)?;

    if let Ok((input, _)) = char::<&str, nom::error::Error<&str>>('^')(input) {
        let (input, _) = multispace0(input)?;
        let (input, exp) = parse_power(input, depth + 1)?; // Right-associative recursion
        let node = join(input, base, BinaryOp::Pow, exp)?;
        Ok((input, node))
    } else {
        Ok((input, base))
    }
}

/// Fold `init (op operand)*` to the left, stopping once the tree grows too tall
fn fold_left<'a>(input: &'a str, init: Node, tail: Vec<(BinaryOp, Node)>) -> IResult<&'a str, Node> {
    let node = tail
        .into_iter()
        .try_fold(init, |acc, (op, val)| join(input, acc, op, val))?;
    Ok((input, node))
}

/// Parse multiplicative expressions (*, /)
fn parse_multiplicative(input: &str, depth: usize) -> IResult<&str, Node> {
    let (input, init) = parse_power(input, depth)?;
    let (input, tail) = many0(pair(ws(parse_multiplicative_op), |i| parse_power(i, depth)))(input)?;
    fold_left(input, init, tail)
}

/// Parse additive expressions (+, -)
fn parse_additive(input: &str, depth: usize) -> IResult<&str, Node> {
    let (input, init) = parse_multiplicative(input, depth)?;
    let (input, tail) = many0(pair(ws(parse_additive_op), |i| parse_multiplicative(i, depth)))(input)?;
    fold_left(input, init, tail)
}

fn parse_expression_at(input: &str, depth: usize) -> IResult<&str, Node> {
    let (input, _) = multispace0(input)?;
    if depth > MAX_NESTING {
        return Err(too_deep(input));
    }
    parse_additive(input, depth)
}

/// Parse a complete expression
pub fn parse_expression(input: &str) -> IResult<&str, Expr> {
    parse_expression_at(input, 0).map(|(rest, (expr, _))| (rest, expr))
}

// =============================================================================
// Public API
// =============================================================================

/// Parser for the arithmetic formula language
#[derive(Debug, Clone, Copy)]
pub struct NomParser;

impl NomParser {
    pub fn new() -> Self {
        NomParser
    }

    /// Parse a formula expression (without the leading formula sign) into an AST
    pub fn parse_ast(&self, input: &str) -> Result<Expr, FormulaParseError> {
        match parse_expression(input) {
            Ok((remaining, expr)) => {
                // Check that all input was consumed
                let rest = remaining.trim_start();
                if rest.is_empty() {
                    Ok(expr)
                } else {
                    Err(FormulaParseError::new(
                        format!("unexpected input {:?}", rest),
                        input.len() - rest.len(),
                    ))
                }
            }
            Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Err(
                FormulaParseError::new("formula nested too deeply", input.len() - e.input.len()),
            ),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let offset = input.len() - e.input.len();
                let message = if e.input.trim().is_empty() {
                    "unexpected end of formula".to_string()
                } else {
                    format!("unexpected input {:?}", e.input.trim_end())
                };
                Err(FormulaParseError::new(message, offset))
            }
            Err(nom::Err::Incomplete(_)) => Err(FormulaParseError::new(
                "unexpected end of formula",
                input.len(),
            )),
        }
    }
}

impl Default for NomParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaParser for NomParser {
    fn parse(&self, expression: &str) -> Result<Box<dyn Formula>, FormulaParseError> {
        let ast = self.parse_ast(expression)?;
        Ok(Box::new(crate::ParsedFormula::new(ast)))
    }
}

// =============================================================================
// Tests
// =============================================================================
