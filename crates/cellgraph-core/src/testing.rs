//! Minimal formula language for exercising the graph without the real parser:
//! a `+`-separated list of numbers and A1 references.

use crate::cell::CellValue;
use crate::error::FormulaParseError;
use crate::formula::{Formula, FormulaParser, Resolver};
use crate::position::Position;

#[derive(Debug)]
enum Term {
    Number(f64),
    Ref(Position),
}

#[derive(Debug)]
pub(crate) struct SumFormula(Vec<Term>);

impl Formula for SumFormula {
    fn evaluate(&self, resolver: &Resolver<'_>) -> CellValue {
        let mut total = 0.0;
        for term in &self.0 {
            match term {
                Term::Number(n) => total += n,
                Term::Ref(pos) => match resolver(*pos) {
                    CellValue::Number(n) => total += n,
                    other => return other,
                },
            }
        }
        CellValue::Number(total)
    }

    fn references(&self) -> Vec<Position> {
        self.0
            .iter()
            .filter_map(|term| match term {
                Term::Ref(pos) => Some(*pos),
                Term::Number(_) => None,
            })
            .collect()
    }

    fn expression(&self) -> String {
        self.0
            .iter()
            .map(|term| match term {
                Term::Number(n) => n.to_string(),
                Term::Ref(pos) if pos.is_valid() => pos.to_string(),
                Term::Ref(_) => "#REF!".to_string(),
            })
            .collect::<Vec<_>>()
            .join("+")
    }
}

pub(crate) struct SumParser;

impl FormulaParser for SumParser {
    fn parse(&self, expression: &str) -> Result<Box<dyn Formula>, FormulaParseError> {
        let mut terms = Vec::new();
        let mut offset = 0;
        for raw in expression.split('+') {
            let term = raw.trim();
            if term.starts_with(|c: char| c.is_ascii_uppercase()) {
                terms.push(Term::Ref(Position::from_a1(term)));
            } else {
                let n = term
                    .parse()
                    .map_err(|_| FormulaParseError::new(format!("bad term {term:?}"), offset))?;
                terms.push(Term::Number(n));
            }
            offset += raw.len() + 1;
        }
        Ok(Box::new(SumFormula(terms)))
    }
}
