//! Evaluation of `${name}` references between properties.
//!
//! Strings interpolate the canonical text of other properties. Numeric
//! properties may be written as a sum of references and literals
//! (`${a} + ${b} + 1`). Booleans may alias another boolean (`${flag}`).
//! Regex values are opaque and never substituted. Use `$$` to write a literal `$`.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use tracing::debug;

use super::{Diagnostics, ResolveError};
use crate::property::{
    Property, PropertyDeclaration, PropertyTable, PropertyType, PropertyValue, RawValue,
};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Ref(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Ref(String),
    Number(String),
}

/// A raw value after parsing its placeholders.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal,
    Template(Vec<Segment>),
    Sum(Vec<Operand>),
    Alias(String),
}

impl Expr {
    fn references(&self) -> Vec<&str> {
        match self {
            Expr::Literal => Vec::new(),
            Expr::Template(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Ref(name) => Some(name.as_str()),
                    Segment::Text(_) => None,
                })
                .collect(),
            Expr::Sum(operands) => operands
                .iter()
                .filter_map(|o| match o {
                    Operand::Ref(name) => Some(name.as_str()),
                    Operand::Number(_) => None,
                })
                .collect(),
            Expr::Alias(name) => vec![name.as_str()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Visit {
    Pending,
    Active,
    Done { ok: bool },
}

/// Replaces every raw value with its final typed value.
///
/// Properties are evaluated dependencies-first. Every independent problem is
/// reported; a property that depends on a broken one is skipped without an
/// extra error. The table is only returned when nothing failed.
pub fn evaluate(declarations: Vec<PropertyDeclaration>) -> Result<PropertyTable, Diagnostics> {
    let mut diagnostics = Diagnostics::new();
    let index: HashMap<&str, usize> = declarations
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();

    // Parse expressions and check that every reference can be satisfied.
    let mut exprs = Vec::with_capacity(declarations.len());
    let mut valid = vec![true; declarations.len()];
    for (i, decl) in declarations.iter().enumerate() {
        let expr = match parse_expr(decl) {
            Ok(expr) => expr,
            Err(e) => {
                diagnostics.push(e);
                valid[i] = false;
                exprs.push(Expr::Literal);
                continue;
            }
        };
        for name in expr.references() {
            let error = match index.get(name) {
                None => Some(ResolveError::UnresolvedReference {
                    name: name.to_string(),
                    referenced_by: decl.name.clone(),
                }),
                Some(&target) => check_reference(decl, &declarations[target]),
            };
            if let Some(error) = error {
                diagnostics.push(error);
                valid[i] = false;
            }
        }
        exprs.push(expr);
    }

    let graph = Graph {
        declarations: &declarations,
        exprs: &exprs,
        index: &index,
    };
    let order = graph.order(&valid, &mut diagnostics);

    let mut values: HashMap<&str, PropertyValue> = HashMap::new();
    for i in order {
        let decl = &declarations[i];
        match evaluate_one(decl, &exprs[i], &values) {
            Ok(Some(value)) => {
                if !matches!(exprs[i], Expr::Literal) {
                    debug!(property = %decl.name, value = %value.to_text(), "substituted");
                }
                values.insert(decl.name.as_str(), value);
            }
            // A dependency failed; that failure is already reported.
            Ok(None) => {}
            Err(e) => diagnostics.push(e),
        }
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    let mut values: HashMap<String, PropertyValue> = values
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    let mut properties = Vec::with_capacity(declarations.len());
    for declaration in declarations {
        if let Some(value) = values.remove(&declaration.name) {
            properties.push(Property { declaration, value });
        }
    }
    Ok(PropertyTable::from_properties(properties))
}

/// Reference rules that depend only on the two declared types.
fn check_reference(from: &PropertyDeclaration, to: &PropertyDeclaration) -> Option<ResolveError> {
    match (from.ty, to.ty) {
        (PropertyType::String, PropertyType::Regex) => Some(ResolveError::UnsupportedReference {
            name: to.name.clone(),
            referenced_by: from.name.clone(),
        }),
        (PropertyType::String, _) => None,
        (PropertyType::Boolean, PropertyType::Boolean) => None,
        (ty, other) if ty.is_numeric() && other.is_numeric() => None,
        (expected, other) => Some(ResolveError::TypeMismatch {
            name: from.name.clone(),
            expected,
            found: format!("reference to {other} property '{}'", to.name),
        }),
    }
}

struct Graph<'a> {
    declarations: &'a [PropertyDeclaration],
    exprs: &'a [Expr],
    index: &'a HashMap<&'a str, usize>,
}

impl Graph<'_> {
    /// Dependencies-first order of every property that can be evaluated.
    /// Cycles are reported once each.
    fn order(&self, valid: &[bool], diagnostics: &mut Diagnostics) -> Vec<usize> {
        let mut state = vec![Visit::Pending; self.declarations.len()];
        let mut order = Vec::with_capacity(self.declarations.len());
        let mut path = Vec::new();
        for i in 0..self.declarations.len() {
            self.visit(i, valid, &mut state, &mut path, &mut order, diagnostics);
        }
        order
    }

    fn visit(
        &self,
        node: usize,
        valid: &[bool],
        state: &mut [Visit],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        match state[node] {
            Visit::Done { ok } => return ok,
            Visit::Active => return false,
            Visit::Pending => {}
        }
        state[node] = Visit::Active;
        path.push(node);

        let mut ok = valid[node];
        for name in self.exprs[node].references() {
            let Some(&dep) = self.index.get(name) else {
                continue;
            };
            if state[dep] == Visit::Active {
                let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|&n| self.declarations[n].name.clone())
                    .collect();
                cycle.push(self.declarations[dep].name.clone());
                diagnostics.push(ResolveError::CircularReference { cycle });
                ok = false;
            } else if !self.visit(dep, valid, state, path, order, diagnostics) {
                ok = false;
            }
        }

        path.pop();
        state[node] = Visit::Done { ok };
        if ok {
            order.push(node);
        }
        ok
    }
}

fn evaluate_one(
    decl: &PropertyDeclaration,
    expr: &Expr,
    values: &HashMap<&str, PropertyValue>,
) -> Result<Option<PropertyValue>, ResolveError> {
    match expr {
        Expr::Literal => PropertyValue::parse(decl.ty, &decl.raw, &decl.name).map(Some),
        Expr::Template(segments) => {
            let mut out = String::new();
            for segment in segments {
                match segment {
                    Segment::Text(text) => out.push_str(text),
                    Segment::Ref(name) => match values.get(name.as_str()) {
                        Some(value) => out.push_str(&value.to_text()),
                        None => return Ok(None),
                    },
                }
            }
            Ok(Some(PropertyValue::String(out)))
        }
        Expr::Alias(name) => Ok(values.get(name.as_str()).cloned()),
        Expr::Sum(operands) => {
            let mut terms = Vec::with_capacity(operands.len());
            for operand in operands {
                let term = match operand {
                    Operand::Ref(name) => match values.get(name.as_str()) {
                        Some(value) => term_of_value(value),
                        None => return Ok(None),
                    },
                    Operand::Number(text) => term_of_literal(decl, text)?,
                };
                terms.push(term);
            }
            sum(decl, &terms).map(Some)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Term {
    Int(i64),
    Real(f64),
}

fn term_of_value(value: &PropertyValue) -> Term {
    match value {
        PropertyValue::Integer(i) => Term::Int(*i),
        PropertyValue::Float(f) | PropertyValue::Double(f) => Term::Real(*f),
        // Non-numeric references are rejected before evaluation.
        _ => Term::Real(f64::NAN),
    }
}

fn term_of_literal(decl: &PropertyDeclaration, text: &str) -> Result<Term, ResolveError> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Term::Int(i));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Term::Real)
        .ok_or_else(|| ResolveError::TypeMismatch {
            name: decl.name.clone(),
            expected: decl.ty,
            found: format!("operand `{text}`"),
        })
}

/// Adds the terms in the declaring property's own type.
fn sum(decl: &PropertyDeclaration, terms: &[Term]) -> Result<PropertyValue, ResolveError> {
    let mismatch = |found: String| ResolveError::TypeMismatch {
        name: decl.name.clone(),
        expected: decl.ty,
        found,
    };

    if decl.ty == PropertyType::Integer {
        let mut total: i64 = 0;
        for term in terms {
            match term {
                Term::Int(i) => {
                    total = total
                        .checked_add(*i)
                        .ok_or_else(|| mismatch("a sum outside the integer range".to_string()))?;
                }
                Term::Real(f) => {
                    return Err(mismatch(format!("non-integer operand {f}")));
                }
            }
        }
        return Ok(PropertyValue::Integer(total));
    }

    let total: f64 = terms
        .iter()
        .map(|term| match term {
            Term::Int(i) => *i as f64,
            Term::Real(f) => *f,
        })
        .sum();
    if !decl.ty.can_represent(total) {
        return Err(mismatch(format!("a sum outside the {} range", decl.ty)));
    }
    Ok(PropertyValue::from_number(decl.ty, total))
}

fn parse_expr(decl: &PropertyDeclaration) -> Result<Expr, ResolveError> {
    match decl.ty {
        PropertyType::Regex => Ok(Expr::Literal),
        PropertyType::String => match &decl.raw {
            RawValue::Text(text) if text.contains('$') => {
                let segments = parse_template(decl, text)?;
                if segments.iter().all(|s| matches!(s, Segment::Text(_))) && !text.contains("$$") {
                    Ok(Expr::Literal)
                } else {
                    Ok(Expr::Template(segments))
                }
            }
            _ => Ok(Expr::Literal),
        },
        PropertyType::Boolean => match decl.raw.expression() {
            None => Ok(Expr::Literal),
            Some(text) => match parse_template(decl, text.trim())?.as_slice() {
                [Segment::Ref(name)] => Ok(Expr::Alias(name.clone())),
                _ => Err(ResolveError::UnsupportedOperator {
                    name: decl.name.clone(),
                    expression: text.to_string(),
                }),
            },
        },
        PropertyType::Integer | PropertyType::Float | PropertyType::Double => {
            match decl.raw.expression() {
                None => Ok(Expr::Literal),
                Some(text) => parse_sum(decl, text).map(Expr::Sum),
            }
        }
    }
}

fn parse_template(decl: &PropertyDeclaration, text: &str) -> Result<Vec<Segment>, ResolveError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            literal.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                literal.push('$');
            }
            Some('{') => {
                chars.next();
                let name = placeholder(decl, &mut chars)?;
                if !literal.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Ref(name));
            }
            _ => literal.push('$'),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Text(literal));
    }
    Ok(segments)
}

/// Reads a placeholder name up to the closing `}`; the `${` is already consumed.
fn placeholder(decl: &PropertyDeclaration, chars: &mut Peekable<Chars<'_>>) -> Result<String, ResolveError> {
    let mut name = String::new();
    for ch in chars.by_ref() {
        if ch == '}' {
            let name = name.trim().to_string();
            if name.is_empty() {
                break;
            }
            return Ok(name);
        }
        name.push(ch);
    }
    Err(ResolveError::Syntax {
        document: decl.origin.document.clone(),
        line: decl.origin.line,
        reason: format!("property '{}' has an empty or unclosed '${{' placeholder", decl.name),
    })
}

/// Parses `operand (+ operand)*`, where an operand is a placeholder or a number.
fn parse_sum(decl: &PropertyDeclaration, text: &str) -> Result<Vec<Operand>, ResolveError> {
    let unsupported = || ResolveError::UnsupportedOperator {
        name: decl.name.clone(),
        expression: text.to_string(),
    };

    let mut operands = Vec::new();
    let mut expect_operand = true;
    let mut chars = text.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if expect_operand {
            if ch == '$' {
                chars.next();
                if chars.next() != Some('{') {
                    return Err(unsupported());
                }
                operands.push(Operand::Ref(placeholder(decl, &mut chars)?));
            } else if ch.is_ascii_digit() || ch == '.' {
                let mut number = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '.' {
                        number.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                operands.push(Operand::Number(number));
            } else {
                return Err(unsupported());
            }
            expect_operand = false;
        } else if ch == '+' {
            chars.next();
            expect_operand = true;
        } else {
            return Err(unsupported());
        }
    }

    if expect_operand {
        return Err(unsupported());
    }
    Ok(operands)
}
