//! MSBuild `Condition` attributes on `<PropertyGroup>` and property elements.
//!
//! Two separate views of a condition are provided:
//!
//! - [`Selection::matches`]: the narrow, string-based test used to decide
//!   whether a property group applies to a configuration/platform pair.
//!   Whitespace is removed and the result must equal one of
//!   `'$(Configuration)'=='X'` or `'$(Configuration)|$(Platform)'=='X|Y'`
//!   exactly.  No boolean logic is evaluated.
//! - [`parse_comparison`]: a small [`chumsky`] grammar for a single
//!   `'lhs' op 'rhs'` comparison, used to recognise "not yet set" sentinels
//!   such as `'$(Configuration)' == ''` and to list the configurations a
//!   project declares.
//!
//! ## Grammar
//!
//! ```text
//! comparison = quoted ('==' | '!=') quoted
//! quoted     = "'" chars "'"
//! ```

use chumsky::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════════
//  Selection matching
// ═══════════════════════════════════════════════════════════════════════════════

/// Remove every whitespace character from a condition.
pub fn normalize(condition: &str) -> String {
    condition.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The configuration/platform pair a resolution is performed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub configuration: String,
    pub platform: String,
}

impl Selection {
    pub fn new(configuration: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            platform: platform.into(),
        }
    }

    /// The two condition spellings that select this pair.
    fn candidates(&self) -> [String; 2] {
        let Self { configuration, platform } = self;
        [
            format!("'$(Configuration)'=='{configuration}'"),
            format!("'$(Configuration)|$(Platform)'=='{configuration}|{platform}'"),
        ]
    }

    /// Whether `condition` selects this pair.
    pub fn matches(&self, condition: &str) -> bool {
        let condition = normalize(condition);
        self.candidates().iter().any(|c| *c == condition)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  AST
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed `'lhs' op 'rhs'` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub lhs: Vec<ExprValue>,
    pub op: CompareOp,
    pub rhs: Vec<ExprValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

/// A fragment of a quoted value that may contain `$(Variable)` references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprValue {
    Literal(String),
    Variable(String),
}

impl Comparison {
    /// `true` for `'$(variable)' == ''`, the form MSBuild projects use to
    /// give a property its default only when nobody supplied one.
    pub fn is_unset_check(&self, variable: &str) -> bool {
        let lhs: Vec<&ExprValue> = significant(&self.lhs).collect();
        self.op == CompareOp::Equal
            && significant(&self.rhs).next().is_none()
            && matches!(lhs.as_slice(), [ExprValue::Variable(name)] if name == variable)
    }

    /// Decode `'$(A)|$(B)' == 'x|y'` into `[("A", "x"), ("B", "y")]`.
    ///
    /// Returns `None` for anything that is not an equality between
    /// `|`-separated variables and `|`-separated literal values.
    pub fn bindings(&self) -> Option<Vec<(String, String)>> {
        if self.op != CompareOp::Equal {
            return None;
        }

        let mut names = Vec::new();
        for part in significant(&self.lhs) {
            match part {
                ExprValue::Variable(name) => names.push(name.clone()),
                ExprValue::Literal(sep) if sep.trim() == "|" => {}
                ExprValue::Literal(_) => return None,
            }
        }

        let mut value = String::new();
        for part in &self.rhs {
            match part {
                ExprValue::Literal(s) => value.push_str(s),
                ExprValue::Variable(_) => return None,
            }
        }

        let values: Vec<&str> = value.split('|').map(str::trim).collect();
        if names.is_empty() || names.len() != values.len() {
            return None;
        }

        Some(
            names
                .into_iter()
                .zip(values.into_iter().map(String::from))
                .collect(),
        )
    }
}

/// Skip whitespace-only literals (e.g. the spaces in `' $(Config) '`).
fn significant(parts: &[ExprValue]) -> impl Iterator<Item = &ExprValue> {
    parts
        .iter()
        .filter(|p| !matches!(p, ExprValue::Literal(s) if s.trim().is_empty()))
}

// ═══════════════════════════════════════════════════════════════════════════════
//  String-part splitting
// ═══════════════════════════════════════════════════════════════════════════════

/// Split text into literal and `$(Variable)` fragments.
pub(crate) fn parse_string_parts(s: &str) -> Vec<ExprValue> {
    let mut parts = Vec::new();
    let mut rest = s;

    while let Some(start) = rest.find("$(") {
        if start > 0 {
            parts.push(ExprValue::Literal(rest[..start].to_string()));
        }
        // An unterminated reference runs to the end of the text.
        let after = &rest[start + 2..];
        let (name, tail) = after.split_once(')').unwrap_or((after, ""));
        parts.push(ExprValue::Variable(name.to_string()));
        rest = tail;
    }

    if !rest.is_empty() {
        parts.push(ExprValue::Literal(rest.to_string()));
    }

    parts
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Chumsky parser
// ═══════════════════════════════════════════════════════════════════════════════

fn comparison_parser<'a>() -> impl Parser<'a, &'a str, Comparison, extra::Err<Simple<'a, char>>> {
    let quoted = just('\'')
        .ignore_then(none_of('\'').repeated().to_slice())
        .then_ignore(just('\''))
        .map(parse_string_parts);

    let cmp_op = just("==")
        .to(CompareOp::Equal)
        .or(just("!=").to(CompareOp::NotEqual));

    quoted
        .clone()
        .padded()
        .then(cmp_op.padded())
        .then(quoted.padded())
        .map(|((lhs, op), rhs)| Comparison { lhs, op, rhs })
}

/// Parse a condition attribute consisting of a single comparison.
pub fn parse_comparison(input: &str) -> Result<Comparison, String> {
    comparison_parser()
        .parse(input)
        .into_result()
        .map_err(|errs| {
            let messages: Vec<String> = errs.iter().map(|e| format!("{e}")).collect();
            format!(
                "Failed to parse condition '{}': {}",
                input,
                messages.join("; ")
            )
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
