//! Canonical source reprinting, per spec.md §4.4.
//!
//! `normalize` is a deterministic unparse of the AST: every compiled
//! expression's `source` field is produced by this function, never by
//! slicing the original input text, so that two textually different but
//! structurally identical expressions (`a.b` vs `$.a.b`) compile to the
//! same cache key.

use super::analyzer::is_scalar;
use crate::ast::{BinaryOp, CompareOp, Expr, ExprKind, LogicalOp, PathRoot, PathSegment, Quantifier, UnaryOp};

const PREC_OR: u8 = 0;
const PREC_AND: u8 = 1;
const PREC_PREDICATE: u8 = 2;
const PREC_ADDITIVE: u8 = 3;
const PREC_MULTIPLICATIVE: u8 = 4;
const PREC_UNARY: u8 = 5;
const PREC_ATOM: u8 = 6;

/// Renders `expr` to its canonical source string.
pub fn normalize(expr: &Expr) -> String {
    render(expr).0
}

fn render(expr: &Expr) -> (String, u8) {
    match &expr.kind {
        ExprKind::Paren(inner) => render(inner),

        ExprKind::Int(n) => (n.to_string(), PREC_ATOM),
        ExprKind::Double(d) => (format_double(*d), PREC_ATOM),
        ExprKind::Str(s) => (format_string(s), PREC_ATOM),
        ExprKind::Bool(b) => ((if *b { "TRUE" } else { "FALSE" }).to_string(), PREC_ATOM),
        ExprKind::Null => ("NULL".to_string(), PREC_ATOM),

        ExprKind::Array(items) => {
            let parts: Vec<String> = items.iter().map(|e| render(e).0).collect();
            (format!("[{}]", parts.join(",")), PREC_ATOM)
        }
        ExprKind::Document(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}:{}", format_ident(k), render(v).0))
                .collect();
            (format!("{{{}}}", parts.join(",")), PREC_ATOM)
        }

        ExprKind::Parameter(name) => (format!("@{name}"), PREC_ATOM),

        ExprKind::Call { name, args } => {
            let parts: Vec<String> = args.iter().map(|e| render(e).0).collect();
            (format!("{}({})", name.to_ascii_uppercase(), parts.join(",")), PREC_ATOM)
        }

        ExprKind::Path { root, segments } => (render_path(*root, segments), PREC_ATOM),
        ExprKind::Source => ("*".to_string(), PREC_ATOM),

        ExprKind::Map { source, projection } => (
            format!("MAP({}=>{})", render(source).0, render(projection).0),
            PREC_ATOM,
        ),
        ExprKind::Filter { source, predicate } => (
            format!("FILTER({}=>{})", render(source).0, render(predicate).0),
            PREC_ATOM,
        ),

        ExprKind::Unary { op, operand } => {
            let sign = match op {
                UnaryOp::Plus => "+",
                UnaryOp::Minus => "-",
            };
            let operand_text = wrap_if(operand, |p| p < PREC_UNARY);
            (format!("{sign}{operand_text}"), PREC_UNARY)
        }

        ExprKind::Binary { op, left, right } => {
            let prec = binary_prec(*op);
            let sym = binary_symbol(*op);
            let l = wrap_if(left, |p| p < prec);
            let r = wrap_if(right, |p| p <= prec);
            (format!("{l}{sym}{r}"), prec)
        }

        ExprKind::Compare { op, quantifier, left, right } => {
            let show_quant = !is_scalar(left);
            let l = wrap_if(left, |p| p < PREC_ADDITIVE);
            let r = wrap_if(right, |p| p < PREC_ADDITIVE);
            let sym = compare_symbol(*op);
            let text = if show_quant {
                format!("{l} {}{sym}{r}", quantifier_word(*quantifier))
            } else {
                format!("{l}{sym}{r}")
            };
            (text, PREC_PREDICATE)
        }

        ExprKind::Between { quantifier, value, low, high } => {
            let show_quant = !is_scalar(value);
            let v = wrap_if(value, |p| p < PREC_ADDITIVE);
            let lo = wrap_if(low, |p| p < PREC_ADDITIVE);
            let hi = wrap_if(high, |p| p < PREC_ADDITIVE);
            let keyword = if show_quant {
                format!("{} BETWEEN", quantifier_word(*quantifier))
            } else {
                "BETWEEN".to_string()
            };
            (format!("{v} {keyword} {lo} AND {hi}"), PREC_PREDICATE)
        }

        ExprKind::Like { quantifier, value, pattern } => {
            let show_quant = !is_scalar(value);
            let v = wrap_if(value, |p| p < PREC_ADDITIVE);
            let pat = wrap_if(pattern, |p| p < PREC_ADDITIVE);
            let keyword = if show_quant {
                format!("{} LIKE", quantifier_word(*quantifier))
            } else {
                "LIKE".to_string()
            };
            (format!("{v} {keyword} {pat}"), PREC_PREDICATE)
        }

        ExprKind::In { quantifier, value, set } => {
            let show_quant = !is_scalar(value);
            let v = wrap_if(value, |p| p < PREC_ADDITIVE);
            let s = wrap_if(set, |p| p < PREC_ADDITIVE);
            let keyword = if show_quant {
                format!("{} IN", quantifier_word(*quantifier))
            } else {
                "IN".to_string()
            };
            (format!("{v} {keyword} {s}"), PREC_PREDICATE)
        }

        ExprKind::Logical { op, left, right } => {
            let (prec, keyword) = match op {
                LogicalOp::And => (PREC_AND, "AND"),
                LogicalOp::Or => (PREC_OR, "OR"),
            };
            let l = wrap_if(left, |p| p < prec);
            let r = wrap_if(right, |p| p <= prec);
            (format!("{l} {keyword} {r}"), prec)
        }
    }
}

fn wrap_if(expr: &Expr, needs_parens: impl Fn(u8) -> bool) -> String {
    let (text, prec) = render(expr);
    if needs_parens(prec) {
        format!("({text})")
    } else {
        text
    }
}

fn binary_prec(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Subtract => PREC_ADDITIVE,
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => PREC_MULTIPLICATIVE,
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
    }
}

fn compare_symbol(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Equal => "=",
        CompareOp::NotEqual => "!=",
        CompareOp::Greater => ">",
        CompareOp::GreaterOrEqual => ">=",
        CompareOp::Less => "<",
        CompareOp::LessOrEqual => "<=",
    }
}

fn quantifier_word(q: Quantifier) -> &'static str {
    match q {
        Quantifier::Any => "ANY",
        Quantifier::All => "ALL",
    }
}

fn render_path(root: PathRoot, segments: &[PathSegment]) -> String {
    let mut out = match root {
        PathRoot::Root => "$".to_string(),
        PathRoot::Current => "@".to_string(),
    };
    for segment in segments {
        match segment {
            PathSegment::Field(name) => {
                out.push('.');
                out.push_str(&format_ident(name));
            }
            PathSegment::Index(i) => out.push_str(&format!("[{i}]")),
            PathSegment::Wildcard => out.push_str("[*]"),
            PathSegment::Filter(pred) => out.push_str(&format!("[{}]", render(pred).0)),
        }
    }
    out
}

/// Bare if safe (`[A-Za-z0-9_]+`), else bracketed with a quoted string
/// (spec.md §4.4: `$.["my key"]`).
fn format_ident(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("[{}]", format_string(name))
    }
}

fn format_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Integers print with no decimal point; doubles print with at least
/// one decimal digit and no trailing zeros beyond that (`5.0`, `5.001`).
fn format_double(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::expression::parse_expression;

    fn normalize_source(source: &str) -> String {
        let tokens = tokenize(source).expect("lexer failure in test fixture");
        let expr = parse_expression(&tokens).expect("parser failure in test fixture");
        normalize(&expr)
    }

    #[test]
    fn bare_identifier_normalizes_to_dollar_path() {
        assert_eq!(normalize_source("Name"), "$.Name");
    }

    #[test]
    fn postfix_wildcard_access_lowers_to_map_with_quantifier() {
        assert_eq!(
            normalize_source("items[*].id any=5"),
            "MAP($.items[*]=>@.id) ANY=5"
        );
    }

    #[test]
    fn arithmetic_operators_print_without_spaces() {
        assert_eq!(normalize_source("1 + 1"), "1+1");
    }

    #[test]
    fn precedence_reprints_parens_only_where_needed() {
        assert_eq!(normalize_source("(1 + 1) / 3"), "(1+1)/3");
        assert_eq!(normalize_source("1 + 1 / 3"), "1+1/3");
    }

    #[test]
    fn double_literals_keep_minimal_trailing_digits() {
        assert_eq!(normalize_source("5.0"), "5.0");
        assert_eq!(normalize_source("5.001"), "5.001");
    }

    #[test]
    fn bracketed_field_name_for_unsafe_identifier() {
        assert_eq!(normalize_source("$.[\"my key\"]"), "$.[\"my key\"]");
    }

    #[test]
    fn function_names_are_uppercased() {
        assert_eq!(normalize_source("upper(\"a\")"), "UPPER(\"a\")");
    }

    #[test]
    fn logical_operators_are_uppercased_and_spaced() {
        assert_eq!(normalize_source("a AND b"), "$.a AND $.b");
        assert_eq!(normalize_source("a or b"), "$.a OR $.b");
    }

    #[test]
    fn scalar_comparison_has_no_quantifier_or_spaces() {
        assert_eq!(normalize_source("$.a = 1"), "$.a=1");
    }

    #[test]
    fn round_trip_is_idempotent() {
        let once = normalize_source("items[*].id any=5");
        let twice = normalize_source(&once);
        assert_eq!(once, twice);
    }
}
