//! Parser entry point for the expression language.
//!
//! Unlike a statement-level query language, this grammar only ever parses
//! one production: a single expression. There is no program, no statement
//! sequencing, and no error recovery across statement boundaries — a
//! syntax error here simply fails the whole `compile` call.

pub mod base;
pub mod expression;

use crate::ast::Expr;
use crate::diag::{Diag, SourceFile, convert_diag_to_report};
use crate::lexer;
use miette::Report;

pub use base::{ParseError, ParseResult, TokenStream, merge_spans};

/// Parses expression source text into an AST.
///
/// This runs the lexer and parser in sequence and is the primary entry
/// point the compiler (`crate::compiler::compile`) calls before synthesizing
/// node metadata.
pub fn parse(source: &str) -> Result<Expr, Report> {
    let tokens = lexer::tokenize(source).map_err(|diag| render(&diag, source))?;
    expression::parse_expression(&tokens).map_err(|diag| render(&diag, source))
}

fn render(diag: &Diag, source: &str) -> Report {
    let source_file = SourceFile::new(source);
    convert_diag_to_report(diag, &source_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;

    #[test]
    fn parses_simple_expression() {
        let expr = parse("1 + 2").unwrap();
        assert!(matches!(expr.kind, ExprKind::Binary { .. }));
    }

    #[test]
    fn surfaces_lexer_errors_as_reports() {
        let err = parse("#").unwrap_err();
        assert!(format!("{err:?}").len() > 0);
    }

    #[test]
    fn surfaces_parser_errors_as_reports() {
        let err = parse("1 +").unwrap_err();
        assert!(format!("{err:?}").len() > 0);
    }

    #[test]
    fn rejects_empty_source() {
        assert!(parse("").is_err());
    }
}
