#![allow(rustdoc::broken_intra_doc_links)]
//! An embedded document store's expression sublanguage and query
//! optimizer: lexing, parsing, compiling, and evaluating path-and-
//! predicate expressions against schema-flexible documents, plus
//! translating a structured query into an indexed execution plan.
//!
//! # Compile and evaluate an expression
//!
//! ```
//! use docquery::compiler::compile;
//! use docquery::value::{Document, Value};
//!
//! let expr = compile("$.age > 18", None).unwrap();
//! let mut doc = Document::new();
//! doc.insert("age", Value::Int64(42)).unwrap();
//! let root = Value::Document(doc);
//!
//! let result = expr.execute_scalar(Some(&root), None, None);
//! assert_eq!(result, Value::Boolean(true));
//! ```
//!
//! # Plan a query
//!
//! ```
//! use docquery::compiler::compile;
//! use docquery::planner::{optimize, IndexDescriptor, Query, StaticSnapshot};
//!
//! let query = Query::new(compile("$", None).unwrap());
//! let snapshot = StaticSnapshot::new("people", vec![IndexDescriptor::primary_key(0)]);
//! let plan = optimize(&query, &snapshot).unwrap();
//! assert_eq!(plan.index_expression, "$._id");
//! ```

pub mod ast;
pub mod compiler;
pub mod diag;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod planner;
pub mod value;

pub use ast::Span;
pub use compiler::{compile, compile_for_index, CompileOptions, Expression};
pub use error::Error;
pub use value::{Document, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_accessible() {
        let _span: Span = 0..5;
    }

    #[test]
    fn compile_is_reexported_at_crate_root() {
        let expr = compile("1 + 1", None).unwrap();
        assert_eq!(expr.execute_scalar(None, None, None), Value::Int32(2));
    }

    #[test]
    fn compile_for_index_is_reexported_at_crate_root() {
        assert!(compile_for_index("$.Name").is_ok());
        assert!(compile_for_index("UPPER($.Name)").is_err());
    }
}
