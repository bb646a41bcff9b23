//! Expression parsing: a precedence-climbing descent over the token stream.
//!
//! Grammar (decreasing precedence): `orExpr -> andExpr -> predicate ->
//! additive -> multiplicative -> unary -> postfix -> atom`. Comparisons,
//! `BETWEEN`, `LIKE`, and `IN` all live at the `predicate` level and are
//! non-chaining; `AND`/`OR` are separate levels above them so `a = 1 AND b
//! = 2` parses as `(a = 1) AND (b = 2)`, never as a chained comparison.

use crate::ast::{
    BinaryOp, CompareOp, Expr, ExprKind, LogicalOp, PathRoot, PathSegment, Quantifier, Span,
    UnaryOp,
};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::base::{merge_spans, ParseResult, TokenStream};
use smol_str::SmolStr;

/// Recursion guard for the parser's expression-level descent. Rust's
/// default thread stack is far smaller than the CLR's, so deeply nested
/// input (`((((((...))))))`) needs an explicit bound rather than relying on
/// a stack overflow to fail gracefully.
const MAX_EXPRESSION_DEPTH: usize = 200;

/// Parses a complete expression from a token slice, rejecting trailing
/// tokens after the expression ends.
pub fn parse_expression(tokens: &[Token]) -> ParseResult<Expr> {
    parse_expression_with_depth(tokens, MAX_EXPRESSION_DEPTH)
}

/// Same as [`parse_expression`], but with a caller-chosen recursion-depth
/// guard instead of the default `MAX_EXPRESSION_DEPTH` — the knob
/// `compiler::CompileOptions::max_depth` plugs into.
pub fn parse_expression_with_depth(tokens: &[Token], max_depth: usize) -> ParseResult<Expr> {
    let mut normalized = tokens.to_vec();
    match normalized.last() {
        Some(t) if t.kind == TokenKind::Eof => {}
        Some(t) => {
            let pos = t.span.end;
            normalized.push(Token::new(TokenKind::Eof, "", pos..pos));
        }
        None => normalized.push(Token::new(TokenKind::Eof, "", 0..0)),
    }

    let mut parser = ExpressionParser::with_max_depth(&normalized, max_depth);
    let expr = parser.parse_expression()?;

    if parser.stream.current().kind != TokenKind::Eof {
        return Err(parser.stream.error_here_with_code(
            format!(
                "unexpected trailing token {} after expression",
                parser.stream.current().kind
            ),
            "UnexpectedToken",
        ));
    }

    Ok(expr)
}

pub struct ExpressionParser<'a> {
    stream: TokenStream<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_max_depth(tokens, MAX_EXPRESSION_DEPTH)
    }

    pub fn with_max_depth(tokens: &'a [Token], max_depth: usize) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            depth: 0,
            max_depth,
        }
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_or_expression()
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self
                .stream
                .error_here_with_code("expression nested too deeply", "UnexpectedToken"));
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.stream.peek().map(|t| &t.kind) == Some(kind)
    }

    fn current_word(&self) -> Option<&SmolStr> {
        match &self.stream.current().kind {
            TokenKind::Word(s) => Some(s),
            _ => None,
        }
    }

    fn is_word_ci(&self, kw: &str) -> bool {
        self.current_word().is_some_and(|w| w.eq_ignore_ascii_case(kw))
    }

    fn parse_or_expression(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let mut left = self.parse_and_expression()?;
        while self.is_word_ci("OR") {
            self.stream.advance();
            let right = self.parse_and_expression()?;
            let span = merge_spans(&left.span, &right.span);
            left = Expr::new(
                ExprKind::Logical {
                    op: LogicalOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        self.exit();
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let mut left = self.parse_predicate()?;
        while self.is_word_ci("AND") {
            self.stream.advance();
            let right = self.parse_predicate()?;
            let span = merge_spans(&left.span, &right.span);
            left = Expr::new(
                ExprKind::Logical {
                    op: LogicalOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        self.exit();
        Ok(left)
    }

    fn peek_is_predicate_operator(&self) -> bool {
        match self.stream.peek().map(|t| &t.kind) {
            Some(
                TokenKind::Equals
                | TokenKind::NotEquals
                | TokenKind::Greater
                | TokenKind::GreaterOrEquals
                | TokenKind::Less
                | TokenKind::LessOrEquals,
            ) => true,
            Some(TokenKind::Word(s)) => {
                s.eq_ignore_ascii_case("BETWEEN")
                    || s.eq_ignore_ascii_case("LIKE")
                    || s.eq_ignore_ascii_case("IN")
            }
            _ => false,
        }
    }

    fn try_parse_quantifier(&mut self) -> Quantifier {
        let quant = if self.is_word_ci("ANY") {
            Some(Quantifier::Any)
        } else if self.is_word_ci("ALL") {
            Some(Quantifier::All)
        } else {
            None
        };
        let Some(quant) = quant else {
            return Quantifier::default();
        };
        if self.peek_is_predicate_operator() {
            self.stream.advance();
            quant
        } else {
            Quantifier::default()
        }
    }

    fn try_parse_compare_op(&mut self) -> Option<CompareOp> {
        let op = match self.stream.current().kind {
            TokenKind::Equals => CompareOp::Equal,
            TokenKind::NotEquals => CompareOp::NotEqual,
            TokenKind::Greater => CompareOp::Greater,
            TokenKind::GreaterOrEquals => CompareOp::GreaterOrEqual,
            TokenKind::Less => CompareOp::Less,
            TokenKind::LessOrEquals => CompareOp::LessOrEqual,
            _ => return None,
        };
        self.stream.advance();
        Some(op)
    }

    fn parse_predicate(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let left = self.parse_additive()?;
        let quantifier = self.try_parse_quantifier();

        let result = if let Some(op) = self.try_parse_compare_op() {
            let right = self.parse_additive()?;
            let span = merge_spans(&left.span, &right.span);
            Expr::new(
                ExprKind::Compare {
                    op,
                    quantifier,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            )
        } else if self.is_word_ci("BETWEEN") {
            self.stream.advance();
            let low = self.parse_additive()?;
            if !self.is_word_ci("AND") {
                return Err(self
                    .stream
                    .error_here_with_code("expected AND in BETWEEN expression", "UnexpectedToken"));
            }
            self.stream.advance();
            let high = self.parse_additive()?;
            let span = merge_spans(&left.span, &high.span);
            Expr::new(
                ExprKind::Between {
                    quantifier,
                    value: Box::new(left),
                    low: Box::new(low),
                    high: Box::new(high),
                },
                span,
            )
        } else if self.is_word_ci("LIKE") {
            self.stream.advance();
            let pattern = self.parse_additive()?;
            let span = merge_spans(&left.span, &pattern.span);
            Expr::new(
                ExprKind::Like {
                    quantifier,
                    value: Box::new(left),
                    pattern: Box::new(pattern),
                },
                span,
            )
        } else if self.is_word_ci("IN") {
            self.stream.advance();
            let set = self.parse_additive()?;
            let span = merge_spans(&left.span, &set.span);
            Expr::new(
                ExprKind::In {
                    quantifier,
                    value: Box::new(left),
                    set: Box::new(set),
                },
                span,
            )
        } else {
            left
        };

        self.exit();
        Ok(result)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.stream.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.stream.advance();
            let right = self.parse_multiplicative()?;
            let span = merge_spans(&left.span, &right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        self.exit();
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.stream.current().kind {
                TokenKind::Asterisk => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                TokenKind::Percent => BinaryOp::Modulo,
                _ => break,
            };
            self.stream.advance();
            let right = self.parse_unary()?;
            let span = merge_spans(&left.span, &right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        self.exit();
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let result = match self.stream.current().kind {
            TokenKind::Plus => {
                let start = self.stream.current().span.start;
                self.stream.advance();
                let operand = self.parse_postfix()?;
                let span = start..operand.span.end;
                Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Plus,
                        operand: Box::new(operand),
                    },
                    span,
                )
            }
            TokenKind::Minus => {
                let start = self.stream.current().span.start;
                self.stream.advance();
                let operand = self.parse_postfix()?;
                let span = start..operand.span.end;
                Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Minus,
                        operand: Box::new(operand),
                    },
                    span,
                )
            }
            _ => self.parse_postfix()?,
        };
        self.exit();
        Ok(result)
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let atom = self.parse_atom()?;
        let result = self.continue_postfix(atom)?;
        self.exit();
        Ok(result)
    }

    /// Consumes a run of `.field` / `[...]` postfix operators against
    /// `expr`, lowering to `MAP` whenever access continues past a `[*]` or
    /// `[predicate]` segment, or off the bare `*` source.
    fn continue_postfix(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            if matches!(self.stream.current().kind, TokenKind::Dot) {
                let dot_start = self.stream.current().span.start;
                self.stream.advance();
                let (name, name_span) = self.parse_field_name_after_dot()?;
                let seg_span = dot_start..name_span.end;
                expr = self.attach_segment(expr, PathSegment::Field(name), seg_span)?;
                continue;
            }
            if matches!(self.stream.current().kind, TokenKind::OpenBracket) {
                let start = self.stream.current().span.start;
                self.stream.advance();
                let segment = self.parse_filter_or_index()?;
                let end = self.stream.expect(TokenKind::CloseBracket)?.end;
                expr = self.attach_segment(expr, segment, start..end)?;
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn needs_projection_lowering(expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Source => true,
            ExprKind::Path { segments, .. } => matches!(
                segments.last(),
                Some(PathSegment::Wildcard) | Some(PathSegment::Filter(_))
            ),
            _ => false,
        }
    }

    fn attach_segment(
        &mut self,
        expr: Expr,
        segment: PathSegment,
        seg_span: Span,
    ) -> ParseResult<Expr> {
        if Self::needs_projection_lowering(&expr) {
            let inner_path = Expr::new(
                ExprKind::Path {
                    root: PathRoot::Current,
                    segments: vec![segment],
                },
                seg_span,
            );
            let projection = self.continue_postfix(inner_path)?;
            let span = expr.span.start..projection.span.end;
            return Ok(Expr::new(
                ExprKind::Map {
                    source: Box::new(expr),
                    projection: Box::new(projection),
                },
                span,
            ));
        }

        let start = expr.span.start;
        match expr.kind {
            ExprKind::Path { root, mut segments } => {
                segments.push(segment);
                Ok(Expr::new(ExprKind::Path { root, segments }, start..seg_span.end))
            }
            _ => Err(self
                .stream
                .error_here_with_code("postfix access is only valid on a path", "UnexpectedToken")),
        }
    }

    fn parse_field_name_after_dot(&mut self) -> ParseResult<(SmolStr, Span)> {
        match self.stream.current().kind.clone() {
            TokenKind::Word(name) => {
                let span = self.stream.current().span.clone();
                self.stream.advance();
                Ok((name, span))
            }
            TokenKind::OpenBracket => {
                let start = self.stream.current().span.start;
                self.stream.advance();
                let name = match self.stream.current().kind.clone() {
                    TokenKind::String(s) => {
                        self.stream.advance();
                        s
                    }
                    _ => {
                        return Err(self.stream.error_here_with_code(
                            "expected string literal in bracketed field access",
                            "UnexpectedToken",
                        ));
                    }
                };
                let end = self.stream.expect(TokenKind::CloseBracket)?.end;
                Ok((name, start..end))
            }
            _ => Err(self.stream.error_here_with_code(
                format!("expected property name, found {}", self.stream.current().kind),
                "UnexpectedToken",
            )),
        }
    }

    fn parse_filter_or_index(&mut self) -> ParseResult<PathSegment> {
        if matches!(self.stream.current().kind, TokenKind::Asterisk) {
            self.stream.advance();
            return Ok(PathSegment::Wildcard);
        }
        if let TokenKind::Int(text) = self.stream.current().kind.clone() {
            if self.peek_is(&TokenKind::CloseBracket) {
                self.stream.advance();
                let value: i64 = text.parse().map_err(|_| {
                    self.stream
                        .error_here_with_code("invalid array index", "UnexpectedToken")
                })?;
                return Ok(PathSegment::Index(value));
            }
        }
        let expr = self.parse_expression()?;
        Ok(PathSegment::Filter(Box::new(expr)))
    }

    fn parse_atom(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let result = self.parse_atom_inner();
        self.exit();
        result
    }

    fn parse_atom_inner(&mut self) -> ParseResult<Expr> {
        let token = self.stream.current().clone();
        match &token.kind {
            TokenKind::Int(text) => {
                self.stream.advance();
                let value = text.parse::<i64>().map_err(|_| {
                    self.stream
                        .error_here_with_code("invalid integer literal", "UnexpectedToken")
                })?;
                Ok(Expr::new(ExprKind::Int(value), token.span))
            }
            TokenKind::Double(text) => {
                self.stream.advance();
                let value = text.parse::<f64>().map_err(|_| {
                    self.stream
                        .error_here_with_code("invalid double literal", "UnexpectedToken")
                })?;
                Ok(Expr::new(ExprKind::Double(value), token.span))
            }
            TokenKind::String(text) => {
                self.stream.advance();
                Ok(Expr::new(ExprKind::Str(text.clone()), token.span))
            }
            TokenKind::Asterisk => {
                self.stream.advance();
                Ok(Expr::new(ExprKind::Source, token.span))
            }
            TokenKind::Dollar => {
                self.stream.advance();
                Ok(Expr::new(
                    ExprKind::Path {
                        root: PathRoot::Root,
                        segments: Vec::new(),
                    },
                    token.span,
                ))
            }
            TokenKind::At => self.parse_at(token.span.clone()),
            TokenKind::OpenBrace => self.parse_document_init(),
            TokenKind::OpenBracket => self.parse_array_init(),
            TokenKind::OpenParen => {
                self.stream.advance();
                let inner = self.parse_expression()?;
                let end = self.stream.expect(TokenKind::CloseParen)?.end;
                let span = token.span.start..end;
                Ok(Expr::new(ExprKind::Paren(Box::new(inner)), span))
            }
            TokenKind::Word(w) => {
                let word = w.clone();
                self.parse_word_atom(word, token.span)
            }
            _ => Err(self.stream.error_here_with_code(
                format!("expected expression, found {}", token.kind),
                "UnexpectedToken",
            )),
        }
    }

    fn parse_word_atom(&mut self, word: SmolStr, span: Span) -> ParseResult<Expr> {
        let upper = word.to_ascii_uppercase();
        match upper.as_str() {
            "TRUE" => {
                self.stream.advance();
                Ok(Expr::new(ExprKind::Bool(true), span))
            }
            "FALSE" => {
                self.stream.advance();
                Ok(Expr::new(ExprKind::Bool(false), span))
            }
            "NULL" => {
                self.stream.advance();
                Ok(Expr::new(ExprKind::Null, span))
            }
            "AND" | "OR" | "BETWEEN" | "LIKE" | "IN" | "ANY" | "ALL" => {
                Err(self.stream.error_here_with_code(
                    format!("'{word}' is a reserved word and cannot start an expression"),
                    "UnexpectedToken",
                ))
            }
            "MAP" if self.peek_is(&TokenKind::OpenParen) => self.parse_map_or_filter(true, span),
            "FILTER" if self.peek_is(&TokenKind::OpenParen) => {
                self.parse_map_or_filter(false, span)
            }
            _ => {
                self.stream.advance();
                if matches!(self.stream.current().kind, TokenKind::OpenParen) {
                    self.parse_call(word, span.start)
                } else {
                    Ok(Expr::new(
                        ExprKind::Path {
                            root: PathRoot::Root,
                            segments: vec![PathSegment::Field(word)],
                        },
                        span,
                    ))
                }
            }
        }
    }

    fn parse_map_or_filter(&mut self, is_map: bool, start_span: Span) -> ParseResult<Expr> {
        let start = start_span.start;
        self.stream.advance(); // consume MAP / FILTER
        self.stream.expect(TokenKind::OpenParen)?;
        let source = self.parse_expression()?;
        self.stream.expect(TokenKind::Equals)?;
        self.stream.expect(TokenKind::Greater)?;
        let second = self.parse_expression()?;
        let end = self.stream.expect(TokenKind::CloseParen)?.end;
        let span = start..end;
        let kind = if is_map {
            ExprKind::Map {
                source: Box::new(source),
                projection: Box::new(second),
            }
        } else {
            ExprKind::Filter {
                source: Box::new(source),
                predicate: Box::new(second),
            }
        };
        Ok(Expr::new(kind, span))
    }

    fn parse_call(&mut self, name: SmolStr, start: usize) -> ParseResult<Expr> {
        self.stream.expect(TokenKind::OpenParen)?;
        let mut args = Vec::new();
        if !matches!(self.stream.current().kind, TokenKind::CloseParen) {
            loop {
                args.push(self.parse_expression()?);
                if matches!(self.stream.current().kind, TokenKind::Comma) {
                    self.stream.advance();
                    continue;
                }
                break;
            }
        }
        let end = self.stream.expect(TokenKind::CloseParen)?.end;
        Ok(Expr::new(ExprKind::Call { name, args }, start..end))
    }

    /// `@` starts either a parameter reference (`@0`, `@name`) or, when not
    /// immediately glued to an int/word, the bare `current` path root bound
    /// by an enclosing `MAP`/`FILTER` (`@.price`, `@`).
    fn parse_at(&mut self, span: Span) -> ParseResult<Expr> {
        match self.stream.peek().map(|t| &t.kind) {
            Some(TokenKind::Int(_)) | Some(TokenKind::Word(_)) => self.parse_parameter(span.start),
            _ => {
                self.stream.advance();
                Ok(Expr::new(ExprKind::Path { root: PathRoot::Current, segments: Vec::new() }, span))
            }
        }
    }

    fn parse_parameter(&mut self, start: usize) -> ParseResult<Expr> {
        self.stream.advance(); // consume '@'
        match self.stream.current().kind.clone() {
            TokenKind::Int(text) => {
                let end = self.stream.current().span.end;
                self.stream.advance();
                Ok(Expr::new(ExprKind::Parameter(text), start..end))
            }
            TokenKind::Word(name) => {
                let end = self.stream.current().span.end;
                self.stream.advance();
                Ok(Expr::new(ExprKind::Parameter(name), start..end))
            }
            _ => Err(self.stream.error_here_with_code(
                "expected parameter index or name after '@'",
                "UnexpectedToken",
            )),
        }
    }

    fn parse_document_init(&mut self) -> ParseResult<Expr> {
        let start = self.stream.expect(TokenKind::OpenBrace)?.start;
        let mut fields = Vec::new();
        while !matches!(self.stream.current().kind, TokenKind::CloseBrace | TokenKind::Eof) {
            let (key, key_span) = self.parse_document_key()?;
            if matches!(self.stream.current().kind, TokenKind::Colon) {
                self.stream.advance();
                let value = self.parse_expression()?;
                fields.push((key, value));
            } else {
                let value = Expr::new(
                    ExprKind::Path {
                        root: PathRoot::Root,
                        segments: vec![PathSegment::Field(key.clone())],
                    },
                    key_span,
                );
                fields.push((key, value));
            }

            if matches!(self.stream.current().kind, TokenKind::Comma) {
                self.stream.advance();
                continue;
            }
            break;
        }
        let end = self.stream.expect(TokenKind::CloseBrace)?.end;
        Ok(Expr::new(ExprKind::Document(fields), start..end))
    }

    fn parse_document_key(&mut self) -> ParseResult<(SmolStr, Span)> {
        let token = self.stream.current().clone();
        match &token.kind {
            TokenKind::Word(name) => {
                self.stream.advance();
                Ok((name.clone(), token.span))
            }
            TokenKind::String(name) => {
                self.stream.advance();
                Ok((name.clone(), token.span))
            }
            _ => Err(self.stream.error_here_with_code(
                format!("expected document key, found {}", token.kind),
                "UnexpectedToken",
            )),
        }
    }

    fn parse_array_init(&mut self) -> ParseResult<Expr> {
        let start = self.stream.expect(TokenKind::OpenBracket)?.start;
        let mut elements = Vec::new();
        while !matches!(self.stream.current().kind, TokenKind::CloseBracket | TokenKind::Eof) {
            elements.push(self.parse_expression()?);
            if matches!(self.stream.current().kind, TokenKind::Comma) {
                self.stream.advance();
                continue;
            }
            break;
        }
        let end = self.stream.expect(TokenKind::CloseBracket)?.end;
        Ok(Expr::new(ExprKind::Array(elements), start..end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> ParseResult<Expr> {
        let tokens = tokenize(source).expect("lexer failure in test fixture");
        parse_expression(&tokens)
    }

    #[test]
    fn parses_int_and_double_literals() {
        assert!(matches!(parse("42").unwrap().kind, ExprKind::Int(42)));
        assert!(matches!(parse("5.0").unwrap().kind, ExprKind::Double(_)));
    }

    #[test]
    fn parses_bare_identifier_as_root_path() {
        let expr = parse("Name").unwrap();
        match expr.kind {
            ExprKind::Path { root: PathRoot::Root, segments } => {
                assert_eq!(segments, vec![PathSegment::Field("Name".into())]);
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn parses_dotted_path() {
        let expr = parse("$.Name.First").unwrap();
        match expr.kind {
            ExprKind::Path { root: PathRoot::Root, segments } => {
                assert_eq!(
                    segments,
                    vec![
                        PathSegment::Field("Name".into()),
                        PathSegment::Field("First".into())
                    ]
                );
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn lowers_wildcard_followed_by_access_to_map() {
        let expr = parse("items[*].price").unwrap();
        match expr.kind {
            ExprKind::Map { source, projection } => {
                assert!(matches!(
                    source.kind,
                    ExprKind::Path { segments, .. }
                        if segments == vec![PathSegment::Field("items".into()), PathSegment::Wildcard]
                ));
                assert!(matches!(
                    projection.kind,
                    ExprKind::Path { root: PathRoot::Current, segments }
                        if segments == vec![PathSegment::Field("price".into())]
                ));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn nested_wildcards_compose_left_to_right() {
        let expr = parse("items[*].products[*].price").unwrap();
        let ExprKind::Map { projection, .. } = expr.kind else {
            panic!("expected outer map");
        };
        assert!(matches!(projection.kind, ExprKind::Map { .. }));
    }

    #[test]
    fn bare_source_dot_lowers_to_map() {
        let expr = parse("*.x").unwrap();
        assert!(matches!(expr.kind, ExprKind::Map { .. }));
    }

    #[test]
    fn parses_map_and_filter_calls() {
        assert!(matches!(
            parse("MAP($.items[*] => @.price)").unwrap().kind,
            ExprKind::Map { .. }
        ));
        assert!(matches!(
            parse("FILTER($.items[*] => @.price > 1)").unwrap().kind,
            ExprKind::Filter { .. }
        ));
    }

    #[test]
    fn parses_quantified_comparison() {
        let expr = parse("$.items ANY = 1").unwrap();
        match expr.kind {
            ExprKind::Compare { quantifier, .. } => assert_eq!(quantifier, Quantifier::Any),
            other => panic!("expected compare, got {other:?}"),
        }

        let expr = parse("$.items ALL = 1").unwrap();
        match expr.kind {
            ExprKind::Compare { quantifier, .. } => assert_eq!(quantifier, Quantifier::All),
            other => panic!("expected compare, got {other:?}"),
        }
    }

    #[test]
    fn between_does_not_swallow_outer_and() {
        let expr = parse("a BETWEEN 1 AND 2 AND b = 3").unwrap();
        let ExprKind::Logical { op: LogicalOp::And, left, right } = expr.kind else {
            panic!("expected top-level AND");
        };
        assert!(matches!(left.kind, ExprKind::Between { .. }));
        assert!(matches!(right.kind, ExprKind::Compare { .. }));
    }

    #[test]
    fn rejects_chained_comparisons() {
        let err = parse("a < b < c");
        assert!(err.is_err());
    }

    #[test]
    fn rejects_reserved_word_in_atom_position() {
        let err = parse("AND").unwrap_err();
        assert_eq!(err.code.as_deref(), Some("UnexpectedToken"));
    }

    #[test]
    fn rejects_trailing_tokens() {
        let err = parse("1 2").unwrap_err();
        assert!(err.message.contains("trailing"));
    }

    #[test]
    fn precedence_multiplicative_over_additive() {
        let expr = parse("1 + 2 * 3").unwrap();
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary { op: BinaryOp::Multiply, .. }
                ));
            }
            other => panic!("expected add at root, got {other:?}"),
        }
    }

    #[test]
    fn parses_document_shorthand_field() {
        let expr = parse("{ count }").unwrap();
        match expr.kind {
            ExprKind::Document(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].0, "count");
                assert!(matches!(fields[0].1.kind, ExprKind::Path { .. }));
            }
            other => panic!("expected document, got {other:?}"),
        }
    }

    #[test]
    fn parses_parameter_by_index_and_name() {
        assert!(matches!(parse("@0").unwrap().kind, ExprKind::Parameter(_)));
        assert!(matches!(
            parse("@name").unwrap().kind,
            ExprKind::Parameter(_)
        ));
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(parse("(1 + 2").is_err());
    }

    #[test]
    fn deeply_nested_parens_hit_depth_guard() {
        let mut source = String::new();
        for _ in 0..300 {
            source.push('(');
        }
        source.push('1');
        for _ in 0..300 {
            source.push(')');
        }
        let err = parse(&source).unwrap_err();
        assert!(err.message.contains("nested too deeply"));
    }
}
