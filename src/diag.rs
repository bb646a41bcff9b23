//! Internal diagnostic model for syntax-phase errors, warnings, and notes.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, Report, Severity};
use std::fmt;

/// Severity level for a diagnostic.
///
/// This covers the full taxonomy required for syntax-phase diagnostics:
/// errors that prevent compilation, warnings about suspicious patterns,
/// and informational notes or advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagSeverity {
    /// A fatal error that prevents further processing.
    Error,
    /// A warning about potentially problematic code.
    Warning,
    /// An informational note or advice.
    Note,
}

impl fmt::Display for DiagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagSeverity::Error => write!(f, "error"),
            DiagSeverity::Warning => write!(f, "warning"),
            DiagSeverity::Note => write!(f, "note"),
        }
    }
}

/// Role of a diagnostic label in the overall diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// The primary location related to this diagnostic.
    Primary,
    /// A secondary or supporting location.
    Secondary,
}

/// A labeled span within a diagnostic.
///
/// Each label associates a span with explanatory text and indicates
/// whether it's the primary focus or a supporting context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    /// The span this label refers to.
    pub span: Span,
    /// The label text explaining this span's relevance.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub role: LabelRole,
}

impl DiagLabel {
    /// Creates a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Primary,
        }
    }

    /// Creates a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Secondary,
        }
    }
}

/// A structured diagnostic message.
///
/// This is the internal diagnostic representation used throughout the parser
/// and lexer. It captures all information needed to render rich error reports
/// with source context, multiple labeled spans, help text, and notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    /// The severity level of this diagnostic.
    pub severity: DiagSeverity,
    /// The main diagnostic message.
    pub message: String,
    /// Labeled spans showing relevant source locations.
    pub labels: Vec<DiagLabel>,
    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,
    /// Additional notes providing context or related information.
    pub notes: Vec<String>,
    /// Optional diagnostic code (e.g., "E0001" or "syntax::unclosed_string").
    pub code: Option<String>,
}

impl Diag {
    /// Creates a new diagnostic with the given severity and message.
    pub fn new(severity: DiagSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            notes: Vec::new(),
            code: None,
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Error, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Warning, message)
    }

    /// Creates a new note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Note, message)
    }

    /// Adds a primary label to this diagnostic.
    pub fn with_primary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel::primary(span, message));
        self
    }

    /// Adds a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel::secondary(span, message));
        self
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: DiagLabel) -> Self {
        self.labels.push(label);
        self
    }

    /// Sets the help text for this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Sets the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// A wrapper around source text for diagnostic rendering.
///
/// This type manages source text ownership and provides safe access
/// for diagnostic conversion, ensuring spans are validated against
/// actual source bounds.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The source text content.
    content: String,
    /// Optional filename for display purposes.
    name: Option<String>,
}

impl SourceFile {
    /// Creates a new source file from the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: None,
        }
    }

    /// Creates a new source file with a name.
    pub fn with_name(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: Some(name.into()),
        }
    }

    /// Returns the source content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the source file name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Validates that a span is within bounds of this source.
    pub fn is_valid_span(&self, span: &Span) -> bool {
        span.start <= self.content.len() && span.end <= self.content.len() && span.start <= span.end
    }

    /// Clamps a span to valid bounds within this source.
    pub fn clamp_span(&self, span: &Span) -> Span {
        let len = self.content.len();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        start..end
    }
}

/// Converts internal diagnostics to miette Reports with source context.
///
/// This function provides the bridge from our internal diagnostic model
/// to miette's rich error reporting. It safely handles invalid spans and
/// preserves all diagnostic information (labels, help, notes, severity).
pub fn convert_diagnostics_to_reports(diagnostics: &[Diag], source: &SourceFile) -> Vec<Report> {
    diagnostics
        .iter()
        .map(|diag| convert_diag_to_report(diag, source))
        .collect()
}

/// Converts a single diagnostic to a miette Report.
///
/// This handles the full conversion including:
/// - Mapping severity levels
/// - Converting labeled spans (primary and secondary)
/// - Attaching help text and notes
/// - Including diagnostic codes
/// - Safely handling out-of-bounds spans
pub fn convert_diag_to_report(diag: &Diag, source: &SourceFile) -> Report {
    let diagnostic = build_diagnostic(diag, source);

    // Create the report with source context
    let mut report = Report::new(diagnostic);

    // Attach source code if we have a filename
    if let Some(name) = source.name() {
        report =
            report.with_source_code(miette::NamedSource::new(name, source.content().to_string()));
    } else {
        report = report.with_source_code(source.content().to_string());
    }

    report
}

fn build_diagnostic(diag: &Diag, source: &SourceFile) -> BuiltDiagnostic {
    // Build the labels first
    let mut labels = Vec::new();
    for label in &diag.labels {
        let clamped_span = source.clamp_span(&label.span);
        let span = (clamped_span.start, clamped_span.end - clamped_span.start);
        let labeled_span = match label.role {
            LabelRole::Primary => {
                LabeledSpan::new_primary_with_span(Some(label.message.clone()), span)
            }
            LabelRole::Secondary => LabeledSpan::new_with_span(Some(label.message.clone()), span),
        };
        labels.push(labeled_span);
    }

    // Create the diagnostic struct
    BuiltDiagnostic {
        message: diag.message.clone(),
        severity: match diag.severity {
            DiagSeverity::Error => Severity::Error,
            DiagSeverity::Warning => Severity::Warning,
            DiagSeverity::Note => Severity::Advice,
        },
        code: diag.code.clone(),
        help: diag.help.clone(),
        labels,
        related: diag
            .notes
            .iter()
            .cloned()
            .map(NoteDiagnostic::new)
            .collect(),
    }
}

/// The final diagnostic type that implements miette's Diagnostic trait.
#[derive(Debug)]
struct BuiltDiagnostic {
    message: String,
    severity: Severity,
    code: Option<String>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
    related: Vec<NoteDiagnostic>,
}

#[derive(Debug)]
struct NoteDiagnostic {
    message: String,
}

impl NoteDiagnostic {
    fn new(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for NoteDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for BuiltDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BuiltDiagnostic {}
impl std::error::Error for NoteDiagnostic {}

impl Diagnostic for BuiltDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.clone().into_iter()))
        }
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if self.related.is_empty() {
            None
        } else {
            Some(Box::new(
                self.related.iter().map(|diag| diag as &dyn Diagnostic),
            ))
        }
    }
}

impl Diagnostic for NoteDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(Severity::Advice)
    }
}
