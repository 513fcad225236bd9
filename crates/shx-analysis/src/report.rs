//! Report accumulation for the reflection analyzer.
//!
//! The analyzer never aborts: warnings and errors collect here and the
//! pass keeps harvesting what it can.

use shx_ast::SourceArea;

/// Severity of a reflection report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// Recoverable oddity; only recorded when warnings are enabled.
    Warning,
    /// Noteworthy mismatch; always recorded.
    Error,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A single reflection diagnostic.
#[derive(Clone, Debug)]
pub struct Report {
    pub kind: ReportKind,
    pub message: String,
    pub area: SourceArea,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({})", self.kind, self.message, self.area)
    }
}

/// Collects reports during one analyzer run.
#[derive(Debug, Default)]
pub struct ReportHandler {
    reports: Vec<Report>,
    enable_warnings: bool,
}

impl ReportHandler {
    pub fn new(enable_warnings: bool) -> Self {
        Self {
            reports: Vec::new(),
            enable_warnings,
        }
    }

    /// Records a warning if warnings are enabled.
    pub fn warning(&mut self, message: impl Into<String>, area: SourceArea) {
        if !self.enable_warnings {
            return;
        }
        let message = message.into();
        log::warn!("reflection: {message}");
        self.reports.push(Report {
            kind: ReportKind::Warning,
            message,
            area,
        });
    }

    /// Records an error. The pass continues.
    pub fn error(&mut self, message: impl Into<String>, area: SourceArea) {
        let message = message.into();
        log::warn!("reflection: {message}");
        self.reports.push(Report {
            kind: ReportKind::Error,
            message,
            area,
        });
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }
}
