use console::style;

/// Three-tier classification used across the status report.
///
/// Every derived verdict in the report (container state, restart count,
/// reachability) collapses into one of these, and each maps onto a fixed
/// terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl AsRef<str> for Severity {
    fn as_ref(&self) -> &str {
        match self {
            Self::Normal => "green",
            Self::Warning => "yellow",
            Self::Critical => "red",
        }
    }
}

/// Apply a severity's palette color to a piece of display text.
pub fn colorize(severity: Severity, text: &str) -> String {
    match severity {
        Severity::Normal => style(text).green().to_string(),
        Severity::Warning => style(text).yellow().to_string(),
        Severity::Critical => style(text).red().to_string(),
    }
}
