//! Indented display tree for status reports.
//!
//! Sections are built through nested `add_line` calls; each call returns the
//! new line so further detail can be hung off it. Rendering indents two
//! spaces per level and runs colored lines through the severity palette.

use crate::status::severity::{Severity, colorize};

#[derive(Debug, Default)]
pub struct StatusDisplay {
    lines: Vec<DisplayLine>,
}

#[derive(Debug)]
pub struct DisplayLine {
    pub text: String,
    pub color: Option<Severity>,
    pub children: Vec<DisplayLine>,
}

fn push_line(lines: &mut Vec<DisplayLine>, text: String, color: Option<Severity>) -> &mut DisplayLine {
    lines.push(DisplayLine {
        text,
        color,
        children: Vec::new(),
    });
    lines.last_mut().expect("line just pushed")
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, text: impl Into<String>) -> &mut DisplayLine {
        push_line(&mut self.lines, text.into(), None)
    }

    pub fn add_colored_line(&mut self, text: impl Into<String>, severity: Severity) -> &mut DisplayLine {
        push_line(&mut self.lines, text.into(), Some(severity))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            render_line(line, 0, &mut out);
        }
        out
    }
}

impl DisplayLine {
    pub fn add_line(&mut self, text: impl Into<String>) -> &mut DisplayLine {
        push_line(&mut self.children, text.into(), None)
    }

    pub fn add_colored_line(&mut self, text: impl Into<String>, severity: Severity) -> &mut DisplayLine {
        push_line(&mut self.children, text.into(), Some(severity))
    }
}

fn render_line(line: &DisplayLine, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match line.color {
        Some(severity) => out.push_str(&colorize(severity, &line.text)),
        None => out.push_str(&line.text),
    }
    out.push('\n');
    for child in &line.children {
        render_line(child, depth + 1, out);
    }
}
