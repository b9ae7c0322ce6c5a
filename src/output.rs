//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is organized by what the site contains, not by what the walker
//! touched. Every page is identified by its route (the source path without
//! its markdown extension) with the written file shown beside it and the
//! source on an indented `Source:` line.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Indexes
//! 001 / → index.html
//! 002 guide/ → guide/index.html (kept)
//!
//! Pages
//! 001 getting-started → getting-started.html
//!     Source: getting-started.md
//! 002 guide/install → guide/install.html
//!     Source: guide/install.md
//!
//! Generated 2 pages, 1 index (1 kept)
//! ```
//!
//! ## Serve
//!
//! ```text
//! Serving /home/me/docs/public
//!     http://localhost:8080/
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::{GenerateReport, IndexOutcome};
use crate::paths;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `base`, `/`-separated.
fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Directory label: `/` for the root, `name/` below it.
fn dir_label(dir: &Path, root: &Path) -> String {
    let rel = relative(dir, root);
    if rel.is_empty() {
        "/".to_string()
    } else {
        format!("{rel}/")
    }
}

/// `1 page`, `2 pages`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{n} {}", if n == 1 { singular } else { plural })
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.indexes.is_empty() {
        lines.push("Indexes".to_string());
        for (i, record) in report.indexes.iter().enumerate() {
            let marker = match record.outcome {
                IndexOutcome::Written => "",
                IndexOutcome::Kept => " (kept)",
            };
            lines.push(format!(
                "{} {} → {}{}",
                format_index(i + 1),
                dir_label(&record.dir, &report.root),
                relative(&record.output, &report.output),
                marker
            ));
        }
    }

    if !report.pages.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Pages".to_string());
        for (i, page) in report.pages.iter().enumerate() {
            let source = relative(&page.source, &report.root);
            let route = paths::route_path(Path::new(&source));
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                route.to_string_lossy(),
                relative(&page.output, &report.output)
            ));
            lines.push(format!("{}Source: {}", indent(1), source));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let written = report.indexes_written();
    let kept = report.indexes.len() - written;
    let mut summary = format!(
        "Generated {}, {}",
        count(report.pages.len(), "page", "pages"),
        count(written, "index", "indexes")
    );
    if kept > 0 {
        summary.push_str(&format!(" ({kept} kept)"));
    }
    lines.push(summary);

    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Serve
// ============================================================================

pub fn format_serve_banner(static_root: &Path, port: u16) -> Vec<String> {
    vec![
        format!("Serving {}", static_root.display()),
        format!("{}http://localhost:{}/", indent(1), port),
    ]
}

pub fn print_serve_banner(static_root: &Path, port: u16) {
    for line in format_serve_banner(static_root, port) {
        println!("{}", line);
    }
}
