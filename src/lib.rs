//! # mdtree
//!
//! Turns a directory tree of markdown documents into a static HTML site whose
//! output tree mirrors the source tree. Every directory gets an index page,
//! and every document gets a sidebar listing its siblings and a table of
//! contents built from its headings.
//!
//! # Architecture: One Walk
//!
//! ```text
//! docs/  ──walk──►  decide  ──Index──►  listing → index synthesizer ──► public/dir/index.html
//!                     │
//!                     └──Render──►  markdown engine → templates  ──► public/dir/page.html
//! ```
//!
//! There is a single pass over the source tree. Each node is classified by
//! [`generate::Generator::decide`] and handled on the spot, so a failure
//! leaves everything before it on disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generate`] | The walker, index synthesizer and document renderer |
//! | [`listing`] | Sorted, filtered children of one directory for sidebars and indexes |
//! | [`paths`] | Source-to-output path and URL mapping, ignore and extension rules |
//! | [`markdown`] | The `MarkdownEngine` trait and its `pulldown-cmark` implementation |
//! | [`templates`] | Compiled Maud layouts (`single`, `index`) |
//! | [`types`] | Records passed between the walker, engine and templates |
//! | [`config`] | `mdtree.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for generation and serving |
//! | [`serve`] | Static file server for the generated site |
//!
//! # Design Decisions
//!
//! ## Indexes Fill Gaps, Pages Are Rebuilt
//!
//! An existing `index.html` in the output is never overwritten, so a
//! hand-written landing page survives every rebuild. Document pages are
//! derived data and are rewritten on every run.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. The layout set is fixed at build time, all interpolation is
//! escaped, and there is no template directory to ship.
//!
//! ## Pluggable Markdown
//!
//! The generator is generic over [`markdown::MarkdownEngine`]. The default
//! engine wraps `pulldown-cmark` and `syntect`; tests swap in doubles that make
//! generator behavior independent of markdown rendering details.
//!
//! ## Nested Output
//!
//! The output directory may live inside the source tree (`docs/public`). The
//! walker skips it and listings hide its name, so a rebuild never publishes
//! its own previous output.

pub mod config;
pub mod generate;
pub mod listing;
pub mod markdown;
pub mod output;
pub mod paths;
pub mod serve;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

/// Install the global `tracing` subscriber.
///
/// `verbose` is the `-v` count: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
/// `RUST_LOG` directives are honored on top of that level.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
