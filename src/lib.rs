//! # convo-print
//!
//! A CLI tool that turns a Claude Code conversation transcript (`.jsonl`) into a
//! terminal-styled image or document.
//!
//! ## What it does
//!
//! Claude Code writes every session as newline-delimited JSON, one entry per line.
//! This tool reads the user and assistant entries, optionally trims the conversation
//! to a range, renders it as a styled HTML page that looks like the terminal, and then
//! has a headless Chrome capture that page as PNG, SVG or PDF.
//!
//! Lines that are not valid JSON, or that are not user/assistant turns, are skipped
//! silently.
//!
//! ## Usage
//!
//! ```sh
//! # Screenshot the whole session to the desktop
//! convo-print ~/.claude/projects/my-proj/session.jsonl
//!
//! # Last two exchanges as a light-themed PDF, tool inputs included
//! convo-print session.jsonl --last 2 --light-theme --include-tools --format pdf
//!
//! # Plain HTML, no browser needed
//! convo-print session.jsonl --output chat.html
//! ```
//!
//! Preferences can be persisted in `~/.config/convo-print/config.toml`.
//!
//! ## Limitations
//!
//! Markdown is handled by a fixed series of regex substitutions, not a parser.
//! Nested or overlapping markup renders on a best-effort basis.
pub mod config;
pub mod document;
pub mod export;
pub mod filter;
pub mod markdown;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod theme;
pub mod transcript;

#[cfg(feature = "chrome")]
pub mod chrome;
