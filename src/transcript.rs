//! Record types for the newline-delimited conversation transcripts written by Claude Code.
//!
//! Each line of a transcript is a self-contained JSON object. Only two entry kinds
//! matter for rendering:
//!
//! ```json
//! {"type": "user", "message": {"content": "hello"}}
//! {"type": "assistant", "message": {"content": [{"type": "text", "text": "world"}]}}
//! ```
//!
//! Everything else (summaries, system entries, snapshots) and any line that fails to
//! decode is dropped. Content decoding is deliberately lax: a record is never rejected
//! because one of its blocks is missing a field.
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Who produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The human at the prompt.
    User,
    /// The model.
    Assistant,
}

/// Entry discriminator as it appears in the `type` field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EntryKind {
    User,
    Assistant,
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// One typed unit of message content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Prose, rendered through the markdown chain.
    Text(String),

    /// Extended thinking trace.
    Thinking(String),

    /// A tool invocation with its raw JSON arguments. `input` is `None` when the
    /// block has no `input` key at all, as opposed to an explicit `null`.
    ToolUse { name: String, input: Option<Value> },

    /// Any other block type (`tool_result`, `image`, ...). Kept so block order is
    /// faithful, never rendered.
    Other(String),
}

impl ContentBlock {
    /// Decode a block from an arbitrary JSON value. Never fails.
    fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };

        match value.get("type").and_then(Value::as_str) {
            Some("text") => Self::Text(field("text")),
            Some("thinking") => Self::Thinking(field("thinking")),
            Some("tool_use") => Self::ToolUse {
                name: field("name"),
                input: value.get("input").cloned(),
            },
            Some(other) => Self::Other(other.to_owned()),
            None => Self::Other(String::new()),
        }
    }
}

/// Message content: either a bare string or an ordered list of blocks.
///
/// Custom deserializer accepts any JSON value:
/// - string → `Text`
/// - array → `Blocks`, each element decoded leniently
/// - anything else (null, number, object) → empty `Text`
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for Content {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl Content {
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::Blocks(items.iter().map(ContentBlock::from_value).collect()),
            _ => Self::default(),
        }
    }

    /// Text-typed content only, joined with newlines. Thinking and tool blocks are excluded.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub role: Role,
    pub content: Content,
}

impl Record {
    pub fn user(content: Content) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn assistant(content: Content) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(rename = "type")]
    kind: EntryKind,
    // Any JSON value: a `message` that is not an object just has no content.
    #[serde(default)]
    message: Option<Value>,
}

impl Entry {
    fn into_content(self) -> Content {
        self.message
            .and_then(|mut message| message.get_mut("content").map(Value::take))
            .map(Content::from_value)
            .unwrap_or_default()
    }
}

/// Outcome of decoding a single line.
#[derive(Debug)]
enum LineOutcome {
    Record(Record),
    Malformed(serde_json::Error),
    UnknownRole,
}

/// Bytes that are not valid UTF-8 make the line malformed, not the file.
fn decode_line(line: &[u8]) -> LineOutcome {
    let entry = match serde_json::from_slice::<Entry>(line) {
        Ok(entry) => entry,
        Err(e) => return LineOutcome::Malformed(e),
    };
    let role = match entry.kind {
        EntryKind::User => Role::User,
        EntryKind::Assistant => Role::Assistant,
        EntryKind::Other => return LineOutcome::UnknownRole,
    };
    LineOutcome::Record(Record {
        role,
        content: entry.into_content(),
    })
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Counters describing what the parser dropped. Diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub skipped_malformed: usize,
    pub skipped_role: usize,
}

/// A parsed transcript: records in file order plus skip counters.
#[derive(Debug, Default)]
pub struct Transcript {
    pub records: Vec<Record>,
    pub stats: ParseStats,
}

/// Parse transcript text. Blank lines are ignored and do not count towards `stats.lines`.
pub fn parse_str(input: &str) -> Transcript {
    parse_bytes(input.as_bytes())
}

/// Parse raw transcript bytes, decoding each line on its own.
pub fn parse_bytes(input: &[u8]) -> Transcript {
    let mut transcript = Transcript::default();

    for (index, line) in input.split(|&b| b == b'\n').enumerate() {
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        transcript.stats.lines += 1;

        match decode_line(line) {
            LineOutcome::Record(record) => transcript.records.push(record),
            LineOutcome::Malformed(e) => {
                transcript.stats.skipped_malformed += 1;
                tracing::debug!(line = index + 1, error = %e, "skipping malformed line");
            }
            LineOutcome::UnknownRole => {
                transcript.stats.skipped_role += 1;
                tracing::trace!(line = index + 1, "skipping non-message entry");
            }
        }
    }

    transcript
}

/// Read and parse a transcript file.
pub fn parse_file(path: &Path) -> Result<Transcript> {
    let input = fs::read(path)
        .wrap_err_with(|| format!("Failed to read transcript: {}", path.display()))?;
    Ok(parse_bytes(&input))
}
