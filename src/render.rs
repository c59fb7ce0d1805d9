use crate::markdown::{escape_html, to_html};
use crate::transcript::{Content, ContentBlock, Record, Role};

/// Which optional parts of assistant turns make it into the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub include_thinking: bool,
    pub include_tools: bool,
}

/// Render records to HTML fragments, one per record, joined by newlines.
pub fn render_records(records: &[Record], options: RenderOptions) -> String {
    records
        .iter()
        .map(|record| render_record(record, options))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_record(record: &Record, options: RenderOptions) -> String {
    match record.role {
        Role::User => render_user(&record.content),
        Role::Assistant => render_assistant(&record.content, options),
    }
}

fn render_user(content: &Content) -> String {
    let escaped = escape_html(&content.text());
    let lines = escaped
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!(r#"<span class="prompt">❯</span> {line}"#)
            } else {
                format!(r#"<span class="prompt-space">  </span>{line}"#)
            }
        })
        .collect::<Vec<_>>()
        .join("<br>");

    format!(r#"<div class="message user-message"><div class="user-content">{lines}</div></div>"#)
}

fn render_assistant(content: &Content, options: RenderOptions) -> String {
    let parts: Vec<String> = match content {
        // A bare string is treated as a single text block.
        Content::Text(text) => vec![render_text(text)],
        Content::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| render_block(block, options))
            .collect(),
    };

    format!(
        r#"<div class="message assistant-message">{}</div>"#,
        parts.join("\n")
    )
}

fn render_text(text: &str) -> String {
    format!(r#"<div class="assistant-text">{}</div>"#, to_html(text))
}

fn render_block(block: &ContentBlock, options: RenderOptions) -> Option<String> {
    match block {
        ContentBlock::Text(text) => Some(render_text(text)),
        ContentBlock::Thinking(thinking) if options.include_thinking => Some(format!(
            r#"<div class="thinking"><div class="thinking-label">Thinking...</div>{}</div>"#,
            escape_html(thinking)
        )),
        ContentBlock::ToolUse { name, input } => {
            let name = escape_html(name);
            if options.include_tools {
                let input = match input {
                    Some(input) => serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string()),
                    None => String::new(),
                };
                Some(format!(
                    r#"<div class="tool-use"><span class="tool-icon">⚡</span> <span class="tool-name">{name}</span><pre class="tool-input">{}</pre></div>"#,
                    escape_html(&input)
                ))
            } else {
                Some(format!(
                    r#"<div class="tool-use"><span class="tool-icon">⚡</span> Used <span class="tool-name">{name}</span></div>"#
                ))
            }
        }
        ContentBlock::Thinking(_) | ContentBlock::Other(_) => None,
    }
}
