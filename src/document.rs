use std::fmt::Write;

use crate::theme::Theme;

const TITLE: &str = "Claude Conversation";

/// Layout rules. Colours come from the `:root` custom properties written by [`theme_vars`].
const STYLESHEET: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=JetBrains+Mono:wght@400;500;600;700&display=swap');

    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }

    html, body {
      background: var(--bg);
      color: var(--text);
      font-family: 'JetBrains Mono', 'SF Mono', 'Monaco', 'Menlo', 'Consolas', monospace;
      font-size: 13px;
      line-height: 1.6;
      -webkit-font-smoothing: antialiased;
      -moz-osx-font-smoothing: grayscale;
    }

    body {
      padding: 24px 32px;
      min-height: 100vh;
    }

    .conversation { max-width: 100%; }

    .message { margin-bottom: 24px; }

    .user-message { margin-bottom: 16px; }

    .user-content {
      color: var(--user-text);
      white-space: pre-wrap;
      word-wrap: break-word;
    }

    .prompt {
      color: var(--user-prompt);
      font-weight: 600;
      margin-right: 8px;
    }

    .prompt-space {
      display: inline-block;
      width: 20px;
    }

    .assistant-message { padding-left: 0; }

    .assistant-text {
      color: var(--assistant-text);
      white-space: pre-wrap;
      word-wrap: break-word;
    }

    h1, h2, h3 {
      color: var(--header-text);
      font-weight: 600;
      margin: 16px 0 8px 0;
    }

    h1 { font-size: 1.4em; }
    h2 { font-size: 1.2em; }
    h3 { font-size: 1.1em; }

    .code-block {
      background: var(--code-bg);
      border: 1px solid var(--code-border);
      border-radius: 6px;
      margin: 12px 0;
      overflow: hidden;
    }

    .code-header {
      background: var(--code-border);
      color: var(--text-muted);
      padding: 6px 12px;
      font-size: 11px;
      text-transform: uppercase;
      letter-spacing: 0.5px;
    }

    .code-block pre {
      margin: 0;
      padding: 12px 16px;
      overflow-x: auto;
    }

    .code-block code {
      color: var(--code-text);
      font-size: 12px;
      line-height: 1.5;
    }

    code.inline {
      background: var(--inline-code-bg);
      color: var(--inline-code);
      padding: 2px 6px;
      border-radius: 4px;
      font-size: 0.9em;
    }

    .tool-use {
      color: var(--tool-text);
      font-size: 12px;
      padding: 8px 0;
      border-left: 2px solid var(--code-border);
      padding-left: 12px;
      margin: 8px 0;
    }

    .tool-icon { color: var(--user-prompt); }

    .tool-name {
      color: var(--link-text);
      font-weight: 500;
    }

    .tool-input {
      margin-top: 8px;
      padding: 8px;
      background: var(--code-bg);
      border-radius: 4px;
      font-size: 11px;
      overflow-x: auto;
    }

    .thinking {
      background: var(--thinking-bg);
      border-radius: 6px;
      padding: 12px 16px;
      margin: 12px 0;
      font-size: 12px;
      color: var(--text-muted);
      white-space: pre-wrap;
    }

    .thinking-label {
      color: var(--text-muted);
      font-size: 11px;
      margin-bottom: 8px;
      font-style: italic;
    }

    .list-item {
      padding-left: 16px;
      margin: 4px 0;
    }

    strong {
      color: var(--bold);
      font-weight: 600;
    }

    em {
      color: var(--italic);
      font-style: italic;
    }

    hr {
      border: none;
      border-top: 1px solid var(--code-border);
      margin: 24px 0;
    }
"#;

fn theme_vars(theme: &Theme) -> String {
    let vars = [
        ("bg", theme.bg),
        ("text", theme.text),
        ("text-muted", theme.text_muted),
        ("user-prompt", theme.user_prompt),
        ("user-text", theme.user_text),
        ("assistant-text", theme.assistant_text),
        ("code-bg", theme.code_bg),
        ("code-border", theme.code_border),
        ("code-text", theme.code_text),
        ("tool-text", theme.tool_text),
        ("thinking-bg", theme.thinking_bg),
        ("header-text", theme.header_text),
        ("link-text", theme.link_text),
        ("bold", theme.bold),
        ("italic", theme.italic),
        ("inline-code", theme.inline_code),
        ("inline-code-bg", theme.inline_code_bg),
    ];

    let mut css = String::from("    :root {\n");
    for (name, value) in vars {
        let _ = writeln!(css, "      --{name}: {value};");
    }
    css.push_str("    }\n");
    css
}

/// Wrap rendered message markup in a complete, self-styled HTML document.
pub fn build(messages_html: &str, theme: &Theme) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{TITLE}</title>
  <style>
{vars}{STYLESHEET}  </style>
</head>
<body>
  <div class="conversation">
    {messages_html}
  </div>
</body>
</html>"#,
        vars = theme_vars(theme),
    )
}
