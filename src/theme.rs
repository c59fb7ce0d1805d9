use clap::ValueEnum;
use serde::Deserialize;

/// Colour roles used by the document stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub bg: &'static str,
    pub text: &'static str,
    pub text_muted: &'static str,
    pub user_prompt: &'static str,
    pub user_text: &'static str,
    pub assistant_text: &'static str,
    pub code_bg: &'static str,
    pub code_border: &'static str,
    pub code_text: &'static str,
    pub tool_text: &'static str,
    pub thinking_bg: &'static str,
    pub header_text: &'static str,
    pub link_text: &'static str,
    pub bold: &'static str,
    pub italic: &'static str,
    pub inline_code: &'static str,
    pub inline_code_bg: &'static str,
}

/// GitHub dark palette, close to what Claude Code shows in a dark terminal.
pub const DARK: Theme = Theme {
    bg: "#0d1117",
    text: "#e6edf3",
    text_muted: "#7d8590",
    user_prompt: "#3fb950",
    user_text: "#58a6ff",
    assistant_text: "#e6edf3",
    code_bg: "#161b22",
    code_border: "#30363d",
    code_text: "#e6edf3",
    tool_text: "#7d8590",
    thinking_bg: "#1c2128",
    header_text: "#f0883e",
    link_text: "#58a6ff",
    bold: "#ffffff",
    italic: "#e6edf3",
    inline_code: "#ff7b72",
    inline_code_bg: "#343942",
};

pub const LIGHT: Theme = Theme {
    bg: "#ffffff",
    text: "#1f2328",
    text_muted: "#656d76",
    user_prompt: "#1a7f37",
    user_text: "#0969da",
    assistant_text: "#1f2328",
    code_bg: "#f6f8fa",
    code_border: "#d0d7de",
    code_text: "#1f2328",
    tool_text: "#656d76",
    thinking_bg: "#f6f8fa",
    header_text: "#953800",
    link_text: "#0969da",
    bold: "#000000",
    italic: "#1f2328",
    inline_code: "#cf222e",
    inline_code_bg: "#eff1f3",
};

/// Built-in theme names, selectable with `--theme` or `theme = "..."` in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn theme(self) -> &'static Theme {
        match self {
            Self::Dark => &DARK,
            Self::Light => &LIGHT,
        }
    }
}
