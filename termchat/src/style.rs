//! Terminal styles.
use anstyle::AnsiColor;
use anstyle::Color;
use anstyle::RgbColor;
use anstyle::Style;
use crate::config::Settings;

/// Styles.
pub struct Styles {
    /// User prompt style.
    pub user_prompt: Style,
    /// User message style.
    pub user_text: Style,
    /// Assistant prompt style.
    pub assistant_prompt: Style,
    /// Assistant message style.
    pub assistant_text: Style,
    /// Thinking text style.
    pub thinking_text: Style,
    /// Tool call header style.
    pub tool_prompt: Style,
    /// Tool output style.
    pub tool_text: Style,
    /// Error message style.
    pub error_text: Style,
    /// Banner title style.
    pub title: Style,
    /// Banner command style.
    pub command: Style,
}

fn rgb([r, g, b]: [u8;3]) -> Color {
    Color::Rgb(RgbColor(r, g, b))
}

fn pair(colors: (Option<[u8;3]>, Option<[u8;3]>), fg: Color, bg: Color) -> (Color, Color) {
    (colors.0.map(rgb).unwrap_or(fg), colors.1.map(rgb).unwrap_or(bg))
}

impl Styles {

    /// Load styles.
    pub fn new(settings: &Settings) -> Self {
        let (fg_user, bg_user) = pair(settings.user_color, AnsiColor::Blue.into(), AnsiColor::Blue.into());
        let (fg_assistant, bg_assistant) = pair(settings.assistant_color, AnsiColor::Green.into(), AnsiColor::Green.into());
        let (fg_tool, bg_tool) = pair(settings.tool_color, AnsiColor::BrightBlack.into(), AnsiColor::Cyan.into());

        let gray = Color::Ansi(AnsiColor::BrightBlack);

        Self {
            user_prompt: Style::new().bold().fg_color(Some(bg_user)),
            user_text: Style::new().fg_color(Some(fg_user)),
            assistant_prompt: Style::new().bold().fg_color(Some(bg_assistant)),
            assistant_text: Style::new().fg_color(Some(fg_assistant)),
            thinking_text: Style::new().dimmed().fg_color(Some(gray)),
            tool_prompt: Style::new().fg_color(Some(bg_tool)),
            tool_text: Style::new().fg_color(Some(fg_tool)),
            error_text: Style::new().fg_color(Some(AnsiColor::Red.into())),
            title: Style::new().bold(),
            command: Style::new().fg_color(Some(AnsiColor::Yellow.into())),
        }
    }
}
