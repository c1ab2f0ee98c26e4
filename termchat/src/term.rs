use std::borrow::Cow;
use std::io::{self, Write};

use anstyle::Style;
use crate::{config::Settings, style::Styles, error::AppError};
use crate::session::TurnOutput;
use crate::tools::ToolOutput;
use termchat_lib::llm::{Delta, ToolCall};
use rustyline::{config::BellStyle, highlight::{CmdKind, Highlighter}, history::MemHistory, Completer, CompletionType, EditMode, Editor, Helper, Hinter, Validator};

const COMMANDS: [(&str, &str);5] = [
    ("/clear", "Clear chat history"),
    ("/exit", "Exit the interface"),
    ("/help", "Show this help message"),
    ("/save <filename>", "Save conversation to file"),
    ("/load <filename>", "Load conversation from file"),
];

const USER_PROMPT: &str = "You: ";

/// Terminal stuff.
pub struct Term {
    styles: Styles,
    dumb: bool,
    thinking: bool,
    editor: Editor<RlineHelper, MemHistory>,
}

impl Term {
    /// New instance.
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let styles = Styles::new(settings);

        let rline_config = rustyline::Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .bell_style(BellStyle::None)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let dumb = Ok("dumb") == std::env::var("TERM").as_deref();

        let mut editor: Editor<RlineHelper, MemHistory> = Editor::with_config(rline_config)?;
        editor.set_helper(Some(RlineHelper {
            colored_prompt: format!("{}{}{:#}", styles.user_prompt, USER_PROMPT, styles.user_prompt),
            user_text: styles.user_text,
            plain: dumb,
        }));

        Ok(Term {
            styles,
            dumb,
            thinking: false,
            editor,
        })
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.dumb {
            text.to_owned()
        } else {
            format!("{style}{text}{style:#}")
        }
    }

    /// Get input from user.
    pub fn user_input(&mut self) -> Result<String, AppError> {
        Ok(self.editor.readline(USER_PROMPT)?)
    }

    /// Print the title and the command list.
    pub fn print_banner(&self) {
        println!("\n{}", self.paint(self.styles.title, &format!("===== termchat (ver. {}) =====", env!("CARGO_PKG_VERSION"))));
        println!("Commands:");
        for (command, description) in COMMANDS {
            println!("  {} - {}", self.paint(self.styles.command, command), description);
        }
        println!("{}\n", self.paint(self.styles.title, "================================"));
    }

    /// Start of the assistant's reply.
    pub fn print_assistant_header(&mut self) {
        self.thinking = false;
        print!("\n{} ", self.paint(self.styles.assistant_prompt, "Claude:"));
        io::stdout().flush().ok();
    }

    /// End of the assistant's reply.
    pub fn end_reply(&mut self) {
        self.thinking = false;
        println!("\n");
    }

    /// Print a notice.
    pub fn print_info(&self, message: &str) {
        println!("{message}");
    }

    /// Print an error.
    pub fn print_error(&self, message: &str) {
        println!("{}", self.paint(self.styles.error_text, message));
    }
}

impl TurnOutput for Term {
    fn delta(&mut self, delta: Delta) {
        match delta {
            Delta::Text(text) => {
                if self.thinking {
                    self.thinking = false;
                    println!();
                }
                print!("{}", self.paint(self.styles.assistant_text, text));
            },
            Delta::Thinking(text) => {
                if !self.thinking {
                    self.thinking = true;
                    println!("\n{}", self.paint(self.styles.thinking_text, "[Thinking...]"));
                }
                print!("{}", self.paint(self.styles.thinking_text, text));
            },
        }
        io::stdout().flush().ok();
    }

    fn tool_use(&mut self, call: &ToolCall) {
        self.thinking = false;
        let input = serde_json::to_string_pretty(&call.input).unwrap_or_else(|_| call.input.to_string());
        println!("\n{}", self.paint(self.styles.tool_prompt, &format!("[Using Tool: {}]", call.name)));
        println!("{}", self.paint(self.styles.tool_prompt, &format!("Input: {input}")));
    }

    fn tool_result(&mut self, output: &ToolOutput) {
        if let Some(error) = &output.error {
            println!("{}", self.paint(self.styles.error_text, &format!("[Tool Error] {error}")));
        }
        if let Some(text) = &output.output {
            println!("{}", self.paint(self.styles.tool_text, "[Tool Output]"));
            println!("{text}");
        }
        if output.base64_image.is_some() {
            println!("{}", self.paint(self.styles.tool_text, "[Tool Generated Image] (Base64 data not shown)"));
        }
    }
}


#[derive(Helper, Validator, Hinter, Completer)]
struct RlineHelper {
    colored_prompt: String,
    user_text: Style,
    plain: bool,
}

impl Highlighter for RlineHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.plain || line.is_empty() {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(format!("{}{line}{:#}", self.user_text, self.user_text))
        }
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default && !self.plain {
            Cow::Borrowed(&self.colored_prompt)
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        !self.plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anstyle::{AnsiColor, Color};

    #[test]
    fn test_input_highlight() {
        let user_text = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
        let helper = RlineHelper { colored_prompt: String::new(), user_text, plain: false };
        assert_eq!(helper.highlight("hello", 0), format!("{user_text}hello{user_text:#}"));
        assert!(helper.highlight_char("hello", 0, CmdKind::Other));

        let helper = RlineHelper { colored_prompt: String::new(), user_text, plain: true };
        assert_eq!(helper.highlight("hello", 0), "hello");
        assert!(!helper.highlight_char("hello", 0, CmdKind::Other));
    }
}
