use termchat_lib::tools::Display;

const SYSTEM_PROMPT: [&str;2] = [
"You are Claude, working on a computer through the tools you were given.
* The computer tool controls a screen of ",
".
* The bash tool runs commands in a persistent shell. Prefer it over the GUI when a command gets the job done.
* The str_replace_editor tool views, creates and edits files.
* Tool calls can take a while and their output can be long. Pipe long output through head or tail, or redirect it to a file and search it.
* Chain several actions in one reply when you can, and take a screenshot to check the result before telling the user the task is done.
* You are talking to the user in a terminal, so keep answers short and use plain text.",
];

/// Build the system prompt, with custom instructions appended when given.
pub fn system_prompt(display: &Display, custom: Option<&str>) -> String {
    let mut prompt = SYSTEM_PROMPT[0].to_owned();

    prompt += &format!("{}x{} pixels", display.width, display.height);
    if let Some(number) = display.number {
        prompt += &format!(" (X11 display :{number})");
    }

    prompt += SYSTEM_PROMPT[1];

    if let Some(instr) = custom.filter(|s| !s.trim().is_empty()) {
        prompt += "\n\nIn addition, follow these instructions from the user:\n-----\n";
        prompt += instr;
        prompt += "\n-----";
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt() {
        let display = Display { width: 1280, height: 800, number: Some(1) };

        let prompt = system_prompt(&display, None);
        assert!(prompt.contains("1280x800 pixels (X11 display :1)."));
        assert!(!prompt.contains("-----"));

        let prompt = system_prompt(&Display::default(), Some("Use vim."));
        assert!(prompt.contains("1024x768 pixels."));
        assert!(prompt.ends_with("-----\nUse vim.\n-----"));

        assert_eq!(system_prompt(&Display::default(), Some(" ")), system_prompt(&Display::default(), None));
    }
}
