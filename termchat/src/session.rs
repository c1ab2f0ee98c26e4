use std::path::Path;
use crate::commands::SessionCommand;
use crate::config::Config;
use crate::error::AppError;
use crate::prompts::system_prompt;
use crate::term::Term;
use crate::tools::{ExternalToolHost, ToolHost, ToolOutput, UnavailableToolHost};
use termchat_lib::conversation;
use termchat_lib::llm::{get_llm_chat, Delta, LLMChat, Message, Role, ToolCall};
use termchat_lib::request::get_reqwest_client;
use termchat_lib::Error;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

/// Receives what happens during a turn as it happens.
pub trait TurnOutput {
    /// Streamed text or thinking.
    fn delta(&mut self, delta: Delta);
    /// The model called a tool.
    fn tool_use(&mut self, call: &ToolCall);
    /// The tool host answered the last call.
    fn tool_result(&mut self, output: &ToolOutput);
}

/// Send `input` and keep sampling while the model calls tools.
/// All results of one reply go back in a single user turn.
/// On failure the history is restored to what it was before the turn.
pub fn run_turn(chat: &mut dyn LLMChat, tools: &mut dyn ToolHost, out: &mut dyn TurnOutput, input: String) -> Result<(), Error> {
    let checkpoint = chat.history().to_vec();
    let mut messages = vec![Message::text(Role::User, input)];

    loop {
        let response = match chat.get_inference(&messages, &mut |delta| out.delta(delta)) {
            Ok(response) => response,
            Err(err) => {
                chat.replace_history(checkpoint);
                return Err(err);
            }
        };

        messages = vec![];

        for message in response {
            if let Message::ToolCall(call) = message {
                out.tool_use(&call);
                let output = tools.run(&call.name, &call.input);
                out.tool_result(&output);
                messages.push(Message::ToolResult(output.into_result(call.call_id, call.name)));
            }
        }

        if messages.is_empty() {
            return Ok(());
        }

        debug!(results = messages.len(), "sending tool results");
    }
}

/// What a session command asks the terminal to do.
#[derive(Debug, PartialEq)]
pub enum CommandOutcome {
    /// Leave the session.
    Exit,
    /// Show the command list.
    Help,
    /// Print a notice.
    Info(String),
    /// Print an error.
    Error(String),
}

/// Apply a session command to the chat.
pub fn apply_command(chat: &mut dyn LLMChat, command: SessionCommand) -> CommandOutcome {
    match command {
        SessionCommand::Exit => CommandOutcome::Exit,
        SessionCommand::Help => CommandOutcome::Help,
        SessionCommand::Clear => {
            chat.clear_history();
            CommandOutcome::Info("Chat history cleared.".to_owned())
        },
        SessionCommand::Save(None) => CommandOutcome::Error("Error: Please provide a filename to save to.".to_owned()),
        SessionCommand::Save(Some(path)) => {
            match conversation::save(Path::new(&path), chat.history()) {
                Ok(()) => CommandOutcome::Info(format!("Conversation saved to {path}")),
                Err(err) => CommandOutcome::Error(format!("Error saving conversation: {err}")),
            }
        },
        SessionCommand::Load(None) => CommandOutcome::Error("Error: Please provide a filename to load from.".to_owned()),
        SessionCommand::Load(Some(path)) => {
            match conversation::load(Path::new(&path)) {
                Ok(history) => {
                    chat.replace_history(history);
                    CommandOutcome::Info(format!("Conversation loaded from {path}"))
                },
                Err(err) => CommandOutcome::Error(format!("Error loading conversation: {err}")),
            }
        },
        SessionCommand::Unknown(name) => CommandOutcome::Error(format!("Unknown command: {name}")),
    }
}

/// Interactive chat session.
pub struct Session {
    config: Config,
    term: Term,
    chat: Box<dyn LLMChat>,
    tools: Box<dyn ToolHost>,
}

impl Session {

    /// Create new session.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let term = Term::new(&config.settings)?;

        let reqwest_client = get_reqwest_client()?;
        let mut chat = get_llm_chat(config.model_params.clone(), reqwest_client, Some(config.tools.clone()))?;
        chat.set_system_prompt(system_prompt(&config.display, config.prompt.as_deref()));

        let tools: Box<dyn ToolHost> = match &config.tool_host {
            Some(command) => Box::new(ExternalToolHost::new(command.clone())),
            None => Box::new(UnavailableToolHost),
        };

        info!(
            model = %config.model_params.name,
            tools = %config.tools.version,
            tool_host = config.tool_host.is_some(),
            "session ready"
        );

        Ok(Session {
            config,
            term,
            chat,
            tools,
        })
    }

    /// Run session until the user leaves.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.term.print_banner();

        if let Some(first_message) = self.config.message.take() {
            self.send(first_message);
        }

        loop {
            let line = match self.term.user_input() {
                Ok(line) => line,
                Err(AppError::Rustyline(ReadlineError::Interrupted | ReadlineError::Eof)) => {
                    self.term.print_info("\nExiting...");
                    break;
                },
                Err(err) => return Err(err),
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(command) = SessionCommand::parse(line) {
                debug!(?command, "session command");
                match apply_command(self.chat.as_mut(), command) {
                    CommandOutcome::Exit => {
                        self.term.print_info("Exiting...");
                        break;
                    },
                    CommandOutcome::Help => self.term.print_banner(),
                    CommandOutcome::Info(message) => self.term.print_info(&message),
                    CommandOutcome::Error(message) => self.term.print_error(&message),
                }
            } else {
                self.send(line.to_owned());
            }
        }

        Ok(())
    }

    fn send(&mut self, input: String) {
        self.term.print_assistant_header();

        if let Err(err) = run_turn(self.chat.as_mut(), self.tools.as_mut(), &mut self.term, input) {
            self.term.print_error(&format!("\nError calling Claude API: {err}"));
        }

        self.term.end_reply();
    }
}
