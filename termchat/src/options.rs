//! App initialization functions.

use anstyle::Style;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use std::ffi::OsString;
use std::str::FromStr;
use tracing::debug;
use crate::error::AppError;
use crate::toml_parser::parse_toml_config;
use dirs::home_dir;
use crate::util::parse_colors;

/// Config file looked up in the home directory.
const CONFIG_FILE_NAME: &str = ".termchat.toml";

/// App options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// API key.
    pub api_key: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Computer-use tool set revision.
    pub tool_version: Option<String>,
    /// Maximum number of tokens that will be generated.
    pub max_tokens: Option<i64>,
    /// Extended thinking budget.
    pub thinking_budget: Option<i64>,
    /// Level of randomization when choosing tokens.
    pub temperature: Option<f64>,
    /// Model API URL.
    pub api_url: Option<String>,
    /// Model API version.
    pub api_version: Option<String>,
    /// Command executing tool calls.
    pub tool_host: Option<String>,
    /// Screen width for the computer tool.
    pub display_width: Option<u32>,
    /// Screen height for the computer tool.
    pub display_height: Option<u32>,
    /// X11 display number for the computer tool.
    pub display_number: Option<u32>,
    /// Prompt caching switch.
    pub prompt_caching: Option<bool>,
    /// Custom instructions to add to system prompt.
    pub prompt: Option<String>,
    /// First user message.
    pub message: Option<String>,
    /// User message color and prompt background.
    pub user_color: (Option<[u8;3]>, Option<[u8;3]>),
    /// Assistant message color and prompt background.
    pub assistant_color: (Option<[u8;3]>, Option<[u8;3]>),
    /// Tool output color and prompt background.
    pub tool_color: (Option<[u8;3]>, Option<[u8;3]>),
}


macro_rules! check_and_set_float_arg {
    ($arg:literal, $m:ident, $option:expr) => {
        if let Some(x) = $m.get_one::<String>($arg) {
            if let Ok(val) = f64::from_str(x) {
                $option.replace(val);
            } else {
                return Err(AppError::InvalidArgError(concat!($arg, " must be floating point number")));
            }
        }
    }
}

macro_rules! check_and_set_int_arg {
    ($arg:literal, $t:ty, $m:ident, $option:expr) => {
        if let Some(x) = $m.get_one::<String>($arg) {
            if let Ok(val) = x.parse::<$t>() {
                $option.replace(val);
            } else {
                return Err(AppError::InvalidArgError(concat!($arg, " must be a non-negative integer")));
            }
        }
    }
}

macro_rules! check_and_set_color_arg {
    ($arg:literal, $m:ident, $option:expr) => {
        if let Some(x) = $m.get_one::<String>($arg) {
            if let Ok(colors) = parse_colors(&x) {
                $option = colors;
            } else {
                return Err(AppError::InvalidArgError(
                    concat!($arg, " must have valid format, e.g. 'fg(255,0,123);bg(0,123,255)'.")
                ));
            }
        }
    }
}

impl Options {

    /// Create new unfilled options.
    pub fn new() -> Self {
        Self::default()
    }

    fn argument_parser<T>(args: impl IntoIterator<Item = T>) -> ArgMatches where T: Into<OsString> + Clone {
        let bold_underline = Style::new().underline().bold();
        let bold = Style::new().bold();

        Command::new("termchat")
            .about("Terminal chat with Claude that relays computer-use tool calls to a tool host.")
            .version(env!("CARGO_PKG_VERSION"))
            .arg(
                Arg::new("api-key")
                .long("api-key")
                .help("Anthropic API key")
                .short('k')
                .env("ANTHROPIC_API_KEY")
                .hide_env_values(true)
                .required(false)
            ).arg(
                Arg::new("model")
                .long("model")
                .help("Model to use (default: claude-3-7-sonnet-20250219)")
                .short('m')
                .env("TERMCHAT_MODEL")
                .required(false)
            ).arg(
                Arg::new("tool-version")
                .long("tool-version")
                .help("Tool version to use, one of: computer_use_20250124, computer_use_20241022")
                .env("TERMCHAT_TOOL_VERSION")
                .required(false)
            ).arg(
                Arg::new("max-tokens")
                .long("max-tokens")
                .help("Maximum number of tokens that will be generated (default: 16384)")
                .env("TERMCHAT_MAX_TOKENS")
                .required(false)
            ).arg(
                Arg::new("thinking-budget")
                .long("thinking-budget")
                .help("Enable extended thinking with this token budget")
                .env("TERMCHAT_THINKING_BUDGET")
                .required(false)
            ).arg(
                Arg::new("temperature")
                .long("temperature")
                .help("Level of randomization when LLM chooses tokens")
                .env("TERMCHAT_TEMPERATURE")
                .required(false)
            ).arg(
                Arg::new("api-url")
                .long("api-url")
                .help("Model API URL")
                .short('u')
                .env("TERMCHAT_API_URL")
                .required(false)
            ).arg(
                Arg::new("api-version")
                .long("api-version")
                .help("Model API version")
                .env("TERMCHAT_API_VERSION")
                .required(false)
            ).arg(
                Arg::new("tool-host")
                .long("tool-host")
                .help("Command that executes tool calls: invoked as '<command> <tool-name>', input JSON on stdin")
                .env("TERMCHAT_TOOL_HOST")
                .required(false)
            ).arg(
                Arg::new("display-width")
                .long("display-width")
                .help("Screen width reported to the computer tool")
                .env("WIDTH")
                .required(false)
            ).arg(
                Arg::new("display-height")
                .long("display-height")
                .help("Screen height reported to the computer tool")
                .env("HEIGHT")
                .required(false)
            ).arg(
                Arg::new("display-number")
                .long("display-number")
                .help("X11 display number reported to the computer tool")
                .env("DISPLAY_NUM")
                .required(false)
            ).arg(
                Arg::new("no-prompt-caching")
                .long("no-prompt-caching")
                .help("Do not mark the prompt as cacheable")
                .action(ArgAction::SetTrue)
            ).arg(
                Arg::new("config")
                .long("config")
                .help("Config file path")
                .short('c')
                .env("TERMCHAT_CONFIG")
                .required(false)
            ).arg(
                Arg::new("message")
                .long("message")
                .help("First message to send")
                .short('e')
                .required(false)
            ).arg(
                Arg::new("prompt")
                .long("prompt")
                .help("Custom instructions to use in the system prompt.")
                .env("TERMCHAT_PROMPT")
                .required(false)
            ).arg(
                Arg::new("assistant-color")
                .long("assistant-color")
                .help("Assistant messages and prompt background colors, rgb (e.g. 'fg(255,0,123);bg(0,123,255)').")
                .env("TERMCHAT_ASSISTANT_COLOR")
                .required(false)
            ).arg(
                Arg::new("user-color")
                .long("user-color")
                .help("User messages and prompt background colors, rgb (e.g. 'fg(255,0,123);bg(0,123,255)').")
                .env("TERMCHAT_USER_COLOR")
                .required(false)
            ).arg(
                Arg::new("tool-color")
                .long("tool-color")
                .help("Tool output and prompt background colors, rgb (e.g. 'fg(255,0,123);bg(0,123,255)').")
                .env("TERMCHAT_TOOL_COLOR")
                .required(false)
            )
            .after_help(format!("{bold_underline}Example:{bold_underline:#} {bold}

    termchat --api-key=<your-key> --tool-host='computer-tools run'{bold:#}

Inside the session use /help to list the commands (/clear, /exit, /help, /save <file>, /load <file>).
termchat reads ~/.termchat.toml, or the file given with -c, before applying command line arguments and environment variables."))
            .get_matches_from(args)
    }

    fn load_config_file(path: Option<&str>) -> Result<Option<String>, std::io::Error> {
        Ok(if let Some(p) = path {
            Some(std::fs::read_to_string(p)?)
        } else if let Some(mut p) = home_dir() {
            p.push(CONFIG_FILE_NAME);
            if std::fs::exists(p.as_path())? {
                Some(std::fs::read_to_string(p.as_path())?)
            } else {
                None
            }
        } else {
            None
        })
    }

    fn validate_mandatory_options(options: &Options) -> Result<(), AppError> {
        if options.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::MissingApiKey);
        }
        if options.max_tokens == Some(0) {
            return Err(AppError::InvalidArgError("max-tokens must be greater than zero"));
        }
        if options.display_width == Some(0) || options.display_height == Some(0) {
            return Err(AppError::InvalidArgError("display size must be greater than zero"));
        }

        Ok(())
    }

    /// Load and validate options from env, command line arguments, config file.
    pub fn load<T>(args: impl IntoIterator<Item = T>) -> Result<Self, AppError>
        where T: Into<OsString> + Clone
    {
        let m = Self::argument_parser(args);

        let mut options = Options::new();

        let config_path = m.get_one("config").map(|s: &String| s.as_ref());

        if let Some(content) = Self::load_config_file(config_path)
            .map_err(|err| AppError::Error(format!("Error loading config file: {}", err)))?
        {
            debug!("applying config file");
            parse_toml_config(&content, &mut options)?;
        }

        if let Some(x) = m.get_one::<String>("api-key") {
            options.api_key.replace(x.clone());
        }
        if let Some(x) = m.get_one::<String>("model") {
            options.model.replace(x.clone());
        }
        if let Some(x) = m.get_one::<String>("tool-version") {
            options.tool_version.replace(x.clone());
        }
        if let Some(x) = m.get_one::<String>("api-url") {
            options.api_url.replace(x.clone());
        }
        if let Some(x) = m.get_one::<String>("api-version") {
            options.api_version.replace(x.clone());
        }
        if let Some(x) = m.get_one::<String>("tool-host") {
            options.tool_host.replace(x.clone());
        }

        if let Some(x) = m.get_one::<String>("max-tokens") {
            options.max_tokens.replace(x.parse::<u32>().map(i64::from)
                .map_err(|_| AppError::InvalidArgError("max-tokens must be a non-negative integer"))?);
        }
        if let Some(x) = m.get_one::<String>("thinking-budget") {
            options.thinking_budget.replace(x.parse::<u32>().map(i64::from)
                .map_err(|_| AppError::InvalidArgError("thinking-budget must be a non-negative integer"))?);
        }
        check_and_set_int_arg!("display-width", u32, m, options.display_width);
        check_and_set_int_arg!("display-height", u32, m, options.display_height);
        check_and_set_int_arg!("display-number", u32, m, options.display_number);

        check_and_set_float_arg!("temperature", m, options.temperature);

        if m.get_flag("no-prompt-caching") {
            options.prompt_caching.replace(false);
        }

        if let Some(x) = m.get_one::<String>("prompt") {
            options.prompt.replace(x.clone());
        }

        check_and_set_color_arg!("assistant-color", m, options.assistant_color);
        check_and_set_color_arg!("user-color", m, options.user_color);
        check_and_set_color_arg!("tool-color", m, options.tool_color);

        options.message = m.get_one::<String>("message").cloned();

        Self::validate_mandatory_options(&options)?;

        Ok(options)
    }
}
