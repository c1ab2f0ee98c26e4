//! Credential resolution and hand-off to the chat program.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use clap::{error::ErrorKind, Arg, ArgMatches, Command};
use tracing::{debug, info};
use crate::error::LaunchError;
use crate::runner::ProcessRunner;

/// Environment variable holding the API key.
pub const CREDENTIAL_ENV: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the chat program.
pub const PROGRAM_ENV: &str = "TERMCHAT_PROGRAM";
/// Chat program run by default.
pub const DEFAULT_PROGRAM: &str = "termchat";
/// Flag carrying the API key to the chat program.
pub const API_KEY_FLAG: &str = "--api-key";
/// Flag carrying the model id to the chat program.
pub const MODEL_FLAG: &str = "--model";
/// Exit code when no API key could be resolved.
pub const MISSING_CREDENTIAL_EXIT: i32 = 1;
/// Exit code when the chat program could not be started.
pub const SPAWN_FAILURE_EXIT: i32 = 127;
/// Exit code when the command line can't be read.
pub const USAGE_EXIT: i32 = 2;

const BIN_NAME: &str = "termchat-launch";
const USAGE: &str = "termchat-launch [API_KEY] [--model MODEL]";

/// API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key, rejecting empty values.
    pub fn new(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Credential(value.to_owned()))
        }
    }

    /// Raw key value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Launcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    /// Initial state, no key resolved yet.
    AwaitingCredential,
    /// Chat program was handed the key.
    Invoking,
    /// Nothing was run.
    Aborted,
}

/// External program call.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut redact = false;
        let args: Vec<&str> = self.args.iter().map(|arg| {
            let shown = if redact { "****" } else { arg.as_str() };
            redact = arg == API_KEY_FLAG;
            shown
        }).collect();

        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &args)
            .finish()
    }
}

/// Result of a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Terminal state.
    pub state: LaunchState,
    /// Launcher exit code.
    pub exit_code: i32,
    /// What was run, if anything.
    pub invocation: Option<Invocation>,
}

impl LaunchOutcome {
    fn aborted(exit_code: i32) -> Self {
        LaunchOutcome {
            state: LaunchState::Aborted,
            exit_code,
            invocation: None,
        }
    }
}

/// Resolved launcher settings, built once at startup.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// API key.
    pub credential: Credential,
    /// Model id forwarded as is.
    pub model: Option<String>,
    /// Chat program.
    pub program: String,
}

impl LaunchConfig {

    /// Command line for the chat program.
    pub fn invocation(&self) -> Invocation {
        let mut args = vec![API_KEY_FLAG.to_owned(), self.credential.expose().to_owned()];

        if let Some(model) = &self.model {
            args.push(MODEL_FLAG.to_owned());
            args.push(model.clone());
        }

        Invocation {
            program: self.program.clone(),
            args,
        }
    }
}

struct LaunchArgs {
    api_key: Option<String>,
    model: Option<String>,
    program: Option<String>,
}

impl LaunchArgs {
    fn key_only(api_key: &str) -> Self {
        LaunchArgs {
            api_key: Some(api_key.to_owned()),
            model: None,
            program: None,
        }
    }
}

const HELP_FLAGS: [&str;4] = ["-h", "--help", "-V", "--version"];

fn argument_parser<T>(args: impl IntoIterator<Item = T>) -> Result<ArgMatches, clap::Error>
    where T: Into<OsString> + Clone
{
    Command::new(BIN_NAME)
        .about("Starts a termchat session, resolving the Anthropic API key first.")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("api-key")
            .value_name("API_KEY")
            .help("Anthropic API key, used when ANTHROPIC_API_KEY is not set")
            .index(1)
            .required(false)
        ).arg(
            Arg::new("extra")
            .index(2)
            .num_args(0..)
            .hide(true)
            .required(false)
        ).arg(
            Arg::new("model")
            .long("model")
            .short('m')
            .help("Model id passed through to the chat program")
            .required(false)
        ).arg(
            Arg::new("program")
            .long("program")
            .help("Chat program to run (default: termchat, or TERMCHAT_PROGRAM)")
            .required(false)
        )
        .try_get_matches_from(args)
}

/// A single argument is always the API key, whatever it looks like.
/// Longer command lines are parsed as options, falling back to the first
/// argument as the key when they can't be.
fn parse_args(args: &[String]) -> Result<LaunchArgs, clap::Error> {
    if let [single] = args {
        if !HELP_FLAGS.contains(&single.as_str()) {
            return Ok(LaunchArgs::key_only(single));
        }
    }

    let argv = std::iter::once(BIN_NAME.to_owned()).chain(args.iter().cloned());

    match argument_parser(argv) {
        Ok(m) => Ok(LaunchArgs {
            api_key: m.get_one::<String>("api-key").cloned(),
            model: m.get_one::<String>("model").cloned(),
            program: m.get_one::<String>("program").cloned(),
        }),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => Err(err),
        Err(err) => match args.first() {
            Some(first) => {
                debug!(kind = ?err.kind(), "options not understood, first argument taken as the API key");
                Ok(LaunchArgs::key_only(first))
            },
            None => Err(err),
        },
    }
}

/// Environment entries that are valid UTF-8. Others can't hold settings and are skipped.
pub fn unicode_env(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Command line arguments as strings.
pub fn unicode_args(args: impl IntoIterator<Item = OsString>) -> Result<Vec<String>, LaunchError> {
    args.into_iter()
        .map(|arg| arg.into_string().map_err(|arg| LaunchError::NotUnicode(arg.to_string_lossy().into_owned())))
        .collect()
}

fn missing_env_warning() -> String {
    format!("Warning: {CREDENTIAL_ENV} environment variable is not set.
Set it with:        export {CREDENTIAL_ENV}=your_api_key
Or pass it as the first argument.
Usage: {USAGE}")
}

/// Pick the API key. The environment wins over the positional argument.
pub fn resolve_credential<W: Write>(env_value: Option<&str>, positional: Option<&str>, diag: &mut W) -> Result<Credential, LaunchError> {
    if let Some(credential) = env_value.and_then(Credential::new) {
        if positional.is_some() {
            debug!("{CREDENTIAL_ENV} is set, positional API key ignored");
        }
        return Ok(credential);
    }

    let _ = writeln!(diag, "{}", missing_env_warning());

    positional
        .and_then(Credential::new)
        .ok_or(LaunchError::MissingCredential)
}

/// Resolve the API key from `env` or `args` and run the chat program through `runner`.
///
/// `args` excludes the launcher's own name. Diagnostics go to `diag`.
/// The outcome carries the child's exit code, or the launcher's own code when
/// nothing could be run.
pub fn launch<W: Write>(env: &HashMap<String, String>, args: &[String], runner: &dyn ProcessRunner, diag: &mut W) -> LaunchOutcome {
    debug!(state = ?LaunchState::AwaitingCredential, "launcher started");

    let launch_args = match parse_args(args) {
        Ok(launch_args) => launch_args,
        Err(err) => {
            let _ = write!(diag, "{}", err.render());
            return LaunchOutcome::aborted(err.exit_code());
        },
    };

    let credential = match resolve_credential(
        env.get(CREDENTIAL_ENV).map(String::as_str),
        launch_args.api_key.as_deref(),
        diag,
    ) {
        Ok(credential) => credential,
        Err(err) => {
            let _ = writeln!(diag, "Error: {err}");
            return LaunchOutcome::aborted(MISSING_CREDENTIAL_EXIT);
        }
    };

    let program = launch_args.program
        .or_else(|| env.get(PROGRAM_ENV).filter(|p| !p.is_empty()).cloned())
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_owned());

    let config = LaunchConfig {
        credential,
        model: launch_args.model,
        program,
    };

    let invocation = config.invocation();
    info!(program = %invocation.program, model = ?config.model, "starting chat session");

    let exit_code = match runner.run(&invocation) {
        Ok(code) => code,
        Err(err) => {
            let _ = writeln!(diag, "Error: {err}");
            SPAWN_FAILURE_EXIT
        }
    };

    LaunchOutcome {
        state: LaunchState::Invoking,
        exit_code,
        invocation: Some(invocation),
    }
}
