mod commands;
mod config;
mod error;
mod options;
mod prompts;
mod session;
mod style;
mod term;
mod toml_parser;
mod util;
mod tools;

use error::AppError;
use options::Options;
use config::Config;
use session::Session;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env("TERMCHAT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_session() -> Result<(), AppError> {
    let options = Options::load(std::env::args_os())?;
    let config: Config = options.try_into()?;

    Session::new(config)?.run()
}

fn main() {
    init_logging();

    if let Err(e) = run_session() {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
