mod error;
mod launch;
mod runner;

use std::collections::HashMap;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use runner::SystemRunner;

fn init_logging() {
    let filter = EnvFilter::try_from_env("TERMCHAT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let env: HashMap<String, String> = launch::unicode_env(std::env::vars_os());
    let args = match launch::unicode_args(std::env::args_os().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(launch::USAGE_EXIT);
        }
    };

    let outcome = launch::launch(&env, &args, &SystemRunner, &mut std::io::stderr());
    debug!(state = ?outcome.state, code = outcome.exit_code, "launcher finished");

    std::process::exit(outcome.exit_code);
}
