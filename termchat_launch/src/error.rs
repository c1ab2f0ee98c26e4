use thiserror::Error;

/// Launcher errors.
#[derive(Error, Debug)]
pub enum LaunchError {

    /// Neither the environment nor the command line supplied a key.
    #[error("No API key provided.")]
    MissingCredential,

    /// Chat program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Command line argument that is not valid UTF-8.
    #[error("Argument is not valid UTF-8: {0}")]
    NotUnicode(String),
}
