use thiserror::Error;

/// App errors
#[derive(Error, Debug)]
pub enum AppError {

    /// Toml parsing error
    #[error("Failed to parse config file: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Config parsing error
    #[error("Failed to parse config file: {0}")]
    ConfigParseError(&'static str),

    /// No API key from any source.
    #[error("No API key provided. Set ANTHROPIC_API_KEY environment variable or use --api-key.")]
    MissingApiKey,

    /// Incorrect argument value
    #[error("Incorrect argument value: {0}")]
    InvalidArgError(&'static str),

    /// Library error
    #[error("{0}")]
    LibError(#[from] termchat_lib::Error),

    /// Other errors
    #[error("Reading user input: {0}")]
    Rustyline(#[from] rustyline::error::ReadlineError),

    /// Config parsing error
    #[error("The format of the color value is incorrect")]
    ColorParseError,

    /// General error.
    #[error("{0}")]
    Error(String),
}
