use termchat_lib::Config as ModelParams;
use termchat_lib::tools::{Display, ToolGroup, ToolVersion};
use termchat_lib::{DEFAULT_API_URL, DEFAULT_API_VERSION};

use crate::{error::AppError, options::Options};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
/// Tool set used when none is configured.
pub const DEFAULT_TOOL_VERSION: &str = "computer_use_20250124";
/// Generation limit used when none is configured.
pub const DEFAULT_MAX_TOKENS: i64 = 16384;

/// Application settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// User messages color.
    pub user_color: (Option<[u8;3]>, Option<[u8;3]>),
    /// Assistant messages color.
    pub assistant_color: (Option<[u8;3]>, Option<[u8;3]>),
    /// Tool output color.
    pub tool_color: (Option<[u8;3]>, Option<[u8;3]>),
}

/// App config
#[derive(Clone, Debug)]
pub struct Config {
    /// Model parameters
    pub model_params: ModelParams,
    /// Tools offered to the model
    pub tools: ToolGroup,
    /// Screen the computer tool operates on
    pub display: Display,
    /// Command executing tool calls
    pub tool_host: Option<String>,
    /// First message
    pub message: Option<String>,
    /// Settings
    pub settings: Settings,
    /// Custom instructions to add to system prompt.
    pub prompt: Option<String>,
}

impl TryFrom<Options> for Config {
    type Error = AppError;

    fn try_from(options: Options) -> Result<Self, AppError> {
        let api_key = options.api_key.ok_or(AppError::MissingApiKey)?;
        let model = options.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let version = options.tool_version.as_deref().unwrap_or(DEFAULT_TOOL_VERSION);
        let version = ToolVersion::try_from(version)
            .map_err(|_| AppError::InvalidArgError("tool-version must be one of: computer_use_20250124, computer_use_20241022"))?;

        let defaults = Display::default();
        let display = Display {
            width: options.display_width.unwrap_or(defaults.width),
            height: options.display_height.unwrap_or(defaults.height),
            number: options.display_number,
        };

        let model_params = ModelParams {
            name: model,
            api_key,
            api_url: options.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            api_version: options.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: options.temperature,
            thinking_budget: options.thinking_budget,
            prompt_caching: options.prompt_caching.unwrap_or(true),
            betas: vec![],
        };

        let settings = Settings {
            user_color: options.user_color,
            assistant_color: options.assistant_color,
            tool_color: options.tool_color,
        };

        Ok(Config {
            model_params,
            tools: ToolGroup::new(version, display),
            display,
            tool_host: options.tool_host.filter(|host| !host.trim().is_empty()),
            message: options.message,
            settings,
            prompt: options.prompt,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_try_from() {
        let mut options = Options {
            api_key: Some("apk".into()),
            model: Some("mdl".into()),
            tool_version: Some("computer_use_20241022".into()),
            max_tokens: Some(2048),
            thinking_budget: Some(1024),
            temperature: Some(0.5),
            api_url: Some("apr".into()),
            api_version: Some("apv".into()),
            tool_host: Some("host run".into()),
            display_width: Some(1280),
            display_height: None,
            display_number: Some(2),
            prompt_caching: Some(false),
            prompt: Some("prm".into()),
            message: Some("msg".into()),
            user_color: (Some([255,0,123]), Some([0,123,255])),
            assistant_color: (Some([255,0,124]), Some([0,124,255])),
            tool_color: (Some([255,0,125]), Some([0,125,255])),
        };

        let config = Config::try_from(options.clone()).expect("create from options");

        assert_eq!(config.message, Some("msg".into()));
        assert_eq!(config.prompt, Some("prm".into()));
        assert_eq!(config.tool_host, Some("host run".into()));
        assert_eq!(config.model_params.name, "mdl");
        assert_eq!(config.model_params.api_key, "apk");
        assert_eq!(config.model_params.api_url, "apr");
        assert_eq!(config.model_params.api_version, "apv");
        assert_eq!(config.model_params.max_tokens, 2048);
        assert_eq!(config.model_params.thinking_budget, Some(1024));
        assert_eq!(config.model_params.temperature, Some(0.5));
        assert!(!config.model_params.prompt_caching);
        assert_eq!(config.tools.version, ToolVersion::ComputerUse20241022);
        assert_eq!(config.display, Display { width: 1280, height: 768, number: Some(2) });

        let computer = &config.tools.tools[0].options;
        assert_eq!(computer["display_width_px"], 1280);
        assert_eq!(computer["display_height_px"], 768);
        assert_eq!(computer["display_number"], 2);

        assert_eq!(config.settings.user_color, (Some([255,0,123]), Some([0,123,255])));
        assert_eq!(config.settings.assistant_color, (Some([255,0,124]), Some([0,124,255])));
        assert_eq!(config.settings.tool_color, (Some([255,0,125]), Some([0,125,255])));

        options.tool_version = Some("computer_use_1999".into());
        assert!(matches!(Config::try_from(options.clone()), Err(AppError::InvalidArgError(_))));
    }

    #[test]
    fn test_defaults() {
        let options = Options {
            api_key: Some("apk".into()),
            tool_host: Some("  ".into()),
            ..Options::default()
        };

        let config = Config::try_from(options).expect("create from options");

        assert_eq!(config.model_params.name, DEFAULT_MODEL);
        assert_eq!(config.model_params.api_url, DEFAULT_API_URL);
        assert_eq!(config.model_params.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.model_params.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(config.model_params.prompt_caching);
        assert_eq!(config.tools.version, ToolVersion::ComputerUse20250124);
        assert_eq!(config.tool_host, None);

        assert!(matches!(Config::try_from(Options::default()), Err(AppError::MissingApiKey)));
    }
}
