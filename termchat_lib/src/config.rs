/// Messages API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
/// Messages API version header value.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
/// Beta flag enabling prompt caching.
pub const PROMPT_CACHING_BETA_FLAG: &str = "prompt-caching-2024-07-31";

/// Model parameters.
#[derive(Clone, Debug)]
pub struct Config {
    /// Model name.
    pub name: String,
    /// API key.
    pub api_key: String,
    /// Model API URL.
    pub api_url: String,
    /// Model API version.
    pub api_version: String,
    /// Maximum number of tokens that will be generated.
    pub max_tokens: i64,
    /// Level of randomization when choosing tokens.
    pub temperature: Option<f64>,
    /// Extended thinking budget. Thinking is off when unset.
    pub thinking_budget: Option<i64>,
    /// Mark system prompt and recent user turns as cacheable.
    pub prompt_caching: bool,
    /// Values of the `anthropic-beta` header.
    pub betas: Vec<String>,
}

impl Config {

    /// Create minimal config using model name and API key.
    pub fn new(name: String, api_key: String) -> Self {
        Config {
            name,
            api_key,
            api_url: DEFAULT_API_URL.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            max_tokens: 4096,
            temperature: None,
            thinking_budget: None,
            prompt_caching: false,
            betas: vec![],
        }
    }

    /// Beta flags sent with each request, caching flag included when enabled.
    pub fn beta_header(&self) -> Option<String> {
        let mut betas: Vec<&str> = self.betas.iter().map(String::as_str).collect();

        if self.prompt_caching && !betas.contains(&PROMPT_CACHING_BETA_FLAG) {
            betas.push(PROMPT_CACHING_BETA_FLAG);
        }

        if betas.is_empty() {
            None
        } else {
            Some(betas.join(","))
        }
    }
}
