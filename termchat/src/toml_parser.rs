use toml::Table;
use toml::Value;
use crate::options::Options;
use crate::error::AppError;
use crate::util::parse_colors;

fn get_str_val<'a>(val: &'a Value, err: &'static str) -> Result<&'a str, AppError> {
    val.as_str().ok_or(AppError::ConfigParseError(err))
}

fn get_int_val(val: &Value, err: &'static str) -> Result<i64, AppError> {
    val.as_integer().ok_or(AppError::ConfigParseError(err))
}

fn get_u32_val(val: &Value, err: &'static str) -> Result<u32, AppError> {
    u32::try_from(get_int_val(val, err)?).map_err(|_| AppError::ConfigParseError(err))
}

fn get_float_val(val: &Value, err: &'static str) -> Result<f64, AppError> {
    match val {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        _ => Err(AppError::ConfigParseError(err)),
    }
}

fn get_bool_val(val: &Value, err: &'static str) -> Result<bool, AppError> {
    val.as_bool().ok_or(AppError::ConfigParseError(err))
}

fn get_color_val(val: &Value, err: &'static str) -> Result<(Option<[u8;3]>, Option<[u8;3]>), AppError> {
    let s = get_str_val(val, err)?;
    parse_colors(s).map_err(|_| AppError::ConfigParseError(err))
}

/// Apply `[session]` and `[settings]` tables of the config file to options.
pub fn parse_toml_config(content: &str, options: &mut Options) -> Result<(), AppError> {

    let toml_config: Table = toml::from_str(content)?;

    if let Some(section) = toml_config.get("session") {
        let st = section.as_table().ok_or(AppError::ConfigParseError("session must be a table"))?;

        if let Some(val) = st.get("api_key") {
            options.api_key.replace(get_str_val(val, "api_key must be a string value")?.to_owned());
        }

        if let Some(val) = st.get("model") {
            options.model.replace(get_str_val(val, "model must be a string value")?.to_owned());
        }

        if let Some(val) = st.get("tool_version") {
            options.tool_version.replace(get_str_val(val, "tool_version must be a string value")?.to_owned());
        }

        if let Some(val) = st.get("api_url") {
            options.api_url.replace(get_str_val(val, "api_url must be a string value")?.to_owned());
        }

        if let Some(val) = st.get("api_version") {
            options.api_version.replace(get_str_val(val, "api_version must be a string value")?.to_owned());
        }

        if let Some(val) = st.get("max_tokens") {
            options.max_tokens.replace(get_int_val(val, "max_tokens must be an integer value")?);
        }

        if let Some(val) = st.get("thinking_budget") {
            options.thinking_budget.replace(get_int_val(val, "thinking_budget must be an integer value")?);
        }

        if let Some(val) = st.get("temperature") {
            options.temperature.replace(get_float_val(val, "temperature must be a float value")?);
        }

        if let Some(val) = st.get("tool_host") {
            options.tool_host.replace(get_str_val(val, "tool_host must be a string value")?.to_owned());
        }

        if let Some(val) = st.get("display_width") {
            options.display_width.replace(get_u32_val(val, "display_width must be a non-negative integer")?);
        }

        if let Some(val) = st.get("display_height") {
            options.display_height.replace(get_u32_val(val, "display_height must be a non-negative integer")?);
        }

        if let Some(val) = st.get("display_number") {
            options.display_number.replace(get_u32_val(val, "display_number must be a non-negative integer")?);
        }

        if let Some(val) = st.get("prompt_caching") {
            options.prompt_caching.replace(get_bool_val(val, "prompt_caching must be a boolean value")?);
        }

        if let Some(val) = st.get("prompt") {
            options.prompt.replace(get_str_val(val, "prompt must be a string value")?.to_owned());
        }
    }

    if let Some(settings) = toml_config.get("settings").and_then(Value::as_table) {
        if let Some(val) = settings.get("user_color") {
            options.user_color = get_color_val(val, "user_color value must have valid format, e.g. 'fg(255,0,123);bg(0,123,255)'.")?;
        }
        if let Some(val) = settings.get("assistant_color") {
            options.assistant_color = get_color_val(val, "assistant_color value must have valid format, e.g. 'fg(255,0,123);bg(0,123,255)'.")?;
        }
        if let Some(val) = settings.get("tool_color") {
            options.tool_color = get_color_val(val, "tool_color value must have valid format, e.g. 'fg(255,0,123);bg(0,123,255)'.")?;
        }
    }

    Ok(())
}
