use std::fmt;
use serde_json::{json, Map, Value};
use crate::error::Error;

/// Anthropic-defined tool, described by type and name only.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Versioned tool type, e.g. `bash_20250124`.
    pub tool_type: String,
    /// Name the model uses to call the tool.
    pub name: String,
    /// Extra tool-specific fields.
    pub options: Map<String, Value>,
}

impl ToolSpec {

    fn new(tool_type: &str, name: &str) -> Self {
        ToolSpec {
            tool_type: tool_type.to_owned(),
            name: name.to_owned(),
            options: Map::new(),
        }
    }

    /// Tool definition as sent in the `tools` array.
    pub fn to_param(&self) -> Value {
        let mut param = json!({
            "type": self.tool_type,
            "name": self.name,
        });
        for (k, v) in self.options.iter() {
            param[k] = v.clone();
        }
        param
    }
}

/// Screen the computer tool operates on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Display {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// X11 display number.
    pub number: Option<u32>,
}

impl Default for Display {
    fn default() -> Self {
        Display {
            width: 1024,
            height: 768,
            number: None,
        }
    }
}

/// Tool set revision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolVersion {
    /// October 2024 tool set.
    ComputerUse20241022,
    /// January 2025 tool set.
    ComputerUse20250124,
}

impl TryFrom<&str> for ToolVersion {
    type Error = Error;

    fn try_from(val: &str) -> Result<Self, Self::Error> {
        match val {
            "computer_use_20241022" => Ok(ToolVersion::ComputerUse20241022),
            "computer_use_20250124" => Ok(ToolVersion::ComputerUse20250124),
            _ => Err(Error::Error(format!("unknown tool version: {val}"))),
        }
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolVersion::ComputerUse20241022 => "computer_use_20241022",
            ToolVersion::ComputerUse20250124 => "computer_use_20250124",
        })
    }
}

/// Tools offered together, with the beta flag that unlocks them.
#[derive(Debug, Clone)]
pub struct ToolGroup {
    /// Revision.
    pub version: ToolVersion,
    /// Tools.
    pub tools: Vec<ToolSpec>,
    /// Beta flag.
    pub beta_flag: Option<String>,
}

impl ToolGroup {

    /// Tool group for the revision, computer tool sized for `display`.
    pub fn new(version: ToolVersion, display: Display) -> Self {
        let (suffix, beta_flag) = match version {
            ToolVersion::ComputerUse20241022 => ("20241022", "computer-use-2024-10-22"),
            ToolVersion::ComputerUse20250124 => ("20250124", "computer-use-2025-01-24"),
        };

        let mut computer = ToolSpec::new(&format!("computer_{suffix}"), "computer");
        computer.options.insert("display_width_px".into(), display.width.into());
        computer.options.insert("display_height_px".into(), display.height.into());
        if let Some(number) = display.number {
            computer.options.insert("display_number".into(), number.into());
        }

        ToolGroup {
            version,
            tools: vec![
                computer,
                ToolSpec::new(&format!("bash_{suffix}"), "bash"),
                ToolSpec::new(&format!("text_editor_{suffix}"), "str_replace_editor"),
            ],
            beta_flag: Some(beta_flag.to_owned()),
        }
    }

    /// `tools` array of a request.
    pub fn to_params(&self) -> Value {
        Value::Array(self.tools.iter().map(ToolSpec::to_param).collect())
    }
}
