use std::io::Write;
use std::process::Stdio;
use std::thread;
use serde::Deserialize;
use serde_json::Value;
use termchat_lib::llm::ToolResult;
use tracing::{debug, warn};
use crate::util::shell_command;

/// Result of one tool call as reported by a tool host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolOutput {
    /// Text output.
    #[serde(default)]
    pub output: Option<String>,
    /// Error text.
    #[serde(default)]
    pub error: Option<String>,
    /// PNG screenshot, base64 encoded.
    #[serde(default)]
    pub base64_image: Option<String>,
}

impl ToolOutput {
    /// Failed call.
    pub fn failure(error: impl Into<String>) -> Self {
        ToolOutput {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Result message answering the call `call_id`.
    pub fn into_result(self, call_id: String, name: String) -> ToolResult {
        ToolResult {
            call_id,
            name,
            output: self.output,
            error: self.error,
            base64_image: self.base64_image,
        }
    }
}

/// Executes the tools offered to the model.
pub trait ToolHost {
    /// Run tool `name` with the model's `input`. Failures are reported in the output.
    fn run(&mut self, name: &str, input: &Value) -> ToolOutput;
}

/// Used when no tool host command is configured.
pub struct UnavailableToolHost;

impl ToolHost for UnavailableToolHost {
    fn run(&mut self, name: &str, _input: &Value) -> ToolOutput {
        ToolOutput::failure(format!("Tool {name} is not available: no tool host is configured (use --tool-host)."))
    }
}

/// Runs `<command> <tool-name>` per call, input JSON on stdin, output JSON on stdout.
pub struct ExternalToolHost {
    command: String,
}

impl ExternalToolHost {

    /// Create a host for the command line.
    pub fn new(command: String) -> Self {
        ExternalToolHost { command }
    }

    fn exec(&self, name: &str, input: &Value) -> Result<ToolOutput, String> {
        let line = format!("{} {}", self.command, name);
        debug!(command = %line, "running tool host");

        let mut child = shell_command(&line)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| format!("Failed to run tool host {}: {}", self.command, err))?;

        let payload = serde_json::to_vec(input).map_err(|err| err.to_string())?;
        let writer = child.stdin.take().map(|mut stdin| thread::spawn(move || {
            // hosts that ignore their input close the pipe early
            if let Err(err) = stdin.write_all(&payload) {
                debug!(%err, "tool host did not read its input");
            }
        }));

        let output = child.wait_with_output()
            .map_err(|err| format!("Failed to wait for tool host {}: {}", self.command, err))?;

        if let Some(handle) = writer {
            if handle.join().is_err() {
                warn!("tool input writer panicked");
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(if stderr.is_empty() {
                format!("Tool host failed with {}", output.status)
            } else {
                format!("Tool host failed with {}: {}", output.status, stderr)
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|err| format!("Tool host returned invalid output: {err}"))
    }
}

fn valid_tool_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl ToolHost for ExternalToolHost {
    fn run(&mut self, name: &str, input: &Value) -> ToolOutput {
        if !valid_tool_name(name) {
            return ToolOutput::failure(format!("Unknown tool: {name}"));
        }

        self.exec(name, input).unwrap_or_else(|err| {
            warn!(tool = name, %err, "tool call failed");
            ToolOutput::failure(err)
        })
    }
}
