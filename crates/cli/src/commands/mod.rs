pub mod cart;
pub mod config;
pub mod glass;
pub mod round_price;
pub mod size;

use serde::Serialize;

/// Exit codes shared by every command.
pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_CONFIG: u8 = 3;
pub const EXIT_PRICING: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a, T: Serialize> {
    command: &'a str,
    status: &'a str,
    error_class: Option<&'a str>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with(command, message, None::<()>)
    }

    /// Success envelope carrying a command-specific payload under `data`.
    pub fn success_with<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        data: Option<T>,
    ) -> Self {
        let payload = CommandOutcome {
            command,
            status: "ok",
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(command, &payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command,
            status: "error",
            error_class: Some(error_class),
            message: message.into(),
            data: None::<()>,
        };
        Self { exit_code, output: serialize_payload(command, &payload) }
    }
}

fn serialize_payload<T: Serialize>(command: &str, payload: &CommandOutcome<'_, T>) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"{command}\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
