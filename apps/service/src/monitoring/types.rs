use serde::{Deserialize, Serialize};

/// Raw output of one check execution. Produced fresh per run, owned by the
/// runner for the duration of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Nagios service state derived from a plugin exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Fixed four-entry exit-code map; any other value is `Unknown`.
    pub fn from_exit_code(exit_code: i32) -> Self {
        match exit_code {
            0 => ServiceState::Ok,
            1 => ServiceState::Warning,
            2 => ServiceState::Critical,
            _ => ServiceState::Unknown,
        }
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::Ok => write!(f, "OK"),
            ServiceState::Warning => write!(f, "WARNING"),
            ServiceState::Critical => write!(f, "CRITICAL"),
            ServiceState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Structured fields extracted from Nagios-style plugin output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedOutput {
    pub service_state: ServiceState,
    pub exit_code: i32,
    pub service_output: String,
    pub long_service_output: String,
    pub service_performance_data: String,
}

/// Status reported to a push sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    #[default]
    #[serde(rename = "")]
    Unset,
    Up,
    Down,
}

impl std::fmt::Display for PushStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushStatus::Unset => write!(f, ""),
            PushStatus::Up => write!(f, "up"),
            PushStatus::Down => write!(f, "down"),
        }
    }
}

/// Normalized result of one check run, before publish arguments are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: PushStatus,
    pub msg: String,
}

/// The payload that crosses the publish boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushParams {
    /// Check name; doubles as the log correlation key.
    pub id: String,
    pub status: PushStatus,
    pub msg: String,
    /// Elapsed milliseconds for the whole pipeline run, when measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_map_covers_all_states() {
        assert_eq!(ServiceState::from_exit_code(0), ServiceState::Ok);
        assert_eq!(ServiceState::from_exit_code(1), ServiceState::Warning);
        assert_eq!(ServiceState::from_exit_code(2), ServiceState::Critical);
        assert_eq!(ServiceState::from_exit_code(3), ServiceState::Unknown);
        assert_eq!(ServiceState::from_exit_code(99), ServiceState::Unknown);
        assert_eq!(ServiceState::from_exit_code(-1), ServiceState::Unknown);
    }

    #[test]
    fn push_params_serialize_to_one_object() {
        let params = PushParams {
            id: "disk".into(),
            status: PushStatus::Up,
            msg: "DISK OK".into(),
            ping: None,
        };
        let line = serde_json::to_string(&params).expect("serializable");
        assert_eq!(line, r#"{"id":"disk","status":"up","msg":"DISK OK"}"#);

        let with_ping = PushParams { ping: Some(12), ..params };
        let line = serde_json::to_string(&with_ping).expect("serializable");
        assert!(line.ends_with(r#""ping":12}"#));
    }
}
