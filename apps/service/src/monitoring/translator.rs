use super::types::{CheckResult, ParsedOutput, PushStatus};

/// Maximum length of a published message, truncation marker included.
pub const MAX_MSG_LEN: usize = 250;

const MARKER: &str = "...";

/// Map parsed plugin output to the normalized up/down result. The message is
/// left untruncated here; [`shorten`] is applied when publish arguments are
/// built.
pub fn translate(parsed: &ParsedOutput) -> CheckResult {
    CheckResult {
        status: if parsed.exit_code == 0 { PushStatus::Up } else { PushStatus::Down },
        msg: parsed.service_output.clone(),
    }
}

/// Truncate `msg` to at most `max` characters.
///
/// Messages that already fit come back unchanged. Longer ones are collapsed
/// to single spaces, cut on a word boundary and suffixed with `...`; a single
/// word longer than the budget is cut mid-word so the bound always holds.
pub fn shorten(msg: &str, max: usize) -> String {
    if msg.chars().count() <= max {
        return msg.to_string();
    }

    let collapsed = msg.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }

    let budget = max.saturating_sub(MARKER.chars().count());
    let mut result = String::new();
    for word in collapsed.split(' ') {
        let extra = if result.is_empty() { 0 } else { 1 };
        if result.chars().count() + extra + word.chars().count() > budget {
            break;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    if result.is_empty() {
        result = collapsed.chars().take(budget).collect();
    }
    result.push_str(MARKER);
    result
}
