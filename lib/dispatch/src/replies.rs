//! Fixed reply texts.

use serde::Deserialize;
use voice_relay_conversation::Turn;

fn default_fallback() -> String {
    "sorry".to_string()
}

fn default_invalid_operation() -> String {
    "invalid operation".to_string()
}

fn default_under_development() -> String {
    "under development".to_string()
}

fn default_menu_prompt() -> String {
    "What would you like to do?".to_string()
}

fn default_context_prompt() -> String {
    "Current context depth: {depth}. How many previous turns should be included?".to_string()
}

fn default_depth_set() -> String {
    "Context depth set to {depth}.".to_string()
}

fn default_history_cleared() -> String {
    "History cleared. Previous conversation:".to_string()
}

fn default_history_empty() -> String {
    "History is already empty.".to_string()
}

/// User-facing texts the relay sends verbatim.
///
/// `{depth}` in `context_prompt` and `depth_set` is replaced with the
/// chat's depth.
#[derive(Debug, Clone, Deserialize)]
pub struct Replies {
    /// Sent for unknown updates and degraded completions.
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default = "default_invalid_operation")]
    pub invalid_operation: String,
    #[serde(default = "default_under_development")]
    pub under_development: String,
    #[serde(default = "default_menu_prompt")]
    pub menu_prompt: String,
    #[serde(default = "default_context_prompt")]
    pub context_prompt: String,
    #[serde(default = "default_depth_set")]
    pub depth_set: String,
    #[serde(default = "default_history_cleared")]
    pub history_cleared: String,
    #[serde(default = "default_history_empty")]
    pub history_empty: String,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            invalid_operation: default_invalid_operation(),
            under_development: default_under_development(),
            menu_prompt: default_menu_prompt(),
            context_prompt: default_context_prompt(),
            depth_set: default_depth_set(),
            history_cleared: default_history_cleared(),
            history_empty: default_history_empty(),
        }
    }
}

impl Replies {
    #[must_use]
    pub fn context_prompt(&self, depth: u32) -> String {
        self.context_prompt.replace("{depth}", &depth.to_string())
    }

    #[must_use]
    pub fn depth_set(&self, depth: u32) -> String {
        self.depth_set.replace("{depth}", &depth.to_string())
    }

    /// Renders history removed by a clear, oldest turn first.
    #[must_use]
    pub fn cleared_history(&self, turns: &[Turn]) -> String {
        if turns.is_empty() {
            return self.history_empty.clone();
        }
        let mut out = self.history_cleared.clone();
        for turn in turns {
            out.push_str("\nuser: ");
            out.push_str(&turn.user);
            out.push_str("\nassistant: ");
            out.push_str(&turn.assistant);
        }
        out
    }

    /// Renders the text reply for one conversation turn.
    #[must_use]
    pub fn turn_reply(user: &str, assistant: &str) -> String {
        format!("{user}\n{assistant}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_config_keeps_other_defaults() {
        let replies: Replies = serde_json::from_value(json!({ "fallback": "すみません" })).unwrap();

        assert_eq!(replies.fallback, "すみません");
        assert_eq!(replies.invalid_operation, "invalid operation");
    }

    #[test]
    fn depth_placeholders_are_filled() {
        let replies = Replies::default();

        assert_eq!(replies.depth_set(10), "Context depth set to 10.");
        assert!(replies.context_prompt(3).starts_with("Current context depth: 3."));
    }

    #[test]
    fn cleared_history_lists_turns_in_order() {
        let replies = Replies::default();
        let text = replies.cleared_history(&[Turn::new("q1", "a1"), Turn::new("q2", "a2")]);

        assert_eq!(
            text,
            "History cleared. Previous conversation:\nuser: q1\nassistant: a1\nuser: q2\nassistant: a2"
        );
    }

    #[test]
    fn cleared_history_when_empty() {
        assert_eq!(
            Replies::default().cleared_history(&[]),
            "History is already empty."
        );
    }

    #[test]
    fn turn_reply_joins_with_newline() {
        assert_eq!(Replies::turn_reply("hello", "hi"), "hello\nhi");
    }
}
