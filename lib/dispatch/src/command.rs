//! Slash-command and callback tables.
//!
//! Extending the bot means adding an entry here and an arm in the
//! controller; nothing else parses command or callback strings.

use voice_relay_telegram::{InlineButton, InlineKeyboard};

/// Callback data prefix of the depth-selector buttons.
pub const DEPTH_PREFIX: &str = "ct_";

/// Depth-selector value that clears history instead of setting a depth.
pub const CLEAR_HISTORY: i64 = -1;

const CONTEXT_CALLBACK: &str = "context";
const TOOLS_CALLBACK: &str = "tools";

/// Depths offered by the depth menu.
const DEPTH_CHOICES: [u32; 5] = [0, 1, 3, 5, 10];

/// A recognized slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/menu` or `/start`: show the main menu.
    OpenMenu,
    /// Anything else.
    Invalid,
}

impl Command {
    /// Parses the command at the start of `text`.
    ///
    /// A `@botname` suffix and trailing arguments are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let word = text.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();
        match name {
            "/menu" | "/start" => Self::OpenMenu,
            _ => Self::Invalid,
        }
    }
}

/// A recognized inline-button payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    /// Show the current depth and the depth menu.
    ShowContext,
    /// Tool settings, not yet available.
    Tools,
    /// Clear history and echo what was removed.
    ClearHistory,
    /// Set the context depth.
    SetDepth(u32),
    /// Anything else. Acknowledged without effect.
    Unrecognized,
}

impl Callback {
    #[must_use]
    pub fn parse(data: &str) -> Self {
        match data {
            CONTEXT_CALLBACK => return Self::ShowContext,
            TOOLS_CALLBACK => return Self::Tools,
            _ => {}
        }

        let Some(value) = data.strip_prefix(DEPTH_PREFIX) else {
            return Self::Unrecognized;
        };
        match value.parse::<i64>() {
            Ok(CLEAR_HISTORY) => Self::ClearHistory,
            Ok(depth) => u32::try_from(depth).map_or(Self::Unrecognized, Self::SetDepth),
            Err(_) => Self::Unrecognized,
        }
    }
}

fn depth_data(value: i64) -> String {
    format!("{DEPTH_PREFIX}{value}")
}

/// The menu opened by [`Command::OpenMenu`].
#[must_use]
pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard::new().row([
        InlineButton::new("Context", CONTEXT_CALLBACK),
        InlineButton::new("Tools", TOOLS_CALLBACK),
    ])
}

/// The depth selector opened by [`Callback::ShowContext`].
#[must_use]
pub fn depth_menu() -> InlineKeyboard {
    InlineKeyboard::new()
        .row(
            DEPTH_CHOICES
                .iter()
                .map(|&d| InlineButton::new(d.to_string(), depth_data(i64::from(d)))),
        )
        .row([InlineButton::new("Clear history", depth_data(CLEAR_HISTORY))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_commands() {
        assert_eq!(Command::parse("/menu"), Command::OpenMenu);
        assert_eq!(Command::parse("/start"), Command::OpenMenu);
        assert_eq!(Command::parse("/menu@relay_bot"), Command::OpenMenu);
        assert_eq!(Command::parse("/start extra args"), Command::OpenMenu);
    }

    #[test]
    fn other_commands_are_invalid() {
        assert_eq!(Command::parse("/enable"), Command::Invalid);
        assert_eq!(Command::parse("/"), Command::Invalid);
        assert_eq!(Command::parse(""), Command::Invalid);
    }

    #[test]
    fn named_callbacks() {
        assert_eq!(Callback::parse("context"), Callback::ShowContext);
        assert_eq!(Callback::parse("tools"), Callback::Tools);
    }

    #[test]
    fn depth_callbacks() {
        assert_eq!(Callback::parse("ct_-1"), Callback::ClearHistory);
        assert_eq!(Callback::parse("ct_0"), Callback::SetDepth(0));
        assert_eq!(Callback::parse("ct_10"), Callback::SetDepth(10));
    }

    #[test]
    fn malformed_callbacks_are_unrecognized() {
        for data in ["", "ct_", "ct_x", "ct_-2", "ct_99999999999", "CONTEXT", "xct_1"] {
            assert_eq!(Callback::parse(data), Callback::Unrecognized, "{data}");
        }
    }

    #[test]
    fn menus_only_emit_parseable_callbacks() {
        for button in main_menu().buttons().chain(depth_menu().buttons()) {
            assert_ne!(
                Callback::parse(&button.callback_data),
                Callback::Unrecognized,
                "{}",
                button.callback_data
            );
        }
    }

    #[test]
    fn depth_menu_offers_clear() {
        assert!(
            depth_menu()
                .buttons()
                .any(|b| Callback::parse(&b.callback_data) == Callback::ClearHistory)
        );
    }
}
