//! Keyboard and mouse vocabulary understood by the view.

/// Commands bound to single keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    ToggleFullscreen,
    NextColormap,
    IncreaseAveraging,
    DecreaseAveraging,
    ToggleMaxHold,
    ToggleLiveMarker,
    TogglePause,
    /// Shift the dB window down by one step (trace moves up).
    RangeUp,
    RangeDown,
    /// Narrow the dB window.
    RangeDecrease,
    /// Widen the dB window.
    RangeIncrease,
}

impl KeyCommand {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "f" => Self::ToggleFullscreen,
            "c" => Self::NextColormap,
            "+" => Self::IncreaseAveraging,
            "-" => Self::DecreaseAveraging,
            "m" => Self::ToggleMaxHold,
            "l" => Self::ToggleLiveMarker,
            "p" => Self::TogglePause,
            "ArrowUp" => Self::RangeUp,
            "ArrowDown" => Self::RangeDown,
            "ArrowLeft" => Self::RangeDecrease,
            "ArrowRight" => Self::RangeIncrease,
            _ => return None,
        })
    }
}

/// `MouseEvent.buttons` bit for the middle (wheel) button.
pub const MIDDLE_BUTTON: u16 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map() {
        assert_eq!(KeyCommand::from_key("p"), Some(KeyCommand::TogglePause));
        assert_eq!(KeyCommand::from_key("ArrowLeft"), Some(KeyCommand::RangeDecrease));
        assert_eq!(KeyCommand::from_key("P"), None);
        assert_eq!(KeyCommand::from_key("s"), None);
    }
}
