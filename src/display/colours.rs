//! Colour management for notification output
//!
//! Maps each notification kind to a terminal colour, with graceful
//! degradation to plain text when colours are off.

use colored::{Color, ColoredString, Colorize};

use crate::notifications::NotificationKind;
use super::config::DisplayConfig;

/// Applies kind colours when enabled
#[derive(Debug, Clone)]
pub struct ColourManager {
    enabled: bool,
}

impl ColourManager {
    /// Create a ColourManager with explicit colour control
    pub fn with_colours(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create a ColourManager from display settings and the environment
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::with_colours(config.should_use_colours())
    }

    /// Create a ColourManager from the --no-color flag and display settings
    pub fn from_args_and_config(no_color_flag: bool, config: &DisplayConfig) -> Self {
        if no_color_flag {
            Self::with_colours(false)
        } else {
            Self::from_config(config)
        }
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    /// Terminal colour for a notification kind
    pub fn kind_colour(kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
            NotificationKind::Warning => Color::Yellow,
            NotificationKind::Info => Color::Blue,
        }
    }

    /// Format text in the colour of `kind`
    pub fn kind(&self, kind: NotificationKind, text: &str) -> ColoredString {
        if self.enabled {
            text.color(Self::kind_colour(kind))
        } else {
            text.normal()
        }
    }

    /// Format secondary text (ids, ttl annotations)
    pub fn dim(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.bright_black()
        } else {
            text.normal()
        }
    }

    /// Format headings
    pub fn highlight(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.cyan().bold()
        } else {
            text.normal()
        }
    }
}

impl Default for ColourManager {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}
