//! Shared terminal output helpers.
//!
//! Global flags are mirrored into `MAPSCOUT_*` environment variables by main
//! so every module can check them without threading a config struct through.

/// True when `--quiet` was passed (or `MAPSCOUT_QUIET` is set).
pub fn is_quiet() -> bool {
    std::env::var("MAPSCOUT_QUIET").is_ok()
}

/// True when `--no-color` was passed (or `MAPSCOUT_NO_COLOR` is set).
pub fn no_color() -> bool {
    std::env::var("MAPSCOUT_NO_COLOR").is_ok()
}

/// Minimal ANSI styling that honors `--no-color`.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self { color: !no_color() }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.color {
            "\x1b[32m✔\x1b[0m"
        } else {
            "[OK]"
        }
    }

    pub fn warn_sym(&self) -> &'static str {
        if self.color {
            "\x1b[33m!\x1b[0m"
        } else {
            "[!!]"
        }
    }

    pub fn fail_sym(&self) -> &'static str {
        if self.color {
            "\x1b[31m✘\x1b[0m"
        } else {
            "[XX]"
        }
    }

    /// Highlight an inline value.
    pub fn accent(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1;36m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Banner/title styling.
    pub fn title(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1;31m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}
