//! Editing modes.
//!
//! `EditMode` is the typesetting mode stored in the document environment
//! (`mode` variable). It selects which font family/series variables style the
//! caret and which language variable is active. An unknown mode string in a
//! place that requires one is a caller contract violation
//! (`language_variable` panics).
//!
//! `InputMode` is the interaction state of the surface; only `Normal`
//! collapses the selection when the tree is retypeset.

use crate::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    #[default]
    Text,
    Math,
    Prog,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mode `{0}`")]
pub struct InvalidMode(pub String);

impl FromStr for EditMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(EditMode::Text),
            "math" => Ok(EditMode::Math),
            "prog" => Ok(EditMode::Prog),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditMode::Text => "text",
            EditMode::Math => "math",
            EditMode::Prog => "prog",
        })
    }
}

impl EditMode {
    pub fn language_var(self) -> &'static str {
        match self {
            EditMode::Text => env::TEXT_LANGUAGE,
            EditMode::Math => env::MATH_LANGUAGE,
            EditMode::Prog => env::PROG_LANGUAGE,
        }
    }

    pub fn family_var(self) -> &'static str {
        match self {
            EditMode::Text => env::TEXT_FAMILY,
            EditMode::Math => env::MATH_FAMILY,
            EditMode::Prog => env::PROG_FAMILY,
        }
    }

    pub fn series_var(self) -> &'static str {
        match self {
            EditMode::Text => env::TEXT_SERIES,
            EditMode::Math => env::MATH_SERIES,
            EditMode::Prog => env::PROG_SERIES,
        }
    }
}

/// Language variable for a mode string. Panics on an unknown mode.
pub fn language_variable(mode: &str) -> &'static str {
    match mode.parse::<EditMode>() {
        Ok(m) => m.language_var(),
        Err(e) => {
            tracing::error!(target: "state.mode", mode, "invalid_mode");
            panic!("{e}: the surface cannot resolve a language for it");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    Replace,
    Complete,
}
