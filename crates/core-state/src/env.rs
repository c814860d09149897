//! Environment variable names read or written by the surface.

pub const MODE: &str = "mode";
pub const TEXT_LANGUAGE: &str = "language";
pub const MATH_LANGUAGE: &str = "math-language";
pub const PROG_LANGUAGE: &str = "prog-language";
pub const THIS_SESSION: &str = "this-session";

pub const TEXT_FAMILY: &str = "font-family";
pub const TEXT_SERIES: &str = "font-series";
pub const MATH_FAMILY: &str = "math-font-family";
pub const MATH_SERIES: &str = "math-font-series";
pub const PROG_FAMILY: &str = "prog-font-family";
pub const PROG_SERIES: &str = "prog-font-series";

pub const PAGE_MEDIUM: &str = "page-medium";
pub const PAGE_WIDTH: &str = "page-width";
pub const PAGE_HEIGHT: &str = "page-height";
pub const SFACTOR: &str = "sfactor";
pub const BACKGROUND_COLOR: &str = "bg-color";
pub const FONT_BASE_SIZE: &str = "font-base-size";

/// Page medium value that derives page size from the window.
pub const MEDIUM_AUTOMATIC: &str = "automatic";
pub const MEDIUM_PAPER: &str = "paper";
pub const MEDIUM_PAPYRUS: &str = "papyrus";
