//! Drawing device seam and the painters for surface decorations.
//!
//! A `Device` draws in document coordinates once its shrink factor is set;
//! the window layer implements it. Painters here only decide *what* to draw:
//! caret stem and serifs, environment highlights, selection fills and the
//! surround outside the page.
//!
//! Colors:
//! * caret: purple in math mode, red otherwise, green when the caret snapshot
//!   could not be validated against layout.
//! * selection: purple for table selections, red otherwise.
//! * environment highlights: cyan.
//! * surround: light grey.

use core_geometry::{Coord, Rect, Rects};
use core_state::env::{MEDIUM_PAPER, MEDIUM_PAPYRUS};
use core_state::{EditMode, SelectionState, ShadowCursor};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const PURPLE: Color = Color::rgb(192, 0, 255);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const LIGHT_GREY: Color = Color::rgb(208, 208, 208);

    /// Resolve a document color name (`white`, `light grey`, `#rrggbb`, ...).
    /// Unknown names fall back to white.
    pub fn named(name: &str) -> Color {
        let name = name.trim();
        if let Some(hex) = name.strip_prefix('#')
            && hex.len() == 6
            && let Ok(v) = u32::from_str_radix(hex, 16)
        {
            return Color::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8);
        }
        match name {
            "black" => Color::BLACK,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "cyan" => Color::CYAN,
            "light grey" | "light gray" => Color::LIGHT_GREY,
            _ => Color::WHITE,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Drawing primitives provided by the window layer.
pub trait Device {
    fn set_shrink_factor(&mut self, factor: Coord);
    fn set_color(&mut self, color: Color);
    fn set_background(&mut self, color: Color);
    fn set_line_width(&mut self, width: Coord);
    fn line(&mut self, x1: Coord, y1: Coord, x2: Coord, y2: Coord);
    fn fill(&mut self, r: Rect);
    /// Fill with the background color.
    fn clear(&mut self, r: Rect);
    /// Copy a region of the backing store to the screen.
    fn present(&mut self, _r: Rect) {}
}

/// Font traits of the current mode, used to shape the caret.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaretStyle {
    pub mode: EditMode,
    pub family: String,
    pub series: String,
}

impl CaretStyle {
    fn bold(&self) -> bool {
        self.series == "bold"
    }

    /// `(left, right)` serif lengths.
    pub fn serifs(&self, pixel: Coord) -> (Coord, Coord) {
        if self.family == "ss" {
            return (0, 0);
        }
        let left = if self.bold() { 2 * pixel } else { pixel };
        (left, pixel)
    }

    pub fn color(&self, valid: bool) -> Color {
        match (valid, self.mode) {
            (false, _) => Color::GREEN,
            (true, EditMode::Math) => Color::PURPLE,
            (true, _) => Color::RED,
        }
    }
}

/// Draw the caret stem with its serifs. The stem is stretched by `2px` at
/// both ends, matching the damage outline computed by the pipeline.
pub fn draw_caret(dev: &mut dyn Device, cu: &ShadowCursor, style: &CaretStyle, pixel: Coord) {
    let (x1, y1, x2, y2) = cu.stretched(2 * pixel).stem();
    let (lserif, rserif) = style.serifs(pixel);
    dev.set_line_width(pixel);
    dev.set_color(style.color(cu.valid));
    dev.line(x1 - lserif, y1, x1 + rserif, y1);
    if y1 <= y2 - pixel {
        dev.line(x1, y1, x2, y2 - pixel);
        if style.bold() {
            dev.line(x1 - pixel, y1, x2 - pixel, y2 - pixel);
        }
        dev.line(x2 - lserif, y2 - pixel, x2 + rserif, y2 - pixel);
    }
}

pub fn fill_rects(dev: &mut dyn Device, rs: &Rects, color: Color) {
    for r in rs {
        dev.set_color(color);
        dev.fill(*r);
    }
}

pub fn draw_env_rects(dev: &mut dyn Device, rs: &Rects) {
    fill_rects(dev, rs, Color::CYAN);
}

pub fn draw_selection(dev: &mut dyn Device, sel: &SelectionState) {
    if !sel.made_selection {
        return;
    }
    let color = if sel.table_selection {
        Color::PURPLE
    } else {
        Color::RED
    };
    fill_rects(dev, &sel.rects, color);
}

/// Page medium, controlling the area painted around the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageMedium {
    #[default]
    Automatic,
    Paper,
    Papyrus,
}

impl PageMedium {
    pub fn parse(s: &str) -> PageMedium {
        match s {
            MEDIUM_PAPER => PageMedium::Paper,
            MEDIUM_PAPYRUS => PageMedium::Papyrus,
            _ => PageMedium::Automatic,
        }
    }
}

/// Clear the part of `region` right of the page (and just below its top
/// margin) in light grey. `extents` is the document bounding box.
pub fn draw_surround(
    dev: &mut dyn Device,
    medium: PageMedium,
    extents: &Rect,
    region: &Rect,
    pixel: Coord,
) {
    dev.set_background(Color::LIGHT_GREY);
    if matches!(medium, PageMedium::Paper | PageMedium::Papyrus) {
        let r = Rect::new(
            extents.x2.max(region.x1),
            region.y1,
            region.x2,
            (extents.y2 + 2 * pixel).min(region.y2),
        );
        if !r.is_empty() {
            dev.clear(r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Log {
        color: Option<Color>,
        lines: Vec<(Color, Coord, Coord, Coord, Coord)>,
        fills: Vec<(Color, Rect)>,
        clears: Vec<Rect>,
    }

    impl Device for Log {
        fn set_shrink_factor(&mut self, _factor: Coord) {}
        fn set_color(&mut self, color: Color) {
            self.color = Some(color);
        }
        fn set_background(&mut self, _color: Color) {}
        fn set_line_width(&mut self, _width: Coord) {}
        fn line(&mut self, x1: Coord, y1: Coord, x2: Coord, y2: Coord) {
            self.lines.push((self.color.unwrap(), x1, y1, x2, y2));
        }
        fn fill(&mut self, r: Rect) {
            self.fills.push((self.color.unwrap(), r));
        }
        fn clear(&mut self, r: Rect) {
            self.clears.push(r);
        }
    }

    fn style(mode: EditMode, family: &str, series: &str) -> CaretStyle {
        CaretStyle {
            mode,
            family: family.into(),
            series: series.into(),
        }
    }

    #[test]
    fn caret_color_follows_mode_and_validity() {
        let s = style(EditMode::Math, "roman", "medium");
        assert_eq!(s.color(true), Color::PURPLE);
        assert_eq!(s.color(false), Color::GREEN);
        assert_eq!(style(EditMode::Text, "roman", "medium").color(true), Color::RED);
    }

    #[test]
    fn serifs_depend_on_family_and_series() {
        assert_eq!(style(EditMode::Text, "roman", "bold").serifs(3), (6, 3));
        assert_eq!(style(EditMode::Text, "roman", "medium").serifs(3), (3, 3));
        assert_eq!(style(EditMode::Text, "ss", "bold").serifs(3), (0, 0));
    }

    #[test]
    fn caret_draws_stem_and_both_serifs() {
        let mut dev = Log::default();
        let cu = ShadowCursor::new(100, 0, 0, 20, 0.0, true);
        draw_caret(&mut dev, &cu, &style(EditMode::Text, "roman", "medium"), 1);
        // top serif, stem, bottom serif
        assert_eq!(
            dev.lines,
            vec![
                (Color::RED, 99, -2, 101, -2),
                (Color::RED, 100, -2, 100, 21),
                (Color::RED, 99, 21, 101, 21),
            ]
        );
    }

    #[test]
    fn bold_caret_doubles_stem() {
        let mut dev = Log::default();
        let cu = ShadowCursor::new(100, 0, 0, 20, 0.0, true);
        draw_caret(&mut dev, &cu, &style(EditMode::Text, "roman", "bold"), 1);
        assert_eq!(dev.lines.len(), 4);
    }

    #[test]
    fn table_selection_is_purple() {
        let mut dev = Log::default();
        let sel = SelectionState {
            made_selection: true,
            table_selection: true,
            rects: Rects::single(Rect::new(0, 0, 5, 5)),
        };
        draw_selection(&mut dev, &sel);
        assert_eq!(dev.fills, vec![(Color::PURPLE, Rect::new(0, 0, 5, 5))]);
    }

    #[test]
    fn inactive_selection_draws_nothing() {
        let mut dev = Log::default();
        let sel = SelectionState {
            made_selection: false,
            table_selection: false,
            rects: Rects::single(Rect::new(0, 0, 5, 5)),
        };
        draw_selection(&mut dev, &sel);
        assert!(dev.fills.is_empty());
    }

    #[test]
    fn surround_only_for_paged_media() {
        let mut dev = Log::default();
        let extents = Rect::new(0, 0, 100, 200);
        let region = Rect::new(50, 0, 150, 300);
        draw_surround(&mut dev, PageMedium::Automatic, &extents, &region, 1);
        assert!(dev.clears.is_empty());
        draw_surround(&mut dev, PageMedium::Paper, &extents, &region, 1);
        assert_eq!(dev.clears, vec![Rect::new(100, 0, 150, 202)]);
    }

    #[test]
    fn color_names_resolve() {
        assert_eq!(Color::named("#102030"), Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(Color::named("light grey"), Color::LIGHT_GREY);
        assert_eq!(Color::named("mauve"), Color::WHITE);
        assert_eq!(Color::PURPLE.to_string(), "#c000ff");
    }
}
