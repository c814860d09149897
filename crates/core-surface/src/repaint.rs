//! Repaint and clear handlers.
//!
//! Both run on already-applied state: the window asks for a device region
//! and the surface draws it in document coordinates through the window's
//! `Device`. Repainting with changes still pending would draw a torn state
//! and is fatal.
//!
//! Draw order for a repaint:
//! background, surround, focus decorations, document content, focus
//! decorations again, selection, page separators. Focus decorations are the
//! environment highlights (not in full screen) and the caret, shown only
//! while focused or in full screen. The caret outlines retained since the
//! last apply ("copy-always" rectangles) are presented last and then dropped.

use crate::collab::{Document, Window};
use crate::surface::EditSurface;
use core_geometry::{Coord, Rect, Rects};
use core_render::paint::{
    CaretStyle, Color, Device, PageMedium, draw_caret, draw_env_rects, draw_selection,
    draw_surround,
};
use core_session::SessionTransport;
use core_state::{EditMode, ShadowCursor};
use core_state::env::{BACKGROUND_COLOR, FONT_BASE_SIZE, MODE, PAGE_MEDIUM};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepaintReport {
    /// Region actually drawn, document coordinates (overscan included).
    pub region: Rect,
    /// An input event arrived while drawing.
    pub interrupted: bool,
    /// Caret outlines presented at the end of the repaint.
    pub flushed: Rects,
}

struct FocusDecorations<'a> {
    env_rects: &'a Rects,
    cursor: ShadowCursor,
    style: CaretStyle,
    show_caret: bool,
    full_screen: bool,
    pixel: Coord,
}

impl FocusDecorations<'_> {
    fn draw(&self, dev: &mut dyn Device) {
        if !self.show_caret {
            return;
        }
        if !self.full_screen {
            draw_env_rects(dev, self.env_rects);
        }
        draw_caret(dev, &self.cursor, &self.style, self.pixel);
    }
}

impl<D: Document, W: Window, T: SessionTransport> EditSurface<D, W, T> {
    /// Caret style for the mode at the caret. An unknown mode draws with the
    /// default text style rather than failing the repaint.
    pub fn caret_style(&self) -> CaretStyle {
        let Ok(mode) = self.doc.env_string(MODE).parse::<EditMode>() else {
            return CaretStyle::default();
        };
        CaretStyle {
            mode,
            family: self.doc.env_string(mode.family_var()),
            series: self.doc.env_string(mode.series_var()),
        }
    }

    fn background(&self) -> Color {
        Color::named(&self.doc.init_string(BACKGROUND_COLOR))
    }

    /// Device-unit margin added around every repaint region so glyphs that
    /// overhang their boxes are redrawn whole.
    pub fn repaint_overscan(&self) -> Coord {
        let f = self.scaler.factor();
        self.tuning.extra_font_factor * self.doc.init_int(FONT_BASE_SIZE) * self.scaler.base_pixel()
            / (2 * f)
    }

    pub fn handle_repaint(&mut self, region: Rect) -> RepaintReport {
        if !self.changes.is_empty() {
            error!(target: "surface.repaint", pending = ?self.changes.pending(), "repaint_with_pending_changes");
            panic!("repaint requested while changes are pending; apply them first");
        }
        self.repainting = true;
        let f = self.scaler.factor();
        let pixel = self.pixel();
        let extra = self.repaint_overscan();
        let r = Rect::new(
            (region.x1 - extra) * f,
            (region.y1 - extra) * f,
            (region.x2 + extra) * f,
            (region.y2 + extra) * f,
        );
        let background = self.background();
        let medium = PageMedium::parse(&self.doc.init_string(PAGE_MEDIUM));
        let extents = self.doc.extents();
        let breaks = self.doc.page_breaks();
        let decorations = FocusDecorations {
            env_rects: &self.env_rects,
            cursor: self.doc.cursor(),
            style: self.caret_style(),
            show_caret: self.got_focus || self.full_screen,
            full_screen: self.full_screen,
            pixel,
        };

        let dev = self.win.device();
        dev.set_shrink_factor(f);
        dev.set_background(background);
        dev.clear(r);
        draw_surround(dev, medium, &extents, &r, pixel);
        decorations.draw(dev);
        self.doc.redraw(dev, &r);
        decorations.draw(dev);
        draw_selection(dev, &self.selection);
        dev.set_color(Color::LIGHT_GREY);
        dev.set_line_width(pixel);
        for y in breaks.into_iter().filter(|y| *y >= r.y1 && *y < r.y2) {
            dev.line(r.x1, y, r.x2, y);
        }
        let flushed = std::mem::take(&mut self.copy_always);
        for c in &flushed {
            dev.present(*c);
        }
        dev.set_shrink_factor(1);

        let interrupted = self.win.event_pending();
        self.repainting = false;
        let now = self.now();
        self.times.note_repaint(now);
        self.metrics.record_repaint(interrupted);
        debug!(
            target: "surface.repaint",
            x1 = r.x1, y1 = r.y1, x2 = r.x2, y2 = r.y2,
            interrupted,
            flushed = flushed.len(),
            "repaint"
        );
        RepaintReport {
            region: r,
            interrupted,
            flushed,
        }
    }

    /// Clear a device region: the part inside the document goes to the
    /// background color, the rest gets the surround.
    pub fn handle_clear(&mut self, region: Rect) {
        let f = self.scaler.factor();
        let pixel = self.pixel();
        let r = self.scaler.rect_to_document(&region);
        let background = self.background();
        let medium = PageMedium::parse(&self.doc.init_string(PAGE_MEDIUM));
        let extents = self.doc.extents();

        let dev = self.win.device();
        dev.set_shrink_factor(f);
        if let Some(inside) = r.intersection(&extents) {
            dev.set_background(background);
            dev.clear(inside);
        }
        draw_surround(dev, medium, &extents, &r, pixel);
        dev.set_shrink_factor(1);
        debug!(target: "surface.repaint", x1 = r.x1, y1 = r.y1, x2 = r.x2, y2 = r.y2, "clear");
    }
}
