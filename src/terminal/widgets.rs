// SPDX-License-Identifier: GPL-3.0-only

//! Terminal widgets
//!
//! Images are drawn with the upper half-block character: each cell shows two
//! vertical pixels, the upper one as foreground and the lower one as
//! background.

use crate::backends::camera::CameraFrame;
use crate::presenter::{Action, ActionState};
use crate::summary::Summary;
use image::RgbaImage;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Anything that can be sampled as RGB pixels
pub trait PixelSource {
    fn dimensions(&self) -> (u32, u32);

    /// Color at (x, y); coordinates are within `dimensions()`
    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8);
}

impl PixelSource for CameraFrame {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        self.rgb_at(x, y)
    }
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        (r, g, b)
    }
}

/// Renders an image source, aspect-preserving and centered
pub struct FrameWidget<'a, S: PixelSource> {
    source: Option<&'a S>,
    placeholder: &'a str,
}

impl<'a, S: PixelSource> FrameWidget<'a, S> {
    pub fn new(source: Option<&'a S>, placeholder: &'a str) -> Self {
        Self {
            source,
            placeholder,
        }
    }
}

impl<S: PixelSource> Widget for FrameWidget<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let source = match self.source {
            Some(source) if source.dimensions().0 > 0 && source.dimensions().1 > 0 => source,
            _ => {
                let msg = self.placeholder;
                let x = area.x + area.width.saturating_sub(msg.chars().count() as u16) / 2;
                let y = area.y + area.height / 2;
                buf.set_stringn(
                    x,
                    y,
                    msg,
                    area.width as usize,
                    Style::default().fg(Color::DarkGray),
                );
                return;
            }
        };

        let (width, height) = source.dimensions();
        let (display_width, display_height) = fit(width, height, area.width, area.height);
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + area.width.saturating_sub(display_width) / 2;
        let y_offset = area.y + area.height.saturating_sub(display_height) / 2;

        let x_scale = width as f64 / display_width as f64;
        let y_scale = height as f64 / (display_height as f64 * 2.0);

        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = ((tx as f64 * x_scale) as u32).min(width - 1);
                let src_y_top = ((ty as f64 * 2.0 * y_scale) as u32).min(height - 1);
                let src_y_bottom = (((ty as f64 * 2.0 + 1.0) * y_scale) as u32).min(height - 1);

                let (tr, tg, tb) = source.rgb(src_x, src_y_top);
                let (br, bg, bb) = source.rgb(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Largest cell size showing `width`x`height` in `cols`x`rows` half-block cells
pub(crate) fn fit(width: u32, height: u32, cols: u16, rows: u16) -> (u16, u16) {
    let aspect = width as f64 / height as f64;
    let term_width = cols as f64;
    let term_height = rows as f64 * 2.0;

    if term_width / term_height > aspect {
        let w = term_height * aspect;
        ((w as u16).min(cols), rows)
    } else {
        let h = term_width / aspect;
        (cols, ((h / 2.0) as u16).min(rows))
    }
}

/// Summary block: the text lines with the captured photo's preview below
pub struct SummaryPanel<'a> {
    pub summary: &'a Summary,
    pub photo: Option<&'a RgbaImage>,
}

impl Widget for SummaryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(" Summary ");
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self.summary.lines().into_iter().map(Line::from).collect();
        let text_height = (lines.len() as u16).min(inner.height);
        let [text_area, preview_area] =
            Layout::vertical([Constraint::Length(text_height), Constraint::Min(0)]).areas(inner);

        Paragraph::new(lines).render(text_area, buf);
        FrameWidget::new(self.photo, "No photo yet").render(preview_area, buf);
    }
}

/// The action buttons with their key hints
pub struct ActionBar<'a> {
    pub actions: &'a [(Action, char, ActionState)],
}

impl Widget for ActionBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();
        for (action, key, state) in self.actions {
            let style = match state {
                ActionState::Available => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ActionState::Done => Style::default().fg(Color::Green),
                ActionState::Unavailable => Style::default().fg(Color::DarkGray),
            };
            spans.push(Span::styled(format!("[{}] ", key), style));
            spans.push(Span::styled(action.label_for(*state), style));
            spans.push(Span::raw("   "));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Single-line status bar
pub struct StatusBar<'a> {
    pub message: &'a str,
    pub color: Color,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.color).bg(Color::Black);
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_style(style);
            }
        }
        buf.set_stringn(area.x, area.y, self.message, area.width as usize, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_source_in_square_area() {
        // 16:9 into 40x40 cells (40x80 half-block pixels) is width bound
        assert_eq!(fit(1280, 720, 40, 40), (40, 11));
    }

    #[test]
    fn test_fit_tall_area_is_height_bound() {
        // 4:3 into 100x10 cells (100x20 pixels) is height bound
        assert_eq!(fit(640, 480, 100, 10), (26, 10));
    }

    #[test]
    fn test_frame_widget_draws_half_blocks() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        FrameWidget::new(Some(&image), "none").render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_frame_widget_placeholder() {
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        FrameWidget::<RgbaImage>::new(None, "No photo").render(area, &mut buf);
        let row: String = (0..20).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("No photo"));
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_summary_panel_shows_photo_under_text() {
        use crate::summary::{LocationSummary, PhotoSummary};

        let summary = Summary {
            photo: PhotoSummary::Captured { width: 4, height: 4 },
            location: LocationSummary::NotYet,
        };
        let photo = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
        let area = Rect::new(0, 0, 30, 12);
        let mut buf = Buffer::empty(area);
        SummaryPanel {
            summary: &summary,
            photo: Some(&photo),
        }
        .render(area, &mut buf);

        assert!(row_text(&buf, 0).contains("Summary"));
        assert!(row_text(&buf, 1).contains("Photo Captured: Yes"));
        assert!(row_text(&buf, 2).contains("Location Captured: Not yet"));

        let preview_cells = (3..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .filter(|&pos| buf[pos].symbol() == "▀" && buf[pos].fg == Color::Rgb(0, 0, 255))
            .count();
        assert!(preview_cells > 0, "Photo preview drawn below the summary lines");
    }

    #[test]
    fn test_summary_panel_placeholder_without_photo() {
        use crate::session::Session;

        let summary = Summary::of(&Session::new());
        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);
        SummaryPanel {
            summary: &summary,
            photo: None,
        }
        .render(area, &mut buf);

        assert!(row_text(&buf, 1).contains("Photo Captured: Not yet"));
        let placeholder = (3..area.height).any(|y| row_text(&buf, y).contains("No photo yet"));
        assert!(placeholder);
    }
}
