use crate::app::{BinDiffApp, colors};
use crate::ui_scrollarea::{ScrollRequest, StepScrollArea};
use bindifflib::{ByteSource, DiffMap, GlyphMetrics, Side, Verdict};
use eframe::egui;

/// Characters measured to derive the glyph width of the monospace font
const GLYPH_SAMPLE_LEN: usize = 16;

impl BinDiffApp {
    /// Displays both panes next to each other in the central panel
    pub(crate) fn show_panes(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let font_id = egui::FontId::monospace(self.font_size);
            self.update_glyph_metrics(ui, &font_id);

            self.hovered_side = None;
            ui.columns(2, |columns| {
                for (side, ui) in Side::BOTH.into_iter().zip(columns.iter_mut()) {
                    self.show_pane(ui, side, &font_id);
                }
            });
        });
    }

    /// Measure the monospace font and hand a changed glyph size to the session
    #[allow(clippy::cast_precision_loss)]
    fn update_glyph_metrics(&mut self, ui: &egui::Ui, font_id: &egui::FontId) {
        let galley = ui.painter().layout_no_wrap(
            "0".repeat(GLYPH_SAMPLE_LEN),
            font_id.clone(),
            ui.visuals().text_color(),
        );
        let size = galley.size();
        let glyph = GlyphMetrics::new(size.x / GLYPH_SAMPLE_LEN as f32, size.y);

        if glyph != self.session.config().glyph {
            log::debug!("Glyph size changed to {}x{}", glyph.width, glyph.height);
            let _ = self.session.set_glyph_metrics(glyph);
        }
    }

    fn show_pane(&mut self, ui: &mut egui::Ui, side: Side, font_id: &egui::FontId) {
        let pane_rect = ui.max_rect();
        self.pane_rects[side.index()] = Some(pane_rect);
        if ui.rect_contains_pointer(pane_rect) {
            self.hovered_side = Some(side);
        }

        self.show_pane_header(ui, side);
        ui.separator();

        let Some(file) = self.session.source(side) else {
            ui.centered_and_justified(|ui| {
                ui.label(format!(
                    "Drop a file here or use File > Open {}...",
                    side.label()
                ));
            });
            return;
        };

        if file.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.weak("Empty file");
            });
            return;
        }

        let scroll_id = egui::Id::new(("pane_scroll", side.index()));
        let output = StepScrollArea::new(scroll_id, self.session.view(side)).show(ui);

        // Re-fit the lines only when the pane size changes
        let size = output.content_rect.size();
        if self.pane_sizes[side.index()] != size {
            self.pane_sizes[side.index()] = size;
            let _ = self.session.resize(side, size.x, size.y);
        }

        if let Some(request) = output.request {
            let _ = match request {
                ScrollRequest::By(delta) => self.session.scroll_by(side, delta),
                ScrollRequest::To(line) => self.session.scroll_to(side, line),
            };
            ui.ctx().request_repaint();
        }

        if let Some(offset) = output.horizontal
            && self.session.scroll_horizontal_to(side, offset)
        {
            ui.ctx().request_repaint();
        }

        self.paint_lines(ui, side, output.content_rect, font_id);
    }

    fn show_pane_header(&self, ui: &mut egui::Ui, side: Side) {
        ui.horizontal(|ui| match self.session.source(side) {
            Some(file) => {
                ui.strong(file.name());
                ui.weak(format!("{} bytes", file.len()));
            }
            None => {
                ui.weak(format!("No {} file", side.label()));
            }
        });
    }

    /// Paint the visible lines of one pane: address, hex bytes, and ASCII characters.
    /// Bytes that differ from the other file are drawn in red.
    #[allow(clippy::cast_precision_loss)]
    fn paint_lines(&self, ui: &egui::Ui, side: Side, rect: egui::Rect, font_id: &egui::FontId) {
        let Some(file) = self.session.source(side) else {
            return;
        };
        let view = self.session.view(side);
        let metrics = view.metrics();
        let painter = ui.painter_at(rect);
        let left = rect.left() - view.horizontal_offset();

        // Holding the borrow while painting defers a concurrent recompute
        let diff_map = self.session.diff_map();
        let guard = diff_map.try_borrow().ok();
        let map: Option<&DiffMap> = guard.as_deref().and_then(Option::as_ref);

        for (row, line) in view.visible_lines().enumerate() {
            let y = rect.top() + row as f32 * metrics.line_height;
            let line_bytes = view.line_bytes(line);

            // Address
            painter.text(
                egui::pos2(left + metrics.margin, y),
                egui::Align2::LEFT_TOP,
                view.format_address(line_bytes.start),
                font_id.clone(),
                colors::GRAY_160,
            );

            let count = usize::try_from(line_bytes.end - line_bytes.start).unwrap_or_default();
            let Ok(bytes) = file.read(line_bytes.start, count) else {
                continue;
            };

            for (i, &byte) in bytes.iter().enumerate() {
                let offset = line_bytes.start + i as u64;
                let is_difference = map
                    .and_then(|m| m.get(offset))
                    .is_some_and(Verdict::is_difference);

                // Change color of every other byte for better readability
                let color = if is_difference {
                    colors::RED
                } else if offset % 2 == 0 {
                    colors::GRAY_210
                } else {
                    colors::GRAY_160
                };

                let hex_pos = egui::pos2(left + metrics.byte_cell_x(i), y);
                let ascii_pos = egui::pos2(left + metrics.ascii_cell_x(i), y);

                if is_difference {
                    let cell = egui::vec2(2.0 * metrics.glyph_width, metrics.line_height);
                    let char_cell = egui::vec2(metrics.glyph_width, metrics.line_height);
                    painter.rect_filled(
                        egui::Rect::from_min_size(hex_pos, cell),
                        0.0,
                        colors::RED_BG,
                    );
                    painter.rect_filled(
                        egui::Rect::from_min_size(ascii_pos, char_cell),
                        0.0,
                        colors::RED_BG,
                    );
                }

                painter.text(
                    hex_pos,
                    egui::Align2::LEFT_TOP,
                    format!("{byte:02X}"),
                    font_id.clone(),
                    color,
                );

                let ch = if byte.is_ascii_graphic() {
                    byte as char
                } else {
                    '.'
                };
                painter.text(
                    ascii_pos,
                    egui::Align2::LEFT_TOP,
                    ch.to_string(),
                    font_id.clone(),
                    color,
                );
            }
        }
    }
}
