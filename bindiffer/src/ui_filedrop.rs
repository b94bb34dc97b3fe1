use crate::app::{BinDiffApp, colors};
use bindifflib::Side;
use eframe::egui;

impl BinDiffApp {
    /// Pane under the given screen position. Left of the split counts as the left pane.
    fn side_at(&self, pos: Option<egui::Pos2>) -> Side {
        match (pos, self.pane_rects[Side::Right.index()]) {
            (Some(pos), Some(right)) if pos.x >= right.left() => Side::Right,
            _ => Side::Left,
        }
    }

    /// Handle drag and drop events:
    /// - If a file is dragged over a pane, highlight that pane.
    /// - If a file is dropped, load it into the pane under the pointer.
    /// - If two files are dropped at once, load them into the left and right pane.
    /// - If the popup is shown, do not handle drag and drop events.
    pub(crate) fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        // Return if the popup is shown
        if self.popup.active {
            return;
        }

        let pointer = self.events.borrow().pointer_hover;

        // Highlight the target pane while a file is dragged over the window
        let is_hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if is_hovering_files && let Some(rect) = self.pane_rects[self.side_at(pointer).index()] {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("drop_hint"),
            ));
            painter.rect_filled(rect, 4.0, colors::DROP_HINT);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Drop file to open",
                egui::FontId::proportional(20.0),
                colors::GRAY_210,
            );
        }

        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });

        match dropped.as_slice() {
            [] => {}
            [path] => self.load_file(self.side_at(pointer), path),
            [left, right, ..] => {
                self.load_file(Side::Left, left);
                self.load_file(Side::Right, right);
            }
        }
    }
}
