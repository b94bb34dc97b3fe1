use bindifflib::ViewportState;
use eframe::egui;

/// Width reserved at the right edge of a pane for the scrollbar
const SCROLLBAR_WIDTH: f32 = 16.0;
/// Height of the horizontal scrollbar, drawn over the bottom margin
const HSCROLLBAR_HEIGHT: f32 = 8.0;
/// Pixels one horizontal wheel step moves the line
const HSCROLL_STEP: f32 = 24.0;

/// Scroll a pane asked for this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    /// Move by a number of lines, negative values scroll up
    By(i64),
    /// Make the given line the first visible one
    To(u64),
}

pub struct StepScrollOutput {
    /// Area left for the content (the scrollbar is excluded)
    pub content_rect: egui::Rect,
    pub request: Option<ScrollRequest>,
    /// New horizontal offset in pixels
    pub horizontal: Option<f32>,
}

/// Custom scroll area that scrolls in discrete steps.
/// The scroll position itself lives in the view, the area only reports requests.
pub struct StepScrollArea {
    id: egui::Id,
    top_line: u64,
    line_count: u64,
    visible_lines: u64,
    horizontal_offset: f32,
    max_horizontal_offset: f32,
}

impl StepScrollArea {
    pub fn new(id: egui::Id, view: &ViewportState) -> Self {
        Self {
            id,
            top_line: view.scroll_line(),
            line_count: view.line_count(),
            visible_lines: view.visible_line_count(),
            horizontal_offset: view.horizontal_offset(),
            max_horizontal_offset: view.max_horizontal_offset(),
        }
    }

    const fn max_top_line(&self) -> u64 {
        self.line_count.saturating_sub(self.visible_lines)
    }

    pub fn show(self, ui: &mut egui::Ui) -> StepScrollOutput {
        // Allocate the full available space
        let (rect, response) = ui.allocate_at_least(ui.available_size(), egui::Sense::hover());

        // Make discrete scroll logic (one line is a scroll step).
        // Add threshold to ignore small drifts.
        let mut request = None;
        let mut horizontal = None;
        if response.hovered() {
            let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
            if scroll_delta.y.abs() > 0.4 {
                let line_delta = if scroll_delta.y > 0.0 { -1 } else { 1 };
                request = Some(ScrollRequest::By(line_delta));
            }
            if scroll_delta.x.abs() > 0.4 && self.max_horizontal_offset > 0.0 {
                let step = if scroll_delta.x > 0.0 { -HSCROLL_STEP } else { HSCROLL_STEP };
                horizontal = Some(self.horizontal_offset + step);
            }
        }

        let scrollbar_area = rect.with_min_x(rect.right() - SCROLLBAR_WIDTH);
        if let Some(line) = self.draw_custom_scrollbar(ui, scrollbar_area, request) {
            request = Some(ScrollRequest::To(line));
        }

        let content_rect = rect.with_max_x(rect.right() - SCROLLBAR_WIDTH);
        let hbar_area = content_rect.with_min_y(content_rect.bottom() - HSCROLLBAR_HEIGHT);
        if let Some(offset) = self.draw_horizontal_scrollbar(ui, hbar_area, horizontal) {
            horizontal = Some(offset);
        }

        StepScrollOutput {
            content_rect,
            request,
            horizontal,
        }
    }

    /// Draw a thin horizontal scrollbar while the line is wider than the pane.
    /// Returns the offset the user clicked or dragged to.
    fn draw_horizontal_scrollbar(
        &self,
        ui: &egui::Ui,
        area: egui::Rect,
        pending: Option<f32>,
    ) -> Option<f32> {
        let max_offset = self.max_horizontal_offset;
        if max_offset <= 0.0 {
            return None;
        }

        let track = area.shrink2(egui::vec2(4.0, 2.0));
        let line_width = track.width() + max_offset;
        let handle_width = (track.width() / line_width * track.width()).max(20.0);
        let travel_range = track.width() - handle_width;

        let response = ui.interact(track, self.id.with("hbar"), egui::Sense::click_and_drag());
        let mut target = None;
        if (response.clicked() || response.dragged())
            && travel_range > 0.0
            && let Some(pointer_pos) = ui.input(|i| i.pointer.hover_pos())
        {
            let click_x = pointer_pos.x - track.left() - handle_width / 2.0;
            target = Some((click_x / travel_range).clamp(0.0, 1.0) * max_offset);
        }

        let offset = target.or(pending).unwrap_or(self.horizontal_offset);
        let progress = (offset / max_offset).clamp(0.0, 1.0);
        let handle_rect = egui::Rect::from_min_size(
            egui::pos2(track.left() + progress * travel_range.max(0.0), track.top()),
            egui::vec2(handle_width, track.height()),
        );

        let handle_color = if response.dragged() {
            ui.visuals().widgets.active.bg_fill
        } else if response.hovered() {
            ui.visuals().widgets.hovered.bg_fill
        } else {
            ui.visuals().widgets.inactive.bg_fill
        };
        ui.painter().rect_filled(handle_rect, 2.0, handle_color);

        target
    }

    /// Line the scrollbar shows this frame, taking a pending wheel step into account
    const fn displayed_top_line(&self, request: Option<ScrollRequest>) -> u64 {
        let line = match request {
            Some(ScrollRequest::By(delta)) => self.top_line.saturating_add_signed(delta),
            Some(ScrollRequest::To(line)) => line,
            None => self.top_line,
        };
        if line > self.max_top_line() {
            self.max_top_line()
        } else {
            line
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    /// Draw a custom scrollbar. Returns the line the user clicked or dragged to.
    fn draw_custom_scrollbar(
        &self,
        ui: &egui::Ui,
        area: egui::Rect,
        pending: Option<ScrollRequest>,
    ) -> Option<u64> {
        if self.line_count <= self.visible_lines {
            return None;
        }

        // Setup layout & margins
        let margin = 4.0;
        let bottom_margin = 12.0; // extra space from the bottom
        let scroll_area_rect = egui::Rect::from_min_max(
            egui::pos2(area.right() - 14.0, area.top() + margin),
            egui::pos2(area.right() - 2.0, area.bottom() - bottom_margin),
        );

        // Animation logic (for shrinking / expanding)
        let is_hovered = ui.rect_contains_pointer(scroll_area_rect);
        let expansion = ui.ctx().animate_bool(self.id.with("anim"), is_hovered);
        let bar_width = egui::lerp(4.0..=10.0, expansion);
        let scrollbar_rect = scroll_area_rect.with_min_x(scroll_area_rect.right() - bar_width);

        // Calculate handle size based on the total number of lines and visible lines.
        // Set a limit for how small the handle gets.
        let max_top_line = self.max_top_line();
        let mut handle_height =
            (self.visible_lines as f32 / self.line_count as f32) * scrollbar_rect.height();
        handle_height = handle_height.max(20.0);

        // Travel range is the track height minus the handle height
        let travel_range = scrollbar_rect.height() - handle_height;

        // Track scrollbar interactions
        let response = ui.interact(
            scrollbar_rect,
            self.id.with("bar"),
            egui::Sense::click_and_drag(),
        );
        let mut target = None;
        if (response.clicked() || response.dragged())
            && travel_range > 0.0
            && let Some(pointer_pos) = ui.input(|i| i.pointer.hover_pos())
        {
            // Calculate where the mouse is relative to the track.
            // Center the handle on the mouse click for a better feel.
            let click_y = pointer_pos.y - scrollbar_rect.top() - handle_height / 2.0;
            let t = (click_y / travel_range).clamp(0.0, 1.0);

            target = Some((f64::from(t) * max_top_line as f64).round() as u64);
        }

        let top_line = self.displayed_top_line(target.map(ScrollRequest::To).or(pending));
        let progress = top_line as f32 / max_top_line as f32;
        let handle_y_offset = progress * travel_range.max(0.0);

        // Paint the track
        let track_color = ui.visuals().extreme_bg_color;
        ui.painter()
            .rect_filled(scrollbar_rect, 2.0, track_color.gamma_multiply(expansion));

        // Paint the handle
        let handle_rect = egui::Rect::from_min_size(
            egui::pos2(
                scrollbar_rect.left(),
                scrollbar_rect.top() + handle_y_offset,
            ),
            egui::vec2(bar_width, handle_height),
        );
        let handle_color = if response.dragged() {
            ui.visuals().widgets.active.bg_fill
        } else if is_hovered {
            ui.visuals().widgets.hovered.bg_fill
        } else {
            ui.visuals().widgets.inactive.bg_fill
        };

        ui.painter().rect_filled(handle_rect, 2.0, handle_color);

        target
    }
}
