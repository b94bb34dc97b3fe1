use crate::events::EventState;
use crate::ui_popup::Popup;
use bindifflib::{DiffSession, MappedFile, SessionConfig, Side};
use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;

pub mod colors {
    use eframe::egui::Color32;

    pub const GRAY_160: Color32 = Color32::from_gray(160);
    pub const GRAY_210: Color32 = Color32::from_gray(210);
    pub const RED: Color32 = Color32::from_rgb(235, 80, 80);
    pub const RED_BG: Color32 = Color32::from_rgba_premultiplied(90, 20, 20, 40);
    pub const SHADOW: Color32 = Color32::from_black_alpha(150);
    pub const DROP_HINT: Color32 = Color32::from_rgba_premultiplied(33, 81, 109, 60);
}

pub struct BinDiffApp {
    /// Both sources, their views, and the diff map
    pub session: DiffSession<MappedFile>,
    /// Point size of the monospace font used by the panes
    pub font_size: f32,
    /// Content size each pane was last laid out with
    pub pane_sizes: [egui::Vec2; 2],
    /// Screen area of each pane, used to route dropped files
    pub pane_rects: [Option<egui::Rect>; 2],
    /// Pane under the pointer, receives keyboard scrolling
    pub hovered_side: Option<Side>,
    /// Short message shown in the menu bar, replaced by the next one
    pub notice: Option<String>,
    /// Pop up handler
    pub popup: Popup,

    // -- Shared UI states
    /// Per-frame state of user inputs
    pub events: Rc<RefCell<EventState>>,
    /// Errors while opening files or diffing
    pub error: Rc<RefCell<Option<String>>>,
}

impl BinDiffApp {
    pub fn new(config: SessionConfig, font_size: f32) -> Self {
        Self {
            session: DiffSession::new(config),
            font_size,
            pane_sizes: [egui::Vec2::ZERO; 2],
            pane_rects: [None; 2],
            hovered_side: None,
            notice: None,
            popup: Popup::default(),
            events: Rc::new(RefCell::new(EventState::default())),
            error: Rc::new(RefCell::new(None)),
        }
    }

    /// Pane that keyboard commands apply to
    pub(crate) fn focused_side(&self) -> Side {
        self.hovered_side.unwrap_or(Side::Left)
    }

    /// Apply the keyboard part of this frame's events
    pub(crate) fn handle_key_events(&mut self) {
        let events = *self.events.borrow();

        if events.page_delta != 0 {
            let _ = self
                .session
                .scroll_page(self.focused_side(), events.page_delta);
        }

        if let Some(forward) = events.jump_difference {
            self.jump_to_difference(forward);
        }
    }

    /// Scroll both panes to the next (or previous) difference, stepping on from the one
    /// the last jump landed on while it is still in view
    pub(crate) fn jump_to_difference(&mut self, forward: bool) {
        if !self.session.is_diffing() {
            self.notice = Some("Open two files to compare them".to_string());
            return;
        }

        let res = self
            .session
            .jump_to_difference(self.focused_side(), forward);

        match res {
            Ok(Some(offset)) => {
                self.notice = Some(format!("Difference at 0x{offset:X}"));
            }
            Ok(None) => {
                let direction = if forward { "below" } else { "above" };
                self.notice = Some(format!("No difference {direction}"));
            }
            Err(err) => {
                self.error.borrow_mut().replace(err.to_string());
            }
        }
    }
}
