use crate::app::{BinDiffApp, colors};
use eframe::egui;

//  ========================== Popup Type logic ============================= //

#[derive(Clone, PartialEq, Eq)]
pub enum PopupType {
    Error,
    About,
}

impl PopupType {
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::About => "About",
        }
    }
}

//  ========================== Popup logic =================================== //

#[derive(Default)]
pub struct Popup {
    /// Is there a pop-up
    pub(crate) active: bool,
    /// Type of the pop-up. Used to determine the title and content of the window.
    pub(crate) ptype: Option<PopupType>,
}

impl Popup {
    /// Clear (aka remove) the pop-up
    pub const fn clear(&mut self) {
        self.active = false;
        self.ptype = None;
    }
}

//  ========================== BinDiff logic ================================ //

impl BinDiffApp {
    fn display_error(ui: &mut egui::Ui, msg: &str) -> bool {
        ui.label(msg);

        // Add space before close button
        ui.add_space(10.0);

        // Close on OK
        ui.button(" OK ").clicked()
    }

    fn display_about(ui: &mut egui::Ui) -> bool {
        ui.vertical(|ui| {
            ui.add_space(5.0);

            ui.heading("Bindiffer");
            ui.label("Side-by-side binary file comparator");

            ui.add_space(3.0);
            ui.separator();
            ui.add_space(3.0);

            ui.label(
                "The app is built with egui - immediate-mode GUI library. \
            Files are memory mapped and compared by the bindiff library, built as part of the \
            same project.\n\nOnly the bytes on screen are compared, so scrolling through very \
            large files stays fast. Bytes that differ are shown in red; bytes present in only \
            one of the files count as different.",
            );

            ui.label("\nKeys: PageUp / PageDown scroll a page, F3 / Shift+F3 jump to the \
            next / previous difference.");

            ui.add_space(3.0);
            ui.separator();
            ui.add_space(3.0);

            ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
            ui.add_space(5.0);
        });

        // Keep the window open
        false
    }

    /// Show the pop-up
    pub(crate) fn show_popup(&mut self, ctx: &egui::Context) {
        let content_rect = ctx.content_rect();

        // Block interaction with the app
        egui::Area::new(egui::Id::from("modal_blocker"))
            .order(egui::Order::Background)
            .fixed_pos(content_rect.left_top())
            .show(ctx, |ui| {
                ui.allocate_rect(content_rect, egui::Sense::click());
            });

        // Darken the background
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("modal_bg"),
        ));
        painter.rect_filled(content_rect, 0.0, colors::SHADOW);

        let mut is_open = self.popup.active;
        let was_open = self.popup.active;

        let Some(popup_type) = self.popup.ptype.clone() else {
            self.popup.clear();
            return;
        };

        // Display the pop-up
        let window = egui::Window::new(popup_type.title())
            .open(&mut is_open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0]);

        // Track OK button or Enter press
        let mut close_confirm = false;

        window.show(ctx, |ui| match popup_type {
            PopupType::Error => {
                let error = self.error.borrow().clone().unwrap_or_default();
                close_confirm = Self::display_error(ui, &error);
            }
            PopupType::About => close_confirm = Self::display_about(ui),
        });

        let events = *self.events.borrow();
        close_confirm |= events.enter_released;
        self.popup.active = !close_confirm && is_open && !events.escape_pressed;

        // If the window got closed this frame
        if was_open && !self.popup.active {
            *self.error.borrow_mut() = None;
            self.popup.clear();
        }
    }
}
