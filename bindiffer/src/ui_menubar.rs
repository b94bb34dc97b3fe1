use crate::app::BinDiffApp;
use crate::ui_popup::PopupType;
use bindifflib::Side;
use eframe::egui;

impl BinDiffApp {
    /// Displays the top menu bar with File, View, and About buttons
    pub(crate) fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menubar").show(ctx, |ui| {
            ui.add_space(3.0);

            egui::MenuBar::new().ui(ui, |ui| {
                ui.horizontal(|ui| {
                    // FILE MENU
                    ui.menu_button("File", |ui| {
                        // OPEN BUTTONS
                        for side in Side::BOTH {
                            if ui.button(format!("Open {}...", side.label())).clicked()
                                && let Some(path) = rfd::FileDialog::new()
                                    .set_title(format!("Open {} file", side.label()))
                                    .pick_file()
                            {
                                self.load_file(side, &path);
                            }
                        }

                        ui.separator();

                        // CLOSE BUTTONS
                        for side in Side::BOTH {
                            let is_loaded = self.session.source(side).is_some();
                            if ui
                                .add_enabled(
                                    is_loaded,
                                    egui::Button::new(format!("Close {}", side.label())),
                                )
                                .clicked()
                            {
                                self.close_file(side);
                            }
                        }

                        ui.separator();

                        // QUIT BUTTON
                        if ui.button("Quit").clicked() {
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });

                    // VIEW MENU
                    ui.menu_button("View", |ui| {
                        let mut linked = self.session.config().link_scrolling;
                        if ui.checkbox(&mut linked, "Link scrolling").changed() {
                            self.session.set_link_scrolling(linked);
                        }

                        ui.separator();

                        let is_diffing = self.session.is_diffing();
                        if ui
                            .add_enabled(
                                is_diffing,
                                egui::Button::new("Next difference (F3)"),
                            )
                            .clicked()
                        {
                            self.jump_to_difference(true);
                        }
                        if ui
                            .add_enabled(
                                is_diffing,
                                egui::Button::new("Previous difference (Shift+F3)"),
                            )
                            .clicked()
                        {
                            self.jump_to_difference(false);
                        }
                    });

                    // ABOUT BUTTON
                    let about_button = ui.button("About");

                    if about_button.clicked() {
                        self.popup.active = true;
                        self.popup.ptype = Some(PopupType::About);
                    }

                    // Latest notice, right-aligned
                    if let Some(notice) = &self.notice {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.weak(notice.as_str());
                        });
                    }
                });
            });

            ui.add_space(2.0);
        });
    }
}
