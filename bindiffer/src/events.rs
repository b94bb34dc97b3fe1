use eframe::egui;

#[derive(Default, Clone, Copy)]
pub struct EventState {
    pub(crate) pointer_hover: Option<egui::Pos2>,
    pub(crate) escape_pressed: bool,
    pub(crate) enter_released: bool,
    /// PageDown presses minus PageUp presses
    pub(crate) page_delta: i64,
    /// F3 pressed this frame, `Some(false)` with Shift held
    pub(crate) jump_difference: Option<bool>,
}

/// Collect events once per frame and return an aggregated state
pub fn collect_ctx_events(ctx: &egui::Context) -> EventState {
    ctx.input(|i| {
        let mut state = EventState {
            pointer_hover: i.pointer.hover_pos(),
            ..Default::default()
        };

        for event in &i.events {
            let egui::Event::Key {
                key,
                pressed,
                modifiers,
                ..
            } = event
            else {
                continue;
            };

            match (*key, *pressed) {
                (egui::Key::PageDown, true) => state.page_delta += 1,
                (egui::Key::PageUp, true) => state.page_delta -= 1,
                (egui::Key::F3, true) => state.jump_difference = Some(!modifiers.shift),
                (egui::Key::Enter, false) => state.enter_released = true,
                _ => {}
            }
        }

        // Direct query for Escape pressed this frame
        state.escape_pressed = i.key_pressed(egui::Key::Escape);

        state
    })
}
