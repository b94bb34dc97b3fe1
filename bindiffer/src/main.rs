#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
// Tell OS to hide the console window when running.
// This attribute is only applied if the target OS is Windows.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod events;
mod loader;
mod ui_filedrop;
mod ui_menubar;
mod ui_pane;
mod ui_popup;
mod ui_scrollarea;

use crate::events::collect_ctx_events;
use crate::ui_popup::PopupType;
use app::BinDiffApp;
use bindifflib::{SessionConfig, Side};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

/// Compare two binary files side by side
#[derive(Parser)]
#[command(name = "bindiffer", version, about, long_about = None)]
struct Args {
    /// File shown in the left pane
    #[arg(value_name = "LEFT")]
    left: Option<PathBuf>,
    /// File shown in the right pane
    #[arg(value_name = "RIGHT")]
    right: Option<PathBuf>,
    /// Point size of the monospace font
    #[arg(long, default_value_t = 14.0)]
    font_size: f32,
    /// Scroll both panes independently
    #[arg(long)]
    unlinked: bool,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = SessionConfig {
        link_scrolling: !args.unlinked,
        ..SessionConfig::default()
    };
    let mut app = BinDiffApp::new(config, args.font_size);

    for (side, path) in [(Side::Left, &args.left), (Side::Right, &args.right)] {
        if let Some(path) = path {
            app.load_file(side, path);
        }
    }

    let options = eframe::NativeOptions {
        vsync: true,
        viewport: egui::ViewportBuilder::default()
            .with_resizable(true)
            .with_inner_size([1600.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Bindiffer", options, Box::new(|_cc| Ok(Box::new(app))))
}

impl eframe::App for BinDiffApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        #[cfg(debug_assertions)]
        {
            // Track FPS
            let dt = ctx.input(|i| i.stable_dt);
            let fps = if dt > 0.0 { 1.0 / dt } else { 0.0 };
            log::trace!("FPS: {fps:.1}");
        }

        // Collect input events once per frame and store in the app state
        *self.events.borrow_mut() = collect_ctx_events(ctx);

        self.show_menu_bar(ctx);

        if self.error.borrow().is_some() {
            self.popup.active = true;
            self.popup.ptype = Some(PopupType::Error);
        }

        self.handle_drag_and_drop(ctx);

        // If pop active - show it and return (don't touch the panes)
        if self.popup.active {
            self.show_popup(ctx);
            return;
        }

        self.handle_key_events();
        self.show_panes(ctx);
    }
}
