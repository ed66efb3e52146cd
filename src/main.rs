use anyhow::Context;
use clap::Parser;
use eframe::egui;

use rusty_pedals::app::RustyPedalsApp;
use rusty_pedals::cli::Cli;
use rusty_pedals::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.headless {
        let report = cli.run_headless()?;
        let json = serde_json::to_string_pretty(&report).context("serializing dashboard view")?;
        println!("{json}");
        return Ok(());
    }

    let mut state = AppState::default();
    if let Some(path) = &cli.data {
        state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Pedals – Bike Rental Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyPedalsApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
