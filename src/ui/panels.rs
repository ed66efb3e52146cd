use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::WorkingStatusFilter;
use crate::data::model::Season;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard Controls");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Copy what we need so we can mutate state inside the closures.
    let years: Vec<i32> = dataset.years.iter().copied().collect();
    let seasons: Vec<Season> = dataset.seasons.iter().copied().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Years ----
            let header = format!("Year  ({}/{})", state.selection.years.len(), years.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("year_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_years();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_years();
                        }
                    });
                    for &year in &years {
                        let mut checked = state.selection.years.contains(&year);
                        if ui.checkbox(&mut checked, year.to_string()).changed() {
                            state.toggle_year(year);
                        }
                    }
                });

            // ---- Seasons ----
            let header = format!(
                "Season  ({}/{})",
                state.selection.seasons.len(),
                seasons.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("season_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_seasons();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_seasons();
                        }
                    });
                    for &season in &seasons {
                        let mut checked = state.selection.seasons.contains(&season);
                        if ui.checkbox(&mut checked, season.label()).changed() {
                            state.toggle_season(season);
                        }
                    }
                });

            ui.separator();

            // ---- Working status ----
            ui.strong("Working status");
            let mut choice = state.selection.working_status;
            egui::ComboBox::from_id_salt("working_status")
                .selected_text(choice.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in WorkingStatusFilter::ALL {
                        ui.selectable_value(&mut choice, option, option.label());
                    }
                });
            state.set_working_status(choice);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state.view.as_ref().map_or(0, |v| v.visible_rows());
            let source = state.source_name.as_deref().unwrap_or("dataset");
            ui.label(format!(
                "{source}: {} records loaded, {visible} visible",
                ds.len()
            ));

            let skipped = ds.report.skipped_total();
            if skipped > 0 {
                let details: Vec<String> = ds
                    .report
                    .skipped
                    .iter()
                    .map(|(reason, n)| format!("{reason}: {n}"))
                    .collect();
                ui.label(RichText::new(format!("{skipped} rows skipped")).color(Color32::YELLOW))
                    .on_hover_text(details.join("\n"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open bike rental data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
        if let Some(ds) = &state.dataset {
            log::info!(
                "Dataset ready: {} records, years {:?}",
                ds.len(),
                ds.years
            );
        }
    }
}
