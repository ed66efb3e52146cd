use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::color::generate_palette;
use crate::data::aggregate::{GroupMean, SummaryMetrics};
use crate::data::model::label_or_unknown;
use crate::data::view::DashboardView;
use crate::state::AppState;
use crate::ui::format::{format_count, format_date_range, format_mean, format_temperature};
use crate::ui::heatmap::correlation_heatmap;

const CHART_HEIGHT: f32 = 240.0;
const LINE_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
const WEEKEND_COLORS: [Color32; 2] = [
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
];

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render metrics, charts and the data summary in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let view = match &state.view {
        Some(view) => view,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to explore rentals  (File → Open…)");
            });
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Bike Rental Dashboard");
            metrics_row(ui, &view.summary);
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                hourly_chart(&mut cols[0], view);
                working_status_chart(&mut cols[1], view);
            });
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                season_chart(&mut cols[0], view);
                weather_chart(&mut cols[1], view);
            });
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                day_period_chart(&mut cols[0], view);
                weekday_chart(&mut cols[1], view);
            });
            ui.separator();

            correlation_heatmap(ui, &view.correlation);
            ui.separator();

            data_summary(ui, view);
        });
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, title: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(title).small());
        ui.label(RichText::new(value).heading().strong());
    });
}

fn metrics_row(ui: &mut Ui, summary: &SummaryMetrics) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Rentals", format_count(summary.total_rentals));
        metric(&mut cols[1], "Avg Hourly Rentals", format_mean(summary.mean_rentals, 0));
        metric(&mut cols[2], "Total Casual Users", format_count(summary.total_casual));
        metric(
            &mut cols[3],
            "Total Registered Users",
            format_count(summary.total_registered),
        );
    });
}

fn data_summary(ui: &mut Ui, view: &DashboardView) {
    ui.strong("Data Summary");
    let summary = &view.summary;
    let rows = [
        ("Records displayed", format_count(summary.record_count as u64)),
        (
            "Records in dataset",
            format_count(view.dataset_rows as u64),
        ),
        (
            "Date range",
            format_date_range(summary.first_timestamp, summary.last_timestamp),
        ),
        ("Avg temperature", format_temperature(summary.mean_temperature)),
    ];

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(140.0))
        .column(Column::remainder())
        .body(|mut body| {
            for (name, value) in rows {
                body.row(20.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(name);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(value).strong());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn hourly_chart(ui: &mut Ui, view: &DashboardView) {
    ui.strong("Mean Hourly Rentals by Hour of Day");
    let points: Vec<[f64; 2]> = view
        .hourly
        .iter()
        .filter_map(|g| g.mean.map(|m| [f64::from(g.key), m]))
        .collect();

    Plot::new("hourly_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("Hour of Day")
        .y_axis_label("Mean Hourly Rentals")
        .include_x(0.0)
        .include_x(23.0)
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("mean rentals")
                    .color(LINE_COLOR)
                    .width(2.0),
            );
            plot_ui.points(Points::new(points).radius(3.0).color(LINE_COLOR));
        });
}

fn working_status_chart(ui: &mut Ui, view: &DashboardView) {
    category_bars(
        ui,
        "working_status_plot",
        "Working vs Non-Working Days",
        &view.by_working_status,
        |k| k.label().to_string(),
        |_| None,
        false,
    );
}

fn season_chart(ui: &mut Ui, view: &DashboardView) {
    category_bars(
        ui,
        "season_plot",
        "Mean Rentals by Season",
        &view.by_season,
        |k| label_or_unknown(*k),
        |_| None,
        true,
    );
}

fn weather_chart(ui: &mut Ui, view: &DashboardView) {
    category_bars(
        ui,
        "weather_plot",
        "Mean Rentals by Weather",
        &view.by_weather,
        |k| label_or_unknown(*k),
        |_| None,
        false,
    );
}

fn day_period_chart(ui: &mut Ui, view: &DashboardView) {
    category_bars(
        ui,
        "day_period_plot",
        "Mean Rentals by Day Period",
        &view.by_day_period,
        |k| k.label().to_string(),
        |_| None,
        false,
    );
}

fn weekday_chart(ui: &mut Ui, view: &DashboardView) {
    category_bars(
        ui,
        "weekday_plot",
        "Mean Rentals by Day of Week",
        &view.by_weekday,
        |k| k.label().to_string(),
        |k| {
            let weekend_index = k.index().checked_sub(5)? as usize;
            Some(WEEKEND_COLORS[weekend_index])
        },
        false,
    );
}

/// Axis formatter that shows `labels[i]` at integer position `i`.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

/// One bar per group at x = 0, 1, ...; groups without a mean leave a gap.
/// `color_override` replaces the palette colour for selected keys.
fn category_bars<K>(
    ui: &mut Ui,
    id: &str,
    title: &str,
    groups: &[GroupMean<K>],
    label: impl Fn(&K) -> String,
    color_override: impl Fn(&K) -> Option<Color32>,
    horizontal: bool,
) {
    ui.strong(title);

    let palette = generate_palette(groups.len().max(1));
    let labels: Vec<String> = groups.iter().map(|g| label(&g.key)).collect();
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let mean = g.mean?;
            let fill = color_override(&g.key).unwrap_or(palette[i % palette.len()]);
            Some(
                Bar::new(i as f64, mean)
                    .name(format!("{} (n={})", labels[i], g.count))
                    .fill(fill)
                    .width(0.7),
            )
        })
        .collect();

    if groups.iter().any(|g| g.mean.is_none()) {
        let missing: Vec<&str> = groups
            .iter()
            .zip(&labels)
            .filter(|(g, _)| g.mean.is_none())
            .map(|(_, l)| l.as_str())
            .collect();
        ui.label(RichText::new(format!("No data: {}", missing.join(", "))).small().weak());
    }

    let mut chart = BarChart::new(bars).name(title);
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false);

    if horizontal {
        chart = chart.horizontal();
        plot = plot
            .y_axis_formatter(category_formatter(labels))
            .x_axis_label("Mean Hourly Rentals")
            .include_x(0.0);
    } else {
        plot = plot
            .x_axis_formatter(category_formatter(labels))
            .y_axis_label("Mean Hourly Rentals")
            .include_y(0.0);
    }

    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}
