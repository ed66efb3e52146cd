use eframe::egui::{pos2, vec2, Align2, FontId, Rect, RichText, Sense, Ui};

use crate::color::{diverging, diverging_text};
use crate::data::aggregate::CorrelationMatrix;
use crate::ui::format::format_correlation;

const LABEL_WIDTH: f32 = 110.0;
const HEADER_HEIGHT: f32 = 18.0;

/// Annotated correlation heatmap. Column headers are the 1-based row
/// numbers, so long names only appear once on the left.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    ui.strong("Correlation Matrix of Numerical Variables");
    ui.label(RichText::new("blue: negative, red: positive, grey: undefined").small().weak());

    let n = matrix.len();
    if n == 0 {
        return;
    }

    let cell = ((ui.available_width() - LABEL_WIDTH) / n as f32).clamp(26.0, 52.0);
    let size = vec2(LABEL_WIDTH + cell * n as f32, HEADER_HEIGHT + cell * n as f32);
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let grid_left = rect.left() + LABEL_WIDTH;
    let grid_top = rect.top() + HEADER_HEIGHT;

    for j in 0..n {
        painter.text(
            pos2(grid_left + cell * (j as f32 + 0.5), rect.top() + HEADER_HEIGHT / 2.0),
            Align2::CENTER_CENTER,
            (j + 1).to_string(),
            FontId::proportional(11.0),
            text_color,
        );
    }

    for (i, column) in matrix.columns.iter().enumerate() {
        let row_top = grid_top + cell * i as f32;
        painter.text(
            pos2(rect.left() + 2.0, row_top + cell / 2.0),
            Align2::LEFT_CENTER,
            format!("{:>2} {}", i + 1, column.name()),
            FontId::monospace(11.0),
            text_color,
        );
        for j in 0..n {
            let value = matrix.get(i, j);
            let cell_rect = Rect::from_min_size(pos2(grid_left + cell * j as f32, row_top), vec2(cell, cell))
                .shrink(1.0);
            painter.rect_filled(cell_rect, 0.0, diverging(value));
            painter.text(
                cell_rect.center(),
                Align2::CENTER_CENTER,
                format_correlation(value),
                FontId::proportional(if cell < 34.0 { 8.5 } else { 10.0 }),
                diverging_text(value),
            );
        }
    }

    if let Some(pos) = response.hover_pos() {
        let col = ((pos.x - grid_left) / cell).floor();
        let row = ((pos.y - grid_top) / cell).floor();
        if col >= 0.0 && row >= 0.0 && (col as usize) < n && (row as usize) < n {
            let (i, j) = (row as usize, col as usize);
            response.on_hover_text(format!(
                "{} vs {}: {}",
                matrix.columns[i].name(),
                matrix.columns[j].name(),
                format_correlation(matrix.get(i, j))
            ));
        }
    }
}
