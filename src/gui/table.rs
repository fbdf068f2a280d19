use eframe::egui;
use egui_extras::{
    Column,
    TableBuilder,
};

use crate::models::EntityKind;

/// Read-only listing of records, one row per record, cells already formatted.
pub fn record_table(ui: &mut egui::Ui, kind: EntityKind, headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        crate::pages::widgets::info(ui, &format!("No {} found.", kind.plural()));
        return;
    }

    let text_height = egui::TextStyle::Body.resolve(ui.style()).size.max(ui.spacing().interact_size.y);

    let mut table = TableBuilder::new(ui)
        .id_salt(kind.endpoint())
        .striped(true)
        .resizable(true)
        .max_scroll_height(280.0)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center));

    for index in 0..headers.len() {
        table = if index + 1 == headers.len() {
            table.column(Column::remainder().at_least(80.0))
        } else {
            table.column(Column::auto().at_least(60.0))
        };
    }

    table
        .header(25.0, |mut header| {
            for title in headers {
                header.col(|ui| {
                    ui.strong(*title);
                });
            }
        })
        .body(|body| {
            body.rows(text_height, rows.len(), |mut row| {
                let cells = &rows[row.index()];
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell.as_str());
                    });
                }
            });
        });
}
