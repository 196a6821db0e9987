use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{columns, PriceTable};
use crate::data::stats::{self, Kpis};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – KPI strip, rankings, material table
// ---------------------------------------------------------------------------

/// Render the KPI cards, the price rankings, and the filtered table.
pub fn central_view(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a price list to get started  (File → Open…)");
        });
        return;
    };

    kpi_strip(ui, &stats::compute_kpis(dataset, &state.visible_indices));
    ui.add_space(4.0);

    rankings(ui, dataset, &state.visible_indices);
    ui.separator();

    material_table(ui, dataset, state);
}

fn kpi_strip(ui: &mut Ui, kpis: &Kpis) {
    ui.columns(4, |cols: &mut [Ui]| {
        kpi_card(&mut cols[0], "Total Materials", kpis.count.to_string());
        kpi_card(&mut cols[1], "Avg Rawabi Price", fmt_mean(kpis.avg_price));
        kpi_card(&mut cols[2], "Avg Market Price", fmt_mean(kpis.avg_market));
        kpi_card(&mut cols[3], "Avg Price Diff", fmt_mean(kpis.avg_diff));
    });
}

fn kpi_card(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(label);
            ui.heading(value);
        });
    });
}

/// A mean over zero present values renders as a dash.
fn fmt_mean(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "–".to_string(),
    }
}

fn rankings(ui: &mut Ui, dataset: &PriceTable, visible: &[usize]) {
    ui.columns(2, |cols: &mut [Ui]| {
        ranking_section(
            &mut cols[0],
            format!("Top {} most expensive", stats::RANKING_SIZE),
            "top_prices",
            dataset,
            &stats::most_expensive(dataset, visible, stats::RANKING_SIZE),
        );
        ranking_section(
            &mut cols[1],
            format!("Top {} cheapest", stats::RANKING_SIZE),
            "bottom_prices",
            dataset,
            &stats::cheapest(dataset, visible, stats::RANKING_SIZE),
        );
    });
}

fn ranking_section(
    ui: &mut Ui,
    title: String,
    salt: &str,
    dataset: &PriceTable,
    ranked: &[usize],
) {
    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(salt)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new(format!("{salt}_grid"))
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.strong(columns::ID);
                    ui.strong(columns::NAME);
                    ui.strong(columns::PRICE);
                    ui.end_row();

                    for &idx in ranked {
                        let material = &dataset.materials[idx];
                        ui.label(material.cell(columns::ID));
                        ui.label(material.cell(columns::NAME));
                        ui.label(material.cell(columns::PRICE));
                        ui.end_row();
                    }
                });
        });
}

fn material_table(ui: &mut Ui, dataset: &PriceTable, state: &AppState) {
    let cutoff = stats::expiry_cutoff(state.reference_date);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(70.0), dataset.columns.len() - 1)
        .column(Column::remainder().at_least(70.0))
        .min_scrolled_height(0.0)
        .header(20.0, |mut header| {
            for col in &dataset.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col.as_str());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, state.visible_indices.len(), |mut row| {
                let material = &dataset.materials[state.visible_indices[row.index()]];

                // Expired rows go red, rows inside the expiry window orange.
                let tint = material.valid_to.and_then(|end| {
                    if end <= state.reference_date {
                        Some(Color32::RED)
                    } else if end <= cutoff {
                        Some(Color32::ORANGE)
                    } else {
                        None
                    }
                });

                for col in &dataset.columns {
                    let mut text = RichText::new(material.cell(col));
                    if let Some(c) = tint {
                        text = text.color(c);
                    }
                    row.col(|ui: &mut Ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
