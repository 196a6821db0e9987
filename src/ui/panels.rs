use std::collections::BTreeSet;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::data::filter::{PriceBand, TextSearch};
use crate::data::stats;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No price list loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            search_section(ui, state);
            ui.separator();

            set_section(ui, "UOM", "uom_filter", &dataset.uoms, &mut state.criteria.uoms);
            ui.separator();

            set_section(
                ui,
                "Sales Org.",
                "org_filter",
                &dataset.orgs,
                &mut state.criteria.orgs,
            );
            ui.separator();

            price_section(ui, state, dataset.price_bounds);
            ui.separator();

            reference_date_section(ui, state);
            ui.add_space(8.0);

            if ui.button("Reset all filters").clicked() {
                state.clear_filters();
            }
        });

    // Recompute visible indices after any widget changes.
    state.refilter();
}

fn search_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Search");

    let mut combined = matches!(state.criteria.search, TextSearch::Combined(_));
    if ui.checkbox(&mut combined, "Single box (name or ID)").changed() {
        state.criteria.search = if combined {
            TextSearch::Combined(String::new())
        } else {
            TextSearch::default()
        };
    }

    match &mut state.criteria.search {
        TextSearch::Fields { name, id } => {
            ui.label("Material name");
            ui.text_edit_singleline(name);
            ui.label("Material ID");
            ui.text_edit_singleline(id);
        }
        TextSearch::Combined(query) => {
            ui.label("Name or ID");
            ui.text_edit_singleline(query);
        }
    }
}

/// One collapsible checkbox list over a categorical column.
/// No ticked boxes means the column is not filtered at all.
fn set_section(
    ui: &mut Ui,
    label: &str,
    salt: &str,
    all_values: &BTreeSet<String>,
    selected: &mut BTreeSet<String>,
) {
    let header_text = if selected.is_empty() {
        format!("{label}  (all)")
    } else {
        format!("{label}  ({}/{})", selected.len(), all_values.len())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(salt)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                selected.clear();
            }

            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.as_str()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                }
            }
        });
}

fn price_section(ui: &mut Ui, state: &mut AppState, bounds: Option<(f64, f64)>) {
    ui.strong("Rawabi Price");

    let Some((lo, hi)) = bounds else {
        ui.label("No prices in this file.");
        return;
    };

    let mut enabled = state.criteria.price.is_some();
    if ui.checkbox(&mut enabled, "Limit price range").changed() {
        state.criteria.price = enabled.then(|| PriceBand { min: lo, max: hi });
    }

    if let Some(band) = &mut state.criteria.price {
        ui.horizontal(|ui: &mut Ui| {
            ui.add(
                DragValue::new(&mut band.min)
                    .speed(1.0)
                    .range(lo..=band.max)
                    .prefix("min "),
            );
            ui.add(
                DragValue::new(&mut band.max)
                    .speed(1.0)
                    .range(band.min..=hi)
                    .prefix("max "),
            );
        });
    }
}

fn reference_date_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Expiry reference date");
    ui.add(egui_extras::DatePickerButton::new(&mut state.reference_date).id_salt("reference_date"));
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
            if ui
                .add_enabled(state.source_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} materials loaded, {} matching",
                ds.len(),
                state.visible_indices.len()
            ));

            let expiring = stats::expiring_count(ds, &state.visible_indices, state.reference_date);
            if expiring > 0 {
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "⚠ {expiring} materials expiring by {}",
                        stats::expiry_cutoff(state.reference_date)
                    ))
                    .color(Color32::ORANGE),
                );
            }
        }

        if let Some(status) = &state.status {
            ui.separator();
            match status {
                Status::Info(msg) => {
                    ui.label(msg);
                }
                Status::Error(msg) => {
                    ui.label(RichText::new(msg).color(Color32::RED));
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open price list")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(path);
    }
}

fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered materials")
        .set_file_name("filtered_materials.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_view(&path);
    }
}
