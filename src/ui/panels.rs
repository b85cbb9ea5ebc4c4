use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use sales_dashboard::Selection;

use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel and apply any change to the state.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let dataset = state.dataset;
    let mut filter = state.filter.clone();

    ui.strong("Region");
    selection_combo(ui, "region_select", &mut filter.region, &dataset.regions);
    ui.add_space(6.0);

    ui.strong("Product");
    selection_combo(ui, "product_select", &mut filter.product, &dataset.products);
    ui.add_space(6.0);

    ui.strong("Date range");
    let (mut start, mut end) = filter.date_range;
    egui::Grid::new("date_range_grid")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("From");
            ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
            ui.end_row();
            ui.label("To");
            ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
            ui.end_row();
        });

    // The pickers are not bounded themselves, so clamp to the data.
    if let Some((min, max)) = state.date_bounds() {
        start = start.clamp(min, max);
        end = end.clamp(min, max);
    }
    filter.date_range = (start, end);

    if filter.is_reversed() {
        ui.label(RichText::new("Start date is after end date").color(Color32::YELLOW));
    }

    ui.add_space(8.0);
    if ui.button("Reset filters").clicked() {
        state.reset_filters();
    } else {
        state.apply_filter(filter);
    }
}

/// A combo box offering `All` followed by every label in the catalogue.
fn selection_combo(ui: &mut Ui, id: &str, selection: &mut Selection, labels: &BTreeSet<String>) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(selection.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            let choices = std::iter::once("All").chain(labels.iter().map(String::as_str));
            for label in choices {
                let candidate = Selection::from_label(label);
                let selected = *selection == candidate;
                if ui.selectable_label(selected, label).clicked() {
                    *selection = candidate;
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export tables…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows loaded, {} matching filters",
            state.dataset.len(),
            state.tables.row_count
        ));

        ui.separator();

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
            }
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard tables")
        .set_file_name("dashboard_tables.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_tables(&path) {
            Ok(()) => log::info!("Exported dashboard tables to {}", path.display()),
            Err(e) => log::error!("Failed to export tables: {e:#}"),
        }
    }
}
