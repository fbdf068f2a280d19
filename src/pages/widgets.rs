use eframe::egui;

use super::{
    confirm_delete,
    PageContext,
};
use crate::{
    models::EntityKind,
    workflow::{
        label_for,
        resolve_selection,
        DeleteConfirmation,
        SelectOption,
    },
};

const INFO_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 160, 230);
const WARNING_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 180, 60);

pub fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(12.0);
    ui.separator();
    ui.heading(title);
    ui.add_space(4.0);
}

pub fn info(ui: &mut egui::Ui, text: &str) {
    ui.horizontal_wrapped(|ui| {
        ui.colored_label(INFO_COLOR, "ℹ");
        ui.label(text);
    });
}

pub fn warning(ui: &mut egui::Ui, text: &str) {
    ui.horizontal_wrapped(|ui| {
        ui.colored_label(WARNING_COLOR, "⚠");
        ui.colored_label(WARNING_COLOR, text);
    });
}

pub fn text_field(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.add_sized([160.0, 20.0], egui::Label::new(label));
        ui.add(egui::TextEdit::singleline(value).desired_width(320.0));
    });
}

pub fn number_field(ui: &mut egui::Ui, label: &str, value: &mut i64) {
    ui.horizontal(|ui| {
        ui.add_sized([160.0, 20.0], egui::Label::new(label));
        ui.add(egui::DragValue::new(value).range(1..=99).speed(1.0));
    });
}

/// Dropdown over id-carrying options. An empty or stale selection snaps to the first option.
pub fn select(
    ui: &mut egui::Ui,
    id_salt: &str,
    label: &str,
    options: &[SelectOption],
    selected: &mut Option<i64>,
) -> bool {
    let before = *selected;
    *selected = resolve_selection(options, *selected);

    ui.horizontal(|ui| {
        ui.add_sized([160.0, 20.0], egui::Label::new(label));
        egui::ComboBox::from_id_salt(id_salt)
            .width(320.0)
            .selected_text(label_for(options, *selected).unwrap_or("Nothing to select"))
            .show_ui(ui, |ui| {
                for option in options {
                    ui.selectable_value(selected, Some(option.value), option.label.as_str());
                }
            });
    });

    *selected != before
}

/// Like [`select`] but with a leading "None" entry, for optional foreign keys.
pub fn select_optional(
    ui: &mut egui::Ui,
    id_salt: &str,
    label: &str,
    options: &[SelectOption],
    selected: &mut Option<i64>,
) {
    if selected.is_some_and(|id| !options.iter().any(|o| o.value == id)) {
        *selected = None;
    }

    ui.horizontal(|ui| {
        ui.add_sized([160.0, 20.0], egui::Label::new(label));
        egui::ComboBox::from_id_salt(id_salt)
            .width(320.0)
            .selected_text(label_for(options, *selected).unwrap_or("None"))
            .show_ui(ui, |ui| {
                ui.selectable_value(selected, None, "None");
                for option in options {
                    ui.selectable_value(selected, Some(option.value), option.label.as_str());
                }
            });
    });
}

pub fn choice(
    ui: &mut egui::Ui,
    id_salt: &str,
    label: &str,
    choices: &[&str],
    selected: &mut String,
) {
    if !choices.contains(&selected.as_str()) {
        *selected = choices.first().map(|c| c.to_string()).unwrap_or_default();
    }

    ui.horizontal(|ui| {
        ui.add_sized([160.0, 20.0], egui::Label::new(label));
        egui::ComboBox::from_id_salt(id_salt)
            .width(320.0)
            .selected_text(selected.as_str())
            .show_ui(ui, |ui| {
                for choice in choices {
                    ui.selectable_value(selected, choice.to_string(), *choice);
                }
            });
    });
}

pub fn multi_select(
    ui: &mut egui::Ui,
    id_salt: &str,
    label: &str,
    options: &[SelectOption],
    selected: &mut Vec<i64>,
) {
    ui.label(label);
    egui::ScrollArea::vertical().id_salt(id_salt).max_height(120.0).show(ui, |ui| {
        for option in options {
            let mut checked = selected.contains(&option.value);
            if ui.checkbox(&mut checked, option.label.as_str()).changed() {
                if checked {
                    selected.push(option.value);
                } else {
                    selected.retain(|id| *id != option.value);
                }
            }
        }
    });
}

/// Select-then-confirm delete block. The confirm button only exists while the pending
/// id matches the current selection.
pub fn delete_section(
    ui: &mut egui::Ui,
    ctx: &mut PageContext<'_>,
    kind: EntityKind,
    options: &[SelectOption],
    selected: &mut Option<i64>,
    confirmation: &mut DeleteConfirmation,
    note: Option<&str>,
) {
    if options.is_empty() {
        info(ui, &format!("No {} available to delete.", kind.plural()));
        return;
    }

    let id_salt = format!("delete_{}", kind.plural());
    select(ui, &id_salt, &format!("Select {kind} to delete"), options, selected);

    if ui.button(format!("Delete {kind}")).clicked() {
        if let Some(id) = *selected {
            confirmation.request(id);
        }
    }

    if confirmation.is_pending_for(*selected) {
        if let Some(id) = *selected {
            warning(
                ui,
                &format!(
                    "Are you sure you want to delete {kind} ID: {id}? This action cannot be undone."
                ),
            );
        }
        if let Some(note) = note {
            warning(ui, note);
        }
        if ui.button("Confirm Deletion").clicked() && confirm_delete(ctx, confirmation, *selected, kind) {
            *selected = None;
        }
    }
}
