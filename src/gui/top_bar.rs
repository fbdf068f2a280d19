use eframe::egui::{self, containers};

use crate::api::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarAction {
    RefreshData,
    OpenConnectionSettings,
}

pub struct TopBar;

impl TopBar {
    pub fn show(ctx: &egui::Context, api: &ApiClient) -> Option<TopBarAction> {
        let mut action = None;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            containers::menu::Bar::new().ui(ui, |ui| {
                egui::widgets::global_theme_preference_switch(ui);
                ui.menu_button("File", |ui| {
                    if ui.button("Refresh data").clicked() {
                        action = Some(TopBarAction::RefreshData);
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Settings", |ui| {
                    if ui.button("API Connection").clicked() {
                        action = Some(TopBarAction::OpenConnectionSettings);
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    Self::show_status_indicator(ui, api);
                });
            });
        });

        action
    }

    fn show_status_indicator(ui: &mut egui::Ui, api: &ApiClient) {
        let (color, status) = match api.reachable() {
            Some(true) => (egui::Color32::from_rgb(0, 200, 0), "Reachable"),
            Some(false) => (egui::Color32::from_rgb(200, 80, 80), "Unreachable"),
            None => (egui::Color32::GRAY, "Not contacted yet"),
        };
        let tooltip = format!("{}: {}", api.base_url(), status);

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;
            ui.small("API").on_hover_text(&tooltip);
            ui.small(egui::RichText::new("●").color(color)).on_hover_text(&tooltip);
        });
    }
}
