use eframe::egui;

use super::data::SettingsData;

pub struct ConnectionSettingsModal {
    open: bool,
    draft: SettingsData,
    original: SettingsData,
    error: Option<String>,
}

impl ConnectionSettingsModal {
    pub fn new() -> Self {
        Self {
            open: false,
            draft: SettingsData::default(),
            original: SettingsData::default(),
            error: None,
        }
    }

    pub fn open_settings(&mut self, current_settings: SettingsData) {
        self.draft = current_settings.clone();
        self.original = current_settings;
        self.error = None;
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    /// Validates the draft; on success the modal closes and the new settings are returned.
    fn try_save(&mut self) -> Option<SettingsData> {
        match self.draft.validate() {
            Ok(()) => {
                let mut settings = self.original.clone();
                settings.set_base_url(self.draft.api_base_url.trim().to_string());
                settings.request_timeout_secs = self.draft.request_timeout_secs;
                settings.cache_ttl_secs = self.draft.cache_ttl_secs;
                settings.dark_mode = self.draft.dark_mode;
                self.original = settings.clone();
                self.error = None;
                self.open = false;
                Some(settings)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<SettingsData> {
        if !self.open {
            return None;
        }

        let mut result = None;

        let modal = egui::Modal::new(egui::Id::new("connection_settings_modal")).show(ctx, |ui| {
            ui.set_width(420.0);
            ui.heading("API Connection");
            ui.add_space(10.0);

            egui::Grid::new("connection_settings_grid").num_columns(2).spacing([12.0, 8.0]).show(
                ui,
                |ui| {
                    ui.label("Base URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.draft.api_base_url)
                            .desired_width(260.0),
                    );
                    ui.end_row();

                    ui.label("Request timeout:");
                    ui.add(
                        egui::DragValue::new(&mut self.draft.request_timeout_secs)
                            .range(1..=300)
                            .suffix(" s"),
                    );
                    ui.end_row();

                    ui.label("Reference cache:");
                    ui.add(
                        egui::DragValue::new(&mut self.draft.cache_ttl_secs)
                            .range(1..=3600)
                            .suffix(" s"),
                    );
                    ui.end_row();
                },
            );

            if let Some(error) = &self.error {
                ui.add_space(5.0);
                ui.colored_label(egui::Color32::RED, format!("⚠ {}", error));
            }

            ui.add_space(10.0);
            ui.separator();

            let is_dirty = self.is_dirty();
            ui.horizontal(|ui| {
                if is_dirty {
                    ui.colored_label(egui::Color32::YELLOW, "⚠");
                    ui.label("Settings have been modified");
                } else {
                    ui.label("");
                }
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                let save_clicked =
                    ui.add_enabled(is_dirty, egui::Button::new("Save Settings")).clicked();
                let cancel_clicked = ui.button("Cancel").clicked();

                let mut reset_clicked = false;
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    reset_clicked = ui.button("Restore Default").clicked();
                });

                if save_clicked {
                    result = self.try_save();
                } else if cancel_clicked {
                    self.draft = self.original.clone();
                    self.error = None;
                    ui.close();
                } else if reset_clicked {
                    let defaults = SettingsData::default();
                    self.draft.api_base_url = defaults.api_base_url;
                    self.draft.request_timeout_secs = defaults.request_timeout_secs;
                    self.draft.cache_ttl_secs = defaults.cache_ttl_secs;
                    self.error = None;
                }
            });
        });

        if modal.should_close() {
            self.open = false;
        }

        result
    }
}

impl Default for ConnectionSettingsModal {
    fn default() -> Self {
        Self::new()
    }
}
