mod modals;

use eframe::egui;
use modals::Modals;
use tracing::{
    error,
    info,
};

use super::{
    settings::SettingsData,
    top_bar::{
        TopBar,
        TopBarAction,
    },
};
use crate::{
    api::{
        ApiClient,
        ReferenceData,
    },
    pages::{
        Page,
        PageContext,
        ViewState,
    },
    persistence::{
        load_json_or_default,
        save_json,
    },
    workflow::{
        NoticeLevel,
        Notices,
    },
};

const VIEW_STATE_FILE: &str = "view_state.json";

pub struct AdminApp {
    // Configuration
    pub settings_data: SettingsData,

    // Backend
    pub api: ApiClient,
    pub reference: ReferenceData,

    // UI State
    pub view: ViewState,
    pub notices: Notices,

    // Modals
    pub modals: Modals,
}

impl AdminApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings_data: SettingsData,
        api: ApiClient,
    ) -> Self {
        let reference = ReferenceData::new(settings_data.cache_ttl());

        let app = Self {
            settings_data,
            api,
            reference,
            view: load_json_or_default::<ViewState>(VIEW_STATE_FILE),
            notices: Notices::new(),
            modals: Modals::default(),
        };

        app.setup_theme(cc);
        app
    }

    fn setup_theme(&self, cc: &eframe::CreationContext<'_>) {
        cc.egui_ctx.set_theme(if self.settings_data.dark_mode {
            egui::Theme::Dark
        } else {
            egui::Theme::Light
        });

        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = if self.settings_data.dark_mode {
                egui::ThemePreference::Dark
            } else {
                egui::ThemePreference::Light
            };
        });
    }

    fn handle_top_bar_action(&mut self, action: TopBarAction) {
        match action {
            TopBarAction::RefreshData => {
                info!("reference data refresh requested");
                self.reference.invalidate_all();
            }
            TopBarAction::OpenConnectionSettings => {
                self.modals.connection.open_settings(self.settings_data.clone());
            }
        }
    }

    /// Rebuilds the client for new connection settings. The cache starts empty.
    fn apply_settings(&mut self, settings: SettingsData) {
        match ApiClient::connect(&settings.api_base_url, settings.request_timeout()) {
            Ok(api) => {
                info!(base_url = %settings.api_base_url, "api client rebuilt");
                self.api = api;
                self.reference = ReferenceData::new(settings.cache_ttl());
                self.settings_data = settings;
                self.save_settings();
            }
            Err(e) => {
                error!(error = %e, "failed to rebuild api client");
                self.modals.error.show_error(
                    "Settings Not Applied",
                    "The HTTP client could not be created with these settings.",
                    Some(e.to_string()),
                );
            }
        }
    }

    fn sync_theme(&mut self, ctx: &egui::Context) {
        let dark_mode = ctx.theme() == egui::Theme::Dark;
        if dark_mode != self.settings_data.dark_mode {
            self.settings_data.dark_mode = dark_mode;
            self.save_settings();
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings_data.save() {
            error!("Failed to save settings: {}", e);
        }
    }

    fn show_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("navigation").resizable(false).min_width(220.0).show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("Admin UI Navigation");
            ui.add_space(8.0);

            let mut target = None;
            if nav_button(ui, &self.view, Page::Home) {
                target = Some(Page::Home);
            }
            ui.separator();
            for page in Page::CATALOG {
                if nav_button(ui, &self.view, page) {
                    target = Some(page);
                }
            }
            ui.separator();
            for page in Page::PEOPLE {
                if nav_button(ui, &self.view, page) {
                    target = Some(page);
                }
            }

            if let Some(page) = target {
                self.view.navigate(page, &mut self.notices);
            }
        });
    }

    fn show_notices(&mut self, ui: &mut egui::Ui) {
        let mut dismissed = None;
        for (index, notice) in self.notices.iter().enumerate() {
            let (icon, color) = match notice.level {
                NoticeLevel::Success => ("✔", egui::Color32::from_rgb(0, 170, 0)),
                NoticeLevel::Info => ("ℹ", egui::Color32::LIGHT_BLUE),
                NoticeLevel::Warning => ("⚠", egui::Color32::from_rgb(220, 160, 0)),
                NoticeLevel::Error => ("✖", egui::Color32::from_rgb(200, 80, 80)),
            };

            egui::Frame::group(ui.style()).stroke(egui::Stroke::new(1.0, color)).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.colored_label(color, icon);
                    ui.label(&notice.text);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").on_hover_text("Dismiss").clicked() {
                            dismissed = Some(index);
                        }
                    });
                });
            });
        }

        if let Some(index) = dismissed {
            self.notices.dismiss(index);
        }
        if !self.notices.is_empty() {
            ui.add_space(8.0);
        }
    }
}

fn nav_button(ui: &mut egui::Ui, view: &ViewState, page: Page) -> bool {
    ui.selectable_label(view.current == page, page.nav_label()).clicked()
}

impl eframe::App for AdminApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(action) = TopBar::show(ctx, &self.api) {
            self.handle_top_bar_action(action);
        }
        self.sync_theme(ctx);

        self.show_sidebar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_notices(ui);
            egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                let mut page_ctx = PageContext {
                    api: &self.api,
                    reference: &mut self.reference,
                    notices: &mut self.notices,
                };
                self.view.show_current(ui, &mut page_ctx);
            });
        });

        for alert in self.api.take_alerts() {
            self.modals.error.push(alert);
        }
        self.modals.error.show(ctx);

        if let Some(settings) = self.modals.connection.show(ctx) {
            self.apply_settings(settings);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = save_json(&self.view, VIEW_STATE_FILE) {
            error!("Failed to save view state: {}", e);
        }
    }
}
