use std::process::ExitCode;

use eframe::egui;
use gurukul_admin::{
    api::ApiClient,
    gui::{
        settings::SettingsData,
        AdminApp,
    },
};
use tracing::{
    error,
    info,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gurukul_admin=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> ExitCode {
    init_tracing();

    let settings = SettingsData::load();
    let api = match ApiClient::connect(&settings.api_base_url, settings.request_timeout()) {
        Ok(api) => api,
        Err(e) => {
            error!(error = %e, "failed to build the http client");
            return ExitCode::FAILURE;
        }
    };
    info!(base_url = %api.base_url(), "starting Gurukul Admin UI");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gurukul Admin UI")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    match eframe::run_native(
        "Gurukul Admin UI",
        options,
        Box::new(|cc| Ok(Box::new(AdminApp::new(cc, settings, api)))),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "ui terminated with an error");
            ExitCode::FAILURE
        }
    }
}
