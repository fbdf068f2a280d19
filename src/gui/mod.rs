pub mod app;
pub mod error_modal;
pub mod settings;
pub mod table;
pub mod top_bar;

pub use app::AdminApp;
