pub mod data;
pub mod modal;

pub use data::{
    SettingsData,
    SettingsError,
};
pub use modal::ConnectionSettingsModal;
