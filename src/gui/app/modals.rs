use crate::gui::{
    error_modal::ErrorModal,
    settings::ConnectionSettingsModal,
};

pub struct Modals {
    pub error: ErrorModal,
    pub connection: ConnectionSettingsModal,
}

impl Default for Modals {
    fn default() -> Self {
        Self { error: ErrorModal::new(), connection: ConnectionSettingsModal::new() }
    }
}
