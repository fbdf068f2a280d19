use std::collections::VecDeque;

use eframe::egui;

use crate::api::TransportAlert;

/// Shows transport alerts one at a time; the next queued alert opens once the
/// current one is dismissed.
pub struct ErrorModal {
    current: Option<TransportAlert>,
    queue: VecDeque<TransportAlert>,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self { current: None, queue: VecDeque::new() }
    }

    pub fn push(&mut self, alert: TransportAlert) {
        if self.current.as_ref() == Some(&alert) || self.queue.contains(&alert) {
            return;
        }
        if self.current.is_none() {
            self.current = Some(alert);
        } else {
            self.queue.push_back(alert);
        }
    }

    pub fn show_error(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        details: Option<impl Into<String>>,
    ) {
        self.push(TransportAlert {
            title: title.into(),
            message: message.into(),
            details: details.map(|d| d.into()),
        });
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    fn dismiss(&mut self) {
        self.current = self.queue.pop_front();
    }

    /// Returns true on the frame the visible alert was closed.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let Some(alert) = &self.current else {
            return false;
        };

        let modal = egui::Modal::new(egui::Id::new("error_modal")).show(ctx, |ui| {
            ui.set_width(450.0);

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("⚠").size(24.0).color(egui::Color32::RED));
                ui.label(egui::RichText::new(&alert.title).size(18.0).strong());
            });

            ui.add_space(10.0);
            ui.label(egui::RichText::new(&alert.message).size(14.0));

            if let Some(details) = &alert.details {
                ui.add_space(10.0);
                ui.collapsing("Technical Details", |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut details.as_str())
                            .desired_width(f32::INFINITY)
                            .desired_rows(4)
                            .code_editor(),
                    );
                });
            }

            if !self.queue.is_empty() {
                ui.add_space(5.0);
                ui.weak(format!("{} more pending", self.queue.len()));
            }

            ui.add_space(15.0);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("OK").clicked() {
                    ui.close();
                }
            });
        });

        if modal.should_close() {
            self.dismiss();
            return true;
        }

        false
    }
}

impl Default for ErrorModal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(title: &str) -> TransportAlert {
        TransportAlert { title: title.to_string(), message: "m".to_string(), details: None }
    }

    #[test]
    fn alerts_are_shown_in_order() {
        let mut modal = ErrorModal::new();
        modal.push(alert("API Unavailable"));
        modal.push(alert("Request Timed Out"));
        modal.push(alert("Request Timed Out"));

        assert_eq!(modal.current.as_ref().map(|a| a.title.as_str()), Some("API Unavailable"));
        assert_eq!(modal.queue.len(), 1);

        modal.dismiss();
        assert_eq!(modal.current.as_ref().map(|a| a.title.as_str()), Some("Request Timed Out"));

        modal.dismiss();
        assert!(!modal.is_open());
    }

    #[test]
    fn repeated_alert_is_not_stacked() {
        let mut modal = ErrorModal::new();
        modal.push(alert("API Unavailable"));
        modal.push(alert("API Unavailable"));

        assert!(modal.queue.is_empty());
    }
}
