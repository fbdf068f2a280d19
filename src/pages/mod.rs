//! One controller per managed entity. Each page owns its own slice of view state and
//! follows the same List / Create / Update / Delete layout.

mod gurukuls;
mod milestones;
mod offerings;
mod students;
mod subjects;
mod teachers;
mod topics;
mod users;
pub mod widgets;

use eframe::egui;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use tracing::{
    info,
    warn,
};

pub use gurukuls::GurukulsPage;
pub use milestones::MilestonesPage;
pub use offerings::OfferingsPage;
pub use students::StudentsPage;
pub use subjects::SubjectsPage;
pub use teachers::TeachersPage;
pub use topics::TopicsPage;
pub use users::UsersPage;

use crate::{
    api::{
        ApiClient,
        ReferenceData,
    },
    models::{
        Entity,
        EntityKind,
    },
    workflow::{
        DeleteConfirmation,
        Notices,
        Submission,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Home,
    Gurukuls,
    Offerings,
    Milestones,
    Subjects,
    Topics,
    Users,
    Teachers,
    Students,
}

impl Page {
    /// Sidebar groups, in display order.
    pub const CATALOG: [Page; 5] =
        [Page::Gurukuls, Page::Offerings, Page::Milestones, Page::Subjects, Page::Topics];
    pub const PEOPLE: [Page; 3] = [Page::Users, Page::Teachers, Page::Students];

    pub fn nav_label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Gurukuls => "Manage Gurukuls",
            Page::Offerings => "Manage Gurukul Offerings",
            Page::Milestones => "Manage Milestones",
            Page::Subjects => "Manage Subjects",
            Page::Topics => "Manage Topics",
            Page::Users => "Manage All Users",
            Page::Teachers => "Manage Teachers",
            Page::Students => "Manage Students",
        }
    }
}

/// Everything the shell keeps between frames about what is on screen.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub current: Page,
    pub gurukuls: GurukulsPage,
    pub offerings: OfferingsPage,
    pub milestones: MilestonesPage,
    pub subjects: SubjectsPage,
    pub topics: TopicsPage,
    pub users: UsersPage,
    pub teachers: TeachersPage,
    pub students: StudentsPage,
}

impl ViewState {
    /// Switches page. Notices belong to the page they were raised on.
    pub fn navigate(&mut self, page: Page, notices: &mut Notices) {
        if self.current != page {
            info!(?page, "navigate");
            notices.clear();
            self.current = page;
        }
    }

    pub fn show_current(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        match self.current {
            Page::Home => show_home(ui),
            Page::Gurukuls => self.gurukuls.ui(ui, ctx),
            Page::Offerings => self.offerings.ui(ui, ctx),
            Page::Milestones => self.milestones.ui(ui, ctx),
            Page::Subjects => self.subjects.ui(ui, ctx),
            Page::Topics => self.topics.ui(ui, ctx),
            Page::Users => self.users.ui(ui, ctx),
            Page::Teachers => self.teachers.ui(ui, ctx),
            Page::Students => self.students.ui(ui, ctx),
        }
    }
}

fn show_home(ui: &mut egui::Ui) {
    ui.heading("Welcome to the Gurukul Admin UI!");
    ui.add_space(8.0);
    widgets::info(ui, "Select a management section from the sidebar to get started.");
}

/// What a page needs from the shell while it handles one frame.
pub struct PageContext<'a> {
    pub api: &'a ApiClient,
    pub reference: &'a mut ReferenceData,
    pub notices: &'a mut Notices,
}

impl PageContext<'_> {
    pub fn fetch_all<T: Entity>(&mut self) -> Vec<T> {
        self.reference.fetch_all(self.api, self.notices)
    }

    /// The backend changed; every cached collection is stale.
    pub fn mutated(&mut self) {
        self.reference.invalidate_all();
    }
}

/// Reports a mutation outcome and invalidates the cache on success.
pub(crate) fn settle(
    ctx: &mut PageContext<'_>,
    kind: EntityKind,
    action: &str,
    submission: Submission,
    success: impl FnOnce(&Value) -> String,
    conflict: impl FnOnce() -> String,
) -> bool {
    match submission {
        Submission::Succeeded(body) => {
            info!(entity = %kind, action, "mutation succeeded");
            ctx.notices.success(success(&body));
            ctx.mutated();
            true
        }
        Submission::Conflict => {
            warn!(entity = %kind, action, "mutation conflict");
            ctx.notices.warning(conflict());
            false
        }
        Submission::Rejected(message) => {
            warn!(entity = %kind, action, %message, "mutation rejected");
            ctx.notices.error(format!(
                "Failed to {} {}: {}",
                action,
                kind.to_string().to_lowercase(),
                message
            ));
            false
        }
    }
}

/// Second step of a delete. Sends nothing unless `selected` is the pending id.
pub(crate) fn confirm_delete(
    ctx: &mut PageContext<'_>,
    confirmation: &mut DeleteConfirmation,
    selected: Option<i64>,
    kind: EntityKind,
) -> bool {
    let Some(id) = selected else {
        return false;
    };
    let Some(submission) = confirmation.confirm(selected, ctx.api, kind) else {
        return false;
    };

    settle(
        ctx,
        kind,
        "delete",
        submission,
        |_| format!("{kind} ID {id} deleted successfully!"),
        || format!("{kind} ID {id} is still referenced and cannot be deleted."),
    )
}

/// Id field of a created record, for success messages.
pub(crate) fn created_id(body: &Value, key: &str) -> String {
    body.get(key).and_then(Value::as_i64).map_or_else(|| "?".to_string(), |id| id.to_string())
}

#[cfg(test)]
pub(crate) mod harness {
    use std::time::Duration;

    use eframe::egui;

    use super::PageContext;
    use crate::{
        api::{
            testing::ScriptedTransport,
            ApiClient,
            ReferenceData,
        },
        workflow::Notices,
    };

    /// A page context wired to a scripted transport.
    pub struct Harness {
        pub transport: ScriptedTransport,
        pub api: ApiClient,
        pub reference: ReferenceData,
        pub notices: Notices,
    }

    impl Harness {
        pub fn new() -> Self {
            let transport = ScriptedTransport::new();
            let api = ApiClient::with_transport("http://localhost:5002", transport.clone());
            Self {
                transport,
                api,
                reference: ReferenceData::new(Duration::from_secs(60)),
                notices: Notices::new(),
            }
        }

        pub fn ctx(&mut self) -> PageContext<'_> {
            PageContext { api: &self.api, reference: &mut self.reference, notices: &mut self.notices }
        }

        pub fn last_notice(&self) -> Option<(crate::workflow::NoticeLevel, String)> {
            self.notices.last().map(|n| (n.level, n.text.clone()))
        }

        /// Runs one headless frame of `page_ui` and returns all text it painted.
        pub fn render(
            &mut self,
            mut page_ui: impl FnMut(&mut egui::Ui, &mut PageContext<'_>),
        ) -> String {
            let egui_ctx = egui::Context::default();
            let output = egui_ctx.run(egui::RawInput::default(), |egui_ctx| {
                egui::CentralPanel::default().show(egui_ctx, |ui| {
                    let mut ctx = self.ctx();
                    page_ui(ui, &mut ctx);
                });
            });

            let mut texts = Vec::new();
            for clipped in &output.shapes {
                collect_text(&clipped.shape, &mut texts);
            }
            texts.join("\n")
        }
    }

    fn collect_text(shape: &egui::Shape, texts: &mut Vec<String>) {
        match shape {
            egui::Shape::Text(text) => texts.push(text.galley.text().to_string()),
            egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| collect_text(s, texts)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::Method;

    #[test]
    fn navigation_clears_notices_only_on_page_change() {
        let mut view = ViewState::default();
        let mut notices = Notices::new();
        notices.error("Failed to fetch topics: Unknown error");

        view.navigate(Page::Home, &mut notices);
        assert!(!notices.is_empty());

        view.navigate(Page::Topics, &mut notices);
        assert!(notices.is_empty());
        assert_eq!(view.current, Page::Topics);
    }

    #[test]
    fn restored_view_has_no_pending_delete() {
        let mut h = harness::Harness::new();
        h.transport.reply(Method::Delete, "/topics/12", 200, serde_json::json!({}));

        let mut view = ViewState::default();
        view.current = Page::Topics;
        view.topics.delete_selected = Some(12);
        view.topics.confirmation.request(12);

        let saved = serde_json::to_string(&view).unwrap();
        let mut restored: ViewState = serde_json::from_str(&saved).unwrap();
        assert_eq!(restored.current, Page::Topics);
        assert_eq!(restored.topics.delete_selected, Some(12));
        assert_eq!(restored.topics.confirmation.pending(), None);

        let deleted = confirm_delete(
            &mut h.ctx(),
            &mut restored.topics.confirmation,
            restored.topics.delete_selected,
            EntityKind::Topic,
        );
        assert!(!deleted);
        assert!(h.transport.requests_with(Method::Delete).is_empty());
    }

    #[test]
    fn sidebar_labels_match_sections() {
        let labels: Vec<&str> = Page::CATALOG.iter().chain(Page::PEOPLE.iter()).map(Page::nav_label).collect();
        assert_eq!(
            labels,
            vec![
                "Manage Gurukuls",
                "Manage Gurukul Offerings",
                "Manage Milestones",
                "Manage Subjects",
                "Manage Topics",
                "Manage All Users",
                "Manage Teachers",
                "Manage Students",
            ]
        );
    }
}
