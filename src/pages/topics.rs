use eframe::egui;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;

use super::{
    created_id,
    settle,
    widgets,
    PageContext,
};
use crate::{
    gui::table::record_table,
    models::{
        Entity,
        EntityKind,
        Subject,
        Topic,
    },
    workflow::{
        name_taken,
        options_for,
        options_with,
        ChangeSet,
        DeleteConfirmation,
        Submission,
        CREATED,
        UPDATED,
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicForm {
    pub tname: String,
    pub subid: Option<i64>,
    pub image_url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TopicsPage {
    pub create_form: TopicForm,
    pub update_subject: Option<i64>,
    pub update_topic: Option<i64>,
    pub update_form: TopicForm,
    /// Topic whose values are currently loaded into `update_form`.
    #[serde(skip)]
    synced: Option<i64>,
    pub delete_selected: Option<i64>,
    pub confirmation: DeleteConfirmation,
}

/// Info shown instead of the create and update forms while no subject exists.
pub(crate) fn missing_subjects(subjects: &[Subject]) -> Option<&'static str> {
    subjects.is_empty().then_some("No Subjects available. Please create Subjects first.")
}

fn duplicate_message(tname: &str) -> String {
    format!("Topic '{tname}' already exists for this subject. Please choose a different name.")
}

impl TopicsPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>, topics: &[Topic]) {
        let tname = self.create_form.tname.trim().to_string();
        let Some(subid) = self.create_form.subid else {
            ctx.notices.warning("Please select a subject for the topic.");
            return;
        };
        if tname.is_empty() {
            ctx.notices.warning("Please enter a topic name.");
            return;
        }

        let siblings = topics.iter().filter(|t| t.subid == subid).map(|t| t.tname.as_str());
        if name_taken(siblings, &tname) {
            ctx.notices.warning(duplicate_message(&tname));
            return;
        }

        let mut payload = json!({ "tname": tname, "subid": subid });
        let image_url = self.create_form.image_url.trim();
        if !image_url.is_empty() {
            payload["image_url"] = json!(image_url);
        }

        let response = ctx.api.post(EntityKind::Topic.endpoint(), &payload);
        let created = settle(
            ctx,
            EntityKind::Topic,
            "create",
            Submission::interpret(&response, CREATED),
            |body| {
                format!(
                    "Topic '{}' (ID: {}) created successfully for Subject ID {}!",
                    tname,
                    created_id(body, "tid"),
                    subid
                )
            },
            || duplicate_message(&tname),
        );

        if created {
            self.create_form = TopicForm { subid: Some(subid), ..TopicForm::default() };
        }
    }

    /// Loads the selected topic into the update form when the selection changes.
    pub fn sync_update_form(&mut self, topics: &[Topic]) {
        if self.synced == self.update_topic {
            return;
        }
        self.synced = self.update_topic;
        self.update_form = match self.update_topic.and_then(|tid| topics.iter().find(|t| t.tid == tid)) {
            Some(topic) => TopicForm {
                tname: topic.tname.clone(),
                subid: Some(topic.subid),
                image_url: topic.image_url.clone().unwrap_or_default(),
            },
            None => TopicForm::default(),
        };
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, topics: &[Topic]) {
        let Some(current) = self.update_topic.and_then(|tid| topics.iter().find(|t| t.tid == tid))
        else {
            ctx.notices.warning("Please select a topic to update.");
            return;
        };
        let tid = current.tid;

        let tname = self.update_form.tname.trim().to_string();
        if tname.is_empty() {
            ctx.notices.warning("Topic name cannot be empty.");
            return;
        }

        let siblings = topics
            .iter()
            .filter(|t| t.subid == current.subid && t.tid != tid)
            .map(|t| t.tname.as_str());
        if name_taken(siblings, &tname) {
            ctx.notices.warning(duplicate_message(&tname));
            return;
        }

        let changes = ChangeSet::new()
            .field("tname", current.tname.as_str(), tname.as_str())
            .field(
                "image_url",
                current.image_url.as_deref().unwrap_or(""),
                self.update_form.image_url.trim(),
            )
            .always("subid", &current.subid);
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response = ctx.api.put(&EntityKind::Topic.item_endpoint(tid), &changes.into_payload());
        let updated = settle(
            ctx,
            EntityKind::Topic,
            "update",
            Submission::interpret(&response, UPDATED),
            |_| format!("Topic ID {tid} updated successfully!"),
            || duplicate_message(&tname),
        );

        if updated {
            self.synced = None;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage Topics");

        let subjects: Vec<Subject> = ctx.fetch_all();
        let topics: Vec<Topic> = ctx.fetch_all();
        let subject_options = options_for(&subjects);

        widgets::section(ui, "All Topics");
        let rows: Vec<Vec<String>> = topics
            .iter()
            .map(|t| {
                vec![
                    t.tid.to_string(),
                    t.tname.clone(),
                    subject_name(&subjects, t.subid),
                    t.subid.to_string(),
                    t.image_url.clone().unwrap_or_default(),
                ]
            })
            .collect();
        record_table(ui, EntityKind::Topic, &["ID", "Topic Name", "Subject", "Subject ID", "Image URL"], &rows);

        let missing = missing_subjects(&subjects);

        widgets::section(ui, "Create New Topic");
        if let Some(message) = missing {
            widgets::info(ui, message);
        } else {
            widgets::text_field(ui, "Topic Name", &mut self.create_form.tname);
            widgets::select(ui, "create_topic_subject", "Subject", &subject_options, &mut self.create_form.subid);
            widgets::text_field(ui, "Image URL (optional)", &mut self.create_form.image_url);
            if ui.button("Create Topic").clicked() {
                self.create(ctx, &topics);
            }
        }

        widgets::section(ui, "Update Existing Topic");
        if let Some(message) = missing {
            widgets::info(ui, message);
        } else {
            widgets::select(ui, "update_topic_subject", "Subject", &subject_options, &mut self.update_subject);
            let in_subject: Vec<Topic> =
                topics.iter().filter(|t| Some(t.subid) == self.update_subject).cloned().collect();
            let topic_options = options_for(&in_subject);

            if topic_options.is_empty() {
                widgets::info(ui, "No topics found for the selected subject.");
            } else {
                widgets::select(ui, "update_topic", "Topic", &topic_options, &mut self.update_topic);
                self.sync_update_form(&topics);
                widgets::text_field(ui, "New Topic Name", &mut self.update_form.tname);
                widgets::text_field(ui, "New Image URL (optional)", &mut self.update_form.image_url);
                if ui.button("Update Topic").clicked() {
                    self.update(ctx, &topics);
                }
            }
        }

        widgets::section(ui, "Delete Topic");
        let delete_options = options_with(&topics, |t| {
            format!("{} - {}", t.option_label(), subject_name(&subjects, t.subid))
        });
        widgets::delete_section(
            ui,
            ctx,
            EntityKind::Topic,
            &delete_options,
            &mut self.delete_selected,
            &mut self.confirmation,
            None,
        );
    }
}

fn subject_name(subjects: &[Subject], subid: i64) -> String {
    subjects
        .iter()
        .find(|s| s.subid == subid)
        .map(|s| s.subname.clone())
        .unwrap_or_else(|| "Unknown Subject".to_string())
}
