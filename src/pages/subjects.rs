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
        all_levels,
        EntityKind,
        Subject,
    },
    workflow::{
        options_with,
        ChangeSet,
        DeleteConfirmation,
        Submission,
        CREATED,
        UPDATED,
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectForm {
    pub subname: String,
    pub level: String,
    pub image_url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubjectsPage {
    pub create_form: SubjectForm,
    pub selected: Option<i64>,
    pub update_form: SubjectForm,
    #[serde(skip)]
    synced: Option<i64>,
    pub delete_selected: Option<i64>,
    pub confirmation: DeleteConfirmation,
}

fn duplicate_message(subname: &str, level: &str) -> String {
    format!("Subject '{subname}' with level '{level}' already exists.")
}

fn exists(subjects: &[Subject], subname: &str, level: &str, except: Option<i64>) -> bool {
    subjects.iter().any(|s| {
        s.subname == subname && s.level.as_deref() == Some(level) && Some(s.subid) != except
    })
}

impl SubjectsPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>, subjects: &[Subject]) {
        let subname = self.create_form.subname.trim().to_string();
        let level = self.create_form.level.clone();
        if subname.is_empty() {
            ctx.notices.warning("Please enter a subject name.");
            return;
        }
        if !all_levels().any(|l| l == level) {
            ctx.notices.warning("Please select a level.");
            return;
        }
        if exists(subjects, &subname, &level, None) {
            ctx.notices.warning(duplicate_message(&subname, &level));
            return;
        }

        let mut payload = json!({ "subname": subname, "level": level });
        let image_url = self.create_form.image_url.trim();
        if !image_url.is_empty() {
            payload["image_url"] = json!(image_url);
        }

        let response = ctx.api.post(EntityKind::Subject.endpoint(), &payload);
        if settle(
            ctx,
            EntityKind::Subject,
            "create",
            Submission::interpret(&response, CREATED),
            |body| {
                format!(
                    "Subject '{}' (ID: {}) created successfully at level {}!",
                    subname,
                    created_id(body, "subid"),
                    level
                )
            },
            || duplicate_message(&subname, &level),
        ) {
            self.create_form = SubjectForm { level, ..SubjectForm::default() };
        }
    }

    pub fn sync_update_form(&mut self, subjects: &[Subject]) {
        if self.synced == self.selected {
            return;
        }
        self.synced = self.selected;
        self.update_form = self
            .selected
            .and_then(|subid| subjects.iter().find(|s| s.subid == subid))
            .map(|s| SubjectForm {
                subname: s.subname.clone(),
                level: s.level.clone().unwrap_or_default(),
                image_url: s.image_url.clone().unwrap_or_default(),
            })
            .unwrap_or_default();
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, subjects: &[Subject]) {
        let Some(current) = self.selected.and_then(|subid| subjects.iter().find(|s| s.subid == subid))
        else {
            ctx.notices.warning("Please select a subject to update.");
            return;
        };
        let subid = current.subid;

        let subname = self.update_form.subname.trim().to_string();
        let level = self.update_form.level.clone();
        if subname.is_empty() {
            ctx.notices.warning("Subject name cannot be empty.");
            return;
        }
        if exists(subjects, &subname, &level, Some(subid)) {
            ctx.notices.warning(duplicate_message(&subname, &level));
            return;
        }

        let changes = ChangeSet::new()
            .field("subname", current.subname.as_str(), subname.as_str())
            .field("level", current.level.as_deref().unwrap_or(""), level.as_str())
            .field(
                "image_url",
                current.image_url.as_deref().unwrap_or(""),
                self.update_form.image_url.trim(),
            )
            .always("level", &level);
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response = ctx.api.put(&EntityKind::Subject.item_endpoint(subid), &changes.into_payload());
        if settle(
            ctx,
            EntityKind::Subject,
            "update",
            Submission::interpret(&response, UPDATED),
            |_| format!("Subject ID {subid} updated successfully!"),
            || duplicate_message(&subname, &level),
        ) {
            self.synced = None;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage Subjects");

        let subjects: Vec<Subject> = ctx.fetch_all();
        let levels: Vec<&str> = all_levels().collect();
        let options = options_with(&subjects, |s| {
            format!("{} [{}] (ID: {})", s.subname, s.level.as_deref().unwrap_or("-"), s.subid)
        });

        widgets::section(ui, "All Subjects");
        let rows: Vec<Vec<String>> = subjects
            .iter()
            .map(|s| {
                vec![
                    s.subid.to_string(),
                    s.subname.clone(),
                    s.level.clone().unwrap_or_default(),
                    s.image_url.clone().unwrap_or_default(),
                ]
            })
            .collect();
        record_table(ui, EntityKind::Subject, &["ID", "Subject Name", "Level", "Image URL"], &rows);

        widgets::section(ui, "Create New Subject");
        widgets::text_field(ui, "Subject Name", &mut self.create_form.subname);
        widgets::choice(ui, "create_subject_level", "Level", &levels, &mut self.create_form.level);
        widgets::text_field(ui, "Image URL (optional)", &mut self.create_form.image_url);
        if ui.button("Create Subject").clicked() {
            self.create(ctx, &subjects);
        }

        widgets::section(ui, "Update Existing Subject");
        if options.is_empty() {
            widgets::info(ui, "No subjects available to update.");
        } else {
            widgets::select(ui, "update_subject", "Select Subject", &options, &mut self.selected);
            self.sync_update_form(&subjects);
            widgets::text_field(ui, "New Subject Name", &mut self.update_form.subname);
            widgets::choice(ui, "update_subject_level", "Level", &levels, &mut self.update_form.level);
            widgets::text_field(ui, "New Image URL (optional)", &mut self.update_form.image_url);
            if ui.button("Update Subject").clicked() {
                self.update(ctx, &subjects);
            }
        }

        widgets::section(ui, "Delete Subject");
        widgets::delete_section(
            ui,
            ctx,
            EntityKind::Subject,
            &options,
            &mut self.delete_selected,
            &mut self.confirmation,
            Some("All topics of this subject will be deleted as well."),
        );
    }
}
