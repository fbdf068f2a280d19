use eframe::egui;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;

use super::{
    settle,
    widgets,
    PageContext,
};
use crate::{
    gui::table::record_table,
    models::{
        EntityKind,
        Subject,
        Teacher,
    },
    workflow::{
        date_portion,
        options_for,
        ChangeSet,
        Submission,
        CREATED,
        UPDATED,
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherForm {
    pub name: String,
    pub email: String,
    pub subject_ids: Vec<i64>,
}

impl TeacherForm {
    fn from_teacher(teacher: &Teacher) -> Self {
        Self {
            name: teacher.name.clone(),
            email: teacher.email.clone(),
            subject_ids: sorted(teacher.assigned_subjects.iter().map(|s| s.subid).collect()),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TeachersPage {
    pub create_form: TeacherForm,
    pub selected: Option<i64>,
    pub update_form: TeacherForm,
    #[serde(skip)]
    synced: Option<i64>,
}

fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn conflict_message(email: &str) -> String {
    format!("Teacher with email '{email}' already exists.")
}

impl TeachersPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>) {
        let name = self.create_form.name.trim().to_string();
        let email = self.create_form.email.trim().to_string();
        if name.is_empty() || email.is_empty() {
            ctx.notices.warning("Please enter teacher name and email.");
            return;
        }

        let payload = json!({
            "name": name,
            "email": email,
            "subjectIds": sorted(self.create_form.subject_ids.clone()),
        });
        let response = ctx.api.post(EntityKind::Teacher.endpoint(), &payload);
        let created = settle(
            ctx,
            EntityKind::Teacher,
            "add",
            Submission::interpret(&response, CREATED),
            |_| format!("Teacher '{name}' added successfully!"),
            || conflict_message(&email),
        );

        if created {
            self.create_form = TeacherForm::default();
        }
    }

    pub fn sync_update_form(&mut self, teachers: &[Teacher]) {
        if self.synced == self.selected {
            return;
        }
        self.synced = self.selected;
        self.update_form = self
            .selected
            .and_then(|id| teachers.iter().find(|t| t.teachid == id))
            .map(TeacherForm::from_teacher)
            .unwrap_or_default();
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, teachers: &[Teacher]) {
        let Some(current) = self.selected.and_then(|id| teachers.iter().find(|t| t.teachid == id))
        else {
            ctx.notices.warning("Please select a teacher to update.");
            return;
        };
        let teachid = current.teachid;

        let name = self.update_form.name.trim().to_string();
        let email = self.update_form.email.trim().to_string();
        if name.is_empty() || email.is_empty() {
            ctx.notices.warning("Please enter teacher name and email.");
            return;
        }

        let original = TeacherForm::from_teacher(current);
        let changes = ChangeSet::new()
            .field("name", original.name.as_str(), name.as_str())
            .field("email", original.email.as_str(), email.as_str())
            .field("subjectIds", &original.subject_ids, &sorted(self.update_form.subject_ids.clone()));
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response =
            ctx.api.put(&EntityKind::Teacher.item_endpoint(teachid), &changes.into_payload());
        let updated = settle(
            ctx,
            EntityKind::Teacher,
            "update",
            Submission::interpret(&response, UPDATED),
            |_| format!("Teacher '{name}' updated successfully!"),
            || conflict_message(&email),
        );

        if updated {
            self.synced = None;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage Teachers");

        let subjects: Vec<Subject> = ctx.fetch_all();
        let teachers: Vec<Teacher> = ctx.fetch_all();
        let subject_options = options_for(&subjects);

        widgets::section(ui, "All Teachers");
        let rows: Vec<Vec<String>> = teachers
            .iter()
            .map(|t| {
                let assigned = t.assigned_subjects.iter().map(|s| s.subname.as_str()).collect::<Vec<_>>();
                vec![
                    t.teachid.to_string(),
                    t.name.clone(),
                    t.email.clone(),
                    if assigned.is_empty() { "N/A".to_string() } else { assigned.join(", ") },
                    date_portion(t.created_at.as_deref()),
                    date_portion(t.last_login.as_deref()),
                ]
            })
            .collect();
        record_table(
            ui,
            EntityKind::Teacher,
            &["ID", "Name", "Email", "Assigned Subjects", "Created At", "Last Login"],
            &rows,
        );

        widgets::section(ui, "Add New Teacher");
        widgets::text_field(ui, "Teacher Name", &mut self.create_form.name);
        widgets::text_field(ui, "Teacher Email", &mut self.create_form.email);
        widgets::multi_select(
            ui,
            "create_teacher_subjects",
            "Assign Subjects (optional)",
            &subject_options,
            &mut self.create_form.subject_ids,
        );
        if ui.button("Add Teacher").clicked() {
            self.create(ctx);
        }

        widgets::section(ui, "Update Existing Teacher");
        let teacher_options = options_for(&teachers);
        if teacher_options.is_empty() {
            widgets::info(ui, "No teachers available to update.");
            return;
        }
        widgets::select(ui, "update_teacher", "Select Teacher", &teacher_options, &mut self.selected);
        self.sync_update_form(&teachers);
        widgets::text_field(ui, "New Teacher Name", &mut self.update_form.name);
        widgets::text_field(ui, "New Teacher Email", &mut self.update_form.email);
        widgets::multi_select(
            ui,
            "update_teacher_subjects",
            "Update Assigned Subjects (optional)",
            &subject_options,
            &mut self.update_form.subject_ids,
        );
        if ui.button("Update Teacher").clicked() {
            self.update(ctx, &teachers);
        }
    }
}
