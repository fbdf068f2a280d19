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
        Gurukul,
        Milestone,
        Offering,
        Student,
    },
    workflow::{
        options_for,
        ChangeSet,
        SelectOption,
        Submission,
        CREATED,
        UPDATED,
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentForm {
    pub sname: String,
    pub email: String,
    pub gurukul_id: Option<i64>,
    pub milestone_id: Option<i64>,
}

impl StudentForm {
    fn from_student(student: &Student) -> Self {
        Self {
            sname: student.sname.clone(),
            email: student.email.clone(),
            gurukul_id: student.assigned_gurukuls.first().map(|g| g.gid),
            milestone_id: student.assigned_milestones.first().map(|m| m.mid),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StudentsPage {
    pub create_form: StudentForm,
    pub selected: Option<i64>,
    pub update_form: StudentForm,
    #[serde(skip)]
    synced: Option<i64>,
}

fn conflict_message(email: &str) -> String {
    format!("Student with email '{email}' already exists.")
}

/// Milestones offered by the chosen gurukul, or all of them when none is chosen.
pub(crate) fn milestone_options(
    milestones: &[Milestone],
    offerings: &[Offering],
    gurukul_id: Option<i64>,
) -> Vec<SelectOption> {
    let Some(gid) = gurukul_id else {
        return options_for(milestones);
    };
    let scoped: Vec<Milestone> = milestones
        .iter()
        .filter(|m| offerings.iter().any(|o| o.oid == m.oid && o.gid == gid))
        .cloned()
        .collect();
    options_for(&scoped)
}

impl StudentsPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>) {
        let sname = self.create_form.sname.trim().to_string();
        let email = self.create_form.email.trim().to_string();
        if sname.is_empty() || email.is_empty() {
            ctx.notices.warning("Please enter student name and email.");
            return;
        }

        let mut payload = json!({ "sname": sname, "email": email });
        if let Some(gid) = self.create_form.gurukul_id {
            payload["gurukulId"] = json!(gid);
        }
        if let Some(mid) = self.create_form.milestone_id {
            payload["milestoneId"] = json!(mid);
        }

        let response = ctx.api.post(EntityKind::Student.endpoint(), &payload);
        let created = settle(
            ctx,
            EntityKind::Student,
            "add",
            Submission::interpret(&response, CREATED),
            |_| format!("Student '{sname}' added successfully!"),
            || conflict_message(&email),
        );

        if created {
            self.create_form = StudentForm::default();
        }
    }

    pub fn sync_update_form(&mut self, students: &[Student]) {
        if self.synced == self.selected {
            return;
        }
        self.synced = self.selected;
        self.update_form = self
            .selected
            .and_then(|id| students.iter().find(|s| s.sid == id))
            .map(StudentForm::from_student)
            .unwrap_or_default();
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, students: &[Student]) {
        let Some(current) = self.selected.and_then(|id| students.iter().find(|s| s.sid == id)) else {
            ctx.notices.warning("Please select a student to update.");
            return;
        };
        let sid = current.sid;

        let sname = self.update_form.sname.trim().to_string();
        let email = self.update_form.email.trim().to_string();
        if sname.is_empty() || email.is_empty() {
            ctx.notices.warning("Please enter student name and email.");
            return;
        }

        let original = StudentForm::from_student(current);
        let changes = ChangeSet::new()
            .field("sname", original.sname.as_str(), sname.as_str())
            .field("email", original.email.as_str(), email.as_str())
            .field("gurukulId", &original.gurukul_id, &self.update_form.gurukul_id)
            .field("milestoneId", &original.milestone_id, &self.update_form.milestone_id);
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response =
            ctx.api.put(&EntityKind::Student.item_endpoint(sid), &changes.into_payload());
        let updated = settle(
            ctx,
            EntityKind::Student,
            "update",
            Submission::interpret(&response, UPDATED),
            |_| format!("Student '{sname}' updated successfully!"),
            || conflict_message(&email),
        );

        if updated {
            self.synced = None;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage Students");

        let gurukuls: Vec<Gurukul> = ctx.fetch_all();
        let offerings: Vec<Offering> = ctx.fetch_all();
        let milestones: Vec<Milestone> = ctx.fetch_all();
        let students: Vec<Student> = ctx.fetch_all();
        let gurukul_options = options_for(&gurukuls);

        widgets::section(ui, "All Students");
        let rows: Vec<Vec<String>> = students
            .iter()
            .map(|s| {
                vec![
                    s.sid.to_string(),
                    s.sname.clone(),
                    s.email.clone(),
                    join_or_na(s.assigned_gurukuls.iter().map(|g| g.gname.clone())),
                    join_or_na(
                        s.assigned_milestones.iter().map(|m| format!("Class {} - {}", m.class, m.level)),
                    ),
                ]
            })
            .collect();
        record_table(
            ui,
            EntityKind::Student,
            &["ID", "Name", "Email", "Gurukuls", "Milestones"],
            &rows,
        );

        widgets::section(ui, "Add New Student");
        widgets::text_field(ui, "Student Name", &mut self.create_form.sname);
        widgets::text_field(ui, "Student Email", &mut self.create_form.email);
        widgets::select_optional(
            ui,
            "create_student_gurukul",
            "Gurukul (optional)",
            &gurukul_options,
            &mut self.create_form.gurukul_id,
        );
        widgets::select_optional(
            ui,
            "create_student_milestone",
            "Milestone (optional)",
            &milestone_options(&milestones, &offerings, self.create_form.gurukul_id),
            &mut self.create_form.milestone_id,
        );
        if ui.button("Add Student").clicked() {
            self.create(ctx);
        }

        widgets::section(ui, "Update Existing Student");
        let student_options = options_for(&students);
        if student_options.is_empty() {
            widgets::info(ui, "No students available to update.");
            return;
        }
        widgets::select(ui, "update_student", "Select Student", &student_options, &mut self.selected);
        self.sync_update_form(&students);
        widgets::text_field(ui, "New Student Name", &mut self.update_form.sname);
        widgets::text_field(ui, "New Student Email", &mut self.update_form.email);
        widgets::select_optional(
            ui,
            "update_student_gurukul",
            "Gurukul",
            &gurukul_options,
            &mut self.update_form.gurukul_id,
        );
        widgets::select_optional(
            ui,
            "update_student_milestone",
            "Milestone",
            &milestone_options(&milestones, &offerings, self.update_form.gurukul_id),
            &mut self.update_form.milestone_id,
        );
        if ui.button("Update Student").clicked() {
            self.update(ctx, &students);
        }
    }
}

pub(crate) fn join_or_na(items: impl Iterator<Item = String>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "N/A".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        api::Method,
        models::AssignedGurukul,
        pages::harness::Harness,
        workflow::NoticeLevel,
    };

    fn student(sid: i64, gid: Option<i64>) -> Student {
        Student {
            sid,
            sname: "Meera".into(),
            email: "meera@example.com".into(),
            assigned_gurukuls: gid
                .map(|gid| AssignedGurukul { gid, gname: "North".into(), status: None })
                .into_iter()
                .collect(),
            assigned_milestones: vec![],
        }
    }

    #[test]
    fn create_omits_unset_assignments() {
        let mut h = Harness::new();
        h.transport.reply(Method::Post, "/students", 201, json!({ "sid": 9 }));
        let mut page = StudentsPage::default();
        page.create_form = StudentForm {
            sname: "Meera".into(),
            email: "meera@example.com".into(),
            gurukul_id: Some(2),
            milestone_id: None,
        };

        page.create(&mut h.ctx());

        assert_eq!(
            h.transport.requests()[0].payload,
            Some(json!({ "sname": "Meera", "email": "meera@example.com", "gurukulId": 2 }))
        );
    }

    #[test]
    fn clearing_gurukul_sends_null() {
        let mut h = Harness::new();
        h.transport.reply(Method::Put, "/students/4", 200, json!({ "sid": 4 }));
        let students = vec![student(4, Some(2))];
        let mut page = StudentsPage::default();
        page.selected = Some(4);
        page.sync_update_form(&students);
        page.update_form.gurukul_id = None;

        page.update(&mut h.ctx(), &students);

        assert_eq!(h.transport.requests()[0].payload, Some(json!({ "gurukulId": null })));
    }

    #[test]
    fn duplicate_email_is_a_warning() {
        let mut h = Harness::new();
        h.transport.reply(Method::Post, "/students", 409, json!({ "message": "dup" }));
        let mut page = StudentsPage::default();
        page.create_form.sname = "Meera".into();
        page.create_form.email = "taken@example.com".into();

        page.create(&mut h.ctx());

        assert_eq!(
            h.last_notice(),
            Some((NoticeLevel::Warning, "Student with email 'taken@example.com' already exists.".to_string()))
        );
        assert_eq!(page.create_form.email, "taken@example.com");
    }

    #[test]
    fn milestone_choices_follow_gurukul() {
        let offerings = vec![
            Offering { oid: 1, gid: 2, gtype: "G1".into() },
            Offering { oid: 5, gid: 3, gtype: "G2".into() },
        ];
        let milestones = vec![
            Milestone { mid: 10, class: 1, level: "L1".into(), oid: 1 },
            Milestone { mid: 11, class: 5, level: "L5".into(), oid: 5 },
        ];

        let scoped = milestone_options(&milestones, &offerings, Some(3));
        assert_eq!(scoped.iter().map(|o| o.value).collect::<Vec<_>>(), vec![11]);
        assert_eq!(milestone_options(&milestones, &offerings, None).len(), 2);
    }
}
