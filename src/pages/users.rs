use eframe::egui;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;

use super::{
    confirm_delete,
    settle,
    students::{
        join_or_na,
        milestone_options,
    },
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
        Subject,
        User,
        ROLES,
    },
    workflow::{
        date_portion,
        options_for,
        ChangeSet,
        DeleteConfirmation,
        Submission,
        CREATED,
        UPDATED,
    },
};

pub const ALL_ROLES: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    pub role: String,
    pub subject_ids: Vec<i64>,
    pub gurukul_id: Option<i64>,
    pub milestone_id: Option<i64>,
}

impl UserForm {
    fn from_user(user: &User) -> Self {
        let mut subject_ids: Vec<i64> = user.assigned_subjects.iter().map(|s| s.subid).collect();
        subject_ids.sort_unstable();
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            subject_ids,
            gurukul_id: user.assigned_gurukuls.first().map(|g| g.gid),
            milestone_id: user.assigned_milestones.first().map(|m| m.mid),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersPage {
    pub role_filter: String,
    pub create_form: UserForm,
    pub selected: Option<i64>,
    pub update_form: UserForm,
    #[serde(skip)]
    synced: Option<i64>,
    pub delete_selected: Option<i64>,
    pub confirmation: DeleteConfirmation,
}

impl Default for UsersPage {
    fn default() -> Self {
        Self {
            role_filter: ALL_ROLES.to_string(),
            create_form: UserForm::default(),
            selected: None,
            update_form: UserForm::default(),
            synced: None,
            delete_selected: None,
            confirmation: DeleteConfirmation::default(),
        }
    }
}

fn conflict_message(email: &str) -> String {
    format!("User with email '{email}' already exists.")
}

pub fn filter_by_role<'a>(users: &'a [User], role: &str) -> Vec<&'a User> {
    users.iter().filter(|u| role == ALL_ROLES || u.role == role).collect()
}

fn assignments(user: &User) -> String {
    match user.role.as_str() {
        "teacher" => join_or_na(user.assigned_subjects.iter().map(|s| s.subname.clone())),
        "student" => join_or_na(
            user.assigned_gurukuls
                .iter()
                .map(|g| g.gname.clone())
                .chain(user.assigned_milestones.iter().map(|m| format!("Class {} - {}", m.class, m.level))),
        ),
        _ => "N/A".to_string(),
    }
}

impl UsersPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>) {
        let username = self.create_form.username.trim().to_string();
        let email = self.create_form.email.trim().to_string();
        let role = self.create_form.role.clone();
        if username.is_empty() || email.is_empty() {
            ctx.notices.warning("Please enter username and email.");
            return;
        }
        if !ROLES.contains(&role.as_str()) {
            ctx.notices.warning("Please select a role.");
            return;
        }

        let mut payload = json!({ "username": username, "email": email, "role": role });
        if role == "teacher" {
            let mut subject_ids = self.create_form.subject_ids.clone();
            subject_ids.sort_unstable();
            payload["subject_ids"] = json!(subject_ids);
        } else {
            payload["gurukul_id"] = json!(self.create_form.gurukul_id);
            payload["milestone_id"] = json!(self.create_form.milestone_id);
        }

        let response = ctx.api.post(EntityKind::User.endpoint(), &payload);
        if settle(
            ctx,
            EntityKind::User,
            "create",
            Submission::interpret(&response, CREATED),
            |_| format!("User '{username}' created successfully as {role}!"),
            || conflict_message(&email),
        ) {
            self.create_form = UserForm { role, ..UserForm::default() };
        }
    }

    pub fn sync_update_form(&mut self, users: &[User]) {
        if self.synced == self.selected {
            return;
        }
        self.synced = self.selected;
        self.update_form = self
            .selected
            .and_then(|id| users.iter().find(|u| u.userid == id))
            .map(UserForm::from_user)
            .unwrap_or_default();
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, users: &[User]) {
        let Some(current) = self.selected.and_then(|id| users.iter().find(|u| u.userid == id)) else {
            ctx.notices.warning("Please select a user to update.");
            return;
        };
        let userid = current.userid;

        let username = self.update_form.username.trim().to_string();
        let email = self.update_form.email.trim().to_string();
        let role = self.update_form.role.clone();
        if username.is_empty() || email.is_empty() {
            ctx.notices.warning("Please enter username and email.");
            return;
        }

        let original = UserForm::from_user(current);
        let mut changes = ChangeSet::new()
            .field("username", original.username.as_str(), username.as_str())
            .field("email", original.email.as_str(), email.as_str())
            .field("role", original.role.as_str(), role.as_str());
        if role == "teacher" {
            let mut subject_ids = self.update_form.subject_ids.clone();
            subject_ids.sort_unstable();
            changes = changes.field("subject_ids", &original.subject_ids, &subject_ids);
        } else {
            changes = changes
                .field("gurukul_id", &original.gurukul_id, &self.update_form.gurukul_id)
                .field("milestone_id", &original.milestone_id, &self.update_form.milestone_id);
        }
        let changes = changes.always("role", &role);
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response = ctx.api.put(&EntityKind::User.item_endpoint(userid), &changes.into_payload());
        if settle(
            ctx,
            EntityKind::User,
            "update",
            Submission::interpret(&response, UPDATED),
            |_| format!("User '{username}' updated successfully!"),
            || conflict_message(&email),
        ) {
            self.synced = None;
        }
    }

    pub fn confirm_delete(&mut self, ctx: &mut PageContext<'_>) -> bool {
        confirm_delete(ctx, &mut self.confirmation, self.delete_selected, EntityKind::User)
    }

    fn role_fields(
        ui: &mut egui::Ui,
        prefix: &str,
        form: &mut UserForm,
        subjects: &[Subject],
        gurukuls: &[Gurukul],
        offerings: &[Offering],
        milestones: &[Milestone],
    ) {
        if form.role == "teacher" {
            widgets::multi_select(
                ui,
                &format!("{prefix}_user_subjects"),
                "Assigned Subjects",
                &options_for(subjects),
                &mut form.subject_ids,
            );
        } else {
            widgets::select_optional(
                ui,
                &format!("{prefix}_user_gurukul"),
                "Gurukul",
                &options_for(gurukuls),
                &mut form.gurukul_id,
            );
            widgets::select_optional(
                ui,
                &format!("{prefix}_user_milestone"),
                "Milestone",
                &milestone_options(milestones, offerings, form.gurukul_id),
                &mut form.milestone_id,
            );
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage All Users");

        let users: Vec<User> = ctx.fetch_all();
        let subjects: Vec<Subject> = ctx.fetch_all();
        let gurukuls: Vec<Gurukul> = ctx.fetch_all();
        let offerings: Vec<Offering> = ctx.fetch_all();
        let milestones: Vec<Milestone> = ctx.fetch_all();

        widgets::section(ui, "All Users");
        let filters = [ALL_ROLES, ROLES[0], ROLES[1]];
        widgets::choice(ui, "user_role_filter", "Filter by Role", &filters, &mut self.role_filter);
        let rows: Vec<Vec<String>> = filter_by_role(&users, &self.role_filter)
            .into_iter()
            .map(|u| {
                vec![
                    u.userid.to_string(),
                    u.username.clone(),
                    u.email.clone(),
                    u.role.clone(),
                    date_portion(u.created_at.as_deref()),
                    date_portion(u.last_login.as_deref()),
                    assignments(u),
                ]
            })
            .collect();
        record_table(
            ui,
            EntityKind::User,
            &["ID", "Username", "Email", "Role", "Created At", "Last Login", "Assignments"],
            &rows,
        );

        widgets::section(ui, "Create New User");
        widgets::text_field(ui, "Username", &mut self.create_form.username);
        widgets::text_field(ui, "Email", &mut self.create_form.email);
        widgets::choice(ui, "create_user_role", "Role", &ROLES, &mut self.create_form.role);
        Self::role_fields(ui, "create", &mut self.create_form, &subjects, &gurukuls, &offerings, &milestones);
        if ui.button("Create User").clicked() {
            self.create(ctx);
        }

        let options = options_for(&users);

        widgets::section(ui, "Update Existing User");
        if options.is_empty() {
            widgets::info(ui, "No users available to update.");
        } else {
            widgets::select(ui, "update_user", "Select User", &options, &mut self.selected);
            self.sync_update_form(&users);
            widgets::text_field(ui, "New Username", &mut self.update_form.username);
            widgets::text_field(ui, "New Email", &mut self.update_form.email);
            widgets::choice(ui, "update_user_role", "Role", &ROLES, &mut self.update_form.role);
            Self::role_fields(ui, "update", &mut self.update_form, &subjects, &gurukuls, &offerings, &milestones);
            if ui.button("Update User").clicked() {
                self.update(ctx, &users);
            }
        }

        widgets::section(ui, "Delete User");
        widgets::delete_section(
            ui,
            ctx,
            EntityKind::User,
            &options,
            &mut self.delete_selected,
            &mut self.confirmation,
            Some("The user is deactivated and removed from the teacher or student records."),
        );
    }
}
