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
    api::ApiResponse,
    gui::table::record_table,
    models::{
        EntityKind,
        Gurukul,
    },
    workflow::{
        options_for,
        ChangeSet,
        DeleteConfirmation,
        Submission,
        CREATED,
        UPDATED,
    },
};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GurukulsPage {
    pub new_name: String,
    pub selected: Option<i64>,
    pub edited_name: String,
    #[serde(skip)]
    synced: Option<i64>,
    pub delete_selected: Option<i64>,
    pub confirmation: DeleteConfirmation,
}

/// Gurukul names are not unique on the backend, so a 409 is reported like any other failure.
fn outcome(response: &ApiResponse, success: &[u16]) -> Submission {
    match Submission::interpret(response, success) {
        Submission::Conflict => Submission::Rejected(response.error_message()),
        submission => submission,
    }
}

impl GurukulsPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>) {
        let gname = self.new_name.trim().to_string();
        if gname.is_empty() {
            ctx.notices.warning("Please enter a gurukul name.");
            return;
        }

        let response = ctx.api.post(EntityKind::Gurukul.endpoint(), &json!({ "gname": gname }));
        let created = settle(
            ctx,
            EntityKind::Gurukul,
            "create",
            outcome(&response, CREATED),
            |body| format!("Gurukul '{}' (ID: {}) created successfully!", gname, created_id(body, "gid")),
            String::new,
        );

        if created {
            self.new_name.clear();
        }
    }

    pub fn sync_update_form(&mut self, gurukuls: &[Gurukul]) {
        if self.synced == self.selected {
            return;
        }
        self.synced = self.selected;
        self.edited_name = self
            .selected
            .and_then(|gid| gurukuls.iter().find(|g| g.gid == gid))
            .map(|g| g.gname.clone())
            .unwrap_or_default();
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, gurukuls: &[Gurukul]) {
        let Some(current) = self.selected.and_then(|gid| gurukuls.iter().find(|g| g.gid == gid))
        else {
            ctx.notices.warning("Please select a gurukul to update.");
            return;
        };
        let gid = current.gid;

        let gname = self.edited_name.trim().to_string();
        if gname.is_empty() {
            ctx.notices.warning("Gurukul name cannot be empty.");
            return;
        }

        let changes = ChangeSet::new().field("gname", current.gname.as_str(), gname.as_str());
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response = ctx.api.put(&EntityKind::Gurukul.item_endpoint(gid), &changes.into_payload());
        if settle(
            ctx,
            EntityKind::Gurukul,
            "update",
            outcome(&response, UPDATED),
            |_| format!("Gurukul ID {gid} updated successfully!"),
            String::new,
        ) {
            self.synced = None;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage Gurukuls");

        let gurukuls: Vec<Gurukul> = ctx.fetch_all();
        let options = options_for(&gurukuls);

        widgets::section(ui, "All Gurukuls");
        let rows: Vec<Vec<String>> =
            gurukuls.iter().map(|g| vec![g.gid.to_string(), g.gname.clone()]).collect();
        record_table(ui, EntityKind::Gurukul, &["ID", "Gurukul Name"], &rows);

        widgets::section(ui, "Create New Gurukul");
        widgets::text_field(ui, "Gurukul Name", &mut self.new_name);
        if ui.button("Create Gurukul").clicked() {
            self.create(ctx);
        }

        widgets::section(ui, "Update Existing Gurukul");
        if options.is_empty() {
            widgets::info(ui, "No gurukuls available to update.");
        } else {
            widgets::select(ui, "update_gurukul", "Select Gurukul", &options, &mut self.selected);
            self.sync_update_form(&gurukuls);
            widgets::text_field(ui, "New Gurukul Name", &mut self.edited_name);
            if ui.button("Update Gurukul").clicked() {
                self.update(ctx, &gurukuls);
            }
        }

        widgets::section(ui, "Delete Gurukul");
        widgets::delete_section(
            ui,
            ctx,
            EntityKind::Gurukul,
            &options,
            &mut self.delete_selected,
            &mut self.confirmation,
            Some("All offerings of this gurukul will be deleted as well."),
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        api::Method,
        pages::{
            confirm_delete,
            harness::Harness,
        },
        workflow::NoticeLevel,
    };

    fn gurukuls() -> Vec<Gurukul> {
        vec![Gurukul { gid: 1, gname: "North".into() }, Gurukul { gid: 2, gname: "South".into() }]
    }

    #[test]
    fn create_posts_name() {
        let mut h = Harness::new();
        h.transport.reply(Method::Post, "/gurukul", 201, json!({ "gid": 3, "gname": "East" }));
        let mut page = GurukulsPage { new_name: " East ".into(), ..Default::default() };

        page.create(&mut h.ctx());

        assert_eq!(h.transport.requests()[0].payload, Some(json!({ "gname": "East" })));
        assert_eq!(
            h.last_notice(),
            Some((NoticeLevel::Success, "Gurukul 'East' (ID: 3) created successfully!".to_string()))
        );
        assert!(page.new_name.is_empty());
    }

    #[test]
    fn existing_name_is_still_posted() {
        let mut h = Harness::new();
        h.transport.reply(Method::Post, "/gurukul", 201, json!({ "gid": 3, "gname": "North" }));
        let mut page = GurukulsPage { new_name: "North".into(), ..Default::default() };

        page.create(&mut h.ctx());

        assert_eq!(h.transport.requests_with(Method::Post).len(), 1);
        assert_eq!(
            h.last_notice(),
            Some((NoticeLevel::Success, "Gurukul 'North' (ID: 3) created successfully!".to_string()))
        );
    }

    #[test]
    fn rename_to_existing_name_is_sent() {
        let mut h = Harness::new();
        h.transport.reply(Method::Put, "/gurukul/1", 200, json!({ "gid": 1, "gname": "South" }));
        let mut page = GurukulsPage { selected: Some(1), ..Default::default() };
        page.sync_update_form(&gurukuls());
        page.edited_name = "South".into();

        page.update(&mut h.ctx(), &gurukuls());

        let puts = h.transport.requests_with(Method::Put);
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].payload, Some(json!({ "gname": "South" })));
    }

    #[test]
    fn conflict_status_is_reported_as_failure() {
        let mut h = Harness::new();
        h.transport.reply(Method::Post, "/gurukul", 409, json!({ "message": "Rejected by server" }));
        let mut page = GurukulsPage { new_name: "North".into(), ..Default::default() };

        page.create(&mut h.ctx());

        assert_eq!(
            h.last_notice(),
            Some((NoticeLevel::Error, "Failed to create gurukul: Rejected by server".to_string()))
        );
        assert_eq!(page.new_name, "North");
    }

    #[test]
    fn delete_accepts_no_content() {
        let mut h = Harness::new();
        h.transport.reply_text(Method::Delete, "/gurukul/2", 204, "");
        let mut page = GurukulsPage { delete_selected: Some(2), ..Default::default() };
        page.confirmation.request(2);

        assert!(confirm_delete(&mut h.ctx(), &mut page.confirmation, page.delete_selected, EntityKind::Gurukul));
        assert_eq!(page.confirmation.pending(), None);
    }

    #[test]
    fn failed_delete_stays_pending() {
        let mut h = Harness::new();
        h.transport.reply(Method::Delete, "/gurukul/2", 404, json!({ "message": "Gurukul not found" }));
        let mut page = GurukulsPage { delete_selected: Some(2), ..Default::default() };
        page.confirmation.request(2);

        assert!(!confirm_delete(&mut h.ctx(), &mut page.confirmation, page.delete_selected, EntityKind::Gurukul));
        assert!(page.confirmation.is_pending_for(Some(2)));
        assert_eq!(
            h.last_notice(),
            Some((NoticeLevel::Error, "Failed to delete gurukul: Gurukul not found".to_string()))
        );
    }
}
