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
        levels_for_gtype,
        EntityKind,
        Gurukul,
        Offering,
        GTYPES,
    },
    workflow::{
        options_for,
        options_with,
        ChangeSet,
        DeleteConfirmation,
        SelectOption,
        Submission,
        CREATED,
        UPDATED,
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferingForm {
    pub gid: Option<i64>,
    pub gtype: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OfferingsPage {
    pub create_form: OfferingForm,
    pub selected: Option<i64>,
    pub update_form: OfferingForm,
    #[serde(skip)]
    synced: Option<i64>,
    pub delete_selected: Option<i64>,
    pub confirmation: DeleteConfirmation,
}

/// Info shown instead of the offering forms while no gurukul exists.
pub(crate) fn missing_gurukuls(gurukuls: &[Gurukul]) -> Option<&'static str> {
    gurukuls.is_empty().then_some("No Gurukuls available. Please create Gurukuls first.")
}

fn duplicate_message(gtype: &str, gid: i64) -> String {
    format!("Offering type '{gtype}' already exists for Gurukul ID {gid}.")
}

pub(crate) fn gurukul_name(gurukuls: &[Gurukul], gid: i64) -> String {
    gurukuls
        .iter()
        .find(|g| g.gid == gid)
        .map(|g| g.gname.clone())
        .unwrap_or_else(|| "Unknown Gurukul".to_string())
}

/// Offering dropdown entries labelled with their gurukul's name.
pub(crate) fn offering_options(offerings: &[Offering], gurukuls: &[Gurukul]) -> Vec<SelectOption> {
    options_with(offerings, |o| {
        format!("{} - {} (ID: {})", gurukul_name(gurukuls, o.gid), o.gtype, o.oid)
    })
}

fn exists(offerings: &[Offering], gid: i64, gtype: &str, except: Option<i64>) -> bool {
    offerings.iter().any(|o| o.gid == gid && o.gtype == gtype && Some(o.oid) != except)
}

impl OfferingsPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>, offerings: &[Offering]) {
        let Some(gid) = self.create_form.gid else {
            ctx.notices.warning("Please select a gurukul.");
            return;
        };
        let gtype = self.create_form.gtype.clone();
        if !GTYPES.contains(&gtype.as_str()) {
            ctx.notices.warning("Please select an offering type.");
            return;
        }
        if exists(offerings, gid, &gtype, None) {
            ctx.notices.warning(duplicate_message(&gtype, gid));
            return;
        }

        let response =
            ctx.api.post(EntityKind::Offering.endpoint(), &json!({ "gid": gid, "gtype": gtype }));
        settle(
            ctx,
            EntityKind::Offering,
            "create",
            Submission::interpret(&response, CREATED),
            |body| {
                format!(
                    "Offering '{}' (ID: {}) created successfully for Gurukul ID {}!",
                    gtype,
                    created_id(body, "oid"),
                    gid
                )
            },
            || duplicate_message(&gtype, gid),
        );
    }

    pub fn sync_update_form(&mut self, offerings: &[Offering]) {
        if self.synced == self.selected {
            return;
        }
        self.synced = self.selected;
        self.update_form = self
            .selected
            .and_then(|oid| offerings.iter().find(|o| o.oid == oid))
            .map(|o| OfferingForm { gid: Some(o.gid), gtype: o.gtype.clone() })
            .unwrap_or_default();
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, offerings: &[Offering]) {
        let Some(current) = self.selected.and_then(|oid| offerings.iter().find(|o| o.oid == oid))
        else {
            ctx.notices.warning("Please select an offering to update.");
            return;
        };
        let oid = current.oid;
        let (Some(gid), gtype) = (self.update_form.gid, self.update_form.gtype.clone()) else {
            ctx.notices.warning("Please select a gurukul.");
            return;
        };
        if exists(offerings, gid, &gtype, Some(oid)) {
            ctx.notices.warning(duplicate_message(&gtype, gid));
            return;
        }

        // The backend validates both fields on every update.
        let changes = ChangeSet::new()
            .field("gid", &current.gid, &gid)
            .field("gtype", current.gtype.as_str(), gtype.as_str())
            .always("gid", &gid)
            .always("gtype", &gtype);
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response =
            ctx.api.put(&EntityKind::Offering.item_endpoint(oid), &changes.into_payload());
        if settle(
            ctx,
            EntityKind::Offering,
            "update",
            Submission::interpret(&response, UPDATED),
            |_| format!("Offering ID {oid} updated successfully!"),
            || duplicate_message(&gtype, gid),
        ) {
            self.synced = None;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage Gurukul Offerings");

        let gurukuls: Vec<Gurukul> = ctx.fetch_all();
        let offerings: Vec<Offering> = ctx.fetch_all();
        let gurukul_options = options_for(&gurukuls);
        let options = offering_options(&offerings, &gurukuls);

        widgets::section(ui, "All Offerings");
        let rows: Vec<Vec<String>> = offerings
            .iter()
            .map(|o| {
                vec![
                    o.oid.to_string(),
                    gurukul_name(&gurukuls, o.gid),
                    o.gid.to_string(),
                    o.gtype.clone(),
                    levels_for_gtype(&o.gtype).join(", "),
                ]
            })
            .collect();
        record_table(
            ui,
            EntityKind::Offering,
            &["ID", "Gurukul", "Gurukul ID", "Type", "Levels"],
            &rows,
        );

        widgets::section(ui, "Create New Offering");
        if let Some(message) = missing_gurukuls(&gurukuls) {
            widgets::info(ui, message);
        } else {
            widgets::select(ui, "create_offering_gurukul", "Gurukul", &gurukul_options, &mut self.create_form.gid);
            widgets::choice(ui, "create_offering_type", "Offering Type", &GTYPES, &mut self.create_form.gtype);
            if ui.button("Create Offering").clicked() {
                self.create(ctx, &offerings);
            }
        }

        widgets::section(ui, "Update Existing Offering");
        if gurukul_options.is_empty() || options.is_empty() {
            widgets::info(ui, "No offerings available to update.");
        } else {
            widgets::select(ui, "update_offering", "Select Offering", &options, &mut self.selected);
            self.sync_update_form(&offerings);
            widgets::select(ui, "update_offering_gurukul", "Gurukul", &gurukul_options, &mut self.update_form.gid);
            widgets::choice(ui, "update_offering_type", "Offering Type", &GTYPES, &mut self.update_form.gtype);
            if ui.button("Update Offering").clicked() {
                self.update(ctx, &offerings);
            }
        }

        widgets::section(ui, "Delete Offering");
        widgets::delete_section(
            ui,
            ctx,
            EntityKind::Offering,
            &options,
            &mut self.delete_selected,
            &mut self.confirmation,
            None,
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
        pages::harness::Harness,
        workflow::NoticeLevel,
    };

    fn offerings() -> Vec<Offering> {
        vec![Offering { oid: 4, gid: 1, gtype: "G1".into() }, Offering { oid: 5, gid: 1, gtype: "G2".into() }]
    }

    #[test]
    fn duplicate_type_for_gurukul_is_caught_locally() {
        let mut h = Harness::new();
        let mut page = OfferingsPage::default();
        page.create_form = OfferingForm { gid: Some(1), gtype: "G2".into() };

        page.create(&mut h.ctx(), &offerings());

        assert!(h.transport.requests().is_empty());
        assert_eq!(
            h.last_notice(),
            Some((NoticeLevel::Warning, "Offering type 'G2' already exists for Gurukul ID 1.".to_string()))
        );
    }

    #[test]
    fn update_always_sends_both_fields() {
        let mut h = Harness::new();
        h.transport.reply(Method::Put, "/gurukul-offerings/4", 200, json!({ "oid": 4 }));
        let mut page = OfferingsPage { selected: Some(4), ..Default::default() };
        page.sync_update_form(&offerings());
        page.update_form.gtype = "G3".into();

        page.update(&mut h.ctx(), &offerings());

        assert_eq!(h.transport.requests()[0].payload, Some(json!({ "gid": 1, "gtype": "G3" })));
    }

    #[test]
    fn server_conflict_is_a_warning() {
        let mut h = Harness::new();
        h.transport.reply(
            Method::Post,
            "/gurukul-offerings",
            409,
            json!({ "message": "Offering type 'G4' already exists for Gurukul ID 2." }),
        );
        let mut page = OfferingsPage::default();
        page.create_form = OfferingForm { gid: Some(2), gtype: "G4".into() };

        page.create(&mut h.ctx(), &offerings());

        assert_eq!(h.last_notice().map(|(level, _)| level), Some(NoticeLevel::Warning));
    }

    #[test]
    fn options_name_the_gurukul() {
        let gurukuls = vec![Gurukul { gid: 1, gname: "North".into() }];
        let options = offering_options(&offerings(), &gurukuls);
        assert_eq!(options[0].label, "North - G1 (ID: 4)");
    }

    #[test]
    fn forms_are_replaced_by_info_without_gurukuls() {
        let mut h = Harness::new();
        h.transport
            .reply(Method::Get, "/gurukul", 200, json!([]))
            .reply(Method::Get, "/gurukul-offerings", 200, json!([]));
        let mut page = OfferingsPage::default();

        let shown = h.render(|ui, ctx| page.ui(ui, ctx));

        assert_eq!(missing_gurukuls(&[]), Some("No Gurukuls available. Please create Gurukuls first."));
        assert!(shown.contains("No Gurukuls available. Please create Gurukuls first."));
        assert!(!shown.contains("Create Offering"));
        assert!(h.transport.requests_with(Method::Post).is_empty());
    }
}
