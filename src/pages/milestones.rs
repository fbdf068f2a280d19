use eframe::egui;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;

use super::{
    created_id,
    offerings::{
        gurukul_name,
        offering_options,
    },
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
        Milestone,
        Offering,
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneForm {
    pub class: i64,
    pub level: String,
    pub oid: Option<i64>,
}

impl Default for MilestoneForm {
    fn default() -> Self {
        Self { class: 1, level: String::new(), oid: None }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MilestonesPage {
    pub create_form: MilestoneForm,
    pub selected: Option<i64>,
    pub update_form: MilestoneForm,
    #[serde(skip)]
    synced: Option<i64>,
    pub delete_selected: Option<i64>,
    pub confirmation: DeleteConfirmation,
}

/// Info shown instead of the create form while no offering exists.
pub(crate) fn missing_offerings(offerings: &[Offering]) -> Option<&'static str> {
    offerings
        .is_empty()
        .then_some("No Gurukul Offerings available. Please create Offerings first.")
}

fn duplicate_message(level: &str, oid: i64) -> String {
    format!("A milestone for level '{level}' already exists for Offering ID {oid}.")
}

fn offering_levels(offerings: &[Offering], oid: Option<i64>) -> &'static [&'static str] {
    oid.and_then(|oid| offerings.iter().find(|o| o.oid == oid))
        .map(|o| levels_for_gtype(&o.gtype))
        .unwrap_or(&[])
}

fn exists(milestones: &[Milestone], oid: i64, level: &str, except: Option<i64>) -> bool {
    milestones.iter().any(|m| m.oid == oid && m.level == level && Some(m.mid) != except)
}

impl MilestonesPage {
    pub fn create(&mut self, ctx: &mut PageContext<'_>, offerings: &[Offering], milestones: &[Milestone]) {
        let Some(oid) = self.create_form.oid else {
            ctx.notices.warning("Please select an offering.");
            return;
        };
        let level = self.create_form.level.clone();
        if !offering_levels(offerings, Some(oid)).contains(&level.as_str()) {
            ctx.notices.warning("Please select a level valid for the offering type.");
            return;
        }
        let class = self.create_form.class;
        if class < 1 {
            ctx.notices.warning("Class must be a positive number.");
            return;
        }
        if exists(milestones, oid, &level, None) {
            ctx.notices.warning(duplicate_message(&level, oid));
            return;
        }

        let payload = json!({ "class": class, "level": level, "oid": oid });
        let response = ctx.api.post(EntityKind::Milestone.endpoint(), &payload);
        if settle(
            ctx,
            EntityKind::Milestone,
            "create",
            Submission::interpret(&response, CREATED),
            |body| {
                format!(
                    "Milestone Class {} - {} (ID: {}) created successfully for Offering ID {}!",
                    class,
                    level,
                    created_id(body, "mid"),
                    oid
                )
            },
            || duplicate_message(&level, oid),
        ) {
            self.create_form = MilestoneForm { oid: Some(oid), ..MilestoneForm::default() };
        }
    }

    pub fn sync_update_form(&mut self, milestones: &[Milestone]) {
        if self.synced == self.selected {
            return;
        }
        self.synced = self.selected;
        self.update_form = self
            .selected
            .and_then(|mid| milestones.iter().find(|m| m.mid == mid))
            .map(|m| MilestoneForm { class: m.class, level: m.level.clone(), oid: Some(m.oid) })
            .unwrap_or_default();
    }

    pub fn update(&mut self, ctx: &mut PageContext<'_>, offerings: &[Offering], milestones: &[Milestone]) {
        let Some(current) = self.selected.and_then(|mid| milestones.iter().find(|m| m.mid == mid))
        else {
            ctx.notices.warning("Please select a milestone to update.");
            return;
        };
        let (mid, oid) = (current.mid, current.oid);
        let level = self.update_form.level.clone();
        if !offering_levels(offerings, Some(oid)).contains(&level.as_str()) {
            ctx.notices.warning("Please select a level valid for the offering type.");
            return;
        }
        if self.update_form.class < 1 {
            ctx.notices.warning("Class must be a positive number.");
            return;
        }
        if exists(milestones, oid, &level, Some(mid)) {
            ctx.notices.warning(duplicate_message(&level, oid));
            return;
        }

        let changes = ChangeSet::new()
            .field("class", &current.class, &self.update_form.class)
            .field("level", current.level.as_str(), level.as_str())
            .always("oid", &oid);
        if !changes.has_changes() {
            ctx.notices.info("No changes detected.");
            return;
        }

        let response =
            ctx.api.put(&EntityKind::Milestone.item_endpoint(mid), &changes.into_payload());
        if settle(
            ctx,
            EntityKind::Milestone,
            "update",
            Submission::interpret(&response, UPDATED),
            |_| format!("Milestone ID {mid} updated successfully!"),
            || duplicate_message(&level, oid),
        ) {
            self.synced = None;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut PageContext<'_>) {
        ui.heading("Manage Milestones");

        let gurukuls: Vec<Gurukul> = ctx.fetch_all();
        let offerings: Vec<Offering> = ctx.fetch_all();
        let milestones: Vec<Milestone> = ctx.fetch_all();
        let offer_options = offering_options(&offerings, &gurukuls);
        let describe_offering = |oid: i64| {
            offerings
                .iter()
                .find(|o| o.oid == oid)
                .map(|o| format!("{} - {}", gurukul_name(&gurukuls, o.gid), o.gtype))
                .unwrap_or_else(|| "Unknown Offering".to_string())
        };

        widgets::section(ui, "All Milestones");
        let rows: Vec<Vec<String>> = milestones
            .iter()
            .map(|m| {
                vec![
                    m.mid.to_string(),
                    m.class.to_string(),
                    m.level.clone(),
                    describe_offering(m.oid),
                    m.oid.to_string(),
                ]
            })
            .collect();
        record_table(
            ui,
            EntityKind::Milestone,
            &["ID", "Class", "Level", "Offering", "Offering ID"],
            &rows,
        );

        widgets::section(ui, "Create New Milestone");
        if let Some(message) = missing_offerings(&offerings) {
            widgets::info(ui, message);
        } else {
            widgets::select(ui, "create_milestone_offering", "Offering", &offer_options, &mut self.create_form.oid);
            widgets::number_field(ui, "Class", &mut self.create_form.class);
            let levels = offering_levels(&offerings, self.create_form.oid);
            widgets::choice(ui, "create_milestone_level", "Level", levels, &mut self.create_form.level);
            if ui.button("Create Milestone").clicked() {
                self.create(ctx, &offerings, &milestones);
            }
        }

        let options = options_with(&milestones, |m| {
            format!("Class {} - {} ({}) (ID: {})", m.class, m.level, describe_offering(m.oid), m.mid)
        });

        widgets::section(ui, "Update Existing Milestone");
        if options.is_empty() {
            widgets::info(ui, "No milestones available to update.");
        } else {
            widgets::select(ui, "update_milestone", "Select Milestone", &options, &mut self.selected);
            self.sync_update_form(&milestones);
            widgets::number_field(ui, "Class", &mut self.update_form.class);
            let levels = offering_levels(&offerings, self.update_form.oid);
            widgets::choice(ui, "update_milestone_level", "Level", levels, &mut self.update_form.level);
            if ui.button("Update Milestone").clicked() {
                self.update(ctx, &offerings, &milestones);
            }
        }

        widgets::section(ui, "Delete Milestone");
        widgets::delete_section(
            ui,
            ctx,
            EntityKind::Milestone,
            &options,
            &mut self.delete_selected,
            &mut self.confirmation,
            None,
        );
    }
}
