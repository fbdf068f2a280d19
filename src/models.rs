use std::fmt;

use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Gurukul,
    Offering,
    Milestone,
    Subject,
    Topic,
    User,
    Teacher,
    Student,
}

impl EntityKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Gurukul => "/gurukul",
            EntityKind::Offering => "/gurukul-offerings",
            EntityKind::Milestone => "/milestones",
            EntityKind::Subject => "/subjects",
            EntityKind::Topic => "/topics",
            EntityKind::User => "/users",
            EntityKind::Teacher => "/teachers",
            EntityKind::Student => "/students",
        }
    }

    pub fn item_endpoint(&self, id: i64) -> String {
        format!("{}/{}", self.endpoint(), id)
    }

    /// Plural, lower-case noun used in notices ("Failed to fetch subjects: ...").
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Gurukul => "gurukuls",
            EntityKind::Offering => "gurukul offerings",
            EntityKind::Milestone => "milestones",
            EntityKind::Subject => "subjects",
            EntityKind::Topic => "topics",
            EntityKind::User => "users",
            EntityKind::Teacher => "teachers",
            EntityKind::Student => "students",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Gurukul => "Gurukul",
            EntityKind::Offering => "Gurukul Offering",
            EntityKind::Milestone => "Milestone",
            EntityKind::Subject => "Subject",
            EntityKind::Topic => "Topic",
            EntityKind::User => "User",
            EntityKind::Teacher => "Teacher",
            EntityKind::Student => "Student",
        };
        f.write_str(name)
    }
}

/// A backend record identified by an integer id.
pub trait Entity: DeserializeOwned + Clone {
    const KIND: EntityKind;

    fn id(&self) -> i64;

    fn display_name(&self) -> String;

    fn option_label(&self) -> String {
        format!("{} (ID: {})", self.display_name(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gurukul {
    pub gid: i64,
    pub gname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub oid: i64,
    pub gid: i64,
    pub gtype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub mid: i64,
    pub class: i64,
    pub level: String,
    pub oid: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub subid: i64,
    pub subname: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub tid: i64,
    pub tname: String,
    pub subid: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedSubject {
    pub subid: i64,
    pub subname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedGurukul {
    pub gid: i64,
    pub gname: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedMilestone {
    pub mid: i64,
    pub class: i64,
    pub level: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub teachid: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub assigned_subjects: Vec<AssignedSubject>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub sid: i64,
    pub sname: String,
    pub email: String,
    #[serde(default)]
    pub assigned_gurukuls: Vec<AssignedGurukul>,
    #[serde(default)]
    pub assigned_milestones: Vec<AssignedMilestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub userid: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub teachid: Option<i64>,
    #[serde(default)]
    pub sid: Option<i64>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub assigned_subjects: Vec<AssignedSubject>,
    #[serde(default)]
    pub assigned_gurukuls: Vec<AssignedGurukul>,
    #[serde(default)]
    pub assigned_milestones: Vec<AssignedMilestone>,
}

impl Entity for Gurukul {
    const KIND: EntityKind = EntityKind::Gurukul;

    fn id(&self) -> i64 {
        self.gid
    }

    fn display_name(&self) -> String {
        self.gname.clone()
    }
}

impl Entity for Offering {
    const KIND: EntityKind = EntityKind::Offering;

    fn id(&self) -> i64 {
        self.oid
    }

    fn display_name(&self) -> String {
        format!("{} (Gurukul {})", self.gtype, self.gid)
    }
}

impl Entity for Milestone {
    const KIND: EntityKind = EntityKind::Milestone;

    fn id(&self) -> i64 {
        self.mid
    }

    fn display_name(&self) -> String {
        format!("Class {} - {}", self.class, self.level)
    }
}

impl Entity for Subject {
    const KIND: EntityKind = EntityKind::Subject;

    fn id(&self) -> i64 {
        self.subid
    }

    fn display_name(&self) -> String {
        self.subname.clone()
    }
}

impl Entity for Topic {
    const KIND: EntityKind = EntityKind::Topic;

    fn id(&self) -> i64 {
        self.tid
    }

    fn display_name(&self) -> String {
        self.tname.clone()
    }
}

impl Entity for Teacher {
    const KIND: EntityKind = EntityKind::Teacher;

    fn id(&self) -> i64 {
        self.teachid
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> i64 {
        self.sid
    }

    fn display_name(&self) -> String {
        self.sname.clone()
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> i64 {
        self.userid
    }

    fn display_name(&self) -> String {
        self.username.clone()
    }
}

pub const GTYPES: [&str; 4] = ["G1", "G2", "G3", "G4"];

pub const ROLES: [&str; 2] = ["teacher", "student"];

const LEVEL_MAPPING: [(&str, [&str; 4]); 4] = [
    ("G1", ["L1", "L2", "L3", "L4"]),
    ("G2", ["L5", "L6", "L7", "L8"]),
    ("G3", ["L9", "L10", "L11", "L12"]),
    ("G4", ["L13", "L14", "L15", "L16"]),
];

/// Milestone levels the backend accepts for an offering type. Unknown types have none.
pub fn levels_for_gtype(gtype: &str) -> &'static [&'static str] {
    LEVEL_MAPPING
        .iter()
        .find(|(candidate, _)| *candidate == gtype)
        .map(|(_, levels)| levels.as_slice())
        .unwrap_or(&[])
}

/// Every level, L1 through L16, in order.
pub fn all_levels() -> impl Iterator<Item = &'static str> {
    LEVEL_MAPPING.iter().flat_map(|(_, levels)| levels.iter().copied())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn teacher_decodes_with_nested_subjects_and_extra_fields() {
        let teacher: Teacher = serde_json::from_value(json!({
            "teachid": 7,
            "name": "Asha",
            "email": "asha@example.com",
            "assigned_subjects": [{ "subid": 3, "subname": "Maths", "level": "L2" }],
            "created_at": "2024-05-01T10:00:00.000Z",
            "last_login": null,
            "user_id_link": 19
        }))
        .unwrap();

        assert_eq!(teacher.assigned_subjects, vec![AssignedSubject { subid: 3, subname: "Maths".into() }]);
        assert_eq!(teacher.last_login, None);
    }

    #[test]
    fn user_without_role_details_decodes() {
        let user: User = serde_json::from_value(json!({
            "userid": 1,
            "username": "admin",
            "email": "a@b.c",
            "role": "student",
            "isdeleted": false,
            "user_role_link": null
        }))
        .unwrap();

        assert!(user.assigned_gurukuls.is_empty());
        assert_eq!(user.sid, None);
    }

    #[test]
    fn option_label_keeps_id_trailing() {
        let subject = Subject { subid: 3, subname: "Maths".into(), level: None, image_url: None };
        assert_eq!(subject.option_label(), "Maths (ID: 3)");
    }

    #[test]
    fn levels_follow_offering_type() {
        assert_eq!(levels_for_gtype("G2"), &["L5", "L6", "L7", "L8"]);
        assert!(levels_for_gtype("G9").is_empty());
        assert_eq!(all_levels().count(), 16);
        assert_eq!(all_levels().last(), Some("L16"));
    }

    #[test]
    fn item_endpoint_appends_id() {
        assert_eq!(EntityKind::Offering.item_endpoint(5), "/gurukul-offerings/5");
    }
}
