use std::ops::Deref;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::wire;

/// Weak reference to a record owned elsewhere (department, country, job, manager).
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq, Eq)]
pub struct IdNameObject {
    #[validate(range(min = 0))]
    pub id: i32,
    pub name: String,
}

impl IdNameObject {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyContact {
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    #[validate(range(min = 0))]
    pub id: i32,
    pub name: String,
    /// Percentage, 0 to 100.
    #[validate(range(min = 0, max = 100))]
    pub level_progress: i32,
}

/// Skills in producer order. The producer nests them under `SkillObj`.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    #[serde(rename = "SkillObj", default)]
    #[validate]
    skills: Vec<Skill>,
}

impl SkillSet {
    pub fn into_vec(self) -> Vec<Skill> {
        self.skills
    }
}

impl Deref for SkillSet {
    type Target = [Skill];

    fn deref(&self) -> &[Skill] {
        &self.skills
    }
}

impl FromIterator<Skill> for SkillSet {
    fn from_iter<I: IntoIterator<Item = Skill>>(iter: I) -> Self {
        Self { skills: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a Skill;
    type IntoIter = std::slice::Iter<'a, Skill>;

    fn into_iter(self) -> Self::IntoIter {
        self.skills.iter()
    }
}

/// One resume line: a job held or a degree earned.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq, Eq)]
pub struct ExperienceEntry {
    #[validate(range(min = 0))]
    pub id: i32,
    pub name: String,
    /// `DD-MM-YYYY` as sent by the producer, kept verbatim.
    #[serde(default)]
    pub date_start: String,
    #[serde(default)]
    pub date_end: String,
    #[serde(default)]
    pub description: String,
}

pub const EXPERIENCE: &str = "Experience";
pub const EDUCATION: &str = "Education";

#[derive(Serialize, Deserialize, Validate, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeLines {
    #[serde(rename = "Experience", default)]
    #[validate]
    pub experience: Vec<ExperienceEntry>,
    #[serde(rename = "Education", default)]
    #[validate]
    pub education: Vec<ExperienceEntry>,
}

impl ResumeLines {
    /// Files `entry` under its line type. Returns false for types the
    /// profile document has no slot for.
    pub fn push(&mut self, line_type: &str, entry: ExperienceEntry) -> bool {
        match line_type {
            EXPERIENCE => self.experience.push(entry),
            EDUCATION => self.education.push(entry),
            _ => return false,
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.experience.is_empty() && self.education.is_empty()
    }
}

/// The employee profile document exchanged with clients.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq, Eq)]
pub struct EmployeeProfile {
    #[validate(range(min = 0))]
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub avatar_128: String,
    #[serde(default)]
    pub avatar_256: String,
    #[serde(default)]
    pub avatar_512: String,
    #[serde(default)]
    pub avatar_1024: String,
    #[serde(default)]
    pub avatar_1920: String,
    #[serde(default, with = "wire::reference")]
    #[validate]
    pub department_id: Option<IdNameObject>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub place_of_birth: String,
    pub emergency_contact: EmergencyContact,
    #[serde(default, with = "wire::reference")]
    #[validate]
    pub country_id: Option<IdNameObject>,
    #[serde(default)]
    pub identification_id: String,
    #[serde(default, with = "wire::reference")]
    #[validate]
    pub job_id: Option<IdNameObject>,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub marital: String,
    #[serde(default, with = "wire::reference")]
    #[validate]
    pub manager_id: Option<IdNameObject>,
    #[serde(default)]
    #[validate]
    pub resume_line_ids: ResumeLines,
    #[serde(default)]
    #[validate]
    pub skill_ids: SkillSet,
}
