use serde::{Deserialize, Serialize};

use super::profile::{EmergencyContact, EmployeeProfile, ExperienceEntry, IdNameObject, ResumeLines, Skill};
use super::wire;

/// Avatar payloads keyed by edge length, as the detail view exposes them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Avatars {
    #[serde(rename = "128", default)]
    pub size_128: String,
    #[serde(rename = "256", default)]
    pub size_256: String,
    #[serde(rename = "512", default)]
    pub size_512: String,
    #[serde(rename = "1024", default)]
    pub size_1024: String,
    #[serde(rename = "1920", default)]
    pub size_1920: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TypedSkill {
    pub skill_type: String,
    pub skill: Skill,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TypedResumeLine {
    pub line_type: String,
    pub entry: ExperienceEntry,
}

/// An employee as the store holds it. Every client-facing view derives from this.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub avatars: Avatars,
    #[serde(default, with = "wire::reference")]
    pub department: Option<IdNameObject>,
    #[serde(default, with = "wire::reference")]
    pub country: Option<IdNameObject>,
    #[serde(default, with = "wire::reference")]
    pub job: Option<IdNameObject>,
    #[serde(default, with = "wire::reference")]
    pub manager: Option<IdNameObject>,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub mobile_phone: String,
    #[serde(default)]
    pub work_email: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub place_of_birth: String,
    #[serde(default)]
    pub marital: String,
    #[serde(default)]
    pub identification_id: String,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
    #[serde(default)]
    pub skills: Vec<TypedSkill>,
    #[serde(default)]
    pub resume_lines: Vec<TypedResumeLine>,
}

impl EmployeeRecord {
    pub fn to_profile(&self) -> EmployeeProfile {
        let mut resume = ResumeLines::default();
        for line in &self.resume_lines {
            resume.push(&line.line_type, line.entry.clone());
        }

        EmployeeProfile {
            id: self.id,
            name: self.name.clone(),
            birthday: self.birthday.clone(),
            avatar_128: self.avatars.size_128.clone(),
            avatar_256: self.avatars.size_256.clone(),
            avatar_512: self.avatars.size_512.clone(),
            avatar_1024: self.avatars.size_1024.clone(),
            avatar_1920: self.avatars.size_1920.clone(),
            department_id: self.department.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            gender: self.gender.clone(),
            place_of_birth: self.place_of_birth.clone(),
            emergency_contact: self.emergency_contact.clone(),
            country_id: self.country.clone(),
            identification_id: self.identification_id.clone(),
            job_id: self.job.clone(),
            job_title: self.job_title.clone(),
            marital: self.marital.clone(),
            manager_id: self.manager.clone(),
            resume_line_ids: resume,
            skill_ids: self.skills.iter().map(|typed| typed.skill.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{EDUCATION, EXPERIENCE};

    fn entry(id: i32, name: &str) -> ExperienceEntry {
        ExperienceEntry {
            id,
            name: name.to_string(),
            date_start: "01-01-2020".to_string(),
            date_end: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn profile_keeps_known_resume_types_and_all_skills() {
        let record: EmployeeRecord = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Grace",
            "manager": {"id": 1, "name": "Admiral"}
        }))
        .unwrap();
        let record = EmployeeRecord {
            skills: vec![
                TypedSkill {
                    skill_type: "Languages".to_string(),
                    skill: Skill { id: 1, name: "COBOL".to_string(), level_progress: 100 },
                },
                TypedSkill {
                    skill_type: "Soft Skills".to_string(),
                    skill: Skill { id: 2, name: "Teaching".to_string(), level_progress: 90 },
                },
            ],
            resume_lines: vec![
                TypedResumeLine { line_type: EXPERIENCE.to_string(), entry: entry(1, "Navy") },
                TypedResumeLine { line_type: "Certification".to_string(), entry: entry(2, "Cert") },
                TypedResumeLine { line_type: EDUCATION.to_string(), entry: entry(3, "Yale") },
            ],
            ..record
        };

        let profile = record.to_profile();
        assert_eq!(profile.manager_id, Some(IdNameObject::new(1, "Admiral")));
        assert_eq!(profile.department_id, None);
        assert_eq!(profile.skill_ids.len(), 2);
        assert_eq!(profile.skill_ids[1].name, "Teaching");
        assert_eq!(profile.resume_line_ids.experience[0].name, "Navy");
        assert_eq!(profile.resume_line_ids.education[0].name, "Yale");
    }
}
