use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

use super::profile::{ExperienceEntry, IdNameObject, Skill};
use super::record::{Avatars, EmployeeRecord};
use super::wire;

#[derive(Deserialize, Validate, Debug)]
pub struct EmployeeDetailRequest {
    #[serde(default)]
    #[validate(required, range(min = 1))]
    pub employee_id: Option<i32>,
    #[serde(default)]
    pub include_resume: bool,
    #[serde(default)]
    pub include_skills: bool,
}

/// Entries bucketed by a type label. Buckets keep the order in which their
/// label was first seen, entries keep store order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouped<T>(Vec<(String, Vec<T>)>);

impl<T> Grouped<T> {
    pub fn get(&self, label: &str) -> Option<&[T]> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl<'a, T> FromIterator<(&'a str, T)> for Grouped<T> {
    fn from_iter<I: IntoIterator<Item = (&'a str, T)>>(iter: I) -> Self {
        let mut groups: Vec<(String, Vec<T>)> = Vec::new();
        for (label, entry) in iter {
            match groups.iter_mut().find(|(name, _)| name == label) {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((label.to_string(), vec![entry])),
            }
        }
        Grouped(groups)
    }
}

impl<T: Serialize> Serialize for Grouped<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, entries) in &self.0 {
            map.serialize_entry(label, entries)?;
        }
        map.end()
    }
}

#[derive(Serialize, Debug)]
pub struct EmergencyInfo {
    pub name: String,
    pub phone: String,
}

#[derive(Serialize, Debug)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub emergency: EmergencyInfo,
}

#[derive(Serialize, Debug)]
pub struct PersonalInfo {
    pub gender: String,
    pub place_of_birth: String,
    pub marital: String,
    pub identification_id: String,
}

#[derive(Serialize, Debug)]
pub struct Location {
    #[serde(with = "wire::reference")]
    pub country: Option<IdNameObject>,
}

#[derive(Serialize, Debug)]
pub struct JobInfo {
    pub title: String,
    #[serde(with = "wire::reference")]
    pub position: Option<IdNameObject>,
    #[serde(with = "wire::reference")]
    pub manager: Option<IdNameObject>,
}

/// Response of the employee detail endpoint.
#[derive(Serialize, Debug)]
pub struct EmployeeDetail {
    pub id: i32,
    pub name: String,
    pub birthday: String,
    pub avatars: Avatars,
    #[serde(with = "wire::reference")]
    pub department: Option<IdNameObject>,
    pub contact_info: ContactInfo,
    pub personal_info: PersonalInfo,
    pub location: Location,
    pub job_info: JobInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<Grouped<ExperienceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Grouped<Skill>>,
}

impl EmployeeDetail {
    pub fn build(record: EmployeeRecord, include_resume: bool, include_skills: bool) -> Self {
        let resume = include_resume.then(|| {
            record
                .resume_lines
                .iter()
                .map(|line| (line.line_type.as_str(), line.entry.clone()))
                .collect()
        });
        let skills = include_skills.then(|| {
            record
                .skills
                .iter()
                .map(|typed| (typed.skill_type.as_str(), typed.skill.clone()))
                .collect()
        });

        EmployeeDetail {
            id: record.id,
            name: record.name,
            birthday: record.birthday,
            avatars: record.avatars,
            department: record.department,
            contact_info: ContactInfo {
                email: record.email,
                phone: record.phone,
                emergency: EmergencyInfo {
                    name: record.emergency_contact.contact_name,
                    phone: record.emergency_contact.contact_phone,
                },
            },
            personal_info: PersonalInfo {
                gender: record.gender,
                place_of_birth: record.place_of_birth,
                marital: record.marital,
                identification_id: record.identification_id,
            },
            location: Location { country: record.country },
            job_info: JobInfo {
                title: record.job_title,
                position: record.job,
                manager: record.manager,
            },
            resume,
            skills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{TypedResumeLine, TypedSkill};
    use serde_json::json;

    fn record() -> EmployeeRecord {
        let mut record: EmployeeRecord = serde_json::from_value(json!({
            "id": 9,
            "name": "Linus",
            "birthday": "28-12-1969",
            "department": {"id": 1, "name": "Kernel"},
            "job": {"id": 2, "name": "Maintainer"},
            "job_title": "Benevolent Dictator",
            "emergency_contact": {"contact_name": "Tove", "contact_phone": "555"}
        }))
        .unwrap();
        record.skills = ["Technical", "Soft Skills", "Technical"]
            .iter()
            .enumerate()
            .map(|(i, kind)| TypedSkill {
                skill_type: kind.to_string(),
                skill: Skill { id: i as i32, name: format!("skill-{}", i), level_progress: 50 },
            })
            .collect();
        record.resume_lines = vec![TypedResumeLine {
            line_type: "Experience".to_string(),
            entry: ExperienceEntry {
                id: 1,
                name: "Transmeta".to_string(),
                date_start: "01-03-1997".to_string(),
                date_end: "30-06-2003".to_string(),
                description: String::new(),
            },
        }];
        record
    }

    #[test]
    fn optional_sections_are_omitted_unless_requested() {
        let detail = serde_json::to_value(EmployeeDetail::build(record(), false, false)).unwrap();
        assert!(detail.get("resume").is_none());
        assert!(detail.get("skills").is_none());
        assert_eq!(detail["birthday"], "28-12-1969");
        assert_eq!(detail["contact_info"]["emergency"], json!({"name": "Tove", "phone": "555"}));
        assert_eq!(detail["location"]["country"], json!({}));
        assert_eq!(detail["job_info"]["manager"], json!({}));
        assert_eq!(detail["job_info"]["position"], json!({"id": 2, "name": "Maintainer"}));
        assert_eq!(detail["avatars"]["1920"], "");
    }

    #[test]
    fn skills_group_by_type_in_first_seen_order() {
        let detail = EmployeeDetail::build(record(), true, true);
        let skills = detail.skills.as_ref().unwrap();
        assert_eq!(skills.labels().collect::<Vec<_>>(), vec!["Technical", "Soft Skills"]);
        let technical: Vec<i32> = skills.get("Technical").unwrap().iter().map(|s| s.id).collect();
        assert_eq!(technical, vec![0, 2]);

        let encoded = serde_json::to_value(&detail).unwrap();
        assert_eq!(encoded["resume"]["Experience"][0]["date_end"], "30-06-2003");
    }

    #[test]
    fn absent_null_or_zero_employee_id_fails_validation() {
        for body in [json!({}), json!({"employee_id": null}), json!({"employee_id": 0})] {
            let request: EmployeeDetailRequest = serde_json::from_value(body).unwrap();
            assert!(request.validate().is_err());
        }
        let request: EmployeeDetailRequest = serde_json::from_value(json!({"employee_id": 3})).unwrap();
        assert!(request.validate().is_ok());
    }
}
