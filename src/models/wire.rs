//! Serde adapters for the conventions of the upstream HR producer:
//! unset references travel as `{}` and dates as `DD-MM-YYYY` strings (or `""`).

use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// `Option<IdNameObject>` <-> `{"id", "name"}` | `{}`.
pub mod reference {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::models::profile::IdNameObject;

    pub fn serialize<S>(value: &Option<IdNameObject>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(reference) => reference.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<IdNameObject>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Partial {
            id: Option<i32>,
            name: Option<String>,
        }

        match Option::<Partial>::deserialize(deserializer)? {
            None | Some(Partial { id: None, name: None }) => Ok(None),
            Some(Partial { id: Some(id), name: Some(name) }) => Ok(Some(IdNameObject { id, name })),
            Some(Partial { id: None, .. }) => Err(D::Error::missing_field("id")),
            Some(Partial { name: None, .. }) => Err(D::Error::missing_field("name")),
        }
    }
}

/// Renders a stored date the way the producer sends it: `DD-MM-YYYY`, or `""`.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
