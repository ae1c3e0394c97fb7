//! Structured résumé record produced by the analysis service.
//!
//! Wire names are camelCase to match the schema embedded in the analysis prompt.
//! Records are built once per analysis run and never mutated afterwards.

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

// ────────────────────────────────────────────────────────────────────────────
// Record types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Skills>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_sections: NamedLists,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub dates: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub graduation_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies_used: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Skills come back in exactly one of two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    Flat(Vec<String>),
    Categorized(NamedLists),
}

/// Ordered `title → [items]` mapping. Keeps the order the model emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedLists(pub Vec<(String, Vec<String>)>);

// ────────────────────────────────────────────────────────────────────────────
// Accessors
// ────────────────────────────────────────────────────────────────────────────

impl ContactInfo {
    /// Present, non-blank fields in display order.
    pub fn labeled_fields(&self) -> Vec<(ContactField, &str)> {
        [
            (ContactField::Email, &self.email),
            (ContactField::Phone, &self.phone),
            (ContactField::LinkedIn, &self.linkedin),
            (ContactField::GitHub, &self.github),
            (ContactField::Portfolio, &self.portfolio),
            (ContactField::Address, &self.address),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (field, v))
        })
        .collect()
    }

    pub fn is_blank(&self) -> bool {
        self.labeled_fields().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Email,
    Phone,
    LinkedIn,
    GitHub,
    Portfolio,
    Address,
}

impl ContactField {
    pub fn label(self) -> &'static str {
        match self {
            ContactField::Email => "Email:",
            ContactField::Phone => "Phone:",
            ContactField::LinkedIn => "LinkedIn:",
            ContactField::GitHub => "GitHub:",
            ContactField::Portfolio => "Portfolio:",
            ContactField::Address => "Address:",
        }
    }

    /// Link target for fields rendered as anchors.
    pub fn href(self, value: &str) -> Option<String> {
        match self {
            ContactField::Email => Some(format!("mailto:{value}")),
            ContactField::LinkedIn | ContactField::GitHub | ContactField::Portfolio => {
                Some(value.to_string())
            }
            ContactField::Phone | ContactField::Address => None,
        }
    }
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        match self {
            Skills::Flat(list) => list.is_empty(),
            Skills::Categorized(map) => map.is_empty(),
        }
    }
}

impl NamedLists {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<Vec<(&str, Vec<&str>)>> for NamedLists {
    fn from(entries: Vec<(&str, Vec<&str>)>) -> Self {
        NamedLists(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
                .collect(),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serde plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Serialize for NamedLists {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (title, items) in &self.0 {
            map.serialize_entry(title, items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NamedLists {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamedListsVisitor;

        impl<'de> Visitor<'de> for NamedListsVisitor {
            type Value = NamedLists;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of section titles to string lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((title, items)) =
                    access.next_entry::<String, Option<Vec<String>>>()?
                {
                    entries.push((title, items.unwrap_or_default()));
                }
                Ok(NamedLists(entries))
            }
        }

        deserializer.deserialize_map(NamedListsVisitor)
    }
}
