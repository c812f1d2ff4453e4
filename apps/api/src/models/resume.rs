use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Key that picks the template variant. Never forwarded as template data.
pub const RESUME_TYPE_KEY: &str = "resume_type";

/// The JSON payload posted by the resume form.
///
/// `raw` is the object exactly as posted; it is what the merge call receives.
/// The typed fields are a lenient reading of it, used to decide whether the
/// submission is blank and to lay out the local rendering. Missing keys and
/// values of an unexpected shape read as empty rather than failing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResumeSubmission {
    #[serde(rename = "Name", deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(rename = "LastName", deserialize_with = "deserialize_text")]
    pub last_name: String,
    #[serde(rename = "EmailAddress", deserialize_with = "deserialize_text")]
    pub email_address: String,
    #[serde(rename = "PhoneNumber", deserialize_with = "deserialize_text")]
    pub phone_number: String,
    #[serde(rename = "LinkedIn", deserialize_with = "deserialize_text")]
    pub linked_in: String,
    #[serde(rename = "JobTitle", deserialize_with = "deserialize_text")]
    pub job_title: String,
    #[serde(rename = "Summary", deserialize_with = "deserialize_text")]
    pub summary: String,
    #[serde(rename = "Skills", deserialize_with = "deserialize_skills")]
    pub skills: Vec<String>,
    #[serde(rename = "Education", deserialize_with = "deserialize_entries")]
    pub education: Vec<EducationEntry>,
    #[serde(rename = "Experience", deserialize_with = "deserialize_entries")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(rename = "Achievements", deserialize_with = "deserialize_entries")]
    pub achievements: Vec<Achievement>,
    #[serde(rename = "resume_type", deserialize_with = "deserialize_resume_type")]
    pub resume_type: Option<String>,
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(rename = "SchoolName", deserialize_with = "deserialize_text")]
    pub school_name: String,
    #[serde(rename = "Year", deserialize_with = "deserialize_text")]
    pub year: String,
    #[serde(rename = "Description", deserialize_with = "deserialize_text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(rename = "CompanyName", deserialize_with = "deserialize_text")]
    pub company_name: String,
    #[serde(rename = "Year", deserialize_with = "deserialize_text")]
    pub year: String,
    #[serde(rename = "Description", deserialize_with = "deserialize_text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Achievement {
    #[serde(rename = "Type", deserialize_with = "deserialize_text")]
    pub kind: String,
    #[serde(rename = "Description", deserialize_with = "deserialize_text")]
    pub description: String,
}

impl EducationEntry {
    pub fn is_empty(&self) -> bool {
        is_blank(&self.school_name) && is_blank(&self.year) && is_blank(&self.description)
    }
}

impl ExperienceEntry {
    pub fn is_empty(&self) -> bool {
        is_blank(&self.company_name) && is_blank(&self.year) && is_blank(&self.description)
    }
}

impl Achievement {
    pub fn is_empty(&self) -> bool {
        is_blank(&self.kind) && is_blank(&self.description)
    }
}

impl ResumeSubmission {
    /// Reads a submission out of a posted JSON value. Only a non-object fails.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(raw) = &value else {
            return Err(serde_json::Error::custom("submission must be a JSON object"));
        };
        let raw = raw.clone();
        let mut submission: Self = serde_json::from_value(value)?;
        submission.raw = raw;
        Ok(submission)
    }

    /// The data handed to the document merge: the object as posted, minus the
    /// template selector.
    pub fn merge_data(&self) -> Value {
        let mut data = self.raw.clone();
        data.remove(RESUME_TYPE_KEY);
        Value::Object(data)
    }

    /// Full name as printed in the resume header.
    pub fn full_name(&self) -> String {
        [self.name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when nothing that identifies the candidate or their career was filled in.
    pub fn is_blank(&self) -> bool {
        [
            &self.name,
            &self.last_name,
            &self.email_address,
            &self.phone_number,
            &self.linked_in,
            &self.job_title,
            &self.summary,
        ]
        .into_iter()
        .all(|field| is_blank(field))
            && self.skills.iter().all(|s| is_blank(s))
            && self.education.iter().all(EducationEntry::is_empty)
            && self.experience.iter().all(ExperienceEntry::is_empty)
            && self.achievements.iter().all(Achievement::is_empty)
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Printable form of a scalar. Arrays, objects and null read as empty.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value).unwrap_or_default())
}

/// Accepts `Skills` either as a list or as the raw comma-separated form value.
fn deserialize_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::String(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}

/// A list of entries; anything that is not a list, or not an entry, reads as empty.
fn deserialize_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// `resume_type` arrives as a string from the form, but a number is just as clear.
/// Any other shape is treated as absent, which selects the default template.
fn deserialize_resume_type<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
