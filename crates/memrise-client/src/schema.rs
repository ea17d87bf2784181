//! Wire types for the JSON endpoints the client reads.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: AccessToken,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessToken {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardCourses {
    #[serde(default)]
    pub courses: Vec<DashboardCourse>,
    #[serde(default)]
    pub has_more_pages: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardCourse {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseListing {
    pub courses: Vec<CourseSchema>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseSchema {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
    pub name: String,
    pub target: Option<LanguageSchema>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LanguageSchema {
    pub language_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LevelListing {
    pub levels: Vec<LevelSchema>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LevelSchema {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
    pub index: u32,
    pub title: String,
}

/// Response of the level editor endpoint: the word table as an HTML string.
#[derive(Debug, Deserialize)]
pub(crate) struct EditingHtml {
    pub rendered: String,
}

/// The API is inconsistent about ids: dashboard entries carry strings,
/// course and level entries carry numbers.
fn numeric_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(n) => Ok(n),
        Id::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
