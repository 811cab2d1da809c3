use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[sqlx(type_name = "link_platform", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkPlatform {
    Github,
    Linkedin,
    Portfolio,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub username: Option<String>,
    pub address: Option<String>,
    pub credits: i32,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    pub reputation: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Skill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Education {
    pub id: Uuid,
    pub user_id: Uuid,
    pub degree: String,
    pub institution: String,
    pub year: String,
    /// Index in the profile's education list.
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Link {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: LinkPlatform,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Avatar,
    Resume,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

/// Desired state of a profile after an edit. Child collections are the full
/// target set; storage applies the difference.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub education: Option<Vec<EducationEntry>>,
    pub links: Option<BTreeMap<LinkPlatform, String>>,
}
