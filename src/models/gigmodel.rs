use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "gig_category", rename_all = "snake_case")]
pub enum GigCategory {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX Design")]
    UiUxDesign,
    #[serde(rename = "Writing & Translation")]
    WritingTranslation,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Blockchain Development")]
    BlockchainDevelopment,
    #[serde(rename = "Smart Contract Audit")]
    SmartContractAudit,
    #[serde(rename = "NFT Design")]
    NftDesign,
    #[serde(rename = "Marketing")]
    Marketing,
    #[serde(rename = "Other")]
    Other,
}

impl GigCategory {
    pub const ALL: [GigCategory; 10] = [
        GigCategory::WebDevelopment,
        GigCategory::MobileDevelopment,
        GigCategory::UiUxDesign,
        GigCategory::WritingTranslation,
        GigCategory::DataScience,
        GigCategory::BlockchainDevelopment,
        GigCategory::SmartContractAudit,
        GigCategory::NftDesign,
        GigCategory::Marketing,
        GigCategory::Other,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            GigCategory::WebDevelopment => "Web Development",
            GigCategory::MobileDevelopment => "Mobile Development",
            GigCategory::UiUxDesign => "UI/UX Design",
            GigCategory::WritingTranslation => "Writing & Translation",
            GigCategory::DataScience => "Data Science",
            GigCategory::BlockchainDevelopment => "Blockchain Development",
            GigCategory::SmartContractAudit => "Smart Contract Audit",
            GigCategory::NftDesign => "NFT Design",
            GigCategory::Marketing => "Marketing",
            GigCategory::Other => "Other",
        }
    }
}

/// `Completed` exists in the schema but no operation moves a gig into it yet.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "gig_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GigStatus {
    Open,
    Assigned,
    Completed,
}

impl GigStatus {
    pub fn to_str(&self) -> &str {
        match self {
            GigStatus::Open => "open",
            GigStatus::Assigned => "assigned",
            GigStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Gig {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: GigCategory,
    pub credits: i32,
    pub created_by: Uuid,
    pub status: GigStatus,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A gig joined with the display fields of its creator.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GigListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub gig: Gig,
    pub creator_username: Option<String>,
    pub creator_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub user_id: Uuid,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An application joined with what the gig owner needs to review the applicant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicationWithApplicant {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub applicant_username: Option<String>,
    pub applicant_avatar_url: Option<String>,
    pub applicant_bio: Option<String>,
    pub applicant_reputation: Option<f64>,
    #[sqlx(skip)]
    pub applicant_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedApplication {
    pub gig: Gig,
    pub application: Application,
    pub rejected_application_ids: Vec<Uuid>,
}

/// Result of the accept transaction. Every variant other than `Accepted`
/// means the transaction was rolled back without any effect.
#[derive(Debug, Clone)]
pub enum AcceptResult {
    Accepted(AcceptedApplication),
    GigNotFound,
    NotGigOwner,
    GigNotOpen(GigStatus),
    ApplicationNotFound,
    ApplicationNotPending(ApplicationStatus),
}
