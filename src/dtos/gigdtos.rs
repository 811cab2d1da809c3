use serde::{de, de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use crate::models::{escrowmodel::Escrow, gigmodel::*};

pub const MIN_GIG_CREDITS: i32 = 50;
pub const QUICK_APPLY_COVER_LETTER: &str = "I'm interested in this gig and would like to apply.";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGigDto {
    #[validate(
        length(min = 1, max = 120, message = "Title must be between 1 and 120 characters"),
        custom = "validate_not_blank"
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 5000, message = "Description must be between 1 and 5000 characters"),
        custom = "validate_not_blank"
    )]
    pub description: String,

    pub category: GigCategory,

    #[validate(range(min = 50, message = "A gig must offer at least 50 credits"))]
    pub credits: i32,
}

/// `?search=&category=` means "no filter", so blank values read as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GigFilterQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<GigCategory>,
}

fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => {
            serde_json::from_value(serde_json::Value::String(value))
                .map(Some)
                .map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GigListResponseDto {
    pub gigs: Vec<GigListing>,
    /// Distinct categories of the unfiltered open gigs.
    pub categories: Vec<GigCategory>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GigDetailDto {
    #[serde(flatten)]
    pub listing: GigListing,
    pub application_count: i64,
    pub is_owner: bool,
    pub my_application_status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyGigDto {
    #[validate(
        length(min = 1, max = 5000, message = "Cover letter must be between 1 and 5000 characters"),
        custom = "validate_not_blank"
    )]
    pub cover_letter: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationListResponseDto {
    pub applications: Vec<ApplicationWithApplicant>,
    pub results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEscrowDto {
    pub gig_id: Uuid,

    #[validate(range(min = 1, message = "Escrow amount must be positive"))]
    pub amount: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EscrowListResponseDto {
    pub escrows: Vec<Escrow>,
    pub results: usize,
}
