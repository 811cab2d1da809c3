use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validate_not_blank;
use crate::models::{
    gigmodel::{Application, Gig},
    profilemodel::*,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationDto {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksDto {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
}

/// Child collections, when present, are the complete desired set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileDto {
    #[validate(
        length(min = 1, max = 50, message = "Username must be between 1 and 50 characters"),
        custom = "validate_not_blank"
    )]
    pub username: Option<String>,

    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    #[validate(custom = "validate_skills")]
    pub skills: Option<Vec<String>>,

    #[validate(custom = "validate_education")]
    pub education: Option<Vec<EducationDto>>,

    #[validate(custom = "validate_links")]
    pub links: Option<LinksDto>,
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_skills(skills: &[String]) -> Result<(), ValidationError> {
    for skill in skills {
        let len = skill.trim().chars().count();
        if len == 0 || len > 50 {
            return Err(validation_error(
                "skill_length",
                "Each skill must be between 1 and 50 characters",
            ));
        }
    }
    Ok(())
}

fn validate_education(education: &[EducationDto]) -> Result<(), ValidationError> {
    for entry in education {
        if entry.degree.trim().is_empty()
            || entry.institution.trim().is_empty()
            || entry.year.trim().is_empty()
        {
            return Err(validation_error(
                "education_incomplete",
                "Education entries need a degree, an institution and a year",
            ));
        }
    }
    Ok(())
}

fn validate_links(links: &LinksDto) -> Result<(), ValidationError> {
    for url in [&links.github, &links.linkedin, &links.portfolio]
        .into_iter()
        .flatten()
    {
        let url = url.trim();
        if !url.is_empty() && !validator::validate_url(url) {
            return Err(validation_error("invalid_url", "Links must be valid URLs"));
        }
    }
    Ok(())
}

impl UpdateProfileDto {
    /// Normalises the request into the storage-level update: values are
    /// trimmed, duplicate skills dropped and empty links removed.
    pub fn into_update(self) -> ProfileUpdate {
        let skills = self.skills.map(|skills| {
            let mut seen = Vec::new();
            for skill in skills {
                let skill = skill.trim().to_string();
                if !seen.contains(&skill) {
                    seen.push(skill);
                }
            }
            seen
        });

        let education = self.education.map(|entries| {
            entries
                .into_iter()
                .map(|entry| EducationEntry {
                    degree: entry.degree.trim().to_string(),
                    institution: entry.institution.trim().to_string(),
                    year: entry.year.trim().to_string(),
                })
                .collect()
        });

        let links = self.links.map(|links| {
            let mut map = BTreeMap::new();
            for (platform, url) in [
                (LinkPlatform::Github, links.github),
                (LinkPlatform::Linkedin, links.linkedin),
                (LinkPlatform::Portfolio, links.portfolio),
            ] {
                if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
                    map.insert(platform, url);
                }
            }
            map
        });

        ProfileUpdate {
            username: self.username.map(|u| u.trim().to_string()),
            bio: self.bio.map(|b| b.trim().to_string()),
            skills,
            education,
            links,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponseDto {
    #[serde(flatten)]
    pub profile: Profile,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardDto {
    pub credits: i32,
    pub reputation: Option<f64>,
    pub posted_gigs: Vec<Gig>,
    pub applications: Vec<Application>,
}

/// Base64 payload, optionally wrapped in a `data:` URL.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadFileDto {
    #[validate(length(min = 1, message = "File data is required"))]
    pub data: String,
    pub file_name: Option<String>,
}
