// service/profile_service.rs
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::Store,
    dtos::profiledtos::*,
    models::profilemodel::*,
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct ProfileService {
    db_client: Arc<dyn Store>,
    starting_credits: i32,
}

/// `user_` followed by the first six hex digits of the address.
pub fn default_username(address: &str) -> String {
    let hex = address.strip_prefix("0x").unwrap_or(address);
    let prefix: String = hex.chars().take(6).collect();
    format!("user_{}", prefix.to_lowercase())
}

impl ProfileService {
    pub fn new(db_client: Arc<dyn Store>, starting_credits: i32) -> Self {
        Self {
            db_client,
            starting_credits,
        }
    }

    /// Finds the profile bound to a wallet, creating it on first sign-in.
    pub async fn find_or_create_by_address(&self, address: &str) -> Result<Profile, ServiceError> {
        let address = address.to_lowercase();

        if let Some(profile) = self.db_client.get_profile(None, Some(&address)).await? {
            return Ok(profile);
        }

        match self
            .db_client
            .create_profile(Some(&address), &default_username(&address), self.starting_credits)
            .await
        {
            Ok(profile) => {
                tracing::info!("profile {} created for wallet {}", profile.id, address);
                Ok(profile)
            }
            Err(e) => {
                // A concurrent first sign-in may have inserted the row already
                self.db_client
                    .get_profile(None, Some(&address))
                    .await?
                    .ok_or(ServiceError::Database(e))
            }
        }
    }

    pub async fn get_profile(&self, profile_id: Uuid) -> Result<ProfileResponseDto, ServiceError> {
        let profile = self
            .db_client
            .get_profile(Some(profile_id), None)
            .await?
            .ok_or(ServiceError::ProfileNotFound(profile_id))?;

        let skills = self
            .db_client
            .get_skills(profile_id)
            .await?
            .into_iter()
            .map(|skill| skill.skill)
            .collect();
        let education = self.db_client.get_education(profile_id).await?;
        let links = self.db_client.get_links(profile_id).await?;

        Ok(ProfileResponseDto {
            profile,
            skills,
            education,
            links,
        })
    }

    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        body: UpdateProfileDto,
    ) -> Result<ProfileResponseDto, ServiceError> {
        body.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        self.db_client
            .update_profile(profile_id, body.into_update())
            .await
            .map_err(|e| {
                tracing::error!("profile {} update failed: {}", profile_id, e);
                ServiceError::from(e)
            })?;

        tracing::info!("profile {} updated", profile_id);
        self.get_profile(profile_id).await
    }

    pub async fn set_media(
        &self,
        profile_id: Uuid,
        kind: MediaKind,
        url: &str,
    ) -> Result<Profile, ServiceError> {
        Ok(self.db_client.set_profile_media(profile_id, kind, url).await?)
    }

    pub async fn add_credits(&self, profile_id: Uuid, amount: i32) -> Result<Profile, ServiceError> {
        Ok(self.db_client.add_credits(profile_id, amount).await?)
    }

    pub async fn dashboard(&self, profile_id: Uuid) -> Result<DashboardDto, ServiceError> {
        let profile = self
            .db_client
            .get_profile(Some(profile_id), None)
            .await?
            .ok_or(ServiceError::ProfileNotFound(profile_id))?;

        let posted_gigs = self.db_client.get_gigs_by_creator(profile_id).await?;
        let applications = self.db_client.get_user_applications(profile_id).await?;

        Ok(DashboardDto {
            credits: profile.credits,
            reputation: profile.reputation,
            posted_gigs,
            applications,
        })
    }
}
