// service/gig_service.rs
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::Store,
    dtos::gigdtos::*,
    models::gigmodel::*,
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct GigService {
    db_client: Arc<dyn Store>,
}

impl GigService {
    pub fn new(db_client: Arc<dyn Store>) -> Self {
        Self { db_client }
    }

    pub async fn create_gig(
        &self,
        creator_id: Uuid,
        gig_data: CreateGigDto,
    ) -> Result<Gig, ServiceError> {
        gig_data
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let gig = self
            .db_client
            .create_gig(
                creator_id,
                gig_data.title.trim().to_string(),
                gig_data.description.trim().to_string(),
                gig_data.category,
                gig_data.credits,
            )
            .await
            .map_err(|e| {
                tracing::error!("failed to create gig for {}: {}", creator_id, e);
                ServiceError::from(e)
            })?;

        tracing::info!(
            "gig {} created by {} ({} credits, {})",
            gig.id,
            creator_id,
            gig.credits,
            gig.category.to_str()
        );

        Ok(gig)
    }

    /// Open gigs, newest first, narrowed by `filter`. The category list is
    /// taken from the unfiltered set.
    pub async fn list_open_gigs(
        &self,
        filter: &GigFilterQuery,
    ) -> Result<GigListResponseDto, ServiceError> {
        let gigs = self.db_client.get_open_gigs().await?;
        let categories = distinct_categories(&gigs);
        let gigs = filter_gigs(gigs, filter.search.as_deref(), filter.category);

        Ok(GigListResponseDto {
            results: gigs.len(),
            gigs,
            categories,
        })
    }

    pub async fn get_gig_detail(
        &self,
        gig_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<GigDetailDto, ServiceError> {
        let listing = self
            .db_client
            .get_gig_listing(gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(gig_id))?;

        let application_count = self.db_client.count_gig_applications(gig_id).await?;
        let my_application_status = self
            .db_client
            .get_user_application(gig_id, viewer_id)
            .await?
            .map(|application| application.status);

        Ok(GigDetailDto {
            is_owner: listing.gig.created_by == viewer_id,
            listing,
            application_count,
            my_application_status,
        })
    }

    pub async fn my_gigs(&self, creator_id: Uuid) -> Result<Vec<Gig>, ServiceError> {
        Ok(self.db_client.get_gigs_by_creator(creator_id).await?)
    }
}

/// Case-insensitive substring match on title or description plus an exact
/// category match. A blank search term applies no text filter.
pub fn filter_gigs(
    gigs: Vec<GigListing>,
    search: Option<&str>,
    category: Option<GigCategory>,
) -> Vec<GigListing> {
    let term = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    gigs.into_iter()
        .filter(|listing| match &term {
            Some(term) => {
                listing.gig.title.to_lowercase().contains(term)
                    || listing.gig.description.to_lowercase().contains(term)
            }
            None => true,
        })
        .filter(|listing| category.map_or(true, |c| listing.gig.category == c))
        .collect()
}

pub fn distinct_categories(gigs: &[GigListing]) -> Vec<GigCategory> {
    GigCategory::ALL
        .into_iter()
        .filter(|category| gigs.iter().any(|listing| listing.gig.category == *category))
        .collect()
}
