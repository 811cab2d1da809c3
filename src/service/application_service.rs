// service/application_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::Store,
    dtos::gigdtos::QUICK_APPLY_COVER_LETTER,
    models::gigmodel::*,
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct ApplicationService {
    db_client: Arc<dyn Store>,
}

impl ApplicationService {
    pub fn new(db_client: Arc<dyn Store>) -> Self {
        Self { db_client }
    }

    pub async fn apply(
        &self,
        gig_id: Uuid,
        applicant_id: Uuid,
        cover_letter: &str,
    ) -> Result<Application, ServiceError> {
        let cover_letter = cover_letter.trim();
        if cover_letter.is_empty() {
            return Err(ServiceError::Validation(
                "Cover letter must not be empty".to_string(),
            ));
        }

        let gig = self
            .db_client
            .get_gig(gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(gig_id))?;

        if gig.created_by == applicant_id {
            return Err(ServiceError::Validation(
                "You cannot apply to your own gig".to_string(),
            ));
        }

        if gig.status != GigStatus::Open {
            return Err(ServiceError::InvalidGigStatus(gig_id, gig.status));
        }

        // Fast path for the common double-submit; the unique constraint decides races
        if self
            .db_client
            .get_user_application(gig_id, applicant_id)
            .await?
            .is_some()
        {
            tracing::warn!("user {} already applied to gig {}", applicant_id, gig_id);
            return Err(ServiceError::DuplicateApplication(gig_id));
        }

        let application = self
            .db_client
            .create_application(gig_id, applicant_id, cover_letter.to_string())
            .await?
            .ok_or(ServiceError::DuplicateApplication(gig_id))?;

        tracing::info!(
            "application {} submitted to gig {} by {}",
            application.id,
            gig_id,
            applicant_id
        );

        Ok(application)
    }

    pub async fn quick_apply(
        &self,
        gig_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Application, ServiceError> {
        self.apply(gig_id, applicant_id, QUICK_APPLY_COVER_LETTER).await
    }

    pub async fn my_application(
        &self,
        gig_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Application, ServiceError> {
        self.db_client
            .get_user_application(gig_id, applicant_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(gig_id))
    }

    pub async fn my_applications(&self, applicant_id: Uuid) -> Result<Vec<Application>, ServiceError> {
        Ok(self.db_client.get_user_applications(applicant_id).await?)
    }

    pub async fn list_for_gig(
        &self,
        gig_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<ApplicationWithApplicant>, ServiceError> {
        let gig = self
            .db_client
            .get_gig(gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(gig_id))?;

        if gig.created_by != owner_id {
            return Err(ServiceError::UnauthorizedGigAccess(owner_id, gig_id));
        }

        Ok(self.db_client.get_gig_applications(gig_id).await?)
    }

    /// Accepts `application_id`, assigns the gig and rejects the other pending
    /// applications. Either all of it happens or none of it does.
    pub async fn accept(
        &self,
        gig_id: Uuid,
        application_id: Uuid,
        owner_id: Uuid,
    ) -> Result<AcceptedApplication, ServiceError> {
        let result = self
            .db_client
            .accept_application(gig_id, application_id, owner_id)
            .await
            .map_err(|e| {
                tracing::error!("accept transaction for gig {} failed: {}", gig_id, e);
                ServiceError::from(e)
            })?;

        match result {
            AcceptResult::Accepted(accepted) => {
                tracing::info!(
                    "gig {} assigned to {} via application {}; {} sibling(s) rejected",
                    gig_id,
                    accepted.application.user_id,
                    application_id,
                    accepted.rejected_application_ids.len()
                );
                Ok(accepted)
            }
            AcceptResult::GigNotFound => Err(ServiceError::GigNotFound(gig_id)),
            AcceptResult::NotGigOwner => {
                tracing::warn!("user {} tried to accept on gig {} they do not own", owner_id, gig_id);
                Err(ServiceError::UnauthorizedGigAccess(owner_id, gig_id))
            }
            AcceptResult::GigNotOpen(GigStatus::Assigned) => {
                tracing::warn!("gig {} is already assigned, accept refused", gig_id);
                Err(ServiceError::GigAlreadyAssigned(gig_id))
            }
            AcceptResult::GigNotOpen(status) => Err(ServiceError::InvalidGigStatus(gig_id, status)),
            AcceptResult::ApplicationNotFound => {
                Err(ServiceError::ApplicationNotFound(application_id))
            }
            AcceptResult::ApplicationNotPending(status) => Err(
                ServiceError::InvalidApplicationStatus(application_id, status),
            ),
        }
    }

    /// pending -> rejected. The gig is left as it is.
    pub async fn reject(
        &self,
        application_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Application, ServiceError> {
        let application = self
            .db_client
            .get_application(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        let gig = self
            .db_client
            .get_gig(application.gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(application.gig_id))?;

        if gig.created_by != owner_id {
            return Err(ServiceError::UnauthorizedGigAccess(owner_id, gig.id));
        }

        if application.status != ApplicationStatus::Pending {
            return Err(ServiceError::InvalidApplicationStatus(
                application_id,
                application.status,
            ));
        }

        match self.db_client.reject_pending_application(application_id).await? {
            Some(rejected) => {
                tracing::info!("application {} on gig {} rejected", application_id, gig.id);
                Ok(rejected)
            }
            None => {
                // Lost a race with an accept or another reject
                let current = self
                    .db_client
                    .get_application(application_id)
                    .await?
                    .ok_or(ServiceError::ApplicationNotFound(application_id))?;
                Err(ServiceError::InvalidApplicationStatus(
                    application_id,
                    current.status,
                ))
            }
        }
    }
}
