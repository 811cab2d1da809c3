// service/escrow_service.rs
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::Store,
    dtos::gigdtos::CreateEscrowDto,
    models::escrowmodel::*,
    service::error::ServiceError,
};

/// Stand-alone escrow records. Nothing in the gig workflow creates or
/// releases them yet.
#[derive(Debug, Clone)]
pub struct EscrowService {
    db_client: Arc<dyn Store>,
}

impl EscrowService {
    pub fn new(db_client: Arc<dyn Store>) -> Self {
        Self { db_client }
    }

    pub async fn create_escrow(
        &self,
        client_id: Uuid,
        escrow_data: CreateEscrowDto,
    ) -> Result<Escrow, ServiceError> {
        escrow_data
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let gig = self
            .db_client
            .get_gig(escrow_data.gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(escrow_data.gig_id))?;

        let escrow = self
            .db_client
            .create_escrow(gig.id, client_id, escrow_data.amount)
            .await?;

        tracing::info!(
            "escrow {} of {} created for gig {} by {}",
            escrow.id,
            escrow.amount,
            gig.id,
            client_id
        );

        Ok(escrow)
    }

    pub async fn release_escrow(
        &self,
        escrow_id: Uuid,
        client_id: Uuid,
    ) -> Result<Escrow, ServiceError> {
        if let Some(released) = self.db_client.release_escrow(escrow_id, client_id).await? {
            tracing::info!("escrow {} released by {}", escrow_id, client_id);
            return Ok(released);
        }

        // Nothing was updated: work out why
        let escrow = self
            .db_client
            .get_escrow(escrow_id)
            .await?
            .filter(|escrow| escrow.client_id == client_id)
            .ok_or(ServiceError::EscrowNotFound(escrow_id))?;

        if !escrow.status.can_transition_to(EscrowStatus::Released) {
            tracing::warn!("escrow {} release refused, status {:?}", escrow_id, escrow.status);
            return Err(ServiceError::InvalidEscrowTransition(format!(
                "Cannot transition from {:?} to {:?}",
                escrow.status,
                EscrowStatus::Released
            )));
        }

        Err(ServiceError::Other(format!(
            "escrow {} could not be released",
            escrow_id
        )))
    }

    pub async fn list_my_escrows(&self, client_id: Uuid) -> Result<Vec<Escrow>, ServiceError> {
        Ok(self.db_client.get_client_escrows(client_id).await?)
    }
}
