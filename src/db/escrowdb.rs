// db/escrowdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::DBClient;
use crate::models::escrowmodel::*;

#[async_trait]
pub trait EscrowExt {
    async fn create_escrow(
        &self,
        gig_id: Uuid,
        client_id: Uuid,
        amount: i32,
    ) -> Result<Escrow, Error>;

    async fn get_escrow(&self, escrow_id: Uuid) -> Result<Option<Escrow>, Error>;

    async fn get_client_escrows(&self, client_id: Uuid) -> Result<Vec<Escrow>, Error>;

    /// pending -> released, scoped to the client. `None` when no pending row
    /// owned by `client_id` matches.
    async fn release_escrow(
        &self,
        escrow_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Escrow>, Error>;
}

#[async_trait]
impl EscrowExt for DBClient {
    async fn create_escrow(
        &self,
        gig_id: Uuid,
        client_id: Uuid,
        amount: i32,
    ) -> Result<Escrow, Error> {
        sqlx::query_as::<_, Escrow>(
            r#"
            INSERT INTO escrow (gig_id, client_id, amount, status)
            VALUES ($1, $2, $3, 'pending'::escrow_status)
            RETURNING id, gig_id, client_id, amount, status, created_at, updated_at
            "#,
        )
        .bind(gig_id)
        .bind(client_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_escrow(&self, escrow_id: Uuid) -> Result<Option<Escrow>, Error> {
        sqlx::query_as::<_, Escrow>(
            r#"
            SELECT id, gig_id, client_id, amount, status, created_at, updated_at
            FROM escrow WHERE id = $1
            "#,
        )
        .bind(escrow_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_client_escrows(&self, client_id: Uuid) -> Result<Vec<Escrow>, Error> {
        sqlx::query_as::<_, Escrow>(
            r#"
            SELECT id, gig_id, client_id, amount, status, created_at, updated_at
            FROM escrow WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn release_escrow(
        &self,
        escrow_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Escrow>, Error> {
        sqlx::query_as::<_, Escrow>(
            r#"
            UPDATE escrow
            SET status = 'released'::escrow_status, updated_at = NOW()
            WHERE id = $1 AND client_id = $2 AND status = 'pending'::escrow_status
            RETURNING id, gig_id, client_id, amount, status, created_at, updated_at
            "#,
        )
        .bind(escrow_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
    }
}
