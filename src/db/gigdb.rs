// db/gigdb.rs
use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::DBClient;
use crate::models::gigmodel::*;

#[async_trait]
pub trait GigExt {
    async fn create_gig(
        &self,
        created_by: Uuid,
        title: String,
        description: String,
        category: GigCategory,
        credits: i32,
    ) -> Result<Gig, Error>;

    async fn get_gig(&self, gig_id: Uuid) -> Result<Option<Gig>, Error>;

    async fn get_gig_listing(&self, gig_id: Uuid) -> Result<Option<GigListing>, Error>;

    async fn get_open_gigs(&self) -> Result<Vec<GigListing>, Error>;

    async fn get_gigs_by_creator(&self, created_by: Uuid) -> Result<Vec<Gig>, Error>;

    /// Returns `None` when the user already has an application for the gig.
    async fn create_application(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
        cover_letter: String,
    ) -> Result<Option<Application>, Error>;

    async fn get_application(&self, application_id: Uuid) -> Result<Option<Application>, Error>;

    async fn get_user_application(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, Error>;

    async fn count_gig_applications(&self, gig_id: Uuid) -> Result<i64, Error>;

    async fn get_gig_applications(
        &self,
        gig_id: Uuid,
    ) -> Result<Vec<ApplicationWithApplicant>, Error>;

    async fn get_user_applications(&self, user_id: Uuid) -> Result<Vec<Application>, Error>;

    /// Accepts one application, assigns the gig to its author and rejects
    /// every other pending application, all in one transaction.
    async fn accept_application(
        &self,
        gig_id: Uuid,
        application_id: Uuid,
        owner_id: Uuid,
    ) -> Result<AcceptResult, Error>;

    /// pending -> rejected. `None` if the application is no longer pending.
    async fn reject_pending_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error>;
}

#[async_trait]
impl GigExt for DBClient {
    async fn create_gig(
        &self,
        created_by: Uuid,
        title: String,
        description: String,
        category: GigCategory,
        credits: i32,
    ) -> Result<Gig, Error> {
        sqlx::query_as::<_, Gig>(
            r#"
            INSERT INTO gigs (title, description, category, credits, created_by, status)
            VALUES ($1, $2, $3, $4, $5, 'open'::gig_status)
            RETURNING id, title, description, category, credits, created_by,
            status, assigned_to, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(credits)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_gig(&self, gig_id: Uuid) -> Result<Option<Gig>, Error> {
        sqlx::query_as::<_, Gig>(
            r#"
            SELECT id, title, description, category, credits, created_by,
            status, assigned_to, created_at, updated_at
            FROM gigs WHERE id = $1
            "#,
        )
        .bind(gig_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_gig_listing(&self, gig_id: Uuid) -> Result<Option<GigListing>, Error> {
        sqlx::query_as::<_, GigListing>(
            r#"
            SELECT
                g.id, g.title, g.description, g.category, g.credits, g.created_by,
                g.status, g.assigned_to, g.created_at, g.updated_at,
                p.username AS creator_username,
                p.avatar_url AS creator_avatar_url
            FROM gigs g
            LEFT JOIN profiles p ON p.id = g.created_by
            WHERE g.id = $1
            "#,
        )
        .bind(gig_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_open_gigs(&self) -> Result<Vec<GigListing>, Error> {
        sqlx::query_as::<_, GigListing>(
            r#"
            SELECT
                g.id, g.title, g.description, g.category, g.credits, g.created_by,
                g.status, g.assigned_to, g.created_at, g.updated_at,
                p.username AS creator_username,
                p.avatar_url AS creator_avatar_url
            FROM gigs g
            LEFT JOIN profiles p ON p.id = g.created_by
            WHERE g.status = 'open'::gig_status
            ORDER BY g.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_gigs_by_creator(&self, created_by: Uuid) -> Result<Vec<Gig>, Error> {
        sqlx::query_as::<_, Gig>(
            r#"
            SELECT id, title, description, category, credits, created_by,
            status, assigned_to, created_at, updated_at
            FROM gigs WHERE created_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_application(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
        cover_letter: String,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (gig_id, user_id, cover_letter, status)
            VALUES ($1, $2, $3, 'pending'::application_status)
            ON CONFLICT (gig_id, user_id) DO NOTHING
            RETURNING id, gig_id, user_id, cover_letter, status, created_at, updated_at
            "#,
        )
        .bind(gig_id)
        .bind(user_id)
        .bind(cover_letter)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_application(&self, application_id: Uuid) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            SELECT id, gig_id, user_id, cover_letter, status, created_at, updated_at
            FROM applications WHERE id = $1
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_application(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            SELECT id, gig_id, user_id, cover_letter, status, created_at, updated_at
            FROM applications WHERE gig_id = $1 AND user_id = $2
            "#,
        )
        .bind(gig_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn count_gig_applications(&self, gig_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications WHERE gig_id = $1")
            .bind(gig_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_gig_applications(
        &self,
        gig_id: Uuid,
    ) -> Result<Vec<ApplicationWithApplicant>, Error> {
        let mut applications = sqlx::query_as::<_, ApplicationWithApplicant>(
            r#"
            SELECT
                a.id, a.gig_id, a.user_id, a.cover_letter, a.status, a.created_at, a.updated_at,
                p.username AS applicant_username,
                p.avatar_url AS applicant_avatar_url,
                p.bio AS applicant_bio,
                p.reputation AS applicant_reputation
            FROM applications a
            LEFT JOIN profiles p ON p.id = a.user_id
            WHERE a.gig_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(gig_id)
        .fetch_all(&self.pool)
        .await?;

        if applications.is_empty() {
            return Ok(applications);
        }

        let applicant_ids: Vec<Uuid> = applications
            .iter()
            .map(|app| app.application.user_id)
            .collect();

        let skill_rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT user_id, skill FROM skills WHERE user_id = ANY($1) ORDER BY created_at",
        )
        .bind(&applicant_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut skills_by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (user_id, skill) in skill_rows {
            skills_by_user.entry(user_id).or_default().push(skill);
        }

        for app in applications.iter_mut() {
            app.applicant_skills = skills_by_user
                .get(&app.application.user_id)
                .cloned()
                .unwrap_or_default();
        }

        Ok(applications)
    }

    async fn get_user_applications(&self, user_id: Uuid) -> Result<Vec<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            SELECT id, gig_id, user_id, cover_letter, status, created_at, updated_at
            FROM applications WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn accept_application(
        &self,
        gig_id: Uuid,
        application_id: Uuid,
        owner_id: Uuid,
    ) -> Result<AcceptResult, Error> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock the gig so a concurrent accept waits for this one to finish
        let gig = sqlx::query_as::<_, Gig>(
            r#"
            SELECT id, title, description, category, credits, created_by,
            status, assigned_to, created_at, updated_at
            FROM gigs WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(gig_id)
        .fetch_optional(&mut *tx)
        .await?;

        let gig = match gig {
            Some(gig) => gig,
            None => return Ok(AcceptResult::GigNotFound),
        };

        if gig.created_by != owner_id {
            return Ok(AcceptResult::NotGigOwner);
        }

        if gig.status != GigStatus::Open {
            return Ok(AcceptResult::GigNotOpen(gig.status));
        }

        // 2. Lock the chosen application
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, gig_id, user_id, cover_letter, status, created_at, updated_at
            FROM applications WHERE id = $1 AND gig_id = $2
            FOR UPDATE
            "#,
        )
        .bind(application_id)
        .bind(gig_id)
        .fetch_optional(&mut *tx)
        .await?;

        let application = match application {
            Some(application) => application,
            None => return Ok(AcceptResult::ApplicationNotFound),
        };

        if application.status != ApplicationStatus::Pending {
            return Ok(AcceptResult::ApplicationNotPending(application.status));
        }

        // 3. Accept
        let accepted = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = 'accepted'::application_status, updated_at = NOW()
            WHERE id = $1
            RETURNING id, gig_id, user_id, cover_letter, status, created_at, updated_at
            "#,
        )
        .bind(application_id)
        .fetch_one(&mut *tx)
        .await?;

        // 4. Assign the gig, only if it is still open
        let assigned = sqlx::query_as::<_, Gig>(
            r#"
            UPDATE gigs
            SET status = 'assigned'::gig_status, assigned_to = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'open'::gig_status
            RETURNING id, title, description, category, credits, created_by,
            status, assigned_to, created_at, updated_at
            "#,
        )
        .bind(gig_id)
        .bind(accepted.user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let assigned = match assigned {
            Some(gig) => gig,
            None => {
                tx.rollback().await?;
                return Ok(AcceptResult::GigNotOpen(GigStatus::Assigned));
            }
        };

        // 5. Reject the siblings
        let rejected_application_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE applications
            SET status = 'rejected'::application_status, updated_at = NOW()
            WHERE gig_id = $1 AND id <> $2 AND status = 'pending'::application_status
            RETURNING id
            "#,
        )
        .bind(gig_id)
        .bind(application_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AcceptResult::Accepted(AcceptedApplication {
            gig: assigned,
            application: accepted,
            rejected_application_ids,
        }))
    }

    async fn reject_pending_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = 'rejected'::application_status, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'::application_status
            RETURNING id, gig_id, user_id, cover_letter, status, created_at, updated_at
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }
}
