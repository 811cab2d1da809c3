// db/profiledb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::DBClient;
use crate::{
    models::profilemodel::*,
    utils::sync::{diff_education, diff_links, diff_skills},
};

#[async_trait]
pub trait ProfileExt {
    async fn get_profile(
        &self,
        profile_id: Option<Uuid>,
        address: Option<&str>,
    ) -> Result<Option<Profile>, Error>;

    async fn create_profile(
        &self,
        address: Option<&str>,
        username: &str,
        credits: i32,
    ) -> Result<Profile, Error>;

    /// Applies `update` in one transaction. Child collections are diffed
    /// against what is stored so unchanged rows are never rewritten.
    async fn update_profile(
        &self,
        profile_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, Error>;

    async fn set_profile_media(
        &self,
        profile_id: Uuid,
        kind: MediaKind,
        url: &str,
    ) -> Result<Profile, Error>;

    async fn add_credits(&self, profile_id: Uuid, amount: i32) -> Result<Profile, Error>;

    async fn get_skills(&self, profile_id: Uuid) -> Result<Vec<Skill>, Error>;

    async fn get_education(&self, profile_id: Uuid) -> Result<Vec<Education>, Error>;

    async fn get_links(&self, profile_id: Uuid) -> Result<Vec<Link>, Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn get_profile(
        &self,
        profile_id: Option<Uuid>,
        address: Option<&str>,
    ) -> Result<Option<Profile>, Error> {
        let mut profile: Option<Profile> = None;

        if let Some(profile_id) = profile_id {
            profile = sqlx::query_as::<_, Profile>(
                r#"
                SELECT id, username, address, credits, bio, avatar_url, resume_url,
                reputation, created_at, updated_at
                FROM profiles WHERE id = $1
                "#,
            )
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(address) = address {
            profile = sqlx::query_as::<_, Profile>(
                r#"
                SELECT id, username, address, credits, bio, avatar_url, resume_url,
                reputation, created_at, updated_at
                FROM profiles WHERE address = LOWER($1)
                "#,
            )
            .bind(address)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(profile)
    }

    async fn create_profile(
        &self,
        address: Option<&str>,
        username: &str,
        credits: i32,
    ) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (address, username, credits)
            VALUES (LOWER($1), $2, $3)
            RETURNING id, username, address, credits, bio, avatar_url, resume_url,
            reputation, created_at, updated_at
            "#,
        )
        .bind(address)
        .bind(username)
        .bind(credits)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_profile(
        &self,
        profile_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, Error> {
        let mut tx = self.pool.begin().await?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET username = COALESCE($2, username),
                bio = COALESCE($3, bio),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, address, credits, bio, avatar_url, resume_url,
            reputation, created_at, updated_at
            "#,
        )
        .bind(profile_id)
        .bind(update.username)
        .bind(update.bio)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(skills) = update.skills {
            let existing = sqlx::query_as::<_, Skill>(
                "SELECT id, user_id, skill, created_at FROM skills WHERE user_id = $1 FOR UPDATE",
            )
            .bind(profile_id)
            .fetch_all(&mut *tx)
            .await?;

            let diff = diff_skills(&existing, &skills);
            if diff.is_empty() {
                tracing::debug!("skills of {} unchanged", profile_id);
            }
            if !diff.to_delete.is_empty() {
                sqlx::query("DELETE FROM skills WHERE id = ANY($1)")
                    .bind(&diff.to_delete)
                    .execute(&mut *tx)
                    .await?;
            }
            for skill in diff.to_insert {
                sqlx::query("INSERT INTO skills (user_id, skill) VALUES ($1, $2)")
                    .bind(profile_id)
                    .bind(skill)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        if let Some(education) = update.education {
            let existing = sqlx::query_as::<_, Education>(
                r#"
                SELECT id, user_id, degree, institution, year, position, created_at
                FROM education WHERE user_id = $1 FOR UPDATE
                "#,
            )
            .bind(profile_id)
            .fetch_all(&mut *tx)
            .await?;

            let diff = diff_education(&existing, &education);
            if diff.is_empty() {
                tracing::debug!("education of {} unchanged", profile_id);
            }
            if !diff.to_delete.is_empty() {
                sqlx::query("DELETE FROM education WHERE id = ANY($1)")
                    .bind(&diff.to_delete)
                    .execute(&mut *tx)
                    .await?;
            }
            for (id, position) in diff.to_reposition {
                sqlx::query("UPDATE education SET position = $2 WHERE id = $1")
                    .bind(id)
                    .bind(position)
                    .execute(&mut *tx)
                    .await?;
            }
            for (position, entry) in diff.to_insert {
                sqlx::query(
                    r#"
                    INSERT INTO education (user_id, degree, institution, year, position)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(profile_id)
                .bind(entry.degree)
                .bind(entry.institution)
                .bind(entry.year)
                .bind(position)
                .execute(&mut *tx)
                .await?;
            }
        }

        if let Some(links) = update.links {
            let existing = sqlx::query_as::<_, Link>(
                "SELECT id, user_id, platform, url, created_at FROM links WHERE user_id = $1 FOR UPDATE",
            )
            .bind(profile_id)
            .fetch_all(&mut *tx)
            .await?;

            let diff = diff_links(&existing, &links);
            for platform in diff.to_delete {
                sqlx::query("DELETE FROM links WHERE user_id = $1 AND platform = $2")
                    .bind(profile_id)
                    .bind(platform)
                    .execute(&mut *tx)
                    .await?;
            }
            for (platform, url) in diff.to_upsert {
                sqlx::query(
                    r#"
                    INSERT INTO links (user_id, platform, url) VALUES ($1, $2, $3)
                    ON CONFLICT (user_id, platform) DO UPDATE SET url = EXCLUDED.url
                    "#,
                )
                .bind(profile_id)
                .bind(platform)
                .bind(url)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(profile)
    }

    async fn set_profile_media(
        &self,
        profile_id: Uuid,
        kind: MediaKind,
        url: &str,
    ) -> Result<Profile, Error> {
        let query = match kind {
            MediaKind::Avatar => {
                r#"
                UPDATE profiles SET avatar_url = $2, updated_at = NOW() WHERE id = $1
                RETURNING id, username, address, credits, bio, avatar_url, resume_url,
                reputation, created_at, updated_at
                "#
            }
            MediaKind::Resume => {
                r#"
                UPDATE profiles SET resume_url = $2, updated_at = NOW() WHERE id = $1
                RETURNING id, username, address, credits, bio, avatar_url, resume_url,
                reputation, created_at, updated_at
                "#
            }
        };

        sqlx::query_as::<_, Profile>(query)
            .bind(profile_id)
            .bind(url)
            .fetch_one(&self.pool)
            .await
    }

    async fn add_credits(&self, profile_id: Uuid, amount: i32) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET credits = credits + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, address, credits, bio, avatar_url, resume_url,
            reputation, created_at, updated_at
            "#,
        )
        .bind(profile_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_skills(&self, profile_id: Uuid) -> Result<Vec<Skill>, Error> {
        sqlx::query_as::<_, Skill>(
            "SELECT id, user_id, skill, created_at FROM skills WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_education(&self, profile_id: Uuid) -> Result<Vec<Education>, Error> {
        sqlx::query_as::<_, Education>(
            r#"
            SELECT id, user_id, degree, institution, year, position, created_at
            FROM education WHERE user_id = $1
            ORDER BY position, created_at
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_links(&self, profile_id: Uuid) -> Result<Vec<Link>, Error> {
        sqlx::query_as::<_, Link>(
            "SELECT id, user_id, platform, url, created_at FROM links WHERE user_id = $1 ORDER BY platform",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
    }
}
