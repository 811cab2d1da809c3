// db/memdb.rs
//! In-memory `Store` used by the service and handler tests. It keeps the
//! same uniqueness and conditional-update rules as the Postgres schema.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{EscrowExt, GigExt, ProfileExt};
use crate::{
    dtos::gigdtos::MIN_GIG_CREDITS,
    models::{escrowmodel::*, gigmodel::*, profilemodel::*},
    utils::sync::{diff_education, diff_links, diff_skills},
};

#[derive(Debug, Default)]
struct MemState {
    profiles: Vec<Profile>,
    skills: Vec<Skill>,
    education: Vec<Education>,
    links: Vec<Link>,
    gigs: Vec<Gig>,
    applications: Vec<Application>,
    escrow: Vec<Escrow>,
    tick: i64,
}

impl MemState {
    /// Strictly increasing timestamps so "newest first" ordering is stable.
    fn now(&mut self) -> chrono::DateTime<Utc> {
        self.tick += 1;
        Utc::now() + Duration::milliseconds(self.tick)
    }

    fn listing(&self, gig: &Gig) -> GigListing {
        let creator = self.profiles.iter().find(|p| p.id == gig.created_by);
        GigListing {
            gig: gig.clone(),
            creator_username: creator.and_then(|p| p.username.clone()),
            creator_avatar_url: creator.and_then(|p| p.avatar_url.clone()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemStore {
    state: Mutex<MemState>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored status of an application, bypassing the service layer.
    pub async fn application_status(&self, application_id: Uuid) -> Option<ApplicationStatus> {
        let state = self.state.lock().await;
        state
            .applications
            .iter()
            .find(|a| a.id == application_id)
            .map(|a| a.status)
    }
}

fn row_not_found() -> Error {
    Error::RowNotFound
}

#[async_trait]
impl ProfileExt for MemStore {
    async fn get_profile(
        &self,
        profile_id: Option<Uuid>,
        address: Option<&str>,
    ) -> Result<Option<Profile>, Error> {
        let state = self.state.lock().await;
        let found = if let Some(profile_id) = profile_id {
            state.profiles.iter().find(|p| p.id == profile_id)
        } else if let Some(address) = address {
            let address = address.to_lowercase();
            state
                .profiles
                .iter()
                .find(|p| p.address.as_deref() == Some(address.as_str()))
        } else {
            None
        };
        Ok(found.cloned())
    }

    async fn create_profile(
        &self,
        address: Option<&str>,
        username: &str,
        credits: i32,
    ) -> Result<Profile, Error> {
        let mut state = self.state.lock().await;
        let address = address.map(|a| a.to_lowercase());
        if address.is_some() && state.profiles.iter().any(|p| p.address == address) {
            return Err(Error::Protocol("duplicate key value violates unique constraint".into()));
        }
        let now = state.now();
        let profile = Profile {
            id: Uuid::new_v4(),
            username: Some(username.to_string()),
            address,
            credits,
            bio: None,
            avatar_url: None,
            resume_url: None,
            reputation: None,
            created_at: now,
            updated_at: now,
        };
        state.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        profile_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, Error> {
        let mut state = self.state.lock().await;
        let now = state.now();

        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(row_not_found)?;
        if let Some(username) = update.username {
            profile.username = Some(username);
        }
        if let Some(bio) = update.bio {
            profile.bio = Some(bio);
        }
        profile.updated_at = now;
        let profile = profile.clone();

        if let Some(skills) = update.skills {
            let existing: Vec<Skill> = state
                .skills
                .iter()
                .filter(|s| s.user_id == profile_id)
                .cloned()
                .collect();
            let diff = diff_skills(&existing, &skills);
            state.skills.retain(|s| !diff.to_delete.contains(&s.id));
            for skill in diff.to_insert {
                let created_at = state.now();
                state.skills.push(Skill {
                    id: Uuid::new_v4(),
                    user_id: profile_id,
                    skill,
                    created_at,
                });
            }
        }

        if let Some(education) = update.education {
            let existing: Vec<Education> = state
                .education
                .iter()
                .filter(|e| e.user_id == profile_id)
                .cloned()
                .collect();
            let diff = diff_education(&existing, &education);
            state.education.retain(|e| !diff.to_delete.contains(&e.id));
            for (id, position) in diff.to_reposition {
                if let Some(row) = state.education.iter_mut().find(|e| e.id == id) {
                    row.position = position;
                }
            }
            for (position, entry) in diff.to_insert {
                let created_at = state.now();
                state.education.push(Education {
                    id: Uuid::new_v4(),
                    user_id: profile_id,
                    degree: entry.degree,
                    institution: entry.institution,
                    year: entry.year,
                    position,
                    created_at,
                });
            }
        }

        if let Some(links) = update.links {
            let existing: Vec<Link> = state
                .links
                .iter()
                .filter(|l| l.user_id == profile_id)
                .cloned()
                .collect();
            let diff = diff_links(&existing, &links);
            state
                .links
                .retain(|l| !(l.user_id == profile_id && diff.to_delete.contains(&l.platform)));
            for (platform, url) in diff.to_upsert {
                let created_at = state.now();
                match state
                    .links
                    .iter_mut()
                    .find(|l| l.user_id == profile_id && l.platform == platform)
                {
                    Some(link) => link.url = url,
                    None => state.links.push(Link {
                        id: Uuid::new_v4(),
                        user_id: profile_id,
                        platform,
                        url,
                        created_at,
                    }),
                }
            }
        }

        Ok(profile)
    }

    async fn set_profile_media(
        &self,
        profile_id: Uuid,
        kind: MediaKind,
        url: &str,
    ) -> Result<Profile, Error> {
        let mut state = self.state.lock().await;
        let now = state.now();
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(row_not_found)?;
        match kind {
            MediaKind::Avatar => profile.avatar_url = Some(url.to_string()),
            MediaKind::Resume => profile.resume_url = Some(url.to_string()),
        }
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn add_credits(&self, profile_id: Uuid, amount: i32) -> Result<Profile, Error> {
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(row_not_found)?;
        profile.credits += amount;
        Ok(profile.clone())
    }

    async fn get_skills(&self, profile_id: Uuid) -> Result<Vec<Skill>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .skills
            .iter()
            .filter(|s| s.user_id == profile_id)
            .cloned()
            .collect())
    }

    async fn get_education(&self, profile_id: Uuid) -> Result<Vec<Education>, Error> {
        let state = self.state.lock().await;
        let mut education: Vec<Education> = state
            .education
            .iter()
            .filter(|e| e.user_id == profile_id)
            .cloned()
            .collect();
        education.sort_by_key(|e| (e.position, e.created_at));
        Ok(education)
    }

    async fn get_links(&self, profile_id: Uuid) -> Result<Vec<Link>, Error> {
        let state = self.state.lock().await;
        let mut links: Vec<Link> = state
            .links
            .iter()
            .filter(|l| l.user_id == profile_id)
            .cloned()
            .collect();
        links.sort_by_key(|l| l.platform);
        Ok(links)
    }
}

#[async_trait]
impl GigExt for MemStore {
    async fn create_gig(
        &self,
        created_by: Uuid,
        title: String,
        description: String,
        category: GigCategory,
        credits: i32,
    ) -> Result<Gig, Error> {
        let mut state = self.state.lock().await;
        if credits < MIN_GIG_CREDITS {
            return Err(Error::Protocol("violates check constraint gigs_credits_check".into()));
        }
        let now = state.now();
        let gig = Gig {
            id: Uuid::new_v4(),
            title,
            description,
            category,
            credits,
            created_by,
            status: GigStatus::Open,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };
        state.gigs.push(gig.clone());
        Ok(gig)
    }

    async fn get_gig(&self, gig_id: Uuid) -> Result<Option<Gig>, Error> {
        let state = self.state.lock().await;
        Ok(state.gigs.iter().find(|g| g.id == gig_id).cloned())
    }

    async fn get_gig_listing(&self, gig_id: Uuid) -> Result<Option<GigListing>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .gigs
            .iter()
            .find(|g| g.id == gig_id)
            .map(|g| state.listing(g)))
    }

    async fn get_open_gigs(&self) -> Result<Vec<GigListing>, Error> {
        let state = self.state.lock().await;
        let mut gigs: Vec<GigListing> = state
            .gigs
            .iter()
            .filter(|g| g.status == GigStatus::Open)
            .map(|g| state.listing(g))
            .collect();
        gigs.sort_by(|a, b| b.gig.created_at.cmp(&a.gig.created_at));
        Ok(gigs)
    }

    async fn get_gigs_by_creator(&self, created_by: Uuid) -> Result<Vec<Gig>, Error> {
        let state = self.state.lock().await;
        let mut gigs: Vec<Gig> = state
            .gigs
            .iter()
            .filter(|g| g.created_by == created_by)
            .cloned()
            .collect();
        gigs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(gigs)
    }

    async fn create_application(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
        cover_letter: String,
    ) -> Result<Option<Application>, Error> {
        let mut state = self.state.lock().await;
        if state
            .applications
            .iter()
            .any(|a| a.gig_id == gig_id && a.user_id == user_id)
        {
            return Ok(None);
        }
        let now = state.now();
        let application = Application {
            id: Uuid::new_v4(),
            gig_id,
            user_id,
            cover_letter,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.applications.push(application.clone());
        Ok(Some(application))
    }

    async fn get_application(&self, application_id: Uuid) -> Result<Option<Application>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .applications
            .iter()
            .find(|a| a.id == application_id)
            .cloned())
    }

    async fn get_user_application(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .applications
            .iter()
            .find(|a| a.gig_id == gig_id && a.user_id == user_id)
            .cloned())
    }

    async fn count_gig_applications(&self, gig_id: Uuid) -> Result<i64, Error> {
        let state = self.state.lock().await;
        Ok(state.applications.iter().filter(|a| a.gig_id == gig_id).count() as i64)
    }

    async fn get_gig_applications(
        &self,
        gig_id: Uuid,
    ) -> Result<Vec<ApplicationWithApplicant>, Error> {
        let state = self.state.lock().await;
        let mut applications: Vec<ApplicationWithApplicant> = state
            .applications
            .iter()
            .filter(|a| a.gig_id == gig_id)
            .map(|a| {
                let applicant = state.profiles.iter().find(|p| p.id == a.user_id);
                ApplicationWithApplicant {
                    application: a.clone(),
                    applicant_username: applicant.and_then(|p| p.username.clone()),
                    applicant_avatar_url: applicant.and_then(|p| p.avatar_url.clone()),
                    applicant_bio: applicant.and_then(|p| p.bio.clone()),
                    applicant_reputation: applicant.and_then(|p| p.reputation),
                    applicant_skills: state
                        .skills
                        .iter()
                        .filter(|s| s.user_id == a.user_id)
                        .map(|s| s.skill.clone())
                        .collect(),
                }
            })
            .collect();
        applications.sort_by(|a, b| b.application.created_at.cmp(&a.application.created_at));
        Ok(applications)
    }

    async fn get_user_applications(&self, user_id: Uuid) -> Result<Vec<Application>, Error> {
        let state = self.state.lock().await;
        let mut applications: Vec<Application> = state
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }

    async fn accept_application(
        &self,
        gig_id: Uuid,
        application_id: Uuid,
        owner_id: Uuid,
    ) -> Result<AcceptResult, Error> {
        // Holding the lock for the whole call stands in for the row locks.
        let mut state = self.state.lock().await;

        let gig = match state.gigs.iter().find(|g| g.id == gig_id) {
            Some(gig) => gig.clone(),
            None => return Ok(AcceptResult::GigNotFound),
        };
        if gig.created_by != owner_id {
            return Ok(AcceptResult::NotGigOwner);
        }
        if gig.status != GigStatus::Open {
            return Ok(AcceptResult::GigNotOpen(gig.status));
        }

        let application = match state
            .applications
            .iter()
            .find(|a| a.id == application_id && a.gig_id == gig_id)
        {
            Some(application) => application.clone(),
            None => return Ok(AcceptResult::ApplicationNotFound),
        };
        if application.status != ApplicationStatus::Pending {
            return Ok(AcceptResult::ApplicationNotPending(application.status));
        }

        let now = state.now();
        let mut rejected_application_ids = Vec::new();
        let mut accepted = application.clone();
        for app in state.applications.iter_mut().filter(|a| a.gig_id == gig_id) {
            if app.id == application_id {
                app.status = ApplicationStatus::Accepted;
                app.updated_at = now;
                accepted = app.clone();
            } else if app.status == ApplicationStatus::Pending {
                app.status = ApplicationStatus::Rejected;
                app.updated_at = now;
                rejected_application_ids.push(app.id);
            }
        }

        let gig = state
            .gigs
            .iter_mut()
            .find(|g| g.id == gig_id)
            .ok_or_else(row_not_found)?;
        gig.status = GigStatus::Assigned;
        gig.assigned_to = Some(accepted.user_id);
        gig.updated_at = now;
        let gig = gig.clone();

        Ok(AcceptResult::Accepted(AcceptedApplication {
            gig,
            application: accepted,
            rejected_application_ids,
        }))
    }

    async fn reject_pending_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        let mut state = self.state.lock().await;
        let now = state.now();
        Ok(state
            .applications
            .iter_mut()
            .find(|a| a.id == application_id && a.status == ApplicationStatus::Pending)
            .map(|a| {
                a.status = ApplicationStatus::Rejected;
                a.updated_at = now;
                a.clone()
            }))
    }
}

#[async_trait]
impl EscrowExt for MemStore {
    async fn create_escrow(
        &self,
        gig_id: Uuid,
        client_id: Uuid,
        amount: i32,
    ) -> Result<Escrow, Error> {
        let mut state = self.state.lock().await;
        let now = state.now();
        let escrow = Escrow {
            id: Uuid::new_v4(),
            gig_id,
            client_id,
            amount,
            status: EscrowStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.escrow.push(escrow.clone());
        Ok(escrow)
    }

    async fn get_escrow(&self, escrow_id: Uuid) -> Result<Option<Escrow>, Error> {
        let state = self.state.lock().await;
        Ok(state.escrow.iter().find(|e| e.id == escrow_id).cloned())
    }

    async fn get_client_escrows(&self, client_id: Uuid) -> Result<Vec<Escrow>, Error> {
        let state = self.state.lock().await;
        let mut escrows: Vec<Escrow> = state
            .escrow
            .iter()
            .filter(|e| e.client_id == client_id)
            .cloned()
            .collect();
        escrows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(escrows)
    }

    async fn release_escrow(
        &self,
        escrow_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Escrow>, Error> {
        let mut state = self.state.lock().await;
        let now = state.now();
        Ok(state
            .escrow
            .iter_mut()
            .find(|e| {
                e.id == escrow_id && e.client_id == client_id && e.status == EscrowStatus::Pending
            })
            .map(|e| {
                e.status = EscrowStatus::Released;
                e.updated_at = now;
                e.clone()
            }))
    }
}
