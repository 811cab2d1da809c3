// service/mining_service.rs
use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    dtos::walletdtos::{MiningClaimDto, MiningStatusDto},
    service::{error::ServiceError, profile_service::ProfileService},
};

/// Estimated ETH shown for one full cycle.
pub const ETH_PER_CYCLE: f64 = 0.0001;

#[derive(Debug, Clone)]
pub struct MiningSession {
    pub started_at: DateTime<Utc>,
}

/// Longest configurable cycle, one day.
pub const MAX_MINING_CYCLE_SECS: u64 = 24 * 60 * 60;

/// Simulated mining: a session runs for one cycle and, once complete, can be
/// claimed for a fixed credit reward. Sessions live in memory only.
#[derive(Debug, Clone)]
pub struct MiningService {
    profile_service: Arc<ProfileService>,
    cycle: Duration,
    reward_credits: i32,
    sessions: Arc<tokio::sync::RwLock<HashMap<Uuid, MiningSession>>>,
}

impl MiningService {
    pub fn new(profile_service: Arc<ProfileService>, cycle_secs: u64, reward_credits: i32) -> Self {
        Self {
            profile_service,
            cycle: Duration::seconds(cycle_secs.clamp(1, MAX_MINING_CYCLE_SECS) as i64),
            reward_credits,
            sessions: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }

    fn progress(&self, session: &MiningSession, now: DateTime<Utc>) -> u8 {
        let elapsed = (now - session.started_at).num_milliseconds().max(0);
        let cycle = self.cycle.num_milliseconds().max(1);
        (elapsed.saturating_mul(100) / cycle).min(100) as u8
    }

    fn describe(&self, session: Option<&MiningSession>, now: DateTime<Utc>) -> MiningStatusDto {
        let progress = session.map_or(0, |s| self.progress(s, now));
        MiningStatusDto {
            active: session.is_some(),
            started_at: session.map(|s| s.started_at),
            progress,
            complete: progress >= 100,
            estimated_eth: f64::from(progress) / 100.0 * ETH_PER_CYCLE,
            reward_credits: self.reward_credits,
        }
    }

    pub async fn start(&self, user_id: Uuid) -> Result<MiningStatusDto, ServiceError> {
        self.start_at(user_id, Utc::now()).await
    }

    async fn start_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<MiningStatusDto, ServiceError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&user_id) {
            return Err(ServiceError::MiningSession(
                "A mining session is already running".to_string(),
            ));
        }

        let session = MiningSession { started_at: now };
        let status = self.describe(Some(&session), now);
        sessions.insert(user_id, session);

        tracing::info!("mining started for {}", user_id);
        Ok(status)
    }

    pub async fn status(&self, user_id: Uuid) -> MiningStatusDto {
        self.status_at(user_id, Utc::now()).await
    }

    async fn status_at(&self, user_id: Uuid, now: DateTime<Utc>) -> MiningStatusDto {
        let sessions = self.sessions.read().await;
        self.describe(sessions.get(&user_id), now)
    }

    /// Abandons the running session without a reward.
    pub async fn stop(&self, user_id: Uuid) -> Result<MiningStatusDto, ServiceError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(&user_id)
            .ok_or(ServiceError::MiningSessionNotFound(user_id))?;

        tracing::info!("mining stopped for {}", user_id);
        Ok(self.describe(None, Utc::now()))
    }

    pub async fn claim(&self, user_id: Uuid) -> Result<MiningClaimDto, ServiceError> {
        self.claim_at(user_id, Utc::now()).await
    }

    async fn claim_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<MiningClaimDto, ServiceError> {
        let session = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get(&user_id)
                .ok_or(ServiceError::MiningSessionNotFound(user_id))?;
            if self.progress(session, now) < 100 {
                return Err(ServiceError::MiningSession(
                    "The mining cycle has not completed yet".to_string(),
                ));
            }
            sessions.remove(&user_id)
        };

        let profile = match self
            .profile_service
            .add_credits(user_id, self.reward_credits)
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                // Put the session back so the reward can be claimed again
                if let Some(session) = session {
                    self.sessions.write().await.insert(user_id, session);
                }
                tracing::error!("crediting mining reward to {} failed: {}", user_id, e);
                return Err(e);
            }
        };

        tracing::info!(
            "mining reward of {} credits claimed by {}",
            self.reward_credits,
            user_id
        );

        Ok(MiningClaimDto {
            credits_awarded: self.reward_credits,
            credits: profile.credits,
            estimated_eth: ETH_PER_CYCLE,
        })
    }
}
