use std::sync::Arc;

use chrono::Utc;
use tokio::{
    sync::RwLock,
    time::{Duration, interval},
};

use crate::services::session_service::SessionStore;

#[derive(Clone)]
pub struct BackgroundJobsService {
    sessions: Arc<RwLock<SessionStore>>,
    sweep_interval: Duration,
}

impl BackgroundJobsService {
    pub fn new(sessions: Arc<RwLock<SessionStore>>, sweep_interval: Duration) -> Self {
        Self {
            sessions,
            sweep_interval,
        }
    }

    /// Start all background jobs
    pub fn start_all_jobs(&self) {
        let jobs_service = self.clone();

        // Drop expired sessions and their vote records
        tokio::spawn(async move {
            let mut interval = interval(jobs_service.sweep_interval);
            loop {
                interval.tick().await;
                jobs_service.cleanup_expired_sessions().await;
            }
        });

        tracing::info!("Background jobs started");
    }

    pub async fn cleanup_expired_sessions(&self) -> usize {
        let removed = self.sessions.write().await.purge_expired(Utc::now());
        if removed > 0 {
            tracing::debug!("Removed {} expired sessions", removed);
        }
        removed
    }
}
