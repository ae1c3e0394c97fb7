//! In-memory registry of analysis sessions.
//!
//! Each session stands in for one mounted screen. Nothing is persisted;
//! sessions live until deleted, until they sit idle longer than the
//! configured TTL, or until the process exits. Expired sessions are pruned
//! whenever a session is created or looked up.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::analysis::controller::AnalysisController;
use crate::analysis::extractor::TextExtractor;

struct SessionEntry {
    controller: Arc<AnalysisController>,
    last_touched: Instant,
}

impl SessionEntry {
    /// A handler still holding the controller keeps the session alive.
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        Arc::strong_count(&self.controller) == 1 && now.duration_since(self.last_touched) > ttl
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn ResumeAnalyzer>,
    loading_grace: Duration,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn ResumeAnalyzer>,
        loading_grace: Duration,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            extractor,
            analyzer,
            loading_grace,
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let controller = Arc::new(AnalysisController::new(
            self.extractor.clone(),
            self.analyzer.clone(),
            self.loading_grace,
        ));
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);
        sessions.insert(
            id,
            SessionEntry {
                controller,
                last_touched: now,
            },
        );
        info!("Created analysis session {id} ({} live)", sessions.len());
        id
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<AnalysisController>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = now;
        Some(entry.controller.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Discarded analysis session {id}");
        }
        removed
    }

    /// A throwaway controller for single-request analysis. No loading grace:
    /// there is no indicator to keep visible.
    pub fn ephemeral(&self) -> AnalysisController {
        AnalysisController::new(self.extractor.clone(), self.analyzer.clone(), Duration::ZERO)
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let ttl = self.idle_ttl;
        sessions.retain(|id, entry| {
            let expired = entry.is_expired(now, ttl);
            if expired {
                info!("Expired idle analysis session {id}");
            }
            !expired
        });
    }
}
