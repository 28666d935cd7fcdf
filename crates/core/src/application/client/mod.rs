// Client - enqueue jobs into the queue store

pub mod push;

pub use push::PushRequest;

use crate::domain::{JobState, QueueId};
use crate::error::Result;
use crate::port::{IdProvider, JobStore, TimeProvider};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-queue job counts
pub type QueueStats = BTreeMap<QueueId, BTreeMap<JobState, i64>>;

pub struct Client {
    store: Arc<dyn JobStore>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Client {
    pub fn new(
        store: Arc<dyn JobStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            id_provider,
            time_provider,
        }
    }

    /// Enqueue a job, returning its ID
    pub async fn push(&self, req: PushRequest) -> Result<String> {
        push::execute(
            self.store.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Counts for every known queue and state
    pub async fn stats(&self) -> Result<QueueStats> {
        let mut stats = QueueStats::new();
        for queue in self.store.queue_names().await? {
            let mut counts = BTreeMap::new();
            for state in JobState::ALL {
                counts.insert(state, self.store.count_by_state(&queue, state).await?);
            }
            stats.insert(queue, counts);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::id_provider::SequentialIdProvider;
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::time_provider::FixedTimeProvider;
    use serde_json::json;

    #[tokio::test]
    async fn test_stats_counts_per_queue_and_state() {
        let store = Arc::new(InMemoryJobStore::new());
        let client = Client::new(
            store.clone(),
            Arc::new(SequentialIdProvider::default()),
            Arc::new(FixedTimeProvider(10)),
        );

        for queue in ["mail", "mail", "reports"] {
            client
                .push(PushRequest::new("Worker", json!([])).on_queue(queue))
                .await
                .unwrap();
        }
        store.pop_next("mail").await.unwrap().unwrap();

        let stats = client.stats().await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["mail"][&JobState::Queued], 1);
        assert_eq!(stats["mail"][&JobState::Running], 1);
        assert_eq!(stats["reports"][&JobState::Queued], 1);
        assert_eq!(stats["reports"][&JobState::Done], 0);
    }
}
