// Answer polling task.
//
// After a question is stored, answers are produced out-of-band by the
// backend. The poller re-fetches the conversation every `interval` until the
// newest entry carries an answer or `ceiling` elapses. Each fetch result is
// forwarded as an `ApiEvent` tagged with the poll generation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::DocumentApi;
use crate::config::PollingConfig;
use crate::protocol::ApiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        PollSettings {
            interval: config.interval(),
            ceiling: config.ceiling(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings::from(&PollingConfig::default())
    }
}

/// Why a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Answered,
    CeilingReached,
    /// The event receiver was dropped.
    Detached,
}

/// Spawn a poll loop for `document_id`. The loop reports its outcome with
/// `ApiEvent::PollingStopped` unless it is aborted first.
pub fn spawn_poller(
    api: Arc<dyn DocumentApi>,
    document_id: String,
    settings: PollSettings,
    generation: u64,
    tx: mpsc::Sender<ApiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = poll_until_answered(api.as_ref(), &document_id, settings, generation, &tx).await;
        info!(
            "Polling for document {} stopped: {:?} (generation {})",
            document_id, outcome, generation
        );
        let _ = tx
            .send(ApiEvent::PollingStopped {
                generation,
                outcome,
            })
            .await;
    })
}

/// Fetch the conversation every `settings.interval`, starting one interval
/// from now, until answered or `settings.ceiling` elapses. Fetch errors are
/// logged and the loop carries on.
pub async fn poll_until_answered(
    api: &dyn DocumentApi,
    document_id: &str,
    settings: PollSettings,
    generation: u64,
    tx: &mpsc::Sender<ApiEvent>,
) -> PollOutcome {
    let start = Instant::now();
    let deadline = start + settings.ceiling;
    let mut ticker = tokio::time::interval_at(start + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let polling = async {
        loop {
            ticker.tick().await;
            match api.list_questions(document_id).await {
                Ok(pairs) => {
                    let answered = pairs.last().is_some_and(|p| p.is_answered());
                    debug!(
                        "Poll fetched {} entries for {} (answered: {})",
                        pairs.len(),
                        document_id,
                        answered
                    );
                    let event = ApiEvent::ConversationRefreshed {
                        generation,
                        document_id: document_id.to_string(),
                        pairs,
                    };
                    if tx.send(event).await.is_err() {
                        return PollOutcome::Detached;
                    }
                    if answered {
                        return PollOutcome::Answered;
                    }
                }
                Err(e) => {
                    warn!("Poll fetch for {} failed: {}", document_id, e);
                }
            }
        }
    };

    match tokio::time::timeout_at(deadline, polling).await {
        Ok(outcome) => outcome,
        Err(_) => PollOutcome::CeilingReached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, UploadRequest};
    use crate::models::{Document, Notification, QnaPair, UploadResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers `list_questions` with an unanswered pair until `answer_on`
    /// fetches have happened, then with an answered one. `None` never
    /// answers. Fetch numbers in `fail_on` return an error instead.
    struct ScriptedApi {
        fetches: AtomicUsize,
        answer_on: Option<usize>,
        fail_on: Vec<usize>,
    }

    impl ScriptedApi {
        fn new(answer_on: Option<usize>) -> Self {
            ScriptedApi {
                fetches: AtomicUsize::new(0),
                answer_on,
                fail_on: Vec::new(),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentApi for ScriptedApi {
        async fn list_all_documents(&self) -> Result<Vec<Document>, ApiError> {
            unreachable!("not used by the poller")
        }
        async fn list_department_documents(&self, _: &str) -> Result<Vec<Document>, ApiError> {
            unreachable!("not used by the poller")
        }
        async fn upload_document(&self, _: UploadRequest) -> Result<UploadResponse, ApiError> {
            unreachable!("not used by the poller")
        }
        async fn list_questions(&self, _: &str) -> Result<Vec<QnaPair>, ApiError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&n) {
                return Err(ApiError::Http {
                    status: 502,
                    detail: "Bad Gateway".into(),
                });
            }
            let answered = self.answer_on.is_some_and(|k| n >= k);
            Ok(vec![QnaPair {
                id: "q1".into(),
                question_text: "Any deadlines?".into(),
                answer_text: answered.then(|| "October 15".to_string()),
                asked_at: "2025-09-22T10:00:00".into(),
            }])
        }
        async fn create_question(&self, _: &str, _: &str) -> Result<(), ApiError> {
            unreachable!("not used by the poller")
        }
        async fn list_notifications(&self, _: &str) -> Result<Vec<Notification>, ApiError> {
            unreachable!("not used by the poller")
        }
    }

    fn drain(rx: &mut mpsc::Receiver<ApiEvent>) -> Vec<ApiEvent> {
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        events
    }

    // The paused clock resolves deadlines to the next millisecond.
    fn assert_elapsed_near(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "elapsed {elapsed:?}, expected about {expected:?}"
        );
    }

    #[tokio::test]
    async fn stops_on_first_answer() {
        tokio::time::pause();
        let api = ScriptedApi::new(Some(2));
        let (tx, mut rx) = mpsc::channel(64);

        let start = Instant::now();
        let outcome = poll_until_answered(&api, "doc-1", PollSettings::default(), 7, &tx).await;

        assert_eq!(outcome, PollOutcome::Answered);
        assert_eq!(api.fetches(), 2);
        assert_elapsed_near(start, Duration::from_secs(6));

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        match events.last() {
            Some(ApiEvent::ConversationRefreshed {
                generation, pairs, ..
            }) => {
                assert_eq!(*generation, 7);
                assert!(pairs[0].is_answered());
            }
            other => panic!("expected ConversationRefreshed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_fetch_waits_one_interval() {
        tokio::time::pause();
        let api = ScriptedApi::new(Some(1));
        let (tx, _rx) = mpsc::channel(64);

        let start = Instant::now();
        let outcome = poll_until_answered(&api, "doc-1", PollSettings::default(), 1, &tx).await;
        assert_eq!(outcome, PollOutcome::Answered);
        assert_elapsed_near(start, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn never_answered_stops_at_ceiling() {
        tokio::time::pause();
        let api = ScriptedApi::new(None);
        let (tx, mut rx) = mpsc::channel(64);

        let start = Instant::now();
        let outcome = poll_until_answered(&api, "doc-1", PollSettings::default(), 1, &tx).await;

        assert_eq!(outcome, PollOutcome::CeilingReached);
        assert_elapsed_near(start, Duration::from_secs(30));
        let fetches = api.fetches();
        assert!((9..=10).contains(&fetches), "unexpected fetch count {fetches}");

        let events = drain(&mut rx);
        assert!(events.iter().all(|e| matches!(
            e,
            ApiEvent::ConversationRefreshed { pairs, .. } if !pairs[0].is_answered()
        )));
    }

    #[tokio::test]
    async fn fetch_errors_do_not_stop_polling() {
        tokio::time::pause();
        let mut api = ScriptedApi::new(Some(3));
        api.fail_on = vec![1, 2];
        let (tx, mut rx) = mpsc::channel(64);

        let outcome = poll_until_answered(&api, "doc-1", PollSettings::default(), 1, &tx).await;
        assert_eq!(outcome, PollOutcome::Answered);
        assert_eq!(api.fetches(), 3);
        // Only the successful fetch produced an event.
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn dropped_receiver_detaches() {
        tokio::time::pause();
        let api = ScriptedApi::new(None);
        let (tx, rx) = mpsc::channel(64);
        drop(rx);

        let outcome = poll_until_answered(&api, "doc-1", PollSettings::default(), 1, &tx).await;
        assert_eq!(outcome, PollOutcome::Detached);
        assert_eq!(api.fetches(), 1);
    }

    #[tokio::test]
    async fn spawned_poller_reports_outcome() {
        tokio::time::pause();
        let api: Arc<dyn DocumentApi> = Arc::new(ScriptedApi::new(Some(1)));
        let (tx, mut rx) = mpsc::channel(64);

        let handle = spawn_poller(api, "doc-1".into(), PollSettings::default(), 4, tx);
        handle.await.unwrap();

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(ApiEvent::PollingStopped {
                generation: 4,
                outcome: PollOutcome::Answered
            })
        ));
    }

    #[tokio::test]
    async fn aborted_poller_sends_nothing_more() {
        tokio::time::pause();
        let api = Arc::new(ScriptedApi::new(None));
        let (tx, mut rx) = mpsc::channel(64);

        let handle = spawn_poller(api.clone(), "doc-1".into(), PollSettings::default(), 1, tx);
        tokio::time::sleep(Duration::from_millis(3500)).await;
        handle.abort();
        let _ = handle.await;

        let fetched = api.fetches();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.fetches(), fetched);
        assert!(drain(&mut rx)
            .iter()
            .all(|e| !matches!(e, ApiEvent::PollingStopped { .. })));
    }
}
