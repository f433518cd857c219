//! Dispatcher
//!
//! Issues assembled feature requests against the serving backend and
//! reduces the individual outcomes into one verdict. A multi-request batch
//! fans out into one task per request under a shared deadline; the first
//! error observed wins and is reported without waiting for stragglers.

use crate::client::FeatureClient;
use crate::error::LoadError;
use crate::types::FeatureRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Reduced result of one dispatch, covering every request in the batch.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub success: bool,
    pub first_error: Option<LoadError>,
}

impl DispatchOutcome {
    fn ok() -> Self {
        DispatchOutcome {
            success: true,
            first_error: None,
        }
    }

    fn failed(error: LoadError) -> Self {
        DispatchOutcome {
            success: false,
            first_error: Some(error),
        }
    }
}

pub struct Dispatcher {
    client: Arc<dyn FeatureClient>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn FeatureClient>, timeout: Duration) -> Self {
        Dispatcher { client, timeout }
    }

    /// Dispatch a batch of requests, all under one deadline.
    ///
    /// An empty batch is vacuously successful. A single request is awaited
    /// in place. A larger batch spawns one task per request; outcomes are
    /// funneled through a channel buffered to the batch size, so tasks that
    /// finish after an early error return can still deliver their result
    /// without blocking or panicking. Already-started requests are not
    /// actively canceled; the shared deadline bounds them.
    pub async fn dispatch(&self, requests: Vec<FeatureRequest>) -> DispatchOutcome {
        let deadline = Instant::now() + self.timeout;

        match requests.len() {
            0 => DispatchOutcome::ok(),
            1 => {
                let request = &requests[0];
                match self.fetch_with_deadline(deadline, request).await {
                    Ok(()) => DispatchOutcome::ok(),
                    Err(error) => {
                        warn!(%error, "Dispatch failed");
                        DispatchOutcome::failed(error)
                    }
                }
            }
            batch_size => {
                let timeout = self.timeout;
                let (tx, mut rx) = mpsc::channel::<Result<(), LoadError>>(batch_size);
                for request in requests {
                    let client = Arc::clone(&self.client);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = match timeout_at(deadline, client.fetch_features(&request))
                            .await
                        {
                            Ok(result) => result.map(|_| ()),
                            Err(_) => Err(LoadError::Rpc(format!(
                                "Request deadline of {:?} exceeded",
                                timeout
                            ))),
                        };
                        // Capacity covers every task; send only fails when
                        // the reducer already returned, and that outcome is
                        // intentionally dropped.
                        let _ = tx.send(result).await;
                    });
                }
                drop(tx);

                for completed in 0..batch_size {
                    match rx.recv().await {
                        Some(Ok(())) => {}
                        Some(Err(error)) => {
                            warn!(%error, completed, batch_size, "Dispatch failed");
                            return DispatchOutcome::failed(error);
                        }
                        None => break,
                    }
                }
                debug!(batch_size, "Dispatch batch completed");
                DispatchOutcome::ok()
            }
        }
    }

    async fn fetch_with_deadline(
        &self,
        deadline: Instant,
        request: &FeatureRequest,
    ) -> Result<(), LoadError> {
        match timeout_at(deadline, self.client.fetch_features(request)).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(LoadError::Rpc(format!(
                "Request deadline of {:?} exceeded",
                self.timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FeatureClient;
    use crate::types::FeatureResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake serving backend: succeeds or fails per request index, with an
    /// optional artificial delay.
    struct FakeClient {
        fail_on: Option<usize>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakeClient {
        fn succeeding() -> Self {
            FakeClient {
                fail_on: None,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_on(index: usize) -> Self {
            FakeClient {
                fail_on: Some(index),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            FakeClient {
                fail_on: None,
                delay: Some(delay),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeatureClient for FakeClient {
        async fn fetch_features(
            &self,
            _request: &FeatureRequest,
        ) -> Result<FeatureResponse, LoadError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_on == Some(index) {
                return Err(LoadError::Rpc("injected failure".to_string()));
            }
            Ok(FeatureResponse {
                field_values: vec![],
            })
        }

        async fn ping(&self) -> Result<(), LoadError> {
            Ok(())
        }
    }

    fn request() -> FeatureRequest {
        FeatureRequest {
            project: "default".to_string(),
            features: vec!["f1".to_string()],
            entities: vec![],
        }
    }

    fn dispatcher(client: FakeClient, timeout: Duration) -> Dispatcher {
        Dispatcher::new(Arc::new(client), timeout)
    }

    #[tokio::test]
    async fn test_empty_batch_is_success() {
        let d = dispatcher(FakeClient::succeeding(), Duration::from_secs(1));
        let outcome = d.dispatch(vec![]).await;
        assert!(outcome.success);
        assert!(outcome.first_error.is_none());
    }

    #[tokio::test]
    async fn test_single_request_success() {
        let d = dispatcher(FakeClient::succeeding(), Duration::from_secs(1));
        let outcome = d.dispatch(vec![request()]).await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_single_request_failure_carries_error() {
        let d = dispatcher(FakeClient::failing_on(0), Duration::from_secs(1));
        let outcome = d.dispatch(vec![request()]).await;
        assert!(!outcome.success);
        assert!(outcome
            .first_error
            .unwrap()
            .to_string()
            .contains("injected failure"));
    }

    #[tokio::test]
    async fn test_all_succeeding_batch_is_success() {
        let d = dispatcher(FakeClient::succeeding(), Duration::from_secs(1));
        let outcome = d.dispatch((0..8).map(|_| request()).collect()).await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_one_failure_fails_the_batch() {
        for fail_index in [0, 3, 7] {
            let d = dispatcher(FakeClient::failing_on(fail_index), Duration::from_secs(1));
            let outcome = d.dispatch((0..8).map(|_| request()).collect()).await;
            assert!(!outcome.success, "batch should fail when call {} fails", fail_index);
            assert!(outcome
                .first_error
                .unwrap()
                .to_string()
                .contains("injected failure"));
        }
    }

    #[tokio::test]
    async fn test_failure_reported_before_stragglers_finish() {
        // One request fails immediately while the rest sleep well past the
        // test's patience; the reducer must not wait for them.
        struct MixedClient {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl FeatureClient for MixedClient {
            async fn fetch_features(
                &self,
                _request: &FeatureRequest,
            ) -> Result<FeatureResponse, LoadError> {
                let index = self.calls.fetch_add(1, Ordering::SeqCst);
                if index == 0 {
                    return Err(LoadError::Rpc("fast failure".to_string()));
                }
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(FeatureResponse {
                    field_values: vec![],
                })
            }

            async fn ping(&self) -> Result<(), LoadError> {
                Ok(())
            }
        }

        let d = Dispatcher::new(
            Arc::new(MixedClient {
                calls: AtomicUsize::new(0),
            }),
            Duration::from_secs(60),
        );
        let started = std::time::Instant::now();
        let outcome = d.dispatch((0..4).map(|_| request()).collect()).await;
        assert!(!outcome.success);
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "dispatch waited on stragglers"
        );
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_an_rpc_error() {
        let d = dispatcher(
            FakeClient::slow(Duration::from_secs(30)),
            Duration::from_millis(50),
        );
        let outcome = d.dispatch(vec![request(), request()]).await;
        assert!(!outcome.success);
        assert!(outcome
            .first_error
            .unwrap()
            .to_string()
            .contains("deadline"));
    }
}
