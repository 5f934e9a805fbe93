//! # Test Doubles
//!
//! Two kinds of doubles live here:
//!
//! - [`MockClient<T>`] hands out a real [`ResourceClient<T>`] whose requests are
//!   answered from a queue of expectations instead of a running store. Any
//!   request that does not match the next expectation panics the mock task, so
//!   the caller sees `ActorDropped`.
//! - [`RecordingPublisher`] implements [`Publisher`] and keeps every envelope it
//!   is given, so a test can assert exactly what was published.
//!
//! | Double | Use it for |
//! |--------|-----------|
//! | `MockClient` | code that reads or writes records through a client |
//! | `create_mock_client` + `expect_*` | asserting the exact request a client sends |
//! | `RecordingPublisher` | code that publishes to a binding |
//!
//! ```rust
//! use springbucks_framework::mock::RecordingPublisher;
//! use springbucks_framework::{Message, Publisher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let publisher = RecordingPublisher::new();
//!     publisher
//!         .send("notifyOrders-out-0", Message::with_payload(42u64).header("customer", "Alice"))
//!         .await
//!         .unwrap();
//!
//!     let published = publisher.published();
//!     assert_eq!(published.len(), 1);
//!     assert_eq!(published[0].0, "notifyOrders-out-0");
//!     assert_eq!(published[0].1.header_value("customer"), Some("Alice"));
//! }
//! ```

use crate::bridge::Publisher;
use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::envelope::Envelope;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
}

/// A mock client with expectation tracking.
///
/// Expectations are consumed in order. A request whose kind or id differs
/// from the next expectation is a test failure.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get {
                            id: expected,
                            response,
                        }),
                    ) => {
                        assert_eq!(id, expected, "Get for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update {
                            id: expected,
                            response,
                        }),
                    ) => {
                        assert_eq!(id, expected, "Update for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_get(&mut self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_create(&mut self) -> CreateExpectationBuilder<T> {
        CreateExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_update(&mut self, id: T::Id) -> UpdateExpectationBuilder<T> {
        UpdateExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: ActorEntity> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: ActorEntity> GetExpectationBuilder<T> {
    pub fn return_ok(self, value: Option<T>) {
        self.expectations.lock().unwrap().push_back(Expectation::Get {
            id: self.id,
            response: Ok(value),
        });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().unwrap().push_back(Expectation::Get {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `create` expectations.
pub struct CreateExpectationBuilder<T: ActorEntity> {
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: ActorEntity> CreateExpectationBuilder<T> {
    pub fn return_ok(self, id: T::Id) {
        self.expectations
            .lock()
            .unwrap()
            .push_back(Expectation::Create { response: Ok(id) });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations
            .lock()
            .unwrap()
            .push_back(Expectation::Create {
                response: Err(error),
            });
    }
}

/// Builder for `update` expectations.
pub struct UpdateExpectationBuilder<T: ActorEntity> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: ActorEntity> UpdateExpectationBuilder<T> {
    pub fn return_ok(self, value: T) {
        self.expectations.lock().unwrap().push_back(Expectation::Update {
            id: self.id,
            response: Ok(value),
        });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().unwrap().push_back(Expectation::Update {
            id: self.id,
            response: Err(error),
        });
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client and hands the test the receiving end of its channel, so
/// the test can inspect each request and answer it by hand.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request if it is a Get.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next request if it is an Update.
pub async fn expect_update<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Update,
    oneshot::Sender<Result<T, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

// =============================================================================
// RECORDING PUBLISHER
// =============================================================================

/// A [`Publisher`] that records instead of delivering.
///
/// Every successful send reports one delivery. After
/// [`fail_sends`](RecordingPublisher::fail_sends), sends are rejected with
/// `ActorClosed` and nothing is recorded.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<(String, Envelope)>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later send fail.
    pub fn fail_sends(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Snapshot of `(binding, envelope)` pairs in publish order.
    pub fn published(&self) -> Vec<(String, Envelope)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn send_envelope(
        &self,
        binding: &str,
        envelope: Envelope,
    ) -> Result<usize, FrameworkError> {
        if *self.failing.lock().unwrap() {
            return Err(FrameworkError::ActorClosed);
        }
        self.published
            .lock()
            .unwrap()
            .push((binding.to_string(), envelope));
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Cup {
        id: u64,
        size: u32,
    }

    #[derive(Debug)]
    struct CupCreate {
        size: u32,
    }

    #[derive(Debug)]
    struct CupUpdate {
        size: u32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("Cup error")]
    struct CupError;

    #[async_trait]
    impl ActorEntity for Cup {
        type Id = u64;
        type Create = CupCreate;
        type Update = CupUpdate;
        type Context = ();
        type Error = CupError;

        fn from_create_params(id: u64, params: CupCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                size: params.size,
            })
        }

        async fn on_update(&mut self, update: CupUpdate, _ctx: &()) -> Result<(), Self::Error> {
            self.size = update.size;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_raw_channel_helpers() {
        let (client, mut receiver) = create_mock_client::<Cup>(10);

        let update_task = tokio::spawn(async move { client.update(3, CupUpdate { size: 16 }).await });

        let (id, update, responder) = expect_update(&mut receiver)
            .await
            .expect("Expected Update request");
        assert_eq!(id, 3);
        assert_eq!(update.size, 16);
        responder.send(Ok(Cup { id: 3, size: 16 })).unwrap();

        let result = update_task.await.unwrap().unwrap();
        assert_eq!(result.size, 16);
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Cup>::new();
        mock.expect_create().return_ok(1);
        mock.expect_get(1).return_ok(Some(Cup { id: 1, size: 12 }));
        mock.expect_get(2).return_ok(None);

        let client = mock.client();
        assert_eq!(client.create(CupCreate { size: 12 }).await.unwrap(), 1);
        assert_eq!(client.get(1).await.unwrap().unwrap().size, 12);
        assert!(client.get(2).await.unwrap().is_none());

        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_client_mismatch_drops_response() {
        let mut mock = MockClient::<Cup>::new();
        mock.expect_get(1).return_ok(None);

        let result = mock.client().update(1, CupUpdate { size: 8 }).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }

    #[tokio::test]
    async fn test_recording_publisher_failure_records_nothing() {
        let publisher = RecordingPublisher::new();
        publisher.fail_sends();

        let result = publisher
            .send("notifyOrders-out-0", crate::Message::with_payload(1u64))
            .await;
        assert!(matches!(result, Err(FrameworkError::ActorClosed)));
        assert!(publisher.published().is_empty());
    }
}
