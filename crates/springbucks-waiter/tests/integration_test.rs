use springbucks_framework::consumer::EXCEPTION_MESSAGE_HEADER;
use springbucks_framework::{Envelope, FailurePolicy, Message, Publisher, Subscription};
use springbucks_waiter::config::WaiterConfig;
use springbucks_waiter::integration::{
    CUSTOMER_HEADER, FINISHED_ORDERS, NEW_ORDERS, NOTIFY_ORDERS_OUT,
};
use springbucks_waiter::lifecycle::WaiterSystem;
use springbucks_waiter::model::{OrderId, OrderState};
use std::collections::HashMap;
use std::time::Duration;

async fn next(subscription: &mut Subscription) -> Envelope {
    tokio::time::timeout(Duration::from_secs(2), subscription.recv())
        .await
        .expect("Timed out waiting for a message")
        .expect("Binding closed")
}

async fn finish(system: &WaiterSystem, id: OrderId) {
    system
        .bridge
        .send(FINISHED_ORDERS, Message::with_payload(id))
        .await
        .expect("Failed to publish finished order");
}

/// Full path: order placed, reported finished, customer notified.
#[tokio::test]
async fn test_finished_order_notifies_customer() {
    let system = WaiterSystem::start(&WaiterConfig::default())
        .await
        .expect("Failed to start");
    let mut notifications = system.bridge.subscribe(NOTIFY_ORDERS_OUT).await.unwrap();

    let id = system
        .order_service
        .create_order("Alice", vec!["latte".to_string()])
        .await
        .expect("Failed to create order");
    finish(&system, id).await;

    let envelope = next(&mut notifications).await;
    assert_eq!(envelope.payload, serde_json::json!(id.0));
    assert_eq!(envelope.header_value(CUSTOMER_HEADER), Some("Alice"));

    // The listener only reads: the order keeps its state.
    let order = system.order_service.get(id).await.unwrap();
    assert_eq!(order.state, OrderState::Init);

    let stats = system.shutdown().await.expect("Shutdown failed");
    assert_eq!(stats.received, 1);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_unknown_order_is_not_forwarded() {
    let system = WaiterSystem::start(&WaiterConfig::default()).await.unwrap();
    let mut notifications = system.bridge.subscribe(NOTIFY_ORDERS_OUT).await.unwrap();

    finish(&system, OrderId(99)).await;

    let stats = system.shutdown().await.expect("Shutdown failed");
    assert_eq!(stats.received, 1);
    assert_eq!(stats.failed, 1);

    // The bridge is gone; nothing was ever queued for the subscriber.
    assert!(notifications.recv().await.is_none());
}

#[tokio::test]
async fn test_failed_lookup_is_dead_lettered() {
    let config = WaiterConfig {
        failure_policy: FailurePolicy::DeadLetter("finishedOrders.dlq".to_string()),
        ..WaiterConfig::default()
    };
    let system = WaiterSystem::start(&config).await.unwrap();
    let mut dead_letters = system.bridge.subscribe("finishedOrders.dlq").await.unwrap();

    finish(&system, OrderId(99)).await;

    let envelope = next(&mut dead_letters).await;
    assert_eq!(envelope.payload, serde_json::json!(99));
    let reason = envelope
        .header_value(EXCEPTION_MESSAGE_HEADER)
        .expect("Missing exception header");
    assert!(reason.contains("Order not found: 99"), "unexpected reason: {reason}");

    let stats = system.shutdown().await.unwrap();
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_undecodable_payload_counts_as_failure() {
    let system = WaiterSystem::start(&WaiterConfig::default()).await.unwrap();

    system
        .bridge
        .send(FINISHED_ORDERS, Message::with_payload("not-an-id"))
        .await
        .unwrap();

    let stats = system.shutdown().await.unwrap();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_paying_sends_order_to_barista() {
    let system = WaiterSystem::start(&WaiterConfig::default()).await.unwrap();
    let mut new_orders = system.bridge.subscribe(NEW_ORDERS).await.unwrap();

    let id = system
        .order_service
        .create_order("Bob", vec!["espresso".to_string()])
        .await
        .unwrap();
    system
        .order_service
        .update_state(id, OrderState::Paid)
        .await
        .unwrap();

    let envelope = next(&mut new_orders).await;
    assert_eq!(envelope.payload, serde_json::json!(id.0));

    // Going backwards is refused and the order stays paid.
    assert!(system
        .order_service
        .update_state(id, OrderState::Init)
        .await
        .is_err());
    assert_eq!(
        system.order_service.get(id).await.unwrap().state,
        OrderState::Paid
    );

    system.shutdown().await.unwrap();
}

/// Concurrent events are independent: each id is paired with its own customer.
#[tokio::test]
async fn test_concurrent_finished_orders() {
    let system = WaiterSystem::start(&WaiterConfig::default()).await.unwrap();
    let mut notifications = system.bridge.subscribe(NOTIFY_ORDERS_OUT).await.unwrap();

    let mut expected = HashMap::new();
    for n in 0..10 {
        let customer = format!("customer-{n}");
        let id = system
            .order_service
            .create_order(&customer, vec!["americano".to_string()])
            .await
            .unwrap();
        expected.insert(id.0, customer);
    }

    let mut sends = tokio::task::JoinSet::new();
    for id in expected.keys().copied() {
        let bridge = system.bridge.clone();
        sends.spawn(async move {
            bridge
                .send(FINISHED_ORDERS, Message::with_payload(OrderId(id)))
                .await
        });
    }
    while let Some(sent) = sends.join_next().await {
        sent.unwrap().unwrap();
    }

    let mut seen = HashMap::new();
    for _ in 0..expected.len() {
        let envelope = next(&mut notifications).await;
        let id: u64 = serde_json::from_value(envelope.payload.clone()).unwrap();
        let customer = envelope.header_value(CUSTOMER_HEADER).unwrap().to_string();
        seen.insert(id, customer);
    }
    assert_eq!(seen, expected);

    let stats = system.shutdown().await.unwrap();
    assert_eq!(stats.succeeded, 10);
}

/// Events already taken by the listener are forwarded before shutdown
/// returns, even with handlers running on other worker threads.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_forwards_every_received_order() {
    let system = WaiterSystem::start(&WaiterConfig::default()).await.unwrap();
    let mut notifications = system.bridge.subscribe(NOTIFY_ORDERS_OUT).await.unwrap();

    let mut expected = HashMap::new();
    for n in 0..20 {
        let customer = format!("customer-{n}");
        let id = system
            .order_service
            .create_order(&customer, vec!["flat white".to_string()])
            .await
            .unwrap();
        expected.insert(id.0, customer);
    }
    for id in expected.keys().copied() {
        finish(&system, OrderId(id)).await;
    }

    let stats = system.shutdown().await.unwrap();
    assert_eq!(stats.received, 20);
    assert_eq!(stats.succeeded, stats.received);
    assert_eq!(stats.failed, 0);

    // Notifications were queued before the bridge closed.
    let mut seen = HashMap::new();
    while let Some(envelope) = notifications.recv().await {
        let id: u64 = serde_json::from_value(envelope.payload.clone()).unwrap();
        let customer = envelope.header_value(CUSTOMER_HEADER).unwrap().to_string();
        seen.insert(id, customer);
    }
    assert_eq!(seen, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_still_dead_letters_received_failures() {
    let config = WaiterConfig {
        failure_policy: FailurePolicy::DeadLetter("finishedOrders.dlq".to_string()),
        ..WaiterConfig::default()
    };
    let system = WaiterSystem::start(&config).await.unwrap();
    let mut dead_letters = system.bridge.subscribe("finishedOrders.dlq").await.unwrap();

    for id in 100..110 {
        finish(&system, OrderId(id)).await;
    }

    let stats = system.shutdown().await.unwrap();
    assert_eq!(stats.received, 10);
    assert_eq!(stats.failed, 10);

    let mut count = 0;
    while let Some(envelope) = dead_letters.recv().await {
        assert!(envelope.header_value(EXCEPTION_MESSAGE_HEADER).is_some());
        count += 1;
    }
    assert_eq!(count, 10);
}
