//! # SpringBucks Waiter
//!
//! Runs one order through the whole flow:
//!
//! 1. Start the [`WaiterSystem`] with configuration from the environment.
//! 2. Place an order for Alice and pay for it; the waiter sends it to `newOrders`.
//! 3. A simulated barista brews it and reports it on `finishedOrders`.
//! 4. The order listener publishes the customer notification on `notifyOrders-out-0`.

use async_trait::async_trait;
use springbucks_framework::consumer::{self, Consumer, FailurePolicy};
use springbucks_framework::tracing::setup_tracing;
use springbucks_framework::{BridgeClient, Message, Publisher};
use springbucks_waiter::config::WaiterConfig;
use springbucks_waiter::integration::CUSTOMER_HEADER;
use springbucks_waiter::lifecycle::WaiterSystem;
use springbucks_waiter::model::{OrderId, OrderState};
use springbucks_waiter::order_actor::OrderError;
use springbucks_waiter::service::CoffeeOrderService;
use std::time::Duration;
use tracing::{error, info, Instrument};

/// Stand-in for the barista service: brews every new order and reports it.
struct BaristaSimulator {
    orders: CoffeeOrderService<BridgeClient>,
    bridge: BridgeClient,
    finished_orders: String,
}

#[async_trait]
impl Consumer for BaristaSimulator {
    type Payload = OrderId;
    type Error = OrderError;

    async fn accept(&self, message: Message<OrderId>) -> Result<(), OrderError> {
        let id = message.payload;
        info!(order_id = %id, "Barista picked up order");
        self.orders.update_state(id, OrderState::Brewing).await?;
        self.orders.update_state(id, OrderState::Brewed).await?;
        self.bridge
            .send(&self.finished_orders, Message::with_payload(id))
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenv::dotenv().ok();
    setup_tracing();

    let config = WaiterConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting waiter");

    let system = WaiterSystem::start(&config)
        .await
        .map_err(|e| e.to_string())?;

    let mut notifications = system
        .bridge
        .subscribe(&config.notify_orders_binding)
        .await
        .map_err(|e| e.to_string())?;

    consumer::bind(
        &system.bridge,
        &config.new_orders_binding,
        BaristaSimulator {
            orders: system.order_service.clone(),
            bridge: system.bridge.clone(),
            finished_orders: config.finished_orders_binding.clone(),
        },
        FailurePolicy::LogAndDrop,
    )
    .await
    .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("order_processing");
    let order_id = async {
        let id = system
            .order_service
            .create_order("Alice", vec!["latte".to_string(), "espresso".to_string()])
            .await?;
        system.order_service.update_state(id, OrderState::Paid).await?;
        Ok::<_, OrderError>(id)
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    match tokio::time::timeout(Duration::from_secs(5), notifications.recv()).await {
        Ok(Some(envelope)) => info!(
            order_id = %order_id,
            customer = envelope.header_value(CUSTOMER_HEADER).unwrap_or("<unknown>"),
            "Customer notified"
        ),
        Ok(None) => error!("Notification binding closed before the order was finished"),
        Err(_) => error!(order_id = %order_id, "No notification received"),
    }

    let stats = system.shutdown().await?;
    info!(?stats, "Application completed successfully");
    Ok(())
}
