use crate::clients::OrderClient;
use crate::config::WaiterConfig;
use crate::integration::{Barista, OrderListener};
use crate::order_actor;
use crate::service::CoffeeOrderService;
use springbucks_framework::consumer;
use springbucks_framework::{BindingStats, BridgeClient, FrameworkError, StreamBridge};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The waiter's runtime: order store, stream bridge and the finished-order
/// listener, wired together.
///
/// # Example
///
/// ```rust
/// use springbucks_waiter::config::WaiterConfig;
/// use springbucks_waiter::lifecycle::WaiterSystem;
///
/// #[tokio::main]
/// async fn main() {
///     let system = WaiterSystem::start(&WaiterConfig::default()).await.unwrap();
///     let id = system
///         .order_service
///         .create_order("Alice", vec!["latte".to_string()])
///         .await
///         .unwrap();
///     assert_eq!(system.order_service.get(id).await.unwrap().customer, "Alice");
///     system.shutdown().await.unwrap();
/// }
/// ```
pub struct WaiterSystem {
    pub order_service: CoffeeOrderService<BridgeClient>,

    /// Direct access to the store, for callers that bypass the service rules.
    pub order_client: OrderClient,

    /// Publish to or subscribe on any binding.
    pub bridge: BridgeClient,

    listener: JoinHandle<BindingStats>,
    finished_orders: String,
    handles: Vec<JoinHandle<()>>,
}

impl WaiterSystem {
    /// Spawns the store and the bridge, then binds the listener. The listener
    /// is subscribed by the time this returns.
    pub async fn start(config: &WaiterConfig) -> Result<Self, FrameworkError> {
        // Order store
        let (order_actor, order_resource_client) = order_actor::new(config.buffer_size);
        let order_client = OrderClient::new(order_resource_client);
        let order_handle = tokio::spawn(order_actor.run(()));

        // Broker
        let (bridge_actor, bridge) = StreamBridge::new(config.buffer_size);
        let bridge_handle = tokio::spawn(bridge_actor.run());

        let barista = Barista::new(bridge.clone()).with_binding(&config.new_orders_binding);
        let order_service = CoffeeOrderService::new(order_client.clone(), barista);

        // The listener reads through its own client clone; it never gets the service.
        let listener = OrderListener::new(order_client.clone(), bridge.clone())
            .with_output_binding(&config.notify_orders_binding)
            .with_lookup_timeout(config.lookup_timeout);
        let listener = consumer::bind_with_limit(
            &bridge,
            &config.finished_orders_binding,
            listener,
            config.failure_policy.clone(),
            config.buffer_size,
        )
        .await?;

        info!(
            finished = %config.finished_orders_binding,
            notify = %config.notify_orders_binding,
            new_orders = %config.new_orders_binding,
            "Waiter started"
        );

        Ok(Self {
            order_service,
            order_client,
            bridge,
            listener,
            finished_orders: config.finished_orders_binding.clone(),
            handles: vec![order_handle, bridge_handle],
        })
    }

    /// Shuts everything down and returns the listener's counters.
    ///
    /// 1. Unsubscribe the finished-orders binding; no new events are taken
    /// 2. Wait for the listener to handle what it already received, while the
    ///    bridge still accepts its notifications and dead letters
    /// 3. Close the bridge
    /// 4. Drop the remaining clients; the order store stops
    /// 5. Await the actor tasks
    pub async fn shutdown(self) -> Result<BindingStats, String> {
        info!("Shutting down waiter...");

        self.bridge
            .unsubscribe(&self.finished_orders)
            .await
            .map_err(|e| e.to_string())?;
        let stats = self.listener.await.map_err(|e| {
            error!("Listener task failed: {:?}", e);
            format!("Listener task failed: {:?}", e)
        })?;

        self.bridge.close().await.map_err(|e| e.to_string())?;

        drop(self.order_service);
        drop(self.order_client);
        drop(self.bridge);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!(
            received = stats.received,
            failed = stats.failed,
            "Waiter shutdown complete."
        );
        Ok(stats)
    }
}
