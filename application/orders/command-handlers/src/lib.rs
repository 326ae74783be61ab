use cache_invalidation::{InvalidationCoordinator, Mutation};
use catalog_store::SharedCatalogStore;
use database_traits::GenericDao;
use order_commands::{CreateOrderCommand, DeleteOrderCommand, OrderPrincipal};
use order_errors::OrderError;
use order_models::{NewOrder, OrderLine};
use order_responses::CreatedOrderResponse;
use order_store::SharedOrderStore;
use pricing::{PriceLine, price_bulk};
use tracing::{info, instrument};

/// Prices an order against the catalog, stores it, then drops every cached
/// view it changes.
#[derive(Clone)]
pub struct CreateOrderHandler {
    catalog: SharedCatalogStore,
    orders: SharedOrderStore,
    invalidation: InvalidationCoordinator,
}

impl CreateOrderHandler {
    pub fn new(
        catalog: SharedCatalogStore, orders: SharedOrderStore,
        invalidation: InvalidationCoordinator,
    ) -> Self {
        Self {
            catalog,
            orders,
            invalidation,
        }
    }

    #[instrument(skip(self, command), fields(lines = command.items.len()))]
    pub async fn execute(
        &self, principal: OrderPrincipal, command: CreateOrderCommand,
    ) -> Result<CreatedOrderResponse, OrderError> {
        command.validate()?;

        let mut lines = Vec::with_capacity(command.items.len());
        let mut price_lines = Vec::with_capacity(command.items.len());
        for request in command.items {
            let item = self.catalog.find_by_id(request.id).await?;
            price_lines.push(PriceLine::new(item.price, request.quantity));
            lines.push(OrderLine {
                id: item.id,
                quantity: request.quantity,
                selected_spice: request.selected_spice,
                meat: item.meat,
            });
        }
        let breakdown = price_bulk(&price_lines)?;

        let order = self
            .orders
            .create(NewOrder {
                items: lines,
                total_price: breakdown.total,
                phone_number: principal.phone_number.clone(),
                name: principal.name,
            })
            .await?;

        let report = self
            .invalidation
            .invalidate_for(Mutation::OrderCreated {
                phone_number: principal.phone_number,
            })
            .await;
        info!(
            order.id = order.id,
            order.total = order.total_price,
            cache.keys_deleted = report.keys_deleted,
            "order created"
        );

        Ok(order.into())
    }
}

#[derive(Clone)]
pub struct DeleteOrderHandler {
    orders: SharedOrderStore,
    invalidation: InvalidationCoordinator,
}

impl DeleteOrderHandler {
    pub fn new(
        orders: SharedOrderStore, invalidation: InvalidationCoordinator,
    ) -> Self {
        Self {
            orders,
            invalidation,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: DeleteOrderCommand,
    ) -> Result<(), OrderError> {
        let order = self.orders.delete(command.id).await?;

        self.invalidation
            .invalidate_for(Mutation::OrderDeleted {
                phone_number: order.phone_number,
            })
            .await;

        Ok(())
    }
}
