#![recursion_limit = "256"]

use std::sync::Arc;

use auth::{AuthUser, OwnerUser, SharedTokenIssuer};
use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use cache_invalidation::InvalidationCoordinator;
use catalog_errors::pagination_error;
use catalog_store::SharedCatalogStore;
use common_errors::{AppError, run_detached};
use dao_utils::PageRequest;
use order_command_handlers::{CreateOrderHandler, DeleteOrderHandler};
use order_commands::{CreateOrderCommand, DeleteOrderCommand, OrderPrincipal};
use order_queries::{GetOrderQuery, ListClientOrdersQuery, ListOrdersQuery};
use order_query_handlers::{
    GetOrderQueryHandler, ListClientOrdersQueryHandler,
    ListOrdersQueryHandler,
};
use order_responses::{CreatedOrderResponse, OrderPageResponse, OrderResponse};
use order_store::SharedOrderStore;
use redis_connection::core::CacheBackend;
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct OrderServices {
    pub create_order: CreateOrderHandler,
    pub delete_order: DeleteOrderHandler,

    pub list_orders: ListOrdersQueryHandler,
    pub list_client_orders: ListClientOrdersQueryHandler,
    pub get_order: GetOrderQueryHandler,

    pub tokens: SharedTokenIssuer,
}

impl OrderServices {
    pub fn new(
        catalog: SharedCatalogStore, orders: SharedOrderStore,
        cache: Arc<CacheBackend>, tokens: SharedTokenIssuer,
    ) -> Self {
        let invalidation = InvalidationCoordinator::new(cache.clone());
        Self {
            create_order: CreateOrderHandler::new(
                catalog,
                orders.clone(),
                invalidation.clone(),
            ),
            delete_order: DeleteOrderHandler::new(orders.clone(), invalidation),
            list_orders: ListOrdersQueryHandler::new(
                orders.clone(),
                cache.clone(),
            ),
            list_client_orders: ListClientOrdersQueryHandler::new(
                orders.clone(),
                cache,
            ),
            get_order: GetOrderQueryHandler::new(orders),
            tokens,
        }
    }
}

impl FromRef<OrderServices> for SharedTokenIssuer {
    fn from_ref(services: &OrderServices) -> Self { services.tokens.clone() }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct OrderPageParams {
    page: Option<i64>,
    size: Option<i64>,
}

impl OrderPageParams {
    fn page_request(&self) -> Result<PageRequest, AppError> {
        PageRequest::from_params(self.page, self.size).map_err(pagination_error)
    }
}

#[utoipa::path(
    post,
    path = "/order",
    request_body = CreateOrderCommand,
    responses(
        (status = 201, description = "Order placed", body = CreatedOrderResponse),
        (status = 400, description = "Invalid order lines", body = common_errors::ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Catalog item not found", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip_all)]
pub async fn create_order(
    AuthUser(claims): AuthUser, State(services): State<OrderServices>,
    Json(command): Json<CreateOrderCommand>,
) -> Result<(StatusCode, Json<CreatedOrderResponse>), AppError> {
    let principal = OrderPrincipal {
        phone_number: claims.phone_number,
        name: claims.name,
    };
    let handler = services.create_order.clone();
    let order = run_detached(async move {
        handler
            .execute(principal, command)
            .await
            .map_err(AppError::from)
    })
    .await?;

    tracing::info!("Order placed: {}", order.order_id);

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/client/orders",
    params(OrderPageParams),
    responses(
        (status = 200, description = "Orders placed by the caller", body = OrderPageResponse),
        (status = 400, description = "Invalid page or size", body = common_errors::ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip_all)]
pub async fn list_client_orders(
    AuthUser(claims): AuthUser, State(services): State<OrderServices>,
    Query(params): Query<OrderPageParams>,
) -> Result<Json<OrderPageResponse>, AppError> {
    let query = ListClientOrdersQuery {
        phone_number: claims.phone_number,
        page: params.page_request()?,
    };
    let page = services.list_client_orders.execute(query).await?;

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/orders",
    params(OrderPageParams),
    responses(
        (status = 200, description = "All orders, newest first", body = OrderPageResponse),
        (status = 400, description = "Invalid page or size", body = common_errors::ApiErrorResponse),
        (status = 403, description = "Owner role required", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip_all)]
pub async fn list_orders(
    OwnerUser(_owner): OwnerUser, State(services): State<OrderServices>,
    Query(params): Query<OrderPageParams>,
) -> Result<Json<OrderPageResponse>, AppError> {
    let query = ListOrdersQuery {
        page: params.page_request()?,
    };
    let page = services.list_orders.execute(query).await?;

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Owner role required", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Order not found", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip_all)]
pub async fn get_order(
    OwnerUser(_owner): OwnerUser, State(services): State<OrderServices>,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = services.get_order.execute(GetOrderQuery { id }).await?;

    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Owner role required", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Order not found", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip_all)]
pub async fn delete_order(
    OwnerUser(_owner): OwnerUser, State(services): State<OrderServices>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let handler = services.delete_order.clone();
    run_detached(async move {
        handler
            .execute(DeleteOrderCommand { id })
            .await
            .map_err(AppError::from)
    })
    .await?;

    tracing::info!("Order deleted: {}", id);

    Ok(StatusCode::NO_CONTENT)
}
