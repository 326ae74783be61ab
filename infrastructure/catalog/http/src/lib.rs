use std::sync::Arc;

use auth::{OwnerUser, SharedTokenIssuer};
use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use cache_invalidation::InvalidationCoordinator;
use catalog_command_handlers::{
    CreateCatalogItemHandler, DeleteCatalogItemHandler,
    UpdateCatalogItemHandler,
};
use catalog_commands::{
    CreateCatalogItemCommand, DeleteCatalogItemCommand,
    UpdateCatalogItemCommand,
};
use catalog_errors::pagination_error;
use catalog_queries::{
    GetCatalogItemQuery, ListCatalogQuery, QuoteBulkQuery, QuotePriceQuery,
};
use catalog_query_handlers::{
    GetCatalogItemQueryHandler, ListCatalogQueryHandler,
    QuoteBulkQueryHandler, QuotePriceQueryHandler,
};
use catalog_responses::{
    BulkQuoteResponse, CatalogItemResponse, CatalogPageResponse,
    PriceQuoteResponse,
};
use catalog_store::SharedCatalogStore;
use common_errors::{AppError, run_detached};
use dao_utils::PageRequest;
use redis_connection::core::CacheBackend;
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct CatalogServices {
    pub list_catalog: ListCatalogQueryHandler,
    pub get_item: GetCatalogItemQueryHandler,
    pub quote_price: QuotePriceQueryHandler,
    pub quote_bulk: QuoteBulkQueryHandler,

    pub create_item: CreateCatalogItemHandler,
    pub update_item: UpdateCatalogItemHandler,
    pub delete_item: DeleteCatalogItemHandler,

    pub tokens: SharedTokenIssuer,
}

impl CatalogServices {
    pub fn new(
        store: SharedCatalogStore, cache: Arc<CacheBackend>,
        tokens: SharedTokenIssuer,
    ) -> Self {
        let invalidation = InvalidationCoordinator::new(cache.clone());
        Self {
            list_catalog: ListCatalogQueryHandler::new(
                store.clone(),
                cache.clone(),
            ),
            get_item: GetCatalogItemQueryHandler::new(
                store.clone(),
                cache.clone(),
            ),
            quote_price: QuotePriceQueryHandler::new(store.clone()),
            quote_bulk: QuoteBulkQueryHandler::new(store.clone(), cache),
            create_item: CreateCatalogItemHandler::new(
                store.clone(),
                invalidation.clone(),
            ),
            update_item: UpdateCatalogItemHandler::new(
                store.clone(),
                invalidation.clone(),
            ),
            delete_item: DeleteCatalogItemHandler::new(store, invalidation),
            tokens,
        }
    }
}

impl FromRef<CatalogServices> for SharedTokenIssuer {
    fn from_ref(services: &CatalogServices) -> Self { services.tokens.clone() }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct CatalogPageParams {
    page: Option<i64>,
    size: Option<i64>,
}

impl CatalogPageParams {
    fn page_request(&self) -> Result<PageRequest, AppError> {
        PageRequest::from_params(self.page, self.size).map_err(pagination_error)
    }
}

#[utoipa::path(
    get,
    path = "/assortment",
    params(CatalogPageParams),
    responses(
        (status = 200, description = "One page of the assortment", body = CatalogPageResponse),
        (status = 400, description = "Invalid page or size", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip_all)]
pub async fn list_catalog(
    State(services): State<CatalogServices>,
    Query(params): Query<CatalogPageParams>,
) -> Result<Json<CatalogPageResponse>, AppError> {
    let query = ListCatalogQuery {
        page: params.page_request()?,
    };
    let page = services.list_catalog.execute(query).await?;

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/product/{id}",
    params(
        ("id" = i32, Path, description = "Catalog item ID")
    ),
    responses(
        (status = 200, description = "Catalog item found", body = CatalogItemResponse),
        (status = 404, description = "Catalog item not found", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip_all)]
pub async fn get_item(
    State(services): State<CatalogServices>, Path(id): Path<i32>,
) -> Result<Json<CatalogItemResponse>, AppError> {
    let item = services.get_item.execute(GetCatalogItemQuery { id }).await?;

    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/calculate-price",
    request_body = QuotePriceQuery,
    responses(
        (status = 200, description = "Undiscounted price for one line", body = PriceQuoteResponse),
        (status = 400, description = "Invalid quantity", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Catalog item not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "pricing"
)]
#[instrument(skip_all)]
pub async fn quote_price(
    State(services): State<CatalogServices>,
    Json(query): Json<QuotePriceQuery>,
) -> Result<Json<PriceQuoteResponse>, AppError> {
    let quote = services.quote_price.execute(query).await?;

    Ok(Json(quote))
}

#[utoipa::path(
    post,
    path = "/calculate-bulk",
    request_body = QuoteBulkQuery,
    responses(
        (status = 200, description = "Discounted price for several lines", body = BulkQuoteResponse),
        (status = 400, description = "Empty order or invalid quantity", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Catalog item not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "pricing"
)]
#[instrument(skip_all)]
pub async fn quote_bulk(
    State(services): State<CatalogServices>,
    Json(query): Json<QuoteBulkQuery>,
) -> Result<Json<BulkQuoteResponse>, AppError> {
    let quote = services.quote_bulk.execute(query).await?;

    Ok(Json(quote))
}

#[utoipa::path(
    post,
    path = "/product",
    request_body = CreateCatalogItemCommand,
    responses(
        (status = 201, description = "Catalog item created", body = CatalogItemResponse),
        (status = 400, description = "Invalid request data", body = common_errors::ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = common_errors::ApiErrorResponse),
        (status = 403, description = "Owner role required", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
#[instrument(skip_all)]
pub async fn create_item(
    OwnerUser(_owner): OwnerUser, State(services): State<CatalogServices>,
    Json(command): Json<CreateCatalogItemCommand>,
) -> Result<(StatusCode, Json<CatalogItemResponse>), AppError> {
    let handler = services.create_item.clone();
    let item = run_detached(async move {
        handler.execute(command).await.map_err(AppError::from)
    })
    .await?;

    tracing::info!("Catalog item created: {}", item.id);

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/product/{id}",
    request_body = UpdateCatalogItemCommand,
    params(
        ("id" = i32, Path, description = "Catalog item ID")
    ),
    responses(
        (status = 200, description = "Catalog item updated", body = CatalogItemResponse),
        (status = 400, description = "Invalid request data", body = common_errors::ApiErrorResponse),
        (status = 403, description = "Owner role required", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Catalog item not found", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
#[instrument(skip_all)]
pub async fn update_item(
    OwnerUser(_owner): OwnerUser, State(services): State<CatalogServices>,
    Path(id): Path<i32>, Json(command): Json<UpdateCatalogItemCommand>,
) -> Result<Json<CatalogItemResponse>, AppError> {
    let handler = services.update_item.clone();
    let item = run_detached(async move {
        handler.execute(id, command).await.map_err(AppError::from)
    })
    .await?;

    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/product/{id}",
    params(
        ("id" = i32, Path, description = "Catalog item ID")
    ),
    responses(
        (status = 204, description = "Catalog item deleted"),
        (status = 403, description = "Owner role required", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Catalog item not found", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
#[instrument(skip_all)]
pub async fn delete_item(
    OwnerUser(_owner): OwnerUser, State(services): State<CatalogServices>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let handler = services.delete_item.clone();
    run_detached(async move {
        handler
            .execute(DeleteCatalogItemCommand { id })
            .await
            .map_err(AppError::from)
    })
    .await?;

    tracing::info!("Catalog item deleted: {}", id);

    Ok(StatusCode::NO_CONTENT)
}
