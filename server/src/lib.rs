use std::sync::Arc;

use auth::{SharedCredentialVerifier, SharedTokenIssuer};
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use catalog_http::CatalogServices;
use catalog_store::SharedCatalogStore;
use order_http::OrderServices;
use order_store::SharedOrderStore;
use redis_connection::core::CacheBackend;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use user_command_handlers::RegisterByOwnerHandler;
use user_commands::RegisterByOwnerCommand;
use user_errors::UserError;
use user_http::UserServices;
use user_models::Role;
use user_store::SharedUserStore;
use utoipa::{
    Modify, OpenApi, ToSchema,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_rapidoc::RapiDoc;

use crate::config::OwnerBootstrap;

pub mod config;

/// The relational stores the service runs on.
#[derive(Clone)]
pub struct Stores {
    pub catalog: SharedCatalogStore,
    pub orders: SharedOrderStore,
    pub users: SharedUserStore,
}

#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogServices,
    pub orders: OrderServices,
    pub users: UserServices,
    pub cache: Arc<CacheBackend>,
}

impl AppServices {
    pub fn new(
        stores: Stores, cache: Arc<CacheBackend>, tokens: SharedTokenIssuer,
        verifier: SharedCredentialVerifier,
    ) -> Self {
        Self {
            catalog: CatalogServices::new(
                stores.catalog.clone(),
                cache.clone(),
                tokens.clone(),
            ),
            orders: OrderServices::new(
                stores.catalog,
                stores.orders,
                cache.clone(),
                tokens.clone(),
            ),
            users: UserServices::new(stores.users, verifier, tokens, cache.clone()),
            cache,
        }
    }
}

pub fn router(services: AppServices) -> Router {
    let api_routes = Router::new()
        .route("/assortment", get(catalog_http::list_catalog))
        .route("/product", post(catalog_http::create_item))
        .route(
            "/product/{id}",
            get(catalog_http::get_item)
                .put(catalog_http::update_item)
                .delete(catalog_http::delete_item),
        )
        .route("/calculate-price", post(catalog_http::quote_price))
        .route("/calculate-bulk", post(catalog_http::quote_bulk))
        .with_state(services.catalog)
        .route("/order", post(order_http::create_order))
        .route("/orders", get(order_http::list_orders))
        .route(
            "/orders/{id}",
            get(order_http::get_order).delete(order_http::delete_order),
        )
        .route("/client/orders", get(order_http::list_client_orders))
        .with_state(services.orders)
        .route("/register", post(user_http::register))
        .route("/login", post(user_http::login))
        .route("/admin/register", post(user_http::register_by_owner))
        .with_state(services.users);

    Router::new()
        .route("/health", get(health_check))
        .with_state(services.cache)
        .merge(api_routes)
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/docs"))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Creates the configured owner unless the username is already taken.
/// Returns whether an account was created.
pub async fn bootstrap_owner(
    users: SharedUserStore, verifier: SharedCredentialVerifier,
    owner: OwnerBootstrap,
) -> Result<bool, UserError> {
    let handler = RegisterByOwnerHandler::new(users, verifier);
    let command = RegisterByOwnerCommand {
        username: owner.username,
        password: owner.password,
        phone_number: owner.phone_number,
        name: owner.name,
        role: Role::Owner,
    };

    match handler.execute(command).await {
        Ok(created) => {
            info!(username = %created.user.username, "owner account created");
            Ok(true)
        }
        Err(UserError::NameExists) => Ok(false),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
async fn health_check(
    State(cache): State<Arc<CacheBackend>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: cache.kind(),
    })
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        catalog_http::list_catalog,
        catalog_http::get_item,
        catalog_http::quote_price,
        catalog_http::quote_bulk,
        catalog_http::create_item,
        catalog_http::update_item,
        catalog_http::delete_item,
        order_http::create_order,
        order_http::list_client_orders,
        order_http::list_orders,
        order_http::get_order,
        order_http::delete_order,
        user_http::register,
        user_http::register_by_owner,
        user_http::login
    ),
    components(
        schemas(
            HealthResponse,
            common_errors::ApiErrorResponse,
            catalog_models::Spice,
            catalog_commands::CreateCatalogItemCommand,
            catalog_commands::UpdateCatalogItemCommand,
            catalog_queries::QuotePriceQuery,
            catalog_queries::QuoteBulkQuery,
            catalog_queries::BulkQuoteLine,
            catalog_responses::CatalogItemResponse,
            catalog_responses::CatalogPageResponse,
            catalog_responses::PriceQuoteResponse,
            catalog_responses::BulkQuoteResponse,
            catalog_responses::BulkQuoteLineResponse,
            order_commands::CreateOrderCommand,
            order_commands::OrderLineRequest,
            order_models::OrderLine,
            order_responses::OrderResponse,
            order_responses::OrderPageResponse,
            order_responses::CreatedOrderResponse,
            user_commands::RegisterUserCommand,
            user_commands::RegisterByOwnerCommand,
            user_commands::LoginCommand,
            user_responses::RegisteredResponse,
            user_responses::RegisteredByOwnerResponse,
            user_responses::TokenResponse,
            user_responses::UserResponse,
            user_models::Role,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Assortment endpoints"),
        (name = "pricing", description = "Price quote endpoints"),
        (name = "orders", description = "Order endpoints"),
        (name = "users", description = "Registration and login endpoints")
    ),
    info(
        title = "Smokehouse API",
        description = "Catalog and ordering service for a smoked-meat shop",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
