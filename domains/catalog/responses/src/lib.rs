use catalog_models::{CatalogItem, Spice};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogItemResponse {
    pub id: i32,
    pub meat: String,
    pub avail: bool,
    pub price: f64,
    pub spice: Spice,
}

impl From<CatalogItem> for CatalogItemResponse {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            meat: item.meat,
            avail: item.avail,
            price: item.price,
            spice: item.spice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogPageResponse {
    pub assortment: Vec<CatalogItemResponse>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceQuoteResponse {
    pub id: i32,
    pub meat: String,
    pub quantity: f64,
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkQuoteLineResponse {
    pub id: i32,
    pub meat: String,
    pub quantity: f64,
    /// Undiscounted line total.
    pub total_price: f64,
    #[serde(rename = "selectedSpice")]
    pub selected_spice: String,
    pub spice: Spice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkQuoteResponse {
    pub items: Vec<BulkQuoteLineResponse>,
    /// Basket total after the quantity discount.
    pub total_price: f64,
}

