use dao_utils::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy)]
pub struct ListCatalogQuery {
    pub page: PageRequest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetCatalogItemQuery {
    pub id: i32,
}

/// Quote for one item, without quantity discounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct QuotePriceQuery {
    pub id: i32,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkQuoteLine {
    pub id: i32,
    pub quantity: f64,
    #[serde(rename = "selectedSpice", alias = "selected_spice", default)]
    pub selected_spice: String,
}

/// Quote for a basket; lines are priced in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuoteBulkQuery {
    pub items: Vec<BulkQuoteLine>,
}
