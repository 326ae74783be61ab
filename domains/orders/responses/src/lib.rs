use chrono::{DateTime, Utc};
use order_models::{Order, OrderLine};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d-%H:%M";
pub const UNNAMED_CLIENT: &str = "Name not specified";

/// Listing view of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    /// `YYYY-MM-DD-HH:MM`, UTC.
    pub created_at: String,
    pub items: Vec<OrderLine>,
    pub total_price: f64,
    pub phone_number: String,
    pub name: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let name = if order.name.trim().is_empty() {
            UNNAMED_CLIENT.to_string()
        }
        else {
            order.name
        };

        Self {
            id: order.id,
            created_at: order.created_at.format(CREATED_AT_FORMAT).to_string(),
            items: order.items,
            total_price: order.total_price,
            phone_number: order.phone_number,
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderPageResponse {
    pub orders: Vec<OrderResponse>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatedOrderResponse {
    pub order_id: i32,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
    pub total_price: f64,
    pub phone_number: String,
    pub name: String,
}

impl From<Order> for CreatedOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            created_at: order.created_at,
            items: order.items,
            total_price: order.total_price,
            phone_number: order.phone_number,
            name: order.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn listing_formats_time_and_fills_missing_name() {
        let order = Order::builder()
            .id(5)
            .created_at(Utc.with_ymd_and_hms(2024, 3, 9, 17, 4, 0).unwrap())
            .items(vec![])
            .total_price(1800.0)
            .phone_number("+79990001122")
            .build();

        let response = OrderResponse::from(order);
        assert_eq!(response.created_at, "2024-03-09-17:04");
        assert_eq!(response.name, UNNAMED_CLIENT);
    }
}
