use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

/// One line of a placed order. `meat` is copied from the catalog item at
/// the time the order was priced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: i32,
    pub quantity: f64,
    pub selected_spice: String,
    pub meat: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Order {
    #[builder(default)]
    pub id: i32,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
    pub total_price: f64,
    #[builder(setter(into))]
    pub phone_number: String,
    #[builder(default, setter(into))]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    pub total_price: f64,
    pub phone_number: String,
    pub name: String,
}

impl NewOrder {
    pub fn into_order(self, id: i32, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            created_at,
            items: self.items,
            total_price: self.total_price,
            phone_number: self.phone_number,
            name: self.name,
        }
    }
}
