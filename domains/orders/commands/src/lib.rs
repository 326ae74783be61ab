use order_errors::OrderError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub id: i32,
    pub quantity: f64,
    #[serde(alias = "selectedSpice")]
    pub selected_spice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderCommand {
    pub items: Vec<OrderLineRequest>,
}

impl CreateOrderCommand {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::Validation(
                "an order needs at least one line".into(),
            ));
        }
        for line in &self.items {
            if !line.quantity.is_finite() || line.quantity <= 0.0 {
                return Err(OrderError::Validation(format!(
                    "quantity for item {} must be a positive number",
                    line.id
                )));
            }
            if line.selected_spice.trim().is_empty() {
                return Err(OrderError::Validation(format!(
                    "item {} needs a selected spice",
                    line.id
                )));
            }
        }
        Ok(())
    }
}

/// The authenticated principal an order is placed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPrincipal {
    pub phone_number: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteOrderCommand {
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: f64, spice: &str) -> OrderLineRequest {
        OrderLineRequest {
            id: 1,
            quantity,
            selected_spice: spice.into(),
        }
    }

    #[test]
    fn accepts_either_spice_spelling() {
        let cmd: CreateOrderCommand = serde_json::from_str(
            r#"{"items":[{"id":1,"quantity":2,"selectedSpice":"Honey"}]}"#,
        )
        .unwrap();
        assert_eq!(cmd.items[0].selected_spice, "Honey");
    }

    #[test]
    fn rejects_empty_and_malformed_lines() {
        let empty = CreateOrderCommand { items: vec![] };
        assert!(empty.validate().is_err());

        let zero = CreateOrderCommand {
            items: vec![line(0.0, "Honey")],
        };
        assert!(zero.validate().is_err());

        let nan = CreateOrderCommand {
            items: vec![line(f64::NAN, "Honey")],
        };
        assert!(nan.validate().is_err());

        let no_spice = CreateOrderCommand {
            items: vec![line(1.0, " ")],
        };
        assert!(no_spice.validate().is_err());

        let ok = CreateOrderCommand {
            items: vec![line(1.5, "Honey")],
        };
        assert!(ok.validate().is_ok());
    }
}
