//! Order pricing: per-line totals, aggregate totals and quantity-tiered
//! discounts. Pure functions only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Total quantity from which the large-order discount applies.
pub const LARGE_ORDER_QUANTITY: f64 = 20.0;
/// Total quantity above which the medium-order discount applies.
pub const MEDIUM_ORDER_QUANTITY: f64 = 9.0;
pub const LARGE_ORDER_FACTOR: f64 = 0.88;
pub const MEDIUM_ORDER_FACTOR: f64 = 0.92;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("quantity must be a finite, non-negative number (got {0})")]
    InvalidQuantity(f64),
    #[error("unit price must be a finite, non-negative number (got {0})")]
    InvalidUnitPrice(f64),
    #[error("at least one line is required")]
    EmptyOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLine {
    pub unit_price: f64,
    pub quantity: f64,
}

impl PriceLine {
    pub fn new(unit_price: f64, quantity: f64) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Undiscounted total of each line, in request order.
    pub line_totals: Vec<f64>,
    pub total_quantity: f64,
    pub subtotal: f64,
    /// Multiplier applied to the subtotal (1.0 when no discount).
    pub discount_factor: f64,
    pub total: f64,
}

/// Discount multiplier for an order of `total_quantity` units.
///
/// | quantity      | factor |
/// |---------------|--------|
/// | `q >= 20`     | 0.88   |
/// | `9 < q < 20`  | 0.92   |
/// | `q <= 9`      | 1.0    |
pub fn discount_factor(total_quantity: f64) -> f64 {
    if total_quantity >= LARGE_ORDER_QUANTITY {
        LARGE_ORDER_FACTOR
    }
    else if total_quantity > MEDIUM_ORDER_QUANTITY {
        MEDIUM_ORDER_FACTOR
    }
    else {
        1.0
    }
}

/// Price of a single line, without any discount.
pub fn price_one(unit_price: f64, quantity: f64) -> Result<f64, PricingError> {
    let line = PriceLine::new(unit_price, quantity);
    validate(&line)?;
    Ok(round_to_cents(line.unit_price * line.quantity))
}

/// Prices an order: line totals are summed and the tiered discount is
/// applied to the sum according to the summed quantity.
pub fn price_bulk(lines: &[PriceLine]) -> Result<PriceBreakdown, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyOrder);
    }

    let mut line_totals = Vec::with_capacity(lines.len());
    let mut total_quantity = 0.0;
    let mut subtotal = 0.0;
    for line in lines {
        validate(line)?;
        let line_total = line.unit_price * line.quantity;
        line_totals.push(round_to_cents(line_total));
        total_quantity += line.quantity;
        subtotal += line_total;
    }

    let factor = discount_factor(total_quantity);

    Ok(PriceBreakdown {
        line_totals,
        total_quantity,
        subtotal: round_to_cents(subtotal),
        discount_factor: factor,
        total: round_to_cents(subtotal * factor),
    })
}

fn validate(line: &PriceLine) -> Result<(), PricingError> {
    if !line.quantity.is_finite() || line.quantity < 0.0 {
        return Err(PricingError::InvalidQuantity(line.quantity));
    }
    if !line.unit_price.is_finite() || line.unit_price < 0.0 {
        return Err(PricingError::InvalidUnitPrice(line.unit_price));
    }
    Ok(())
}

pub fn round_to_cents(amount: f64) -> f64 { (amount * 100.0).round() / 100.0 }
