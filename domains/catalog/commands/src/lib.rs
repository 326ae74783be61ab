use catalog_errors::CatalogError;
use catalog_models::{CatalogItemDraft, Spice};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCatalogItemCommand {
    pub meat: String,
    #[serde(default = "avail_default")]
    pub avail: bool,
    pub price: f64,
    #[serde(default)]
    pub spice: Spice,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCatalogItemCommand {
    pub meat: String,
    #[serde(default = "avail_default")]
    pub avail: bool,
    pub price: f64,
    #[serde(default)]
    pub spice: Spice,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteCatalogItemCommand {
    pub id: i32,
}

fn avail_default() -> bool { true }

fn draft(
    meat: String, avail: bool, price: f64, spice: Spice,
) -> Result<CatalogItemDraft, CatalogError> {
    let meat = meat.trim().to_string();
    if meat.is_empty() || meat.chars().count() > 100 {
        return Err(CatalogError::Validation(
            "meat must be between 1 and 100 characters".into(),
        ));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::Validation(
            "price must be a finite, non-negative number".into(),
        ));
    }

    Ok(CatalogItemDraft {
        meat,
        avail,
        price,
        spice,
    })
}

impl CreateCatalogItemCommand {
    pub fn into_draft(self) -> Result<CatalogItemDraft, CatalogError> {
        draft(self.meat, self.avail, self.price, self.spice)
    }
}

impl UpdateCatalogItemCommand {
    pub fn into_draft(self) -> Result<CatalogItemDraft, CatalogError> {
        draft(self.meat, self.avail, self.price, self.spice)
    }
}
