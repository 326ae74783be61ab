use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

/// The two preparation variants offered for a cut.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
pub struct Spice {
    pub recipe1: String,
    pub recipe2: String,
}

impl Spice {
    pub fn new(recipe1: impl Into<String>, recipe2: impl Into<String>) -> Self {
        Self {
            recipe1: recipe1.into(),
            recipe2: recipe2.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct CatalogItem {
    #[builder(default)]
    pub id: i32,
    #[builder(setter(into))]
    pub meat: String,
    #[builder(default = true)]
    pub avail: bool,
    pub price: f64,
    #[builder(default)]
    pub spice: Spice,
}

/// Writable fields of a catalog item, used for both create and update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct CatalogItemDraft {
    #[builder(setter(into))]
    pub meat: String,
    #[builder(default = true)]
    pub avail: bool,
    pub price: f64,
    #[builder(default)]
    pub spice: Spice,
}

impl CatalogItemDraft {
    pub fn into_item(self, id: i32) -> CatalogItem {
        CatalogItem {
            id,
            meat: self.meat,
            avail: self.avail,
            price: self.price,
            spice: self.spice,
        }
    }
}
