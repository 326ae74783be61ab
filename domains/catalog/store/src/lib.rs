use std::sync::Arc;

use catalog_errors::CatalogError;
use catalog_models::{CatalogItem, CatalogItemDraft};
use database_traits::GenericDao;

/// Relational store for catalog items.
pub trait CatalogStore:
    GenericDao<
        Model = CatalogItem,
        CreateRequest = CatalogItemDraft,
        UpdateRequest = CatalogItemDraft,
        Error = CatalogError,
        ID = i32,
    > + Send
    + Sync
{
}

impl<T> CatalogStore for T where
    T: GenericDao<
            Model = CatalogItem,
            CreateRequest = CatalogItemDraft,
            UpdateRequest = CatalogItemDraft,
            Error = CatalogError,
            ID = i32,
        > + Send
        + Sync
{
}

pub type SharedCatalogStore = Arc<dyn CatalogStore>;
