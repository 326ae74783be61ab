use cache_invalidation::{InvalidationCoordinator, Mutation};
use catalog_commands::{
    CreateCatalogItemCommand, DeleteCatalogItemCommand,
    UpdateCatalogItemCommand,
};
use catalog_errors::CatalogError;
use catalog_responses::CatalogItemResponse;
use catalog_store::SharedCatalogStore;
use database_traits::GenericDao;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CreateCatalogItemHandler {
    store: SharedCatalogStore,
    invalidation: InvalidationCoordinator,
}

impl CreateCatalogItemHandler {
    pub fn new(
        store: SharedCatalogStore, invalidation: InvalidationCoordinator,
    ) -> Self {
        Self {
            store,
            invalidation,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: CreateCatalogItemCommand,
    ) -> Result<CatalogItemResponse, CatalogError> {
        let item = self.store.create(command.into_draft()?).await?;

        self.invalidation
            .invalidate_for(Mutation::CatalogItemCreated { id: item.id })
            .await;
        info!(item.id = item.id, "catalog item created");

        Ok(item.into())
    }
}

#[derive(Clone)]
pub struct UpdateCatalogItemHandler {
    store: SharedCatalogStore,
    invalidation: InvalidationCoordinator,
}

impl UpdateCatalogItemHandler {
    pub fn new(
        store: SharedCatalogStore, invalidation: InvalidationCoordinator,
    ) -> Self {
        Self {
            store,
            invalidation,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, id: i32, command: UpdateCatalogItemCommand,
    ) -> Result<CatalogItemResponse, CatalogError> {
        let item = self.store.update(id, command.into_draft()?).await?;

        self.invalidation
            .invalidate_for(Mutation::CatalogItemUpdated { id })
            .await;

        Ok(item.into())
    }
}

#[derive(Clone)]
pub struct DeleteCatalogItemHandler {
    store: SharedCatalogStore,
    invalidation: InvalidationCoordinator,
}

impl DeleteCatalogItemHandler {
    pub fn new(
        store: SharedCatalogStore, invalidation: InvalidationCoordinator,
    ) -> Self {
        Self {
            store,
            invalidation,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: DeleteCatalogItemCommand,
    ) -> Result<(), CatalogError> {
        self.store.delete(command.id).await?;

        self.invalidation
            .invalidate_for(Mutation::CatalogItemDeleted { id: command.id })
            .await;
        info!(item.id = command.id, "catalog item deleted");

        Ok(())
    }
}
