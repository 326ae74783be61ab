use std::fmt::Debug;

use async_trait::async_trait;

/// CRUD surface shared by the relational stores. Every mutation runs in its
/// own transaction and reports a missing row through `Self::Error`, distinct
/// from other failures.
#[async_trait]
pub trait GenericDao {
    type Model: Send + Sync + 'static;
    type CreateRequest: Send + Sync + 'static;
    type UpdateRequest: Send + Sync + 'static;
    type Error: Send + 'static;
    type ID: Copy + Debug + Send + Sync + 'static;

    async fn find_by_id(&self, id: Self::ID) -> Result<Self::Model, Self::Error>;

    /// Rows ordered by id.
    async fn find_page(
        &self, offset: i64, limit: i64,
    ) -> Result<Vec<Self::Model>, Self::Error>;

    async fn count(&self) -> Result<i64, Self::Error>;

    async fn create(
        &self, req: Self::CreateRequest,
    ) -> Result<Self::Model, Self::Error>;

    async fn update(
        &self, id: Self::ID, req: Self::UpdateRequest,
    ) -> Result<Self::Model, Self::Error>;

    async fn delete(&self, id: Self::ID) -> Result<(), Self::Error>;
}
