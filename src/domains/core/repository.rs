use crate::errors::DomainResult;
use crate::query::Criteria;
use crate::types::{PageRequest, PaginatedResult, SortCriteria};
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};

/// Trait for finding entities by ID.
///
/// A missing or soft-deleted row is `Ok(None)`; storage faults are errors.
#[async_trait]
pub trait FindById<T> {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>>;

    /// Find an entity by ID within a transaction
    async fn find_by_id_with_tx(
        &self,
        id: &str,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<Option<T>>;
}

/// Trait for entities that are only ever soft deleted
#[async_trait]
pub trait SoftDeletable {
    /// Mark the entity deleted. Deleting a missing or already deleted ID is
    /// a successful no-op.
    async fn soft_delete(&self, id: &str) -> DomainResult<()>;

    /// Soft delete an entity by ID within a transaction
    async fn soft_delete_with_tx(
        &self,
        id: &str,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()>;
}

/// Paginated, sorted search driven by a criteria object
#[async_trait]
pub trait CriteriaSearch<C, D>
where
    C: Criteria + Sync,
{
    async fn find_by_criteria(
        &self,
        criteria: &C,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<D>>;

    /// Count and window run inside the caller's transaction
    async fn find_by_criteria_with_tx(
        &self,
        criteria: &C,
        sort: SortCriteria,
        page: PageRequest,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<PaginatedResult<D>>;
}
