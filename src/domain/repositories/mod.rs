//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to the per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::reservation::ReservationRepository;
use super::vehicle::CatalogRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let pool = repos.catalog().find_pool(1).await?;
///     let r = repos.reservations().find_by_code("3FA0C2D1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn catalog(&self) -> &dyn CatalogRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
}
