//! Coach repository port.

use async_trait::async_trait;

use crate::domain::coach::Coach;
use crate::domain::foundation::{CoachId, DomainError};

#[async_trait]
pub trait CoachRepository: Send + Sync {
    /// # Errors
    ///
    /// - `DuplicateRecord` if a coach with the same email exists
    async fn insert(&self, coach: &Coach) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `CoachNotFound` if the coach doesn't exist
    async fn update(&self, coach: &Coach) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &CoachId) -> Result<Option<Coach>, DomainError>;

    /// All coaches ordered by name.
    async fn list(&self) -> Result<Vec<Coach>, DomainError>;
}
