//! In-memory coach store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::coach::Coach;
use crate::domain::foundation::{CoachId, DomainError, ErrorCode};
use crate::ports::CoachRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryCoachRepository {
    coaches: Arc<RwLock<HashMap<CoachId, Coach>>>,
}

impl InMemoryCoachRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a coach directly, bypassing duplicate checks.
    pub async fn with_coach(self, coach: Coach) -> Self {
        self.coaches.write().await.insert(coach.id, coach);
        self
    }
}

#[async_trait]
impl CoachRepository for InMemoryCoachRepository {
    async fn insert(&self, coach: &Coach) -> Result<(), DomainError> {
        let mut coaches = self.coaches.write().await;
        if coaches
            .values()
            .any(|c| c.email.eq_ignore_ascii_case(&coach.email))
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateRecord,
                format!("A coach with email {} already exists", coach.email),
            ));
        }
        coaches.insert(coach.id, coach.clone());
        Ok(())
    }

    async fn update(&self, coach: &Coach) -> Result<(), DomainError> {
        let mut coaches = self.coaches.write().await;
        match coaches.get_mut(&coach.id) {
            Some(stored) => {
                *stored = coach.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::CoachNotFound,
                format!("Coach not found: {}", coach.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &CoachId) -> Result<Option<Coach>, DomainError> {
        Ok(self.coaches.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Coach>, DomainError> {
        let mut coaches: Vec<Coach> = self.coaches.read().await.values().cloned().collect();
        coaches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(coaches)
    }
}
