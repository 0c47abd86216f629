//! ListCoachesHandler - Admin query over every coach, any status.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::coach::{Coach, CoachError};
use crate::ports::CoachRepository;

#[derive(Debug, Clone)]
pub struct ListCoachesQuery {
    pub actor_role: Role,
}

pub struct ListCoachesHandler {
    coaches: Arc<dyn CoachRepository>,
    policy: CallPolicy,
}

impl ListCoachesHandler {
    pub fn new(coaches: Arc<dyn CoachRepository>, policy: CallPolicy) -> Self {
        Self { coaches, policy }
    }

    pub async fn handle(&self, query: ListCoachesQuery) -> Result<Vec<Coach>, CoachError> {
        if !query.actor_role.can_manage_payments() {
            return Err(CoachError::Forbidden);
        }
        Ok(self.policy.read("list_coaches", || self.coaches.list()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCoachRepository;
    use crate::domain::coach::{CoachStatus, Specialty};
    use crate::domain::foundation::{CoachId, Timestamp};

    #[tokio::test]
    async fn admin_sees_inactive_coaches_too() {
        let mut inactive = Coach::create(
            CoachId::new(),
            "Ana Reyes",
            "ana@gymsched.test",
            "0917",
            Specialty::Zumba,
            "",
            Timestamp::now(),
        )
        .unwrap();
        inactive.status = CoachStatus::Inactive;
        let repo = InMemoryCoachRepository::new().with_coach(inactive).await;

        let handler = ListCoachesHandler::new(Arc::new(repo), CallPolicy::default());
        let coaches = handler
            .handle(ListCoachesQuery {
                actor_role: Role::Admin,
            })
            .await
            .unwrap();
        assert_eq!(coaches.len(), 1);

        let denied = handler
            .handle(ListCoachesQuery {
                actor_role: Role::Client,
            })
            .await;
        assert_eq!(denied.unwrap_err(), CoachError::Forbidden);
    }
}
