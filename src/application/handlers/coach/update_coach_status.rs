//! UpdateCoachStatusHandler - Admin command activating or deactivating a coach.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::coach::{Coach, CoachError, CoachStatus};
use crate::domain::foundation::CoachId;
use crate::ports::{Clock, CoachRepository};

#[derive(Debug, Clone)]
pub struct UpdateCoachStatusCommand {
    pub coach_id: CoachId,
    pub status: CoachStatus,
    pub actor_role: Role,
}

/// Inactive coaches stop being offered for new bookings. Existing
/// appointments keep the coach recorded on them.
pub struct UpdateCoachStatusHandler {
    coaches: Arc<dyn CoachRepository>,
    clock: Arc<dyn Clock>,
    policy: CallPolicy,
}

impl UpdateCoachStatusHandler {
    pub fn new(coaches: Arc<dyn CoachRepository>, clock: Arc<dyn Clock>, policy: CallPolicy) -> Self {
        Self {
            coaches,
            clock,
            policy,
        }
    }

    pub async fn handle(&self, cmd: UpdateCoachStatusCommand) -> Result<Coach, CoachError> {
        if !cmd.actor_role.can_manage_payments() {
            return Err(CoachError::Forbidden);
        }

        let mut coach = self
            .policy
            .read("find_coach", || self.coaches.find_by_id(&cmd.coach_id))
            .await?
            .ok_or(CoachError::NotFound(cmd.coach_id))?;

        if coach.status == cmd.status {
            return Ok(coach);
        }

        coach.set_status(cmd.status, self.clock.now());
        self.policy
            .write("update_coach", self.coaches.update(&coach))
            .await?;

        tracing::info!(coach_id = %coach.id, status = coach.status.as_str(), "Coach status updated");
        Ok(coach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::SystemClock;
    use crate::adapters::memory::InMemoryCoachRepository;
    use crate::domain::booking::ServiceType;
    use crate::domain::coach::Specialty;
    use crate::domain::foundation::Timestamp;

    async fn repo_with_coach() -> (InMemoryCoachRepository, Coach) {
        let coach = Coach::create(
            CoachId::new(),
            "Ramon Cruz",
            "ramon@gymsched.test",
            "0917",
            Specialty::Gym,
            "",
            Timestamp::now(),
        )
        .unwrap();
        let repo = InMemoryCoachRepository::new().with_coach(coach.clone()).await;
        (repo, coach)
    }

    fn handler(repo: &InMemoryCoachRepository) -> UpdateCoachStatusHandler {
        UpdateCoachStatusHandler::new(Arc::new(repo.clone()), Arc::new(SystemClock), CallPolicy::default())
    }

    #[tokio::test]
    async fn deactivated_coach_is_no_longer_offerable() {
        let (repo, coach) = repo_with_coach().await;

        let updated = handler(&repo)
            .handle(UpdateCoachStatusCommand {
                coach_id: coach.id,
                status: CoachStatus::Inactive,
                actor_role: Role::Admin,
            })
            .await
            .unwrap();

        assert!(!updated.is_offerable_for(ServiceType::Gym));
        let stored = repo.find_by_id(&coach.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CoachStatus::Inactive);
    }

    #[tokio::test]
    async fn coach_role_is_forbidden() {
        let (repo, coach) = repo_with_coach().await;
        let result = handler(&repo)
            .handle(UpdateCoachStatusCommand {
                coach_id: coach.id,
                status: CoachStatus::Inactive,
                actor_role: Role::Coach,
            })
            .await;
        assert_eq!(result.unwrap_err(), CoachError::Forbidden);
    }

    #[tokio::test]
    async fn unknown_coach_is_not_found() {
        let (repo, _) = repo_with_coach().await;
        let missing = CoachId::new();
        let result = handler(&repo)
            .handle(UpdateCoachStatusCommand {
                coach_id: missing,
                status: CoachStatus::Active,
                actor_role: Role::Owner,
            })
            .await;
        assert_eq!(result.unwrap_err(), CoachError::NotFound(missing));
    }
}
