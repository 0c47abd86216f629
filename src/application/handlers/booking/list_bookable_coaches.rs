//! ListBookableCoachesHandler - Query handler for coach selection.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::booking::ServiceType;
use crate::domain::coach::Coach;
use crate::domain::foundation::DomainError;
use crate::ports::CoachRepository;

#[derive(Debug, Clone)]
pub struct ListBookableCoachesQuery {
    pub service_type: ServiceType,
}

/// Active coaches whose specialty matches the service type.
pub struct ListBookableCoachesHandler {
    coaches: Arc<dyn CoachRepository>,
    policy: CallPolicy,
}

impl ListBookableCoachesHandler {
    pub fn new(coaches: Arc<dyn CoachRepository>, policy: CallPolicy) -> Self {
        Self { coaches, policy }
    }

    pub async fn handle(&self, query: ListBookableCoachesQuery) -> Result<Vec<Coach>, DomainError> {
        let coaches = self.policy.read("list_coaches", || self.coaches.list()).await?;
        Ok(coaches
            .into_iter()
            .filter(|c| c.is_offerable_for(query.service_type))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCoachRepository;
    use crate::domain::coach::{CoachStatus, Specialty};
    use crate::domain::foundation::{CoachId, Timestamp};

    fn coach(name: &str, specialty: Specialty, status: CoachStatus) -> Coach {
        let mut coach = Coach::create(
            CoachId::new(),
            name,
            format!("{}@gymsched.test", name.to_lowercase()),
            "0917",
            specialty,
            "",
            Timestamp::now(),
        )
        .unwrap();
        coach.status = status;
        coach
    }

    #[tokio::test]
    async fn only_active_compatible_coaches_are_listed() {
        let repo = InMemoryCoachRepository::new()
            .with_coach(coach("Ana", Specialty::Gym, CoachStatus::Active))
            .await
            .with_coach(coach("Ben", Specialty::Gym, CoachStatus::Inactive))
            .await
            .with_coach(coach("Cris", Specialty::Zumba, CoachStatus::Active))
            .await;
        let handler = ListBookableCoachesHandler::new(Arc::new(repo), CallPolicy::default());

        let gym = handler
            .handle(ListBookableCoachesQuery {
                service_type: ServiceType::Gym,
            })
            .await
            .unwrap();
        let names: Vec<&str> = gym.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana"]);

        let studio = handler
            .handle(ListBookableCoachesQuery {
                service_type: ServiceType::Studio,
            })
            .await
            .unwrap();
        assert_eq!(studio.len(), 1);
        assert_eq!(studio[0].name, "Cris");
    }
}
