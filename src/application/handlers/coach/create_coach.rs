//! CreateCoachHandler - Admin command adding a coach.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::coach::{Coach, CoachError, Specialty};
use crate::domain::foundation::CoachId;
use crate::ports::{Clock, CoachRepository};

#[derive(Debug, Clone)]
pub struct CreateCoachCommand {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: Specialty,
    pub experience: String,
    pub actor_role: Role,
}

pub struct CreateCoachHandler {
    coaches: Arc<dyn CoachRepository>,
    clock: Arc<dyn Clock>,
    policy: CallPolicy,
}

impl CreateCoachHandler {
    pub fn new(coaches: Arc<dyn CoachRepository>, clock: Arc<dyn Clock>, policy: CallPolicy) -> Self {
        Self {
            coaches,
            clock,
            policy,
        }
    }

    pub async fn handle(&self, cmd: CreateCoachCommand) -> Result<Coach, CoachError> {
        if !cmd.actor_role.can_manage_payments() {
            return Err(CoachError::Forbidden);
        }

        let coach = Coach::create(
            CoachId::new(),
            cmd.name,
            cmd.email,
            cmd.phone,
            cmd.specialty,
            cmd.experience,
            self.clock.now(),
        )?;

        self.policy
            .write("insert_coach", self.coaches.insert(&coach))
            .await?;

        tracing::info!(coach_id = %coach.id, specialty = %coach.specialty, "Coach created");
        Ok(coach)
    }
}
