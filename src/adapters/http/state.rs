//! Shared application state for the HTTP adapters.

use std::sync::Arc;

use crate::application::handlers::appointment::UpdateAppointmentStatusHandler;
use crate::application::handlers::auth::{
    CompleteMfaChallengeHandler, ConfirmEmailHandler, RegisterHandler, ResendVerificationHandler,
    ResolveRoleHandler, ResolveRoleQuery, SignInHandler,
};
use crate::application::handlers::booking::{
    GetBookedSlotsHandler, ListBookableCoachesHandler, ListMyAppointmentsHandler,
    SubmitBookingHandler,
};
use crate::application::handlers::coach::{
    CreateCoachHandler, ListCoachesHandler, UpdateCoachStatusHandler,
};
use crate::application::handlers::mfa::{
    GetMfaStatusHandler, StartMfaEnrollmentHandler, UnenrollMfaHandler,
    VerifyMfaEnrollmentHandler,
};
use crate::application::handlers::payment::{
    ConfirmPaymentHandler, ListPendingPaymentsHandler, RejectPaymentHandler,
};
use crate::application::CallPolicy;
use crate::domain::account::{Role, RoleAssignment};
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::{
    AccountRepository, AppointmentRepository, Clock, CoachRepository, IdentityProvider,
    SessionValidator,
};

use super::error::ApiError;

/// Ports and policy shared by every request. Handlers are built per request
/// from these.
#[derive(Clone)]
pub struct AppState {
    pub appointments: Arc<dyn AppointmentRepository>,
    pub coaches: Arc<dyn CoachRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<dyn SessionValidator>,
    pub clock: Arc<dyn Clock>,
    pub roles: RoleAssignment,
    pub policy: CallPolicy,
}

impl AppState {
    /// Role of the caller, read from the account record.
    pub async fn actor_role(&self, user: &AuthenticatedUser) -> Result<Role, ApiError> {
        let resolved = self
            .resolve_role_handler()
            .handle(ResolveRoleQuery {
                user_id: user.id.clone(),
            })
            .await?;
        Ok(resolved.role)
    }

    // Auth

    pub fn resolve_role_handler(&self) -> ResolveRoleHandler {
        ResolveRoleHandler::new(self.accounts.clone(), self.policy)
    }

    pub fn register_handler(&self) -> RegisterHandler {
        RegisterHandler::new(
            self.identity.clone(),
            self.accounts.clone(),
            self.clock.clone(),
            self.roles.clone(),
            self.policy,
        )
    }

    pub fn resend_verification_handler(&self) -> ResendVerificationHandler {
        ResendVerificationHandler::new(self.identity.clone(), self.policy)
    }

    pub fn confirm_email_handler(&self) -> ConfirmEmailHandler {
        ConfirmEmailHandler::new(self.identity.clone(), self.accounts.clone(), self.policy)
    }

    pub fn sign_in_handler(&self) -> SignInHandler {
        SignInHandler::new(
            self.identity.clone(),
            Arc::new(self.resolve_role_handler()),
            self.policy,
        )
    }

    pub fn complete_mfa_challenge_handler(&self) -> CompleteMfaChallengeHandler {
        CompleteMfaChallengeHandler::new(
            self.identity.clone(),
            Arc::new(self.resolve_role_handler()),
            self.policy,
        )
    }

    // MFA

    pub fn start_mfa_enrollment_handler(&self) -> StartMfaEnrollmentHandler {
        StartMfaEnrollmentHandler::new(self.identity.clone(), self.policy)
    }

    pub fn verify_mfa_enrollment_handler(&self) -> VerifyMfaEnrollmentHandler {
        VerifyMfaEnrollmentHandler::new(self.identity.clone(), self.policy)
    }

    pub fn unenroll_mfa_handler(&self) -> UnenrollMfaHandler {
        UnenrollMfaHandler::new(self.identity.clone(), self.policy)
    }

    pub fn mfa_status_handler(&self) -> GetMfaStatusHandler {
        GetMfaStatusHandler::new(self.identity.clone(), self.policy)
    }

    // Booking

    pub fn booked_slots_handler(&self) -> GetBookedSlotsHandler {
        GetBookedSlotsHandler::new(self.appointments.clone(), self.policy)
    }

    pub fn bookable_coaches_handler(&self) -> ListBookableCoachesHandler {
        ListBookableCoachesHandler::new(self.coaches.clone(), self.policy)
    }

    pub fn my_appointments_handler(&self) -> ListMyAppointmentsHandler {
        ListMyAppointmentsHandler::new(self.appointments.clone(), self.policy)
    }

    pub fn submit_booking_handler(&self) -> SubmitBookingHandler {
        SubmitBookingHandler::new(
            self.appointments.clone(),
            self.coaches.clone(),
            self.clock.clone(),
            self.policy,
        )
    }

    pub fn update_appointment_status_handler(&self) -> UpdateAppointmentStatusHandler {
        UpdateAppointmentStatusHandler::new(
            self.appointments.clone(),
            self.clock.clone(),
            self.policy,
        )
    }

    // Admin

    pub fn pending_payments_handler(&self) -> ListPendingPaymentsHandler {
        ListPendingPaymentsHandler::new(self.appointments.clone(), self.policy)
    }

    pub fn confirm_payment_handler(&self) -> ConfirmPaymentHandler {
        ConfirmPaymentHandler::new(self.appointments.clone(), self.clock.clone(), self.policy)
    }

    pub fn reject_payment_handler(&self) -> RejectPaymentHandler {
        RejectPaymentHandler::new(self.appointments.clone(), self.clock.clone(), self.policy)
    }

    pub fn create_coach_handler(&self) -> CreateCoachHandler {
        CreateCoachHandler::new(self.coaches.clone(), self.clock.clone(), self.policy)
    }

    pub fn update_coach_status_handler(&self) -> UpdateCoachStatusHandler {
        UpdateCoachStatusHandler::new(self.coaches.clone(), self.clock.clone(), self.policy)
    }

    pub fn list_coaches_handler(&self) -> ListCoachesHandler {
        ListCoachesHandler::new(self.coaches.clone(), self.policy)
    }
}
