//! Request and response bodies for the MFA endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::mfa::{MfaFactor, MfaSecret};

/// The secret is shown once, for manual entry when the QR code cannot be
/// scanned.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse {
    pub secret_ref: String,
    pub secret: String,
    pub provisioning_uri: String,
}

impl From<MfaSecret> for EnrollmentResponse {
    fn from(secret: MfaSecret) -> Self {
        Self {
            secret_ref: secret.secret_ref,
            secret: secret.secret.as_base32().to_string(),
            provisioning_uri: secret.provisioning_uri.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEnrollmentRequest {
    pub secret_ref: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEnrollmentResponse {
    pub factor: MfaFactor,
    pub factors: Vec<MfaFactor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactorsResponse {
    pub enrolled: bool,
    pub factors: Vec<MfaFactor>,
}
