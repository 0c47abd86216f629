//! TOTP value types: secrets, codes, and provisioning URIs (RFC 6238).

use std::fmt;

use base32::Alphabet;
use url::Url;

use crate::domain::foundation::ValidationError;

use super::MfaError;

const BASE32: Alphabet = Alphabet::Rfc4648 { padding: false };

/// Number of digits in every code this system issues or accepts.
pub const CODE_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotpAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl TotpAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            TotpAlgorithm::Sha1 => "SHA1",
            TotpAlgorithm::Sha256 => "SHA256",
        }
    }
}

/// Code parameters shared by generation and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpConfig {
    /// Seconds per time step.
    pub period: u64,
    pub digits: u32,
    pub algorithm: TotpAlgorithm,
    /// Steps accepted either side of the current one.
    pub skew: u64,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            period: 30,
            digits: CODE_DIGITS as u32,
            algorithm: TotpAlgorithm::Sha1,
            skew: 1,
        }
    }
}

impl TotpConfig {
    /// Time-step counter for a unix time.
    pub fn counter_at(&self, unix_secs: u64) -> u64 {
        unix_secs / self.period.max(1)
    }
}

/// Shared secret, held in its unpadded base32 form.
#[derive(Clone, PartialEq, Eq)]
pub struct TotpSecret(String);

impl TotpSecret {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(base32::encode(BASE32, bytes))
    }

    /// Accepts user-supplied base32, ignoring spaces and case.
    pub fn parse(encoded: &str) -> Result<Self, ValidationError> {
        let normalized: String = encoded
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect::<String>()
            .trim_end_matches('=')
            .to_string();

        if normalized.is_empty() {
            return Err(ValidationError::empty_field("secret"));
        }
        match base32::decode(BASE32, &normalized) {
            Some(bytes) if !bytes.is_empty() => Ok(Self(normalized)),
            _ => Err(ValidationError::invalid_format("secret", "not valid base32")),
        }
    }

    pub fn as_base32(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        base32::decode(BASE32, &self.0).unwrap_or_default()
    }
}

impl fmt::Debug for TotpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TotpSecret(***)")
    }
}

/// Keeps only ASCII digits, truncated to six. Applied as the user types.
pub fn normalize_code_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(CODE_DIGITS)
        .collect()
}

/// A candidate code with exactly six digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpCode(String);

impl TotpCode {
    /// Strips non-digits; the remainder must be exactly six digits.
    pub fn from_input(raw: &str) -> Result<Self, MfaError> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == CODE_DIGITS {
            Ok(Self(digits))
        } else {
            Err(MfaError::InvalidCodeFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TotpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `otpauth://` URI consumed by authenticator apps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningUri(String);

impl ProvisioningUri {
    pub fn new(
        issuer: &str,
        account: &str,
        secret: &TotpSecret,
        config: &TotpConfig,
    ) -> Result<Self, ValidationError> {
        if issuer.trim().is_empty() {
            return Err(ValidationError::empty_field("issuer"));
        }
        if account.trim().is_empty() {
            return Err(ValidationError::empty_field("account"));
        }

        let mut uri = Url::parse("otpauth://totp")
            .map_err(|e| ValidationError::invalid_format("provisioning_uri", e.to_string()))?;
        uri.set_path(&format!("/{}:{}", issuer.trim(), account.trim()));
        uri.query_pairs_mut()
            .append_pair("secret", secret.as_base32())
            .append_pair("issuer", issuer.trim())
            .append_pair("algorithm", config.algorithm.as_str())
            .append_pair("digits", &config.digits.to_string())
            .append_pair("period", &config.period.to_string());

        Ok(Self(uri.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProvisioningUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
