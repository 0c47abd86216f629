//! TOTP generator using HMAC (RFC 6238).

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use sha2::Sha256;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::domain::mfa::{MfaError, TotpAlgorithm, TotpCode, TotpConfig, TotpSecret};
use crate::ports::TotpGenerator;

/// Length of freshly issued secrets.
pub const SECRET_BYTES: usize = 20;

/// Issues a random secret from the OS generator.
pub fn generate_secret() -> TotpSecret {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    TotpSecret::from_bytes(&bytes)
}

/// HMAC-based TOTP generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacTotpGenerator {
    config: TotpConfig,
}

impl HmacTotpGenerator {
    pub fn new(config: TotpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TotpConfig {
        &self.config
    }

    fn mac(&self, key: &[u8], counter: u64) -> Result<Vec<u8>, MfaError> {
        let counter_bytes = counter.to_be_bytes();
        let digest = match self.config.algorithm {
            TotpAlgorithm::Sha1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(key)
                    .map_err(|e| MfaError::Provider(e.to_string()))?;
                mac.update(&counter_bytes);
                mac.finalize().into_bytes().to_vec()
            }
            TotpAlgorithm::Sha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key)
                    .map_err(|e| MfaError::Provider(e.to_string()))?;
                mac.update(&counter_bytes);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(digest)
    }

    /// Code digits for one time-step counter.
    fn code_for_counter(&self, key: &[u8], counter: u64) -> Result<String, MfaError> {
        let result = self.mac(key, counter)?;

        // Dynamic truncation (RFC 4226 §5.3).
        let offset = (result[result.len() - 1] & 0x0f) as usize;
        let binary_code = ((result[offset] as u32 & 0x7f) << 24)
            | ((result[offset + 1] as u32) << 16)
            | ((result[offset + 2] as u32) << 8)
            | (result[offset + 3] as u32);

        let digits = self.config.digits as usize;
        let code_int = binary_code % 10u32.pow(self.config.digits);
        Ok(format!("{:0>width$}", code_int, width = digits))
    }

    fn key(secret: &TotpSecret) -> Result<Vec<u8>, MfaError> {
        let key = secret.to_bytes();
        if key.is_empty() {
            return Err(MfaError::UnknownSecret);
        }
        Ok(key)
    }
}

impl TotpGenerator for HmacTotpGenerator {
    fn generate_at(&self, secret: &TotpSecret, unix_secs: u64) -> Result<TotpCode, MfaError> {
        let key = Self::key(secret)?;
        let code = self.code_for_counter(&key, self.config.counter_at(unix_secs))?;
        TotpCode::from_input(&code)
    }

    fn verify_at(&self, secret: &TotpSecret, code: &TotpCode, unix_secs: u64) -> Option<u64> {
        let key = Self::key(secret).ok()?;
        let current = self.config.counter_at(unix_secs);
        let first = current.saturating_sub(self.config.skew);
        let last = current.saturating_add(self.config.skew);

        // Every step in the window is computed so timing does not reveal
        // which one matched. The latest matching step wins.
        let mut matched = Choice::from(0);
        let mut step = 0u64;
        for counter in first..=last {
            if let Ok(expected) = self.code_for_counter(&key, counter) {
                let hit = expected.as_bytes().ct_eq(code.as_str().as_bytes());
                step.conditional_assign(&counter, hit);
                matched |= hit;
            }
        }
        bool::from(matched).then_some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn secret() -> TotpSecret {
        TotpSecret::parse(RFC_SECRET).unwrap()
    }

    fn generator() -> HmacTotpGenerator {
        HmacTotpGenerator::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Generation
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn matches_rfc_6238_sha1_vectors() {
        let cases = [
            (59, "287082"),
            (1_111_111_109, "081804"),
            (1_111_111_111, "050471"),
            (1_234_567_890, "005924"),
            (2_000_000_000, "279037"),
        ];
        for (time, expected) in cases {
            let code = generator().generate_at(&secret(), time).unwrap();
            assert_eq!(code.as_str(), expected, "at T={}", time);
        }
    }

    #[test]
    fn sha256_produces_six_digit_codes() {
        let generator = HmacTotpGenerator::new(TotpConfig {
            algorithm: TotpAlgorithm::Sha256,
            ..TotpConfig::default()
        });
        let code = generator.generate_at(&secret(), 59).unwrap();
        assert_eq!(code.as_str().len(), 6);
    }

    #[test]
    fn generated_secrets_are_twenty_bytes_and_distinct() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.to_bytes().len(), SECRET_BYTES);
        assert_ne!(a, b);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Verification
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn accepts_current_and_adjacent_steps() {
        let now = 1_234_567_890;
        let step = TotpConfig::default().counter_at(now);
        let code = generator().generate_at(&secret(), now).unwrap();

        assert_eq!(generator().verify_at(&secret(), &code, now), Some(step));
        assert_eq!(generator().verify_at(&secret(), &code, now + 30), Some(step));
        assert_eq!(generator().verify_at(&secret(), &code, now - 30), Some(step));
    }

    #[test]
    fn reports_the_step_the_code_belongs_to() {
        let now = 1_234_567_890;
        let previous = generator().generate_at(&secret(), now - 30).unwrap();
        let next = generator().generate_at(&secret(), now + 30).unwrap();
        let step = TotpConfig::default().counter_at(now);

        assert_eq!(generator().verify_at(&secret(), &previous, now), Some(step - 1));
        assert_eq!(generator().verify_at(&secret(), &next, now), Some(step + 1));
    }

    #[test]
    fn rejects_codes_outside_window() {
        let now = 1_234_567_890;
        let code = generator().generate_at(&secret(), now).unwrap();

        assert_eq!(generator().verify_at(&secret(), &code, now + 90), None);
        assert_eq!(generator().verify_at(&secret(), &code, now - 90), None);
    }

    #[test]
    fn rejects_wrong_code() {
        let code = TotpCode::from_input("000000").unwrap();
        let other = generator().generate_at(&secret(), 59).unwrap();
        assert_ne!(code, other);
        assert_eq!(generator().verify_at(&secret(), &code, 59), None);
    }

    #[test]
    fn window_near_epoch_does_not_underflow() {
        let code = generator().generate_at(&secret(), 0).unwrap();
        assert_eq!(generator().verify_at(&secret(), &code, 0), Some(0));
    }
}
