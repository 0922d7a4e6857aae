//! License key format validation.
//!
//! Keys are four groups of four uppercase ASCII letters or digits joined by
//! dashes: `XXXX-XXXX-XXXX-XXXX`. The format is checked locally so a
//! malformed key never costs a network round trip.

use crate::LicenseError;
use std::fmt;

const GROUPS: usize = 4;
const GROUP_LEN: usize = 4;

/// A license key that passed local format validation.
///
/// `Debug` and `Display` mask the two middle groups so keys do not end up
/// in logs verbatim.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Parse user input into a license key.
    ///
    /// Surrounding whitespace is trimmed. Lowercase input is rejected rather
    /// than normalized, matching what the license server issues.
    ///
    /// # Errors
    /// - `MissingLicense` - input is empty after trimming
    /// - `InvalidKeyFormat` - input is not `XXXX-XXXX-XXXX-XXXX`
    pub fn parse(input: &str) -> Result<Self, LicenseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LicenseError::MissingLicense);
        }

        let groups: Vec<&str> = trimmed.split('-').collect();
        let well_formed = groups.len() == GROUPS
            && groups.iter().all(|group| {
                group.len() == GROUP_LEN
                    && group
                        .bytes()
                        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            });

        if !well_formed {
            return Err(LicenseError::InvalidKeyFormat(
                "expected XXXX-XXXX-XXXX-XXXX with uppercase letters and digits".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The key exactly as it should be sent to the verification service.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key with the middle groups hidden, e.g. `DEMO-****-****-9ABC`.
    pub fn masked(&self) -> String {
        let first = &self.0[..GROUP_LEN];
        let last = &self.0[self.0.len() - GROUP_LEN..];
        format!("{first}-****-****-{last}")
    }

    /// Short SHA-256 fingerprint for correlating log lines.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(self.0.as_bytes());
        hex::encode(&hash[..6])
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LicenseKey").field(&self.masked()).finish()
    }
}
