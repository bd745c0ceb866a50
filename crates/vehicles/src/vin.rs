use serde::{Deserialize, Serialize};

use towdesk_core::{DomainError, DomainResult, ValueObject};

/// Vehicle identification number.
///
/// Normalized to uppercase on construction; 17 alphanumeric characters with
/// I, O, and Q excluded (they are not part of the VIN alphabet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vin(String);

impl ValueObject for Vin {}

impl Vin {
    pub fn parse(input: &str) -> DomainResult<Self> {
        let normalized: String = input.trim().to_ascii_uppercase();
        if normalized.len() != 17 {
            return Err(DomainError::validation("VIN must be 17 characters"));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !matches!(c, 'I' | 'O' | 'Q'))
        {
            return Err(DomainError::validation(
                "VIN may only contain digits and letters other than I, O, Q",
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Vin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded vehicle attributes. All optional: decoders are best-effort and
/// operators may have filled some fields by hand already.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VinDetails {
    pub year: Option<u16>,
    pub make: Option<String>,
    pub model: Option<String>,
}

impl ValueObject for VinDetails {}

impl VinDetails {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.make.is_none() && self.model.is_none()
    }
}

/// VIN decode collaborator: resolve a VIN to vehicle attributes.
///
/// Best effort: `Ok(None)` and `Err(_)` both mean "no details"; the caller
/// makes a single attempt and moves on.
pub trait VinDecoder {
    type Error: core::fmt::Debug;

    fn decode(&self, vin: &Vin) -> Result<Option<VinDetails>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let vin = Vin::parse(" 1hgcm82633a004352 ").unwrap();
        assert_eq!(vin.as_str(), "1HGCM82633A004352");
    }

    #[test]
    fn parse_rejects_wrong_lengths() {
        assert!(Vin::parse("1HGCM82633A00435").is_err());
        assert!(Vin::parse("1HGCM82633A0043521").is_err());
        assert!(Vin::parse("").is_err());
    }

    #[test]
    fn parse_rejects_excluded_letters() {
        // 'O' is not in the VIN alphabet.
        assert!(Vin::parse("1HGCM82633A00435O").is_err());
        assert!(Vin::parse("QHGCM82633A004352").is_err());
    }
}
