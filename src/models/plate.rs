//! Normalized licence plate identifier

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValidationError;
use super::validation::{validate_plate_field, MIN_PLATE_LEN};

/// A cleaned licence plate: uppercase ASCII alphanumerics, at least
/// `MIN_PLATE_LEN` characters long
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plate(String);

impl Plate {
    /// Clean and validate a plate with the default minimum length
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::parse_with_min_len(raw, MIN_PLATE_LEN)
    }

    /// Clean and validate a plate with a caller-supplied minimum length
    pub fn parse_with_min_len(raw: &str, min_len: usize) -> Result<Self, ValidationError> {
        validate_plate_field(raw, "plate", min_len).map(Plate)
    }

    /// Borrow the normalized text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Plate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Plate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Plate::parse(&value)
    }
}

impl From<Plate> for String {
    fn from(plate: Plate) -> Self {
        plate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationErrorKind;

    #[test]
    fn test_parse_normalizes() {
        let plate = Plate::parse(" ka-01 ab 1234 ").unwrap();
        assert_eq!(plate.as_str(), "KA01AB1234");
        assert_eq!(plate.to_string(), "KA01AB1234");
    }

    #[test]
    fn test_parse_rejects_short_plates() {
        let err = Plate::parse("AB-12").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::PlateTooShort { min: 5 });
        assert!(Plate::parse_with_min_len("AB-12", 4).is_ok());
    }

    #[test]
    fn test_serde_goes_through_validation() {
        let plate: Plate = serde_json::from_str("\"dl 3c ab 1234\"").unwrap();
        assert_eq!(plate.as_str(), "DL3CAB1234");
        assert_eq!(serde_json::to_string(&plate).unwrap(), "\"DL3CAB1234\"");

        assert!(serde_json::from_str::<Plate>("\"x\"").is_err());
    }

    #[test]
    fn test_ordering_is_lexical() {
        let a = Plate::parse("AAAAA1").unwrap();
        let b = Plate::parse("AAAAB1").unwrap();
        assert!(a < b);
    }
}
