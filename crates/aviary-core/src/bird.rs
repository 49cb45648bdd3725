use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Identifier of a bird record, generated by the repository on insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirdId(i64);

impl BirdId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for BirdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BirdId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidBirdId(s.to_string()))
    }
}

impl From<i64> for BirdId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A conservation status classification. Read-only for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservationStatus {
    pub status_id: i64,
    pub status_name: String,
    pub status_colour: String,
}

/// The eight scalar fields of a bird record.
///
/// Names are stored verbatim. Nothing here is validated: the storage
/// backend's own constraints are the only enforcement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BirdFields {
    pub primary_name: String,
    pub english_name: String,
    pub scientific_name: String,
    pub order_name: String,
    pub family: String,
    pub weight: Option<f64>,
    pub length: Option<f64>,
    pub status_id: Option<i64>,
}

/// A stored photo reference. Only the generated filename is kept, the bytes
/// live in the attachment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub filename: String,
    pub photographer: Option<String>,
}

impl Photo {
    pub fn new(filename: impl Into<String>, photographer: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            photographer,
        }
    }
}

/// A bird joined with its conservation status and photo, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdDetails {
    pub bird_id: BirdId,
    pub fields: BirdFields,
    pub status: Option<ConservationStatus>,
    pub photo: Option<Photo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bird_id() {
        assert_eq!("42".parse::<BirdId>().unwrap(), BirdId::new(42));
        assert_eq!(" 7 ".parse::<BirdId>().unwrap(), BirdId::new(7));
    }

    #[test]
    fn parse_bird_id_rejects_non_numeric() {
        assert!("kiwi".parse::<BirdId>().is_err());
        assert!("".parse::<BirdId>().is_err());
        assert!("4.2".parse::<BirdId>().is_err());
    }
}
