//! Plate Descriptor - plate type, layout generation and side

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// Three independent scans over the same token; they are not a partition.
static PLATE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\D*").expect("static plate type pattern"));
static GENERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("static generation pattern"));
static PLATE_SIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D*$").expect("static plate side pattern"));

/// Plate information encoded in the last run-name field (e.g. `pH003R`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlateDescriptor {
    plate_type: String,
    generation: String,
    side: String,
}

impl PlateDescriptor {
    /// Extract type, generation and side from a plate-info token.
    ///
    /// * type: leading run of non-digits (`pH`, `Gen`, may be empty)
    /// * generation: first run of digits (`003`)
    /// * side: trailing run of non-digits (`R`, may be empty)
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternNotFound`] when the token has no digits.
    pub fn parse(token: &str) -> Result<Self> {
        let generation = GENERATION
            .find(token)
            .ok_or_else(|| Error::PatternNotFound {
                pattern: "generation digits",
                input: token.to_string(),
            })?
            .as_str();

        Ok(Self {
            plate_type: first_match(&PLATE_TYPE, token).to_string(),
            generation: generation.to_string(),
            side: first_match(&PLATE_SIDE, token).to_string(),
        })
    }

    /// Plate/screen type (`pH`, `cond`, `Gen`).
    #[must_use]
    pub fn plate_type(&self) -> &str {
        &self.plate_type
    }

    /// Generation of the plate layout, digits as written (`003`).
    #[must_use]
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Plate side (`L`/`R`).
    #[must_use]
    pub fn side(&self) -> &str {
        &self.side
    }
}

// Both anchored patterns accept the empty string, so they always match.
fn first_match<'t>(pattern: &Regex, token: &'t str) -> &'t str {
    pattern.find(token).map_or("", |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ph_plate() {
        let plate = PlateDescriptor::parse("pH003R").unwrap();
        assert_eq!(plate.plate_type(), "pH");
        assert_eq!(plate.generation(), "003");
        assert_eq!(plate.side(), "R");
    }

    #[test]
    fn test_generation_plate() {
        let plate = PlateDescriptor::parse("Gen006L").unwrap();
        assert_eq!(plate.plate_type(), "Gen");
        assert_eq!(plate.generation(), "006");
        assert_eq!(plate.side(), "L");
    }

    #[test]
    fn test_all_digits() {
        let plate = PlateDescriptor::parse("006").unwrap();
        assert_eq!(plate.plate_type(), "");
        assert_eq!(plate.generation(), "006");
        assert_eq!(plate.side(), "");
    }

    #[test]
    fn test_no_digits() {
        let err = PlateDescriptor::parse("pHR").unwrap_err();
        assert!(matches!(
            err,
            Error::PatternNotFound {
                pattern: "generation digits",
                ..
            }
        ));
    }

    #[test]
    fn test_interleaved_token_scans_independently() {
        let plate = PlateDescriptor::parse("12A34B").unwrap();
        assert_eq!(plate.plate_type(), "");
        assert_eq!(plate.generation(), "12");
        assert_eq!(plate.side(), "B");
    }

    #[test]
    fn test_side_empty_when_token_ends_in_digit() {
        let plate = PlateDescriptor::parse("cond12").unwrap();
        assert_eq!(plate.plate_type(), "cond");
        assert_eq!(plate.side(), "");
    }
}
