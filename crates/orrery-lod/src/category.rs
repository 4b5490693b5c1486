//! The closed set of simulated body kinds that carry their own LOD policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of celestial body a renderable represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyCategory {
    Star,
    Planet,
    Moon,
    Asteroid,
    Comet,
    /// Black holes, neutron stars and other massive compact objects.
    CompactObject,
}

impl BodyCategory {
    /// Number of categories.
    pub const COUNT: usize = 6;

    /// Every category, in table order.
    pub const ALL: [BodyCategory; Self::COUNT] = [
        BodyCategory::Star,
        BodyCategory::Planet,
        BodyCategory::Moon,
        BodyCategory::Asteroid,
        BodyCategory::Comet,
        BodyCategory::CompactObject,
    ];

    /// Dense index used by the policy table.
    pub const fn index(self) -> usize {
        match self {
            BodyCategory::Star => 0,
            BodyCategory::Planet => 1,
            BodyCategory::Moon => 2,
            BodyCategory::Asteroid => 3,
            BodyCategory::Comet => 4,
            BodyCategory::CompactObject => 5,
        }
    }

    /// Canonical tag string.
    pub const fn tag(self) -> &'static str {
        match self {
            BodyCategory::Star => "star",
            BodyCategory::Planet => "planet",
            BodyCategory::Moon => "moon",
            BodyCategory::Asteroid => "asteroid",
            BodyCategory::Comet => "comet",
            BodyCategory::CompactObject => "compact_object",
        }
    }
}

impl fmt::Display for BodyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a registry tag does not name a known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown body category tag {0:?}")]
pub struct ParseCategoryError(pub String);

impl FromStr for BodyCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "star" => Ok(BodyCategory::Star),
            "planet" => Ok(BodyCategory::Planet),
            "moon" => Ok(BodyCategory::Moon),
            "asteroid" => Ok(BodyCategory::Asteroid),
            "comet" => Ok(BodyCategory::Comet),
            "compactobject" | "massivecompactobject" | "blackhole" | "neutronstar" => {
                Ok(BodyCategory::CompactObject)
            }
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_and_ordered() {
        for (i, category) in BodyCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i, "{category} out of order");
        }
    }

    #[test]
    fn test_parse_registry_tags() {
        assert_eq!("planet".parse(), Ok(BodyCategory::Planet));
        assert_eq!("Star".parse(), Ok(BodyCategory::Star));
        assert_eq!(
            "massiveCompactObject".parse(),
            Ok(BodyCategory::CompactObject)
        );
        assert_eq!("black_hole".parse(), Ok(BodyCategory::CompactObject));
    }

    #[test]
    fn test_parse_unknown_tag_fails() {
        let err = "dust_cloud".parse::<BodyCategory>().unwrap_err();
        assert_eq!(err, ParseCategoryError("dust_cloud".to_string()));
    }

    #[test]
    fn test_tag_round_trips_through_parse() {
        for category in BodyCategory::ALL {
            assert_eq!(category.tag().parse(), Ok(category));
        }
    }
}
