//! Named evolution properties, their defaults, and validation.

use crate::constants::*;
use core::{error::Error, fmt};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Every tunable of a [Population](crate::population::Population)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Property {
    SpeciesDistance,
    ExcessFactor,
    DisjointFactor,
    WeightFactor,

    RandomWeightStrength,
    ShiftWeightStrength,

    MutateRandomWeight,
    MutateShiftWeight,
    MutateToggleLink,
    MutateLink,
    MutateNode,
    MutateRemoveNode,

    SurvivalChance,
}

impl Property {
    pub const ALL: [Property; 13] = [
        Property::SpeciesDistance,
        Property::ExcessFactor,
        Property::DisjointFactor,
        Property::WeightFactor,
        Property::RandomWeightStrength,
        Property::ShiftWeightStrength,
        Property::MutateRandomWeight,
        Property::MutateShiftWeight,
        Property::MutateToggleLink,
        Property::MutateLink,
        Property::MutateNode,
        Property::MutateRemoveNode,
        Property::SurvivalChance,
    ];

    /// Whether this property is a probability checked against a uniform draw
    pub fn is_chance(&self) -> bool {
        matches!(
            self,
            Property::MutateRandomWeight
                | Property::MutateShiftWeight
                | Property::MutateToggleLink
                | Property::MutateLink
                | Property::MutateNode
                | Property::MutateRemoveNode
        )
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Property::SpeciesDistance => "SPECIES_DISTANCE",
            Property::ExcessFactor => "EXCESS_FACTOR",
            Property::DisjointFactor => "DISJOINT_FACTOR",
            Property::WeightFactor => "WEIGHT_FACTOR",
            Property::RandomWeightStrength => "RANDOM_WEIGHT_STRENGTH",
            Property::ShiftWeightStrength => "SHIFT_WEIGHT_STRENGTH",
            Property::MutateRandomWeight => "MUTATE_RANDOM_WEIGHT",
            Property::MutateShiftWeight => "MUTATE_SHIFT_WEIGHT",
            Property::MutateToggleLink => "MUTATE_TOGGLE_LINK",
            Property::MutateLink => "MUTATE_LINK",
            Property::MutateNode => "MUTATE_NODE",
            Property::MutateRemoveNode => "MUTATE_REMOVE_NODE",
            Property::SurvivalChance => "SURVIVAL_CHANCE",
        })
    }
}

/// Configuration errors, reported before any population state is built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is too many OR too few clients (expected {min}..={max})", min = JOLTEON_POPULATION_MIN, max = JOLTEON_POPULATION_MAX)]
    PopulationSize(usize),
    #[error("{inputs} inputs and {outputs} outputs don't fit a node id space of {max}", max = JOLTEON_MAX_NODES)]
    Topology { inputs: usize, outputs: usize },
    #[error("{property} = {value} is out of range: {reason}")]
    Property {
        property: Property,
        value: f64,
        reason: &'static str,
    },
    #[error("malformed properties: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unreadable properties: {0}")]
    Io(#[from] std::io::Error),
}

/// Values for every [Property]. Keys missing from a json source keep their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct Properties {
    pub species_distance: f64,
    pub excess_factor: f64,
    pub disjoint_factor: f64,
    pub weight_factor: f64,
    pub random_weight_strength: f64,
    pub shift_weight_strength: f64,
    pub mutate_random_weight: f64,
    pub mutate_shift_weight: f64,
    pub mutate_toggle_link: f64,
    pub mutate_link: f64,
    pub mutate_node: f64,
    pub mutate_remove_node: f64,
    pub survival_chance: f64,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            species_distance: JOLTEON_SPECIES_DISTANCE,
            excess_factor: JOLTEON_EXCESS_FACTOR,
            disjoint_factor: JOLTEON_DISJOINT_FACTOR,
            weight_factor: JOLTEON_WEIGHT_FACTOR,
            random_weight_strength: JOLTEON_RANDOM_WEIGHT_STRENGTH,
            shift_weight_strength: JOLTEON_SHIFT_WEIGHT_STRENGTH,
            mutate_random_weight: JOLTEON_MUTATE_RANDOM_WEIGHT,
            mutate_shift_weight: JOLTEON_MUTATE_SHIFT_WEIGHT,
            mutate_toggle_link: JOLTEON_MUTATE_TOGGLE_LINK,
            mutate_link: JOLTEON_MUTATE_LINK,
            mutate_node: JOLTEON_MUTATE_NODE,
            mutate_remove_node: JOLTEON_MUTATE_REMOVE_NODE,
            survival_chance: JOLTEON_SURVIVAL_CHANCE,
        }
    }
}

impl Properties {
    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::SpeciesDistance => self.species_distance,
            Property::ExcessFactor => self.excess_factor,
            Property::DisjointFactor => self.disjoint_factor,
            Property::WeightFactor => self.weight_factor,
            Property::RandomWeightStrength => self.random_weight_strength,
            Property::ShiftWeightStrength => self.shift_weight_strength,
            Property::MutateRandomWeight => self.mutate_random_weight,
            Property::MutateShiftWeight => self.mutate_shift_weight,
            Property::MutateToggleLink => self.mutate_toggle_link,
            Property::MutateLink => self.mutate_link,
            Property::MutateNode => self.mutate_node,
            Property::MutateRemoveNode => self.mutate_remove_node,
            Property::SurvivalChance => self.survival_chance,
        }
    }

    /// Unconditionally set a property. See [Properties::validate]
    pub fn set(&mut self, property: Property, value: f64) {
        match property {
            Property::SpeciesDistance => self.species_distance = value,
            Property::ExcessFactor => self.excess_factor = value,
            Property::DisjointFactor => self.disjoint_factor = value,
            Property::WeightFactor => self.weight_factor = value,
            Property::RandomWeightStrength => self.random_weight_strength = value,
            Property::ShiftWeightStrength => self.shift_weight_strength = value,
            Property::MutateRandomWeight => self.mutate_random_weight = value,
            Property::MutateShiftWeight => self.mutate_shift_weight = value,
            Property::MutateToggleLink => self.mutate_toggle_link = value,
            Property::MutateLink => self.mutate_link = value,
            Property::MutateNode => self.mutate_node = value,
            Property::MutateRemoveNode => self.mutate_remove_node = value,
            Property::SurvivalChance => self.survival_chance = value,
        }
    }

    pub fn with_overrides(mut self, updates: &[(Property, f64)]) -> Self {
        for (property, value) in updates {
            self.set(*property, *value);
        }
        self
    }

    fn check(property: Property, value: f64) -> Result<(), ConfigError> {
        let reason = if !value.is_finite() {
            Some("must be finite")
        } else if property.is_chance() && !(0. ..=1.).contains(&value) {
            Some("a chance must be within [0, 1]")
        } else if property == Property::SurvivalChance && !(value > 0. && value <= 1.) {
            Some("survival chance must be within (0, 1]")
        } else if property == Property::SpeciesDistance && value <= 0. {
            Some("species distance must be positive")
        } else if value < 0. {
            Some("must not be negative")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ConfigError::Property {
                property,
                value,
                reason,
            }),
            None => Ok(()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Property::ALL
            .iter()
            .try_for_each(|p| Self::check(*p, self.get(*p)))
    }

    /// Set a property only if the new value is legal, leaving self untouched otherwise
    pub fn try_set(&mut self, property: Property, value: f64) -> Result<(), ConfigError> {
        Self::check(property, value)?;
        self.set(property, value);
        Ok(())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let properties: Self = serde_json::from_str(s)?;
        properties.validate()?;
        Ok(properties)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    pub fn to_string(&self) -> Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, new_t};

    #[test]
    fn test_defaults_valid() {
        let properties = Properties::default();
        properties.validate().unwrap();
        assert_f64_approx!(properties.get(Property::SpeciesDistance), 4.);
        assert_f64_approx!(properties.get(Property::ShiftWeightStrength), 0.25);
        assert_f64_approx!(properties.get(Property::MutateNode), 0.5);
        assert_f64_approx!(properties.get(Property::SurvivalChance), 0.75);
    }

    #[test]
    fn test_get_set_every_property() {
        let mut properties = Properties::default();
        for (idx, property) in Property::ALL.iter().enumerate() {
            let value = idx as f64 / 100.;
            properties.set(*property, value);
            assert_f64_approx!(properties.get(*property), value, property);
        }
    }

    #[test]
    fn test_with_overrides() {
        let properties = Properties::default().with_overrides(&[
            (Property::MutateLink, 1.),
            (Property::WeightFactor, 0.4),
        ]);
        assert_f64_approx!(properties.mutate_link, 1.);
        assert_f64_approx!(properties.weight_factor, 0.4);
        assert_f64_approx!(properties.mutate_node, 0.5);
    }

    #[test]
    fn test_validate_rejects() {
        for properties in [
            new_t!(Properties, mutate_link = 1.5),
            new_t!(Properties, mutate_remove_node = -0.1),
            new_t!(Properties, survival_chance = 0.),
            new_t!(Properties, survival_chance = 1.01),
            new_t!(Properties, species_distance = 0.),
            new_t!(Properties, weight_factor = f64::NAN),
            new_t!(Properties, shift_weight_strength = -1.),
        ] {
            assert!(matches!(
                properties.validate(),
                Err(ConfigError::Property { .. })
            ));
        }
    }

    #[test]
    fn test_try_set_keeps_old_value() {
        let mut properties = Properties::default();
        assert!(properties.try_set(Property::MutateNode, 2.).is_err());
        assert_f64_approx!(properties.mutate_node, 0.5);
        properties.try_set(Property::MutateNode, 0.2).unwrap();
        assert_f64_approx!(properties.mutate_node, 0.2);
    }

    #[test]
    fn test_from_str_partial() {
        let properties =
            Properties::from_str(r#"{"SPECIES_DISTANCE": 3.0, "MUTATE_LINK": 0.3}"#).unwrap();
        assert_f64_approx!(properties.species_distance, 3.);
        assert_f64_approx!(properties.mutate_link, 0.3);
        assert_f64_approx!(properties.excess_factor, 1.);
    }

    #[test]
    fn test_from_str_errors() {
        assert!(matches!(
            Properties::from_str(r#"{"SPECIES_DISTANCE": "far"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            Properties::from_str(r#"{"SPECIES_DISTANS": 3.0}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            Properties::from_str(r#"{"SURVIVAL_CHANCE": 0.0}"#),
            Err(ConfigError::Property {
                property: Property::SurvivalChance,
                ..
            })
        ));
    }

    #[test]
    fn test_round_trip_names() {
        let s = Properties::default().to_string().unwrap();
        assert!(s.contains("\"MUTATE_REMOVE_NODE\""));
        assert_eq!(Properties::from_str(&s).unwrap(), Properties::default());
        assert_eq!(Property::MutateToggleLink.to_string(), "MUTATE_TOGGLE_LINK");
    }

    #[test]
    fn test_display_matches_json_key() {
        for property in Property::ALL {
            assert_eq!(
                serde_json::to_string(&property).unwrap(),
                format!("\"{property}\"")
            );
        }
    }
}
