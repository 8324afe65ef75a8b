use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Strength reported for a value that has never been offered.
pub const NEUTRAL_STRENGTH: f64 = 0.5;

/// Seen/chosen counters for one attribute value.
///
/// `strength` is serialized for readers of the file but always rederived
/// from the counters on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredStat")]
pub struct AttributeStat {
    #[serde(rename = "totalSeen")]
    pub seen: u32,
    pub chosen: u32,
    pub strength: f64,
}

#[derive(Deserialize)]
struct StoredStat {
    #[serde(rename = "totalSeen", default)]
    seen: u32,
    #[serde(default)]
    chosen: u32,
}

impl From<StoredStat> for AttributeStat {
    fn from(stored: StoredStat) -> Self {
        let chosen = stored.chosen.min(stored.seen);
        Self {
            seen: stored.seen,
            chosen,
            strength: Self::strength_of(chosen, stored.seen),
        }
    }
}

impl Default for AttributeStat {
    fn default() -> Self {
        Self {
            seen: 0,
            chosen: 0,
            strength: NEUTRAL_STRENGTH,
        }
    }
}

impl AttributeStat {
    fn record(&mut self, was_chosen: bool) {
        self.seen = self.seen.saturating_add(1);
        if was_chosen {
            self.chosen = self.chosen.saturating_add(1);
        }
        self.strength = Self::strength_of(self.chosen, self.seen);
    }

    /// `chosen / seen`, or the neutral default before the first sighting.
    pub fn strength_of(chosen: u32, seen: u32) -> f64 {
        if seen == 0 {
            NEUTRAL_STRENGTH
        } else {
            f64::from(chosen) / f64::from(seen)
        }
    }
}

// ---------------------------------------------------------------------------
// AttributeCategory
// ---------------------------------------------------------------------------

/// Value → stat mapping for one attribute dimension.
///
/// Entries keep first-insertion order; it decides ties in [`Self::top_value`]
/// and survives a JSON round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeCategory {
    entries: Vec<(String, AttributeStat)>,
}

impl AttributeCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category pre-seeded with neutral entries, in the given order.
    pub fn seeded<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut category = Self::new();
        for value in values {
            category.entry_mut(value.into());
        }
        category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, value: &str) -> Option<&AttributeStat> {
        self.entries
            .iter()
            .find(|(name, _)| name == value)
            .map(|(_, stat)| stat)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeStat)> {
        self.entries.iter().map(|(name, stat)| (name.as_str(), stat))
    }

    fn entry_mut(&mut self, value: String) -> &mut AttributeStat {
        let index = match self.entries.iter().position(|(name, _)| *name == value) {
            Some(index) => index,
            None => {
                self.entries.push((value, AttributeStat::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Count one appearance of `value` in an offered candidate.
    ///
    /// Absent or empty values are ignored; many candidates omit optional
    /// attributes.
    pub fn observe(&mut self, value: Option<&str>, was_chosen: bool) {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return;
        };
        self.entry_mut(value.to_owned()).record(was_chosen);
    }

    /// Highest-strength value, first-inserted winning exact ties.
    ///
    /// An empty category draws uniformly from `fallback` instead, so there is
    /// no fixed cold-start bias.
    pub fn top_value<R: Rng + ?Sized>(&self, fallback: &AttributePool, rng: &mut R) -> String {
        let mut best: Option<(&str, f64)> = None;
        for (name, stat) in &self.entries {
            if best.is_none_or(|(_, strength)| stat.strength > strength) {
                best = Some((name.as_str(), stat.strength));
            }
        }

        match best {
            Some((name, _)) => name.to_owned(),
            None => fallback.choose(rng).to_owned(),
        }
    }
}

impl Serialize for AttributeCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, stat) in &self.entries {
            map.serialize_entry(name, stat)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryVisitor;

        impl<'de> Visitor<'de> for CategoryVisitor {
            type Value = AttributeCategory;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute value to stats")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, AttributeStat)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, stat)) = access.next_entry::<String, AttributeStat>()? {
                    match entries.iter_mut().find(|(existing, _)| *existing == name) {
                        Some(slot) => slot.1 = stat,
                        None => entries.push((name, stat)),
                    }
                }
                Ok(AttributeCategory { entries })
            }
        }

        deserializer.deserialize_map(CategoryVisitor)
    }
}

// ---------------------------------------------------------------------------
// AttributePool
// ---------------------------------------------------------------------------

/// Non-empty, ordered set of values a strategy may draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributePool(Vec<String>);

impl AttributePool {
    pub fn new<I, S>(name: &str, values: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if value.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name} pool contains an empty value"
                )));
            }
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::Validation(format!("{name} pool is empty")));
        }
        Ok(Self(unique))
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // Non-empty by construction.
        self.0.choose(rng).map_or(self.first(), String::as_str)
    }

    /// Pool members other than `excluded`, in pool order.
    pub fn excluding(&self, excluded: &str) -> Vec<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .filter(|value| *value != excluded)
            .collect()
    }
}
