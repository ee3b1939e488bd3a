//! Edge speed policy.
//!
//! Every edge gets exactly one speed, chosen in this order:
//!
//! 1. the provider's `maxspeed` tag, when it parses;
//! 2. the default for the edge's `highway` class, when the class is known;
//! 3. the single designated fallback, [`SpeedPolicy::fallback_kph`].
//!
//! A `maxspeed` below [`MIN_SPEED_KPH`] is treated as unusable, so every
//! edge ends up with a finite travel time.
//!
//! Speeds are configured in km/h (the unit road data uses) and handed to the
//! graph in m/s, so travel times come out in seconds.

use crate::{SpatialError, SpatialResult};

/// Default fallback speed: a typical urban limit.
pub const DEFAULT_FALLBACK_KPH: f64 = 50.0;

/// Slowest speed accepted from a tag or as the fallback.
pub const MIN_SPEED_KPH: f64 = 1.0;

const MPH_TO_KPH: f64 = 1.609_344;

/// Resolves per-edge travel speeds.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedPolicy {
    fallback_kph: f64,
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        SpeedPolicy { fallback_kph: DEFAULT_FALLBACK_KPH }
    }
}

impl SpeedPolicy {
    /// A policy with a custom fallback speed.
    ///
    /// # Errors
    ///
    /// [`SpatialError::InvalidSpeed`] unless `fallback_kph` is finite and at
    /// least [`MIN_SPEED_KPH`].
    pub fn with_fallback_kph(fallback_kph: f64) -> SpatialResult<Self> {
        if is_plausible_kph(fallback_kph) {
            Ok(SpeedPolicy { fallback_kph })
        } else {
            Err(SpatialError::InvalidSpeed { kph: fallback_kph })
        }
    }

    /// Speed used when an edge has neither a usable `maxspeed` nor a known
    /// road class.
    pub fn fallback_kph(&self) -> f64 {
        self.fallback_kph
    }

    /// Speed in km/h for an edge with the given tags.
    pub fn speed_kph(&self, highway: Option<&str>, maxspeed: Option<&str>) -> f64 {
        maxspeed
            .and_then(parse_maxspeed_kph)
            .or_else(|| highway.and_then(class_speed_kph))
            .unwrap_or(self.fallback_kph)
    }

    /// Speed in m/s for an edge with the given tags.
    pub fn speed_mps(&self, highway: Option<&str>, maxspeed: Option<&str>) -> f64 {
        self.speed_kph(highway, maxspeed) / 3.6
    }
}

/// Default speed (km/h) for a drivable `highway` class, or `None` if the
/// class is unknown.
///
/// Conservative urban defaults; a `maxspeed` tag always takes precedence.
pub fn class_speed_kph(highway: &str) -> Option<f64> {
    // Multi-valued classes ("residential;service") use the first value.
    let class = highway.split(';').next().unwrap_or("").trim();
    match class {
        "motorway"      | "motorway_link"  => Some(105.0),
        "trunk"         | "trunk_link"     => Some(90.0),
        "primary"       | "primary_link"   => Some(70.0),
        "secondary"     | "secondary_link" => Some(60.0),
        "tertiary"      | "tertiary_link"  => Some(50.0),
        "unclassified"                     => Some(40.0),
        "residential"                      => Some(30.0),
        "living_street"                    => Some(10.0),
        "service"                          => Some(20.0),
        "road"                             => Some(40.0),
        _                                  => None,
    }
}

/// Parse an OSM `maxspeed` value into km/h.
///
/// Accepts plain numbers (`"50"`), unit suffixes (`"30 mph"`, `"50 km/h"`),
/// and `;`-separated lists, which are averaged (`"50;70"` → 60).  Symbolic
/// values (`"none"`, `"walk"`, `"DE:urban"`) and numbers below
/// [`MIN_SPEED_KPH`] yield `None`.
pub fn parse_maxspeed_kph(raw: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for part in raw.split(';') {
        total += parse_single_kph(part.trim())?;
        count += 1;
    }
    (count > 0).then(|| total / count as f64)
}

fn parse_single_kph(value: &str) -> Option<f64> {
    let lower = value.to_ascii_lowercase();
    let (number, factor) = if let Some(n) = lower.strip_suffix("mph") {
        (n, MPH_TO_KPH)
    } else if let Some(n) = lower.strip_suffix("km/h") {
        (n, 1.0)
    } else if let Some(n) = lower.strip_suffix("kmh") {
        (n, 1.0)
    } else {
        (lower.as_str(), 1.0)
    };
    let kph = number.trim().parse::<f64>().ok()? * factor;
    is_plausible_kph(kph).then_some(kph)
}

fn is_plausible_kph(kph: f64) -> bool {
    kph.is_finite() && kph >= MIN_SPEED_KPH
}
