use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::nutrition::Totals;

pub const MAX_PERCENT: u16 = 999;
/// Ratios within this distance of 1.0 count as on target.
pub const ON_TARGET_TOLERANCE: f64 = 0.03;
/// Ratio at (and below) which the favorable color is reached in full.
pub const FULLY_FAVORABLE_RATIO: f64 = 0.5;
/// Ratio at (and above) which the unfavorable color is reached in full.
pub const FULLY_UNFAVORABLE_RATIO: f64 = 2.0;

/// Share of `goal` reached by `value`, rounded to a whole percent and clamped to
/// `0..=999`. A goal that is not a finite positive number, or a non-finite value, gives 0.
pub fn percent_of_goal(value: f64, goal: f64) -> u16 {
    if !goal.is_finite() || goal <= 0.0 || !value.is_finite() {
        return 0;
    }
    let percent = (value / goal * 100.0).round();
    percent.clamp(0.0, f64::from(MAX_PERCENT)) as u16
}

/// NaN when the day has no protein.
pub fn price_per_100_protein(totals: &Totals) -> f64 {
    if totals.protein <= 0.0 {
        return f64::NAN;
    }
    totals.price / totals.protein * 100.0
}

/// NaN when the day has no energy.
pub fn price_per_100_kcal(totals: &Totals) -> f64 {
    if totals.kcal <= 0.0 {
        return f64::NAN;
    }
    totals.price / totals.kcal * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| {
            let from = f64::from(from);
            (from + (f64::from(to) - from) * t).round() as u8
        };
        Rgb {
            r: channel(self.r, to.r),
            g: channel(self.g, to.g),
            b: channel(self.b, to.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| format!("'{s}' is not a #rrggbb color"))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| format!("'{s}' is not a #rrggbb color"))
        };
        Ok(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The three colors a ratio is blended between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAnchors {
    /// On target, or nothing to compare.
    pub base: Rgb,
    /// Cheaper than the reference.
    pub favorable: Rgb,
    /// More expensive than the reference.
    pub unfavorable: Rgb,
}

impl Default for ColorAnchors {
    fn default() -> Self {
        Self {
            base: Rgb::new(0x9c, 0xa3, 0xaf),
            favorable: Rgb::new(0x22, 0xc5, 0x5e),
            unfavorable: Rgb::new(0xef, 0x44, 0x44),
        }
    }
}

/// Color for a cost ratio compared with its goal-derived `reference`.
///
/// At half the reference or less the color is fully favorable, at twice or more fully
/// unfavorable, and within 3% of the reference it is the base color. Anything in between is
/// blended linearly. Non-finite input or a reference ≤ 0 gives the base color.
pub fn ratio_color(value: f64, reference: f64, anchors: &ColorAnchors) -> Rgb {
    if !value.is_finite() || !reference.is_finite() || reference <= 0.0 {
        return anchors.base;
    }
    let ratio = value / reference;
    if (ratio - 1.0).abs() <= ON_TARGET_TOLERANCE {
        return anchors.base;
    }
    if ratio < 1.0 {
        let t = (ratio - FULLY_FAVORABLE_RATIO) / (1.0 - FULLY_FAVORABLE_RATIO);
        anchors.favorable.lerp(anchors.base, t)
    } else {
        let t = (ratio - 1.0) / (FULLY_UNFAVORABLE_RATIO - 1.0);
        anchors.base.lerp(anchors.unfavorable, t)
    }
}
