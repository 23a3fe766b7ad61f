//! Measurements recorded on a GRN and the fields that hold them.

use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Default lower bound for a measurement, in percent.
pub const DEFAULT_MIN: f64 = 0.0;

/// Default upper bound for a measurement, in percent.
pub const DEFAULT_MAX: f64 = 100.0;

/// A single numeric reading, always finite.
///
/// The text the user typed is kept next to the parsed value so tables show
/// `12.50` the way it was entered. Exports carry the number.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    value: f64,
    text: String,
}

impl Measurement {
    /// The parsed value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The trimmed input this reading was parsed from.
    #[must_use]
    pub fn as_entered(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Measurement {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.value)
    }
}

/// Bounds applied to every measurement entered into a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
    /// Reject values outside `[min, max]`.
    pub enforce: bool,
}

impl Default for MeasurementRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            enforce: true,
        }
    }
}

impl MeasurementRange {
    /// Parse user input into a measurement.
    ///
    /// Blank input yields `None`, which clears the field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNumber`] if the input is not a finite number and
    /// [`Error::OutOfRange`] if the range is enforced and the value falls outside it.
    pub fn parse(&self, input: &str) -> Result<Option<Measurement>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let value: f64 = trimmed.parse().map_err(|_| Error::InvalidNumber {
            value: trimmed.to_string(),
        })?;
        if !value.is_finite() {
            return Err(Error::InvalidNumber {
                value: trimmed.to_string(),
            });
        }

        if self.enforce && !(self.min..=self.max).contains(&value) {
            return Err(Error::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }

        Ok(Some(Measurement {
            value,
            text: trimmed.to_string(),
        }))
    }
}

/// The six quality parameters sampled from each delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityParam {
    /// Mold.
    Mold,
    /// Dead seeds.
    DeadSeeds,
    /// White seeds.
    WhiteSeeds,
    /// Broken seeds.
    BrokenSeeds,
    /// Seeds with holes.
    HoleSeeds,
    /// Foreign material.
    ForeignMaterial,
}

impl QualityParam {
    /// All parameters in display order.
    pub const ALL: [Self; 6] = [
        Self::Mold,
        Self::DeadSeeds,
        Self::WhiteSeeds,
        Self::BrokenSeeds,
        Self::HoleSeeds,
        Self::ForeignMaterial,
    ];

    /// Field key as it appears in exports.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Mold => "mold",
            Self::DeadSeeds => "deadSeeds",
            Self::WhiteSeeds => "whiteSeeds",
            Self::BrokenSeeds => "brokenSeeds",
            Self::HoleSeeds => "holeSeeds",
            Self::ForeignMaterial => "foreignMaterial",
        }
    }

    /// Column heading.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Mold => "Mold",
            Self::DeadSeeds => "Dead Seeds",
            Self::WhiteSeeds => "White Seeds",
            Self::BrokenSeeds => "Broken Seeds",
            Self::HoleSeeds => "Hole Seeds",
            Self::ForeignMaterial => "Foreign Material",
        }
    }

    fn snake_key(self) -> &'static str {
        match self {
            Self::Mold => "mold",
            Self::DeadSeeds => "dead_seeds",
            Self::WhiteSeeds => "white_seeds",
            Self::BrokenSeeds => "broken_seeds",
            Self::HoleSeeds => "hole_seeds",
            Self::ForeignMaterial => "foreign_material",
        }
    }
}

impl FromStr for QualityParam {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|param| param.key() == s || param.snake_key() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// Quality readings for one GRN. Every reading starts out empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityParams {
    /// Mold.
    pub mold: Option<Measurement>,
    /// Dead seeds.
    pub dead_seeds: Option<Measurement>,
    /// White seeds.
    pub white_seeds: Option<Measurement>,
    /// Broken seeds.
    pub broken_seeds: Option<Measurement>,
    /// Seeds with holes.
    pub hole_seeds: Option<Measurement>,
    /// Foreign material.
    pub foreign_material: Option<Measurement>,
}

impl QualityParams {
    /// Read one parameter.
    #[must_use]
    pub fn get(&self, param: QualityParam) -> Option<&Measurement> {
        self.slot(param).as_ref()
    }

    /// Overwrite one parameter.
    pub fn set(&mut self, param: QualityParam, value: Option<Measurement>) {
        *self.slot_mut(param) = value;
    }

    /// Check if no parameter has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        QualityParam::ALL
            .into_iter()
            .all(|param| self.get(param).is_none())
    }

    fn slot(&self, param: QualityParam) -> &Option<Measurement> {
        match param {
            QualityParam::Mold => &self.mold,
            QualityParam::DeadSeeds => &self.dead_seeds,
            QualityParam::WhiteSeeds => &self.white_seeds,
            QualityParam::BrokenSeeds => &self.broken_seeds,
            QualityParam::HoleSeeds => &self.hole_seeds,
            QualityParam::ForeignMaterial => &self.foreign_material,
        }
    }

    fn slot_mut(&mut self, param: QualityParam) -> &mut Option<Measurement> {
        match param {
            QualityParam::Mold => &mut self.mold,
            QualityParam::DeadSeeds => &mut self.dead_seeds,
            QualityParam::WhiteSeeds => &mut self.white_seeds,
            QualityParam::BrokenSeeds => &mut self.broken_seeds,
            QualityParam::HoleSeeds => &mut self.hole_seeds,
            QualityParam::ForeignMaterial => &mut self.foreign_material,
        }
    }
}

/// An editable measurement field on a GRN.
///
/// Identifiers, GRN numbers and status are deliberately absent: they cannot
/// be written through the field editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrnField {
    /// The moisture reading.
    Moisture,
    /// One of the quality parameters.
    Quality(QualityParam),
}

impl GrnField {
    /// All editable fields in display order.
    pub fn all() -> impl Iterator<Item = Self> {
        std::iter::once(Self::Moisture).chain(QualityParam::ALL.into_iter().map(Self::Quality))
    }

    /// Field key as it appears in exports.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Moisture => "moistureValue",
            Self::Quality(param) => param.key(),
        }
    }

    /// Column heading.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Moisture => "Moisture",
            Self::Quality(param) => param.label(),
        }
    }
}

impl std::fmt::Display for GrnField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GrnField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "moisture" | "moistureValue" | "moisture_value" => Ok(Self::Moisture),
            other => other.parse().map(Self::Quality),
        }
    }
}
