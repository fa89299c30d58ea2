//! Closed category vocabularies and their fixed lookup tables.
//!
//! Every table is an exhaustive `match`, so a new variant cannot ship
//! without a multiplier.

use std::fmt;
use std::str::FromStr;

use crate::error::PulseError;

/// Normalize a label for lookup: `"Heavy Rain"` and `"heavy_rain"` compare equal.
fn normalize(label: &str) -> String {
    label.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

// ── Exam phase ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExamPhase {
    None,
    Midterm,
    Endterm,
}

impl ExamPhase {
    pub const ALL: [ExamPhase; 3] = [ExamPhase::None, ExamPhase::Midterm, ExamPhase::Endterm];

    /// Rule table, evaluated top to bottom.
    pub fn for_month(month: u32) -> Self {
        match month {
            1 | 4 | 7 | 10 => ExamPhase::Midterm,
            3 | 6 | 9 | 12 => ExamPhase::Endterm,
            _ => ExamPhase::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExamPhase::None => "none",
            ExamPhase::Midterm => "midterm",
            ExamPhase::Endterm => "endterm",
        }
    }

    /// Demand multiplier.
    pub fn intensity(self) -> f64 {
        match self {
            ExamPhase::None => 1.0,
            ExamPhase::Midterm => 0.75,
            ExamPhase::Endterm => 0.55,
        }
    }
}

impl FromStr for ExamPhase {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" => Ok(ExamPhase::None),
            "midterm" => Ok(ExamPhase::Midterm),
            "endterm" => Ok(ExamPhase::Endterm),
            _ => Err(PulseError::UnknownCategory {
                kind: "exam phase",
                label: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Weather ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCondition {
    Normal,
    HeavyRain,
    ColdMorning,
    ExtremeHeat,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Normal,
        WeatherCondition::HeavyRain,
        WeatherCondition::ColdMorning,
        WeatherCondition::ExtremeHeat,
    ];

    /// Seasonal rule table, evaluated top to bottom.
    pub fn for_month(month: u32) -> Self {
        match month {
            7..=9 => WeatherCondition::HeavyRain,
            12 | 1 => WeatherCondition::ColdMorning,
            4 | 5 => WeatherCondition::ExtremeHeat,
            _ => WeatherCondition::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Normal => "normal",
            WeatherCondition::HeavyRain => "heavy_rain",
            WeatherCondition::ColdMorning => "cold_morning",
            WeatherCondition::ExtremeHeat => "extreme_heat",
        }
    }

    pub fn impact_factor(self) -> f64 {
        match self {
            WeatherCondition::Normal => 1.0,
            WeatherCondition::HeavyRain => 0.80,
            WeatherCondition::ColdMorning => 0.85,
            WeatherCondition::ExtremeHeat => 0.78,
        }
    }
}

impl FromStr for WeatherCondition {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "normal" => Ok(WeatherCondition::Normal),
            "heavy_rain" => Ok(WeatherCondition::HeavyRain),
            "cold_morning" => Ok(WeatherCondition::ColdMorning),
            "extreme_heat" => Ok(WeatherCondition::ExtremeHeat),
            _ => Err(PulseError::UnknownCategory {
                kind: "weather",
                label: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Maintenance ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceSeverity {
    None,
    Low,
    Medium,
    High,
}

impl MaintenanceSeverity {
    pub const ALL: [MaintenanceSeverity; 4] = [
        MaintenanceSeverity::None,
        MaintenanceSeverity::Low,
        MaintenanceSeverity::Medium,
        MaintenanceSeverity::High,
    ];

    /// Severities a triggered maintenance day can draw from.
    pub const TRIGGERED: [MaintenanceSeverity; 3] = [
        MaintenanceSeverity::Low,
        MaintenanceSeverity::Medium,
        MaintenanceSeverity::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MaintenanceSeverity::None => "none",
            MaintenanceSeverity::Low => "low",
            MaintenanceSeverity::Medium => "medium",
            MaintenanceSeverity::High => "high",
        }
    }

    /// Share of equipment still usable.
    pub fn availability_ratio(self) -> f64 {
        match self {
            MaintenanceSeverity::None => 1.0,
            MaintenanceSeverity::Low => 0.9,
            MaintenanceSeverity::Medium => 0.8,
            MaintenanceSeverity::High => 0.65,
        }
    }
}

impl FromStr for MaintenanceSeverity {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" => Ok(MaintenanceSeverity::None),
            "low" => Ok(MaintenanceSeverity::Low),
            "medium" => Ok(MaintenanceSeverity::Medium),
            "high" => Ok(MaintenanceSeverity::High),
            _ => Err(PulseError::UnknownCategory {
                kind: "maintenance severity",
                label: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MaintenanceSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Inter-university event ──────────────────────────────────────────────────

pub const EVENT_BOOST: f64 = 1.15;

/// The event runs 15-21 January.
pub fn is_interuni_event(month: u32, day: u32) -> bool {
    month == 1 && (15..=21).contains(&day)
}

pub fn event_boost_factor(event: bool) -> f64 {
    if event {
        EVENT_BOOST
    } else {
        1.0
    }
}

// ── Five-point levels ───────────────────────────────────────────────────────

/// A 1-5 slider value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Level {
    pub fn new(kind: &'static str, value: i64) -> Result<Self, PulseError> {
        match value {
            1 => Ok(Level::One),
            2 => Ok(Level::Two),
            3 => Ok(Level::Three),
            4 => Ok(Level::Four),
            5 => Ok(Level::Five),
            _ => Err(PulseError::InvalidLevel { kind, value }),
        }
    }

    pub fn value(self) -> i64 {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
            Level::Four => 4,
            Level::Five => 5,
        }
    }

    /// Stress level as an academic load index.
    pub fn academic_load(self) -> f64 {
        match self {
            Level::One => 0.1,
            Level::Two => 0.3,
            Level::Three => 0.5,
            Level::Four => 0.7,
            Level::Five => 0.9,
        }
    }

    /// Interest level as a gym adoption ratio.
    pub fn adoption_ratio(self) -> f64 {
        match self {
            Level::One => 0.2,
            Level::Two => 0.4,
            Level::Three => 0.6,
            Level::Four => 0.8,
            Level::Five => 1.0,
        }
    }
}
