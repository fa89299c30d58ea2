/// Column-name constants for the footfall dataset and the model features.
/// Single source of truth - exported to Python via PyO3.

// ── Dataset columns ─────────────────────────────────────────────────────────
pub mod columns {
    pub const DATE: &str = "date";
    pub const DAY_OF_WEEK: &str = "day_of_week";
    pub const IS_SUNDAY: &str = "is_sunday";
    pub const MONTH: &str = "month";
    pub const YEAR: &str = "year";
    pub const IS_VACATION: &str = "is_vacation";
    pub const IS_GYM_OPEN: &str = "is_gym_open";
    pub const ACTIVE_STUDENT_POPULATION: &str = "active_student_population";
    pub const EXAM_PHASE: &str = "exam_phase";
    pub const EXAM_INTENSITY: &str = "exam_intensity";
    pub const ACADEMIC_LOAD_INDEX: &str = "academic_load_index";
    pub const WEATHER_CONDITION: &str = "weather_condition";
    pub const WEATHER_IMPACT_FACTOR: &str = "weather_impact_factor";
    pub const INTERUNI_EVENT: &str = "interuni_event";
    pub const EVENT_BOOST_FACTOR: &str = "event_boost_factor";
    pub const GYM_ADOPTION_RATIO: &str = "gym_adoption_ratio";
    pub const MAINTENANCE_FLAG: &str = "maintenance_flag";
    pub const MAINTENANCE_SEVERITY: &str = "maintenance_severity";
    pub const EQUIPMENT_AVAILABILITY_RATIO: &str = "equipment_availability_ratio";
    pub const EFFECTIVE_CAPACITY: &str = "effective_capacity";
    pub const BASE_DEMAND: &str = "base_demand";
    pub const RAW_DEMAND: &str = "raw_demand";
    pub const DAILY_GYM_FOOTFALL: &str = "daily_gym_footfall";

    /// Written column order.
    pub const ALL: [&str; 23] = [
        DATE,
        DAY_OF_WEEK,
        IS_SUNDAY,
        MONTH,
        YEAR,
        IS_VACATION,
        IS_GYM_OPEN,
        ACTIVE_STUDENT_POPULATION,
        EXAM_PHASE,
        EXAM_INTENSITY,
        ACADEMIC_LOAD_INDEX,
        WEATHER_CONDITION,
        WEATHER_IMPACT_FACTOR,
        INTERUNI_EVENT,
        EVENT_BOOST_FACTOR,
        GYM_ADOPTION_RATIO,
        MAINTENANCE_FLAG,
        MAINTENANCE_SEVERITY,
        EQUIPMENT_AVAILABILITY_RATIO,
        EFFECTIVE_CAPACITY,
        BASE_DEMAND,
        RAW_DEMAND,
        DAILY_GYM_FOOTFALL,
    ];
}

// ── Model feature columns ───────────────────────────────────────────────────
pub mod features {
    pub use super::columns::{
        ACADEMIC_LOAD_INDEX, ACTIVE_STUDENT_POPULATION, DAY_OF_WEEK,
        EQUIPMENT_AVAILABILITY_RATIO, EVENT_BOOST_FACTOR, GYM_ADOPTION_RATIO, INTERUNI_EVENT,
        IS_GYM_OPEN, IS_SUNDAY, IS_VACATION, MONTH, YEAR,
    };

    pub const EXAM_PHASE_MIDTERM: &str = "exam_phase_midterm";
    pub const EXAM_PHASE_NONE: &str = "exam_phase_none";
    pub const WEATHER_CONDITION_EXTREME_HEAT: &str = "weather_condition_extreme_heat";
    pub const WEATHER_CONDITION_HEAVY_RAIN: &str = "weather_condition_heavy_rain";
    pub const WEATHER_CONDITION_NORMAL: &str = "weather_condition_normal";
    pub const MAINTENANCE_SEVERITY_LOW: &str = "maintenance_severity_low";
    pub const MAINTENANCE_SEVERITY_MEDIUM: &str = "maintenance_severity_medium";
    pub const MAINTENANCE_SEVERITY_NONE: &str = "maintenance_severity_none";

    /// The exact order the trained model was fitted with.
    pub const ALL: [&str; 20] = [
        DAY_OF_WEEK,
        IS_SUNDAY,
        MONTH,
        YEAR,
        IS_VACATION,
        IS_GYM_OPEN,
        ACTIVE_STUDENT_POPULATION,
        ACADEMIC_LOAD_INDEX,
        INTERUNI_EVENT,
        EVENT_BOOST_FACTOR,
        GYM_ADOPTION_RATIO,
        EQUIPMENT_AVAILABILITY_RATIO,
        EXAM_PHASE_MIDTERM,
        EXAM_PHASE_NONE,
        WEATHER_CONDITION_EXTREME_HEAT,
        WEATHER_CONDITION_HEAVY_RAIN,
        WEATHER_CONDITION_NORMAL,
        MAINTENANCE_SEVERITY_LOW,
        MAINTENANCE_SEVERITY_MEDIUM,
        MAINTENANCE_SEVERITY_NONE,
    ];
}

// ── Forecast / breakdown frames ─────────────────────────────────────────────
pub mod forecast {
    pub const DAY: &str = "Day";
    pub const FOOTFALL: &str = "Footfall";
}

pub mod impacts {
    pub const FACTOR: &str = "Factor";
    pub const VALUE: &str = "Value";
}
