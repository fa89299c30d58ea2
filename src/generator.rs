//! Synthetic footfall series: calendar rules, category rules, seeded draws
//! and demand composition, assembled into one table in a single pass.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::calendar::{CalendarFields, OperatingCalendar};
use crate::categories::{
    event_boost_factor, is_interuni_event, ExamPhase, MaintenanceSeverity, WeatherCondition,
};
use crate::config::GeneratorConfig;
use crate::demand::{DemandComposer, DemandInputs};
use crate::error::PulseError;
use crate::sampler::StochasticSampler;
use crate::schema::columns;

/// One generated day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub calendar: CalendarFields,
    pub active_student_population: i64,
    pub exam_phase: ExamPhase,
    pub academic_load_index: f64,
    pub weather_condition: WeatherCondition,
    pub interuni_event: bool,
    pub event_boost_factor: f64,
    pub gym_adoption_ratio: f64,
    pub maintenance_flag: bool,
    pub maintenance_severity: MaintenanceSeverity,
    pub effective_capacity: i64,
    pub base_demand: f64,
    /// Demand after noise.
    pub raw_demand: f64,
    pub daily_gym_footfall: i64,
}

pub struct FootfallGenerator {
    config: GeneratorConfig,
}

impl FootfallGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, PulseError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate with a fresh RNG seeded from the configuration.
    pub fn generate_records(&self) -> Result<Vec<DailyRecord>, PulseError> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.generate_records_with(&mut rng)
    }

    /// Generate consuming the given RNG.
    pub fn generate_records_with<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<DailyRecord>, PulseError> {
        let cfg = &self.config;
        info!(
            start = %cfg.start_date,
            end = %cfg.end_date,
            seed = cfg.seed,
            "generating footfall series"
        );

        let calendar = OperatingCalendar::from_config(cfg)
            .derive_range(cfg.start_date, cfg.end_date);
        let n = calendar.len();
        debug!(rows = n, "derived calendar fields");

        let years: Vec<i32> = calendar.iter().map(|c| c.year).collect();
        let mut sampler = StochasticSampler::new(rng, cfg);
        let population = sampler.population(n);
        let academic_load = sampler.academic_load(n)?;
        let adoption = sampler.adoption_ratio(&years)?;
        let maintenance_flags = sampler.maintenance_flags(n);
        let severity = sampler.maintenance_severity(&maintenance_flags)?;

        let composer = DemandComposer::new(cfg.base_capacity, cfg.academic_load_penalty);
        let mut records: Vec<DailyRecord> = Vec::with_capacity(n);
        let mut demand: Vec<f64> = Vec::with_capacity(n);

        for (i, cal) in calendar.iter().enumerate() {
            let event = is_interuni_event(cal.month, cal.day);
            let inputs = DemandInputs {
                population: population[i],
                adoption_ratio: adoption[i],
                exam_phase: ExamPhase::for_month(cal.month),
                weather: WeatherCondition::for_month(cal.month),
                event_boost: event_boost_factor(event),
                academic_load: academic_load[i],
            };
            demand.push(composer.raw_demand(&inputs));
            records.push(DailyRecord {
                calendar: *cal,
                active_student_population: inputs.population,
                exam_phase: inputs.exam_phase,
                academic_load_index: inputs.academic_load,
                weather_condition: inputs.weather,
                interuni_event: event,
                event_boost_factor: inputs.event_boost,
                gym_adoption_ratio: inputs.adoption_ratio,
                maintenance_flag: maintenance_flags[i],
                maintenance_severity: severity[i],
                effective_capacity: composer.effective_capacity(severity[i]),
                base_demand: composer.base_demand(&inputs),
                raw_demand: 0.0,
                daily_gym_footfall: 0,
            });
        }

        let noise = sampler.demand_noise(&demand)?;
        for ((record, d), e) in records.iter_mut().zip(&demand).zip(&noise) {
            record.raw_demand = d + e;
            record.daily_gym_footfall = composer.footfall(
                record.calendar.is_gym_open,
                record.raw_demand,
                record.effective_capacity,
            );
        }

        info!(rows = records.len(), "footfall series generated");
        Ok(records)
    }

    /// Generate the full table as a DataFrame.
    pub fn generate(&self) -> Result<DataFrame, PulseError> {
        records_to_frame(&self.generate_records()?)
    }

    /// Generate and write to the configured output path.
    pub fn generate_to_file(&self) -> Result<DataFrame, PulseError> {
        let mut df = self.generate()?;
        write_dataset(&mut df, &self.config.output_path)?;
        Ok(df)
    }
}

fn flag(b: bool) -> i32 {
    i32::from(b)
}

/// Lay records out in the written column order.
pub fn records_to_frame(records: &[DailyRecord]) -> Result<DataFrame, PulseError> {
    let dates: Vec<NaiveDate> = records.iter().map(|r| r.calendar.date).collect();
    let i32_col = |f: fn(&DailyRecord) -> i32| -> Vec<i32> { records.iter().map(f).collect() };
    let i64_col = |f: fn(&DailyRecord) -> i64| -> Vec<i64> { records.iter().map(f).collect() };
    let f64_col = |f: fn(&DailyRecord) -> f64| -> Vec<f64> { records.iter().map(f).collect() };
    let str_col = |f: fn(&DailyRecord) -> &'static str| -> Vec<&'static str> {
        records.iter().map(f).collect()
    };

    let df = DataFrame::new(vec![
        Column::new(columns::DATE.into(), &dates),
        Column::new(columns::DAY_OF_WEEK.into(), i32_col(|r| r.calendar.day_of_week as i32)),
        Column::new(columns::IS_SUNDAY.into(), i32_col(|r| flag(r.calendar.is_sunday))),
        Column::new(columns::MONTH.into(), i32_col(|r| r.calendar.month as i32)),
        Column::new(columns::YEAR.into(), i32_col(|r| r.calendar.year)),
        Column::new(columns::IS_VACATION.into(), i32_col(|r| flag(r.calendar.is_vacation))),
        Column::new(columns::IS_GYM_OPEN.into(), i32_col(|r| flag(r.calendar.is_gym_open))),
        Column::new(
            columns::ACTIVE_STUDENT_POPULATION.into(),
            i64_col(|r| r.active_student_population),
        ),
        Column::new(columns::EXAM_PHASE.into(), str_col(|r| r.exam_phase.label())),
        Column::new(columns::EXAM_INTENSITY.into(), f64_col(|r| r.exam_phase.intensity())),
        Column::new(columns::ACADEMIC_LOAD_INDEX.into(), f64_col(|r| r.academic_load_index)),
        Column::new(columns::WEATHER_CONDITION.into(), str_col(|r| r.weather_condition.label())),
        Column::new(
            columns::WEATHER_IMPACT_FACTOR.into(),
            f64_col(|r| r.weather_condition.impact_factor()),
        ),
        Column::new(columns::INTERUNI_EVENT.into(), i32_col(|r| flag(r.interuni_event))),
        Column::new(columns::EVENT_BOOST_FACTOR.into(), f64_col(|r| r.event_boost_factor)),
        Column::new(columns::GYM_ADOPTION_RATIO.into(), f64_col(|r| r.gym_adoption_ratio)),
        Column::new(columns::MAINTENANCE_FLAG.into(), i32_col(|r| flag(r.maintenance_flag))),
        Column::new(
            columns::MAINTENANCE_SEVERITY.into(),
            str_col(|r| r.maintenance_severity.label()),
        ),
        Column::new(
            columns::EQUIPMENT_AVAILABILITY_RATIO.into(),
            f64_col(|r| r.maintenance_severity.availability_ratio()),
        ),
        Column::new(columns::EFFECTIVE_CAPACITY.into(), i64_col(|r| r.effective_capacity)),
        Column::new(columns::BASE_DEMAND.into(), f64_col(|r| r.base_demand)),
        Column::new(columns::RAW_DEMAND.into(), f64_col(|r| r.raw_demand)),
        Column::new(columns::DAILY_GYM_FOOTFALL.into(), i64_col(|r| r.daily_gym_footfall)),
    ])?;
    Ok(df)
}

/// Write CSV to any sink.
pub fn write_csv<W: Write>(df: &mut DataFrame, sink: W) -> Result<(), PulseError> {
    CsvWriter::new(sink).include_header(true).finish(df)?;
    Ok(())
}

/// Write by extension: `.parquet` as Parquet, anything else as CSV.
pub fn write_dataset(df: &mut DataFrame, path: &Path) -> Result<(), PulseError> {
    let file = File::create(path)?;
    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        ParquetWriter::new(file).finish(df)?;
    } else {
        let mut writer = BufWriter::new(file);
        write_csv(df, &mut writer)?;
        writer.flush()?;
    }
    info!(path = %path.display(), rows = df.height(), "dataset written");
    Ok(())
}

/// Read a dataset written by [`write_dataset`].
pub fn read_dataset(path: &Path) -> Result<DataFrame, PulseError> {
    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    let df = if is_parquet {
        ParquetReader::new(File::open(path)?).finish()?
    } else {
        CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|opts| opts.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?
    };
    Ok(df)
}
