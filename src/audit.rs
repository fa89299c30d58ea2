//! Invariant checks over a footfall table, generated here or read back from disk.

use chrono::{NaiveDate, Weekday};
use polars::prelude::*;
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::error::PulseError;
use crate::schema::columns;

/// Bounds and rules a table is checked against.
#[derive(Debug, Clone)]
pub struct AuditRules {
    pub vacation_months: Vec<u32>,
    pub closed_weekday: Weekday,
    pub academic_load_bounds: (f64, f64),
    pub adoption_bounds: (f64, f64),
}

impl AuditRules {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            vacation_months: config.vacation_months.clone(),
            closed_weekday: config.closed_weekday,
            academic_load_bounds: config.academic_load_bounds,
            adoption_bounds: config.adoption_bounds,
        }
    }
}

impl Default for AuditRules {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub violations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub rows: usize,
    pub checks: Vec<CheckResult>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.checks.iter().all(|c| c.violations == 0)
    }

    pub fn violations(&self, name: &str) -> Option<usize> {
        self.checks.iter().find(|c| c.name == name).map(|c| c.violations)
    }
}

pub const SUNDAY_FLAG: &str = "is_sunday_matches_day_of_week";
pub const OPEN_RULE: &str = "open_iff_not_closed_weekday_and_not_vacation";
pub const NON_NEGATIVE: &str = "footfall_non_negative";
pub const CLOSED_IS_ZERO: &str = "closed_days_have_zero_footfall";
pub const WITHIN_CAPACITY: &str = "footfall_within_capacity";
pub const ACADEMIC_LOAD_BOUNDS: &str = "academic_load_within_bounds";
pub const ADOPTION_BOUNDS: &str = "adoption_within_bounds";
pub const CONTIGUOUS_DATES: &str = "dates_contiguous";

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), PulseError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(PulseError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

fn count_rows(df: &DataFrame, predicate: Expr) -> Result<usize, PulseError> {
    Ok(df.clone().lazy().filter(predicate).collect()?.height())
}

fn outside(column: &str, (lo, hi): (f64, f64)) -> Expr {
    let c = col(column).cast(DataType::Float64);
    c.clone().lt(lit(lo)).or(c.gt(lit(hi)))
}

/// Days between consecutive rows that are not exactly one apart.
fn date_gaps(df: &DataFrame) -> Result<usize, PulseError> {
    let column = df.column(columns::DATE)?;
    let dates: Vec<Option<NaiveDate>> = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
            .collect(),
        DataType::Date => column
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|v| {
                v.and_then(|days| {
                    NaiveDate::from_ymd_opt(1970, 1, 1)?
                        .checked_add_signed(chrono::Duration::days(i64::from(days)))
                })
            })
            .collect(),
        other => {
            return Err(PulseError::Validation(format!(
                "column '{}' has unsupported dtype {other}",
                columns::DATE
            )))
        }
    };

    let unparsed = dates.iter().filter(|d| d.is_none()).count();
    let jumps = dates
        .windows(2)
        .filter(|w| match (w[0], w[1]) {
            (Some(a), Some(b)) => a.succ_opt() != Some(b),
            _ => false,
        })
        .count();
    Ok(unparsed + jumps)
}

/// Run every check; a report with violations is returned, not an error.
pub fn audit_frame(df: &DataFrame, rules: &AuditRules) -> Result<AuditReport, PulseError> {
    require_columns(
        df,
        &[
            columns::DATE,
            columns::DAY_OF_WEEK,
            columns::IS_SUNDAY,
            columns::MONTH,
            columns::IS_GYM_OPEN,
            columns::ACADEMIC_LOAD_INDEX,
            columns::GYM_ADOPTION_RATIO,
            columns::EFFECTIVE_CAPACITY,
            columns::DAILY_GYM_FOOTFALL,
        ],
    )?;

    let month = || col(columns::MONTH).cast(DataType::Int64);
    let in_vacation = rules
        .vacation_months
        .iter()
        .fold(lit(false), |acc, m| acc.or(month().eq(lit(i64::from(*m)))));
    let day_of_week = || col(columns::DAY_OF_WEEK).cast(DataType::Int64);
    let sunday = day_of_week().eq(lit(i64::from(Weekday::Sun.num_days_from_monday())));
    let flagged_sunday = col(columns::IS_SUNDAY).cast(DataType::Int64).eq(lit(1));
    let open = col(columns::IS_GYM_OPEN).cast(DataType::Int64).eq(lit(1));
    let footfall = || col(columns::DAILY_GYM_FOOTFALL).cast(DataType::Int64);
    let closed_day = i64::from(rules.closed_weekday.num_days_from_monday());
    let expected_open = day_of_week().neq(lit(closed_day)).and(in_vacation.not());

    let checks = vec![
        CheckResult {
            name: SUNDAY_FLAG,
            violations: count_rows(df, flagged_sunday.neq(sunday))?,
        },
        CheckResult {
            name: OPEN_RULE,
            violations: count_rows(df, open.clone().neq(expected_open))?,
        },
        CheckResult {
            name: NON_NEGATIVE,
            violations: count_rows(df, footfall().lt(lit(0)))?,
        },
        CheckResult {
            name: CLOSED_IS_ZERO,
            violations: count_rows(df, open.clone().not().and(footfall().neq(lit(0))))?,
        },
        CheckResult {
            name: WITHIN_CAPACITY,
            violations: count_rows(
                df,
                open.and(footfall().gt(col(columns::EFFECTIVE_CAPACITY).cast(DataType::Int64))),
            )?,
        },
        CheckResult {
            name: ACADEMIC_LOAD_BOUNDS,
            violations: count_rows(
                df,
                outside(columns::ACADEMIC_LOAD_INDEX, rules.academic_load_bounds),
            )?,
        },
        CheckResult {
            name: ADOPTION_BOUNDS,
            violations: count_rows(
                df,
                outside(columns::GYM_ADOPTION_RATIO, rules.adoption_bounds),
            )?,
        },
        CheckResult {
            name: CONTIGUOUS_DATES,
            violations: date_gaps(df)?,
        },
    ];

    let report = AuditReport {
        rows: df.height(),
        checks,
    };
    if report.is_clean() {
        info!(rows = report.rows, "dataset audit passed");
    } else {
        for c in report.checks.iter().filter(|c| c.violations > 0) {
            warn!(check = c.name, violations = c.violations, "dataset audit violation");
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{read_dataset, write_dataset, FootfallGenerator};

    fn generated() -> DataFrame {
        FootfallGenerator::new(GeneratorConfig::default())
            .unwrap()
            .generate()
            .unwrap()
    }

    #[test]
    fn generated_dataset_is_clean() {
        let report = audit_frame(&generated(), &AuditRules::default()).unwrap();
        assert_eq!(report.rows, 1827);
        assert_eq!(report.checks.len(), 8);
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn detects_tampered_rows() {
        let df = df!(
            columns::DATE => &["2024-05-13", "2024-05-14", "2024-05-16"],
            columns::DAY_OF_WEEK => &[0i64, 1, 3],
            columns::IS_SUNDAY => &[0i64, 1, 0],
            columns::MONTH => &[5i64, 5, 5],
            columns::IS_GYM_OPEN => &[1i64, 0, 0],
            columns::ACADEMIC_LOAD_INDEX => &[0.5, 1.2, 0.4],
            columns::GYM_ADOPTION_RATIO => &[0.3, 0.3, 0.1],
            columns::EFFECTIVE_CAPACITY => &[180i64, 180, 180],
            columns::DAILY_GYM_FOOTFALL => &[200i64, 12, -1]
        )
        .unwrap();
        let report = audit_frame(&df, &AuditRules::default()).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.violations(SUNDAY_FLAG), Some(1));
        assert_eq!(report.violations(OPEN_RULE), Some(1));
        assert_eq!(report.violations(NON_NEGATIVE), Some(1));
        assert_eq!(report.violations(CLOSED_IS_ZERO), Some(2));
        assert_eq!(report.violations(WITHIN_CAPACITY), Some(1));
        assert_eq!(report.violations(ACADEMIC_LOAD_BOUNDS), Some(1));
        assert_eq!(report.violations(ADOPTION_BOUNDS), Some(1));
        assert_eq!(report.violations(CONTIGUOUS_DATES), Some(1));
    }

    #[test]
    fn custom_vacation_months_audit_against_matching_rules() {
        let config = GeneratorConfig::default().with_vacation_months(vec![7, 8]);
        let df = FootfallGenerator::new(config.clone())
            .unwrap()
            .generate()
            .unwrap();

        let own = audit_frame(&df, &AuditRules::from_config(&config)).unwrap();
        assert!(own.is_clean(), "{own:?}");

        let stock = audit_frame(&df, &AuditRules::default()).unwrap();
        assert!(stock.violations(OPEN_RULE).unwrap() > 0);
    }

    #[test]
    fn closed_weekday_follows_rules() {
        let config = GeneratorConfig::default().with_closed_weekday(Weekday::Sat);
        let df = FootfallGenerator::new(config.clone())
            .unwrap()
            .generate()
            .unwrap();

        let own = audit_frame(&df, &AuditRules::from_config(&config)).unwrap();
        assert!(own.is_clean(), "{own:?}");
        assert_eq!(own.violations(SUNDAY_FLAG), Some(0));

        let rules = AuditRules {
            closed_weekday: Weekday::Sun,
            ..AuditRules::from_config(&config)
        };
        assert!(audit_frame(&df, &rules).unwrap().violations(OPEN_RULE).unwrap() > 0);
    }

    #[test]
    fn missing_column_is_an_error() {
        let df = df!(columns::DATE => &["2024-01-01"]).unwrap();
        assert!(matches!(
            audit_frame(&df, &AuditRules::default()),
            Err(PulseError::MissingColumn(_))
        ));
    }

    #[test]
    fn audits_csv_read_back_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gym_footfall_dataset.csv");
        let mut df = generated();
        write_dataset(&mut df, &path).unwrap();
        let read = read_dataset(&path).unwrap();
        let report = audit_frame(&read, &AuditRules::default()).unwrap();
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn audits_parquet_read_back_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gym_footfall_dataset.parquet");
        let mut df = generated();
        write_dataset(&mut df, &path).unwrap();
        let read = read_dataset(&path).unwrap();
        assert_eq!(read.height(), 1827);
        assert!(audit_frame(&read, &AuditRules::default()).unwrap().is_clean());
    }
}
