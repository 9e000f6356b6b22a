//! Employer contribution calculation.
//!
//! Salaries for a year are averaged per employee, the average is clamped into
//! the city's contribution-base band and the band value is multiplied by the
//! city's rate. Everything here except [`calculate_and_store`] is pure.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::{
    calculation_result::CalculationResult, city_rule::CityRule, salary::SalaryRecord,
};
use crate::store::ContributionStore;
use crate::utils::money::round2;

#[derive(Error, Debug, PartialEq)]
pub enum CalcError {
    #[error("Invalid contribution band: base_min {min} exceeds base_max {max}")]
    InvalidBand { min: f64, max: f64 },
}

/// Mean monthly salary per employee name, rounded to cents.
///
/// Records are grouped by `employee_name`, not `employee_id`. Two employees
/// sharing a name are merged into one average; such collisions are logged.
pub fn average_salaries(salaries: &[SalaryRecord]) -> BTreeMap<String, f64> {
    let mut groups: BTreeMap<&str, (f64, usize, BTreeSet<&str>)> = BTreeMap::new();

    for salary in salaries {
        let entry = groups
            .entry(salary.employee_name.as_str())
            .or_insert_with(|| (0.0, 0, BTreeSet::new()));
        entry.0 += salary.salary_amount;
        entry.1 += 1;
        entry.2.insert(salary.employee_id.as_str());
    }

    groups
        .into_iter()
        .map(|(name, (total, count, ids))| {
            if ids.len() > 1 {
                warn!(employee_name = name, employee_ids = ?ids, "Distinct employee ids share a name; averaging them together");
            }
            (name.to_string(), round2(total / count as f64))
        })
        .collect()
}

/// Clamps `avg` into `[base_min, base_max]`.
pub fn contribution_base(avg: f64, base_min: f64, base_max: f64) -> Result<f64, CalcError> {
    if !(base_min <= base_max) {
        return Err(CalcError::InvalidBand {
            min: base_min,
            max: base_max,
        });
    }
    Ok(avg.clamp(base_min, base_max))
}

pub fn company_fee(base: f64, rate: f64) -> f64 {
    round2(base * rate)
}

/// One result per distinct employee name with salaries in `rule.year`,
/// sorted by employee name.
pub fn perform_calculation(
    rule: &CityRule,
    salaries: &[SalaryRecord],
    calculated_at: DateTime<Utc>,
) -> Result<Vec<CalculationResult>, CalcError> {
    let year_salaries: Vec<SalaryRecord> = salaries
        .iter()
        .filter(|s| s.in_year(&rule.year))
        .cloned()
        .collect();

    average_salaries(&year_salaries)
        .into_iter()
        .map(|(employee_name, avg_salary)| {
            let base = contribution_base(avg_salary, rule.base_min, rule.base_max)?;
            Ok(CalculationResult {
                employee_name,
                city_name: rule.city_name.clone(),
                year: rule.year.clone(),
                avg_salary,
                contribution_base: base,
                company_fee: company_fee(base, rule.rate),
                calculated_at,
            })
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalculationSummary {
    #[schema(example = 3)]
    pub count: usize,
    #[schema(example = "佛山")]
    pub city_name: String,
    #[schema(example = "2024")]
    pub year: String,
    #[schema(example = "Calculated contributions for 3 employee(s)")]
    pub message: String,
}

/// Runs a full calculation pass for `city_name`/`year` and upserts every row.
///
/// Rows are written one at a time; a store failure part-way leaves the rows
/// already written in place.
pub async fn calculate_and_store(
    store: &dyn ContributionStore,
    city_name: &str,
    year: &str,
) -> Result<CalculationSummary, AppError> {
    let rule = store
        .fetch_city_rule(city_name, year)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No {} rule found for city {}", year, city_name)))?;

    let salaries = store.fetch_salaries(year).await?;
    if salaries.is_empty() {
        return Err(AppError::NotFound(format!("No salary data found for {}", year)));
    }

    let results = perform_calculation(&rule, &salaries, Utc::now())?;

    for result in &results {
        store.upsert_result(result).await?;
    }

    info!(city_name, year, count = results.len(), "Contribution calculation stored");

    Ok(CalculationSummary {
        count: results.len(),
        city_name: city_name.to_string(),
        year: year.to_string(),
        message: format!("Calculated contributions for {} employee(s)", results.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ResultFilter, memory::MemoryStore};

    fn salary(id: &str, name: &str, month: &str, amount: f64) -> SalaryRecord {
        SalaryRecord {
            employee_id: id.into(),
            employee_name: name.into(),
            month: month.into(),
            salary_amount: amount,
        }
    }

    fn foshan_2024() -> CityRule {
        CityRule {
            city_name: "佛山".into(),
            year: "2024".into(),
            base_min: 5284.0,
            base_max: 26421.0,
            rate: 0.15,
        }
    }

    fn zhang_san_2024() -> Vec<SalaryRecord> {
        [8000.0, 8000.0, 8500.0, 8500.0, 9000.0, 9000.0]
            .iter()
            .enumerate()
            .map(|(i, amount)| salary("EMP001", "张三", &format!("2024{:02}", i + 1), *amount))
            .collect()
    }

    #[test]
    fn averages_group_by_name_and_round() {
        let averages = average_salaries(&[
            salary("E1", "Alice", "202401", 10000.0),
            salary("E1", "Alice", "202402", 10000.0),
            salary("E1", "Alice", "202403", 5000.0),
            salary("E2", "Bob", "202401", 100.005),
        ]);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages["Alice"], 8333.33);
        assert_eq!(averages["Bob"], 100.01);
    }

    #[test]
    fn averages_merge_shared_names() {
        let averages = average_salaries(&[
            salary("E1", "Alice", "202401", 4000.0),
            salary("E9", "Alice", "202401", 6000.0),
        ]);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages["Alice"], 5000.0);
    }

    #[test]
    fn empty_salaries_average_to_nothing() {
        assert!(average_salaries(&[]).is_empty());
    }

    #[test]
    fn clamps_into_band() {
        assert_eq!(contribution_base(5000.0, 5284.0, 26421.0), Ok(5284.0));
        assert_eq!(contribution_base(30000.0, 5284.0, 26421.0), Ok(26421.0));
        assert_eq!(contribution_base(8500.0, 5284.0, 26421.0), Ok(8500.0));
        assert_eq!(contribution_base(5284.0, 5284.0, 5284.0), Ok(5284.0));
    }

    #[test]
    fn inverted_band_is_an_error() {
        assert_eq!(
            contribution_base(8000.0, 9000.0, 1000.0),
            Err(CalcError::InvalidBand {
                min: 9000.0,
                max: 1000.0
            })
        );
        assert!(contribution_base(8000.0, f64::NAN, 1000.0).is_err());
    }

    #[test]
    fn clamp_stays_within_band_over_a_sweep() {
        let (min, max) = (3000.0, 12000.0);
        for step in 0..200 {
            let avg = step as f64 * 97.3;
            let base = contribution_base(avg, min, max).unwrap();
            assert!((min..=max).contains(&base));
            if (min..=max).contains(&avg) {
                assert_eq!(base, avg);
            }
        }
    }

    #[test]
    fn fee_rounds_to_cents() {
        assert_eq!(company_fee(8500.0, 0.15), 1275.0);
        assert_eq!(company_fee(5284.0, 0.15), 792.6);
        assert_eq!(company_fee(5500.0, 0.155), 852.5);
        assert_eq!(company_fee(3333.33, 0.123), 410.0);
    }

    #[test]
    fn zhang_san_scenario() {
        let results = perform_calculation(&foshan_2024(), &zhang_san_2024(), Utc::now()).unwrap();
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.employee_name, "张三");
        assert_eq!(r.avg_salary, 8500.0);
        assert_eq!(r.contribution_base, 8500.0);
        assert_eq!(r.company_fee, 1275.0);
    }

    #[test]
    fn low_average_is_clamped_up() {
        let salaries = vec![
            salary("EMP003", "王五", "202401", 5000.0),
            salary("EMP003", "王五", "202402", 5000.0),
        ];
        let results = perform_calculation(&foshan_2024(), &salaries, Utc::now()).unwrap();
        assert_eq!(results[0].avg_salary, 5000.0);
        assert_eq!(results[0].contribution_base, 5284.0);
        assert_eq!(results[0].company_fee, 792.6);
    }

    #[test]
    fn other_years_are_ignored_and_output_is_sorted() {
        let mut salaries = zhang_san_2024();
        salaries.push(salary("EMP002", "李四", "202401", 15000.0));
        salaries.push(salary("EMP004", "Zed", "202312", 99999.0));
        salaries.push(salary("EMP005", "Amy", "202405", 20000.0));

        let results = perform_calculation(&foshan_2024(), &salaries, Utc::now()).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "张三", "李四"]);
    }

    #[test]
    fn recalculation_is_idempotent() {
        let salaries = zhang_san_2024();
        let first = perform_calculation(&foshan_2024(), &salaries, Utc::now()).unwrap();
        let second = perform_calculation(&foshan_2024(), &salaries, Utc::now()).unwrap();
        assert_eq!(first.len(), second.len());
        assert!(first.iter().zip(&second).all(|(a, b)| a.same_figures(b)));
    }

    #[actix_web::test]
    async fn stores_one_row_per_employee() {
        let store = MemoryStore::new();
        store.upsert_city_rules(&[foshan_2024()]).await.unwrap();
        let mut salaries = zhang_san_2024();
        salaries.push(salary("EMP002", "李四", "202401", 15000.0));
        store.upsert_salaries(&salaries).await.unwrap();

        let summary = calculate_and_store(&store, "佛山", "2024").await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.city_name, "佛山");

        // rerun replaces rather than duplicates
        calculate_and_store(&store, "佛山", "2024").await.unwrap();
        let stored = store.list_results(&ResultFilter::default()).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[actix_web::test]
    async fn missing_rule_is_not_found() {
        let store = MemoryStore::new();
        store.upsert_salaries(&zhang_san_2024()).await.unwrap();

        let err = calculate_and_store(&store, "杭州", "2024").await.unwrap_err();
        match err {
            AppError::NotFound(message) => {
                assert!(message.contains("杭州"));
                assert!(message.contains("2024"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.table_counts().await.unwrap().results, 0);
    }

    #[actix_web::test]
    async fn missing_salaries_is_not_found() {
        let store = MemoryStore::new();
        store.upsert_city_rules(&[foshan_2024()]).await.unwrap();

        let err = calculate_and_store(&store, "佛山", "2024").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m.contains("2024")));
    }

    #[actix_web::test]
    async fn stored_inverted_rule_fails_without_writing() {
        let store = MemoryStore::new();
        let mut rule = foshan_2024();
        rule.base_min = 30000.0;
        store.upsert_city_rules(&[rule]).await.unwrap();
        store.upsert_salaries(&zhang_san_2024()).await.unwrap();

        let err = calculate_and_store(&store, "佛山", "2024").await.unwrap_err();
        assert!(matches!(err, AppError::Unexpected(_)));
        assert_eq!(store.table_counts().await.unwrap().results, 0);
    }
}
