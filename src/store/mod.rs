//! Storage boundary for rules, salaries and results.
//!
//! Handlers and the calculator only ever see `dyn ContributionStore`; the
//! concrete backend is picked once at startup and injected as app data.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::{
    calculation_result::CalculationResult, city_rule::CityRule, salary::SalaryRecord,
};

pub mod memory;
pub mod mysql;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("In-memory store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filters applied when reading stored results.
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub cities: Vec<String>,
    pub years: Vec<String>,
    /// Case-insensitive substring match.
    pub employee_name: Option<String>,
}

impl ResultFilter {
    pub fn matches(&self, result: &CalculationResult) -> bool {
        let city_ok = self.cities.is_empty() || self.cities.contains(&result.city_name);
        let year_ok = self.years.is_empty() || self.years.contains(&result.year);
        let name_ok = match &self.employee_name {
            Some(needle) => result
                .employee_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        };
        city_ok && year_ok && name_ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct TableCounts {
    pub cities: i64,
    pub salaries: i64,
    pub results: i64,
}

#[async_trait]
pub trait ContributionStore: Send + Sync {
    /// Short backend label for health output.
    fn backend(&self) -> &'static str;

    async fn fetch_city_rule(&self, city_name: &str, year: &str) -> StoreResult<Option<CityRule>>;

    /// Salaries whose month falls in `year`, ordered by employee name.
    async fn fetch_salaries(&self, year: &str) -> StoreResult<Vec<SalaryRecord>>;

    /// Insert or replace by `(employee_name, city_name, year)`.
    async fn upsert_result(&self, result: &CalculationResult) -> StoreResult<()>;

    /// All rules ordered by city name, then year.
    async fn list_city_rules(&self) -> StoreResult<Vec<CityRule>>;

    /// Insert or replace by `(city_name, year)`.
    async fn upsert_city_rules(&self, rules: &[CityRule]) -> StoreResult<()>;

    /// Insert or replace by `(employee_id, month)`.
    async fn upsert_salaries(&self, records: &[SalaryRecord]) -> StoreResult<()>;

    /// Distinct years present in salary months, newest first.
    async fn salary_years(&self) -> StoreResult<Vec<String>>;

    /// Matching results, most recently calculated first.
    async fn list_results(&self, filter: &ResultFilter) -> StoreResult<Vec<CalculationResult>>;

    /// Distinct cities with results, ascending.
    async fn result_cities(&self) -> StoreResult<Vec<String>>;

    /// Distinct years with results, newest first.
    async fn result_years(&self) -> StoreResult<Vec<String>>;

    async fn table_counts(&self) -> StoreResult<TableCounts>;
}
