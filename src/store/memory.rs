use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{ContributionStore, ResultFilter, StoreError, StoreResult, TableCounts};
use crate::model::{
    calculation_result::CalculationResult, city_rule::CityRule, salary::SalaryRecord,
};

#[derive(Default)]
struct Tables {
    /// (city_name, year)
    cities: BTreeMap<(String, String), CityRule>,
    /// (employee_id, month)
    salaries: BTreeMap<(String, String), SalaryRecord>,
    /// (employee_name, city_name, year)
    results: BTreeMap<(String, String, String), CalculationResult>,
}

/// Process-local store with the same keying rules as the MySQL schema.
///
/// Used when `STORE_BACKEND=memory` and by the handler tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl ContributionStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch_city_rule(&self, city_name: &str, year: &str) -> StoreResult<Option<CityRule>> {
        let tables = self.read()?;
        Ok(tables
            .cities
            .get(&(city_name.to_string(), year.to_string()))
            .cloned())
    }

    async fn fetch_salaries(&self, year: &str) -> StoreResult<Vec<SalaryRecord>> {
        let tables = self.read()?;
        let mut records: Vec<SalaryRecord> = tables
            .salaries
            .values()
            .filter(|s| s.in_year(year))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));
        Ok(records)
    }

    async fn upsert_result(&self, result: &CalculationResult) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.results.insert(
            (
                result.employee_name.clone(),
                result.city_name.clone(),
                result.year.clone(),
            ),
            result.clone(),
        );
        Ok(())
    }

    async fn list_city_rules(&self) -> StoreResult<Vec<CityRule>> {
        Ok(self.read()?.cities.values().cloned().collect())
    }

    async fn upsert_city_rules(&self, rules: &[CityRule]) -> StoreResult<()> {
        let mut tables = self.write()?;
        for rule in rules {
            tables
                .cities
                .insert((rule.city_name.clone(), rule.year.clone()), rule.clone());
        }
        Ok(())
    }

    async fn upsert_salaries(&self, records: &[SalaryRecord]) -> StoreResult<()> {
        let mut tables = self.write()?;
        for record in records {
            tables.salaries.insert(
                (record.employee_id.clone(), record.month.clone()),
                record.clone(),
            );
        }
        Ok(())
    }

    async fn salary_years(&self) -> StoreResult<Vec<String>> {
        let tables = self.read()?;
        let years: BTreeSet<String> = tables
            .salaries
            .values()
            .filter_map(|s| s.month.get(..4).map(str::to_string))
            .collect();
        Ok(years.into_iter().rev().collect())
    }

    async fn list_results(&self, filter: &ResultFilter) -> StoreResult<Vec<CalculationResult>> {
        let tables = self.read()?;
        let mut results: Vec<CalculationResult> = tables
            .results
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        // stable sort keeps key order among rows written in the same pass
        results.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
        Ok(results)
    }

    async fn result_cities(&self) -> StoreResult<Vec<String>> {
        let tables = self.read()?;
        let cities: BTreeSet<String> = tables.results.values().map(|r| r.city_name.clone()).collect();
        Ok(cities.into_iter().collect())
    }

    async fn result_years(&self) -> StoreResult<Vec<String>> {
        let tables = self.read()?;
        let years: BTreeSet<String> = tables.results.values().map(|r| r.year.clone()).collect();
        Ok(years.into_iter().rev().collect())
    }

    async fn table_counts(&self) -> StoreResult<TableCounts> {
        let tables = self.read()?;
        Ok(TableCounts {
            cities: tables.cities.len() as i64,
            salaries: tables.salaries.len() as i64,
            results: tables.results.len() as i64,
        })
    }
}
