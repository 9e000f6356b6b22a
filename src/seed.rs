use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::calculator::{CalculationSummary, calculate_and_store};
use crate::error::AppError;
use crate::model::{city_rule::CityRule, salary::SalaryRecord};
use crate::store::ContributionStore;

const SAMPLE_CITIES: [(&str, f64, f64, f64); 3] = [
    ("佛山", 5284.0, 26421.0, 0.15),
    ("广州", 5500.0, 28074.0, 0.155),
    ("深圳", 5284.0, 26421.0, 0.15),
];

const SAMPLE_SALARIES: [(&str, &str, &[f64]); 3] = [
    ("EMP001", "张三", &[8000.0, 8000.0, 8500.0, 8500.0, 9000.0, 9000.0]),
    ("EMP002", "李四", &[15000.0, 15000.0, 16000.0, 16000.0]),
    ("EMP003", "王五", &[5000.0, 5000.0, 5000.0]),
];

const SAMPLE_YEAR: &str = "2024";
const SAMPLE_CITY: &str = "佛山";

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedSummary {
    #[schema(example = 3)]
    pub cities: usize,
    #[schema(example = 13)]
    pub salaries: usize,
    pub calculation: CalculationSummary,
}

pub fn sample_city_rules() -> Vec<CityRule> {
    SAMPLE_CITIES
        .iter()
        .map(|(city, min, max, rate)| CityRule {
            city_name: city.to_string(),
            year: SAMPLE_YEAR.to_string(),
            base_min: *min,
            base_max: *max,
            rate: *rate,
        })
        .collect()
}

/// Monthly rows from January onwards for each sample employee.
pub fn sample_salaries() -> Vec<SalaryRecord> {
    SAMPLE_SALARIES
        .iter()
        .flat_map(|(id, name, amounts)| {
            amounts.iter().enumerate().map(move |(i, amount)| SalaryRecord {
                employee_id: id.to_string(),
                employee_name: name.to_string(),
                month: format!("{}{:02}", SAMPLE_YEAR, i + 1),
                salary_amount: *amount,
            })
        })
        .collect()
}

/// Upserts the demo rules and salaries, then calculates 佛山 2024.
pub async fn seed_sample_data(store: &dyn ContributionStore) -> Result<SeedSummary, AppError> {
    let cities = sample_city_rules();
    let salaries = sample_salaries();

    store.upsert_city_rules(&cities).await?;
    store.upsert_salaries(&salaries).await?;
    info!(cities = cities.len(), salaries = salaries.len(), "Sample data seeded");

    let calculation = calculate_and_store(store, SAMPLE_CITY, SAMPLE_YEAR).await?;

    Ok(SeedSummary {
        cities: cities.len(),
        salaries: salaries.len(),
        calculation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ResultFilter, memory::MemoryStore};

    #[test]
    fn sample_salaries_cover_three_employees() {
        let salaries = sample_salaries();
        assert_eq!(salaries.len(), 13);
        assert_eq!(salaries[5].month, "202406");
        assert_eq!(salaries[12].employee_id, "EMP003");
    }

    #[actix_web::test]
    async fn seeding_calculates_foshan() {
        let store = MemoryStore::new();
        let summary = seed_sample_data(&store).await.unwrap();
        assert_eq!(summary.cities, 3);
        assert_eq!(summary.calculation.count, 3);

        let results = store.list_results(&ResultFilter::default()).await.unwrap();
        let wang = results.iter().find(|r| r.employee_name == "王五").unwrap();
        assert_eq!(wang.contribution_base, 5284.0);
        assert_eq!(wang.company_fee, 792.6);
        let li = results.iter().find(|r| r.employee_name == "李四").unwrap();
        assert_eq!(li.avg_salary, 15500.0);
        assert_eq!(li.company_fee, 2325.0);

        // seeding twice keeps the same rows
        seed_sample_data(&store).await.unwrap();
        assert_eq!(store.table_counts().await.unwrap().salaries, 13);
        assert_eq!(store.table_counts().await.unwrap().results, 3);
    }
}
