use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's employer contribution for a city and year.
///
/// Keyed by `(employee_name, city_name, year)`; a recalculation replaces the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CalculationResult {
    #[schema(example = "张三")]
    pub employee_name: String,

    #[schema(example = "佛山")]
    pub city_name: String,

    #[schema(example = "2024")]
    pub year: String,

    #[schema(example = 8500.0)]
    pub avg_salary: f64,

    #[schema(example = 8500.0)]
    pub contribution_base: f64,

    #[schema(example = 1275.0)]
    pub company_fee: f64,

    #[schema(example = "2024-07-01T08:00:00Z", format = DateTime, value_type = String)]
    pub calculated_at: DateTime<Utc>,
}

impl CalculationResult {
    /// Equality on everything except `calculated_at`.
    pub fn same_figures(&self, other: &Self) -> bool {
        self.employee_name == other.employee_name
            && self.city_name == other.city_name
            && self.year == other.year
            && self.avg_salary == other.avg_salary
            && self.contribution_base == other.contribution_base
            && self.company_fee == other.company_fee
    }
}
