use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryRecord {
    #[schema(example = "EMP001")]
    pub employee_id: String,

    #[schema(example = "张三")]
    pub employee_name: String,

    /// `YYYYMM`
    #[schema(example = "202401")]
    pub month: String,

    #[schema(example = 8000.0)]
    pub salary_amount: f64,
}

impl SalaryRecord {
    /// True when the record's month falls inside `year` (prefix match on `YYYYMM`).
    pub fn in_year(&self, year: &str) -> bool {
        self.month.starts_with(year)
    }
}
