use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A spreadsheet cell as it arrives from JSON or CSV: either a number or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text view of the cell. Whole numbers render without a fractional part,
    /// so a numeric `2024` reads back as `"2024"`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Wraps raw CSV text. Blank cells count as missing; text is kept verbatim
    /// so identifiers like `007` keep their leading zeros.
    pub fn from_raw(raw: &str) -> Option<Cell> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Cell::Text(trimmed.to_string()))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// One uploaded city-rule row, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CityUpload {
    #[schema(value_type = Option<String>, example = "佛山")]
    pub city_name: Option<Cell>,
    #[schema(value_type = Option<String>, example = "2024")]
    pub year: Option<Cell>,
    #[schema(value_type = Option<f64>, example = 5284)]
    pub base_min: Option<Cell>,
    #[schema(value_type = Option<f64>, example = 26421)]
    pub base_max: Option<Cell>,
    #[schema(value_type = Option<f64>, example = 0.15)]
    pub rate: Option<Cell>,
}

/// One uploaded salary row, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SalaryUpload {
    #[schema(value_type = Option<String>, example = "EMP001")]
    pub employee_id: Option<Cell>,
    #[schema(value_type = Option<String>, example = "张三")]
    pub employee_name: Option<Cell>,
    #[schema(value_type = Option<String>, example = "202401")]
    pub month: Option<Cell>,
    #[schema(value_type = Option<f64>, example = 8000)]
    pub salary_amount: Option<Cell>,
}
