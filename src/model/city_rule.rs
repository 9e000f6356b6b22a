use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Contribution-base band and employer rate for one city in one year.
///
/// Identity is `(city_name, year)`; uploads replace a rule wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "city_name": "佛山",
        "year": "2024",
        "base_min": 5284.0,
        "base_max": 26421.0,
        "rate": 0.15
    })
)]
pub struct CityRule {
    #[schema(example = "佛山")]
    pub city_name: String,

    #[schema(example = "2024")]
    pub year: String,

    #[schema(example = 5284.0)]
    pub base_min: f64,

    #[schema(example = 26421.0)]
    pub base_max: f64,

    #[schema(example = 0.15)]
    pub rate: f64,
}
