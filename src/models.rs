use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::model::upload::{Cell, CityUpload, SalaryUpload};

/// Success half of the JSON envelope; failures go through `AppError`.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CalculateReq {
    #[schema(example = "佛山")]
    pub city_name: Option<String>,
    #[schema(value_type = Option<String>, example = "2024")]
    pub year: Option<Cell>,
}

#[derive(Deserialize, ToSchema)]
pub struct CitiesUploadReq {
    pub cities: Option<Vec<CityUpload>>,
}

#[derive(Deserialize, ToSchema)]
pub struct SalariesUploadReq {
    pub salaries: Option<Vec<SalaryUpload>>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadSummary {
    #[schema(example = 12)]
    pub count: usize,
}

/// Query string for the result list and export endpoints.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ResultQuery {
    /// Comma-separated city names
    #[schema(example = "佛山,广州")]
    pub cities: Option<String>,
    /// Comma-separated years
    #[schema(example = "2024")]
    pub years: Option<String>,
    /// Substring of the employee name
    #[schema(example = "张")]
    pub employee_name: Option<String>,
    /// Column to sort by (default `calculated_at`)
    #[schema(example = "company_fee")]
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default `desc`)
    #[schema(example = "desc")]
    pub order: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

/// Splits a comma-separated query value, dropping blanks.
pub fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
