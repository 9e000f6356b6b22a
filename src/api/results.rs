use std::cmp::Ordering;
use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    model::calculation_result::CalculationResult,
    models::{ApiResponse, ResultQuery, split_list},
    store::{ContributionStore, ResultFilter},
    utils::spreadsheet::export_results_csv,
};

use super::csv_attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    EmployeeName,
    CityName,
    Year,
    AvgSalary,
    ContributionBase,
    CompanyFee,
    CalculatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Serialize, ToSchema)]
pub struct ResultPage {
    pub data: Vec<CalculationResult>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: usize,
}

impl SortField {
    fn compare(self, a: &CalculationResult, b: &CalculationResult) -> Ordering {
        match self {
            SortField::EmployeeName => a.employee_name.cmp(&b.employee_name),
            SortField::CityName => a.city_name.cmp(&b.city_name),
            SortField::Year => a.year.cmp(&b.year),
            SortField::AvgSalary => a.avg_salary.total_cmp(&b.avg_salary),
            SortField::ContributionBase => a.contribution_base.total_cmp(&b.contribution_base),
            SortField::CompanyFee => a.company_fee.total_cmp(&b.company_fee),
            SortField::CalculatedAt => a.calculated_at.cmp(&b.calculated_at),
        }
    }
}

fn parse_sort(query: &ResultQuery) -> Result<(SortField, SortOrder), AppError> {
    let field = match query.sort_by.as_deref() {
        None | Some("") => SortField::CalculatedAt,
        Some(raw) => SortField::from_str(raw).map_err(|_| {
            let allowed: Vec<&'static str> = SortField::iter().map(<&'static str>::from).collect();
            AppError::InputMissing(format!(
                "Unknown sort_by {:?}; expected one of {}",
                raw,
                allowed.join(", ")
            ))
        })?,
    };
    let order = match query.order.as_deref() {
        None | Some("") => SortOrder::Desc,
        Some(raw) => SortOrder::from_str(raw).map_err(|_| {
            AppError::InputMissing(format!("Unknown order {:?}; expected asc or desc", raw))
        })?,
    };
    Ok((field, order))
}

fn filter_of(query: &ResultQuery) -> ResultFilter {
    ResultFilter {
        cities: split_list(&query.cities),
        years: split_list(&query.years),
        employee_name: query
            .employee_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

pub fn sort_results(results: &mut [CalculationResult], field: SortField, order: SortOrder) {
    results.sort_by(|a, b| match order {
        SortOrder::Asc => field.compare(a, b),
        SortOrder::Desc => field.compare(b, a),
    });
}

/// Sorts and pages already-filtered results.
pub fn apply_query(
    mut results: Vec<CalculationResult>,
    field: SortField,
    order: SortOrder,
    page: Option<u32>,
    per_page: Option<u32>,
) -> ResultPage {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page as usize - 1) * per_page as usize;

    sort_results(&mut results, field, order);

    let total = results.len();
    let data = results
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    ResultPage {
        data,
        page,
        per_page,
        total,
    }
}

/// List calculation results
#[utoipa::path(
    get,
    path = "/api/results",
    params(ResultQuery),
    responses(
        (status = 200, description = "Filtered, sorted and paginated results", body = ResultPage),
        (status = 400, description = "Unknown sort field or order", body = crate::error::ErrorBody)
    ),
    tag = "Results"
)]
pub async fn list_results(
    store: web::Data<dyn ContributionStore>,
    query: web::Query<ResultQuery>,
) -> Result<HttpResponse, AppError> {
    let (field, order) = parse_sort(&query)?;
    let filter = filter_of(&query);
    debug!(filter = ?filter, sort = field.as_ref(), order = ?order, "Listing results");

    let results = store.list_results(&filter).await?;
    let page = apply_query(results, field, order, query.page, query.per_page);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// Export filtered results as CSV
#[utoipa::path(
    get,
    path = "/api/results/export",
    params(ResultQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 404, description = "Nothing to export", body = crate::error::ErrorBody)
    ),
    tag = "Results"
)]
pub async fn export_results(
    store: web::Data<dyn ContributionStore>,
    query: web::Query<ResultQuery>,
) -> Result<HttpResponse, AppError> {
    let (field, order) = parse_sort(&query)?;
    let mut results = store.list_results(&filter_of(&query)).await?;
    if results.is_empty() {
        return Err(AppError::NotFound("No results to export".to_string()));
    }
    sort_results(&mut results, field, order);

    let csv = export_results_csv(&results).map_err(|e| AppError::Unexpected(format!("{:#}", e)))?;
    let filename = format!("contribution_results_{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok(csv_attachment(&filename, csv))
}

/// Cities that have results
#[utoipa::path(
    get,
    path = "/api/results/cities",
    responses((status = 200, description = "Distinct cities, ascending", body = [String])),
    tag = "Results"
)]
pub async fn result_cities(
    store: web::Data<dyn ContributionStore>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(store.result_cities().await?)))
}

/// Years that have results
#[utoipa::path(
    get,
    path = "/api/results/years",
    responses((status = 200, description = "Distinct years, newest first", body = [String])),
    tag = "Results"
)]
pub async fn result_years(
    store: web::Data<dyn ContributionStore>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(store.result_years().await?)))
}
