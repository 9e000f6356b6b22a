use actix_web::{HttpResponse, web};
use tracing::{info, warn};

use crate::{
    error::AppError,
    model::upload::{CityUpload, SalaryUpload},
    models::{ApiResponse, CitiesUploadReq, SalariesUploadReq, UploadSummary},
    store::ContributionStore,
    utils::{
        spreadsheet::{parse_cities_csv, parse_salaries_csv},
        validation::{validate_city_rows, validate_salary_rows},
    },
};

/// Validates the whole batch, then upserts it; nothing is written on any error.
async fn store_cities(
    store: &dyn ContributionStore,
    rows: &[CityUpload],
) -> Result<HttpResponse, AppError> {
    if rows.is_empty() {
        return Err(AppError::InputMissing("No city rows to upload".to_string()));
    }

    let rules = validate_city_rows(rows).map_err(|errors| {
        warn!(problems = errors.len(), "City upload rejected");
        AppError::ValidationFailed(errors)
    })?;

    store.upsert_city_rules(&rules).await?;
    info!(rows = rules.len(), "City rules uploaded");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        UploadSummary { count: rules.len() },
        format!("Uploaded {} city rule(s)", rules.len()),
    )))
}

async fn store_salaries(
    store: &dyn ContributionStore,
    rows: &[SalaryUpload],
) -> Result<HttpResponse, AppError> {
    if rows.is_empty() {
        return Err(AppError::InputMissing("No salary rows to upload".to_string()));
    }

    let records = validate_salary_rows(rows).map_err(|errors| {
        warn!(problems = errors.len(), "Salary upload rejected");
        AppError::ValidationFailed(errors)
    })?;

    store.upsert_salaries(&records).await?;
    info!(rows = records.len(), "Salaries uploaded");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        UploadSummary {
            count: records.len(),
        },
        format!("Uploaded {} salary row(s)", records.len()),
    )))
}

fn bad_csv(e: anyhow::Error) -> AppError {
    AppError::InputMissing(format!("Unreadable CSV: {:#}", e))
}

/// Upload city rules as JSON rows
#[utoipa::path(
    post,
    path = "/api/upload/cities",
    request_body = CitiesUploadReq,
    responses(
        (status = 200, description = "All rows stored", body = UploadSummary),
        (status = 400, description = "Missing rows or per-row validation messages", body = crate::error::ErrorBody),
        (status = 500, description = "Store failure", body = crate::error::ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_cities(
    store: web::Data<dyn ContributionStore>,
    payload: web::Json<CitiesUploadReq>,
) -> Result<HttpResponse, AppError> {
    let rows = payload
        .cities
        .as_deref()
        .ok_or_else(|| AppError::InputMissing("cities array is required".to_string()))?;
    store_cities(store.get_ref(), rows).await
}

/// Upload city rules as a CSV sheet
#[utoipa::path(
    post,
    path = "/api/upload/cities/csv",
    request_body(content = String, content_type = "text/csv", description = "Header row 城市名,年份,基数下限,基数上限,缴纳比例 (or English names)"),
    responses(
        (status = 200, description = "All rows stored", body = UploadSummary),
        (status = 400, description = "Unreadable CSV or validation messages", body = crate::error::ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_cities_csv(
    store: web::Data<dyn ContributionStore>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let rows = parse_cities_csv(&body).map_err(bad_csv)?;
    store_cities(store.get_ref(), &rows).await
}

/// Upload salary rows as JSON
#[utoipa::path(
    post,
    path = "/api/upload/salaries",
    request_body = SalariesUploadReq,
    responses(
        (status = 200, description = "All rows stored", body = UploadSummary),
        (status = 400, description = "Missing rows or per-row validation messages", body = crate::error::ErrorBody),
        (status = 500, description = "Store failure", body = crate::error::ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_salaries(
    store: web::Data<dyn ContributionStore>,
    payload: web::Json<SalariesUploadReq>,
) -> Result<HttpResponse, AppError> {
    let rows = payload
        .salaries
        .as_deref()
        .ok_or_else(|| AppError::InputMissing("salaries array is required".to_string()))?;
    store_salaries(store.get_ref(), rows).await
}

/// Upload salary rows as a CSV sheet
#[utoipa::path(
    post,
    path = "/api/upload/salaries/csv",
    request_body(content = String, content_type = "text/csv", description = "Header row 员工工号,员工姓名,年月,工资金额 (or English names)"),
    responses(
        (status = 200, description = "All rows stored", body = UploadSummary),
        (status = 400, description = "Unreadable CSV or validation messages", body = crate::error::ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_salaries_csv(
    store: web::Data<dyn ContributionStore>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let rows = parse_salaries_csv(&body).map_err(bad_csv)?;
    store_salaries(store.get_ref(), &rows).await
}

/// List stored city rules
#[utoipa::path(
    get,
    path = "/api/cities",
    responses(
        (status = 200, description = "All city rules by city and year", body = [crate::model::city_rule::CityRule])
    ),
    tag = "Upload"
)]
pub async fn list_cities(
    store: web::Data<dyn ContributionStore>,
) -> Result<HttpResponse, AppError> {
    let rules = store.list_city_rules().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rules)))
}

/// Years present in uploaded salaries
#[utoipa::path(
    get,
    path = "/api/years",
    responses(
        (status = 200, description = "Distinct salary years, newest first", body = [String])
    ),
    tag = "Upload"
)]
pub async fn salary_years(
    store: web::Data<dyn ContributionStore>,
) -> Result<HttpResponse, AppError> {
    let years = store.salary_years().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(years)))
}
