use actix_web::{HttpResponse, web};

use crate::{
    calculator,
    error::AppError,
    model::upload::Cell,
    models::{ApiResponse, CalculateReq},
    store::ContributionStore,
};

/// Run a contribution calculation
#[utoipa::path(
    post,
    path = "/api/calculate",
    request_body = CalculateReq,
    responses(
        (status = 200, description = "Results stored for every employee with salaries that year", body = crate::calculator::CalculationSummary),
        (status = 400, description = "city_name or year missing", body = crate::error::ErrorBody),
        (status = 404, description = "No city rule or no salary data", body = crate::error::ErrorBody),
        (status = 500, description = "Store failure", body = crate::error::ErrorBody)
    ),
    tag = "Calculation"
)]
pub async fn calculate(
    store: web::Data<dyn ContributionStore>,
    payload: web::Json<CalculateReq>,
) -> Result<HttpResponse, AppError> {
    let city_name = payload
        .city_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let year = payload
        .year
        .as_ref()
        .map(Cell::as_text)
        .filter(|s| !s.is_empty());

    let (Some(city_name), Some(year)) = (city_name, year) else {
        return Err(AppError::InputMissing(
            "city_name and year are required".to_string(),
        ));
    };

    let summary = calculator::calculate_and_store(store.get_ref(), city_name, &year).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(summary)))
}
