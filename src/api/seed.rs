use actix_web::{HttpResponse, web};

use crate::{
    error::AppError,
    models::ApiResponse,
    seed::seed_sample_data,
    store::ContributionStore,
};

/// Load demo rules and salaries, then calculate 佛山 2024
#[utoipa::path(
    post,
    path = "/api/init-data",
    responses(
        (status = 200, description = "Sample data stored and calculated", body = crate::seed::SeedSummary),
        (status = 500, description = "Store failure", body = crate::error::ErrorBody)
    ),
    tag = "Health"
)]
pub async fn init_data(
    store: web::Data<dyn ContributionStore>,
) -> Result<HttpResponse, AppError> {
    let summary = seed_sample_data(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        summary,
        "Sample data initialised",
    )))
}
