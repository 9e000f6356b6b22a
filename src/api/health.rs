use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::{
    error::ErrorBody,
    models::ApiResponse,
    store::{ContributionStore, TableCounts},
};

#[derive(Serialize, ToSchema)]
pub struct HealthReport {
    #[schema(example = "mysql")]
    pub backend: &'static str,
    #[schema(example = "ok")]
    pub status: &'static str,
    pub tables: TableCounts,
}

/// Store reachability and row counts
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Store reachable", body = HealthReport),
        (status = 503, description = "Store unreachable", body = ErrorBody)
    ),
    tag = "Health"
)]
pub async fn health(store: web::Data<dyn ContributionStore>) -> HttpResponse {
    match store.table_counts().await {
        Ok(tables) => HttpResponse::Ok().json(ApiResponse::ok(HealthReport {
            backend: store.backend(),
            status: "ok",
            tables,
        })),
        Err(e) => {
            warn!(error = %e, backend = store.backend(), "Health check failed");
            HttpResponse::ServiceUnavailable().json(ErrorBody {
                success: false,
                error: format!("{} store unreachable", store.backend()),
                details: Vec::new(),
            })
        }
    }
}
