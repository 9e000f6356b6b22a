use actix_web::HttpResponse;

use crate::{
    error::AppError,
    utils::spreadsheet::{cities_template, salaries_template},
};

use super::csv_attachment;

fn template_error(e: anyhow::Error) -> AppError {
    AppError::Unexpected(format!("Failed to build template: {:#}", e))
}

/// Download the city-rule CSV template
#[utoipa::path(
    get,
    path = "/api/templates/cities",
    responses((status = 200, description = "CSV with the expected headers and one example row", content_type = "text/csv", body = String)),
    tag = "Templates"
)]
pub async fn cities_csv() -> Result<HttpResponse, AppError> {
    let csv = cities_template().map_err(template_error)?;
    Ok(csv_attachment("cities_template.csv", csv))
}

/// Download the salary CSV template
#[utoipa::path(
    get,
    path = "/api/templates/salaries",
    responses((status = 200, description = "CSV with the expected headers and example rows", content_type = "text/csv", body = String)),
    tag = "Templates"
)]
pub async fn salaries_csv() -> Result<HttpResponse, AppError> {
    let csv = salaries_template().map_err(template_error)?;
    Ok(csv_attachment("salaries_template.csv", csv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test, web};

    #[actix_web::test]
    async fn serves_salary_template() {
        let app = test::init_service(
            App::new().route("/templates/salaries", web::get().to(salaries_csv)),
        )
        .await;
        let req = test::TestRequest::get().uri("/templates/salaries").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/csv; charset=utf-8"
        );
        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("员工工号,员工姓名,年月,工资金额"));
        assert_eq!(text.lines().count(), 4);
    }
}
