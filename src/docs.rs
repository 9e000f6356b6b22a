use crate::api::health::HealthReport;
use crate::api::results::ResultPage;
use crate::calculator::CalculationSummary;
use crate::error::ErrorBody;
use crate::model::{
    calculation_result::CalculationResult,
    city_rule::CityRule,
    salary::SalaryRecord,
    upload::{CityUpload, SalaryUpload},
};
use crate::models::{CalculateReq, CitiesUploadReq, ResultQuery, SalariesUploadReq, UploadSummary};
use crate::seed::SeedSummary;
use crate::store::TableCounts;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social Insurance Contribution API",
        version = "0.1.0",
        description = r#"
## Employer social-insurance contributions

Upload per-city contribution rules and monthly employee salaries, run a
calculation for one city and year, then browse or export the results.

### How a contribution is computed
1. Salaries in the chosen year are averaged per employee (rounded to cents).
2. The average is clamped into the city's `[base_min, base_max]` band.
3. The clamped base is multiplied by the city's rate (rounded to cents).

Re-running a calculation replaces the earlier rows for the same
employee, city and year.

### Uploads
- JSON rows or CSV sheets with Chinese or English headers
- Every row is validated first; one bad row rejects the whole batch and
  the response lists a message per offending row

### Response Format
- `{"success": true, "data": ...}` on success
- `{"success": false, "error": "...", "details": [...]}` on failure
"#,
    ),
    paths(
        crate::api::calculate::calculate,

        crate::api::upload::upload_cities,
        crate::api::upload::upload_cities_csv,
        crate::api::upload::upload_salaries,
        crate::api::upload::upload_salaries_csv,
        crate::api::upload::list_cities,
        crate::api::upload::salary_years,

        crate::api::results::list_results,
        crate::api::results::export_results,
        crate::api::results::result_cities,
        crate::api::results::result_years,

        crate::api::templates::cities_csv,
        crate::api::templates::salaries_csv,

        crate::api::health::health,
        crate::api::seed::init_data
    ),
    components(
        schemas(
            CalculateReq,
            CalculationSummary,
            CitiesUploadReq,
            SalariesUploadReq,
            CityUpload,
            SalaryUpload,
            UploadSummary,
            CityRule,
            SalaryRecord,
            CalculationResult,
            ResultQuery,
            ResultPage,
            HealthReport,
            TableCounts,
            SeedSummary,
            ErrorBody
        )
    ),
    tags(
        (name = "Calculation", description = "Contribution calculation"),
        (name = "Upload", description = "City rule and salary uploads"),
        (name = "Results", description = "Browsing and exporting results"),
        (name = "Templates", description = "CSV upload templates"),
        (name = "Health", description = "Store status and sample data"),
    )
)]
pub struct ApiDoc;
