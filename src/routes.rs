use crate::{
    api::{calculate, health, results, seed, templates, upload},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_min = requests_per_min.max(1);
    let period_ms = (60_000 / per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(period_ms)
        .burst_size(per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let upload_limiter = build_limiter(config.rate_upload_per_min);
    let calculate_limiter = build_limiter(config.rate_calculate_per_min);
    let seed_limiter = build_limiter(config.rate_calculate_per_min);
    let default_limiter = build_limiter(config.rate_default_per_min);

    // Malformed JSON bodies get the same envelope as every other client error
    let json_config = web::JsonConfig::default()
        .limit(config.max_upload_bytes)
        .error_handler(|err, _req| AppError::InputMissing(format!("Invalid JSON body: {}", err)).into());
    let payload_config = web::PayloadConfig::new(config.max_upload_bytes);
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| AppError::InputMissing(format!("Invalid query: {}", err)).into());

    cfg.service(
        web::scope(&config.api_prefix)
            .app_data(json_config)
            .app_data(payload_config)
            .app_data(query_config)
            .wrap(default_limiter)
            .service(
                web::scope("/upload")
                    .wrap(upload_limiter)
                    // /upload/cities
                    .service(
                        web::resource("/cities").route(web::post().to(upload::upload_cities)),
                    )
                    .service(
                        web::resource("/cities/csv").route(web::post().to(upload::upload_cities_csv)),
                    )
                    // /upload/salaries
                    .service(
                        web::resource("/salaries").route(web::post().to(upload::upload_salaries)),
                    )
                    .service(
                        web::resource("/salaries/csv")
                            .route(web::post().to(upload::upload_salaries_csv)),
                    ),
            )
            .service(
                web::resource("/calculate")
                    .wrap(calculate_limiter)
                    .route(web::post().to(calculate::calculate)),
            )
            .service(
                web::resource("/init-data")
                    .wrap(seed_limiter)
                    .route(web::post().to(seed::init_data)),
            )
            .service(web::resource("/cities").route(web::get().to(upload::list_cities)))
            .service(web::resource("/years").route(web::get().to(upload::salary_years)))
            .service(
                web::scope("/results")
                    // /results
                    .service(web::resource("").route(web::get().to(results::list_results)))
                    .service(web::resource("/export").route(web::get().to(results::export_results)))
                    .service(web::resource("/cities").route(web::get().to(results::result_cities)))
                    .service(web::resource("/years").route(web::get().to(results::result_years))),
            )
            .service(
                web::scope("/templates")
                    .service(web::resource("/cities").route(web::get().to(templates::cities_csv)))
                    .service(
                        web::resource("/salaries").route(web::get().to(templates::salaries_csv)),
                    ),
            )
            .service(web::resource("/health").route(web::get().to(health::health))),
    );
}
