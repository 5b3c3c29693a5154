use actix_cors::Cors;
use actix_web::{
    App, HttpResponse, HttpServer, ResponseError, error::InternalError, get,
    http::StatusCode, post, web,
};
use anyhow::anyhow;
use log::info;
use serde_json::json;

use crate::{
    config::ServiceConfig,
    service::{self, AnalyzeRequest, ErrorBody, PreviewRequest, ServiceError, VisualizeRequest},
};

pub const SERVICE_NAME: &str = "datashare";

pub struct AppState {
    pub default_preview_rows: i64,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: &self.detail,
        })
    }
}

#[get("/")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[post("/preview")]
async fn preview(
    state: web::Data<AppState>,
    req: web::Json<PreviewRequest>,
) -> Result<HttpResponse, ServiceError> {
    let request = req.into_inner();
    let default_rows = state.default_preview_rows;
    let outcome = web::block(move || service::preview(&request, default_rows))
        .await
        .map_err(|err| service::internal_failure("Preview", anyhow!("{err}")))??;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/visualize")]
async fn visualize(req: web::Json<VisualizeRequest>) -> Result<HttpResponse, ServiceError> {
    let request = req.into_inner();
    let outcome = web::block(move || service::visualize(&request))
        .await
        .map_err(|err| service::internal_failure("Visualization", anyhow!("{err}")))??;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/analyze")]
async fn analyze(req: web::Json<AnalyzeRequest>) -> Result<HttpResponse, ServiceError> {
    let request = req.into_inner();
    let outcome = web::block(move || service::analyze(&request))
        .await
        .map_err(|err| service::internal_failure("Analysis", anyhow!("{err}")))??;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Registers every route. Malformed bodies answer 422 with a `detail` field.
pub fn routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        let response =
            HttpResponse::UnprocessableEntity().json(ErrorBody { detail: &detail });
        InternalError::from_response(err, response).into()
    });
    cfg.app_data(json_config)
        .service(health)
        .service(preview)
        .service(visualize)
        .service(analyze);
}

fn cors(origins: &[String]) -> Cors {
    let cors = if origins.iter().any(|origin| origin == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

pub async fn serve(config: ServiceConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        default_preview_rows: config.default_preview_rows,
    });
    let origins = config.allowed_origins.clone();
    info!(
        "Starting {SERVICE_NAME} on {}:{} with {} worker(s)",
        config.host, config.port, config.workers
    );
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .app_data(state.clone())
            .configure(routes)
    })
    .workers(config.workers)
    .bind(config.bind_address())?
    .run()
    .await
}
