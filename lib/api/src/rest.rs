use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use sheetscan_core::{
    DiagnosticsLevel, Error, ErrorKind, QueryMaterial, ScanConfig, Scanner, SearchOptions, SheetSource,
};
use std::sync::Arc;
use tracing::{error, warn};

/// Shared state handed to every worker
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SheetSource>,
    pub config: Arc<ScanConfig>,
}

impl AppState {
    pub fn new(source: Arc<dyn SheetSource>, config: ScanConfig) -> Self {
        Self {
            source,
            config: Arc::new(config),
        }
    }
}

/// Search parameters, from the query string or a JSON body
#[derive(Debug, Default, Deserialize)]
struct SearchRequest {
    #[serde(alias = "spreadsheet_id")]
    id: Option<String>,
    query: Option<String>,
    query_cpf: Option<String>,
    query_nome: Option<String>,
    cap: Option<usize>,
    debug: Option<u8>,
    records: Option<bool>,
}

impl SearchRequest {
    fn split(self) -> (String, QueryMaterial, SearchOptions) {
        let material = QueryMaterial {
            query: self.query,
            query_cpf: self.query_cpf,
            query_nome: self.query_nome,
        };
        let options = SearchOptions {
            match_cap: self.cap,
            diagnostics: DiagnosticsLevel::from_level(self.debug.unwrap_or(0)),
            records: self.records.unwrap_or(false),
        };
        (self.id.unwrap_or_default(), material, options)
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
        let data = web::Data::new(state);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .configure(|cfg| configure(cfg, data.clone()))
        })
        .bind((host, port))?
        .run()
        .await
    }
}

/// Register routes and extractor settings on an app
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(&err.to_string());
        InternalError::from_response(err, response).into()
    });
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(&err.to_string());
        InternalError::from_response(err, response).into()
    });

    cfg.app_data(state)
        .app_data(query_config)
        .app_data(json_config)
        .route("/health", web::get().to(health))
        .route("/sheets/fullscan", web::get().to(fullscan))
        .route("/sheets/search", web::post().to(search));
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

async fn fullscan(
    state: web::Data<AppState>,
    params: web::Query<SearchRequest>,
) -> ActixResult<HttpResponse> {
    run_search(&state, params.into_inner()).await
}

async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> ActixResult<HttpResponse> {
    run_search(&state, req.into_inner()).await
}

async fn run_search(state: &AppState, req: SearchRequest) -> ActixResult<HttpResponse> {
    let (spreadsheet_id, material, options) = req.split();
    let scanner = Scanner::new(state.source.as_ref(), state.config.as_ref());

    match scanner.search(&spreadsheet_id, &material, &options).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(error_response(&e)),
    }
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": message,
        "kind": ErrorKind::Validation,
    }))
}

fn error_response(err: &Error) -> HttpResponse {
    match err.kind() {
        ErrorKind::Validation => bad_request(&err.to_string()),
        ErrorKind::NotFound => {
            warn!(error = %err, "spreadsheet not found");
            HttpResponse::NotFound().json(serde_json::json!({
                "error": err.to_string(),
                "kind": ErrorKind::NotFound,
            }))
        }
        ErrorKind::Internal => {
            error!(error = %err, "search failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to scan spreadsheet",
                "kind": ErrorKind::Internal,
                "message": err.to_string(),
            }))
        }
    }
}
