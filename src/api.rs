#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use log::info;
use poem::error::{MethodNotAllowedError, NotFoundError};
use poem::http::StatusCode;
use poem::middleware::{NormalizePath, TrailingSlash};
use poem::web::Json;
use poem::{Endpoint, EndpointExt, IntoResponse, Request, Response, Route};
use poem_openapi::OpenApiService;
use serde_json::json;

use crate::api::hello::HelloApi;
use crate::api::items_list::ListItemsApi;
use crate::api::items_update::UpdateItemApi;
use crate::api::products_list::ListProductsApi;
use crate::api::root::RootApi;
use crate::api::version::VersionApi;
use crate::utils::config::Config;

pub mod hello;
pub mod items_list;
pub mod items_update;
pub mod products_list;
pub mod root;
pub mod version;

// From cargo.toml.
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// ***************************************************************************
//                               Application
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_app:
// ---------------------------------------------------------------------------
/** Assemble the api endpoints, the generated documentation and the fallback
 * and access log layers into the single endpoint the server runs.
 *
 * Trailing slashes are trimmed before routing, so /items/ and /items reach
 * the same endpoint.
 */
pub fn build_app(config: &Config) -> impl Endpoint {
    let endpoints = (RootApi, HelloApi, ListItemsApi, UpdateItemApi, ListProductsApi, VersionApi);
    let api_service =
        OpenApiService::new(endpoints, config.title.as_str(), SERVER_VERSION)
            .server(config.server_url());

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();
    let redoc = api_service.redoc();

    Route::new()
        .nest("/docs", ui)
        .nest("/redoc", redoc)
        .at("/openapi.json", spec)
        .at("/openapi.yaml", spec_yaml)
        .nest("/", api_service)
        .catch_error(|_: NotFoundError| async move {
            Json(json!({"detail": "Not Found"})).with_status(StatusCode::NOT_FOUND)
        })
        .catch_error(|_: MethodNotAllowedError| async move {
            Json(json!({"detail": "Method Not Allowed"})).with_status(StatusCode::METHOD_NOT_ALLOWED)
        })
        .with(NormalizePath::new(TrailingSlash::Trim))
        .around(log_access)
}

// ---------------------------------------------------------------------------
// log_access:
// ---------------------------------------------------------------------------
// One info record per request, written after the response is produced.
async fn log_access<E: Endpoint>(ep: Arc<E>, req: Request) -> poem::Result<Response> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let resp = ep.get_response(req).await;
    info!("{} {} {} {:?}", method, path, resp.status().as_u16(), start.elapsed());
    Ok(resp)
}
