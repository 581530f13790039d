//! OAI-PMH routes.
//!
//! - `GET /oai` and `POST /oai` (form encoded): protocol requests, always
//!   answered with an XML envelope unless the store fails.
//! - `POST /oai/sets`: create a set from a JSON descriptor.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Form, Query, State};
use axum::http::header::{CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use oaipmh_core::error::Error;
use oaipmh_core::traits::Repository;
use oaipmh_core::types::{BaseUrl, SetDescriptor};
use oaipmh_core::{OaiProvider, OaiRequest, ProviderConfig, RequestContext, xml};

use crate::error::ApiError;

/// Path of the protocol endpoint.
pub const OAI_PATH: &str = "/oai";

/// Path of the set creation endpoint.
pub const SETS_PATH: &str = "/oai/sets";

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Build the provider router.
pub fn router<R: Repository + 'static>(provider: Arc<OaiProvider<R>>) -> Router {
    Router::new()
        .route(OAI_PATH, get(oai_get::<R>).post(oai_post::<R>))
        .route(SETS_PATH, post(create_set::<R>))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
        .with_state(provider)
}

/// Derive identifier base and endpoint URL for one request.
///
/// A configured public base URL wins; otherwise the `Host` header (and
/// `X-Forwarded-Proto`, if present) decide.
pub fn request_context(
    config: &ProviderConfig,
    headers: &HeaderMap,
) -> Result<RequestContext, Error> {
    let base = match &config.public_base_url {
        Some(url) => BaseUrl::new(url)?,
        None => {
            let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
            let host = header(HOST.as_str()).unwrap_or("localhost");
            let scheme = header("x-forwarded-proto").unwrap_or("http");
            BaseUrl::from_host(scheme, host, &config.resource_path_prefix)?
        }
    };
    let endpoint = base.on_origin(OAI_PATH);
    Ok(RequestContext::new(base, endpoint))
}

async fn respond<R: Repository>(
    provider: &OaiProvider<R>,
    headers: &HeaderMap,
    pairs: Vec<(String, String)>,
) -> Result<Response, ApiError> {
    let ctx = request_context(provider.config(), headers)?;
    let response = match OaiRequest::from_pairs(pairs) {
        Ok(request) => provider.handle(request, &ctx).await?,
        Err(e) => provider.reject(e, &ctx),
    };

    Ok(([(CONTENT_TYPE, XML_CONTENT_TYPE)], xml::render(&response)).into_response())
}

async fn oai_get<R: Repository + 'static>(
    State(provider): State<Arc<OaiProvider<R>>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    respond(&provider, &headers, pairs).await
}

async fn oai_post<R: Repository + 'static>(
    State(provider): State<Arc<OaiProvider<R>>>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    respond(&provider, &headers, pairs).await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSet {
    location: String,
    set_spec: String,
}

async fn create_set<R: Repository + 'static>(
    State(provider): State<Arc<OaiProvider<R>>>,
    headers: HeaderMap,
    Json(descriptor): Json<SetDescriptor>,
) -> Result<Response, ApiError> {
    let ctx = request_context(provider.config(), &headers)?;
    let path = provider.create_set(&descriptor).await?;
    let location = ctx.base.path_to_uri(&path);

    let body = CreatedSet {
        location: location.clone(),
        set_spec: descriptor.set_spec.trim().to_string(),
    };
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(body)).into_response())
}
