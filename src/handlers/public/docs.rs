use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;

use crate::api::openapi::{openapi_document, TITLE};
use crate::app::AppState;
use crate::error::ApiError;

const YAML_CONTENT_TYPE: &str = "application/vnd.oai.openapi; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
pub struct OpenApiQuery {
    pub format: Option<String>,
}

/// GET /openapi/ - OpenAPI document, YAML unless JSON is asked for
pub async fn openapi_get(
    State(state): State<AppState>,
    Query(query): Query<OpenApiQuery>,
    headers: HeaderMap,
) -> Response {
    let document = openapi_document(&state.config.api);

    if wants_json(query.format.as_deref(), &headers) {
        return Json(document).into_response();
    }

    match serde_yaml::to_string(&document) {
        Ok(yaml) => ([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], yaml).into_response(),
        Err(e) => {
            tracing::error!("Failed to render OpenAPI YAML: {}", e);
            ApiError::internal_server_error("Failed to render API schema").into_response()
        }
    }
}

fn wants_json(format: Option<&str>, headers: &HeaderMap) -> bool {
    match format {
        Some(format) => format.eq_ignore_ascii_case("json") || format.eq_ignore_ascii_case("openapi-json"),
        None => headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|accept| accept.contains("json"))
            .unwrap_or(false),
    }
}

/// GET /docs/ - Swagger UI pointed at /openapi/
pub async fn swagger_ui_get() -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      const ui = SwaggerUIBundle({{
        url: "/openapi/?format=json",
        dom_id: "#swagger-ui",
        presets: [
          SwaggerUIBundle.presets.apis,
          SwaggerUIBundle.SwaggerUIStandalonePreset
        ],
        layout: "BaseLayout"
      }})
    </script>
  </body>
</html>
"##,
        title = TITLE
    ))
}
