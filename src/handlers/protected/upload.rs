use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::app::AppState;
use crate::error::{ApiError, ErrorBody};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Envelope};
use crate::services::upload_service::{CsvUpload, CSV_CONTENT_TYPE, CSV_EXTENSION};
use crate::types::FieldErrors;
use crate::validation::{push_error, BLANK, REQUIRED};

const NO_FILENAME: &str = "No filename could be determined.";
const EMPTY_FILE: &str = "The submitted file is empty.";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const TEXT_FIELDS: [&str; 3] = ["origin", "type", "requester"];

/// Documented multipart form of /csv-files-upload/
#[derive(Debug, Deserialize, ToSchema)]
pub struct CsvFileUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub origin: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub requester: String,
}

/// Raw parts collected from the multipart body
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<FilePart>,
    origin: Option<String>,
    file_type: Option<String>,
    requester: Option<String>,
}

#[derive(Debug)]
struct FilePart {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl UploadForm {
    fn text(&self, name: &str) -> Option<&String> {
        match name {
            "origin" => self.origin.as_ref(),
            "type" => self.file_type.as_ref(),
            "requester" => self.requester.as_ref(),
            _ => None,
        }
    }

    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "origin" => self.origin = Some(value),
            "type" => self.file_type = Some(value),
            "requester" => self.requester = Some(value),
            _ => {}
        }
    }
}

/// POST /csv-files-upload/ - Normalize a CSV file and store it
///
/// Multipart fields: `file`, `origin`, `type`, `requester`. The file is
/// re-written with the configured delimiter and stored under
/// `{origin}/{type}/{requester}/{stem}_{epoch_ms}.csv`.
///
/// Expected Output (Success, 202):
/// ```json
/// { "success": true, "data": "'payments.csv' file uploaded" }
/// ```
#[utoipa::path(
    post,
    path = "/csv-files-upload/",
    operation_id = "createPaymentsFileUpload",
    tag = "csv-files-upload",
    request_body(content = CsvFileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 202, description = "File normalized and stored", body = Envelope<String>),
        (status = 400, description = "Missing field, not a CSV file or not UTF-8", body = ErrorBody),
        (status = 403, description = "Missing or invalid access token", body = ErrorBody),
        (status = 415, description = "Body is not multipart/form-data", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn upload_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<String> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Rejected upload body: {}", rejection.body_text());
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        ApiError::unsupported_media_type(format!("Unsupported media type \"{}\" in request.", content_type))
    })?;

    let form = read_form(&mut multipart).await?;
    let (file, origin, file_type, requester) = check_presence(form)?;
    let filename = file.filename.unwrap_or_default();

    if !is_csv(&filename, file.content_type.as_deref()) {
        return Err(ApiError::FileTypeNotCsv);
    }

    let request_charset = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_param);
    let part_charset = file.content_type.as_deref().and_then(charset_param);
    if ![request_charset, part_charset].iter().flatten().all(|c| is_utf8_label(c)) {
        return Err(ApiError::CharsetNotUtf8);
    }

    let content = String::from_utf8(strip_bom(file.bytes)).map_err(|_| ApiError::CharsetNotUtf8)?;

    let upload = CsvUpload {
        origin,
        file_type,
        requester,
        filename,
        content,
    };
    let key = state.upload_service().store(&upload).await?;
    tracing::info!("User '{}' uploaded '{}' to {}", user.username, upload.filename, key);

    Ok(ApiResponse::accepted(format!("'{}' file uploaded", upload.filename)))
}

/// OPTIONS /csv-files-upload/ - Endpoint metadata
pub async fn upload_options() -> impl IntoResponse {
    let field = |label: &str, kind: &str| {
        json!({"type": kind, "required": true, "read_only": false, "label": label})
    };

    let metadata: Value = json!({
        "name": "Payments File Upload",
        "description": "Normalize a CSV file and store it under origin/type/requester.",
        "renders": ["application/json"],
        "parses": ["multipart/form-data"],
        "actions": {
            "POST": {
                "file": field("File", "file upload"),
                "origin": field("Origin", "string"),
                "type": field("Type", "string"),
                "requester": field("Requester", "string"),
            }
        }
    });

    ([(header::ALLOW, "POST, OPTIONS")], ApiResponse::success(metadata))
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            form.file = Some(read_file(field).await?);
        } else if TEXT_FIELDS.contains(&name.as_str()) {
            let value = field.text().await.map_err(multipart_error)?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

async fn read_file(field: Field<'_>) -> Result<FilePart, ApiError> {
    let filename = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(FilePart {
        filename,
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request body is too large")
    } else {
        ApiError::bad_request(format!("Multipart form parse error - {}", err.body_text()))
    }
}

/// Required/blank checks, reported together per field
fn check_presence(form: UploadForm) -> Result<(FilePart, String, String, String), ApiError> {
    let mut errors = FieldErrors::new();

    match &form.file {
        None => push_error(&mut errors, "file", REQUIRED),
        Some(file) if file.filename.as_deref().map_or(true, str::is_empty) => {
            push_error(&mut errors, "file", NO_FILENAME)
        }
        Some(file) if file.bytes.is_empty() => push_error(&mut errors, "file", EMPTY_FILE),
        Some(_) => {}
    }

    for name in TEXT_FIELDS {
        match form.text(name).map(|v| v.trim()) {
            None => push_error(&mut errors, name, REQUIRED),
            Some("") => push_error(&mut errors, name, BLANK),
            Some(_) => {}
        }
    }

    match form {
        UploadForm {
            file: Some(file),
            origin: Some(origin),
            file_type: Some(file_type),
            requester: Some(requester),
        } if errors.is_empty() => Ok((
            file,
            origin.trim().to_string(),
            file_type.trim().to_string(),
            requester.trim().to_string(),
        )),
        _ => Err(ApiError::invalid_fields(errors)),
    }
}

/// Name ends with `.csv` and the part declares `text/csv`
fn is_csv(filename: &str, content_type: Option<&str>) -> bool {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or("");

    filename.ends_with(CSV_EXTENSION) && essence.eq_ignore_ascii_case(CSV_CONTENT_TYPE)
}

/// `charset` parameter of a Content-Type value, unquoted
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn strip_bom(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    bytes
}

fn is_utf8_label(charset: &str) -> bool {
    charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8")
}
