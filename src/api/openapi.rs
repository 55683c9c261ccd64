//! OpenAPI description of the routes this server actually exposes.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::{OpenApi as OpenApiDocument, PathItem};
use utoipa::{Modify, OpenApi};

use crate::auth::TokenPair;
use crate::config::ApiConfig;
use crate::database::models::{PaymentDebt, PaymentDebtStatus};
use crate::error::ErrorBody;
use crate::handlers::protected::upload::CsvFileUpload;
use crate::handlers::public::auth::login::LoginRequest;
use crate::handlers::public::auth::refresh::{AccessToken, RefreshRequest};
use crate::handlers::{protected, public};
use crate::types::ResourceMethod;

pub const TITLE: &str = "Payments API";
pub const DESCRIPTION: &str = "API for test purposes";
pub const SECURITY_SCHEME: &str = "bearerAuth";

const PAYMENT_DEBT_PREFIX: &str = "/payment-debt/";

#[derive(OpenApi)]
#[openapi(
    paths(
        public::auth::login::login_post,
        public::auth::refresh::refresh_post,
        protected::payment_debt::list,
        protected::payment_debt::create,
        protected::payment_debt::retrieve,
        protected::payment_debt::update,
        protected::payment_debt::partial_update,
        protected::payment_debt::destroy,
        protected::upload::upload_post,
    ),
    components(schemas(
        PaymentDebt,
        PaymentDebtStatus,
        CsvFileUpload,
        LoginRequest,
        RefreshRequest,
        TokenPair,
        AccessToken,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "JWT login and refresh"),
        (name = "payment-debt", description = "Payment debt records"),
        (name = "csv-files-upload", description = "CSV normalization and storage"),
    )
)]
struct PaymentsApi;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut OpenApiDocument) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            SECURITY_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the document. Payment debt operations follow the configured allow-list;
/// a payment debt path left without operations is dropped.
pub fn openapi_document(api: &ApiConfig) -> OpenApiDocument {
    let mut document = PaymentsApi::openapi();
    document.info.title = TITLE.to_string();
    document.info.description = Some(DESCRIPTION.to_string());

    document.paths.paths.retain(|path, item| {
        if !path.starts_with(PAYMENT_DEBT_PREFIX) {
            return true;
        }
        restrict_operations(item, &api.payment_debt_methods);
        has_operations(item)
    });

    document
}

fn restrict_operations(item: &mut PathItem, allowed: &[ResourceMethod]) {
    let denied = |method: ResourceMethod| !allowed.contains(&method);

    if denied(ResourceMethod::Get) {
        item.get = None;
    }
    if denied(ResourceMethod::Post) {
        item.post = None;
    }
    if denied(ResourceMethod::Put) {
        item.put = None;
    }
    if denied(ResourceMethod::Patch) {
        item.patch = None;
    }
    if denied(ResourceMethod::Delete) {
        item.delete = None;
    }
}

fn has_operations(item: &PathItem) -> bool {
    [&item.get, &item.post, &item.put, &item.patch, &item.delete]
        .iter()
        .any(|operation| operation.is_some())
}
