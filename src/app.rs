use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::{PaymentDebtRepository, UserRepository};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AuthService, UploadService};
use crate::storage::ObjectStore;
use crate::types::{Clock, ResourceMethod};

/// Shared dependencies handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub debts: Arc<dyn PaymentDebtRepository>,
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<dyn ObjectStore>,
    pub tokens: TokenIssuer,
    pub clock: Clock,
}

impl AppState {
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.users.clone(), self.tokens.clone())
    }

    pub fn upload_service(&self) -> UploadService {
        UploadService::new(self.storage.clone(), &self.config, self.clock)
    }
}

/// Full application router.
///
/// The JWT check wraps every protected route including its method fallback,
/// so an anonymous request is rejected with 403 before a disallowed verb
/// would be answered with 405.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let protected_routes = Router::new()
        .merge(payment_debt_routes(&config.api.payment_debt_methods))
        .route(
            "/csv-files-upload/",
            post(protected::upload::upload_post).options(protected::upload::upload_options),
        )
        .layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login/", post(public::auth::login_post))
        .route("/auth/refresh/", post(public::auth::refresh_post))
        .route("/openapi/", get(public::docs::openapi_get))
        .route("/docs/", get(public::docs::swagger_ui_get))
        // Protected
        .merge(protected_routes)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    // The CORS layer answers every OPTIONS request itself, so it is only
    // installed when enabled.
    let router = match cors_layer(&config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Collection and detail routes opened only for the allow-listed verbs.
/// A route with no verbs still exists and answers 405.
fn payment_debt_routes(methods: &[ResourceMethod]) -> Router<AppState> {
    use protected::payment_debt;

    let mut collection: MethodRouter<AppState> = MethodRouter::new();
    let mut detail: MethodRouter<AppState> = MethodRouter::new();

    for method in methods {
        match method {
            ResourceMethod::Get => {
                collection = collection.get(payment_debt::list);
                detail = detail.get(payment_debt::retrieve);
            }
            ResourceMethod::Post => collection = collection.post(payment_debt::create),
            ResourceMethod::Put => detail = detail.put(payment_debt::update),
            ResourceMethod::Patch => detail = detail.patch(payment_debt::partial_update),
            ResourceMethod::Delete => detail = detail.delete(payment_debt::destroy),
        }
    }

    Router::new()
        .route("/payment-debt/", collection)
        .route("/payment-debt/:debt_id/", detail)
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    if config.is_development() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any),
    )
}
