// handlers/protected/mod.rs - Protected handlers (bearer access token required)
//
// Every route here is wrapped by middleware::jwt_auth_middleware in app::router;
// handlers can rely on an AuthUser request extension.

pub mod payment_debt; // /payment-debt/ and /payment-debt/:debt_id/
pub mod upload; // /csv-files-upload/
