// handlers/mod.rs - Two security tiers
//
// Public (no auth) → Protected (bearer access token, see middleware::auth)
pub mod protected;
pub mod public;
pub mod utils;
