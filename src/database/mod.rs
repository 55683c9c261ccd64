pub mod manager;
pub mod models;
pub mod repository;
pub mod user_repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{PaymentDebt, PaymentDebtStatus, User};
pub use repository::{PaymentDebtRepository, PgPaymentDebtRepository};
pub use user_repository::{PgUserRepository, UserRepository};
