pub mod payment_debt;
pub mod user;

pub use payment_debt::{PaymentDebt, PaymentDebtStatus};
pub use user::User;
