pub mod aggregate;
pub mod proxy;
pub mod types;

pub use aggregate::aggregate;
pub use proxy::{estimate_from_financials, FinancialProxies};
pub use types::*;
