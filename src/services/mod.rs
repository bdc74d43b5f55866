pub mod access;
pub mod finance_analytics;

pub use finance_analytics::{FinanceAnalyticsService, FinanceDashboard};
