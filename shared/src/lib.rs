// Shared library: data models and the pure-logic helpers used by the platform and web crates.
pub mod calculator;
pub mod formatting;
pub mod models;
pub mod pagination;

pub use calculator::Calculator;
pub use formatting::{Formatters, LocaleFormat};
pub use models::{ChartDatum, NotificationKind, StoredValue};
pub use pagination::Paginator;
