//! Terminal front end of the dashboard.

pub use self::dashboard::{Dashboard, DashboardView, Options};
pub use self::runtime::run;

mod dashboard;
mod runtime;
pub mod view;
