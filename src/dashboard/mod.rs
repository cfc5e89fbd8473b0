//! The dashboard page.
//!
//! Combines the current month's stats with an income/expense history chart
//! fed by the aggregate buckets in [crate::history]. The timeframe and period
//! selectors swap in new charts over htmx without a full page reload.

mod charts;
mod handlers;

pub use handlers::{
    DashboardState, get_dashboard_page, get_history_partial, get_history_periods_partial,
};
