//! Rolling aggregate buckets that mirror the transaction log.
//!
//! Each transaction write also updates a per-day bucket (`month_history`) and
//! a per-month bucket (`year_history`) so the dashboard charts can be served
//! without scanning every transaction. The bucket updates must run in the
//! same SQL transaction as the transaction row insert or delete, see
//! [crate::transaction].

mod buckets;
mod series;

pub use buckets::{create_history_tables, record_in_history, remove_from_history};
pub use series::{
    DayHistoryEntry, MonthHistoryEntry, get_history_periods, get_month_series, get_year_series,
};
