//! Read-side queries that densify the sparse history buckets into complete,
//! gap-free series for chart rendering.

use rusqlite::Connection;
use time::{Month, util::days_in_month};

use crate::{Error, user::UserID};

/// The income and expense sums for one month of a year series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthHistoryEntry {
    pub month: Month,
    pub income: f64,
    pub expense: f64,
}

/// The income and expense sums for one day of a month series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayHistoryEntry {
    pub day: u8,
    pub income: f64,
    pub expense: f64,
}

/// Get the per-month income and expense sums for `year`.
///
/// Months without activity are zero-filled so the series always has exactly
/// twelve entries, one per calendar month. The exception is a year with no
/// bucket rows at all, which returns an empty series so the caller can show a
/// "no data" message instead of a flat chart.
pub fn get_year_series(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<Vec<MonthHistoryEntry>, Error> {
    let rows: Vec<(u8, f64, f64)> = connection
        .prepare(
            "SELECT month, income, expense FROM year_history
            WHERE user_id = :user_id AND year = :year
            ORDER BY month ASC",
        )?
        .query_map(
            &[(":user_id", &user_id.as_i64()), (":year", &(year as i64))],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?
        .collect::<Result<_, _>>()?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut series: Vec<MonthHistoryEntry> = (1..=12)
        .map(|month_number: u8| MonthHistoryEntry {
            month: Month::try_from(month_number).expect("month numbers 1-12 are always valid"),
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    for (month_number, income, expense) in rows {
        let entry = &mut series[month_number as usize - 1];
        entry.income = income;
        entry.expense = expense;
    }

    Ok(series)
}

/// Get the per-day income and expense sums for `month` of `year`.
///
/// Days without activity are zero-filled so the series has one entry per
/// calendar day of the month (28 to 31 depending on month and leap year).
/// A month with no bucket rows at all returns an empty series.
pub fn get_month_series(
    user_id: UserID,
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<Vec<DayHistoryEntry>, Error> {
    let rows: Vec<(u8, f64, f64)> = connection
        .prepare(
            "SELECT day, income, expense FROM month_history
            WHERE user_id = :user_id AND year = :year AND month = :month
            ORDER BY day ASC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64()),
                (":year", &(year as i64)),
                (":month", &(month as i64)),
            ],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?
        .collect::<Result<_, _>>()?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut series: Vec<DayHistoryEntry> = (1..=days_in_month(month, year))
        .map(|day| DayHistoryEntry {
            day,
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    for (day, income, expense) in rows {
        let entry = &mut series[day as usize - 1];
        entry.income = income;
        entry.expense = expense;
    }

    Ok(series)
}

/// Get the years the user has history data for, in ascending order.
///
/// Users with no history get `current_year` alone so the year selector always
/// has at least one option.
pub fn get_history_periods(
    user_id: UserID,
    current_year: i32,
    connection: &Connection,
) -> Result<Vec<i32>, Error> {
    let years: Vec<i32> = connection
        .prepare(
            "SELECT DISTINCT year FROM month_history
            WHERE user_id = :user_id
            ORDER BY year ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    if years.is_empty() {
        return Ok(vec![current_year]);
    }

    Ok(years)
}

#[cfg(test)]
mod series_tests {
    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        history::{create_history_tables, record_in_history},
        transaction::TransactionKind,
        user::UserID,
    };

    use super::{
        DayHistoryEntry, MonthHistoryEntry, get_history_periods, get_month_series, get_year_series,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_history_tables(&connection).expect("Could not create history tables");
        connection
    }

    #[test]
    fn year_series_has_twelve_zero_filled_entries() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        record_in_history(
            user_id,
            date!(2025 - 03 - 15),
            TransactionKind::Income,
            250.0,
            &connection,
        )
        .unwrap();
        record_in_history(
            user_id,
            date!(2025 - 11 - 02),
            TransactionKind::Expense,
            40.0,
            &connection,
        )
        .unwrap();

        let series = get_year_series(user_id, 2025, &connection).unwrap();

        assert_eq!(series.len(), 12);
        assert_eq!(
            series[2],
            MonthHistoryEntry {
                month: Month::March,
                income: 250.0,
                expense: 0.0
            }
        );
        assert_eq!(
            series[10],
            MonthHistoryEntry {
                month: Month::November,
                income: 0.0,
                expense: 40.0
            }
        );

        let zero_months = series
            .iter()
            .filter(|entry| entry.income == 0.0 && entry.expense == 0.0)
            .count();
        assert_eq!(zero_months, 10, "months without activity should be zeroed");
    }

    #[test]
    fn year_series_is_empty_without_data() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        record_in_history(
            user_id,
            date!(2024 - 06 - 01),
            TransactionKind::Income,
            10.0,
            &connection,
        )
        .unwrap();

        let series = get_year_series(user_id, 2025, &connection).unwrap();

        assert!(series.is_empty(), "want empty series, got {series:?}");
    }

    #[test]
    fn month_series_has_one_entry_per_calendar_day() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        record_in_history(
            user_id,
            date!(2025 - 02 - 07),
            TransactionKind::Expense,
            13.37,
            &connection,
        )
        .unwrap();

        let series = get_month_series(user_id, 2025, Month::February, &connection).unwrap();

        assert_eq!(series.len(), 28, "February 2025 has 28 days");
        assert_eq!(
            series[6],
            DayHistoryEntry {
                day: 7,
                income: 0.0,
                expense: 13.37
            }
        );
    }

    #[test]
    fn month_series_handles_leap_year_february() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        record_in_history(
            user_id,
            date!(2024 - 02 - 29),
            TransactionKind::Income,
            5.0,
            &connection,
        )
        .unwrap();

        let series = get_month_series(user_id, 2024, Month::February, &connection).unwrap();

        assert_eq!(series.len(), 29, "February 2024 has 29 days");
        assert_eq!(
            series[28],
            DayHistoryEntry {
                day: 29,
                income: 5.0,
                expense: 0.0
            }
        );
    }

    #[test]
    fn month_series_is_empty_without_data() {
        let connection = get_test_db_connection();

        let series =
            get_month_series(UserID::new(1), 2025, Month::August, &connection).unwrap();

        assert!(series.is_empty(), "want empty series, got {series:?}");
    }

    #[test]
    fn history_periods_lists_years_ascending() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        for date in [
            date!(2023 - 12 - 31),
            date!(2025 - 01 - 01),
            date!(2023 - 01 - 15),
        ] {
            record_in_history(user_id, date, TransactionKind::Income, 1.0, &connection).unwrap();
        }

        let periods = get_history_periods(user_id, 2025, &connection).unwrap();

        assert_eq!(periods, vec![2023, 2025]);
    }

    #[test]
    fn history_periods_falls_back_to_current_year() {
        let connection = get_test_db_connection();

        let periods = get_history_periods(UserID::new(1), 2025, &connection).unwrap();

        assert_eq!(periods, vec![2025]);
    }

    #[test]
    fn series_do_not_leak_other_users_data() {
        let connection = get_test_db_connection();
        record_in_history(
            UserID::new(2),
            date!(2025 - 05 - 05),
            TransactionKind::Income,
            999.0,
            &connection,
        )
        .unwrap();

        let series = get_year_series(UserID::new(1), 2025, &connection).unwrap();

        assert!(series.is_empty(), "want empty series, got {series:?}");
    }
}
