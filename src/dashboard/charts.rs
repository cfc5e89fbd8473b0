//! History chart generation for the dashboard.
//!
//! The income/expense history is rendered as an ECharts bar chart. The chart
//! options are built with `charming` and serialised to JSON, then a small
//! inline script initialises the chart. The script is inline (rather than a
//! head element) so the same markup works for the initial page load and for
//! htmx partial updates of the chart.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};
use time::Month;

use crate::history::{DayHistoryEntry, MonthHistoryEntry};

/// The CDN URL for the ECharts library loaded in the dashboard page head.
pub(super) const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The element ID the history chart is rendered into.
const HISTORY_CHART_ID: &str = "history-chart-canvas";

/// Builds the bar chart for a year of history, one bar pair per month.
pub(super) fn year_history_chart(year: i32, entries: &[MonthHistoryEntry]) -> Chart {
    let labels = entries
        .iter()
        .map(|entry| month_label(entry.month).to_owned())
        .collect::<Vec<_>>();
    let income = entries.iter().map(|entry| entry.income).collect::<Vec<_>>();
    let expense = entries
        .iter()
        .map(|entry| entry.expense)
        .collect::<Vec<_>>();

    history_chart(&format!("Income and expenses in {year}"), labels, income, expense)
}

/// Builds the bar chart for a month of history, one bar pair per day.
pub(super) fn month_history_chart(year: i32, month: Month, entries: &[DayHistoryEntry]) -> Chart {
    let labels = entries
        .iter()
        .map(|entry| entry.day.to_string())
        .collect::<Vec<_>>();
    let income = entries.iter().map(|entry| entry.income).collect::<Vec<_>>();
    let expense = entries
        .iter()
        .map(|entry| entry.expense)
        .collect::<Vec<_>>();

    history_chart(
        &format!("Income and expenses in {} {year}", month_label(month)),
        labels,
        income,
        expense,
    )
}

fn history_chart(title: &str, labels: Vec<String>, income: Vec<f64>, expense: Vec<f64>) -> Chart {
    Chart::new()
        .title(Title::new().text(title))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().top("bottom"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("10%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Bar::new().name("Income").data(income))
        .series(Bar::new().name("Expense").data(expense))
}

fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Renders the chart container and its inline initialisation script.
pub(super) fn history_chart_view(chart: &Chart) -> Markup {
    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{HISTORY_CHART_ID}");
            if (chartDom._echarts) {{ chartDom._echarts.dispose(); }}
            const chart = echarts.init(chartDom);
            chartDom._echarts = chart;
            chart.setOption({});

            window.addEventListener('resize', chart.resize);
        }})();"#,
        chart.to_string()
    );

    html!(
        div
            id=(HISTORY_CHART_ID)
            class="min-h-[380px] rounded dark:bg-gray-100"
        {}

        script { (PreEscaped(script)) }
    )
}

/// Renders the placeholder shown when the selected period has no buckets.
pub(super) fn history_no_data_view() -> Markup {
    html!(
        div class="min-h-[380px] flex items-center justify-center rounded
            border border-dashed border-gray-300 dark:border-gray-700"
        {
            p class="text-gray-500 dark:text-gray-400"
            {
                "No history for this period yet. Add some transactions to see the chart."
            }
        }
    )
}
