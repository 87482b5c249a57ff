use crate::db::postgres::models::index_history::IndexHistoryRow;
use crate::utils::rounding::{finite, round_to};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, warn};

/// Number of trailing points kept for the mini chart
pub const MINI_CHART_POINTS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: NaiveDate,
    pub close: Option<f64>,
}

/// Summary of one index as shown on the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResult {
    pub status: DisplayStatus,
    pub name: String,
    pub category: &'static str,
    pub latest_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub mini_chart_data: Vec<ChartPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DisplayResult {
    /// An error result with no numbers, used when an index could not be processed at all.
    pub fn error(symbol: &str, message: String, mini_chart_data: Vec<ChartPoint>) -> Self {
        Self {
            status: DisplayStatus::Error,
            name: symbol.to_string(),
            category: "index",
            latest_close: None,
            change: None,
            change_percent: None,
            mini_chart_data,
            message: Some(message),
        }
    }
}

fn tail_chart<'a>(rows: impl DoubleEndedIterator<Item = &'a IndexHistoryRow>) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = rows
        .rev()
        .take(MINI_CHART_POINTS)
        .map(|row| ChartPoint {
            time: row.time,
            close: finite(row.close),
        })
        .collect();
    points.reverse();
    points
}

/// Projects a full ascending series into latest close, day-over-day change and a short chart.
pub fn project_display(rows: &[IndexHistoryRow], symbol: &str) -> DisplayResult {
    if rows.is_empty() {
        warn!("No stored data to display for {}", symbol);
        return DisplayResult::error(
            symbol,
            format!("No data available to process for display for {}.", symbol),
            Vec::new(),
        );
    }

    // NaN counts as missing, like a null close
    let cleaned: Vec<&IndexHistoryRow> = rows
        .iter()
        .filter(|row| row.close.is_some_and(|c| !c.is_nan()))
        .collect();

    let (Some(last), previous) = (cleaned.last(), cleaned.iter().rev().nth(1)) else {
        warn!("No valid close values for {} after cleaning", symbol);
        return DisplayResult {
            status: DisplayStatus::Warning,
            message: Some(format!(
                "Not enough valid data points to calculate changes for {} after cleaning.",
                symbol
            )),
            ..DisplayResult::error(symbol, String::new(), tail_chart(rows.iter()))
        };
    };

    let latest_close = last.close.unwrap_or(f64::NAN);
    let previous_close = previous.and_then(|row| row.close).unwrap_or(latest_close);
    let change = round_to(latest_close - previous_close, 2);
    let change_percent = if previous_close != 0.0 {
        round_to(change / previous_close * 100.0, 3)
    } else {
        0.0
    };

    if !latest_close.is_finite() || !change.is_finite() || !change_percent.is_finite() {
        error!(
            "Non-finite values while computing display data for {}: latest={}, previous={}",
            symbol, latest_close, previous_close
        );
        return DisplayResult::error(
            symbol,
            format!(
                "Error processing display data for {}: non-finite close values",
                symbol
            ),
            tail_chart(rows.iter()),
        );
    }

    DisplayResult {
        status: DisplayStatus::Success,
        name: symbol.to_string(),
        category: "index",
        latest_close: Some(latest_close),
        change: Some(change),
        change_percent: Some(change_percent),
        mini_chart_data: tail_chart(cleaned.into_iter()),
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, history_row};

    fn series(closes: &[Option<f64>]) -> Vec<IndexHistoryRow> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                history_row(1, date(2024, 1, 1) + chrono::Days::new(i as u64), *close)
            })
            .collect()
    }

    #[test]
    fn test_change_arithmetic() {
        let result = project_display(&series(&[Some(95.0), Some(98.0), Some(100.0)]), "VNINDEX");

        assert_eq!(result.status, DisplayStatus::Success);
        assert_eq!(result.latest_close, Some(100.0));
        assert_eq!(result.change, Some(2.0));
        assert_eq!(result.change_percent, Some(2.041));
        assert_eq!(result.mini_chart_data.len(), 3);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_single_row_has_zero_change() {
        let result = project_display(&series(&[Some(1250.5)]), "VNINDEX");

        assert_eq!(result.status, DisplayStatus::Success);
        assert_eq!(result.change, Some(0.0));
        assert_eq!(result.change_percent, Some(0.0));
    }

    #[test]
    fn test_empty_series_is_error() {
        let result = project_display(&[], "HNXINDEX");

        assert_eq!(result.status, DisplayStatus::Error);
        assert_eq!(result.latest_close, None);
        assert_eq!(result.change, None);
        assert_eq!(result.change_percent, None);
        assert!(result.mini_chart_data.is_empty());
    }

    #[test]
    fn test_zero_previous_close_guard() {
        let result = project_display(&series(&[Some(0.0), Some(5.0)]), "VNINDEX");

        assert_eq!(result.change, Some(5.0));
        assert_eq!(result.change_percent, Some(0.0));
    }

    #[test]
    fn test_null_closes_are_skipped() {
        let result = project_display(&series(&[Some(98.0), Some(100.0), None]), "VNINDEX");

        assert_eq!(result.latest_close, Some(100.0));
        assert_eq!(result.change, Some(2.0));
        assert_eq!(result.mini_chart_data.len(), 2);
    }

    #[test]
    fn test_all_null_closes_is_warning_with_raw_chart() {
        let result = project_display(&series(&[None, None]), "VNINDEX");

        assert_eq!(result.status, DisplayStatus::Warning);
        assert_eq!(result.latest_close, None);
        assert_eq!(result.mini_chart_data.len(), 2);
        assert!(result.message.unwrap().contains("after cleaning"));
    }

    #[test]
    fn test_mini_chart_keeps_last_thirty() {
        let closes: Vec<Option<f64>> = (0..45).map(|i| Some(1000.0 + i as f64)).collect();
        let result = project_display(&series(&closes), "VNINDEX");

        assert_eq!(result.mini_chart_data.len(), MINI_CHART_POINTS);
        assert_eq!(result.mini_chart_data[0].close, Some(1015.0));
        assert_eq!(result.mini_chart_data[29].close, Some(1044.0));
    }

    #[test]
    fn test_infinite_close_is_error() {
        let result = project_display(&series(&[Some(1.0), Some(f64::INFINITY)]), "VNINDEX");

        assert_eq!(result.status, DisplayStatus::Error);
        assert_eq!(result.latest_close, None);
        assert_eq!(result.mini_chart_data.len(), 2);
    }

    #[test]
    fn test_serialized_shape() {
        let result = project_display(&series(&[Some(98.0), Some(100.0)]), "VNINDEX");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["category"], "index");
        assert_eq!(json["changePercent"], 2.041);
        assert_eq!(json["miniChartData"][1]["time"], "2024-01-02");
        assert!(json.get("message").is_none());
    }
}
