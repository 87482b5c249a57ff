use super::period::Period;
use crate::db::postgres::models::financial::{FinancialReportRow, FinancialValueRow, LineItemRow};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub type StatementRow = Map<String, Value>;

/// Pivots statement values into one row per line item with one column per period.
///
/// Rows follow the order in which line items first appear in `values`; ids missing
/// from `line_items` are grouped under `"Unknown"`. Values whose report is not in
/// `reports` are ignored, and a later value for the same item and period wins.
/// Every row carries all period keys between the two years, null where nothing is stored.
pub fn pivot_statement(
    line_items: &[LineItemRow],
    reports: &[FinancialReportRow],
    values: &[FinancialValueRow],
    period: Period,
    first_year: i32,
    last_year: i32,
) -> Vec<StatementRow> {
    let names: HashMap<i64, &str> = line_items
        .iter()
        .map(|li| (li.line_item_id, li.line_item_name.as_str()))
        .collect();
    let report_keys: HashMap<i64, String> = reports
        .iter()
        .filter_map(|r| {
            period
                .report_key(r.year, r.quarter.as_deref())
                .map(|key| (r.report_id, key))
        })
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut cells: HashMap<&str, HashMap<&str, Option<f64>>> = HashMap::new();

    for fd in values {
        let Some(key) = report_keys.get(&fd.report_id) else {
            continue;
        };
        let item = names.get(&fd.line_item_id).copied().unwrap_or("Unknown");
        let row = cells.entry(item).or_insert_with(|| {
            order.push(item);
            HashMap::new()
        });
        row.insert(key.as_str(), fd.value);
    }

    let columns = period.keys(first_year, last_year);

    order
        .into_iter()
        .map(|item| {
            let row_values = &cells[item];
            let mut row = Map::new();
            row.insert("item".to_string(), Value::from(item));
            for column in &columns {
                let value = row_values.get(column.as_str()).copied().flatten();
                row.insert(column.clone(), Value::from(value));
            }
            row
        })
        .collect()
}
