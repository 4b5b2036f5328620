//! Tabular view of a planner, one row per item, for reports and the CLI.

use crate::item::{AcademicItem, Plannable};
use crate::planner::AcademicPlanner;
use chrono::NaiveDate;
use polars::prelude::*;

pub const FRAME_COLUMNS: [&str; 9] = [
    "type",
    "title",
    "course_code",
    "due_date",
    "weight",
    "status",
    "days_until_due",
    "priority",
    "time_commitment",
];

/// Projects `planner` into a `DataFrame`, evaluating the date-relative columns
/// against `reference`.
pub fn planner_to_dataframe(
    planner: &AcademicPlanner,
    reference: NaiveDate,
) -> PolarsResult<DataFrame> {
    items_to_dataframe(planner.items().iter(), reference)
}

pub fn items_to_dataframe<'a, I>(items: I, reference: NaiveDate) -> PolarsResult<DataFrame>
where
    I: IntoIterator<Item = &'a AcademicItem>,
{
    let items: Vec<&AcademicItem> = items.into_iter().collect();

    let kinds: Vec<&str> = items.iter().map(|i| i.item_type().as_str()).collect();
    let titles: Vec<&str> = items.iter().map(|i| i.title()).collect();
    let courses: Vec<&str> = items.iter().map(|i| i.course_code()).collect();
    let due: Vec<i32> = items.iter().map(|i| date_to_i32(i.due_date())).collect();
    let weights: Vec<f64> = items.iter().map(|i| i.weight()).collect();
    let statuses: Vec<&str> = items.iter().map(|i| i.status().as_str()).collect();
    let days: Vec<i64> = items.iter().map(|i| i.days_until_due(reference)).collect();
    let priorities: Vec<&str> = items
        .iter()
        .map(|i| i.priority(reference).as_str())
        .collect();
    let hours: Vec<f64> = items
        .iter()
        .map(|i| i.calculate_time_commitment())
        .collect();

    let columns: Vec<Column> = vec![
        Series::new(PlSmallStr::from_static("type"), kinds).into_column(),
        Series::new(PlSmallStr::from_static("title"), titles).into_column(),
        Series::new(PlSmallStr::from_static("course_code"), courses).into_column(),
        Series::new(PlSmallStr::from_static("due_date"), due)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("weight"), weights).into_column(),
        Series::new(PlSmallStr::from_static("status"), statuses).into_column(),
        Series::new(PlSmallStr::from_static("days_until_due"), days).into_column(),
        Series::new(PlSmallStr::from_static("priority"), priorities).into_column(),
        Series::new(PlSmallStr::from_static("time_commitment"), hours).into_column(),
    ];

    DataFrame::new(columns)
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as i32
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Renders a frame as a boxed plain-text table.
pub fn render_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| {
                col.get(row_idx)
                    .map(|av| cell_text(&av))
                    .unwrap_or_default()
            })
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, text) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(text.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, row: &[String]| {
        out.push('|');
        for (ci, text) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(text);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(text.len())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}
