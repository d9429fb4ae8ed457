// In: src/frame.rs

//! Exports a decoded `Result` as an Arrow `RecordBatch`, one row per step.

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int32Array, ListArray, ListBuilder,
    StringArray, StringBuilder,
};
use arrow::datatypes::{Date32Type, Float64Type, Int32Type};
use arrow::record_batch::RecordBatch;
use arrow_schema::Schema;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::convert::{Column, Series, VarTable};
use crate::error::SimplaceError;

fn date32(value: &str) -> Option<i32> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(Date32Type::from_naive_date)
}

fn primitive_lists<T: Clone>(
    rows: &[Series<T>],
) -> impl Iterator<Item = Option<Vec<Option<T>>>> + '_ {
    rows.iter()
        .map(|row| Some(row.to_vec().into_iter().map(Some).collect()))
}

fn column_to_array<O>(name: &str, column: &Column<O>) -> Result<ArrayRef, SimplaceError> {
    let array: ArrayRef = match column {
        Column::Doubles(values) => Arc::new(Float64Array::from(values.to_vec())),
        Column::Ints(values) => Arc::new(Int32Array::from(values.to_vec())),
        Column::Booleans(values) => Arc::new(BooleanArray::from(values.to_vec())),
        Column::Chars(values) => Arc::new(StringArray::from(values.clone())),
        Column::Dates(values) => Arc::new(Date32Array::from(
            values.iter().map(|d| date32(d)).collect::<Vec<_>>(),
        )),
        Column::DoubleArrays(rows) => Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(
            primitive_lists(rows),
        )),
        Column::IntArrays(rows) => Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(
            primitive_lists(rows),
        )),
        Column::CharArrays(rows) => {
            let mut builder = ListBuilder::new(StringBuilder::new());
            for row in rows {
                for value in row {
                    builder.values().append_value(value);
                }
                builder.append(true);
            }
            Arc::new(builder.finish())
        }
        Column::Handles(_) => {
            return Err(SimplaceError::UnsupportedType(format!(
                "column '{}' holds unconverted Java objects",
                name
            )))
        }
    };
    Ok(array)
}

/// Converts decoded columns into a `RecordBatch`, keeping column order.
///
/// `DATE` values that do not parse as `YYYY-MM-DD` become nulls. Columns still
/// holding Java handles (unexpanded arrays, unknown types) are rejected.
pub fn columns_to_record_batch<O>(
    columns: &VarTable<Column<O>>,
) -> Result<RecordBatch, SimplaceError> {
    if columns.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }
    let arrays = columns
        .iter()
        .map(|(name, column)| -> Result<_, SimplaceError> {
            Ok((name.to_string(), column_to_array(name, column)?))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RecordBatch::try_from_iter(arrays)?)
}
