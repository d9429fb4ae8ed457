// In: src/convert/result.rs

//! The result decoder: Simplace `Result` / `VarMap` handles → host values.
//!
//! Both decoders zip the aligned header, type and data sequences positionally and
//! dispatch on [`SimplaceType`]:
//!
//! * [`result_to_list`] decodes a full `Result`, one per-step sequence per column.
//! * [`varmap_to_list`] decodes a `VarMap`, one value per column.
//!
//! `expand = false` leaves array-typed cells as foreign handles so a caller can skip
//! the conversion cost for columns it does not need. `legacy = true` returns plain
//! `Vec`s for numeric data instead of `ndarray` vectors; the values are the same.

use chrono::NaiveDate;
use log::{debug, warn};
use ndarray::Array1;

use crate::convert::table::VarTable;
use crate::error::SimplaceError;
use crate::traits::{ForeignObject, ResultTable};
use crate::types::SimplaceType;

//==================================================================================
// I. Decoded Values
//==================================================================================

/// A homogeneous numeric (or boolean) sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Series<T> {
    /// Legacy container.
    List(Vec<T>),
    /// Default container.
    Vector(Array1<T>),
}

impl<T: Clone> Series<T> {
    fn from_vec(values: Vec<T>, legacy: bool) -> Self {
        if legacy {
            Series::List(values)
        } else {
            Series::Vector(Array1::from_vec(values))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Series::List(values) => values.len(),
            Series::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            Series::List(values) => values.get(index),
            Series::Vector(values) => values.get(index),
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Series::List(values) => values.clone(),
            Series::Vector(values) => values.to_vec(),
        }
    }
}

/// One decoded column of a `Result`: a value per simulated step.
#[derive(Debug, Clone, PartialEq)]
pub enum Column<O> {
    Doubles(Series<f64>),
    Ints(Series<i32>),
    Booleans(Series<bool>),
    Dates(Vec<String>),
    Chars(Vec<String>),
    DoubleArrays(Vec<Series<f64>>),
    IntArrays(Vec<Series<i32>>),
    CharArrays(Vec<Vec<String>>),
    /// Unexpanded array columns and unknown types: the per-step handles, untouched.
    Handles(Vec<O>),
}

impl<O> Column<O> {
    /// Number of steps in this column.
    pub fn len(&self) -> usize {
        match self {
            Column::Doubles(s) => s.len(),
            Column::Ints(s) => s.len(),
            Column::Booleans(s) => s.len(),
            Column::Dates(v) | Column::Chars(v) => v.len(),
            Column::DoubleArrays(v) => v.len(),
            Column::IntArrays(v) => v.len(),
            Column::CharArrays(v) => v.len(),
            Column::Handles(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One decoded column of a `VarMap`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<O> {
    Double(f64),
    Int(i32),
    Date(String),
    Char(String),
    DoubleArray(Series<f64>),
    IntArray(Series<i32>),
    CharArray(Vec<String>),
    /// Everything without a conversion rule, returned as the raw handle.
    Raw(O),
}

//==================================================================================
// II. Options
//==================================================================================

/// Options for [`result_to_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Convert array cells into host sequences (default `true`).
    pub expand: bool,
    /// Use plain `Vec`s for numeric data (default `false`).
    pub legacy: bool,
    /// First step to fetch.
    pub start: Option<i64>,
    /// Last step to fetch.
    pub end: Option<i64>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            expand: true,
            legacy: false,
            start: None,
            end: None,
        }
    }
}

impl DecodeOptions {
    pub fn window(mut self, start: i64, end: i64) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// The step window actually requested from Simplace.
///
/// Only a complete window with `0 <= start <= end` is used. Anything else (one
/// bound missing, negative start, `start > end`) silently means "all steps".
pub fn row_window(start: Option<i64>, end: Option<i64>) -> Option<(i32, i32)> {
    match (start, end) {
        (Some(start), Some(end)) if 0 <= start && start <= end => {
            Some((i32::try_from(start).ok()?, i32::try_from(end).ok()?))
        }
        _ => None,
    }
}

//==================================================================================
// III. Shared Conversion Helpers
//==================================================================================

const DATE_PREFIX_LEN: usize = 10;

/// `toString()` cut to its first ten characters (`YYYY-MM-DD`).
fn date_prefix<O: ForeignObject>(obj: &O) -> Result<String, SimplaceError> {
    Ok(obj.display_string()?.chars().take(DATE_PREFIX_LEN).collect())
}

fn looks_like_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn strings_of<O: ForeignObject>(obj: &O) -> Result<Vec<String>, SimplaceError> {
    obj.elements()?.iter().map(|o| o.display_string()).collect()
}

fn dates_of<O: ForeignObject>(name: &str, obj: &O) -> Result<Vec<String>, SimplaceError> {
    let dates = obj
        .elements()?
        .iter()
        .map(date_prefix)
        .collect::<Result<Vec<_>, _>>()?;
    // The prefix is returned either way; a bad one only gets reported.
    if let Some(bad) = dates.iter().find(|d| !looks_like_date(d)) {
        warn!("column '{}' holds a DATE value that is not YYYY-MM-DD: '{}'", name, bad);
    }
    Ok(dates)
}

//==================================================================================
// IV. Array Form (Result)
//==================================================================================

fn decode_column<O: ForeignObject>(
    name: &str,
    obj: O,
    ty: &SimplaceType,
    expand: bool,
    legacy: bool,
) -> Result<Column<O>, SimplaceError> {
    use SimplaceType::*;

    let column = match ty {
        Double => Column::Doubles(Series::from_vec(obj.unbox_doubles()?, legacy)),
        Int => Column::Ints(Series::from_vec(obj.unbox_ints()?, legacy)),
        Boolean => Column::Booleans(Series::from_vec(obj.unbox_booleans()?, legacy)),
        Date => Column::Dates(dates_of(name, &obj)?),
        Char => Column::Chars(strings_of(&obj)?),
        DoubleArray if expand => Column::DoubleArrays(
            obj.elements()?
                .iter()
                .map(|row| -> Result<_, SimplaceError> {
                    Ok(Series::from_vec(row.unbox_doubles()?, legacy))
                })
                .collect::<Result<_, _>>()?,
        ),
        IntArray if expand => Column::IntArrays(
            obj.elements()?
                .iter()
                .map(|row| -> Result<_, SimplaceError> {
                    Ok(Series::from_vec(row.unbox_ints()?, legacy))
                })
                .collect::<Result<_, _>>()?,
        ),
        CharArray if expand => Column::CharArrays(
            obj.elements()?
                .iter()
                .map(strings_of)
                .collect::<Result<_, _>>()?,
        ),
        DoubleArray | IntArray | CharArray | Other(_) => Column::Handles(obj.elements()?),
    };
    Ok(column)
}

/// Converts a Simplace `Result` into a name → per-step column map.
pub fn result_to_list<R: ResultTable>(
    result: &R,
    options: &DecodeOptions,
) -> Result<VarTable<Column<R::Object>>, SimplaceError> {
    let data = match row_window(options.start, options.end) {
        Some((start, end)) => result.data_objects_range(start, end)?,
        None => result.data_objects()?,
    };
    let names = result.header_strings()?;
    let types = result.type_strings()?;
    debug!(
        "decoding result with {} column(s), expand={}, legacy={}",
        names.len(),
        options.expand,
        options.legacy
    );

    names
        .into_iter()
        .zip(types)
        .zip(data)
        .map(|((name, tag), obj)| -> Result<_, SimplaceError> {
            let ty = SimplaceType::from_tag(&tag);
            let column = decode_column(&name, obj, &ty, options.expand, options.legacy)?;
            Ok((name, column))
        })
        .collect()
}

//==================================================================================
// V. Scalar Form (VarMap)
//==================================================================================

fn decode_value<O: ForeignObject>(
    name: &str,
    obj: O,
    ty: &SimplaceType,
    expand: bool,
    legacy: bool,
) -> Result<Value<O>, SimplaceError> {
    use SimplaceType::*;

    let value = match ty {
        Double => Value::Double(obj.double_value()?),
        Int => Value::Int(obj.int_value()?),
        Date => {
            let date = date_prefix(&obj)?;
            if !looks_like_date(&date) {
                warn!("column '{}' holds a DATE value that is not YYYY-MM-DD: '{}'", name, date);
            }
            Value::Date(date)
        }
        Char => Value::Char(obj.display_string()?),
        DoubleArray if expand => Value::DoubleArray(Series::from_vec(obj.unbox_doubles()?, legacy)),
        IntArray if expand => Value::IntArray(Series::from_vec(obj.unbox_ints()?, legacy)),
        CharArray if expand && !legacy => Value::CharArray(strings_of(&obj)?),
        Boolean | DoubleArray | IntArray | CharArray | Other(_) => Value::Raw(obj),
    };
    Ok(value)
}

/// Converts a Simplace `VarMap` (the values of the last step) into a name → value map.
pub fn varmap_to_list<R: ResultTable>(
    varmap: &R,
    expand: bool,
    legacy: bool,
) -> Result<VarTable<Value<R::Object>>, SimplaceError> {
    let names = varmap.header_strings()?;
    let data = varmap.data_objects()?;
    let types = varmap.type_strings()?;

    names
        .into_iter()
        .zip(types)
        .zip(data)
        .map(|((name, tag), obj)| -> Result<_, SimplaceError> {
            let ty = SimplaceType::from_tag(&tag);
            let value = decode_value(&name, obj, &ty, expand, legacy)?;
            Ok((name, value))
        })
        .collect()
}

//==================================================================================
// VI. Header Projections
//==================================================================================

/// Column name → unit.
pub fn units_of_result<R: ResultTable>(result: &R) -> Result<VarTable<String>, SimplaceError> {
    let names = result.header_strings()?;
    let units = result.header_units()?;
    Ok(names.into_iter().zip(units).collect())
}

/// Column name → Simplace type tag.
pub fn datatypes_of_result<R: ResultTable>(
    result: &R,
) -> Result<VarTable<String>, SimplaceError> {
    let names = result.header_strings()?;
    let types = result.type_strings()?;
    Ok(names.into_iter().zip(types).collect())
}
