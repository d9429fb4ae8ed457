// In: src/convert/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Marshalling Layer
// ====================================================================================
//
// `convert` is the only part of the bridge that makes type decisions. It sits
// between the host's dynamic values and Simplace's typed Java object model and is
// written purely against the capability traits in `crate::traits`.
//
// Data Flow (Parameters, host -> Simplace):
//
//   1. [Parameters<O>]          -> name -> serde_json::Value | foreign handle
//         |
//         `-> params::encode_parameters / encode_parameter_lists
//         |
//   2. [EncodedParameters<O>]   -> [(name, IntArray | DoubleArray | BoxedInt | PassThrough)]
//         |
//         `-> crate::jvm builds Object[][] / Object[][][] from it
//
// Data Flow (Results, Simplace -> host):
//
//   1. [ResultTable]            -> aligned names / type tags / raw data handles
//         |
//         `-> result::result_to_list (Result) or result::varmap_to_list (VarMap)
//         |
//   2. [VarTable<Column<O>>]    -> name -> decoded per-step sequence
//      [VarTable<Value<O>>]     -> name -> decoded single value
//
// ====================================================================================
pub mod params;
pub mod result;
pub mod table;

pub use params::{
    encode_parameter_lists, encode_parameters, encode_value, EncodedParameters, EncodedValue,
    ParamValue, Parameters,
};
pub use result::{
    datatypes_of_result, result_to_list, row_window, units_of_result, varmap_to_list, Column,
    DecodeOptions, Series, Value,
};
pub use table::VarTable;
