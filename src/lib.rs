//! This file is the root of the `simplace` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`convert`, `jvm`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the types a host application works with, so that
//!     `use simplace::*` is enough to open a project and read its results.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod convert;
pub mod error;
pub mod frame;
pub mod install;
pub mod jvm;
pub mod observability;
pub mod session;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use config::{
    CheckLevel, EngineLogLevel, InitSetting, RuntimeOptions, SessionDirs, SimplaceConfig,
};
pub use convert::{
    datatypes_of_result, encode_parameter_lists, encode_parameters, result_to_list,
    units_of_result, varmap_to_list, Column, DecodeOptions, ParamValue, Parameters, Series,
    Value, VarTable,
};
pub use error::{Result, SimplaceError};
pub use frame::columns_to_record_batch;
pub use install::{build_classpath, find_first_installation, find_installations, InstallationSearch};
pub use jvm::{JavaObject, JavaSession, JvmRuntime};
pub use observability::enable_verbose_logging;
pub use session::{ProjectLines, Simplace, SimplaceDirectories, SimplaceResult, SimplaceVarmap};
pub use traits::{EngineSession, ForeignObject, ResultTable};
pub use types::SimplaceType;
