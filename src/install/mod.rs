//! Locating a Simplace installation and building its classpath.
//!
//! Pure filesystem probing: nothing here talks to the JVM.

pub mod classpath;
pub mod resolver;

pub use classpath::{build_classpath, find_jars, join_classpath};
pub use resolver::{find_first_installation, find_installations, InstallationSearch};
