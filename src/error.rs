// In: src/error.rs

//! This module defines the single, unified error type for the entire simplace bridge.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Failures that originate on the Java side are passed through as they are; the
//! bridge never retries or reinterprets them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimplaceError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to the bridge's logic)
    // =========================================================================
    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Parameter '{name}' cannot be passed to Simplace: {reason}")]
    UnsupportedParameter { name: String, reason: String },

    #[error("Parameter '{name}' holds {value}, which does not fit into a Java int")]
    ParameterOutOfRange { name: String, value: String },

    #[error("The Java virtual machine has already been started in this process")]
    RuntimeAlreadyStarted,

    #[error("Could not detect a Simplace installation")]
    InstallationNotFound,

    #[error("Invalid {kind} '{value}'")]
    InvalidLevel { kind: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The Engine answered, but not with what the bridge can work with.
    #[error("Simplace returned an unexpected value: {0}")]
    Foreign(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// A failed JNI call, including pending Java exceptions.
    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),

    /// The JVM rejected an attach/detach or similar low-level request.
    #[error("JVM error: {0}")]
    Jvm(#[from] jni::JvmError),

    /// The JVM could not be started (missing libjvm, bad options, ...).
    #[error("Could not start the JVM: {0}")]
    StartJvm(#[from] jni::errors::StartJvmError),

    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the directory walker used for classpath discovery.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// An error from the Serde JSON library, typically while loading a config file.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T, E = SimplaceError> = std::result::Result<T, E>;
