//! This module defines the core, strongly-typed data representations shared by
//! the encoder, the decoders and the Arrow export.
//!
//! It currently includes the canonical `SimplaceType` enum which replaces the
//! Engine's string type tags with a closed, exhaustively matched enum.

pub mod simplace_type;

// Re-export the main type(s) for easier access.
pub use simplace_type::SimplaceType;
