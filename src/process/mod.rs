//! File processing pipeline.
//!
//! Orchestrates the format-one-input flow:
//!
//! - Read the whole input and parse it into a document, recovering from
//!   comma mistakes with warnings and rejecting anything else
//! - Compute the block layouts and render the document
//!
//! The main entry point is [`format_file`] which processes a buffered reader
//! and writes formatted output to any `Write` implementation.

pub mod backup;
pub mod pipeline;

pub use backup::write_backup;
pub use pipeline::format_file;
