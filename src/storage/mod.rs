//! Durable state for the extraction pipeline

pub mod checkpoint;

pub use checkpoint::CheckpointStore;
