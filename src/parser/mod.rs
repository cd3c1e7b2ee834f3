//! HTML parsing and step extraction
//!
//! Splits into two concerns: [`style`] decodes the inline positioning of
//! absolutely-positioned fragments, and [`blocks`] reconstructs reading order
//! and filters the fragments down to instructional steps.

pub mod blocks;
pub mod style;

pub use blocks::BlockExtractor;
pub use style::{parse_style, StyleProps};
