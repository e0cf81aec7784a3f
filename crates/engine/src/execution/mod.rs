//! Query execution: joins, aggregation, and result shaping

pub mod join;
pub mod select;

pub use select::execute;
