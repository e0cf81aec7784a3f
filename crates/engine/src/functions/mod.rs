//! Aggregate function accumulators
//!
//! The fixed set of functions a column reference may be wrapped in:
//! `avg`, `count`, `min`, `max`, `sum`. Each is an accumulator fed one
//! value per row of a group and finalized into a single value. NULL
//! inputs are skipped by every function; an empty input yields NULL for
//! everything except `count`, which yields zero.

mod avg;
mod count;
mod max;
mod min;
mod sum;

use crate::types::query::AggregateKind;
use quarry_value::Value;

pub use avg::AvgAccumulator;
pub use count::CountAccumulator;
pub use max::MaxAccumulator;
pub use min::MinAccumulator;
pub use sum::SumAccumulator;

/// One aggregate in progress.
pub trait Aggregate {
    /// Feeds one row's value into the accumulator.
    fn add(&mut self, value: &Value);

    /// Consumes the accumulator and produces the aggregate value.
    fn finalize(self: Box<Self>) -> Value;
}

/// Creates a fresh accumulator for the given function.
pub fn accumulator(kind: AggregateKind) -> Box<dyn Aggregate> {
    match kind {
        AggregateKind::Avg => Box::new(AvgAccumulator::default()),
        AggregateKind::Count => Box::new(CountAccumulator::default()),
        AggregateKind::Min => Box::new(MinAccumulator::default()),
        AggregateKind::Max => Box::new(MaxAccumulator::default()),
        AggregateKind::Sum => Box::new(SumAccumulator::default()),
    }
}
