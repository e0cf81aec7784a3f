//! COUNT aggregate

use super::Aggregate;
use quarry_value::Value;

/// Counts non-null inputs.
#[derive(Default)]
pub struct CountAccumulator {
    count: i64,
}

impl Aggregate for CountAccumulator {
    fn add(&mut self, value: &Value) {
        if !value.is_null() {
            self.count += 1;
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        Value::Integer(self.count)
    }
}
