//! MIN aggregate

use super::Aggregate;
use quarry_value::Value;
use std::cmp::Ordering;

/// Tracks the smallest non-null input under the value sort order.
#[derive(Default)]
pub struct MinAccumulator {
    smallest: Option<Value>,
}

impl Aggregate for MinAccumulator {
    fn add(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        match &self.smallest {
            Some(current) if value.sort_cmp(current) != Ordering::Less => {}
            _ => self.smallest = Some(value.clone()),
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        self.smallest.unwrap_or(Value::Null)
    }
}
