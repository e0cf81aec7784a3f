//! MAX aggregate

use super::Aggregate;
use quarry_value::Value;
use std::cmp::Ordering;

/// Tracks the largest non-null input under the value sort order.
#[derive(Default)]
pub struct MaxAccumulator {
    largest: Option<Value>,
}

impl Aggregate for MaxAccumulator {
    fn add(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        match &self.largest {
            Some(current) if value.sort_cmp(current) != Ordering::Greater => {}
            _ => self.largest = Some(value.clone()),
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        self.largest.unwrap_or(Value::Null)
    }
}
