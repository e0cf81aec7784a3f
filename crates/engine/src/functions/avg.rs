//! AVG aggregate

use super::Aggregate;
use quarry_value::Value;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Averages numeric inputs. Integer and decimal columns average to a
/// decimal; float columns to a float. Non-numeric inputs are ignored;
/// an empty average is NULL.
#[derive(Default)]
pub struct AvgAccumulator {
    total: Decimal,
    count: u64,
    float_input: bool,
}

impl Aggregate for AvgAccumulator {
    fn add(&mut self, value: &Value) {
        let Some(addend) = value.as_decimal() else {
            return;
        };
        self.total = self.total.saturating_add(addend);
        self.count += 1;
        if matches!(value, Value::Float(_)) {
            self.float_input = true;
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        if self.count == 0 {
            return Value::Null;
        }
        let mean = match self.total.checked_div(Decimal::from(self.count)) {
            Some(mean) => mean,
            None => return Value::Null,
        };
        if self.float_input {
            mean.to_f64().map(Value::Float).unwrap_or(Value::Null)
        } else {
            Value::Decimal(mean)
        }
    }
}
