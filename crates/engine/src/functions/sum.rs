//! SUM aggregate

use super::Aggregate;
use quarry_value::Value;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Sums numeric inputs. The output keeps the input tag: integer columns
/// sum to an integer (widening to decimal on overflow), float columns to
/// a float, decimal columns to a decimal. Non-numeric inputs are
/// ignored; an empty sum is NULL.
#[derive(Default)]
pub struct SumAccumulator {
    total: Decimal,
    seen: Option<Tag>,
}

#[derive(Clone, Copy, PartialEq)]
enum Tag {
    Integer,
    Float,
    Decimal,
}

impl Aggregate for SumAccumulator {
    fn add(&mut self, value: &Value) {
        let Some(addend) = value.as_decimal() else {
            return;
        };
        self.total = self.total.saturating_add(addend);
        if self.seen.is_none() {
            self.seen = Some(match value {
                Value::Integer(_) => Tag::Integer,
                Value::Float(_) => Tag::Float,
                _ => Tag::Decimal,
            });
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        match self.seen {
            None => Value::Null,
            Some(Tag::Integer) => self
                .total
                .to_i64()
                .map(Value::Integer)
                .unwrap_or(Value::Decimal(self.total)),
            Some(Tag::Float) => self
                .total
                .to_f64()
                .map(Value::Float)
                .unwrap_or(Value::Decimal(self.total)),
            Some(Tag::Decimal) => Value::Decimal(self.total),
        }
    }
}
