use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Query shape for `Gateway::query`: field equality, case-insensitive
/// substring match (any-of across the listed fields), and ordering by a
/// single field. Equality terms are conjunctive; substring terms match when
/// any of them hits.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    eq: Vec<(&'static str, Value)>,
    contains_any: Vec<(&'static str, String)>,
    order: Option<(&'static str, Order)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &'static str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.eq.push((field, value));
        self
    }

    pub fn contains(mut self, field: &'static str, needle: impl Into<String>) -> Self {
        self.contains_any.push((field, needle.into().to_lowercase()));
        self
    }

    pub fn order_by(mut self, field: &'static str, order: Order) -> Self {
        self.order = Some((field, order));
        self
    }

    pub(crate) fn matches(&self, record: &Value) -> bool {
        for (field, expected) in &self.eq {
            if record.get(field) != Some(expected) {
                return false;
            }
        }

        if !self.contains_any.is_empty() {
            let hit = self.contains_any.iter().any(|(field, needle)| {
                record
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(needle))
            });
            if !hit {
                return false;
            }
        }

        true
    }

    pub(crate) fn sort(&self, rows: &mut [Value]) {
        let Some((field, order)) = self.order else {
            return;
        };
        rows.sort_by(|a, b| {
            let ordering = cmp_fields(a.get(field), b.get(field));
            match order {
                Order::Asc => ordering,
                Order::Desc => ordering.reverse(),
            }
        });
    }
}

fn cmp_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
