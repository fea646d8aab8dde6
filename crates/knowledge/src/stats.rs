//! Aggregate answers computed directly from knowledge-base records.

use crate::types::KnowledgeRecord;
use serde_json::{Number, Value};

/// Keywords that mark a statistical question, in matching priority order.
pub const STATISTICAL_KEYWORDS: [&str; 10] = [
    "total", "sum", "average", "mean", "maximum", "max", "minimum", "min", "count", "how many",
];

/// Aggregate requested by a statistical question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Average,
    Max,
    Min,
    Count,
}

impl Aggregate {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "total" | "sum" => Some(Self::Sum),
            "average" | "mean" => Some(Self::Average),
            "maximum" | "max" => Some(Self::Max),
            "minimum" | "min" => Some(Self::Min),
            "count" | "how many" => Some(Self::Count),
            _ => None,
        }
    }

    /// Aggregate named by the first matching keyword in the question.
    pub fn detect(question: &str) -> Option<Self> {
        let lower = question.to_lowercase();
        STATISTICAL_KEYWORDS
            .iter()
            .find(|keyword| lower.contains(*keyword))
            .and_then(|keyword| Self::from_keyword(keyword))
    }
}

/// Answer a statistical question from the numeric fields of `records`.
///
/// Returns `None` when the question has no statistical keyword or the
/// records carry no numeric field, so the caller can fall through.
pub fn answer_statistical(question: &str, records: &[KnowledgeRecord]) -> Option<String> {
    let aggregate = Aggregate::detect(question)?;

    let numbers: Vec<&Number> = records
        .iter()
        .flat_map(|record| record.fields().values())
        .filter_map(|value| match value {
            Value::Number(n) => Some(n),
            _ => None,
        })
        .collect();

    if numbers.is_empty() {
        tracing::debug!("No numeric fields for {:?} question", aggregate);
        return None;
    }

    let answer = match aggregate {
        Aggregate::Sum => format!("The total is {}.", format_sum(&numbers)),
        Aggregate::Average => {
            let sum: f64 = numbers.iter().filter_map(|n| n.as_f64()).sum();
            format!("The average is {:.2}.", sum / numbers.len() as f64)
        }
        Aggregate::Max => format!(
            "The maximum value is {}.",
            format_number(extreme(&numbers, |a, b| a > b))
        ),
        Aggregate::Min => format!(
            "The minimum value is {}.",
            format_number(extreme(&numbers, |a, b| a < b))
        ),
        Aggregate::Count => format!("There are {} records in total.", records.len()),
    };

    Some(answer)
}

fn is_integer(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}

/// First number that no later number beats under `better`.
fn extreme<'a>(numbers: &[&'a Number], better: impl Fn(f64, f64) -> bool) -> &'a Number {
    let mut best = numbers[0];
    for &n in &numbers[1..] {
        if better(to_f64(n), to_f64(best)) {
            best = n;
        }
    }
    best
}

fn to_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

/// Integer sums stay integral; any fractional input makes the sum a float.
fn format_sum(numbers: &[&Number]) -> String {
    if numbers.iter().all(|n| is_integer(n)) {
        let total: i128 = numbers
            .iter()
            .map(|n| {
                n.as_i64()
                    .map(i128::from)
                    .or_else(|| n.as_u64().map(i128::from))
                    .unwrap_or_default()
            })
            .sum();
        total.to_string()
    } else {
        format_float(numbers.iter().map(|n| to_f64(n)).sum())
    }
}

fn format_number(n: &Number) -> String {
    if is_integer(n) {
        n.to_string()
    } else {
        format_float(to_f64(n))
    }
}

/// Shortest round-trip form, keeping a trailing `.0` on whole values.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
