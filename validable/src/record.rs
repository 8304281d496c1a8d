//! Step records and the lineage they form.
//!
//! Every executed step, including the lift of the starting value, leaves one
//! immutable [`StepRecord`]. A [`Sequence`] is the ordered, append-only list
//! of those records; its last record carries the current value and status.

use crate::bag::{self, Bag};
use crate::constants::{DEFAULT_STEP_PREFIX, INITIAL_STEP_NAME};
use serde::Serialize;
use serde_json::Value;

/// How a step settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Resolved,
    Rejected,
}

/// One executed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub value: Value,
    pub outcome: Outcome,
}

impl StepRecord {
    pub fn resolved(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            outcome: Outcome::Resolved,
        }
    }

    pub fn rejected(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            outcome: Outcome::Rejected,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome == Outcome::Resolved
    }
}

/// Ordered lineage of a pipeline, oldest record first.
///
/// Never empty: the only constructors are [`Sequence::initial`] and
/// [`Sequence::append`]. The engine checks names before running a step, so a
/// duplicate name only ever appears on the rejected record that reports
/// the collision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sequence {
    records: Vec<StepRecord>,
}

impl Sequence {
    /// One-record sequence holding the starting value under the reserved name.
    pub fn initial(value: Value, outcome: Outcome) -> Self {
        Self {
            records: vec![StepRecord {
                name: INITIAL_STEP_NAME.to_string(),
                value,
                outcome,
            }],
        }
    }

    /// New sequence equal to `self` with `record` appended.
    pub fn append(&self, record: StepRecord) -> Self {
        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.extend_from_slice(&self.records);
        records.push(record);
        Self { records }
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    /// Value of the last record.
    pub fn last_value(&self) -> Value {
        self.last()
            .map(|record| record.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Whether the last record resolved.
    pub fn is_valid(&self) -> bool {
        self.last().is_some_and(StepRecord::is_resolved)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|record| record.name == name)
    }

    /// Name a step receives when applied without an explicit one.
    pub fn next_default_name(&self) -> String {
        format!("{}{}", DEFAULT_STEP_PREFIX, self.records.len())
    }

    pub fn get(&self, name: &str) -> Option<&StepRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn bag(&self) -> Bag {
        bag::project(&self.records)
    }
}

/// Settled state of a pipeline: the lineage on the success (`Ok`) or the
/// failure (`Err`) channel.
pub type Settlement = Result<Sequence, Sequence>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_uses_reserved_name() {
        let seq = Sequence::initial(json!(10), Outcome::Resolved);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.records()[0].name, INITIAL_STEP_NAME);
        assert_eq!(seq.last_value(), json!(10));
        assert!(seq.is_valid());
    }

    #[test]
    fn test_default_name_follows_length() {
        let seq = Sequence::initial(json!(1), Outcome::Resolved);
        assert_eq!(seq.next_default_name(), "v1");

        let seq = seq.append(StepRecord::resolved("named", json!(2)));
        assert_eq!(seq.next_default_name(), "v2");
    }

    #[test]
    fn test_append_leaves_source_untouched() {
        let seq = Sequence::initial(json!(1), Outcome::Resolved);
        let next = seq.append(StepRecord::rejected("v1", json!("boom")));

        assert_eq!(seq.len(), 1);
        assert_eq!(next.len(), 2);
        assert!(!next.is_valid());
        assert!(next.contains("v1"));
        assert!(!seq.contains("v1"));
    }

    #[test]
    fn test_serializes_as_record_list() {
        let seq = Sequence::initial(json!("x"), Outcome::Rejected);
        assert_eq!(
            serde_json::to_value(&seq).unwrap(),
            json!([{ "name": "v0", "value": "x", "outcome": "rejected" }])
        );
    }
}
