//! Name to value projection of a step lineage.

use crate::record::StepRecord;
use indexmap::IndexMap;
use serde_json::Value;

/// Read-only view of every recorded step value, keyed by step name.
///
/// Iteration follows lineage order; lookup is by key.
pub type Bag = IndexMap<String, Value>;

/// Fold records left to right into a [`Bag`]. A later record overwrites an
/// earlier one with the same name.
pub fn project(records: &[StepRecord]) -> Bag {
    records
        .iter()
        .fold(Bag::with_capacity(records.len()), |mut bag, record| {
            bag.insert(record.name.clone(), record.value.clone());
            bag
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_keeps_lineage_order() {
        let records = vec![
            StepRecord::resolved("v0", json!(10)),
            StepRecord::resolved("incremented", json!(11)),
            StepRecord::rejected("v2", json!("error")),
        ];

        let bag = project(&records);
        let names: Vec<&str> = bag.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["v0", "incremented", "v2"]);
        assert_eq!(bag["incremented"], json!(11));
        assert_eq!(bag["v2"], json!("error"));
    }

    #[test]
    fn test_project_later_record_wins() {
        let records = vec![
            StepRecord::resolved("a", json!(1)),
            StepRecord::resolved("a", json!(2)),
        ];

        let bag = project(&records);
        assert_eq!(bag.len(), 1);
        assert_eq!(bag["a"], json!(2));
    }

    #[test]
    fn test_project_empty() {
        assert!(project(&[]).is_empty());
    }
}
