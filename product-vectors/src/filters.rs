//! Payload filters sent to Qdrant.

use qdrant_client::qdrant::r#match::MatchValue;
use qdrant_client::qdrant::{Condition, FieldCondition, Filter, Match, condition::ConditionOneOf};

/// Payload field holding the product barcode.
pub const CODE_FIELD: &str = "code";

/// Filter rejecting every point whose `code` equals `code`.
pub fn exclude_code(code: &str) -> Filter {
    Filter {
        must_not: vec![Condition {
            condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                key: CODE_FIELD.to_string(),
                r#match: Some(Match {
                    match_value: Some(MatchValue::Keyword(code.to_string())),
                }),
                ..Default::default()
            })),
        }],
        ..Default::default()
    }
}
