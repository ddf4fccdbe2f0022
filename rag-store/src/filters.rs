//! Filter construction for Qdrant searches.
//!
//! Namespaces are stored as a keyword payload field, so every query carries
//! a `must` condition on that field.

use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, condition::ConditionOneOf, r#match::MatchValue,
};
use tracing::debug;

/// Payload key holding the namespace of a point.
pub const NAMESPACE_KEY: &str = "namespace";

/// Builds a filter that restricts results to one namespace.
pub fn namespace_filter(namespace: &str) -> Filter {
    debug!(namespace, "filters::namespace_filter");
    Filter {
        must: vec![keyword_condition(NAMESPACE_KEY, namespace)],
        ..Default::default()
    }
}

fn keyword_condition(field: &str, value: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: field.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(value.to_string())),
            }),
            ..Default::default()
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_filter_is_a_single_must_keyword() {
        let f = namespace_filter("product-namespace");
        assert!(f.should.is_empty());
        assert_eq!(f.must.len(), 1);

        let Some(ConditionOneOf::Field(fc)) = &f.must[0].condition_one_of else {
            panic!("expected field condition");
        };
        assert_eq!(fc.key, NAMESPACE_KEY);
        assert_eq!(
            fc.r#match.as_ref().and_then(|m| m.match_value.clone()),
            Some(MatchValue::Keyword("product-namespace".into()))
        );
    }
}
