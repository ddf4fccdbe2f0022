//! On-disk JSON shapes and their conversion into [`CatalogRecord`]s.
//!
//! - eSIM export: `[{ "_id": {"$oid": ..}, "name", "description",
//!   "denominations": [..], "rawInfo": {..} }]`
//! - Q&A list: `[{ "id", "question", "answer", "type", "action" }]`
//!
//! Numeric fields show up as numbers or strings depending on the export,
//! so both are accepted and normalized to strings.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::CatalogError;
use crate::record::{CatalogRecord, ESIM_KIND, RawAttributes};

#[derive(Debug, Deserialize)]
struct ObjectId {
    #[serde(rename = "$oid")]
    oid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInfo {
    country_name: Option<String>,
    high_flow_size: Option<Value>,
    days: Option<Value>,
    currency_code: Option<String>,
    product_and_plan_type_group_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EsimSource {
    #[serde(rename = "_id")]
    id: Option<ObjectId>,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    denominations: Vec<Value>,
    raw_info: Option<RawInfo>,
}

#[derive(Debug, Deserialize)]
struct QuestionSource {
    id: Option<Value>,
    question: Option<String>,
    answer: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    action: Option<String>,
}

/// Parses the eSIM export.
pub fn parse_esims(json: &str, origin: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
    let rows: Vec<EsimSource> = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let id = row
                .id
                .map(|o| o.oid)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| CatalogError::MissingId {
                    origin: origin.to_string(),
                    index,
                })?;
            let raw = row.raw_info.map(|r| RawAttributes {
                country: r.country_name,
                high_flow_size: r.high_flow_size.as_ref().and_then(scalar_to_string),
                days: r.days.as_ref().and_then(scalar_to_string),
                currency_code: r.currency_code,
                group_key: r.product_and_plan_type_group_key,
            });
            Ok(CatalogRecord {
                id,
                name: row.name,
                description: row.description,
                kind: ESIM_KIND.to_string(),
                action: None,
                raw,
                denominations: row.denominations.iter().filter_map(scalar_to_string).collect(),
            })
        })
        .collect()
}

/// Parses the Q&A list.
pub fn parse_questions(json: &str, origin: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
    let rows: Vec<QuestionSource> =
        serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            origin: origin.to_string(),
            source,
        })?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let id = row
                .id
                .as_ref()
                .and_then(scalar_to_string)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| CatalogError::MissingId {
                    origin: origin.to_string(),
                    index,
                })?;
            Ok(CatalogRecord {
                id,
                name: row.question,
                description: row.answer,
                kind: row.kind.unwrap_or_else(|| "question".to_string()),
                action: row.action,
                raw: None,
                denominations: Vec::new(),
            })
        })
        .collect()
}

/// Renders a JSON scalar the way it reads: `5120`, `4.5`, `"7"` → `7`.
/// Empty strings, nulls and containers yield `None`.
pub(crate) fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) => Some(f.to_string()),
            (None, None) => Some(n.to_string()),
        },
        _ => None,
    }
}
