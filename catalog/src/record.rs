//! Catalog record model.

use serde::Serialize;

/// Type tag of eSIM product records.
pub const ESIM_KIND: &str = "esim";

/// Provider-side attributes of an eSIM product.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttributes {
    pub country: Option<String>,
    /// Data allowance in KiB, kept as the source renders it.
    pub high_flow_size: Option<String>,
    pub days: Option<String>,
    pub currency_code: Option<String>,
    /// Group key the client uses to open the product page.
    pub group_key: Option<String>,
}

/// One immutable catalog entry: an eSIM product or a Q&A pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub action: Option<String>,
    pub raw: Option<RawAttributes>,
    /// Price points, rendered as in the source (eSIM only).
    pub denominations: Vec<String>,
}

impl CatalogRecord {
    pub fn is_esim(&self) -> bool {
        self.kind == ESIM_KIND
    }

    /// Group key for the client, `None` for records without one.
    pub fn group_key(&self) -> Option<&str> {
        self.raw.as_ref().and_then(|r| r.group_key.as_deref())
    }
}
