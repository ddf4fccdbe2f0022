//! Shaping catalog records into embeddable documents.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::record::CatalogRecord;

/// Text to embed plus the metadata stored next to the vector.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexDocument {
    pub id: String,
    pub embed_text: String,
    pub metadata: BTreeMap<String, Value>,
}

impl CatalogRecord {
    /// Builds the document indexed for this record.
    ///
    /// eSIMs get a one-line summary (country, data cap, validity, network,
    /// description, starting price); Q&A entries are embedded by question.
    pub fn to_index_document(&self) -> IndexDocument {
        if self.is_esim() {
            esim_document(self)
        } else {
            question_document(self)
        }
    }
}

fn esim_document(r: &CatalogRecord) -> IndexDocument {
    let raw = r.raw.clone().unwrap_or_default();

    let country = raw.country.unwrap_or_else(|| "Unknown country".to_string());
    let name = non_empty(&r.name).unwrap_or("Unnamed product").to_string();
    let data_cap = raw
        .high_flow_size
        .as_deref()
        .and_then(data_cap_gb)
        .unwrap_or_else(|| "Unknown data cap".to_string());
    let validity = raw
        .days
        .as_deref()
        .filter(|d| !is_falsy_number(d))
        .map(|d| format!("{d} days"))
        .unwrap_or_else(|| "Unknown validity".to_string());
    let network = "5G";
    let description = non_empty(&r.description)
        .unwrap_or("No description available")
        .to_string();
    let currency = raw
        .currency_code
        .unwrap_or_else(|| "Unknown currency".to_string());
    let prices = r
        .denominations
        .first()
        .map(|p| format!("Prices start at {p} {currency}"))
        .unwrap_or_default();

    let embed_text = format!(
        "{name}: {country} {data_cap} eSIM for {validity}. Network: {network}. {description}. {prices}"
    );

    let mut metadata = BTreeMap::new();
    metadata.insert("name".into(), json!(name));
    metadata.insert("description".into(), json!(description));
    metadata.insert("country".into(), json!(country));
    metadata.insert("dataCap".into(), json!(data_cap));
    metadata.insert("validity".into(), json!(validity));
    metadata.insert("type".into(), json!(r.kind));
    metadata.insert("id".into(), json!(r.id));

    IndexDocument {
        id: r.id.clone(),
        embed_text,
        metadata,
    }
}

fn question_document(r: &CatalogRecord) -> IndexDocument {
    let question = r.name.clone().unwrap_or_default();

    let mut metadata = BTreeMap::new();
    metadata.insert("name".into(), json!(question));
    metadata.insert("description".into(), json!(r.description.clone().unwrap_or_default()));
    metadata.insert("type".into(), json!(r.kind));
    metadata.insert("id".into(), json!(r.id));
    if let Some(action) = &r.action {
        metadata.insert("action".into(), json!(action));
    }

    IndexDocument {
        id: r.id.clone(),
        embed_text: question,
        metadata,
    }
}

/// `"5120"` (KiB) → `"5GB"`, rounded half up. Leading digits only, like the
/// source exports (`"10240 KB"` → `"10GB"`).
fn data_cap_gb(kib: &str) -> Option<String> {
    let digits: String = kib.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    let kib: u64 = digits.parse().ok()?;
    let gb = (kib as f64 / 1024.0).round() as u64;
    Some(format!("{gb}GB"))
}

fn is_falsy_number(s: &str) -> bool {
    s.parse::<f64>().map(|n| n == 0.0).unwrap_or(false)
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ESIM_KIND, RawAttributes};

    fn esim() -> CatalogRecord {
        CatalogRecord {
            id: "65f0c1aa".into(),
            name: Some("Japan 5GB".into()),
            description: Some("High-speed data".into()),
            kind: ESIM_KIND.into(),
            action: None,
            raw: Some(RawAttributes {
                country: Some("Japan".into()),
                high_flow_size: Some("5120".into()),
                days: Some("7".into()),
                currency_code: Some("USD".into()),
                group_key: Some("JP-5GB".into()),
            }),
            denominations: vec!["4.5".into(), "9".into()],
        }
    }

    #[test]
    fn esim_embed_text_matches_catalog_summary() {
        let doc = esim().to_index_document();
        assert_eq!(
            doc.embed_text,
            "Japan 5GB: Japan 5GB eSIM for 7 days. Network: 5G. High-speed data. Prices start at 4.5 USD"
        );
        assert_eq!(doc.metadata["dataCap"], "5GB");
        assert_eq!(doc.metadata["validity"], "7 days");
        assert_eq!(doc.metadata["type"], "esim");
        assert_eq!(doc.metadata["id"], "65f0c1aa");
    }

    #[test]
    fn esim_defaults_fill_missing_fields() {
        let mut r = esim();
        r.name = None;
        r.description = None;
        r.raw = None;
        r.denominations.clear();

        let doc = r.to_index_document();
        assert_eq!(
            doc.embed_text,
            "Unnamed product: Unknown country Unknown data cap eSIM for Unknown validity. Network: 5G. No description available. "
        );
    }

    #[test]
    fn data_cap_rounds_to_nearest_gb() {
        assert_eq!(data_cap_gb("1536").as_deref(), Some("2GB"));
        assert_eq!(data_cap_gb("1535").as_deref(), Some("1GB"));
        assert_eq!(data_cap_gb("10240 KB").as_deref(), Some("10GB"));
        assert_eq!(data_cap_gb("lots"), None);
    }

    #[test]
    fn question_document_uses_question_as_text() {
        let r = CatalogRecord {
            id: "q-1".into(),
            name: Some("How do I install an eSIM?".into()),
            description: Some("Scan the QR code.".into()),
            kind: "faq".into(),
            action: Some("open_guide".into()),
            raw: None,
            denominations: vec![],
        };
        let doc = r.to_index_document();
        assert_eq!(doc.embed_text, "How do I install an eSIM?");
        assert_eq!(doc.metadata["description"], "Scan the QR code.");
        assert_eq!(doc.metadata["action"], "open_guide");
        assert!(!doc.metadata.contains_key("dataCap"));
    }
}
