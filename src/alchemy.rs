//! Alchemy Catalogue
//! Mission: Fixed list of potions and bombs, filtered by kind and toxicity cap

use crate::store::StoreError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlchemyItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub toxicity: u32,
}

impl AlchemyItem {
    fn new(name: &str, kind: &str, toxicity: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            toxicity,
        }
    }
}

pub fn alchemy_items() -> Vec<AlchemyItem> {
    vec![
        AlchemyItem::new("Black Blood", "potion", 10),
        AlchemyItem::new("Golden Oriole", "potion", 15),
        AlchemyItem::new("Grapeshot", "bomb", 5),
        AlchemyItem::new("Yrden Charge", "bomb", 8),
    ]
}

/// Names of items of exactly `kind` whose toxicity is at most `max_toxicity`,
/// in catalogue order.
pub fn filter_items(items: &[AlchemyItem], kind: &str, max_toxicity: i64) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.kind == kind && i64::from(item.toxicity) <= max_toxicity)
        .map(|item| item.name.clone())
        .collect()
}

/// Validate raw query values. Both are required and toxicity must be an integer.
pub fn parse_filter(
    kind: Option<&str>,
    toxicity: Option<&str>,
) -> Result<(String, i64), StoreError> {
    let missing = || StoreError::Validation("parameters 'type' and 'toxicity' are required".to_string());

    let kind = kind.filter(|k| !k.is_empty()).ok_or_else(missing)?;
    let toxicity = toxicity
        .and_then(|t| t.trim().parse::<i64>().ok())
        .ok_or_else(missing)?;

    Ok((kind.to_string(), toxicity))
}
