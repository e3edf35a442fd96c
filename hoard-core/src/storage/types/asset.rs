//! Asset types for storage

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::helper::capitalize_first;
use crate::storage::ids::AssetId;

/// Metal an ornament is made of
///
/// The four known metals are stored as lowercase strings. Any other string
/// found in stored data is kept verbatim as `Other`, so a hand-edited blob
/// still loads and still shows up in the totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metal {
    Gold,
    Silver,
    Diamond,
    Platinum,
    Other(String),
}

impl Metal {
    pub fn as_str(&self) -> &str {
        match self {
            Metal::Gold => "gold",
            Metal::Silver => "silver",
            Metal::Diamond => "diamond",
            Metal::Platinum => "platinum",
            Metal::Other(name) => name,
        }
    }

    /// Display name ("gold" -> "Gold")
    pub fn label(&self) -> String {
        capitalize_first(self.as_str())
    }
}

impl From<String> for Metal {
    fn from(s: String) -> Self {
        match s.as_str() {
            "gold" => Metal::Gold,
            "silver" => Metal::Silver,
            "diamond" => Metal::Diamond,
            "platinum" => Metal::Platinum,
            _ => Metal::Other(s),
        }
    }
}

impl From<Metal> for String {
    fn from(metal: Metal) -> String {
        match metal {
            Metal::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Parses user input; only the known metals are accepted here.
impl FromStr for Metal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gold" => Ok(Metal::Gold),
            "silver" => Ok(Metal::Silver),
            "diamond" => Ok(Metal::Diamond),
            "platinum" => Ok(Metal::Platinum),
            _ => Err(format!("Unknown metal: {}", s)),
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of ornament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrnamentType {
    Bangle,
    Ring,
    Chain,
    Necklace,
    Earrings,
    Bracelet,
    Pendant,
    Anklet,
    Coin,
}

impl OrnamentType {
    pub const ALL: [OrnamentType; 9] = [
        OrnamentType::Bangle,
        OrnamentType::Ring,
        OrnamentType::Chain,
        OrnamentType::Necklace,
        OrnamentType::Earrings,
        OrnamentType::Bracelet,
        OrnamentType::Pendant,
        OrnamentType::Anklet,
        OrnamentType::Coin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrnamentType::Bangle => "bangle",
            OrnamentType::Ring => "ring",
            OrnamentType::Chain => "chain",
            OrnamentType::Necklace => "necklace",
            OrnamentType::Earrings => "earrings",
            OrnamentType::Bracelet => "bracelet",
            OrnamentType::Pendant => "pendant",
            OrnamentType::Anklet => "anklet",
            OrnamentType::Coin => "coin",
        }
    }

    pub fn label(&self) -> String {
        capitalize_first(self.as_str())
    }
}

impl FromStr for OrnamentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        OrnamentType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Unknown ornament type: {}", s))
    }
}

impl fmt::Display for OrnamentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a recorded weight covers one item or the whole group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightType {
    PerItem,
    Total,
}

impl WeightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightType::PerItem => "per_item",
            WeightType::Total => "total",
        }
    }
}

impl FromStr for WeightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per_item" | "per-item" | "each" => Ok(WeightType::PerItem),
            "total" => Ok(WeightType::Total),
            _ => Err(format!("Unknown weight type: {}", s)),
        }
    }
}

impl fmt::Display for WeightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a record was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAsset {
    #[error("Count must be a valid number greater than 0")]
    ZeroCount,

    #[error("Weight must be a valid positive number, got {0}")]
    NonPositiveWeight(f64),
}

fn check_count(count: u64) -> Result<(), InvalidAsset> {
    if count < 1 {
        return Err(InvalidAsset::ZeroCount);
    }
    Ok(())
}

fn check_weight(weight: Option<f64>) -> Result<(), InvalidAsset> {
    match weight {
        Some(w) if !(w.is_finite() && w > 0.0) => Err(InvalidAsset::NonPositiveWeight(w)),
        _ => Ok(()),
    }
}

/// Caller-supplied fields of an asset (input form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInput {
    pub metal: Metal,

    pub ornament_type: OrnamentType,

    /// Number of identical items in this record
    pub count: u64,

    /// Weight in grams; None means not tracked
    #[serde(default)]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_type: Option<WeightType>,
}

impl AssetInput {
    /// Create an input with required fields
    pub fn new(metal: Metal, ornament_type: OrnamentType, count: u64) -> Self {
        Self {
            metal,
            ornament_type,
            count,
            weight: None,
            weight_type: None,
        }
    }

    /// Set the weight in grams
    pub fn with_weight(mut self, grams: f64) -> Self {
        self.weight = Some(grams);
        self
    }

    pub fn with_weight_type(mut self, weight_type: WeightType) -> Self {
        self.weight_type = Some(weight_type);
        self
    }

    /// Check the record invariants: count of at least one, positive weight
    pub fn validate(&self) -> Result<(), InvalidAsset> {
        check_count(self.count)?;
        check_weight(self.weight)
    }
}

/// A stored asset: caller fields plus the id and timestamps the store assigns
///
/// Derefs to [`AssetInput`], so `asset.metal` reads through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,

    #[serde(flatten)]
    pub details: AssetInput,

    pub created_at: DateTime<Utc>,

    /// Unset until the first successful update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn new(id: AssetId, details: AssetInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            created_at,
            updated_at: None,
        }
    }

    /// Weight of the whole record in grams, honouring `weight_type`
    ///
    /// A record without a weight type is read as per-item.
    pub fn total_weight(&self) -> Option<f64> {
        let weight = self.details.weight?;
        match self.details.weight_type {
            Some(WeightType::Total) => Some(weight),
            Some(WeightType::PerItem) | None => Some(weight * self.details.count as f64),
        }
    }
}

impl Deref for Asset {
    type Target = AssetInput;

    fn deref(&self) -> &Self::Target {
        &self.details
    }
}

impl DerefMut for Asset {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.details
    }
}

/// Partial update of an asset
///
/// `None` leaves a field alone. `weight` and `weight_type` are nested so a
/// patch can also clear them: `Some(None)` removes the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPatch {
    pub metal: Option<Metal>,
    pub ornament_type: Option<OrnamentType>,
    pub count: Option<u64>,
    pub weight: Option<Option<f64>>,
    pub weight_type: Option<Option<WeightType>>,
}

impl AssetPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metal(mut self, metal: Metal) -> Self {
        self.metal = Some(metal);
        self
    }

    pub fn ornament_type(mut self, ornament_type: OrnamentType) -> Self {
        self.ornament_type = Some(ornament_type);
        self
    }

    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn weight(mut self, grams: f64) -> Self {
        self.weight = Some(Some(grams));
        self
    }

    pub fn clear_weight(mut self) -> Self {
        self.weight = Some(None);
        self
    }

    pub fn weight_type(mut self, weight_type: WeightType) -> Self {
        self.weight_type = Some(Some(weight_type));
        self
    }

    pub fn clear_weight_type(mut self) -> Self {
        self.weight_type = Some(None);
        self
    }

    /// True if applying the patch would change no field
    pub fn is_empty(&self) -> bool {
        self.metal.is_none()
            && self.ornament_type.is_none()
            && self.count.is_none()
            && self.weight.is_none()
            && self.weight_type.is_none()
    }

    /// Check the fields the patch names against the record invariants
    pub fn validate(&self) -> Result<(), InvalidAsset> {
        if let Some(count) = self.count {
            check_count(count)?;
        }
        if let Some(weight) = self.weight {
            check_weight(weight)?;
        }
        Ok(())
    }

    /// Overwrite the named fields of `target`, keeping the rest
    pub fn apply_to(&self, target: &mut AssetInput) {
        if let Some(metal) = &self.metal {
            target.metal = metal.clone();
        }
        if let Some(ornament_type) = self.ornament_type {
            target.ornament_type = ornament_type;
        }
        if let Some(count) = self.count {
            target.count = count;
        }
        if let Some(weight) = self.weight {
            target.weight = weight;
        }
        if let Some(weight_type) = self.weight_type {
            target.weight_type = weight_type;
        }
    }
}

/// A full edit form: every input field is named, and a missing weight clears
/// the stored one. A missing weight type is left as stored.
impl From<AssetInput> for AssetPatch {
    fn from(input: AssetInput) -> Self {
        Self {
            metal: Some(input.metal),
            ornament_type: Some(input.ornament_type),
            count: Some(input.count),
            weight: Some(input.weight),
            weight_type: input.weight_type.map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Asset {
        Asset::new(
            AssetId::from_string("a1"),
            AssetInput::new(Metal::Gold, OrnamentType::Ring, 2).with_weight(5.0),
            "2024-03-01T10:00:00Z".parse().unwrap(),
        )
    }

    #[test]
    fn test_json_layout() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "a1",
                "metal": "gold",
                "ornamentType": "ring",
                "count": 2,
                "weight": 5.0,
                "createdAt": "2024-03-01T10:00:00Z",
            })
        );
    }

    #[test]
    fn test_missing_weight_serializes_as_null() {
        let mut asset = sample();
        asset.weight = None;
        let value = serde_json::to_value(&asset).unwrap();
        assert_eq!(value["weight"], serde_json::Value::Null);
        assert!(value.get("weightType").is_none());
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn test_reads_record_written_by_older_app() {
        let raw = r#"{
            "id": "1712345678901",
            "metal": "silver",
            "ornamentType": "anklet",
            "count": 3,
            "weight": null,
            "createdAt": "2024-04-05T18:21:18.901Z",
            "updatedAt": "2024-04-06T09:00:00.000Z"
        }"#;
        let asset: Asset = serde_json::from_str(raw).unwrap();
        assert_eq!(asset.id.as_str(), "1712345678901");
        assert_eq!(asset.metal, Metal::Silver);
        assert_eq!(asset.ornament_type, OrnamentType::Anklet);
        assert_eq!(asset.count, 3);
        assert_eq!(asset.weight, None);
        assert!(asset.updated_at.is_some());
    }

    #[test]
    fn test_unknown_metal_is_kept() {
        let raw = r#"{"id":"x","metal":"copper","ornamentType":"coin","count":1,"weight":4,"createdAt":"2024-01-01T00:00:00Z"}"#;
        let asset: Asset = serde_json::from_str(raw).unwrap();
        assert_eq!(asset.metal, Metal::Other("copper".to_string()));
        assert_eq!(asset.weight, Some(4.0));

        let back = serde_json::to_value(&asset).unwrap();
        assert_eq!(back["metal"], "copper");
    }

    #[test]
    fn test_metal_from_str_is_strict() {
        assert_eq!("Gold".parse::<Metal>().unwrap(), Metal::Gold);
        assert!("copper".parse::<Metal>().is_err());
    }

    #[test]
    fn test_ornament_and_weight_type_parsing() {
        assert_eq!("EARRINGS".parse::<OrnamentType>().unwrap(), OrnamentType::Earrings);
        assert!("tiara".parse::<OrnamentType>().is_err());
        assert_eq!("per-item".parse::<WeightType>().unwrap(), WeightType::PerItem);
        assert_eq!(
            serde_json::to_value(WeightType::PerItem).unwrap(),
            json!("per_item")
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(Metal::Platinum.label(), "Platinum");
        assert_eq!(OrnamentType::Necklace.label(), "Necklace");
    }

    #[test]
    fn test_validate() {
        let input = AssetInput::new(Metal::Gold, OrnamentType::Chain, 1);
        assert!(input.validate().is_ok());

        let zero = AssetInput::new(Metal::Gold, OrnamentType::Chain, 0);
        assert_eq!(zero.validate(), Err(InvalidAsset::ZeroCount));

        let negative = input.clone().with_weight(-1.0);
        assert_eq!(negative.validate(), Err(InvalidAsset::NonPositiveWeight(-1.0)));

        assert!(input.clone().with_weight(0.0).validate().is_err());
        assert!(input.with_weight(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_patch_apply_keeps_unnamed_fields() {
        let mut asset = sample();
        AssetPatch::new().count(7).apply_to(&mut asset);
        assert_eq!(asset.count, 7);
        assert_eq!(asset.metal, Metal::Gold);
        assert_eq!(asset.weight, Some(5.0));
    }

    #[test]
    fn test_patch_can_clear_weight() {
        let mut asset = sample();
        AssetPatch::new().clear_weight().apply_to(&mut asset);
        assert_eq!(asset.weight, None);
    }

    #[test]
    fn test_patch_validate() {
        assert!(AssetPatch::new().validate().is_ok());
        assert!(AssetPatch::new().count(0).validate().is_err());
        assert!(AssetPatch::new().weight(0.0).validate().is_err());
        assert!(AssetPatch::new().clear_weight().validate().is_ok());
        assert!(AssetPatch::new().is_empty());
        assert!(!AssetPatch::new().metal(Metal::Silver).is_empty());
    }

    #[test]
    fn test_full_form_patch_leaves_weight_type() {
        let mut asset = sample();
        asset.weight_type = Some(WeightType::Total);

        let form = AssetInput::new(Metal::Silver, OrnamentType::Ring, 4);
        AssetPatch::from(form).apply_to(&mut asset);

        assert_eq!(asset.metal, Metal::Silver);
        assert_eq!(asset.count, 4);
        assert_eq!(asset.weight, None);
        assert_eq!(asset.weight_type, Some(WeightType::Total));
    }

    #[test]
    fn test_total_weight() {
        let mut asset = sample();
        assert_eq!(asset.total_weight(), Some(10.0));

        asset.weight_type = Some(WeightType::Total);
        assert_eq!(asset.total_weight(), Some(5.0));

        asset.weight = None;
        assert_eq!(asset.total_weight(), None);
    }
}
