use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use inventoryflow_build::{BuildError, Feasibility, PartFeasibility};
use inventoryflow_core::{DomainError, ItemId};
use inventoryflow_inventory::{Item, ItemPatch, NewItem};
use inventoryflow_products::{BomEntry, ComponentSpec, PartRef, Product};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub required_per_product: i64,
}

impl From<CreateItemRequest> for NewItem {
    fn from(body: CreateItemRequest) -> Self {
        NewItem::named(body.name, body.category)
            .with_quantity(body.quantity)
            .with_required_per_product(body.required_per_product)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub required_per_product: Option<i64>,
}

impl From<UpdateItemRequest> for ItemPatch {
    fn from(body: UpdateItemRequest) -> Self {
        ItemPatch {
            name: body.name,
            category: body.category,
            quantity: body.quantity,
            required_per_product: body.required_per_product,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPartRequest {
    pub item_id: Option<String>,
    pub item_name: Option<String>,
    pub required: i64,
    pub stock: Option<i64>,
}

impl UpsertPartRequest {
    /// `itemId` wins over `itemName` when both are present.
    pub fn into_spec(self) -> Result<ComponentSpec, DomainError> {
        let part = match (self.item_id, self.item_name) {
            (Some(id), _) => PartRef::Id(id.parse::<ItemId>()?),
            (None, Some(name)) => PartRef::Name(name),
            (None, None) => return Err(DomainError::validation("provide itemId or itemName")),
        };
        Ok(ComponentSpec {
            part,
            required: self.required,
            stock: self.stock,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub quantity: Value,
}

/// Accept a whole number, given as a JSON number or numeric string.
pub fn parse_build_quantity(value: &Value) -> Result<i64, BuildError> {
    let quantity = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match quantity {
        Some(q) if q > 0 => Ok(q),
        _ => Err(BuildError::InvalidQuantity),
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub required_per_product: i64,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name,
            category: item.category,
            quantity: item.quantity,
            required_per_product: item.required_per_product,
            version: item.version,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartEntryResponse {
    pub product_id: String,
    pub item_id: String,
    pub required: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BomEntry> for PartEntryResponse {
    fn from(entry: BomEntry) -> Self {
        Self {
            product_id: entry.product_id.to_string(),
            item_id: entry.item_id.to_string(),
            required: entry.required,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartResponse {
    pub item_id: String,
    pub name: String,
    pub stock: i64,
    pub required: i64,
    pub max_by_this_part: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsResponse {
    pub parts: Vec<PartResponse>,
    pub can_build: i64,
}

impl From<Feasibility> for PartsResponse {
    fn from(f: Feasibility) -> Self {
        Self {
            can_build: f.can_build,
            parts: f
                .details
                .into_iter()
                .map(|p| PartResponse {
                    item_id: p.item_id.to_string(),
                    name: p.name,
                    stock: p.stock,
                    required: p.required,
                    max_by_this_part: p.max_by_this_part,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityDetail {
    pub name: String,
    pub quantity: i64,
    pub required_per_product: i64,
    pub max_by_this_part: i64,
}

impl From<PartFeasibility> for FeasibilityDetail {
    fn from(p: PartFeasibility) -> Self {
        Self {
            name: p.name,
            quantity: p.stock,
            required_per_product: p.required,
            max_by_this_part: p.max_by_this_part,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityResponse {
    pub can_build: i64,
    pub details: Vec<FeasibilityDetail>,
    pub limiting_part: Option<String>,
}

impl From<Feasibility> for FeasibilityResponse {
    fn from(f: Feasibility) -> Self {
        let limiting_part = f.limiting().map(|p| p.name.clone());
        Self {
            can_build: f.can_build,
            details: f.details.into_iter().map(FeasibilityDetail::from).collect(),
            limiting_part,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub message: &'static str,
    pub built: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_quantity_accepts_whole_numbers_only() {
        assert_eq!(parse_build_quantity(&json!(3)), Ok(3));
        assert_eq!(parse_build_quantity(&json!("4")), Ok(4));
        assert_eq!(parse_build_quantity(&json!(2.0)), Ok(2));

        for bad in [json!(0), json!(-1), json!(1.5), json!("x"), json!(null), json!([1])] {
            assert_eq!(parse_build_quantity(&bad), Err(BuildError::InvalidQuantity), "{bad}");
        }
    }

    #[test]
    fn upsert_request_prefers_item_id() {
        let id = ItemId::new();
        let spec = UpsertPartRequest {
            item_id: Some(id.to_string()),
            item_name: Some("ignored".into()),
            required: 2,
            stock: None,
        }
        .into_spec()
        .unwrap();
        assert_eq!(spec.part, PartRef::Id(id));

        let missing = UpsertPartRequest {
            item_id: None,
            item_name: None,
            required: 1,
            stock: None,
        };
        assert!(matches!(missing.into_spec(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn feasibility_serializes_camel_case() {
        let f = inventoryflow_build::calculate_feasibility(&[inventoryflow_build::BomLine::new(
            ItemId::new(),
            "Leg",
            9,
            4,
            1,
        )]);
        let value = serde_json::to_value(FeasibilityResponse::from(f)).unwrap();
        assert_eq!(value["canBuild"], 2);
        assert_eq!(value["limitingPart"], "Leg");
        assert_eq!(value["details"][0]["requiredPerProduct"], 4);
        assert_eq!(value["details"][0]["maxByThisPart"], 2);
    }
}
