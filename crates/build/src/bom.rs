use serde::{Deserialize, Serialize};

use inventoryflow_core::ItemId;

/// One BOM entry joined with the current state of its item.
///
/// This is the engine's only input: callers read it from storage and hand it
/// over as a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    pub item_id: ItemId,
    pub name: String,
    pub stock: i64,
    pub required: i64,
    /// Item row version the snapshot was read at.
    pub version: u64,
}

impl BomLine {
    pub fn new(item_id: ItemId, name: impl Into<String>, stock: i64, required: i64, version: u64) -> Self {
        Self {
            item_id,
            name: name.into(),
            stock,
            required,
            version,
        }
    }

    /// Qualifying entries (`required > 0`) are the only ones that constrain a build.
    pub fn is_qualifying(&self) -> bool {
        self.required > 0
    }

    /// Units of the product this line alone allows (`floor(stock / required)`).
    ///
    /// `None` for non-qualifying lines. Negative stock counts as empty.
    pub fn max_units(&self) -> Option<i64> {
        if !self.is_qualifying() {
            return None;
        }
        Some(self.stock.max(0) / self.required)
    }
}
