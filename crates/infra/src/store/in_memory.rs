use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use inventoryflow_build::{BomLine, BuildPlan, plan_build};
use inventoryflow_core::{DomainError, Entity, ItemId, OwnerId, ProductId};
use inventoryflow_inventory::{DEFAULT_CATEGORY, Item, ItemPatch, NewItem};
use inventoryflow_products::{BomEntry, ComponentSpec, NewProduct, PartRef, Product};

use super::r#trait::{BuildReceipt, InventoryStore, StoreError, ensure_positive_quantity};

#[derive(Debug, Default)]
struct State {
    items: HashMap<ItemId, Item>,
    products: HashMap<ProductId, Product>,
    /// Entries per product, in the order they were first added.
    components: HashMap<ProductId, Vec<BomEntry>>,
}

/// In-memory inventory store.
///
/// Intended for tests/dev. A single lock guards every table, and a build
/// commit holds the write lock across re-read, plan and apply, so commits are
/// serialized and never observe each other's partial state.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))
    }
}

/// Rows of another owner are reported exactly like missing rows.
fn owned<R>(row: Option<R>, owner: OwnerId, what: &'static str) -> Result<R, StoreError>
where
    R: Deref,
    R::Target: Entity,
{
    row.filter(|r| r.owner_id() == owner)
        .ok_or(StoreError::NotFound(what))
}

impl State {
    fn item(&self, owner: OwnerId, id: ItemId) -> Result<&Item, StoreError> {
        owned(self.items.get(&id), owner, "item")
    }

    fn item_mut(&mut self, owner: OwnerId, id: ItemId) -> Result<&mut Item, StoreError> {
        owned(self.items.get_mut(&id), owner, "item")
    }

    fn product(&self, owner: OwnerId, id: ProductId) -> Result<&Product, StoreError> {
        owned(self.products.get(&id), owner, "product")
    }

    /// Oldest item with exactly this name.
    fn item_named(&self, owner: OwnerId, name: &str) -> Option<ItemId> {
        self.items
            .values()
            .filter(|i| i.owner_id == owner && i.name == name)
            .min_by_key(|i| (i.created_at, i.id))
            .map(|i| i.id)
    }

    fn bom_lines(&self, owner: OwnerId, product_id: ProductId) -> Result<Vec<BomLine>, StoreError> {
        self.product(owner, product_id)?;

        let entries = match self.components.get(&product_id) {
            Some(entries) => entries,
            None => return Ok(vec![]),
        };

        Ok(entries
            .iter()
            .filter_map(|entry| {
                let item = self.item(owner, entry.item_id).ok()?;
                Some(BomLine::new(
                    item.id,
                    item.name.clone(),
                    item.quantity,
                    entry.required,
                    item.version,
                ))
            })
            .collect())
    }

    /// Apply every decrement of `plan` or none of them.
    ///
    /// Items are staged on copies first; the live table is only written once
    /// every withdrawal has been accepted.
    fn apply_plan(&mut self, owner: OwnerId, plan: &BuildPlan, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut staged = Vec::with_capacity(plan.decrements.len());
        for decrement in &plan.decrements {
            let mut item = self.item(owner, decrement.item_id)?.clone();
            item.withdraw(decrement.amount(), decrement.expected(), now)
                .map_err(|e| match e {
                    DomainError::Conflict(msg) => StoreError::Conflict(msg),
                    other => StoreError::Domain(other),
                })?;
            staged.push(item);
        }

        for item in staged {
            self.items.insert(item.id, item);
        }
        Ok(())
    }
}

fn newest_first<T, K: Ord>(rows: &mut [T], key: impl Fn(&T) -> K) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn create_item(&self, owner: OwnerId, item: NewItem) -> Result<Item, StoreError> {
        let item = item.into_item(ItemId::new(), owner, Utc::now())?;
        self.write()?.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn list_items(&self, owner: OwnerId) -> Result<Vec<Item>, StoreError> {
        let state = self.read()?;
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|i| i.owner_id == owner)
            .cloned()
            .collect();
        newest_first(&mut items, |i| (i.created_at, i.id));
        Ok(items)
    }

    async fn get_item(&self, owner: OwnerId, id: ItemId) -> Result<Item, StoreError> {
        Ok(self.read()?.item(owner, id)?.clone())
    }

    async fn update_item(&self, owner: OwnerId, id: ItemId, patch: ItemPatch) -> Result<Item, StoreError> {
        let mut state = self.write()?;
        let item = state.item_mut(owner, id)?;
        patch.apply(item, Utc::now())?;
        Ok(item.clone())
    }

    async fn delete_item(&self, owner: OwnerId, id: ItemId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.item(owner, id)?;
        state.items.remove(&id);
        for entries in state.components.values_mut() {
            entries.retain(|e| e.item_id != id);
        }
        Ok(())
    }

    async fn load_required_items(&self, owner: OwnerId) -> Result<Vec<BomLine>, StoreError> {
        let state = self.read()?;
        let mut items: Vec<&Item> = state
            .items
            .values()
            .filter(|i| i.owner_id == owner && i.required_per_product > 0)
            .collect();
        items.sort_by_key(|i| (i.created_at, i.id));

        Ok(items
            .into_iter()
            .map(|i| BomLine::new(i.id, i.name.clone(), i.quantity, i.required_per_product, i.version))
            .collect())
    }

    async fn create_product(&self, owner: OwnerId, product: NewProduct) -> Result<Product, StoreError> {
        let product = product.into_product(ProductId::new(), owner, Utc::now())?;

        let mut state = self.write()?;
        let duplicate = state
            .products
            .values()
            .any(|p| p.owner_id == owner && p.name == product.name);
        if duplicate {
            return Err(StoreError::conflict("product already exists"));
        }
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn list_products(&self, owner: OwnerId) -> Result<Vec<Product>, StoreError> {
        let state = self.read()?;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.owner_id == owner)
            .cloned()
            .collect();
        newest_first(&mut products, |p| (p.created_at, p.id));
        Ok(products)
    }

    async fn get_product(&self, owner: OwnerId, id: ProductId) -> Result<Product, StoreError> {
        Ok(self.read()?.product(owner, id)?.clone())
    }

    async fn upsert_component(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        spec: ComponentSpec,
    ) -> Result<BomEntry, StoreError> {
        let spec = spec.validated()?;
        let now = Utc::now();

        let mut guard = self.write()?;
        let state = &mut *guard;
        state.product(owner, product_id)?;

        let existing = match &spec.part {
            PartRef::Id(id) => Some(state.item(owner, *id)?.id),
            PartRef::Name(name) => state.item_named(owner, name),
        };

        let item_id = match (existing, &spec.part) {
            (Some(id), _) => {
                if let Some(stock) = spec.stock {
                    state.item_mut(owner, id)?.set_stock(stock, now)?;
                }
                id
            }
            (None, PartRef::Name(name)) => {
                let item = NewItem::named(name.clone(), DEFAULT_CATEGORY)
                    .with_quantity(spec.stock.unwrap_or(0))
                    .into_item(ItemId::new(), owner, now)?;
                let id = item.id;
                state.items.insert(id, item);
                id
            }
            (None, PartRef::Id(_)) => return Err(StoreError::NotFound("item")),
        };

        let entries = state.components.entry(product_id).or_default();
        match entries.iter_mut().find(|e| e.item_id == item_id) {
            Some(entry) => {
                entry.set_required(spec.required, now)?;
                Ok(entry.clone())
            }
            None => {
                let entry = BomEntry::new(product_id, item_id, spec.required, now)?;
                entries.push(entry.clone());
                Ok(entry)
            }
        }
    }

    async fn remove_component(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        item_id: ItemId,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.product(owner, product_id)?;

        let entries = state
            .components
            .get_mut(&product_id)
            .ok_or(StoreError::NotFound("component"))?;
        let idx = entries
            .iter()
            .position(|e| e.item_id == item_id)
            .ok_or(StoreError::NotFound("component"))?;
        entries.remove(idx);
        Ok(())
    }

    async fn load_bom(&self, owner: OwnerId, product_id: ProductId) -> Result<Vec<BomLine>, StoreError> {
        self.read()?.bom_lines(owner, product_id)
    }

    async fn commit_build(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<BuildReceipt, StoreError> {
        ensure_positive_quantity(quantity)?;

        let mut state = self.write()?;
        let bom = state.bom_lines(owner, product_id)?;
        let plan = plan_build(&bom, quantity)?;
        state.apply_plan(owner, &plan, Utc::now())?;

        tracing::debug!(%product_id, quantity, items = plan.decrements.len(), "build committed");

        Ok(BuildReceipt {
            product_id,
            built: plan.quantity,
            decrements: plan.decrements,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use inventoryflow_build::BuildError;

    use super::*;

    async fn seed_item(store: &InMemoryInventoryStore, owner: OwnerId, name: &str, qty: i64) -> Item {
        store
            .create_item(owner, NewItem::named(name, "Parts").with_quantity(qty))
            .await
            .unwrap()
    }

    async fn link(store: &InMemoryInventoryStore, owner: OwnerId, product: ProductId, item: ItemId, required: i64) {
        store
            .upsert_component(
                owner,
                product,
                ComponentSpec {
                    part: PartRef::Id(item),
                    required,
                    stock: None,
                },
            )
            .await
            .unwrap();
    }

    /// Product with A (required 2, stock 10) and B (required 3, stock 9).
    async fn two_part_product(store: &InMemoryInventoryStore, owner: OwnerId) -> (ProductId, ItemId, ItemId) {
        let product = store
            .create_product(owner, NewProduct::named("Widget"))
            .await
            .unwrap();
        let a = seed_item(store, owner, "A", 10).await;
        let b = seed_item(store, owner, "B", 9).await;
        link(store, owner, product.id, a.id, 2).await;
        link(store, owner, product.id, b.id, 3).await;
        (product.id, a.id, b.id)
    }

    #[tokio::test]
    async fn can_build_uses_live_stock() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let (product, _, _) = two_part_product(&store, owner).await;

        let feasibility = store.can_build(owner, product).await.unwrap();
        assert_eq!(feasibility.can_build, 3);
        assert_eq!(feasibility.details.len(), 2);
        assert_eq!(feasibility.limiting().map(|p| p.name.as_str()), Some("B"));
    }

    #[tokio::test]
    async fn commit_deducts_and_rejects_overdraw() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let (product, a, b) = two_part_product(&store, owner).await;

        let receipt = store.commit_build(owner, product, 3).await.unwrap();
        assert_eq!(receipt.built, 3);
        assert_eq!(store.get_item(owner, a).await.unwrap().quantity, 4);
        assert_eq!(store.get_item(owner, b).await.unwrap().quantity, 0);

        let err = store.commit_build(owner, product, 1).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Build(BuildError::InsufficientStock {
                can_build: 0,
                requested: 1
            })
        );
        assert_eq!(store.get_item(owner, a).await.unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn rejected_commit_leaves_stock_unchanged() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let (product, a, b) = two_part_product(&store, owner).await;

        let err = store.commit_build(owner, product, 4).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Build(BuildError::InsufficientStock {
                can_build: 3,
                requested: 4
            })
        );

        let a = store.get_item(owner, a).await.unwrap();
        let b = store.get_item(owner, b).await.unwrap();
        assert_eq!((a.quantity, a.version), (10, 1));
        assert_eq!((b.quantity, b.version), (9, 1));
    }

    #[tokio::test]
    async fn empty_bom_cannot_be_built() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let product = store.create_product(owner, NewProduct::named("Empty")).await.unwrap();

        let feasibility = store.can_build(owner, product.id).await.unwrap();
        assert_eq!(feasibility.can_build, 0);
        assert!(feasibility.details.is_empty());

        let err = store.commit_build(owner, product.id, 1).await.unwrap_err();
        assert_eq!(err, StoreError::Build(BuildError::EmptyBom));
    }

    #[tokio::test]
    async fn zero_required_parts_are_untouched_by_builds() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let product = store.create_product(owner, NewProduct::named("Kit")).await.unwrap();
        let frame = seed_item(&store, owner, "Frame", 5).await;
        let manual = seed_item(&store, owner, "Manual", 1).await;
        link(&store, owner, product.id, frame.id, 1).await;
        link(&store, owner, product.id, manual.id, 0).await;

        store.commit_build(owner, product.id, 5).await.unwrap();
        assert_eq!(store.get_item(owner, frame.id).await.unwrap().quantity, 0);
        let manual = store.get_item(owner, manual.id).await.unwrap();
        assert_eq!((manual.quantity, manual.version), (1, 1));
    }

    #[tokio::test]
    async fn invalid_quantity_is_rejected_before_lookup() {
        let store = InMemoryInventoryStore::new();
        let err = store
            .commit_build(OwnerId::new(), ProductId::new(), 0)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Build(BuildError::InvalidQuantity));
    }

    #[tokio::test]
    async fn stale_plan_rolls_back_every_item() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let (product, a, b) = two_part_product(&store, owner).await;

        let bom = store.load_bom(owner, product).await.unwrap();
        let plan = plan_build(&bom, 2).unwrap();

        // B changes after the snapshot was taken.
        store
            .update_item(owner, b, ItemPatch { quantity: Some(9), ..ItemPatch::default() })
            .await
            .unwrap();

        let err = store
            .write()
            .unwrap()
            .apply_plan(owner, &plan, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // A was staged before B failed, but nothing was written.
        let a = store.get_item(owner, a).await.unwrap();
        assert_eq!((a.quantity, a.version), (10, 1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_builds_never_overdraw() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let owner = OwnerId::new();
        let product = store.create_product(owner, NewProduct::named("Chair")).await.unwrap();
        let leg = seed_item(&store, owner, "Leg", 28).await;
        let seat = seed_item(&store, owner, "Seat", 10).await;
        link(&store, owner, product.id, leg.id, 4).await;
        link(&store, owner, product.id, seat.id, 1).await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.commit_build(owner, product.id, 1).await
            }));
        }

        let mut built = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(receipt) => built += receipt.built,
                Err(StoreError::Build(BuildError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(built, 7);
        assert_eq!(store.get_item(owner, leg.id).await.unwrap().quantity, 0);
        assert_eq!(store.get_item(owner, seat.id).await.unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn upsert_by_name_creates_missing_item() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let product = store.create_product(owner, NewProduct::named("Bike")).await.unwrap();

        let entry = store
            .upsert_component(
                owner,
                product.id,
                ComponentSpec {
                    part: PartRef::Name(" Wheel ".to_string()),
                    required: 2,
                    stock: Some(6),
                },
            )
            .await
            .unwrap();

        let wheel = store.get_item(owner, entry.item_id).await.unwrap();
        assert_eq!(wheel.name, "Wheel");
        assert_eq!(wheel.category, DEFAULT_CATEGORY);
        assert_eq!(wheel.quantity, 6);
        assert_eq!(store.can_build(owner, product.id).await.unwrap().can_build, 3);
    }

    #[tokio::test]
    async fn upsert_by_name_reuses_item_and_overwrites_stock() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let product = store.create_product(owner, NewProduct::named("Bike")).await.unwrap();
        let wheel = seed_item(&store, owner, "Wheel", 1).await;

        let entry = store
            .upsert_component(
                owner,
                product.id,
                ComponentSpec {
                    part: PartRef::Name("Wheel".to_string()),
                    required: 2,
                    stock: Some(8),
                },
            )
            .await
            .unwrap();

        assert_eq!(entry.item_id, wheel.id);
        assert_eq!(store.list_items(owner).await.unwrap().len(), 1);
        assert_eq!(store.get_item(owner, wheel.id).await.unwrap().quantity, 8);
    }

    #[tokio::test]
    async fn upsert_updates_required_in_place() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let (product, a, _) = two_part_product(&store, owner).await;

        link(&store, owner, product, a, 5).await;

        let bom = store.load_bom(owner, product).await.unwrap();
        assert_eq!(bom.len(), 2);
        assert_eq!(bom[0].name, "A");
        assert_eq!(bom[0].required, 5);
    }

    #[tokio::test]
    async fn upsert_unknown_item_id_is_not_found() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let product = store.create_product(owner, NewProduct::named("Bike")).await.unwrap();

        let err = store
            .upsert_component(
                owner,
                product.id,
                ComponentSpec {
                    part: PartRef::Id(ItemId::new()),
                    required: 1,
                    stock: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("item"));
    }

    #[tokio::test]
    async fn remove_component_and_delete_item_shrink_the_bom() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        let (product, a, b) = two_part_product(&store, owner).await;

        store.remove_component(owner, product, a).await.unwrap();
        assert_eq!(
            store.remove_component(owner, product, a).await.unwrap_err(),
            StoreError::NotFound("component")
        );
        assert_eq!(store.load_bom(owner, product).await.unwrap().len(), 1);

        store.delete_item(owner, b).await.unwrap();
        assert!(store.load_bom(owner, product).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_product_name_conflicts() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        store.create_product(owner, NewProduct::named("Lamp")).await.unwrap();

        let err = store
            .create_product(owner, NewProduct::named(" Lamp "))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Names are unique per owner only.
        store
            .create_product(OwnerId::new(), NewProduct::named("Lamp"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = InMemoryInventoryStore::new();
        let alice = OwnerId::new();
        let bob = OwnerId::new();
        let (product, a, _) = two_part_product(&store, alice).await;

        assert_eq!(store.get_item(bob, a).await.unwrap_err(), StoreError::NotFound("item"));
        assert_eq!(
            store.commit_build(bob, product, 1).await.unwrap_err(),
            StoreError::NotFound("product")
        );
        assert!(store.list_items(bob).await.unwrap().is_empty());
        assert!(store.list_products(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn calculate_inventory_uses_required_per_product() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();

        let empty = store.calculate_inventory(owner).await.unwrap();
        assert_eq!(empty.can_build, 0);
        assert!(empty.details.is_empty());

        for (name, qty, required) in [("Screw", 50, 4), ("Plate", 9, 1), ("Glue", 3, 0)] {
            store
                .create_item(
                    owner,
                    NewItem::named(name, "Parts")
                        .with_quantity(qty)
                        .with_required_per_product(required),
                )
                .await
                .unwrap();
        }

        let result = store.calculate_inventory(owner).await.unwrap();
        assert_eq!(result.can_build, 9);
        assert_eq!(result.details.len(), 2);
        assert_eq!(result.details[0].name, "Screw");
    }

    #[tokio::test]
    async fn lists_are_newest_first() {
        let store = InMemoryInventoryStore::new();
        let owner = OwnerId::new();
        seed_item(&store, owner, "first", 1).await;
        seed_item(&store, owner, "second", 1).await;

        let names: Vec<String> = store
            .list_items(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }
}
