//! Postgres-backed inventory store.
//!
//! Every query carries `owner_id` in its WHERE clause, so rows owned by
//! someone else are indistinguishable from missing rows.
//!
//! ## Build commits
//!
//! `commit_build` runs in one READ COMMITTED transaction:
//! 1. lock the product's BOM rows joined with their items (`FOR UPDATE OF i`)
//! 2. plan the build from the locked snapshot
//! 3. apply each decrement with `WHERE version = <read version>`
//!
//! A decrement that matches no row means the item moved under us; the whole
//! transaction is rolled back and reported as `Conflict`.
//!
//! ## Error mapping
//!
//! | SQLx error | Code | StoreError |
//! |------------|------|------------|
//! | unique violation | `23505` | `Conflict` |
//! | serialization failure / deadlock | `40001` / `40P01` | `Conflict` |
//! | anything else | | `Storage` |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};

use inventoryflow_build::{BomLine, BuildPlan, plan_build};
use inventoryflow_core::{ItemId, OwnerId, ProductId};
use inventoryflow_inventory::{DEFAULT_CATEGORY, Item, ItemPatch, NewItem};
use inventoryflow_products::{BomEntry, ComponentSpec, NewProduct, PartRef, Product};

use super::r#trait::{BuildReceipt, InventoryStore, StoreError, ensure_positive_quantity};

const ITEM_COLUMNS: &str =
    "id, owner_id, name, category, quantity, required_per_product, version, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes when missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

async fn rollback(tx: Transaction<'_, Postgres>, err: StoreError) -> StoreError {
    match tx.rollback().await {
        Ok(()) => err,
        Err(e) => map_sqlx_error("rollback", e),
    }
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), StoreError> {
    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))
}

async fn ensure_product(
    tx: &mut Transaction<'_, Postgres>,
    owner: OwnerId,
    product_id: ProductId,
) -> Result<(), StoreError> {
    let found = sqlx::query("SELECT 1 FROM products WHERE id = $1 AND owner_id = $2")
        .bind(product_id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("ensure_product", e))?;
    found.map(|_| ()).ok_or(StoreError::NotFound("product"))
}

async fn lock_item(
    tx: &mut Transaction<'_, Postgres>,
    owner: OwnerId,
    id: ItemId,
) -> Result<Option<Item>, StoreError> {
    let row = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 AND owner_id = $2 FOR UPDATE"
    ))
    .bind(id.as_uuid())
    .bind(owner.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_item", e))?;
    row.map(|r| item_from_row(&r)).transpose()
}

async fn lock_item_named(
    tx: &mut Transaction<'_, Postgres>,
    owner: OwnerId,
    name: &str,
) -> Result<Option<Item>, StoreError> {
    let row = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = $1 AND name = $2 \
         ORDER BY created_at ASC, id ASC LIMIT 1 FOR UPDATE"
    ))
    .bind(owner.as_uuid())
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_item_named", e))?;
    row.map(|r| item_from_row(&r)).transpose()
}

async fn insert_item<'e, E>(executor: E, item: &Item) -> Result<(), StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(&format!(
        "INSERT INTO items ({ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
    ))
    .bind(item.id.as_uuid())
    .bind(item.owner_id.as_uuid())
    .bind(&item.name)
    .bind(&item.category)
    .bind(item.quantity)
    .bind(item.required_per_product)
    .bind(item.version as i64)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(executor)
    .await
    .map_err(|e| map_sqlx_error("insert_item", e))?;
    Ok(())
}

async fn write_item(tx: &mut Transaction<'_, Postgres>, item: &Item) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE items
        SET name = $3, category = $4, quantity = $5, required_per_product = $6,
            version = $7, updated_at = $8
        WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(item.id.as_uuid())
    .bind(item.owner_id.as_uuid())
    .bind(&item.name)
    .bind(&item.category)
    .bind(item.quantity)
    .bind(item.required_per_product)
    .bind(item.version as i64)
    .bind(item.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("write_item", e))?;
    Ok(())
}

/// BOM joined with live stock. `lock` takes row locks on the items.
async fn select_bom(
    tx: &mut Transaction<'_, Postgres>,
    owner: OwnerId,
    product_id: ProductId,
    lock: bool,
) -> Result<Vec<BomLine>, StoreError> {
    let sql = format!(
        r#"
        SELECT i.id, i.name, i.quantity, pc.required, i.version
        FROM product_components pc
        JOIN items i ON i.id = pc.item_id
        WHERE pc.product_id = $1 AND i.owner_id = $2
        ORDER BY pc.created_at ASC, pc.item_id ASC
        {}
        "#,
        if lock { "FOR UPDATE OF i" } else { "" }
    );

    let rows = sqlx::query(&sql)
        .bind(product_id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("select_bom", e))?;

    rows.iter()
        .map(|row| {
            Ok(BomLine::new(
                ItemId::from_uuid(row.try_get("id")?),
                row.try_get::<String, _>("name")?,
                row.try_get("quantity")?,
                row.try_get("required")?,
                row.try_get::<i64, _>("version")? as u64,
            ))
        })
        .collect::<Result<_, sqlx::Error>>()
        .map_err(|e| map_sqlx_error("decode_bom", e))
}

/// Apply every decrement under its version guard.
async fn apply_plan(
    tx: &mut Transaction<'_, Postgres>,
    owner: OwnerId,
    plan: &BuildPlan,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    for decrement in &plan.decrements {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET quantity = quantity - $4, version = version + 1, updated_at = $5
            WHERE id = $1 AND owner_id = $2 AND version = $3 AND quantity >= $4
            "#,
        )
        .bind(decrement.item_id.as_uuid())
        .bind(owner.as_uuid())
        .bind(decrement.expected_version as i64)
        .bind(decrement.amount())
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("apply_decrement", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::conflict(format!(
                "item '{}' changed during build",
                decrement.name
            )));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self, item), fields(owner_id = %owner), err)]
    async fn create_item(&self, owner: OwnerId, item: NewItem) -> Result<Item, StoreError> {
        let item = item.into_item(ItemId::new(), owner, Utc::now())?;
        insert_item(&*self.pool, &item).await?;
        Ok(item)
    }

    #[instrument(skip(self), fields(owner_id = %owner, item_count = tracing::field::Empty), err)]
    async fn list_items(&self, owner: OwnerId) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        Span::current().record("item_count", rows.len());
        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self), fields(owner_id = %owner, item_id = %id), err)]
    async fn get_item(&self, owner: OwnerId, id: ItemId) -> Result<Item, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;

        row.map(|r| item_from_row(&r))
            .transpose()?
            .ok_or(StoreError::NotFound("item"))
    }

    #[instrument(skip(self, patch), fields(owner_id = %owner, item_id = %id), err)]
    async fn update_item(&self, owner: OwnerId, id: ItemId, patch: ItemPatch) -> Result<Item, StoreError> {
        let mut tx = self.begin().await?;

        let mut item = match lock_item(&mut tx, owner, id).await {
            Ok(Some(item)) => item,
            Ok(None) => return Err(rollback(tx, StoreError::NotFound("item")).await),
            Err(e) => return Err(rollback(tx, e).await),
        };

        if let Err(e) = patch.apply(&mut item, Utc::now()) {
            return Err(rollback(tx, e.into()).await);
        }
        if let Err(e) = write_item(&mut tx, &item).await {
            return Err(rollback(tx, e).await);
        }

        commit(tx).await?;
        Ok(item)
    }

    #[instrument(skip(self), fields(owner_id = %owner, item_id = %id), err)]
    async fn delete_item(&self, owner: OwnerId, id: ItemId) -> Result<(), StoreError> {
        // product_components rows go with it (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("item"));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(owner_id = %owner), err)]
    async fn load_required_items(&self, owner: OwnerId) -> Result<Vec<BomLine>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, quantity, required_per_product, version
            FROM items
            WHERE owner_id = $1 AND required_per_product > 0
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_required_items", e))?;

        rows.iter()
            .map(|row| {
                Ok(BomLine::new(
                    ItemId::from_uuid(row.try_get("id")?),
                    row.try_get::<String, _>("name")?,
                    row.try_get("quantity")?,
                    row.try_get("required_per_product")?,
                    row.try_get::<i64, _>("version")? as u64,
                ))
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("decode_required_items", e))
    }

    #[instrument(skip(self, product), fields(owner_id = %owner), err)]
    async fn create_product(&self, owner: OwnerId, product: NewProduct) -> Result<Product, StoreError> {
        let product = product.into_product(ProductId::new(), owner, Utc::now())?;

        sqlx::query("INSERT INTO products (id, owner_id, name, created_at) VALUES ($1, $2, $3, $4)")
            .bind(product.id.as_uuid())
            .bind(owner.as_uuid())
            .bind(&product.name)
            .bind(product.created_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::conflict("product already exists")
                } else {
                    map_sqlx_error("create_product", e)
                }
            })?;

        Ok(product)
    }

    #[instrument(skip(self), fields(owner_id = %owner), err)]
    async fn list_products(&self, owner: OwnerId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, created_at
            FROM products
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), fields(owner_id = %owner, product_id = %id), err)]
    async fn get_product(&self, owner: OwnerId, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query("SELECT id, owner_id, name, created_at FROM products WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;

        row.map(|r| product_from_row(&r))
            .transpose()?
            .ok_or(StoreError::NotFound("product"))
    }

    #[instrument(skip(self, spec), fields(owner_id = %owner, product_id = %product_id), err)]
    async fn upsert_component(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        spec: ComponentSpec,
    ) -> Result<BomEntry, StoreError> {
        let spec = spec.validated()?;
        let mut tx = self.begin().await?;
        match upsert_component_tx(&mut tx, owner, product_id, spec, Utc::now()).await {
            Ok(entry) => {
                commit(tx).await?;
                Ok(entry)
            }
            Err(e) => Err(rollback(tx, e).await),
        }
    }

    #[instrument(skip(self), fields(owner_id = %owner, product_id = %product_id, item_id = %item_id), err)]
    async fn remove_component(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        item_id: ItemId,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM product_components pc
            USING products p
            WHERE pc.product_id = p.id
              AND p.id = $1 AND p.owner_id = $2 AND pc.item_id = $3
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(owner.as_uuid())
        .bind(item_id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("remove_component", e))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        // Tell a missing product apart from a missing link.
        self.get_product(owner, product_id).await?;
        Err(StoreError::NotFound("component"))
    }

    #[instrument(skip(self), fields(owner_id = %owner, product_id = %product_id), err)]
    async fn load_bom(&self, owner: OwnerId, product_id: ProductId) -> Result<Vec<BomLine>, StoreError> {
        let mut tx = self.begin().await?;
        let bom = match ensure_product(&mut tx, owner, product_id).await {
            Ok(()) => select_bom(&mut tx, owner, product_id, false).await,
            Err(e) => Err(e),
        };
        match bom {
            Ok(bom) => {
                commit(tx).await?;
                Ok(bom)
            }
            Err(e) => Err(rollback(tx, e).await),
        }
    }

    #[instrument(
        skip(self),
        fields(owner_id = %owner, product_id = %product_id, decremented_items = tracing::field::Empty),
        err
    )]
    async fn commit_build(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<BuildReceipt, StoreError> {
        ensure_positive_quantity(quantity)?;

        let mut tx = self.begin().await?;

        if let Err(e) = ensure_product(&mut tx, owner, product_id).await {
            return Err(rollback(tx, e).await);
        }

        let bom = match select_bom(&mut tx, owner, product_id, true).await {
            Ok(bom) => bom,
            Err(e) => return Err(rollback(tx, e).await),
        };

        let plan = match plan_build(&bom, quantity) {
            Ok(plan) => plan,
            Err(e) => return Err(rollback(tx, e.into()).await),
        };

        if let Err(e) = apply_plan(&mut tx, owner, &plan, Utc::now()).await {
            return Err(rollback(tx, e).await);
        }

        commit(tx).await?;
        Span::current().record("decremented_items", plan.decrements.len());

        Ok(BuildReceipt {
            product_id,
            built: plan.quantity,
            decrements: plan.decrements,
        })
    }
}

async fn upsert_component_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner: OwnerId,
    product_id: ProductId,
    spec: ComponentSpec,
    now: DateTime<Utc>,
) -> Result<BomEntry, StoreError> {
    ensure_product(tx, owner, product_id).await?;

    let existing = match &spec.part {
        PartRef::Id(id) => Some(
            lock_item(tx, owner, *id)
                .await?
                .ok_or(StoreError::NotFound("item"))?,
        ),
        PartRef::Name(name) => lock_item_named(tx, owner, name).await?,
    };

    let item_id = match (existing, spec.part) {
        (Some(mut item), _) => {
            if let Some(stock) = spec.stock {
                item.set_stock(stock, now)?;
                write_item(tx, &item).await?;
            }
            item.id
        }
        (None, PartRef::Name(name)) => {
            let item = NewItem::named(name, DEFAULT_CATEGORY)
                .with_quantity(spec.stock.unwrap_or(0))
                .into_item(ItemId::new(), owner, now)?;
            insert_item(&mut **tx, &item).await?;
            item.id
        }
        (None, PartRef::Id(_)) => return Err(StoreError::NotFound("item")),
    };

    let entry = BomEntry::new(product_id, item_id, spec.required, now)?;
    let row = sqlx::query(
        r#"
        INSERT INTO product_components (product_id, item_id, required, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        ON CONFLICT (product_id, item_id)
        DO UPDATE SET required = EXCLUDED.required, updated_at = EXCLUDED.updated_at
        RETURNING created_at, updated_at
        "#,
    )
    .bind(product_id.as_uuid())
    .bind(item_id.as_uuid())
    .bind(entry.required)
    .bind(now)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("upsert_component", e))?;

    Ok(BomEntry {
        created_at: row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("decode_component", e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| map_sqlx_error("decode_component", e))?,
        ..entry
    })
}

fn item_from_row(row: &PgRow) -> Result<Item, StoreError> {
    let decode = || -> Result<Item, sqlx::Error> {
        Ok(Item {
            id: ItemId::from_uuid(row.try_get("id")?),
            owner_id: OwnerId::from_uuid(row.try_get("owner_id")?),
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            quantity: row.try_get("quantity")?,
            required_per_product: row.try_get("required_per_product")?,
            version: row.try_get::<i64, _>("version")? as u64,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    };
    decode().map_err(|e| StoreError::storage(format!("failed to decode item row: {e}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let decode = || -> Result<Product, sqlx::Error> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get("id")?),
            owner_id: OwnerId::from_uuid(row.try_get("owner_id")?),
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    };
    decode().map_err(|e| StoreError::storage(format!("failed to decode product row: {e}")))
}

/// Unique violations, serialization failures and deadlocks are conflicts;
/// every other SQLSTATE is a storage failure.
fn classify(code: Option<&str>, msg: String) -> StoreError {
    match code {
        Some("23505") | Some("40001") | Some("40P01") => StoreError::Conflict(msg),
        _ => StoreError::Storage(msg),
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => classify(
            db_err.code().as_deref(),
            format!("database error in {}: {}", operation, db_err.message()),
        ),
        sqlx::Error::PoolClosed => StoreError::storage(format!("connection pool closed in {operation}")),
        sqlx::Error::RowNotFound => StoreError::storage(format!("unexpected row not found in {operation}")),
        other => StoreError::storage(format!("sqlx error in {operation}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_map_to_storage() {
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolClosed),
            StoreError::Storage(msg) if msg.contains("op")
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::RowNotFound),
            StoreError::Storage(_)
        ));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
    }

    #[test]
    fn sqlstate_classification() {
        for code in ["23505", "40001", "40P01"] {
            assert!(
                matches!(classify(Some(code), "m".into()), StoreError::Conflict(msg) if msg == "m"),
                "{code}"
            );
        }
        assert!(matches!(classify(Some("23503"), "fk".into()), StoreError::Storage(_)));
        assert!(matches!(classify(None, "no code".into()), StoreError::Storage(_)));
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL"]
    async fn stale_plan_rolls_back_earlier_decrements() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL");
        let store = PostgresInventoryStore::connect(&url, 2).await.unwrap();
        store.ensure_schema().await.unwrap();
        let owner = OwnerId::new();

        let product = store.create_product(owner, NewProduct::named("Stool")).await.unwrap();
        for (name, required, stock) in [("Seat", 1, 5), ("Leg", 3, 12)] {
            let spec = ComponentSpec {
                part: PartRef::Name(name.to_string()),
                required,
                stock: Some(stock),
            };
            store.upsert_component(owner, product.id, spec).await.unwrap();
        }

        let bom = store.load_bom(owner, product.id).await.unwrap();
        let plan = plan_build(&bom, 2).unwrap();
        assert_eq!(plan.decrements.len(), 2);

        // Leg moves after the snapshot; Seat is still current and decrements first.
        let patch = ItemPatch {
            quantity: Some(12),
            ..ItemPatch::default()
        };
        store.update_item(owner, bom[1].item_id, patch).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = apply_plan(&mut tx, owner, &plan, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref msg) if msg.contains("Leg")));
        rollback(tx, err).await;

        let stock: Vec<i64> = store
            .load_bom(owner, product.id)
            .await
            .unwrap()
            .into_iter()
            .map(|line| line.stock)
            .collect();
        assert_eq!(stock, vec![5, 12]);
    }

    #[test]
    fn schema_declares_every_table() {
        let schema = include_str!("schema.sql");
        for table in ["items", "products", "product_components"] {
            assert!(schema.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")));
        }
    }
}
