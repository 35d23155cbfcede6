use crate::config::ConnectionPool;
use anyhow::{Result, bail};
use tracing::info;

/// Externally configured table names. Validated as plain SQL identifiers
/// because they are spliced into query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub products: String,
    pub orders: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            products: "products".into(),
            orders: "orders".into(),
        }
    }
}

impl TableNames {
    pub fn new(products: &str, orders: &str) -> Result<Self> {
        for name in [products, orders] {
            if !is_identifier(name) {
                bail!("invalid table name '{name}'");
            }
        }
        if products == orders {
            bail!("products and orders must use different tables");
        }

        Ok(Self {
            products: products.to_string(),
            orders: orders.to_string(),
        })
    }

    pub fn categories(&self) -> String {
        format!("{}_categories", self.products)
    }

    /// `pg_notify` channel carrying product change records.
    pub fn changes_channel(&self) -> String {
        format!("{}_changes", self.products)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 48 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Creates the tables and the product change trigger if they do not exist.
pub async fn ensure_schema(db: &ConnectionPool, tables: &TableNames) -> Result<()> {
    let products = &tables.products;
    let orders = &tables.orders;
    let categories = tables.categories();
    let channel = tables.changes_channel();

    let statements = [
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {products} (
                category TEXT NOT NULL,
                id UUID NOT NULL,
                name TEXT NOT NULL,
                price NUMERIC(20, 2) NOT NULL CHECK (price > 0),
                available NUMERIC(20, 3) NOT NULL DEFAULT 0 CHECK (available >= 0),
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (category, id)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {orders} (
                id UUID PRIMARY KEY,
                product_id UUID NOT NULL,
                category TEXT NOT NULL,
                product_name TEXT NOT NULL,
                unit_price NUMERIC(20, 2) NOT NULL,
                quantity BIGINT NOT NULL CHECK (quantity >= 1),
                total NUMERIC(30, 2) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {categories} (
                category TEXT PRIMARY KEY,
                id TEXT NOT NULL DEFAULT 'CATEGORY',
                total_availability NUMERIC NOT NULL,
                product_ids UUID[] NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE OR REPLACE FUNCTION {products}_notify_change() RETURNS trigger AS $$
            DECLARE
                old_image JSONB;
                new_image JSONB;
            BEGIN
                IF TG_OP <> 'INSERT' THEN
                    old_image := jsonb_build_object(
                        'category', OLD.category, 'id', OLD.id, 'name', OLD.name,
                        'price', OLD.price, 'available', OLD.available,
                        'createdAt', OLD.created_at, 'updatedAt', OLD.updated_at);
                END IF;
                IF TG_OP <> 'DELETE' THEN
                    new_image := jsonb_build_object(
                        'category', NEW.category, 'id', NEW.id, 'name', NEW.name,
                        'price', NEW.price, 'available', NEW.available,
                        'createdAt', NEW.created_at, 'updatedAt', NEW.updated_at);
                END IF;
                PERFORM pg_notify('{channel}', jsonb_build_object(
                    'eventName', CASE TG_OP
                        WHEN 'INSERT' THEN 'INSERT'
                        WHEN 'UPDATE' THEN 'MODIFY'
                        ELSE 'REMOVE' END,
                    'oldImage', old_image,
                    'newImage', new_image)::text);
                RETURN NULL;
            END;
            $$ LANGUAGE plpgsql
            "#
        ),
        format!("DROP TRIGGER IF EXISTS {products}_changes ON {products}"),
        format!(
            r#"
            CREATE TRIGGER {products}_changes
            AFTER INSERT OR UPDATE OR DELETE ON {products}
            FOR EACH ROW EXECUTE FUNCTION {products}_notify_change()
            "#
        ),
    ];

    for statement in &statements {
        sqlx::query(statement).execute(db).await?;
    }

    info!(%products, %orders, %categories, "🗄️ Schema ready");
    Ok(())
}
