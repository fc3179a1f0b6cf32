use sqlx::PgPool;

use crate::models::{AssistantSession, CompanyProfile, InventoryItem};

/// Create tables and indexes on startup (idempotent).
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS company_profile (
            user_id TEXT PRIMARY KEY,
            company_name TEXT,
            rut TEXT,
            categories TEXT,
            rubros_keywords TEXT,
            keywords_globales TEXT,
            keywords_excluir TEXT,
            margin_min DOUBLE PRECISION,
            margin_target DOUBLE PRECISION,
            delivery_days TEXT,
            risk_rules TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory_item (
            id BIGSERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            sku TEXT,
            name TEXT NOT NULL,
            synonyms TEXT,
            cost DOUBLE PRECISION,
            price DOUBLE PRECISION,
            stock BIGINT,
            restock_days BIGINT,
            supplier TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job (
            id BIGSERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            action TEXT NOT NULL,
            status TEXT NOT NULL,
            payload_json TEXT,
            result_json TEXT,
            raw TEXT,
            error TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assistant_session (
            user_id TEXT PRIMARY KEY,
            stage TEXT NOT NULL,
            selected_plan TEXT,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inventory_user ON inventory_item(user_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_job_user_created ON job(user_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_company(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<CompanyProfile>, sqlx::Error> {
    sqlx::query_as::<_, CompanyProfile>(
        r#"
        SELECT user_id, company_name, rut, categories,
               rubros_keywords, keywords_globales, keywords_excluir,
               margin_min, margin_target, delivery_days, risk_rules
        FROM company_profile
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn upsert_company(
    pool: &PgPool,
    user_id: &str,
    profile: &CompanyProfile,
) -> Result<CompanyProfile, sqlx::Error> {
    sqlx::query_as::<_, CompanyProfile>(
        r#"
        INSERT INTO company_profile
            (user_id, company_name, rut, categories,
             rubros_keywords, keywords_globales, keywords_excluir,
             margin_min, margin_target, delivery_days, risk_rules)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id) DO UPDATE SET
            company_name = excluded.company_name,
            rut = excluded.rut,
            categories = excluded.categories,
            rubros_keywords = excluded.rubros_keywords,
            keywords_globales = excluded.keywords_globales,
            keywords_excluir = excluded.keywords_excluir,
            margin_min = excluded.margin_min,
            margin_target = excluded.margin_target,
            delivery_days = excluded.delivery_days,
            risk_rules = excluded.risk_rules,
            updated_at = now()
        RETURNING user_id, company_name, rut, categories,
                  rubros_keywords, keywords_globales, keywords_excluir,
                  margin_min, margin_target, delivery_days, risk_rules
        "#,
    )
    .bind(user_id)
    .bind(&profile.company_name)
    .bind(&profile.rut)
    .bind(&profile.categories)
    .bind(&profile.rubros_keywords)
    .bind(&profile.keywords_globales)
    .bind(&profile.keywords_excluir)
    .bind(profile.margin_min)
    .bind(profile.margin_target)
    .bind(&profile.delivery_days)
    .bind(&profile.risk_rules)
    .fetch_one(pool)
    .await
}

pub async fn list_inventory(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<InventoryItem>, sqlx::Error> {
    sqlx::query_as::<_, InventoryItem>(
        r#"
        SELECT sku, name, synonyms, cost, price, stock, restock_days, supplier
        FROM inventory_item
        WHERE user_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Wholesale replacement: the previous catalog is dropped in the same
/// transaction, no partial update.
pub async fn replace_inventory(
    pool: &PgPool,
    user_id: &str,
    items: &[InventoryItem],
) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM inventory_item WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for it in items {
        sqlx::query(
            r#"
            INSERT INTO inventory_item
                (user_id, sku, name, synonyms, cost, price, stock, restock_days, supplier)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user_id)
        .bind(&it.sku)
        .bind(&it.name)
        .bind(&it.synonyms)
        .bind(it.cost)
        .bind(it.price)
        .bind(it.stock)
        .bind(it.restock_days)
        .bind(&it.supplier)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(items.len())
}

/// Session row for the assistant, created on first use.
pub async fn get_or_create_session(
    pool: &PgPool,
    user_id: &str,
) -> Result<AssistantSession, sqlx::Error> {
    sqlx::query_as::<_, AssistantSession>(
        r#"
        INSERT INTO assistant_session (user_id, stage)
        VALUES ($1, 'idle')
        ON CONFLICT (user_id) DO UPDATE SET user_id = excluded.user_id
        RETURNING user_id, stage, selected_plan, updated_at
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn save_session(
    pool: &PgPool,
    user_id: &str,
    stage: &str,
    selected_plan: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE assistant_session
        SET stage = $2,
            selected_plan = COALESCE($3, selected_plan),
            updated_at = now()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(stage)
    .bind(selected_plan)
    .execute(pool)
    .await?;
    Ok(())
}
