//! Sale ledger service: creation and cancellation with stock adjustment
//!
//! Both operations run in one transaction that locks every declination they
//! touch (`FOR UPDATE`, ascending id order), re-reads quantities under the
//! lock and hands them to the shared engine before writing anything.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    ArticleRow, DeclinationRow, SaleItemRow, SaleRow, ARTICLE_COLUMNS, DECLINATION_COLUMNS,
    SALE_COLUMNS, SALE_ITEM_COLUMNS,
};
use shared::{
    format_sale_number, plan_cancellation, plan_sale, Article, CatalogSnapshot, CreateSaleRequest,
    Declination, Sale, SaleIdentity, SaleItem, SaleListQuery, SalePolicy, SaleStatus,
};

/// Sales service
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
    policy: SalePolicy,
}

impl SalesService {
    /// Create a new SalesService instance
    pub fn new(db: PgPool, policy: SalePolicy) -> Self {
        Self { db, policy }
    }

    /// Validate and record a sale, decrementing stock for every line
    pub async fn create_sale(&self, seller_id: Uuid, input: CreateSaleRequest) -> AppResult<Sale> {
        input.validate()?;
        for item in &input.items {
            item.validate()?;
        }

        let mut tx = self.db.begin().await?;

        let snapshot = Self::lock_catalog(&mut tx, &input).await?;
        let draft = plan_sale(&input, &snapshot, &self.policy)?;

        let sequence = sqlx::query_scalar::<_, i64>("SELECT nextval('sale_number_seq')")
            .fetch_one(&mut *tx)
            .await?;

        let created_at = Utc::now();
        let decrements = draft.stock_decrements.clone();
        let sale = draft.into_sale(
            SaleIdentity {
                id: Uuid::new_v4(),
                sale_number: format_sale_number(created_at.year(), sequence),
                seller_id,
                created_at,
            },
            &input,
            Uuid::new_v4,
        );

        Self::insert_sale(&mut tx, &sale).await?;

        for delta in &decrements {
            sqlx::query("UPDATE declinaisons SET quantite = quantite + $2 WHERE id = $1")
                .bind(delta.declination_id)
                .bind(delta.change())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            seller_id = %seller_id,
            lines = sale.items.len(),
            total = %sale.total_amount,
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Lock the requested declinations and load them with their articles
    async fn lock_catalog(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateSaleRequest,
    ) -> AppResult<CatalogSnapshot> {
        let mut declination_ids: Vec<Uuid> =
            input.items.iter().map(|i| i.declination_id).collect();
        declination_ids.sort();
        declination_ids.dedup();

        let mut article_ids: Vec<Uuid> = input.items.iter().map(|i| i.article_id).collect();
        article_ids.sort();
        article_ids.dedup();

        let declinations = sqlx::query_as::<_, DeclinationRow>(&format!(
            "SELECT {} FROM declinaisons WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            DECLINATION_COLUMNS
        ))
        .bind(&declination_ids)
        .fetch_all(&mut **tx)
        .await?;

        let articles = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {} FROM articles WHERE id = ANY($1)",
            ARTICLE_COLUMNS
        ))
        .bind(&article_ids)
        .fetch_all(&mut **tx)
        .await?;

        let articles = articles
            .into_iter()
            .map(Article::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(CatalogSnapshot::from_parts(
            articles,
            declinations.into_iter().map(Declination::from),
        ))
    }

    async fn insert_sale(tx: &mut Transaction<'_, Postgres>, sale: &Sale) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ventes (
                id, numero_vente, client_nom, client_email, client_telephone,
                montant_total, montant_paye, montant_rendu, mode_paiement, statut,
                notes, vendeur_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(sale.id)
        .bind(&sale.sale_number)
        .bind(&sale.client_name)
        .bind(&sale.client_email)
        .bind(&sale.client_phone)
        .bind(sale.total_amount)
        .bind(sale.amount_paid)
        .bind(sale.change_due)
        .bind(sale.payment_method.as_str())
        .bind(sale.status.as_str())
        .bind(&sale.notes)
        .bind(sale.seller_id)
        .bind(sale.created_at)
        .execute(&mut **tx)
        .await
        .map_err(AppError::from_unique_violation)?;

        for (line_no, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO vente_details (
                    id, vente_id, article_id, declinaison_id, article_nom, article_reference,
                    taille, couleur, quantite, prix_unitaire, prix_total, line_no
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(item.id)
            .bind(item.sale_id)
            .bind(item.article_id)
            .bind(item.declination_id)
            .bind(&item.article_name)
            .bind(&item.article_reference)
            .bind(&item.size)
            .bind(&item.color)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .bind(i32::try_from(line_no).unwrap_or(i32::MAX))
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Cancel a validated sale and give its stock back
    ///
    /// Lines whose declination has been deleted since the sale are skipped.
    pub async fn cancel_sale(&self, sale_id: Uuid, user_id: Uuid) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM ventes WHERE id = $1 FOR UPDATE",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Vente".to_string()))?;

        let items = sqlx::query_as::<_, SaleItemRow>(&format!(
            "SELECT {} FROM vente_details WHERE vente_id = $1 ORDER BY line_no",
            SALE_ITEM_COLUMNS
        ))
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut sale = row.into_sale(items.into_iter().map(SaleItem::from).collect())?;

        let mut declination_ids: Vec<Uuid> =
            sale.items.iter().map(|i| i.declination_id).collect();
        declination_ids.sort();
        declination_ids.dedup();

        let existing: HashSet<Uuid> = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM declinaisons WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&declination_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let plan = plan_cancellation(&sale, &existing)?;

        for (declination_id, quantity) in &plan.restorations {
            sqlx::query("UPDATE declinaisons SET quantite = quantite + $2 WHERE id = $1")
                .bind(declination_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE ventes SET statut = $2 WHERE id = $1")
            .bind(sale_id)
            .bind(SaleStatus::Cancelled.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if !plan.skipped.is_empty() {
            tracing::warn!(
                sale_id = %sale_id,
                skipped = ?plan.skipped,
                "Cancelled sale references deleted declinations; their stock was not restored"
            );
        }
        tracing::info!(
            sale_id = %sale_id,
            sale_number = %sale.sale_number,
            cancelled_by = %user_id,
            restored = plan.restorations.len(),
            "Sale cancelled"
        );

        sale.status = SaleStatus::Cancelled;
        Ok(sale)
    }

    /// Get a sale with its items
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM ventes WHERE id = $1",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vente".to_string()))?;

        self.with_items(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Vente".to_string()))
    }

    /// List sales, most recent first
    pub async fn list_sales(&self, query: &SaleListQuery) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            SELECT {} FROM ventes
            WHERE ($1::text IS NULL OR statut = $1)
            ORDER BY created_at DESC, numero_vente DESC
            LIMIT $2
            "#,
            SALE_COLUMNS
        ))
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.effective_limit())
        .fetch_all(&self.db)
        .await?;

        self.with_items(rows).await
    }

    /// Sales in a status created at or after `since`, oldest first
    pub async fn sales_since(
        &self,
        status: SaleStatus,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM ventes WHERE statut = $1 AND created_at >= $2 ORDER BY created_at ASC",
            SALE_COLUMNS
        ))
        .bind(status.as_str())
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        self.with_items(rows).await
    }

    async fn with_items(&self, rows: Vec<SaleRow>) -> AppResult<Vec<Sale>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let items = sqlx::query_as::<_, SaleItemRow>(&format!(
            "SELECT {} FROM vente_details WHERE vente_id = ANY($1) ORDER BY vente_id, line_no",
            SALE_ITEM_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_sale: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.vente_id).or_default().push(item.into());
        }

        rows.into_iter()
            .map(|row| {
                let items = by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect()
    }
}
