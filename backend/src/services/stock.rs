//! Stock service: low-stock alerts and manual stock movements

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{DeclinationArticleRow, MovementRow};
use shared::{
    apply_movement, collect_stock_alerts, CreateMovementRequest, Declination, MovementListQuery,
    StockAlert, StockMovement,
};

/// Stock service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

const MOVEMENT_SELECT: &str = r#"
    SELECT m.id, m.declinaison_id, d.article_id, a.nom AS article_nom, d.taille, d.couleur,
           m.type_mouvement, m.quantite, m.quantite_apres, m.motif, m.user_id, m.created_at
    FROM stock_movements m
    JOIN declinaisons d ON d.id = m.declinaison_id
    JOIN articles a ON a.id = d.article_id
"#;

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Every declination at or below its threshold, most urgent first
    pub async fn low_stock_alerts(&self) -> AppResult<Vec<StockAlert>> {
        let rows = sqlx::query_as::<_, DeclinationArticleRow>(
            r#"
            SELECT d.id, d.article_id, d.taille, d.couleur, d.quantite, d.quantite_min,
                   d.code_barre, a.reference, a.nom, a.marque
            FROM declinaisons d
            JOIN articles a ON a.id = d.article_id
            WHERE d.quantite <= d.quantite_min
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let pairs: Vec<_> = rows
            .into_iter()
            .map(|row| {
                let article = row.summary();
                (article, Declination::from(row.declination))
            })
            .collect();

        Ok(collect_stock_alerts(pairs.iter().map(|(a, d)| (a, d))))
    }

    /// Record a restock, return, loss or correction on one declination
    pub async fn record_movement(
        &self,
        user_id: Uuid,
        input: CreateMovementRequest,
    ) -> AppResult<StockMovement> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, DeclinationArticleRow>(
            r#"
            SELECT d.id, d.article_id, d.taille, d.couleur, d.quantite, d.quantite_min,
                   d.code_barre, a.reference, a.nom, a.marque
            FROM declinaisons d
            JOIN articles a ON a.id = d.article_id
            WHERE d.id = $1
            FOR UPDATE OF d
            "#,
        )
        .bind(input.declination_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Declinaison".to_string()))?;

        let outcome = apply_movement(row.declination.quantite, input.movement_type, input.quantity)?;

        sqlx::query("UPDATE declinaisons SET quantite = $2 WHERE id = $1")
            .bind(input.declination_id)
            .bind(outcome.quantity_after)
            .execute(&mut *tx)
            .await?;

        let (id, created_at) = sqlx::query_as::<_, (Uuid, chrono::DateTime<chrono::Utc>)>(
            r#"
            INSERT INTO stock_movements (declinaison_id, type_mouvement, quantite, quantite_apres, motif, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            "#,
        )
        .bind(input.declination_id)
        .bind(input.movement_type.as_str())
        .bind(outcome.delta)
        .bind(outcome.quantity_after)
        .bind(&input.reason)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            movement_id = %id,
            declination_id = %input.declination_id,
            movement_type = input.movement_type.as_str(),
            delta = outcome.delta,
            quantity_after = outcome.quantity_after,
            "Stock movement recorded"
        );

        Ok(StockMovement {
            id,
            declination_id: input.declination_id,
            article_id: row.declination.article_id,
            article_name: row.nom,
            size: row.declination.taille,
            color: row.declination.couleur,
            movement_type: input.movement_type,
            delta: outcome.delta,
            quantity_after: outcome.quantity_after,
            reason: input.reason,
            user_id,
            created_at,
        })
    }

    /// Movement history, most recent first
    pub async fn list_movements(&self, query: &MovementListQuery) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            {}
            WHERE ($1::uuid IS NULL OR m.declinaison_id = $1)
            ORDER BY m.created_at DESC
            LIMIT $2
            "#,
            MOVEMENT_SELECT
        ))
        .bind(query.declination_id)
        .bind(query.effective_limit())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }
}
