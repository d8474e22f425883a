//! Catalog service: articles, declinations and photos

use std::collections::HashMap;

use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    ArticleRow, DeclinationArticleRow, DeclinationRow, PhotoRow, ARTICLE_COLUMNS,
    DECLINATION_COLUMNS,
};
use shared::{
    check_reference_unchanged, Article, ArticlePhoto, ArticleSortField, ArticleWithDeclinations, Collection, CollectionInfo, CreateArticleRequest, Declination,
    DeclinationInput, DeclinationWithArticle, PaginatedResponse, Pagination, SortOrder,
    UpdateArticleRequest, UpdateDeclinationRequest,
};

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Article listing query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub collection: Option<Collection>,
    pub marque: Option<String>,
    pub search: Option<String>,
}

impl ArticleListQuery {
    fn sort(&self) -> AppResult<(ArticleSortField, SortOrder)> {
        let field = match self.sort_by.as_deref() {
            None | Some("") => ArticleSortField::default(),
            Some(value) => ArticleSortField::parse(value).ok_or_else(|| {
                AppError::validation(
                    "sort_by",
                    format!("Cannot sort by {}", value),
                    format!("Tri impossible sur {}", value),
                )
            })?,
        };
        let order = match self.sort_order.as_deref() {
            None | Some("") => SortOrder::default(),
            Some(value) => SortOrder::parse(value).ok_or_else(|| {
                AppError::validation(
                    "sort_order",
                    "Sort order must be asc or desc",
                    "L'ordre de tri doit être asc ou desc",
                )
            })?,
        };
        Ok((field, order))
    }

    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)))
    }

    /// Case-insensitive exact match on the brand
    fn brand_pattern(&self) -> Option<String> {
        self.marque
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(escape_like)
    }
}

/// Make user text match literally inside a LIKE pattern using `ESCAPE '\'`
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const ARTICLE_FILTER: &str = r#"
    ($1::text IS NULL OR collection = $1)
    AND ($2::text IS NULL OR marque ILIKE $2 ESCAPE '\')
    AND ($3::text IS NULL OR nom ILIKE $3 ESCAPE '\' OR reference ILIKE $3 ESCAPE '\')
"#;

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Collection tags with their display labels
    pub async fn list_collections(&self) -> AppResult<Vec<CollectionInfo>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT code, label FROM collections ORDER BY sort_order, code",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(code, label)| {
                Collection::parse(&code).map(|code| CollectionInfo { code, label })
            })
            .collect())
    }

    /// Create an article with its declinations and photos, all or nothing
    pub async fn create_article(
        &self,
        input: CreateArticleRequest,
    ) -> AppResult<ArticleWithDeclinations> {
        input.check()?;

        let mut tx = self.db.begin().await?;

        let article_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO articles (reference, nom, marque, collection, prix_achat, prix_vente)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.reference.trim())
        .bind(&input.name)
        .bind(&input.brand)
        .bind(input.collection.as_str())
        .bind(input.purchase_price)
        .bind(input.sale_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from_unique_violation)?;

        for declination in &input.declinations {
            Self::insert_declination(&mut tx, article_id, declination).await?;
        }

        for photo in &input.photos {
            sqlx::query(
                r#"
                INSERT INTO article_photos (article_id, url, alt_text, is_primary)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(article_id)
            .bind(&photo.url)
            .bind(&photo.alt_text)
            .bind(photo.is_primary)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            article_id = %article_id,
            reference = %input.reference,
            declinations = input.declinations.len(),
            "Article created"
        );

        self.get_article(article_id).await
    }

    async fn insert_declination(
        tx: &mut Transaction<'_, Postgres>,
        article_id: Uuid,
        input: &DeclinationInput,
    ) -> AppResult<DeclinationRow> {
        sqlx::query_as::<_, DeclinationRow>(&format!(
            r#"
            INSERT INTO declinaisons (article_id, taille, couleur, quantite, quantite_min, code_barre)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            DECLINATION_COLUMNS
        ))
        .bind(article_id)
        .bind(&input.size)
        .bind(&input.color)
        .bind(input.quantity)
        .bind(input.quantity_min)
        .bind(&input.barcode)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::from_unique_violation)
    }

    /// Get an article with its declinations and photos
    pub async fn get_article(&self, article_id: Uuid) -> AppResult<ArticleWithDeclinations> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {} FROM articles WHERE id = $1",
            ARTICLE_COLUMNS
        ))
        .bind(article_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Article".to_string()))?;

        self.with_children(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Article".to_string()))
    }

    pub async fn get_article_by_reference(
        &self,
        reference: &str,
    ) -> AppResult<ArticleWithDeclinations> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {} FROM articles WHERE reference = $1",
            ARTICLE_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Article".to_string()))?;

        self.with_children(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Article".to_string()))
    }

    /// List articles with filters, sorting and pagination
    pub async fn list_articles(
        &self,
        query: &ArticleListQuery,
    ) -> AppResult<PaginatedResponse<ArticleWithDeclinations>> {
        let pagination = Pagination::from_query(query.page, query.limit);
        let (sort_field, sort_order) = query.sort()?;
        let collection = query.collection.map(|c| c.as_str());
        let brand = query.brand_pattern();
        let search = query.search_pattern();

        let total_items = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM articles WHERE {}",
            ARTICLE_FILTER
        ))
        .bind(collection)
        .bind(brand.as_deref())
        .bind(search.as_deref())
        .fetch_one(&self.db)
        .await?;

        // Sort column comes from a closed enum, never from user text
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {} FROM articles WHERE {} ORDER BY {} {}, id ASC LIMIT $4 OFFSET $5",
            ARTICLE_COLUMNS,
            ARTICLE_FILTER,
            sort_field.column(),
            sort_order.as_sql()
        ))
        .bind(collection)
        .bind(brand.as_deref())
        .bind(search.as_deref())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let data = self.with_children(rows).await?;

        Ok(PaginatedResponse::new(
            data,
            pagination,
            u64::try_from(total_items).unwrap_or(0),
        ))
    }

    /// Attach declinations and photos to article rows, keeping row order
    async fn with_children(&self, rows: Vec<ArticleRow>) -> AppResult<Vec<ArticleWithDeclinations>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let declinations = sqlx::query_as::<_, DeclinationRow>(&format!(
            "SELECT {} FROM declinaisons WHERE article_id = ANY($1) ORDER BY taille, couleur",
            DECLINATION_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let photos = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, article_id, url, alt_text, is_primary, created_at
            FROM article_photos
            WHERE article_id = ANY($1)
            ORDER BY is_primary DESC, created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut declinations_by_article: HashMap<Uuid, Vec<Declination>> = HashMap::new();
        for row in declinations {
            declinations_by_article
                .entry(row.article_id)
                .or_default()
                .push(row.into());
        }

        let mut photos_by_article: HashMap<Uuid, Vec<ArticlePhoto>> = HashMap::new();
        for row in photos {
            photos_by_article
                .entry(row.article_id)
                .or_default()
                .push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                Ok(ArticleWithDeclinations {
                    article: Article::try_from(row)?,
                    declinations: declinations_by_article.remove(&id).unwrap_or_default(),
                    photos: photos_by_article.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Update an article's scalar fields; the reference never changes
    pub async fn update_article(
        &self,
        article_id: Uuid,
        input: UpdateArticleRequest,
    ) -> AppResult<ArticleWithDeclinations> {
        input.validate()?;

        let current_reference =
            sqlx::query_scalar::<_, String>("SELECT reference FROM articles WHERE id = $1")
                .bind(article_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Article".to_string()))?;

        let requested = input.reference.as_deref();
        check_reference_unchanged(&current_reference, requested).map_err(|msg| {
            AppError::validation(
                "reference",
                msg,
                "La référence d'un article ne peut pas être modifiée",
            )
        })?;

        sqlx::query(
            r#"
            UPDATE articles
            SET nom = COALESCE($2, nom),
                marque = COALESCE($3, marque),
                collection = COALESCE($4, collection),
                prix_achat = COALESCE($5, prix_achat),
                prix_vente = COALESCE($6, prix_vente)
            WHERE id = $1
            "#,
        )
        .bind(article_id)
        .bind(&input.name)
        .bind(&input.brand)
        .bind(input.collection.map(|c| c.as_str()))
        .bind(input.purchase_price)
        .bind(input.sale_price)
        .execute(&self.db)
        .await?;

        tracing::info!(article_id = %article_id, "Article updated");

        self.get_article(article_id).await
    }

    /// Delete an article; its declinations and photos go with it
    pub async fn delete_article(&self, article_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(article_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Article".to_string()));
        }

        tracing::info!(article_id = %article_id, "Article deleted");
        Ok(())
    }

    /// Add a declination to an existing article
    pub async fn add_declination(
        &self,
        article_id: Uuid,
        input: DeclinationInput,
    ) -> AppResult<Declination> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM articles WHERE id = $1)")
                .bind(article_id)
                .fetch_one(&mut *tx)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Article".to_string()));
        }

        let row = Self::insert_declination(&mut tx, article_id, &input).await?;
        tx.commit().await?;

        tracing::info!(article_id = %article_id, declination_id = %row.id, "Declination added");
        Ok(row.into())
    }

    /// Update a declination's descriptive fields; quantity is not editable here
    pub async fn update_declination(
        &self,
        declination_id: Uuid,
        input: UpdateDeclinationRequest,
    ) -> AppResult<Declination> {
        input.validate()?;

        let row = sqlx::query_as::<_, DeclinationRow>(&format!(
            r#"
            UPDATE declinaisons
            SET taille = COALESCE($2, taille),
                couleur = COALESCE($3, couleur),
                quantite_min = COALESCE($4, quantite_min),
                code_barre = COALESCE($5, code_barre)
            WHERE id = $1
            RETURNING {}
            "#,
            DECLINATION_COLUMNS
        ))
        .bind(declination_id)
        .bind(&input.size)
        .bind(&input.color)
        .bind(input.quantity_min)
        .bind(&input.barcode)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::from_unique_violation)?
        .ok_or_else(|| AppError::NotFound("Declinaison".to_string()))?;

        Ok(row.into())
    }

    pub async fn delete_declination(&self, declination_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM declinaisons WHERE id = $1")
            .bind(declination_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Declinaison".to_string()));
        }

        tracing::info!(declination_id = %declination_id, "Declination deleted");
        Ok(())
    }

    /// Look up a declination by barcode, for scanning at the till
    pub async fn find_by_barcode(&self, barcode: &str) -> AppResult<DeclinationWithArticle> {
        let row = sqlx::query_as::<_, DeclinationArticleRow>(
            r#"
            SELECT d.id, d.article_id, d.taille, d.couleur, d.quantite, d.quantite_min,
                   d.code_barre, a.reference, a.nom, a.marque
            FROM declinaisons d
            JOIN articles a ON a.id = d.article_id
            WHERE d.code_barre = $1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Declinaison".to_string()))?;

        let article = row.summary();
        Ok(DeclinationWithArticle {
            declination: row.declination.into(),
            article,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort() {
        let (field, order) = ArticleListQuery::default().sort().unwrap();
        assert_eq!(field, ArticleSortField::CreatedAt);
        assert_eq!(order, SortOrder::Desc);
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let query = ArticleListQuery {
            sort_by: Some("password_hash".into()),
            ..Default::default()
        };
        assert!(matches!(query.sort(), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_search_pattern() {
        let query = ArticleListQuery {
            search: Some("  tsh ".into()),
            ..Default::default()
        };
        assert_eq!(query.search_pattern().as_deref(), Some("%tsh%"));

        let query = ArticleListQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(query.search_pattern(), None);
    }

    #[test]
    fn test_like_wildcards_match_literally() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("Levi's"), "Levi's");

        let query = ArticleListQuery {
            search: Some("100%".into()),
            marque: Some(" h_m ".into()),
            ..Default::default()
        };
        assert_eq!(query.search_pattern().as_deref(), Some(r"%100\%%"));
        assert_eq!(query.brand_pattern().as_deref(), Some(r"h\_m"));
    }
}
