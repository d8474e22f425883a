//! Database models for the Stock Chic server
//!
//! Row types read with `sqlx::FromRow` and their conversion into the shared
//! domain models. Enums are stored as text and parsed on the way out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{
    Article, ArticlePhoto, ArticleSummary, Collection, Declination, MovementType, PaymentMethod,
    Sale, SaleItem, SaleStatus, StockMovement,
};

fn unknown(kind: &str, value: &str) -> AppError {
    AppError::Internal(format!("Unknown {} in database: {}", kind, value))
}

pub const ARTICLE_COLUMNS: &str =
    "id, reference, nom, marque, collection, prix_achat, prix_vente, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub reference: String,
    pub nom: String,
    pub marque: Option<String>,
    pub collection: String,
    pub prix_achat: Decimal,
    pub prix_vente: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for Article {
    type Error = AppError;

    fn try_from(row: ArticleRow) -> AppResult<Self> {
        let collection =
            Collection::parse(&row.collection).ok_or_else(|| unknown("collection", &row.collection))?;
        Ok(Article {
            id: row.id,
            reference: row.reference,
            name: row.nom,
            brand: row.marque,
            collection,
            purchase_price: row.prix_achat,
            sale_price: row.prix_vente,
            created_at: row.created_at,
        })
    }
}

pub const DECLINATION_COLUMNS: &str =
    "id, article_id, taille, couleur, quantite, quantite_min, code_barre";

#[derive(Debug, Clone, FromRow)]
pub struct DeclinationRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub taille: String,
    pub couleur: String,
    pub quantite: i32,
    pub quantite_min: i32,
    pub code_barre: Option<String>,
}

impl From<DeclinationRow> for Declination {
    fn from(row: DeclinationRow) -> Self {
        Declination {
            id: row.id,
            article_id: row.article_id,
            size: row.taille,
            color: row.couleur,
            quantity: row.quantite,
            quantity_min: row.quantite_min,
            barcode: row.code_barre,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PhotoRow> for ArticlePhoto {
    fn from(row: PhotoRow) -> Self {
        ArticlePhoto {
            id: row.id,
            article_id: row.article_id,
            url: row.url,
            alt_text: row.alt_text,
            is_primary: row.is_primary,
            created_at: row.created_at,
        }
    }
}

/// Declination joined with the display fields of its article
#[derive(Debug, Clone, FromRow)]
pub struct DeclinationArticleRow {
    #[sqlx(flatten)]
    pub declination: DeclinationRow,
    pub reference: String,
    pub nom: String,
    pub marque: Option<String>,
}

impl DeclinationArticleRow {
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.declination.article_id,
            reference: self.reference.clone(),
            name: self.nom.clone(),
            brand: self.marque.clone(),
        }
    }
}

pub const SALE_COLUMNS: &str = "id, numero_vente, client_nom, client_email, client_telephone, \
     montant_total, montant_paye, montant_rendu, mode_paiement, statut, notes, vendeur_id, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct SaleRow {
    pub id: Uuid,
    pub numero_vente: String,
    pub client_nom: Option<String>,
    pub client_email: Option<String>,
    pub client_telephone: Option<String>,
    pub montant_total: Decimal,
    pub montant_paye: Decimal,
    pub montant_rendu: Decimal,
    pub mode_paiement: String,
    pub statut: String,
    pub notes: Option<String>,
    pub vendeur_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SaleRow {
    pub fn into_sale(self, items: Vec<SaleItem>) -> AppResult<Sale> {
        let payment_method = PaymentMethod::parse(&self.mode_paiement)
            .ok_or_else(|| unknown("payment method", &self.mode_paiement))?;
        let status =
            SaleStatus::parse(&self.statut).ok_or_else(|| unknown("sale status", &self.statut))?;

        Ok(Sale {
            id: self.id,
            sale_number: self.numero_vente,
            client_name: self.client_nom,
            client_email: self.client_email,
            client_phone: self.client_telephone,
            items,
            total_amount: self.montant_total,
            amount_paid: self.montant_paye,
            change_due: self.montant_rendu,
            payment_method,
            status,
            notes: self.notes,
            seller_id: self.vendeur_id,
            created_at: self.created_at,
        })
    }
}

pub const SALE_ITEM_COLUMNS: &str = "id, vente_id, article_id, declinaison_id, article_nom, \
     article_reference, taille, couleur, quantite, prix_unitaire, prix_total";

#[derive(Debug, Clone, FromRow)]
pub struct SaleItemRow {
    pub id: Uuid,
    pub vente_id: Uuid,
    pub article_id: Uuid,
    pub declinaison_id: Uuid,
    pub article_nom: String,
    pub article_reference: String,
    pub taille: String,
    pub couleur: String,
    pub quantite: i32,
    pub prix_unitaire: Decimal,
    pub prix_total: Decimal,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.vente_id,
            article_id: row.article_id,
            declination_id: row.declinaison_id,
            article_name: row.article_nom,
            article_reference: row.article_reference,
            size: row.taille,
            color: row.couleur,
            quantity: row.quantite,
            unit_price: row.prix_unitaire,
            line_total: row.prix_total,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MovementRow {
    pub id: Uuid,
    pub declinaison_id: Uuid,
    pub article_id: Uuid,
    pub article_nom: String,
    pub taille: String,
    pub couleur: String,
    pub type_mouvement: String,
    pub quantite: i32,
    pub quantite_apres: i32,
    pub motif: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> AppResult<Self> {
        let movement_type = MovementType::parse(&row.type_mouvement)
            .ok_or_else(|| unknown("movement type", &row.type_mouvement))?;
        Ok(StockMovement {
            id: row.id,
            declination_id: row.declinaison_id,
            article_id: row.article_id,
            article_name: row.article_nom,
            size: row.taille,
            color: row.couleur,
            movement_type,
            delta: row.quantite,
            quantity_after: row.quantite_apres,
            reason: row.motif,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_row_rejects_unknown_collection() {
        let row = ArticleRow {
            id: Uuid::new_v4(),
            reference: "TSH-001".into(),
            nom: "T-shirt".into(),
            marque: None,
            collection: "HIVER_1999".into(),
            prix_achat: Decimal::ZERO,
            prix_vente: Decimal::ZERO,
            created_at: Utc::now(),
        };
        assert!(Article::try_from(row).is_err());
    }

    #[test]
    fn test_sale_row_parses_enums() {
        let row = SaleRow {
            id: Uuid::new_v4(),
            numero_vente: "VTE-2024-000001".into(),
            client_nom: None,
            client_email: None,
            client_telephone: None,
            montant_total: Decimal::new(5000, 2),
            montant_paye: Decimal::new(5000, 2),
            montant_rendu: Decimal::ZERO,
            mode_paiement: "MOBILE_MONEY".into(),
            statut: "VALIDEE".into(),
            notes: None,
            vendeur_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let sale = row.into_sale(vec![]).unwrap();
        assert_eq!(sale.payment_method, PaymentMethod::MobileMoney);
        assert_eq!(sale.status, SaleStatus::Validated);
    }
}
