//! Sale ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_money;

/// How the customer settled a sale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[serde(rename = "ESPECES")]
    Cash,
    #[serde(rename = "CARTE")]
    Card,
    #[serde(rename = "CHEQUE")]
    Check,
    #[serde(rename = "VIREMENT")]
    Transfer,
    MobileMoney,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "ESPECES",
            PaymentMethod::Card => "CARTE",
            PaymentMethod::Check => "CHEQUE",
            PaymentMethod::Transfer => "VIREMENT",
            PaymentMethod::MobileMoney => "MOBILE_MONEY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ESPECES" => Some(PaymentMethod::Cash),
            "CARTE" => Some(PaymentMethod::Card),
            "CHEQUE" => Some(PaymentMethod::Check),
            "VIREMENT" => Some(PaymentMethod::Transfer),
            "MOBILE_MONEY" => Some(PaymentMethod::MobileMoney),
            _ => None,
        }
    }
}

/// Sale lifecycle: `EnAttente -> Validee -> Annulee`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SaleStatus {
    #[serde(rename = "EN_ATTENTE")]
    Pending,
    #[serde(rename = "VALIDEE")]
    Validated,
    #[serde(rename = "ANNULEE")]
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "EN_ATTENTE",
            SaleStatus::Validated => "VALIDEE",
            SaleStatus::Cancelled => "ANNULEE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EN_ATTENTE" => Some(SaleStatus::Pending),
            "VALIDEE" => Some(SaleStatus::Validated),
            "ANNULEE" => Some(SaleStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Pending, SaleStatus::Validated)
                | (SaleStatus::Validated, SaleStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded point-of-sale transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub id: Uuid,
    #[serde(rename = "numero_vente")]
    pub sale_number: String,
    #[serde(rename = "client_nom")]
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    #[serde(rename = "client_telephone")]
    pub client_phone: Option<String>,
    pub items: Vec<SaleItem>,
    #[serde(rename = "montant_total")]
    pub total_amount: Decimal,
    #[serde(rename = "montant_paye")]
    pub amount_paid: Decimal,
    #[serde(rename = "montant_rendu")]
    pub change_due: Decimal,
    #[serde(rename = "mode_paiement")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "statut")]
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[serde(rename = "vendeur_id")]
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One line of a sale, with the catalog display fields frozen at sale time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    pub id: Uuid,
    #[serde(rename = "vente_id")]
    pub sale_id: Uuid,
    pub article_id: Uuid,
    #[serde(rename = "declinaison_id")]
    pub declination_id: Uuid,
    #[serde(rename = "article_nom")]
    pub article_name: String,
    pub article_reference: String,
    #[serde(rename = "taille")]
    pub size: String,
    #[serde(rename = "couleur")]
    pub color: String,
    #[serde(rename = "quantite")]
    pub quantity: i32,
    #[serde(rename = "prix_unitaire")]
    pub unit_price: Decimal,
    #[serde(rename = "prix_total")]
    pub line_total: Decimal,
}

/// Sale creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSaleRequest {
    #[serde(rename = "client_nom")]
    #[validate(length(max = 255, message = "Client name must be at most 255 characters"))]
    pub client_name: Option<String>,
    #[validate(email(message = "Invalid client email"))]
    pub client_email: Option<String>,
    #[serde(rename = "client_telephone")]
    #[validate(length(max = 30, message = "Client phone must be at most 30 characters"))]
    pub client_phone: Option<String>,
    pub items: Vec<CreateSaleItem>,
    #[serde(rename = "montant_paye")]
    #[validate(custom = "validate_money")]
    pub amount_paid: Decimal,
    #[serde(rename = "mode_paiement")]
    pub payment_method: PaymentMethod,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// A requested sale line; the unit price is the till price and may differ from the catalog
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSaleItem {
    pub article_id: Uuid,
    #[serde(rename = "declinaison_id")]
    pub declination_id: Uuid,
    #[serde(rename = "quantite")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(rename = "prix_unitaire")]
    #[validate(custom = "validate_money")]
    pub unit_price: Decimal,
}

/// Ledger listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleListQuery {
    pub limit: Option<i64>,
    #[serde(rename = "statut", alias = "status")]
    pub status: Option<SaleStatus>,
}

impl SaleListQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 500;

    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}
