//! Catalog models: articles, their declinations and photos

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::validation::{
    find_duplicate_barcode, find_duplicate_variant, validate_barcode, validate_money,
};

/// Default minimum quantity before a declination raises a stock alert
pub const DEFAULT_QUANTITY_MIN: i32 = 5;

/// Seasonal collection tag carried by every article
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    #[serde(rename = "HIVER_2024")]
    Winter2024,
    #[serde(rename = "ETE_2024")]
    Summer2024,
    #[serde(rename = "AUTOMNE_2024")]
    Autumn2024,
    #[serde(rename = "PRINTEMPS_2025")]
    Spring2025,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Winter2024,
        Collection::Summer2024,
        Collection::Autumn2024,
        Collection::Spring2025,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Winter2024 => "HIVER_2024",
            Collection::Summer2024 => "ETE_2024",
            Collection::Autumn2024 => "AUTOMNE_2024",
            Collection::Spring2025 => "PRINTEMPS_2025",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Human-readable label shown by the catalog UI
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Winter2024 => "Hiver 2024",
            Collection::Summer2024 => "Été 2024",
            Collection::Autumn2024 => "Automne 2024",
            Collection::Spring2025 => "Printemps 2025",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection entry returned by the reference table endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub code: Collection,
    pub label: String,
}

/// A sellable product line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: Uuid,
    /// Unique, immutable reference code (e.g. "TSH-001")
    pub reference: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "marque")]
    pub brand: Option<String>,
    pub collection: Collection,
    #[serde(rename = "prix_achat")]
    pub purchase_price: Decimal,
    #[serde(rename = "prix_vente")]
    pub sale_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id,
            reference: self.reference.clone(),
            name: self.name.clone(),
            brand: self.brand.clone(),
        }
    }
}

/// A stocked size/color variant of an article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Declination {
    pub id: Uuid,
    pub article_id: Uuid,
    #[serde(rename = "taille")]
    pub size: String,
    #[serde(rename = "couleur")]
    pub color: String,
    #[serde(rename = "quantite")]
    pub quantity: i32,
    #[serde(rename = "quantite_min")]
    pub quantity_min: i32,
    #[serde(rename = "code_barre")]
    pub barcode: Option<String>,
}

impl Declination {
    /// Display label used in error messages and movement history: "M - Blanc"
    pub fn variant_label(&self) -> String {
        format!("{} - {}", self.size, self.color)
    }

    pub fn is_low_stock(&self) -> bool {
        crate::models::is_low_stock(self.quantity, self.quantity_min)
    }
}

/// Photo attached to an article; files themselves are served elsewhere
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticlePhoto {
    pub id: Uuid,
    pub article_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Article with everything it owns, as returned by catalog reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleWithDeclinations {
    #[serde(flatten)]
    pub article: Article,
    #[serde(rename = "declinaisons")]
    pub declinations: Vec<Declination>,
    pub photos: Vec<ArticlePhoto>,
}

/// Input for creating an article together with its initial declinations
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 50, message = "Reference must be 1-50 characters"))]
    pub reference: String,
    #[serde(rename = "nom")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[serde(rename = "marque")]
    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,
    pub collection: Collection,
    #[serde(rename = "prix_achat")]
    #[validate(custom = "validate_money")]
    pub purchase_price: Decimal,
    #[serde(rename = "prix_vente")]
    #[validate(custom = "validate_money")]
    pub sale_price: Decimal,
    #[serde(rename = "declinaisons")]
    pub declinations: Vec<DeclinationInput>,
    #[serde(default)]
    pub photos: Vec<PhotoInput>,
}

/// Reasons a new article is rejected before anything is written
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("an article needs at least one declination")]
    NoDeclinations,

    #[error("barcode {0} is used by two declinations")]
    DuplicateBarcode(String),

    #[error("declination {size} - {color} is listed twice")]
    DuplicateVariant { size: String, color: String },
}

impl CreateArticleRequest {
    /// Every rule that does not need the database.
    ///
    /// Creation inserts nothing unless this passes, so a bad declination or
    /// photo never leaves a half-created article behind.
    pub fn check(&self) -> Result<(), CatalogError> {
        self.validate()?;
        if self.declinations.is_empty() {
            return Err(CatalogError::NoDeclinations);
        }
        for declination in &self.declinations {
            declination.validate()?;
        }
        for photo in &self.photos {
            photo.validate()?;
        }
        if let Some(barcode) =
            find_duplicate_barcode(self.declinations.iter().map(|d| d.barcode.as_deref()))
        {
            return Err(CatalogError::DuplicateBarcode(barcode.to_string()));
        }
        if let Some((size, color)) = find_duplicate_variant(
            self.declinations
                .iter()
                .map(|d| (d.size.as_str(), d.color.as_str())),
        ) {
            return Err(CatalogError::DuplicateVariant {
                size: size.to_string(),
                color: color.to_string(),
            });
        }
        Ok(())
    }
}

/// A declination supplied at article creation or added later
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeclinationInput {
    #[serde(rename = "taille")]
    #[validate(length(min = 1, max = 20, message = "Size must be 1-20 characters"))]
    pub size: String,
    #[serde(rename = "couleur")]
    #[validate(length(min = 1, max = 50, message = "Color must be 1-50 characters"))]
    pub color: String,
    #[serde(rename = "quantite", default)]
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[serde(rename = "quantite_min", default = "default_quantity_min")]
    #[validate(range(min = 0, message = "Minimum quantity cannot be negative"))]
    pub quantity_min: i32,
    #[serde(rename = "code_barre")]
    #[validate(custom = "validate_barcode")]
    pub barcode: Option<String>,
}

fn default_quantity_min() -> i32 {
    DEFAULT_QUANTITY_MIN
}

/// Photo reference supplied at article creation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PhotoInput {
    #[validate(length(min = 1, max = 500, message = "Photo URL must be 1-500 characters"))]
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Partial update of an article's scalar fields
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    /// Accepted only so a changed value can be rejected explicitly
    pub reference: Option<String>,
    #[serde(rename = "nom")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    #[serde(rename = "marque")]
    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,
    pub collection: Option<Collection>,
    #[serde(rename = "prix_achat")]
    #[validate(custom = "validate_money")]
    pub purchase_price: Option<Decimal>,
    #[serde(rename = "prix_vente")]
    #[validate(custom = "validate_money")]
    pub sale_price: Option<Decimal>,
}

/// Partial update of a declination; quantity only moves through sales and stock movements
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDeclinationRequest {
    #[serde(rename = "taille")]
    #[validate(length(min = 1, max = 20, message = "Size must be 1-20 characters"))]
    pub size: Option<String>,
    #[serde(rename = "couleur")]
    #[validate(length(min = 1, max = 50, message = "Color must be 1-50 characters"))]
    pub color: Option<String>,
    #[serde(rename = "quantite_min")]
    #[validate(range(min = 0, message = "Minimum quantity cannot be negative"))]
    pub quantity_min: Option<i32>,
    #[serde(rename = "code_barre")]
    #[validate(custom = "validate_barcode")]
    pub barcode: Option<String>,
}

/// Sortable article columns, mapped to their SQL names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleSortField {
    #[default]
    CreatedAt,
    Reference,
    Name,
    PurchasePrice,
    SalePrice,
}

impl ArticleSortField {
    /// Accepts both the wire names and the English field names
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(Self::CreatedAt),
            "reference" => Some(Self::Reference),
            "nom" | "name" => Some(Self::Name),
            "prix_achat" | "purchase_price" => Some(Self::PurchasePrice),
            "prix_vente" | "sale_price" => Some(Self::SalePrice),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Reference => "reference",
            Self::Name => "nom",
            Self::PurchasePrice => "prix_achat",
            Self::SalePrice => "prix_vente",
        }
    }
}

/// Article summary paired with a declination, used by barcode lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclinationWithArticle {
    #[serde(flatten)]
    pub declination: Declination,
    pub article: ArticleSummary,
}

/// Display fields of an article captured alongside other records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub reference: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "marque")]
    pub brand: Option<String>,
}
