//! Stock alerts and manual stock movements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::article::{ArticleSummary, Declination};

/// A declination is in alert once its quantity reaches its threshold
pub fn is_low_stock(quantity: i32, quantity_min: i32) -> bool {
    quantity <= quantity_min
}

/// Units needed to climb back to the threshold, never negative
pub fn missing_quantity(quantity: i32, quantity_min: i32) -> i32 {
    (quantity_min - quantity).max(0)
}

/// A declination at or below its minimum quantity, with its article's display fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockAlert {
    pub article_id: Uuid,
    pub reference: String,
    #[serde(rename = "nom")]
    pub article_name: String,
    #[serde(rename = "marque")]
    pub brand: Option<String>,
    #[serde(rename = "declinaison_id")]
    pub declination_id: Uuid,
    #[serde(rename = "taille")]
    pub size: String,
    #[serde(rename = "couleur")]
    pub color: String,
    #[serde(rename = "quantite")]
    pub quantity: i32,
    #[serde(rename = "quantite_min")]
    pub quantity_min: i32,
    #[serde(rename = "quantite_manquante")]
    pub missing: i32,
}

impl StockAlert {
    /// Build the alert for a declination, or `None` when it is above threshold
    pub fn for_declination(article: &ArticleSummary, declination: &Declination) -> Option<Self> {
        if !declination.is_low_stock() {
            return None;
        }
        Some(Self {
            article_id: article.id,
            reference: article.reference.clone(),
            article_name: article.name.clone(),
            brand: article.brand.clone(),
            declination_id: declination.id,
            size: declination.size.clone(),
            color: declination.color.clone(),
            quantity: declination.quantity,
            quantity_min: declination.quantity_min,
            missing: missing_quantity(declination.quantity, declination.quantity_min),
        })
    }
}

/// Scan a catalog and return every alert, most urgent first
///
/// Ordering: largest `missing` first, then article reference, size, color.
pub fn collect_stock_alerts<'a, I>(catalog: I) -> Vec<StockAlert>
where
    I: IntoIterator<Item = (&'a ArticleSummary, &'a Declination)>,
{
    let mut alerts: Vec<StockAlert> = catalog
        .into_iter()
        .filter_map(|(article, declination)| StockAlert::for_declination(article, declination))
        .collect();
    sort_alerts(&mut alerts);
    alerts
}

pub fn sort_alerts(alerts: &mut [StockAlert]) {
    alerts.sort_by(|a, b| {
        b.missing
            .cmp(&a.missing)
            .then_with(|| a.reference.cmp(&b.reference))
            .then_with(|| a.size.cmp(&b.size))
            .then_with(|| a.color.cmp(&b.color))
    });
}

/// Kind of manual stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Restock from a supplier
    #[serde(rename = "ENTREE")]
    Restock,
    /// Customer return
    #[serde(rename = "RETOUR_CLIENT")]
    CustomerReturn,
    /// Loss, theft or damage
    #[serde(rename = "SORTIE_PERTE")]
    Loss,
    /// Inventory count correction, signed
    #[serde(rename = "AJUSTEMENT")]
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Restock => "ENTREE",
            MovementType::CustomerReturn => "RETOUR_CLIENT",
            MovementType::Loss => "SORTIE_PERTE",
            MovementType::Adjustment => "AJUSTEMENT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ENTREE" => Some(MovementType::Restock),
            "RETOUR_CLIENT" => Some(MovementType::CustomerReturn),
            "SORTIE_PERTE" => Some(MovementType::Loss),
            "AJUSTEMENT" => Some(MovementType::Adjustment),
            _ => None,
        }
    }
}

/// A recorded manual stock movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockMovement {
    pub id: Uuid,
    #[serde(rename = "declinaison_id")]
    pub declination_id: Uuid,
    pub article_id: Uuid,
    #[serde(rename = "article_nom")]
    pub article_name: String,
    #[serde(rename = "taille")]
    pub size: String,
    #[serde(rename = "couleur")]
    pub color: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Signed change applied to the declination
    #[serde(rename = "quantite")]
    pub delta: i32,
    #[serde(rename = "quantite_apres")]
    pub quantity_after: i32,
    #[serde(rename = "motif")]
    pub reason: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Manual stock movement request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMovementRequest {
    #[serde(rename = "declinaison_id")]
    pub declination_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Positive for every type except `AJUSTEMENT`, which takes a signed non-zero delta
    #[serde(rename = "quantite")]
    pub quantity: i32,
    #[serde(rename = "motif")]
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementListQuery {
    pub limit: Option<i64>,
    #[serde(rename = "declinaison_id")]
    pub declination_id: Option<Uuid>,
}

impl MovementListQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 500;

    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> ArticleSummary {
        ArticleSummary {
            id: Uuid::new_v4(),
            reference: "TSH-001".into(),
            name: "T-shirt Basic Blanc".into(),
            brand: Some("Stock Chic".into()),
        }
    }

    fn declination(article_id: Uuid, size: &str, quantity: i32, quantity_min: i32) -> Declination {
        Declination {
            id: Uuid::new_v4(),
            article_id,
            size: size.into(),
            color: "Blanc".into(),
            quantity,
            quantity_min,
            barcode: None,
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(is_low_stock(5, 5));
        assert!(is_low_stock(0, 0));
        assert!(!is_low_stock(6, 5));
    }

    #[test]
    fn test_missing_quantity_never_negative() {
        assert_eq!(missing_quantity(2, 5), 3);
        assert_eq!(missing_quantity(5, 5), 0);
        assert_eq!(missing_quantity(9, 5), 0);
    }

    #[test]
    fn test_collect_alerts_sorted_by_urgency() {
        let a = article();
        let s = declination(a.id, "S", 4, 5);
        let m = declination(a.id, "M", 15, 5);
        let l = declination(a.id, "L", 0, 5);

        let alerts = collect_stock_alerts([(&a, &s), (&a, &m), (&a, &l)]);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].size, "L");
        assert_eq!(alerts[0].missing, 5);
        assert_eq!(alerts[1].size, "S");
        assert_eq!(alerts[1].missing, 1);
    }

    #[test]
    fn test_alert_wire_names() {
        let a = article();
        let d = declination(a.id, "M", 1, 5);
        let alert = StockAlert::for_declination(&a, &d).unwrap();
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["nom"], "T-shirt Basic Blanc");
        assert_eq!(json["quantite_manquante"], 4);
        assert_eq!(json["taille"], "M");
    }

    #[test]
    fn test_movement_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&MovementType::CustomerReturn).unwrap(),
            "\"RETOUR_CLIENT\""
        );
        assert_eq!(MovementType::parse("SORTIE_PERTE"), Some(MovementType::Loss));
        assert_eq!(MovementType::parse("SORTIE_VENTE"), None);
    }
}
