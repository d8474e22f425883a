//! Catalog request tests
//!
//! Tests for article and sale request bodies including:
//! - Wire field names accepted at the API boundary
//! - Field validation before any database access
//! - Duplicate barcodes and variants within one request

use shared::{
    check_reference_unchanged, find_duplicate_barcode, find_duplicate_variant, CatalogError,
    Collection, CreateArticleRequest, CreateSaleRequest, PaymentMethod, UpdateArticleRequest,
    DEFAULT_QUANTITY_MIN,
};
use validator::Validate;

fn article_body(declinations: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "reference": "TSH-001",
        "nom": "T-shirt Basic Blanc",
        "marque": "Stock Chic",
        "collection": "ETE_2024",
        "prix_achat": "10.00",
        "prix_vente": "25.00",
        "declinaisons": declinations
    })
}

#[test]
fn test_article_request_wire_names() {
    let body = article_body(serde_json::json!([
        { "taille": "M", "couleur": "Blanc", "quantite": 15, "code_barre": "3760001" }
    ]));
    let request: CreateArticleRequest = serde_json::from_value(body).unwrap();

    assert_eq!(request.collection, Collection::Summer2024);
    assert_eq!(request.declinations.len(), 1);
    assert_eq!(request.declinations[0].quantity, 15);
    assert_eq!(request.declinations[0].quantity_min, DEFAULT_QUANTITY_MIN);
    assert!(request.photos.is_empty());
    assert!(request.validate().is_ok());
    assert!(request.declinations[0].validate().is_ok());
}

#[test]
fn test_unknown_collection_rejected() {
    let mut body = article_body(serde_json::json!([]));
    body["collection"] = serde_json::json!("HIVER_2030");
    assert!(serde_json::from_value::<CreateArticleRequest>(body).is_err());
}

#[test]
fn test_price_with_three_decimals_invalid() {
    let mut body = article_body(serde_json::json!([]));
    body["prix_vente"] = serde_json::json!("25.005");
    let request: CreateArticleRequest = serde_json::from_value(body).unwrap();

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("sale_price"));
}

#[test]
fn test_negative_declination_quantity_invalid() {
    let body = article_body(serde_json::json!([
        { "taille": "M", "couleur": "Blanc", "quantite": -1 }
    ]));
    let request: CreateArticleRequest = serde_json::from_value(body).unwrap();

    let errors = request.declinations[0].validate().unwrap_err();
    assert!(errors.field_errors().contains_key("quantity"));
}

#[test]
fn test_duplicates_within_request() {
    let body = article_body(serde_json::json!([
        { "taille": "M", "couleur": "Blanc", "code_barre": "3760001" },
        { "taille": "L", "couleur": "Blanc", "code_barre": "3760001" },
        { "taille": "M", "couleur": "Blanc" }
    ]));
    let request: CreateArticleRequest = serde_json::from_value(body).unwrap();

    assert_eq!(
        find_duplicate_barcode(request.declinations.iter().map(|d| d.barcode.as_deref())),
        Some("3760001")
    );
    assert_eq!(
        find_duplicate_variant(
            request
                .declinations
                .iter()
                .map(|d| (d.size.as_str(), d.color.as_str()))
        ),
        Some(("M", "Blanc"))
    );
}

#[test]
fn test_create_checks_whole_request_up_front() {
    let request: CreateArticleRequest =
        serde_json::from_value(article_body(serde_json::json!([]))).unwrap();
    assert!(matches!(request.check(), Err(CatalogError::NoDeclinations)));

    // The first declination is fine, the second is not: nothing may be created
    let body = article_body(serde_json::json!([
        { "taille": "M", "couleur": "Blanc", "quantite": 15 },
        { "taille": "", "couleur": "Blanc" }
    ]));
    let request: CreateArticleRequest = serde_json::from_value(body).unwrap();
    assert!(matches!(request.check(), Err(CatalogError::Invalid(_))));
}

#[test]
fn test_price_beyond_column_range_invalid() {
    let mut body = article_body(serde_json::json!([{ "taille": "M", "couleur": "Blanc" }]));
    body["prix_vente"] = serde_json::json!("10000000000.00");
    let request: CreateArticleRequest = serde_json::from_value(body).unwrap();

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("sale_price"));
}

#[test]
fn test_update_cannot_change_reference() {
    let update: UpdateArticleRequest =
        serde_json::from_value(serde_json::json!({ "reference": "TSH-002", "nom": "T-shirt" }))
            .unwrap();
    assert!(check_reference_unchanged("TSH-001", update.reference.as_deref()).is_err());

    let update: UpdateArticleRequest =
        serde_json::from_value(serde_json::json!({ "nom": "T-shirt" })).unwrap();
    assert!(check_reference_unchanged("TSH-001", update.reference.as_deref()).is_ok());
}

#[test]
fn test_sale_request_wire_names() {
    let body = serde_json::json!({
        "client_nom": "Awa Diop",
        "items": [{
            "article_id": "7f8d7c1e-2f43-4c6f-9a51-0c2b8e1d4a11",
            "declinaison_id": "0b3f54c6-4f1e-4d5b-8a0e-7e9a6c2d1f22",
            "quantite": 2,
            "prix_unitaire": "25.00"
        }],
        "montant_paye": "50.00",
        "mode_paiement": "MOBILE_MONEY"
    });
    let request: CreateSaleRequest = serde_json::from_value(body).unwrap();

    assert_eq!(request.client_name.as_deref(), Some("Awa Diop"));
    assert_eq!(request.payment_method, PaymentMethod::MobileMoney);
    assert_eq!(request.items[0].quantity, 2);
    assert!(request.validate().is_ok());
}

#[test]
fn test_sale_line_quantity_zero_invalid() {
    let body = serde_json::json!({
        "items": [{
            "article_id": "7f8d7c1e-2f43-4c6f-9a51-0c2b8e1d4a11",
            "declinaison_id": "0b3f54c6-4f1e-4d5b-8a0e-7e9a6c2d1f22",
            "quantite": 0,
            "prix_unitaire": "25.00"
        }],
        "montant_paye": "50.00",
        "mode_paiement": "ESPECES"
    });
    let request: CreateSaleRequest = serde_json::from_value(body).unwrap();

    let errors = request.items[0].validate().unwrap_err();
    assert!(errors.field_errors().contains_key("quantity"));
}

#[test]
fn test_unknown_payment_method_rejected() {
    let body = serde_json::json!({
        "items": [],
        "montant_paye": "0",
        "mode_paiement": "BITCOIN"
    });
    assert!(serde_json::from_value::<CreateSaleRequest>(body).is_err());
}
