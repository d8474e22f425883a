//! In-memory shop used by the integration suites
//!
//! Drives the same planning engine as the PostgreSQL services: plan first,
//! then apply the plan. A rejected plan leaves the shop untouched.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use shared::{
    apply_movement, collect_stock_alerts, format_sale_number, plan_cancellation, plan_sale,
    Article, CatalogSnapshot, Collection, CreateSaleItem, CreateSaleRequest, Declination,
    MovementError, MovementType, PaymentMethod, Sale, SaleError, SaleIdentity, SalePolicy,
    SaleStatus, SequenceCounter, StockAlert,
};
use std::str::FromStr;
use uuid::Uuid;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub struct Shop {
    articles: HashMap<Uuid, Article>,
    declinations: BTreeMap<Uuid, Declination>,
    sales: HashMap<Uuid, Sale>,
    sequence: SequenceCounter,
    policy: SalePolicy,
    pub seller_id: Uuid,
}

impl Shop {
    pub fn new() -> Self {
        Self::with_policy(SalePolicy::default())
    }

    pub fn with_policy(policy: SalePolicy) -> Self {
        Self {
            articles: HashMap::new(),
            declinations: BTreeMap::new(),
            sales: HashMap::new(),
            sequence: SequenceCounter::default(),
            policy,
            seller_id: Uuid::new_v4(),
        }
    }

    pub fn add_article(&mut self, reference: &str, name: &str, sale_price: &str) -> Uuid {
        let article = Article {
            id: Uuid::new_v4(),
            reference: reference.to_string(),
            name: name.to_string(),
            brand: Some("Stock Chic".to_string()),
            collection: Collection::Summer2024,
            purchase_price: dec("10.00"),
            sale_price: dec(sale_price),
            created_at: Utc::now(),
        };
        let id = article.id;
        self.articles.insert(id, article);
        id
    }

    pub fn add_declination(
        &mut self,
        article_id: Uuid,
        size: &str,
        color: &str,
        quantity: i32,
        quantity_min: i32,
    ) -> Uuid {
        let declination = Declination {
            id: Uuid::new_v4(),
            article_id,
            size: size.to_string(),
            color: color.to_string(),
            quantity,
            quantity_min,
            barcode: None,
        };
        let id = declination.id;
        self.declinations.insert(id, declination);
        id
    }

    /// The "T-shirt Basic Blanc" fixture: one article, declination M / Blanc
    pub fn with_basic_tshirt(quantity: i32) -> (Self, Uuid, Uuid) {
        let mut shop = Self::new();
        let article_id = shop.add_article("TSH-001", "T-shirt Basic Blanc", "25.00");
        let declination_id = shop.add_declination(article_id, "M", "Blanc", quantity, 5);
        (shop, article_id, declination_id)
    }

    pub fn quantity(&self, declination_id: Uuid) -> Option<i32> {
        self.declinations.get(&declination_id).map(|d| d.quantity)
    }

    pub fn quantities(&self) -> BTreeMap<Uuid, i32> {
        self.declinations
            .iter()
            .map(|(id, d)| (*id, d.quantity))
            .collect()
    }

    pub fn set_quantity(&mut self, declination_id: Uuid, quantity: i32) {
        if let Some(d) = self.declinations.get_mut(&declination_id) {
            d.quantity = quantity;
        }
    }

    pub fn delete_declination(&mut self, declination_id: Uuid) {
        self.declinations.remove(&declination_id);
    }

    pub fn sale(&self, sale_id: Uuid) -> Option<&Sale> {
        self.sales.get(&sale_id)
    }

    pub fn sales(&self) -> Vec<Sale> {
        let mut sales: Vec<Sale> = self.sales.values().cloned().collect();
        sales.sort_by(|a, b| a.sale_number.cmp(&b.sale_number));
        sales
    }

    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::from_parts(
            self.articles.values().cloned(),
            self.declinations.values().cloned(),
        )
    }

    pub fn create_sale(&mut self, request: &CreateSaleRequest) -> Result<Sale, SaleError> {
        let draft = plan_sale(request, &self.snapshot(), &self.policy)?;
        let decrements = draft.stock_decrements.clone();

        let created_at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let sale = draft.into_sale(
            SaleIdentity {
                id: Uuid::new_v4(),
                sale_number: format_sale_number(2024, self.sequence.next()),
                seller_id: self.seller_id,
                created_at,
            },
            request,
            Uuid::new_v4,
        );

        for delta in decrements {
            self.set_quantity(delta.declination_id, delta.quantity_after);
        }
        self.sales.insert(sale.id, sale.clone());
        Ok(sale)
    }

    pub fn cancel_sale(&mut self, sale_id: Uuid) -> Result<Sale, SaleError> {
        let sale = self
            .sales
            .get(&sale_id)
            .cloned()
            .expect("unknown sale in test");
        let existing: HashSet<Uuid> = sale
            .items
            .iter()
            .map(|i| i.declination_id)
            .filter(|id| self.declinations.contains_key(id))
            .collect();

        let plan = plan_cancellation(&sale, &existing)?;
        for (declination_id, quantity) in plan.restorations {
            if let Some(d) = self.declinations.get_mut(&declination_id) {
                d.quantity += quantity;
            }
        }

        let sale = self
            .sales
            .get_mut(&sale_id)
            .expect("unknown sale in test");
        sale.status = SaleStatus::Cancelled;
        Ok(sale.clone())
    }

    pub fn record_movement(
        &mut self,
        declination_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
    ) -> Result<i32, MovementError> {
        let current = self.quantity(declination_id).expect("unknown declination in test");
        let outcome = apply_movement(current, movement_type, quantity)?;
        self.set_quantity(declination_id, outcome.quantity_after);
        Ok(outcome.quantity_after)
    }

    pub fn alerts(&self) -> Vec<StockAlert> {
        let pairs: Vec<_> = self
            .declinations
            .values()
            .filter_map(|d| self.articles.get(&d.article_id).map(|a| (a.summary(), d)))
            .collect();
        collect_stock_alerts(pairs.iter().map(|(a, d)| (a, *d)))
    }
}

pub fn line(article_id: Uuid, declination_id: Uuid, quantity: i32, unit_price: &str) -> CreateSaleItem {
    CreateSaleItem {
        article_id,
        declination_id,
        quantity,
        unit_price: dec(unit_price),
    }
}

pub fn sale_request(items: Vec<CreateSaleItem>, amount_paid: &str) -> CreateSaleRequest {
    CreateSaleRequest {
        client_name: None,
        client_email: None,
        client_phone: None,
        items,
        amount_paid: dec(amount_paid),
        payment_method: PaymentMethod::Card,
        notes: None,
    }
}
