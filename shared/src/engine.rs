//! Stock adjustment engine
//!
//! Pure planning for the three operations that move stock: creating a sale,
//! cancelling a sale and recording a manual movement. The store loads (and
//! locks) the rows involved, asks the engine for a plan, then writes the plan
//! in one transaction. Nothing here mutates state, so a rejected plan leaves
//! the store untouched.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::validation::MAX_MONEY;

use crate::models::{
    Article, CreateSaleRequest, Declination, MovementType, Sale, SaleItem, SaleStatus,
};

/// Domain failures of sale creation and cancellation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    #[error("sale must contain at least one item")]
    EmptySale,

    #[error("line {line}: quantity must be at least 1")]
    InvalidQuantity { line: usize },

    #[error("line {line}: unit price cannot be negative")]
    NegativeUnitPrice { line: usize },

    #[error("amount paid cannot be negative")]
    NegativePayment,

    #[error("article {0} not found")]
    ArticleNotFound(Uuid),

    #[error("declination {declination_id} not found for article {article_id}")]
    DeclinationNotFound {
        article_id: Uuid,
        declination_id: Uuid,
    },

    #[error("Insufficient stock for {article_name} ({size} - {color}). Available: {available}")]
    InsufficientStock {
        article_name: String,
        size: String,
        color: String,
        available: i32,
        requested: i32,
    },

    #[error("amount paid {paid} is less than total {total}")]
    Underpaid { paid: Decimal, total: Decimal },

    #[error("sale amount exceeds the supported range")]
    AmountOverflow,

    #[error("sale {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("sale cannot go from {from} to {to}")]
    InvalidTransition { from: SaleStatus, to: SaleStatus },
}

/// Domain failures of manual stock movements
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovementError {
    #[error("{movement_type:?} quantity must be positive")]
    NonPositiveQuantity { movement_type: MovementType },

    #[error("adjustment cannot be zero")]
    ZeroAdjustment,

    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("quantity exceeds the supported range")]
    Overflow,
}

/// Articles and declinations visible to one planning call
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    articles: HashMap<Uuid, Article>,
    declinations: HashMap<Uuid, Declination>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        articles: impl IntoIterator<Item = Article>,
        declinations: impl IntoIterator<Item = Declination>,
    ) -> Self {
        Self {
            articles: articles.into_iter().map(|a| (a.id, a)).collect(),
            declinations: declinations.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    pub fn article(&self, id: Uuid) -> Option<&Article> {
        self.articles.get(&id)
    }

    pub fn declination(&self, id: Uuid) -> Option<&Declination> {
        self.declinations.get(&id)
    }
}

/// Server-side sale rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SalePolicy {
    /// Reject sales whose payment does not cover the total
    pub reject_underpayment: bool,
}

/// A validated sale line with its display fields captured
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine {
    pub article_id: Uuid,
    pub declination_id: Uuid,
    pub article_name: String,
    pub article_reference: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl SaleLine {
    pub fn into_item(self, id: Uuid, sale_id: Uuid) -> SaleItem {
        SaleItem {
            id,
            sale_id,
            article_id: self.article_id,
            declination_id: self.declination_id,
            article_name: self.article_name,
            article_reference: self.article_reference,
            size: self.size,
            color: self.color,
            quantity: self.quantity,
            unit_price: self.unit_price,
            line_total: self.line_total,
        }
    }
}

/// Net stock change of one declination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub declination_id: Uuid,
    pub quantity_before: i32,
    pub quantity_after: i32,
}

impl StockDelta {
    pub fn change(&self) -> i32 {
        self.quantity_after - self.quantity_before
    }
}

/// Everything a store writes for one accepted sale
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub lines: Vec<SaleLine>,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub change_due: Decimal,
    /// One entry per declination, ordered by id
    pub stock_decrements: Vec<StockDelta>,
}

/// Identity assigned to a draft by the store
#[derive(Debug, Clone)]
pub struct SaleIdentity {
    pub id: Uuid,
    pub sale_number: String,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SaleDraft {
    /// Materialize the validated sale; `item_ids` yields one id per line
    pub fn into_sale(
        self,
        identity: SaleIdentity,
        request: &CreateSaleRequest,
        mut item_ids: impl FnMut() -> Uuid,
    ) -> Sale {
        let items = self
            .lines
            .into_iter()
            .map(|line| line.into_item(item_ids(), identity.id))
            .collect();

        Sale {
            id: identity.id,
            sale_number: identity.sale_number,
            client_name: request.client_name.clone(),
            client_email: request.client_email.clone(),
            client_phone: request.client_phone.clone(),
            items,
            total_amount: self.total_amount,
            amount_paid: self.amount_paid,
            change_due: self.change_due,
            payment_method: request.payment_method,
            status: SaleStatus::Validated,
            notes: request.notes.clone(),
            seller_id: identity.seller_id,
            created_at: identity.created_at,
        }
    }
}

/// Validate a sale request against the catalog and compute what it changes
///
/// Checks run in order and the first failure wins: empty request, per-line
/// quantity and price, payment, then for each line its article, its
/// declination and the stock left after the earlier lines. The underpayment
/// rule, when enabled, runs last.
pub fn plan_sale(
    request: &CreateSaleRequest,
    catalog: &CatalogSnapshot,
    policy: &SalePolicy,
) -> Result<SaleDraft, SaleError> {
    if request.items.is_empty() {
        return Err(SaleError::EmptySale);
    }
    for (idx, item) in request.items.iter().enumerate() {
        if item.quantity < 1 {
            return Err(SaleError::InvalidQuantity { line: idx + 1 });
        }
        if item.unit_price < Decimal::ZERO {
            return Err(SaleError::NegativeUnitPrice { line: idx + 1 });
        }
    }
    if request.amount_paid < Decimal::ZERO {
        return Err(SaleError::NegativePayment);
    }

    let mut remaining: BTreeMap<Uuid, (i32, i32)> = BTreeMap::new();
    let mut lines = Vec::with_capacity(request.items.len());
    let mut total_amount = Decimal::ZERO;

    for item in &request.items {
        let article = catalog
            .article(item.article_id)
            .ok_or(SaleError::ArticleNotFound(item.article_id))?;

        let declination = catalog
            .declination(item.declination_id)
            .filter(|d| d.article_id == article.id)
            .ok_or(SaleError::DeclinationNotFound {
                article_id: item.article_id,
                declination_id: item.declination_id,
            })?;

        let (_, left) = remaining
            .entry(declination.id)
            .or_insert((declination.quantity, declination.quantity));
        if *left < item.quantity {
            return Err(SaleError::InsufficientStock {
                article_name: article.name.clone(),
                size: declination.size.clone(),
                color: declination.color.clone(),
                available: (*left).max(0),
                requested: item.quantity,
            });
        }
        *left -= item.quantity;

        let line_total = Decimal::from(item.quantity)
            .checked_mul(item.unit_price)
            .ok_or(SaleError::AmountOverflow)?;
        total_amount = total_amount
            .checked_add(line_total)
            .ok_or(SaleError::AmountOverflow)?;

        lines.push(SaleLine {
            article_id: article.id,
            declination_id: declination.id,
            article_name: article.name.clone(),
            article_reference: article.reference.clone(),
            size: declination.size.clone(),
            color: declination.color.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total,
        });
    }

    if total_amount > MAX_MONEY {
        return Err(SaleError::AmountOverflow);
    }

    if policy.reject_underpayment && request.amount_paid < total_amount {
        return Err(SaleError::Underpaid {
            paid: request.amount_paid,
            total: total_amount,
        });
    }

    let change_due = (request.amount_paid - total_amount).max(Decimal::ZERO);

    let stock_decrements = remaining
        .into_iter()
        .map(|(declination_id, (before, after))| StockDelta {
            declination_id,
            quantity_before: before,
            quantity_after: after,
        })
        .collect();

    Ok(SaleDraft {
        lines,
        total_amount,
        amount_paid: request.amount_paid,
        change_due,
        stock_decrements,
    })
}

/// Stock to give back when a sale is cancelled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancellationPlan {
    /// `(declination_id, quantity)` per surviving declination, ordered by id
    pub restorations: Vec<(Uuid, i32)>,
    /// Declinations deleted since the sale; their lines are not restored
    pub skipped: Vec<Uuid>,
}

/// Plan the cancellation of a sale
///
/// `existing` holds the ids of the sale's declinations still in the catalog.
pub fn plan_cancellation(
    sale: &Sale,
    existing: &HashSet<Uuid>,
) -> Result<CancellationPlan, SaleError> {
    if sale.status == SaleStatus::Cancelled {
        return Err(SaleError::AlreadyCancelled(sale.sale_number.clone()));
    }
    if !sale.status.can_transition_to(SaleStatus::Cancelled) {
        return Err(SaleError::InvalidTransition {
            from: sale.status,
            to: SaleStatus::Cancelled,
        });
    }

    let mut restorations: BTreeMap<Uuid, i32> = BTreeMap::new();
    let mut skipped: Vec<Uuid> = Vec::new();

    for item in &sale.items {
        if existing.contains(&item.declination_id) {
            *restorations.entry(item.declination_id).or_insert(0) += item.quantity;
        } else if !skipped.contains(&item.declination_id) {
            skipped.push(item.declination_id);
        }
    }

    Ok(CancellationPlan {
        restorations: restorations.into_iter().collect(),
        skipped,
    })
}

/// Signed change a movement applies to a declination
pub fn movement_delta(movement_type: MovementType, quantity: i32) -> Result<i32, MovementError> {
    match movement_type {
        MovementType::Adjustment if quantity == 0 => Err(MovementError::ZeroAdjustment),
        MovementType::Adjustment => Ok(quantity),
        _ if quantity <= 0 => Err(MovementError::NonPositiveQuantity { movement_type }),
        MovementType::Loss => Ok(-quantity),
        MovementType::Restock | MovementType::CustomerReturn => Ok(quantity),
    }
}

/// Result of applying a movement to a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementOutcome {
    pub delta: i32,
    pub quantity_after: i32,
}

/// Apply a manual movement to the current quantity; stock never goes negative
pub fn apply_movement(
    current: i32,
    movement_type: MovementType,
    quantity: i32,
) -> Result<MovementOutcome, MovementError> {
    let delta = movement_delta(movement_type, quantity)?;
    let quantity_after = current.checked_add(delta).ok_or(MovementError::Overflow)?;
    if quantity_after < 0 {
        return Err(MovementError::InsufficientStock {
            available: current,
            requested: delta.saturating_neg(),
        });
    }
    Ok(MovementOutcome {
        delta,
        quantity_after,
    })
}
