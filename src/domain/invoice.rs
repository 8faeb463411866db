use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

/// Digits after the decimal point for every stored amount.
pub const MONEY_SCALE: i64 = 2;

/// Every stored amount must stay below this (`NUMERIC(12, 2)` columns).
pub const MONEY_LIMIT: i64 = 10_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            other => Err(DomainError::Validation(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

/// `quantity × unit_price`, rounded to cents.
pub fn line_total(quantity: i32, unit_price: &BigDecimal) -> BigDecimal {
    round_money(&(BigDecimal::from(quantity) * unit_price))
}

/// Sum of the line totals; zero for an empty set.
pub fn invoice_total<'a, I>(items: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a NewLineItem>,
{
    let sum = items
        .into_iter()
        .fold(BigDecimal::zero(), |acc, item| acc + &item.total);
    round_money(&sum)
}

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub line_items: Vec<LineItemInput>,
    pub payment_status: Option<PaymentStatus>,
}

/// A line item inside an update. Any `id` is ignored: replacement always
/// inserts fresh rows.
#[derive(Debug, Clone, Default)]
pub struct LineItemPatch {
    pub id: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    pub client_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_status: Option<PaymentStatus>,
    pub line_items: Option<Vec<LineItemPatch>>,
}

// ── Write models handed to the repository ────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<NewLineItem>,
}

/// Scalar changes for an existing invoice. `None` fields stay as stored.
#[derive(Debug, Clone)]
pub struct InvoiceChanges {
    pub client_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_status: Option<PaymentStatus>,
    pub total_amount: Option<BigDecimal>,
    pub updated_at: DateTime<Utc>,
}

// ── Read models ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: BigDecimal,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub line_items: Vec<LineItem>,
}

// ── Rules ────────────────────────────────────────────────────────────────────

fn require_text(value: String, message: &str) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(message.to_string()));
    }
    Ok(value)
}

fn require_quantity(quantity: i32) -> Result<i32, DomainError> {
    if quantity < 1 {
        return Err(DomainError::Validation(
            "quantity must be a positive integer".to_string(),
        ));
    }
    Ok(quantity)
}

fn require_unit_price(unit_price: &BigDecimal) -> Result<BigDecimal, DomainError> {
    let price = round_money(unit_price);
    if price <= BigDecimal::zero() {
        return Err(DomainError::Validation(
            "unit price must be positive".to_string(),
        ));
    }
    require_storable(price, "unit price")
}

fn require_storable(amount: BigDecimal, what: &str) -> Result<BigDecimal, DomainError> {
    if amount >= BigDecimal::from(MONEY_LIMIT) {
        return Err(DomainError::Validation(format!(
            "{what} must be less than {MONEY_LIMIT}"
        )));
    }
    Ok(amount)
}

fn require_storable_line(line: NewLineItem) -> Result<NewLineItem, DomainError> {
    require_storable(line.total.clone(), "line total")?;
    Ok(line)
}

fn at_index(index: usize, err: DomainError) -> DomainError {
    match err {
        DomainError::Validation(msg) => DomainError::Validation(format!("line item {index}: {msg}")),
        other => other,
    }
}

impl NewLineItem {
    pub fn new(description: String, quantity: i32, unit_price: BigDecimal) -> Self {
        let total = line_total(quantity, &unit_price);
        Self {
            description,
            quantity,
            unit_price,
            total,
        }
    }
}

impl TryFrom<LineItemInput> for NewLineItem {
    type Error = DomainError;

    fn try_from(input: LineItemInput) -> Result<Self, Self::Error> {
        let description = require_text(input.description, "description is required")?;
        let quantity = require_quantity(input.quantity)?;
        let unit_price = require_unit_price(&input.unit_price)?;
        require_storable_line(NewLineItem::new(description, quantity, unit_price))
    }
}

impl LineItemPatch {
    /// Turns a replacement entry into an insertable line item.
    ///
    /// Entries without a description are dropped (`Ok(None)`). A missing
    /// quantity becomes 1 and a missing unit price becomes 0; supplied values
    /// are validated like on create.
    pub fn resolve(self) -> Result<Option<NewLineItem>, DomainError> {
        let Some(description) = self.description else {
            return Ok(None);
        };
        let description = require_text(description, "description is required")?;
        let quantity = match self.quantity {
            Some(q) => require_quantity(q)?,
            None => 1,
        };
        let unit_price = match self.unit_price {
            Some(p) => require_unit_price(&p)?,
            None => round_money(&BigDecimal::zero()),
        };
        require_storable_line(NewLineItem::new(description, quantity, unit_price)).map(Some)
    }
}

impl CreateInvoice {
    /// Validates the whole input and computes every total. Nothing is written
    /// if this fails.
    pub fn into_new_invoice(self, now: DateTime<Utc>) -> Result<NewInvoice, DomainError> {
        let client_name = require_text(self.client_name, "client name is required")?;
        if self.line_items.is_empty() {
            return Err(DomainError::Validation(
                "at least one line item is required".to_string(),
            ));
        }
        let line_items = self
            .line_items
            .into_iter()
            .enumerate()
            .map(|(i, item)| NewLineItem::try_from(item).map_err(|e| at_index(i, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let total_amount = require_storable(invoice_total(&line_items), "invoice total")?;

        Ok(NewInvoice {
            client_name,
            date: self.date,
            due_date: self.due_date,
            payment_status: self.payment_status.unwrap_or_default(),
            total_amount,
            created_at: now,
            line_items,
        })
    }
}

impl InvoicePatch {
    /// Splits the patch into scalar changes and an optional replacement set.
    /// When line items are supplied the total follows the replacement set.
    pub fn into_changes(
        self,
        now: DateTime<Utc>,
    ) -> Result<(InvoiceChanges, Option<Vec<NewLineItem>>), DomainError> {
        let client_name = self
            .client_name
            .map(|name| require_text(name, "client name is required"))
            .transpose()?;

        let replacement = match self.line_items {
            None => None,
            Some(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    if let Some(line) = item.resolve().map_err(|e| at_index(i, e))? {
                        resolved.push(line);
                    }
                }
                Some(resolved)
            }
        };
        let total_amount = replacement
            .as_deref()
            .map(|items| require_storable(invoice_total(items), "invoice total"))
            .transpose()?;

        let changes = InvoiceChanges {
            client_name,
            date: self.date,
            due_date: self.due_date,
            payment_status: self.payment_status,
            total_amount,
            updated_at: now,
        };
        Ok((changes, replacement))
    }
}

impl Invoice {
    /// Merges `changes` into this invoice.
    pub fn apply(&mut self, changes: &InvoiceChanges) {
        if let Some(name) = &changes.client_name {
            self.client_name = name.clone();
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = changes.payment_status {
            self.payment_status = status;
        }
        if let Some(total) = &changes.total_amount {
            self.total_amount = total.clone();
        }
        self.updated_at = changes.updated_at;
    }
}
