use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::invoice::{Invoice, InvoiceChanges, LineItem};
use crate::schema::{invoices, line_items};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceRow {
    pub id: Uuid,
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: BigDecimal,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = invoices)]
pub struct NewInvoiceRow {
    pub id: Uuid,
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: BigDecimal,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `None` fields are left out of the generated `UPDATE`.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = invoices)]
pub struct InvoiceChangeset {
    pub client_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Option<BigDecimal>,
    pub payment_status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = line_items)]
#[diesel(belongs_to(InvoiceRow, foreign_key = invoice_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LineItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = line_items)]
pub struct NewLineItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DomainError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let payment_status = row
            .payment_status
            .parse()
            .map_err(|_| DomainError::Persistence(format!(
                "invoice {} has unknown payment status '{}'",
                row.id, row.payment_status
            )))?;
        Ok(Invoice {
            id: row.id,
            client_name: row.client_name,
            date: row.date,
            due_date: row.due_date,
            total_amount: row.total_amount,
            payment_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        LineItem {
            id: row.id,
            invoice_id: row.invoice_id,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total: row.total,
        }
    }
}

impl From<InvoiceChanges> for InvoiceChangeset {
    fn from(changes: InvoiceChanges) -> Self {
        InvoiceChangeset {
            client_name: changes.client_name,
            date: changes.date,
            due_date: changes.due_date,
            total_amount: changes.total_amount,
            payment_status: changes.payment_status.map(|s| s.as_str().to_string()),
            updated_at: changes.updated_at,
        }
    }
}
