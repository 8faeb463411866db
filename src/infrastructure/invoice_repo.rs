use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::invoice::{
    Invoice, InvoiceChanges, InvoiceDetail, LineItem, NewInvoice, NewLineItem, PaymentStatus,
};
use crate::domain::ports::InvoiceRepository;
use crate::schema::{invoices, line_items};

use super::models::{InvoiceChangeset, InvoiceRow, LineItemRow, NewInvoiceRow, NewLineItemRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn insert_line_items(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    items: &[NewLineItem],
) -> Result<(), DomainError> {
    if items.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewLineItemRow> = items
        .iter()
        .enumerate()
        .map(|(position, item)| NewLineItemRow {
            id: Uuid::new_v4(),
            invoice_id,
            position: position as i32,
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            total: item.total.clone(),
        })
        .collect();
    diesel::insert_into(line_items::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn load_line_items(conn: &mut PgConnection, invoice_id: Uuid) -> Result<Vec<LineItem>, DomainError> {
    let rows = line_items::table
        .filter(line_items::invoice_id.eq(invoice_id))
        .order(line_items::position.asc())
        .select(LineItemRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(LineItem::from).collect())
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InvoiceRepository for DieselInvoiceRepository {
    fn create(&self, invoice: NewInvoice) -> Result<InvoiceDetail, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the invoice
            let row = diesel::insert_into(invoices::table)
                .values(&NewInvoiceRow {
                    id: Uuid::new_v4(),
                    client_name: invoice.client_name,
                    date: invoice.date,
                    due_date: invoice.due_date,
                    total_amount: invoice.total_amount,
                    payment_status: invoice.payment_status.as_str().to_string(),
                    created_at: invoice.created_at,
                    updated_at: invoice.created_at,
                })
                .returning(InvoiceRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its line items
            insert_line_items(conn, row.id, &invoice.line_items)?;

            Ok(InvoiceDetail {
                line_items: load_line_items(conn, row.id)?,
                invoice: Invoice::try_from(row)?,
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceDetail>, DomainError> {
        let mut conn = self.pool.get()?;

        let invoice = invoices::table
            .filter(invoices::id.eq(id))
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(invoice) = invoice else {
            return Ok(None);
        };

        let line_items = load_line_items(&mut conn, invoice.id)?;

        Ok(Some(InvoiceDetail {
            invoice: Invoice::try_from(invoice)?,
            line_items,
        }))
    }

    fn list(&self, status: Option<PaymentStatus>) -> Result<Vec<Invoice>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = invoices::table
            .select(InvoiceRow::as_select())
            .order((invoices::created_at.desc(), invoices::seq.desc()))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(invoices::payment_status.eq(status.as_str()));
        }

        query
            .load(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect()
    }

    fn update(
        &self,
        id: Uuid,
        changes: InvoiceChanges,
        replacement: Option<Vec<NewLineItem>>,
    ) -> Result<Option<InvoiceDetail>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(invoices::table.find(id))
                .set(&InvoiceChangeset::from(changes))
                .returning(InvoiceRow::as_returning())
                .get_result(conn)
                .optional()?;

            let Some(row) = row else {
                return Ok(None);
            };

            if let Some(items) = replacement {
                diesel::delete(line_items::table.filter(line_items::invoice_id.eq(id)))
                    .execute(conn)?;
                insert_line_items(conn, id, &items)?;
            }

            Ok(Some(InvoiceDetail {
                invoice: Invoice::try_from(row)?,
                line_items: load_line_items(conn, id)?,
            }))
        })
    }

    fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Invoice>, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(invoices::table.find(id))
            .set((
                invoices::payment_status.eq(status.as_str()),
                invoices::updated_at.eq(updated_at),
            ))
            .returning(InvoiceRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Invoice::try_from)
            .transpose()
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        // line_items rows follow through ON DELETE CASCADE
        let removed = diesel::delete(invoices::table.find(id)).execute(&mut conn)?;
        Ok(removed > 0)
    }
}
