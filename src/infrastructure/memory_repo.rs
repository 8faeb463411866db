//! In-memory invoice repository for tests and database-less runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::invoice::{
    Invoice, InvoiceChanges, InvoiceDetail, LineItem, NewInvoice, NewLineItem, PaymentStatus,
};
use crate::domain::ports::InvoiceRepository;

struct StoredInvoice {
    /// Insertion counter, breaks `created_at` ties when listing.
    seq: u64,
    detail: InvoiceDetail,
}

#[derive(Default)]
struct State {
    next_seq: u64,
    invoices: HashMap<Uuid, StoredInvoice>,
}

/// Every call holds the lock for its whole duration, so each call is applied
/// entirely or not at all.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DomainError> {
        self.state
            .read()
            .map_err(|e| DomainError::Persistence(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DomainError> {
        self.state
            .write()
            .map_err(|e| DomainError::Persistence(format!("Failed to acquire write lock: {}", e)))
    }
}

fn to_line_items(invoice_id: Uuid, items: Vec<NewLineItem>) -> Vec<LineItem> {
    items
        .into_iter()
        .map(|item| LineItem {
            id: Uuid::new_v4(),
            invoice_id,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: item.total,
        })
        .collect()
}

impl InvoiceRepository for InMemoryInvoiceRepository {
    fn create(&self, invoice: NewInvoice) -> Result<InvoiceDetail, DomainError> {
        let mut state = self.write()?;

        let id = Uuid::new_v4();
        let detail = InvoiceDetail {
            invoice: Invoice {
                id,
                client_name: invoice.client_name,
                date: invoice.date,
                due_date: invoice.due_date,
                total_amount: invoice.total_amount,
                payment_status: invoice.payment_status,
                created_at: invoice.created_at,
                updated_at: invoice.created_at,
            },
            line_items: to_line_items(id, invoice.line_items),
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        state.invoices.insert(
            id,
            StoredInvoice {
                seq,
                detail: detail.clone(),
            },
        );
        Ok(detail)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceDetail>, DomainError> {
        let state = self.read()?;
        Ok(state.invoices.get(&id).map(|stored| stored.detail.clone()))
    }

    fn list(&self, status: Option<PaymentStatus>) -> Result<Vec<Invoice>, DomainError> {
        let state = self.read()?;

        let mut stored: Vec<&StoredInvoice> = state
            .invoices
            .values()
            .filter(|s| status.is_none_or(|st| s.detail.invoice.payment_status == st))
            .collect();
        stored.sort_by(|a, b| {
            (b.detail.invoice.created_at, b.seq).cmp(&(a.detail.invoice.created_at, a.seq))
        });

        Ok(stored
            .into_iter()
            .map(|s| s.detail.invoice.clone())
            .collect())
    }

    fn update(
        &self,
        id: Uuid,
        changes: InvoiceChanges,
        replacement: Option<Vec<NewLineItem>>,
    ) -> Result<Option<InvoiceDetail>, DomainError> {
        let mut state = self.write()?;

        let Some(stored) = state.invoices.get_mut(&id) else {
            return Ok(None);
        };
        stored.detail.invoice.apply(&changes);
        if let Some(items) = replacement {
            stored.detail.line_items = to_line_items(id, items);
        }
        Ok(Some(stored.detail.clone()))
    }

    fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Invoice>, DomainError> {
        let mut state = self.write()?;

        Ok(state.invoices.get_mut(&id).map(|stored| {
            let invoice = &mut stored.detail.invoice;
            invoice.payment_status = status;
            invoice.updated_at = updated_at;
            invoice.clone()
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.write()?;
        Ok(state.invoices.remove(&id).is_some())
    }
}
