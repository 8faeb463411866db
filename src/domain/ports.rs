use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::invoice::{Invoice, InvoiceChanges, InvoiceDetail, NewInvoice, NewLineItem, PaymentStatus};

/// Persistence port for the invoice aggregate.
///
/// Every call is one unit of work: an adapter must either apply all of a
/// call's writes (invoice row and line items) or none of them.
pub trait InvoiceRepository: Send + Sync + 'static {
    fn create(&self, invoice: NewInvoice) -> Result<InvoiceDetail, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceDetail>, DomainError>;
    /// Invoices without their line items, newest first.
    fn list(&self, status: Option<PaymentStatus>) -> Result<Vec<Invoice>, DomainError>;
    /// Applies `changes` and, when `line_items` is `Some`, swaps the whole
    /// line-item set for the given one. `None` if the invoice does not exist.
    fn update(
        &self,
        id: Uuid,
        changes: InvoiceChanges,
        line_items: Option<Vec<NewLineItem>>,
    ) -> Result<Option<InvoiceDetail>, DomainError>;
    fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Invoice>, DomainError>;
    /// Removes the invoice together with its line items.
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

impl<R: InvoiceRepository + ?Sized> InvoiceRepository for Box<R> {
    fn create(&self, invoice: NewInvoice) -> Result<InvoiceDetail, DomainError> {
        (**self).create(invoice)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceDetail>, DomainError> {
        (**self).find_by_id(id)
    }

    fn list(&self, status: Option<PaymentStatus>) -> Result<Vec<Invoice>, DomainError> {
        (**self).list(status)
    }

    fn update(
        &self,
        id: Uuid,
        changes: InvoiceChanges,
        line_items: Option<Vec<NewLineItem>>,
    ) -> Result<Option<InvoiceDetail>, DomainError> {
        (**self).update(id, changes, line_items)
    }

    fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Invoice>, DomainError> {
        (**self).update_status(id, status, updated_at)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        (**self).delete(id)
    }
}
