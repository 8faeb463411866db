use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::invoice::{CreateInvoice, Invoice, InvoiceDetail, InvoicePatch, PaymentStatus};
use crate::domain::ports::InvoiceRepository;

/// Business rules for the invoice aggregate. All totals are computed here
/// before the repository sees the data; the repository only persists.
pub struct InvoiceService<R> {
    repo: R,
}

impl<R: InvoiceRepository> InvoiceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_invoice(&self, input: CreateInvoice) -> Result<InvoiceDetail, DomainError> {
        let draft = input.into_new_invoice(Utc::now()).inspect_err(|e| {
            log::warn!("Rejected invoice creation: {}", e);
        })?;

        let created = self.repo.create(draft)?;
        log::info!(
            "Created invoice {} for '{}' with {} line item(s), total {}",
            created.invoice.id,
            created.invoice.client_name,
            created.line_items.len(),
            created.invoice.total_amount
        );
        Ok(created)
    }

    pub fn get_invoice(&self, id: Uuid) -> Result<Option<InvoiceDetail>, DomainError> {
        log::debug!("Fetching invoice {}", id);
        self.repo.find_by_id(id)
    }

    pub fn list_invoices(&self, status: Option<PaymentStatus>) -> Result<Vec<Invoice>, DomainError> {
        log::debug!("Listing invoices (status filter: {:?})", status);
        self.repo.list(status)
    }

    /// Applies a partial update. Supplied line items replace the stored set
    /// and the total is recomputed from them; otherwise both stay as they are.
    pub fn update_invoice(&self, id: Uuid, patch: InvoicePatch) -> Result<InvoiceDetail, DomainError> {
        let (changes, replacement) = patch.into_changes(Utc::now()).inspect_err(|e| {
            log::warn!("Rejected update of invoice {}: {}", id, e);
        })?;
        let replaced = replacement.as_ref().map(Vec::len);

        let updated = self
            .repo
            .update(id, changes, replacement)?
            .ok_or(DomainError::NotFound(id))?;

        match replaced {
            Some(count) => log::info!(
                "Updated invoice {}, replaced line items with {} new one(s), total {}",
                id,
                count,
                updated.invoice.total_amount
            ),
            None => log::info!("Updated invoice {}", id),
        }
        Ok(updated)
    }

    pub fn mark_paid(&self, id: Uuid) -> Result<Invoice, DomainError> {
        let invoice = self
            .repo
            .update_status(id, PaymentStatus::Paid, Utc::now())?
            .ok_or(DomainError::NotFound(id))?;
        log::info!("Marked invoice {} as paid", id);
        Ok(invoice)
    }

    /// `false` when there was nothing to delete.
    pub fn delete_invoice(&self, id: Uuid) -> Result<bool, DomainError> {
        let removed = self.repo.delete(id)?;
        if removed {
            log::info!("Deleted invoice {}", id);
        }
        Ok(removed)
    }
}

impl InvoiceService<Box<dyn InvoiceRepository>> {
    /// Erases the adapter type so the HTTP layer can hold any repository.
    pub fn boxed<R: InvoiceRepository>(repo: R) -> Self {
        Self::new(Box::new(repo))
    }
}
