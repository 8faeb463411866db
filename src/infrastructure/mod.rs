pub mod invoice_repo;
pub mod memory_repo;
pub mod models;

pub use invoice_repo::DieselInvoiceRepository;
pub use memory_repo::InMemoryInvoiceRepository;
