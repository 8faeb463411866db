pub mod invoice_service;
pub mod print;

pub use invoice_service::InvoiceService;
