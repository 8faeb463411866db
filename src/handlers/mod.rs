pub mod health;
pub mod invoices;
