use utoipa::OpenApi;

use crate::domain::invoice::PaymentStatus;
use crate::handlers::health::{self, HealthResponse};
use crate::handlers::invoices::{
    self, CreateInvoiceRequest, CreateLineItemRequest, DeleteInvoiceResponse,
    InvoiceDetailResponse, InvoiceResponse, LineItemResponse, UpdateInvoiceRequest,
    UpdateLineItemRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        invoices::create_invoice,
        invoices::list_invoices,
        invoices::get_invoice,
        invoices::update_invoice,
        invoices::mark_invoice_paid,
        invoices::delete_invoice,
        invoices::print_invoice,
        health::health,
    ),
    components(schemas(
        PaymentStatus,
        CreateInvoiceRequest,
        CreateLineItemRequest,
        UpdateInvoiceRequest,
        UpdateLineItemRequest,
        InvoiceResponse,
        InvoiceDetailResponse,
        LineItemResponse,
        DeleteInvoiceResponse,
        HealthResponse,
    )),
    tags(
        (name = "invoices", description = "Invoice ledger"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
