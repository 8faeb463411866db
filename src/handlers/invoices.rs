use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::print::render_invoice;
use crate::domain::invoice::{
    CreateInvoice, Invoice, InvoiceDetail, InvoicePatch, LineItem, LineItemInput, LineItemPatch,
    PaymentStatus,
};
use crate::errors::AppError;
use crate::AppService;

// ── Money on the wire ────────────────────────────────────────────────────────

/// JSON numbers arrive as `f64`; their shortest decimal form becomes the
/// exact `BigDecimal` used from here on.
fn decimal_from_number(field: &str, value: f64) -> Result<BigDecimal, AppError> {
    if !value.is_finite() {
        return Err(AppError::BadRequest(format!("{field} must be a finite number")));
    }
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| AppError::BadRequest(format!("{field} is not a valid amount: {e}")))
}

fn number_from_decimal(value: &BigDecimal) -> Result<f64, AppError> {
    value
        .to_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| AppError::Internal(format!("amount {value} has no JSON number form")))
}

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLineItemRequest {
    pub description: String,
    /// Whole units, at least 1.
    pub quantity: i32,
    /// Positive amount, stored with two decimals, e.g. 150.5
    pub unit_price: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInvoiceRequest {
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub line_items: Vec<CreateLineItemRequest>,
    /// Defaults to `pending`.
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLineItemRequest {
    /// Ignored: replacement always creates new line items.
    pub id: Option<Uuid>,
    /// Entries without a description are dropped.
    pub description: Option<String>,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    /// Defaults to 0.
    pub unit_price: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInvoiceRequest {
    pub client_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_status: Option<PaymentStatus>,
    /// When present (even empty) replaces every line item of the invoice.
    pub line_items: Option<Vec<UpdateLineItemRequest>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceDetailResponse {
    pub id: Uuid,
    pub client_name: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub updated_at: String,
    pub line_items: Vec<LineItemResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListInvoicesParams {
    /// Only return invoices with this status.
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteInvoiceResponse {
    pub success: bool,
}

impl TryFrom<CreateInvoiceRequest> for CreateInvoice {
    type Error = AppError;

    fn try_from(req: CreateInvoiceRequest) -> Result<Self, Self::Error> {
        let line_items = req
            .line_items
            .into_iter()
            .map(|l| {
                Ok(LineItemInput {
                    unit_price: decimal_from_number("unit_price", l.unit_price)?,
                    description: l.description,
                    quantity: l.quantity,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(CreateInvoice {
            client_name: req.client_name,
            date: req.date,
            due_date: req.due_date,
            line_items,
            payment_status: req.payment_status,
        })
    }
}

impl TryFrom<UpdateInvoiceRequest> for InvoicePatch {
    type Error = AppError;

    fn try_from(req: UpdateInvoiceRequest) -> Result<Self, Self::Error> {
        let line_items = req
            .line_items
            .map(|items| {
                items
                    .into_iter()
                    .map(|l| {
                        Ok(LineItemPatch {
                            id: l.id,
                            description: l.description,
                            quantity: l.quantity,
                            unit_price: l
                                .unit_price
                                .map(|p| decimal_from_number("unit_price", p))
                                .transpose()?,
                        })
                    })
                    .collect::<Result<Vec<_>, AppError>>()
            })
            .transpose()?;

        Ok(InvoicePatch {
            client_name: req.client_name,
            date: req.date,
            due_date: req.due_date,
            payment_status: req.payment_status,
            line_items,
        })
    }
}

impl TryFrom<LineItem> for LineItemResponse {
    type Error = AppError;

    fn try_from(l: LineItem) -> Result<Self, Self::Error> {
        Ok(LineItemResponse {
            id: l.id,
            invoice_id: l.invoice_id,
            description: l.description,
            quantity: l.quantity,
            unit_price: number_from_decimal(&l.unit_price)?,
            total: number_from_decimal(&l.total)?,
        })
    }
}

impl TryFrom<Invoice> for InvoiceResponse {
    type Error = AppError;

    fn try_from(i: Invoice) -> Result<Self, Self::Error> {
        Ok(InvoiceResponse {
            id: i.id,
            client_name: i.client_name,
            date: i.date,
            due_date: i.due_date,
            total_amount: number_from_decimal(&i.total_amount)?,
            payment_status: i.payment_status,
            created_at: i.created_at.to_rfc3339(),
            updated_at: i.updated_at.to_rfc3339(),
        })
    }
}

impl TryFrom<InvoiceDetail> for InvoiceDetailResponse {
    type Error = AppError;

    fn try_from(detail: InvoiceDetail) -> Result<Self, Self::Error> {
        let i = detail.invoice;
        Ok(InvoiceDetailResponse {
            id: i.id,
            client_name: i.client_name,
            date: i.date,
            due_date: i.due_date,
            total_amount: number_from_decimal(&i.total_amount)?,
            payment_status: i.payment_status,
            created_at: i.created_at.to_rfc3339(),
            updated_at: i.updated_at.to_rfc3339(),
            line_items: detail
                .line_items
                .into_iter()
                .map(LineItemResponse::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /invoices
///
/// Creates an invoice together with its line items. Totals are computed on
/// the server; the invoice row and every line item are written in a single
/// transaction.
#[utoipa::path(
    post,
    path = "/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceDetailResponse),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    service: web::Data<AppService>,
    body: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let input = CreateInvoice::try_from(body.into_inner())?;

    let created = web::block(move || service.create_invoice(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(InvoiceDetailResponse::try_from(created)?))
}

/// GET /invoices
///
/// Returns every invoice (without line items), newest first.
#[utoipa::path(
    get,
    path = "/invoices",
    params(
        ("status" = Option<PaymentStatus>, Query, description = "Filter by payment status"),
    ),
    responses(
        (status = 200, description = "Invoices, newest first", body = [InvoiceResponse]),
        (status = 400, description = "Unknown status"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    service: web::Data<AppService>,
    query: web::Query<ListInvoicesParams>,
) -> Result<HttpResponse, AppError> {
    let status = query.into_inner().status;

    let invoices = web::block(move || service.list_invoices(status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body = invoices
        .into_iter()
        .map(InvoiceResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HttpResponse::Ok().json(body))
}

/// GET /invoices/{id}
///
/// Returns the invoice together with its line items.
#[utoipa::path(
    get,
    path = "/invoices/{id}",
    params(
        ("id" = Uuid, Path, description = "Invoice UUID"),
    ),
    responses(
        (status = 200, description = "Invoice found", body = InvoiceDetailResponse),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let result = web::block(move || service.get_invoice(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(detail) => Ok(HttpResponse::Ok().json(InvoiceDetailResponse::try_from(detail)?)),
        None => Err(AppError::NotFound),
    }
}

/// PATCH /invoices/{id}
///
/// Partial update. Omitted fields are left as stored; a `line_items` array
/// replaces all existing line items and the total is recomputed.
#[utoipa::path(
    patch,
    path = "/invoices/{id}",
    params(
        ("id" = Uuid, Path, description = "Invoice UUID"),
    ),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = InvoiceDetailResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = InvoicePatch::try_from(body.into_inner())?;

    let updated = web::block(move || service.update_invoice(id, patch))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(InvoiceDetailResponse::try_from(updated)?))
}

/// POST /invoices/{id}/mark-paid
#[utoipa::path(
    post,
    path = "/invoices/{id}/mark-paid",
    params(
        ("id" = Uuid, Path, description = "Invoice UUID"),
    ),
    responses(
        (status = 200, description = "Invoice marked as paid", body = InvoiceResponse),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn mark_invoice_paid(
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let invoice = web::block(move || service.mark_paid(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(InvoiceResponse::try_from(invoice)?))
}

/// DELETE /invoices/{id}
///
/// Deletes the invoice and its line items. `success` is `false` when the
/// invoice did not exist.
#[utoipa::path(
    delete,
    path = "/invoices/{id}",
    params(
        ("id" = Uuid, Path, description = "Invoice UUID"),
    ),
    responses(
        (status = 200, description = "Deletion outcome", body = DeleteInvoiceResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let success = web::block(move || service.delete_invoice(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DeleteInvoiceResponse { success }))
}

/// GET /invoices/{id}/print
///
/// Printable plain-text rendering of the invoice.
#[utoipa::path(
    get,
    path = "/invoices/{id}/print",
    params(
        ("id" = Uuid, Path, description = "Invoice UUID"),
    ),
    responses(
        (status = 200, description = "Printable invoice", body = String, content_type = "text/plain"),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn print_invoice(
    service: web::Data<AppService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let result = web::block(move || service.get_invoice(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let detail = result.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(render_invoice(&detail)))
}
