//! Order routes: creation, credit settlement, and listings.

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::events::Topic;
use crate::AppState;
use tillpoint_core::checkout::DigitalPayment;
use tillpoint_core::{CoreError, Money, PaymentType, TransactionType, VatTotals};
use tillpoint_db::repository::order::{
    CreditOrderListing, NewOrder, NewOrderLine, OrderListing, OrderReceipt, SettleOrder,
    SettledOrderListing, SettlementReceipt,
};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub discount_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub location_id: i64,
    pub user_id: i64,
    pub customer_id: Option<i64>,
    pub transaction_type: i64,
    pub payment_type: i64,
    #[serde(default)]
    pub total_vat_sale_cents: Money,
    #[serde(default)]
    pub total_vat_amount_cents: Money,
    #[serde(default)]
    pub total_vat_exempt_cents: Money,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub reference_no: Option<String>,
    pub digital_payment_amount_cents: Option<Money>,
    pub products: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SettleOrderRequest {
    pub invoice_no: String,
    pub location_id: i64,
    pub user_id: i64,
    pub payment_type: i64,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub reference_no: Option<String>,
    pub digital_payment_amount_cents: Option<Money>,
    pub total_settled_credit_cents: Money,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub message: String,
    #[serde(flatten)]
    pub receipt: OrderReceipt,
}

#[derive(Debug, Serialize)]
pub struct SettleOrderResponse {
    pub message: String,
    #[serde(flatten)]
    pub receipt: SettlementReceipt,
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/settle", put(settle))
        .route("/credits/{location_id}", get(credit_orders))
        .route("/all/{location_id}", get(settled_orders))
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/orders` - full listing with lines.
async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<OrderListing>>> {
    Ok(Json(state.db.orders().list().await?))
}

/// `POST /api/orders` - the order-settlement workflow.
///
/// Validates the typed request at the boundary, hands the command to the
/// transactional workflow, then broadcasts the result.
async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<Json<CreateOrderResponse>> {
    let payment_type = PaymentType::from_code(request.payment_type)
        .ok_or(CoreError::InvalidPaymentType(request.payment_type))?;
    let transaction_type = TransactionType::from_code(request.transaction_type)
        .ok_or(CoreError::InvalidTransactionType(request.transaction_type))?;

    let new_order = NewOrder {
        location_id: request.location_id,
        user_id: request.user_id,
        customer_id: request.customer_id,
        transaction_type,
        payment_type,
        vat: VatTotals {
            vat_sale: request.total_vat_sale_cents,
            vat_amount: request.total_vat_amount_cents,
            vat_exempt: request.total_vat_exempt_cents,
        },
        digital: DigitalPayment::resolve(
            payment_type,
            request.account_name,
            request.account_number,
            request.reference_no,
            request.digital_payment_amount_cents,
        ),
        lines: request
            .products
            .into_iter()
            .map(|line| NewOrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                discount_id: line.discount_id,
            })
            .collect(),
    };

    let receipt = state.db.orders().create_order(new_order).await?;

    state.events.publish(Topic::Order, "OrderCreated", &receipt);

    Ok(Json(CreateOrderResponse {
        message: "Order created successfully".to_string(),
        receipt,
    }))
}

/// `PUT /api/orders/settle` - close out a credit order by invoice number.
async fn settle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SettleOrderRequest>,
) -> ApiResult<Json<SettleOrderResponse>> {
    let payment_type = PaymentType::from_code(request.payment_type)
        .ok_or(CoreError::InvalidPaymentType(request.payment_type))?;

    let settle = SettleOrder {
        invoice_no: request.invoice_no,
        location_id: request.location_id,
        user_id: request.user_id,
        payment_type,
        digital: DigitalPayment::resolve(
            payment_type,
            request.account_name,
            request.account_number,
            request.reference_no,
            request.digital_payment_amount_cents,
        ),
        amount: request.total_settled_credit_cents,
    };

    let receipt = state.db.orders().settle_order(settle).await?;

    state.events.publish(Topic::Order, "OrderSettled", &receipt);

    Ok(Json(SettleOrderResponse {
        message: "Order updated successfully".to_string(),
        receipt,
    }))
}

/// `GET /api/orders/credits/{location_id}` - pending credit orders with
/// customer contact details.
async fn credit_orders(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<i64>,
) -> ApiResult<Json<Vec<CreditOrderListing>>> {
    Ok(Json(state.db.orders().credit_orders(location_id).await?))
}

/// `GET /api/orders/all/{location_id}` - settled orders for a location.
async fn settled_orders(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<i64>,
) -> ApiResult<Json<Vec<SettledOrderListing>>> {
    Ok(Json(state.db.orders().settled_orders(location_id).await?))
}
