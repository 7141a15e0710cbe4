// src/services/subscription.rs
//! Plan purchase flow. The payment widget itself lives outside this crate;
//! callers hand its outcome to `complete_payment`.

use tracing::{info, warn};

use crate::core::ApiClient;
use crate::error::{AutomationError, AutomationResult};
use crate::types::response::{
    ActionResponse, CreateOrderRequest, PaymentOrder, SubscriptionStatus, VerifyPaymentRequest,
};

pub const SUBSCRIPTION_STATUS_ENDPOINT: &str = "/api/subscription/status";
pub const CREATE_ORDER_ENDPOINT: &str = "/api/subscription/create-order";
pub const VERIFY_PAYMENT_ENDPOINT: &str = "/api/subscription/verify-payment";

/// What the payment widget reported back
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Completed {
        payment_id: String,
        signature: String,
    },
    Cancelled,
    Failed(String),
}

pub struct SubscriptionService {
    api: ApiClient,
}

impl SubscriptionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn status(&self) -> AutomationResult<SubscriptionStatus> {
        self.api.get(SUBSCRIPTION_STATUS_ENDPOINT).await
    }

    pub async fn create_order(&self, plan_id: &str) -> AutomationResult<PaymentOrder> {
        let order: PaymentOrder = self
            .api
            .post_json(CREATE_ORDER_ENDPOINT, &CreateOrderRequest { plan_id })
            .await?;
        info!("Created payment order {} for plan {}", order.order_id, plan_id);
        Ok(order)
    }

    pub async fn complete_payment(
        &self,
        order: &PaymentOrder,
        outcome: PaymentOutcome,
    ) -> AutomationResult<()> {
        let (payment_id, signature) = match outcome {
            PaymentOutcome::Completed {
                payment_id,
                signature,
            } => (payment_id, signature),
            PaymentOutcome::Cancelled => {
                info!("Payment for order {} cancelled", order.order_id);
                return Err(AutomationError::PaymentCancelled);
            }
            PaymentOutcome::Failed(reason) => {
                warn!("Payment for order {} failed: {}", order.order_id, reason);
                return Err(AutomationError::PaymentFailed(reason));
            }
        };

        let request = VerifyPaymentRequest {
            order_id: &order.order_id,
            payment_id: &payment_id,
            signature: &signature,
        };
        let response: ActionResponse = match self.api.post_json(VERIFY_PAYMENT_ENDPOINT, &request).await {
            Ok(response) => response,
            Err(AutomationError::RemoteRequestFailed(message)) => {
                return Err(AutomationError::PaymentFailed(message))
            }
            Err(e) => return Err(e),
        };

        if !response.success {
            let reason = response
                .message
                .unwrap_or_else(|| "Payment verification rejected".to_string());
            warn!("Payment verification rejected for {}: {}", order.order_id, reason);
            return Err(AutomationError::PaymentFailed(reason));
        }

        info!("Payment {} verified", payment_id);
        Ok(())
    }
}
