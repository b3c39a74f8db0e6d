use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use c2d_core::order::{Gateway, Order, OrderStatus};
use c2d_core::payment::{
    CheckoutSession, PaymentGateway, SessionRequest, WebhookEvent, WebhookOutcome,
};
use c2d_core::repository::{
    EnrollmentRepository, OrderRepository, ProfileRepository, ProgramRepository,
};
use c2d_core::{CoreError, CoreResult};

/// Result of a successful intent creation.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRedirect {
    pub order_id: Uuid,
    pub redirect_url: String,
}

/// What a webhook delivery did to the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Fulfilled { order_id: Uuid },
    Failed { order_id: Uuid },
    /// The order was already terminal; the delivery was a replay and had
    /// no side effects.
    AlreadySettled { order_id: Uuid, status: OrderStatus },
}

/// Coordinates the two gateways, the order ledger, and enrollment
/// activation. Constructed once at startup with explicit collaborators.
pub struct PaymentOrchestrator {
    programs: Arc<dyn ProgramRepository>,
    profiles: Arc<dyn ProfileRepository>,
    orders: Arc<dyn OrderRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    stripe: Arc<dyn PaymentGateway>,
    paystack: Arc<dyn PaymentGateway>,
}

impl PaymentOrchestrator {
    pub fn new(
        programs: Arc<dyn ProgramRepository>,
        profiles: Arc<dyn ProfileRepository>,
        orders: Arc<dyn OrderRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        stripe: Arc<dyn PaymentGateway>,
        paystack: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            programs,
            profiles,
            orders,
            enrollments,
            stripe,
            paystack,
        }
    }

    fn gateway(&self, selector: Gateway) -> &Arc<dyn PaymentGateway> {
        match selector {
            Gateway::Stripe => &self.stripe,
            Gateway::Paystack => &self.paystack,
        }
    }

    /// Create a PENDING order and open a hosted checkout session for it.
    ///
    /// The order (with its correlation reference) is persisted before the
    /// outbound call, so a webhook that races the response can still be
    /// matched. Gateway failures are surfaced, never retried here: a blind
    /// retry would mint a duplicate order.
    pub async fn create_intent(
        &self,
        program_id: Uuid,
        profile_id: Uuid,
        selector: Gateway,
    ) -> CoreResult<CheckoutRedirect> {
        let program = self
            .programs
            .get_program(program_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Program {} not found", program_id)))?;

        let profile = self
            .profiles
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Profile {} not found", profile_id)))?;

        let amount_minor = program.price_minor_units()?;

        let order = Order::new(
            program.id,
            profile.id,
            selector,
            amount_minor,
            program.currency.clone(),
        );
        self.orders.create_order(&order).await?;

        tracing::info!(
            order_id = %order.id,
            reference = %order.reference,
            gateway = %selector,
            amount_minor,
            "Created pending order, requesting checkout session"
        );

        let request = SessionRequest {
            reference: order.reference.clone(),
            amount_minor,
            currency: program.currency.clone(),
            description: program.title.clone(),
            customer_email: profile.email.clone(),
        };

        let session = match self.gateway(selector).create_session(&request).await {
            Ok(session) => session,
            Err(e) => {
                // No session exists, so no webhook will ever reference this
                // order. Expire it and keep it for audit.
                self.orders.expire_pending(order.id).await?;
                tracing::warn!(order_id = %order.id, error = %e, "Checkout session creation failed, order expired");
                return Err(e);
            }
        };

        self.orders
            .record_session(order.id, &session.session_id)
            .await?;

        // The session exists, so its webhook may still land; the order
        // stays PENDING even though we cannot hand back a URL.
        let redirect_url = session.redirect_url.ok_or_else(|| {
            CoreError::Gateway(format!(
                "{} returned a session without a redirect URL",
                selector
            ))
        })?;

        Ok(CheckoutRedirect {
            order_id: order.id,
            redirect_url,
        })
    }

    /// Verify, parse, and reconcile one webhook delivery into an idempotent
    /// order transition.
    pub async fn process_webhook(
        &self,
        selector: Gateway,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> CoreResult<Reconciliation> {
        let event = self.gateway(selector).parse_webhook(raw_body, signature)?;

        match event.outcome {
            WebhookOutcome::Success => {
                self.settle(selector, &event, OrderStatus::Fulfilled).await
            }
            WebhookOutcome::Failure | WebhookOutcome::Cancelled => {
                self.settle(selector, &event, OrderStatus::Failed).await
            }
        }
    }

    async fn settle(
        &self,
        selector: Gateway,
        event: &WebhookEvent,
        to: OrderStatus,
    ) -> CoreResult<Reconciliation> {
        // Single conditional update: at most one delivery wins the
        // PENDING -> terminal race, duplicates fall through to the replay
        // branch below. The gateway is part of the match: a delivery
        // verified by one gateway cannot settle an order opened with the
        // other.
        if let Some(order) = self
            .orders
            .transition_from_pending(&event.reference, selector, to)
            .await?
        {
            if to == OrderStatus::Fulfilled {
                let enrollment = self
                    .enrollments
                    .activate(order.profile_id, order.program_id)
                    .await?;
                tracing::info!(
                    order_id = %order.id,
                    enrollment_id = %enrollment.id,
                    "Order fulfilled, enrollment activated"
                );
                return Ok(Reconciliation::Fulfilled { order_id: order.id });
            }
            tracing::info!(order_id = %order.id, outcome = ?event.outcome, "Order marked failed");
            return Ok(Reconciliation::Failed { order_id: order.id });
        }

        match self.orders.find_by_reference(&event.reference).await? {
            Some(order) if order.gateway == selector => {
                // A success replay of a FULFILLED order may be the retry of
                // a delivery that won the CAS but lost the activation to a
                // storage failure. The upsert makes re-running it safe, and
                // a failed re-run answers 503 so the gateway keeps trying.
                if order.status == OrderStatus::Fulfilled && to == OrderStatus::Fulfilled {
                    self.enrollments
                        .activate(order.profile_id, order.program_id)
                        .await?;
                }
                tracing::info!(
                    order_id = %order.id,
                    status = order.status.as_str(),
                    "Webhook replay for settled order, no-op"
                );
                Ok(Reconciliation::AlreadySettled {
                    order_id: order.id,
                    status: order.status,
                })
            }
            _ => Err(CoreError::NotFound(format!(
                "No order matches gateway reference {}",
                event.reference
            ))),
        }
    }
}

/// In-process gateway stand-in for tests and local development. Accepts a
/// JSON body of the shape `{"reference": "...", "outcome": "success"}` and
/// skips signature verification.
pub struct MockGateway {
    pub fail_create: bool,
    pub omit_redirect: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            fail_create: false,
            omit_redirect: false,
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(&self, request: &SessionRequest) -> CoreResult<CheckoutSession> {
        if self.fail_create {
            return Err(CoreError::Gateway("Simulated gateway outage".into()));
        }
        Ok(CheckoutSession {
            session_id: format!("mock_cs_{}", request.reference),
            redirect_url: if self.omit_redirect {
                None
            } else {
                Some(format!("https://pay.mock/{}", request.reference))
            },
        })
    }

    fn parse_webhook(&self, raw_body: &[u8], _signature: Option<&str>) -> CoreResult<WebhookEvent> {
        #[derive(serde::Deserialize)]
        struct MockEvent {
            reference: String,
            outcome: WebhookOutcome,
        }

        let event: MockEvent = serde_json::from_slice(raw_body)
            .map_err(|e| CoreError::InvalidPayload(format!("Mock event unreadable: {}", e)))?;
        Ok(WebhookEvent {
            reference: event.reference,
            outcome: event.outcome,
        })
    }
}
