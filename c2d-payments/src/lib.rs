pub mod orchestrator;
pub mod paystack;
pub mod signature;
pub mod stripe;

pub use orchestrator::{CheckoutRedirect, MockGateway, PaymentOrchestrator, Reconciliation};
pub use paystack::PaystackGateway;
pub use stripe::StripeGateway;
