//! External service connectors.
//!
//! Every integration sits behind a trait so routes and services never depend on
//! the HTTP implementation, and tests can inject mocks:
//!
//! 1. trait in `{service}/mod.rs`
//! 2. HTTP client in `{service}/client.rs`
//! 3. trait object injected as `web::Data<Arc<dyn Trait>>`

pub mod errors;
pub mod google;
pub mod shop;
pub mod yookassa;

pub use errors::ConnectorError;
pub use google::{GoogleAuthConnector, GoogleOAuthClient};
pub use shop::{ShopFetcher, ShopHttpClient};
pub use yookassa::{
    CreatePayment, GatewayPayment, GatewayPaymentStatus, PaymentGateway, YookassaClient,
};
