//! Email gateway port.
//!
//! Email addresses can be configured as alert contacts, but no delivery
//! adapter exists yet; [`NoEmail`] only logs.

use super::messaging_gateway::GatewayError;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), GatewayError>;
}

pub struct NoEmail;

#[async_trait]
impl EmailGateway for NoEmail {
    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), GatewayError> {
        info!(to, subject, "Email delivery is not implemented, skipping");
        Ok(())
    }
}
