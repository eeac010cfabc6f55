//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement (outbound) or call (inbound).

pub mod audit_log;
pub mod email_gateway;
pub mod event_handler;
pub mod messaging_gateway;
pub mod telephony_gateway;
