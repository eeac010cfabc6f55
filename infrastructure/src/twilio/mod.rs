//! Twilio SMS adapter implementing the telephony port.

mod gateway;

pub use gateway::{TWILIO_API_BASE, TwilioError, TwilioGateway};
