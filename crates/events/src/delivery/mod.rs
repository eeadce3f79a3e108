//! Outbound delivery seams.
//!
//! The routers never speak a provider's wire protocol. They build payloads
//! and hand them to these transports, which the application backs with its
//! push-provider and pub/sub broker clients.

pub mod publish;
pub mod push;
