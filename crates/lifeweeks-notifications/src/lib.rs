//! Life Weeks — notification bounded context.
//!
//! Builds transport-agnostic notification payloads from user profiles and
//! life statistics, and delivers them through channel gateways. Payload
//! generation never touches delivery or scheduling.

pub mod application;
pub mod domain;
pub mod gateways;
