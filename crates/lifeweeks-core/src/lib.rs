//! Life Weeks Core — shared domain abstractions.
//!
//! This crate defines the events, notification DTOs and capability traits
//! (ports) that every other crate depends on. It contains no infrastructure
//! code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod gateway;
pub mod i18n;
pub mod notification;
pub mod profile;
pub mod repository;
pub mod scheduler;
pub mod statistics;
