//! Core domain types for the order-manager simulator.
//!
//! This crate provides the vocabulary shared by every other crate:
//! - `OrderId`, `OpId`: stable identifiers linking the queue, the mirror
//!   and the operation chains without raw pointers
//! - `Side`, `Price`, `Qty`: trading primitives on an integer price ladder
//! - `OrderState`, `OperationKind`, `OperationState`: lifecycle enums
//! - `MarketOperation`: the market-bound operation descriptor
//! - `SimConfig`: simulation parameters

pub mod config;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod types;
pub mod wire;

pub use config::SimConfig;
pub use error::{CoreError, Result};
pub use ids::{IdAllocator, OpId, OrderId};
pub use lifecycle::{OperationKind, OperationState, OrderState};
pub use types::{Price, Qty, QuoteLeg, QuoteShape, Side};
pub use wire::{MarketOperation, MarketPayload};
