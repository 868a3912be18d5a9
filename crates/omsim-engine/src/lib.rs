//! Order manager, throttle queue and market mirror.
//!
//! This crate stitches the order book into a market-facing engine:
//! - `OrderManager`: the public insert/amend/delete/quote surface,
//!   cross-check gating, release path and ack processing
//! - `ThrottleQueue`: the single-slot-per-order conflating outbound queue
//! - `MarketMirror`: a local replica of the market's resting interest
//!   that asserts the no-cross contract on every release
//! - `MarketSink`: the seam to whatever consumes released operations
//! - `TickPolicy`: injectable stochastic draws (throttle window, flush
//!   window, ack budget)

pub mod manager;
pub mod mirror;
pub mod policy;
pub mod sink;
pub mod throttle;

pub use manager::{OrderManager, Submission};
pub use mirror::MarketMirror;
pub use policy::{FixedPolicy, SeededPolicy, TickPolicy};
pub use sink::{MarketSink, NullSink, RecordingSink};
pub use throttle::ThrottleQueue;
