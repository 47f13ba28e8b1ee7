//! Rate Limiting
//!
//! Fixed-window admission control per client identity and quota class.
//! A quota class declares a time unit and an allowed usage count per
//! unit; counters live per `(client, class)` pair and roll over when the
//! wall clock crosses a window boundary.

pub mod limiter;
pub mod quota;
pub mod store;

pub use limiter::{Decision, RateLimiter};
pub use quota::{QuotaClass, QuotaUnit, WindowCounter};
pub use store::{CounterKey, CounterStore};
