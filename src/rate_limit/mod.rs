//! Rate limiting module
//!
//! Fixed window request limiting with a pluggable counting backend:
//!
//! - **Local**: in-process counters, one process's view only
//! - **Shared**: counters in Redis, shared by every service instance
//!
//! Windows are epoch-aligned: a window of `w` seconds containing `now`
//! starts at `now - now % w`, and every counter resets at the boundary.
//!
//! # Example
//!
//! ```rust,no_run
//! use ratelimiter::rate_limit::{select_backend, BackendSlot, LimitPolicy, RateLimiterGate};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = select_backend("redis://localhost:6379/0", Duration::from_secs(2)).await;
//!     let slot = BackendSlot::with_backend(Arc::new(backend));
//!
//!     let gate = RateLimiterGate::new(LimitPolicy::new(10, 60, "data").unwrap(), slot);
//!     match gate.check("203.0.113.50").await {
//!         Ok(()) => println!("admitted"),
//!         Err(e) => println!("rejected: {}", e),
//!     }
//! }
//! ```

pub mod backend;
pub mod clock;
pub mod gate;
pub mod identifier;
pub mod local;
pub mod middleware;
pub mod selector;
pub mod shared;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use backend::{Backend, BackendSlot, CounterBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::RateLimiterGate;
pub use identifier::{identify, identify_request};
pub use local::LocalBackend;
pub use middleware::{limited, rate_limit_middleware};
pub use selector::select_backend;
pub use shared::SharedBackend;
pub use store::{CounterStore, RedisStore};
pub use types::{LimitPolicy, RateLimitKey, WindowCounter};
