//! The public-facing API of the inventory engine.
//!
//! Each API struct is generic over a backend that implements the relevant trait from [`crate::traits`]. The APIs
//! validate inputs that do not depend on stored state, then hand the unit of work to the backend under a
//! [`RetryPolicy`](crate::helpers::RetryPolicy) so that storage contention is retried transparently.
pub mod order_flow_api;
pub mod order_objects;
pub mod product_api;
pub mod webhook_api;
pub mod webhook_objects;
