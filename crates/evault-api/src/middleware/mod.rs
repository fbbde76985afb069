//! HTTP middleware layers.
//!
//! Rate limiting runs after authentication so limits are enforced
//! per caller rather than per connection.

pub mod rate_limit;
