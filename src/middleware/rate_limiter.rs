//! Rate limiting for the login endpoint.
//!
//! Slows down brute-force attempts against credentials.

use actix_governor::governor::clock::QuantaInstant;
use actix_governor::governor::middleware::NoOpMiddleware;
use actix_governor::{GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};

/// Governor settings applied to the login resource.
pub type LoginRateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>>;

/// Burst of 5 requests, one replenished every 6 seconds (10 per minute).
///
/// Returns `None` only if the quota parameters are zero.
pub fn create_login_rate_limiter_config() -> Option<LoginRateLimit> {
    GovernorConfigBuilder::default()
        .seconds_per_request(6)
        .burst_size(5)
        .finish()
}
