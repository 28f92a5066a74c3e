//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (reuse or generate `x-request-id`)
//! 4. CSP nonce (per-request nonce for inline scripts)
//! 5. Security headers (CSP using the nonce, frame and referrer policy)
//! 6. Session layer (tower-sessions, in-memory store)
//! 7. Rate limiting on sign-in and contact routes (governor)

pub mod auth;
pub mod context;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_customer, is_htmx, set_current_customer};
pub use context::PageContext;
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{auth_rate_limiter, form_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
