//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers (no inline scripts, no framing)
//! 4. Session layer (`SameSite=Strict`)
//!
//! Route protection is per handler through the [`RequireAdminAuth`]
//! extractor, or [`AdminPage`] for handlers that render a page.

pub mod auth;
pub mod page;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, set_current_admin};
pub use page::AdminPage;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
