/*
 * Responsibility
 * - Public surface of the middleware stack
 * - auth (security filter), cors, http (transport), security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
