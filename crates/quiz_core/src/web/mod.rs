//! Framework-neutral web layer: routes, sessions and views.

pub mod http;
pub mod session;
pub mod urls;
pub mod views;
