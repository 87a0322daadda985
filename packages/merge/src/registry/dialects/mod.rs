//! Built-in descriptor dialects.

mod resin_web;
mod tomcat_context;
mod web_app;

pub use resin_web::{create_resin_web_dialect, RESIN_NAMESPACE};
pub use tomcat_context::create_tomcat_context_dialect;
pub use web_app::{create_web_app_dialect, J2EE_NAMESPACE, JAKARTAEE_NAMESPACE, JAVAEE_NAMESPACE, JCP_NAMESPACE};
