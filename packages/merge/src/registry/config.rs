//! Registry configuration with the built-in dialects.

use super::core::DialectRegistry;
use super::dialects::{
    create_resin_web_dialect, create_tomcat_context_dialect, create_web_app_dialect,
};

/// Create a registry holding every built-in dialect.
///
/// `resin-web` is registered before `web-app`: both use a `<web-app>` root
/// and only the namespace tells them apart.
#[must_use]
pub fn create_dialect_registry() -> DialectRegistry {
    let mut registry = DialectRegistry::new();

    registry.register("resin-web", create_resin_web_dialect);
    registry.register("web-app", create_web_app_dialect);
    registry.register("tomcat-context", create_tomcat_context_dialect);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    #[test]
    fn test_create_dialect_registry() {
        let registry = create_dialect_registry();

        assert_eq!(registry.keys(), vec!["resin-web", "web-app", "tomcat-context"]);
        assert!(registry.has_dialect("web-app"));
        assert!(!registry.has_dialect("jboss-web"));
    }

    #[test]
    fn test_detect_builtin_dialects() {
        let registry = create_dialect_registry();

        let web = parse_document(r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee"/>"#).unwrap();
        assert_eq!(registry.detect(&web).unwrap().key(), "web-app");

        let resin = parse_document(r#"<web-app xmlns="http://caucho.com/ns/resin"/>"#).unwrap();
        assert_eq!(registry.detect(&resin).unwrap().key(), "resin-web");

        let context = parse_document(r#"<Context path="/app"/>"#).unwrap();
        assert_eq!(registry.detect(&context).unwrap().key(), "tomcat-context");
    }
}
