//! Tomcat context descriptor (`META-INF/context.xml`).

use crate::registry::{Dialect, IdentityRule, Tag};

/// Create the `tomcat-context` dialect.
///
/// Tomcat identifies most context children by attributes, which makes this
/// dialect the attribute-keyed counterpart of `web-app`.
#[must_use]
pub fn create_tomcat_context_dialect() -> Dialect {
    let mut dialect = Dialect::new("tomcat-context", "Context");

    dialect.register_section(Tag::new("Loader"));
    dialect.register_section(Tag::new("Manager"));
    dialect.register_section(Tag::new("Realm"));
    dialect.register_section(Tag::new("Resources"));
    dialect.register_section(Tag::new("JarScanner"));
    dialect.register_section(Tag::new("CookieProcessor"));
    dialect.register_section(Tag::repeatable("Parameter", IdentityRule::attribute("name")));
    dialect.register_section(Tag::repeatable("Environment", IdentityRule::attribute("name")));
    dialect.register_section(Tag::repeatable("Resource", IdentityRule::attribute("name")));
    dialect.register_section(Tag::repeatable("ResourceLink", IdentityRule::attribute("name")));
    dialect.register_section(Tag::repeatable("Listener", IdentityRule::attribute("className")));
    dialect.register_section(Tag::repeatable("Valve", IdentityRule::attribute("className")));
    dialect.register_section(Tag::repeatable("WatchedResource", IdentityRule::Text));
    dialect.register_section(Tag::repeatable("WrapperLifecycle", IdentityRule::Text));
    dialect.register_section(Tag::repeatable("WrapperListener", IdentityRule::Text));
    dialect.register_section(Tag::new("Transaction"));

    dialect.register(Tag::new("Store"));
    dialect.register(Tag::new("JarScanFilter"));
    dialect.register(Tag::new("CredentialHandler"));
    dialect.register(Tag::repeatable("PreResources", IdentityRule::attribute("base")));
    dialect.register(Tag::repeatable("JarResources", IdentityRule::attribute("base")));
    dialect.register(Tag::repeatable("PostResources", IdentityRule::attribute("base")));

    dialect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tomcat_context_identities() {
        let dialect = create_tomcat_context_dialect();

        assert_eq!(
            dialect.tag_for("Resource").unwrap().identity,
            IdentityRule::Attribute("name".to_string())
        );
        assert_eq!(dialect.tag_for("Manager").unwrap().identity, IdentityRule::Singleton);
    }

    #[test]
    fn test_tomcat_context_is_case_sensitive() {
        let dialect = create_tomcat_context_dialect();
        assert!(dialect.is_section("Resource"));
        assert!(!dialect.is_registered("resource"));
    }
}
