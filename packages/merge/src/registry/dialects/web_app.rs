//! Standard servlet deployment descriptor (`WEB-INF/web.xml`).

use crate::registry::{Dialect, IdentityRule, Tag};

/// Namespace of Servlet 2.4 descriptors.
pub const J2EE_NAMESPACE: &str = "http://java.sun.com/xml/ns/j2ee";

/// Namespace of Servlet 2.5 and 3.0 descriptors.
pub const JAVAEE_NAMESPACE: &str = "http://java.sun.com/xml/ns/javaee";

/// Namespace of Servlet 3.1 and 4.0 descriptors.
pub const JCP_NAMESPACE: &str = "http://xmlns.jcp.org/xml/ns/javaee";

/// Namespace of Servlet 5.0 and later descriptors.
pub const JAKARTAEE_NAMESPACE: &str = "https://jakarta.ee/xml/ns/jakartaee";

/// Create the `web-app` dialect.
///
/// Top-level sections follow the Servlet 2.3 DTD order, extended with the
/// elements later schema versions added. Later schemas no longer enforce an
/// order, so the DTD order is a valid layout for every version.
#[must_use]
pub fn create_web_app_dialect() -> Dialect {
    let mut dialect = Dialect::new("web-app", "web-app").with_namespaces([
        J2EE_NAMESPACE,
        JAVAEE_NAMESPACE,
        JCP_NAMESPACE,
        JAKARTAEE_NAMESPACE,
    ]);

    // Application metadata. From 2.4 on these repeat once per `xml:lang`;
    // an element without one stands for the default language.
    let localized = || {
        IdentityRule::AnyOf(vec![
            IdentityRule::attribute("xml:lang"),
            IdentityRule::Singleton,
        ])
    };
    dialect.register_section(Tag::repeatable("icon", localized()));
    dialect.register_section(Tag::repeatable("display-name", localized()));
    dialect.register_section(Tag::repeatable("description", localized()));
    dialect.register_section(Tag::new("distributable"));
    dialect.register_section(Tag::new("module-name"));

    dialect.register_section(Tag::repeatable(
        "context-param",
        IdentityRule::child("param-name"),
    ));

    dialect.register_section(
        Tag::repeatable("filter", IdentityRule::child("filter-name")).with_child_order([
            "description",
            "display-name",
            "icon",
            "filter-name",
            "filter-class",
            "async-supported",
            "init-param",
        ]),
    );

    // A mapping is identified by its filter and by whether it targets URLs
    // or servlets; the mapped values themselves are content.
    dialect.register_section(
        Tag::repeatable(
            "filter-mapping",
            IdentityRule::AllOf(vec![
                IdentityRule::child("filter-name"),
                IdentityRule::presence(["url-pattern", "servlet-name"]),
            ]),
        )
        .with_child_order(["filter-name", "url-pattern", "servlet-name", "dispatcher"]),
    );

    dialect.register_section(
        Tag::repeatable("listener", IdentityRule::child("listener-class")).with_child_order([
            "description",
            "display-name",
            "icon",
            "listener-class",
        ]),
    );

    dialect.register_section(
        Tag::repeatable("servlet", IdentityRule::child("servlet-name")).with_child_order([
            "description",
            "display-name",
            "icon",
            "servlet-name",
            "servlet-class",
            "jsp-file",
            "init-param",
            "load-on-startup",
            "enabled",
            "async-supported",
            "run-as",
            "security-role-ref",
            "multipart-config",
        ]),
    );

    dialect.register_section(
        Tag::repeatable("servlet-mapping", IdentityRule::child("servlet-name"))
            .with_child_order(["servlet-name", "url-pattern"]),
    );

    dialect.register_section(Tag::new("session-config").with_child_order([
        "session-timeout",
        "cookie-config",
        "tracking-mode",
    ]));
    dialect.register_section(Tag::repeatable(
        "mime-mapping",
        IdentityRule::child("extension"),
    ));
    dialect.register_section(Tag::new("welcome-file-list"));
    dialect.register_section(Tag::repeatable(
        "error-page",
        IdentityRule::AnyOf(vec![
            IdentityRule::child("error-code"),
            IdentityRule::child("exception-type"),
            // Servlet 3.0 default error page: location only
            IdentityRule::presence(["location"]),
        ]),
    ));
    dialect.register_section(Tag::repeatable("taglib", IdentityRule::child("taglib-uri")));
    dialect.register_section(Tag::new("jsp-config"));

    // Resource references
    dialect.register_section(Tag::repeatable(
        "resource-env-ref",
        IdentityRule::child("resource-env-ref-name"),
    ));
    dialect.register_section(
        Tag::repeatable("resource-ref", IdentityRule::child("res-ref-name")).with_child_order([
            "description",
            "res-ref-name",
            "res-type",
            "res-auth",
            "res-sharing-scope",
        ]),
    );

    // Security
    dialect.register_section(
        Tag::repeatable(
            "security-constraint",
            IdentityRule::child("web-resource-collection/web-resource-name"),
        )
        .with_child_order([
            "display-name",
            "web-resource-collection",
            "auth-constraint",
            "user-data-constraint",
        ]),
    );
    dialect.register_section(Tag::new("login-config").with_child_order([
        "auth-method",
        "realm-name",
        "form-login-config",
    ]));
    dialect.register_section(Tag::repeatable(
        "security-role",
        IdentityRule::child("role-name"),
    ));

    // Environment and EJB references
    dialect.register_section(Tag::repeatable(
        "env-entry",
        IdentityRule::child("env-entry-name"),
    ));
    dialect.register_section(Tag::repeatable("ejb-ref", IdentityRule::child("ejb-ref-name")));
    dialect.register_section(Tag::repeatable(
        "ejb-local-ref",
        IdentityRule::child("ejb-ref-name"),
    ));
    dialect.register_section(Tag::repeatable(
        "service-ref",
        IdentityRule::child("service-ref-name"),
    ));
    dialect.register_section(Tag::repeatable(
        "message-destination-ref",
        IdentityRule::child("message-destination-ref-name"),
    ));
    dialect.register_section(Tag::repeatable(
        "persistence-context-ref",
        IdentityRule::child("persistence-context-ref-name"),
    ));
    dialect.register_section(Tag::repeatable(
        "persistence-unit-ref",
        IdentityRule::child("persistence-unit-ref-name"),
    ));

    // Lifecycle callbacks
    let callback = || {
        IdentityRule::AllOf(vec![
            IdentityRule::child("lifecycle-callback-class"),
            IdentityRule::child("lifecycle-callback-method"),
        ])
    };
    dialect.register_section(Tag::repeatable("post-construct", callback()));
    dialect.register_section(Tag::repeatable("pre-destroy", callback()));

    dialect.register_section(Tag::repeatable(
        "message-destination",
        IdentityRule::child("message-destination-name"),
    ));
    dialect.register_section(Tag::new("locale-encoding-mapping-list"));
    dialect.register_section(Tag::new("absolute-ordering"));

    // Nested repeatable elements
    dialect.register(Tag::repeatable("init-param", IdentityRule::child("param-name")));
    dialect.register(Tag::repeatable("url-pattern", IdentityRule::Text));
    dialect.register(Tag::repeatable("dispatcher", IdentityRule::Text));
    dialect.register(Tag::repeatable("welcome-file", IdentityRule::Text));
    dialect.register(Tag::repeatable("role-name", IdentityRule::Text));
    dialect.register(Tag::repeatable("http-method", IdentityRule::Text));
    dialect.register(Tag::repeatable("http-method-omission", IdentityRule::Text));
    dialect.register(Tag::repeatable("tracking-mode", IdentityRule::Text));
    dialect.register(Tag::repeatable(
        "web-resource-collection",
        IdentityRule::child("web-resource-name"),
    ));
    dialect.register(Tag::repeatable(
        "security-role-ref",
        IdentityRule::child("role-name"),
    ));
    dialect.register(Tag::repeatable(
        "locale-encoding-mapping",
        IdentityRule::child("locale"),
    ));
    dialect.register(Tag::repeatable("jsp-property-group", IdentityRule::Unidentified));

    // Nested single-valued elements
    for name in [
        "param-name",
        "param-value",
        "filter-name",
        "filter-class",
        "servlet-name",
        "servlet-class",
        "jsp-file",
        "load-on-startup",
        "enabled",
        "async-supported",
        "run-as",
        "multipart-config",
        "listener-class",
        "session-timeout",
        "cookie-config",
        "extension",
        "mime-type",
        "error-code",
        "exception-type",
        "location",
        "taglib-uri",
        "taglib-location",
        "resource-env-ref-name",
        "resource-env-ref-type",
        "res-ref-name",
        "res-type",
        "res-auth",
        "res-sharing-scope",
        "web-resource-name",
        "auth-constraint",
        "user-data-constraint",
        "transport-guarantee",
        "auth-method",
        "realm-name",
        "form-login-config",
        "form-login-page",
        "form-error-page",
        "env-entry-name",
        "env-entry-type",
        "env-entry-value",
        "ejb-ref-name",
        "ejb-ref-type",
        "home",
        "remote",
        "local-home",
        "local",
        "ejb-link",
        "service-ref-name",
        "message-destination-ref-name",
        "persistence-context-ref-name",
        "persistence-unit-ref-name",
        "lifecycle-callback-class",
        "lifecycle-callback-method",
        "message-destination-name",
        "locale",
        "encoding",
        "small-icon",
        "large-icon",
    ] {
        dialect.register(Tag::new(name));
    }

    dialect
}
