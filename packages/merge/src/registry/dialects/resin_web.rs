//! Resin vendor descriptor (`WEB-INF/resin-web.xml`).
//!
//! Resin accepts most configuration either as child elements or as
//! attributes (`<servlet servlet-name="x" .../>`), so identities look at both.

use crate::registry::{Dialect, IdentityRule, Tag};

/// Namespace of Resin configuration files.
pub const RESIN_NAMESPACE: &str = "http://caucho.com/ns/resin";

fn named(name: &str) -> IdentityRule {
    IdentityRule::AnyOf(vec![
        IdentityRule::attribute(name),
        IdentityRule::child(name),
    ])
}

/// Create the `resin-web` dialect.
#[must_use]
pub fn create_resin_web_dialect() -> Dialect {
    let mut dialect = Dialect::new("resin-web", "web-app")
        .with_namespaces([RESIN_NAMESPACE])
        .requiring_namespace();

    dialect.register_section(Tag::new("class-loader"));
    dialect.register_section(Tag::new("character-encoding"));
    dialect.register_section(Tag::repeatable("system-property", IdentityRule::Unidentified));
    dialect.register_section(Tag::repeatable("context-param", named("param-name")));
    dialect.register_section(Tag::repeatable("env-entry", named("env-entry-name")));
    dialect.register_section(
        Tag::repeatable("database", named("jndi-name")).with_child_order([
            "jndi-name",
            "driver",
            "prepared-statement-cache-size",
            "max-connections",
            "max-idle-time",
        ]),
    );
    dialect.register_section(Tag::repeatable("resource", named("jndi-name")));
    dialect.register_section(Tag::repeatable("jndi-link", named("jndi-name")));
    dialect.register_section(Tag::repeatable("filter", named("filter-name")));
    dialect.register_section(Tag::repeatable(
        "filter-mapping",
        IdentityRule::AllOf(vec![
            named("filter-name"),
            IdentityRule::AnyOf(vec![
                IdentityRule::presence(["url-pattern", "servlet-name"]),
                IdentityRule::attribute_presence(["url-pattern", "servlet-name"]),
            ]),
        ]),
    ));
    dialect.register_section(Tag::repeatable("listener", named("listener-class")));
    dialect.register_section(Tag::repeatable("servlet", named("servlet-name")));
    dialect.register_section(Tag::repeatable("servlet-mapping", named("url-pattern")));
    dialect.register_section(Tag::new("session-config"));
    dialect.register_section(Tag::new("welcome-file-list"));
    dialect.register_section(Tag::repeatable("security-constraint", IdentityRule::Unidentified));
    dialect.register_section(Tag::new("login-config"));
    dialect.register_section(Tag::new("authenticator"));
    dialect.register_section(Tag::new("rewrite-dispatcher"));

    dialect.register(Tag::repeatable("init-param", named("param-name")));
    dialect.register(Tag::repeatable("url-pattern", IdentityRule::Text));
    dialect.register(Tag::repeatable("welcome-file", IdentityRule::Text));
    dialect.register(Tag::repeatable("driver", IdentityRule::Unidentified));
    for name in [
        "param-name",
        "param-value",
        "env-entry-name",
        "env-entry-type",
        "env-entry-value",
        "jndi-name",
        "factory",
        "target",
        "prepared-statement-cache-size",
        "max-connections",
        "max-idle-time",
        "filter-name",
        "filter-class",
        "listener-class",
        "servlet-name",
        "servlet-class",
        "load-on-startup",
        "session-timeout",
        "type",
        "url",
        "user",
        "password",
    ] {
        dialect.register(Tag::new(name));
    }

    dialect
}
