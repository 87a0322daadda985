//! End-to-end merge tests over descriptor fixtures.
//!
//! Covers the merge scenarios for filter mappings, listeners, resource
//! references and empty sections, plus the idempotence, ordering and
//! strategy properties every merge must satisfy.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use descriptor_merge::{
    create_resin_web_dialect, create_tomcat_context_dialect, create_web_app_dialect, merge_str,
    Descriptor, DescriptorMerger, Dialect, MergeConfig, MergeStrategy, WebXml,
};
use pretty_assertions::assert_eq;

/// Load fixture file content.
fn load_fixture(dialect: &str, name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(dialect)
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn web_app() -> Arc<Dialect> {
    Arc::new(create_web_app_dialect())
}

fn parse(xml: &str, dialect: &Arc<Dialect>) -> Descriptor {
    Descriptor::parse(xml, dialect.clone()).expect("Failed to parse descriptor")
}

/// Merge with one strategy for every section.
fn merge_all(original: &mut Descriptor, overlay: &Descriptor, strategy: MergeStrategy) -> usize {
    DescriptorMerger::new(original.dialect().clone())
        .with_default_strategy(strategy)
        .merge(original, overlay)
        .expect("merge failed")
        .total()
}

fn top_level_tags(descriptor: &Descriptor) -> Vec<String> {
    let doc = descriptor.document();
    doc.element_children(doc.root_element())
        .map(|child| doc.tag_name(child).to_string())
        .collect()
}

fn assert_top_level_order(descriptor: &Descriptor) {
    let dialect = descriptor.dialect();
    let positions: Vec<usize> = top_level_tags(descriptor)
        .iter()
        .filter_map(|tag| dialect.get_tag(tag).and_then(|spec| spec.position))
        .collect();
    assert!(
        positions.windows(2).all(|pair| pair[0] <= pair[1]),
        "top-level sections out of order: {:?}",
        top_level_tags(descriptor)
    );
}

const SCENARIO_A_ORIGINAL: &str = r"<web-app>
  <filter-mapping>
    <filter-name>LogFilter</filter-name>
    <url-pattern>/old</url-pattern>
  </filter-mapping>
</web-app>";

const SCENARIO_A_OVERLAY: &str = r"<web-app>
  <filter-mapping>
    <filter-name>LogFilter</filter-name>
    <url-pattern>/new</url-pattern>
  </filter-mapping>
</web-app>";

#[test]
fn test_scenario_a_filter_mapping_overwrite() {
    let dialect = web_app();
    let mut original = parse(SCENARIO_A_ORIGINAL, &dialect);
    let overlay = parse(SCENARIO_A_OVERLAY, &dialect);

    merge_all(&mut original, &overlay, MergeStrategy::Overwrite);

    let web = WebXml::from_descriptor(original).unwrap();
    assert_eq!(web.filter_mappings().len(), 1);
    assert_eq!(web.filter_url_patterns("LogFilter"), vec!["/new"]);
}

#[test]
fn test_scenario_a_filter_mapping_preserve() {
    let dialect = web_app();
    let mut original = parse(SCENARIO_A_ORIGINAL, &dialect);
    let overlay = parse(SCENARIO_A_OVERLAY, &dialect);

    merge_all(&mut original, &overlay, MergeStrategy::Preserve);

    let web = WebXml::from_descriptor(original).unwrap();
    assert_eq!(web.filter_mappings().len(), 1);
    assert_eq!(web.filter_url_patterns("LogFilter"), vec!["/old"]);
}

#[test]
fn test_scenario_b_listener_added_in_position() {
    let dialect = web_app();
    let overlay = parse(
        "<web-app><listener><listener-class>com.example.Init</listener-class></listener></web-app>",
        &dialect,
    );

    // Ignore skips the section by definition, so only the inserting strategies apply.
    for strategy in [MergeStrategy::Overwrite, MergeStrategy::Preserve, MergeStrategy::Augment] {
        let mut original = parse(&load_fixture("web-app", "original.xml"), &dialect);
        merge_all(&mut original, &overlay, strategy);

        let tags = top_level_tags(&original);
        let listener = tags.iter().position(|tag| tag == "listener").unwrap();
        assert_eq!(tags[listener - 1], "filter-mapping", "{strategy}");
        assert_eq!(tags[listener + 1], "servlet", "{strategy}");

        let web = WebXml::from_descriptor(original).unwrap();
        assert_eq!(web.listener_classes(), vec!["com.example.Init"]);
    }
}

#[test]
fn test_scenario_c_distinct_resource_refs_kept_in_order() {
    let dialect = web_app();
    let overlay = parse(
        r"<web-app><resource-ref>
            <res-ref-name>jdbc/B</res-ref-name>
          </resource-ref></web-app>",
        &dialect,
    );

    for strategy in [MergeStrategy::Overwrite, MergeStrategy::Preserve, MergeStrategy::Augment] {
        let mut original = parse(
            "<web-app><resource-ref><res-ref-name>jdbc/A</res-ref-name></resource-ref></web-app>",
            &dialect,
        );
        merge_all(&mut original, &overlay, strategy);

        let doc = original.document();
        let names: Vec<_> = original
            .elements("resource-ref")
            .unwrap()
            .into_iter()
            .filter_map(|reference| doc.first_child(reference, "res-ref-name"))
            .filter_map(|name| doc.trimmed_text(name))
            .collect();
        assert_eq!(names, vec!["jdbc/A", "jdbc/B"], "{strategy}");
    }
}

#[test]
fn test_scenario_d_empty_overlay_section() {
    let dialect = web_app();
    let mut original = parse(&load_fixture("web-app", "original.xml"), &dialect);
    let before = original.to_xml();
    let overlay = parse("<web-app><display-name>Shop</display-name></web-app>", &dialect);

    let report = DescriptorMerger::new(dialect)
        .merge(&mut original, &overlay)
        .unwrap();

    assert_eq!(report.section("servlet").unwrap().changed, 0);
    assert_eq!(report.section("display-name").unwrap().changed, 0);
    assert_eq!(report.total(), 0);
    assert_eq!(original.to_xml(), before);
}

#[test]
fn test_localized_descriptions_merge_per_language() {
    let dialect = web_app();
    let mut original = parse(
        r#"<web-app version="2.5"><description>Shop</description></web-app>"#,
        &dialect,
    );
    let overlay = parse(
        r#"<web-app version="2.5">
  <description>Webshop</description>
  <description xml:lang="nl">Winkel</description>
  <description xml:lang="de">Laden</description>
</web-app>"#,
        &dialect,
    );

    assert_eq!(merge_all(&mut original, &overlay, MergeStrategy::Overwrite), 3);

    let doc = original.document();
    let descriptions: Vec<(Option<String>, String)> = original
        .elements("description")
        .unwrap()
        .into_iter()
        .map(|element| {
            (
                doc.attribute(element, "xml:lang").map(str::to_owned),
                doc.trimmed_text(element).unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        descriptions,
        vec![
            (None, "Webshop".to_string()),
            (Some("nl".to_string()), "Winkel".to_string()),
            (Some("de".to_string()), "Laden".to_string()),
        ]
    );
}

#[test]
fn test_fixture_merge_overwrite() {
    let outcome = merge_str(
        &load_fixture("web-app", "original.xml"),
        &load_fixture("web-app", "overlay.xml"),
        &MergeConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.xml, load_fixture("web-app", "expected-overwrite.xml"));
    assert_eq!(outcome.report.total(), 7);
    assert_eq!(outcome.report.section("context-param").unwrap().changed, 2);
}

#[test]
fn test_merge_is_idempotent() {
    let dialect = web_app();
    let overlay = parse(&load_fixture("web-app", "overlay.xml"), &dialect);

    for strategy in [MergeStrategy::Overwrite, MergeStrategy::Preserve, MergeStrategy::Augment] {
        let mut original = parse(&load_fixture("web-app", "original.xml"), &dialect);
        merge_all(&mut original, &overlay, strategy);
        let once = original.to_xml();

        let changed = merge_all(&mut original, &overlay, strategy);

        assert_eq!(changed, 0, "{strategy}");
        assert_eq!(original.to_xml(), once, "{strategy}");
    }
}

#[test]
fn test_merge_keeps_top_level_order() {
    for (dialect, name) in [
        (web_app(), "web-app"),
        (Arc::new(create_resin_web_dialect()), "resin-web"),
        (Arc::new(create_tomcat_context_dialect()), "tomcat-context"),
    ] {
        let mut original = parse(&load_fixture(name, "original.xml"), &dialect);
        let overlay = parse(&load_fixture(name, "overlay.xml"), &dialect);

        merge_all(&mut original, &overlay, MergeStrategy::Overwrite);

        assert_top_level_order(&original);
    }
}

#[test]
fn test_strategy_partition() {
    let dialect = web_app();
    let overlay_xml = load_fixture("web-app", "overlay.xml");
    let overlay = parse(&overlay_xml, &dialect);

    let mut overwritten = parse(&load_fixture("web-app", "original.xml"), &dialect);
    merge_all(&mut overwritten, &overlay, MergeStrategy::Overwrite);
    let overwritten = WebXml::from_descriptor(overwritten).unwrap();

    let mut preserved = parse(&load_fixture("web-app", "original.xml"), &dialect);
    merge_all(&mut preserved, &overlay, MergeStrategy::Preserve);
    let preserved = WebXml::from_descriptor(preserved).unwrap();

    // Matched keys: overlay content vs original content
    assert_eq!(overwritten.context_param("environment").as_deref(), Some("production"));
    assert_eq!(preserved.context_param("environment").as_deref(), Some("development"));
    assert_eq!(overwritten.filter_url_patterns("LogFilter"), vec!["/new/*"]);
    assert_eq!(preserved.filter_url_patterns("LogFilter"), vec!["/old/*"]);

    // Unmatched keys: inserted under both
    for web in [&overwritten, &preserved] {
        assert_eq!(web.context_param("cdn").as_deref(), Some("https://cdn.example.com"));
        assert_eq!(web.listener_classes(), vec!["com.example.Init"]);
        assert_eq!(web.resource_refs().len(), 2);
    }
}

#[test]
fn test_overlay_is_not_modified() {
    let dialect = web_app();
    let mut original = parse(&load_fixture("web-app", "original.xml"), &dialect);
    let overlay = parse(&load_fixture("web-app", "overlay.xml"), &dialect);
    let overlay_before = overlay.to_xml();

    merge_all(&mut original, &overlay, MergeStrategy::Overwrite);

    assert_eq!(overlay.to_xml(), overlay_before);
}

#[test]
fn test_no_cross_contamination_between_sections() {
    let dialect = web_app();
    let mut original = parse(&load_fixture("web-app", "original.xml"), &dialect);
    let overlay = parse(&load_fixture("web-app", "overlay.xml"), &dialect);

    let mut merger = DescriptorMerger::new(dialect).with_default_strategy(MergeStrategy::Ignore);
    merger.set_strategy("servlet", MergeStrategy::Overwrite).unwrap();
    let report = merger.merge(&mut original, &overlay).unwrap();

    assert_eq!(report.total(), 1);
    let web = WebXml::from_descriptor(original).unwrap();
    assert_eq!(web.context_param("environment").as_deref(), Some("development"));
    assert_eq!(web.context_param("cdn"), None);
    assert!(web.listeners().is_empty());
    assert_eq!(web.filter_url_patterns("LogFilter"), vec!["/old/*"]);
    assert_eq!(web.resource_refs().len(), 1);
}

#[test]
fn test_overlay_in_other_namespace_is_rehomed() {
    let dialect = web_app();
    let mut original = parse(&load_fixture("web-app", "javaee.xml"), &dialect);
    let overlay = parse(&load_fixture("web-app", "overlay.xml"), &dialect);

    merge_all(&mut original, &overlay, MergeStrategy::Overwrite);

    let xml = original.to_xml();
    assert!(xml.contains(r#"xmlns="http://java.sun.com/xml/ns/javaee""#));
    assert_eq!(xml.matches("xmlns=").count(), 1);
    assert!(!xml.contains("xmlns=\"\""));

    let web = WebXml::from_descriptor(original).unwrap();
    assert_eq!(web.servlet_names(), vec!["shop"]);
    assert_eq!(web.listener_classes(), vec!["com.example.Init"]);
    assert_eq!(web.version().map(|version| version.to_string()).as_deref(), Some("2.5"));
}

#[test]
fn test_resin_attribute_and_child_forms_match() {
    let dialect = Arc::new(create_resin_web_dialect());
    let mut original = parse(&load_fixture("resin-web", "original.xml"), &dialect);
    let overlay = parse(&load_fixture("resin-web", "overlay.xml"), &dialect);

    merge_all(&mut original, &overlay, MergeStrategy::Overwrite);

    assert_eq!(original.elements("servlet").unwrap().len(), 1);
    assert_eq!(original.elements("database").unwrap().len(), 1);
    let xml = original.to_xml();
    assert!(xml.contains("<servlet-class>com.example.shop.ResinShopServlet</servlet-class>"));
    assert!(xml.contains("<max-connections>50</max-connections>"));
    assert!(xml.contains(r#"<servlet-mapping url-pattern="/shop/*" servlet-name="shop"/>"#));
}

#[test]
fn test_resin_scenario_a_filter_mapping_overwrite() {
    let dialect = Arc::new(create_resin_web_dialect());
    let original_xml = r#"<web-app xmlns="http://caucho.com/ns/resin">
  <filter-mapping filter-name="LogFilter" url-pattern="/old"/>
</web-app>"#;
    let overlays = [
        r#"<web-app xmlns="http://caucho.com/ns/resin">
  <filter-mapping filter-name="LogFilter" url-pattern="/new"/>
</web-app>"#,
        r#"<web-app xmlns="http://caucho.com/ns/resin">
  <filter-mapping>
    <filter-name>LogFilter</filter-name>
    <url-pattern>/new</url-pattern>
  </filter-mapping>
</web-app>"#,
    ];

    for overlay_xml in overlays {
        let mut original = parse(original_xml, &dialect);
        let overlay = parse(overlay_xml, &dialect);

        assert_eq!(merge_all(&mut original, &overlay, MergeStrategy::Overwrite), 1);

        let mappings = original.elements("filter-mapping").unwrap();
        assert_eq!(mappings.len(), 1, "{overlay_xml}");
        let xml = original.to_xml();
        assert!(xml.contains("/new"), "{xml}");
        assert!(!xml.contains("/old"), "{xml}");
    }
}

#[test]
fn test_resin_filter_mapping_by_servlet_is_distinct() {
    let dialect = Arc::new(create_resin_web_dialect());
    let mut original = parse(
        r#"<web-app xmlns="http://caucho.com/ns/resin"><filter-mapping filter-name="LogFilter" url-pattern="/old"/></web-app>"#,
        &dialect,
    );
    let overlay = parse(
        r#"<web-app xmlns="http://caucho.com/ns/resin"><filter-mapping filter-name="LogFilter" servlet-name="shop"/></web-app>"#,
        &dialect,
    );

    merge_all(&mut original, &overlay, MergeStrategy::Overwrite);

    assert_eq!(original.elements("filter-mapping").unwrap().len(), 2);
}

#[test]
fn test_tomcat_context_merge() {
    let dialect = Arc::new(create_tomcat_context_dialect());
    let mut original = parse(&load_fixture("tomcat-context", "original.xml"), &dialect);
    let overlay = parse(&load_fixture("tomcat-context", "overlay.xml"), &dialect);

    let changed = merge_all(&mut original, &overlay, MergeStrategy::Overwrite);

    // Parameter and Resource replaced, one Resource, the Valve and one WatchedResource added
    assert_eq!(changed, 5);
    assert_eq!(
        top_level_tags(&original),
        vec![
            "Manager",
            "Parameter",
            "Resource",
            "Resource",
            "Valve",
            "WatchedResource",
            "WatchedResource",
        ]
    );
    let xml = original.to_xml();
    assert!(xml.contains(r#"<Context reloadable="false">"#));
    assert!(xml.contains(r#"maxTotal="50""#));
    assert!(!xml.contains(r#"maxTotal="10""#));
}

#[test]
fn test_tomcat_context_augment_keeps_original_attributes() {
    let dialect = Arc::new(create_tomcat_context_dialect());
    let mut original = parse(
        r#"<Context><Resource name="jdbc/shop" maxTotal="10"/></Context>"#,
        &dialect,
    );
    let overlay = parse(
        r#"<Context><Resource name="jdbc/shop" maxTotal="50" maxIdle="5"/></Context>"#,
        &dialect,
    );

    merge_all(&mut original, &overlay, MergeStrategy::Augment);

    assert!(original
        .to_xml()
        .contains(r#"<Resource name="jdbc/shop" maxTotal="10" maxIdle="5"/>"#));
}
