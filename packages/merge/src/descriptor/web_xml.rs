//! Typed access to standard `web.xml` descriptors.

use std::sync::Arc;

use super::document::Descriptor;
use super::version::WebAppVersion;
use crate::error::{DescriptorError, Result};
use crate::registry::create_web_app_dialect;
use crate::xml::Element;

/// A `web-app` descriptor with typed accessors and builders for the
/// sections applications touch most.
///
/// # Examples
/// ```
/// use descriptor_merge::descriptor::WebXml;
///
/// let mut web = WebXml::new();
/// web.add_servlet("app", "com.example.AppServlet").unwrap();
/// web.add_servlet_mapping("app", "/app/*").unwrap();
///
/// assert!(web.has_servlet("app"));
/// assert_eq!(web.servlet_url_patterns("app"), vec!["/app/*".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct WebXml {
    descriptor: Descriptor,
}

/// One `<init-param>` of a filter or servlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitParam {
    pub name: String,
    pub value: String,
}

impl WebXml {
    /// Create an empty `<web-app>` without namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: Descriptor::new(Arc::new(create_web_app_dialect())),
        }
    }

    /// Parse a `web.xml`.
    ///
    /// # Errors
    /// Returns `XmlParse` for malformed XML and `RootMismatch` when the
    /// document is not a `web-app`.
    pub fn parse(xml: &str) -> Result<Self> {
        Ok(Self {
            descriptor: Descriptor::parse(xml, Arc::new(create_web_app_dialect()))?,
        })
    }

    /// Wrap a descriptor of the `web-app` dialect.
    ///
    /// # Errors
    /// Returns `DialectMismatch` for descriptors of any other dialect.
    pub fn from_descriptor(descriptor: Descriptor) -> Result<Self> {
        if descriptor.dialect().key() != "web-app" {
            return Err(DescriptorError::DialectMismatch {
                original: "web-app".to_string(),
                overlay: descriptor.dialect().key().to_string(),
            });
        }
        Ok(Self { descriptor })
    }

    #[must_use]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn descriptor_mut(&mut self) -> &mut Descriptor {
        &mut self.descriptor
    }

    #[must_use]
    pub fn into_descriptor(self) -> Descriptor {
        self.descriptor
    }

    /// Servlet specification version, if it can be told.
    #[must_use]
    pub fn version(&self) -> Option<WebAppVersion> {
        WebAppVersion::detect(self.descriptor.document())
    }

    // --- Sections ---

    #[must_use]
    pub fn filters(&self) -> Vec<Element> {
        self.section("filter")
    }

    #[must_use]
    pub fn filter_mappings(&self) -> Vec<Element> {
        self.section("filter-mapping")
    }

    #[must_use]
    pub fn servlets(&self) -> Vec<Element> {
        self.section("servlet")
    }

    #[must_use]
    pub fn servlet_mappings(&self) -> Vec<Element> {
        self.section("servlet-mapping")
    }

    #[must_use]
    pub fn listeners(&self) -> Vec<Element> {
        self.section("listener")
    }

    #[must_use]
    pub fn context_params(&self) -> Vec<Element> {
        self.section("context-param")
    }

    #[must_use]
    pub fn resource_refs(&self) -> Vec<Element> {
        self.section("resource-ref")
    }

    fn section(&self, tag: &str) -> Vec<Element> {
        let doc = self.descriptor.document();
        doc.children(doc.root_element(), tag).collect()
    }

    fn child_text(&self, element: Element, tag: &str) -> Option<String> {
        let doc = self.descriptor.document();
        doc.first_child(element, tag).and_then(|child| doc.trimmed_text(child))
    }

    fn texts(&self, element: Element, tag: &str) -> Vec<String> {
        let doc = self.descriptor.document();
        doc.children(element, tag)
            .filter_map(|child| doc.trimmed_text(child))
            .collect()
    }

    fn find_named(&self, tag: &str, name_tag: &str, name: &str) -> Option<Element> {
        self.section(tag)
            .into_iter()
            .find(|element| self.child_text(*element, name_tag).as_deref() == Some(name))
    }

    // --- Queries ---

    /// Names of all declared filters, in document order.
    #[must_use]
    pub fn filter_names(&self) -> Vec<String> {
        self.filters()
            .into_iter()
            .filter_map(|filter| self.child_text(filter, "filter-name"))
            .collect()
    }

    /// Names of all declared servlets, in document order.
    #[must_use]
    pub fn servlet_names(&self) -> Vec<String> {
        self.servlets()
            .into_iter()
            .filter_map(|servlet| self.child_text(servlet, "servlet-name"))
            .collect()
    }

    /// URL patterns mapped to the filter `name`.
    #[must_use]
    pub fn filter_url_patterns(&self, name: &str) -> Vec<String> {
        self.filter_mappings()
            .into_iter()
            .filter(|mapping| self.child_text(*mapping, "filter-name").as_deref() == Some(name))
            .flat_map(|mapping| self.texts(mapping, "url-pattern"))
            .collect()
    }

    /// URL patterns mapped to the servlet `name`.
    #[must_use]
    pub fn servlet_url_patterns(&self, name: &str) -> Vec<String> {
        self.servlet_mappings()
            .into_iter()
            .filter(|mapping| self.child_text(*mapping, "servlet-name").as_deref() == Some(name))
            .flat_map(|mapping| self.texts(mapping, "url-pattern"))
            .collect()
    }

    /// Value of the context parameter `name`.
    #[must_use]
    pub fn context_param(&self, name: &str) -> Option<String> {
        self.find_named("context-param", "param-name", name)
            .and_then(|param| self.child_text(param, "param-value"))
    }

    /// Init parameters of the servlet `name`, in document order.
    #[must_use]
    pub fn servlet_init_params(&self, name: &str) -> Vec<InitParam> {
        let Some(servlet) = self.find_named("servlet", "servlet-name", name) else {
            return Vec::new();
        };
        self.descriptor
            .document()
            .children(servlet, "init-param")
            .filter_map(|param| {
                Some(InitParam {
                    name: self.child_text(param, "param-name")?,
                    value: self.child_text(param, "param-value").unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Listener classes, in document order.
    #[must_use]
    pub fn listener_classes(&self) -> Vec<String> {
        self.listeners()
            .into_iter()
            .filter_map(|listener| self.child_text(listener, "listener-class"))
            .collect()
    }

    #[must_use]
    pub fn has_filter(&self, name: &str) -> bool {
        self.find_named("filter", "filter-name", name).is_some()
    }

    #[must_use]
    pub fn has_servlet(&self, name: &str) -> bool {
        self.find_named("servlet", "servlet-name", name).is_some()
    }

    // --- Builders ---

    /// Add a `<context-param>`.
    ///
    /// # Errors
    /// Returns `Duplicate` when a parameter of that name exists.
    pub fn add_context_param(&mut self, name: &str, value: &str) -> Result<Element> {
        if self.find_named("context-param", "param-name", name).is_some() {
            return Err(duplicate("context-param", name));
        }
        self.add_section("context-param", &[("param-name", name), ("param-value", value)])
    }

    /// Add a `<filter>`.
    ///
    /// # Errors
    /// Returns `Duplicate` when a filter of that name exists.
    pub fn add_filter(&mut self, name: &str, class: &str) -> Result<Element> {
        if self.has_filter(name) {
            return Err(duplicate("filter", name));
        }
        self.add_section("filter", &[("filter-name", name), ("filter-class", class)])
    }

    /// Map the filter `name` to a URL pattern.
    ///
    /// # Errors
    /// Returns `Duplicate` when the filter is already mapped to the pattern.
    pub fn add_filter_mapping(&mut self, name: &str, url_pattern: &str) -> Result<Element> {
        if self.filter_url_patterns(name).iter().any(|pattern| pattern == url_pattern) {
            return Err(duplicate("filter-mapping", &format!("{name} {url_pattern}")));
        }
        self.add_section("filter-mapping", &[("filter-name", name), ("url-pattern", url_pattern)])
    }

    /// Add a `<servlet>`.
    ///
    /// # Errors
    /// Returns `Duplicate` when a servlet of that name exists.
    pub fn add_servlet(&mut self, name: &str, class: &str) -> Result<Element> {
        if self.has_servlet(name) {
            return Err(duplicate("servlet", name));
        }
        self.add_section("servlet", &[("servlet-name", name), ("servlet-class", class)])
    }

    /// Map the servlet `name` to a URL pattern.
    ///
    /// # Errors
    /// Returns `Duplicate` when any servlet is already mapped to the pattern.
    pub fn add_servlet_mapping(&mut self, name: &str, url_pattern: &str) -> Result<Element> {
        let taken = self
            .servlet_mappings()
            .into_iter()
            .any(|mapping| self.texts(mapping, "url-pattern").iter().any(|p| p == url_pattern));
        if taken {
            return Err(duplicate("servlet-mapping", url_pattern));
        }
        self.add_section("servlet-mapping", &[("servlet-name", name), ("url-pattern", url_pattern)])
    }

    /// Add a `<listener>`.
    ///
    /// # Errors
    /// Returns `Duplicate` when the listener class is already registered.
    pub fn add_listener(&mut self, class: &str) -> Result<Element> {
        if self.listener_classes().iter().any(|existing| existing == class) {
            return Err(duplicate("listener", class));
        }
        self.add_section("listener", &[("listener-class", class)])
    }

    /// Add an `<init-param>` to a filter or servlet.
    ///
    /// # Errors
    /// Returns `Duplicate` when the parent already has a parameter of that name.
    pub fn add_init_param(&mut self, parent: Element, name: &str, value: &str) -> Result<Element> {
        let exists = self
            .descriptor
            .document()
            .children(parent, "init-param")
            .any(|param| self.child_text(param, "param-name").as_deref() == Some(name));
        if exists {
            return Err(duplicate("init-param", name));
        }
        let param = self.build("init-param", parent, &[("param-name", name), ("param-value", value)])?;
        self.descriptor.insert_child(parent, param)?;
        Ok(param)
    }

    fn add_section(&mut self, tag: &str, fields: &[(&str, &str)]) -> Result<Element> {
        let root = self.descriptor.root();
        let element = self.build(tag, root, fields)?;
        self.descriptor.insert_top_level(element)?;
        Ok(element)
    }

    /// Create a detached `<tag>` holding one text child per field.
    fn build(&mut self, tag: &str, scope: Element, fields: &[(&str, &str)]) -> Result<Element> {
        self.descriptor.tag_for(tag)?;
        let doc = self.descriptor.document_mut();
        let element = doc.create_element_like(scope, tag);
        for (field, value) in fields {
            let child = doc.create_element_like(scope, field);
            doc.set_text(child, *value);
            doc.append_child(element, child)?;
        }
        Ok(element)
    }
}

impl Default for WebXml {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate(tag: &str, name: &str) -> DescriptorError {
    DescriptorError::Duplicate {
        tag: tag.to_string(),
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee" version="2.5">
  <context-param>
    <param-name>env</param-name>
    <param-value> prod </param-value>
  </context-param>
  <filter>
    <filter-name>LogFilter</filter-name>
    <filter-class>com.example.LogFilter</filter-class>
  </filter>
  <filter-mapping>
    <filter-name>LogFilter</filter-name>
    <url-pattern>/a/*</url-pattern>
    <url-pattern>/b/*</url-pattern>
  </filter-mapping>
  <listener>
    <listener-class>com.example.Startup</listener-class>
  </listener>
  <servlet>
    <servlet-name>app</servlet-name>
    <servlet-class>com.example.App</servlet-class>
    <init-param>
      <param-name>mode</param-name>
      <param-value>fast</param-value>
    </init-param>
  </servlet>
  <servlet-mapping>
    <servlet-name>app</servlet-name>
    <url-pattern>/app/*</url-pattern>
  </servlet-mapping>
</web-app>"#;

    #[test]
    fn test_queries() {
        let web = WebXml::parse(SAMPLE).unwrap();

        assert_eq!(web.version(), Some(WebAppVersion::V2_5));
        assert_eq!(web.filter_names(), vec!["LogFilter"]);
        assert_eq!(web.servlet_names(), vec!["app"]);
        assert_eq!(web.filter_url_patterns("LogFilter"), vec!["/a/*", "/b/*"]);
        assert_eq!(web.servlet_url_patterns("app"), vec!["/app/*"]);
        assert_eq!(web.context_param("env").as_deref(), Some("prod"));
        assert_eq!(web.context_param("missing"), None);
        assert_eq!(
            web.servlet_init_params("app"),
            vec![InitParam {
                name: "mode".to_string(),
                value: "fast".to_string()
            }]
        );
        assert_eq!(web.listener_classes(), vec!["com.example.Startup"]);
        assert!(web.has_filter("LogFilter"));
        assert!(!web.has_servlet("other"));
        assert!(web.resource_refs().is_empty());
    }

    #[test]
    fn test_builders_keep_section_order() {
        let mut web = WebXml::new();
        web.add_servlet("app", "com.example.App").unwrap();
        web.add_filter("Log", "com.example.Log").unwrap();
        web.add_context_param("env", "dev").unwrap();
        web.add_filter_mapping("Log", "/*").unwrap();

        let doc = web.descriptor().document();
        let names: Vec<_> = doc
            .element_children(doc.root_element())
            .map(|child| doc.tag_name(child).to_string())
            .collect();
        assert_eq!(names, vec!["context-param", "filter", "filter-mapping", "servlet"]);
    }

    #[test]
    fn test_builders_reject_duplicates() {
        let mut web = WebXml::parse(SAMPLE).unwrap();

        assert!(matches!(
            web.add_filter("LogFilter", "x"),
            Err(DescriptorError::Duplicate { ref tag, .. }) if tag == "filter"
        ));
        assert!(web.add_servlet_mapping("other", "/app/*").is_err());
        assert!(web.add_context_param("env", "dev").is_err());
        assert!(web.add_listener("com.example.Startup").is_err());
        assert!(web.add_filter_mapping("LogFilter", "/c/*").is_ok());
    }

    #[test]
    fn test_builders_use_document_namespace() {
        let mut web = WebXml::parse(SAMPLE).unwrap();
        web.add_servlet("second", "com.example.Second").unwrap();

        assert_eq!(web.servlet_names(), vec!["app", "second"]);
    }

    #[test]
    fn test_add_init_param_respects_child_order() {
        let mut web = WebXml::new();
        let servlet = web.add_servlet("app", "com.example.App").unwrap();
        let doc = web.descriptor_mut().document_mut();
        let startup = doc.create_element_like(servlet, "load-on-startup");
        doc.set_text(startup, "1");
        doc.append_child(servlet, startup).unwrap();

        web.add_init_param(servlet, "mode", "fast").unwrap();
        assert!(web.add_init_param(servlet, "mode", "slow").is_err());

        let doc = web.descriptor().document();
        let names: Vec<_> = doc
            .element_children(servlet)
            .map(|child| doc.tag_name(child).to_string())
            .collect();
        assert_eq!(
            names,
            vec!["servlet-name", "servlet-class", "init-param", "load-on-startup"]
        );
    }

    #[test]
    fn test_from_descriptor_rejects_other_dialects() {
        let context = Descriptor::new(Arc::new(crate::registry::create_tomcat_context_dialect()));
        assert!(matches!(
            WebXml::from_descriptor(context),
            Err(DescriptorError::DialectMismatch { .. })
        ));
    }
}
