//! Servlet specification version of a `web.xml`.

use std::fmt;
use std::str::FromStr;

use crate::xml::Document;

/// Servlet specification version a `web.xml` is written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WebAppVersion {
    V2_2,
    V2_3,
    V2_4,
    V2_5,
    V3_0,
    V3_1,
    V4_0,
    V5_0,
    V6_0,
}

impl WebAppVersion {
    /// All known versions, oldest first.
    pub const ALL: [Self; 9] = [
        Self::V2_2,
        Self::V2_3,
        Self::V2_4,
        Self::V2_5,
        Self::V3_0,
        Self::V3_1,
        Self::V4_0,
        Self::V5_0,
        Self::V6_0,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2_2 => "2.2",
            Self::V2_3 => "2.3",
            Self::V2_4 => "2.4",
            Self::V2_5 => "2.5",
            Self::V3_0 => "3.0",
            Self::V3_1 => "3.1",
            Self::V4_0 => "4.0",
            Self::V5_0 => "5.0",
            Self::V6_0 => "6.0",
        }
    }

    /// Namespace used by descriptors of this version; DTD-based versions have none.
    #[must_use]
    pub fn namespace(self) -> Option<&'static str> {
        use crate::registry::dialects::{
            J2EE_NAMESPACE, JAKARTAEE_NAMESPACE, JAVAEE_NAMESPACE, JCP_NAMESPACE,
        };
        match self {
            Self::V2_2 | Self::V2_3 => None,
            Self::V2_4 => Some(J2EE_NAMESPACE),
            Self::V2_5 | Self::V3_0 => Some(JAVAEE_NAMESPACE),
            Self::V3_1 | Self::V4_0 => Some(JCP_NAMESPACE),
            Self::V5_0 | Self::V6_0 => Some(JAKARTAEE_NAMESPACE),
        }
    }

    /// Detect the version from the root's `version` attribute, falling back
    /// to the public id of the DOCTYPE for DTD-based descriptors.
    #[must_use]
    pub fn detect(document: &Document) -> Option<Self> {
        let root = document.root_element();
        if let Some(version) = document.attribute(root, "version") {
            return version.parse().ok();
        }
        let doctype = document.doctype()?;
        if doctype.contains("Web Application 2.2") {
            Some(Self::V2_2)
        } else if doctype.contains("Web Application 2.3") {
            Some(Self::V2_3)
        } else {
            None
        }
    }
}

impl fmt::Display for WebAppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebAppVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|version| version.as_str() == wanted)
            .ok_or_else(|| format!("unknown web-app version '{wanted}'"))
    }
}
