//! The Sigma rule data model: [`Rule`], its [`Detection`], [`LogSource`],
//! and the [`Search`]/[`Searches`] maps that back a detection's named
//! selections.
//!
//! Serialization mirrors Sigma's own conventions rather than a literal
//! struct dump: a [`Searches`] list with a single element collapses to
//! that element, a [`Keywords`] list with a single value collapses to
//! that value, and empty optional fields are omitted entirely.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// A Sigma field name, optionally suffixed with a value-transform
/// modifier (`|contains`, `|endswith`, ...). Modifier methods consume
/// `self` and return the suffixed field, mirroring how Sigma itself
/// treats `field|modifier` as a single compound key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Field(pub String);

impl Field {
    pub const COMMAND_LINE: &'static str = "CommandLine";
    pub const CS_HOST: &'static str = "cs-host";
    pub const CS_METHOD: &'static str = "cs-method";
    pub const CS_REFERRER: &'static str = "cs-referrer";
    pub const COMPUTER: &'static str = "Computer";
    pub const COMPUTER_NAME: &'static str = "ComputerName";
    pub const C_URI: &'static str = "c-uri";
    pub const DESCRIPTION: &'static str = "Description";
    pub const DESTINATION_HOSTNAME: &'static str = "DestinationHostname";
    pub const DESTINATION_IP: &'static str = "DestinationIp";
    pub const DESTINATION_PORT: &'static str = "DestinationPort";
    pub const DST_IP: &'static str = "dst_ip";
    pub const DST_PORT: &'static str = "dst_port";
    pub const HASHES: &'static str = "Hashes";
    pub const IMAGE: &'static str = "Image";
    pub const MACHINE_NAME: &'static str = "MachineName";
    pub const PARENT_COMMAND_LINE: &'static str = "ParentCommandLine";
    pub const PARENT_PROCESS_NAME: &'static str = "ParentProcessName";
    pub const PARENT_IMAGE: &'static str = "ParentImage";
    pub const PROCESS_NAME: &'static str = "ProcessName";
    pub const R_DNS: &'static str = "r-dns";
    pub const SOURCE_HOSTNAME: &'static str = "SourceHostname";
    pub const SOURCE_IP: &'static str = "SourceIp";
    pub const SOURCE_PORT: &'static str = "SourcePort";
    pub const SRC_IP: &'static str = "src_ip";
    pub const SRC_PORT: &'static str = "src_port";
    pub const TARGET_OBJECT: &'static str = "TargetObject";
    pub const WORKSTATION: &'static str = "Workstation";
    pub const WORKSTATION_NAME: &'static str = "WorkstationName";

    pub fn new(name: impl Into<String>) -> Self {
        Field(name.into())
    }

    pub fn contains(self) -> Self {
        Field(format!("{}|contains", self.0))
    }

    pub fn all(self) -> Self {
        Field(format!("{}|all", self.0))
    }

    pub fn base64(self) -> Self {
        Field(format!("{}base64", self.0))
    }

    pub fn base64_offset(self) -> Self {
        Field(format!("{}base64offset", self.0))
    }

    pub fn ends_with(self) -> Self {
        Field(format!("{}|endswith", self.0))
    }

    pub fn starts_with(self) -> Self {
        Field(format!("{}|startswith", self.0))
    }

    pub fn utf16le(self) -> Self {
        Field(format!("{}|utf16le", self.0))
    }

    pub fn utf16be(self) -> Self {
        Field(format!("{}|utf16be", self.0))
    }

    pub fn wide(self) -> Self {
        Field(format!("{}|wide", self.0))
    }

    pub fn utf16(self) -> Self {
        Field(format!("{}|utf16", self.0))
    }

    pub fn re(self) -> Self {
        Field(format!("{}re", self.0))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::new(value)
    }
}

/// A single field-to-values search clause. All entries are ANDed
/// together when the search is evaluated.
pub type Search = IndexMap<Field, Keywords>;

/// A list of [`Search`] alternatives, ORed together. Serializes as the
/// bare element when it holds exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Searches(pub Vec<Search>);

impl Searches {
    pub fn new() -> Self {
        Searches(Vec::new())
    }

    pub fn push(&mut self, search: Search) {
        self.0.push(search);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Searches {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.0.len() == 1 {
            self.0[0].serialize(serializer)
        } else {
            self.0.serialize(serializer)
        }
    }
}

/// A list of matched values for a single field. Serializes as the bare
/// value when it holds exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(pub Vec<String>);

impl Keywords {
    pub fn one(value: impl Into<String>) -> Self {
        Keywords(vec![value.into()])
    }
}

impl Serialize for Keywords {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.0.len() == 1 {
            self.0[0].serialize(serializer)
        } else {
            self.0.serialize(serializer)
        }
    }
}

/// Named selections making up a detection, each a list of [`Searches`]
/// alternatives. Shared by [`Detection::searches`] and by the
/// accumulators the converter builds per log source before it freezes
/// them into a detection.
pub type SearchMap = IndexMap<String, Searches>;

/// A rule's detection block: its named searches plus the condition that
/// combines them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Detection {
    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty")]
    pub searches: SearchMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Detection {
    pub fn new() -> Self {
        Detection::default()
    }
}

/// A Sigma `logsource` block. Every field is optional: a rule may match
/// a category, a product, a service, or a free-text definition in any
/// combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl LogSource {
    pub fn category(category: impl Into<Category>) -> Self {
        LogSource {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn with_product(mut self, product: impl Into<Product>) -> Self {
        self.product = Some(product.into());
        self
    }
}

/// A Sigma log source category. The list mirrors Sigma's well-known
/// categories; unlisted values are carried verbatim since the taxonomy
/// keeps growing upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub const PROCESS_CREATION: &'static str = "process_creation";
    pub const PROXY: &'static str = "proxy";
    pub const FIREWALL: &'static str = "firewall";
    pub const DNS: &'static str = "dns";
    pub const WEBSERVER: &'static str = "webserver";
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category(value.to_string())
    }
}

/// A Sigma log source product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(pub String);

impl Product {
    pub const WINDOWS: &'static str = "windows";
    pub const LINUX: &'static str = "linux";
    pub const APACHE: &'static str = "apache";
}

impl From<&str> for Product {
    fn from(value: &str) -> Self {
        Product(value.to_string())
    }
}

/// A Sigma log source service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Service(pub String);

impl Service {
    pub const SECURITY: &'static str = "security";
    pub const SYSTEM: &'static str = "system";
    pub const SYSMON: &'static str = "sysmon";
    pub const TASK_SCHEDULER: &'static str = "taskscheduler";
    pub const WMI: &'static str = "wmi";
    pub const APPLICATION: &'static str = "application";
    pub const DNS_SERVER: &'static str = "dns-server";
    pub const DRIVER_FRAMEWORK: &'static str = "driver-framework";
    pub const POWERSHELL: &'static str = "powershell";
    pub const POWERSHELL_CLASSIC: &'static str = "powershell-classic";
    pub const AUTH: &'static str = "auth";
    pub const AUDITD: &'static str = "auditd";
    pub const CLAMAV: &'static str = "clamav";
    pub const ACCESS: &'static str = "access";
    pub const ERROR: &'static str = "error";
}

impl From<&str> for Service {
    fn from(value: &str) -> Self {
        Service(value.to_string())
    }
}

/// A named relationship to another rule (`related:`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub relation: Relation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Derived,
    Obsoletes,
    Merged,
    Renamed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Global,
    Repeat,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Experimental,
    Testing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
    Critical,
}

/// A complete Sigma detection rule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<Relationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(rename = "logsource")]
    pub log_source: LogSource,
    pub detection: Detection,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(rename = "falsepositives", skip_serializing_if = "Vec::is_empty")]
    pub false_positives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Rule {
    pub fn new(log_source: LogSource) -> Self {
        Rule {
            log_source,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_modifier_methods_suffix_in_order() {
        let field = Field::new(Field::COMMAND_LINE).contains();
        assert_eq!(field.0, "CommandLine|contains");
    }

    #[test]
    fn searches_collapses_single_element() {
        let mut search = Search::new();
        search.insert(Field::new(Field::IMAGE), Keywords::one("cmd.exe"));
        let searches = Searches(vec![search]);
        let yaml = serde_yaml::to_string(&searches).unwrap();
        assert_eq!(yaml, "Image: cmd.exe\n");
    }

    #[test]
    fn searches_keeps_list_form_with_multiple_elements() {
        let mut a = Search::new();
        a.insert(Field::new(Field::IMAGE), Keywords::one("cmd.exe"));
        let mut b = Search::new();
        b.insert(Field::new(Field::IMAGE), Keywords::one("powershell.exe"));
        let searches = Searches(vec![a, b]);
        let yaml = serde_yaml::to_string(&searches).unwrap();
        assert!(yaml.starts_with("- Image:"));
    }

    #[test]
    fn detection_omits_empty_timeframe_and_condition() {
        let detection = Detection::new();
        let yaml = serde_yaml::to_string(&detection).unwrap();
        assert_eq!(yaml, "{}\n");
    }

    #[test]
    fn rule_serializes_logsource_and_detection_unconditionally() {
        let rule = Rule::new(LogSource::category(Category::PROXY));
        let yaml = serde_yaml::to_string(&rule).unwrap();
        assert!(yaml.contains("logsource:"));
        assert!(yaml.contains("category: proxy"));
        assert!(yaml.contains("detection:"));
        assert!(!yaml.contains("title:"));
    }
}
