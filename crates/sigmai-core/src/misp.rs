//! The MISP data model consumed by the converter: [`Event`], [`Attribute`],
//! [`Object`], and [`Tag`].
//!
//! Field names and JSON renames mirror the MISP REST API's own attribute
//! names (`PascalCase`/`snake_case` mix, `object_id`, `threat_level_id`,
//! ...) so these structs deserialize the API response directly — no
//! separate wire-format layer.

use serde::{Deserialize, Serialize};

/// A MISP event, carrying its own attributes plus any objects (each with
/// their own nested attributes).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Event {
    pub id: String,
    pub uuid: String,
    pub info: String,
    #[serde(rename = "threat_level_id")]
    pub threat_level: ThreatLevel,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(rename = "Orgc")]
    pub orgc: Organisation,
    #[serde(rename = "Attribute", default)]
    pub attribute: Vec<Attribute>,
    #[serde(rename = "Object", default)]
    pub object: Vec<Object>,
    #[serde(rename = "Tag", default)]
    pub tag: Vec<Tag>,
}

/// The organisation that created an event (`Orgc` in the MISP API).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Organisation {
    pub name: String,
}

/// A free-form event tag, optionally hidden from rule output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
}

/// A named grouping of attributes, each attribute's `object_relation`
/// disambiguating its role within the group (e.g. `ip` vs `port` inside
/// an `ip-port` object).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Object {
    pub id: String,
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(rename = "Attribute", default)]
    pub attribute: Vec<Attribute>,
}

/// A single typed indicator, possibly composite (`part1|part2|...`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attribute {
    pub id: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub value: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(rename = "object_relation", default)]
    pub object_relation: Option<String>,
    #[serde(rename = "object_id", default)]
    pub object_id: Option<String>,
    #[serde(rename = "to_ids", default)]
    pub to_ids: bool,
}

impl Attribute {
    /// Splits a composite value (`"part1|part2"`) on its pipe separator.
    /// Simple types return a single-element slice.
    pub fn value_parts(&self) -> Vec<&str> {
        self.value.split('|').collect()
    }
}

/// MISP's 1-4 threat level, where 1 is the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThreatLevel {
    High,
    Medium,
    Low,
    Undefined,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::High => "1",
            ThreatLevel::Medium => "2",
            ThreatLevel::Low => "3",
            ThreatLevel::Undefined => "4",
        }
    }
}

impl<'de> Deserialize<'de> for ThreatLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "1" => Ok(ThreatLevel::High),
            "2" => Ok(ThreatLevel::Medium),
            "3" => Ok(ThreatLevel::Low),
            _ => Ok(ThreatLevel::Undefined),
        }
    }
}

impl Serialize for ThreatLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Well-known MISP attribute `type` values used by the converter's
/// dispatch table. Kept as plain string constants rather than a closed
/// enum since MISP's type taxonomy is community-extended and a
/// converter that only knows a fixed set must still pass unknown types
/// through to the generic fallback case.
pub mod attribute_type {
    pub const DOMAIN: &str = "domain";
    pub const DOMAIN_IP: &str = "domain|ip";
    pub const EMAIL_DST: &str = "email-dst";
    pub const EMAIL_SRC: &str = "email-src";
    pub const FILENAME: &str = "filename";
    pub const FILENAME_IMPHASH: &str = "filename|imphash";
    pub const FILENAME_MD5: &str = "filename|md5";
    pub const FILENAME_SHA1: &str = "filename|sha1";
    pub const FILENAME_SHA256: &str = "filename|sha256";
    pub const FILENAME_SHA384: &str = "filename|sha384";
    pub const FILENAME_SHA512: &str = "filename|sha512";
    pub const FILENAME_SSDEEP: &str = "filename|ssdeep";
    pub const HOSTNAME: &str = "hostname";
    pub const HOSTNAME_PORT: &str = "hostname|port";
    pub const IMPHASH: &str = "imphash";
    pub const IP_DST: &str = "ip-dst";
    pub const IP_DST_PORT: &str = "ip-dst|port";
    pub const IP_SRC: &str = "ip-src";
    pub const IP_SRC_PORT: &str = "ip-src|port";
    pub const JA3_FINGERPRINT_MD5: &str = "ja3-fingerprint-md5";
    pub const JARM_FINGERPRINT: &str = "jarm-fingerprint";
    pub const MD5: &str = "md5";
    pub const MUTEX: &str = "mutex";
    pub const REGKEY: &str = "regkey";
    pub const REGKEY_VALUE: &str = "regkey|value";
    pub const SHA1: &str = "sha1";
    pub const SHA256: &str = "sha256";
    pub const SHA512: &str = "sha512";
    pub const SSDEEP: &str = "ssdeep";
    pub const URI: &str = "uri";
    pub const URL: &str = "url";
}

/// Well-known MISP object `name` values used by the converter's
/// per-relation dispatch table.
pub mod object_name {
    pub const COMMAND_LINE: &str = "command-line";
    pub const DOMAIN_CRAWLED: &str = "domain-crawled";
    pub const DOMAIN_IP: &str = "domain-ip";
    pub const ELF_SECTION: &str = "elf-section";
    pub const EMAIL: &str = "email";
    pub const FILE: &str = "file";
    pub const HTTP_REQUEST: &str = "http-request";
    pub const IMAGE: &str = "image";
    pub const LNK: &str = "lnk";
    pub const PE: &str = "pe";
    pub const PE_SECTION: &str = "pe-section";
    pub const PHISHING: &str = "phishing";
    pub const PROCESS: &str = "process";
    pub const REGISTRY_KEY: &str = "registry-key";
    pub const SCRIPT: &str = "script";
    pub const SHORTENED_LINK: &str = "shortened-link";
    pub const SURICATA: &str = "suricata";
    pub const URL: &str = "url";
    pub const YARA: &str = "yara";
}
