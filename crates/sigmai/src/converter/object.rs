//! Per-object-attribute dispatch (§4.3.3): dispatch is keyed on
//! `(object.name, attribute.object_relation)` rather than the
//! attribute's own `type`, since the same MISP type (e.g. a hash) means
//! something different depending on which role it plays inside an
//! object (a file's hash vs. a PE's imphash).
//!
//! Reuses the field-alternative builders from [`super::attribute`] where
//! the role is identical to a standalone attribute's mapping — an
//! object's `file/filename` relation matches the same way a standalone
//! `filename` type would, just scoped to one relation instead of a
//! whole attribute.

use sigmai_core::misp::object_name as obj;
use sigmai_core::sigma::{Category, Field, LogSource, Product, Search};

use super::attribute::{
    domain_selection, filename_selection, hostname_selection, hostname_windows_selection, role,
    search_one, search_pair,
};
use super::{LogSourceMapping, Mapping};

/// `object_relation` values treated as a file/module hash regardless of
/// algorithm, shared by the `file`, `lnk`, `pe-section`, and
/// `elf-section` objects.
const HASH_RELATIONS: &[&str] = &[
    "md5",
    "sha1",
    "sha256",
    "sha512",
    "ssdeep",
    "authentihash",
    "imphash",
    "vhash",
];

fn windows(mapping: Mapping) -> LogSourceMapping {
    let mut out = LogSourceMapping::new();
    out.insert(LogSource::default().with_product(Product::WINDOWS), mapping);
    out
}

fn proxy_and_webserver(mapping: Mapping) -> LogSourceMapping {
    let mut out = LogSourceMapping::new();
    out.insert(LogSource::category(Category::PROXY), mapping.clone());
    out.insert(LogSource::category(Category::WEBSERVER), mapping);
    out
}

/// The two-alternative "could show up as the image name or as the
/// running process name" selection shared by `file/filename`,
/// `pe/{original-filename,internal-filename}`, and `script/filename`.
fn short_filename_selection(value: &str) -> Vec<Search> {
    vec![
        search_one(Field::new(Field::IMAGE).ends_with(), value),
        search_one(Field::new(Field::PROCESS_NAME).contains(), value),
    ]
}

/// Dispatches one object attribute's `(object.name, object_relation,
/// value)` to the log sources and field mappings it contributes to.
/// Returns an empty map for unhandled or no-op combinations.
pub fn convert(object_name: &str, relation: &str, value: &str) -> LogSourceMapping {
    match (object_name, relation) {
        (obj::COMMAND_LINE, "value") => {
            windows(Mapping::search_only(search_one(Field::new(Field::COMMAND_LINE).contains(), value)))
        }

        (obj::DOMAIN_IP, "domain") => proxy_and_webserver(Mapping::selections_only(role(
            "Domain",
            domain_selection(value),
        ))),
        (obj::DOMAIN_IP, "hostname") => {
            let mut out = proxy_and_webserver(Mapping::selections_only(role(
                "Hostname",
                hostname_selection(value),
            )));
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::selections_only(role("Hostname", hostname_windows_selection(value))),
            );
            out
        }
        (obj::DOMAIN_IP, "ip") => {
            let ip_alternatives = role(
                "IP",
                vec![
                    search_one(Field::new(Field::SRC_IP), value),
                    search_one(Field::new(Field::DST_IP), value),
                    search_one(Field::new(Field::SOURCE_IP), value),
                    search_one(Field::new(Field::DESTINATION_IP), value),
                ],
            );
            proxy_and_webserver(Mapping::selections_only(ip_alternatives))
        }
        (obj::DOMAIN_IP, "port") => {
            // Historical quirk: `domain-ip/port` uses the non-windows
            // `dst_port` field name on every log-source, including
            // windows — see DESIGN.md.
            let mut out = LogSourceMapping::new();
            out.insert(
                LogSource::category(Category::PROXY),
                Mapping::search_only(search_one(Field::new(Field::DST_PORT), value)),
            );
            out.insert(
                LogSource::category(Category::WEBSERVER),
                Mapping::search_only(search_one(Field::new(Field::DST_PORT), value)),
            );
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::search_only(search_one(Field::new(Field::DST_PORT), value)),
            );
            out
        }

        (obj::FILE, "filename") => windows(Mapping::selections_only(role(
            "Filename",
            short_filename_selection(value),
        ))),
        (obj::FILE, relation) if HASH_RELATIONS.contains(&relation) => {
            windows(Mapping::search_only(search_one(Field::new(Field::HASHES).contains(), value)))
        }
        (obj::FILE, "malware-sample") => LogSourceMapping::new(),

        (obj::LNK, relation) | (obj::PE_SECTION, relation) | (obj::ELF_SECTION, relation)
            if HASH_RELATIONS.contains(&relation) =>
        {
            windows(Mapping::search_only(search_one(Field::new(Field::HASHES).contains(), value)))
        }

        (obj::PE, "original-filename") | (obj::PE, "internal-filename") => windows(
            Mapping::selections_only(role("Filename", short_filename_selection(value))),
        ),
        (obj::PE, "imphash") | (obj::PE, "impfuzzy") => {
            windows(Mapping::search_only(search_one(Field::new(Field::HASHES).contains(), value)))
        }

        (obj::PROCESS, "image") => {
            windows(Mapping::search_only(search_one(Field::new(Field::IMAGE).ends_with(), value)))
        }
        (obj::PROCESS, "name") => {
            windows(Mapping::search_only(search_one(Field::new(Field::PROCESS_NAME), value)))
        }
        (obj::PROCESS, "parent-image") => windows(Mapping::search_only(search_one(
            Field::new(Field::PARENT_IMAGE).ends_with(),
            value,
        ))),
        (obj::PROCESS, "command-line") => windows(Mapping::search_only(search_one(
            Field::new(Field::COMMAND_LINE).contains(),
            value,
        ))),
        (obj::PROCESS, "parent-process-name") => windows(Mapping::search_only(search_one(
            Field::new(Field::PARENT_PROCESS_NAME),
            value,
        ))),

        (obj::REGISTRY_KEY, "key") => windows(Mapping::selections_only(role(
            "RegistryKey",
            vec![search_one(Field::new(Field::TARGET_OBJECT).ends_with(), value)],
        ))),

        (obj::SCRIPT, "filename") => windows(Mapping::selections_only(role(
            "Filename",
            short_filename_selection(value),
        ))),

        (obj::PHISHING, relation)
        | (obj::URL, relation)
        | (obj::DOMAIN_CRAWLED, relation)
        | (obj::IMAGE, relation)
        | (obj::SHORTENED_LINK, relation)
        | (obj::HTTP_REQUEST, relation)
            if matches!(relation, "url" | "uri" | "shortened-url" | "redirect-url" | "url-redirect") =>
        {
            proxy_and_webserver(Mapping::selections_only(role(
                "URI",
                vec![
                    search_one(Field::new(Field::C_URI), value),
                    search_one(Field::new(Field::CS_REFERRER), value),
                    search_one(Field::new(Field::R_DNS), value),
                ],
            )))
        }
        (obj::HTTP_REQUEST, "method") => {
            proxy_and_webserver(Mapping::search_only(search_one(Field::new(Field::CS_METHOD), value)))
        }

        (obj::EMAIL, _) | (obj::YARA, _) | (obj::SURICATA, _) => LogSourceMapping::new(),

        _ => LogSourceMapping::new(),
    }
}

/// Builds a 2-field atomic pairing, for relations that must co-match
/// within one search (kept for future multi-field object relations;
/// the current table only ever needs one side of the pair at a time).
#[allow(dead_code)]
fn pair(a: (Field, String), b: (Field, String)) -> Search {
    search_pair(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_value_maps_to_windows_contains() {
        let mapping = convert(obj::COMMAND_LINE, "value", "-enc AAAA");
        assert_eq!(mapping.len(), 1);
        let (source, m) = mapping.iter().next().unwrap();
        assert_eq!(source.product, Some(Product::from(Product::WINDOWS)));
        let field = Field::new(Field::COMMAND_LINE).contains();
        assert_eq!(m.search.get(&field).unwrap().0, vec!["-enc AAAA".to_string()]);
    }

    #[test]
    fn domain_ip_port_uses_dst_port_even_on_windows() {
        let mapping = convert(obj::DOMAIN_IP, "port", "443");
        assert_eq!(mapping.len(), 3);
        for (_, m) in mapping.iter() {
            assert!(m.search.contains_key(&Field::new(Field::DST_PORT)));
        }
    }

    #[test]
    fn file_malware_sample_has_no_mapping() {
        assert!(convert(obj::FILE, "malware-sample", "x").is_empty());
    }

    #[test]
    fn process_image_maps_to_windows_image_endswith() {
        let mapping = convert(obj::PROCESS, "image", "C:\\a.exe");
        let (source, m) = mapping.iter().next().unwrap();
        assert_eq!(source.product, Some(Product::from(Product::WINDOWS)));
        let field = Field::new(Field::IMAGE).ends_with();
        assert_eq!(m.search.get(&field).unwrap().0, vec!["C:\\a.exe".to_string()]);
    }

    #[test]
    fn unknown_object_relation_produces_no_mapping() {
        assert!(convert("unknown-object", "whatever", "x").is_empty());
    }

    #[test]
    fn email_object_never_maps() {
        assert!(convert(obj::EMAIL, "src", "a@b.com").is_empty());
    }
}
