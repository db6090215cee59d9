//! Per-attribute-type dispatch for standalone attributes (§4.3.2):
//! every case below is a contract reproduced exactly — the log sources
//! and field names are fixed, not inferred.

use sigmai_core::misp::attribute_type as t;
use sigmai_core::sigma::{Category, Field, LogSource, Product, Search, Searches, SearchMap};

use super::{split_last, LogSourceMapping, Mapping};

pub(super) fn search_one(field: Field, value: impl Into<String>) -> Search {
    let mut search = Search::new();
    search.insert(field, sigmai_core::sigma::Keywords::one(value));
    search
}

pub(super) fn search_pair(a: (Field, String), b: (Field, String)) -> Search {
    let mut search = Search::new();
    search.insert(a.0, sigmai_core::sigma::Keywords::one(a.1));
    search.insert(b.0, sigmai_core::sigma::Keywords::one(b.1));
    search
}

pub(super) fn role(name: &str, alternatives: Vec<Search>) -> SearchMap {
    let mut map = SearchMap::new();
    map.insert(name.to_string(), Searches(alternatives));
    map
}

pub(super) fn proxy_and_webserver(selections: SearchMap) -> LogSourceMapping {
    let mut out = LogSourceMapping::new();
    out.insert(LogSource::category(Category::PROXY), Mapping::selections_only(selections.clone()));
    out.insert(LogSource::category(Category::WEBSERVER), Mapping::selections_only(selections));
    out
}

pub(super) fn domain_selection(value: &str) -> Vec<Search> {
    vec![
        search_one(Field::new(Field::C_URI).contains(), value),
        search_one(Field::new(Field::CS_REFERRER).contains(), value),
        search_one(Field::new(Field::R_DNS).contains(), value),
    ]
}

pub(super) fn hostname_selection(value: &str) -> Vec<Search> {
    vec![
        search_one(Field::new(Field::C_URI).contains(), value),
        search_one(Field::new(Field::CS_REFERRER).contains(), value),
        search_one(Field::new(Field::R_DNS).contains(), value),
        search_one(Field::new(Field::CS_HOST).contains(), value),
    ]
}

pub(super) fn hostname_windows_selection(value: &str) -> Vec<Search> {
    vec![
        search_one(Field::new(Field::DESTINATION_HOSTNAME), value),
        search_one(Field::new(Field::SOURCE_HOSTNAME), value),
        search_one(Field::new(Field::COMPUTER), value),
        search_one(Field::new(Field::COMPUTER_NAME), value),
        search_one(Field::new(Field::WORKSTATION), value),
        search_one(Field::new(Field::WORKSTATION_NAME), value),
    ]
}

pub(super) fn filename_selection(value: &str) -> Vec<Search> {
    vec![
        search_one(Field::new(Field::IMAGE).ends_with(), value),
        search_one(Field::new(Field::PARENT_IMAGE).ends_with(), value),
        search_one(Field::new(Field::COMMAND_LINE).contains(), value),
        search_one(Field::new(Field::PARENT_COMMAND_LINE).contains(), value),
        search_one(Field::new(Field::PROCESS_NAME), value),
        search_one(Field::new(Field::PARENT_PROCESS_NAME), value),
    ]
}

pub(super) fn filename_contains_selection(value: &str) -> Vec<Search> {
    vec![
        search_one(Field::new(Field::IMAGE).ends_with(), value),
        search_one(Field::new(Field::PARENT_IMAGE).contains(), value),
        search_one(Field::new(Field::COMMAND_LINE).contains(), value),
        search_one(Field::new(Field::PARENT_COMMAND_LINE).contains(), value),
        search_one(Field::new(Field::PROCESS_NAME).contains(), value),
        search_one(Field::new(Field::PARENT_PROCESS_NAME).contains(), value),
    ]
}

/// Dispatches a standalone attribute's `(type, value)` pair to the
/// log sources and field mappings it contributes to. Returns an empty
/// map for unhandled types — callers are expected to log those.
pub fn convert(attribute_type: &str, value: &str) -> LogSourceMapping {
    match attribute_type {
        t::DOMAIN => proxy_and_webserver(role("Domain", domain_selection(value))),
        t::DOMAIN_IP => {
            let (domain, ip) = split_last(value);
            let mut selections = role("Domain", domain_selection(&domain));
            selections.insert(
                "IP".to_string(),
                Searches(vec![
                    search_one(Field::new(Field::SRC_IP), ip.clone()),
                    search_one(Field::new(Field::DST_IP), ip.clone()),
                    search_one(Field::new(Field::SOURCE_IP), ip.clone()),
                    search_one(Field::new(Field::DESTINATION_IP), ip),
                ]),
            );
            proxy_and_webserver(selections)
        }
        t::FILENAME => {
            let mut out = LogSourceMapping::new();
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::selections_only(role("Filename", filename_selection(value))),
            );
            out
        }
        t::FILENAME_IMPHASH
        | t::FILENAME_MD5
        | t::FILENAME_SHA1
        | t::FILENAME_SHA256
        | t::FILENAME_SHA384
        | t::FILENAME_SHA512
        | t::FILENAME_SSDEEP => {
            let (filename, hash) = split_last(value);
            let mapping = Mapping {
                search: search_one(Field::new(Field::HASHES).contains(), hash),
                selections: role("Filename", filename_contains_selection(&filename)),
            };
            let mut out = LogSourceMapping::new();
            let mut source = LogSource::category(Category::PROCESS_CREATION);
            source.product = Some(Product::from(Product::WINDOWS));
            out.insert(source, mapping);
            out
        }
        t::HOSTNAME => {
            let mut out = proxy_and_webserver(role("Hostname", hostname_selection(value)));
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::selections_only(role("Hostname", hostname_windows_selection(value))),
            );
            out
        }
        t::HOSTNAME_PORT => {
            let (host, _port) = split_last(value);
            let mut out = proxy_and_webserver(role("Hostname", hostname_selection(&host)));
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::selections_only(role("Hostname", hostname_windows_selection(&host))),
            );
            out
        }
        t::IP_DST => {
            let mut out = LogSourceMapping::new();
            out.insert(
                LogSource::category(Category::FIREWALL),
                Mapping::search_only(search_one(Field::new(Field::DST_IP), value)),
            );
            out.insert(
                LogSource::category(Category::PROXY),
                Mapping::search_only(search_one(Field::new(Field::DST_IP), value)),
            );
            out.insert(
                LogSource::category(Category::WEBSERVER),
                Mapping::search_only(search_one(Field::new(Field::DST_IP), value)),
            );
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::search_only(search_one(Field::new(Field::DESTINATION_IP), value)),
            );
            out
        }
        t::IP_DST_PORT => {
            let (ip, port) = split_last(value);
            let mut out = LogSourceMapping::new();
            let non_windows = role(
                "IPDstPort",
                vec![search_pair(
                    (Field::new(Field::DST_IP), ip.clone()),
                    (Field::new(Field::DST_PORT), port.clone()),
                )],
            );
            out.insert(LogSource::category(Category::FIREWALL), Mapping::selections_only(non_windows.clone()));
            out.insert(LogSource::category(Category::PROXY), Mapping::selections_only(non_windows.clone()));
            out.insert(LogSource::category(Category::WEBSERVER), Mapping::selections_only(non_windows));
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::selections_only(role(
                    "IPDstPort",
                    vec![search_pair(
                        (Field::new(Field::DESTINATION_IP), ip),
                        (Field::new(Field::DESTINATION_PORT), port),
                    )],
                )),
            );
            out
        }
        t::IP_SRC => {
            let mut out = LogSourceMapping::new();
            out.insert(
                LogSource::category(Category::FIREWALL),
                Mapping::search_only(search_one(Field::new(Field::SRC_IP), value)),
            );
            out.insert(
                LogSource::category(Category::PROXY),
                Mapping::search_only(search_one(Field::new(Field::SRC_IP), value)),
            );
            out.insert(
                LogSource::category(Category::WEBSERVER),
                Mapping::search_only(search_one(Field::new(Field::SRC_IP), value)),
            );
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::search_only(search_one(Field::new(Field::SOURCE_IP), value)),
            );
            out
        }
        t::IP_SRC_PORT => {
            let (ip, port) = split_last(value);
            let mut out = LogSourceMapping::new();
            let non_windows = role(
                "IPSrcPort",
                vec![search_pair(
                    (Field::new(Field::SRC_IP), ip.clone()),
                    (Field::new(Field::SRC_PORT), port.clone()),
                )],
            );
            out.insert(LogSource::category(Category::FIREWALL), Mapping::selections_only(non_windows.clone()));
            out.insert(LogSource::category(Category::PROXY), Mapping::selections_only(non_windows.clone()));
            out.insert(LogSource::category(Category::WEBSERVER), Mapping::selections_only(non_windows));
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::selections_only(role(
                    "IPSrcPort",
                    vec![search_pair(
                        (Field::new(Field::SOURCE_IP), ip),
                        (Field::new(Field::SOURCE_PORT), port),
                    )],
                )),
            );
            out
        }
        t::IMPHASH | t::JA3_FINGERPRINT_MD5 | t::JARM_FINGERPRINT | t::MD5 | t::SHA1 | t::SHA256
        | t::SHA512 | t::SSDEEP => {
            let mut out = LogSourceMapping::new();
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::search_only(search_one(Field::new(Field::HASHES).contains(), value)),
            );
            out
        }
        t::REGKEY => {
            let mut out = LogSourceMapping::new();
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::search_only(search_one(Field::new(Field::TARGET_OBJECT), value)),
            );
            out
        }
        t::REGKEY_VALUE => {
            let (key, val) = split_first(value);
            let mut out = LogSourceMapping::new();
            out.insert(
                LogSource::default().with_product(Product::WINDOWS),
                Mapping::selections_only(role(
                    "RegKeyValue",
                    vec![search_pair(
                        (Field::new(Field::TARGET_OBJECT), key),
                        (Field::new(Field::DESCRIPTION), val),
                    )],
                )),
            );
            out
        }
        t::URI | t::URL => proxy_and_webserver(role(
            "URI",
            vec![
                search_one(Field::new(Field::C_URI), value),
                search_one(Field::new(Field::CS_REFERRER), value),
                search_one(Field::new(Field::R_DNS), value),
            ],
        )),
        _ => LogSourceMapping::new(),
    }
}

fn split_first(value: &str) -> (String, String) {
    super::split_first(value)
}
