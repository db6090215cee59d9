//! Fragment composition (§4.3.4–4.3.5) and rule assembly (§4.3.1): turns
//! the per-attribute/per-object mappings produced by [`super::attribute`]
//! and [`super::object`] into the ordered list of Sigma rules a single
//! event emits.
//!
//! This implements the "per-attribute-detection" variant the
//! specification normatively picks: every attribute or object that
//! contributes named selections gets its own detection (and therefore
//! its own rule), rather than folding every indicator of a log-source
//! into one shared condition. Only attributes that contribute nothing
//! but a flat field search are merged together, and only at the very
//! end, into a single flushed detection — see DESIGN.md for why this
//! departs from the flattened single-detection form still present in
//! some MISP→Sigma converters.

use indexmap::IndexMap;

use sigmai_core::condition::Condition;
use sigmai_core::misp::Event;
use sigmai_core::sigma::{
    Action, Detection, Level, LogSource, Rule, Search, SearchMap, Searches, Status,
};

use super::{attribute, object, Mapping};

/// Accumulated state for one log-source within a single event: the
/// merged flat search shared by every standalone attribute that had no
/// selections of its own, plus the independent detections built so far
/// (one per selection-bearing attribute, one per object).
#[derive(Default)]
struct EventScope {
    flat_search: Search,
    detections: Vec<Detection>,
}

/// Accumulated state for one log-source within a single object: unlike
/// [`EventScope`], every attribute's contribution is ANDed into a
/// single detection since all of an object's attributes describe the
/// same real-world occurrence.
#[derive(Default)]
struct ObjectAccumulator {
    search: Search,
    has_search: bool,
    searches: SearchMap,
    condition: Option<Condition>,
}

fn and_onto(existing: Option<Condition>, next: Condition) -> Condition {
    match existing {
        Some(cond) => cond.and(next),
        None => next,
    }
}

fn merge_search(into: &mut Search, from: Search) {
    for (field, keywords) in from {
        into.entry(field).or_default().0.extend(keywords.0);
    }
}

/// Translates one enriched MISP event into the list of Sigma rules
/// representing its detections. Returns an empty list if the event is
/// deleted or contributes no non-deleted attribute/object mapping.
pub fn convert(event: &Event) -> Vec<Rule> {
    if event.deleted {
        return Vec::new();
    }

    let mut scopes: IndexMap<LogSource, EventScope> = IndexMap::new();

    for a in event.attribute.iter().filter(|a| !a.deleted) {
        let ai = format!("event{}attr{}", event.id, a.id);
        let mapping = attribute::convert(&a.attribute_type, &a.value);
        if mapping.is_empty() {
            tracing::warn!(attribute = %a.id, event = %event.id, r#type = %a.attribute_type, "unhandled attribute type");
            continue;
        }
        for (log_source, m) in mapping {
            apply_standalone(scopes.entry(log_source).or_default(), &ai, m);
        }
    }

    for o in event.object.iter().filter(|o| !o.deleted) {
        let oi = format!("event{}object{}", event.id, o.id);
        let mut accumulators: IndexMap<LogSource, ObjectAccumulator> = IndexMap::new();
        for a in o.attribute.iter().filter(|a| !a.deleted) {
            let ai = format!("{oi}attr{}", a.id);
            let relation = a.object_relation.as_deref().unwrap_or("");
            let mapping = object::convert(&o.name, relation, &a.value);
            if mapping.is_empty() {
                tracing::warn!(
                    attribute = %a.id,
                    object = %o.id,
                    relation = %relation,
                    "unhandled object relation",
                );
                continue;
            }
            for (log_source, m) in mapping {
                apply_object_attribute(accumulators.entry(log_source).or_default(), &ai, m);
            }
        }
        for (log_source, mut acc) in accumulators {
            let mut searches = acc.searches;
            let mut condition = acc.condition.take();
            if acc.has_search {
                searches.insert(oi.clone(), Searches(vec![acc.search]));
                condition = Some(and_onto(condition, Condition::identifier(oi.clone())));
            }
            let detection = Detection {
                searches,
                timeframe: None,
                condition,
            };
            scopes.entry(log_source).or_default().detections.push(detection);
        }
    }

    if scopes.is_empty() {
        return Vec::new();
    }

    let mut rules = vec![global_rule(event)];
    let ei = format!("event{}", event.id);
    for (log_source, scope) in scopes {
        let mut detections = scope.detections;
        if !scope.flat_search.is_empty() {
            let mut searches = SearchMap::new();
            searches.insert(ei.clone(), Searches(vec![scope.flat_search]));
            detections.push(Detection {
                searches,
                timeframe: None,
                condition: Some(Condition::identifier(ei.clone())),
            });
        }
        for detection in detections {
            rules.push(Rule {
                log_source: log_source.clone(),
                detection,
                ..Default::default()
            });
        }
    }
    rules
}

/// Applies one standalone attribute's mapping to the event-wide scope
/// for its log-source, per §4.3.4: selection-bearing mappings become
/// their own detection; pure-search mappings merge into the scope's
/// flat search, flushed once at the very end.
fn apply_standalone(scope: &mut EventScope, ai: &str, mapping: Mapping) {
    if !mapping.selections.is_empty() {
        let mut searches = SearchMap::new();
        for (role, alternatives) in mapping.selections {
            searches.insert(format!("{ai}mapping{role}"), alternatives);
        }
        let mut condition = Condition::all_of_pattern(format!("{ai}mapping*"));
        if !mapping.search.is_empty() {
            searches.insert(ai.to_string(), Searches(vec![mapping.search]));
            condition = Condition::identifier(ai.to_string()).and(condition);
        }
        scope.detections.push(Detection {
            searches,
            timeframe: None,
            condition: Some(condition),
        });
    } else if !mapping.search.is_empty() {
        merge_search(&mut scope.flat_search, mapping.search);
    }
}

/// Applies one object attribute's mapping to the per-object,
/// per-log-source accumulator, per §4.3.4: every contribution ANDs
/// onto the object's single detection for that log-source.
fn apply_object_attribute(acc: &mut ObjectAccumulator, ai: &str, mapping: Mapping) {
    if !mapping.search.is_empty() {
        acc.has_search = true;
        merge_search(&mut acc.search, mapping.search);
    }
    if !mapping.selections.is_empty() {
        for (role, alternatives) in mapping.selections {
            acc.searches.insert(format!("{ai}mapping{role}"), alternatives);
        }
        let next = Condition::all_of_pattern(format!("{ai}mapping*"));
        acc.condition = Some(and_onto(acc.condition.take(), next));
    }
}

/// Builds the event's leading `action: global` metadata rule (§4.3.1).
fn global_rule(event: &Event) -> Rule {
    let level = match event.threat_level {
        sigmai_core::misp::ThreatLevel::High => Level::High,
        sigmai_core::misp::ThreatLevel::Medium => Level::Medium,
        _ => Level::Low,
    };
    let tags = event
        .tag
        .iter()
        .filter(|t| !t.hidden)
        .map(|t| t.name.clone())
        .collect();
    Rule {
        action: Some(Action::Global),
        title: Some(event.info.clone()),
        id: Some(event.uuid.clone()),
        status: Some(Status::Experimental),
        description: Some(format!("See MISP event {}", event.id)),
        author: Some(event.orgc.name.clone()),
        level: Some(level),
        tags,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigmai_core::misp::{Attribute, Object, Organisation, ThreatLevel};
    use sigmai_core::sigma::{Category, Field, Product};

    fn base_event() -> Event {
        Event {
            id: "7".into(),
            uuid: "u7".into(),
            info: "t".into(),
            threat_level: ThreatLevel::Low,
            published: false,
            deleted: false,
            orgc: Organisation { name: "o".into() },
            attribute: Vec::new(),
            object: Vec::new(),
            tag: Vec::new(),
        }
    }

    fn attr(id: &str, r#type: &str, value: &str) -> Attribute {
        Attribute {
            id: id.into(),
            uuid: format!("u{id}"),
            attribute_type: r#type.into(),
            value: value.into(),
            deleted: false,
            object_relation: None,
            object_id: None,
            to_ids: false,
        }
    }

    #[test]
    fn s1_minimal_event_converts_to_nothing() {
        let event = base_event();
        assert!(convert(&event).is_empty());
    }

    #[test]
    fn s2_standalone_hash_yields_global_plus_one_windows_rule() {
        let mut event = base_event();
        event.threat_level = ThreatLevel::Low;
        event.attribute.push(attr("1", "md5", "abc"));
        let rules = convert(&event);
        // global + one windows-product detection rule
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].action, Some(Action::Global));
        assert_eq!(rules[0].id.as_deref(), Some("u7"));
        assert_eq!(rules[1].log_source, LogSource::default().with_product(Product::WINDOWS));
        let detection = &rules[1].detection;
        assert_eq!(detection.condition, Some(Condition::identifier("event7")));
        let search = &detection.searches["event7"];
        assert_eq!(search.0.len(), 1);
        let field = Field::new(Field::HASHES).contains();
        assert_eq!(search.0[0].get(&field).unwrap().0, vec!["abc".to_string()]);
    }

    #[test]
    fn s3_composite_ip_port_is_atomic_selection() {
        let mut event = base_event();
        event.attribute.push(attr("2", "ip-dst|port", "10.0.0.1|443"));
        let rules = convert(&event);
        // global + one detection rule per log-source (firewall, proxy, webserver, windows)
        assert_eq!(rules.len(), 1 + 4);
        let windows_detection = rules
            .iter()
            .find(|r| {
                r.log_source == LogSource::default().with_product(Product::WINDOWS)
                    && !r.detection.searches.is_empty()
            })
            .unwrap();
        assert_eq!(
            windows_detection.detection.condition,
            Some(Condition::all_of_pattern("event7attr2mapping*"))
        );
        let key = "event7attr2mappingIPDstPort";
        let searches = &windows_detection.detection.searches[key];
        assert_eq!(searches.0.len(), 1);
        assert_eq!(
            searches.0[0].get(&Field::new(Field::DESTINATION_IP)).unwrap().0,
            vec!["10.0.0.1".to_string()]
        );
        assert_eq!(
            searches.0[0].get(&Field::new(Field::DESTINATION_PORT)).unwrap().0,
            vec!["443".to_string()]
        );
    }

    #[test]
    fn s4_mixed_hash_and_filename_ands_search_with_selections() {
        let mut event = base_event();
        event.attribute.push(attr("3", "filename|md5", "x.exe|abc"));
        let rules = convert(&event);
        assert_eq!(rules.len(), 1 + 1);
        let detection = &rules[1].detection;
        assert_eq!(
            detection.condition,
            Some(
                Condition::identifier("event7attr3")
                    .and(Condition::all_of_pattern("event7attr3mapping*"))
            )
        );
        assert!(detection.searches.contains_key("event7attr3"));
        assert_eq!(detection.searches["event7attr3mappingFilename"].0.len(), 6);
        assert_eq!(rules[1].log_source.category, Some(Category::PROCESS_CREATION.into()));
    }

    #[test]
    fn s5_object_scoped_process_ands_its_attributes_into_one_detection() {
        let mut event = base_event();
        let mut object = Object {
            id: "9".into(),
            uuid: "uo9".into(),
            name: "process".into(),
            deleted: false,
            attribute: Vec::new(),
        };
        let mut image = attr("10", "unused", "C:\\a.exe");
        image.object_relation = Some("image".into());
        let mut cmdline = attr("11", "unused", "-k");
        cmdline.object_relation = Some("command-line".into());
        object.attribute.push(image);
        object.attribute.push(cmdline);
        event.object.push(object);

        let rules = convert(&event);
        assert_eq!(rules.len(), 1 + 1);
        let detection = &rules[1].detection;
        assert_eq!(detection.condition, Some(Condition::identifier("event7object9")));
        let search = &detection.searches["event7object9"];
        assert_eq!(search.0.len(), 1);
        assert_eq!(
            search.0[0].get(&Field::new(Field::IMAGE).ends_with()).unwrap().0,
            vec!["C:\\a.exe".to_string()]
        );
        assert_eq!(
            search.0[0].get(&Field::new(Field::COMMAND_LINE).contains()).unwrap().0,
            vec!["-k".to_string()]
        );
    }

    #[test]
    fn s6_deleted_attribute_is_skipped() {
        let mut event = base_event();
        let mut deleted = attr("1", "md5", "abc");
        deleted.deleted = true;
        event.attribute.push(deleted);
        assert!(convert(&event).is_empty());
    }

    #[test]
    fn deleted_event_converts_to_nothing_regardless_of_content() {
        let mut event = base_event();
        event.deleted = true;
        event.attribute.push(attr("1", "md5", "abc"));
        assert!(convert(&event).is_empty());
    }

    #[test]
    fn global_rule_tags_exclude_hidden() {
        let mut event = base_event();
        event.tag.push(sigmai_core::misp::Tag { name: "visible".into(), hidden: false });
        event.tag.push(sigmai_core::misp::Tag { name: "secret".into(), hidden: true });
        event.attribute.push(attr("1", "md5", "abc"));
        let rules = convert(&event);
        assert_eq!(rules[0].tags, vec!["visible".to_string()]);
    }

    #[test]
    fn threat_level_maps_to_sigma_level() {
        let mut event = base_event();
        event.threat_level = ThreatLevel::High;
        event.attribute.push(attr("1", "md5", "abc"));
        let rules = convert(&event);
        assert_eq!(rules[0].level, Some(Level::High));
    }
}
