//! The Sigma detection condition algebra.
//!
//! A [`Condition`] is either an atom (a selection identifier, or a pseudo
//! identifier like `all of selection*` / `one of them`), a conjunction, or
//! a disjunction. `and`/`or` flatten same-kind children as they combine,
//! so `a.and(b).and(c)` never nests three deep — it produces one
//! three-child `And` node. This keeps `render()` from accumulating
//! redundant parentheses as fragments are composed across attributes and
//! objects.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// A Sigma `detection.condition` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// A bare identifier: a selection name, `all of x*`, or `one of them`.
    Atom(String),
    /// A flattened conjunction of two or more children.
    And(Vec<Condition>),
    /// A flattened disjunction of two or more children.
    Or(Vec<Condition>),
}

impl Condition {
    /// A plain selection-identifier atom.
    pub fn identifier(name: impl Into<String>) -> Self {
        Condition::Atom(name.into())
    }

    /// The `all of <pattern>` pseudo-selector, matching every selection
    /// whose name starts with `pattern` minus its trailing `*`.
    pub fn all_of_pattern(pattern: impl AsRef<str>) -> Self {
        Condition::Atom(format!("all of {}", pattern.as_ref()))
    }

    /// The `one of them` pseudo-selector, matching any defined selection.
    pub fn one_of_them() -> Self {
        Condition::Atom("one of them".to_string())
    }

    /// Combines `self` and `other` into a conjunction, flattening any
    /// top-level `And` operand into the result rather than nesting it.
    pub fn and(self, other: Condition) -> Condition {
        let mut children = Vec::with_capacity(2);
        push_flattened::<AndKind>(&mut children, self);
        push_flattened::<AndKind>(&mut children, other);
        Condition::And(children)
    }

    /// Combines `self` and `other` into a disjunction, flattening any
    /// top-level `Or` operand into the result rather than nesting it.
    pub fn or(self, other: Condition) -> Condition {
        let mut children = Vec::with_capacity(2);
        push_flattened::<OrKind>(&mut children, self);
        push_flattened::<OrKind>(&mut children, other);
        Condition::Or(children)
    }

    /// Renders the condition as Sigma's textual condition syntax, e.g.
    /// `(selection1 or selection2) and filter`.
    pub fn render(&self) -> String {
        match self {
            Condition::Atom(s) => s.clone(),
            Condition::And(children) => join(children, " and "),
            Condition::Or(children) => join(children, " or "),
        }
    }

    /// The identifiers this condition references directly, for checking
    /// that every referenced selection is actually defined. Does not
    /// resolve `all of <pattern>*` or `one of them` pseudo-selectors —
    /// callers that need prefix/wildcard matching should special-case
    /// atoms starting with `"all of "` or equal to `"one of them"`.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_references(self, &mut out);
        out
    }

    fn render_as_term(&self) -> String {
        match self {
            Condition::Atom(s) => s.clone(),
            other => format!("({})", other.render()),
        }
    }
}

fn collect_references<'a>(cond: &'a Condition, out: &mut Vec<&'a str>) {
    match cond {
        Condition::Atom(s) => out.push(s.as_str()),
        Condition::And(children) | Condition::Or(children) => {
            for child in children {
                collect_references(child, out);
            }
        }
    }
}

fn join(children: &[Condition], sep: &str) -> String {
    match children.len() {
        0 => String::new(),
        1 => children[0].render(),
        _ => children
            .iter()
            .map(Condition::render_as_term)
            .collect::<Vec<_>>()
            .join(sep),
    }
}

trait Kind {
    fn unwrap(cond: Condition) -> Result<Vec<Condition>, Condition>;
}

struct AndKind;
struct OrKind;

impl Kind for AndKind {
    fn unwrap(cond: Condition) -> Result<Vec<Condition>, Condition> {
        match cond {
            Condition::And(children) => Ok(children),
            other => Err(other),
        }
    }
}

impl Kind for OrKind {
    fn unwrap(cond: Condition) -> Result<Vec<Condition>, Condition> {
        match cond {
            Condition::Or(children) => Ok(children),
            other => Err(other),
        }
    }
}

fn push_flattened<K: Kind>(children: &mut Vec<Condition>, cond: Condition) {
    match K::unwrap(cond) {
        Ok(inner) => children.extend(inner),
        Err(other) => children.push(other),
    }
}

/// Mirrors Sigma's own YAML shape: an atom or an `And` serializes as its
/// rendered string, while an `Or` serializes as a sequence so each
/// alternative can be matched independently by downstream tooling.
impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Condition::Atom(_) | Condition::And(_) => serializer.serialize_str(&self.render()),
            Condition::Or(children) => {
                let mut seq = serializer.serialize_seq(Some(children.len()))?;
                for child in children {
                    seq.serialize_element(child)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_flattens_same_kind_and() {
        let cond = Condition::identifier("a")
            .and(Condition::identifier("b"))
            .and(Condition::identifier("c"));
        assert_eq!(cond.render(), "a and b and c");
        match cond {
            Condition::And(children) => assert_eq!(children.len(), 3),
            _ => panic!("expected a flattened And"),
        }
    }

    #[test]
    fn render_flattens_same_kind_or() {
        let cond = Condition::identifier("a")
            .or(Condition::identifier("b"))
            .or(Condition::identifier("c"));
        assert_eq!(cond.render(), "a or b or c");
    }

    #[test]
    fn render_parenthesizes_mixed_nesting() {
        let or = Condition::identifier("x").or(Condition::identifier("y"));
        let cond = or.and(Condition::identifier("z"));
        assert_eq!(cond.render(), "(x or y) and z");
    }

    #[test]
    fn render_does_not_parenthesize_nested_atoms() {
        let and = Condition::identifier("x").and(Condition::identifier("y"));
        let cond = and.or(Condition::identifier("z"));
        assert_eq!(cond.render(), "(x and y) or z");
    }

    #[test]
    fn all_of_pattern_and_one_of_them_render_verbatim() {
        assert_eq!(Condition::all_of_pattern("selection*").render(), "all of selection*");
        assert_eq!(Condition::one_of_them().render(), "one of them");
    }

    #[test]
    fn references_collects_leaf_identifiers_only() {
        let cond = Condition::identifier("a")
            .and(Condition::identifier("b"))
            .or(Condition::identifier("c"));
        let mut refs = cond.references();
        refs.sort_unstable();
        assert_eq!(refs, vec!["a", "b", "c"]);
    }

    #[test]
    fn serialize_or_as_yaml_sequence() {
        let cond = Condition::identifier("a").or(Condition::identifier("b"));
        let yaml = serde_yaml::to_string(&cond).unwrap();
        assert_eq!(yaml, "- a\n- b\n");
    }

    #[test]
    fn serialize_and_as_yaml_scalar() {
        let cond = Condition::identifier("a").and(Condition::identifier("b"));
        let yaml = serde_yaml::to_string(&cond).unwrap();
        assert_eq!(yaml, "a and b\n");
    }

    #[test]
    fn serialize_nested_or_in_and_keeps_and_scalar_form() {
        let or = Condition::identifier("x").or(Condition::identifier("y"));
        let cond = or.and(Condition::identifier("z"));
        let yaml = serde_yaml::to_string(&cond).unwrap();
        assert_eq!(yaml, "(x or y) and z\n");
    }
}
