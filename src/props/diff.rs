//! Property diffs: what changed between two renders of the same element.

use crate::collections::OrderedMap;

use super::value::Value;

/// Declared props of one element render, in declaration order.
pub type Props = OrderedMap<String, Value>;

/// One entry of a diff.
#[derive(Debug, Clone, PartialEq)]
pub enum PropUpdate {
    /// The property now holds this value.
    Set(Value),
    /// The property was removed from the declaration.
    Unset,
}

impl PropUpdate {
    /// The new value, or `None` for [`PropUpdate::Unset`].
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Set(v) => Some(v),
            Self::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

/// Ordered list of changed or removed properties.
pub type DiffedProps = Vec<(String, PropUpdate)>;

/// Diff entry setting `name` to `value`.
pub fn set(name: impl Into<String>, value: impl Into<Value>) -> (String, PropUpdate) {
    (name.into(), PropUpdate::Set(value.into()))
}

/// Diff entry removing `name`.
pub fn unset(name: impl Into<String>) -> (String, PropUpdate) {
    (name.into(), PropUpdate::Unset)
}

/// Compute the diff that turns `old` into `new`.
///
/// Added and changed props come first, in `new`'s declaration order,
/// followed by props only present in `old` as [`PropUpdate::Unset`], in
/// `old`'s order. Handlers and widgets compare by identity, so passing a
/// fresh closure always produces an entry.
pub fn diff_props(old: &Props, new: &Props) -> DiffedProps {
    let mut diff = DiffedProps::new();

    for (name, value) in new.iter() {
        if old.get(name) != Some(value) {
            diff.push((name.clone(), PropUpdate::Set(value.clone())));
        }
    }

    for name in old.keys() {
        if !new.contains_key(name) {
            diff.push((name.clone(), PropUpdate::Unset));
        }
    }

    diff
}

/// Diff for a freshly created element: every declared prop, in order.
pub fn initial_diff(props: &Props) -> DiffedProps {
    diff_props(&Props::new(), props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(entries: &[(&str, Value)]) -> Props {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn unchanged_props_are_skipped() {
        let old = props(&[("label", "a".into()), ("visible", true.into())]);
        let new = old.clone();
        assert!(diff_props(&old, &new).is_empty());
    }

    #[test]
    fn changed_then_removed_in_declaration_order() {
        let old = props(&[
            ("a", 1.into()),
            ("gone1", 1.into()),
            ("b", 2.into()),
            ("gone2", 1.into()),
        ]);
        let new = props(&[("b", 3.into()), ("a", 1.into()), ("c", 4.into())]);

        assert_eq!(
            diff_props(&old, &new),
            vec![set("b", 3), set("c", 4), unset("gone1"), unset("gone2")]
        );
    }

    #[test]
    fn initial_diff_lists_everything() {
        let new = props(&[("x", 1.into()), ("y", "z".into())]);
        assert_eq!(initial_diff(&new), vec![set("x", 1), set("y", "z")]);
    }

    #[test]
    fn unset_has_no_value() {
        assert_eq!(PropUpdate::Unset.value(), None);
        assert!(PropUpdate::Unset.is_unset());
        assert_eq!(PropUpdate::Set(Value::Int(1)).value(), Some(&Value::Int(1)));
    }
}
