//! Which variant of a config group an entity has selected.

use serde_json::{Map, Value};
use supergiant_model::{ConfigGroup, FieldDescriptor, is_blank};

/// The populated members of one config group.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    /// No variant populated.
    Empty,
    One(&'a FieldDescriptor),
    /// Several variants populated at once; never valid.
    Conflict(Vec<&'a FieldDescriptor>),
}

impl<'a> Selection<'a> {
    /// The selected member, if exactly one is populated.
    pub fn member(&self) -> Option<&'a FieldDescriptor> {
        match self {
            Self::One(member) => Some(*member),
            _ => None,
        }
    }

    /// Discriminator value of the selected member.
    pub fn variant(&self) -> Option<&'a str> {
        self.member()
            .and_then(|m| m.variant.as_ref())
            .map(|v| v.variant.as_str())
    }
}

/// Finds the populated members of `group` in `data`.
///
/// A member counts as populated when its value is not blank, so an empty
/// object or `null` does not select a variant.
pub fn select<'a>(group: &ConfigGroup<'a>, data: &Map<String, Value>) -> Selection<'a> {
    let populated: Vec<&'a FieldDescriptor> = group
        .members
        .iter()
        .copied()
        .filter(|m| data.get(&m.name).is_some_and(|v| !is_blank(v)))
        .collect();

    match populated.len() {
        0 => Selection::Empty,
        1 => Selection::One(populated[0]),
        _ => Selection::Conflict(populated),
    }
}

/// Variant names of the given members, for error messages.
pub fn variant_names(members: &[&FieldDescriptor]) -> Vec<String> {
    members
        .iter()
        .filter_map(|m| m.variant.as_ref().map(|v| v.variant.clone()))
        .collect()
}
