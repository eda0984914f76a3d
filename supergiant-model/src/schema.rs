use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaResult;
use crate::registry::SchemaRegistry;

/// A statically defined entity type.
///
/// Implementors declare their fields once; the [`SchemaRegistry`] turns the
/// declarations into a checked [`EntitySchema`] the first time the type is
/// described and caches it from then on.
pub trait Model: 'static {
    /// Stable name of the entity type, used in logs and stored records.
    const ENTITY_TYPE: &'static str;

    /// Field declarations in their canonical order.
    fn fields() -> Vec<FieldDecl>;
}

/// The semantic kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A plain value stored in its own column.
    Scalar,
    /// A belongs-to association loaded by the persistence layer.
    Reference,
    /// A has-many association loaded by the persistence layer.
    Collection,
    /// One variant of a polymorphic config group.
    Config,
    /// The blob column backing a `store_as_json_in` field.
    JsonMirror,
}

impl FieldKind {
    /// Association fields are not columns of the owning record.
    pub fn is_association(self) -> bool {
        matches!(self, Self::Reference | Self::Collection)
    }
}

/// Who may write a field, and when.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    #[default]
    Mutable,
    /// Settable by the client on create only.
    Immutable,
    /// Never settable by the client; computed by the system.
    ReadOnly,
}

/// An anchored regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` so that it must match the whole value.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A structural format rule checked by the validator.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A supplied value must not be its type's zero value.
    NonEmpty,
    Pattern(Pattern),
    /// Minimum string length in characters.
    MinLen(usize),
    /// Maximum string length in characters.
    MaxLen(usize),
    /// Minimum number of array items. An absent collection has zero items.
    MinItems(usize),
    Min(f64),
    Max(f64),
}

/// Resolves a nested variant type through the registry.
pub type DescribeFn = fn(&SchemaRegistry) -> SchemaResult<Arc<EntitySchema>>;

fn describe_nested<T: Model>(registry: &SchemaRegistry) -> SchemaResult<Arc<EntitySchema>> {
    registry.describe::<T>()
}

#[derive(Debug, Clone)]
pub(crate) struct VariantDecl {
    pub(crate) group: String,
    pub(crate) variant: String,
    pub(crate) describe: DescribeFn,
}

/// A field declaration as written by a [`Model`] implementation.
///
/// Declarations are unchecked: conflicting flags are accepted here and
/// rejected by the registry when the type is described.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) immutable: bool,
    pub(crate) readonly: bool,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) patterns: Vec<String>,
    pub(crate) mirror: Option<String>,
    pub(crate) variant: Option<VariantDecl>,
}

impl FieldDecl {
    fn of_kind(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            immutable: false,
            readonly: false,
            required: false,
            default: None,
            rules: Vec::new(),
            patterns: Vec::new(),
            mirror: None,
            variant: None,
        }
    }

    pub fn scalar(name: &str) -> Self {
        Self::of_kind(name, FieldKind::Scalar)
    }

    pub fn reference(name: &str) -> Self {
        Self::of_kind(name, FieldKind::Reference)
    }

    pub fn collection(name: &str) -> Self {
        Self::of_kind(name, FieldKind::Collection)
    }

    pub fn json_mirror(name: &str) -> Self {
        Self::of_kind(name, FieldKind::JsonMirror)
    }

    /// A config variant of type `T`, one member of the exclusive `group`.
    pub fn config<T: Model>(name: &str, group: &str, variant: &str) -> Self {
        let mut decl = Self::of_kind(name, FieldKind::Config);
        decl.variant = Some(VariantDecl {
            group: group.into(),
            variant: variant.into(),
            describe: describe_nested::<T>,
        });
        decl
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Must be non-blank once defaults have been applied.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.rules.push(Rule::NonEmpty);
        self
    }

    /// Anchored pattern; compiled when the type is described.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.rules.push(Rule::MinLen(min));
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.rules.push(Rule::MaxLen(max));
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.rules.push(Rule::MinItems(min));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.rules.push(Rule::Min(min));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.rules.push(Rule::Max(max));
        self
    }

    /// Persist this field as JSON inside the `mirror` blob field.
    pub fn store_as_json_in(mut self, mirror: &str) -> Self {
        self.mirror = Some(mirror.into());
        self
    }
}

/// The variant a config field stands for, with the variant's own schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigVariant {
    pub group: String,
    pub variant: String,
    pub schema: Arc<EntitySchema>,
}

/// Checked metadata for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub mutability: Mutability,
    pub required: bool,
    pub default: Option<Value>,
    pub rules: Vec<Rule>,
    /// Blob field this one is persisted in, if any.
    pub mirror: Option<String>,
    pub variant: Option<ConfigVariant>,
}

impl FieldDescriptor {
    pub fn is_immutable(&self) -> bool {
        self.mutability == Mutability::Immutable
    }

    pub fn is_readonly(&self) -> bool {
        self.mutability == Mutability::ReadOnly
    }
}

/// The members of one exclusive config group, in declaration order.
#[derive(Debug, Clone)]
pub struct ConfigGroup<'a> {
    pub name: &'a str,
    pub members: Vec<&'a FieldDescriptor>,
}

impl<'a> ConfigGroup<'a> {
    /// The group's policy; the registry guarantees members agree.
    pub fn mutability(&self) -> Mutability {
        self.members
            .first()
            .map(|m| m.mutability)
            .unwrap_or_default()
    }

    /// The member standing for `variant`.
    pub fn member(&self, variant: &str) -> Option<&'a FieldDescriptor> {
        self.members
            .iter()
            .copied()
            .find(|m| m.variant.as_ref().is_some_and(|v| v.variant == variant))
    }
}

/// The ordered field descriptors of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub entity_type: String,
    pub fields: Vec<FieldDescriptor>,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Config groups in order of their first member.
    pub fn config_groups(&self) -> Vec<ConfigGroup<'_>> {
        let mut groups: Vec<ConfigGroup<'_>> = Vec::new();
        for field in &self.fields {
            let Some(variant) = &field.variant else {
                continue;
            };
            match groups.iter_mut().find(|g| g.name == variant.group) {
                Some(group) => group.members.push(field),
                None => groups.push(ConfigGroup {
                    name: &variant.group,
                    members: vec![field],
                }),
            }
        }
        groups
    }
}
