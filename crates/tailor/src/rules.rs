//! Rendering rules and the registry that maps types to them.
//!
//! A [`Rule`] writes scalar schema attributes (`type`, `format`, `nullable`,
//! `default`, ...) for a descriptor. Rules compose with [`chain`]: each member
//! writes into the same [`Attributes`], so later rules override earlier ones.
//! That is how a custom rule starts from the built-in behavior and adds to it:
//!
//! ```
//! use tailor::rules::{self, Rule};
//!
//! let rule = rules::builtin::<i32>([Rule::new(|desc, attrs| {
//!     if let Some(min) = desc.tag("min") {
//!         attrs.set("minimum", min);
//!     }
//! })]);
//! # let _ = rule;
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tailor_core::Attributes;

use crate::descriptor::{Describe, Kind, TypeDescriptor};
use crate::error::{Error, Result};

type RuleFn = dyn Fn(&TypeDescriptor, &mut Attributes) + Send + Sync;

/// Writes schema attributes for a descriptor. Running a rule twice on the same
/// descriptor must produce the same attributes.
#[derive(Clone)]
pub struct Rule(Arc<RuleFn>);

impl Rule {
    pub fn new(f: impl Fn(&TypeDescriptor, &mut Attributes) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, desc: &TypeDescriptor, attributes: &mut Attributes) {
        (self.0)(desc, attributes);
    }

    /// Run the rule on fresh attributes
    #[must_use]
    pub fn attributes(&self, desc: &TypeDescriptor) -> Attributes {
        let mut attributes = Attributes::new();
        self.apply(desc, &mut attributes);
        attributes
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rule(..)")
    }
}

/// Sets `type` and, when non-empty, `format`. Nullable descriptors also get
/// `nullable: true`.
#[must_use]
pub fn fixed(schema_type: &'static str, format: &'static str) -> Rule {
    Rule::new(move |desc, attributes| {
        attributes.set("type", schema_type);
        if !format.is_empty() {
            attributes.set("format", format);
        }
        if desc.is_nullable() {
            attributes.set("nullable", "true");
        }
    })
}

/// Copies the field's `default` tag into `default`.
#[must_use]
pub fn default_value() -> Rule {
    Rule::new(|desc, attributes| {
        if let Some(default) = desc.tag("default").filter(|d| !d.is_empty()) {
            attributes.set("default", default);
        }
    })
}

/// Runs `rules` in order over the same attributes.
#[must_use]
pub fn chain(rules: impl IntoIterator<Item = Rule>) -> Rule {
    let rules: Vec<Rule> = rules.into_iter().collect();
    Rule::new(move |desc, attributes| {
        for rule in &rules {
            rule.apply(desc, attributes);
        }
    })
}

#[must_use]
pub fn noop() -> Rule {
    Rule::new(|_, _| {})
}

/// Built-in `(type, format)` pairs. The first entry of each kind is that
/// kind's fallback.
fn builtin_table() -> Vec<(TypeDescriptor, &'static str, &'static str)> {
    vec![
        (TypeDescriptor::of::<bool>(), "boolean", ""),
        (TypeDescriptor::of::<i8>(), "integer", "int32"),
        (TypeDescriptor::of::<i16>(), "integer", "int32"),
        (TypeDescriptor::of::<i32>(), "integer", "int32"),
        (TypeDescriptor::of::<i64>(), "integer", "int64"),
        (TypeDescriptor::of::<i128>(), "integer", "int64"),
        (TypeDescriptor::of::<isize>(), "integer", "int64"),
        (TypeDescriptor::of::<u8>(), "integer", "int32"),
        (TypeDescriptor::of::<u16>(), "integer", "int32"),
        (TypeDescriptor::of::<u32>(), "integer", "int64"),
        (TypeDescriptor::of::<u64>(), "integer", "int64"),
        (TypeDescriptor::of::<u128>(), "integer", "int64"),
        (TypeDescriptor::of::<usize>(), "integer", "int64"),
        (TypeDescriptor::of::<f32>(), "number", "float"),
        (TypeDescriptor::of::<f64>(), "number", "double"),
        (TypeDescriptor::of::<char>(), "string", ""),
        (TypeDescriptor::of::<String>(), "string", ""),
        (TypeDescriptor::of::<&'static str>(), "string", ""),
        (TypeDescriptor::of::<chrono::DateTime<chrono::Utc>>(), "string", "date-time"),
        (TypeDescriptor::of::<chrono::DateTime<chrono::FixedOffset>>(), "string", "date-time"),
        (TypeDescriptor::of::<chrono::DateTime<chrono::Local>>(), "string", "date-time"),
        (TypeDescriptor::of::<chrono::NaiveDateTime>(), "string", "date-time"),
        (TypeDescriptor::of::<chrono::NaiveDate>(), "string", "date"),
    ]
}

/// Descriptors of every type with a built-in rule, for re-registering all of
/// them with an extra rule.
#[must_use]
pub fn builtin_types() -> Vec<TypeDescriptor> {
    builtin_table().into_iter().map(|(desc, _, _)| desc).collect()
}

/// The built-in rule for `desc`, followed by [`default_value`] and `extra`.
/// Types without a built-in format start from [`noop`].
#[must_use]
pub fn builtin_for(desc: &TypeDescriptor, extra: impl IntoIterator<Item = Rule>) -> Rule {
    let base = builtin_table()
        .into_iter()
        .find(|(builtin, _, _)| builtin.type_id().is_some() && builtin.type_id() == desc.type_id())
        .map_or_else(noop, |(_, schema_type, format)| fixed(schema_type, format));
    chain([base, default_value()].into_iter().chain(extra))
}

/// [`builtin_for`] the type `T`.
#[must_use]
pub fn builtin<T: Describe>(extra: impl IntoIterator<Item = Rule>) -> Rule {
    builtin_for(&TypeDescriptor::of::<T>(), extra)
}

/// Maps exact types, and failing that kinds, to rules.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    by_type: HashMap<TypeId, Rule>,
    by_kind: HashMap<Kind, Rule>,
}

impl RuleRegistry {
    /// Registry holding the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for desc in builtin_types() {
            let rule = builtin_for(&desc, []);
            registry.register(&desc, rule);
        }
        registry.register_kind(Kind::Map, fixed("object", ""));
        registry.register_kind(Kind::Any, noop());
        registry
    }

    /// Registry with no rules at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Install `rule` for the exact type of `desc`. `Option<T>` shares `T`'s
    /// identity, so it is covered too. Registering the canonical primitive of a
    /// kind (`i64` for [`Kind::I64`]) also replaces that kind's fallback.
    pub fn register(&mut self, desc: &TypeDescriptor, rule: Rule) {
        let Some(info) = desc.info() else {
            tracing::debug!("ignoring rule registered for the empty descriptor");
            return;
        };
        if info.kind.canonical_type() == Some(info.id) {
            self.by_kind.insert(info.kind, rule.clone());
        }
        self.by_type.insert(info.id, rule);
    }

    pub fn register_kind(&mut self, kind: Kind, rule: Rule) {
        self.by_kind.insert(kind, rule);
    }

    /// Exact type first, then kind.
    #[must_use]
    pub fn lookup(&self, desc: &TypeDescriptor) -> Option<&Rule> {
        let info = desc.info()?;
        self.by_type
            .get(&info.id)
            .or_else(|| self.by_kind.get(&info.kind))
    }

    /// True only when a rule exists for this exact type; a kind fallback does
    /// not count. Structs registered here render as scalars and are never walked.
    #[must_use]
    pub fn is_data_type(&self, desc: &TypeDescriptor) -> bool {
        desc.type_id().is_some_and(|id| self.by_type.contains_key(&id))
    }

    /// Run the matching rule, failing when none applies.
    pub fn attributes(&self, desc: &TypeDescriptor) -> Result<Attributes> {
        let info = desc
            .info()
            .ok_or_else(|| Error::internal("cannot look up a rule for the empty descriptor."))?;
        let rule = self.lookup(desc).ok_or(Error::Unsupported {
            kind: info.kind,
            type_name: info.type_name,
        })?;
        Ok(rule.attributes(desc))
    }
}
