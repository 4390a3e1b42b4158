//! Schema rendering.
//!
//! [`Renderer::render`] turns a descriptor into the schema for one use site:
//! an inline object, a `$ref` to a component, an array, or the attributes of
//! a rendering rule. Whether a named struct is inlined or referenced is decided
//! by the [`Policy`] of the call site.

use std::any::TypeId;

use indexmap::IndexMap;
use tailor_core::Schema;

use crate::descriptor::{FieldDef, Kind, TypeDescriptor};
use crate::error::{Error, Result};
use crate::rules::RuleRegistry;
use crate::walker;

/// Decides whether a named struct reached at a use site is expanded inline.
pub type Policy<'p> = &'p dyn Fn(&TypeDescriptor) -> bool;

/// Inline everything. Used for request bodies and parameters.
#[must_use]
pub fn expand_always(_: &TypeDescriptor) -> bool {
    true
}

/// Reference every named public struct. Used for responses.
#[must_use]
pub fn prefer_refs(desc: &TypeDescriptor) -> bool {
    !desc.is_exported()
}

/// Inside a component, inline only what cannot be referenced by name.
#[must_use]
pub fn expand_local(desc: &TypeDescriptor) -> bool {
    desc.name().is_none() || desc.is_embedded() || !desc.is_exported()
}

pub struct Renderer<'a> {
    rules: &'a RuleRegistry,
    /// Structs whose inline expansion is in progress
    expanding: Vec<TypeId>,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub const fn new(rules: &'a RuleRegistry) -> Self {
        Self {
            rules,
            expanding: Vec::new(),
        }
    }

    /// Schema for `desc` at a use site governed by `policy`.
    pub fn render(&mut self, desc: &TypeDescriptor, policy: Policy<'_>) -> Result<Schema> {
        let kind = desc
            .kind()
            .ok_or_else(|| Error::internal("the empty descriptor cannot be rendered."))?;

        if self.rules.is_data_type(desc) {
            tracing::trace!(type_name = desc.type_name(), "rendering data type");
            return self.data(desc);
        }

        match kind {
            Kind::Slice => {
                let element = desc.element().ok_or_else(|| {
                    Error::internal(format!("slice {} has no element type.", desc.type_name()))
                })?;
                Ok(Schema::array(self.render(&element, policy)?))
            }
            Kind::Struct if desc.declared_fields().is_empty() => Ok(Schema::object()),
            Kind::Struct => match desc.name() {
                Some(name) if !policy(desc) => {
                    tracing::trace!(name, "rendering reference");
                    Ok(Schema::reference(name))
                }
                _ => self.render_object(desc, policy),
            },
            _ => self.data(desc),
        }
    }

    /// Expand the struct `desc` into an object with one property per
    /// serialized field, whatever its name. Nested fields follow `policy`.
    pub fn render_object(&mut self, desc: &TypeDescriptor, policy: Policy<'_>) -> Result<Schema> {
        let id = desc
            .type_id()
            .ok_or_else(|| Error::internal("the empty descriptor cannot be rendered."))?;
        if self.expanding.contains(&id) {
            return Err(Error::RecursiveType {
                type_name: desc.type_name(),
            });
        }
        tracing::trace!(type_name = desc.type_name(), "expanding inline");

        self.expanding.push(id);
        let properties = self.properties(desc, policy);
        self.expanding.pop();

        Ok(Schema::object_with(properties?))
    }

    fn properties(
        &mut self,
        desc: &TypeDescriptor,
        policy: Policy<'_>,
    ) -> Result<IndexMap<String, Schema>> {
        let mut properties = IndexMap::new();
        for field in walker::visible_fields(desc)? {
            // Fields without a serialized name never appear in a body.
            let Some(name) = field.field().and_then(FieldDef::json_name) else {
                continue;
            };
            let schema = self.render(&field, policy)?;
            properties.insert(name.to_string(), schema);
        }
        Ok(properties)
    }

    fn data(&self, desc: &TypeDescriptor) -> Result<Schema> {
        self.rules.attributes(desc).map(Schema::data)
    }
}
