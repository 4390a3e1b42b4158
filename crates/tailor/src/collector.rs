//! Discovers the named structs that become `components/schemas` entries.

use std::any::TypeId;
use std::collections::HashSet;

use crate::descriptor::{Kind, TypeDescriptor};
use crate::error::{Error, Result};
use crate::rules::RuleRegistry;
use crate::walker;

/// Every named public struct reachable from `roots` through slices and
/// visible fields, once each, sorted by component name.
///
/// Data types and anything that is not a struct are neither recorded nor
/// walked. Two different types that would share a component name are an
/// error.
pub fn collect_components(
    rules: &RuleRegistry,
    roots: impl IntoIterator<Item = TypeDescriptor>,
) -> Result<Vec<TypeDescriptor>> {
    let mut discovered = Vec::new();
    let mut seen = HashSet::new();
    for root in roots {
        visit(rules, root, &mut seen, &mut discovered)?;
    }

    let components = sort_by_name(remove_unreferenceable(distinct(flatten_slices(compact(
        discovered,
    )))));
    check_collisions(&components)?;

    for component in &components {
        tracing::debug!(
            name = component.name(),
            type_name = component.type_name(),
            "discovered component"
        );
    }
    tracing::debug!(count = components.len(), "collected components");
    Ok(components)
}

fn visit(
    rules: &RuleRegistry,
    desc: TypeDescriptor,
    seen: &mut HashSet<TypeId>,
    discovered: &mut Vec<TypeDescriptor>,
) -> Result<()> {
    let desc = element_of(desc);
    if desc.is_empty() || rules.is_data_type(&desc) || !desc.is_kind(Kind::Struct) {
        return Ok(());
    }
    let Some(id) = desc.type_id() else {
        return Ok(());
    };
    if !seen.insert(id) {
        return Ok(());
    }
    discovered.push(desc.clone());
    for field in walker::visible_fields(&desc)? {
        visit(rules, field, seen, discovered)?;
    }
    Ok(())
}

/// Innermost element of nested slices; anything else unchanged.
fn element_of(mut desc: TypeDescriptor) -> TypeDescriptor {
    while desc.is_kind(Kind::Slice) {
        match desc.element() {
            Some(element) => desc = element,
            None => break,
        }
    }
    desc
}

fn compact(descs: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
    descs.into_iter().filter(|d| !d.is_empty()).collect()
}

fn flatten_slices(descs: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
    descs.into_iter().map(element_of).collect()
}

/// First occurrence of each type wins.
fn distinct(descs: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
    let mut seen = HashSet::new();
    descs
        .into_iter()
        .filter(|d| d.type_id().is_some_and(|id| seen.insert(id)))
        .collect()
}

/// Unnamed and private structs are always expanded in place.
fn remove_unreferenceable(descs: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
    descs
        .into_iter()
        .filter(|d| d.name().is_some() && d.is_exported())
        .collect()
}

fn sort_by_name(mut descs: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
    descs.sort_by_key(TypeDescriptor::name);
    descs
}

/// Expects `components` sorted by name and distinct by type.
fn check_collisions(components: &[TypeDescriptor]) -> Result<()> {
    for pair in components.windows(2) {
        if let [first, second] = pair
            && let Some(name) = first.name()
            && first.name() == second.name()
        {
            return Err(Error::SchemaNameCollision {
                name: name.to_string(),
                first: first.type_name(),
                second: second.type_name(),
            });
        }
    }
    Ok(())
}
