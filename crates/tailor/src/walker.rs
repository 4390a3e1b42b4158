//! Enumerates the fields of a struct that take part in its schema.

use std::any::TypeId;

use crate::descriptor::{FieldDef, Kind, TypeDescriptor};
use crate::error::{Error, Result};

/// A field is visible when it is exported, flattened, or positional.
#[must_use]
pub fn is_visible(field: &FieldDef) -> bool {
    field.name.is_none() || field.embedded || field.exported
}

/// The visible fields of `desc` in declaration order, each carrying its field
/// metadata. Flattened fields are replaced in place by their own visible
/// fields. Anything that is not a struct has no fields.
pub fn visible_fields(desc: &TypeDescriptor) -> Result<Vec<TypeDescriptor>> {
    let mut fields = Vec::new();
    splice(desc, &mut Vec::new(), &mut fields)?;
    Ok(fields)
}

fn splice(
    desc: &TypeDescriptor,
    walking: &mut Vec<TypeId>,
    fields: &mut Vec<TypeDescriptor>,
) -> Result<()> {
    let id = desc
        .type_id()
        .ok_or_else(|| Error::internal("cannot walk the fields of the empty descriptor."))?;
    if walking.contains(&id) {
        return Err(Error::RecursiveType {
            type_name: desc.type_name(),
        });
    }
    walking.push(id);

    for def in desc.declared_fields() {
        if !is_visible(&def) {
            continue;
        }
        let ty = def.ty.ok_or_else(|| {
            Error::internal(format!(
                "field `{}` of {} is visible but carries no type.",
                def.name.unwrap_or("_"),
                desc.type_name()
            ))
        })?;
        let field = ty().with_field(def);
        if !def.embedded {
            fields.push(field);
            continue;
        }
        if !field.is_kind(Kind::Struct) {
            return Err(Error::FlattenNonStruct {
                field: def.name.unwrap_or("_").to_string(),
                type_name: field.type_name(),
            });
        }
        splice(&field, walking, fields)?;
    }

    walking.pop();
    Ok(())
}
