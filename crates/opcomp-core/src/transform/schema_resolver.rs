use indexmap::IndexMap;

use crate::ir::{PrimitiveKind, TypeDescriptor};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, TypeSet};

/// Convert a parsed `SchemaOrRef` to a `TypeDescriptor`.
///
/// References stay as `TypeDescriptor::Ref`; turning them into model types is
/// the models resolver's job.
pub fn schema_or_ref_to_type(schema_or_ref: &SchemaOrRef) -> TypeDescriptor {
    match schema_or_ref {
        SchemaOrRef::Ref { ref_path } => TypeDescriptor::Ref(ref_path.clone()),
        SchemaOrRef::Schema(schema) => schema_to_type(schema),
    }
}

/// Convert a parsed `Schema` to a `TypeDescriptor`.
pub fn schema_to_type(schema: &Schema) -> TypeDescriptor {
    // Composition is not modelled, except the single-element allOf wrapper
    if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        return TypeDescriptor::Unresolved;
    }
    if !schema.all_of.is_empty() {
        if let [only] = schema.all_of.as_slice() {
            return schema_or_ref_to_type(only);
        }
        return TypeDescriptor::Unresolved;
    }

    match &schema.schema_type {
        Some(TypeSet::Single(t)) => single_type(t, schema),
        Some(TypeSet::Multiple(types)) => {
            let non_null: Vec<&SchemaType> =
                types.iter().filter(|t| **t != SchemaType::Null).collect();
            match non_null.as_slice() {
                [only] => single_type(only, schema),
                _ => TypeDescriptor::Unresolved,
            }
        }
        None => {
            // No type keyword: infer from structure
            if !schema.properties.is_empty() || schema.additional_properties.is_some() {
                object_type(schema)
            } else if schema.items.is_some() {
                array_type(schema)
            } else if schema.enum_values.iter().all(|v| v.is_string())
                && !schema.enum_values.is_empty()
            {
                TypeDescriptor::Primitive(PrimitiveKind::String)
            } else {
                TypeDescriptor::Unresolved
            }
        }
    }
}

fn single_type(t: &SchemaType, schema: &Schema) -> TypeDescriptor {
    match t {
        SchemaType::String => match schema.format.as_deref() {
            Some("date-time" | "date") => TypeDescriptor::Primitive(PrimitiveKind::DateTime),
            Some("binary" | "byte") => TypeDescriptor::Primitive(PrimitiveKind::Binary),
            _ => TypeDescriptor::Primitive(PrimitiveKind::String),
        },
        SchemaType::Integer => TypeDescriptor::Primitive(PrimitiveKind::Integer),
        SchemaType::Number => TypeDescriptor::Primitive(PrimitiveKind::Number),
        SchemaType::Boolean => TypeDescriptor::Primitive(PrimitiveKind::Boolean),
        SchemaType::Array => array_type(schema),
        SchemaType::Object => object_type(schema),
        SchemaType::Null | SchemaType::Unknown(_) => TypeDescriptor::Unresolved,
    }
}

fn array_type(schema: &Schema) -> TypeDescriptor {
    match &schema.items {
        Some(items) => TypeDescriptor::Array(Box::new(schema_or_ref_to_type(items))),
        None => TypeDescriptor::Array(Box::new(TypeDescriptor::Unresolved)),
    }
}

fn object_type(schema: &Schema) -> TypeDescriptor {
    if schema.properties.is_empty() {
        // Free-form map: additionalProperties only types the values, which
        // the descriptor does not track.
        if let Some(AdditionalProperties::Bool(false)) = schema.additional_properties {
            return TypeDescriptor::Unresolved;
        }
        return TypeDescriptor::Object(IndexMap::new());
    }
    TypeDescriptor::Object(
        schema
            .properties
            .iter()
            .map(|(name, prop)| (name.clone(), schema_or_ref_to_type(prop)))
            .collect(),
    )
}

/// Derive the type of a response header or similar scalar slot. A missing
/// schema defaults to string.
pub fn scalar_slot_type(schema: Option<&SchemaOrRef>) -> TypeDescriptor {
    match schema {
        Some(s) => match schema_or_ref_to_type(s) {
            TypeDescriptor::Unresolved | TypeDescriptor::Ref(_) => {
                TypeDescriptor::Primitive(PrimitiveKind::String)
            }
            other => other,
        },
        None => TypeDescriptor::Primitive(PrimitiveKind::String),
    }
}
