use std::fmt;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use super::operations::MethodDescriptor;
use crate::error::SkipReason;
use crate::parse::operation::HttpMethod;

/// Everything one compilation run hands to a renderer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompiledSpec {
    /// Descriptors in path-then-method declaration order.
    pub methods: Vec<MethodDescriptor>,
    /// Import paths of every model type the descriptors reference, deduplicated
    /// in first-use order.
    pub imports: IndexSet<PathBuf>,
    pub skipped: Vec<SkippedOperation>,
    pub issues: Vec<ValidationIssue>,
}

/// An operation that was dropped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOperation {
    pub method: HttpMethod,
    pub path: String,
    #[serde(serialize_with = "serialize_display")]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A soft failure surfaced to the caller instead of being logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    /// JSON pointer into the source document, e.g. `#/paths/~1users/get`.
    pub spec_path: String,
}

impl ValidationIssue {
    pub fn warning(message: impl Into<String>, spec_path: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            spec_path: spec_path.into(),
        }
    }

    pub fn info(message: impl Into<String>, spec_path: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            spec_path: spec_path.into(),
        }
    }
}

/// Primitive value kinds a parameter or header can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
    DateTime,
    Binary,
}

/// The resolved shape of a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Array(Box<TypeDescriptor>),
    /// Inline object; an empty map is a generic string-keyed map.
    Object(IndexMap<String, TypeDescriptor>),
    /// A `$ref` that has not been resolved to a model type yet.
    Ref(String),
    /// A named model type produced by the models resolver.
    Model(String),
    /// Generic value, used where a composite type could not be resolved.
    Any,
    Unresolved,
}

impl TypeDescriptor {
    pub fn is_composite(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_) | TypeDescriptor::Object(_))
    }

    /// True when no `Unresolved` or dangling `Ref` appears anywhere inside.
    pub fn is_fully_resolved(&self) -> bool {
        match self {
            TypeDescriptor::Unresolved | TypeDescriptor::Ref(_) => false,
            TypeDescriptor::Array(items) => items.is_fully_resolved(),
            TypeDescriptor::Object(props) => props.values().all(Self::is_fully_resolved),
            TypeDescriptor::Primitive(_) | TypeDescriptor::Model(_) | TypeDescriptor::Any => true,
        }
    }

    /// Replace unresolved pieces inside a composite with the generic `Any`.
    pub fn degrade(self) -> Self {
        match self {
            TypeDescriptor::Unresolved | TypeDescriptor::Ref(_) => TypeDescriptor::Any,
            TypeDescriptor::Array(items) => TypeDescriptor::Array(Box::new(items.degrade())),
            TypeDescriptor::Object(props) => TypeDescriptor::Object(
                props.into_iter().map(|(k, v)| (k, v.degrade())).collect(),
            ),
            other => other,
        }
    }
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

fn serialize_display<T: fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_keeps_resolved_parts() {
        let mut props = IndexMap::new();
        props.insert(
            "a".to_string(),
            TypeDescriptor::Primitive(PrimitiveKind::String),
        );
        props.insert("b".to_string(), TypeDescriptor::Unresolved);
        let obj = TypeDescriptor::Object(props);
        assert!(!obj.is_fully_resolved());

        let TypeDescriptor::Object(degraded) = obj.degrade() else {
            panic!("expected object");
        };
        assert_eq!(
            degraded["a"],
            TypeDescriptor::Primitive(PrimitiveKind::String)
        );
        assert_eq!(degraded["b"], TypeDescriptor::Any);
    }

    #[test]
    fn test_array_of_unresolved_degrades_to_generic_container() {
        let arr = TypeDescriptor::Array(Box::new(TypeDescriptor::Unresolved));
        assert_eq!(
            arr.degrade(),
            TypeDescriptor::Array(Box::new(TypeDescriptor::Any))
        );
    }
}
