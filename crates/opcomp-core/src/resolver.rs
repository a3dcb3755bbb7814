use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::parse::ref_resolve::parse_ref_name;
use crate::parse::schema::{SchemaOrRef, SchemaType, TypeSet};
use crate::parse::spec::OpenApiSpec;
use crate::transform::name_normalizer::normalize_name;

/// Resolves schema references to named model types.
///
/// Implementations are injected into the compiler; calls are awaited one at
/// a time in declaration order.
#[allow(async_fn_in_trait)]
pub trait ModelsResolver {
    /// Map a `$ref` to the name of a model type.
    async fn resolve_ref_to_type(&self, ref_path: &str) -> Option<String>;

    /// Where the renderer imports `type_name` from.
    async fn get_import_path(&self, type_name: &str) -> Option<PathBuf>;

    /// Whether `type_name` is a generated model, as opposed to an alias or
    /// a built-in.
    async fn is_model_type(&self, type_name: &str) -> bool;
}

/// Resolves nothing. Every reference falls back to a generic shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl ModelsResolver for NoopResolver {
    async fn resolve_ref_to_type(&self, _ref_path: &str) -> Option<String> {
        None
    }

    async fn get_import_path(&self, _type_name: &str) -> Option<PathBuf> {
        None
    }

    async fn is_model_type(&self, _type_name: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
struct ModelEntry {
    file_stem: String,
    is_object: bool,
}

/// Resolves references against the document's own named schemas.
///
/// `#/components/schemas/user_profile` becomes `UserProfile`, imported from
/// `<import_dir>/user_profile`.
#[derive(Debug, Clone)]
pub struct ComponentsResolver {
    import_dir: PathBuf,
    models: IndexMap<String, ModelEntry>,
}

impl ComponentsResolver {
    pub fn new(spec: &OpenApiSpec, import_dir: impl AsRef<Path>) -> Self {
        let models = spec
            .schema_definitions()
            .iter()
            .map(|(name, schema)| {
                let normalized = normalize_name(name);
                (
                    normalized.pascal_case,
                    ModelEntry {
                        file_stem: normalized.snake_case,
                        is_object: is_object_like(schema),
                    },
                )
            })
            .collect();
        Self {
            import_dir: import_dir.as_ref().to_path_buf(),
            models,
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn is_object_like(schema: &SchemaOrRef) -> bool {
    let Some(schema) = schema.as_schema() else {
        return false;
    };
    match &schema.schema_type {
        Some(TypeSet::Single(SchemaType::Object)) => true,
        Some(TypeSet::Multiple(types)) => types.contains(&SchemaType::Object),
        Some(_) => false,
        None => !schema.properties.is_empty() || !schema.all_of.is_empty(),
    }
}

impl ModelsResolver for ComponentsResolver {
    async fn resolve_ref_to_type(&self, ref_path: &str) -> Option<String> {
        let name = parse_ref_name(ref_path, "schemas").ok()?;
        let type_name = normalize_name(name).pascal_case;
        self.models.contains_key(&type_name).then_some(type_name)
    }

    async fn get_import_path(&self, type_name: &str) -> Option<PathBuf> {
        self.models
            .get(type_name)
            .map(|entry| self.import_dir.join(&entry.file_stem))
    }

    async fn is_model_type(&self, type_name: &str) -> bool {
        self.models.get(type_name).is_some_and(|entry| entry.is_object)
    }
}

/// A schema that names a model, directly or as the items of an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub type_name: String,
    pub is_list: bool,
}

/// The `$ref` a body schema points at: its own, or its array items'.
pub fn model_ref(schema: &SchemaOrRef) -> Option<(&str, bool)> {
    match schema {
        SchemaOrRef::Ref { ref_path } => Some((ref_path.as_str(), false)),
        SchemaOrRef::Schema(schema) => {
            let is_array = matches!(
                schema.schema_type,
                Some(TypeSet::Single(SchemaType::Array)) | None
            );
            match schema.items.as_deref() {
                Some(SchemaOrRef::Ref { ref_path }) if is_array => {
                    Some((ref_path.as_str(), true))
                }
                _ => None,
            }
        }
    }
}

/// Ask `resolver` for the model behind a body schema.
pub async fn resolve_schema_model<R: ModelsResolver>(
    resolver: &R,
    schema: &SchemaOrRef,
) -> Option<ResolvedModel> {
    let (ref_path, is_list) = model_ref(schema)?;
    let type_name = resolver.resolve_ref_to_type(ref_path).await?;
    Some(ResolvedModel { type_name, is_list })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const SPEC: &str = r#"
openapi: 3.0.3
info: {title: Test, version: "1"}
paths: {}
components:
  schemas:
    user_profile:
      type: object
      properties:
        id: {type: string}
    Status:
      type: string
      enum: [active, banned]
"#;

    #[tokio::test]
    async fn test_noop_resolves_nothing() {
        let resolver = NoopResolver;
        assert_eq!(
            resolver
                .resolve_ref_to_type("#/components/schemas/User")
                .await,
            None
        );
        assert_eq!(resolver.get_import_path("User").await, None);
        assert!(!resolver.is_model_type("User").await);
    }

    #[tokio::test]
    async fn test_components_resolver() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let resolver = ComponentsResolver::new(&spec, "models");
        assert_eq!(resolver.len(), 2);

        assert_eq!(
            resolver
                .resolve_ref_to_type("#/components/schemas/user_profile")
                .await
                .as_deref(),
            Some("UserProfile")
        );
        assert_eq!(
            resolver.get_import_path("UserProfile").await,
            Some(PathBuf::from("models/user_profile"))
        );
        assert!(resolver.is_model_type("UserProfile").await);
        assert!(!resolver.is_model_type("Status").await);
    }

    #[tokio::test]
    async fn test_resolve_schema_model() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let resolver = ComponentsResolver::new(&spec, "models");

        let direct: SchemaOrRef =
            serde_yaml_ng::from_str("$ref: '#/components/schemas/user_profile'").unwrap();
        assert_eq!(
            resolve_schema_model(&resolver, &direct).await,
            Some(ResolvedModel {
                type_name: "UserProfile".to_string(),
                is_list: false,
            })
        );

        let list: SchemaOrRef = serde_yaml_ng::from_str(
            "{type: array, items: {$ref: '#/components/schemas/user_profile'}}",
        )
        .unwrap();
        assert_eq!(
            resolve_schema_model(&resolver, &list).await,
            Some(ResolvedModel {
                type_name: "UserProfile".to_string(),
                is_list: true,
            })
        );

        let inline: SchemaOrRef = serde_yaml_ng::from_str("type: object").unwrap();
        assert_eq!(resolve_schema_model(&resolver, &inline).await, None);
        assert_eq!(resolve_schema_model(&NoopResolver, &direct).await, None);
    }

    #[tokio::test]
    async fn test_components_resolver_unknown_refs() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let resolver = ComponentsResolver::new(&spec, "models");
        assert_eq!(
            resolver
                .resolve_ref_to_type("#/components/schemas/Missing")
                .await,
            None
        );
        assert_eq!(
            resolver
                .resolve_ref_to_type("#/components/parameters/user_profile")
                .await,
            None
        );
    }
}
