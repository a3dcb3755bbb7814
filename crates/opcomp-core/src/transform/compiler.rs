use indexmap::IndexMap;

use crate::error::{CompileError, SkipReason};
use crate::ir::*;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter as raw;
use crate::parse::ref_resolve::RefResolver;
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::spec::OpenApiSpec;
use crate::resolver::ModelsResolver;

use super::content::plan_request_body;
use super::json_pointer;
use super::name_normalizer::{normalize_name, route_to_name, sanitize_operation_id};
use super::params::{build_parameter_set, merge_parameters};
use super::path_template::build_path_template;
use super::response_classifier::classify_response;
use super::security::{SecurityCatalog, effective_requirements, resolve_security};

/// Query parameter names that mark a page position.
const PAGE_PARAMS: [&str; 2] = ["page", "offset"];
/// Query parameter names that mark a page size.
const LIMIT_PARAMS: [&str; 3] = ["limit", "per_page", "page_size"];

/// Knobs for a compilation run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Sanitized operationId → custom method name.
    pub aliases: IndexMap<String, String>,
    /// Name operations without an operationId after their route instead of
    /// skipping them.
    pub derive_missing_operation_ids: bool,
    /// Apply the legacy bearer/API key fallback to operations that declare
    /// no `security` of their own.
    pub legacy_fallback: bool,
    /// Header the fallback API key is sent in.
    pub api_key_header: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            aliases: IndexMap::new(),
            derive_missing_operation_ids: false,
            legacy_fallback: true,
            api_key_header: "X-API-Key".to_string(),
        }
    }
}

/// Compile every operation of `spec` into method descriptors.
///
/// Only a document without `paths` fails the run; individual operations
/// that cannot be compiled are reported in [`CompiledSpec::skipped`].
pub async fn compile<R: ModelsResolver>(
    spec: &OpenApiSpec,
    resolver: &R,
    options: &CompileOptions,
) -> Result<CompiledSpec, CompileError> {
    Compiler::new(spec, resolver, options).run().await
}

/// Compiles the operations of one document.
pub struct Compiler<'a, R> {
    spec: OpenApiSpec,
    catalog: SecurityCatalog,
    resolver: &'a R,
    options: &'a CompileOptions,
}

impl<'a, R: ModelsResolver> Compiler<'a, R> {
    /// Inline the document's references and index its security schemes.
    pub fn new(spec: &OpenApiSpec, resolver: &'a R, options: &'a CompileOptions) -> Self {
        let spec = RefResolver::new(spec).resolve_spec();
        let catalog = SecurityCatalog::from_spec(&spec);
        Self {
            spec,
            catalog,
            resolver,
            options,
        }
    }

    pub async fn run(&self) -> Result<CompiledSpec, CompileError> {
        let paths = self.spec.paths.as_ref().ok_or(CompileError::MissingPaths)?;

        let mut out = CompiledSpec {
            issues: self.catalog.issues.clone(),
            ..CompiledSpec::default()
        };

        // Strictly sequential: output order is declaration order.
        for (path, item) in paths {
            for (&method, op) in &item.operations {
                let pointer = json_pointer(&["paths", path.as_str(), method.key()]);
                log::debug!("compiling {method} {path}");

                match self.compile_operation(path, item, method, op).await {
                    Ok(descriptor) => {
                        self.report(&descriptor, &pointer, &mut out.issues);
                        self.collect_imports(&descriptor, &mut out).await;
                        out.methods.push(descriptor);
                    }
                    Err(reason) => {
                        log::debug!("skipping {method} {path}: {reason}");
                        out.issues
                            .push(ValidationIssue::warning(format!("skipped: {reason}"), pointer));
                        out.skipped.push(SkippedOperation {
                            method,
                            path: path.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        Ok(out)
    }

    /// Compile one operation, or say why it cannot be compiled.
    pub async fn compile_operation(
        &self,
        path: &str,
        item: &PathItem,
        method: HttpMethod,
        op: &Operation,
    ) -> Result<MethodDescriptor, SkipReason> {
        let (operation_id, name) = self.method_name(path, method, op)?;

        let merged = merge_parameters(&item.parameters, &op.parameters)?;
        let parameters = build_parameter_set(&merged)?;
        let path_template = build_path_template(path, &parameters.path)?;

        let body = self.request_body(op, merged.body.as_ref())?;
        let request_body = match body {
            None => None,
            Some(_) if !method.accepts_body() => {
                return Err(SkipReason::RequestBodyNotAllowed(method));
            }
            Some(body) => Some(
                plan_request_body(&body, self.resolver)
                    .await
                    .ok_or(SkipReason::MissingRequestBody(method))?,
            ),
        };

        let response = classify_response(&op.responses, self.resolver).await?;

        let requirements =
            effective_requirements(self.spec.security.as_deref(), op.security.as_deref());
        let fallback = (self.options.legacy_fallback && op.security.is_none())
            .then_some(self.options.api_key_header.as_str());
        let security = resolve_security(requirements, &self.catalog, &parameters, fallback);

        Ok(MethodDescriptor {
            name,
            operation_id,
            method,
            path: path_template,
            paginated: is_paginated(&parameters),
            parameters,
            request_body,
            response,
            security,
            summary: op.summary.clone(),
            description: op.description.clone(),
            tags: op.tags.clone(),
            deprecated: op.deprecated.unwrap_or(false),
        })
    }

    /// The sanitized operationId and the method name it maps to.
    fn method_name(
        &self,
        path: &str,
        method: HttpMethod,
        op: &Operation,
    ) -> Result<(String, NormalizedName), SkipReason> {
        let operation_id = match op.operation_id.as_deref() {
            Some(raw_id) => sanitize_operation_id(raw_id)
                .ok_or_else(|| SkipReason::InvalidOperationId(raw_id.to_string()))?,
            None if self.options.derive_missing_operation_ids => {
                route_to_name(method.as_str(), path)
            }
            None => return Err(SkipReason::MissingOperationId),
        };

        let method_name = self
            .options
            .aliases
            .get(&operation_id)
            .and_then(|alias| sanitize_operation_id(alias))
            .unwrap_or_else(|| operation_id.clone());
        Ok((operation_id, normalize_name(&method_name)))
    }

    /// The declared request body, or one synthesized from a Swagger 2 body
    /// parameter.
    fn request_body(
        &self,
        op: &Operation,
        body_param: Option<&raw::Parameter>,
    ) -> Result<Option<RequestBody>, SkipReason> {
        match &op.request_body {
            Some(RequestBodyOrRef::RequestBody(body)) => return Ok(Some(body.clone())),
            Some(RequestBodyOrRef::Ref { ref_path }) => {
                return Err(SkipReason::UnresolvedReference(ref_path.clone()));
            }
            None => {}
        }
        let Some(param) = body_param else {
            return Ok(None);
        };

        let consumes: Vec<String> = if !op.consumes.is_empty() {
            op.consumes.clone()
        } else if !self.spec.consumes.is_empty() {
            self.spec.consumes.clone()
        } else {
            vec!["application/json".to_string()]
        };
        let content = consumes
            .into_iter()
            .map(|content_type| {
                let media = MediaType {
                    schema: param.schema.clone(),
                    ..MediaType::default()
                };
                (content_type, media)
            })
            .collect();
        Ok(Some(RequestBody {
            description: param.description.clone(),
            content,
            required: param.required.unwrap_or(false),
        }))
    }

    /// Surface descriptor details worth a caller's attention.
    fn report(
        &self,
        descriptor: &MethodDescriptor,
        pointer: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let security = &descriptor.security;
        if security.ignored_alternatives > 0 {
            issues.push(ValidationIssue::info(
                format!(
                    "{} alternative security requirement(s) ignored; only the first is used",
                    security.ignored_alternatives
                ),
                format!("{pointer}/security"),
            ));
        }
        for scheme in &security.unknown_schemes {
            issues.push(ValidationIssue::warning(
                format!("security scheme `{scheme}` is not declared"),
                format!("{pointer}/security"),
            ));
        }
        if let Some(body) = descriptor.request_body.as_ref().filter(|b| b.approximate) {
            issues.push(ValidationIssue::info(
                format!("`{}` body is encoded as JSON", body.content.selected),
                format!("{pointer}/requestBody"),
            ));
        }
    }

    async fn collect_imports(&self, descriptor: &MethodDescriptor, out: &mut CompiledSpec) {
        let body_model = descriptor
            .request_body
            .as_ref()
            .and_then(|body| match &body.payload {
                Payload::Model { type_name, .. } => Some(type_name),
                _ => None,
            });
        for type_name in body_model.into_iter().chain(descriptor.response.model.as_ref()) {
            if !self.resolver.is_model_type(type_name).await {
                continue;
            }
            if let Some(import) = self.resolver.get_import_path(type_name).await {
                out.imports.insert(import);
            }
        }
    }
}

/// Both a page-position and a page-size query parameter are present.
pub fn is_paginated(parameters: &ParameterSet) -> bool {
    has_query_param(parameters, &PAGE_PARAMS) && has_query_param(parameters, &LIMIT_PARAMS)
}

fn has_query_param(parameters: &ParameterSet, names: &[&str]) -> bool {
    parameters
        .query
        .iter()
        .any(|p| names.contains(&p.name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::resolver::NoopResolver;
    use crate::transform::params::build_parameter;

    fn query_params(names: &[&str]) -> ParameterSet {
        let mut set = ParameterSet::default();
        for name in names {
            let param: raw::Parameter = serde_yaml_ng::from_str(&format!(
                "{{name: {name}, in: query, schema: {{type: integer}}}}"
            ))
            .unwrap();
            set.push(build_parameter(&param, ParameterLocation::Query).unwrap());
        }
        set
    }

    #[test]
    fn test_pagination_needs_both_families() {
        assert!(is_paginated(&query_params(&["page", "limit"])));
        assert!(is_paginated(&query_params(&["offset", "per_page"])));
        assert!(is_paginated(&query_params(&["page", "page_size", "q"])));
        assert!(!is_paginated(&query_params(&["page"])));
        assert!(!is_paginated(&query_params(&["limit", "per_page"])));
        assert!(!is_paginated(&ParameterSet::default()));
    }

    #[tokio::test]
    async fn test_missing_paths_is_fatal() {
        let spec = parse::from_yaml("openapi: 3.0.0\ninfo: {title: t, version: '1'}\n").unwrap();
        let err = compile(&spec, &NoopResolver, &CompileOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingPaths));
    }

    #[tokio::test]
    async fn test_operation_ids_and_aliases() {
        let spec = parse::from_yaml(
            r#"
openapi: 3.0.0
info: {title: t, version: "1"}
paths:
  /users/{id}:
    parameters:
      - {name: id, in: path, required: true, schema: {type: string}}
    get:
      operationId: get-user
      responses: {"200": {description: ok}}
    delete:
      responses: {"204": {description: gone}}
    put:
      operationId: "***"
      responses: {"204": {description: gone}}
"#,
        )
        .unwrap();

        let out = compile(&spec, &NoopResolver, &CompileOptions::default())
            .await
            .unwrap();
        assert_eq!(out.methods.len(), 1);
        assert_eq!(out.methods[0].operation_id, "get_user");
        assert_eq!(out.methods[0].name.camel_case, "getUser");
        assert_eq!(
            out.skipped
                .iter()
                .map(|s| s.reason.clone())
                .collect::<Vec<_>>(),
            vec![
                SkipReason::MissingOperationId,
                SkipReason::InvalidOperationId("***".to_string())
            ]
        );
        assert_eq!(out.issues[0].spec_path, "#/paths/~1users~1{id}/delete");

        let options = CompileOptions {
            derive_missing_operation_ids: true,
            aliases: IndexMap::from([("get_user".to_string(), "fetchUser".to_string())]),
            ..CompileOptions::default()
        };
        let out = compile(&spec, &NoopResolver, &options).await.unwrap();
        let names: Vec<&str> = out.methods.iter().map(|m| m.name.original.as_str()).collect();
        assert_eq!(names, vec!["fetchUser", "deleteUser"]);
    }

    #[tokio::test]
    async fn test_request_body_method_rules() {
        let spec = parse::from_yaml(
            r#"
openapi: 3.0.0
info: {title: t, version: "1"}
paths:
  /items:
    get:
      operationId: listItems
      requestBody:
        content: {application/json: {schema: {type: object}}}
      responses: {"200": {description: ok}}
    post:
      operationId: createItem
      requestBody:
        required: true
        content: {}
      responses: {"201": {description: created}}
    put:
      operationId: replaceItems
      requestBody:
        content: {application/json: {schema: {type: object}}}
      responses: {"200": {description: ok}}
    patch:
      operationId: touchItems
      responses: {"200": {description: ok}}
"#,
        )
        .unwrap();

        let out = compile(&spec, &NoopResolver, &CompileOptions::default())
            .await
            .unwrap();
        let reasons: Vec<SkipReason> = out.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::RequestBodyNotAllowed(HttpMethod::Get),
                SkipReason::MissingRequestBody(HttpMethod::Post),
            ]
        );
        assert_eq!(out.methods.len(), 2);
        assert!(out.methods[0].request_body.is_some());
        assert!(out.methods[1].request_body.is_none());
    }

    #[tokio::test]
    async fn test_legacy_fallback() {
        let spec = parse::from_yaml(
            r#"
openapi: 3.0.0
info: {title: t, version: "1"}
paths:
  /ping:
    get:
      operationId: ping
      responses: {"204": {description: pong}}
    post:
      operationId: pingPublic
      security: []
      responses: {"204": {description: pong}}
"#,
        )
        .unwrap();

        let out = compile(&spec, &NoopResolver, &CompileOptions::default())
            .await
            .unwrap();
        assert_eq!(
            out.methods[0].security.instructions,
            vec![AuthInstruction::LegacyFallback {
                bearer: true,
                api_key_header: Some("X-API-Key".to_string()),
            }]
        );
        assert!(out.methods[1].security.is_empty());

        let options = CompileOptions {
            legacy_fallback: false,
            ..CompileOptions::default()
        };
        let out = compile(&spec, &NoopResolver, &options).await.unwrap();
        assert!(out.methods[0].security.is_empty());
    }
}
