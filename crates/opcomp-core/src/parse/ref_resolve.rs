use std::collections::HashSet;

use super::operation::{Operation, PathItem};
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Header, HeaderOrRef, Response, ResponseOrRef};
use super::schema::{Schema, SchemaOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// Inlines `$ref` parameters, request bodies, responses and headers, plus
/// the schemas of parameters.
///
/// Request body and response schemas keep their `$ref` so the compiler can
/// hand them to the models resolver. Anything that cannot be resolved is
/// left as a reference; the operation using it is skipped later.
pub struct RefResolver<'a> {
    spec: &'a OpenApiSpec,
    visited: HashSet<String>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            spec,
            visited: HashSet::new(),
        }
    }

    /// Return a copy of the document with every resolvable reference inlined.
    pub fn resolve_spec(&mut self) -> OpenApiSpec {
        let mut resolved = self.spec.clone();
        if let Some(ref mut paths) = resolved.paths {
            for item in paths.values_mut() {
                self.resolve_path_item(item);
            }
        }
        resolved
    }

    fn resolve_path_item(&mut self, item: &mut PathItem) {
        item.parameters = item
            .parameters
            .iter()
            .map(|p| self.resolve_parameter_or_ref(p))
            .collect();
        for op in item.operations.values_mut() {
            self.resolve_operation(op);
        }
    }

    fn resolve_operation(&mut self, op: &mut Operation) {
        op.parameters = op
            .parameters
            .iter()
            .map(|p| self.resolve_parameter_or_ref(p))
            .collect();

        if let Some(ref body) = op.request_body {
            op.request_body = Some(self.resolve_request_body_or_ref(body));
        }

        for resp in op.responses.values_mut() {
            *resp = self.resolve_response_or_ref(resp);
        }
    }

    pub fn resolve_parameter_or_ref(&mut self, param: &ParameterOrRef) -> ParameterOrRef {
        let param = match param {
            ParameterOrRef::Ref { ref_path } => match self.lookup_parameter(ref_path) {
                Ok(p) => p,
                Err(e) => {
                    log::debug!("leaving parameter reference in place: {e}");
                    return param.clone();
                }
            },
            ParameterOrRef::Parameter(p) => p.clone(),
        };
        let mut resolved = param;
        // Body schemas keep their `$ref` for the models resolver.
        if resolved.location.is_body() {
            return ParameterOrRef::Parameter(resolved);
        }
        if let Some(ref s) = resolved.schema {
            resolved.schema = Some(self.inline_schema(s));
        }
        if let Some(ref items) = resolved.items {
            resolved.items = Some(Box::new(self.inline_schema(items)));
        }
        ParameterOrRef::Parameter(resolved)
    }

    /// Replace schema references with their targets, recursively. Cycles
    /// stop at the first revisit and stay as references.
    pub fn inline_schema(&mut self, schema_or_ref: &SchemaOrRef) -> SchemaOrRef {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => {
                if self.visited.contains(ref_path) {
                    return schema_or_ref.clone();
                }
                let Ok(target) = self.lookup_schema(ref_path) else {
                    return schema_or_ref.clone();
                };
                self.visited.insert(ref_path.clone());
                let result = self.inline_schema(&SchemaOrRef::Schema(Box::new(target)));
                self.visited.remove(ref_path);
                result
            }
            SchemaOrRef::Schema(schema) => {
                let mut resolved = schema.as_ref().clone();
                for prop in resolved.properties.values_mut() {
                    *prop = self.inline_schema(prop);
                }
                if let Some(ref items) = schema.items {
                    resolved.items = Some(Box::new(self.inline_schema(items)));
                }
                SchemaOrRef::Schema(Box::new(resolved))
            }
        }
    }

    fn resolve_request_body_or_ref(&mut self, body: &RequestBodyOrRef) -> RequestBodyOrRef {
        match body {
            RequestBodyOrRef::Ref { ref_path } => match self.lookup_request_body(ref_path) {
                Ok(rb) => RequestBodyOrRef::RequestBody(rb),
                Err(e) => {
                    log::debug!("leaving request body reference in place: {e}");
                    body.clone()
                }
            },
            RequestBodyOrRef::RequestBody(_) => body.clone(),
        }
    }

    fn resolve_response_or_ref(&mut self, resp: &ResponseOrRef) -> ResponseOrRef {
        let mut response = match resp {
            ResponseOrRef::Ref { ref_path } => match self.lookup_response(ref_path) {
                Ok(r) => r,
                Err(e) => {
                    log::debug!("leaving response reference in place: {e}");
                    return resp.clone();
                }
            },
            ResponseOrRef::Response(r) => r.clone(),
        };
        for header in response.headers.values_mut() {
            if let HeaderOrRef::Ref { ref_path } = header {
                if let Ok(h) = self.lookup_header(ref_path) {
                    *header = HeaderOrRef::Header(h);
                }
            }
            if let HeaderOrRef::Header(h) = header {
                if let Some(ref s) = h.schema {
                    h.schema = Some(self.inline_schema(s));
                }
            }
        }
        ResponseOrRef::Response(response)
    }

    // Lookup helpers

    fn lookup_schema(&self, ref_path: &str) -> Result<Schema, ResolveError> {
        let name = parse_ref_name(ref_path, "schemas")?;
        self.spec
            .schema_definitions()
            .get(name)
            .and_then(|s| match s {
                SchemaOrRef::Schema(schema) => Some(schema.as_ref().clone()),
                SchemaOrRef::Ref { ref_path: inner } => {
                    // One transitive hop only
                    let inner_name = parse_ref_name(inner, "schemas").ok()?;
                    self.spec
                        .schema_definitions()
                        .get(inner_name)
                        .and_then(|s2| s2.as_schema().cloned())
                }
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_parameter(&self, ref_path: &str) -> Result<Parameter, ResolveError> {
        let name = parse_ref_name(ref_path, "parameters")?;
        let table = match self.spec.components {
            Some(ref c) if !self.spec.is_swagger2() => &c.parameters,
            _ => &self.spec.parameters,
        };
        table
            .get(name)
            .and_then(|p| match p {
                ParameterOrRef::Parameter(param) => Some(param.clone()),
                ParameterOrRef::Ref { .. } => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_request_body(&self, ref_path: &str) -> Result<RequestBody, ResolveError> {
        let name = parse_ref_name(ref_path, "requestBodies")?;
        self.spec
            .components
            .as_ref()
            .and_then(|c| c.request_bodies.get(name))
            .and_then(|rb| match rb {
                RequestBodyOrRef::RequestBody(body) => Some(body.clone()),
                RequestBodyOrRef::Ref { .. } => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_response(&self, ref_path: &str) -> Result<Response, ResolveError> {
        let name = parse_ref_name(ref_path, "responses")?;
        let table = match self.spec.components {
            Some(ref c) if !self.spec.is_swagger2() => &c.responses,
            _ => &self.spec.responses,
        };
        table
            .get(name)
            .and_then(|r| match r {
                ResponseOrRef::Response(resp) => Some(resp.clone()),
                ResponseOrRef::Ref { .. } => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_header(&self, ref_path: &str) -> Result<Header, ResolveError> {
        let name = parse_ref_name(ref_path, "headers")?;
        self.spec
            .components
            .as_ref()
            .and_then(|c| c.headers.get(name))
            .and_then(|h| match h {
                HeaderOrRef::Header(header) => Some(header.clone()),
                HeaderOrRef::Ref { .. } => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }
}

/// Parse a local `$ref` such as `#/components/schemas/Foo` (OpenAPI 3) or
/// `#/definitions/Foo` (Swagger 2) and extract the component name.
///
/// `expected_section` uses OpenAPI 3 names; `schemas` also accepts the
/// Swagger 2 `definitions` section.
pub fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .or_else(|| ref_path.strip_prefix("#/"))
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let matches = section == expected_section
        || (expected_section == "schemas" && section == "definitions");
    if !matches || name.is_empty() || name.contains('/') {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}
