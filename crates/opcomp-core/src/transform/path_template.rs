use std::collections::HashSet;

use crate::error::SkipReason;
use crate::ir::{Parameter, PathSegment, PathTemplate};

/// `{name}` placeholders in a path, in order. An unclosed `{` is literal text.
pub fn placeholders(path: &str) -> Vec<&str> {
    split(path)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Slot(name) => Some(name),
            Piece::Literal(_) => None,
        })
        .collect()
}

enum Piece<'a> {
    Literal(&'a str),
    Slot(&'a str),
}

fn split(path: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        if open > 0 {
            pieces.push(Piece::Literal(&rest[..open]));
        }
        pieces.push(Piece::Slot(&rest[open + 1..close]));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    pieces
}

/// Build the template for `path`, binding every placeholder to one of the
/// operation's path parameters.
///
/// Each placeholder must appear once and have a declared parameter, and
/// every declared path parameter must have a placeholder.
pub fn build_path_template(
    path: &str,
    path_params: &[Parameter],
) -> Result<PathTemplate, SkipReason> {
    let mut seen = HashSet::new();
    let mut segments = Vec::new();

    for piece in split(path) {
        match piece {
            Piece::Literal(text) => segments.push(PathSegment::Literal {
                text: text.to_string(),
            }),
            Piece::Slot(name) => {
                if !seen.insert(name) {
                    return Err(SkipReason::DuplicatePathPlaceholder(name.to_string()));
                }
                let param = path_params
                    .iter()
                    .find(|p| p.name == name)
                    .ok_or_else(|| SkipReason::UndeclaredPathPlaceholder(name.to_string()))?;
                segments.push(PathSegment::Slot {
                    param: param.name.clone(),
                    ident: param.ident.clone(),
                });
            }
        }
    }

    if let Some(unused) = path_params.iter().find(|p| !seen.contains(p.name.as_str())) {
        return Err(SkipReason::UnusedPathParameter(unused.name.clone()));
    }

    Ok(PathTemplate {
        raw: path.to_string(),
        segments,
    })
}
