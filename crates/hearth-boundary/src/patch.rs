//! Targeted edits to dictionary text, anchored on parsed spans.
//!
//! Every operation reparses the current text, computes the minimal set of
//! splices and applies them. Unrelated text, comments and directives come
//! out byte-identical.

use std::ops::Range;
use std::path::Path;

use hearth_core::{ParseError, Value};

use crate::parse::{self, Literal};
use crate::variant::BoundaryVariant;

enum Splice {
    Replace(Range<usize>, String),
    Insert(usize, String),
    Delete(Range<usize>),
}

impl Splice {
    fn start(&self) -> usize {
        match self {
            Splice::Replace(r, _) | Splice::Delete(r) => r.start,
            Splice::Insert(at, _) => *at,
        }
    }
}

fn apply(src: &str, mut splices: Vec<Splice>) -> String {
    // Spans never overlap, so applying back to front keeps them valid.
    splices.sort_by_key(|s| std::cmp::Reverse(s.start()));
    let mut out = src.to_string();
    for splice in splices {
        match splice {
            Splice::Replace(r, text) => out.replace_range(r, &text),
            Splice::Insert(at, text) => out.insert_str(at, &text),
            Splice::Delete(r) => out.replace_range(r, ""),
        }
    }
    out
}

/// Insert an `internalField` clause just before `boundaryField`.
pub(crate) fn add_internal_field(
    src: &str,
    path: &Path,
    value: &Value,
    uniform: bool,
) -> Result<String, ParseError> {
    let parsed = parse::parse(src, path)?;
    let prefix = if uniform { "uniform " } else { "" };
    let clause = format!("internalField {prefix}{value};\n\n");
    Ok(apply(
        src,
        vec![Splice::Insert(parsed.boundary_keyword, clause)],
    ))
}

/// Rewrite the existing `internalField` literal in place.
pub(crate) fn update_internal_field(
    src: &str,
    path: &Path,
    value: &Value,
    uniform: bool,
) -> Result<String, ParseError> {
    let parsed = parse::parse(src, path)?;
    let internal = parsed
        .internal
        .as_ref()
        .ok_or_else(|| ParseError::MissingInternalField {
            path: path.to_path_buf(),
        })?;
    let mut splices = Vec::new();
    rewrite_literal(
        &mut splices,
        &internal.value,
        internal.uniform.clone(),
        internal.value_start,
        value,
        uniform,
    );
    Ok(apply(src, splices))
}

/// Insert a rendered boundary block right after `boundaryField {`.
pub(crate) fn add_boundary(
    src: &str,
    path: &Path,
    name: &str,
    variant: &BoundaryVariant,
) -> Result<String, ParseError> {
    let parsed = parse::parse(src, path)?;
    let block = format!("\n    {name}\n{}\n", variant.render(4));
    Ok(apply(
        src,
        vec![Splice::Insert(parsed.after_boundary_open, block)],
    ))
}

/// Delete the named block.
pub(crate) fn remove_boundary(src: &str, path: &Path, name: &str) -> Result<String, ParseError> {
    let parsed = parse::parse(src, path)?;
    let block = parsed
        .blocks
        .get(name)
        .ok_or_else(|| ParseError::MissingBoundary {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;
    Ok(apply(src, vec![Splice::Delete(block.span.clone())]))
}

/// Rewrite the value tokens of the named block to the variant's current
/// parameters. Entries the variant has no value for stay untouched, and
/// entries not present in the file are not added.
pub(crate) fn update_boundary(
    src: &str,
    path: &Path,
    name: &str,
    variant: &BoundaryVariant,
) -> Result<String, ParseError> {
    let parsed = parse::parse(src, path)?;
    let block = parsed
        .blocks
        .get(name)
        .ok_or_else(|| ParseError::MissingBoundary {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;
    let mut splices = Vec::new();
    for (key, entry) in &block.entries {
        let Some(value) = variant.get(key) else {
            continue;
        };
        rewrite_literal(
            &mut splices,
            &entry.value,
            entry.uniform.clone(),
            entry.value_start,
            value,
            variant.is_uniform(key),
        );
    }
    Ok(apply(src, splices))
}

/// Splices for one literal: replace the value text and toggle `uniform`.
fn rewrite_literal(
    splices: &mut Vec<Splice>,
    literal: &Literal,
    uniform_span: Option<Range<usize>>,
    value_start: usize,
    value: &Value,
    uniform: bool,
) {
    match literal {
        Literal::Token { span, .. } => {
            splices.push(Splice::Replace(span.clone(), value.to_string()));
            match (uniform_span, uniform) {
                (Some(span), false) => splices.push(Splice::Delete(span)),
                (None, true) => splices.push(Splice::Insert(value_start, "uniform ".to_string())),
                _ => {}
            }
        }
        // A list literal has no uniform keyword; every entry gets the new
        // representative value.
        Literal::List { entries, .. } => {
            for entry in entries {
                splices.push(Splice::Replace(entry.clone(), value.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "\
dimensions      [0 0 0 1 0 0 0];

internalField   uniform 293.15;

boundaryField
{
    #includeEtc \"caseDicts/setConstraintTypes\"

    heater
    {
        type            fixedValue;
        value           uniform 293.15;
    }
}
";

    fn path() -> &'static Path {
        Path::new("T")
    }

    #[test]
    fn update_internal_replaces_only_the_literal() {
        let out = update_internal_field(SRC, path(), &Value::Scalar(300.0), true).unwrap();
        assert!(out.contains("internalField   uniform 300;"));
        // Everything else is untouched.
        assert!(out.contains("#includeEtc"));
        assert!(out.contains("value           uniform 293.15;"));
    }

    #[test]
    fn update_internal_drops_the_uniform_keyword() {
        let out = update_internal_field(SRC, path(), &Value::Word("$ref".into()), false).unwrap();
        assert!(out.contains("internalField   $ref;"));
        assert!(!out.contains("internalField   uniform"));
    }

    #[test]
    fn add_internal_lands_before_boundary_field() {
        let src = "dimensions      [0 0 0 1 0 0 0];\n\nboundaryField\n{\n}\n";
        let out = add_internal_field(src, path(), &Value::Scalar(290.0), true).unwrap();
        let internal = out.find("internalField").unwrap();
        let boundary = out.find("boundaryField").unwrap();
        assert!(internal < boundary);
        assert!(out.contains("internalField uniform 290;"));
    }

    #[test]
    fn add_then_remove_boundary_round_trips() {
        let mut v = BoundaryVariant::new("fixedValue").unwrap();
        v.set("value", 310.0).unwrap();
        v.set_uniform("value", true).unwrap();
        let added = add_boundary(SRC, path(), "window", &v).unwrap();
        assert!(added.contains("window"));
        assert!(added.contains("uniform 310;"));
        let removed = remove_boundary(&added, path(), "window").unwrap();
        assert_eq!(removed, SRC);
    }

    #[test]
    fn remove_missing_boundary_is_an_error() {
        assert!(matches!(
            remove_boundary(SRC, path(), "window"),
            Err(ParseError::MissingBoundary { .. })
        ));
    }

    #[test]
    fn update_boundary_rewrites_only_changed_tokens() {
        let mut v = BoundaryVariant::new("fixedValue").unwrap();
        v.set("value", 305.0).unwrap();
        v.set_uniform("value", true).unwrap();
        let out = update_boundary(SRC, path(), "heater", &v).unwrap();
        assert!(out.contains("value           uniform 305;"));
        assert!(out.contains("internalField   uniform 293.15;"));
    }

    #[test]
    fn update_list_literal_rewrites_every_entry() {
        let src = "\
internalField   nonuniform List<scalar>
2
(
291.0
292.0
)
;

boundaryField
{
}
";
        let out = update_internal_field(src, path(), &Value::Scalar(295.0), false).unwrap();
        assert_eq!(out.matches("295").count(), 2);
        assert!(!out.contains("291"));
    }
}
