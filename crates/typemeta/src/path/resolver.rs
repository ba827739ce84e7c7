// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dotted-path traversal and template expansion.

use super::format::format_integer;
use super::template::{self, Reference, Segment};
use crate::access::PropertyAccessor;
use crate::config::MetaConfig;
use crate::error::{MetaError, Result};
use crate::value::Value;
use crate::variables;
use std::fmt::Write;

/// One path segment: a property name and the list indexes applied to it.
#[derive(Debug, PartialEq, Eq)]
struct Step<'a> {
    name: &'a str,
    indexes: Vec<usize>,
}

/// Resolves `A.B[2].C` paths and expands `{Name}` / `$(Name)` templates
/// against any [`PropertyAccessor`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    date_time_format: String,
    max_depth: usize,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::from_config(&MetaConfig::default())
    }
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MetaConfig) -> Self {
        Self {
            date_time_format: config.date_time_format.clone(),
            max_depth: config.max_path_depth,
        }
    }

    /// Value at a dotted path.
    pub fn resolve_path(&self, root: &dyn PropertyAccessor, path: &str) -> Result<Value> {
        let steps = self.parse_path(path)?;
        let mut current: Option<Value> = None;

        for step in &steps {
            let value = match &current {
                None => root.get_property_value(step.name)?,
                Some(Value::Object(obj)) => obj.read().get_property_value(step.name)?,
                Some(other) => {
                    return Err(invalid(
                        path,
                        format!("cannot read '{}' from a {}", step.name, other.kind_name()),
                    ))
                }
            };
            current = Some(index_into(path, value, &step.indexes)?);
        }
        current.ok_or_else(|| invalid(path, "empty path"))
    }

    /// Like [`resolve_path`](Self::resolve_path), `None` on any failure.
    pub fn try_resolve(&self, root: &dyn PropertyAccessor, path: &str) -> Option<Value> {
        self.resolve_path(root, path).ok()
    }

    /// Write the value at a dotted path. The last segment cannot be indexed.
    pub fn set_path(
        &self,
        root: &mut dyn PropertyAccessor,
        path: &str,
        value: Value,
    ) -> Result<()> {
        let steps = self.parse_path(path)?;
        let Some((last, parents)) = steps.split_last() else {
            return Err(invalid(path, "empty path"));
        };
        if !last.indexes.is_empty() {
            return Err(invalid(path, "cannot assign through an index"));
        }

        let Some((first, rest)) = parents.split_first() else {
            return root.set_property_value(last.name, value);
        };
        let mut current = index_into(path, root.get_property_value(first.name)?, &first.indexes)?;
        for step in rest {
            let next = match &current {
                Value::Object(obj) => obj.read().get_property_value(step.name)?,
                other => {
                    return Err(invalid(
                        path,
                        format!("cannot read '{}' from a {}", step.name, other.kind_name()),
                    ))
                }
            };
            current = index_into(path, next, &step.indexes)?;
        }

        match current {
            Value::Object(obj) => obj.write().set_property_value(last.name, value),
            other => Err(invalid(
                path,
                format!("cannot write '{}' on a {}", last.name, other.kind_name()),
            )),
        }
    }

    /// Expand every reference of a template.
    ///
    /// A reference resolves against the object path first, then, for a plain
    /// name, against the variable vocabulary. Unresolved references are kept
    /// verbatim. Format specifiers only apply to integer values.
    pub fn expand(&self, root: &dyn PropertyAccessor, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        for segment in template::parse(template) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Reference(reference) => match self.lookup(root, &reference) {
                    Some(value) => out.push_str(&self.render(&value, reference.format)),
                    None => {
                        log::trace!("[typemeta] unresolved reference '{}'", reference.raw);
                        out.push_str(reference.raw);
                    }
                },
            }
        }
        out
    }

    /// Names referenced by a template, in order of appearance.
    pub fn references(template: &str) -> Vec<&str> {
        template::references(template)
            .into_iter()
            .map(|reference| reference.name)
            .collect()
    }

    /// Render a value the way [`expand`](Self::expand) does.
    pub fn render(&self, value: &Value, format: Option<&str>) -> String {
        match (value, format) {
            (Value::DateTime(dt), _) => {
                let mut out = String::new();
                if write!(out, "{}", dt.format(&self.date_time_format)).is_err() {
                    return dt.to_rfc3339();
                }
                out
            }
            (value, Some(spec)) => value
                .as_i128()
                .and_then(|v| format_integer(v, spec))
                .unwrap_or_else(|| value.to_string()),
            (value, None) => value.to_string(),
        }
    }

    fn lookup(&self, root: &dyn PropertyAccessor, reference: &Reference<'_>) -> Option<Value> {
        match self.resolve_path(root, reference.name) {
            Ok(value) => Some(value),
            Err(_) if is_plain_name(reference.name) => variables::lookup(reference.name),
            Err(_) => None,
        }
    }

    fn parse_path<'a>(&self, path: &'a str) -> Result<Vec<Step<'a>>> {
        let steps = path
            .split('.')
            .map(|segment| parse_step(path, segment))
            .collect::<Result<Vec<_>>>()?;
        if steps.len() > self.max_depth {
            return Err(invalid(
                path,
                format!("more than {} segments", self.max_depth),
            ));
        }
        Ok(steps)
    }
}

fn parse_step<'a>(path: &str, segment: &'a str) -> Result<Step<'a>> {
    let segment = segment.trim();
    let (name, mut rest) = match segment.find('[') {
        Some(open) => (&segment[..open], &segment[open..]),
        None => (segment, ""),
    };
    if name.is_empty() {
        return Err(invalid(path, "empty segment"));
    }

    let mut indexes = Vec::new();
    while !rest.is_empty() {
        let close = rest
            .find(']')
            .filter(|_| rest.starts_with('['))
            .ok_or_else(|| invalid(path, format!("malformed index in '{}'", segment)))?;
        let index = rest[1..close]
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid(path, format!("bad index in '{}'", segment)))?;
        indexes.push(index);
        rest = &rest[close + 1..];
    }
    Ok(Step { name, indexes })
}

fn index_into(path: &str, mut value: Value, indexes: &[usize]) -> Result<Value> {
    for &index in indexes {
        value = match value {
            Value::List(mut items) => {
                if index >= items.len() {
                    return Err(invalid(
                        path,
                        format!("index {} out of range ({} items)", index, items.len()),
                    ));
                }
                items.swap_remove(index)
            }
            other => {
                return Err(invalid(
                    path,
                    format!("cannot index a {}", other.kind_name()),
                ))
            }
        };
    }
    Ok(value)
}

fn is_plain_name(name: &str) -> bool {
    !name.contains(['.', '['])
}

fn invalid(path: &str, reason: impl Into<String>) -> MetaError {
    MetaError::InvalidPath {
        path: path.to_string(),
        reason: reason.into(),
    }
}
