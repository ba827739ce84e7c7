// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Template scanner.
//!
//! Splits a template into literal text and references. A reference is
//! `{Name}` or `$(Name)`, optionally followed by `:format` inside the
//! delimiters. References do not nest: a body containing another opening
//! delimiter is not a reference.

/// Delimiter pair of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStyle {
    /// `{Name}`
    Brace,
    /// `$(Name)`
    Dollar,
}

impl ReferenceStyle {
    fn open(&self) -> &'static str {
        match self {
            Self::Brace => "{",
            Self::Dollar => "$(",
        }
    }

    fn close(&self) -> char {
        match self {
            Self::Brace => '}',
            Self::Dollar => ')',
        }
    }
}

/// One reference found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub style: ReferenceStyle,
    /// Property path or variable name.
    pub name: &'a str,
    /// Text after the first `:`, if any.
    pub format: Option<&'a str>,
    /// The reference exactly as written, delimiters included.
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Reference(Reference<'a>),
}

/// Split a template into segments.
pub fn parse(template: &str) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let style = match bytes[i] {
            b'{' => Some(ReferenceStyle::Brace),
            b'$' if bytes.get(i + 1) == Some(&b'(') => Some(ReferenceStyle::Dollar),
            _ => None,
        };
        if let Some(reference) = style.and_then(|style| scan_reference(template, i, style)) {
            if literal_start < i {
                segments.push(Segment::Literal(&template[literal_start..i]));
            }
            i += reference.raw.len();
            literal_start = i;
            segments.push(Segment::Reference(reference));
            continue;
        }
        i += 1;
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

/// References of a template, in order of appearance.
pub fn references(template: &str) -> Vec<Reference<'_>> {
    parse(template)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Reference(reference) => Some(reference),
            Segment::Literal(_) => None,
        })
        .collect()
}

fn scan_reference(template: &str, start: usize, style: ReferenceStyle) -> Option<Reference<'_>> {
    let body_start = start + style.open().len();
    let rest = &template[body_start..];
    let end = rest.find(style.close())?;
    let body = &rest[..end];
    if body.contains('{') || body.contains("$(") {
        return None;
    }

    let (name, format) = match body.split_once(':') {
        Some((name, format)) => (name.trim(), Some(format.trim())),
        None => (body.trim(), None),
    };
    if name.is_empty() {
        return None;
    }
    Some(Reference {
        style,
        name,
        format: format.filter(|f| !f.is_empty()),
        raw: &template[start..body_start + end + 1],
    })
}
