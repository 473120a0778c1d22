//! Placeholder-JSON rendering of a [`Ty`], annotated with field docs.
//!
//! Every value gets a type-appropriate placeholder (`false`, `0`, `0.0`, `""`),
//! maps and sequences show a single representative entry, and struct fields get a
//! trailing `/* ... */` comment built from their [`TagInfo`]. The result is JSON
//! apart from those comments.
use log::{debug, trace};

use crate::describe::Describe;
use crate::error::TemplateError;
use crate::ir::{StructTy, Ty};
use crate::tags::TagInfo;

#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Renders the template of a struct type (pointers and interfaces to one are fine).
pub fn render_template(ty: &Ty, options: &TemplateOptions) -> Result<String, TemplateError> {
    let Ty::Struct(root) = ty.concrete() else {
        return Err(TemplateError::NotAStruct { ty: ty.type_name() });
    };
    let mut buf = String::new();
    render_struct(&mut buf, root, 0, None, options)?;
    Ok(buf)
}

/// [`render_template`] for a registered type, with default options.
pub fn template_for<T: Describe>() -> Result<String, TemplateError> {
    render_template(&T::describe(), &TemplateOptions::default())
}

/// Writes the placeholder for a value of type `ty` at nesting `level`.
pub fn render_type(buf: &mut String, ty: &Ty, level: usize, options: &TemplateOptions) -> Result<(), TemplateError> {
    let ty = ty.concrete();
    trace!("{}: kind={}", ty.type_name(), ty.kind());
    match ty {
        Ty::Bool => buf.push_str("false"),
        Ty::Int | Ty::Uint => buf.push('0'),
        Ty::Float => buf.push_str("0.0"),
        Ty::String => buf.push_str("\"\""),
        Ty::Struct(st) => render_struct(buf, st, level + 1, None, options)?,
        Ty::Map { key, value } => {
            buf.push('{');
            render_type(buf, key, level, options).map_err(|source| TemplateError::MapKey {
                kind: key.kind(),
                source: Box::new(source),
            })?;
            buf.push(':');
            render_type(buf, value, level, options).map_err(|source| TemplateError::MapValue {
                kind: value.kind(),
                source: Box::new(source),
            })?;
            buf.push('}');
        }
        Ty::Slice { elem } | Ty::Array { elem, .. } => {
            buf.push('[');
            render_type(buf, elem, level, options).map_err(|source| TemplateError::Element {
                kind: elem.kind(),
                source: Box::new(source),
            })?;
            buf.push(']');
        }
        other => return Err(TemplateError::UnsupportedKind { kind: other.kind() }),
    }
    Ok(())
}

/// One line inside a pair of braces, after embedded structs are flattened.
#[derive(Debug)]
enum Entry {
    Field {
        key: String,
        value: String,
        comment: Option<String>,
    },
    // doc of an embedded field, on a line of its own
    Note(String),
}

/// Writes `st` as a braced object at nesting `level`. `inherited` is the
/// baseline every field's metadata starts from.
pub fn render_struct(
    buf: &mut String,
    st: &StructTy,
    level: usize,
    inherited: Option<&TagInfo>,
    options: &TemplateOptions,
) -> Result<(), TemplateError> {
    let mut entries = Vec::new();
    collect_entries(st, level, inherited, options, &mut entries)?;

    let prefix = " ".repeat(level * options.indent_width);
    let field_prefix = " ".repeat((level + 1) * options.indent_width);
    // no comma may precede the closing brace
    let last_keyed = entries.iter().rposition(|e| matches!(e, Entry::Field { .. }));

    buf.push_str("{\n");
    for (i, entry) in entries.iter().enumerate() {
        buf.push_str(&field_prefix);
        match entry {
            Entry::Field { key, value, comment } => {
                buf.push_str(&format!("{}: {value}", quote(key)));
                if Some(i) != last_keyed {
                    buf.push(',');
                }
                if let Some(comment) = comment {
                    buf.push_str(&format!(" /* {comment} */"));
                }
            }
            Entry::Note(comment) => buf.push_str(&format!("/* {comment} */")),
        }
        buf.push('\n');
    }
    buf.push_str(&prefix);
    buf.push('}');
    Ok(())
}

fn collect_entries(
    st: &StructTy,
    level: usize,
    inherited: Option<&TagInfo>,
    options: &TemplateOptions,
    entries: &mut Vec<Entry>,
) -> Result<(), TemplateError> {
    let ty_name = st.type_name();
    for (index, field) in st.fields.iter().enumerate() {
        if !field.is_visible() {
            debug!("non-exported field {}.{} skipped", ty_name, field.name);
            continue;
        }
        let mut info = inherited.cloned().unwrap_or_default();
        info.parse(&field.tags, st).map_err(|source| TemplateError::Tag {
            field: field.name.clone(),
            source: Box::new(source),
        })?;
        let wrap = |source: TemplateError| TemplateError::Field {
            ty: ty_name.clone(),
            index,
            field: field.name.clone(),
            source: Box::new(source),
        };

        if field.embedded {
            let Ty::Struct(inner) = field.ty.concrete() else {
                return Err(wrap(TemplateError::NotAStruct { ty: field.ty.type_name() }));
            };
            collect_entries(inner, level, Some(&info), options, entries).map_err(wrap)?;
            if let Some(comment) = info.comment() {
                entries.push(Entry::Note(comment));
            }
            continue;
        }

        let value = match &info.default {
            Some(default) => default.clone(),
            None => {
                let mut value = String::new();
                render_type(&mut value, &field.ty, level, options).map_err(wrap)?;
                value
            }
        };
        entries.push(Entry::Field {
            key: field.name.clone(),
            value,
            comment: info.comment(),
        });
    }
    Ok(())
}

fn quote(key: &str) -> String {
    serde_json::Value::from(key).to_string()
}
