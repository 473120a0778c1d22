//! Documented JSON templates from a typed schema.
//!
//! A schema is described once as a [`Ty`] tree (usually through [`Describe`]),
//! with per-field [`Tags`] carrying docs, defaults, flags and enum bindings.
//! [`render_template`] turns it into a JSON-shaped document where every value is
//! a placeholder and every field is annotated with a `/* ... */` comment.
pub mod catalog;
pub mod describe;
pub mod error;
pub mod ir;
pub mod render;
pub mod tags;

pub use describe::{Describe, EnumStrings};
pub use error::TemplateError;
pub use ir::{Field, Kind, NamedTy, StructTy, Ty};
pub use render::{render_template, template_for, TemplateOptions};
pub use tags::{TagInfo, Tags};
