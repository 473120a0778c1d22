// Closed type description the renderer walks. Built once per schema via `Describe`.
use std::fmt;

use serde::{Serialize, Serializer};

use crate::describe::{enum_strings_of, EnumStrings};
use crate::tags::Tags;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ty {
    Bool,
    Int,                     // any signed width
    Uint,                    // any unsigned width
    Float,                   // f32 / f64
    String,
    Struct(StructTy),
    Map {
        key: Box<Ty>,
        value: Box<Ty>,
    },
    Slice {
        elem: Box<Ty>,
    },
    Array {
        elem: Box<Ty>,
        len: usize,
    },
    Pointer {
        target: Box<Ty>,     // nil-able; only the static type matters here
    },
    Interface {
        name: String,
        implementation: Box<Ty>,
    },
    Named(NamedTy),
    Opaque {
        kind: Kind,          // describable, never renderable
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StructTy {
    pub name: String,
    pub fields: Vec<Field>,  // declaration order is output order
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    pub embedded: bool,      // flattened into the parent, no key of its own
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

/// A user-named type over some underlying representation, optionally carrying
/// the ordered display strings of an enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct NamedTy {
    pub name: String,
    pub underlying: Box<Ty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_enum: Option<EnumSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_enum: Option<EnumSource>,
}

/// Produces the display strings of an enumerated type from its zero value.
#[derive(Clone, Copy)]
pub struct EnumSource(pub fn() -> Vec<String>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Struct,
    Map,
    Slice,
    Array,
    Ptr,
    Interface,
    Func,
    Chan,
    Complex64,
    Complex128,
    UnsafePointer,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl Ty {
    pub fn structure(name: impl Into<String>) -> StructTy {
        StructTy { name: name.into(), fields: Vec::new() }
    }

    pub fn named(name: impl Into<String>, underlying: impl Into<Ty>) -> NamedTy {
        NamedTy {
            name: name.into(),
            underlying: Box::new(underlying.into()),
            value_enum: None,
            pointer_enum: None,
        }
    }

    pub fn map(key: impl Into<Ty>, value: impl Into<Ty>) -> Ty {
        Ty::Map { key: Box::new(key.into()), value: Box::new(value.into()) }
    }

    pub fn slice(elem: impl Into<Ty>) -> Ty {
        Ty::Slice { elem: Box::new(elem.into()) }
    }

    pub fn array(elem: impl Into<Ty>, len: usize) -> Ty {
        Ty::Array { elem: Box::new(elem.into()), len }
    }

    pub fn pointer(target: impl Into<Ty>) -> Ty {
        Ty::Pointer { target: Box::new(target.into()) }
    }

    pub fn interface(name: impl Into<String>, implementation: impl Into<Ty>) -> Ty {
        Ty::Interface { name: name.into(), implementation: Box::new(implementation.into()) }
    }

    pub fn opaque(kind: Kind) -> Ty {
        Ty::Opaque { kind }
    }
}

impl StructTy {
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<Ty>, tags: impl Into<Tags>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty: ty.into(),
            embedded: false,
            tags: tags.into(),
        });
        self
    }

    /// Embeds `ty`; the field takes the name of the embedded type.
    pub fn embed(mut self, ty: impl Into<Ty>, tags: impl Into<Tags>) -> Self {
        let ty = ty.into();
        let name = ty.strip_indirection().type_name();
        self.fields.push(Field { name, ty, embedded: true, tags: tags.into() });
        self
    }

    /// Looks a field up by name, hidden ones included. Fields promoted from
    /// embedded structs are searched one embedding depth at a time; the
    /// shallowest match wins, declaration order breaks ties.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        let mut depth: Vec<&StructTy> = vec![self];
        while !depth.is_empty() {
            let found = depth
                .iter()
                .copied()
                .find_map(|st| st.fields.iter().find(|f| f.name == name));
            if found.is_some() {
                return found;
            }
            depth = depth
                .iter()
                .copied()
                .flat_map(|st| st.fields.iter().filter(|f| f.embedded))
                .filter_map(|f| match f.ty.concrete() {
                    Ty::Struct(inner) => Some(inner),
                    _ => None,
                })
                .collect();
        }
        None
    }
}

impl NamedTy {
    pub fn with_enum<T: EnumStrings>(mut self) -> Self {
        self.value_enum = Some(EnumSource(enum_strings_of::<T>));
        self
    }

    /// Registers the enumeration on the pointer form of the type only.
    pub fn with_pointer_enum<T: EnumStrings>(mut self) -> Self {
        self.pointer_enum = Some(EnumSource(enum_strings_of::<T>));
        self
    }
}

impl From<StructTy> for Ty {
    fn from(s: StructTy) -> Self {
        Ty::Struct(s)
    }
}

impl From<NamedTy> for Ty {
    fn from(n: NamedTy) -> Self {
        Ty::Named(n)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INSPECTION
// ————————————————————————————————————————————————————————————————————————————

impl Ty {
    /// Peels pointer and interface layers: the declared type becomes the type
    /// whose shape gets rendered. Named types are kept.
    pub fn strip_indirection(&self) -> &Ty {
        let mut ty = self;
        loop {
            match ty {
                Ty::Pointer { target } => ty = target,
                Ty::Interface { implementation, .. } => ty = implementation,
                _ => return ty,
            }
        }
    }

    /// Like [`Ty::strip_indirection`] but also looks through named types.
    pub fn concrete(&self) -> &Ty {
        let mut ty = self.strip_indirection();
        while let Ty::Named(named) = ty {
            ty = named.underlying.strip_indirection();
        }
        ty
    }

    pub fn kind(&self) -> Kind {
        match self {
            Ty::Bool => Kind::Bool,
            Ty::Int => Kind::Int,
            Ty::Uint => Kind::Uint,
            Ty::Float => Kind::Float,
            Ty::String => Kind::String,
            Ty::Struct(_) => Kind::Struct,
            Ty::Map { .. } => Kind::Map,
            Ty::Slice { .. } => Kind::Slice,
            Ty::Array { .. } => Kind::Array,
            Ty::Pointer { .. } => Kind::Ptr,
            Ty::Interface { .. } => Kind::Interface,
            Ty::Named(named) => named.underlying.kind(),
            Ty::Opaque { kind } => *kind,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Ty::Struct(s) => s.type_name(),
            Ty::Map { key, value } => format!("map[{}]{}", key.type_name(), value.type_name()),
            Ty::Slice { elem } => format!("[]{}", elem.type_name()),
            Ty::Array { elem, len } => format!("[{len}]{}", elem.type_name()),
            Ty::Pointer { target } => format!("*{}", target.type_name()),
            Ty::Interface { name, .. } => name.clone(),
            Ty::Named(named) => named.name.clone(),
            other => other.kind().to_string(),
        }
    }
}

impl StructTy {
    pub fn type_name(&self) -> String {
        if self.name.is_empty() {
            "struct {...}".to_string()
        } else {
            self.name.clone()
        }
    }
}

impl Field {
    /// Only an uppercase initial exports a field.
    pub fn is_visible(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Struct => "struct",
            Kind::Map => "map",
            Kind::Slice => "slice",
            Kind::Array => "array",
            Kind::Ptr => "ptr",
            Kind::Interface => "interface",
            Kind::Func => "func",
            Kind::Chan => "chan",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::UnsafePointer => "unsafe pointer",
        };
        f.write_str(name)
    }
}

impl fmt::Debug for EnumSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumSource").field(&(self.0)()).finish()
    }
}

// the description dump lists the values, not the function
impl Serialize for EnumSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.0)().serialize(serializer)
    }
}
