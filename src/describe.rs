//! Schema registration: types describe their own shape as a [`Ty`].
use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use crate::ir::Ty;

/// Types that can describe their own template shape.
///
/// Structs build a [`crate::ir::StructTy`] with per-field annotations; enumerated
/// types wrap their representation in a [`crate::ir::NamedTy`] carrying their
/// display strings.
pub trait Describe {
    fn describe() -> Ty;
}

/// The ordered display strings of an enumerated type.
///
/// Invoked on the zero value (`Default`) of the type.
pub trait EnumStrings: Default {
    fn enum_strings(&self) -> Vec<String>;
}

pub(crate) fn enum_strings_of<T: EnumStrings>() -> Vec<String> {
    T::default().enum_strings()
}

macro_rules! describe_as {
    ($ty:expr => $($t:ty),+ $(,)?) => {
        $(impl Describe for $t {
            fn describe() -> Ty { $ty }
        })+
    };
}

describe_as!(Ty::Bool => bool);
describe_as!(Ty::Int => i8, i16, i32, i64, i128, isize);
describe_as!(Ty::Uint => u8, u16, u32, u64, u128, usize);
describe_as!(Ty::Float => f32, f64);
describe_as!(Ty::String => String);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> Ty {
        Ty::slice(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> Ty {
        Ty::array(T::describe(), N)
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe() -> Ty {
        Ty::pointer(T::describe())
    }
}

// `None` is the nil pointer
impl<T: Describe> Describe for Option<T> {
    fn describe() -> Ty {
        Ty::pointer(T::describe())
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> Ty {
        Ty::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> Ty {
        Ty::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
    fn describe() -> Ty {
        Ty::map(K::describe(), V::describe())
    }
}
