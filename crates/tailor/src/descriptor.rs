//! Type descriptors.
//!
//! A [`TypeDescriptor`] is the normalized view of one Rust type that every later
//! stage works from: its identity, [`Kind`], declared name, element or field
//! table, and, when it was reached through a struct field, that field's
//! metadata. Descriptors come from [`Describe`], implemented here for the
//! standard types and derived for user structs with `#[derive(Describe)]`.
//!
//! `Option<T>` describes exactly like `T` plus a nullable flag, and `Box<T>`,
//! `Rc<T>` and `Arc<T>` describe exactly like `T`.

use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Implemented by every type that can appear in a generated document.
pub trait Describe: 'static {
    fn describe() -> TypeDescriptor;
}

/// Category of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Char,
    String,
    Struct,
    Slice,
    /// Key/value object with arbitrary keys
    Map,
    /// Any JSON value
    Any,
}

impl Kind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
            Self::Struct => "struct",
            Self::Slice => "slice",
            Self::Map => "map",
            Self::Any => "any",
        }
    }

    /// Scalar kinds render through a rule rather than structurally.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::Struct | Self::Slice | Self::Map | Self::Any)
    }

    /// The primitive type that owns this kind's fallback rule.
    #[must_use]
    pub fn canonical_type(self) -> Option<TypeId> {
        let id = match self {
            Self::Bool => TypeId::of::<bool>(),
            Self::I8 => TypeId::of::<i8>(),
            Self::I16 => TypeId::of::<i16>(),
            Self::I32 => TypeId::of::<i32>(),
            Self::I64 => TypeId::of::<i64>(),
            Self::I128 => TypeId::of::<i128>(),
            Self::Isize => TypeId::of::<isize>(),
            Self::U8 => TypeId::of::<u8>(),
            Self::U16 => TypeId::of::<u16>(),
            Self::U32 => TypeId::of::<u32>(),
            Self::U64 => TypeId::of::<u64>(),
            Self::U128 => TypeId::of::<u128>(),
            Self::Usize => TypeId::of::<usize>(),
            Self::F32 => TypeId::of::<f32>(),
            Self::F64 => TypeId::of::<f64>(),
            Self::Char => TypeId::of::<char>(),
            Self::String => TypeId::of::<String>(),
            Self::Struct | Self::Slice | Self::Map | Self::Any => return None,
        };
        Some(id)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static facts about one type.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub id: TypeId,
    /// Full Rust path, for diagnostics
    pub type_name: &'static str,
    /// Declared name used for `$ref` links; `None` for anonymous/inline types
    pub name: Option<&'static str>,
    /// Whether the type is visible outside its module
    pub exported: bool,
    pub kind: Kind,
    /// Element type of a slice, value type of a map
    pub element: Option<fn() -> TypeDescriptor>,
    /// Declared fields of a struct, in declaration order
    pub fields: Option<fn() -> Vec<FieldDef>>,
}

impl TypeInfo {
    /// A scalar of the given kind
    #[must_use]
    pub fn scalar<T: 'static>(kind: Kind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: None,
            exported: true,
            kind,
            element: None,
            fields: None,
        }
    }

    /// A sequence `S` of `E`
    #[must_use]
    pub fn slice<S: 'static, E: Describe>() -> Self {
        Self {
            element: Some(E::describe as fn() -> TypeDescriptor),
            ..Self::scalar::<S>(Kind::Slice)
        }
    }

    /// A map `M` with values of `V`
    #[must_use]
    pub fn map<M: 'static, V: Describe>() -> Self {
        Self {
            element: Some(V::describe as fn() -> TypeDescriptor),
            ..Self::scalar::<M>(Kind::Map)
        }
    }

    /// A named struct with no declared fields, for types that only make sense
    /// once a rule maps them to a data type (timestamps and the like).
    #[must_use]
    pub fn opaque<T: 'static>(name: &'static str) -> Self {
        Self {
            name: Some(name),
            fields: Some(Vec::new as fn() -> Vec<FieldDef>),
            ..Self::scalar::<T>(Kind::Struct)
        }
    }
}

/// One declared struct field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Declared name; `None` for positional fields
    pub name: Option<&'static str>,
    pub exported: bool,
    /// Flattened into the parent rather than nested under a property
    pub embedded: bool,
    /// Field tags such as `json`, `query`, `path`, `description`, `default`
    pub tags: &'static [(&'static str, &'static str)],
    /// Descriptor of the field type; absent for fields that are never introspected
    pub ty: Option<fn() -> TypeDescriptor>,
}

impl FieldDef {
    /// Value of tag `key`. When a key repeats, the last one wins.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Serialized property name, read from the `json` tag.
    ///
    /// `"-"` and a missing tag mean the field is not serialized. A tag with an
    /// empty name before its options (`",omitempty"`) falls back to the
    /// declared field name.
    #[must_use]
    pub fn json_name(&self) -> Option<&'static str> {
        let tag = self.tag("json")?;
        if tag == "-" {
            return None;
        }
        let (name, options) = match tag.split_once(',') {
            Some((name, options)) => (name, Some(options)),
            None => (tag, None),
        };
        match (name, options) {
            ("", Some(_)) => self.name,
            ("", None) => None,
            (name, _) => Some(name),
        }
    }
}

/// Normalized type information for one observed type, or the empty sentinel.
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    info: Option<TypeInfo>,
    nullable: bool,
    field: Option<FieldDef>,
}

impl TypeDescriptor {
    /// The sentinel for "no type". It never renders.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            info: None,
            nullable: false,
            field: None,
        }
    }

    #[must_use]
    pub fn of<T: Describe>() -> Self {
        T::describe()
    }

    #[must_use]
    pub fn of_val<T: Describe>(_value: &T) -> Self {
        T::describe()
    }

    #[must_use]
    pub const fn from_info(info: TypeInfo) -> Self {
        Self {
            info: Some(info),
            nullable: false,
            field: None,
        }
    }

    /// Give this descriptor another type's identity and name while keeping its
    /// shape. Newtypes describe themselves this way.
    #[must_use]
    pub fn relabel(
        mut self,
        id: TypeId,
        type_name: &'static str,
        name: Option<&'static str>,
        exported: bool,
    ) -> Self {
        if let Some(info) = self.info.as_mut() {
            info.id = id;
            info.type_name = type_name;
            info.name = name;
            info.exported = exported;
        }
        self
    }

    #[must_use]
    pub fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach the metadata of the field this descriptor was reached through.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.field = Some(field);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.info.is_none()
    }

    #[must_use]
    pub const fn info(&self) -> Option<&TypeInfo> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.info.map(|info| info.id)
    }

    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.info.map(|info| info.kind)
    }

    /// Declared name, or `None` for anonymous types and the empty descriptor.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.info
            .and_then(|info| info.name)
            .filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.info.map_or("<empty>", |info| info.type_name)
    }

    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.info.is_some_and(|info| info.exported)
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub const fn field(&self) -> Option<&FieldDef> {
        self.field.as_ref()
    }

    /// Tag of the originating field, if any
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.field.as_ref().and_then(|field| field.tag(key))
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.field.is_some_and(|field| field.embedded)
    }

    /// Element descriptor of a slice or map
    #[must_use]
    pub fn element(&self) -> Option<TypeDescriptor> {
        self.info.and_then(|info| info.element).map(|element| element())
    }

    /// Declared fields of a struct; empty for everything else
    #[must_use]
    pub fn declared_fields(&self) -> Vec<FieldDef> {
        self.info
            .and_then(|info| info.fields)
            .map(|fields| fields())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_kind(&self, kind: Kind) -> bool {
        self.kind() == Some(kind)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.info {
            None => f.write_str("TypeDescriptor{}"),
            Some(info) => write!(f, "TypeDescriptor{{{}-{}}}", info.kind, info.type_name),
        }
    }
}

macro_rules! describe_scalars {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::from_info(TypeInfo::scalar::<$ty>(Kind::$kind))
                }
            }
        )*
    };
}

describe_scalars! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    &'static str => String,
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        T::describe().into_nullable()
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Rc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::slice::<Self, T>())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::slice::<Self, T>())
    }
}

impl<T: Describe> Describe for HashSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::slice::<Self, T>())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::slice::<Self, T>())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::slice::<Self, T>())
    }
}

impl<K: 'static, V: Describe> Describe for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::map::<Self, V>())
    }
}

impl<K: 'static, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::map::<Self, V>())
    }
}

impl Describe for serde_json::Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::scalar::<Self>(Kind::Any))
    }
}

impl Describe for serde_json::Map<String, serde_json::Value> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::map::<Self, serde_json::Value>())
    }
}

impl<Tz> Describe for chrono::DateTime<Tz>
where
    Tz: chrono::TimeZone + 'static,
    Tz::Offset: 'static,
{
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::opaque::<Self>("DateTime"))
    }
}

impl Describe for chrono::NaiveDateTime {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::opaque::<Self>("NaiveDateTime"))
    }
}

impl Describe for chrono::NaiveDate {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::from_info(TypeInfo::opaque::<Self>("NaiveDate"))
    }
}
