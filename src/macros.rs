//! Declarative [`Record`](crate::Record) derive.

/// Implement [`Record`](crate::Record) for a plain struct from a field
/// kind/tag table.
///
/// ```
/// use flatconf::impl_record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Peer {
///     host: String,
///     port: i64,
///     note: Option<String>,
/// }
///
/// impl_record!(Peer {
///     host: string("host"),
///     port: int("port"),
///     note: opt_string("note"),
/// });
/// ```
///
/// Recognized kinds and the field types they expect:
///
/// | kind         | field type                          |
/// |--------------|-------------------------------------|
/// | `string`     | `String`                            |
/// | `int`        | `i64`                               |
/// | `opt_string` | `Option<String>`                    |
/// | `opt_int`    | `Option<i64>`                       |
/// | `record`     | any `Record`                        |
/// | `opt_record` | `Option<R>` where `R: Record`       |
/// | `records`    | `Vec<R>` where `R: Record + Default`|
/// | `map`        | `HashMap<K, R>` where `R: Record`   |
/// | `opaque`     | `Option<T>` where `T: OpaqueValue + Default` |
///
/// A kind without a `("tag")` suffix declares an untagged field, which is
/// walked structurally but never named.
#[macro_export]
macro_rules! impl_record {
    ($ty:ident { $($field:ident : $kind:ident $(($tag:literal))?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn type_key(&self) -> ::std::any::TypeId {
                ::std::any::TypeId::of::<$ty>()
            }

            fn type_name(&self) -> &'static str {
                ::std::stringify!($ty)
            }

            fn fields(&self) -> ::std::vec::Vec<$crate::FieldRef<'_>> {
                let mut out = ::std::vec::Vec::new();
                $($crate::__push_field_ref!(out, self, $field, $kind $(, $tag)?);)*
                out
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<$crate::FieldMut<'_>> {
                let mut out = ::std::vec::Vec::new();
                $($crate::__push_field_mut!(out, self, $field, $kind $(, $tag)?);)*
                out
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __tag {
    () => {
        ::std::option::Option::None
    };
    ($tag:literal) => {
        ::std::option::Option::Some($tag)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __push_field_ref {
    ($out:ident, $s:ident, $f:ident, string $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::Str($s.$f.as_str()),
        })
    };
    ($out:ident, $s:ident, $f:ident, int $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::Int($s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, opt_string $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::OptStr($s.$f.as_deref()),
        })
    };
    ($out:ident, $s:ident, $f:ident, opt_int $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::OptInt($s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, record $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::Record(&$s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, opt_record $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::OptRecord(
                $s.$f.as_ref().map(|r| r as &dyn $crate::Record),
            ),
        })
    };
    ($out:ident, $s:ident, $f:ident, records $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::Seq(&$s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, map $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::Map(&$s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, opaque $(, $tag:literal)?) => {
        $out.push($crate::FieldRef {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueRef::Opaque(&$s.$f),
        })
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __push_field_mut {
    ($out:ident, $s:ident, $f:ident, string $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::Str(&mut $s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, int $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::Int(&mut $s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, opt_string $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::OptStr(&mut $s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, opt_int $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::OptInt(&mut $s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, record $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::Record(&mut $s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, opt_record $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::OptRecord(
                $s.$f.as_mut().map(|r| r as &mut dyn $crate::Record),
            ),
        })
    };
    ($out:ident, $s:ident, $f:ident, records $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::Seq(&mut $s.$f),
        })
    };
    ($out:ident, $s:ident, $f:ident, map $(, $tag:literal)?) => {
        // mappings are traversed on export only
        { let _ = &$s.$f; }
    };
    ($out:ident, $s:ident, $f:ident, opaque $(, $tag:literal)?) => {
        $out.push($crate::FieldMut {
            tag: $crate::__tag!($($tag)?),
            value: $crate::ValueMut::Opaque(&mut $s.$f),
        })
    };
}
