//! Record field descriptors consumed by the walk engine.
//!
//! A [`Record`] exposes its fields as statically declared views instead of
//! runtime type metadata: [`fields`](Record::fields) for export and
//! [`fields_mut`](Record::fields_mut) for import. The [`impl_record!`]
//! macro derives the trait for plain structs; hand-written impls work the
//! same way.
//!
//! [`impl_record!`]: crate::impl_record

use std::any::TypeId;
use std::collections::HashMap;

use crate::codec::OpaqueSlot;
use crate::error::Result;

/// A named aggregate of fields the walk engine can traverse in both
/// directions.
pub trait Record {
    /// Stable type identity used for occurrence counting.
    fn type_key(&self) -> TypeId;

    /// Type name, for diagnostics only.
    fn type_name(&self) -> &'static str;

    /// Field views in declared order.
    fn fields(&self) -> Vec<FieldRef<'_>>;

    /// Mutable field views in declared order.
    fn fields_mut(&mut self) -> Vec<FieldMut<'_>>;
}

/// A field view paired with its declared tag. Untagged fields are walked
/// structurally but never themselves produce or consume a key.
pub struct FieldRef<'a> {
    pub tag: Option<&'static str>,
    pub value: ValueRef<'a>,
}

/// Mutable counterpart of [`FieldRef`].
pub struct FieldMut<'a> {
    pub tag: Option<&'static str>,
    pub value: ValueMut<'a>,
}

/// Shared view of a field's value, by category.
pub enum ValueRef<'a> {
    Str(&'a str),
    Int(i64),
    OptStr(Option<&'a str>),
    OptInt(Option<i64>),
    Record(&'a dyn Record),
    OptRecord(Option<&'a dyn Record>),
    Seq(&'a dyn RecordSeq),
    Map(&'a dyn RecordMap),
    Opaque(&'a dyn OpaqueSlot),
}

/// Mutable view of a field's value, by category.
///
/// There is no `Map` variant: mappings are traversed on export only, the
/// importer never descends into them.
pub enum ValueMut<'a> {
    Str(&'a mut String),
    Int(&'a mut i64),
    OptStr(&'a mut Option<String>),
    OptInt(&'a mut Option<i64>),
    Record(&'a mut dyn Record),
    OptRecord(Option<&'a mut dyn Record>),
    Seq(&'a mut dyn RecordSeqMut),
    Opaque(&'a mut dyn OpaqueSlot),
}

/// An ordered collection of records, visited by position on export.
pub trait RecordSeq {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> &dyn Record;
}

/// Mutable ordered collection of records, grown by the importer when index
/// probing finds further instances in the store.
pub trait RecordSeqMut {
    fn len(&self) -> usize;
    fn get_mut(&mut self, index: usize) -> &mut dyn Record;

    /// Type identity of the element record type, for occurrence counting.
    fn element_type(&self) -> TypeId;

    /// Tags declared by the element record type, in declared order. These
    /// are what the importer probes; an element type with no tags can
    /// never be synthesized.
    fn element_tags(&self) -> Vec<&'static str>;

    /// Append a default element and return it. Backing storage grows with
    /// amortized doubling starting at capacity 4.
    fn append_default(&mut self) -> &mut dyn Record;
}

/// A mapping whose values are records. Keys are ignored by the walk, so
/// entries sharing a tag can collide in the flat store.
pub trait RecordMap {
    fn visit_values(&self, visit: &mut dyn FnMut(&dyn Record) -> Result<()>) -> Result<()>;
}

impl<T: Record> RecordSeq for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> &dyn Record {
        &self[index]
    }
}

impl<T: Record + Default + 'static> RecordSeqMut for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get_mut(&mut self, index: usize) -> &mut dyn Record {
        &mut self[index]
    }

    fn element_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_tags(&self) -> Vec<&'static str> {
        let probe = T::default();
        probe.fields().into_iter().filter_map(|f| f.tag).collect()
    }

    fn append_default(&mut self) -> &mut dyn Record {
        if self.len() == self.capacity() {
            let target = usize::max(4, self.len() * 2);
            self.reserve_exact(target - self.len());
        }
        self.push(T::default());
        let last = self.len() - 1;
        &mut self[last]
    }
}

impl<K, T: Record> RecordMap for HashMap<K, T> {
    fn visit_values(&self, visit: &mut dyn FnMut(&dyn Record) -> Result<()>) -> Result<()> {
        for value in self.values() {
            visit(value)?;
        }
        Ok(())
    }
}
