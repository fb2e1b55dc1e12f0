//! Record graph → flat store export walk.

use std::any::TypeId;

use tracing::{debug, trace};

use crate::codec::CodecRegistry;
use crate::context::{key_for, WalkContext};
use crate::error::Result;
use crate::record::{FieldRef, Record, ValueRef};
use crate::store::KvSet;

/// Export `record` into `sink` with the built-in codecs.
pub fn export(record: &dyn Record, sink: &mut dyn KvSet) -> Result<()> {
    Exporter::default().export(record, sink)
}

/// Depth-first exporter, writing through the sink as it descends.
///
/// There is no buffering: a failing subtree aborts its remaining siblings
/// but values already written stay written.
#[derive(Default)]
pub struct Exporter {
    codecs: CodecRegistry,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codecs(codecs: CodecRegistry) -> Self {
        Self { codecs }
    }

    pub fn export(&self, record: &dyn Record, sink: &mut dyn KvSet) -> Result<()> {
        let mut ctx = WalkContext::new();
        self.export_record(record, sink, &mut ctx)
    }

    fn export_record(
        &self,
        record: &dyn Record,
        sink: &mut dyn KvSet,
        ctx: &mut WalkContext,
    ) -> Result<()> {
        let owner = record.type_key();
        let index = ctx.enter(owner);
        trace!(record = record.type_name(), index, "export record");

        for field in record.fields() {
            self.export_field(owner, field, sink, ctx)?;
        }
        Ok(())
    }

    fn export_field(
        &self,
        owner: TypeId,
        field: FieldRef<'_>,
        sink: &mut dyn KvSet,
        ctx: &mut WalkContext,
    ) -> Result<()> {
        match field.value {
            ValueRef::Str(value) => emit(field.tag, owner, value, sink, ctx),
            ValueRef::Int(value) => emit(field.tag, owner, &value.to_string(), sink, ctx),
            ValueRef::OptStr(Some(value)) => emit(field.tag, owner, value, sink, ctx),
            ValueRef::OptInt(Some(value)) => emit(field.tag, owner, &value.to_string(), sink, ctx),
            // an absent optional emits nothing
            ValueRef::OptStr(None) | ValueRef::OptInt(None) => {}
            ValueRef::Record(record) => self.export_record(record, sink, ctx)?,
            ValueRef::OptRecord(Some(record)) => self.export_record(record, sink, ctx)?,
            ValueRef::OptRecord(None) => {}
            ValueRef::Seq(seq) => {
                for i in 0..seq.len() {
                    self.export_record(seq.get(i), sink, ctx)?;
                }
            }
            ValueRef::Map(map) => {
                map.visit_values(&mut |record| self.export_record(record, sink, ctx))?
            }
            ValueRef::Opaque(slot) => {
                let (Some(tag), Some(value)) = (field.tag, slot.get()) else {
                    return Ok(());
                };
                match self.codecs.get(value.codec_id()) {
                    Some(codec) => codec.encode(value, tag, ctx.index_of(owner), sink)?,
                    None => {
                        debug!(codec = value.codec_id(), tag, "no codec registered; skipping")
                    }
                }
            }
        }
        Ok(())
    }
}

fn emit(
    tag: Option<&'static str>,
    owner: TypeId,
    value: &str,
    sink: &mut dyn KvSet,
    ctx: &WalkContext,
) {
    // untagged scalars are silently skipped
    if let Some(key) = key_for(tag, ctx.index_of(owner)) {
        trace!(%key, "export scalar");
        sink.set(&key, value);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::impl_record;
    use crate::store::{KvGet, MemoryStore};

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        name: String,
        age: i64,
    }

    impl_record!(Sample {
        name: string("n"),
        age: int("a"),
    });

    #[derive(Debug, Default)]
    struct Outer {
        first: Sample,
        second: Sample,
        label: String,
    }

    impl_record!(Outer {
        first: record,
        second: record,
        label: string("label"),
    });

    #[test]
    fn test_tagged_scalars_export_at_index_zero() {
        let sample = Sample {
            name: "x".to_string(),
            age: 5,
        };
        let mut store = MemoryStore::new();
        export(&sample, &mut store).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("n_0"), "x");
        assert_eq!(store.get("a_0"), "5");
    }

    #[test]
    fn test_repeated_instances_get_indices_in_encounter_order() {
        let outer = Outer {
            first: Sample {
                name: "a".to_string(),
                age: 1,
            },
            second: Sample {
                name: "b".to_string(),
                age: 2,
            },
            label: "top".to_string(),
        };
        let mut store = MemoryStore::new();
        export(&outer, &mut store).unwrap();

        assert_eq!(store.get("n_0"), "a");
        assert_eq!(store.get("n_1"), "b");
        assert_eq!(store.get("a_0"), "1");
        assert_eq!(store.get("a_1"), "2");
        // Outer is the first (and only) instance of its own type
        assert_eq!(store.get("label_0"), "top");
    }

    #[derive(Debug, Default)]
    struct WithOptions {
        note: Option<String>,
        retries: Option<i64>,
    }

    impl_record!(WithOptions {
        note: opt_string("note"),
        retries: opt_int("retries"),
    });

    #[test]
    fn test_absent_optionals_emit_nothing() {
        let value = WithOptions {
            note: Some("hi".to_string()),
            retries: None,
        };
        let mut store = MemoryStore::new();
        export(&value, &mut store).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("note_0"), "hi");
    }

    #[derive(Debug, Default)]
    struct WithSeqs {
        a: Vec<Sample>,
        b: Vec<Sample>,
    }

    impl_record!(WithSeqs {
        a: records,
        b: records,
    });

    #[test]
    fn test_counter_continues_across_sibling_collections() {
        let value = WithSeqs {
            a: vec![Sample {
                name: "a0".to_string(),
                age: 0,
            }],
            b: vec![Sample {
                name: "b0".to_string(),
                age: 0,
            }],
        };
        let mut store = MemoryStore::new();
        export(&value, &mut store).unwrap();

        assert_eq!(store.get("n_0"), "a0");
        assert_eq!(store.get("n_1"), "b0");
    }

    #[derive(Debug, Default)]
    struct WithMap {
        entries: HashMap<String, Sample>,
    }

    impl_record!(WithMap {
        entries: map,
    });

    #[test]
    fn test_map_values_are_visited_keys_ignored() {
        let mut value = WithMap::default();
        value.entries.insert(
            "whatever".to_string(),
            Sample {
                name: "m".to_string(),
                age: 3,
            },
        );
        let mut store = MemoryStore::new();
        export(&value, &mut store).unwrap();

        assert_eq!(store.get("n_0"), "m");
        assert_eq!(store.get("a_0"), "3");
    }

    #[derive(Debug, Default)]
    struct Inner {
        value: String,
    }

    impl_record!(Inner {
        value: string("shared"),
    });

    #[derive(Debug, Default)]
    struct Shadow {
        value: String,
        inner: Inner,
    }

    impl_record!(Shadow {
        value: string("shared"),
        inner: record,
    });

    // Known edge: two distinct record types sharing a tag both resolve
    // index 0 on first occurrence, so the later write wins.
    #[test]
    fn test_shared_tag_collides_at_index_zero() {
        let value = Shadow {
            value: "outer".to_string(),
            inner: Inner {
                value: "inner".to_string(),
            },
        };
        let mut store = MemoryStore::new();
        export(&value, &mut store).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("shared_0"), "inner");
    }

    #[derive(Debug, Default)]
    struct Untagged {
        hidden: String,
        child: Sample,
    }

    impl_record!(Untagged {
        hidden: string,
        child: record,
    });

    #[test]
    fn test_untagged_scalar_is_skipped_but_children_are_walked() {
        let value = Untagged {
            hidden: "secret".to_string(),
            child: Sample {
                name: "c".to_string(),
                age: 7,
            },
        };
        let mut store = MemoryStore::new();
        export(&value, &mut store).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.lookup("hidden_0").is_none());
        assert_eq!(store.get("n_0"), "c");
    }
}
