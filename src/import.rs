//! Flat store → record graph import walk.

use std::any::TypeId;

use tracing::{debug, trace};

use crate::codec::CodecRegistry;
use crate::context::{key_for, WalkContext};
use crate::error::Result;
use crate::record::{Record, RecordSeqMut, ValueMut};
use crate::store::KvGet;

/// Import `store` into `record` with the built-in codecs.
pub fn import(store: &dyn KvGet, record: &mut dyn Record) -> Result<()> {
    Importer::default().import(store, record)
}

/// Depth-first importer, mirroring the export traversal.
///
/// Where a field is a repeated-record collection, the importer additionally
/// probes the store for successive indices to reconstruct a cardinality the
/// target record does not declare ahead of time.
#[derive(Default)]
pub struct Importer {
    codecs: CodecRegistry,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codecs(codecs: CodecRegistry) -> Self {
        Self { codecs }
    }

    pub fn import(&self, store: &dyn KvGet, record: &mut dyn Record) -> Result<()> {
        let mut ctx = WalkContext::new();
        self.import_record(store, record, &mut ctx)
    }

    fn import_record(
        &self,
        store: &dyn KvGet,
        record: &mut dyn Record,
        ctx: &mut WalkContext,
    ) -> Result<()> {
        let index = ctx.enter(record.type_key());
        trace!(record = record.type_name(), index, "import record");
        self.import_fields(store, record, ctx)
    }

    /// Populate fields at the owner's current index. The context must
    /// already account for this instance; synthesized collection elements
    /// reuse the increment their probe made.
    fn import_fields(
        &self,
        store: &dyn KvGet,
        record: &mut dyn Record,
        ctx: &mut WalkContext,
    ) -> Result<()> {
        let owner = record.type_key();
        for field in record.fields_mut() {
            match field.value {
                ValueMut::Str(slot) => {
                    if let Some(value) = resolve(store, field.tag, owner, ctx) {
                        *slot = value;
                    }
                }
                ValueMut::Int(slot) => {
                    if let Some(value) = resolve(store, field.tag, owner, ctx) {
                        // parse failures are tolerated as zero
                        *slot = value.parse().unwrap_or(0);
                    }
                }
                ValueMut::OptStr(slot) => {
                    if let Some(value) = resolve(store, field.tag, owner, ctx) {
                        *slot = Some(value);
                    }
                }
                ValueMut::OptInt(slot) => {
                    if let Some(value) = resolve(store, field.tag, owner, ctx) {
                        *slot = Some(value.parse().unwrap_or(0));
                    }
                }
                ValueMut::Record(record) => self.import_record(store, record, ctx)?,
                // an absent nested record stays unset
                ValueMut::OptRecord(Some(record)) => self.import_record(store, record, ctx)?,
                ValueMut::OptRecord(None) => {}
                ValueMut::Seq(seq) => self.import_seq(store, seq, ctx)?,
                ValueMut::Opaque(slot) => {
                    let Some(tag) = field.tag else {
                        continue;
                    };
                    match self.codecs.get(slot.codec_id()) {
                        Some(codec) => codec.decode(store, tag, ctx.index_of(owner), slot)?,
                        None => {
                            debug!(codec = slot.codec_id(), tag, "no codec registered; skipping")
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn import_seq(
        &self,
        store: &dyn KvGet,
        seq: &mut dyn RecordSeqMut,
        ctx: &mut WalkContext,
    ) -> Result<()> {
        // elements already present are populated in place
        for i in 0..seq.len() {
            self.import_record(store, seq.get_mut(i), ctx)?;
        }

        // Synthesize further elements while any tagged field of the element
        // type resolves at the next index. The failed final probe's counter
        // increment is not rolled back.
        let tags = seq.element_tags();
        loop {
            let index = ctx.enter(seq.element_type());
            let hit = tags
                .iter()
                .any(|tag| store.lookup(&format!("{tag}_{index}")).is_some());
            if !hit {
                trace!(index, "probe miss; collection ends");
                break;
            }
            trace!(index, "probe hit; synthesizing element");
            let element = seq.append_default();
            self.import_fields(store, element, ctx)?;
        }
        Ok(())
    }
}

fn resolve(
    store: &dyn KvGet,
    tag: Option<&'static str>,
    owner: TypeId,
    ctx: &WalkContext,
) -> Option<String> {
    let key = key_for(tag, ctx.index_of(owner))?;
    let value = store.lookup(&key)?;
    trace!(%key, "import scalar");
    Some(value.to_string())
}
