//! Opaque binary value codecs.
//!
//! Some fields do not decompose into plain scalars: private key material,
//! certificate chains. Each such value carries a codec id, and a
//! [`CodecRegistry`] maps ids to encode/decode handlers so new opaque
//! categories can be added without touching the walk engine.

mod cert;
mod key;

pub use cert::{CertBundle, CertBundleCodec, CERT_BUNDLE_CODEC};
pub use key::{PrivateKey, PrivateKeyCodec, PRIVATE_KEY_CODEC};

use std::any::Any;
use std::collections::HashMap;

use crate::error::Result;
use crate::store::{KvGet, KvSet};

/// An indivisible binary value requiring a dedicated codec.
pub trait OpaqueValue: Any {
    /// Registry id of the codec handling this value.
    fn codec_id(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A nullable field holder for an opaque value.
///
/// Absence on export means "emit nothing"; absence after a decode means
/// the store had no (usable) value. `Option<T>` implements this for any
/// `T: OpaqueValue + Default`.
pub trait OpaqueSlot {
    fn codec_id(&self) -> &'static str;
    fn get(&self) -> Option<&dyn OpaqueValue>;
    /// Fill the slot with a default value and return it for population.
    fn set_default(&mut self) -> &mut dyn OpaqueValue;
    fn clear(&mut self);
}

impl<T: OpaqueValue + Default> OpaqueSlot for Option<T> {
    fn codec_id(&self) -> &'static str {
        match self {
            Some(value) => value.codec_id(),
            None => T::default().codec_id(),
        }
    }

    fn get(&self) -> Option<&dyn OpaqueValue> {
        self.as_ref().map(|value| value as &dyn OpaqueValue)
    }

    fn set_default(&mut self) -> &mut dyn OpaqueValue {
        self.insert(T::default())
    }

    fn clear(&mut self) {
        *self = None;
    }
}

/// Encode/decode handler for one opaque value category.
///
/// `base` is the field's declared tag and `index` the occurrence index of
/// the enclosing record instance; a codec derives its flat key(s) from
/// both. Decode leaves the slot untouched when the store has no usable
/// value — missing keys and undecodable text are not errors.
pub trait OpaqueCodec {
    fn id(&self) -> &'static str;

    fn encode(
        &self,
        value: &dyn OpaqueValue,
        base: &str,
        index: usize,
        sink: &mut dyn KvSet,
    ) -> Result<()>;

    fn decode(
        &self,
        store: &dyn KvGet,
        base: &str,
        index: usize,
        slot: &mut dyn OpaqueSlot,
    ) -> Result<()>;
}

/// Registry of opaque codecs keyed by id, open for extension.
pub struct CodecRegistry {
    codecs: HashMap<&'static str, Box<dyn OpaqueCodec>>,
}

impl CodecRegistry {
    /// Create a registry with no codecs.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Register a codec, replacing any previous codec with the same id.
    pub fn register(&mut self, codec: Box<dyn OpaqueCodec>) {
        self.codecs.insert(codec.id(), codec);
    }

    pub fn get(&self, id: &str) -> Option<&dyn OpaqueCodec> {
        self.codecs.get(id).map(|codec| codec.as_ref())
    }
}

impl Default for CodecRegistry {
    /// Registry with the built-in private-key and cert-bundle codecs.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PrivateKeyCodec));
        registry.register(Box::new(CertBundleCodec));
        registry
    }
}
