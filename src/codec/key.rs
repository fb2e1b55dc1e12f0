//! Single-value codec for asymmetric private key material.

use std::any::Any;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::trace;

use super::{OpaqueCodec, OpaqueSlot, OpaqueValue};
use crate::error::{Error, Result};
use crate::store::{KvGet, KvSet};

pub const PRIVATE_KEY_CODEC: &str = "private-key";

/// DER-encoded private key material, carried as an indivisible blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateKey {
    der: Vec<u8>,
}

impl PrivateKey {
    pub fn from_der(der: Vec<u8>) -> Self {
        Self { der }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

impl OpaqueValue for PrivateKey {
    fn codec_id(&self) -> &'static str {
        PRIVATE_KEY_CODEC
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Encodes the key material as a single base64 flat value under
/// `{base}_{index}`.
pub struct PrivateKeyCodec;

impl OpaqueCodec for PrivateKeyCodec {
    fn id(&self) -> &'static str {
        PRIVATE_KEY_CODEC
    }

    fn encode(
        &self,
        value: &dyn OpaqueValue,
        base: &str,
        index: usize,
        sink: &mut dyn KvSet,
    ) -> Result<()> {
        let key = value
            .as_any()
            .downcast_ref::<PrivateKey>()
            .ok_or_else(|| Error::Codec(format!("{PRIVATE_KEY_CODEC}: value is not a PrivateKey")))?;
        sink.set(&format!("{base}_{index}"), &STANDARD.encode(&key.der));
        Ok(())
    }

    fn decode(
        &self,
        store: &dyn KvGet,
        base: &str,
        index: usize,
        slot: &mut dyn OpaqueSlot,
    ) -> Result<()> {
        let name = format!("{base}_{index}");
        let Some(text) = store.lookup(&name) else {
            return Ok(());
        };

        let der = match STANDARD.decode(text) {
            Ok(der) => der,
            Err(err) => {
                trace!(key = %name, %err, "undecodable private key value left unset");
                return Ok(());
            }
        };

        let assigned = match slot.set_default().as_any_mut().downcast_mut::<PrivateKey>() {
            Some(key) => {
                key.der = der;
                true
            }
            None => false,
        };
        if !assigned {
            slot.clear();
            return Err(Error::Codec(format!(
                "{PRIVATE_KEY_CODEC}: slot does not hold a PrivateKey"
            )));
        }
        Ok(())
    }
}
