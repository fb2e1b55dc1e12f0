//! Multi-key codec for certificate bundles (chain plus matching key).

use std::any::Any;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::trace;

use super::{OpaqueCodec, OpaqueSlot, OpaqueValue};
use crate::error::{Error, Result};
use crate::store::{KvGet, KvSet};

pub const CERT_BUNDLE_CODEC: &str = "cert-bundle";

/// A certificate chain and its matching private key, all DER bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertBundle {
    /// Chain links, leaf first.
    pub chain: Vec<Vec<u8>>,
    /// Matching private key material; empty means no key.
    pub key_der: Vec<u8>,
}

impl CertBundle {
    pub fn new(chain: Vec<Vec<u8>>, key_der: Vec<u8>) -> Self {
        Self { chain, key_der }
    }
}

impl OpaqueValue for CertBundle {
    fn codec_id(&self) -> &'static str {
        CERT_BUNDLE_CODEC
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Key for chain link `link` of the `index`-th bundle occurrence: link 0
/// is `{base}_cert_{index}`, link `i >= 1` is `{base}_cert{i+1}_{index}`.
fn chain_key(base: &str, link: usize, index: usize) -> String {
    if link == 0 {
        format!("{base}_cert_{index}")
    } else {
        format!("{base}_cert{}_{index}", link + 1)
    }
}

fn pk_key(base: &str, index: usize) -> String {
    format!("{base}_pk_{index}")
}

/// Decomposes a bundle into one flat value per chain link plus one for the
/// key, all sharing the enclosing record's occurrence index.
pub struct CertBundleCodec;

impl OpaqueCodec for CertBundleCodec {
    fn id(&self) -> &'static str {
        CERT_BUNDLE_CODEC
    }

    fn encode(
        &self,
        value: &dyn OpaqueValue,
        base: &str,
        index: usize,
        sink: &mut dyn KvSet,
    ) -> Result<()> {
        let bundle = value
            .as_any()
            .downcast_ref::<CertBundle>()
            .ok_or_else(|| Error::Codec(format!("{CERT_BUNDLE_CODEC}: value is not a CertBundle")))?;

        for (link, der) in bundle.chain.iter().enumerate() {
            if der.is_empty() {
                continue;
            }
            sink.set(&chain_key(base, link, index), &STANDARD.encode(der));
        }

        if !bundle.key_der.is_empty() {
            sink.set(&pk_key(base, index), &STANDARD.encode(&bundle.key_der));
        }
        Ok(())
    }

    fn decode(
        &self,
        store: &dyn KvGet,
        base: &str,
        index: usize,
        slot: &mut dyn OpaqueSlot,
    ) -> Result<()> {
        // Both the first chain link and the key must be present to
        // reconstruct a bundle at all.
        if store.lookup(&chain_key(base, 0, index)).is_none() {
            return Ok(());
        }
        let Some(key_text) = store.lookup(&pk_key(base, index)) else {
            return Ok(());
        };
        let key_der = match STANDARD.decode(key_text) {
            Ok(der) => der,
            Err(err) => {
                trace!(base, index, %err, "undecodable bundle key left unset");
                return Ok(());
            }
        };

        let mut chain = Vec::new();
        let mut link = 0;
        while let Some(text) = store.lookup(&chain_key(base, link, index)) {
            match STANDARD.decode(text) {
                Ok(der) => chain.push(der),
                Err(err) => {
                    trace!(base, index, link, %err, "undecodable chain link; bundle left unset");
                    return Ok(());
                }
            }
            link += 1;
        }

        let assigned = match slot.set_default().as_any_mut().downcast_mut::<CertBundle>() {
            Some(bundle) => {
                bundle.chain = chain;
                bundle.key_der = key_der;
                true
            }
            None => false,
        };
        if !assigned {
            slot.clear();
            return Err(Error::Codec(format!(
                "{CERT_BUNDLE_CODEC}: slot does not hold a CertBundle"
            )));
        }
        Ok(())
    }
}
