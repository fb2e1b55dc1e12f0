//! Map typed configuration records to and from flat key/value stores.
//!
//! Keys end in an underscore and integer (e.g. `_2`): the `n`-th instance
//! of a record type encountered during one walk names its fields `tag_n`,
//! which keeps repeated record instances and the multiple values they hold
//! apart. CLI arguments and environment variables are normalized to the
//! same shape before they enter a store (see [`args`]).
//!
//! The walk engine consumes statically declared field descriptors (the
//! [`Record`] trait, usually derived with [`impl_record!`]) rather than
//! runtime type metadata. Opaque binary payloads such as private key
//! material and certificate bundles go through the pluggable [`codec`]
//! registry instead of scalar decomposition.
//!
//! ```
//! use flatconf::{export, import, impl_record, KvGet, MemoryStore};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Server {
//!     host: String,
//!     port: i64,
//! }
//!
//! impl_record!(Server {
//!     host: string("host"),
//!     port: int("port"),
//! });
//!
//! let server = Server { host: "localhost".into(), port: 8080 };
//! let mut store = MemoryStore::new();
//! export(&server, &mut store).unwrap();
//! assert_eq!(store.get("host_0"), "localhost");
//!
//! let mut restored = Server::default();
//! import(&store, &mut restored).unwrap();
//! assert_eq!(restored, server);
//! ```

pub mod args;
pub mod codec;
mod context;
mod error;
mod export;
mod import;
mod macros;
mod record;
pub mod store;

pub use codec::{
    CertBundle, CodecRegistry, OpaqueCodec, OpaqueSlot, OpaqueValue, PrivateKey,
    CERT_BUNDLE_CODEC, PRIVATE_KEY_CODEC,
};
pub use context::{key_for, WalkContext};
pub use error::{Error, Result};
pub use export::{export, Exporter};
pub use import::{import, Importer};
pub use record::{
    FieldMut, FieldRef, Record, RecordMap, RecordSeq, RecordSeqMut, ValueMut, ValueRef,
};
pub use store::{KvGet, KvSet, MemoryStore, ENV_PREFIX};
