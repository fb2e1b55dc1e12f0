//! CLI-argument and environment-variable adapters.
//!
//! Both adapters feed a [`KvSet`] sink. External names are transformed to
//! the lowercase `name_<index>` shape the walk engine expects, so
//! `--listen-port 8080` and `CFG_LISTEN_PORT=8080` both land on
//! `listen_port_0`.

use tracing::trace;

use crate::error::{Error, Result};
use crate::store::{KvSet, ENV_PREFIX};

/// Normalize an external name: lowercase, strip leading dashes, dashes to
/// underscores, and append `_0` when the name has no trailing numeric
/// index.
pub fn normalize_name(raw: &str) -> String {
    let name = raw
        .to_ascii_lowercase()
        .trim_start_matches('-')
        .replace('-', "_");
    match name.rsplit_once('_') {
        Some((_, index)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => format!("{name}_0"),
    }
}

/// Parse command-line style tokens into the store.
///
/// Supports both `--name value` and `--name=value`. A bare token is an
/// error, as is a flag whose value is missing or looks like another flag.
/// Entries written before an error stay written.
pub fn parse_args_from<I>(args: I, kv: &mut dyn KvSet) -> Result<()>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if !arg.starts_with('-') {
            return Err(Error::InvalidArgument(arg));
        }
        if let Some((name, value)) = arg.split_once('=') {
            let key = normalize_name(name);
            trace!(%key, "argument entry");
            kv.set(&key, value);
        } else {
            match args.next() {
                Some(value) if !value.starts_with('-') => {
                    let key = normalize_name(&arg);
                    trace!(%key, "argument entry");
                    kv.set(&key, &value);
                }
                _ => return Err(Error::MissingValue(arg)),
            }
        }
    }
    Ok(())
}

/// Parse the process arguments (skipping the binary name) into the store.
pub fn parse_args(kv: &mut dyn KvSet) -> Result<()> {
    parse_args_from(std::env::args().skip(1), kv)
}

/// Feed `CFG_`-prefixed entries into the store, prefix stripped and names
/// normalized. Unprefixed entries are ignored.
pub fn parse_env_from<I>(vars: I, kv: &mut dyn KvSet)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        let Some(stripped) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key = normalize_name(stripped);
        trace!(%key, "environment entry");
        kv.set(&key, &value);
    }
}

/// Parse the process environment into the store.
pub fn parse_env(kv: &mut dyn KvSet) {
    parse_env_from(std::env::vars(), kv);
}
