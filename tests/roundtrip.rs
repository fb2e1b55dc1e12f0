//! End-to-end round-trip coverage: record graphs through the flat store,
//! the opaque codecs, and the env-file adapter, plus property-based
//! round trips over generated scalar records.

use proptest::prelude::*;
use tempfile::TempDir;

use flatconf::{export, impl_record, import, CertBundle, KvGet, MemoryStore, PrivateKey};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Peer {
    host: String,
    port: i64,
}

impl_record!(Peer {
    host: string("peer_host"),
    port: int("peer_port"),
});

#[derive(Debug, Default, PartialEq)]
struct ServerConfig {
    name: String,
    listen_port: i64,
    motd: Option<String>,
    peers: Vec<Peer>,
    signing_key: Option<PrivateKey>,
    tls: Option<CertBundle>,
}

impl_record!(ServerConfig {
    name: string("name"),
    listen_port: int("listen_port"),
    motd: opt_string("motd"),
    peers: records,
    signing_key: opaque("signing_key"),
    tls: opaque("tls"),
});

fn sample_config() -> ServerConfig {
    ServerConfig {
        name: "edge-1".to_string(),
        listen_port: 8443,
        motd: Some("hello".to_string()),
        peers: vec![
            Peer {
                host: "10.0.0.1".to_string(),
                port: 7000,
            },
            Peer {
                host: "10.0.0.2".to_string(),
                port: 7001,
            },
        ],
        signing_key: Some(PrivateKey::from_der(vec![0x30, 0x82, 0x04, 0xa4])),
        tls: Some(CertBundle::new(
            vec![vec![0xde, 0xad], vec![0xbe, 0xef]],
            vec![0x30, 0x81],
        )),
    }
}

#[test]
fn full_config_roundtrip() {
    init_tracing();
    let config = sample_config();
    let mut store = MemoryStore::new();
    export(&config, &mut store).unwrap();

    // scalars at the ServerConfig occurrence, peers at theirs
    assert_eq!(store.get("name_0"), "edge-1");
    assert_eq!(store.get("peer_host_0"), "10.0.0.1");
    assert_eq!(store.get("peer_host_1"), "10.0.0.2");

    // bundle with 2 chain links and a key decomposes into 3 values
    assert!(store.contains("tls_cert_0"));
    assert!(store.contains("tls_cert2_0"));
    assert!(store.contains("tls_pk_0"));
    assert!(store.contains("signing_key_0"));

    let mut restored = ServerConfig::default();
    import(&store, &mut restored).unwrap();
    assert_eq!(restored, config);
}

#[test]
fn roundtrip_through_env_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("server.env");

    let config = sample_config();
    let mut store = MemoryStore::new();
    export(&config, &mut store).unwrap();
    store.write_env_file(&path).unwrap();

    let mut loaded = MemoryStore::new();
    loaded.read_env_file(&path).unwrap();
    let mut restored = ServerConfig::default();
    import(&loaded, &mut restored).unwrap();

    assert_eq!(restored, config);
}

#[test]
fn bundle_reconstructed_from_exactly_three_values() {
    let mut store = MemoryStore::new();
    export(&sample_config(), &mut store).unwrap();

    let minimal: MemoryStore = store
        .iter()
        .filter(|(k, _)| k.starts_with("tls_"))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(minimal.len(), 3);

    let mut restored = ServerConfig::default();
    import(&minimal, &mut restored).unwrap();
    let bundle = restored.tls.expect("bundle present");
    assert_eq!(bundle.chain.len(), 2);
}

#[test]
fn missing_pk_leaves_bundle_unset_but_scalars_import() {
    let mut store = MemoryStore::new();
    export(&sample_config(), &mut store).unwrap();

    let without_pk: MemoryStore = store
        .iter()
        .filter(|(k, _)| *k != "tls_pk_0")
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut restored = ServerConfig::default();
    import(&without_pk, &mut restored).unwrap();
    assert!(restored.tls.is_none());
    assert_eq!(restored.name, "edge-1");
    assert_eq!(restored.peers.len(), 2);
}

#[test]
fn args_and_env_land_on_walkable_keys() {
    let mut store = MemoryStore::new();
    flatconf::args::parse_args_from(
        vec!["--name=edge-2".to_string(), "--listen-port".to_string(), "9000".to_string()],
        &mut store,
    )
    .unwrap();
    flatconf::args::parse_env_from(
        [("CFG_MOTD".to_string(), "welcome".to_string())],
        &mut store,
    );

    let mut config = ServerConfig::default();
    import(&store, &mut config).unwrap();

    assert_eq!(config.name, "edge-2");
    assert_eq!(config.listen_port, 9000);
    assert_eq!(config.motd, Some("welcome".to_string()));
}

proptest! {
    // Records whose fields are all tagged scalars survive a round trip
    // field-for-field.
    #[test]
    fn prop_tagged_scalar_roundtrip(host in any::<String>(), port in any::<i64>()) {
        let peer = Peer { host, port };
        let mut store = MemoryStore::new();
        export(&peer, &mut store).unwrap();

        let mut restored = Peer::default();
        import(&store, &mut restored).unwrap();
        prop_assert_eq!(restored, peer);
    }

    // A collection exported with n elements probes back to exactly n.
    #[test]
    fn prop_collection_cardinality_roundtrip(
        peers in proptest::collection::vec((any::<String>(), any::<i64>()), 0..6)
    ) {
        #[derive(Debug, Default)]
        struct Holder {
            peers: Vec<Peer>,
        }
        impl_record!(Holder { peers: records });

        let holder = Holder {
            peers: peers
                .into_iter()
                .map(|(host, port)| Peer { host, port })
                .collect(),
        };
        let mut store = MemoryStore::new();
        export(&holder, &mut store).unwrap();

        let mut restored = Holder::default();
        import(&store, &mut restored).unwrap();
        prop_assert_eq!(restored.peers, holder.peers);
    }
}
