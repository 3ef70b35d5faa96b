//! End-to-end session resumption through rustls.
//!
//! Handshakes run in memory between a rustls client and servers whose
//! ticketers are built from seed lists. A client that got a ticket from one
//! server resumes on any server holding the same seeds.

use std::sync::Arc;

use rustls::{
    ClientConfig, ClientConnection, HandshakeKind, RootCertStore, ServerConfig, ServerConnection,
    crypto::ring,
    pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer, ServerName},
};
use ticketseed_core::{TicketKeyManager, TicketSeeds};
use ticketseed_harness::SimEnv;
use ticketseed_server::RustlsTicketer;

struct Identity {
    cert: CertificateDer<'static>,
    key: Vec<u8>,
}

impl Identity {
    fn generate() -> Self {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        Self { cert: certified.cert.der().clone(), key: certified.key_pair.serialize_der() }
    }

    fn client_config(&self) -> Arc<ClientConfig> {
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.clone()).unwrap();
        let config = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Arc::new(config)
    }

    fn server_config(&self, ticketer: Arc<RustlsTicketer<SimEnv>>) -> Arc<ServerConfig> {
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.clone()));
        let mut config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![self.cert.clone()], key)
            .unwrap();
        config.ticketer = ticketer;
        Arc::new(config)
    }
}

fn ticketer(seed: u64, old: &[&str], current: &[&str]) -> Arc<RustlsTicketer<SimEnv>> {
    let seeds = TicketSeeds {
        old_seeds: old.iter().map(|s| (*s).to_string()).collect(),
        current_seeds: current.iter().map(|s| (*s).to_string()).collect(),
        new_seeds: Vec::new(),
    };
    let manager = TicketKeyManager::from_seeds(SimEnv::with_seed(seed), &seeds).unwrap();
    Arc::new(RustlsTicketer::new(manager))
}

/// Move TLS records between the peers until neither has anything to send.
fn pump(client: &mut ClientConnection, server: &mut ServerConnection) {
    loop {
        let mut moved = false;

        while client.wants_write() {
            let mut records = Vec::new();
            client.write_tls(&mut records).unwrap();
            let mut pending = records.as_slice();
            while !pending.is_empty() {
                server.read_tls(&mut pending).unwrap();
                server.process_new_packets().unwrap();
            }
            moved = true;
        }

        while server.wants_write() {
            let mut records = Vec::new();
            server.write_tls(&mut records).unwrap();
            let mut pending = records.as_slice();
            while !pending.is_empty() {
                client.read_tls(&mut pending).unwrap();
                client.process_new_packets().unwrap();
            }
            moved = true;
        }

        if !moved {
            break;
        }
    }
}

fn handshake(
    client_config: &Arc<ClientConfig>,
    server_config: &Arc<ServerConfig>,
) -> HandshakeKind {
    let name = ServerName::try_from("localhost").unwrap();
    let mut client = ClientConnection::new(Arc::clone(client_config), name).unwrap();
    let mut server = ServerConnection::new(Arc::clone(server_config)).unwrap();

    pump(&mut client, &mut server);

    assert!(!client.is_handshaking());
    assert!(!server.is_handshaking());
    client.handshake_kind().unwrap()
}

#[test]
fn ticket_from_one_server_resumes_on_another() {
    let identity = Identity::generate();
    let client = identity.client_config();
    let first = identity.server_config(ticketer(1, &[], &["alpha"]));
    let second = identity.server_config(ticketer(2, &[], &["alpha"]));

    assert_eq!(handshake(&client, &first), HandshakeKind::Full);
    assert_eq!(handshake(&client, &second), HandshakeKind::Resumed);
}

#[test]
fn retired_seed_still_resumes() {
    let identity = Identity::generate();
    let client = identity.client_config();
    let before = identity.server_config(ticketer(1, &[], &["alpha"]));
    let after = identity.server_config(ticketer(2, &["alpha"], &["beta"]));

    assert_eq!(handshake(&client, &before), HandshakeKind::Full);
    assert_eq!(handshake(&client, &after), HandshakeKind::Resumed);
}

#[test]
fn dropped_seed_falls_back_to_full_handshake() {
    let identity = Identity::generate();
    let client = identity.client_config();
    let before = identity.server_config(ticketer(1, &[], &["alpha"]));
    let after = identity.server_config(ticketer(2, &[], &["beta"]));

    assert_eq!(handshake(&client, &before), HandshakeKind::Full);
    assert_eq!(handshake(&client, &after), HandshakeKind::Full);
}

#[test]
fn rotation_in_place_drops_old_tickets() {
    let identity = Identity::generate();
    let client = identity.client_config();
    let ticketer = ticketer(1, &[], &["alpha"]);
    let server = identity.server_config(Arc::clone(&ticketer));

    assert_eq!(handshake(&client, &server), HandshakeKind::Full);

    ticketer.rotate(&[], &["beta"], &[]).unwrap();
    assert_eq!(handshake(&client, &server), HandshakeKind::Full);
    assert_eq!(handshake(&client, &server), HandshakeKind::Resumed);
}
