//! Rotation scenarios across independently configured managers.

use ticketseed_core::{
    Classification, DispatchError, RotationError, TicketEvent, TicketKeyManager, TicketMode,
    TicketStatus,
};
use ticketseed_crypto::{Iv, KeyNameField, derive_base_key, derive_key_name};
use ticketseed_harness::{RecordingCipher, RecordingMac, RecordingStats, SimEnv};

fn manager(seed: u64, old: &[&str], current: &[&str], new: &[&str]) -> TicketKeyManager<SimEnv> {
    let mut manager = TicketKeyManager::new(SimEnv::with_seed(seed));
    manager.set_seeds(old, current, new).unwrap();
    manager
}

struct Issued {
    key_name: KeyNameField,
    iv: Iv,
    cipher: RecordingCipher,
    mac: RecordingMac,
}

fn issue(manager: &TicketKeyManager<SimEnv>) -> Issued {
    let mut issued = Issued {
        key_name: KeyNameField::default(),
        iv: Iv::default(),
        cipher: RecordingCipher::new(),
        mac: RecordingMac::new(),
    };
    let status = manager.ticket_callback(
        &mut issued.key_name,
        &mut issued.iv,
        &mut issued.cipher,
        &mut issued.mac,
        TicketMode::Encrypt,
    );
    assert_eq!(status, TicketStatus::Success);
    issued
}

fn resume(manager: &TicketKeyManager<SimEnv>, issued: &Issued) -> (TicketStatus, RecordingCipher) {
    let mut key_name = issued.key_name;
    let mut iv = issued.iv;
    let mut cipher = RecordingCipher::new();
    let mut mac = RecordingMac::new();

    let status =
        manager.ticket_callback(&mut key_name, &mut iv, &mut cipher, &mut mac, TicketMode::Decrypt);
    if status.is_success() {
        assert_eq!(mac.key(), issued.mac.key(), "resumed MAC key must match issuer");
    }
    (status, cipher)
}

#[test]
fn retired_seed_resumes_with_renewal() {
    let m1 = manager(1, &[], &["alpha"], &[]);
    let ticket = issue(&m1);

    let m2 = manager(2, &["alpha"], &["beta"], &[]);
    let (status, cipher) = resume(&m2, &ticket);

    assert_eq!(status, TicketStatus::Renew);
    assert_eq!(status.as_raw(), 2);
    assert_eq!(cipher.setup().unwrap().key, ticket.cipher.setup().unwrap().key);
}

#[test]
fn servers_with_same_seeds_share_tickets() {
    let m1 = manager(1, &[], &["alpha"], &[]);
    let m2 = manager(2, &[], &["alpha"], &[]);

    let ticket = issue(&m1);
    let (status, cipher) = resume(&m2, &ticket);

    assert_eq!(status, TicketStatus::Success);
    let recovered = cipher.setup().unwrap();
    assert_eq!(recovered.key, ticket.cipher.setup().unwrap().key);
    assert_eq!(recovered.iv, ticket.iv);
    assert_eq!(recovered.mode, TicketMode::Decrypt);
}

#[test]
fn new_seed_accepts_tickets_from_servers_that_rotated_first() {
    let ahead = manager(1, &["alpha"], &["beta"], &[]);
    let behind = manager(2, &[], &["alpha"], &["beta"]);

    let (status, _) = resume(&behind, &issue(&ahead));

    assert_eq!(status, TicketStatus::Success);
}

#[test]
fn new_seed_is_never_used_to_encrypt() {
    let manager = manager(3, &[], &["alpha"], &["beta"]);
    let beta = derive_key_name(&derive_base_key(b"beta"));

    for _ in 0..32 {
        assert_ne!(issue(&manager).key_name.key_name(), beta);
    }
}

#[test]
fn dropped_seed_reports_unknown_key() {
    let ticket = issue(&manager(1, &[], &["alpha"], &[]));

    let rotated = manager(2, &[], &["beta"], &[]);
    let (status, cipher) = resume(&rotated, &ticket);

    assert_eq!(status, TicketStatus::UnknownKey);
    assert_eq!(status.as_raw(), 0);
    assert!(!cipher.is_configured());
}

#[test]
fn rotation_in_place_keeps_issued_tickets_valid() {
    let mut manager = manager(4, &[], &["alpha"], &["beta"]);
    let ticket = issue(&manager);

    manager.set_seeds(&["alpha"], &["beta"], &[]).unwrap();
    assert_eq!(resume(&manager, &ticket).0, TicketStatus::Renew);

    manager.set_seeds(&[], &["beta"], &[]).unwrap();
    assert_eq!(resume(&manager, &ticket).0, TicketStatus::UnknownKey);
}

#[test]
fn rejected_rotation_leaves_keys_usable() {
    let mut manager = manager(5, &[], &["alpha"], &[]);
    let ticket = issue(&manager);

    let err = manager.set_seeds(&["alpha"], &[], &["beta"]).unwrap_err();
    assert_eq!(err, RotationError::NoCurrentSeeds);

    assert_eq!(resume(&manager, &ticket).0, TicketStatus::Success);
    assert_eq!(manager.seeds().current_seeds, vec!["alpha"]);
}

#[test]
fn duplicate_secret_collapses_to_most_active_classification() {
    let manager = manager(6, &["alpha"], &["alpha"], &["alpha"]);
    let registry = manager.registry().unwrap();

    assert_eq!(registry.len(), 1);
    let key = registry.keys().next().unwrap();
    assert_eq!(key.classification(), Classification::Current);

    let (status, _) = resume(&manager, &issue(&manager));
    assert_eq!(status, TicketStatus::Success);
}

#[test]
fn each_ticket_gets_a_fresh_salt_and_iv() {
    let manager = manager(7, &[], &["alpha"], &[]);

    let first = issue(&manager);
    let second = issue(&manager);

    assert_eq!(first.key_name.key_name(), second.key_name.key_name());
    assert_ne!(first.key_name.split().1, second.key_name.split().1);
    assert_ne!(first.iv, second.iv);
    assert_ne!(first.cipher.setup().unwrap().key, second.cipher.setup().unwrap().key);
}

#[test]
fn entropy_failure_fails_only_the_call() {
    let env = SimEnv::with_seed(8);
    let mut manager = TicketKeyManager::new(env.clone());
    manager.set_seeds(&[], &["alpha"], &[]).unwrap();

    env.exhaust();
    assert!(matches!(manager.issue_ticket_keys(), Err(DispatchError::Entropy(_))));

    env.restore();
    assert!(manager.issue_ticket_keys().is_ok());
}

#[test]
fn primitive_failure_is_a_call_error() {
    let manager = manager(9, &[], &["alpha"], &[]);
    let mut key_name = KeyNameField::default();
    let mut iv = Iv::default();

    let status = manager.ticket_callback(
        &mut key_name,
        &mut iv,
        &mut RecordingCipher::new(),
        &mut RecordingMac::failing(),
        TicketMode::Encrypt,
    );

    assert_eq!(status, TicketStatus::Error);
    assert_eq!(status.as_raw(), -1);
    issue(&manager);
}

#[test]
fn stats_follow_rotation_and_tickets() {
    let stats = RecordingStats::shared();
    let mut manager = TicketKeyManager::new(SimEnv::with_seed(10));
    manager.set_stats(stats.handle());

    manager.set_seeds(&[], &["alpha"], &["beta"]).unwrap();
    let ticket = issue(&manager);
    manager.set_seeds::<&str>(&["alpha"], &[], &[]).unwrap_err();
    manager.set_seeds(&["alpha"], &["beta"], &[]).unwrap();
    resume(&manager, &ticket);

    let rotations = stats.rotations();
    assert_eq!(rotations.len(), 2);
    assert_eq!(rotations[1].old.added, 1);
    assert_eq!(rotations[1].reused_keys, 0);
    assert_eq!(stats.rejections(), vec![RotationError::NoCurrentSeeds]);
    assert_eq!(stats.tickets(), vec![TicketEvent::Issued, TicketEvent::Renewed]);
    assert_eq!(stats.count(TicketEvent::Renewed), 1);
}
