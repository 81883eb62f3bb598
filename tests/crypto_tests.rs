//! Integration tests for the PassKeeper crypto module.

use passkeeper::crypto::keys::{derive_data_key, derive_hmac_key, derive_login_verifier, MasterKey};
use passkeeper::crypto::encryption::SEAL_OVERHEAD;
use passkeeper::crypto::{derive_master_key, generate_salt, open, seal, Argon2Params};

fn fast() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// AES-256-GCM
// ---------------------------------------------------------------------------

#[test]
fn sealed_payload_opens_with_same_key_and_label() {
    let key = [0xABu8; 32];
    let plaintext = br#"[{"title":"Bank","username":"alice"}]"#;

    let sealed = seal(&key, b"credentials", plaintext).expect("seal should succeed");
    assert_eq!(sealed.len(), plaintext.len() + SEAL_OVERHEAD);

    let opened = open(&key, b"credentials", &sealed).expect("open should succeed");
    assert_eq!(opened, plaintext);
}

#[test]
fn fresh_nonce_per_seal() {
    let key = [0xCDu8; 32];
    let ct1 = seal(&key, b"", b"same").expect("seal 1");
    let ct2 = seal(&key, b"", b"same").expect("seal 2");
    assert_ne!(ct1, ct2, "two seals of the same plaintext must differ");
}

#[test]
fn wrong_key_label_truncation_and_tampering_all_fail() {
    let key = [0x11u8; 32];
    let mut sealed = seal(&key, b"alice", b"hunter2").expect("seal");

    assert!(open(&[0x22u8; 32], b"alice", &sealed).is_err());
    assert!(open(&key, b"bob", &sealed).is_err());
    assert!(open(&key, b"alice", &sealed[..5]).is_err());

    if let Some(byte) = sealed.get_mut(15) {
        *byte ^= 0xFF;
    }
    assert!(open(&key, b"alice", &sealed).is_err());
}

// ---------------------------------------------------------------------------
// Argon2id
// ---------------------------------------------------------------------------

#[test]
fn master_key_depends_on_password_and_salt() {
    let salt = generate_salt();
    let other_salt = generate_salt();

    let a = derive_master_key(b"correct horse", &salt, &fast()).expect("a");
    let b = derive_master_key(b"correct horse", &salt, &fast()).expect("b");
    let c = derive_master_key(b"correct horse", &other_salt, &fast()).expect("c");
    let d = derive_master_key(b"battery staple", &salt, &fast()).expect("d");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
}

#[test]
fn weak_argon2_params_are_refused() {
    let weak = Argon2Params {
        memory_kib: 1_024,
        iterations: 1,
        parallelism: 1,
    };
    assert!(weak.validate().is_err());
    assert!(derive_master_key(b"pw", &generate_salt(), &weak).is_err());
    assert!(fast().validate().is_ok());
}

// ---------------------------------------------------------------------------
// HKDF sub-keys
// ---------------------------------------------------------------------------

#[test]
fn sub_keys_are_distinct_and_stable() {
    let master = [0x55u8; 32];

    let data = derive_data_key(&master).expect("data key");
    let hmac = derive_hmac_key(&master).expect("hmac key");
    let verifier = derive_login_verifier(&master).expect("verifier");

    assert_ne!(data, hmac);
    assert_ne!(data, verifier);
    assert_ne!(hmac, verifier);
    assert_eq!(data, derive_data_key(&master).expect("again"));
}

#[test]
fn master_key_wrapper_matches_free_functions() {
    let raw = [0x44u8; 32];
    let mk = MasterKey::new(raw);

    assert_eq!(mk.derive_data_key().unwrap(), derive_data_key(&raw).unwrap());
    assert_eq!(mk.derive_hmac_key().unwrap(), derive_hmac_key(&raw).unwrap());
    assert!(format!("{mk:?}").contains("REDACTED"));
}
