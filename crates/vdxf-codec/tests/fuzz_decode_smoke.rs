use std::panic;

use vdxf_codec::flags::{CapabilityFlags, FLAG_FULL_DATA, FLAG_HAS_SIGNER};
use vdxf_codec::{
    AuthenticationResponseDetails, CompactIdentityAddress, DataSigner, LoginResponseDetails,
    RequestUserData, SignerType, UserDataRequest,
};

fn xorshift64(state: &mut u64) -> u64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut s = seed.max(1);
    let mut out = vec![0_u8; len];
    for b in &mut out {
        *b = (xorshift64(&mut s) & 0xFF) as u8;
    }
    out
}

fn decode_all(data: &[u8], case: u64) {
    let login = panic::catch_unwind(|| LoginResponseDetails::from_buffer(data, 0));
    assert!(login.is_ok(), "login decode panicked at case {case}");

    let auth = panic::catch_unwind(|| AuthenticationResponseDetails::from_buffer(data, 0));
    assert!(auth.is_ok(), "auth decode panicked at case {case}");

    let request = panic::catch_unwind(|| RequestUserData::from_buffer(data, 0));
    assert!(request.is_ok(), "request decode panicked at case {case}");

    let user_data = panic::catch_unwind(|| UserDataRequest::from_buffer(data, 0));
    assert!(user_data.is_ok(), "user data decode panicked at case {case}");

    let compact = panic::catch_unwind(|| CompactIdentityAddress::from_buffer(data, 0));
    assert!(compact.is_ok(), "compact address decode panicked at case {case}");
}

#[test]
fn fuzz_like_random_inputs_do_not_panic_decoders() {
    for i in 0..2000_u64 {
        let len = ((i as usize) * 73) % 2048;
        let data = random_bytes(0xBAD5EED ^ i, len);
        decode_all(&data, i);
    }
}

#[test]
fn fuzz_like_mutations_of_valid_vectors_do_not_panic() {
    let valid = UserDataRequest {
        flags: CapabilityFlags::from_mask(FLAG_FULL_DATA | FLAG_HAS_SIGNER),
        search_data_key: vec![("identity.name".to_string(), "bob".to_string())],
        signer: Some(DataSigner {
            version: 1,
            signer_type: SignerType::Fqn,
            address: "bob@".to_string(),
            root_system_name: "vrsc".to_string(),
        }),
        requested_keys: Some(vec!["vrsc::profile.avatar".to_string()]),
        request_id: Some("challenge".to_string()),
        ..UserDataRequest::default()
    }
    .to_buffer();

    let mut bytes = valid;
    for i in 0..512_usize {
        let idx = i % bytes.len();
        bytes[idx] ^= (i as u8).wrapping_mul(31).wrapping_add(1);
        decode_all(&bytes.clone(), i as u64);
    }
}
