//! Bidirectional ordinal↔key registry.
//!
//! Well-known VDXF keys are registered once at startup against small integer
//! ordinals so serialized payloads can substitute a 20-byte key with one or
//! two bytes. Both lookup directions live in a single immutable snapshot
//! behind the lock; registration rebuilds the snapshot and swaps it in, so a
//! concurrent reader can never observe the two indices half-updated.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use tracing::debug;
use vdxf_core::VdxfKey;

use crate::error::CodecError;
use crate::message::MessageKind;

/// What to do when an ordinal or key is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail loudly with a conflict error.
    #[default]
    Reject,
    /// Treat the second registration as a no-op, preserving the original
    /// mapping. Callers needing idempotent startup registration opt into
    /// this explicitly.
    Ignore,
}

/// One registered mapping, optionally tagged with the message type that
/// decodes payloads carried under this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub ordinal: u32,
    pub key: VdxfKey,
    pub kind: Option<MessageKind>,
}

#[derive(Debug, Clone, Default)]
struct Index {
    by_ordinal: BTreeMap<u32, RegistryEntry>,
    by_key: HashMap<VdxfKey, u32>,
}

/// Explicit registry value owned by whichever context constructs decoders.
///
/// Populated during initialization, read-many thereafter; shared across
/// threads by reference.
#[derive(Debug, Default)]
pub struct OrdinalRegistry {
    index: RwLock<Arc<Index>>,
}

impl OrdinalRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ordinal ↔ key`, keeping the mapping bijective.
    pub fn register(
        &self,
        ordinal: u32,
        key: VdxfKey,
        kind: Option<MessageKind>,
        policy: DuplicatePolicy,
    ) -> Result<(), CodecError> {
        let mut guard = self.index.write().expect("registry lock poisoned");
        if guard.by_ordinal.contains_key(&ordinal) || guard.by_key.contains_key(&key) {
            return match policy {
                DuplicatePolicy::Reject => Err(CodecError::RegistryConflict { ordinal }),
                DuplicatePolicy::Ignore => Ok(()),
            };
        }

        // Rebuild both indices in a fresh snapshot, then swap.
        let mut next = Index::clone(&guard);
        next.by_ordinal
            .insert(ordinal, RegistryEntry { ordinal, key, kind });
        next.by_key.insert(key, ordinal);
        *guard = Arc::new(next);
        debug!(ordinal, key = %key, "registered vdxf ordinal");
        Ok(())
    }

    fn snapshot(&self) -> Arc<Index> {
        Arc::clone(&self.index.read().expect("registry lock poisoned"))
    }

    #[must_use]
    pub fn is_recognized_ordinal(&self, ordinal: u32) -> bool {
        self.snapshot().by_ordinal.contains_key(&ordinal)
    }

    #[must_use]
    pub fn key_has_ordinal(&self, key: &VdxfKey) -> bool {
        self.snapshot().by_key.contains_key(key)
    }

    /// Forward lookup; `None` means callers fall back to encoding the full
    /// 20-byte key.
    #[must_use]
    pub fn ordinal_for_key(&self, key: &VdxfKey) -> Option<u32> {
        self.snapshot().by_key.get(key).copied()
    }

    /// Reverse lookup; `None` for unrecognized ordinals, never a failure.
    #[must_use]
    pub fn key_for_ordinal(&self, ordinal: u32) -> Option<VdxfKey> {
        self.snapshot()
            .by_ordinal
            .get(&ordinal)
            .map(|entry| entry.key)
    }

    #[must_use]
    pub fn entry_for_ordinal(&self, ordinal: u32) -> Option<RegistryEntry> {
        self.snapshot().by_ordinal.get(&ordinal).copied()
    }

    /// Resolves the decoder tag for generic deserialization.
    #[must_use]
    pub fn kind_for_key(&self, key: &VdxfKey) -> Option<MessageKind> {
        let snapshot = self.snapshot();
        let ordinal = snapshot.by_key.get(key)?;
        snapshot.by_ordinal.get(ordinal)?.kind
    }

    #[must_use]
    pub fn has_kind_for_key(&self, key: &VdxfKey) -> bool {
        self.kind_for_key(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().by_ordinal.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed ordinals of the well-known protocol message keys.
pub const LOGIN_RESPONSE_ORDINAL: u32 = 1;
pub const AUTHENTICATION_RESPONSE_ORDINAL: u32 = 2;
pub const REQUEST_USER_DATA_ORDINAL: u32 = 3;
pub const USER_DATA_REQUEST_ORDINAL: u32 = 4;

/// Registers the well-known protocol message keys.
///
/// Idempotent: uses [`DuplicatePolicy::Ignore`] so repeated startup paths do
/// not conflict.
pub fn register_well_known(registry: &OrdinalRegistry) -> Result<(), CodecError> {
    let entries = [
        (
            LOGIN_RESPONSE_ORDINAL,
            "vrsc::identity.loginresponsedetails",
            MessageKind::LoginResponse,
        ),
        (
            AUTHENTICATION_RESPONSE_ORDINAL,
            "vrsc::identity.authenticationresponsedetails",
            MessageKind::AuthenticationResponse,
        ),
        (
            REQUEST_USER_DATA_ORDINAL,
            "vrsc::identity.requestuserdata",
            MessageKind::RequestUserData,
        ),
        (
            USER_DATA_REQUEST_ORDINAL,
            "vrsc::identity.userdatarequest",
            MessageKind::UserDataRequest,
        ),
    ];
    for (ordinal, name, kind) in entries {
        registry.register(
            ordinal,
            VdxfKey::from_qualified_name(name),
            Some(kind),
            DuplicatePolicy::Ignore,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{register_well_known, DuplicatePolicy, OrdinalRegistry};
    use crate::error::CodecError;
    use crate::message::MessageKind;
    use vdxf_core::VdxfKey;

    fn key(tag: u8) -> VdxfKey {
        VdxfKey::new([tag; 20])
    }

    #[test]
    fn lookups_are_exact_inverses() {
        let registry = OrdinalRegistry::new();
        for ordinal in 0..8_u32 {
            registry
                .register(ordinal, key(ordinal as u8), None, DuplicatePolicy::Reject)
                .expect("registration should succeed");
        }
        for ordinal in 0..8_u32 {
            let found = registry.key_for_ordinal(ordinal).expect("key should exist");
            assert_eq!(registry.ordinal_for_key(&found), Some(ordinal));
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn duplicate_ordinal_is_rejected_by_default() {
        let registry = OrdinalRegistry::new();
        registry
            .register(7, key(1), None, DuplicatePolicy::Reject)
            .expect("first registration should succeed");
        let err = registry
            .register(7, key(2), None, DuplicatePolicy::Reject)
            .expect_err("duplicate ordinal should fail");
        assert!(matches!(err, CodecError::RegistryConflict { ordinal: 7 }));
    }

    #[test]
    fn duplicate_key_is_rejected_by_default() {
        let registry = OrdinalRegistry::new();
        registry
            .register(1, key(9), None, DuplicatePolicy::Reject)
            .expect("first registration should succeed");
        assert!(registry
            .register(2, key(9), None, DuplicatePolicy::Reject)
            .is_err());
    }

    #[test]
    fn ignore_policy_preserves_the_original_mapping() {
        let registry = OrdinalRegistry::new();
        registry
            .register(3, key(1), None, DuplicatePolicy::Reject)
            .expect("first registration should succeed");
        registry
            .register(3, key(2), None, DuplicatePolicy::Ignore)
            .expect("second registration should be a no-op");
        assert_eq!(registry.key_for_ordinal(3), Some(key(1)));
        assert_eq!(registry.ordinal_for_key(&key(2)), None);
    }

    #[test]
    fn unrecognized_lookups_return_none() {
        let registry = OrdinalRegistry::new();
        assert!(!registry.is_recognized_ordinal(42));
        assert!(!registry.key_has_ordinal(&key(0)));
        assert_eq!(registry.key_for_ordinal(42), None);
        assert_eq!(registry.ordinal_for_key(&key(0)), None);
    }

    #[test]
    fn well_known_registration_is_idempotent() {
        let registry = OrdinalRegistry::new();
        register_well_known(&registry).expect("first pass should succeed");
        register_well_known(&registry).expect("second pass should be a no-op");
        assert_eq!(registry.len(), 4);

        let login_key = VdxfKey::from_qualified_name("vrsc::identity.loginresponsedetails");
        assert_eq!(
            registry.kind_for_key(&login_key),
            Some(MessageKind::LoginResponse)
        );
        assert!(registry.has_kind_for_key(&login_key));
    }

    #[test]
    fn kind_is_optional() {
        let registry = OrdinalRegistry::new();
        registry
            .register(10, key(10), None, DuplicatePolicy::Reject)
            .expect("registration should succeed");
        assert!(registry.is_recognized_ordinal(10));
        assert!(!registry.has_kind_for_key(&key(10)));
    }
}
