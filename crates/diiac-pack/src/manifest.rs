//! # Artefact Manifest Builder
//!
//! Produces `governance_manifest.json` for an execution and the pack hash
//! that the ledger seals.
//!
//! ## Two-Pass Pack Hash
//!
//! 1. List the artefacts (sorted), hash each file, and compute the
//!    *provisional* pack hash over the concatenated hex digests.
//! 2. Embed that hash in the manifest and write the manifest into the same
//!    directory.
//! 3. Re-list (the manifest is now included), re-hash, and compute the
//!    *final* pack hash.
//!
//! The final hash covers the manifest, so it necessarily differs from the
//! `pack_hash` written inside the manifest. The ledger records the final
//! hash; [`ManifestBuilder::recompute_pack_hash()`] reproduces it from the
//! stored files.

use diiac_core::{
    sha256_bytes, ContentDigest, ExecutionId, PolicyLevel, ReasoningLevel, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::error::{PackError, StoreError};
use crate::store::ArtefactStore;

/// Schema tag for manifests produced by this crate.
pub const GOVERNANCE_CONTRACT_ID: &str = "DIIaC_CORE_V1";

/// File name of the manifest inside the artefact directory.
pub const MANIFEST_FILE: &str = "governance_manifest.json";

/// One artefact and the SHA-256 of its full contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtefactEntry {
    pub name: String,
    pub hash: ContentDigest,
}

/// The manifest written as `governance_manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtefactManifest {
    pub execution_id: ExecutionId,
    #[serde(rename = "governance_contract")]
    pub governance_contract_id: String,
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
    pub context_hash: ContentDigest,
    pub artefacts: Vec<ArtefactEntry>,
    /// Provisional pack hash: covers every artefact except the manifest.
    pub pack_hash: ContentDigest,
    pub generated_at: Timestamp,
}

/// Execution facts copied into the manifest header.
#[derive(Debug, Clone, Copy)]
pub struct ManifestContext {
    pub execution_id: ExecutionId,
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
    pub context_hash: ContentDigest,
}

/// Result of a two-pass build.
#[derive(Debug, Clone)]
pub struct ManifestBuild {
    pub manifest: ArtefactManifest,
    /// Pack hash over all artefacts including the manifest. This is the
    /// value sealed in the ledger.
    pub final_pack_hash: ContentDigest,
    /// Number of artefact files including the manifest.
    pub artefact_count: usize,
}

/// Aggregate digest over artefact hashes in the given order.
///
/// SHA-256 of the concatenated 64-character lowercase hex strings.
pub fn compute_pack_hash(entries: &[ArtefactEntry]) -> ContentDigest {
    let joined: String = entries.iter().map(|e| e.hash.to_hex()).collect();
    sha256_bytes(joined.as_bytes())
}

/// Builds and re-derives manifests over an [`ArtefactStore`].
pub struct ManifestBuilder<'a> {
    store: &'a dyn ArtefactStore,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(store: &'a dyn ArtefactStore) -> Self {
        Self { store }
    }

    /// Hash every artefact of an execution in sorted name order.
    pub fn hash_artefacts(&self, execution_id: &ExecutionId) -> Result<Vec<ArtefactEntry>, PackError> {
        let names = self.store.list(execution_id)?;
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let bytes = self.store.read(execution_id, &name)?;
            entries.push(ArtefactEntry {
                hash: sha256_bytes(&bytes),
                name,
            });
        }
        Ok(entries)
    }

    /// Run the two-pass build: write the manifest, then hash the full set.
    pub fn build(
        &self,
        ctx: ManifestContext,
        generated_at: Timestamp,
    ) -> Result<ManifestBuild, PackError> {
        let artefacts = self.hash_artefacts(&ctx.execution_id)?;
        let provisional = compute_pack_hash(&artefacts);

        let manifest = ArtefactManifest {
            execution_id: ctx.execution_id,
            governance_contract_id: GOVERNANCE_CONTRACT_ID.to_string(),
            reasoning_level: ctx.reasoning_level,
            policy_level: ctx.policy_level,
            context_hash: ctx.context_hash,
            artefacts,
            pack_hash: provisional,
            generated_at,
        };
        let bytes = serde_json::to_vec_pretty(&manifest)?;
        self.store.write(&ctx.execution_id, MANIFEST_FILE, &bytes)?;

        let (final_pack_hash, artefact_count) = self.recompute_pack_hash(&ctx.execution_id)?;
        tracing::debug!(
            execution_id = %ctx.execution_id,
            provisional = %provisional,
            final_pack_hash = %final_pack_hash,
            artefact_count,
            "manifest written"
        );
        Ok(ManifestBuild {
            manifest,
            final_pack_hash,
            artefact_count,
        })
    }

    /// Re-derive the final pack hash and artefact count from stored files.
    pub fn recompute_pack_hash(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<(ContentDigest, usize), PackError> {
        let entries = self.hash_artefacts(execution_id)?;
        Ok((compute_pack_hash(&entries), entries.len()))
    }

    /// Load a previously written manifest.
    pub fn load(&self, execution_id: &ExecutionId) -> Result<ArtefactManifest, PackError> {
        let bytes = self.store.read(execution_id, MANIFEST_FILE).map_err(|e| match e {
            StoreError::ArtefactNotFound { execution_id, .. } => {
                StoreError::ExecutionNotFound(execution_id)
            }
            other => other,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| PackError::ManifestUnreadable {
            execution_id: *execution_id,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FsArtefactStore, MemoryArtefactStore};

    fn ctx(id: ExecutionId) -> ManifestContext {
        ManifestContext {
            execution_id: id,
            reasoning_level: ReasoningLevel::R3,
            policy_level: PolicyLevel::P2,
            context_hash: sha256_bytes(b"{\"intent\":\"Expand into APAC market\"}"),
        }
    }

    fn seeded(store: &dyn ArtefactStore) -> ExecutionId {
        let id = ExecutionId::new();
        store.create_execution(&id).unwrap();
        store.write(&id, "decision_summary.json", b"{\"a\":1}").unwrap();
        store.write(&id, "strategy_report.json", b"{\"b\":2}").unwrap();
        id
    }

    fn ts() -> Timestamp {
        Timestamp::parse("2026-03-01T09:00:00Z").unwrap()
    }

    #[test]
    fn pack_hash_is_sha256_of_concatenated_hex() {
        let a = sha256_bytes(b"one");
        let b = sha256_bytes(b"two");
        let entries = vec![
            ArtefactEntry { name: "a".into(), hash: a },
            ArtefactEntry { name: "b".into(), hash: b },
        ];
        let expected = sha256_bytes(format!("{}{}", a.to_hex(), b.to_hex()).as_bytes());
        assert_eq!(compute_pack_hash(&entries), expected);
    }

    #[test]
    fn empty_set_hashes_empty_string() {
        assert_eq!(compute_pack_hash(&[]), sha256_bytes(b""));
    }

    #[test]
    fn build_writes_manifest_with_provisional_hash() {
        let store = MemoryArtefactStore::new();
        let id = seeded(&store);
        let build = ManifestBuilder::new(&store).build(ctx(id), ts()).unwrap();

        let names: Vec<_> = build.manifest.artefacts.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["decision_summary.json", "strategy_report.json"]);
        assert_eq!(build.manifest.governance_contract_id, GOVERNANCE_CONTRACT_ID);
        assert_eq!(build.artefact_count, 3);
        assert_ne!(build.manifest.pack_hash, build.final_pack_hash);
        assert_eq!(
            build.manifest.pack_hash,
            compute_pack_hash(&build.manifest.artefacts)
        );
    }

    #[test]
    fn final_hash_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtefactStore::new(dir.path());
        let id = seeded(&store);
        let builder = ManifestBuilder::new(&store);
        let build = builder.build(ctx(id), ts()).unwrap();

        let (again, count) = builder.recompute_pack_hash(&id).unwrap();
        let (third, _) = builder.recompute_pack_hash(&id).unwrap();
        assert_eq!(again, build.final_pack_hash);
        assert_eq!(third, again);
        assert_eq!(count, 3);
    }

    #[test]
    fn tampered_artefact_changes_final_hash() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtefactStore::new(dir.path());
        let id = seeded(&store);
        let builder = ManifestBuilder::new(&store);
        let build = builder.build(ctx(id), ts()).unwrap();

        let path = dir
            .path()
            .join(id.to_string())
            .join("artefacts")
            .join("strategy_report.json");
        std::fs::write(path, b"{\"b\":3}").unwrap();

        let (after, _) = builder.recompute_pack_hash(&id).unwrap();
        assert_ne!(after, build.final_pack_hash);
    }

    #[test]
    fn load_round_trips_written_manifest() {
        let store = MemoryArtefactStore::new();
        let id = seeded(&store);
        let builder = ManifestBuilder::new(&store);
        let build = builder.build(ctx(id), ts()).unwrap();
        assert_eq!(builder.load(&id).unwrap(), build.manifest);
    }

    #[test]
    fn manifest_json_uses_governance_contract_key() {
        let store = MemoryArtefactStore::new();
        let id = seeded(&store);
        ManifestBuilder::new(&store).build(ctx(id), ts()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_slice(&store.read(&id, MANIFEST_FILE).unwrap()).unwrap();
        assert_eq!(raw["governance_contract"], "DIIaC_CORE_V1");
        assert_eq!(raw["reasoning_level"], "R3");
        assert_eq!(raw["generated_at"], "2026-03-01T09:00:00Z");
    }

    #[test]
    fn load_without_manifest_is_not_found() {
        let store = MemoryArtefactStore::new();
        let id = seeded(&store);
        assert!(matches!(
            ManifestBuilder::new(&store).load(&id),
            Err(PackError::Store(StoreError::ExecutionNotFound(_)))
        ));
    }

    #[test]
    fn second_build_is_rejected() {
        let store = MemoryArtefactStore::new();
        let id = seeded(&store);
        let builder = ManifestBuilder::new(&store);
        builder.build(ctx(id), ts()).unwrap();
        assert!(matches!(
            builder.build(ctx(id), ts()),
            Err(PackError::Store(StoreError::ArtefactExists { .. }))
        ));
    }
}
