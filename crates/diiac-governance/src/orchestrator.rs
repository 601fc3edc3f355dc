//! # Governed Execution
//!
//! One execution moves through a fixed sequence of stages:
//!
//! ```text
//! RECEIVED → CONTEXT_LOADED → GENERATED → ENFORCED
//!          → ARTEFACTS_WRITTEN → MANIFESTED → SEALED
//! ```
//!
//! Sealing (the ledger append) is the last step and the commit point. Any
//! earlier failure, or cancellation of the future, leaves no ledger record
//! and discards the execution's artefact directory.

use std::sync::Arc;
use std::time::{Duration, Instant};

use diiac_core::{
    ContentDigest, ExecutionId, PolicyLevel, ProviderId, ReasoningLevel, TierPolicy, Timestamp,
};
use diiac_ledger::{ChainLink, ExecutionRecord, Ledger};
use diiac_pack::{
    enforce, validate_artefact_name, ArtefactManifest, ArtefactStore, DecisionSummary,
    FsArtefactStore, GovernedReport, ManifestBuilder, ManifestContext, TierEnforcement,
    DECISION_SUMMARY_FILE, STRATEGY_REPORT_FILE,
};
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::generator::{
    ContentGenerator, DisabledGenerator, GenerationError, GenerationRequest, OpenAiGenerator,
};
use crate::intent::{FsIntentStore, IntentStore};

/// Stage reached by an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExecutionStage {
    Received,
    ContextLoaded,
    Generated,
    Enforced,
    ArtefactsWritten,
    Manifested,
    Sealed,
}

impl ExecutionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::ContextLoaded => "CONTEXT_LOADED",
            Self::Generated => "GENERATED",
            Self::Enforced => "ENFORCED",
            Self::ArtefactsWritten => "ARTEFACTS_WRITTEN",
            Self::Manifested => "MANIFESTED",
            Self::Sealed => "SEALED",
        }
    }

    /// The following stage. `Sealed` is terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::ContextLoaded),
            Self::ContextLoaded => Some(Self::Generated),
            Self::Generated => Some(Self::Enforced),
            Self::Enforced => Some(Self::ArtefactsWritten),
            Self::ArtefactsWritten => Some(Self::Manifested),
            Self::Manifested => Some(Self::Sealed),
            Self::Sealed => None,
        }
    }
}

impl std::fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks progress and refuses to skip or repeat a stage.
struct StageTracker {
    current: ExecutionStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            current: ExecutionStage::Received,
        }
    }

    fn advance(&mut self, to: ExecutionStage) {
        debug_assert_eq!(self.current.next(), Some(to), "stage skipped");
        self.current = to;
        tracing::debug!(stage = %to, "execution stage");
    }
}

/// Parameters of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub provider: ProviderId,
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
}

/// What a sealed execution returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub execution_id: ExecutionId,
    pub provider: ProviderId,
    pub reasoning_level: ReasoningLevel,
    pub policy_level: PolicyLevel,
    /// Final pack hash sealed in the ledger.
    pub pack_hash: ContentDigest,
    /// `record_hash` of the new ledger tail.
    pub ledger_root: ChainLink,
    #[serde(skip)]
    pub enforced_sections: Vec<String>,
}

/// Read-only chain health summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustState {
    pub valid: bool,
    pub record_count: usize,
    pub ledger_root: ChainLink,
    pub frozen: bool,
}

/// Offline re-derivation of an execution's pack hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RehashReport {
    pub execution_id: ExecutionId,
    pub pack_hash: ContentDigest,
    pub artefact_count: usize,
    /// The value sealed in the ledger, if the execution has a record.
    pub sealed_pack_hash: Option<ContentDigest>,
    pub matches_ledger: bool,
}

/// Discards an execution's artefacts on drop unless committed.
struct PendingPack<'a> {
    store: &'a dyn ArtefactStore,
    execution_id: ExecutionId,
    committed: bool,
}

impl Drop for PendingPack<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match self.store.discard(&self.execution_id) {
            Ok(()) => tracing::debug!(execution_id = %self.execution_id, "partial pack discarded"),
            Err(e) => tracing::warn!(
                execution_id = %self.execution_id,
                error = %e,
                "failed to discard partial pack"
            ),
        }
    }
}

/// Runs governed executions and answers trust queries.
pub struct Orchestrator {
    intents: Arc<dyn IntentStore>,
    generator: Arc<dyn ContentGenerator>,
    artefacts: Arc<dyn ArtefactStore>,
    ledger: Arc<Ledger>,
    generation_timeout: Duration,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("generator", &self.generator.name())
            .field("ledger", &self.ledger)
            .field("generation_timeout", &self.generation_timeout)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        intents: Arc<dyn IntentStore>,
        generator: Arc<dyn ContentGenerator>,
        artefacts: Arc<dyn ArtefactStore>,
        ledger: Arc<Ledger>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            intents,
            generator,
            artefacts,
            ledger,
            generation_timeout,
        }
    }

    /// Filesystem-backed orchestrator laid out per `config`.
    pub fn from_config(config: &GovernanceConfig) -> Result<Self, GovernanceError> {
        let generator: Arc<dyn ContentGenerator> = if config.llm_enabled {
            Arc::new(OpenAiGenerator::new(config)?)
        } else {
            Arc::new(DisabledGenerator)
        };
        tracing::info!(
            generator = generator.name(),
            ledger = %config.ledger_path.display(),
            packs = %config.decision_pack_dir.display(),
            "governance orchestrator configured"
        );
        Ok(Self::new(
            Arc::new(FsIntentStore::new(&config.human_input_dir)),
            generator,
            Arc::new(FsArtefactStore::new(&config.decision_pack_dir)),
            Arc::new(Ledger::open_jsonl(&config.ledger_path)),
            config.generation_timeout(),
        ))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Persist a human-intent document; returns the stored name.
    pub fn capture_intent(&self, document: &Value) -> Result<String, GovernanceError> {
        Ok(self.intents.capture(document)?)
    }

    /// Run one governed execution to a sealed ledger record.
    pub async fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Result<ExecutionOutcome, GovernanceError> {
        let execution_id = ExecutionId::new();
        let span = tracing::info_span!(
            "execution",
            %execution_id,
            provider = %request.provider,
            reasoning = %request.reasoning_level,
            policy = %request.policy_level,
        );
        let started = Instant::now();
        let mut stages = StageTracker::new();

        let result = self
            .run(execution_id, request, &mut stages)
            .instrument(span.clone())
            .await;

        let outcome_label = match &result {
            Ok(outcome) => {
                metrics::counter!("diiac_enforced_sections_total")
                    .increment(outcome.enforced_sections.len() as u64);
                "sealed"
            }
            Err(e) => {
                span.in_scope(|| {
                    tracing::warn!(
                        stage = %stages.current,
                        kind = %e.kind(),
                        error = %e,
                        "execution failed"
                    )
                });
                e.kind().as_str()
            }
        };
        metrics::counter!("diiac_executions_total", "outcome" => outcome_label).increment(1);
        metrics::histogram!("diiac_execution_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        result
    }

    async fn run(
        &self,
        execution_id: ExecutionId,
        request: ExecutionRequest,
        stages: &mut StageTracker,
    ) -> Result<ExecutionOutcome, GovernanceError> {
        let ExecutionRequest {
            provider,
            reasoning_level,
            policy_level,
        } = request;

        let intent = self.intents.latest()?.ok_or(GovernanceError::NoIntent)?;
        let context = intent.to_json()?;
        let context_hash = intent.context_hash();
        stages.advance(ExecutionStage::ContextLoaded);

        let guidance = TierPolicy::required_sections(reasoning_level, policy_level);
        let generation = self.generator.generate(GenerationRequest {
            context: &context,
            requirement: &guidance,
        });
        let raw = tokio::time::timeout(self.generation_timeout, generation)
            .await
            .map_err(|_| GenerationError::Timeout(self.generation_timeout))??;
        let mut report = GovernedReport::from_value(raw)
            .map_err(|e| GenerationError::Unparseable(e.to_string()))?;
        stages.advance(ExecutionStage::Generated);

        let requirement = TierPolicy::required_sections(reasoning_level, policy_level);
        let enforced_sections = enforce(&mut report, &requirement);
        stages.advance(ExecutionStage::Enforced);

        self.artefacts.create_execution(&execution_id)?;
        let mut pending = PendingPack {
            store: self.artefacts.as_ref(),
            execution_id,
            committed: false,
        };

        let summary = DecisionSummary::new(
            execution_id,
            provider.clone(),
            context_hash,
            report,
            TierEnforcement {
                reasoning_level,
                policy_level,
                enforced_sections: enforced_sections.clone(),
                enforcement_timestamp: Timestamp::now(),
            },
            Timestamp::now(),
        );
        self.artefacts.write(
            &execution_id,
            DECISION_SUMMARY_FILE,
            &serde_json::to_vec_pretty(&summary).map_err(diiac_pack::PackError::from)?,
        )?;
        if summary.wants_strategy_report() {
            self.artefacts.write(
                &execution_id,
                STRATEGY_REPORT_FILE,
                &serde_json::to_vec_pretty(&summary.report).map_err(diiac_pack::PackError::from)?,
            )?;
        }
        stages.advance(ExecutionStage::ArtefactsWritten);

        let build = ManifestBuilder::new(self.artefacts.as_ref()).build(
            ManifestContext {
                execution_id,
                reasoning_level,
                policy_level,
                context_hash,
            },
            Timestamp::now(),
        )?;
        stages.advance(ExecutionStage::Manifested);

        let sealed = self.ledger.append(ExecutionRecord {
            execution_id,
            provider: provider.clone(),
            reasoning_level,
            policy_level,
            context_hash,
            pack_hash: build.final_pack_hash,
            artefact_count: build.artefact_count as u64,
            timestamp: Timestamp::now(),
        })?;
        pending.committed = true;
        stages.advance(ExecutionStage::Sealed);

        tracing::info!(
            pack_hash = %build.final_pack_hash,
            ledger_root = %sealed.record_hash,
            enforced = enforced_sections.len(),
            "execution sealed"
        );
        Ok(ExecutionOutcome {
            execution_id,
            provider,
            reasoning_level,
            policy_level,
            pack_hash: build.final_pack_hash,
            ledger_root: sealed.as_link(),
            enforced_sections,
        })
    }

    /// Verify the ledger and summarise its health.
    pub fn trust_state(&self) -> Result<TrustState, GovernanceError> {
        let report = self.ledger.verify()?;
        Ok(TrustState {
            valid: report.valid,
            record_count: report.length,
            ledger_root: report.ledger_root,
            frozen: self.ledger.is_frozen(),
        })
    }

    pub fn manifest(&self, execution_id: &ExecutionId) -> Result<ArtefactManifest, GovernanceError> {
        Ok(ManifestBuilder::new(self.artefacts.as_ref()).load(execution_id)?)
    }

    /// Artefact names of an execution, sorted.
    pub fn list_reports(&self, execution_id: &ExecutionId) -> Result<Vec<String>, GovernanceError> {
        Ok(self.artefacts.list(execution_id)?)
    }

    pub fn read_report(
        &self,
        execution_id: &ExecutionId,
        name: &str,
    ) -> Result<Vec<u8>, GovernanceError> {
        validate_artefact_name(name)?;
        Ok(self.artefacts.read(execution_id, name)?)
    }

    /// Recompute the final pack hash from stored artefacts and compare it
    /// with the ledger.
    pub fn rehash(&self, execution_id: &ExecutionId) -> Result<RehashReport, GovernanceError> {
        let (pack_hash, artefact_count) =
            ManifestBuilder::new(self.artefacts.as_ref()).recompute_pack_hash(execution_id)?;
        let sealed_pack_hash = self
            .ledger
            .records()?
            .into_iter()
            .find(|r| r.execution_id == *execution_id)
            .map(|r| r.pack_hash);
        Ok(RehashReport {
            execution_id: *execution_id,
            pack_hash,
            artefact_count,
            matches_ledger: sealed_pack_hash == Some(pack_hash),
            sealed_pack_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::BoxFuture;
    use crate::intent::MemoryIntentStore;
    use diiac_ledger::MemoryLedgerStorage;
    use diiac_pack::{MemoryArtefactStore, MANIFEST_FILE};
    use serde_json::json;

    /// Returns a fixed report.
    struct FixedGenerator(Value);

    impl ContentGenerator for FixedGenerator {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn generate<'a>(
            &'a self,
            _request: GenerationRequest<'a>,
        ) -> BoxFuture<'a, Result<Value, GenerationError>> {
            let v = self.0.clone();
            Box::pin(async move { Ok(v) })
        }
    }

    /// Never completes.
    struct StalledGenerator;

    impl ContentGenerator for StalledGenerator {
        fn name(&self) -> &'static str {
            "stalled"
        }

        fn generate<'a>(
            &'a self,
            _request: GenerationRequest<'a>,
        ) -> BoxFuture<'a, Result<Value, GenerationError>> {
            Box::pin(std::future::pending())
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        artefacts: Arc<MemoryArtefactStore>,
        ledger: Arc<Ledger>,
    }

    fn harness(generator: Arc<dyn ContentGenerator>, with_intent: bool) -> Harness {
        let intents = Arc::new(MemoryIntentStore::new());
        if with_intent {
            intents
                .capture(&json!({"intent": "Expand into APAC market"}))
                .unwrap();
        }
        let artefacts = Arc::new(MemoryArtefactStore::new());
        let ledger = Arc::new(Ledger::new(MemoryLedgerStorage::new()));
        let orchestrator = Orchestrator::new(
            intents,
            generator,
            artefacts.clone(),
            ledger.clone(),
            Duration::from_millis(200),
        );
        Harness {
            orchestrator,
            artefacts,
            ledger,
        }
    }

    fn request(r: ReasoningLevel, p: PolicyLevel) -> ExecutionRequest {
        ExecutionRequest {
            provider: ProviderId::new("ChatGPT").unwrap(),
            reasoning_level: r,
            policy_level: p,
        }
    }

    #[test]
    fn stage_sequence_is_linear() {
        let mut stage = ExecutionStage::Received;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            seen.push(stage);
        }
        assert_eq!(seen.len(), 7);
        assert_eq!(stage, ExecutionStage::Sealed);
    }

    #[tokio::test]
    async fn apac_scenario_injects_strategic_context() {
        let h = harness(
            Arc::new(FixedGenerator(json!({
                "executive_summary": {"headline": "Enter Singapore first"}
            }))),
            true,
        );
        let out = h
            .orchestrator
            .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
            .await
            .unwrap();
        assert_eq!(out.enforced_sections, vec!["strategic_context"]);

        let summary: Value = serde_json::from_slice(
            &h.artefacts
                .read(&out.execution_id, DECISION_SUMMARY_FILE)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            summary["report"]["executive_summary"]["headline"],
            "Enter Singapore first"
        );
        assert_eq!(summary["report"]["strategic_context"]["enforced"], true);
        assert_eq!(
            summary["tier_enforcement"]["enforced_sections"],
            json!(["strategic_context"])
        );
        assert_eq!(summary["classification"], "BOARD_READY");
    }

    #[tokio::test]
    async fn sealed_pack_hash_matches_stored_artefacts() {
        let h = harness(Arc::new(DisabledGenerator), true);
        let out = h
            .orchestrator
            .execute(request(ReasoningLevel::R5, PolicyLevel::P5))
            .await
            .unwrap();
        assert_eq!(out.enforced_sections.len(), 11);

        let names = h.artefacts.list(&out.execution_id).unwrap();
        assert_eq!(
            names,
            vec![DECISION_SUMMARY_FILE, MANIFEST_FILE, STRATEGY_REPORT_FILE]
        );

        let rehash = h.orchestrator.rehash(&out.execution_id).unwrap();
        assert!(rehash.matches_ledger);
        assert_eq!(rehash.pack_hash, out.pack_hash);
        assert_eq!(rehash.artefact_count, 3);

        let manifest = h.orchestrator.manifest(&out.execution_id).unwrap();
        assert_ne!(manifest.pack_hash, out.pack_hash);
        assert_eq!(manifest.artefacts.len(), 2);
    }

    #[tokio::test]
    async fn three_executions_chain_and_verify() {
        let h = harness(Arc::new(DisabledGenerator), true);
        let mut roots = Vec::new();
        for _ in 0..3 {
            let out = h
                .orchestrator
                .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
                .await
                .unwrap();
            roots.push(out.ledger_root);
        }
        let records = h.ledger.records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].previous_hash, roots[0]);
        assert_eq!(records[2].previous_hash, roots[1]);

        let trust = h.orchestrator.trust_state().unwrap();
        assert!(trust.valid);
        assert_eq!(trust.record_count, 3);
        assert_eq!(trust.ledger_root, roots[2]);
        assert!(!trust.frozen);
    }

    #[tokio::test]
    async fn missing_intent_is_precondition_failure() {
        let h = harness(Arc::new(DisabledGenerator), false);
        let err = h
            .orchestrator
            .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::PreconditionFailure);
        assert_eq!(h.ledger.records().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn generation_timeout_leaves_no_trace() {
        let h = harness(Arc::new(StalledGenerator), true);
        let err = h
            .orchestrator
            .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::Generation(GenerationError::Timeout(_))
        ));
        assert_eq!(h.ledger.records().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn non_object_report_is_generation_failure() {
        let h = harness(Arc::new(FixedGenerator(json!(["not", "a", "report"]))), true);
        let err = h
            .orchestrator
            .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::GenerationFailure);
    }

    #[tokio::test]
    async fn frozen_ledger_refuses_execution() {
        let h = harness(Arc::new(DisabledGenerator), true);
        let first = h
            .orchestrator
            .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
            .await
            .unwrap();

        // Tamper with the only record and let verification freeze the ledger.
        let mut records = h.ledger.records().unwrap();
        records[0].artefact_count += 1;
        let tampered = Arc::new(Ledger::new(MemoryLedgerStorage::from_records(records)));
        let orchestrator = Orchestrator::new(
            Arc::new({
                let s = MemoryIntentStore::new();
                s.capture(&json!({"intent": "x"})).unwrap();
                s
            }),
            Arc::new(DisabledGenerator),
            h.artefacts.clone(),
            tampered.clone(),
            Duration::from_secs(1),
        );
        let trust = orchestrator.trust_state().unwrap();
        assert!(!trust.valid);
        assert!(trust.frozen);

        let err = orchestrator
            .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ChainIntegrityFailure);
        assert_eq!(tampered.records().unwrap().len(), 1);

        // Only the first execution's pack remains.
        assert!(h.artefacts.list(&first.execution_id).is_ok());
    }

    #[tokio::test]
    async fn report_lookup_rejects_traversal() {
        let h = harness(Arc::new(DisabledGenerator), true);
        let out = h
            .orchestrator
            .execute(request(ReasoningLevel::R2, PolicyLevel::P1))
            .await
            .unwrap();
        let err = h
            .orchestrator
            .read_report(&out.execution_id, "../ledger.jsonl")
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValidationFailure);
        assert!(h
            .orchestrator
            .read_report(&out.execution_id, DECISION_SUMMARY_FILE)
            .is_ok());
    }

    #[test]
    fn unknown_execution_is_not_found() {
        let h = harness(Arc::new(DisabledGenerator), true);
        let err = h.orchestrator.manifest(&ExecutionId::new()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
