//! The per-turn pipeline (spec §4.2): load, classify, assemble, stream,
//! reduce, persist. Generic over `P: Provider` since `Provider` is
//! deliberately not object-safe (it returns `impl Future`/RPITIT) — an
//! orchestrator instance is built for one concrete provider type.

use crate::classifier::{self, Tier};
use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::frames::ServerFrame;
use crate::mutex_registry::AideLockRegistry;
use crate::parser::{LineParser, ParsedLine};
use crate::prompt;
use aide_core::{Event, Primitive, Snapshot};
use aide_persistence::{CallerId, ConversationMessage, PersistenceFacade, Role as PersistedRole};
use aide_provider::{Provider, StreamChunk};
use aide_reducer::reduce;
use aide_telemetry::{cost, EventType, TelemetryQueue, TelemetryRecord, TurnRecorder};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Everything one `process_turn` call needs beyond the message itself.
pub struct Orchestrator<P: Provider> {
    persistence: Arc<dyn PersistenceFacade>,
    provider: Arc<P>,
    telemetry: Arc<TelemetryQueue>,
    locks: AideLockRegistry,
    config: OrchestratorConfig,
}

/// A live handle a caller uses to send an `interrupt` for an in-progress
/// turn. Cheap to clone; checked between stream chunks and reductions
/// (spec §5 "Cancellation").
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl<P: Provider> Orchestrator<P> {
    /// Construct an orchestrator over a concrete persistence backend and
    /// provider.
    pub fn new(
        persistence: Arc<dyn PersistenceFacade>,
        provider: Arc<P>,
        telemetry: Arc<TelemetryQueue>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            persistence,
            provider,
            telemetry,
            locks: AideLockRegistry::new(),
            config,
        }
    }

    /// Run one full turn, emitting frames via `emit` as they're produced.
    /// Returns once the stream ends (complete, interrupted, or errored).
    pub async fn process_turn(
        &self,
        caller: &CallerId,
        aide_id: &aide_core::AideId,
        user_id: Option<String>,
        message_id: String,
        content: &str,
        cancellation: CancellationToken,
        mut emit: impl FnMut(ServerFrame),
    ) -> Result<(), OrchestratorError> {
        let guard = self
            .locks
            .acquire(aide_id, self.config.lock_timeout)
            .await
            .ok_or(OrchestratorError::Busy)?;

        let mut recorder = TurnRecorder::start(aide_id.as_str(), user_id, message_id.clone());
        emit(ServerFrame::StreamStart { message_id: message_id.clone() });

        let turn_load = self
            .persistence
            .load_for_turn(caller, aide_id, self.config.conversation_tail_len)
            .await?;

        let classification = classifier::classify(content, &turn_load.snapshot, &self.config.classifier);
        let model = self.model_for(classification.tier);
        emit(ServerFrame::Classification {
            tier: classification.tier.as_str().into(),
            model: model.clone(),
            reason: classification.reason.clone(),
        });

        let request = prompt::assemble(
            model.clone(),
            classification.tier,
            &self.config.cache,
            &turn_load.snapshot,
            &turn_load.conversation_tail,
            content,
        )
        .map_err(|e| OrchestratorError::Fatal(format!("prompt assembly failed: {e}")))?;

        let started = Instant::now();
        let stream_result = self.provider.stream(request).await;
        let mut chunks = match stream_result {
            Ok(c) => c,
            Err(err) => {
                recorder.finish(&self.telemetry);
                emit(ServerFrame::StreamEnd { message_id: message_id.clone(), error: true });
                drop(guard);
                return Err(OrchestratorError::Provider(err));
            }
        };

        let mut snapshot = turn_load.snapshot;
        let mut applied_events: Vec<Event> = Vec::new();
        let mut in_batch = false;
        let mut batched_frames: Vec<ServerFrame> = Vec::new();
        let mut parser = LineParser::new();
        let mut next_sequence = snapshot.sequence;
        let mut lines_emitted = 0u32;
        let mut lines_accepted = 0u32;
        let mut lines_rejected = 0u32;
        let mut usage = aide_provider::TokenUsage::default();
        let mut ttfc_ms: Option<u64> = None;
        let mut interrupted = false;
        let mut transport_error = false;

        while let Some(item) = chunks.next().await {
            if cancellation.is_cancelled() {
                interrupted = true;
                break;
            }
            let chunk = match item {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!(aide_id = aide_id.as_str(), error = %err, "provider stream failed mid-turn");
                    transport_error = true;
                    break;
                }
            };
            match chunk {
                StreamChunk::Text(text) => {
                    if ttfc_ms.is_none() {
                        ttfc_ms = Some(started.elapsed().as_millis() as u64);
                    }
                    let lines = parser.push_chunk(&text);
                    self.handle_lines(
                        lines,
                        &mut snapshot,
                        &mut applied_events,
                        &mut next_sequence,
                        &mut in_batch,
                        &mut batched_frames,
                        &mut lines_emitted,
                        &mut lines_accepted,
                        &mut lines_rejected,
                        &mut recorder,
                        &mut emit,
                    );
                }
                StreamChunk::Usage(u) => usage = u,
            }
        }

        if !interrupted && !transport_error {
            if let Some(last) = parser.finish() {
                self.handle_lines(
                    vec![last],
                    &mut snapshot,
                    &mut applied_events,
                    &mut next_sequence,
                    &mut in_batch,
                    &mut batched_frames,
                    &mut lines_emitted,
                    &mut lines_accepted,
                    &mut lines_rejected,
                    &mut recorder,
                    &mut emit,
                );
            }
        }
        if in_batch {
            // The stream ended mid-batch (interrupt or transport error);
            // flush whatever was buffered rather than dropping it silently.
            for frame in batched_frames.drain(..) {
                emit(frame);
            }
        }

        let ttc_ms = started.elapsed().as_millis() as u64;
        let cost_usd = cost(&model, usage.input_tokens, usage.output_tokens, usage.cache_read_tokens, usage.cache_creation_tokens);
        let mut call_record = TelemetryRecord::new(aide_id.as_str(), EventType::LlmCall);
        call_record.tier = Some(classification.tier.as_str().into());
        call_record.model = Some(model.clone());
        call_record.ttfc_ms = ttfc_ms;
        call_record.ttc_ms = Some(ttc_ms);
        call_record.input_tokens = Some(usage.input_tokens);
        call_record.output_tokens = Some(usage.output_tokens);
        call_record.cache_read_tokens = Some(usage.cache_read_tokens);
        call_record.cache_write_tokens = Some(usage.cache_creation_tokens);
        call_record.lines_emitted = Some(lines_emitted);
        call_record.lines_accepted = Some(lines_accepted);
        call_record.lines_rejected = Some(lines_rejected);
        call_record.cost_usd = Some(cost_usd);
        call_record.error = transport_error.then(|| "provider stream error".to_string());
        recorder.record_call(call_record);

        let user_message = ConversationMessage::new(PersistedRole::User, content, now_iso());
        let assistant_summary = ConversationMessage::new(
            PersistedRole::Assistant,
            prompt::summarize_assistant_turn(applied_events.len()),
            now_iso(),
        );

        let persist_result = self
            .persistence
            .persist_turn(caller, aide_id, &applied_events, &snapshot, user_message, assistant_summary)
            .await;

        recorder.finish(&self.telemetry);

        match persist_result {
            Ok(()) => {}
            Err(err) => {
                drop(guard);
                emit(ServerFrame::StreamEnd { message_id: message_id.clone(), error: true });
                return Err(OrchestratorError::Persistence(err));
            }
        }

        if interrupted {
            emit(ServerFrame::StreamInterrupted { message_id });
        } else {
            emit(ServerFrame::StreamEnd { message_id, error: transport_error });
        }

        drop(guard);
        if transport_error {
            return Err(OrchestratorError::Transient("provider stream ended with a transport error".into()));
        }
        Ok(())
    }

    /// A client-initiated direct field edit, bypassing classification and
    /// the LLM entirely (spec §4.2 "Direct-edit path").
    pub async fn direct_edit(
        &self,
        caller: &CallerId,
        aide_id: &aide_core::AideId,
        entity_id: &str,
        field: &str,
        value: serde_json::Value,
        mut emit: impl FnMut(ServerFrame),
    ) -> Result<(), OrchestratorError> {
        let guard = self
            .locks
            .acquire(aide_id, self.config.lock_timeout)
            .await
            .ok_or(OrchestratorError::Busy)?;
        let started = Instant::now();

        let turn_load = self.persistence.load_for_turn(caller, aide_id, 0).await?;
        let snapshot = turn_load.snapshot;

        let entity_ref: aide_core::EntityId = entity_id.into();
        if snapshot.live_entity(&entity_ref).is_none() {
            drop(guard);
            emit(ServerFrame::DirectEditError { error: format!("entity not found: {entity_id}") });
            return Ok(());
        }

        let mut props = serde_json::Map::new();
        props.insert(field.to_string(), value);
        let event = Event::new(
            format!("evt_{}", snapshot.sequence + 1),
            snapshot.sequence + 1,
            now_iso(),
            caller.0.clone(),
            "direct_edit",
            Primitive::EntityUpdate { entity_ref: entity_ref.clone(), props },
        );

        let result = reduce(&snapshot, &event);
        if !result.applied {
            drop(guard);
            let reason = result.rejection.map(|r| r.detail).unwrap_or_default();
            emit(ServerFrame::DirectEditError { error: reason });
            return Ok(());
        }

        let new_snapshot = result.snapshot;
        let summary = format!("direct edit: {entity_id}.{field}");
        let user_message = ConversationMessage::new(PersistedRole::User, summary.clone(), now_iso());
        let assistant_summary = ConversationMessage::new(PersistedRole::Assistant, "[1 operations applied]", now_iso());

        self.persistence
            .persist_turn(caller, aide_id, std::slice::from_ref(&event), &new_snapshot, user_message, assistant_summary)
            .await?;

        let data = serde_json::to_value(new_snapshot.entities.get(&entity_ref)).unwrap_or(serde_json::Value::Null);
        emit(ServerFrame::EntityUpdate { id: entity_id.to_string(), data });

        let mut telemetry_record = TelemetryRecord::new(aide_id.as_str(), EventType::DirectEdit);
        telemetry_record.edit_latency_ms = Some(started.elapsed().as_millis() as u64);
        self.telemetry.enqueue(telemetry_record);

        drop(guard);
        Ok(())
    }

    fn model_for(&self, tier: Tier) -> String {
        match tier {
            Tier::L2 => self.config.models.l2_model.clone(),
            Tier::L3 => self.config.models.l3_model.clone(),
            Tier::L4 => self.config.models.l4_model.clone(),
        }
    }

    /// Apply every parsed line: mutate `snapshot`, accumulate applied
    /// events, and either buffer or emit the resulting frame depending on
    /// batch state (spec §4.2 steps 5-7).
    #[allow(clippy::too_many_arguments)]
    fn handle_lines(
        &self,
        lines: Vec<ParsedLine>,
        snapshot: &mut Snapshot,
        applied_events: &mut Vec<Event>,
        next_sequence: &mut u64,
        in_batch: &mut bool,
        batched_frames: &mut Vec<ServerFrame>,
        lines_emitted: &mut u32,
        lines_accepted: &mut u32,
        lines_rejected: &mut u32,
        recorder: &mut TurnRecorder,
        emit: &mut impl FnMut(ServerFrame),
    ) {
        for line in lines {
            *lines_emitted += 1;
            match line {
                ParsedLine::Voice(text) => self.dispatch(ServerFrame::Voice { text }, *in_batch, batched_frames, emit),
                ParsedLine::Malformed(raw) => {
                    tracing::warn!(raw, "skipping malformed primitive line");
                }
                ParsedLine::Primitive(Primitive::BatchStart) => {
                    *in_batch = true;
                    emit(ServerFrame::BatchStart);
                }
                ParsedLine::Primitive(Primitive::BatchEnd) => {
                    *in_batch = false;
                    for frame in batched_frames.drain(..) {
                        emit(frame);
                    }
                    emit(ServerFrame::BatchEnd);
                }
                ParsedLine::Primitive(Primitive::Voice { text }) => {
                    self.dispatch(ServerFrame::Voice { text }, *in_batch, batched_frames, emit)
                }
                ParsedLine::Primitive(Primitive::Escalate { .. }) => {
                    // Escalation hints are telemetry-only signals; the tier
                    // for this turn was already fixed at classification.
                }
                ParsedLine::Primitive(primitive) => {
                    *next_sequence += 1;
                    let event = Event::new(
                        format!("evt_{next_sequence}"),
                        *next_sequence,
                        now_iso(),
                        "assistant",
                        "llm",
                        primitive,
                    );
                    let result = reduce(snapshot, &event);
                    if result.applied {
                        *lines_accepted += 1;
                        *snapshot = result.snapshot;
                        let frame = entity_frame(&event, snapshot);
                        applied_events.push(event);
                        if let Some(frame) = frame {
                            self.dispatch(frame, *in_batch, batched_frames, emit);
                        }
                    } else {
                        *lines_rejected += 1;
                        let rejection = result.rejection.expect("rejected result always carries a rejection");
                        recorder.record_rejection(&format!("{:?}", rejection.code));
                        let frame = ServerFrame::Rejection {
                            code: format!("{:?}", rejection.code),
                            reason: rejection.detail,
                        };
                        self.dispatch(frame, *in_batch, batched_frames, emit);
                    }
                }
            }
        }
    }

    fn dispatch(&self, frame: ServerFrame, in_batch: bool, batched_frames: &mut Vec<ServerFrame>, emit: &mut impl FnMut(ServerFrame)) {
        if in_batch {
            batched_frames.push(frame);
        } else {
            emit(frame);
        }
    }
}

/// Build the client-facing delta frame for one applied event, or `None` for
/// events with no client-visible entity (relationship/style/meta/schema
/// changes still mutate the snapshot but are reconciled on next hydrate
/// rather than mirrored incrementally).
fn entity_frame(event: &Event, snapshot: &Snapshot) -> Option<ServerFrame> {
    match &event.primitive {
        Primitive::EntityCreate { id, .. } | Primitive::EntityUpdate { entity_ref: id, .. } => {
            let entity = snapshot.entities.get(id)?;
            let data = serde_json::to_value(entity).ok()?;
            Some(if matches!(&event.primitive, Primitive::EntityCreate { .. }) {
                ServerFrame::EntityCreate { id: id.as_str().to_string(), data }
            } else {
                ServerFrame::EntityUpdate { id: id.as_str().to_string(), data }
            })
        }
        Primitive::EntityRemove { entity_ref } => Some(ServerFrame::EntityRemove { id: entity_ref.as_str().to_string() }),
        _ => None,
    }
}

fn now_iso() -> String {
    // The orchestrator is the one place allowed to read the clock; the
    // reducer stays pure. A Unix-seconds string stands in for a proper
    // RFC 3339 formatter here; swap in `time::OffsetDateTime` if callers
    // need calendar fields out of this value.
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| format!("{}", d.as_secs()))
        .unwrap_or_default()
}
