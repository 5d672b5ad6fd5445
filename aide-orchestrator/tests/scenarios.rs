//! End-to-end turn scenarios (spec §8 E1-E4, E6; E5's cycle rejection is
//! exercised at the reducer layer in `aide-reducer`).

use aide_core::AideId;
use aide_orchestrator::{CancellationToken, Orchestrator, OrchestratorConfig, ServerFrame};
use aide_persistence::{Blueprint, CallerId};
use aide_persistence_memory::MemoryPersistence;
use aide_provider::{DelayProfile, MockProvider};
use aide_telemetry::TelemetryQueue;
use std::sync::{Arc, Mutex};

fn caller() -> CallerId {
    CallerId("user_1".into())
}

async fn seeded_orchestrator(
    script: Vec<String>,
) -> (Orchestrator<MockProvider>, Arc<MemoryPersistence>, AideId) {
    let persistence = Arc::new(MemoryPersistence::new());
    let aide_id = AideId::new("aide_1");
    persistence
        .seed(caller(), aide_id.clone(), aide_core::Snapshot::empty(), Blueprint::default())
        .await;
    let provider = Arc::new(MockProvider::new(script, DelayProfile::Instant));
    let telemetry = Arc::new(TelemetryQueue::new(100));
    let orchestrator = Orchestrator::new(persistence.clone(), provider, telemetry, OrchestratorConfig::default());
    (orchestrator, persistence, aide_id)
}

fn collect_frames() -> (impl FnMut(ServerFrame), Arc<Mutex<Vec<ServerFrame>>>) {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = frames.clone();
    let emit = move |frame: ServerFrame| sink.lock().unwrap().push(frame);
    (emit, frames)
}

#[tokio::test]
async fn e1_first_turn_synthesis_creates_structure() {
    let script = vec![
        "{\"t\":\"meta.set\",\"p\":{\"fields\":{\"title\":\"Poker League\"}}}\n\
{\"t\":\"entity.create\",\"p\":{\"id\":\"league\",\"display\":\"page\"}}\n\
{\"t\":\"entity.create\",\"p\":{\"id\":\"roster\",\"parent\":\"league\"}}\n\
{\"t\":\"entity.create\",\"p\":{\"id\":\"schedule\",\"parent\":\"league\"}}\n\
Set up your poker league with a roster and a schedule.\n"
            .to_string(),
    ];
    let (orchestrator, persistence, aide_id) = seeded_orchestrator(script).await;
    let (emit, frames) = collect_frames();

    orchestrator
        .process_turn(
            &caller(),
            &aide_id,
            None,
            "msg_1".into(),
            "I run a poker league, 8 players, every other Thursday.",
            CancellationToken::new(),
            emit,
        )
        .await
        .unwrap();

    let frames = frames.lock().unwrap();
    assert!(frames.iter().any(|f| matches!(f, ServerFrame::Classification { tier, .. } if tier == "L3")));
    assert!(frames.iter().any(|f| matches!(f, ServerFrame::Voice { .. })));
    assert!(frames
        .iter()
        .filter(|f| matches!(f, ServerFrame::EntityCreate { .. }))
        .count()
        >= 3);

    let hydrated = persistence.hydrate(&caller(), &aide_id).await.unwrap();
    assert!(hydrated.snapshot.root_children.iter().any(|id| id.as_str() == "league"));
    assert!(hydrated.snapshot.sequence >= 3);
}

#[tokio::test]
async fn e2_routine_update_applies_single_entity_update() {
    let persistence = Arc::new(MemoryPersistence::new());
    let aide_id = AideId::new("aide_2");
    let mut snapshot = aide_core::Snapshot::empty();
    let player_id: aide_core::EntityId = "player_mike".into();
    let mut entity = aide_core::Entity::new(player_id.clone(), aide_core::EntityId::root(), None, 1);
    entity.props.insert("status".into(), serde_json::json!("active"));
    snapshot.entities.insert(player_id.clone(), entity);
    snapshot.root_children.push(player_id.clone());
    snapshot.sequence = 1;
    persistence.seed(caller(), aide_id.clone(), snapshot, Blueprint::default()).await;

    let script = vec!["{\"t\":\"entity.update\",\"p\":{\"ref\":\"player_mike\",\"props\":{\"status\":\"out\"}}}\n".to_string()];
    let provider = Arc::new(MockProvider::new(script, DelayProfile::Instant));
    let telemetry = Arc::new(TelemetryQueue::new(100));
    let orchestrator = Orchestrator::new(persistence.clone(), provider, telemetry, OrchestratorConfig::default());
    let (emit, frames) = collect_frames();

    orchestrator
        .process_turn(&caller(), &aide_id, None, "msg_2".into(), "Mike's out this week.", CancellationToken::new(), emit)
        .await
        .unwrap();

    let frames = frames.lock().unwrap();
    assert!(frames.iter().any(|f| matches!(f, ServerFrame::Classification { tier, .. } if tier == "L2")));
    let update_count = frames.iter().filter(|f| matches!(f, ServerFrame::EntityUpdate { .. })).count();
    assert_eq!(update_count, 1);

    let hydrated = persistence.hydrate(&caller(), &aide_id).await.unwrap();
    let player = hydrated.snapshot.entities.get(&player_id).unwrap();
    assert_eq!(player.props.get("status"), Some(&serde_json::json!("out")));
}

#[tokio::test]
async fn e3_direct_edit_bypasses_classification_and_llm() {
    let persistence = Arc::new(MemoryPersistence::new());
    let aide_id = AideId::new("aide_3");
    let mut snapshot = aide_core::Snapshot::empty();
    let player_id: aide_core::EntityId = "player_dave".into();
    snapshot
        .entities
        .insert(player_id.clone(), aide_core::Entity::new(player_id.clone(), aide_core::EntityId::root(), None, 1));
    snapshot.root_children.push(player_id.clone());
    snapshot.sequence = 1;
    persistence.seed(caller(), aide_id.clone(), snapshot, Blueprint::default()).await;

    let hydrate_before = persistence.hydrate(&caller(), &aide_id).await.unwrap();

    // A script of zero entries: if the direct-edit path ever fell through to
    // the LLM, `MockProvider` would return InvalidResponse and this test
    // would fail loudly.
    let provider = Arc::new(MockProvider::new(vec![], DelayProfile::Instant));
    let telemetry = Arc::new(TelemetryQueue::new(100));
    let orchestrator = Orchestrator::new(persistence.clone(), provider, telemetry, OrchestratorConfig::default());
    let (emit, frames) = collect_frames();

    orchestrator
        .direct_edit(&caller(), &aide_id, "player_dave", "wins", serde_json::json!(3), emit)
        .await
        .unwrap();

    let frames = frames.lock().unwrap();
    assert!(frames.iter().any(|f| matches!(f, ServerFrame::EntityUpdate { id, .. } if id == "player_dave")));

    let hydrate_after = persistence.hydrate(&caller(), &aide_id).await.unwrap();
    let player = hydrate_after.snapshot.entities.get(&player_id).unwrap();
    assert_eq!(player.props.get("wins"), Some(&serde_json::json!(3)));
    assert_ne!(hydrate_before.snapshot_hash, hydrate_after.snapshot_hash);
}

#[tokio::test]
async fn e4_interrupt_keeps_partial_progress() {
    // 20 entity.create lines; cancel after the 5th is applied.
    let mut script_text = String::new();
    for i in 0..20 {
        script_text.push_str(&format!("{{\"t\":\"entity.create\",\"p\":{{\"id\":\"e{i}\"}}}}\n"));
    }
    let (orchestrator, persistence, aide_id) = seeded_orchestrator(vec![script_text]).await;
    let cancellation = CancellationToken::new();
    let cancel_handle = cancellation.clone();

    let applied_so_far = Arc::new(Mutex::new(0u32));
    let counter = applied_so_far.clone();
    let cancel_after_five = cancel_handle.clone();
    let emit = move |frame: ServerFrame| {
        if matches!(frame, ServerFrame::EntityCreate { .. }) {
            let mut count = counter.lock().unwrap();
            *count += 1;
            if *count == 5 {
                cancel_after_five.cancel();
            }
        }
    };

    orchestrator
        .process_turn(&caller(), &aide_id, None, "msg_4".into(), "add twenty sections", cancellation, emit)
        .await
        .unwrap();

    let hydrated = persistence.hydrate(&caller(), &aide_id).await.unwrap();
    assert_eq!(hydrated.events.len(), 5, "only the events applied before interrupt should persist");
}

#[tokio::test]
async fn e6_telemetry_overflow_keeps_newest_three() {
    let queue = TelemetryQueue::new(3);
    for i in 0..5 {
        let mut record = aide_telemetry::TelemetryRecord::new("aide_overflow", aide_telemetry::EventType::LlmCall);
        record.message_id = format!("msg_{i}");
        queue.enqueue(record);
    }
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.dropped_count(), 2);
}
