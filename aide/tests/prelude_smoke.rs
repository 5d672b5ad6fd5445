//! Confirms the `prelude` wires a full kernel + orchestrator without
//! reaching into the individual crates directly.

use aide::prelude::*;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn prelude_runs_one_turn_end_to_end() {
    let persistence = Arc::new(MemoryPersistence::new());
    let aide_id = AideId::new("aide_prelude_smoke");
    let caller = CallerId("user_1".into());
    persistence.seed(caller.clone(), aide_id.clone(), Snapshot::empty(), Blueprint::default()).await;

    let script = vec!["{\"t\":\"entity.create\",\"p\":{\"id\":\"note\"}}\nNoted.\n".to_string()];
    let provider = Arc::new(MockProvider::new(script, DelayProfile::Instant));
    let telemetry = Arc::new(TelemetryQueue::new(100));
    let orchestrator = Orchestrator::new(persistence.clone(), provider, telemetry, OrchestratorConfig::default());

    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = frames.clone();
    let emit = move |frame: ServerFrame| sink.lock().unwrap().push(frame);

    orchestrator
        .process_turn(&caller, &aide_id, None, "msg_1".into(), "add a note", CancellationToken::new(), emit)
        .await
        .unwrap();

    let hydrated = persistence.hydrate(&caller, &aide_id).await.unwrap();
    assert!(hydrated.snapshot.root_children.iter().any(|id| id.as_str() == "note"));
}
