#![deny(missing_docs)]
//! # aide — umbrella crate
//!
//! A single import surface for the AIde living-object kernel and
//! orchestrator. Re-exports the protocol crates and reference backends
//! behind feature flags, plus a [`prelude`] for the common path: wire up a
//! persistence backend, a provider, and an [`Orchestrator`](aide_orchestrator::Orchestrator).

#[cfg(feature = "core")]
pub use aide_core;
#[cfg(feature = "core")]
pub use aide_orchestrator;
#[cfg(feature = "core")]
pub use aide_persistence;
#[cfg(feature = "persistence-fs")]
pub use aide_persistence_fs;
#[cfg(feature = "persistence-memory")]
pub use aide_persistence_memory;
#[cfg(feature = "core")]
pub use aide_provider;
#[cfg(feature = "core")]
pub use aide_reducer;
#[cfg(feature = "core")]
pub use aide_telemetry;

/// Happy-path imports for composing an AIde kernel + orchestrator.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use aide_core::{
        AideId, Cardinality, Constraint, ConstraintId, Entity, EntityId, Event, Primitive,
        Rejection, RejectionCode, Schema, SchemaId, Snapshot, Warning, WarningCode,
    };

    #[cfg(feature = "core")]
    pub use aide_reducer::reduce;

    #[cfg(feature = "core")]
    pub use aide_persistence::{
        Blueprint, CallerId, ConversationMessage, HydrateResponse, PersistenceError,
        PersistenceFacade, Role as PersistedRole, TurnLoad,
    };

    #[cfg(feature = "core")]
    pub use aide_provider::{DelayProfile, MockProvider, Provider, ProviderError};

    #[cfg(feature = "core")]
    pub use aide_telemetry::{TelemetryQueue, TelemetryRecord, TurnRecorder};

    #[cfg(feature = "core")]
    pub use aide_orchestrator::{
        CancellationToken, ClientFrame, Orchestrator, OrchestratorConfig, OrchestratorError,
        ServerFrame,
    };

    #[cfg(feature = "persistence-memory")]
    pub use aide_persistence_memory::MemoryPersistence;

    #[cfg(feature = "persistence-fs")]
    pub use aide_persistence_fs::FsPersistence;
}
