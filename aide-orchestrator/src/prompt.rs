//! Prompt assembly (spec §4.2 step 3): three cacheable system blocks plus a
//! messages array with the last N conversation turns and the current user
//! message.

use crate::classifier::Tier;
use crate::config::CacheConfig;
use aide_core::Snapshot;
use aide_persistence::ConversationMessage;
use aide_provider::{PromptBlock, PromptMessage, ProviderRequest, Role as ProviderRole};

/// Voice rules, primitive catalog, and entity-tree structure shared across
/// every tier. Kept here rather than loaded from a file since it has no
/// per-deployment variation; a real deployment could source this from
/// config without changing the assembly logic below.
const SHARED_PREFIX: &str = include_str!("prompt_shared_prefix.txt");

fn tier_block(tier: Tier) -> &'static str {
    match tier {
        Tier::L2 => {
            "You are making a small, ordinary edit. Prefer entity.update over \
             entity.create/remove. Keep voice output brief."
        }
        Tier::L3 => {
            "You are making a structural change: new sections, reorganizing, \
             or introducing a list of items. Use entity.create, entity.move, \
             and entity.reorder as needed. Explain the structure you built."
        }
        Tier::L4 => {
            "You are answering a question about the current state. Do not \
             emit any mutating primitives; respond with voice text only."
        }
    }
}

fn tier_ttl(tier: Tier, cache: &CacheConfig) -> aide_provider::CacheTtl {
    match tier {
        Tier::L2 => cache.l2,
        Tier::L3 => cache.l3,
        Tier::L4 => cache.l4,
    }
}

/// Summarize an assistant mutation turn to keep context compact (spec §4.2
/// step 3: `"[K operations applied]"`).
pub fn summarize_assistant_turn(applied_count: usize) -> String {
    format!("[{applied_count} operations applied]")
}

/// Assemble a full provider request for one turn.
///
/// `conversation_tail` is the recent history (assistant turns already
/// summarized by the caller before being stored); `user_message` is the
/// current turn's text.
pub fn assemble(
    model: impl Into<String>,
    tier: Tier,
    cache: &CacheConfig,
    snapshot: &Snapshot,
    conversation_tail: &[ConversationMessage],
    user_message: &str,
) -> Result<ProviderRequest, serde_json::Error> {
    let snapshot_json = serde_json::to_string(snapshot)?;

    let system = vec![
        PromptBlock::cached(SHARED_PREFIX, aide_provider::CacheTtl::FiveMinutes),
        PromptBlock::cached(tier_block(tier), tier_ttl(tier, cache)),
        PromptBlock::uncached(snapshot_json),
    ];

    let mut messages: Vec<PromptMessage> = conversation_tail
        .iter()
        .map(|m| PromptMessage::new(map_role(m.role), m.content.clone()))
        .collect();
    messages.push(PromptMessage::new(ProviderRole::User, user_message));
    if let Some(last) = messages.last_mut() {
        last.cache_breakpoint = true;
    }

    Ok(ProviderRequest {
        model: model.into(),
        system,
        messages,
        max_tokens: None,
        temperature: None,
    })
}

fn map_role(role: aide_persistence::Role) -> ProviderRole {
    match role {
        aide_persistence::Role::User => ProviderRole::User,
        aide_persistence::Role::Assistant => ProviderRole::Assistant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_message_is_cache_breakpoint() {
        let snapshot = Snapshot::empty();
        let req = assemble("model-x", Tier::L2, &CacheConfig::default(), &snapshot, &[], "hello").unwrap();
        assert!(req.messages.last().unwrap().cache_breakpoint);
        assert_eq!(req.system.len(), 3);
        assert!(req.system[2].cache.is_none(), "snapshot block must be uncached");
    }

    #[test]
    fn summarize_formats_operation_count() {
        assert_eq!(summarize_assistant_turn(3), "[3 operations applied]");
    }
}
