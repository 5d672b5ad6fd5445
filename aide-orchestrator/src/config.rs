//! Recognized configuration options (spec §6.4) and the classifier's phrase
//! lists, kept as data rather than hardcoded match arms per the redesign
//! guidance to make tier rules tunable without a code change.

use aide_provider::{CacheTtl, DelayProfile};
use std::time::Duration;

/// Per-tier model selection and shadow-call configuration (spec §6.4
/// `L2_MODEL`/`L3_MODEL`/`L4_MODEL`, `L2_SHADOW_MODEL`/`L3_SHADOW_MODEL`).
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model identifier used for L2 (fast/cheap) turns.
    pub l2_model: String,
    /// Model identifier used for L3 (structural) turns.
    pub l3_model: String,
    /// Model identifier used for L4 (query-only) turns.
    pub l4_model: String,
    /// Optional shadow model run alongside L2, recorded but never applied.
    pub l2_shadow_model: Option<String>,
    /// Optional shadow model run alongside L3, recorded but never applied.
    pub l3_shadow_model: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            l2_model: "claude-fast".into(),
            l3_model: "claude-reasoning".into(),
            l4_model: "claude-reasoning".into(),
            l2_shadow_model: None,
            l3_shadow_model: None,
        }
    }
}

/// Cache TTLs for the tier-specific prompt block, per tier (spec §6.4
/// `CACHE_TTL_L2/L3/L4`).
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// TTL for the L2 tier-specific block.
    pub l2: CacheTtl,
    /// TTL for the L3 tier-specific block.
    pub l3: CacheTtl,
    /// TTL for the L4 tier-specific block.
    pub l4: CacheTtl,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            l2: CacheTtl::FiveMinutes,
            l3: CacheTtl::FiveMinutes,
            l4: CacheTtl::FiveMinutes,
        }
    }
}

/// Top-level orchestrator configuration (spec §6.4, §5 timeouts).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model selection.
    pub models: ModelConfig,
    /// Cache TTLs.
    pub cache: CacheConfig,
    /// UX delay profile for the mock/test provider.
    pub delay_profile: DelayProfile,
    /// Max duration of a turn before forced cancellation.
    pub turn_timeout: Duration,
    /// How long to wait on the per-aide lock before returning `Busy`.
    pub lock_timeout: Duration,
    /// LLM idle-read timeout (default 60s per spec §5).
    pub llm_idle_timeout: Duration,
    /// Persistence call timeout (default 10s per spec §5).
    pub persistence_timeout: Duration,
    /// Grace period for interrupt handling to flush and persist before the
    /// task force-exits (default 500ms per spec §5).
    pub interrupt_grace: Duration,
    /// Length of the conversation tail loaded for a turn (spec §4.2 step 1,
    /// 5..10 typical).
    pub conversation_tail_len: usize,
    /// Classifier phrase/threshold data.
    pub classifier: ClassifierConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            cache: CacheConfig::default(),
            delay_profile: DelayProfile::Instant,
            turn_timeout: Duration::from_secs(120),
            lock_timeout: Duration::from_secs(10),
            llm_idle_timeout: Duration::from_secs(60),
            persistence_timeout: Duration::from_secs(10),
            interrupt_grace: Duration::from_millis(500),
            conversation_tail_len: 8,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Tunable phrase lists and thresholds driving the rule-based classifier
/// (spec §4.2 step 2). Kept as plain data so tier rules can be adjusted
/// without touching `classifier.rs`'s logic.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Structural phrases that force L3 (rule 2): `"add a section"`,
    /// `"create a"`, `"set up a"`, `"reorganize"`, `"split the"`,
    /// `"group the"`, and similar.
    pub structural_phrases: Vec<String>,
    /// Query starters that force L4 when the message has no structural
    /// match (rule 3): `"how many"`, `"who"`, `"what's"`, `"show me"`.
    pub query_starters: Vec<String>,
    /// Domain-specific phrases that force L3 when no matching child tree
    /// exists (rule 5): `"budget is"`, `"got "` + `" quotes"`, `"starts "`.
    pub domain_phrases: Vec<String>,
    /// Words that introduce a multi-item list (rule 6), e.g. `"these are"`,
    /// `"here are"`, `"i have"`.
    pub intro_words: Vec<String>,
    /// Minimum comma-separated segments to trigger the multi-item rule.
    pub min_comma_segments: usize,
    /// Minimum numeric segments to trigger the multi-item rule.
    pub min_numeric_segments: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            structural_phrases: vec![
                "add a section".into(),
                "create a".into(),
                "set up a".into(),
                "reorganize".into(),
                "split the".into(),
                "group the".into(),
            ],
            query_starters: vec![
                "how many".into(),
                "who".into(),
                "what's".into(),
                "what is".into(),
                "show me".into(),
                "when".into(),
                "where".into(),
            ],
            domain_phrases: vec!["budget is".into(), "quotes".into(), "starts".into()],
            intro_words: vec!["these are".into(), "here are".into(), "i have".into(), "i've got".into()],
            min_comma_segments: 3,
            min_numeric_segments: 2,
        }
    }
}
