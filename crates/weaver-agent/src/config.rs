/// What the engine does when the iteration cap is reached before a completion
/// directive arrives. `Silent` mirrors the historical behavior: stop without
/// any terminal event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    #[default]
    Silent,
    FailFast,
}

/// What the engine does with a tag that matches neither a reserved directive
/// nor a registered tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownTagPolicy {
    #[default]
    Ignore,
    FailFast,
}

/// Runtime configuration for one conversation engine.
///
/// The iteration cap is fixed per engine instance; it is not adjustable per
/// call and the budget is consumed on every step, including steps that follow
/// an answered question.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub system_prompt: String,
    pub model: String,
    pub max_iterations: usize,
    pub exhaustion_policy: ExhaustionPolicy,
    pub unknown_tag_policy: UnknownTagPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            model: String::new(),
            max_iterations: 25,
            exhaustion_policy: ExhaustionPolicy::Silent,
            unknown_tag_policy: UnknownTagPolicy::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_defaults_are_silent_and_bounded() {
        let config = EngineConfig::default();
        assert_eq!(config.max_iterations, 25);
        assert_eq!(config.exhaustion_policy, ExhaustionPolicy::Silent);
        assert_eq!(config.unknown_tag_policy, UnknownTagPolicy::Ignore);
        assert!(config.system_prompt.is_empty());
    }
}
