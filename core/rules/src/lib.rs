pub mod rule;
pub mod compile;
pub mod engine;

pub use rule::CompiledRule;
pub use compile::{compile_rule, RuleFactory};
pub use engine::{EngineRule, RuleEngine};
