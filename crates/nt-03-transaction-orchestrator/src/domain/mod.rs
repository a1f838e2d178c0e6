//! Domain module for the Transaction Orchestrator
//!
//! Entities, classification rules and the reward arbitration contract.

pub mod arbitration;
pub mod entities;
pub mod errors;
pub mod rules;

pub use arbitration::{
    parse_arbitration_response, ArbitrationDecision, RewardEvaluationRequest, RewardFlag,
};
pub use entities::*;
pub use errors::*;
pub use rules::{
    is_task_id, ClassificationRule, RuleSet, SystemRule, TaskRule, TaskStage, CHUNK_ASSEMBLY,
    MESSAGE_DECRYPTION, MIN_INITIATION_RITE_LEN, NO_RULE, PIPELINE_STAGES,
};
