//! Reward arbitration service.
//!
//! Turns a decrypted verification response into an evaluation request,
//! hands it to the external arbiter and parses the verdict.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{
    parse_arbitration_response, ArbitrationDecision, ArbitrationError, InboundMessage,
    RewardEvaluationRequest, TaskStage,
};
use crate::ports::outbound::RewardArbiter;

/// Task history the arbiter needs alongside the participant's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    /// Proposed task text.
    pub task_description: String,
    /// Question the node asked.
    pub verification_question: String,
    /// Context document excerpt.
    pub supporting_documentation: String,
    /// Prior rewards, one line each.
    pub reward_history: Vec<String>,
    /// Upper bound on the reward.
    pub proposed_reward: u64,
}

/// Reward arbitration service.
pub struct ArbitrationService<A> {
    arbiter: A,
}

impl<A: RewardArbiter> ArbitrationService<A> {
    /// Create a service backed by `arbiter`.
    pub fn new(arbiter: A) -> Self {
        Self { arbiter }
    }

    /// Build the evaluation request for a verification response message.
    ///
    /// The stage marker is stripped from the body.
    pub fn request_for(message: &InboundMessage, context: TaskContext) -> RewardEvaluationRequest {
        let marker = TaskStage::VerificationResponse.marker();
        let response = message
            .body
            .split_once(marker)
            .map_or(message.body.as_str(), |(_, rest)| rest)
            .trim()
            .to_string();

        RewardEvaluationRequest {
            task_id: message.memo_type.clone(),
            task_description: context.task_description,
            verification_question: context.verification_question,
            verification_response: response,
            supporting_documentation: context.supporting_documentation,
            reward_history: context.reward_history,
            proposed_reward: context.proposed_reward,
        }
    }

    /// Send `request` to the arbiter and parse its decision.
    pub async fn arbitrate(
        &self,
        request: &RewardEvaluationRequest,
    ) -> Result<ArbitrationDecision, ArbitrationError> {
        let reply = self.arbiter.evaluate(&request.render()).await?;
        let decision = parse_arbitration_response(&reply, request.proposed_reward)
            .map_err(|e| {
                warn!(task_id = %request.task_id, error = %e, "Unusable arbiter reply");
                e
            })?;

        info!(
            task_id = %request.task_id,
            reward = decision.reward,
            flag = ?decision.flag,
            "Arbitration decided"
        );
        Ok(decision)
    }
}
