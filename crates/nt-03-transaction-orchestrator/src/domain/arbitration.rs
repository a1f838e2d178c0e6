//! # Reward Arbitration Contract
//!
//! The node does not score work itself. It renders an evaluation request for
//! an external arbiter and parses the arbiter's two-row table:
//!
//! ```text
//! | Summary Judgment | <short justification, may contain RED FLAG / YELLOW FLAG> |
//! | Total PFT Rewarded | <integer> |
//! ```

use serde::{Deserialize, Serialize};

use super::errors::ArbitrationError;

const JUDGMENT_ROW: &str = "Summary Judgment";
const REWARD_ROW: &str = "Total PFT Rewarded";
const RED_FLAG: &str = "RED FLAG";
const YELLOW_FLAG: &str = "YELLOW FLAG";

/// Everything the arbiter sees for one verification response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEvaluationRequest {
    /// Task id.
    pub task_id: String,
    /// The proposed task text.
    pub task_description: String,
    /// The verification question the node asked.
    pub verification_question: String,
    /// The participant's answer.
    pub verification_response: String,
    /// Supporting documentation (context document excerpt).
    pub supporting_documentation: String,
    /// Prior rewards, one line each.
    pub reward_history: Vec<String>,
    /// Upper bound on the reward.
    pub proposed_reward: u64,
}

impl RewardEvaluationRequest {
    /// Render the request text handed to the arbiter.
    pub fn render(&self) -> String {
        let history = if self.reward_history.is_empty() {
            "No prior rewards".to_string()
        } else {
            self.reward_history.join("\n")
        };
        format!(
            "Task {task_id}\n\
             < TASK DESCRIPTION STARTS HERE >\n{description}\n< TASK DESCRIPTION ENDS HERE >\n\n\
             < VERIFICATION QUESTION STARTS HERE >\n{question}\n< VERIFICATION QUESTION ENDS HERE >\n\n\
             < TASK VERIFICATION STARTS HERE >\n{response}\n< TASK VERIFICATION ENDS HERE >\n\n\
             < USERS INTERNAL DOCUMENTATION STARTS HERE >\n{docs}\n< USERS INTERNAL DOCUMENTATION ENDS HERE >\n\n\
             < REWARD DATA STARTS HERE >\n{history}\n< REWARD DATA ENDS HERE >\n\n\
             ALWAYS END YOUR OUTPUT IN THIS FORMAT WITH NO VARIATION\n\
             | {judgment} | <2 sentences on reward logic. Include {red} or {yellow} if warranted> |\n\
             | {reward} | <integer up to {max}> |\n",
            task_id = self.task_id,
            description = self.task_description,
            question = self.verification_question,
            response = self.verification_response,
            docs = self.supporting_documentation,
            history = history,
            judgment = JUDGMENT_ROW,
            red = RED_FLAG,
            yellow = YELLOW_FLAG,
            reward = REWARD_ROW,
            max = self.proposed_reward,
        )
    }
}

/// Severity flag raised in the justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardFlag {
    /// Concerning; reward reduced.
    Yellow,
    /// Severe; submission treated as suspicious.
    Red,
}

/// Parsed arbiter decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrationDecision {
    /// Short justification.
    pub justification: String,
    /// Awarded amount, at most the proposed maximum.
    pub reward: u64,
    /// Strongest flag in the justification.
    pub flag: Option<RewardFlag>,
}

impl ArbitrationDecision {
    /// Whether the arbiter marked the submission as suspicious.
    pub fn is_suspicious(&self) -> bool {
        self.flag == Some(RewardFlag::Red)
    }
}

/// Parse the arbiter's reply. Text before the table is ignored.
///
/// # Errors
/// - `MalformedResponse` if either row is missing or the reward is not an integer
/// - `RewardExceedsMaximum` if the reward is above `proposed_reward`
pub fn parse_arbitration_response(
    response: &str,
    proposed_reward: u64,
) -> Result<ArbitrationDecision, ArbitrationError> {
    let justification = table_cell(response, JUDGMENT_ROW).ok_or_else(|| {
        ArbitrationError::MalformedResponse(format!("missing `{}` row", JUDGMENT_ROW))
    })?;
    let reward_text = table_cell(response, REWARD_ROW).ok_or_else(|| {
        ArbitrationError::MalformedResponse(format!("missing `{}` row", REWARD_ROW))
    })?;

    let reward: u64 = reward_text.replace(',', "").parse().map_err(|_| {
        ArbitrationError::MalformedResponse(format!("reward `{}` is not an integer", reward_text))
    })?;
    if reward > proposed_reward {
        return Err(ArbitrationError::RewardExceedsMaximum {
            awarded: reward,
            maximum: proposed_reward,
        });
    }

    let flag = if justification.contains(RED_FLAG) {
        Some(RewardFlag::Red)
    } else if justification.contains(YELLOW_FLAG) {
        Some(RewardFlag::Yellow)
    } else {
        None
    };

    Ok(ArbitrationDecision {
        justification: justification.to_string(),
        reward,
        flag,
    })
}

/// Last `| <row> | <cell> |` line for `row`.
fn table_cell<'a>(text: &'a str, row: &str) -> Option<&'a str> {
    text.lines().rev().find_map(|line| {
        let mut cells = line.trim().strip_prefix('|')?.split('|').map(str::trim);
        if cells.next()? != row {
            return None;
        }
        let cell = cells.next()?;
        (!cell.is_empty()).then_some(cell)
    })
}
