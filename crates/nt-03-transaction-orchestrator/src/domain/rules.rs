//! # Classification Rules
//!
//! Two layers decide what a message is:
//!
//! 1. **Pattern**: memo type plus an optional marker in the body picks the rule.
//! 2. **Validation**: the rule checks transaction-level requirements
//!    (`tesSUCCESS`, minimum content, link shape).
//!
//! Request rules additionally name the response that completes them.

use shared_crypto::EcdhPublicKey;
use shared_types::{MemoType, SystemMemoType, TimestampTag};

use super::entities::{InboundMessage, ResponseQuery, TransactionKind};

/// Rule name recorded when no pattern matches.
pub const NO_RULE: &str = "no_rule";

/// Pipeline stage name recorded for corrupt chunk groups.
pub const CHUNK_ASSEMBLY: &str = "chunk_assembly";

/// Pipeline stage name recorded for decryption failures.
pub const MESSAGE_DECRYPTION: &str = "message_decryption";

/// Stage names recorded by the pipeline itself rather than by a rule.
pub const PIPELINE_STAGES: [&str; 2] = [CHUNK_ASSEMBLY, MESSAGE_DECRYPTION];

/// Minimum trimmed length of an initiation rite.
pub const MIN_INITIATION_RITE_LEN: usize = 10;

/// Body markers of the task workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStage {
    /// A participant asks for a task.
    RequestPostFiat,
    /// The node proposes a task.
    Proposal,
    /// The participant accepts it.
    Acceptance,
    /// The participant refuses it.
    Refusal,
    /// The participant claims completion.
    TaskOutput,
    /// The node asks for evidence.
    VerificationPrompt,
    /// The participant answers with evidence.
    VerificationResponse,
    /// The node pays out.
    Reward,
}

impl TaskStage {
    /// Body marker. Matching ignores the trailing space so historical
    /// messages without it still classify.
    pub const fn marker(&self) -> &'static str {
        match self {
            TaskStage::RequestPostFiat => "REQUEST_POST_FIAT ___",
            TaskStage::Proposal => "PROPOSED PF ___",
            TaskStage::Acceptance => "ACCEPTANCE REASON ___",
            TaskStage::Refusal => "REFUSAL REASON ___",
            TaskStage::TaskOutput => "COMPLETION JUSTIFICATION ___",
            TaskStage::VerificationPrompt => "VERIFICATION PROMPT ___",
            TaskStage::VerificationResponse => "VERIFICATION RESPONSE ___",
            TaskStage::Reward => "REWARD RESPONSE __",
        }
    }

    /// Rule name.
    pub const fn rule_name(&self) -> &'static str {
        match self {
            TaskStage::RequestPostFiat => "request_post_fiat",
            TaskStage::Proposal => "proposal",
            TaskStage::Acceptance => "acceptance",
            TaskStage::Refusal => "refusal",
            TaskStage::TaskOutput => "task_output",
            TaskStage::VerificationPrompt => "verification_prompt",
            TaskStage::VerificationResponse => "verification_response",
            TaskStage::Reward => "reward",
        }
    }

    /// Workflow role.
    pub const fn kind(&self) -> TransactionKind {
        match self {
            TaskStage::RequestPostFiat | TaskStage::TaskOutput | TaskStage::VerificationResponse => {
                TransactionKind::Request
            }
            TaskStage::Proposal | TaskStage::VerificationPrompt | TaskStage::Reward => {
                TransactionKind::Response
            }
            TaskStage::Acceptance | TaskStage::Refusal => TransactionKind::Standalone,
        }
    }

    /// Stage that answers this one.
    pub const fn response(&self) -> Option<TaskStage> {
        match self {
            TaskStage::RequestPostFiat => Some(TaskStage::Proposal),
            TaskStage::TaskOutput => Some(TaskStage::VerificationPrompt),
            TaskStage::VerificationResponse => Some(TaskStage::Reward),
            _ => None,
        }
    }

    /// Stage whose marker appears in `body`, if any.
    pub fn detect(body: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| body.contains(stage.marker()))
    }

    /// All stages in workflow order.
    pub const ALL: [TaskStage; 8] = [
        TaskStage::RequestPostFiat,
        TaskStage::Proposal,
        TaskStage::Acceptance,
        TaskStage::Refusal,
        TaskStage::TaskOutput,
        TaskStage::VerificationPrompt,
        TaskStage::VerificationResponse,
        TaskStage::Reward,
    ];
}

/// Whether `memo_type` starts with a task id (`YYYY-MM-DD_HH:MM[__XXXX]`).
pub fn is_task_id(memo_type: &str) -> bool {
    TimestampTag::parse_prefix(memo_type).is_some()
}

/// A classification rule.
///
/// Rules are pure: they see the decoded message only. Response lookups are
/// performed by the orchestrator from [`response_query`](Self::response_query).
pub trait ClassificationRule: Send + Sync {
    /// Name recorded in results.
    fn name(&self) -> &str;

    /// Workflow role.
    fn kind(&self) -> TransactionKind;

    /// Whether this rule handles `message`.
    fn matches(&self, message: &InboundMessage) -> bool;

    /// Rule-specific validation, after the `tesSUCCESS` check.
    ///
    /// Returns the reason on rejection.
    fn validate(&self, message: &InboundMessage) -> Result<(), String> {
        let _ = message;
        Ok(())
    }

    /// The response that completes a request, if this is a request rule.
    fn response_query(&self, message: &InboundMessage) -> Option<ResponseQuery> {
        let _ = message;
        None
    }
}

/// Rule for one system memo type.
#[derive(Debug, Clone)]
pub struct SystemRule {
    memo_type: SystemMemoType,
    name: &'static str,
    kind: TransactionKind,
    response: Option<SystemMemoType>,
}

impl SystemRule {
    /// Handshake: answered by a handshake back, at any time.
    pub const fn handshake() -> Self {
        Self {
            memo_type: SystemMemoType::Handshake,
            name: "handshake",
            kind: TransactionKind::Request,
            response: Some(SystemMemoType::Handshake),
        }
    }

    /// Initiation rite: answered by an initiation reward.
    pub const fn initiation_rite() -> Self {
        Self {
            memo_type: SystemMemoType::InitiationRite,
            name: "initiation_rite",
            kind: TransactionKind::Request,
            response: Some(SystemMemoType::InitiationReward),
        }
    }

    /// Initiation reward.
    pub const fn initiation_reward() -> Self {
        Self {
            memo_type: SystemMemoType::InitiationReward,
            name: "initiation_reward",
            kind: TransactionKind::Response,
            response: None,
        }
    }

    /// Context document link.
    pub const fn context_doc_link() -> Self {
        Self {
            memo_type: SystemMemoType::ContextDocLink,
            name: "context_doc_link",
            kind: TransactionKind::Standalone,
            response: None,
        }
    }
}

impl ClassificationRule for SystemRule {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> TransactionKind {
        self.kind
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        MemoType::parse(&message.memo_type) == MemoType::System(self.memo_type)
    }

    fn validate(&self, message: &InboundMessage) -> Result<(), String> {
        let body = message.body.trim();
        match self.memo_type {
            SystemMemoType::Handshake => EcdhPublicKey::from_hex(body)
                .map(|_| ())
                .map_err(|e| format!("invalid handshake key: {}", e)),
            SystemMemoType::InitiationRite if body.chars().count() < MIN_INITIATION_RITE_LEN => {
                Err(format!(
                    "initiation rite shorter than {} characters",
                    MIN_INITIATION_RITE_LEN
                ))
            }
            SystemMemoType::ContextDocLink
                if !(body.starts_with("https://") || body.starts_with("http://")) =>
            {
                Err("context document link is not an http(s) URL".to_string())
            }
            _ => Ok(()),
        }
    }

    fn response_query(&self, message: &InboundMessage) -> Option<ResponseQuery> {
        let response = self.response?;
        Some(ResponseQuery {
            request_account: message.sender().to_string(),
            request_destination: message.receiver().to_string(),
            request_time: message.transaction.close_time,
            response_memo_type: response.as_str().to_string(),
            response_marker: None,
            require_after_request: false,
        })
    }
}

/// Rule for one task workflow stage.
#[derive(Debug, Clone, Copy)]
pub struct TaskRule {
    stage: TaskStage,
}

impl TaskRule {
    /// Rule for `stage`.
    pub const fn new(stage: TaskStage) -> Self {
        Self { stage }
    }
}

impl ClassificationRule for TaskRule {
    fn name(&self) -> &str {
        self.stage.rule_name()
    }

    fn kind(&self) -> TransactionKind {
        self.stage.kind()
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        is_task_id(&message.memo_type) && TaskStage::detect(&message.body) == Some(self.stage)
    }

    fn response_query(&self, message: &InboundMessage) -> Option<ResponseQuery> {
        let response = self.stage.response()?;
        Some(ResponseQuery {
            request_account: message.sender().to_string(),
            request_destination: message.receiver().to_string(),
            request_time: message.transaction.close_time,
            response_memo_type: message.memo_type.clone(),
            response_marker: Some(response.marker().to_string()),
            require_after_request: true,
        })
    }
}

/// Ordered rule list; the first matching rule classifies a message.
pub struct RuleSet {
    rules: Vec<Box<dyn ClassificationRule>>,
}

impl RuleSet {
    /// Empty rule set.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The node's standard rules: system memo types, then task stages.
    pub fn standard() -> Self {
        let mut set = Self::empty()
            .with_rule(SystemRule::handshake())
            .with_rule(SystemRule::initiation_rite())
            .with_rule(SystemRule::initiation_reward())
            .with_rule(SystemRule::context_doc_link());
        for stage in TaskStage::ALL {
            set = set.with_rule(TaskRule::new(stage));
        }
        set
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: impl ClassificationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// First rule matching `message`.
    pub fn classify(&self, message: &InboundMessage) -> Option<&dyn ClassificationRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(message))
            .map(|rule| rule.as_ref())
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}
