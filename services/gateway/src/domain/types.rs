use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Named delivery-target descriptor: webhook URL and method, plus an optional
/// ordering group and the key's sequence position within it.
///
/// Serializable because the resolved key is denormalized onto each inbound
/// message at processing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingKey {
    pub id: Uuid,
    pub name: String,
    pub api_url: String,
    pub api_method: String,
    /// Ordering partition; `None` means no ordering dependency.
    pub group: Option<String>,
    /// Sequence position within `group`, starting at 1.
    pub value: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of an inbound message, from broker delivery to webhook outcome.
///
/// `wait_retry` and `wait_prev_msg` are re-enterable: scheduler passes pick
/// them up again. The rest are terminal for automatic processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundStatus {
    Received,
    Working,
    Success,
    Invalid,
    WaitRetry,
    WaitPrevMsg,
    Failed,
    Canceled,
}

impl InboundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Working => "working",
            Self::Success => "success",
            Self::Invalid => "invalid",
            Self::WaitRetry => "wait_retry",
            Self::WaitPrevMsg => "wait_prev_msg",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Whether a message in this state unblocks its successor in the
    /// ordering group. A canceled predecessor does not hold the line up.
    pub fn satisfies_successor(&self) -> bool {
        matches!(self, Self::Success | Self::Canceled)
    }
}

impl std::fmt::Display for InboundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InboundStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "received" => Self::Received,
            "working" => Self::Working,
            "success" => Self::Success,
            "invalid" => Self::Invalid,
            "wait_retry" => Self::WaitRetry,
            "wait_prev_msg" => Self::WaitPrevMsg,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            other => anyhow::bail!("unknown inbound status {other:?}"),
        })
    }
}

/// Lifecycle of an outbound message. `wait` is both the initial state and the
/// state the resend pass re-selects; everything else is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundStatus {
    Wait,
    Sent,
    SentWait,
    Failed,
    Invalid,
    Canceled,
}

impl OutboundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Sent => "sent",
            Self::SentWait => "sent_wait",
            Self::Failed => "failed",
            Self::Invalid => "invalid",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OutboundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutboundStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "wait" => Self::Wait,
            "sent" => Self::Sent,
            "sent_wait" => Self::SentWait,
            "failed" => Self::Failed,
            "invalid" => Self::Invalid,
            "canceled" => Self::Canceled,
            other => anyhow::bail!("unknown outbound status {other:?}"),
        })
    }
}

/// Classification of a delivery-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    NetworkError,
    HttpOutcome,
    ValidationError,
    OrderingDeferral,
}

/// One entry in a message's append-only outcome history. Entries are only
/// ever appended, never rewritten, so the full processing history survives
/// for operator inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLog {
    pub kind: LogKind,
    pub detail: String,
    #[serde(serialize_with = "relaymq_core::serde::to_rfc3339_ms")]
    pub at: DateTime<Utc>,
}

/// A message consumed from the broker for webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: Uuid,
    pub routing_key_name: String,
    /// Resolved key, denormalized during processing.
    pub routing_key: Option<RoutingKey>,
    pub payload: Value,
    pub origin_code: String,
    pub origin_model: String,
    pub status: InboundStatus,
    pub logs: Vec<DeliveryLog>,
    /// Count of failed processing tries. Only ever increases.
    pub attempts: u32,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Fresh record for a broker delivery, before its first processing attempt.
    pub fn received(
        routing_key_name: String,
        payload: Value,
        origin_code: String,
        origin_model: String,
        api_key: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            routing_key_name,
            routing_key: None,
            payload,
            origin_code,
            origin_model,
            status: InboundStatus::Received,
            logs: Vec::new(),
            attempts: 0,
            api_key,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push_log(&mut self, kind: LogKind, detail: impl Into<String>) {
        self.logs.push(DeliveryLog {
            kind,
            detail: detail.into(),
            at: Utc::now(),
        });
    }
}

/// A message accepted over HTTP for publication onto the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub id: Uuid,
    /// Used verbatim as the broker routing key; no directory lookup outbound.
    pub routing_key: String,
    pub payload: Value,
    pub origin_code: String,
    pub origin_model: String,
    pub status: OutboundStatus,
    pub logs: Vec<DeliveryLog>,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboundMessage {
    /// Fresh record awaiting its first publish attempt.
    pub fn wait(
        routing_key: String,
        payload: Value,
        origin_code: String,
        origin_model: String,
        api_key: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            routing_key,
            payload,
            origin_code,
            origin_model,
            status: OutboundStatus::Wait,
            logs: Vec::new(),
            api_key,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push_log(&mut self, kind: LogKind, detail: impl Into<String>) {
        self.logs.push(DeliveryLog {
            kind,
            detail: detail.into(),
            at: Utc::now(),
        });
    }
}

/// Classified result of one webhook invocation. Classification happens at the
/// call site; callers act on the variant and never reinterpret raw HTTP
/// results.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// 2xx response.
    Success { status: u16, detail: String },
    /// Non-2xx response. 404 and 401 land here too: endpoint misconfiguration
    /// is treated as transient and retried.
    Rejected { status: u16, detail: String },
    /// Transport-level failure (connect, TLS, timeout).
    Unreachable { detail: String },
}

/// Broker-side result of a publish call that did not itself error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Positive confirm, or an unreliable publish the broker accepted.
    Acked,
    /// Negative confirm: the broker refused the message.
    Nacked,
    /// No confirm arrived before the bounded wait expired.
    Unconfirmed,
}

/// What a reliable publish without a positive confirm does to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NackPolicy {
    /// Park as `sent_wait`: published but unconfirmed, visible to operators.
    SentWait,
    /// Mark `failed` outright.
    Failed,
}

impl std::str::FromStr for NackPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sent_wait" => Self::SentWait,
            "failed" => Self::Failed,
            other => anyhow::bail!("unknown nack policy {other:?}"),
        })
    }
}
