use serde::Deserialize;
use serde_json::json;

use crate::domain::{DeliveryResult, MessageStatus, OutboundMessage};
use crate::transport::request::ApiRequest;

pub const SEND_SMS_PATH: &str = "/messages/sms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TransportMessageStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl From<TransportMessageStatus> for MessageStatus {
    fn from(value: TransportMessageStatus) -> Self {
        match value {
            TransportMessageStatus::Pending => MessageStatus::Pending,
            TransportMessageStatus::Sent => MessageStatus::Sent,
            TransportMessageStatus::Delivered => MessageStatus::Delivered,
            TransportMessageStatus::Failed => MessageStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResultJson {
    id: String,
    #[serde(default)]
    sid: Option<String>,
    channel: String,
    to: Vec<String>,
    from: String,
    content: String,
    status: TransportMessageStatus,
    cost: f64,
    currency: String,
    created_at: String,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<DeliveryResultJson> for DeliveryResult {
    fn from(value: DeliveryResultJson) -> Self {
        Self {
            id: value.id,
            secondary_id: value.sid,
            channel: value.channel,
            recipients: value.to,
            sender: value.from,
            content: value.content,
            status: value.status.into(),
            cost: value.cost,
            currency: value.currency,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// `POST /messages/sms` with body `{"to": ..., "message": ...}`.
pub fn encode_send_sms_request(message: &OutboundMessage) -> ApiRequest {
    ApiRequest::post(SEND_SMS_PATH).json(json!({
        "to": message.recipient().as_str(),
        "message": message.body().as_str(),
    }))
}
