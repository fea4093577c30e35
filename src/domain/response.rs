/// Delivery state reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

/// Accepted message as returned by `POST /messages/sms`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryResult {
    pub id: String,
    /// Provider-side id (`sid`), when the API reports one.
    pub secondary_id: Option<String>,
    pub channel: String,
    pub recipients: Vec<String>,
    pub sender: String,
    pub content: String,
    pub status: MessageStatus,
    pub cost: f64,
    pub currency: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}
