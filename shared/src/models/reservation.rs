//! Reservation Model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::chat::SessionId;

/// Reservation linked to a chat session.
///
/// The backend may grow reservation fields (party size, table, deposit state)
/// without a client release; everything beyond the identity pair rides in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub session_id: SessionId,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_preserved() {
        let r: Reservation = serde_json::from_value(serde_json::json!({
            "id": 3,
            "session_id": 42,
            "status": "confirmed",
            "party_size": 4,
        }))
        .unwrap();
        assert_eq!(r.id, 3);
        assert_eq!(r.extra["status"], "confirmed");
        assert_eq!(r.extra["party_size"], 4);
    }
}
