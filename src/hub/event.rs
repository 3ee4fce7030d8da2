use serde::{Deserialize, Serialize};

/// Everything a room can fan out, whether a participant typed it or a CRUD
/// handler injected it. Both origins serialize identically, so receivers can
/// only tell them apart by the `type` tag and payload fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    UserJoined {
        user_id: i64,
    },
    UserLeft {
        user_id: i64,
    },
    Chat {
        from: i64,
        message: String,
    },
    ContractCreated {
        contract_id: i64,
        job_id: i64,
        client_id: i64,
        freelancer_id: i64,
        status: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_is_kind_tagged() {
        assert_eq!(
            serde_json::to_value(ChatEvent::UserJoined { user_id: 1 }).unwrap(),
            json!({"type": "user_joined", "user_id": 1}),
        );
        assert_eq!(
            serde_json::to_value(ChatEvent::UserLeft { user_id: 2 }).unwrap(),
            json!({"type": "user_left", "user_id": 2}),
        );
        assert_eq!(
            serde_json::to_value(ChatEvent::Chat {
                from: 1,
                message: "hello".to_owned(),
            })
            .unwrap(),
            json!({"type": "chat", "from": 1, "message": "hello"}),
        );
    }

    #[test]
    fn domain_event_carries_contract_fields() {
        assert_eq!(
            serde_json::to_value(ChatEvent::ContractCreated {
                contract_id: 42,
                job_id: 7,
                client_id: 1,
                freelancer_id: 2,
                status: "ongoing".to_owned(),
            })
            .unwrap(),
            json!({
                "type": "contract_created",
                "contract_id": 42,
                "job_id": 7,
                "client_id": 1,
                "freelancer_id": 2,
                "status": "ongoing",
            }),
        );
    }
}
