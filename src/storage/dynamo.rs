//! DynamoDB storm state store.
//!
//! The state lives in one item keyed by `id`. Attribute names match the
//! records written by earlier deployments: `notified` (BOOL) and
//! `last_nonempty_time` (S, ISO-8601).

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{StateConfig, StormState, lenient_time};
use crate::storage::StateStore;

const ID_ATTR: &str = "id";
const NOTIFIED_ATTR: &str = "notified";
const LAST_NONEMPTY_ATTR: &str = "last_nonempty_time";

#[derive(Clone)]
pub struct DynamoStateStore {
    client: Client,
    table: String,
    key: String,
}

impl DynamoStateStore {
    pub fn new(client: Client, table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn from_config(sdk_config: &aws_config::SdkConfig, config: &StateConfig) -> Self {
        Self::new(Client::new(sdk_config), &config.table, &config.key)
    }
}

/// Convert a stored item into state. Missing or mistyped attributes fall back
/// to their defaults.
pub fn state_from_item(item: &HashMap<String, AttributeValue>) -> StormState {
    let notified = item
        .get(NOTIFIED_ATTR)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false);
    let last_nonempty_time = item
        .get(LAST_NONEMPTY_ATTR)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| lenient_time::parse(s));

    StormState {
        notified,
        last_nonempty_time,
    }
}

pub fn item_from_state(key: &str, state: &StormState) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        (ID_ATTR.to_string(), AttributeValue::S(key.to_string())),
        (
            NOTIFIED_ATTR.to_string(),
            AttributeValue::Bool(state.notified),
        ),
    ]);
    if let Some(at) = state.last_nonempty_time {
        item.insert(
            LAST_NONEMPTY_ATTR.to_string(),
            AttributeValue::S(at.to_rfc3339()),
        );
    }
    item
}

#[async_trait]
impl StateStore for DynamoStateStore {
    async fn load(&self) -> Result<Option<StormState>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(ID_ATTR, AttributeValue::S(self.key.clone()))
            .send()
            .await
            .map_err(|e| AppError::state(e.into_service_error()))?;

        let state = output.item().map(state_from_item);
        debug!("Loaded storm state from {}: {:?}", self.table, state);
        Ok(state)
    }

    async fn save(&self, state: &StormState) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item_from_state(&self.key, state)))
            .send()
            .await
            .map_err(|e| AppError::state(e.into_service_error()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::at;

    #[test]
    fn test_item_round_trip() {
        let state = StormState {
            notified: true,
            last_nonempty_time: Some(at(2)),
        };
        let item = item_from_state("state", &state);
        assert_eq!(item.get(ID_ATTR), Some(&AttributeValue::S("state".into())));
        assert_eq!(state_from_item(&item), state);
    }

    #[test]
    fn test_idle_item_omits_time() {
        let item = item_from_state("state", &StormState::default());
        assert!(!item.contains_key(LAST_NONEMPTY_ATTR));
        assert_eq!(state_from_item(&item), StormState::default());
    }

    #[test]
    fn test_unparsable_time_loads_as_none() {
        let item = HashMap::from([
            (NOTIFIED_ATTR.to_string(), AttributeValue::Bool(true)),
            (
                LAST_NONEMPTY_ATTR.to_string(),
                AttributeValue::S("garbage".into()),
            ),
        ]);
        let state = state_from_item(&item);
        assert!(state.notified);
        assert!(state.last_nonempty_time.is_none());
    }
}
