// Rule endpoints
//
// `trafficshaper/settings/{add,get,set,del}_rule` and `search_rules`.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::shaper::models::{DeleteOutcome, RuleRecord, RuleRequest, SearchRow};

const KEY: &str = "rule";

impl ApiClient {
    /// Stage a new rule and return its identifier.
    ///
    /// `POST trafficshaper/settings/add_rule`
    pub async fn add_rule(&self, rule: &RuleRequest) -> Result<String, Error> {
        debug!("adding rule");
        self.add_item(KEY, rule).await
    }

    /// Read one rule. `Ok(None)` if the identifier is unknown.
    ///
    /// `GET trafficshaper/settings/get_rule/{id}`
    pub async fn get_rule(&self, id: &str) -> Result<Option<RuleRecord>, Error> {
        self.get_item(KEY, id).await
    }

    /// Replace a rule's settings.
    ///
    /// `POST trafficshaper/settings/set_rule/{id}`
    pub async fn set_rule(&self, id: &str, rule: &RuleRequest) -> Result<(), Error> {
        debug!(id, "updating rule");
        self.set_item(KEY, id, rule).await
    }

    /// `POST trafficshaper/settings/del_rule/{id}`
    pub async fn del_rule(&self, id: &str) -> Result<DeleteOutcome, Error> {
        debug!(id, "deleting rule");
        self.del_item(KEY, id).await
    }

    /// `POST trafficshaper/settings/search_rules`
    pub async fn search_rules(&self) -> Result<Vec<SearchRow>, Error> {
        self.search_items(KEY).await
    }
}
