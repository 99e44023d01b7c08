// Queue endpoints
//
// `trafficshaper/settings/{add,get,set,del}_queue` and `search_queues`.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::shaper::models::{DeleteOutcome, QueueRecord, QueueRequest, SearchRow};

const KEY: &str = "queue";

impl ApiClient {
    /// Stage a new queue and return its identifier.
    ///
    /// `POST trafficshaper/settings/add_queue`
    pub async fn add_queue(&self, queue: &QueueRequest) -> Result<String, Error> {
        debug!("adding queue");
        self.add_item(KEY, queue).await
    }

    /// Read one queue. `Ok(None)` if the identifier is unknown.
    ///
    /// `GET trafficshaper/settings/get_queue/{id}`
    pub async fn get_queue(&self, id: &str) -> Result<Option<QueueRecord>, Error> {
        self.get_item(KEY, id).await
    }

    /// Replace a queue's settings.
    ///
    /// `POST trafficshaper/settings/set_queue/{id}`
    pub async fn set_queue(&self, id: &str, queue: &QueueRequest) -> Result<(), Error> {
        debug!(id, "updating queue");
        self.set_item(KEY, id, queue).await
    }

    /// Whether a queue with this identifier exists. Only the shape of the
    /// answer is inspected, so a record this client cannot fully decode
    /// still counts.
    pub async fn queue_exists(&self, id: &str) -> Result<bool, Error> {
        Ok(self.get_item::<serde_json::Value>(KEY, id).await?.is_some())
    }

    /// `POST trafficshaper/settings/del_queue/{id}`
    pub async fn del_queue(&self, id: &str) -> Result<DeleteOutcome, Error> {
        debug!(id, "deleting queue");
        self.del_item(KEY, id).await
    }

    /// `POST trafficshaper/settings/search_queues`
    pub async fn search_queues(&self) -> Result<Vec<SearchRow>, Error> {
        self.search_items(KEY).await
    }
}
