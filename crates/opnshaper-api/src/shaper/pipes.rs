// Pipe endpoints
//
// `trafficshaper/settings/{add,get,set,del}_pipe` and `search_pipes`.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::shaper::models::{DeleteOutcome, PipeRecord, PipeRequest, SearchRow};

const KEY: &str = "pipe";

impl ApiClient {
    /// Stage a new pipe and return its identifier.
    ///
    /// `POST trafficshaper/settings/add_pipe`
    pub async fn add_pipe(&self, pipe: &PipeRequest) -> Result<String, Error> {
        debug!("adding pipe");
        self.add_item(KEY, pipe).await
    }

    /// Read one pipe. `Ok(None)` if the identifier is unknown.
    ///
    /// `GET trafficshaper/settings/get_pipe/{id}`
    pub async fn get_pipe(&self, id: &str) -> Result<Option<PipeRecord>, Error> {
        self.get_item(KEY, id).await
    }

    /// Replace a pipe's settings.
    ///
    /// `POST trafficshaper/settings/set_pipe/{id}`
    pub async fn set_pipe(&self, id: &str, pipe: &PipeRequest) -> Result<(), Error> {
        debug!(id, "updating pipe");
        self.set_item(KEY, id, pipe).await
    }

    /// Whether a pipe with this identifier exists. Only the shape of the
    /// answer is inspected, so a record this client cannot fully decode
    /// still counts.
    pub async fn pipe_exists(&self, id: &str) -> Result<bool, Error> {
        Ok(self.get_item::<serde_json::Value>(KEY, id).await?.is_some())
    }

    /// `POST trafficshaper/settings/del_pipe/{id}`
    pub async fn del_pipe(&self, id: &str) -> Result<DeleteOutcome, Error> {
        debug!(id, "deleting pipe");
        self.del_item(KEY, id).await
    }

    /// `POST trafficshaper/settings/search_pipes`
    pub async fn search_pipes(&self) -> Result<Vec<SearchRow>, Error> {
        self.search_items(KEY).await
    }
}
