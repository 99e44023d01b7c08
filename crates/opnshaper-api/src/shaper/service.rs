// Traffic shaper service control
//
// Staged settings only take effect after `service/reconfigure`.

use serde_json::Map;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::shaper::MODULE;
use crate::shaper::models::ServiceStatus;

impl ApiClient {
    /// Apply every staged shaper change.
    ///
    /// `POST trafficshaper/service/reconfigure` with an empty body. The
    /// returned status is not interpreted here; see [`ServiceStatus::is_ok`].
    pub async fn reconfigure_shaper(&self) -> Result<ServiceStatus, Error> {
        let url = self.endpoint(MODULE, "service", "reconfigure", None);
        debug!("reconfiguring traffic shaper");
        let resp = self.post_json(url, &Map::new()).await?;
        let body = resp.to_string();
        serde_json::from_value(resp).map_err(|e| Error::Deserialization {
            message: format!("reconfigure: {e}"),
            body,
        })
    }
}
