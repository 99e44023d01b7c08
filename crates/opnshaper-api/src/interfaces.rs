// Interface inventory endpoint
//
// Rules address interfaces by their short identifier (`lan`, `wan`,
// `opt1`, ...). The overview controller lists every assigned interface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::Error;

/// One assigned interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRow {
    /// Short name used in rule `interface` fields.
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub description: String,
    /// Kernel device, e.g. `igb0`.
    #[serde(default)]
    pub device: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct InterfacesResponse {
    #[serde(default)]
    rows: Vec<InterfaceRow>,
}

impl ApiClient {
    /// List assigned interfaces.
    ///
    /// `GET interfaces/overview/interfaces_info`
    pub async fn list_interfaces(&self) -> Result<Vec<InterfaceRow>, Error> {
        let url = self.endpoint("interfaces", "overview", "interfaces_info", None);
        let resp = self.get_json(url).await?;
        let body = resp.to_string();
        let parsed: InterfacesResponse =
            serde_json::from_value(resp).map_err(|e| Error::Deserialization {
                message: format!("interfaces_info: {e}"),
                body,
            })?;
        Ok(parsed
            .rows
            .into_iter()
            .filter(|row| !row.identifier.is_empty())
            .collect())
    }
}
