// Traffic shaper endpoints
//
// Pipes, queues and rules share one CRUD protocol under
// `trafficshaper/settings/`. The generic helpers here implement it once;
// the per-entity modules only pick the command names and payload types.

pub mod models;
pub mod options;
pub mod pipes;
pub mod queues;
pub mod rules;
pub mod service;
pub mod wire;

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{ApiClient, ErrorResponse};
use crate::error::Error;

pub use models::{
    DeleteOutcome, PipeRecord, PipeRequest, QueueRecord, QueueRequest, RuleRecord, RuleRequest,
    SearchRequest, SearchRow, ServiceStatus,
};
pub use options::{OptionEntry, OptionMap};
pub use wire::{Flag, ListField, Quoted, SENTINEL_UNSET, Sentinel};

use models::{MutationResponse, SearchResponse};

pub(crate) const MODULE: &str = "trafficshaper";
pub(crate) const SETTINGS: &str = "settings";

impl ApiClient {
    fn settings_url(&self, command: &str, id: Option<&str>) -> url::Url {
        self.endpoint(MODULE, SETTINGS, command, id)
    }

    /// `POST add_{key}` with `{key: item}`; returns the new identifier.
    pub(crate) async fn add_item<B: Serialize + Sync>(
        &self,
        key: &str,
        item: &B,
    ) -> Result<String, Error> {
        let url = self.settings_url(&format!("add_{key}"), None);
        let resp = self.post_json(url, &wrap(key, item)?).await?;
        let mutation = mutation_response(resp)?;
        match mutation.result.as_str() {
            "saved" => match mutation.uuid {
                Some(uuid) if !uuid.trim().is_empty() => Ok(uuid),
                _ => Err(Error::Deserialization {
                    message: format!("add_{key} saved but returned no uuid"),
                    body: String::new(),
                }),
            },
            _ => Err(verdict_error(mutation)),
        }
    }

    /// `GET get_{key}/{id}`; `None` when the firewall answers with an empty
    /// array, which is how it reports an unknown identifier.
    pub(crate) async fn get_item<T: DeserializeOwned>(
        &self,
        key: &str,
        id: &str,
    ) -> Result<Option<T>, Error> {
        let url = self.settings_url(&format!("get_{key}"), Some(id));
        let resp = self.get_json(url).await?;

        let item = match resp {
            Value::Array(_) => return Ok(None),
            Value::Object(mut obj) => match obj.remove(key) {
                Some(Value::Array(_)) => return Ok(None),
                Some(item) => item,
                None => {
                    return Err(Error::Deserialization {
                        message: format!("get_{key}: response has no '{key}' member"),
                        body: Value::Object(obj).to_string(),
                    });
                }
            },
            other => {
                return Err(Error::Deserialization {
                    message: format!("get_{key}: expected an object"),
                    body: other.to_string(),
                });
            }
        };

        let body = item.to_string();
        serde_json::from_value(item)
            .map(Some)
            .map_err(|e| Error::Deserialization {
                message: format!("get_{key}: {e}"),
                body,
            })
    }

    /// `POST set_{key}/{id}` with `{key: item}`.
    ///
    /// The firewall answers an unknown identifier with `failed` and no
    /// validations; that is reported as [`Error::NotFound`].
    pub(crate) async fn set_item<B: Serialize + Sync>(
        &self,
        key: &str,
        id: &str,
        item: &B,
    ) -> Result<(), Error> {
        let url = self.settings_url(&format!("set_{key}"), Some(id));
        let resp = self.post_json(url, &wrap(key, item)?).await?;
        let mutation = mutation_response(resp)?;
        match mutation.result.as_str() {
            "saved" => Ok(()),
            "failed" if mutation.validations.is_empty() => {
                debug!(key, id, "set target does not exist");
                Err(Error::NotFound {
                    command: format!("set_{key}"),
                    id: id.to_owned(),
                })
            }
            _ => Err(verdict_error(mutation)),
        }
    }

    /// `POST del_{key}/{id}` with an empty body.
    ///
    /// A blocked delete (the item is still referenced) comes back as HTTP 500
    /// with `errorTitle`/`errorMessage` and is reported as `Conflict`.
    pub(crate) async fn del_item(&self, key: &str, id: &str) -> Result<DeleteOutcome, Error> {
        let url = self.settings_url(&format!("del_{key}"), Some(id));
        let raw = self.post_raw(url, &Map::new()).await?;

        if raw.status == reqwest::StatusCode::INTERNAL_SERVER_ERROR {
            let parsed: ErrorResponse = serde_json::from_str(&raw.body).unwrap_or_default();
            if parsed.message.is_some() || parsed.title.is_some() {
                return Err(Error::Conflict {
                    title: parsed.title.unwrap_or_else(|| "Error".into()),
                    message: parsed.message.unwrap_or_default(),
                });
            }
        }

        let mutation = mutation_response(raw.into_json()?)?;
        match mutation.result.as_str() {
            "deleted" => Ok(DeleteOutcome::Deleted),
            "not found" => {
                debug!(key, id, "delete target already absent");
                Ok(DeleteOutcome::NotFound)
            }
            other => Err(Error::Conflict {
                title: format!("del_{key}"),
                message: if other.is_empty() {
                    "no result returned".into()
                } else {
                    format!("unexpected result '{other}'")
                },
            }),
        }
    }

    /// `POST search_{key}s` for every row.
    pub(crate) async fn search_items(&self, key: &str) -> Result<Vec<SearchRow>, Error> {
        let url = self.settings_url(&format!("search_{key}s"), None);
        let resp = self.post_json(url, &SearchRequest::default()).await?;
        let body = resp.to_string();
        let parsed: SearchResponse =
            serde_json::from_value(resp).map_err(|e| Error::Deserialization {
                message: format!("search_{key}s: {e}"),
                body,
            })?;
        Ok(parsed.rows)
    }
}

fn wrap<B: Serialize>(key: &str, item: &B) -> Result<Map<String, Value>, Error> {
    let mut body = Map::new();
    body.insert(key.to_owned(), serde_json::to_value(item)?);
    Ok(body)
}

fn mutation_response(value: Value) -> Result<MutationResponse, Error> {
    let body = value.to_string();
    serde_json::from_value(value).map_err(|_| Error::Deserialization {
        message: "expected a {\"result\": ...} object".into(),
        body,
    })
}

/// Classify a non-success `result` verdict.
fn verdict_error(mutation: MutationResponse) -> Error {
    if mutation.result == "failed" || !mutation.validations.is_empty() {
        return Error::Validation {
            messages: validation_messages(mutation.validations),
        };
    }
    Error::UnexpectedResult {
        result: mutation.result,
    }
}

/// Flatten `{field: "msg" | ["msg", ...]}` keeping every message verbatim.
fn validation_messages(raw: Map<String, Value>) -> BTreeMap<String, Vec<String>> {
    raw.into_iter()
        .map(|(field, value)| {
            let messages = match value {
                Value::String(s) => vec![s],
                Value::Array(items) => items
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
                other => vec![other.to_string()],
            };
            (field, messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validation_messages_accept_string_or_list() {
        let raw = json!({
            "rule.target": "Related item not found",
            "rule.sequence": ["Must be a number.", "Too small."]
        });
        let Value::Object(map) = raw else {
            unreachable!()
        };
        let messages = validation_messages(map);
        assert_eq!(messages["rule.target"], vec!["Related item not found"]);
        assert_eq!(messages["rule.sequence"].len(), 2);
    }

    #[test]
    fn failed_result_is_validation_even_without_messages() {
        let err = verdict_error(MutationResponse {
            result: "failed".into(),
            ..MutationResponse::default()
        });
        assert!(matches!(err, Error::Validation { ref messages } if messages.is_empty()));
    }

    #[test]
    fn unknown_result_is_reported() {
        let err = verdict_error(MutationResponse {
            result: "maybe".into(),
            ..MutationResponse::default()
        });
        assert!(matches!(err, Error::UnexpectedResult { ref result } if result == "maybe"));
    }
}
