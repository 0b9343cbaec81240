//! Vehicle definition - make/model metadata plus an ordered set of requests

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::request::RequestDefinition;
use crate::error::{CoreError, CoreResult};

/// A vehicle instance and the requests to poll from it.
///
/// Owns its requests exclusively. Request identities are unique within the
/// collection; `add_request` does not check this, keeping it is the
/// caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleDefinition {
    id: Uuid,
    make: String,
    model: String,
    requests: Vec<RequestDefinition>,
}

impl VehicleDefinition {
    /// Create an empty vehicle with a fresh identity
    pub fn new() -> Self {
        Self::with_make_model("", "")
    }

    /// Create an empty vehicle for a make and model
    pub fn with_make_model(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            make: make.into(),
            model: model.into(),
            requests: Vec::new(),
        }
    }

    /// Load a vehicle from a JSON definition file
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| CoreError::file_unavailable(path, &e))?;
        let vehicle = Self::from_json(&content).map_err(|e| match e {
            CoreError::MalformedDefinition(msg) => {
                CoreError::MalformedDefinition(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        debug!(
            path = %path.display(),
            vehicle_id = %vehicle.id,
            requests = vehicle.requests.len(),
            "Loaded vehicle definition"
        );
        Ok(vehicle)
    }

    /// Parse a vehicle from JSON text
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write this vehicle to a JSON definition file (inverse of `load`)
    pub fn save(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| CoreError::file_unavailable(path, &e))
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Append a request. The request's id must not already be present.
    pub fn add_request(&mut self, request: RequestDefinition) {
        debug_assert!(
            !self.requests.contains(&request),
            "duplicate request id {}",
            request.id()
        );
        self.requests.push(request);
    }

    /// Remove the first request with the same identity; no-op when absent
    pub fn remove_request(&mut self, request: &RequestDefinition) {
        if let Some(pos) = self.requests.iter().position(|r| r == request) {
            self.requests.remove(pos);
        }
    }

    /// Look up a request by id
    pub fn get_request(&self, id: &Uuid) -> CoreResult<&RequestDefinition> {
        self.requests
            .iter()
            .find(|r| r.id() == *id)
            .ok_or_else(|| CoreError::NotFound(format!("request {}", id)))
    }

    /// Requests in insertion (file) order
    pub fn requests(&self) -> std::slice::Iter<'_, RequestDefinition> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl Default for VehicleDefinition {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for VehicleDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VehicleDefinition {}
