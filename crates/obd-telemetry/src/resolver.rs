//! Capability resolver
//!
//! Filters a vehicle's requests down to what the attached hardware can
//! answer and binds each survivor to a live query.

use std::sync::Arc;

use obd_core::{
    CoreError, CoreResult, LiveQuery, ObdDevice, RequestDefinition, VehicleDefinition,
    SERVICE_CURRENT_DATA,
};
use tracing::{debug, info};
use uuid::Uuid;

/// A request definition attached to its continuously refreshed query
#[derive(Clone)]
pub struct BoundQuery {
    definition: RequestDefinition,
    query: Arc<dyn LiveQuery>,
}

impl BoundQuery {
    pub fn new(definition: RequestDefinition, query: Arc<dyn LiveQuery>) -> Self {
        Self { definition, query }
    }

    pub fn definition(&self) -> &RequestDefinition {
        &self.definition
    }

    pub fn query(&self) -> &Arc<dyn LiveQuery> {
        &self.query
    }

    /// Display label: the request name, or its address when unnamed
    pub fn label(&self) -> String {
        self.definition.label()
    }
}

impl std::fmt::Debug for BoundQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundQuery")
            .field("definition", &self.definition)
            .field("formula", &self.query.formula())
            .finish()
    }
}

/// Output of one resolution pass, in a fixed order for the rest of the run
#[derive(Debug, Clone, Default)]
pub struct ResolvedQueries {
    queries: Vec<BoundQuery>,
}

impl ResolvedQueries {
    pub fn iter(&self) -> std::slice::Iter<'_, BoundQuery> {
        self.queries.iter()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Bound query for a request identity
    pub fn get(&self, id: &Uuid) -> Option<&BoundQuery> {
        self.queries.iter().find(|q| q.definition.id() == *id)
    }

    /// Display labels in resolution order
    pub fn labels(&self) -> Vec<String> {
        self.queries.iter().map(BoundQuery::label).collect()
    }
}

impl<'a> IntoIterator for &'a ResolvedQueries {
    type Item = &'a BoundQuery;
    type IntoIter = std::slice::Iter<'a, BoundQuery>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}

/// Whether a request is subject to supported-PID filtering
fn is_filtered(request: &RequestDefinition, primary: u32) -> bool {
    request.ecu == primary && request.service == SERVICE_CURRENT_DATA
}

/// Resolve a vehicle's requests against a device.
///
/// Capability discovery is issued once on the device's primary module
/// (0x7E0 unless configured otherwise). Current-data requests to that
/// module whose PID is not supported are dropped; every other request is
/// bound. Discovery failure yields `DeviceUnavailable`
/// and no queries are bound.
pub async fn resolve(
    device: &dyn ObdDevice,
    vehicle: &VehicleDefinition,
) -> CoreResult<ResolvedQueries> {
    let primary = device.primary_module();
    let supported = device
        .supported_pids(primary)
        .await
        .map_err(|e| match e {
            CoreError::DeviceUnavailable(_) => e,
            other => CoreError::DeviceUnavailable(other.to_string()),
        })?;

    let mut queries = Vec::with_capacity(vehicle.len());

    for request in vehicle.requests() {
        if is_filtered(request, primary) && !supported.contains(&request.pid) {
            debug!(request = %request, "Skipping unsupported request");
            continue;
        }

        let query = device.bind_live_query(
            request.ecu,
            request.service,
            request.pid,
            request.formula(),
        );
        queries.push(BoundQuery::new(request.clone(), query));
    }

    info!(
        bound = queries.len(),
        skipped = vehicle.len() - queries.len(),
        "Requests resolved"
    );

    Ok(ResolvedQueries { queries })
}
