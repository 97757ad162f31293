//! Deterministic in-memory stand-in for the daemon client.
//!
//! [`MockClient`] is a first-class implementation of [`Client`], not a
//! wrapper around the production one. Responses are scripted per
//! operation; behavioral callbacks are the escape hatch for scenarios a
//! fixed response cannot express (e.g. a creation conflict followed by a
//! successful lookup). One mutex guards both the scripted responses and
//! the call records, so the mock is safe to share across concurrent
//! callers.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::Client;
use crate::error::{DockerError, DockerResult};
use crate::types::{Network, NetworkCreateOptions, NetworkListOptions};

type CreateCallback =
    Box<dyn Fn(&str, &NetworkCreateOptions) -> DockerResult<String> + Send + Sync>;
type RemoveCallback = Box<dyn Fn(&str) -> DockerResult<()> + Send + Sync>;
type ListCallback = Box<dyn Fn(&NetworkListOptions) -> DockerResult<Vec<Network>> + Send + Sync>;
type InspectCallback = Box<dyn Fn(&str) -> DockerResult<Network> + Send + Sync>;

/// A recorded `network_create` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkCreateCall {
    /// Requested network name.
    pub name: String,
    /// Options the caller supplied.
    pub opts: NetworkCreateOptions,
}

#[derive(Default)]
struct MockState {
    // Scripted responses.
    ping_error: Option<DockerError>,
    close_error: Option<DockerError>,
    create_id: Option<String>,
    create_error: Option<DockerError>,
    remove_error: Option<DockerError>,
    list_result: Vec<Network>,
    list_error: Option<DockerError>,
    inspect_result: Option<Network>,
    inspect_error: Option<DockerError>,

    // Behavioral callbacks, taking precedence over scripted responses.
    on_create: Option<CreateCallback>,
    on_remove: Option<RemoveCallback>,
    on_list: Option<ListCallback>,
    on_inspect: Option<InspectCallback>,

    // Call records.
    ping_calls: usize,
    close_calls: usize,
    create_calls: Vec<NetworkCreateCall>,
    remove_calls: Vec<String>,
    list_calls: Vec<NetworkListOptions>,
    inspect_calls: Vec<String>,
}

/// Scriptable [`Client`] double for tests.
#[derive(Default)]
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    /// A mock with no scripted responses: every operation succeeds and
    /// create returns a generated id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `ping` to fail.
    pub fn set_ping_error(&self, err: DockerError) {
        self.state.lock().ping_error = Some(err);
    }

    /// Script `close` to fail.
    pub fn set_close_error(&self, err: DockerError) {
        self.state.lock().close_error = Some(err);
    }

    /// Script the id `network_create` returns.
    pub fn set_create_id(&self, id: impl Into<String>) {
        self.state.lock().create_id = Some(id.into());
    }

    /// Script `network_create` to fail.
    pub fn set_create_error(&self, err: DockerError) {
        self.state.lock().create_error = Some(err);
    }

    /// Script `network_remove` to fail.
    pub fn set_remove_error(&self, err: DockerError) {
        self.state.lock().remove_error = Some(err);
    }

    /// Script the networks `network_list` returns.
    pub fn set_list_result(&self, networks: Vec<Network>) {
        self.state.lock().list_result = networks;
    }

    /// Script `network_list` to fail.
    pub fn set_list_error(&self, err: DockerError) {
        self.state.lock().list_error = Some(err);
    }

    /// Script the network `network_inspect` returns.
    pub fn set_inspect_result(&self, network: Network) {
        self.state.lock().inspect_result = Some(network);
    }

    /// Script `network_inspect` to fail.
    pub fn set_inspect_error(&self, err: DockerError) {
        self.state.lock().inspect_error = Some(err);
    }

    /// Route `network_create` through a callback.
    ///
    /// The callback runs while the mock's lock is held; it must not call
    /// back into the same mock.
    pub fn on_network_create(
        &self,
        callback: impl Fn(&str, &NetworkCreateOptions) -> DockerResult<String> + Send + Sync + 'static,
    ) {
        self.state.lock().on_create = Some(Box::new(callback));
    }

    /// Route `network_remove` through a callback.
    pub fn on_network_remove(
        &self,
        callback: impl Fn(&str) -> DockerResult<()> + Send + Sync + 'static,
    ) {
        self.state.lock().on_remove = Some(Box::new(callback));
    }

    /// Route `network_list` through a callback.
    pub fn on_network_list(
        &self,
        callback: impl Fn(&NetworkListOptions) -> DockerResult<Vec<Network>> + Send + Sync + 'static,
    ) {
        self.state.lock().on_list = Some(Box::new(callback));
    }

    /// Route `network_inspect` through a callback.
    pub fn on_network_inspect(
        &self,
        callback: impl Fn(&str) -> DockerResult<Network> + Send + Sync + 'static,
    ) {
        self.state.lock().on_inspect = Some(Box::new(callback));
    }

    /// Number of `ping` calls recorded.
    #[must_use]
    pub fn ping_calls(&self) -> usize {
        self.state.lock().ping_calls
    }

    /// Number of `close` calls recorded.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }

    /// Recorded `network_create` calls, in order.
    #[must_use]
    pub fn create_calls(&self) -> Vec<NetworkCreateCall> {
        self.state.lock().create_calls.clone()
    }

    /// Recorded `network_remove` names, in order.
    #[must_use]
    pub fn remove_calls(&self) -> Vec<String> {
        self.state.lock().remove_calls.clone()
    }

    /// Recorded `network_list` options, in order.
    #[must_use]
    pub fn list_calls(&self) -> Vec<NetworkListOptions> {
        self.state.lock().list_calls.clone()
    }

    /// Recorded `network_inspect` names, in order.
    #[must_use]
    pub fn inspect_calls(&self) -> Vec<String> {
        self.state.lock().inspect_calls.clone()
    }

    /// Clear all recorded calls, keeping scripted responses.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.ping_calls = 0;
        state.close_calls = 0;
        state.create_calls.clear();
        state.remove_calls.clear();
        state.list_calls.clear();
        state.inspect_calls.clear();
    }
}

#[async_trait]
impl Client for MockClient {
    async fn network_create(&self, name: &str, opts: NetworkCreateOptions) -> DockerResult<String> {
        let mut state = self.state.lock();
        state.create_calls.push(NetworkCreateCall {
            name: name.to_string(),
            opts: opts.clone(),
        });

        if let Some(callback) = &state.on_create {
            return callback(name, &opts);
        }
        if let Some(err) = &state.create_error {
            return Err(err.clone());
        }
        if let Some(id) = &state.create_id {
            return Ok(id.clone());
        }
        Ok(format!("mock-network-id-{name}"))
    }

    async fn network_remove(&self, name: &str) -> DockerResult<()> {
        let mut state = self.state.lock();
        state.remove_calls.push(name.to_string());

        if let Some(callback) = &state.on_remove {
            return callback(name);
        }
        match &state.remove_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn network_list(&self, opts: NetworkListOptions) -> DockerResult<Vec<Network>> {
        let mut state = self.state.lock();
        state.list_calls.push(opts.clone());

        if let Some(callback) = &state.on_list {
            return callback(&opts);
        }
        if let Some(err) = &state.list_error {
            return Err(err.clone());
        }
        Ok(state.list_result.clone())
    }

    async fn network_inspect(&self, name: &str) -> DockerResult<Network> {
        let mut state = self.state.lock();
        state.inspect_calls.push(name.to_string());

        if let Some(callback) = &state.on_inspect {
            return callback(name);
        }
        if let Some(err) = &state.inspect_error {
            return Err(err.clone());
        }
        match &state.inspect_result {
            Some(net) => Ok(net.clone()),
            None => Err(DockerError::not_found(name)),
        }
    }

    async fn ping(&self) -> DockerResult<()> {
        let mut state = self.state.lock();
        state.ping_calls += 1;
        match &state.ping_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn close(&self) -> DockerResult<()> {
        let mut state = self.state.lock();
        state.close_calls += 1;
        match &state.close_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
