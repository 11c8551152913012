//! Parameter store abstraction
//!
//! The updater only needs two calls: read the current value and write a new
//! one. Backends implement [`ParameterStore`]; the AWS implementation lives in
//! `apu-ssm`.

use crate::error::{ParameterError, Result};
use crate::parameter::{PutRequest, StoredParameter};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch the current parameter with its value decrypted.
    /// Returns `Ok(None)` when the parameter does not exist.
    async fn get_parameter(&self, name: &str) -> Result<Option<StoredParameter>>;

    /// Create or overwrite a parameter, returning its new version.
    async fn put_parameter(&self, request: &PutRequest) -> Result<i64>;
}

#[async_trait]
impl<'a, S: ParameterStore + ?Sized> ParameterStore for &'a S {
    async fn get_parameter(&self, name: &str) -> Result<Option<StoredParameter>> {
        (**self).get_parameter(name).await
    }

    async fn put_parameter(&self, request: &PutRequest) -> Result<i64> {
        (**self).put_parameter(request).await
    }
}

#[async_trait]
impl<S: ParameterStore + ?Sized> ParameterStore for Box<S> {
    async fn get_parameter(&self, name: &str) -> Result<Option<StoredParameter>> {
        (**self).get_parameter(name).await
    }

    async fn put_parameter(&self, request: &PutRequest) -> Result<i64> {
        (**self).put_parameter(request).await
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    parameter: StoredParameter,
    description: Option<String>,
    key_id: Option<String>,
}

/// In-memory store with Parameter Store versioning semantics.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    entries: Mutex<BTreeMap<String, MemoryEntry>>,
    reads: Mutex<usize>,
    writes: Mutex<Vec<PutRequest>>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing parameter at version 1.
    pub fn with_parameter(self, request: PutRequest) -> Self {
        {
            let mut entries = self.entries.lock();
            insert_entry(&mut entries, &request);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<StoredParameter> {
        self.entries
            .lock()
            .get(name)
            .map(|entry| entry.parameter.clone())
    }

    pub fn description(&self, name: &str) -> Option<String> {
        self.entries
            .lock()
            .get(name)
            .and_then(|entry| entry.description.clone())
    }

    pub fn key_id(&self, name: &str) -> Option<String> {
        self.entries
            .lock()
            .get(name)
            .and_then(|entry| entry.key_id.clone())
    }

    /// Number of `get_parameter` calls served
    pub fn read_count(&self) -> usize {
        *self.reads.lock()
    }

    /// Every accepted write, in order
    pub fn writes(&self) -> Vec<PutRequest> {
        self.writes.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn insert_entry(entries: &mut BTreeMap<String, MemoryEntry>, request: &PutRequest) -> i64 {
    let version = entries
        .get(&request.name)
        .map(|entry| entry.parameter.version + 1)
        .unwrap_or(1);

    entries.insert(
        request.name.clone(),
        MemoryEntry {
            parameter: StoredParameter {
                name: request.name.clone(),
                value: request.value.clone(),
                parameter_type: request.parameter_type,
                version,
            },
            description: request.description.clone(),
            key_id: request.key_id.clone(),
        },
    );

    version
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<Option<StoredParameter>> {
        *self.reads.lock() += 1;
        Ok(self.get(name))
    }

    async fn put_parameter(&self, request: &PutRequest) -> Result<i64> {
        let mut entries = self.entries.lock();
        if !request.overwrite && entries.contains_key(&request.name) {
            return Err(ParameterError::store_write(
                &request.name,
                "ParameterAlreadyExists: the parameter already exists and overwrite is false",
            ));
        }

        let version = insert_entry(&mut entries, request);
        self.writes.lock().push(request.clone());
        Ok(version)
    }
}
