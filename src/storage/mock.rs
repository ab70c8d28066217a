use super::{StorageService, StoredObject};
use crate::models::SelectedFile;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// In-memory storage. Echoes the requested id unless ids were queued with
/// [`MockStorageClient::with_assigned_id`].
#[derive(Clone)]
pub struct MockStorageClient {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    assigned_ids: Arc<Mutex<VecDeque<String>>>,
    base_url: String,
    failure: Option<String>,
    upload_count: Arc<Mutex<usize>>,
}

impl MockStorageClient {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            assigned_ids: Arc::new(Mutex::new(VecDeque::new())),
            base_url: "https://mock-storage.example.com".to_string(),
            failure: None,
            upload_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_assigned_id(self, id: String) -> Self {
        self.assigned_ids.lock().unwrap().push_back(id);
        self
    }

    pub fn with_failure(mut self, message: String) -> Self {
        self.failure = Some(message);
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_objects(&self) -> HashMap<String, Vec<u8>> {
        self.objects.lock().unwrap().clone()
    }
}

impl Default for MockStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageClient {
    async fn create_object(
        &self,
        _container_id: &str,
        object_id: &str,
        file: &SelectedFile,
    ) -> Result<StoredObject> {
        *self.upload_count.lock().unwrap() += 1;

        if let Some(message) = &self.failure {
            return Err(Error::Storage(message.clone()));
        }

        let id = self
            .assigned_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| object_id.to_string());

        self.objects
            .lock()
            .unwrap()
            .insert(id.clone(), file.bytes.clone());
        Ok(StoredObject { id })
    }

    fn view_url(&self, _container_id: &str, id: &str) -> String {
        format!("{}/files/{}/view", self.base_url, id)
    }
}
