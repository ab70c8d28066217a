use super::IdentityService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory account store. Records every call as `"<op>:<email>"`.
#[derive(Clone)]
pub struct MockIdentityClient {
    accounts: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockIdentityClient {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), password.to_string());
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockIdentityClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityService for MockIdentityClient {
    async fn create_session(&self, email: &str, password: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("session:{}", email));

        match self.accounts.lock().unwrap().get(email) {
            Some(stored) if stored == password => Ok(()),
            _ => Err(Error::Identity("Invalid credentials".to_string())),
        }
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("account:{}", email));

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(Error::Identity("User already exists".to_string()));
        }
        accounts.insert(email.to_string(), password.to_string());
        Ok(())
    }
}
