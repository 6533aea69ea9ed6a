use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Ordered API keys. Order is the rotation order used by the checker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialSet {
    keys: Vec<String>,
}

/// Keys shared between the UI and a background check run.
pub type SharedCredentials = Arc<RwLock<CredentialSet>>;

impl CredentialSet {
    /// Takes stored keys as they are; duplicates are only rejected by `add`.
    pub fn from_keys(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn add(&mut self, key: &str) -> Result<()> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyCredential);
        }
        if self.keys.iter().any(|k| k == trimmed) {
            return Err(CoreError::DuplicateCredential);
        }
        self.keys.push(trimmed.to_string());
        Ok(())
    }

    /// Returns whether a key was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.keys.iter().position(|k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.keys.len() {
            Some(self.keys.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn masked(&self) -> Vec<String> {
        self.keys.iter().map(|k| mask_for_display(k)).collect()
    }

    pub fn into_shared(self) -> SharedCredentials {
        Arc::new(RwLock::new(self))
    }
}

/// Never shows a whole key: short keys become `***`, longer ones `abcd...wxyz`.
pub fn mask_for_display(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Where the checker reads the current keys from, once per keyword.
pub trait CredentialSource: Send + Sync {
    fn snapshot(&self) -> Vec<String>;
}

impl CredentialSource for CredentialSet {
    fn snapshot(&self) -> Vec<String> {
        self.keys.clone()
    }
}

impl CredentialSource for RwLock<CredentialSet> {
    fn snapshot(&self) -> Vec<String> {
        let guard = self.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.keys.clone()
    }
}

impl CredentialSource for Vec<String> {
    fn snapshot(&self) -> Vec<String> {
        self.clone()
    }
}
