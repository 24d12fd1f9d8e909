//! In-memory store
//!
//! Backs development runs and tests. Each table sits behind its own
//! `RwLock`; username uniqueness is checked and enforced under one write
//! guard so concurrent registrations cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use rolodex_core::{
    Contact, ContactPatch, ContactStore, NewContact, NewUser, Result, RolodexError, UserRecord,
    UserStore,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct ContactTable {
    next_id: i64,
    rows: BTreeMap<i64, Contact>,
}

/// Users and contacts held in process memory
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    contacts: RwLock<ContactTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            return Err(RolodexError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }

        let record = UserRecord {
            username: user.username,
            fullname: user.fullname,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(record.username.clone(), record.clone());

        Ok(record)
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let mut table = self.contacts.write().await;
        table.next_id += 1;

        let contact = Contact {
            id: table.next_id,
            phone: contact.phone,
        };
        table.rows.insert(contact.id, contact.clone());

        Ok(contact)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        Ok(self.contacts.read().await.rows.values().cloned().collect())
    }

    async fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        Ok(self.contacts.read().await.rows.get(&id).cloned())
    }

    async fn update_contact(&self, id: i64, patch: ContactPatch) -> Result<Option<Contact>> {
        let mut table = self.contacts.write().await;

        Ok(table.rows.get_mut(&id).map(|contact| {
            if let Some(phone) = patch.phone {
                contact.phone = phone;
            }
            contact.clone()
        }))
    }

    async fn delete_contact(&self, id: i64) -> Result<bool> {
        Ok(self.contacts.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, hash: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            fullname: "Test User".to_string(),
            password_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = MemoryStore::new();

        let record = store.insert_user(new_user("alice", "hash-a")).await.unwrap();
        assert_eq!(record.username, "alice");

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, record);
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_is_conflict_and_unchanged() {
        let store = MemoryStore::new();
        store.insert_user(new_user("alice", "hash-a")).await.unwrap();

        let result = store.insert_user(new_user("alice", "hash-b")).await;
        assert!(matches!(result, Err(RolodexError::Conflict(_))));

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "hash-a");
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_contact_crud() {
        let store = MemoryStore::new();

        let first = store
            .create_contact(NewContact {
                phone: "555-0100".to_string(),
            })
            .await
            .unwrap();
        let second = store
            .create_contact(NewContact {
                phone: "555-0101".to_string(),
            })
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let all = store.list_contacts().await.unwrap();
        assert_eq!(all, vec![first.clone(), second.clone()]);

        let updated = store
            .update_contact(
                first.id,
                ContactPatch {
                    phone: Some("555-0199".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.phone, "555-0199");

        assert!(store.delete_contact(second.id).await.unwrap());
        assert!(!store.delete_contact(second.id).await.unwrap());
        assert!(store.get_contact(second.id).await.unwrap().is_none());
        assert!(store
            .update_contact(second.id, ContactPatch::default())
            .await
            .unwrap()
            .is_none());
    }
}
