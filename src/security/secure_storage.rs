use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;
use tower_sessions::session::Error;

const PREFIX: &str = "secure_";
const INDEX_KEY: &str = "secure__keys";

#[derive(Serialize, Deserialize)]
struct Stamped<T> {
    data: T,
    timestamp: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

/// Session values that carry their own expiry. Expired entries read as
/// absent and are removed on access.
pub struct SecureStorage<'a> {
    session: &'a Session,
}

impl<'a> SecureStorage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: T,
        ttl_minutes: Option<i64>,
    ) -> Result<(), Error> {
        let now = Utc::now();
        let stamped = Stamped {
            data: value,
            timestamp: now,
            expires_at: ttl_minutes.map(|m| now + Duration::minutes(m)),
        };
        self.session.insert(&prefixed(key), stamped).await?;

        let mut keys = self.keys().await?;
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
            self.session.insert(INDEX_KEY, keys).await?;
        }
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        self.get_at(key, Utc::now()).await
    }

    async fn get_at<T: DeserializeOwned>(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<T>, Error> {
        let stamped: Option<Stamped<T>> = match self.session.get(&prefixed(key)).await {
            Ok(v) => v,
            Err(e) => {
                // unreadable entries are dropped rather than surfaced to the page
                tracing::warn!("failed to read secure storage entry {}: {}", key, e);
                self.remove(key).await?;
                return Ok(None);
            }
        };

        match stamped {
            Some(s) if s.expires_at.is_some_and(|exp| now > exp) => {
                self.remove(key).await?;
                Ok(None)
            }
            Some(s) => Ok(Some(s.data)),
            None => Ok(None),
        }
    }

    pub async fn remove(&self, key: &str) -> Result<(), Error> {
        self.session.remove_value(&prefixed(key)).await?;

        let mut keys = self.keys().await?;
        keys.retain(|k| k != key);
        self.session.insert(INDEX_KEY, keys).await
    }

    pub async fn clear(&self) -> Result<(), Error> {
        for key in self.keys().await? {
            self.session.remove_value(&prefixed(&key)).await?;
        }
        self.session.remove_value(INDEX_KEY).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .session
            .get::<Vec<String>>(INDEX_KEY)
            .await?
            .unwrap_or_default())
    }
}

fn prefixed(key: &str) -> String {
    format!("{}{}", PREFIX, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_round_trip_under_prefix() {
        let session = session();
        let storage = SecureStorage::new(&session);

        storage
            .set("profile", "John Smith".to_string(), Some(60))
            .await
            .expect("insert should succeed");

        let value: Option<String> = storage.get("profile").await.expect("read should succeed");
        assert_eq!(value.as_deref(), Some("John Smith"));

        let raw: Option<serde_json::Value> = session
            .get("secure_profile")
            .await
            .expect("read should succeed");
        assert!(raw.is_some());
    }

    #[tokio::test]
    async fn test_expired_entries_read_as_absent() {
        let session = session();
        let storage = SecureStorage::new(&session);

        storage
            .set("draft", 42u32, Some(60))
            .await
            .expect("insert should succeed");

        let later = Utc::now() + Duration::minutes(61);
        let value: Option<u32> = storage
            .get_at("draft", later)
            .await
            .expect("read should succeed");
        assert_eq!(value, None);

        // the expired read also removed it
        let value: Option<u32> = storage.get("draft").await.expect("read should succeed");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let session = session();
        let storage = SecureStorage::new(&session);

        storage
            .set("pinned", true, None)
            .await
            .expect("insert should succeed");

        let value: Option<bool> = storage
            .get_at("pinned", Utc::now() + Duration::days(365))
            .await
            .expect("read should succeed");
        assert_eq!(value, Some(true));
    }

    #[tokio::test]
    async fn test_clear_removes_only_secure_keys() {
        let session = session();
        let storage = SecureStorage::new(&session);

        session
            .insert("language", "te")
            .await
            .expect("insert should succeed");
        storage.set("a", 1, None).await.expect("insert should succeed");
        storage.set("b", 2, Some(5)).await.expect("insert should succeed");

        storage.clear().await.expect("clear should succeed");

        assert_eq!(storage.get::<i32>("a").await.expect("read"), None);
        assert_eq!(storage.get::<i32>("b").await.expect("read"), None);
        assert_eq!(
            session.get::<String>("language").await.expect("read"),
            Some("te".to_string())
        );
    }
}
