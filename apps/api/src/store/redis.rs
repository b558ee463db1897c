use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use tracing::info;

use super::{KvStore, StoreError};

/// Redis-backed store. Every key lives under `<namespace>:` so `clear` only
/// touches this user's data.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    namespace: String,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, namespace: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis store connected (namespace: {namespace})");

        Ok(Self {
            conn,
            namespace: namespace.to_string(),
        })
    }

    fn key(&self, key: &str) -> String {
        namespaced(&self.namespace, key)
    }
}

fn namespaced(namespace: &str, key: &str) -> String {
    format!("{namespace}:{key}")
}

/// Glob matching every key under `namespace`, with glob metacharacters in
/// the namespace escaped.
fn namespace_pattern(namespace: &str) -> String {
    let mut pattern = String::with_capacity(namespace.len() + 2);
    for c in namespace.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str(":*");
    pattern
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(self.key(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(key)).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut scan_conn = self.conn.clone();
        let mut keys = Vec::new();
        {
            let mut iter = scan_conn
                .scan_match::<_, String>(namespace_pattern(&self.namespace))
                .await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        if !keys.is_empty() {
            let mut conn = self.conn.clone();
            conn.del::<_, ()>(keys).await?;
        }
        Ok(())
    }
}
