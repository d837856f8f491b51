/**
 * Channel Hub
 *
 * Owns every `BroadcastChannel`, keyed by name. The set of channels is fixed
 * when the hub is built at startup; looking up a name that was not configured
 * is an explicit `RealtimeError::UnknownChannel`, never a lazily created
 * channel.
 *
 * Each channel gets its own registry and its own `WorkerPool`, so slow
 * subscribers on one channel never hold permits another channel needs.
 */
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::realtime::broadcast::BroadcastChannel;
use crate::backend::realtime::connection::{Connection, Transport};
use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::backend::worker::WorkerPool;

/// Live connection count for one channel
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChannelStats {
    pub name: String,
    pub connections: usize,
}

pub struct ChannelHub {
    channels: HashMap<String, BroadcastChannel>,
}

impl ChannelHub {
    /// Build one channel per name, each with its own registry and a pool of
    /// `pool_size` concurrent sends
    pub fn new<I, S>(names: I, pool_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let channel = BroadcastChannel::new(
                    name.clone(),
                    Arc::new(ConnectionRegistry::new()),
                    WorkerPool::new(pool_size),
                );
                (name, channel)
            })
            .collect::<HashMap<_, _>>();

        tracing::info!("[Realtime] Channel hub ready with {} channels", channels.len());
        Self { channels }
    }

    pub fn channel(&self, name: &str) -> Option<&BroadcastChannel> {
        self.channels.get(name)
    }

    /// Look up a channel, failing on names that were never configured
    pub fn resolve(&self, name: &str) -> Result<&BroadcastChannel, RealtimeError> {
        self.channel(name)
            .ok_or_else(|| RealtimeError::UnknownChannel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub async fn subscribe(
        &self,
        name: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Arc<Connection>, RealtimeError> {
        self.resolve(name)?.subscribe(transport).await
    }

    pub fn unsubscribe(&self, name: &str, connection: &Connection) -> Result<bool, RealtimeError> {
        Ok(self.resolve(name)?.unsubscribe(connection))
    }

    pub fn broadcast(&self, name: &str, payload: &str) -> Result<usize, RealtimeError> {
        Ok(self.resolve(name)?.broadcast(payload))
    }

    pub fn connection_count(&self, name: &str) -> Result<usize, RealtimeError> {
        Ok(self.resolve(name)?.connection_count())
    }

    /// Channel names in sorted order
    pub fn channel_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Wait until no channel has a send queued or running
    pub async fn wait_idle(&self) {
        for channel in self.channels.values() {
            channel.wait_idle().await;
        }
    }

    pub fn stats(&self) -> Vec<ChannelStats> {
        self.channel_names()
            .into_iter()
            .filter_map(|name| self.channel(name))
            .map(|channel| ChannelStats {
                name: channel.name().to_string(),
                connections: channel.connection_count(),
            })
            .collect()
    }
}
