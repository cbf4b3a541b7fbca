use super::{
    CreateThreadCommand, FindThreadQuery, Messaging, SendMessageCommand, Thread, ThreadId,
    ThreadMessage, ThreadsSummary,
};
use crate::backend::{BackendKind, Bindings};
use crate::error::Result;
use crate::wallet::PublicKey;
use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::debug;

/// Messaging across every enabled backend.
///
/// - `find_all` merges all backends in priority order and fails if any fails
/// - `find` by id, `messages`, `send` and `delete` route by the id's backend
/// - `find` by members and `find_summary` return the first backend's hit
/// - `create` goes to the command's backend, else the highest priority one
pub struct MessagingFacade {
    bindings: Bindings<dyn Messaging>,
}

impl MessagingFacade {
    pub fn new(bindings: Bindings<dyn Messaging>) -> Self {
        Self { bindings }
    }

    pub fn backends(&self) -> Vec<BackendKind> {
        self.bindings.backends()
    }
}

#[async_trait]
impl Messaging for MessagingFacade {
    async fn find_all(&self) -> Result<Vec<Thread>> {
        let per_backend =
            try_join_all(self.bindings.iter().map(|b| b.capability.find_all())).await?;
        Ok(per_backend.into_iter().flatten().collect())
    }

    async fn find(&self, query: &FindThreadQuery) -> Result<Option<Thread>> {
        if let FindThreadQuery::ById(id) = query {
            return self.bindings.route(id.backend)?.find(query).await;
        }
        for binding in self.bindings.iter() {
            if let Some(thread) = binding.capability.find(query).await? {
                debug!(backend = %binding.backend, thread = %thread.id, "thread found by members");
                return Ok(Some(thread));
            }
        }
        Ok(None)
    }

    async fn find_summary(&self, other_members: &[PublicKey]) -> Result<Option<ThreadsSummary>> {
        for binding in self.bindings.iter() {
            if let Some(summary) = binding.capability.find_summary(other_members).await? {
                return Ok(Some(summary));
            }
        }
        Ok(None)
    }

    async fn create(&self, command: &CreateThreadCommand) -> Result<Thread> {
        let backend = command.backend.unwrap_or(self.bindings.first().backend);
        debug!(%backend, "creating thread");
        self.bindings.route(backend)?.create(command).await
    }

    async fn messages(&self, id: &ThreadId) -> Result<Vec<ThreadMessage>> {
        self.bindings.route(id.backend)?.messages(id).await
    }

    async fn send(&self, id: &ThreadId, command: &SendMessageCommand) -> Result<()> {
        self.bindings.route(id.backend)?.send(id, command).await
    }

    async fn delete(&self, id: &ThreadId) -> Result<()> {
        self.bindings.route(id.backend)?.delete(id).await
    }
}
