use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use a2a_types::{
    Event, Message, MessageSendParams, Task, TaskIdParams, TaskQueryParams, TaskState, TaskStatus,
};
use async_trait::async_trait;
use futures_core::Stream;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Sleep};
use tokio_stream::StreamExt;

use crate::agent_executor::AgentExecutor;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::event_queue::{event_queue, EventQueueReader, EventQueueWriter, EventStream, InMemoryEventQueue};
use crate::request_context::RequestContext;
use crate::task_store::{InMemoryTaskStore, TaskStore, TaskStoreError};

/// Handles A2A protocol requests.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn on_send_message(&self, params: MessageSendParams) -> Result<Event, ServerError>;

    async fn on_send_message_stream(
        &self,
        params: MessageSendParams,
    ) -> Result<EventStream, ServerError>;

    async fn on_get_task(&self, params: TaskQueryParams) -> Result<Task, ServerError>;

    async fn on_cancel_task(&self, params: TaskIdParams) -> Result<Task, ServerError>;
}

/// Default handler implementing the standard A2A server flow.
///
/// Every inbound message spawns one executor run. Its events pass through
/// the task store before anyone sees them; a rejected event is logged and
/// dropped. Persisting continues after the caller stops listening.
pub struct DefaultHandler {
    executor: Arc<dyn AgentExecutor>,
    task_store: Arc<dyn TaskStore>,
    config: ServerConfig,
}

/// Builder for `DefaultHandler`.
pub struct DefaultHandlerBuilder {
    executor: Option<Arc<dyn AgentExecutor>>,
    task_store: Option<Arc<dyn TaskStore>>,
    config: ServerConfig,
}

impl DefaultHandler {
    pub fn builder() -> DefaultHandlerBuilder {
        DefaultHandlerBuilder {
            executor: None,
            task_store: None,
            config: ServerConfig::default(),
        }
    }

    pub fn task_store(&self) -> &Arc<dyn TaskStore> {
        &self.task_store
    }

    /// Resolve task and context ids for an inbound message.
    async fn build_context(&self, message: Message) -> Result<RequestContext, ServerError> {
        let context = match message.task_id.as_deref() {
            Some(task_id) => {
                let task = self
                    .task_store
                    .get(task_id)
                    .await?
                    .ok_or_else(|| ServerError::TaskNotFound(task_id.to_string()))?;
                if task.status.state.is_terminal() {
                    return Err(ServerError::UnsupportedOperation(format!(
                        "task {} is already {}",
                        task.id, task.status.state
                    )));
                }
                RequestContext::for_task(&task)
            }
            None => {
                let context_id = message.context_id.clone().unwrap_or_else(new_id);
                RequestContext::new(new_id(), context_id)
            }
        };
        Ok(context.with_message(message))
    }

    /// Spawn the executor and the task that persists its events.
    ///
    /// The returned reader yields events after they were stored.
    fn start_execution(&self, context: RequestContext) -> EventQueueReader {
        let task_id = context.task_id.clone();
        let (queue, published) = event_queue();
        let executor = self.executor.clone();
        let execution = tokio::spawn(async move {
            if let Err(e) = executor.execute(&context, &queue).await {
                tracing::error!(task_id = %context.task_id, "AgentExecutor error: {e}");
            }
        });

        let (persisted_queue, persisted) = event_queue();
        let events = ExecutionEvents::new(published, execution, self.config.stream_idle_timeout);
        tokio::spawn(persist_events(
            events,
            self.task_store.clone(),
            persisted_queue,
            task_id,
        ));
        persisted
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, ServerError> {
        self.task_store
            .get(task_id)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound(task_id.to_string()))
    }
}

impl DefaultHandlerBuilder {
    pub fn executor(mut self, executor: Arc<dyn AgentExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.task_store = Some(store);
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<DefaultHandler, ServerError> {
        let executor = self
            .executor
            .ok_or_else(|| ServerError::Config("executor is required".into()))?;
        Ok(DefaultHandler {
            executor,
            task_store: self
                .task_store
                .unwrap_or_else(|| Arc::new(InMemoryTaskStore::new())),
            config: self.config,
        })
    }
}

#[async_trait]
impl RequestHandler for DefaultHandler {
    async fn on_send_message(&self, params: MessageSendParams) -> Result<Event, ServerError> {
        let configuration = params.configuration.unwrap_or_default();
        let blocking = configuration.blocking.unwrap_or(false);
        let context = self.build_context(params.message).await?;
        let task_id = context.task_id.clone();
        tracing::debug!(%task_id, context_id = %context.context_id, blocking, "message/send");

        let mut events = self.start_execution(context);
        let first = events.read().await.ok_or_else(|| {
            ServerError::InvalidAgentResponse(format!("agent published no events for task {task_id}"))
        })?;

        if !blocking {
            return Ok(trim_history(first, configuration.history_length));
        }

        let mut last = first;
        while !(last.is_terminal() || last.is_interrupt()) {
            match events.read().await {
                Some(event) => last = event,
                None => break,
            }
        }
        let result = match self.task_store.get(&task_id).await? {
            Some(task) => Event::Task(task),
            None => last,
        };
        Ok(trim_history(result, configuration.history_length))
    }

    async fn on_send_message_stream(
        &self,
        params: MessageSendParams,
    ) -> Result<EventStream, ServerError> {
        let context = self.build_context(params.message).await?;
        tracing::debug!(task_id = %context.task_id, context_id = %context.context_id, "message/stream");

        let events = self.start_execution(context);
        Ok(Box::pin(TakeUntilTerminal::new(events.into_stream())))
    }

    async fn on_get_task(&self, params: TaskQueryParams) -> Result<Task, ServerError> {
        let mut task = self.get_task(&params.id).await?;
        if let Some(length) = params.history_length {
            task.truncate_history(length as usize);
        }
        Ok(task)
    }

    async fn on_cancel_task(&self, params: TaskIdParams) -> Result<Task, ServerError> {
        let task = self.get_task(&params.id).await?;
        if task.status.state.is_terminal() {
            tracing::debug!(task_id = %task.id, state = %task.status.state, "cancel on terminal task is a no-op");
            return Ok(task);
        }

        let context = RequestContext::for_task(&task);
        let (queue, mut events) = event_queue();
        if let Err(e) = self.executor.cancel(&context, &queue).await {
            tracing::error!(task_id = %context.task_id, "AgentExecutor cancel error: {e}");
        }
        queue.close().await?;
        while let Some(event) = events.read().await {
            if let Err(e) = self.task_store.save(&event).await {
                tracing::warn!(task_id = %context.task_id, error = %e, "dropping cancel event rejected by task store");
            }
        }

        let mut current = self.get_task(&params.id).await?;
        if current.status.state.is_terminal() {
            return Ok(current);
        }

        current.status =
            TaskStatus::new(TaskState::Canceled).with_message(context.agent_message("Task canceled."));
        match self.task_store.save(&Event::Task(current)).await {
            Ok(Some(task)) => Ok(task),
            Ok(None) => Err(ServerError::TaskNotFound(params.id)),
            Err(TaskStoreError::InvalidTransition(e)) => {
                // The executor reached a terminal state first
                tracing::debug!(task_id = %params.id, "{e}");
                self.get_task(&params.id).await
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn trim_history(event: Event, history_length: Option<u32>) -> Event {
    match (event, history_length) {
        (Event::Task(mut task), Some(length)) => {
            task.truncate_history(length as usize);
            Event::Task(task)
        }
        (event, _) => event,
    }
}

/// Store each executor event, then hand it to whoever is listening.
async fn persist_events(
    mut events: ExecutionEvents,
    store: Arc<dyn TaskStore>,
    listener: InMemoryEventQueue,
    task_id: String,
) {
    let mut forwarding = true;
    while let Some(event) = events.next().await {
        if let Err(e) = store.save(&event).await {
            tracing::warn!(%task_id, error = %e, "dropping event rejected by task store");
            continue;
        }
        if forwarding && listener.write(event).await.is_err() {
            tracing::debug!(%task_id, "listener gone, persisting remaining events in background");
            forwarding = false;
        }
    }
    tracing::debug!(%task_id, "executor events drained");
}

/// Events published by one executor run.
///
/// Ends when the executor's queue is closed and drained, or when
/// `idle_timeout` passes in silence after the executor has finished.
struct ExecutionEvents {
    events: EventQueueReader,
    execution: JoinHandle<()>,
    idle_timeout: Duration,
    idle: Pin<Box<Sleep>>,
    done: bool,
}

impl ExecutionEvents {
    fn new(events: EventQueueReader, execution: JoinHandle<()>, idle_timeout: Duration) -> Self {
        Self {
            events,
            execution,
            idle_timeout,
            idle: Box::pin(tokio::time::sleep(idle_timeout)),
            done: false,
        }
    }

    fn reset_idle(&mut self) {
        let deadline = Instant::now() + self.idle_timeout;
        self.idle.as_mut().reset(deadline);
    }
}

impl Stream for ExecutionEvents {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        match this.events.poll_read(cx) {
            Poll::Ready(Some(event)) => {
                this.reset_idle();
                return Poll::Ready(Some(event));
            }
            Poll::Ready(None) => {
                this.done = true;
                return Poll::Ready(None);
            }
            Poll::Pending => {}
        }

        loop {
            match this.idle.as_mut().poll(cx) {
                Poll::Ready(()) if this.execution.is_finished() => {
                    tracing::debug!("executor finished and queue idle, ending event stream");
                    this.done = true;
                    return Poll::Ready(None);
                }
                // Still running: wait for another idle period
                Poll::Ready(()) => this.reset_idle(),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// A stream adapter that stops after the first terminal event.
struct TakeUntilTerminal<S> {
    inner: Pin<Box<S>>,
    done: bool,
}

impl<S> TakeUntilTerminal<S> {
    fn new(stream: S) -> Self {
        Self {
            inner: Box::pin(stream),
            done: false,
        }
    }
}

impl<S> Unpin for TakeUntilTerminal<S> {}

impl<S> Stream for TakeUntilTerminal<S>
where
    S: Stream<Item = Event>,
{
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.done = true;
                }
                Poll::Ready(Some(event))
            }
            other => other,
        }
    }
}
