pub mod agent_card_serve;
pub mod agent_executor;
pub mod config;
pub mod error;
pub mod event_queue;
pub mod handler;
pub mod jsonrpc_handler;
pub mod ndjson_writer;
pub mod request_context;
pub mod router;
pub mod task_store;

pub use agent_card_serve::AGENT_CARD_PATH;
pub use agent_executor::AgentExecutor;
pub use config::ServerConfig;
pub use error::ServerError;
pub use event_queue::{event_queue, EventQueueReader, EventQueueWriter, EventStream, InMemoryEventQueue};
pub use handler::{DefaultHandler, DefaultHandlerBuilder, RequestHandler};
pub use request_context::RequestContext;
pub use router::{create_router, serve, AppState};
pub use task_store::{InMemoryTaskStore, TaskStore, TaskStoreError};
