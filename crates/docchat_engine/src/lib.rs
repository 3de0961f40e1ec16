//! DocChat engine: HTTP gateway, simulated-progress tickers and effect execution.
mod engine;
mod gateway;
mod tickers;
mod types;
mod upload;

pub use engine::{EngineError, EngineHandle};
pub use gateway::{Gateway, GatewaySettings, ReqwestGateway, DEFAULT_ENDPOINT_BASE};
pub use tickers::{ChannelEventSink, EventSink, TickerPeriods, TickerSet};
pub use types::{
    ChatRequest, ChatResponse, ConversationId, EngineEvent, GatewayError, GatewayErrorKind,
    IngestAck, SessionId, SourceSnippet,
};
pub use upload::UploadFile;
