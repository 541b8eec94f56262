pub mod types;
pub mod traits;
pub mod streaming;
pub mod openai;
pub mod config;

pub use traits::{
    ChatClient,
    ChatRequest, ChatResponse, ChatOptions,
    ChatEventStream,
    TokenUsage,
};

pub use streaming::StreamEvent;
pub use openai::OpenAIClient;
pub use config::{ProviderConfig, ClientFactory};
pub use types::Message;
