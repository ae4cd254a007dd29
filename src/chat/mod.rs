pub mod builder;
pub mod model;

pub use builder::ChatBuilder;
pub use model::{
    ChatCompletionRequest, ChatCompletionResponse, Choice, Message, ResponseMessage, Role, Usage,
};
