pub mod openai_responses;

pub use openai_responses::OpenAiResponsesClient;
