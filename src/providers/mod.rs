mod open_ai;

pub use open_ai::{OpenAIProxy, UpstreamReply};
