pub mod events;
pub mod question_flow;

pub use events::{update_channel, QuestionEvent, UpdateReceiver, UpdateSender};
pub use question_flow::{strip_code_fence, QuestionFlow};
