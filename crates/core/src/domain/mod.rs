pub mod conversation;
pub mod parameters;
pub mod prediction;
pub mod vocabulary;
