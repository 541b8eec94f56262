/// Fixed instruction that opens every context
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
