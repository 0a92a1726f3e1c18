pub mod error;

// Parsed support conversations
pub mod feedback;
