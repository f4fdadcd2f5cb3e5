// Question-and-answer flow against a single document.

pub mod conversation;
pub mod poller;

/// Canned prompts offered in the Q&A view.
pub const SUGGESTED_QUESTIONS: [&str; 3] = [
    "What is the main summary of this document?",
    "Are there any important deadlines mentioned?",
    "What are the key financial terms in this document?",
];
