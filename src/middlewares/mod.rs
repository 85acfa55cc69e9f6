pub mod error_handling;
pub mod inject_user_agent;
pub mod retry_reads;
