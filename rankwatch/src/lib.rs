// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used helper functions for convenience
pub use handlers::{
    build_lookup, collect_keywords, database_path, load_keywords_from_file, open_session,
    parse_key_position, short_id,
};

// Re-export check functionality from rankwatch-core
pub use rankwatch_core::check::{
    CheckEvent, CheckOptions, CheckProgressCallback, CheckSummary, execute_check,
};
