//! Per-URL outcome states
//!
//! Every dequeued URL ends in exactly one [`PageState`]. States are recorded
//! in the checkpoint database and summarized by `--stats`.

mod page_state;

pub use page_state::PageState;
