//! Output formatting structures for CLI display

use tabled::Tabled;

/// Table row for a file that is partially published
#[derive(Tabled)]
pub struct PartialRow {
    #[tabled(rename = "File")]
    pub path: String,
    #[tabled(rename = "Published")]
    pub published: usize,
    #[tabled(rename = "Functions")]
    pub total: String,
    #[tabled(rename = "Indices")]
    pub indices: String,
}
