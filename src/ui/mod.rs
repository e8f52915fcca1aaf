/// User interface widgets
///
/// - Result table with per-row category colors (table.rs)

pub mod table;
