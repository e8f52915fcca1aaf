/// State management module
///
/// This module handles all application state, including:
/// - Catalog database queries and updates (catalog.rs)
/// - Shared data structures (data.rs)
/// - Row classification for display emphasis (classify.rs)
/// - The currently displayed result set (results.rs)

pub mod catalog;
pub mod classify;
pub mod data;
pub mod results;
