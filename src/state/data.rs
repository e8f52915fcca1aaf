/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog database and the result table.

/// A trimmed, non-empty piece of clipboard text used as a lookup key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Trim the raw clipboard text; whitespace-only text is not a term
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(SearchTerm(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `LIKE` pattern matching any file name containing the term
    pub fn like_pattern(&self) -> String {
        format!("%{}%", self.0)
    }
}

impl std::fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `resource_data` table (the main disk catalog)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceRecord {
    pub disk_no: String,
    pub category2: String,
    pub file_path: String,
    pub file_name: String,
    pub file_size: String,
    pub file_created_time: String,
    /// "0" or "1"
    pub is_deleted: String,
}

/// A row of the `rg_4k_files` table (small link catalog)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuickFileRecord {
    pub file_name: String,
    pub file_size: String,
    pub file_link: String,
}

/// Which table a unified row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSource {
    Resource,
    QuickFile,
    /// Synthetic row carrying an error message
    Error,
}

/// The 8-column display shape both record kinds are merged into.
///
/// Fields the source record does not have are always the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedRow {
    pub source: RowSource,
    pub disk_no: String,
    pub category2: String,
    pub file_path: String,
    pub file_name: String,
    pub file_size: String,
    pub file_created_time: String,
    pub is_deleted: String,
    pub file_link: String,
}

impl From<ResourceRecord> for UnifiedRow {
    fn from(record: ResourceRecord) -> Self {
        UnifiedRow {
            source: RowSource::Resource,
            disk_no: record.disk_no,
            category2: record.category2,
            file_path: record.file_path,
            file_name: record.file_name,
            file_size: record.file_size,
            file_created_time: record.file_created_time,
            is_deleted: record.is_deleted,
            file_link: String::new(),
        }
    }
}

impl From<QuickFileRecord> for UnifiedRow {
    fn from(record: QuickFileRecord) -> Self {
        UnifiedRow {
            source: RowSource::QuickFile,
            disk_no: String::new(),
            category2: String::new(),
            file_path: String::new(),
            file_name: record.file_name,
            file_size: record.file_size,
            file_created_time: String::new(),
            is_deleted: String::new(),
            file_link: record.file_link,
        }
    }
}

impl UnifiedRow {
    /// Build the single synthetic row shown in place of a result set.
    /// The message lands in the first column, every other field stays empty.
    pub fn error(message: impl Into<String>) -> Self {
        UnifiedRow {
            source: RowSource::Error,
            disk_no: message.into(),
            category2: String::new(),
            file_path: String::new(),
            file_name: String::new(),
            file_size: String::new(),
            file_created_time: String::new(),
            is_deleted: String::new(),
            file_link: String::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.source == RowSource::Error
    }

    /// Read one cell by column
    pub fn value(&self, column: Column) -> &str {
        match column {
            Column::DiskNo => &self.disk_no,
            Column::Category => &self.category2,
            Column::FilePath => &self.file_path,
            Column::FileName => &self.file_name,
            Column::FileSize => &self.file_size,
            Column::CreatedTime => &self.file_created_time,
            Column::IsDeleted => &self.is_deleted,
            Column::FileLink => &self.file_link,
        }
    }

    /// Whether this row can be targeted by an `UPDATE ... WHERE disk_no AND file_name`
    pub fn is_mutable(&self) -> bool {
        !self.is_error() && !self.disk_no.is_empty() && !self.file_name.is_empty()
    }
}

/// The eight display columns, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    DiskNo,
    Category,
    FilePath,
    FileName,
    FileSize,
    CreatedTime,
    IsDeleted,
    FileLink,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::DiskNo,
        Column::Category,
        Column::FilePath,
        Column::FileName,
        Column::FileSize,
        Column::CreatedTime,
        Column::IsDeleted,
        Column::FileLink,
    ];

    /// Header text (the database column name)
    pub fn header(self) -> &'static str {
        match self {
            Column::DiskNo => "disk_no",
            Column::Category => "category2",
            Column::FilePath => "file_path",
            Column::FileName => "file_name",
            Column::FileSize => "file_size",
            Column::CreatedTime => "file_created_time",
            Column::IsDeleted => "is_deleted",
            Column::FileLink => "file_link",
        }
    }

    /// Column width in logical pixels
    pub fn width(self) -> f32 {
        match self {
            Column::DiskNo => 50.0,
            Column::Category => 80.0,
            Column::FilePath => 150.0,
            Column::FileName => 250.0,
            Column::FileSize => 80.0,
            Column::CreatedTime => 150.0,
            Column::IsDeleted => 60.0,
            Column::FileLink => 300.0,
        }
    }
}

/// Flip a deletion flag. Anything other than "0"/"1" has no flipped value.
pub fn flip_deleted(current: &str) -> Option<&'static str> {
    match current {
        "0" => Some("1"),
        "1" => Some("0"),
        _ => None,
    }
}
