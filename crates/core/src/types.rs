/// Zero-based ordinal assigned to a record at load time.
pub type RowIndex = usize;

/// Export timestamps carry no zone information.
pub type Timestamp = chrono::NaiveDateTime;
