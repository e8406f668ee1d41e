use crate::application::journal::JournalEntry;
use crate::error::{Result, WorkflowError};
use std::io::Read;

/// Streams a workflow journal.
///
/// The first line names the columns
/// `command,request,actor,kind,amount,method,department,reason,comments`.
/// Cells are trimmed, and a row may stop after the last column its command
/// uses, so `approve,7,okello` is a complete row.
pub struct JournalReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> JournalReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Yields one entry per row in file order. A row that does not parse
    /// yields an error without ending the stream.
    pub fn entries(self) -> impl Iterator<Item = Result<JournalEntry>> {
        self.reader
            .into_deserialize()
            .map(|row| row.map_err(WorkflowError::from))
    }
}
