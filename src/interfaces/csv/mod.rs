pub mod journal_reader;
pub mod roster_reader;
