use crate::domain::actor::{Actor, Roster};
use crate::error::Result;
use std::io::Read;

/// Loads the user roster from CSV with columns `user,name,department,role`.
///
/// Unlike journals, a malformed roster row fails the whole load: acting
/// without a complete list of users would misattribute approvals.
pub fn read_roster<R: Read>(source: R) -> Result<Roster> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut roster = Roster::new();
    for actor in reader.deserialize::<Actor>() {
        roster.insert(actor?);
    }
    Ok(roster)
}
