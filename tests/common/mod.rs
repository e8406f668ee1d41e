#![allow(dead_code)]

use coffee_workflow::application::engine::{Submission, WorkflowEngine};
use coffee_workflow::config::WorkflowConfig;
use coffee_workflow::domain::actor::{Actor, Roster, UserId};
use coffee_workflow::domain::ports::Stores;
use coffee_workflow::domain::request::{RequestId, RequestKind};
use coffee_workflow::interfaces::csv::roster_reader::read_roster;
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub const ROSTER_PATH: &str = "tests/fixtures/roster.csv";
pub const JOURNAL_HEADER: &str =
    "command,request,actor,kind,amount,method,department,reason,comments";

pub fn roster() -> Roster {
    let file = std::fs::File::open(ROSTER_PATH).expect("Failed to open roster fixture");
    read_roster(file).expect("Failed to read roster fixture")
}

pub fn actor(id: &str) -> Actor {
    roster()
        .resolve(&UserId::from(id))
        .expect("Unknown fixture user")
        .clone()
}

pub fn engine() -> WorkflowEngine {
    WorkflowEngine::new(Stores::in_memory(), WorkflowConfig::default())
}

/// Writes a journal with the standard header followed by `rows`.
pub fn journal(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create journal");
    writeln!(file, "{JOURNAL_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// Submits request `id` as `kato` and walks it through all three approvals.
pub async fn fully_approved(engine: &WorkflowEngine, id: RequestId, amount: Decimal) {
    engine
        .submit_request(
            &actor("kato"),
            Submission {
                id,
                kind: RequestKind::Payment,
                department: None,
                amount,
                description: None,
            },
        )
        .await
        .expect("Failed to submit");
    for approver in ["amina", "okello", "byaruhanga"] {
        engine
            .approve(id, &actor(approver))
            .await
            .expect("Failed to approve");
    }
}

/// Writes a journal of `requests` full submit, approve and pay cycles,
/// preceded by a deposit large enough to cover all of them.
pub fn generate_journal(path: &Path, requests: u64) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    wtr.write_record(JOURNAL_HEADER.split(','))?;

    let total = (requests * 1000).to_string();
    wtr.write_record(["deposit", "", "amina", "", total.as_str(), "", "finance", "", ""])?;

    for id in 1..=requests {
        let id = id.to_string();
        let id = id.as_str();
        wtr.write_record(["submit", id, "kato", "payment", "1000", "", "store", "", ""])?;
        for approver in ["amina", "okello", "byaruhanga"] {
            wtr.write_record(["approve", id, approver])?;
        }
        wtr.write_record(["pay", id, "sarah", "", "", "cash"])?;
    }

    wtr.flush()?;
    Ok(())
}
