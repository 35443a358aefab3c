// ABOUTME: Compile-pass fixture: the transitions a deploy and a rollback may take.
// ABOUTME: Both a migrated deploy and a rollback request can be promoted.

use hl::deploy::{Completed, Migrated, Pipeline, Promoted, Restarted, RollbackRequested};
use hl::health::HyperProbe;
use hl::process::SystemRunner;

async fn promote_migrated(p: Pipeline<Migrated>) -> Option<Pipeline<Promoted>> {
    p.promote(&SystemRunner).await.ok()
}

async fn promote_rollback(p: Pipeline<RollbackRequested>) -> Option<Pipeline<Promoted>> {
    p.promote(&SystemRunner).await.ok()
}

async fn gate(p: Pipeline<Restarted>) -> Option<Pipeline<Completed>> {
    p.await_healthy(&HyperProbe).await.ok()
}

fn main() {
    let _ = promote_migrated;
    let _ = promote_rollback;
    let _ = gate;
}
