use letloose_app::{RunOptions, report, run_scripted};
use letloose_core::{ControllerStatus, SimId};
use letloose_storage::DocumentStore;
use tempfile::tempdir;

#[test]
fn scripted_run_untracks_deactivated_simulation_and_saves_state() {
    let dir = tempdir().expect("tempdir");
    let state = dir.path().join("letloose.json");
    let options = RunOptions {
        state: Some(state.clone()),
        ..RunOptions::default()
    };

    let first = run_scripted(&options).expect("first run");
    assert!(first.ticks > 0);
    assert_eq!(first.status, ControllerStatus::Tracking { count: 1 });
    assert_eq!(first.tracked, vec![SimId::new("hair-front")]);
    assert_eq!(first.removed, vec![SimId::new("hair-back")]);
    assert_eq!(first.restored_records, 0);
    assert_eq!(first.saved_records, Some(1));

    let stored = DocumentStore::open(&state)
        .load()
        .expect("load")
        .expect("document saved");
    assert_eq!(stored.records[0].id, SimId::new("hair-front"));

    let second = run_scripted(&options).expect("second run");
    assert_eq!(second.restored_records, 1);
    assert_eq!(second.saved_records, Some(1));
    let again = DocumentStore::open(&state)
        .load()
        .expect("load")
        .expect("document saved");
    assert_eq!(again.records[0].baseline, stored.records[0].baseline);

    let text = report::describe_run(&second);
    assert!(text.contains("Tracking 1 simulation"));
    assert!(text.contains("[Front hair] Disable selected simulation"));
}

#[test]
fn run_without_state_touches_no_files() {
    let summary = run_scripted(&RunOptions {
        frames: 40,
        ..RunOptions::default()
    })
    .expect("run");
    assert_eq!(summary.saved_records, None);
    assert_eq!(summary.tracked.len(), 2);
}
