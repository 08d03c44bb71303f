use taskdeck_core::{derived_complete, TaskId};
use taskdeck_engine::ErrorKind;
use taskdeck_harness::TestApp;

fn guest_with_task(title: &str) -> Result<(TestApp, TaskId), Box<dyn std::error::Error>> {
    let mut app = TestApp::guest()?;
    app.add(title)?;
    let id = app.task_ids()[0];
    Ok((app, id))
}

// ============================================================================
// Derived parent completion
// ============================================================================

#[test]
fn completing_every_subtask_completes_the_parent() -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, id) = guest_with_task("parent")?;
    app.engine.add_subtask(id, "one");
    app.engine.add_subtask(id, "two");

    let first = app.find(id).subtasks[0].id;
    let second = app.find(id).subtasks[1].id;

    app.engine.toggle_subtask(id, first);
    assert!(!app.find(id).is_complete);

    app.engine.toggle_subtask(id, second);
    assert!(app.find(id).is_complete);

    // Unchecking one flips the parent back.
    app.engine.toggle_subtask(id, first);
    assert!(!app.find(id).is_complete);
    Ok(())
}

#[test]
fn adding_a_subtask_rederives_a_completed_parent() -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, id) = guest_with_task("done already")?;
    app.engine.toggle_todo(id);
    assert!(app.find(id).is_complete);

    app.engine.add_subtask(id, "not done yet");

    assert!(!app.find(id).is_complete);
    Ok(())
}

#[test]
fn emptying_the_subtask_list_keeps_the_flag() -> Result<(), Box<dyn std::error::Error>> {
    // Complete parent stays complete.
    let (mut app, id) = guest_with_task("parent")?;
    app.engine.add_subtask(id, "only");
    let only = app.find(id).subtasks[0].id;
    app.engine.toggle_subtask(id, only);
    assert!(app.find(id).is_complete);

    app.engine.remove_subtask(id, only);
    assert!(app.find(id).subtasks.is_empty());
    assert!(app.find(id).is_complete);

    // Incomplete parent stays incomplete.
    let (mut app, id) = guest_with_task("parent")?;
    app.engine.add_subtask(id, "only");
    let only = app.find(id).subtasks[0].id;

    app.engine.remove_subtask(id, only);
    assert!(!app.find(id).is_complete);
    Ok(())
}

#[test]
fn removal_rederives_from_the_remaining_subtasks() -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, id) = guest_with_task("parent")?;
    app.engine.add_subtask(id, "done");
    app.engine.add_subtask(id, "pending");

    let done = app.find(id).subtasks[0].id;
    let pending = app.find(id).subtasks[1].id;
    app.engine.toggle_subtask(id, done);
    assert!(!app.find(id).is_complete);

    app.engine.remove_subtask(id, pending);
    assert!(app.find(id).is_complete);
    Ok(())
}

#[test]
fn derivation_invariant_holds_after_every_mutation() -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, id) = guest_with_task("parent")?;

    let check = |app: &TestApp| {
        for task in app.engine.tasks() {
            if let Some(expected) = derived_complete(&task.subtasks) {
                assert_eq!(task.is_complete, expected);
            }
        }
    };

    app.engine.add_subtask(id, "a");
    check(&app);
    app.engine.add_subtask(id, "b");
    check(&app);

    let a = app.find(id).subtasks[0].id;
    let b = app.find(id).subtasks[1].id;
    app.engine.toggle_subtask(id, a);
    check(&app);
    app.engine.toggle_subtask(id, b);
    check(&app);
    app.engine.remove_subtask(id, a);
    check(&app);
    app.engine.toggle_subtask(id, b);
    check(&app);
    Ok(())
}

// ============================================================================
// No-ops and validation
// ============================================================================

#[test]
fn unknown_parent_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, _) = guest_with_task("parent")?;
    let before = app.engine.tasks().to_vec();

    app.engine.add_subtask(TaskId::new(), "orphan");

    assert_eq!(app.engine.tasks(), before.as_slice());
    assert!(app.notifications.is_empty());
    Ok(())
}

#[test]
fn whitespace_subtask_title_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, id) = guest_with_task("parent")?;
    app.engine.add_subtask(id, "   ");
    assert!(app.find(id).subtasks.is_empty());
    Ok(())
}

// ============================================================================
// Account mode: one shared save, accepted failure
// ============================================================================

#[test]
fn subtasks_and_completion_persist_together() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = TestApp::signed_in("u1")?;
    let seeded = app.seed_remote("parent", 0)?;
    app.engine.fetch_all();

    app.engine.add_subtask(seeded.id, "only");
    let only = app.find(seeded.id).subtasks[0].id;
    app.engine.toggle_subtask(seeded.id, only);

    let row = &app.remote_rows()?[0];
    assert_eq!(row.subtasks.len(), 1);
    assert!(row.subtasks[0].is_complete);
    assert!(row.is_complete);
    Ok(())
}

#[test]
fn remote_failure_keeps_the_subtask_mutation() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = TestApp::signed_in("u1")?;
    let seeded = app.seed_remote("parent", 0)?;
    app.engine.fetch_all();
    app.engine.add_subtask(seeded.id, "only");

    app.switches.fail_update(true);
    let only = app.find(seeded.id).subtasks[0].id;
    app.engine.toggle_subtask(seeded.id, only);

    // In-memory state kept: subtask complete, parent derived complete.
    assert!(app.find(seeded.id).subtasks[0].is_complete);
    assert!(app.find(seeded.id).is_complete);
    assert_eq!(
        app.engine.last_error().unwrap().kind,
        ErrorKind::AcceptedWriteFailure
    );
    assert_eq!(app.notifications.len(), 1);

    // The remote row still has the pre-toggle state.
    app.switches.fail_update(false);
    let row = &app.remote_rows()?[0];
    assert!(!row.subtasks[0].is_complete);
    assert!(!row.is_complete);
    Ok(())
}
