
use pretty_assertions::assert_eq;
use serde_json::json;

use helper::{count, hours_ago, printed, read_record, run, setup, write_record};

#[test]
fn should_report_nothing_without_record() {
    let ctx = setup();
    let status = run(ctx.store.path(), &["status"]);
    assert!(status.status.success());
    assert_eq!(count(&status), Some(0));
    let swipe = run(ctx.store.path(), &["swipe"]);
    assert_eq!(swipe.status.code(), Some(2));
    assert_eq!(ctx.store.path().exists(), false);
}

#[test]
fn should_init_with_full_allowance() {
    let ctx = setup();
    let init = run(ctx.store.path(), &["init", "--id", "u-1"]);
    assert!(init.status.success());
    assert_eq!(count(&init), Some(10));
    let record = read_record(ctx.store.path());
    assert_eq!(record["id"], json!("u-1"));
    assert_eq!(record["swipes"]["remaining"], json!(10));
}

#[test]
fn should_fail_after_allowance() {
    let ctx = setup();
    let args = |command: &'static str| ["--allowance", "2", command];
    assert!(run(ctx.store.path(), &["--allowance", "2", "init", "--id", "u-1"])
        .status
        .success());
    let first = run(ctx.store.path(), &args("swipe"));
    assert!(first.status.success());
    assert_eq!(count(&first), Some(1));
    let second = run(ctx.store.path(), &args("swipe"));
    assert!(second.status.success());
    assert_eq!(count(&second), Some(0));
    let third = run(ctx.store.path(), &args("swipe"));
    assert_eq!(third.status.code(), Some(2));
    assert_eq!(count(&third), Some(0));
    assert_eq!(count(&run(ctx.store.path(), &args("status"))), Some(0));
}

#[test]
fn should_reset_after_window() {
    let ctx = setup();
    write_record(
        &ctx.store,
        json!({
            "id": "u-1",
            "swipes": { "remaining": 0, "lastReset": hours_ago(25) }
        }),
    );
    assert_eq!(count(&run(ctx.store.path(), &["status"])), Some(10));
    assert_eq!(
        read_record(ctx.store.path())["swipes"]["remaining"],
        json!(0)
    );
    let swipe = run(ctx.store.path(), &["swipe"]);
    assert!(swipe.status.success());
    assert_eq!(count(&swipe), Some(9));
}

#[test]
fn should_print_saved_count_after_swipe() {
    let ctx = setup();
    write_record(
        &ctx.store,
        json!({
            "id": "u-1",
            "swipes": { "remaining": "3", "lastReset": hours_ago(1) }
        }),
    );
    let swipe = run(ctx.store.path(), &["swipe"]);
    assert!(swipe.status.success());
    assert_eq!(count(&swipe), Some(2));
    assert_eq!(
        read_record(ctx.store.path())["swipes"]["remaining"],
        json!(2)
    );
}

#[test]
fn should_keep_quota_within_window() {
    let ctx = setup();
    write_record(
        &ctx.store,
        json!({
            "id": "u-1",
            "swipes": { "remaining": 0, "lastReset": hours_ago(1) }
        }),
    );
    let swipe = run(ctx.store.path(), &["swipe"]);
    assert_eq!(swipe.status.code(), Some(2));
    assert_eq!(
        read_record(ctx.store.path())["swipes"]["remaining"],
        json!(0)
    );
}

#[test]
fn should_migrate_legacy_record_once() {
    let ctx = setup();
    let reset_at = hours_ago(-20);
    write_record(
        &ctx.store,
        json!({
            "id": "u-1",
            "name": "Ada",
            "swipes": { "count": 4, "resetAt": reset_at }
        }),
    );
    let migrate = run(ctx.store.path(), &["migrate"]);
    assert!(migrate.status.success());
    assert!(printed(&migrate, "migrated"));
    let record = read_record(ctx.store.path());
    assert_eq!(record["name"], json!("Ada"));
    assert_eq!(record["swipes"]["remaining"], json!(4));
    assert_eq!(record["swipes"].get("count"), None);
    assert_eq!(record["swipes"].get("resetAt"), None);
    assert!(printed(&run(ctx.store.path(), &["migrate"]), "up to date"));
    assert_eq!(count(&run(ctx.store.path(), &["status"])), Some(4));
}

#[test]
fn should_replace_record_of_other_user() {
    let ctx = setup();
    write_record(
        &ctx.store,
        json!({
            "id": "u-1",
            "swipes": { "remaining": 1, "lastReset": hours_ago(1) }
        }),
    );
    let init = run(ctx.store.path(), &["init", "--id", "u-2"]);
    assert!(init.status.success());
    assert_eq!(count(&init), Some(10));
    assert_eq!(read_record(ctx.store.path())["id"], json!("u-2"));
}
