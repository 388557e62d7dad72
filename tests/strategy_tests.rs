//! Checkout strategy command sequence tests

mod support;

use git_checkout::checkout::{CheckoutStrategy, Fallback, FetchOptions};
use git_checkout::errors::{CHECKOUT_FAILED_TAG, FETCH_FAILED_TAG};
use git_checkout::git::Git;
use std::path::PathBuf;
use support::*;

fn git() -> Git {
    Git::new("/tmp/checkout")
}

fn shallow() -> FetchOptions {
    FetchOptions {
        depth: 1,
        ..Default::default()
    }
}

#[test]
fn test_branch_checkout() {
    let runner = MockRunner::new();
    let strategy = CheckoutStrategy::Branch {
        branch: "main".to_string(),
    };

    strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec!["fetch origin refs/heads/main", "checkout main", "merge origin/main"]
    );
}

#[test]
fn test_tag_checkout_fetches_tags() {
    let runner = MockRunner::new();
    let strategy = CheckoutStrategy::Tag {
        tag: "1.0.0".to_string(),
        branch: None,
    };
    let options = FetchOptions {
        tags: true,
        ..Default::default()
    };

    strategy.run(&git(), &runner, &options, None).unwrap();

    assert_eq!(runner.commands(), vec!["fetch --tags", "checkout 1.0.0"]);
}

#[test]
fn test_commit_checkout_unshallows_once() {
    let runner = MockRunner::new().fail_times("checkout abc", 1, "reference is not a tree: abc");
    let strategy = CheckoutStrategy::Commit {
        commit: "abc".to_string(),
        branch: None,
    };

    strategy
        .run(&git(), &runner, &shallow(), Some(Fallback::SimpleUnshallow))
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec!["fetch --depth=1", "checkout abc", "fetch --unshallow", "checkout abc"]
    );
}

#[test]
fn test_commit_checkout_without_fallback_fails() {
    let runner = MockRunner::new().fail_on("checkout abc", "reference is not a tree: abc");
    let strategy = CheckoutStrategy::Commit {
        commit: "abc".to_string(),
        branch: None,
    };

    let err = strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap_err();

    assert_eq!(err.tag, CHECKOUT_FAILED_TAG);
    assert_eq!(runner.count("fetch --unshallow"), 0);
    assert_eq!(runner.count("checkout abc"), 1);
}

#[test]
fn test_commit_checkout_retries_exactly_once_after_fallback() {
    let runner = MockRunner::new().fail_on("checkout abc", "reference is not a tree: abc");
    let strategy = CheckoutStrategy::Commit {
        commit: "abc".to_string(),
        branch: None,
    };

    let err = strategy
        .run(&git(), &runner, &shallow(), Some(Fallback::SimpleUnshallow))
        .unwrap_err();

    assert_eq!(err.tag, CHECKOUT_FAILED_TAG);
    assert_eq!(runner.count("fetch --unshallow"), 1);
    assert_eq!(runner.count("checkout abc"), 2);
}

#[test]
fn test_pr_commit_fetches_head_branch() {
    let runner = MockRunner::new();
    let strategy = CheckoutStrategy::Commit {
        commit: "abc".to_string(),
        branch: Some("feature".to_string()),
    };

    strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec!["fetch origin refs/heads/feature", "checkout abc"]
    );
}

#[test]
fn test_merge_branch_reset_and_unshallow_on_failed_merge() {
    let runner = MockRunner::new().fail_times("merge pull/7", 1, "refusing to merge unrelated histories");
    let strategy = CheckoutStrategy::PrMergeBranch {
        base_branch: "master".to_string(),
        merge_branch: "pull/7/merge".to_string(),
    };

    strategy
        .run(&git(), &runner, &shallow(), Some(Fallback::ResetUnshallow))
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            "fetch --depth=1 origin refs/heads/master",
            "fetch origin refs/pull/7/head:pull/7",
            "checkout master",
            "merge origin/master",
            "merge pull/7",
            "reset --hard HEAD",
            "clean -x -d -f",
            "submodule foreach git reset --hard HEAD",
            "submodule foreach git clean -x -d -f",
            "fetch --unshallow",
            "merge pull/7",
            "checkout --detach",
        ]
    );
}

#[test]
fn test_diff_file_checkout() {
    let runner = MockRunner::new();
    let strategy = CheckoutStrategy::PrDiffFile {
        base_branch: "master".to_string(),
        patch: PathBuf::from("/tmp/pr.diff"),
    };

    strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            "fetch origin refs/heads/master",
            "checkout master",
            "merge origin/master",
            "apply /tmp/pr.diff",
            "checkout --detach",
        ]
    );
}

#[test]
fn test_diff_file_apply_failure() {
    let runner = MockRunner::new().fail_on("apply", "patch does not apply");
    let strategy = CheckoutStrategy::PrDiffFile {
        base_branch: "master".to_string(),
        patch: PathBuf::from("/tmp/pr.diff"),
    };

    let err = strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap_err();

    assert_eq!(err.tag, "apply_patch_failed");
    assert_eq!(runner.count("checkout --detach"), 0);
}

#[test]
fn test_manual_merge_checkout() {
    let runner = MockRunner::new().with_output("log -1 --format=%H", "1f2e3d");
    let strategy = CheckoutStrategy::PrManualMerge {
        base_branch: "master".to_string(),
        head_branch: "feature".to_string(),
        commit: "76a934ae".to_string(),
    };

    strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            "fetch origin refs/heads/master",
            "checkout master",
            "merge origin/master",
            "log -1 --format=%H",
            "fetch origin refs/heads/feature",
            "merge 76a934ae",
            "checkout --detach",
        ]
    );
}

#[test]
fn test_fork_manual_merge_adds_fork_remote_before_fetch() {
    let runner = MockRunner::new();
    let remote_add = format!("remote add fork {FORK_URL}");
    let strategy = CheckoutStrategy::ForkPrManualMerge {
        base_branch: "master".to_string(),
        head_branch: "feature".to_string(),
        fork_url: FORK_URL.to_string(),
    };

    strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            "fetch origin refs/heads/master",
            "checkout master",
            "merge origin/master",
            "log -1 --format=%H",
            remote_add.as_str(),
            "fetch fork refs/heads/feature",
            "merge fork/feature",
            "checkout --detach",
        ]
    );
}

#[test]
fn test_fork_commit_checkout() {
    let runner = MockRunner::new();
    let remote_add = format!("remote add fork {FORK_URL}");
    let strategy = CheckoutStrategy::ForkCommit {
        fork_url: FORK_URL.to_string(),
        branch: "feature".to_string(),
        commit: "76a934ae".to_string(),
    };

    strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec![
            remote_add.as_str(),
            "fetch fork refs/heads/feature",
            "checkout 76a934ae",
        ]
    );
}

#[test]
fn test_head_branch_commit_checkout() {
    let runner = MockRunner::new();
    let strategy = CheckoutStrategy::HeadBranchCommit {
        head_branch: "pull/7/head".to_string(),
        commit: Some("76a934ae".to_string()),
    };

    strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap();

    assert_eq!(
        runner.commands(),
        vec!["fetch origin refs/pull/7/head:pull/7/head", "checkout 76a934ae"]
    );
}

#[test]
fn test_fetch_of_missing_branch_recommends_existing_ones() {
    let runner = MockRunner::new()
        .fail_on(
            "fetch origin refs/heads/missing",
            "fatal: couldn't find remote ref refs/heads/missing",
        )
        .with_output(
            "branch -r",
            "  origin/HEAD -> origin/main\n  origin/main\n  origin/develop",
        );
    let strategy = CheckoutStrategy::Branch {
        branch: "missing".to_string(),
    };

    let err = strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap_err();

    assert_eq!(
        runner.commands(),
        vec![
            "fetch origin refs/heads/missing",
            "fetch origin refs/heads/missing",
            "fetch origin",
            "branch -r",
        ]
    );
    assert_eq!(err.tag, FETCH_FAILED_TAG);
    assert_eq!(
        err.branches(),
        Some(&["main".to_string(), "develop".to_string()][..])
    );
    let detailed = err.detailed_error().unwrap();
    assert!(detailed.title.contains("missing"));
}

#[test]
fn test_fork_fetch_failure_recommends_fork_branches() {
    let runner = MockRunner::new()
        .fail_on(
            "fetch fork refs/heads/missing",
            "fatal: couldn't find remote ref refs/heads/missing",
        )
        .with_output(
            "branch -r",
            "  fork/feature\n  fork/fix-typo\n  origin/HEAD -> origin/main\n  origin/main",
        );
    let remote_add = format!("remote add fork {FORK_URL}");
    let strategy = CheckoutStrategy::ForkCommit {
        fork_url: FORK_URL.to_string(),
        branch: "missing".to_string(),
        commit: "76a934ae".to_string(),
    };

    let err = strategy
        .run(&git(), &runner, &FetchOptions::default(), None)
        .unwrap_err();

    assert_eq!(
        runner.commands(),
        vec![
            remote_add.as_str(),
            "fetch fork refs/heads/missing",
            "fetch fork refs/heads/missing",
            "fetch fork",
            "branch -r",
        ]
    );
    assert_eq!(err.tag, FETCH_FAILED_TAG);
    assert_eq!(
        err.branches(),
        Some(&["feature".to_string(), "fix-typo".to_string()][..])
    );
}

#[test]
fn test_build_trigger_and_commit_info_refs() {
    let diff = CheckoutStrategy::PrDiffFile {
        base_branch: "master".to_string(),
        patch: PathBuf::from("/tmp/pr.diff"),
    };
    assert_eq!(diff.commit_info_ref(), None);

    let commit = CheckoutStrategy::Commit {
        commit: "abc".to_string(),
        branch: None,
    };
    assert_eq!(commit.commit_info_ref(), Some("abc".to_string()));

    let merge = CheckoutStrategy::PrMergeBranch {
        base_branch: "master".to_string(),
        merge_branch: "pull/2/merge".to_string(),
    };
    assert_eq!(merge.build_trigger_ref(), "pull/2");
}
