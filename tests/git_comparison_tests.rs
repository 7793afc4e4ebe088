use chrono::{Duration, Utc};
use commit_leaderboard::analysis::{classify_all, GitHistory, HeuristicEstimator, HistorySource};
use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run_git_command(repo_path: &Path, args: &[&str]) -> Option<String> {
    Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).to_string())
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn get_git_line_stats(repo_path: &Path) -> (usize, usize) {
    let output =
        run_git_command(repo_path, &["log", "--no-merges", "--numstat", "--format="]).unwrap_or_default();
    let mut added = 0;
    let mut deleted = 0;

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            if let (Ok(a), Ok(d)) = (parts[0].parse::<usize>(), parts[1].parse::<usize>()) {
                added += a;
                deleted += d;
            }
        }
    }
    (added, deleted)
}

/// Linear history with edits, deletions and a merge.
fn setup_history() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    let signature = Signature::now("Test User", "test@example.com").unwrap();

    let write_and_commit = |file_name: &str, content: &str, message: &str| {
        fs::write(temp_dir.path().join(file_name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file_name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    };

    write_and_commit("a.txt", "one\ntwo\nthree\n", "feat: a");
    write_and_commit("b.txt", "alpha\nbeta\n", "feat: b");
    write_and_commit("a.txt", "one\nTWO\n", "fix: a");
    let main_tip = write_and_commit("c.txt", "gamma\n", "chore: c");

    // Merge an empty side commit into HEAD
    {
        let main = repo.find_commit(main_tip).unwrap();
        let tree = main.tree().unwrap();
        let side_oid = repo
            .commit(None, &signature, &signature, "side", &tree, &[&main])
            .unwrap();
        let side = repo.find_commit(side_oid).unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "Merge side", &tree, &[&main, &side])
            .unwrap();
    }

    temp_dir
}

#[test]
fn test_commit_count_matches_git() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let temp_dir = setup_history();
    let repo_path = temp_dir.path();

    let git_count: usize = run_git_command(repo_path, &["rev-list", "--no-merges", "--count", "HEAD"])
        .and_then(|out| out.trim().parse().ok())
        .unwrap();

    let history = GitHistory::open(repo_path).unwrap();
    let commits = history.list_commits(Utc::now() - Duration::days(1)).unwrap();

    assert_eq!(commits.len(), git_count);
}

#[test]
fn test_line_stats_match_git() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let temp_dir = setup_history();
    let repo_path = temp_dir.path();
    let (git_added, git_deleted) = get_git_line_stats(repo_path);

    let history = GitHistory::open(repo_path).unwrap();
    let commits = history.list_commits(Utc::now() - Duration::days(1)).unwrap();
    let classified = classify_all(&history, commits, &HeuristicEstimator);

    let added: usize = classified.iter().map(|c| c.stats.insertions).sum();
    let deleted: usize = classified.iter().map(|c| c.stats.deletions).sum();
    assert_eq!((added, deleted), (git_added, git_deleted));
}
