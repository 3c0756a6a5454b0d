use serde_json::json;

use super::*;

fn event(payload: serde_json::Value) -> GitHubIngestedEvent {
    GitHubIngestedEvent {
        event_type: "github.commit".into(),
        source_event_id: Some("abc".into()),
        occurred_at: chrono::Utc::now(),
        payload,
        cursor: "abc".into(),
    }
}

fn filters(configs: &[serde_json::Value]) -> CompiledNoiseFilters {
    compile_noise_filters(configs)
}

#[test]
fn disabled_project_contributes_nothing() {
    let compiled = filters(&[json!({
        "enabled": false,
        "ignore_authors": ["dependabot[bot]"],
    })]);
    let dropped = compiled.should_drop(&event(json!({ "author_login": "dependabot[bot]" })));
    assert!(!dropped);
}

#[test]
fn author_match_is_case_insensitive() {
    let compiled = filters(&[json!({
        "enabled": true,
        "ignore_authors": ["Dependabot[bot]"],
    })]);
    assert!(compiled.should_drop(&event(json!({ "author_login": "dependabot[bot]" }))));
}

#[test]
fn toggle_off_suppresses_category_even_with_matches_present() {
    let compiled = filters(&[json!({
        "enabled": true,
        "toggles": { "ignore_authors": false },
        "ignore_authors": ["dependabot[bot]"],
    })]);
    assert!(!compiled.should_drop(&event(json!({ "author_login": "dependabot[bot]" }))));
}

#[test]
fn label_match_drops_event() {
    let compiled = filters(&[json!({
        "enabled": true,
        "ignore_labels": ["automated"],
    })]);
    assert!(compiled.should_drop(&event(json!({ "labels": ["automated", "chore"] }))));
}

#[test]
fn title_prefix_match_drops_event() {
    let compiled = filters(&[json!({
        "enabled": true,
        "ignore_title_prefixes": ["chore:"],
    })]);
    assert!(compiled.should_drop(&event(json!({ "title": "chore: bump dependency" }))));
}

#[test]
fn path_glob_match_drops_event() {
    let compiled = filters(&[json!({
        "enabled": true,
        "ignore_paths": ["vendor/**"],
    })]);
    assert!(compiled.should_drop(&event(json!({ "path": "vendor/lib/thing.go" }))));
}

#[test]
fn backslash_paths_are_normalised_before_matching() {
    let compiled = filters(&[json!({
        "enabled": true,
        "ignore_paths": ["vendor/**"],
    })]);
    assert!(compiled.should_drop(&event(json!({ "path": "vendor\\lib\\thing.go" }))));
}

#[test]
fn non_matching_event_is_not_dropped() {
    let compiled = filters(&[json!({
        "enabled": true,
        "ignore_authors": ["dependabot[bot]"],
        "ignore_labels": ["automated"],
        "ignore_paths": ["vendor/**"],
        "ignore_title_prefixes": ["chore:"],
    })]);
    let dropped = compiled.should_drop(&event(json!({
        "author_login": "octocat",
        "labels": ["feature"],
        "title": "add new endpoint",
        "path": "src/main.rs",
    })));
    assert!(!dropped);
}

#[test]
fn paths_merge_across_projects_without_duplicates() {
    let compiled = filters(&[
        json!({ "enabled": true, "ignore_paths": ["vendor/**", "dist/**"] }),
        json!({ "enabled": true, "ignore_paths": ["dist/**", "build/**"] }),
    ]);
    assert!(compiled.should_drop(&event(json!({ "path": "build/output.js" }))));
}
