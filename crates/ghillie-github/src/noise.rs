//! Noise filtering: drops events that match a project's configured
//! authors, labels, title prefixes, or paths before they reach the
//! Bronze writer.

use std::collections::HashSet;

use serde::Deserialize;

use crate::client::GitHubIngestedEvent;

fn normalise_text(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn normalise_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    trimmed.to_ascii_lowercase().replace('\\', "/")
}

fn author_candidates(payload: &serde_json::Value) -> Vec<String> {
    ["author_login", "author_name", "author_email"]
        .iter()
        .filter_map(|key| payload.get(key).and_then(serde_json::Value::as_str))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn title_for_payload(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("title")
        .or_else(|| payload.get("message"))
        .or_else(|| payload.get("metadata").and_then(|m| m.get("message")))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

fn labels_for_payload(payload: &serde_json::Value) -> Vec<String> {
    payload
        .get("labels")
        .and_then(serde_json::Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(serde_json::Value::as_str)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn path_for_payload(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("path")
        .and_then(serde_json::Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// One project's noise configuration, deserialised from the `projects`
/// catalogue table's `noise_config` JSON column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoiseFilterConfig {
    pub enabled: bool,
    pub toggles: NoiseFilterToggles,
    pub ignore_authors: Vec<String>,
    pub ignore_labels: Vec<String>,
    pub ignore_paths: Vec<String>,
    pub ignore_title_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoiseFilterToggles {
    pub ignore_authors: bool,
    pub ignore_labels: bool,
    pub ignore_paths: bool,
    pub ignore_title_prefixes: bool,
}

impl Default for NoiseFilterToggles {
    fn default() -> Self {
        Self {
            ignore_authors: true,
            ignore_labels: true,
            ignore_paths: true,
            ignore_title_prefixes: true,
        }
    }
}

/// The merged, order-preserving-deduplicated filter set compiled from
/// every project a repository belongs to.
#[derive(Debug, Clone, Default)]
pub struct CompiledNoiseFilters {
    ignore_authors: HashSet<String>,
    ignore_labels: HashSet<String>,
    ignore_paths: Vec<String>,
    ignore_title_prefixes: Vec<String>,
}

impl CompiledNoiseFilters {
    pub fn should_drop(&self, event: &GitHubIngestedEvent) -> bool {
        self.matches_author(&event.payload)
            || self.matches_label(&event.payload)
            || self.matches_title_prefix(&event.payload)
            || self.matches_path(&event.payload)
    }

    fn matches_author(&self, payload: &serde_json::Value) -> bool {
        author_candidates(payload)
            .iter()
            .any(|candidate| self.ignore_authors.contains(&normalise_text(candidate)))
    }

    fn matches_label(&self, payload: &serde_json::Value) -> bool {
        labels_for_payload(payload)
            .iter()
            .any(|label| self.ignore_labels.contains(&normalise_text(label)))
    }

    fn matches_title_prefix(&self, payload: &serde_json::Value) -> bool {
        let Some(title) = title_for_payload(payload) else {
            return false;
        };
        let normalised = normalise_text(&title);
        self.ignore_title_prefixes.iter().any(|prefix| normalised.starts_with(prefix.as_str()))
    }

    fn matches_path(&self, payload: &serde_json::Value) -> bool {
        let Some(path) = path_for_payload(payload) else {
            return false;
        };
        let normalised = normalise_path(&path);
        self.ignore_paths.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|compiled| compiled.matches(&normalised))
                .unwrap_or(false)
        })
    }
}

/// Merge every project's noise configuration into one compiled filter
/// set. A project with `enabled = false` contributes nothing; within an
/// enabled project, each category only merges if its toggle is on.
/// Path/prefix lists preserve first-seen order across projects.
pub fn compile_noise_filters(configs: &[serde_json::Value]) -> CompiledNoiseFilters {
    let mut ignore_authors = HashSet::new();
    let mut ignore_labels = HashSet::new();
    let mut ignore_paths: Vec<String> = Vec::new();
    let mut ignore_title_prefixes: Vec<String> = Vec::new();

    for raw in configs {
        let config: NoiseFilterConfig = match serde_json::from_value(raw.clone()) {
            Ok(config) => config,
            Err(_) => continue,
        };
        if !config.enabled {
            continue;
        }

        if config.toggles.ignore_authors {
            ignore_authors.extend(config.ignore_authors.iter().map(|a| normalise_text(a)));
        }
        if config.toggles.ignore_labels {
            ignore_labels.extend(config.ignore_labels.iter().map(|l| normalise_text(l)));
        }
        if config.toggles.ignore_paths {
            for path in &config.ignore_paths {
                push_unique(&mut ignore_paths, normalise_path(path));
            }
        }
        if config.toggles.ignore_title_prefixes {
            for prefix in &config.ignore_title_prefixes {
                push_unique(&mut ignore_title_prefixes, normalise_text(prefix));
            }
        }
    }

    CompiledNoiseFilters {
        ignore_authors,
        ignore_labels,
        ignore_paths,
        ignore_title_prefixes,
    }
}

fn push_unique(target: &mut Vec<String>, value: String) {
    if !target.contains(&value) {
        target.push(value);
    }
}

#[path = "noise_tests.rs"]
#[cfg(test)]
mod noise_tests;
