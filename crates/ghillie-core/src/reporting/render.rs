//! Markdown rendering for a generated report. Plain `format!`-based
//! templating, matching this codebase's preference elsewhere for small
//! hand-written renderers over a templating engine.

use crate::evidence::{ReportStatus, RepositoryMetadata};
use crate::status::RepositoryStatusResult;

pub fn render_report_markdown(
    repository: &RepositoryMetadata,
    window_start: chrono::DateTime<chrono::Utc>,
    window_end: chrono::DateTime<chrono::Utc>,
    result: &RepositoryStatusResult,
) -> String {
    let badge = match result.status {
        ReportStatus::OnTrack => "🟢 on track",
        ReportStatus::AtRisk => "🟡 at risk",
        ReportStatus::Blocked => "🔴 blocked",
        ReportStatus::Unknown => "⚪ unknown",
    };

    let mut out = String::new();
    out.push_str(&format!("# {} status report\n\n", repository.slug()));
    out.push_str(&format!(
        "**Window:** {} – {}\n\n**Status:** {badge}\n\n",
        window_start.to_rfc3339(),
        window_end.to_rfc3339(),
    ));
    out.push_str(&format!("{}\n\n", result.summary));

    push_list(&mut out, "Highlights", &result.highlights);
    push_list(&mut out, "Risks", &result.risks);
    push_list(&mut out, "Next steps", &result.next_steps);

    out
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("## {heading}\n\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');
}
