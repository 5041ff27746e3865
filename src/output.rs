use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

/// Join task ids for display, eliding everything past `max_shown`.
pub fn format_ids(ids: &[u64], max_shown: usize) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }

    let shown: Vec<String> = ids.iter().take(max_shown).map(u64::to_string).collect();
    let hidden = ids.len().saturating_sub(max_shown);
    if hidden > 0 {
        format!("{}, ... (+{} more)", shown.join(", "), hidden)
    } else {
        shown.join(", ")
    }
}
