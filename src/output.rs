//! Markdown rendering of ranked suggestions for the CLI

use vault_switcher::search::highlight::{emphasize, highlight_ranges};
use vault_switcher::search::{MatchKind, MatchResult, SearchOutcome, Suggestion, Token};

pub fn format_outcome(outcome: &SearchOutcome, tokens: &[Token], fold_diacritics: bool) -> String {
    let mut md = format!(
        "# Suggestions · {} / {}\n\n",
        outcome.shown, outcome.total
    );

    if outcome.suggestions.is_empty() {
        md.push_str("No matching notes. Create a new note or search outside the vault.\n");
        return md;
    }

    for suggestion in &outcome.suggestions {
        md.push_str(&format_suggestion(suggestion, tokens, fold_diacritics));
    }
    md
}

fn format_suggestion(suggestion: &Suggestion, tokens: &[Token], fold_diacritics: bool) -> String {
    let label = suggestion.display_label();
    let ranges = highlight_ranges(label, tokens, fold_diacritics);
    let mut line = format!("{}. {}", suggestion.order + 1, emphasize(label, &ranges));

    if label != suggestion.item.name {
        line.push_str(&format!(" → {}", suggestion.item.name));
    }
    if suggestion.item.starred {
        line.push_str(" ★");
    }
    if suggestion.item.phantom {
        line.push_str(" (not created)");
    }
    line.push('\n');
    line.push_str(&format!("   `{}`\n", suggestion.item.path));

    let details: Vec<String> = suggestion
        .match_results
        .iter()
        .filter(|r| !r.is_identity())
        .filter_map(describe)
        .collect();
    if !details.is_empty() {
        line.push_str(&format!("   {}\n", details.join(" · ")));
    }
    line
}

fn describe(result: &MatchResult) -> Option<String> {
    let facet = match result.kind {
        MatchKind::Tag => "tag",
        MatchKind::Header => "header",
        MatchKind::Link => "link",
        MatchKind::Name | MatchKind::Alias | MatchKind::NotFound => return None,
    };
    Some(format!("{}: {}", facet, result.meta.join(", ")))
}
