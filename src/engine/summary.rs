use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::sheet::record::WordRecord;

pub const NO_WORDS_SELECTED: &str = "No words selected";
pub const PRACTICE_HINT: &str =
    "First make a separate sentence with each word and number the sentences";
const FOCUS_AREA: &str = "Vocabulary building";
const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Practice-level breakdown of one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PracticeSummary {
    pub total_words: usize,
    /// practice count -> number of words at that count, over the whole sheet
    pub dataset_levels: BTreeMap<u64, usize>,
    /// same histogram restricted to the selected words
    pub selection_levels: BTreeMap<u64, usize>,
    pub selected_words: usize,
    pub as_of: NaiveDate,
}

pub fn summarize(
    dataset: &[WordRecord],
    selection: &[WordRecord],
    as_of: NaiveDate,
) -> PracticeSummary {
    PracticeSummary {
        total_words: dataset.len(),
        dataset_levels: level_histogram(dataset),
        selection_levels: level_histogram(selection),
        selected_words: selection.len(),
        as_of,
    }
}

pub fn level_histogram(records: &[WordRecord]) -> BTreeMap<u64, usize> {
    let mut levels = BTreeMap::new();
    for record in records {
        *levels.entry(record.practiced).or_insert(0) += 1;
    }
    levels
}

pub fn render_statistics(summary: &PracticeSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Practice Statistics");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Words: {}", summary.total_words);
    let _ = writeln!(out);
    let _ = writeln!(out, "Practice Levels:");
    for (level, count) in &summary.dataset_levels {
        let _ = writeln!(out, "\u{2022} Level {level}: {count} {}", plural(*count));
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Today's Selection: {} {}",
        summary.selected_words,
        plural(summary.selected_words)
    );
    for (level, count) in &summary.selection_levels {
        let _ = writeln!(out, "   \u{2192} {count} from Level {level}");
    }
    out
}

/// Numbered list of the selected words followed by the practice date and
/// the exercise instructions.
pub fn render_word_list(selection: &[WordRecord], as_of: NaiveDate) -> String {
    if selection.is_empty() {
        return NO_WORDS_SELECTED.to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Today's Practice Words");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    for (i, record) in selection.iter().enumerate() {
        match record.display_category() {
            Some(category) => {
                let _ = writeln!(out, "{}. {} ({category})", i + 1, record.word);
            }
            None => {
                let _ = writeln!(out, "{}. {}", i + 1, record.word);
            }
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Focus Areas: {FOCUS_AREA}");
    let _ = writeln!(out, "Practice Date: {}", as_of.format("%Y-%m-%d"));
    let _ = writeln!(out);
    out.push_str(PRACTICE_HINT);
    out
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "word" } else { "words" }
}
