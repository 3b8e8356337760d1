use serde::{Deserialize, Serialize};

/// One vocabulary row from the practice sheet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub practiced: u64,
}

impl WordRecord {
    pub fn new(word: &str, category: &str, practiced: u64) -> Self {
        Self {
            word: word.to_string(),
            category: category.to_string(),
            practiced,
        }
    }

    /// Category for display, or None when the sheet left it blank.
    pub fn display_category(&self) -> Option<&str> {
        let category = self.category.trim();
        // Spreadsheet exports sometimes spell an empty cell as "nan"
        if category.is_empty() || category == "nan" {
            None
        } else {
            Some(category)
        }
    }
}

/// All usable rows of one sheet download, in source row order.
pub type Dataset = Vec<WordRecord>;

/// Words picked for a session, in presentation order.
pub type Selection = Vec<WordRecord>;
