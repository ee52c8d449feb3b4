/// Sentinel used by catalog files to select the built-in prefix + fuzzy filter.
pub const BUILTIN_FUZZY: &str = "BUILD_IN_fuzzy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,    // Display name
    pub command: String, // Shell command with the name already substituted
    pub group: String,   // Name of the owning group
}

impl Entry {
    pub fn new(name: String, command: String, group: String) -> Self {
        Self { name, command, group }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub description: String,
    pub entries: Vec<Entry>,
}

/// How typed text is turned into a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    BuiltinFuzzy,
}

impl SearchMode {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            BUILTIN_FUZZY | "built-in fuzzy" => Some(SearchMode::BuiltinFuzzy),
            _ => None,
        }
    }
}

/// The search box configuration. One is active per loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub name: String,
    pub mode: SearchMode,
    pub display_text: String,
    pub group: Option<String>,
}

impl Default for InputField {
    fn default() -> Self {
        Self {
            name: "search".to_string(),
            mode: SearchMode::BuiltinFuzzy,
            display_text: "Search...".to_string(),
            group: None,
        }
    }
}
