use crate::model::Entry;
use crate::matcher::FuzzyMatcher;

/// Tunables for the selection list, taken from the `[entries]` and `[fuzzy]`
/// settings sections.
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub visible_count: usize,
    pub delta: i32,
    pub fuzzy_limit: usize,
}

/// One rendered row of the visible window.
#[derive(Debug, Clone, Copy)]
pub struct VisibleRow<'a> {
    pub entry: &'a Entry,
    pub selected: bool,
}

/// Filtered, scrollable view over the catalog.
///
/// Whenever something is selected, `window_start <= current < window_start + visible_count`.
pub struct AppState {
    entries: Vec<Entry>,
    query: String,
    params: ListParams,
    filtered_indices: Vec<usize>,
    current_index: Option<usize>,
    window_start: usize,
    matcher: FuzzyMatcher,
}

impl AppState {
    /// Starts in catalog order with the configured selection, clamped so the
    /// window invariant holds.
    pub fn new(entries: Vec<Entry>, params: ListParams, start_index: usize, window_start: usize) -> Self {
        let visible = params.visible_count.max(1);
        let filtered_indices: Vec<usize> = (0..entries.len()).collect();

        let (current_index, window_start) = match filtered_indices.len() {
            0 => (None, 0),
            len => {
                let current = start_index.min(len - 1);
                let start = window_start.min(current).max((current + 1).saturating_sub(visible));
                (Some(current), start)
            }
        };

        Self {
            entries,
            query: String::new(),
            params: ListParams { visible_count: visible, ..params },
            filtered_indices,
            current_index,
            window_start,
            matcher: FuzzyMatcher::new(),
        }
    }

    pub fn params(&self) -> ListParams {
        self.params
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered_indices.len()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replaces the query and refilters.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.filter();
    }

    pub fn push_str(&mut self, text: &str) {
        self.query.push_str(text);
        self.filter();
    }

    /// Drops the last character of the query. Returns false if it was already empty.
    pub fn pop_char(&mut self) -> bool {
        if self.query.pop().is_none() {
            return false;
        }
        self.filter();
        true
    }

    /// Recomputes the filtered order: case-insensitive prefix matches in
    /// catalog order, followed by up to `fuzzy_limit` of the remaining names
    /// by descending fuzzy score. Selection moves to the first step.
    pub fn filter(&mut self) {
        let needle = self.query.to_lowercase();
        let names: Vec<&str> = self.entries.iter().map(|e| e.name.as_str()).collect();

        let (prefix, rest): (Vec<usize>, Vec<usize>) =
            (0..names.len()).partition(|&idx| names[idx].to_lowercase().starts_with(&needle));

        let fuzzy = self.matcher.rank(&self.query, &names, &rest, self.params.fuzzy_limit);

        log::debug!(
            "AppState: query='{}', prefix={}, fuzzy={}",
            self.query,
            prefix.len(),
            fuzzy.len()
        );

        self.filtered_indices = prefix;
        self.filtered_indices.extend(fuzzy);

        self.current_index = None;
        if self.filtered_indices.is_empty() {
            self.window_start = 0;
        }
        self.move_selection(self.params.delta);
    }

    /// Moves the selection by `delta`, clamped to the list, and scrolls the
    /// window just far enough to keep it visible. Returns whether anything changed.
    pub fn move_selection(&mut self, delta: i32) -> bool {
        let len = self.filtered_indices.len();
        if len == 0 {
            return false;
        }

        let base = self.current_index.map_or(-1, |i| i as i64);
        let new_index = (base + i64::from(delta)).clamp(0, len as i64 - 1) as usize;

        if Some(new_index) == self.current_index {
            return false;
        }
        self.current_index = Some(new_index);

        let visible = self.params.visible_count;
        if new_index < self.window_start {
            self.window_start = new_index;
        } else if new_index >= self.window_start + visible {
            self.window_start = new_index + 1 - visible;
        }
        true
    }

    /// Up to `visible_count` rows starting at the window; rows past the end of
    /// the list are absent.
    pub fn visible_rows(&self) -> impl Iterator<Item = VisibleRow<'_>> {
        let start = self.window_start;
        let end = (start + self.params.visible_count).min(self.filtered_indices.len());
        (start..end).map(move |pos| VisibleRow {
            entry: &self.entries[self.filtered_indices[pos]],
            selected: Some(pos) == self.current_index,
        })
    }

    pub fn get_selected(&self) -> Option<&Entry> {
        self.current_index
            .and_then(|pos| self.filtered_indices.get(pos))
            .map(|&idx| &self.entries[idx])
    }
}
