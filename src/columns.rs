#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnState {
    Enabled,
    Disabled,
}

impl ColumnState {
    fn flipped(self) -> Self {
        match self {
            ColumnState::Enabled => ColumnState::Disabled,
            ColumnState::Disabled => ColumnState::Enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEntry {
    pub name: String,
    pub state: ColumnState,
}

/// Per-column enable/disable state, one entry per header column in header order.
///
/// Lookups are by name; a header that repeats a name gets every matching
/// entry updated together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSelection {
    entries: Vec<ColumnEntry>,
}

impl ColumnSelection {
    pub fn all_enabled(header: &[String]) -> Self {
        Self {
            entries: header
                .iter()
                .map(|name| ColumnEntry {
                    name: name.clone(),
                    state: ColumnState::Enabled,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ColumnEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// State of the column at `idx`; columns past the end count as disabled.
    pub fn is_enabled_at(&self, idx: usize) -> bool {
        self.entries
            .get(idx)
            .is_some_and(|e| e.state == ColumnState::Enabled)
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.state == ColumnState::Enabled)
    }

    /// Returns false when no column carries that name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let state = if enabled {
            ColumnState::Enabled
        } else {
            ColumnState::Disabled
        };
        self.update(name, |_| state)
    }

    pub fn toggle(&mut self, name: &str) -> bool {
        self.update(name, ColumnState::flipped)
    }

    pub fn restore_all(&mut self) {
        for entry in &mut self.entries {
            entry.state = ColumnState::Enabled;
        }
    }

    fn update(&mut self, name: &str, f: impl Fn(ColumnState) -> ColumnState) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.name == name) {
            entry.state = f(entry.state);
            found = true;
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        ["key", "common", "develop"].map(String::from).to_vec()
    }

    #[test]
    fn starts_all_enabled_in_header_order() {
        let sel = ColumnSelection::all_enabled(&header());
        let names: Vec<&str> = sel.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["key", "common", "develop"]);
        assert!((0..3).all(|i| sel.is_enabled_at(i)));
        assert!(!sel.is_enabled_at(3));
        assert_eq!(sel.len(), 3);
        assert!(!sel.is_empty());
        assert!(ColumnSelection::all_enabled(&[]).is_empty());
    }

    #[test]
    fn toggle_only_touches_named_column() {
        let mut sel = ColumnSelection::all_enabled(&header());
        assert!(sel.toggle("common"));
        assert_eq!(sel.is_enabled("common"), Some(false));
        assert_eq!(sel.is_enabled("key"), Some(true));
        assert!(sel.toggle("common"));
        assert_eq!(sel.is_enabled("common"), Some(true));
    }

    #[test]
    fn unknown_column_is_a_no_op() {
        let mut sel = ColumnSelection::all_enabled(&header());
        let before = sel.clone();
        assert!(!sel.set_enabled("staging", false));
        assert!(!sel.toggle("staging"));
        assert_eq!(sel, before);
    }

    #[test]
    fn restore_matches_fresh_selection() {
        let fresh = ColumnSelection::all_enabled(&header());
        let mut sel = fresh.clone();
        sel.set_enabled("key", false);
        sel.set_enabled("develop", false);
        sel.toggle("common");
        sel.restore_all();
        assert_eq!(sel, fresh);
    }

    #[test]
    fn duplicate_names_move_together() {
        let dup = ["env", "env"].map(String::from).to_vec();
        let mut sel = ColumnSelection::all_enabled(&dup);
        sel.set_enabled("env", false);
        assert!(!sel.is_enabled_at(0));
        assert!(!sel.is_enabled_at(1));
    }
}
