//! Table selection panel built from the formatted schema text.

/// One table block of the schema and whether it is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    /// Block text shown as the label
    pub block: String,
    pub selected: bool,
}

/// Selectable tables, in schema order. Nothing is selected initially.
#[derive(Debug, Clone, Default)]
pub struct SchemaPanel {
    entries: Vec<TableEntry>,
}

/// Text between the first space and the first newline of a block.
fn block_table_name(block: &str) -> String {
    let end = block.find('\n').unwrap_or(block.len());
    let header = &block[..end];
    match header.find(' ') {
        Some(space) => header[space + 1..].trim().to_string(),
        None => String::new(),
    }
}

impl SchemaPanel {
    /// Split schema text into table blocks on blank lines.
    pub fn parse(schema: &str) -> Self {
        let entries = schema
            .split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(|block| {
                let block = block.trim_matches('\n');
                TableEntry {
                    name: block_table_name(block),
                    block: block.to_string(),
                    selected: false,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flip the selection of a table given by 1-based index or by name.
    /// Returns the new selection state.
    pub fn toggle(&mut self, target: &str) -> Result<bool, String> {
        // numeric targets are indexes unless out of range, then names
        let position = target
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=self.entries.len()).contains(n))
            .map(|n| n - 1)
            .or_else(|| self.entries.iter().position(|e| e.name == target));

        let entry = position
            .and_then(|i| self.entries.get_mut(i))
            .ok_or_else(|| format!("No such table: {target}"))?;
        entry.selected = !entry.selected;
        Ok(entry.selected)
    }

    pub fn select_all(&mut self) {
        for entry in &mut self.entries {
            entry.selected = true;
        }
    }

    pub fn select_none(&mut self) {
        for entry in &mut self.entries {
            entry.selected = false;
        }
    }

    /// Names of the selected tables, in schema order.
    pub fn selected_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.name.clone())
            .collect()
    }
}
