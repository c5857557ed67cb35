use std::collections::HashMap;
use std::fmt;

/// Text of the Ion 1.0 system symbol table; symbol ID `n` is entry `n - 1`.
pub const SYSTEM_SYMBOLS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

/// Well-known system symbol IDs.
pub mod system_symbol {
    pub const ION_SYMBOL_TABLE: u64 = 3;
    pub const IMPORTS: u64 = 6;
    pub const SYMBOLS: u64 = 7;
    pub const MAX_ID: u64 = 8;
}

/// A symbol token: its text, or just its ID when the text is unknown
/// (symbol zero, or a slot filled by an unavailable shared table).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Text(String),
    Unknown(u64),
}

impl Symbol {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Unknown(_) => None,
        }
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl fmt::Display for Symbol {
    /// The raw text, or `$<id>` for unknown text. Quoting is the text
    /// writer's job.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Unknown(sid) => write!(f, "${sid}"),
        }
    }
}

/// The symbol table in effect at some point of a binary stream.
///
/// Starts as the system table (IDs 1–9). Readers append local symbols as
/// symbol tables are encountered and reset on every version marker;
/// writers intern text as they go.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    /// Entry `i` holds the text of symbol ID `i + 1`.
    symbols: Vec<Option<String>>,
    ids: HashMap<String, u64>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::with_capacity(SYSTEM_SYMBOLS.len()),
            ids: HashMap::new(),
        };
        table.reset();
        table
    }

    /// Drop all local symbols, keeping the system table.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.ids.clear();
        for text in SYSTEM_SYMBOLS {
            self.add(Some(text.to_owned()));
        }
    }

    /// Highest assigned symbol ID.
    pub fn max_id(&self) -> u64 {
        self.symbols.len() as u64
    }

    /// Append a symbol (text may be unknown) and return its ID.
    pub fn add(&mut self, text: Option<String>) -> u64 {
        self.symbols.push(text.clone());
        let sid = self.max_id();
        if let Some(text) = text {
            // the first definition of a text wins
            self.ids.entry(text).or_insert(sid);
        }
        sid
    }

    /// Append `count` slots with unknown text.
    pub fn add_unknown(&mut self, count: usize) {
        self.symbols.resize(self.symbols.len() + count, None);
    }

    /// Resolve a symbol ID. `None` means the ID is out of range.
    pub fn resolve(&self, sid: u64) -> Option<Symbol> {
        if sid == 0 {
            return Some(Symbol::Unknown(0));
        }
        let index = usize::try_from(sid - 1).ok()?;
        self.symbols.get(index).map(|text| match text {
            Some(text) => Symbol::Text(text.clone()),
            None => Symbol::Unknown(sid),
        })
    }

    pub fn id_of(&self, text: &str) -> Option<u64> {
        self.ids.get(text).copied()
    }

    /// ID for `text`, adding it as a local symbol if it is new.
    pub fn intern(&mut self, text: &str) -> u64 {
        match self.id_of(text) {
            Some(sid) => sid,
            None => self.add(Some(text.to_owned())),
        }
    }

    /// Symbols defined after the system table, in ID order.
    pub fn local_symbols(&self) -> &[Option<String>] {
        &self.symbols[SYSTEM_SYMBOLS.len().min(self.symbols.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_system_symbols() {
        let table = SymbolTable::new();
        assert_eq!(table.max_id(), 9);
        assert_eq!(table.resolve(3), Some(Symbol::from("$ion_symbol_table")));
        assert_eq!(table.id_of("max_id"), Some(system_symbol::MAX_ID));
        assert!(table.local_symbols().is_empty());
    }

    #[test]
    fn symbol_zero_has_unknown_text() {
        assert_eq!(SymbolTable::new().resolve(0), Some(Symbol::Unknown(0)));
    }

    #[test]
    fn out_of_range_ids_do_not_resolve() {
        assert_eq!(SymbolTable::new().resolve(10), None);
    }

    #[test]
    fn intern_reuses_existing_ids() {
        let mut table = SymbolTable::new();
        assert_eq!(table.intern("name"), 4);
        assert_eq!(table.intern("a"), 10);
        assert_eq!(table.intern("b"), 11);
        assert_eq!(table.intern("a"), 10);
        assert_eq!(table.local_symbols(), &[Some("a".to_owned()), Some("b".to_owned())]);
    }

    #[test]
    fn unknown_slots_resolve_to_ids() {
        let mut table = SymbolTable::new();
        table.add_unknown(2);
        table.add(Some("x".to_owned()));
        assert_eq!(table.resolve(10), Some(Symbol::Unknown(10)));
        assert_eq!(table.resolve(12), Some(Symbol::from("x")));
    }

    #[test]
    fn reset_drops_local_symbols() {
        let mut table = SymbolTable::new();
        table.intern("a");
        table.reset();
        assert_eq!(table.max_id(), 9);
        assert_eq!(table.id_of("a"), None);
    }

    #[test]
    fn display_unknown_symbol() {
        assert_eq!(Symbol::Unknown(12).to_string(), "$12");
    }
}
