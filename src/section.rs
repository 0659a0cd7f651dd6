//! The in-memory document model: sections holding an ordered sequence of
//! key/value pairs and blank-line block separators.

/// A key/value pair with its attached comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pair {
    pub comments: Vec<String>,
    pub key: String,
    pub value: String,
}

/// One slot in a section's data.
///
/// `Blank` is a layout marker: it serializes as an empty line and groups
/// the surrounding pairs into blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    Pair(Pair),
    Blank,
}

impl Item {
    pub fn is_blank(&self) -> bool {
        matches!(self, Item::Blank)
    }

    pub fn as_pair(&self) -> Option<&Pair> {
        match self {
            Item::Pair(pair) => Some(pair),
            Item::Blank => None,
        }
    }
}

/// A named section. The global section has an empty name.
///
/// Invariants on `data`: it never starts with a `Blank` and never holds two
/// adjacent `Blank`s. A single trailing `Blank` is legal; it marks a closed
/// block so later additions start a new one.
#[derive(Debug, Clone, Default)]
pub(crate) struct Section {
    pub comments: Vec<String>,
    pub name: String,
    pub data: Vec<Item>,
}

impl Section {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>, comments: Vec<String>) -> Self {
        Self {
            comments,
            name: name.into(),
            data: Vec::new(),
        }
    }

    pub fn pair(&self, key: &str, case_sensitive: bool) -> Option<&Pair> {
        self.data
            .iter()
            .filter_map(Item::as_pair)
            .find(|pair| eq_ident(case_sensitive, &pair.key, key))
    }

    pub fn pair_mut(&mut self, key: &str, case_sensitive: bool) -> Option<&mut Pair> {
        self.data.iter_mut().find_map(|item| match item {
            Item::Pair(pair) if eq_ident(case_sensitive, &pair.key, key) => Some(pair),
            _ => None,
        })
    }

    /// Remove the pair matching `key`, collapsing any blank separators the
    /// removal leaves doubled or leading. Returns whether a pair was removed.
    pub fn remove(&mut self, key: &str, case_sensitive: bool) -> bool {
        let Some(pos) = self
            .data
            .iter()
            .position(|item| matches!(item, Item::Pair(p) if eq_ident(case_sensitive, &p.key, key)))
        else {
            return false;
        };
        self.data.remove(pos);
        normalize_blanks(&mut self.data);
        true
    }

    /// Append a completed batch of pairs as a new block.
    ///
    /// Existing pairs whose identity matches an incoming one are pruned
    /// first (incoming wins, untouched pairs keep their relative order),
    /// separators left redundant by the pruning are normalized away, and a
    /// trailing blank closes the block.
    pub fn merge_items(&mut self, incoming: Vec<Pair>, case_sensitive: bool) {
        if incoming.is_empty() {
            return;
        }
        self.data.retain(|item| match item {
            Item::Pair(pair) => !incoming
                .iter()
                .any(|new| eq_ident(case_sensitive, &pair.key, &new.key)),
            Item::Blank => true,
        });
        normalize_blanks(&mut self.data);
        self.data.extend(incoming.into_iter().map(Item::Pair));
        self.data.push(Item::Blank);
    }
}

/// Drop leading blanks and collapse runs of blanks to one.
fn normalize_blanks(data: &mut Vec<Item>) {
    let mut prev_blank = true;
    data.retain(|item| {
        let blank = item.is_blank();
        let keep = !(blank && prev_blank);
        prev_blank = blank;
        keep
    });
}

/// Compare two names under the document's identity rule: verbatim when case
/// sensitive, lowercased otherwise.
pub(crate) fn eq_ident(case_sensitive: bool, a: &str, b: &str) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
