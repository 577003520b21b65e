//! Query result tables
//!
//! A table owns an ordered, deduplicated list of binding names and a
//! list of rows; a row maps binding names to cells. Tables are not
//! safe for concurrent mutation; all writes happen from the planner's
//! single consumer task.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use chronograph_core::{format_anchor, Anchor, Error, Literal, Node, Predicate, Result};

/// One value of a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Str(String),
    Node(Node),
    Predicate(Predicate),
    Literal(Literal),
    Time(Anchor),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Str(s) => write!(f, "{s}"),
            Cell::Node(n) => write!(f, "{n}"),
            Cell::Predicate(p) => write!(f, "{p}"),
            Cell::Literal(l) => write!(f, "{l}"),
            Cell::Time(t) => write!(f, "{}", format_anchor(t)),
        }
    }
}

/// A row of results: binding name to cell.
pub type Row = HashMap<String, Cell>;

/// Merge rows into a single one; later rows win on shared keys.
pub fn merge_rows(rows: &[&Row]) -> Row {
    let mut out = Row::new();
    for r in rows {
        for (k, v) in r.iter() {
            out.insert(k.clone(), v.clone());
        }
    }
    out
}

/// Render one row as a line of text, `<NULL>` for absent bindings.
fn row_to_text_line(r: &Row, bs: &[String], sep: &str) -> String {
    bs.iter()
        .map(|b| r.get(b).map_or_else(|| "<NULL>".to_string(), ToString::to_string))
        .collect::<Vec<_>>()
        .join(sep)
}

/// The results of a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    bs: Vec<String>,
    mbs: HashSet<String>,
    data: Vec<Row>,
}

impl Table {
    /// Create a table for the given bindings. Fails on duplicates.
    pub fn new(bs: Vec<String>) -> Result<Self> {
        let mbs: HashSet<String> = bs.iter().cloned().collect();
        if mbs.len() != bs.len() {
            return Err(Error::Semantic(format!(
                "table does not allow duplicated bindings in {bs:?}"
            )));
        }
        Ok(Self {
            bs,
            mbs,
            data: Vec::new(),
        })
    }

    /// Append a row. Rows are not checked against the declared
    /// bindings; the planner builds valid tables.
    pub fn add_row(&mut self, r: Row) {
        self.data.push(r);
    }

    /// The number of rows currently in the table.
    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    /// The requested row, if it exists.
    pub fn row(&self, i: usize) -> Option<&Row> {
        self.data.get(i)
    }

    /// All rows.
    pub fn rows(&self) -> &[Row] {
        &self.data
    }

    /// Append novel binding names, preserving order; names already
    /// present are silently ignored.
    pub fn add_bindings(&mut self, bs: &[String]) {
        for b in bs {
            if self.mbs.insert(b.clone()) {
                self.bs.push(b.clone());
            }
        }
    }

    /// True if the binding exists on the table.
    pub fn has_binding(&self, b: &str) -> bool {
        self.mbs.contains(b)
    }

    /// The bindings of the table, in order.
    pub fn bindings(&self) -> &[String] {
        &self.bs
    }

    /// Append the contents of another table. Succeeds iff this table
    /// has no bindings yet (adopting the other's) or the binding sets
    /// are equal.
    pub fn append_table(&mut self, t2: Table) -> Result<()> {
        if !self.bs.is_empty() && self.mbs != t2.mbs {
            return Err(Error::Semantic(format!(
                "can only append to an empty or equally bound table; got {:?} and {:?}",
                self.bs, t2.bs
            )));
        }
        if self.bs.is_empty() {
            self.bs = t2.bs;
            self.mbs = t2.mbs;
        }
        self.data.extend(t2.data);
        Ok(())
    }

    /// Cartesian join with another table. Requires disjoint binding
    /// sets; produces `|self| × |t2|` rows, each the key-wise union.
    pub fn dot_product(&mut self, t2: &Table) -> Result<()> {
        if !self.mbs.is_disjoint(&t2.mbs) {
            return Err(Error::Semantic(format!(
                "dot product requires disjoint bindings; got {:?} and {:?}",
                self.bs, t2.bs
            )));
        }
        self.add_bindings(&t2.bs);
        let own = std::mem::take(&mut self.data);
        for r1 in &own {
            for r2 in &t2.data {
                self.data.push(merge_rows(&[r1, r2]));
            }
        }
        Ok(())
    }

    /// Remove the row at the given position.
    pub fn delete_row(&mut self, i: usize) -> Result<()> {
        if i >= self.data.len() {
            return Err(Error::Semantic(format!(
                "cannot delete row {i} from a table with {} rows",
                self.data.len()
            )));
        }
        self.data.remove(i);
        Ok(())
    }

    /// Flush all rows, retaining the bindings.
    pub fn truncate(&mut self) {
        self.data.clear();
    }

    /// Render the table: a header with the binding names, then one
    /// line per row, cells joined by `sep` (tab if empty).
    pub fn to_text(&self, sep: &str) -> String {
        let sep = if sep.is_empty() { "\t" } else { sep };
        let mut out = self.bs.join(sep);
        out.push('\n');
        for r in &self.data {
            out.push_str(&row_to_text_line(r, &self.bs, sep));
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text("\t"))
    }
}
