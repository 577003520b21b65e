//! Query planner and evaluator
//!
//! Resolves each graph clause against the storage by dispatching on
//! which of the subject, predicate, and object positions carry
//! concrete values, then stitches the per-clause tables together:
//! a dot-product when the binding sets are disjoint, a per-row
//! substitution join when they overlap.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use chronograph_core::{Error, Object, Result, Triple};
use chronograph_storage::{Graph, LookupOptions, Store, Triples};

use crate::semantic::{GraphClause, Statement, StatementKind};
use crate::table::{merge_rows, Cell, Row, Table};

/// Execute a statement against the store. Queries produce a table of
/// results; mutations produce an empty table. If a mutation fails
/// mid-way across multiple graphs, the already-applied graphs remain
/// modified.
pub fn execute(store: &dyn Store, st: &Statement) -> Result<Table> {
    match st.kind() {
        StatementKind::Create => {
            for g in st.graphs() {
                store.new_graph(g)?;
            }
            Table::new(Vec::new())
        }
        StatementKind::Drop => {
            for g in st.graphs() {
                store.delete_graph(g)?;
            }
            Table::new(Vec::new())
        }
        StatementKind::Insert => {
            for g in st.graphs() {
                store.graph(g)?.add_triples(st.data())?;
            }
            Table::new(Vec::new())
        }
        StatementKind::Delete => {
            for g in st.graphs() {
                store.graph(g)?.remove_triples(st.data())?;
            }
            Table::new(Vec::new())
        }
        StatementKind::Query => run_query(store, st),
    }
}

fn run_query(store: &dyn Store, st: &Statement) -> Result<Table> {
    let graphs = st
        .graphs()
        .iter()
        .map(|g| store.graph(g))
        .collect::<Result<Vec<_>>>()?;
    let lo = st.lookup_options();

    let mut clauses = st.pattern_clauses().iter();
    let first = clauses
        .next()
        .ok_or_else(|| Error::Semantic("query has no graph pattern clauses".to_string()))?;
    let mut tbl = simple_fetch(&graphs, first, &lo)?;
    for cls in clauses {
        if cls.bindings().iter().any(|b| tbl.has_binding(b)) {
            tbl = fetch_joined(&graphs, cls, &lo, &tbl)?;
        } else {
            let t2 = simple_fetch(&graphs, cls, &lo)?;
            tbl.dot_product(&t2)?;
        }
    }

    let mut tbl = apply_projection(tbl, st)?;
    apply_order(&mut tbl, st);
    apply_limit(&mut tbl, st)?;
    Ok(tbl)
}

/// Tighten the lookup window with the clause's concrete bounds:
/// latest lower anchor, earliest upper anchor.
fn update_time_bounds(lo: &LookupOptions, cls: &GraphClause) -> LookupOptions {
    let mut nlo = lo.clone();
    if let Some(l) = cls.p_lower_bound {
        nlo.lower_anchor = Some(nlo.lower_anchor.map_or(l, |cur| cur.max(l)));
    }
    if let Some(u) = cls.p_upper_bound {
        nlo.upper_anchor = Some(nlo.upper_anchor.map_or(u, |cur| cur.min(u)));
    }
    nlo
}

/// The per-row variant: also tighten with bound-alias cells read from
/// the current row. An alias cell that is present but not a time cell
/// is an error; an absent alias is skipped.
fn update_time_bounds_for_row(
    lo: &LookupOptions,
    cls: &GraphClause,
    r: &Row,
) -> Result<LookupOptions> {
    let mut nlo = update_time_bounds(lo, cls);
    if let Some(alias) = &cls.p_lower_bound_alias {
        if let Some(cell) = r.get(alias) {
            let Cell::Time(t) = cell else {
                return Err(Error::Semantic(format!(
                    "invalid time anchor value {cell} for bound {alias}"
                )));
            };
            nlo.lower_anchor = Some(nlo.lower_anchor.map_or(*t, |cur| cur.max(*t)));
        }
    }
    if let Some(alias) = &cls.p_upper_bound_alias {
        if let Some(cell) = r.get(alias) {
            let Cell::Time(t) = cell else {
                return Err(Error::Semantic(format!(
                    "invalid time anchor value {cell} for bound {alias}"
                )));
            };
            nlo.upper_anchor = Some(nlo.upper_anchor.map_or(*t, |cur| cur.min(*t)));
        }
    }
    Ok(nlo)
}

/// The cell containing the data boxed in the object.
fn object_to_cell(o: &Object) -> Cell {
    match o {
        Object::Node(n) => Cell::Node(n.clone()),
        Object::Predicate(p) => Cell::Predicate(p.clone()),
        Object::Literal(l) => Cell::Literal(l.clone()),
    }
}

/// Write a cell under a binding name, enforcing intra-row consistency:
/// returns false if the name was already written with a different
/// value.
fn set_cell(r: &mut Row, name: &str, cell: Cell) -> bool {
    match r.get(name) {
        Some(existing) if existing != &cell => false,
        _ => {
            r.insert(name.to_string(), cell);
            true
        }
    }
}

/// Convert a triple into a row using the bindings and aliases of the
/// graph clause. Returns `Ok(None)` when the same variable would be
/// written twice with unequal values; that row is silently dropped.
fn triple_to_row(t: &Triple, cls: &GraphClause) -> Result<Option<Row>> {
    let mut r = Row::new();
    let (s, p, o) = (t.s(), t.p(), t.o());

    // Subject related bindings.
    for name in [&cls.s_binding, &cls.s_alias].into_iter().flatten() {
        if !set_cell(&mut r, name, Cell::Node(s.clone())) {
            return Ok(None);
        }
    }
    if let Some(name) = &cls.s_type_alias {
        if !set_cell(&mut r, name, Cell::Str(s.node_type().to_string())) {
            return Ok(None);
        }
    }
    if let Some(name) = &cls.s_id_alias {
        if !set_cell(&mut r, name, Cell::Str(s.id().to_string())) {
            return Ok(None);
        }
    }

    // Predicate related bindings.
    for name in [&cls.p_binding, &cls.p_alias].into_iter().flatten() {
        if !set_cell(&mut r, name, Cell::Predicate(p.clone())) {
            return Ok(None);
        }
    }
    if let Some(name) = &cls.p_id_alias {
        if !set_cell(&mut r, name, Cell::Str(p.id().to_string())) {
            return Ok(None);
        }
    }
    for name in [&cls.p_anchor_binding, &cls.p_anchor_alias]
        .into_iter()
        .flatten()
    {
        let anchor = p.time_anchor().map_err(|_| {
            Error::Semantic(format!(
                "cannot retrieve the time anchor of immutable predicate {p} for {name}"
            ))
        })?;
        if !set_cell(&mut r, name, Cell::Time(*anchor)) {
            return Ok(None);
        }
    }

    // Object related bindings.
    for name in [&cls.o_binding, &cls.o_alias].into_iter().flatten() {
        if !set_cell(&mut r, name, object_to_cell(o)) {
            return Ok(None);
        }
    }
    if let Some(name) = &cls.o_type_alias {
        let n = o.node().ok_or_else(|| {
            Error::Semantic(format!("object {o} carries no node type for {name}"))
        })?;
        if !set_cell(&mut r, name, Cell::Str(n.node_type().to_string())) {
            return Ok(None);
        }
    }
    if let Some(name) = &cls.o_id_alias {
        let id = match o {
            Object::Node(n) => n.id().to_string(),
            Object::Predicate(p) => p.id().to_string(),
            Object::Literal(_) => {
                return Err(Error::Semantic(format!(
                    "object {o} carries no id for {name}"
                )))
            }
        };
        if !set_cell(&mut r, name, Cell::Str(id)) {
            return Ok(None);
        }
    }
    for name in [&cls.o_anchor_binding, &cls.o_anchor_alias]
        .into_iter()
        .flatten()
    {
        let p2 = o.predicate().ok_or_else(|| {
            Error::Semantic(format!("object {o} carries no time anchor for {name}"))
        })?;
        let anchor = p2.time_anchor().map_err(|_| {
            Error::Semantic(format!(
                "cannot retrieve the time anchor of immutable predicate {p2} for {name}"
            ))
        })?;
        if !set_cell(&mut r, name, Cell::Time(*anchor)) {
            return Ok(None);
        }
    }

    Ok(Some(r))
}

/// Feed fetched triples into the result table, re-checking the
/// clause's predicate-id and object-id constraints plus the temporal
/// window against each triple before projecting it into a row.
fn add_triples_to_table(ts: Triples, cls: &GraphClause, tbl: &mut Table) -> Result<()> {
    for t in ts {
        if let Some(pid) = &cls.p_id {
            if t.p().id() != pid {
                continue;
            }
            if cls.p_temporal && t.p().is_temporal() {
                let ta = *t.p().time_anchor()?;
                if cls.p_lower_bound.is_some_and(|l| ta < l) {
                    continue;
                }
                if cls.p_upper_bound.is_some_and(|u| ta > u) {
                    continue;
                }
            }
        }
        if let Some(oid) = &cls.o_id {
            if let Some(p) = t.o().predicate() {
                if p.id() != oid {
                    continue;
                }
                if cls.o_temporal && p.is_temporal() {
                    let ta = *p.time_anchor()?;
                    if cls.o_lower_bound.is_some_and(|l| ta < l) {
                        continue;
                    }
                    if cls.o_upper_bound.is_some_and(|u| ta > u) {
                        continue;
                    }
                }
            }
        }
        if let Some(r) = triple_to_row(&t, cls)? {
            tbl.add_row(r);
        }
    }
    Ok(())
}

/// Resolve one graph clause against the graphs, dispatching on which
/// positions are bound to concrete values.
fn simple_fetch(
    gs: &[Arc<dyn Graph>],
    cls: &GraphClause,
    lo: &LookupOptions,
) -> Result<Table> {
    let lo = update_time_bounds(lo, cls);
    let mut tbl = Table::new(cls.bindings())?;
    let (s, p, o) = (cls.s.as_ref(), cls.p.as_ref(), cls.o.as_ref());
    debug!(
        s = s.is_some(),
        p = p.is_some(),
        o = o.is_some(),
        "dispatching clause fetch"
    );
    match (s, p, o) {
        (Some(s), Some(p), Some(o)) => {
            // Fully qualified triple.
            let t = Triple::new(s.clone(), p.clone(), o.clone());
            for g in gs {
                if g.exist(&t)? {
                    add_triples_to_table(Box::new(std::iter::once(t.clone())), cls, &mut tbl)?;
                }
            }
        }
        (Some(s), Some(p), None) => {
            for g in gs {
                let (s2, p2) = (s.clone(), p.clone());
                let ts: Triples = Box::new(
                    g.objects(s, p, &lo)?
                        .map(move |o| Triple::new(s2.clone(), p2.clone(), o)),
                );
                add_triples_to_table(ts, cls, &mut tbl)?;
            }
        }
        (Some(s), None, Some(o)) => {
            for g in gs {
                let (s2, o2) = (s.clone(), o.clone());
                let ts: Triples = Box::new(
                    g.predicates_for_subject_and_object(s, o, &lo)?
                        .map(move |p| Triple::new(s2.clone(), p, o2.clone())),
                );
                add_triples_to_table(ts, cls, &mut tbl)?;
            }
        }
        (None, Some(p), Some(o)) => {
            for g in gs {
                let (p2, o2) = (p.clone(), o.clone());
                let ts: Triples = Box::new(
                    g.subjects(p, o, &lo)?
                        .map(move |s| Triple::new(s, p2.clone(), o2.clone())),
                );
                add_triples_to_table(ts, cls, &mut tbl)?;
            }
        }
        (Some(s), None, None) => {
            for g in gs {
                add_triples_to_table(g.triples_for_subject(s, &lo)?, cls, &mut tbl)?;
            }
        }
        (None, Some(p), None) => {
            for g in gs {
                add_triples_to_table(g.triples_for_predicate(p, &lo)?, cls, &mut tbl)?;
            }
        }
        (None, None, Some(o)) => {
            for g in gs {
                add_triples_to_table(g.triples_for_object(o, &lo)?, cls, &mut tbl)?;
            }
        }
        (None, None, None) => {
            // Full data request.
            for g in gs {
                add_triples_to_table(g.triples()?, cls, &mut tbl)?;
            }
        }
    }
    Ok(tbl)
}

/// Replace the clause's binding slots with the row's concrete values.
/// Aliases and anchors are left to the merge step's consistency check.
fn specialize_clause(cls: &GraphClause, r: &Row) -> GraphClause {
    let mut out = cls.clone();
    if out.s.is_none() {
        if let Some(Cell::Node(n)) = out.s_binding.as_ref().and_then(|b| r.get(b)) {
            out.s = Some(n.clone());
        }
    }
    if out.p.is_none() {
        if let Some(Cell::Predicate(p)) = out.p_binding.as_ref().and_then(|b| r.get(b)) {
            out.p = Some(p.clone());
        }
    }
    if out.o.is_none() {
        match out.o_binding.as_ref().and_then(|b| r.get(b)) {
            Some(Cell::Node(n)) => out.o = Some(Object::Node(n.clone())),
            Some(Cell::Predicate(p)) => out.o = Some(Object::Predicate(p.clone())),
            Some(Cell::Literal(l)) => out.o = Some(Object::Literal(l.clone())),
            _ => {}
        }
    }
    out
}

/// Keep the union of the two rows iff their shared bindings agree.
fn merge_consistent(r1: &Row, r2: &Row) -> Option<Row> {
    for (k, v) in r2 {
        if let Some(existing) = r1.get(k) {
            if existing != v {
                return None;
            }
        }
    }
    Some(merge_rows(&[r1, r2]))
}

/// Equi-join a clause against the accumulated table: every row binds
/// the clause's overlapping variables, the fetch runs under the row's
/// fused time bounds, and only consistent unions are kept.
fn fetch_joined(
    gs: &[Arc<dyn Graph>],
    cls: &GraphClause,
    lo: &LookupOptions,
    acc: &Table,
) -> Result<Table> {
    let mut out = Table::new(acc.bindings().to_vec())?;
    out.add_bindings(&cls.bindings());
    for r in acc.rows() {
        let scls = specialize_clause(cls, r);
        let row_lo = update_time_bounds_for_row(lo, cls, r)?;
        let t2 = simple_fetch(gs, &scls, &row_lo)?;
        for r2 in t2.rows() {
            if let Some(merged) = merge_consistent(r, r2) {
                out.add_row(merged);
            }
        }
    }
    Ok(out)
}

/// Sort rows by the statement's `order by` conditions over the
/// rendered cell text; absent cells sort first.
fn apply_order(tbl: &mut Table, st: &Statement) {
    if st.order_by().is_empty() {
        return;
    }
    let mut rows = tbl.rows().to_vec();
    rows.sort_by(|a, b| {
        for oc in st.order_by() {
            let av = a.get(&oc.binding).map(ToString::to_string);
            let bv = b.get(&oc.binding).map(ToString::to_string);
            let mut ord = av.cmp(&bv);
            if oc.descending {
                ord = ord.reverse();
            }
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    tbl.truncate();
    for r in rows {
        tbl.add_row(r);
    }
}

/// Project the fused table onto the statement's projection list,
/// applying `as` renames. Aggregated or grouped projections are left
/// for a downstream executor, so the fused table passes through.
fn apply_projection(tbl: Table, st: &Statement) -> Result<Table> {
    let downstream = !st.group_by().is_empty()
        || st.having().is_some()
        || st.projections().iter().any(|p| p.aggregator.is_some());
    if downstream || st.projections().is_empty() {
        return Ok(tbl);
    }
    let mut names = Vec::new();
    for p in st.projections() {
        let out = p.alias.clone().unwrap_or_else(|| p.binding.clone());
        if !names.contains(&out) {
            names.push(out);
        }
    }
    let mut projected = Table::new(names)?;
    for r in tbl.rows() {
        let mut nr = Row::new();
        for p in st.projections() {
            if let Some(c) = r.get(&p.binding) {
                nr.insert(p.alias.clone().unwrap_or_else(|| p.binding.clone()), c.clone());
            }
        }
        projected.add_row(nr);
    }
    Ok(projected)
}

/// Truncate the table to the statement's limit.
fn apply_limit(tbl: &mut Table, st: &Statement) -> Result<()> {
    let Some(n) = st.limit() else { return Ok(()) };
    let n = usize::try_from(n)
        .map_err(|_| Error::Semantic(format!("invalid negative limit {n}")))?;
    while tbl.num_rows() > n {
        tbl.delete_row(n)?;
    }
    Ok(())
}
