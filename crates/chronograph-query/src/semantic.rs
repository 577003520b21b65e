//! Semantic model of a parsed statement
//!
//! The grammar's hooks accumulate parsed fragments into a `Statement`.
//! During parsing the statement also carries the working graph clause
//! and the small amount of state the hooks need; once parsing ends the
//! statement is treated as read-only by the planner.

use serde::{Deserialize, Serialize};

use chronograph_core::{Anchor, Node, Object, Predicate, Triple};
use chronograph_storage::LookupOptions;

use crate::lexer::Token;

/// The kind of statement produced by the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    #[default]
    Query,
    Insert,
    Delete,
    Create,
    Drop,
}

/// Aggregation functions the projection list can carry. They are
/// parsed and validated here; evaluation happens downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregator {
    Count,
    Sum,
}

/// One entry of a query's projection list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub binding: String,
    pub alias: Option<String>,
    pub aggregator: Option<Aggregator>,
    pub distinct: bool,
}

/// One entry of an `order by` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCondition {
    pub binding: String,
    pub descending: bool,
}

/// Comparison operators usable in `having` expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Lt,
    Gt,
    Eq,
}

/// Boolean expression tree built from a `having` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Binding(String),
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Comparison {
        op: ComparisonOp,
        lhs: String,
        rhs: String,
    },
}

/// Boolean combination of global time bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimeCondition {
    Before(Anchor),
    After(Anchor),
    Between(Anchor, Anchor),
    And(Box<TimeCondition>, Box<TimeCondition>),
    Or(Box<TimeCondition>, Box<TimeCondition>),
}

impl TimeCondition {
    /// Fold the condition into a single `[lower, upper]` window:
    /// `and` tightens (latest lower, earliest upper), `or` widens
    /// (earliest lower, latest upper, unbounded if either side is).
    pub fn window(&self) -> (Option<Anchor>, Option<Anchor>) {
        match self {
            TimeCondition::Before(t) => (None, Some(*t)),
            TimeCondition::After(t) => (Some(*t), None),
            TimeCondition::Between(lo, hi) => (Some(*lo), Some(*hi)),
            TimeCondition::And(l, r) => {
                let (llo, lhi) = l.window();
                let (rlo, rhi) = r.window();
                let lo = match (llo, rlo) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
                let hi = match (lhi, rhi) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                (lo, hi)
            }
            TimeCondition::Or(l, r) => {
                let (llo, lhi) = l.window();
                let (rlo, rhi) = r.window();
                let lo = match (llo, rlo) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    _ => None,
                };
                let hi = match (lhi, rhi) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    _ => None,
                };
                (lo, hi)
            }
        }
    }
}

/// The shape of a single `s p o` pattern inside a `where {…}` clause.
/// Every position records either a concrete value or a binding, plus
/// the aliases the surface syntax can attach to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphClause {
    pub s: Option<Node>,
    pub s_binding: Option<String>,
    pub s_alias: Option<String>,
    pub s_type_alias: Option<String>,
    pub s_id_alias: Option<String>,

    pub p: Option<Predicate>,
    pub p_id: Option<String>,
    pub p_binding: Option<String>,
    pub p_alias: Option<String>,
    pub p_id_alias: Option<String>,
    pub p_anchor_binding: Option<String>,
    pub p_anchor_alias: Option<String>,
    pub p_lower_bound: Option<Anchor>,
    pub p_upper_bound: Option<Anchor>,
    pub p_lower_bound_alias: Option<String>,
    pub p_upper_bound_alias: Option<String>,
    pub p_temporal: bool,

    pub o: Option<Object>,
    pub o_id: Option<String>,
    pub o_binding: Option<String>,
    pub o_alias: Option<String>,
    pub o_type_alias: Option<String>,
    pub o_id_alias: Option<String>,
    pub o_anchor_binding: Option<String>,
    pub o_anchor_alias: Option<String>,
    pub o_lower_bound: Option<Anchor>,
    pub o_upper_bound: Option<Anchor>,
    pub o_lower_bound_alias: Option<String>,
    pub o_upper_bound_alias: Option<String>,
    pub o_temporal: bool,
}

impl GraphClause {
    /// Every binding name the clause mentions, deduplicated, in a
    /// stable field order.
    pub fn bindings(&self) -> Vec<String> {
        let fields = [
            &self.s_binding,
            &self.s_alias,
            &self.s_type_alias,
            &self.s_id_alias,
            &self.p_binding,
            &self.p_alias,
            &self.p_id_alias,
            &self.p_anchor_binding,
            &self.p_anchor_alias,
            &self.p_lower_bound_alias,
            &self.p_upper_bound_alias,
            &self.o_binding,
            &self.o_alias,
            &self.o_type_alias,
            &self.o_id_alias,
            &self.o_anchor_binding,
            &self.o_anchor_alias,
            &self.o_lower_bound_alias,
            &self.o_upper_bound_alias,
        ];
        let mut out = Vec::new();
        for b in fields.into_iter().flatten() {
            if !out.contains(b) {
                out.push(b.clone());
            }
        }
        out
    }
}

/// Refinement the next binding token attaches to, set by the `as`,
/// `type`, `id`, and `at` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Alias,
    TypeAlias,
    IdAlias,
    AnchorAlias,
}

/// Parse-time state shared by the semantic hooks.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkingState {
    pub clause: GraphClause,
    pub role: Option<Role>,
    pub data_subject: Option<Node>,
    pub data_predicate: Option<Predicate>,
    pub projection: Option<Projection>,
    pub projection_as: bool,
    pub having_tokens: Vec<Token>,
    pub global_tokens: Vec<Token>,
}

/// A parsed statement: the accumulator the grammar hooks write into,
/// and the read-only input the planner consumes.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    pub(crate) kind: StatementKind,
    pub(crate) graphs: Vec<String>,
    pub(crate) data: Vec<Triple>,
    pub(crate) pattern: Vec<GraphClause>,
    pub(crate) projection: Vec<Projection>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<OrderCondition>,
    pub(crate) having: Option<Expression>,
    pub(crate) global_bounds: Option<TimeCondition>,
    pub(crate) limit: Option<i64>,
    pub(crate) working: WorkingState,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// The kind of the statement.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The graph bindings the statement operates on.
    pub fn graphs(&self) -> &[String] {
        &self.graphs
    }

    /// The literal triples of an insert or delete statement.
    pub fn data(&self) -> &[Triple] {
        &self.data
    }

    /// The graph pattern clauses of a query.
    pub fn pattern_clauses(&self) -> &[GraphClause] {
        &self.pattern
    }

    /// The projection list of a query.
    pub fn projections(&self) -> &[Projection] {
        &self.projection
    }

    /// The `group by` bindings.
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    /// The `order by` conditions.
    pub fn order_by(&self) -> &[OrderCondition] {
        &self.order_by
    }

    /// The parsed `having` expression, if any.
    pub fn having(&self) -> Option<&Expression> {
        self.having.as_ref()
    }

    /// The parsed global time bounds, if any.
    pub fn global_bounds(&self) -> Option<&TimeCondition> {
        self.global_bounds.as_ref()
    }

    /// The row limit, if any.
    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// The graph clause currently being populated by the hooks.
    pub fn working_clause(&self) -> &GraphClause {
        &self.working.clause
    }

    /// Reset the working clause and its refinement state.
    pub fn reset_working_clause(&mut self) {
        self.working.clause = GraphClause::default();
        self.working.role = None;
    }

    /// The initial lookup options of the statement, folded from its
    /// global time bounds.
    pub fn lookup_options(&self) -> LookupOptions {
        let (lower_anchor, upper_anchor) = match &self.global_bounds {
            Some(tc) => tc.window(),
            None => (None, None),
        };
        LookupOptions {
            max_elements: None,
            lower_anchor,
            upper_anchor,
        }
    }
}
