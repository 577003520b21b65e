//! Semantic hooks fired by the grammar driver
//!
//! Each hook reads the consumed token or symbol and advances the
//! working state on the shared `Statement` accumulator. Errors raised
//! here abort parsing with a semantic error tagged with the offending
//! token.

use chronograph_core::{
    default_builder, parse_anchor, Anchor, Error, Literal, Node, Object, Predicate, Result, Triple,
};

use crate::grammar::{ConsumedElement, Symbol};
use crate::lexer::{Token, TokenKind};
use crate::semantic::{
    Aggregator, ComparisonOp, Expression, OrderCondition, Projection, Role, Statement,
    StatementKind, TimeCondition,
};

// ========== Statement kind ==========

pub fn stamp_query(st: &mut Statement, _: Symbol) -> Result<()> {
    st.kind = StatementKind::Query;
    Ok(())
}

pub fn stamp_insert(st: &mut Statement, _: Symbol) -> Result<()> {
    st.kind = StatementKind::Insert;
    Ok(())
}

pub fn stamp_delete(st: &mut Statement, _: Symbol) -> Result<()> {
    st.kind = StatementKind::Delete;
    Ok(())
}

pub fn stamp_create(st: &mut Statement, _: Symbol) -> Result<()> {
    st.kind = StatementKind::Create;
    Ok(())
}

pub fn stamp_drop(st: &mut Statement, _: Symbol) -> Result<()> {
    st.kind = StatementKind::Drop;
    Ok(())
}

// ========== Graph list ==========

/// Collects the graph bindings of the `from`/`into` list.
pub fn graph_accumulator(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    if let Some(tok) = ce.token() {
        if tok.kind == TokenKind::Binding {
            st.graphs.push(tok.text.clone());
        }
    }
    Ok(())
}

// ========== Insert / delete data ==========

fn finish_data_triple(st: &mut Statement, o: Object) -> Result<()> {
    let s = st
        .working
        .data_subject
        .take()
        .ok_or_else(|| Error::Internal("data triple finished without a subject".to_string()))?;
    let p = st
        .working
        .data_predicate
        .take()
        .ok_or_else(|| Error::Internal("data triple finished without a predicate".to_string()))?;
    st.data.push(Triple::new(s, p, o));
    Ok(())
}

/// Collects the literal triples of an insert or delete statement.
pub fn data_accumulator(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    let Some(tok) = ce.token() else { return Ok(()) };
    match tok.kind {
        TokenKind::Node => {
            let n = Node::parse(&tok.text)?;
            if st.working.data_subject.is_none() {
                st.working.data_subject = Some(n);
            } else {
                finish_data_triple(st, Object::Node(n))?;
            }
        }
        TokenKind::Predicate => {
            let p = Predicate::parse(&tok.text)?;
            if st.working.data_subject.is_some() && st.working.data_predicate.is_none() {
                st.working.data_predicate = Some(p);
            } else {
                finish_data_triple(st, Object::Predicate(p))?;
            }
        }
        TokenKind::Literal => {
            let l = default_builder().parse(&tok.text)?;
            finish_data_triple(st, Object::Literal(l))?;
        }
        _ => {}
    }
    Ok(())
}

// ========== Graph pattern clauses ==========

/// Begins the first working clause of a `where {…}` block.
pub fn where_init(st: &mut Statement, _: Symbol) -> Result<()> {
    st.reset_working_clause();
    Ok(())
}

/// Closes the working clause and appends it to the pattern list.
pub fn where_next(st: &mut Statement, _: Symbol) -> Result<()> {
    let cls = st.working.clause.clone();
    st.pattern.push(cls);
    st.reset_working_clause();
    Ok(())
}

/// A predicate token is either fully specified or carries a binding in
/// its anchor position.
enum PredicateForm {
    Concrete(Predicate),
    AnchorBinding { id: String, binding: String },
}

fn split_predicate_text(text: &str) -> Result<(&str, &str)> {
    let idx = text.find("\"@[").ok_or_else(|| {
        Error::Semantic(format!("malformed predicate token {text:?}"))
    })?;
    if !text.starts_with('"') || !text.ends_with(']') {
        return Err(Error::Semantic(format!("malformed predicate token {text:?}")));
    }
    Ok((&text[1..idx], &text[idx + 3..text.len() - 1]))
}

fn parse_predicate_token(text: &str) -> Result<PredicateForm> {
    let (id, anchor) = split_predicate_text(text)?;
    if anchor.trim_start().starts_with('?') {
        if id.is_empty() {
            return Err(Error::Semantic(format!(
                "predicate {text:?} has an empty id"
            )));
        }
        Ok(PredicateForm::AnchorBinding {
            id: id.to_string(),
            binding: anchor.trim().to_string(),
        })
    } else {
        Ok(PredicateForm::Concrete(Predicate::parse(text)?))
    }
}

/// One endpoint of a predicate bound.
enum BoundSpec {
    Open,
    Time(Anchor),
    Alias(String),
}

fn parse_bound_endpoint(raw: &str) -> Result<BoundSpec> {
    let mut s = raw.trim();
    s = s.strip_prefix('"').unwrap_or(s);
    s = s.strip_suffix('"').unwrap_or(s);
    if s.is_empty() {
        return Ok(BoundSpec::Open);
    }
    if s.starts_with('?') {
        return Ok(BoundSpec::Alias(s.to_string()));
    }
    Ok(BoundSpec::Time(parse_anchor(s)?))
}

fn parse_bound_token(text: &str) -> Result<(String, BoundSpec, BoundSpec)> {
    let (id, bounds) = split_predicate_text(text)?;
    if id.is_empty() {
        return Err(Error::Semantic(format!("predicate {text:?} has an empty id")));
    }
    let (lo_raw, hi_raw) = bounds.split_once(',').ok_or_else(|| {
        Error::Semantic(format!("malformed predicate bound {text:?}"))
    })?;
    let lo = parse_bound_endpoint(lo_raw)?;
    let hi = parse_bound_endpoint(hi_raw)?;
    if let (BoundSpec::Time(l), BoundSpec::Time(h)) = (&lo, &hi) {
        if l > h {
            return Err(Error::Semantic(format!(
                "inverted time bounds in {text:?}: lower bound is after upper bound"
            )));
        }
    }
    Ok((id.to_string(), lo, hi))
}

/// Populates the subject position of the working clause.
pub fn where_subject(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    let Some(tok) = ce.token() else { return Ok(()) };
    match tok.kind {
        TokenKind::Node => st.working.clause.s = Some(Node::parse(&tok.text)?),
        TokenKind::As => st.working.role = Some(Role::Alias),
        TokenKind::Type => st.working.role = Some(Role::TypeAlias),
        TokenKind::Id => st.working.role = Some(Role::IdAlias),
        TokenKind::Binding => {
            let b = Some(tok.text.clone());
            match st.working.role.take() {
                None => st.working.clause.s_binding = b,
                Some(Role::Alias) => st.working.clause.s_alias = b,
                Some(Role::TypeAlias) => st.working.clause.s_type_alias = b,
                Some(Role::IdAlias) => st.working.clause.s_id_alias = b,
                Some(Role::AnchorAlias) => {
                    return Err(Error::Internal(format!(
                        "anchor alias {} attached to a subject", tok.text
                    )))
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Populates the predicate position of the working clause.
pub fn where_predicate(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    let Some(tok) = ce.token() else { return Ok(()) };
    let cls = &mut st.working.clause;
    match tok.kind {
        TokenKind::Predicate => match parse_predicate_token(&tok.text)? {
            PredicateForm::Concrete(p) => {
                cls.p_temporal = p.is_temporal();
                cls.p = Some(p);
            }
            PredicateForm::AnchorBinding { id, binding } => {
                cls.p_id = Some(id);
                cls.p_anchor_binding = Some(binding);
                cls.p_temporal = true;
            }
        },
        TokenKind::PredicateBound => {
            let (id, lo, hi) = parse_bound_token(&tok.text)?;
            cls.p_id = Some(id);
            cls.p_temporal = true;
            match lo {
                BoundSpec::Open => {}
                BoundSpec::Time(t) => cls.p_lower_bound = Some(t),
                BoundSpec::Alias(b) => cls.p_lower_bound_alias = Some(b),
            }
            match hi {
                BoundSpec::Open => {}
                BoundSpec::Time(t) => cls.p_upper_bound = Some(t),
                BoundSpec::Alias(b) => cls.p_upper_bound_alias = Some(b),
            }
        }
        TokenKind::As => st.working.role = Some(Role::Alias),
        TokenKind::Id => st.working.role = Some(Role::IdAlias),
        TokenKind::At | TokenKind::Comma => st.working.role = Some(Role::AnchorAlias),
        TokenKind::Binding => {
            let b = Some(tok.text.clone());
            match st.working.role.take() {
                None => cls.p_binding = b,
                Some(Role::Alias) => cls.p_alias = b,
                Some(Role::IdAlias) => cls.p_id_alias = b,
                Some(Role::AnchorAlias) => {
                    if cls.p_anchor_alias.is_some() {
                        return Err(Error::Semantic(format!(
                            "anchor alias {} conflicts with an existing anchor alias",
                            tok.text
                        )));
                    }
                    cls.p_anchor_alias = b;
                }
                Some(Role::TypeAlias) => {
                    return Err(Error::Internal(format!(
                        "type alias {} attached to a predicate", tok.text
                    )))
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Populates the object position of the working clause.
pub fn where_object(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    let Some(tok) = ce.token() else { return Ok(()) };
    let cls = &mut st.working.clause;
    match tok.kind {
        TokenKind::Node => cls.o = Some(Object::Node(Node::parse(&tok.text)?)),
        TokenKind::Literal => {
            cls.o = Some(Object::Literal(default_builder().parse(&tok.text)?))
        }
        TokenKind::Predicate => match parse_predicate_token(&tok.text)? {
            PredicateForm::Concrete(p) => {
                cls.o_temporal = p.is_temporal();
                cls.o = Some(Object::Predicate(p));
            }
            PredicateForm::AnchorBinding { id, binding } => {
                cls.o_id = Some(id);
                cls.o_anchor_binding = Some(binding);
                cls.o_temporal = true;
            }
        },
        TokenKind::PredicateBound => {
            let (id, lo, hi) = parse_bound_token(&tok.text)?;
            cls.o_id = Some(id);
            cls.o_temporal = true;
            match lo {
                BoundSpec::Open => {}
                BoundSpec::Time(t) => cls.o_lower_bound = Some(t),
                BoundSpec::Alias(b) => cls.o_lower_bound_alias = Some(b),
            }
            match hi {
                BoundSpec::Open => {}
                BoundSpec::Time(t) => cls.o_upper_bound = Some(t),
                BoundSpec::Alias(b) => cls.o_upper_bound_alias = Some(b),
            }
        }
        TokenKind::As => st.working.role = Some(Role::Alias),
        TokenKind::Type => st.working.role = Some(Role::TypeAlias),
        TokenKind::Id => st.working.role = Some(Role::IdAlias),
        TokenKind::At | TokenKind::Comma => st.working.role = Some(Role::AnchorAlias),
        TokenKind::Binding => {
            let b = Some(tok.text.clone());
            match st.working.role.take() {
                None => cls.o_binding = b,
                Some(Role::Alias) => cls.o_alias = b,
                Some(Role::TypeAlias) => cls.o_type_alias = b,
                Some(Role::IdAlias) => cls.o_id_alias = b,
                Some(Role::AnchorAlias) => {
                    if cls.o_anchor_alias.is_some() {
                        return Err(Error::Semantic(format!(
                            "anchor alias {} conflicts with an existing anchor alias",
                            tok.text
                        )));
                    }
                    cls.o_anchor_alias = b;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

// ========== Projection ==========

/// Builds the working projection entry token by token.
pub fn projection(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    let Some(tok) = ce.token() else { return Ok(()) };
    match tok.kind {
        TokenKind::Count => {
            st.working.projection = Some(Projection {
                aggregator: Some(Aggregator::Count),
                ..Default::default()
            })
        }
        TokenKind::Sum => {
            st.working.projection = Some(Projection {
                aggregator: Some(Aggregator::Sum),
                ..Default::default()
            })
        }
        TokenKind::Distinct => {
            if let Some(p) = &mut st.working.projection {
                p.distinct = true;
            }
        }
        TokenKind::As => st.working.projection_as = true,
        TokenKind::Binding => match &mut st.working.projection {
            None => {
                st.working.projection = Some(Projection {
                    binding: tok.text.clone(),
                    ..Default::default()
                })
            }
            Some(p) => {
                if st.working.projection_as {
                    p.alias = Some(tok.text.clone());
                } else if p.binding.is_empty() {
                    p.binding = tok.text.clone();
                } else {
                    return Err(Error::Internal(format!(
                        "unexpected projection binding {}", tok.text
                    )));
                }
            }
        },
        _ => {}
    }
    Ok(())
}

/// Closes the working projection entry.
pub fn projection_finish(st: &mut Statement, _: Symbol) -> Result<()> {
    let p = st
        .working
        .projection
        .take()
        .ok_or_else(|| Error::Internal("projection finished without an entry".to_string()))?;
    if p.binding.is_empty() {
        return Err(Error::Internal("projection finished without a binding".to_string()));
    }
    st.working.projection_as = false;
    st.projection.push(p);
    Ok(())
}

// ========== Group by / order by ==========

pub fn group_by(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    if let Some(tok) = ce.token() {
        if tok.kind == TokenKind::Binding {
            st.group_by.push(tok.text.clone());
        }
    }
    Ok(())
}

pub fn order_by(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    let Some(tok) = ce.token() else { return Ok(()) };
    match tok.kind {
        TokenKind::Binding => st.order_by.push(OrderCondition {
            binding: tok.text.clone(),
            descending: false,
        }),
        TokenKind::Desc => {
            if let Some(last) = st.order_by.last_mut() {
                last.descending = true;
            }
        }
        _ => {}
    }
    Ok(())
}

// ========== Having ==========

/// Accumulates the tokens of a `having` expression.
pub fn having_collect(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    if let Some(tok) = ce.token() {
        st.working.having_tokens.push(tok.clone());
    }
    Ok(())
}

/// Builds the expression tree once the `having` clause closes.
pub fn having_finish(st: &mut Statement, _: Symbol) -> Result<()> {
    let tokens = std::mem::take(&mut st.working.having_tokens);
    let mut pos = 0;
    let expr = parse_having_expr(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(Error::Internal("trailing tokens in having expression".to_string()));
    }
    st.having = Some(expr);
    Ok(())
}

fn parse_having_expr(toks: &[Token], pos: &mut usize) -> Result<Expression> {
    let mut lhs = parse_having_term(toks, pos)?;
    loop {
        match toks.get(*pos).map(|t| t.kind) {
            Some(TokenKind::And) => {
                *pos += 1;
                let rhs = parse_having_term(toks, pos)?;
                lhs = Expression::And(Box::new(lhs), Box::new(rhs));
            }
            Some(TokenKind::Or) => {
                *pos += 1;
                let rhs = parse_having_term(toks, pos)?;
                lhs = Expression::Or(Box::new(lhs), Box::new(rhs));
            }
            _ => return Ok(lhs),
        }
    }
}

fn parse_having_term(toks: &[Token], pos: &mut usize) -> Result<Expression> {
    let unexpected = || Error::Internal("malformed having expression".to_string());
    let tok = toks.get(*pos).ok_or_else(unexpected)?;
    match tok.kind {
        TokenKind::Not => {
            *pos += 1;
            Ok(Expression::Not(Box::new(parse_having_term(toks, pos)?)))
        }
        TokenKind::LParen => {
            *pos += 1;
            let e = parse_having_expr(toks, pos)?;
            match toks.get(*pos).map(|t| t.kind) {
                Some(TokenKind::RParen) => {
                    *pos += 1;
                    Ok(e)
                }
                _ => Err(unexpected()),
            }
        }
        TokenKind::Binding => {
            let lhs = tok.text.clone();
            *pos += 1;
            let op = match toks.get(*pos).map(|t| t.kind) {
                Some(TokenKind::Lt) => ComparisonOp::Lt,
                Some(TokenKind::Gt) => ComparisonOp::Gt,
                Some(TokenKind::Eq) => ComparisonOp::Eq,
                _ => return Ok(Expression::Binding(lhs)),
            };
            *pos += 1;
            let rhs = toks.get(*pos).ok_or_else(unexpected)?;
            if rhs.kind != TokenKind::Binding {
                return Err(unexpected());
            }
            *pos += 1;
            Ok(Expression::Comparison {
                op,
                lhs,
                rhs: rhs.text.clone(),
            })
        }
        _ => Err(unexpected()),
    }
}

// ========== Global time bounds ==========

/// Accumulates the tokens of the global time bound expression.
pub fn global_collect(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    if let Some(tok) = ce.token() {
        st.working.global_tokens.push(tok.clone());
    }
    Ok(())
}

/// Builds the time condition tree once the bounds close.
pub fn global_finish(st: &mut Statement, _: Symbol) -> Result<()> {
    let tokens = std::mem::take(&mut st.working.global_tokens);
    let mut pos = 0;
    let tc = parse_time_expr(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(Error::Internal("trailing tokens in global time bounds".to_string()));
    }
    st.global_bounds = Some(tc);
    Ok(())
}

fn anchor_of(text: &str) -> Result<Anchor> {
    let p = Predicate::parse(text)?;
    Ok(*p.time_anchor()?)
}

fn parse_time_expr(toks: &[Token], pos: &mut usize) -> Result<TimeCondition> {
    let mut lhs = parse_time_term(toks, pos)?;
    loop {
        match toks.get(*pos).map(|t| t.kind) {
            Some(TokenKind::And) => {
                *pos += 1;
                let rhs = parse_time_term(toks, pos)?;
                lhs = TimeCondition::And(Box::new(lhs), Box::new(rhs));
            }
            Some(TokenKind::Or) => {
                *pos += 1;
                let rhs = parse_time_term(toks, pos)?;
                lhs = TimeCondition::Or(Box::new(lhs), Box::new(rhs));
            }
            _ => return Ok(lhs),
        }
    }
}

fn parse_time_term(toks: &[Token], pos: &mut usize) -> Result<TimeCondition> {
    let unexpected = || Error::Internal("malformed global time bounds".to_string());
    let expect_predicate = |toks: &[Token], pos: &mut usize| -> Result<Anchor> {
        let tok = toks.get(*pos).ok_or_else(unexpected)?;
        if tok.kind != TokenKind::Predicate {
            return Err(unexpected());
        }
        *pos += 1;
        anchor_of(&tok.text)
    };
    let tok = toks.get(*pos).ok_or_else(unexpected)?;
    match tok.kind {
        TokenKind::LParen => {
            *pos += 1;
            let e = parse_time_expr(toks, pos)?;
            match toks.get(*pos).map(|t| t.kind) {
                Some(TokenKind::RParen) => {
                    *pos += 1;
                    Ok(e)
                }
                _ => Err(unexpected()),
            }
        }
        TokenKind::Before => {
            *pos += 1;
            Ok(TimeCondition::Before(expect_predicate(toks, pos)?))
        }
        TokenKind::After => {
            *pos += 1;
            Ok(TimeCondition::After(expect_predicate(toks, pos)?))
        }
        TokenKind::Between => {
            *pos += 1;
            let lo = expect_predicate(toks, pos)?;
            match toks.get(*pos).map(|t| t.kind) {
                Some(TokenKind::Comma) => *pos += 1,
                _ => return Err(unexpected()),
            }
            let hi = expect_predicate(toks, pos)?;
            if lo > hi {
                return Err(Error::Semantic(
                    "inverted global time bounds: lower bound is after upper bound".to_string(),
                ));
            }
            Ok(TimeCondition::Between(lo, hi))
        }
        _ => Err(unexpected()),
    }
}

// ========== Limit ==========

/// Records the row limit; only typed int64 literals are accepted.
pub fn limit(st: &mut Statement, ce: &ConsumedElement) -> Result<()> {
    let Some(tok) = ce.token() else { return Ok(()) };
    if tok.kind != TokenKind::Literal {
        return Ok(());
    }
    match default_builder().parse(&tok.text)? {
        Literal::Int64(n) => {
            st.limit = Some(n);
            Ok(())
        }
        other => Err(Error::Semantic(format!(
            "limit requires an int64 literal, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{semantic_tql, Llk, Parser};
    use crate::semantic::GraphClause;
    use chronograph_core::parse_anchor;

    fn parse(input: &str) -> Result<Statement> {
        let parser = Parser::new(semantic_tql())?;
        let mut st = Statement::new();
        parser.parse(&mut Llk::new(input, 1), &mut st)?;
        Ok(st)
    }

    #[test]
    fn test_query_statement_shape() {
        let st = parse("select ?a from ?b where{?s ?p ?o};").unwrap();
        assert_eq!(st.kind(), StatementKind::Query);
        assert_eq!(st.graphs(), ["?b"]);
        assert_eq!(st.pattern_clauses().len(), 1);
        let cls = &st.pattern_clauses()[0];
        assert_eq!(cls.s_binding.as_deref(), Some("?s"));
        assert_eq!(cls.p_binding.as_deref(), Some("?p"));
        assert_eq!(cls.o_binding.as_deref(), Some("?o"));
    }

    #[test]
    fn test_empty_where_rejected() {
        assert!(parse("select ?a from ?b where{};").is_err());
    }

    #[test]
    fn test_insert_accumulates_graphs_and_data() {
        let st = parse("insert data into ?a {/_<foo> \"bar\"@[] /_<foo>};").unwrap();
        assert_eq!(st.kind(), StatementKind::Insert);
        assert_eq!(st.graphs().len(), 1);
        assert_eq!(st.data().len(), 1);
        let t = &st.data()[0];
        assert_eq!(t.s().to_string(), "/_<foo>");
        assert_eq!(t.p().to_string(), "\"bar\"@[]");
        assert_eq!(t.o().to_string(), "/_<foo>");
    }

    #[test]
    fn test_multi_graph_insert() {
        let st = parse("insert data into ?a,?b,?c {/_<foo> \"bar\"@[] /_<foo>};").unwrap();
        assert_eq!(st.graphs().len(), 3);
        assert_eq!(st.data().len(), 1);
    }

    #[test]
    fn test_multi_triple_data() {
        let st = parse(
            "insert data into ?a {/_<foo> \"bar\"@[] /_<foo> .
                                  /_<foo> \"bar\"@[] \"bar\"@[1975-01-01T00:01:01.999999999Z] .
                                  /_<foo> \"bar\"@[] \"yeah\"^^type:text};",
        )
        .unwrap();
        assert_eq!(st.graphs().len(), 1);
        assert_eq!(st.data().len(), 3);
    }

    #[test]
    fn test_delete_statement() {
        let st = parse("delete data from ?a,?b,?c {/_<foo> \"bar\"@[] /_<foo>};").unwrap();
        assert_eq!(st.kind(), StatementKind::Delete);
        assert_eq!(st.graphs().len(), 3);
        assert_eq!(st.data().len(), 1);
    }

    #[test]
    fn test_create_and_drop() {
        let st = parse("create graph ?foo;").unwrap();
        assert_eq!(st.kind(), StatementKind::Create);
        assert_eq!(st.graphs(), ["?foo"]);

        let st = parse("drop graph ?foo, ?bar;").unwrap();
        assert_eq!(st.kind(), StatementKind::Drop);
        assert_eq!(st.graphs(), ["?foo", "?bar"]);
    }

    #[test]
    fn test_subject_refinements() {
        let st = parse("select ?a from ?b where{/_<foo> as ?bar type ?bar2 id ?bar3 ?p ?o};")
            .unwrap();
        let cls = &st.pattern_clauses()[0];
        let want = GraphClause {
            s: Some(Node::parse("/_<foo>").unwrap()),
            s_alias: Some("?bar".to_string()),
            s_type_alias: Some("?bar2".to_string()),
            s_id_alias: Some("?bar3".to_string()),
            p_binding: Some("?p".to_string()),
            o_binding: Some("?o".to_string()),
            ..Default::default()
        };
        assert_eq!(cls, &want);
    }

    #[test]
    fn test_predicate_refinements() {
        let st = parse(
            "select ?s from ?g where{?s \"foo\"@[2015-07-19T13:12:04.669618843-07:00] as ?bar id ?bar2 at ?bar3 ?o};",
        )
        .unwrap();
        let cls = &st.pattern_clauses()[0];
        let p = Predicate::parse("\"foo\"@[2015-07-19T13:12:04.669618843-07:00]").unwrap();
        assert_eq!(cls.p, Some(p));
        assert!(cls.p_temporal);
        assert_eq!(cls.p_alias.as_deref(), Some("?bar"));
        assert_eq!(cls.p_id_alias.as_deref(), Some("?bar2"));
        assert_eq!(cls.p_anchor_alias.as_deref(), Some("?bar3"));
    }

    #[test]
    fn test_predicate_with_anchor_binding() {
        let st = parse("select ?s from ?g where{?s \"foo\"@[?when] ?o};").unwrap();
        let cls = &st.pattern_clauses()[0];
        assert_eq!(cls.p, None);
        assert_eq!(cls.p_id.as_deref(), Some("foo"));
        assert_eq!(cls.p_anchor_binding.as_deref(), Some("?when"));
        assert!(cls.p_temporal);
    }

    #[test]
    fn test_predicate_bound_with_aliases() {
        let st = parse("select ?s from ?g where{?s \"foo\"@[?lower,?upper] ?o};").unwrap();
        let cls = &st.pattern_clauses()[0];
        assert_eq!(cls.p_id.as_deref(), Some("foo"));
        assert_eq!(cls.p_lower_bound_alias.as_deref(), Some("?lower"));
        assert_eq!(cls.p_upper_bound_alias.as_deref(), Some("?upper"));
        assert!(cls.p_temporal);
    }

    #[test]
    fn test_predicate_bound_with_dates() {
        let st = parse(
            "select ?s from ?g where{?s \"foo\"@[2015-07-19T13:12:04.669618843-07:00, 2016-07-19T13:12:04.669618843-07:00] ?o};",
        )
        .unwrap();
        let cls = &st.pattern_clauses()[0];
        assert_eq!(cls.p_id.as_deref(), Some("foo"));
        assert_eq!(
            cls.p_lower_bound,
            Some(parse_anchor("2015-07-19T13:12:04.669618843-07:00").unwrap())
        );
        assert_eq!(
            cls.p_upper_bound,
            Some(parse_anchor("2016-07-19T13:12:04.669618843-07:00").unwrap())
        );
    }

    #[test]
    fn test_predicate_bound_mixing_date_and_alias() {
        let st = parse(
            "select ?s from ?g where{?s \"foo\"@[?low, 2016-07-19T13:12:04.669618843-07:00] ?o};",
        )
        .unwrap();
        let cls = &st.pattern_clauses()[0];
        assert_eq!(cls.p_lower_bound_alias.as_deref(), Some("?low"));
        assert!(cls.p_upper_bound.is_some());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = parse(
            "select ?s from ?b where{/_<foo> as ?s \"id\"@[2018-07-19T13:12:04.669618843-07:00, 2015-07-19T13:12:04.669618843-07:00] ?o};",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Semantic(_)), "got {err:?}");
    }

    #[test]
    fn test_object_predicate_refinements() {
        let st = parse(
            "select ?s from ?g where{/_<foo> as ?s ?p \"foo\"@[2015-07-19T13:12:04.669618843-07:00] as ?bar id ?bar2 at ?bar3};",
        )
        .unwrap();
        let cls = &st.pattern_clauses()[0];
        let p = Predicate::parse("\"foo\"@[2015-07-19T13:12:04.669618843-07:00]").unwrap();
        assert_eq!(cls.o, Some(Object::Predicate(p)));
        assert!(cls.o_temporal);
        assert_eq!(cls.o_alias.as_deref(), Some("?bar"));
        assert_eq!(cls.o_id_alias.as_deref(), Some("?bar2"));
        assert_eq!(cls.o_anchor_alias.as_deref(), Some("?bar3"));
    }

    #[test]
    fn test_object_literal_with_alias() {
        let st = parse("select ?s from ?g where{?s ?p \"1\"^^type:int64 as ?bar};").unwrap();
        let cls = &st.pattern_clauses()[0];
        assert_eq!(cls.o, Some(Object::Literal(Literal::Int64(1))));
        assert_eq!(cls.o_alias.as_deref(), Some("?bar"));
    }

    #[test]
    fn test_object_bound_with_aliases() {
        let st = parse("select ?s from ?g where{?s ?p \"foo\"@[?lower,?upper] as ?x};").unwrap();
        let cls = &st.pattern_clauses()[0];
        assert_eq!(cls.o_id.as_deref(), Some("foo"));
        assert_eq!(cls.o_lower_bound_alias.as_deref(), Some("?lower"));
        assert_eq!(cls.o_upper_bound_alias.as_deref(), Some("?upper"));
        assert_eq!(cls.o_alias.as_deref(), Some("?x"));
        assert!(cls.o_temporal);
    }

    #[test]
    fn test_mistyped_literal_rejected() {
        let err = parse("select ?s from ?g where{?s ?p \"true\"^^type:int64};").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }), "got {err:?}");
    }

    #[test]
    fn test_second_anchor_alias_rejected() {
        let err =
            parse("select ?a from ?b where{?s \"foo\"@[,] as ?x id ?y at ?z, ?zz ?o};").unwrap_err();
        assert!(matches!(err, Error::Semantic(_)), "got {err:?}");
    }

    #[test]
    fn test_projections() {
        let st = parse(
            "select ?a, ?b as ?c, count(?d) as ?e, count(distinct ?f) as ?g, sum(?h) as ?i from ?j where{?s ?p ?o};",
        )
        .unwrap();
        let ps = st.projections();
        assert_eq!(ps.len(), 5);
        assert_eq!(ps[0].binding, "?a");
        assert_eq!(ps[1].alias.as_deref(), Some("?c"));
        assert_eq!(ps[2].aggregator, Some(Aggregator::Count));
        assert!(ps[3].distinct);
        assert_eq!(ps[4].aggregator, Some(Aggregator::Sum));
        assert_eq!(ps[4].binding, "?h");
        assert_eq!(ps[4].alias.as_deref(), Some("?i"));
    }

    #[test]
    fn test_group_and_order_by() {
        let st = parse(
            "select ?a from ?b where{?s ?p ?o} group by ?a, ?b order by ?a desc, ?b, ?c asc;",
        )
        .unwrap();
        assert_eq!(st.group_by(), ["?a", "?b"]);
        let ob = st.order_by();
        assert_eq!(ob.len(), 3);
        assert!(ob[0].descending);
        assert!(!ob[1].descending);
        assert!(!ob[2].descending);
    }

    #[test]
    fn test_having_expression_tree() {
        let st = parse("select ?a from ?b where {?a ?p ?o} having (?b and ?c) or not (?d = ?e);")
            .unwrap();
        let want = Expression::Or(
            Box::new(Expression::And(
                Box::new(Expression::Binding("?b".to_string())),
                Box::new(Expression::Binding("?c".to_string())),
            )),
            Box::new(Expression::Not(Box::new(Expression::Comparison {
                op: ComparisonOp::Eq,
                lhs: "?d".to_string(),
                rhs: "?e".to_string(),
            }))),
        );
        assert_eq!(st.having(), Some(&want));
    }

    #[test]
    fn test_global_bounds_window() {
        let st = parse(
            "select ?a from ?b where {?s ?p ?o} between \"foo\"@[2014-01-01T00:00:00Z], \"foo\"@[2016-01-01T00:00:00Z] and after \"foo\"@[2015-01-01T00:00:00Z];",
        )
        .unwrap();
        let lo = st.lookup_options();
        assert_eq!(lo.lower_anchor, Some(parse_anchor("2015-01-01T00:00:00Z").unwrap()));
        assert_eq!(lo.upper_anchor, Some(parse_anchor("2016-01-01T00:00:00Z").unwrap()));
    }

    #[test]
    fn test_global_bound_on_immutable_predicate_rejected() {
        let err = parse("select ?a from ?b where {?s ?p ?o} before \"foo\"@[];").unwrap_err();
        assert!(matches!(err, Error::Semantic(_)), "got {err:?}");
    }

    #[test]
    fn test_inverted_global_between_rejected() {
        let err = parse(
            "select ?a from ?b where {?s ?p ?o} between \"foo\"@[2016-01-01T00:00:00Z], \"foo\"@[2014-01-01T00:00:00Z];",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Semantic(_)), "got {err:?}");
    }

    #[test]
    fn test_limit_accepts_only_int64() {
        let st = parse("select ?a from ?b where {?s ?p ?o} limit \"10\"^^type:int64;").unwrap();
        assert_eq!(st.limit(), Some(10));
        let err =
            parse("select ?a from ?b where {?s ?p ?o} limit \"ten\"^^type:text;").unwrap_err();
        assert!(matches!(err, Error::Semantic(_)), "got {err:?}");
    }

    #[test]
    fn test_well_typed_literal_accepted() {
        assert!(parse("select ?s from ?g where{?s ?p \"1\"^^type:int64};").is_ok());
    }

    #[test]
    fn test_clause_bindings_include_bound_aliases() {
        let st = parse("select ?s from ?g where{?s \"foo\"@[?lower,?upper] at ?a ?o};").unwrap();
        let bs = st.pattern_clauses()[0].bindings();
        for b in ["?s", "?lower", "?upper", "?a", "?o"] {
            assert!(bs.contains(&b.to_string()), "missing {b} in {bs:?}");
        }
    }
}
