//! TQL grammar and LL(k) driver
//!
//! The grammar is a table of productions per symbol. The driver picks
//! a production by bounded lookahead, consumes tokens, and fires the
//! semantic hooks attached to each production: a start and end hook
//! once per production, and an element hook once per consumed token or
//! fully derived symbol. `tql()` exposes the pure syntax;
//! `semantic_tql()` attaches the hooks.

use std::collections::{HashMap, VecDeque};

use chronograph_core::{Error, Result};

use crate::hooks;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::semantic::Statement;

/// A grammar symbol name.
pub type Symbol = &'static str;

/// One element of a production body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Token(TokenKind),
    Symbol(Symbol),
}

/// An element the driver has consumed, as handed to element hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumedElement {
    Token(Token),
    Symbol(Symbol),
}

impl ConsumedElement {
    /// The consumed token, if the element is one.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ConsumedElement::Token(t) => Some(t),
            ConsumedElement::Symbol(_) => None,
        }
    }

    /// The derived symbol, if the element is one.
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            ConsumedElement::Token(_) => None,
            ConsumedElement::Symbol(s) => Some(s),
        }
    }
}

/// Hook fired once when a production is entered or left.
pub type ClauseHook = fn(&mut Statement, Symbol) -> Result<()>;

/// Hook fired once per consumed token or symbol of a production.
pub type ElementHook = fn(&mut Statement, &ConsumedElement) -> Result<()>;

/// One production of a grammar symbol. An empty body is ε.
pub struct Production {
    elements: Vec<Element>,
    start: Option<ClauseHook>,
    end: Option<ClauseHook>,
    element: Option<ElementHook>,
}

/// A table-driven grammar: productions per symbol.
pub struct Grammar {
    rules: HashMap<Symbol, Vec<Production>>,
}

fn tk(k: TokenKind) -> Element {
    Element::Token(k)
}

fn sym(s: Symbol) -> Element {
    Element::Symbol(s)
}

fn prod(elements: Vec<Element>) -> Production {
    Production {
        elements,
        start: None,
        end: None,
        element: None,
    }
}

fn empty() -> Production {
    prod(vec![])
}

impl Grammar {
    fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    fn rule(&mut self, s: Symbol, prods: Vec<Production>) {
        self.rules.insert(s, prods);
    }

    /// Attach an element hook to every production of a symbol.
    pub fn set_element_hook(&mut self, s: Symbol, h: ElementHook) {
        if let Some(prods) = self.rules.get_mut(s) {
            for p in prods {
                p.element = Some(h);
            }
        }
    }

    /// Attach a start hook to one production of a symbol.
    pub fn set_start_hook(&mut self, s: Symbol, idx: usize, h: ClauseHook) {
        if let Some(p) = self.rules.get_mut(s).and_then(|ps| ps.get_mut(idx)) {
            p.start = Some(h);
        }
    }

    /// Attach an end hook to one production of a symbol.
    pub fn set_end_hook(&mut self, s: Symbol, idx: usize, h: ClauseHook) {
        if let Some(p) = self.rules.get_mut(s).and_then(|ps| ps.get_mut(idx)) {
            p.end = Some(h);
        }
    }

    fn productions(&self, s: Symbol) -> Result<&[Production]> {
        self.rules
            .get(s)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Internal(format!("grammar has no symbol {s}")))
    }

    fn production_nullable(&self, p: &Production) -> bool {
        p.elements.iter().all(|e| match e {
            Element::Token(_) => false,
            Element::Symbol(s) => self.symbol_nullable(s),
        })
    }

    fn symbol_nullable(&self, s: Symbol) -> bool {
        self.rules
            .get(s)
            .is_some_and(|ps| ps.iter().any(|p| self.production_nullable(p)))
    }

    fn production_can_start(&self, p: &Production, k: TokenKind) -> bool {
        for e in &p.elements {
            match e {
                Element::Token(t) => return *t == k,
                Element::Symbol(s) => {
                    if self.symbol_can_start(s, k) {
                        return true;
                    }
                    if !self.symbol_nullable(s) {
                        return false;
                    }
                }
            }
        }
        false
    }

    fn symbol_can_start(&self, s: Symbol, k: TokenKind) -> bool {
        self.rules
            .get(s)
            .is_some_and(|ps| ps.iter().any(|p| self.production_can_start(p, k)))
    }

    fn first_tokens_of(&self, s: Symbol, out: &mut Vec<TokenKind>) {
        let Some(prods) = self.rules.get(s) else { return };
        for p in prods {
            for e in &p.elements {
                match e {
                    Element::Token(t) => {
                        if !out.contains(t) {
                            out.push(*t);
                        }
                        break;
                    }
                    Element::Symbol(inner) => {
                        self.first_tokens_of(inner, out);
                        if !self.symbol_nullable(inner) {
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// The pure TQL grammar, no semantic hooks attached.
pub fn tql() -> Grammar {
    use TokenKind as T;
    let mut g = Grammar::new();

    g.rule(
        "START",
        vec![
            prod(vec![
                tk(T::Select),
                sym("PROJECTION"),
                tk(T::From),
                sym("GRAPHS"),
                tk(T::Where),
                tk(T::LBrace),
                sym("CLAUSES"),
                tk(T::RBrace),
                sym("GROUP_BY"),
                sym("ORDER_BY"),
                sym("HAVING"),
                sym("GLOBAL_BOUNDS"),
                sym("LIMIT"),
                tk(T::Semicolon),
            ]),
            prod(vec![
                tk(T::Insert),
                tk(T::Data),
                tk(T::Into),
                sym("GRAPHS"),
                tk(T::LBrace),
                sym("DATA"),
                tk(T::RBrace),
                tk(T::Semicolon),
            ]),
            prod(vec![
                tk(T::Delete),
                tk(T::Data),
                tk(T::From),
                sym("GRAPHS"),
                tk(T::LBrace),
                sym("DATA"),
                tk(T::RBrace),
                tk(T::Semicolon),
            ]),
            prod(vec![tk(T::Create), tk(T::Graph), sym("GRAPHS"), tk(T::Semicolon)]),
            prod(vec![tk(T::Drop), tk(T::Graph), sym("GRAPHS"), tk(T::Semicolon)]),
        ],
    );

    // Projection list.
    g.rule("PROJECTION", vec![prod(vec![sym("PROJ"), sym("MORE_PROJ")])]);
    g.rule(
        "MORE_PROJ",
        vec![prod(vec![tk(T::Comma), sym("PROJ"), sym("MORE_PROJ")]), empty()],
    );
    g.rule(
        "PROJ",
        vec![
            prod(vec![tk(T::Binding), sym("PROJ_AS")]),
            prod(vec![
                tk(T::Count),
                tk(T::LParen),
                sym("PROJ_ARG"),
                tk(T::RParen),
                tk(T::As),
                tk(T::Binding),
            ]),
            prod(vec![
                tk(T::Sum),
                tk(T::LParen),
                tk(T::Binding),
                tk(T::RParen),
                tk(T::As),
                tk(T::Binding),
            ]),
        ],
    );
    g.rule(
        "PROJ_ARG",
        vec![prod(vec![tk(T::Distinct), tk(T::Binding)]), prod(vec![tk(T::Binding)])],
    );
    g.rule("PROJ_AS", vec![prod(vec![tk(T::As), tk(T::Binding)]), empty()]);

    // Graph list.
    g.rule("GRAPHS", vec![prod(vec![tk(T::Binding), sym("MORE_GRAPHS")])]);
    g.rule(
        "MORE_GRAPHS",
        vec![prod(vec![tk(T::Comma), tk(T::Binding), sym("MORE_GRAPHS")]), empty()],
    );

    // Graph pattern clauses.
    g.rule("CLAUSES", vec![prod(vec![sym("CLAUSE"), sym("MORE_CLAUSES")])]);
    g.rule(
        "MORE_CLAUSES",
        vec![prod(vec![tk(T::Dot), sym("CLAUSE"), sym("MORE_CLAUSES")]), empty()],
    );
    g.rule("CLAUSE", vec![prod(vec![sym("SUBJECT"), sym("PREDICATE"), sym("OBJECT")])]);

    g.rule(
        "SUBJECT",
        vec![
            prod(vec![tk(T::Node), sym("SUBJECT_AS"), sym("SUBJECT_TYPE"), sym("SUBJECT_ID")]),
            prod(vec![tk(T::Binding), sym("SUBJECT_AS"), sym("SUBJECT_TYPE"), sym("SUBJECT_ID")]),
        ],
    );
    g.rule("SUBJECT_AS", vec![prod(vec![tk(T::As), tk(T::Binding)]), empty()]);
    g.rule("SUBJECT_TYPE", vec![prod(vec![tk(T::Type), tk(T::Binding)]), empty()]);
    g.rule("SUBJECT_ID", vec![prod(vec![tk(T::Id), tk(T::Binding)]), empty()]);

    let predicate_tail = || vec![sym("PREDICATE_AS"), sym("PREDICATE_ID"), sym("PREDICATE_AT")];
    g.rule(
        "PREDICATE",
        vec![
            prod([vec![tk(T::Predicate)], predicate_tail()].concat()),
            prod([vec![tk(T::PredicateBound)], predicate_tail()].concat()),
            prod([vec![tk(T::Binding)], predicate_tail()].concat()),
        ],
    );
    g.rule("PREDICATE_AS", vec![prod(vec![tk(T::As), tk(T::Binding)]), empty()]);
    g.rule("PREDICATE_ID", vec![prod(vec![tk(T::Id), tk(T::Binding)]), empty()]);
    g.rule(
        "PREDICATE_AT",
        vec![prod(vec![tk(T::At), tk(T::Binding), sym("PREDICATE_AT_TAIL")]), empty()],
    );
    g.rule(
        "PREDICATE_AT_TAIL",
        vec![prod(vec![tk(T::Comma), tk(T::Binding)]), empty()],
    );

    let object_tail =
        || vec![sym("OBJECT_AS"), sym("OBJECT_TYPE"), sym("OBJECT_ID"), sym("OBJECT_AT")];
    g.rule(
        "OBJECT",
        vec![
            prod([vec![tk(T::Node)], object_tail()].concat()),
            prod([vec![tk(T::Binding)], object_tail()].concat()),
            prod([vec![tk(T::Predicate)], object_tail()].concat()),
            prod([vec![tk(T::PredicateBound)], object_tail()].concat()),
            prod([vec![tk(T::Literal)], object_tail()].concat()),
        ],
    );
    g.rule("OBJECT_AS", vec![prod(vec![tk(T::As), tk(T::Binding)]), empty()]);
    g.rule("OBJECT_TYPE", vec![prod(vec![tk(T::Type), tk(T::Binding)]), empty()]);
    g.rule("OBJECT_ID", vec![prod(vec![tk(T::Id), tk(T::Binding)]), empty()]);
    g.rule(
        "OBJECT_AT",
        vec![prod(vec![tk(T::At), tk(T::Binding), sym("OBJECT_AT_TAIL")]), empty()],
    );
    g.rule(
        "OBJECT_AT_TAIL",
        vec![prod(vec![tk(T::Comma), tk(T::Binding)]), empty()],
    );

    // Literal triples of insert and delete statements.
    g.rule("DATA", vec![prod(vec![sym("TRIPLE"), sym("MORE_DATA")])]);
    g.rule(
        "MORE_DATA",
        vec![prod(vec![tk(T::Dot), sym("TRIPLE"), sym("MORE_DATA")]), empty()],
    );
    g.rule(
        "TRIPLE",
        vec![prod(vec![tk(T::Node), tk(T::Predicate), sym("TRIPLE_OBJECT")])],
    );
    g.rule(
        "TRIPLE_OBJECT",
        vec![
            prod(vec![tk(T::Node)]),
            prod(vec![tk(T::Predicate)]),
            prod(vec![tk(T::Literal)]),
        ],
    );

    // Group by.
    g.rule(
        "GROUP_BY",
        vec![prod(vec![tk(T::Group), tk(T::By), tk(T::Binding), sym("MORE_GROUP")]), empty()],
    );
    g.rule(
        "MORE_GROUP",
        vec![prod(vec![tk(T::Comma), tk(T::Binding), sym("MORE_GROUP")]), empty()],
    );

    // Order by.
    g.rule(
        "ORDER_BY",
        vec![
            prod(vec![
                tk(T::Order),
                tk(T::By),
                tk(T::Binding),
                sym("ORDER_DIR"),
                sym("MORE_ORDER"),
            ]),
            empty(),
        ],
    );
    g.rule(
        "ORDER_DIR",
        vec![prod(vec![tk(T::Asc)]), prod(vec![tk(T::Desc)]), empty()],
    );
    g.rule(
        "MORE_ORDER",
        vec![
            prod(vec![tk(T::Comma), tk(T::Binding), sym("ORDER_DIR"), sym("MORE_ORDER")]),
            empty(),
        ],
    );

    // Having.
    g.rule("HAVING", vec![prod(vec![tk(T::Having), sym("H_EXPR")]), empty()]);
    g.rule("H_EXPR", vec![prod(vec![sym("H_TERM"), sym("H_EXPR_TAIL")])]);
    g.rule(
        "H_EXPR_TAIL",
        vec![
            prod(vec![tk(T::And), sym("H_TERM"), sym("H_EXPR_TAIL")]),
            prod(vec![tk(T::Or), sym("H_TERM"), sym("H_EXPR_TAIL")]),
            empty(),
        ],
    );
    g.rule(
        "H_TERM",
        vec![
            prod(vec![tk(T::Not), sym("H_TERM")]),
            prod(vec![tk(T::LParen), sym("H_EXPR"), tk(T::RParen)]),
            prod(vec![tk(T::Binding), sym("H_COMP")]),
        ],
    );
    g.rule(
        "H_COMP",
        vec![
            prod(vec![tk(T::Lt), tk(T::Binding)]),
            prod(vec![tk(T::Gt), tk(T::Binding)]),
            prod(vec![tk(T::Eq), tk(T::Binding)]),
            empty(),
        ],
    );

    // Global time bounds.
    g.rule("GLOBAL_BOUNDS", vec![prod(vec![sym("G_EXPR")]), empty()]);
    g.rule("G_EXPR", vec![prod(vec![sym("G_TERM"), sym("G_EXPR_TAIL")])]);
    g.rule(
        "G_EXPR_TAIL",
        vec![
            prod(vec![tk(T::And), sym("G_TERM"), sym("G_EXPR_TAIL")]),
            prod(vec![tk(T::Or), sym("G_TERM"), sym("G_EXPR_TAIL")]),
            empty(),
        ],
    );
    g.rule(
        "G_TERM",
        vec![
            prod(vec![tk(T::LParen), sym("G_EXPR"), tk(T::RParen)]),
            prod(vec![tk(T::Before), tk(T::Predicate)]),
            prod(vec![tk(T::After), tk(T::Predicate)]),
            prod(vec![tk(T::Between), tk(T::Predicate), tk(T::Comma), tk(T::Predicate)]),
        ],
    );

    // Limit.
    g.rule("LIMIT", vec![prod(vec![tk(T::Limit), tk(T::Literal)]), empty()]);

    g
}

/// The TQL grammar with the semantic hooks attached.
pub fn semantic_tql() -> Grammar {
    let mut g = tql();

    g.set_start_hook("START", 0, hooks::stamp_query);
    g.set_start_hook("START", 1, hooks::stamp_insert);
    g.set_start_hook("START", 2, hooks::stamp_delete);
    g.set_start_hook("START", 3, hooks::stamp_create);
    g.set_start_hook("START", 4, hooks::stamp_drop);

    g.set_element_hook("GRAPHS", hooks::graph_accumulator);
    g.set_element_hook("MORE_GRAPHS", hooks::graph_accumulator);

    g.set_element_hook("TRIPLE", hooks::data_accumulator);
    g.set_element_hook("TRIPLE_OBJECT", hooks::data_accumulator);

    g.set_start_hook("CLAUSES", 0, hooks::where_init);
    g.set_end_hook("CLAUSE", 0, hooks::where_next);
    for s in ["SUBJECT", "SUBJECT_AS", "SUBJECT_TYPE", "SUBJECT_ID"] {
        g.set_element_hook(s, hooks::where_subject);
    }
    for s in [
        "PREDICATE",
        "PREDICATE_AS",
        "PREDICATE_ID",
        "PREDICATE_AT",
        "PREDICATE_AT_TAIL",
    ] {
        g.set_element_hook(s, hooks::where_predicate);
    }
    for s in [
        "OBJECT",
        "OBJECT_AS",
        "OBJECT_TYPE",
        "OBJECT_ID",
        "OBJECT_AT",
        "OBJECT_AT_TAIL",
    ] {
        g.set_element_hook(s, hooks::where_object);
    }

    for s in ["PROJ", "PROJ_ARG", "PROJ_AS"] {
        g.set_element_hook(s, hooks::projection);
    }
    for idx in 0..3 {
        g.set_end_hook("PROJ", idx, hooks::projection_finish);
    }

    g.set_element_hook("GROUP_BY", hooks::group_by);
    g.set_element_hook("MORE_GROUP", hooks::group_by);

    g.set_element_hook("ORDER_BY", hooks::order_by);
    g.set_element_hook("ORDER_DIR", hooks::order_by);
    g.set_element_hook("MORE_ORDER", hooks::order_by);

    for s in ["H_EXPR", "H_EXPR_TAIL", "H_TERM", "H_COMP"] {
        g.set_element_hook(s, hooks::having_collect);
    }
    g.set_end_hook("HAVING", 0, hooks::having_finish);

    for s in ["G_EXPR", "G_EXPR_TAIL", "G_TERM"] {
        g.set_element_hook(s, hooks::global_collect);
    }
    g.set_end_hook("GLOBAL_BOUNDS", 0, hooks::global_finish);

    g.set_element_hook("LIMIT", hooks::limit);

    g
}

/// Lookahead window over the lazy token stream.
pub struct Llk<'a> {
    lexer: Lexer<'a>,
    buf: VecDeque<Token>,
    k: usize,
    done: bool,
}

impl<'a> Llk<'a> {
    /// Create a window of `k` tokens (at least 1) over the input.
    pub fn new(input: &'a str, k: usize) -> Self {
        Self {
            lexer: Lexer::new(input),
            buf: VecDeque::new(),
            k: k.max(1),
            done: false,
        }
    }

    /// The configured lookahead depth.
    pub fn k(&self) -> usize {
        self.k
    }

    fn fill(&mut self, n: usize) -> Result<()> {
        while self.buf.len() < n && !self.done {
            match self.lexer.next() {
                Some(Ok(t)) => self.buf.push_back(t),
                Some(Err(e)) => return Err(e),
                None => self.done = true,
            }
        }
        Ok(())
    }

    /// Peek at the `i`-th upcoming token, `i < k`. `None` at the end
    /// of input.
    pub fn peek(&mut self, i: usize) -> Result<Option<&Token>> {
        self.fill(i + 1)?;
        Ok(self.buf.get(i))
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.fill(1)?;
        Ok(self.buf.pop_front())
    }
}

/// The grammar-driven parser.
pub struct Parser {
    grammar: Grammar,
}

const START_SYMBOL: Symbol = "START";

impl Parser {
    /// Create a parser, validating that every referenced symbol is
    /// defined.
    pub fn new(grammar: Grammar) -> Result<Self> {
        if !grammar.rules.contains_key(START_SYMBOL) {
            return Err(Error::Internal("grammar has no START symbol".to_string()));
        }
        for prods in grammar.rules.values() {
            for p in prods {
                for e in &p.elements {
                    if let Element::Symbol(s) = e {
                        if !grammar.rules.contains_key(s) {
                            return Err(Error::Internal(format!(
                                "grammar references undefined symbol {s}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(Self { grammar })
    }

    /// Parse one statement, driving the hooks against the given
    /// accumulator. Fails fast on the first mismatch.
    pub fn parse(&self, llk: &mut Llk<'_>, st: &mut Statement) -> Result<()> {
        self.expand(START_SYMBOL, llk, st)?;
        if let Some(t) = llk.peek(0)? {
            return Err(Error::Parse {
                found: t.to_string(),
                expected: "end of statement".to_string(),
            });
        }
        Ok(())
    }

    fn unexpected(&self, symbol: Symbol, found: Option<&Token>) -> Error {
        let mut expected = Vec::new();
        self.grammar.first_tokens_of(symbol, &mut expected);
        Error::Parse {
            found: found.map_or_else(|| "end of input".to_string(), ToString::to_string),
            expected: format!("{expected:?}"),
        }
    }

    fn expand(&self, symbol: Symbol, llk: &mut Llk<'_>, st: &mut Statement) -> Result<()> {
        let peeked = llk.peek(0)?.map(|t| t.kind);
        let prods = self.grammar.productions(symbol)?;
        let chosen = peeked
            .and_then(|k| {
                prods
                    .iter()
                    .position(|p| self.grammar.production_can_start(p, k))
            })
            .or_else(|| prods.iter().position(|p| self.grammar.production_nullable(p)));
        let Some(idx) = chosen else {
            let found = llk.peek(0)?;
            return Err(self.unexpected(symbol, found));
        };
        let production = &prods[idx];
        if let Some(hook) = production.start {
            hook(st, symbol)?;
        }
        for element in &production.elements {
            match element {
                Element::Token(kind) => {
                    let tok = llk.next_token()?.ok_or_else(|| Error::Parse {
                        found: "end of input".to_string(),
                        expected: format!("[{kind:?}]"),
                    })?;
                    if tok.kind != *kind {
                        return Err(Error::Parse {
                            found: tok.to_string(),
                            expected: format!("[{kind:?}]"),
                        });
                    }
                    if let Some(hook) = production.element {
                        hook(st, &ConsumedElement::Token(tok))?;
                    }
                }
                Element::Symbol(s) => {
                    self.expand(s, llk, st)?;
                    if let Some(hook) = production.element {
                        hook(st, &ConsumedElement::Symbol(s))?;
                    }
                }
            }
        }
        if let Some(hook) = production.end {
            hook(st, symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Statement> {
        let parser = Parser::new(tql())?;
        let mut st = Statement::new();
        parser.parse(&mut Llk::new(input, 1), &mut st)?;
        Ok(st)
    }

    #[test]
    fn test_accept_by_parse() {
        let table = [
            // Multiple var bindings.
            "select ?a from ?b where{?s ?p ?o};",
            "select ?a, ?b from ?c where{?s ?p ?o};",
            "select ?a, ?b, ?c from ?d where{?s ?p ?o};",
            // Aliases and aggregation functions.
            "select ?a as ?b from ?c where{?s ?p ?o};",
            "select ?a as ?b, ?c as ?d from ?e where{?s ?p ?o};",
            "select count(?a) as ?b, sum(?c) as ?d, ?e as ?f from ?g where{?s ?p ?o};",
            "select count(distinct ?a) as ?b from ?c where{?s ?p ?o};",
            // Multiple graphs.
            "select ?a from ?b, ?c where{?s ?p ?o};",
            "select ?a from ?b, ?c, ?d where{?s ?p ?o};",
            // Clause refinements.
            "select ?a from ?b where{?s as ?x ?p ?o};",
            "select ?a from ?b where{?s as ?x type ?y ?p ?o};",
            "select ?a from ?b where{?s as ?x type ?y id ?z ?p ?o};",
            "select ?a from ?b where{?s ?p as ?x ?o};",
            "select ?a from ?b where{?s ?p as ?x id ?y ?o};",
            "select ?a from ?b where{?s ?p as ?x id ?y at ?z ?o};",
            "select ?a from ?b where{?s ?p ?o as ?x};",
            "select ?a from ?b where{?s ?p ?o as ?x type ?y};",
            "select ?a from ?b where{?s ?p ?o as ?x type ?y id ?z};",
            "select ?a from ?b where{?s ?p ?o as ?x type ?y id ?z at ?t};",
            // Predicate bounds.
            "select ?a from ?b where{?s \"foo\"@[,] ?o};",
            "select ?a from ?b where{?s \"foo\"@[,] as ?x id ?y at ?z ?o};",
            "select ?a from ?b where{?s \"foo\"@[,] as ?x id ?y at ?z, ?zz ?o};",
            "select ?a from ?b where{?s ?p \"foo\"@[,] as ?x id ?z at ?t, ?tt};",
            // Multiple clauses.
            "select ?a from ?b where{?s ?p ?o . ?s ?p ?o};",
            "select ?a from ?b where{?s ?p ?o . ?s ?p ?o . ?s ?p ?o};",
            // Group by.
            "select ?a from ?b where{?s ?p ?o} group by ?a;",
            "select ?a from ?b where{?s ?p ?o} group by ?a, ?b;",
            // Order by.
            "select ?a from ?b where{?s ?p ?o} order by ?a;",
            "select ?a from ?b where{?s ?p ?o} order by ?a asc;",
            "select ?a from ?b where{?s ?p ?o} order by ?a desc;",
            "select ?a from ?b where{?s ?p ?o} order by ?a asc, ?b desc;",
            "select ?a from ?b where{?s ?p ?o} order by ?a desc, ?b desc, ?c asc;",
            // Having.
            "select ?a from ?b where {?a ?p ?o} having not ?b;",
            "select ?a from ?b where {?a ?p ?o} having (not ?b);",
            "select ?a from ?b where {?a ?p ?o} having ?b and ?b;",
            "select ?a from ?b where {?a ?p ?o} having ?b or ?b;",
            "select ?a from ?b where {?a ?p ?o} having ?b < ?b;",
            "select ?a from ?b where {?a ?p ?o} having ?b > ?b;",
            "select ?a from ?b where {?a ?p ?o} having ?b = ?b;",
            "select ?a from ?b where {?a ?p ?o} having (?b and ?b) or not (?b = ?b);",
            "select ?a from ?b where {?a ?p ?o} having ((?b and ?b) or not (?b = ?b));",
            // Global time bounds.
            "select ?a from ?b where {?s ?p ?o} before \"foo\"@[\"2015-01-01T00:00:00Z\"];",
            "select ?a from ?b where {?s ?p ?o} after \"foo\"@[\"2015-01-01T00:00:00Z\"];",
            "select ?a from ?b where {?s ?p ?o} between \"foo\"@[\"2015-01-01T00:00:00Z\"], \"bar\"@[\"2016-01-01T00:00:00Z\"];",
            "select ?a from ?b where {?s ?p ?o} (before \"foo\"@[\"2015-01-01T00:00:00Z\"]);",
            "select ?a from ?b where {?s ?p ?o} before \"foo\"@[\"2015-01-01T00:00:00Z\"] and before \"foo\"@[\"2015-01-01T00:00:00Z\"];",
            "select ?a from ?b where {?s ?p ?o} before \"foo\"@[\"2015-01-01T00:00:00Z\"] or (before \"foo\"@[\"2015-01-01T00:00:00Z\"] and before \"foo\"@[\"2015-01-01T00:00:00Z\"]);",
            // Limit.
            "select ?a from ?b where {?s ?p ?o} limit \"10\"^^type:int64;",
            // Insert data.
            "insert data into ?a {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            "insert data into ?a {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] \"bar\"@[\"2015-01-01T00:00:00Z\"]};",
            "insert data into ?a {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] \"yeah\"^^type:text};",
            "insert data into ?a,?b,?c {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            "insert data into ?a {/_<foo> \"bar\"@[] /_<foo> .
                                  /_<foo> \"bar\"@[] \"bar\"@[\"2015-01-01T00:00:00Z\"] .
                                  /_<foo> \"bar\"@[] \"yeah\"^^type:text};",
            // Delete data.
            "delete data from ?a {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            "delete data from ?a,?b,?c {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            // Create graphs.
            "create graph ?a;",
            "create graph ?a, ?b, ?c;",
            // Drop graphs.
            "drop graph ?a;",
            "drop graph ?a, ?b, ?c;",
        ];
        for input in table {
            assert!(parse(input).is_ok(), "failed to accept input {input:?}");
        }
    }

    #[test]
    fn test_reject_by_parse() {
        let table = [
            // Broken projection lists.
            "select ?a ?wrong from ?b;",
            "select ?a , from ?b;",
            "select ?a as from ?b;",
            "select ?a as ?b, from ?b;",
            "select count(?a as ?b, from ?b;",
            "select count(distinct) as ?a, from ?c;",
            // Broken graph lists.
            "select ?a from ?b ?c;",
            "select ?a from ?b,;",
            // Empty where clause.
            "select ?a from ?b where{};",
            // Incomplete where clause.
            "select ?a from ?b where {;",
            "select ?a from ?b where };",
            // Incomplete clauses.
            "select ?a from ?b where {?s ?p};",
            "select ?a from ?b where {?s ?p ?o . ?};",
            // Out-of-order clause refinements.
            "select ?a from ?b where {?s id ?b as ?c ?d ?o};",
            "select ?a from ?b where {?s ?p at ?t as ?a ?o};",
            "select ?a from ?b where {?s ?p ?o at ?t id ?i};",
            // Incomplete group by.
            "select ?a from ?b where{?s ?p ?o} group by;",
            "select ?a from ?b where{?s ?p ?o} group ?a;",
            "select ?a from ?b where{?s ?p ?o} by ?a;",
            // Incomplete order by.
            "select ?a from ?b where{?s ?p ?o} order by;",
            "select ?a from ?b where{?s ?p ?o} order ?a;",
            "select ?a from ?b where{?s ?p ?o} order by ?a, ?b, desc;",
            // Invalid having.
            "select ?a from ?b where {?a ?p ?o} having not ;",
            "select ?a from ?b where {?a ?p ?o} having not ?b ?b;",
            "select ?a from ?b where {?a ?p ?o} having (not );",
            "select ?a from ?b where {?a ?p ?o} having and ?b;",
            "select ?a from ?b where {?a ?p ?o} having ?b or ;",
            "select ?a from ?b where {?a ?p ?o} having ?b  ?b;",
            "select ?a from ?b where {?a ?p ?o} having > ?b;",
            "select ?a from ?b where {?a ?p ?o} having ?b = ;",
            "select ?a from ?b where {?a ?p ?o} having () or not (?b = ?b);",
            "select ?a from ?b where {?a ?p ?o} having ((?b and ?b) (?b = ?b));",
            // Invalid global time bounds.
            "select ?a from ?b where {?s ?p ?o} before ;",
            "select ?a from ?b where {?s ?p ?o} after ;",
            "select ?a from ?b where {?s ?p ?o} between \"foo\"@[\"2015-01-01T00:00:00Z\"], ;",
            "select ?a from ?b where {?s ?p ?o} before \"foo\"@[\"2015-01-01T00:00:00Z\"]);",
            "select ?a from ?b where {?s ?p ?o} before \"foo\"@[\"2015-01-01T00:00:00Z\"]  before \"foo\"@[\"2015-01-01T00:00:00Z\"];",
            // Invalid limit.
            "select ?a from ?b where {?s ?p ?o} limit ?b;",
            "select ?a from ?b where {?s ?p ?o} limit ;",
            // Incomplete data.
            "insert data into ?a {\"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            "insert data into ?a {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"]};",
            "insert data into ?a,?b, {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            "delete data from ?a {\"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            "delete data from ?a,?b, {/_<foo> \"bar\"@[\"2015-01-01T00:00:00Z\"] /_<foo>};",
            // Broken graph management.
            "create graph ;",
            "create graph ?a, ?b ?c;",
            "drop graph ;",
            "drop graph ?a ?b, ?c;",
        ];
        for input in table {
            assert!(parse(input).is_err(), "failed to reject input {input:?}");
        }
    }

    #[test]
    fn test_parse_error_carries_expectation() {
        let err = parse("select ?a from ?b where {?s ?p};").unwrap_err();
        match err {
            Error::Parse { found, expected } => {
                assert!(found.contains("RBrace"), "found = {found}");
                assert!(!expected.is_empty());
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_llk_window() {
        let mut llk = Llk::new("select ?a", 2);
        assert_eq!(llk.k(), 2);
        assert_eq!(llk.peek(0).unwrap().map(|t| t.kind), Some(TokenKind::Select));
        assert_eq!(llk.peek(1).unwrap().map(|t| t.kind), Some(TokenKind::Binding));
        assert_eq!(llk.next_token().unwrap().map(|t| t.kind), Some(TokenKind::Select));
        assert_eq!(llk.peek(0).unwrap().map(|t| t.kind), Some(TokenKind::Binding));
        assert_eq!(llk.next_token().unwrap().map(|t| t.kind), Some(TokenKind::Binding));
        assert_eq!(llk.peek(0).unwrap(), None);
        assert_eq!(llk.next_token().unwrap(), None);
    }

    #[test]
    fn test_lex_errors_surface_through_parse() {
        assert!(parse("select ?a from ?b where{?s ?p bareword};").is_err());
    }

    #[test]
    fn test_parser_validates_grammar() {
        let mut g = tql();
        g.rule("START", vec![prod(vec![sym("MISSING")])]);
        assert!(Parser::new(g).is_err());
    }
}
