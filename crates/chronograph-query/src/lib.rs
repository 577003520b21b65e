//! chronograph query engine
//!
//! Compiles and evaluates TQL statements: the lexer produces a lazy
//! token stream, the grammar-driven LL(k) parser fires semantic hooks
//! that accumulate a typed statement, and the planner resolves each
//! graph clause against the storage, fusing per-clause result tables.

pub mod grammar;
pub mod hooks;
pub mod lexer;
pub mod planner;
pub mod semantic;
pub mod table;

use chronograph_core::Result;
use chronograph_storage::Store;

pub use grammar::{semantic_tql, tql, ConsumedElement, Grammar, Llk, Parser};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use planner::execute;
pub use semantic::{
    Aggregator, ComparisonOp, Expression, GraphClause, OrderCondition, Projection, Statement,
    StatementKind, TimeCondition,
};
pub use table::{Cell, Row, Table};

/// Compile a statement: lex, parse, and run the semantic hooks.
pub fn compile(input: &str) -> Result<Statement> {
    let parser = Parser::new(semantic_tql())?;
    let mut st = Statement::new();
    parser.parse(&mut Llk::new(input, 1), &mut st)?;
    Ok(st)
}

/// Compile and evaluate a statement against the store.
pub fn run(store: &dyn Store, input: &str) -> Result<Table> {
    let st = compile(input)?;
    execute(store, &st)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronograph_storage::MemoryStore;

    #[test]
    fn test_compile_then_reprint_round_trip() {
        // A statement assembled back from its parsed pieces reparses.
        let st = compile("select ?o from ?a where{/u<john> \"knows\"@[] ?o};").unwrap();
        assert_eq!(st.kind(), StatementKind::Query);
        let cls = &st.pattern_clauses()[0];
        let rebuilt = format!(
            "select ?o from {} where{{{} {} ?o}};",
            st.graphs()[0],
            cls.s.as_ref().unwrap(),
            cls.p.as_ref().unwrap(),
        );
        assert!(compile(&rebuilt).is_ok());
    }

    #[test]
    fn test_end_to_end() {
        let store = MemoryStore::new();
        run(&store, "create graph ?g;").unwrap();
        run(
            &store,
            "insert data into ?g {/u<john> \"knows\"@[] /u<mary> .
                                  /u<john> \"knows\"@[] /u<peter>};",
        )
        .unwrap();
        let tbl = run(&store, "select ?o from ?g where{/u<john> \"knows\"@[] ?o};").unwrap();
        assert_eq!(tbl.num_rows(), 2);
        assert_eq!(tbl.bindings(), ["?o"]);
    }
}
