//! ninec-par - Parser (syntactic analysis).
//!
//! A recursive-descent parser over the token stream. The output is an
//! [`Ast`]: a pair of arenas (nodes and variable records, addressed by
//! [`NodeId`]/[`VarId`]) plus the top-level declaration list and the
//! globals table. Precedence climbs from assignment (lowest) through
//! equality, relational, additive and multiplicative levels to unary
//! and postfix operators.
//!
//! ```text
//! program     := { function | gvar }
//! function    := 'func' IDENT '(' args_def ')' [ TypeExpr ] block
//! gvar        := 'var' IDENT TypeExpr
//! args_def    := ε | IDENT TypeExpr { ',' IDENT TypeExpr }
//! block       := '{' { stmt } '}'
//! stmt        := 'return' equality
//!              | 'if'  ifstmt
//!              | 'for' forhead block
//!              | '{' block
//!              | 'var' IDENT TypeExpr
//!              | expr
//!              ; optional trailing ';'
//! ifstmt      := expr [';' expr] block [ 'else' ('if' ifstmt | block) ]
//! forhead     := block | expr | expr ';' expr ';' expr
//! expr        := assign
//! assign      := equality [ ('=' | ':=') assign ]
//! equality    := relational { ('=='|'!=') relational }
//! relational  := add { ('<'|'<='|'>'|'>=') add }
//! add         := mul { ('+'|'-') mul }
//! mul         := unary { ('*'|'/') unary }
//! unary       := '+' unary | '-' unary | '&' unary | '*' unary | postfix
//! postfix     := primary { '++' | '--' | '[' primary ']' }
//! primary     := '(' expr ')'
//!              | IDENT ( '(' args ')' | ':=' equality | ε )
//!              | STR | NUM
//! ```
//!
//! Identifier resolution happens during parsing: a name resolves to
//! the innermost local of the current function, then to a global;
//! otherwise it must introduce a fresh local with `:=`. Comparisons
//! are normalised so that `a > b` is stored as `Lt(b, a)` and
//! `a >= b` as `Le(b, a)`.

mod ast;
mod edge_cases;
mod error;
mod parser;

pub use ast::{Ast, BinOp, Node, NodeId, NodeKind, VarId, Variable};
pub use error::ParseError;
pub use parser::parse;
