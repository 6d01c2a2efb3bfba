//! AST node and variable definitions.
//!
//! Nodes live in one arena and reference each other by [`NodeId`];
//! variable records live in a second arena addressed by [`VarId`].
//! Every expression and statement is a [`Node`]: a kind with its
//! per-kind payload, plus the type slot the annotation pass fills in.

use indexmap::IndexMap;
use ninec_ty::Type;
use ninec_util::{define_idx, IndexVec, Span, Symbol};

define_idx!(
    /// Handle to a [`Node`] in the AST arena.
    NodeId
);

define_idx!(
    /// Handle to a [`Variable`] record.
    VarId
);

/// Binary operators.
///
/// There is no `Gt`/`Ge`: the parser swaps operands so that only `Lt`
/// and `Le` exist after parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<` (also `>` with swapped operands)
    Lt,
    /// `<=` (also `>=` with swapped operands)
    Le,
}

impl BinOp {
    /// Returns true for the comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le)
    }
}

/// The kind of an AST node, with its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Integer literal.
    Num {
        /// The literal value.
        value: i64,
    },

    /// Reference to a variable (local or global).
    Var {
        /// The resolved variable record.
        var: VarId,
    },

    /// Binary arithmetic or comparison.
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: NodeId,
        /// Right operand.
        rhs: NodeId,
    },

    /// Assignment. The left-hand side must be addressable.
    Assign {
        /// Target (variable, dereference or index).
        lhs: NodeId,
        /// Value.
        rhs: NodeId,
    },

    /// Postfix `++`: add one to the target cell.
    Inc {
        /// The cell being stepped.
        target: NodeId,
    },

    /// Postfix `--`: subtract one from the target cell.
    Dec {
        /// The cell being stepped.
        target: NodeId,
    },

    /// `return` from the enclosing function.
    Return {
        /// The returned expression, if any.
        value: Option<NodeId>,
    },

    /// `if` statement, optionally with an init expression and an else
    /// branch (which may itself be another `If` for `else if`).
    If {
        /// Optional init expression (`if x := 0; cond { .. }`).
        init: Option<NodeId>,
        /// The condition.
        cond: NodeId,
        /// The then block.
        then: NodeId,
        /// The else block or chained `If`.
        els: Option<NodeId>,
    },

    /// `for` loop: infinite (`for { }`), while-style (`for cond { }`)
    /// or C-style (`for init; cond; step { }`).
    For {
        /// Optional init expression.
        init: Option<NodeId>,
        /// Optional condition; absent means loop forever.
        cond: Option<NodeId>,
        /// Optional step expression, run after each iteration.
        step: Option<NodeId>,
        /// The loop body.
        body: NodeId,
    },

    /// `{ ... }`: a statement sequence.
    Block {
        /// The statements, in order.
        stmts: Vec<NodeId>,
    },

    /// Call of a named function.
    Call {
        /// The callee name.
        name: Symbol,
        /// Argument expressions, left to right.
        args: Vec<NodeId>,
    },

    /// A function definition (top level only).
    Func {
        /// The function name.
        name: Symbol,
        /// Parameter `Var` nodes in declaration order.
        params: Vec<NodeId>,
        /// Every local of the function (parameters included), in
        /// declaration order. The code generator assigns frame
        /// offsets from this list.
        locals: Vec<VarId>,
        /// The body block.
        body: NodeId,
    },

    /// Unary `&`: address of the operand.
    Addr {
        /// The addressable operand.
        operand: NodeId,
    },

    /// Unary `*`: load through a pointer.
    Deref {
        /// The pointer-valued operand.
        operand: NodeId,
    },

    /// `a[i]`: array element access.
    Index {
        /// The array being indexed.
        base: NodeId,
        /// The element index.
        index: NodeId,
    },
}

/// One AST node: a kind plus the type slot.
///
/// The parser populates `kind` (and `ty` where it is already known:
/// variable references with declared types, and the declared return
/// type on `Func` nodes); the annotation pass fills the remaining
/// expression types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// What the node is, with its payload.
    pub kind: NodeKind,

    /// The node's type. `None` until annotated; statement-like nodes
    /// keep `None` forever.
    pub ty: Option<Type>,

    /// Where the construct begins in the source. Captured at parse
    /// time; the later stages point their diagnostics at it.
    pub span: Span,
}

/// A named storage location.
///
/// The record is the variable's identity: every reference to the same
/// local resolves to the same `VarId`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    /// The declared name (or the generated `.L.data.N` label for
    /// string-literal globals).
    pub name: Symbol,

    /// The variable's type. `None` only for a `:=` local between
    /// parsing and annotation.
    pub ty: Option<Type>,

    /// True for locals (parameters included), false for globals.
    pub is_local: bool,

    /// Frame offset: the positive byte distance below RBP at which
    /// this local lives. Assigned by the code generator; 0 until
    /// then, and always 0 for globals.
    pub offset: u64,

    /// The byte payload of a string-literal global. `None` for every
    /// other variable; such globals are zero-initialised.
    pub content: Option<String>,
}

/// The parsed program: arenas plus the top-level declarations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ast {
    /// All AST nodes.
    pub nodes: IndexVec<NodeId, Node>,

    /// All variable records (locals of every function, globals,
    /// string-literal globals).
    pub vars: IndexVec<VarId, Variable>,

    /// Top-level `Func` nodes in order of appearance.
    pub decls: Vec<NodeId>,

    /// Program-level declarations by name, in declaration order. The
    /// code generator emits `.data` in this order.
    pub globals: IndexMap<Symbol, VarId>,
}

impl Ast {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an untyped node, returning its handle.
    pub fn add_node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.nodes.push(Node {
            kind,
            ty: None,
            span,
        })
    }

    /// Adds a node with its type already known.
    pub fn add_typed_node(&mut self, kind: NodeKind, ty: Type, span: Span) -> NodeId {
        self.nodes.push(Node {
            kind,
            ty: Some(ty),
            span,
        })
    }

    /// The node behind a handle.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The variable record behind a handle.
    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id]
    }

    /// The type of a node, if annotated.
    pub fn ty(&self, id: NodeId) -> Option<&Type> {
        self.nodes[id].ty.as_ref()
    }

    /// The source position of a node.
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }
}
