//! ninec-sem - The type-annotation pass.
//!
//! A single post-order walk over each top-level declaration that
//! assigns a type to every expression node:
//!
//! - arithmetic, comparisons, calls and number literals are `int`;
//! - `&e` is pointer-to the type of `e`;
//! - `*e` and `a[i]` take the referent of the operand's type, failing
//!   when there is none;
//! - variable references inherit the variable's type; a local
//!   introduced with `:=` receives the type of its initialiser here;
//! - assignments, control flow and blocks stay untyped.
//!
//! The walk is idempotent: a node that already has a type is skipped,
//! so annotating twice is a no-op.
//!
//! # Example
//!
//! ```
//! use ninec_lex::tokenize;
//! use ninec_par::parse;
//! use ninec_sem::annotate;
//!
//! let mut ast = parse(tokenize("func main() int { a := 1; return a + 2 }").unwrap()).unwrap();
//! annotate(&mut ast).unwrap();
//! ```

mod error;

pub use error::TypeError;

use ninec_par::{Ast, NodeId, NodeKind};
use ninec_ty::Type;

/// Annotates every expression node of the program with its type.
///
/// Returns the first type error: an invalid pointer dereference,
/// indexing a non-array, or a `:=` whose initialiser produces no
/// value.
pub fn annotate(ast: &mut Ast) -> Result<(), TypeError> {
    let decls = ast.decls.clone();
    let mut annotator = Annotator { ast };
    for decl in decls {
        annotator.annotate_node(decl)?;
    }
    Ok(())
}

/// The walk state: just the tree being annotated.
struct Annotator<'a> {
    ast: &'a mut Ast,
}

impl Annotator<'_> {
    fn annotate_node(&mut self, id: NodeId) -> Result<(), TypeError> {
        // A function's type slot holds its declared return type, so
        // the idempotency check below must not keep us out of the
        // body; functions are walked unconditionally.
        if let NodeKind::Func { params, body, .. } = &self.ast.nodes[id].kind {
            let params = params.clone();
            let body = *body;
            for param in params {
                self.annotate_node(param)?;
            }
            return self.annotate_node(body);
        }

        if self.ast.nodes[id].ty.is_some() {
            return Ok(());
        }

        match self.ast.nodes[id].kind.clone() {
            NodeKind::Num { .. } => self.set(id, Type::Int),

            NodeKind::Binary { lhs, rhs, .. } => {
                self.annotate_node(lhs)?;
                self.annotate_node(rhs)?;
                self.set(id, Type::Int);
            }

            NodeKind::Call { args, .. } => {
                for arg in args {
                    self.annotate_node(arg)?;
                }
                self.set(id, Type::Int);
            }

            NodeKind::Var { var } => match self.ast.vars[var].ty.clone() {
                Some(ty) => self.set(id, ty),
                None => {
                    return Err(TypeError::CannotInfer {
                        name: self.ast.vars[var].name,
                        span: self.ast.nodes[id].span,
                    })
                }
            },

            NodeKind::Assign { lhs, rhs } => {
                // Right-hand side first: a `:=` target takes its type
                // from the initialiser.
                self.annotate_node(rhs)?;
                self.fill_declared_type(lhs, rhs)?;
                self.annotate_node(lhs)?;
            }

            NodeKind::Addr { operand } => {
                self.annotate_node(operand)?;
                let inner = self.expr_ty(operand)?.clone();
                self.set(id, Type::pointer_to(inner));
            }

            NodeKind::Deref { operand } => {
                self.annotate_node(operand)?;
                let referent = self.expr_ty(operand)?.referent().cloned();
                match referent {
                    Some(ty) => self.set(id, ty),
                    None => {
                        return Err(TypeError::InvalidDereference {
                            span: self.ast.nodes[id].span,
                        })
                    }
                }
            }

            NodeKind::Index { base, index } => {
                self.annotate_node(base)?;
                self.annotate_node(index)?;
                let base_ty = self.expr_ty(base)?.clone();
                match base_ty {
                    Type::Array(elem, _) => self.set(id, *elem),
                    other => {
                        return Err(TypeError::NotIndexable {
                            ty: other,
                            span: self.ast.nodes[id].span,
                        })
                    }
                }
            }

            NodeKind::Inc { target } | NodeKind::Dec { target } => {
                self.annotate_node(target)?;
            }

            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.annotate_node(value)?;
                }
            }

            NodeKind::If {
                init,
                cond,
                then,
                els,
            } => {
                if let Some(init) = init {
                    self.annotate_node(init)?;
                }
                self.annotate_node(cond)?;
                self.annotate_node(then)?;
                if let Some(els) = els {
                    self.annotate_node(els)?;
                }
            }

            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.annotate_node(init)?;
                }
                if let Some(cond) = cond {
                    self.annotate_node(cond)?;
                }
                if let Some(step) = step {
                    self.annotate_node(step)?;
                }
                self.annotate_node(body)?;
            }

            NodeKind::Block { stmts } => {
                for stmt in stmts {
                    self.annotate_node(stmt)?;
                }
            }

            // Handled above.
            NodeKind::Func { .. } => unreachable!("functions are walked eagerly"),
        }

        Ok(())
    }

    /// Gives an untyped `:=` local the type of its initialiser.
    ///
    /// Does nothing when the assignment target is not a variable or
    /// the variable is already typed.
    fn fill_declared_type(&mut self, lhs: NodeId, rhs: NodeId) -> Result<(), TypeError> {
        let NodeKind::Var { var } = self.ast.nodes[lhs].kind else {
            return Ok(());
        };
        if self.ast.vars[var].ty.is_some() {
            return Ok(());
        }
        match self.ast.nodes[rhs].ty.clone() {
            Some(ty) => {
                self.ast.vars[var].ty = Some(ty);
                Ok(())
            }
            None => Err(TypeError::CannotInfer {
                name: self.ast.vars[var].name,
                span: self.ast.nodes[lhs].span,
            }),
        }
    }

    /// The type of an already-annotated expression.
    fn expr_ty(&self, id: NodeId) -> Result<&Type, TypeError> {
        self.ast.nodes[id].ty.as_ref().ok_or(TypeError::Untyped {
            span: self.ast.nodes[id].span,
        })
    }

    fn set(&mut self, id: NodeId, ty: Type) {
        self.ast.nodes[id].ty = Some(ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ninec_lex::tokenize;
    use ninec_par::parse;

    fn annotated(source: &str) -> Ast {
        let mut ast = parse(tokenize(source).unwrap()).unwrap();
        annotate(&mut ast).unwrap_or_else(|e| panic!("annotation failed: {e}"));
        ast
    }

    fn annotate_err(source: &str) -> TypeError {
        let mut ast = parse(tokenize(source).unwrap()).unwrap();
        annotate(&mut ast).expect_err("expected a type error")
    }

    /// The statements of the first function's body.
    fn body_stmts(ast: &Ast) -> Vec<NodeId> {
        let NodeKind::Func { body, .. } = &ast.node(ast.decls[0]).kind else {
            panic!("first decl is not a function");
        };
        let NodeKind::Block { stmts } = &ast.node(*body).kind else {
            panic!("function body is not a block");
        };
        stmts.clone()
    }

    #[test]
    fn arithmetic_and_literals_are_int() {
        let ast = annotated("func main() { var a int; a = 1 + 2 * 3 }");
        for (id, node) in ast.nodes.iter_enumerated() {
            match node.kind {
                NodeKind::Num { .. } | NodeKind::Binary { .. } => {
                    assert_eq!(ast.ty(id), Some(&Type::Int));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn comparisons_and_calls_are_int() {
        let ast = annotated("func main() { var a int; a = f(a == 2, a < 3) }");
        for (id, node) in ast.nodes.iter_enumerated() {
            match node.kind {
                NodeKind::Binary { .. } | NodeKind::Call { .. } => {
                    assert_eq!(ast.ty(id), Some(&Type::Int));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn address_of_wraps_in_a_pointer() {
        let ast = annotated("func main() { var x byte; var p *byte; p = &x }");
        let addr = ast
            .nodes
            .iter_enumerated()
            .find(|(_, n)| matches!(n.kind, NodeKind::Addr { .. }))
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(ast.ty(addr), Some(&Type::pointer_to(Type::Byte)));
    }

    #[test]
    fn dereference_takes_the_referent() {
        let ast = annotated("func main() { var p *int; return *p }");
        let deref = ast
            .nodes
            .iter_enumerated()
            .find(|(_, n)| matches!(n.kind, NodeKind::Deref { .. }))
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(ast.ty(deref), Some(&Type::Int));
    }

    #[test]
    fn dereferencing_an_int_is_an_error() {
        match annotate_err("func main() { var x int; return *x }") {
            TypeError::InvalidDereference { span } => {
                // The span points at the `*` operator.
                assert_eq!((span.line, span.column), (1, 33));
            }
            other => panic!("expected InvalidDereference, got {other:?}"),
        }
    }

    #[test]
    fn indexing_yields_the_element_type() {
        let ast = annotated("func main() { var a [3]byte; return a[0] }");
        let index = ast
            .nodes
            .iter_enumerated()
            .find(|(_, n)| matches!(n.kind, NodeKind::Index { .. }))
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(ast.ty(index), Some(&Type::Byte));
    }

    #[test]
    fn indexing_a_non_array_is_an_error() {
        match annotate_err("func main() { var x int; return x[0] }") {
            TypeError::NotIndexable { ty, span } => {
                assert_eq!(ty, Type::Int);
                // The span points at the `[`.
                assert_eq!((span.line, span.column), (1, 34));
            }
            other => panic!("expected NotIndexable, got {other:?}"),
        }
    }

    #[test]
    fn indexing_a_pointer_is_an_error() {
        match annotate_err("func main() { var p *int; return p[0] }") {
            TypeError::NotIndexable { ty, .. } => {
                assert_eq!(ty, Type::pointer_to(Type::Int));
            }
            other => panic!("expected NotIndexable, got {other:?}"),
        }
    }

    #[test]
    fn walrus_local_takes_the_initialiser_type() {
        let ast = annotated("func main() int { a := 1; return a }");
        let NodeKind::Func { locals, .. } = &ast.node(ast.decls[0]).kind else {
            panic!("not a function");
        };
        assert_eq!(ast.var(locals[0]).ty, Some(Type::Int));
    }

    #[test]
    fn walrus_propagates_pointer_types() {
        let ast = annotated("func main() { var x int; p := &x; return *p }");
        let NodeKind::Func { locals, .. } = &ast.node(ast.decls[0]).kind else {
            panic!("not a function");
        };
        let p = locals
            .iter()
            .copied()
            .find(|&v| ast.var(v).name == "p")
            .unwrap();
        assert_eq!(ast.var(p).ty, Some(Type::pointer_to(Type::Int)));
    }

    #[test]
    fn walrus_from_a_valueless_initialiser_is_an_error() {
        assert!(matches!(
            annotate_err("func main() { a := (b := 1) }"),
            TypeError::CannotInfer { .. }
        ));
    }

    #[test]
    fn statements_stay_untyped() {
        let ast = annotated("func main() { var a int; a = 1; if a { a++ }; for { return a } }");
        for (id, node) in ast.nodes.iter_enumerated() {
            match node.kind {
                NodeKind::Assign { .. }
                | NodeKind::Return { .. }
                | NodeKind::If { .. }
                | NodeKind::For { .. }
                | NodeKind::Block { .. }
                | NodeKind::Inc { .. }
                | NodeKind::Dec { .. } => {
                    assert_eq!(ast.ty(id), None, "{:?} should stay untyped", node.kind);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn declared_return_type_is_left_alone() {
        let ast = annotated("func main() byte { return 0 }");
        assert_eq!(ast.ty(ast.decls[0]), Some(&Type::Byte));
        // And the body still got annotated despite the preset type.
        let stmts = body_stmts(&ast);
        let NodeKind::Return { value: Some(value) } = ast.node(stmts[0]).kind else {
            panic!("not a return");
        };
        assert_eq!(ast.ty(value), Some(&Type::Int));
    }

    #[test]
    fn annotation_is_idempotent() {
        let mut ast = parse(
            tokenize(
                "var g [4]int
                 func main() int { p := &g[0]; for i := 0; i < 4; i++ { *p = i }; return *p }",
            )
            .unwrap(),
        )
        .unwrap();
        annotate(&mut ast).unwrap();
        let once = ast.clone();
        annotate(&mut ast).unwrap();
        assert_eq!(ast, once);
    }

    #[test]
    fn every_expression_has_a_type_after_annotation() {
        let ast = annotated(
            "func add(a int, b int) int { return a + b }
             func main() int { x := add(1, 2); return x * 3 }",
        );
        for (id, node) in ast.nodes.iter_enumerated() {
            if matches!(
                node.kind,
                NodeKind::Num { .. }
                    | NodeKind::Var { .. }
                    | NodeKind::Binary { .. }
                    | NodeKind::Call { .. }
                    | NodeKind::Addr { .. }
                    | NodeKind::Deref { .. }
                    | NodeKind::Index { .. }
            ) {
                assert!(ast.ty(id).is_some(), "untyped expression {:?}", node.kind);
            }
        }
    }
}
