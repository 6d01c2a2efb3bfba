//! The recursive-descent parser.
//!
//! One method per grammar production. All parser state (the token
//! stream, the arena under construction, the current function's
//! locals and the data-label counter) lives in the `Parser` value;
//! nothing is global.

use ninec_lex::{TokenStream, TokenKind};
use ninec_ty::Type;
use ninec_util::{Span, Symbol};

use crate::ast::{Ast, BinOp, NodeId, NodeKind, VarId, Variable};
use crate::error::ParseError;

/// Parses a token stream into an [`Ast`].
///
/// # Example
///
/// ```
/// use ninec_lex::tokenize;
/// use ninec_par::parse;
///
/// let tokens = tokenize("func main() int { return 0 }").unwrap();
/// let ast = parse(tokens).unwrap();
/// assert_eq!(ast.decls.len(), 1);
/// ```
pub fn parse(tokens: TokenStream) -> Result<Ast, ParseError> {
    Parser::new(tokens).run()
}

/// Parser state.
struct Parser {
    /// The token cursor.
    tokens: TokenStream,

    /// The program being built.
    ast: Ast,

    /// Locals of the function currently being parsed, in declaration
    /// order. Name lookup scans from the back so the most recent
    /// declaration wins.
    locals: Vec<VarId>,

    /// Counter for `.L.data.N` string-literal globals.
    data_labels: u32,
}

impl Parser {
    fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            ast: Ast::new(),
            locals: Vec::new(),
            data_labels: 0,
        }
    }

    /// program := { function | gvar }
    fn run(mut self) -> Result<Ast, ParseError> {
        while !self.tokens.at_eof() {
            if self.tokens.peek("func") {
                let func = self.function()?;
                self.ast.decls.push(func);
            } else if self.tokens.peek("var") {
                self.gvar()?;
            } else {
                let tok = self.tokens.current();
                return Err(ParseError::ExpectedDeclaration {
                    found: tok.lexeme,
                    span: tok.span,
                });
            }
            self.tokens.consume(";");
        }
        Ok(self.ast)
    }

    /// function := 'func' IDENT '(' args_def ')' [ TypeExpr ] block
    ///
    /// The locals list is reset at `func`; parameters are declared as
    /// the first locals. A type expression before `{` is the declared
    /// return type and is stored in the `Func` node's type slot.
    fn function(&mut self) -> Result<NodeId, ParseError> {
        let span = self.span();
        self.tokens.expect("func")?;
        self.locals.clear();

        let name = self.tokens.expect_ident()?.lexeme;
        let params = self.params()?;

        let ret_ty = if self.tokens.consume("{") {
            None
        } else {
            let ty = self.type_expr()?;
            self.tokens.expect("{")?;
            Some(ty)
        };

        let body = self.block()?;
        let locals = std::mem::take(&mut self.locals);
        let kind = NodeKind::Func {
            name,
            params,
            locals,
            body,
        };
        Ok(match ret_ty {
            Some(ty) => self.ast.add_typed_node(kind, ty, span),
            None => self.ast.add_node(kind, span),
        })
    }

    /// args_def := ε | IDENT TypeExpr { ',' IDENT TypeExpr }
    fn params(&mut self) -> Result<Vec<NodeId>, ParseError> {
        self.tokens.expect("(")?;
        let mut params = Vec::new();
        if self.tokens.consume(")") {
            return Ok(params);
        }
        loop {
            let tok = self.tokens.expect_ident()?;
            let ty = self.type_expr()?;
            let var = self.declare_local(tok.lexeme, Some(ty));
            params.push(self.var_node(var, tok.span));
            if !self.tokens.consume(",") {
                break;
            }
        }
        self.tokens.expect(")")?;
        Ok(params)
    }

    /// gvar := 'var' IDENT TypeExpr
    fn gvar(&mut self) -> Result<(), ParseError> {
        self.tokens.expect("var")?;
        let tok = self.tokens.expect_ident()?;
        if self.ast.globals.contains_key(&tok.lexeme) {
            return Err(ParseError::Redeclared {
                name: tok.lexeme,
                span: tok.span,
            });
        }
        let ty = self.type_expr()?;
        let var = self.ast.vars.push(Variable {
            name: tok.lexeme,
            ty: Some(ty),
            is_local: false,
            offset: 0,
            content: None,
        });
        self.ast.globals.insert(tok.lexeme, var);
        Ok(())
    }

    /// TypeExpr := '[' NUM ']' TypeExpr | '*' TypeExpr | 'int' | 'byte'
    fn type_expr(&mut self) -> Result<Type, ParseError> {
        if self.tokens.consume("[") {
            let len = self.tokens.expect_number()?;
            self.tokens.expect("]")?;
            let elem = self.type_expr()?;
            return Ok(Type::array_of(elem, len as u64));
        }
        if self.tokens.consume("*") {
            let referent = self.type_expr()?;
            return Ok(Type::pointer_to(referent));
        }
        self.expect_type()
    }

    /// Consumes `int` or `byte`.
    fn expect_type(&mut self) -> Result<Type, ParseError> {
        if self.tokens.consume("int") {
            return Ok(Type::Int);
        }
        if self.tokens.consume("byte") {
            return Ok(Type::Byte);
        }
        let tok = self.tokens.current();
        Err(ParseError::ExpectedType {
            found: tok.lexeme,
            span: tok.span,
        })
    }

    /// block := '{' { stmt } '}'
    ///
    /// The opening brace has already been consumed.
    fn block(&mut self) -> Result<NodeId, ParseError> {
        let span = self.span();
        let mut stmts = Vec::new();
        while !self.tokens.consume("}") {
            if self.tokens.at_eof() {
                self.tokens.expect("}")?;
            }
            stmts.push(self.stmt()?);
        }
        Ok(self.ast.add_node(NodeKind::Block { stmts }, span))
    }

    /// stmt, with at most one optional trailing ';'.
    fn stmt(&mut self) -> Result<NodeId, ParseError> {
        let span = self.span();
        let node = if self.tokens.consume("return") {
            let value = self.equality()?;
            self.ast
                .add_node(NodeKind::Return { value: Some(value) }, span)
        } else if self.tokens.consume("if") {
            self.if_stmt()?
        } else if self.tokens.consume("for") {
            self.for_stmt()?
        } else if self.tokens.consume("{") {
            self.block()?
        } else if self.tokens.consume("var") {
            self.var_stmt()?
        } else {
            self.expr()?
        };
        self.tokens.consume(";");
        Ok(node)
    }

    /// ifstmt := expr [';' expr] block [ 'else' ('if' ifstmt | block) ]
    ///
    /// The `if` keyword has already been consumed. One expression is
    /// parsed first; a following ';' means it was the init and the
    /// condition comes next.
    fn if_stmt(&mut self) -> Result<NodeId, ParseError> {
        let span = self.span();
        let first = self.expr()?;
        let (init, cond) = if self.tokens.consume(";") {
            (Some(first), self.expr()?)
        } else {
            (None, first)
        };

        self.tokens.expect("{")?;
        let then = self.block()?;

        let els = if self.tokens.consume("else") {
            if self.tokens.consume("if") {
                Some(self.if_stmt()?)
            } else {
                self.tokens.expect("{")?;
                Some(self.block()?)
            }
        } else {
            None
        };

        Ok(self.ast.add_node(
            NodeKind::If {
                init,
                cond,
                then,
                els,
            },
            span,
        ))
    }

    /// forhead := block | expr | expr ';' expr ';' expr
    ///
    /// The `for` keyword has already been consumed. A '{' right away
    /// is the infinite loop; otherwise one expression is parsed, and
    /// a following ';' tells the C-style head from the while-style
    /// one.
    fn for_stmt(&mut self) -> Result<NodeId, ParseError> {
        let span = self.span();
        if self.tokens.consume("{") {
            let body = self.block()?;
            return Ok(self.ast.add_node(
                NodeKind::For {
                    init: None,
                    cond: None,
                    step: None,
                    body,
                },
                span,
            ));
        }

        let first = self.expr()?;
        let (init, cond, step) = if self.tokens.consume(";") {
            let cond = self.expr()?;
            self.tokens.expect(";")?;
            let step = self.expr()?;
            (Some(first), Some(cond), Some(step))
        } else {
            (None, Some(first), None)
        };

        self.tokens.expect("{")?;
        let body = self.block()?;
        Ok(self.ast.add_node(
            NodeKind::For {
                init,
                cond,
                step,
                body,
            },
            span,
        ))
    }

    /// 'var' IDENT TypeExpr, as a statement.
    ///
    /// Declares a new local and yields a `Var` node referring to it.
    /// Redeclaring a name within one function is an error.
    fn var_stmt(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.tokens.expect_ident()?;
        if self.find_local(tok.lexeme).is_some() {
            return Err(ParseError::Redeclared {
                name: tok.lexeme,
                span: tok.span,
            });
        }
        let ty = self.type_expr()?;
        let var = self.declare_local(tok.lexeme, Some(ty));
        Ok(self.var_node(var, tok.span))
    }

    /// expr := assign
    fn expr(&mut self) -> Result<NodeId, ParseError> {
        self.assign()
    }

    /// assign := equality [ ('=' | ':=') assign ]
    ///
    /// Right-associative: `a = b = c` parses as `a = (b = c)`.
    fn assign(&mut self) -> Result<NodeId, ParseError> {
        let node = self.equality()?;
        let span = self.span();
        if self.tokens.consume("=") || self.tokens.consume(":=") {
            let rhs = self.assign()?;
            return Ok(self
                .ast
                .add_node(NodeKind::Assign { lhs: node, rhs }, span));
        }
        Ok(node)
    }

    /// equality := relational { ('=='|'!=') relational }
    fn equality(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.relational()?;
        loop {
            if self.tokens.consume("==") {
                let rhs = self.relational()?;
                node = self.binary(BinOp::Eq, node, rhs);
            } else if self.tokens.consume("!=") {
                let rhs = self.relational()?;
                node = self.binary(BinOp::Ne, node, rhs);
            } else {
                return Ok(node);
            }
        }
    }

    /// relational := add { ('<'|'<='|'>'|'>=') add }
    ///
    /// `>` and `>=` swap operands and become `Lt`/`Le`, halving the
    /// comparison node kinds.
    fn relational(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.add()?;
        loop {
            if self.tokens.consume("<") {
                let rhs = self.add()?;
                node = self.binary(BinOp::Lt, node, rhs);
            } else if self.tokens.consume("<=") {
                let rhs = self.add()?;
                node = self.binary(BinOp::Le, node, rhs);
            } else if self.tokens.consume(">") {
                let lhs = self.add()?;
                node = self.binary(BinOp::Lt, lhs, node);
            } else if self.tokens.consume(">=") {
                let lhs = self.add()?;
                node = self.binary(BinOp::Le, lhs, node);
            } else {
                return Ok(node);
            }
        }
    }

    /// add := mul { ('+'|'-') mul }
    fn add(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.mul()?;
        loop {
            if self.tokens.consume("+") {
                let rhs = self.mul()?;
                node = self.binary(BinOp::Add, node, rhs);
            } else if self.tokens.consume("-") {
                let rhs = self.mul()?;
                node = self.binary(BinOp::Sub, node, rhs);
            } else {
                return Ok(node);
            }
        }
    }

    /// mul := unary { ('*'|'/') unary }
    fn mul(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.unary()?;
        loop {
            if self.tokens.consume("*") {
                let rhs = self.unary()?;
                node = self.binary(BinOp::Mul, node, rhs);
            } else if self.tokens.consume("/") {
                let rhs = self.unary()?;
                node = self.binary(BinOp::Div, node, rhs);
            } else {
                return Ok(node);
            }
        }
    }

    /// unary := '+' unary | '-' unary | '&' unary | '*' unary | postfix
    ///
    /// Unary minus is sugar for `0 - x`.
    fn unary(&mut self) -> Result<NodeId, ParseError> {
        let span = self.span();
        if self.tokens.consume("+") {
            return self.unary();
        }
        if self.tokens.consume("-") {
            let zero = self.ast.add_node(NodeKind::Num { value: 0 }, span);
            let operand = self.unary()?;
            return Ok(self.binary(BinOp::Sub, zero, operand));
        }
        if self.tokens.consume("&") {
            let operand = self.unary()?;
            return Ok(self.ast.add_node(NodeKind::Addr { operand }, span));
        }
        if self.tokens.consume("*") {
            let operand = self.unary()?;
            return Ok(self.ast.add_node(NodeKind::Deref { operand }, span));
        }
        self.postfix()
    }

    /// postfix := primary { '++' | '--' | '[' primary ']' }
    fn postfix(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.primary()?;
        loop {
            let span = self.span();
            if self.tokens.consume("++") {
                node = self.ast.add_node(NodeKind::Inc { target: node }, span);
            } else if self.tokens.consume("--") {
                node = self.ast.add_node(NodeKind::Dec { target: node }, span);
            } else if self.tokens.consume("[") {
                let index = self.primary()?;
                self.tokens.expect("]")?;
                node = self
                    .ast
                    .add_node(NodeKind::Index { base: node, index }, span);
            } else {
                return Ok(node);
            }
        }
    }

    /// primary := '(' expr ')' | IDENT (...) | STR | NUM
    ///
    /// An identifier is, in order: a function call when '(' follows;
    /// a reference to the innermost matching local; a reference to a
    /// global; or, introduced by ':=', a brand new local assigned its
    /// initialiser. Anything else is undeclared.
    fn primary(&mut self) -> Result<NodeId, ParseError> {
        if self.tokens.consume("(") {
            let node = self.expr()?;
            self.tokens.expect(")")?;
            return Ok(node);
        }

        if let Some(tok) = self.tokens.consume_ident() {
            if self.tokens.consume("(") {
                let args = self.call_args()?;
                return Ok(self.ast.add_node(
                    NodeKind::Call {
                        name: tok.lexeme,
                        args,
                    },
                    tok.span,
                ));
            }

            if let Some(var) = self.find_local(tok.lexeme) {
                return Ok(self.var_node(var, tok.span));
            }
            if let Some(&var) = self.ast.globals.get(&tok.lexeme) {
                return Ok(self.var_node(var, tok.span));
            }

            if !self.tokens.consume(":=") {
                return Err(ParseError::UndeclaredName {
                    name: tok.lexeme,
                    span: tok.span,
                });
            }
            // The fresh local's type is the initialiser's; the
            // annotation pass computes it. The initialiser is parsed
            // first, so it cannot refer to the name it declares.
            let rhs = self.equality()?;
            let var = self.declare_local(tok.lexeme, None);
            let lhs = self.var_node(var, tok.span);
            return Ok(self
                .ast
                .add_node(NodeKind::Assign { lhs, rhs }, tok.span));
        }

        if self.tokens.current().kind == TokenKind::Str {
            let tok = *self.tokens.current();
            self.tokens.advance();
            return Ok(self.string_literal(tok.lexeme, tok.span));
        }

        let span = self.span();
        let value = self.tokens.expect_number()?;
        Ok(self.ast.add_node(NodeKind::Num { value }, span))
    }

    /// args := ε | assign { ',' assign }
    ///
    /// The opening parenthesis has already been consumed.
    fn call_args(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut args = Vec::new();
        while !self.tokens.consume(")") {
            if self.tokens.at_eof() {
                self.tokens.expect(")")?;
            }
            args.push(self.assign()?);
            self.tokens.consume(",");
        }
        Ok(args)
    }

    /// Promotes a string literal to an auto-named global byte array
    /// and yields a `Var` node referring to it. Identical literals
    /// are not merged; each occurrence gets its own global.
    fn string_literal(&mut self, content: Symbol, span: Span) -> NodeId {
        let text = content.as_str();
        let ty = Type::array_of(Type::Byte, text.len() as u64);
        let name = Symbol::intern(&format!(".L.data.{}", self.data_labels));
        self.data_labels += 1;

        let var = self.ast.vars.push(Variable {
            name,
            ty: Some(ty),
            is_local: false,
            offset: 0,
            content: Some(text.to_owned()),
        });
        self.ast.globals.insert(name, var);
        self.var_node(var, span)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// The span of the token under the cursor.
    fn span(&self) -> Span {
        self.tokens.current().span
    }

    /// A binary node spanning from its left operand.
    fn binary(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let span = self.ast.nodes[lhs].span;
        self.ast.add_node(NodeKind::Binary { op, lhs, rhs }, span)
    }

    /// Creates a local in the current function and records it in the
    /// locals list.
    fn declare_local(&mut self, name: Symbol, ty: Option<Type>) -> VarId {
        let var = self.ast.vars.push(Variable {
            name,
            ty,
            is_local: true,
            offset: 0,
            content: None,
        });
        self.locals.push(var);
        var
    }

    /// Resolves a name against the current function's locals, most
    /// recent declaration first.
    fn find_local(&self, name: Symbol) -> Option<VarId> {
        self.locals
            .iter()
            .rev()
            .copied()
            .find(|&var| self.ast.vars[var].name == name)
    }

    /// Yields a `Var` node for a variable, copying the variable's
    /// type when it is already known.
    fn var_node(&mut self, var: VarId, span: Span) -> NodeId {
        let ty = self.ast.vars[var].ty.clone();
        let kind = NodeKind::Var { var };
        match ty {
            Some(ty) => self.ast.add_typed_node(kind, ty, span),
            None => self.ast.add_node(kind, span),
        }
    }
}
