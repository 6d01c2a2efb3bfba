//! ninec-gen - x86-64 code generation.
//!
//! Lowers the annotated AST to GNU-assembler Intel-syntax x86-64 for
//! the Linux System V ABI. The machine stack doubles as the
//! evaluation stack: generating an expression leaves exactly one
//! 8-byte value pushed, addresses are pushed by [`gen_addr`] for the
//! addressable node kinds (variable, dereference, index), and loads
//! and stores pick 1-byte or 8-byte accesses from the type's size.
//!
//! Emission is incremental, in program order, through any
//! [`std::io::Write`] sink: the `.intel_syntax` header, the `.data`
//! section (globals in declaration order), then `.text` with one
//! prologue/body/epilogue per function.
//!
//! [`gen_addr`]: CodeGen::gen_addr
//!
//! # Example
//!
//! ```
//! use ninec_lex::tokenize;
//! use ninec_par::parse;
//! use ninec_sem::annotate;
//! use ninec_gen::generate;
//!
//! let mut ast = parse(tokenize("func main() int { return 0 }").unwrap()).unwrap();
//! annotate(&mut ast).unwrap();
//!
//! let mut asm = Vec::new();
//! generate(&mut ast, &mut asm).unwrap();
//! assert!(String::from_utf8(asm).unwrap().starts_with(".intel_syntax noprefix\n"));
//! ```

mod error;

pub use error::{CodegenError, Result};

use std::io::Write;

use ninec_par::{Ast, BinOp, NodeId, NodeKind, VarId};
use ninec_ty::Type;
use ninec_util::{FxHashSet, Symbol};

/// Argument registers for 1-byte values, in position order.
const ARGREG1: [&str; 6] = ["dil", "sil", "dl", "cl", "r8b", "r9b"];

/// Argument registers for 8-byte values, in position order.
const ARGREG8: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

/// Emits the whole program as assembly text.
///
/// Assigns frame offsets into the variable records as a side effect
/// (the reason the AST is taken mutably); everything else is a read.
pub fn generate<W: Write>(ast: &mut Ast, out: &mut W) -> Result<()> {
    let mut gen = CodeGen {
        ast,
        out,
        labels: 0,
        current_fn: Symbol::intern(""),
    };
    gen.emit_program()
}

/// Generator state.
struct CodeGen<'a, W: Write> {
    /// The annotated program. Mutated only to record frame offsets.
    ast: &'a mut Ast,

    /// The assembly sink.
    out: &'a mut W,

    /// Monotonic counter behind the `.L.end.N` / `.L.else.N` /
    /// `.L.begin.N` / `.L.call.N` label families.
    labels: u32,

    /// Name of the function being emitted, for `.L.return.<name>`.
    current_fn: Symbol,
}

impl<W: Write> CodeGen<'_, W> {
    fn emit_program(&mut self) -> Result<()> {
        writeln!(self.out, ".intel_syntax noprefix")?;
        self.emit_data()?;
        self.emit_text()
    }

    /// The `.data` section: one label per global, in declaration
    /// order. String-literal globals carry their bytes; everything
    /// else is zero-initialised to its size.
    fn emit_data(&mut self) -> Result<()> {
        writeln!(self.out, ".data")?;

        for var in self.ast.globals.values() {
            let var = &self.ast.vars[*var];
            writeln!(self.out, "{}:", var.name)?;

            match &var.content {
                Some(content) if !content.is_empty() => {
                    for byte in content.bytes() {
                        writeln!(self.out, "  .byte {}", byte)?;
                    }
                }
                _ => {
                    let size = var.ty.as_ref().map(Type::size).unwrap_or(0);
                    writeln!(self.out, "  .zero {}", size)?;
                }
            }
        }
        Ok(())
    }

    /// The `.text` section: every function in order of appearance.
    fn emit_text(&mut self) -> Result<()> {
        writeln!(self.out, ".text")?;

        for decl in self.ast.decls.clone() {
            let NodeKind::Func {
                name,
                params,
                locals,
                body,
            } = self.ast.nodes[decl].kind.clone()
            else {
                return Err(CodegenError::Internal(
                    "top-level declaration is not a function".into(),
                ));
            };

            writeln!(self.out, ".global {}", name)?;
            writeln!(self.out, "{}:", name)?;
            self.current_fn = name;

            let frame_size = self.assign_offsets(&params, &locals)?;

            writeln!(self.out, "  push rbp")?;
            writeln!(self.out, "  mov rbp, rsp")?;
            writeln!(self.out, "  sub rsp, {}", frame_size)?;
            self.store_params(name, &params)?;

            self.gen(body)?;

            writeln!(self.out, ".L.return.{}:", name)?;
            writeln!(self.out, "  mov rsp, rbp")?;
            writeln!(self.out, "  pop rbp")?;
            writeln!(self.out, "  ret")?;
        }
        Ok(())
    }

    /// Assigns a frame offset to every local of one function:
    /// parameters first, then the remaining locals, each at the
    /// running sum of sizes including itself. Returns the total frame
    /// size.
    fn assign_offsets(&mut self, params: &[NodeId], locals: &[VarId]) -> Result<u64> {
        let mut offset = 0u64;

        let mut param_vars = FxHashSet::default();
        for &param in params {
            let var = self.param_var(param)?;
            param_vars.insert(var);
            offset += self.var_size(var)?;
            self.ast.vars[var].offset = offset;
        }

        for &var in locals {
            if param_vars.contains(&var) {
                continue;
            }
            offset += self.var_size(var)?;
            self.ast.vars[var].offset = offset;
        }
        Ok(offset)
    }

    /// Stores the incoming register arguments into their frame slots,
    /// picking the 1-byte or 8-byte register set from the parameter
    /// size.
    fn store_params(&mut self, fn_name: Symbol, params: &[NodeId]) -> Result<()> {
        for (i, &param) in params.iter().enumerate() {
            if i >= ARGREG8.len() {
                return Err(CodegenError::TooManyArgs {
                    name: fn_name,
                    span: self.ast.nodes[param].span,
                });
            }
            let var = self.param_var(param)?;
            let offset = self.ast.vars[var].offset;
            match self.var_size(var)? {
                1 => writeln!(self.out, "  mov [rbp-{}], {}", offset, ARGREG1[i])?,
                8 => writeln!(self.out, "  mov [rbp-{}], {}", offset, ARGREG8[i])?,
                size => {
                    return Err(CodegenError::InvalidParamSize {
                        name: self.ast.vars[var].name,
                        size,
                        span: self.ast.nodes[param].span,
                    })
                }
            }
        }
        Ok(())
    }

    /// Generates one node. Every expression leaves exactly one value
    /// pushed.
    fn gen(&mut self, id: NodeId) -> Result<()> {
        match self.ast.nodes[id].kind.clone() {
            NodeKind::Num { value } => {
                writeln!(self.out, "  push {}", value)?;
            }

            NodeKind::Var { .. } => {
                self.gen_addr(id)?;
                self.load(id)?;
            }

            NodeKind::Assign { lhs, rhs } => {
                self.gen_addr(lhs)?;
                self.gen(rhs)?;
                self.store(lhs)?;
            }

            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.gen(value)?;
                    writeln!(self.out, "  pop rax")?;
                }
                writeln!(self.out, "  jmp .L.return.{}", self.current_fn)?;
            }

            NodeKind::Binary { op, lhs, rhs } => {
                self.gen(lhs)?;
                self.gen(rhs)?;
                self.gen_binary(op)?;
            }

            NodeKind::Inc { target } => {
                self.gen_addr(target)?;
                writeln!(self.out, "  pop rax")?;
                writeln!(self.out, "  mov rdi, [rax]")?;
                writeln!(self.out, "  add rdi, 1")?;
                writeln!(self.out, "  mov [rax], rdi")?;
            }

            NodeKind::Dec { target } => {
                self.gen_addr(target)?;
                writeln!(self.out, "  pop rax")?;
                writeln!(self.out, "  mov rdi, [rax]")?;
                writeln!(self.out, "  sub rdi, 1")?;
                writeln!(self.out, "  mov [rax], rdi")?;
            }

            NodeKind::If {
                init,
                cond,
                then,
                els,
            } => {
                if let Some(init) = init {
                    self.gen(init)?;
                }
                self.gen(cond)?;
                let s = self.seq();
                writeln!(self.out, "  pop rax")?;
                writeln!(self.out, "  cmp rax, 0")?;
                if let Some(els) = els {
                    writeln!(self.out, "  je .L.else.{}", s)?;
                    self.gen(then)?;
                    writeln!(self.out, ".L.else.{}:", s)?;
                    self.gen(els)?;
                } else {
                    writeln!(self.out, "  je .L.end.{}", s)?;
                    self.gen(then)?;
                }
                writeln!(self.out, ".L.end.{}:", s)?;
            }

            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.gen(init)?;
                }
                let s = self.seq();
                writeln!(self.out, ".L.begin.{}:", s)?;
                if let Some(cond) = cond {
                    self.gen(cond)?;
                    writeln!(self.out, "  pop rax")?;
                    writeln!(self.out, "  cmp rax, 0")?;
                    writeln!(self.out, "  je .L.end.{}", s)?;
                }
                self.gen(body)?;
                if let Some(step) = step {
                    self.gen(step)?;
                }
                writeln!(self.out, "  jmp .L.begin.{}", s)?;
                writeln!(self.out, ".L.end.{}:", s)?;
            }

            NodeKind::Block { stmts } => {
                for stmt in stmts {
                    self.gen(stmt)?;
                }
            }

            NodeKind::Call { name, args } => {
                if args.len() > ARGREG8.len() {
                    return Err(CodegenError::TooManyArgs {
                        name,
                        span: self.ast.nodes[id].span,
                    });
                }
                for &arg in &args {
                    self.gen(arg)?;
                }
                for i in (0..args.len()).rev() {
                    writeln!(self.out, "  pop {}", ARGREG8[i])?;
                }

                // RSP must be 16-byte aligned at the call, and RAX
                // zeroed for variadic callees.
                let s = self.seq();
                writeln!(self.out, "  mov rax, rsp")?;
                writeln!(self.out, "  and rax, 15")?;
                writeln!(self.out, "  jnz .L.call.{}", s)?;
                writeln!(self.out, "  mov rax, 0")?;
                writeln!(self.out, "  call {}", name)?;
                writeln!(self.out, "  jmp .L.end.{}", s)?;
                writeln!(self.out, ".L.call.{}:", s)?;
                writeln!(self.out, "  sub rsp, 8")?;
                writeln!(self.out, "  mov rax, 0")?;
                writeln!(self.out, "  call {}", name)?;
                writeln!(self.out, "  add rsp, 8")?;
                writeln!(self.out, ".L.end.{}:", s)?;
                writeln!(self.out, "  push rax")?;
            }

            NodeKind::Addr { operand } => {
                self.gen_addr(operand)?;
            }

            NodeKind::Deref { operand } => {
                self.gen(operand)?;
                self.load(id)?;
            }

            NodeKind::Index { .. } => {
                self.gen_addr(id)?;
                self.load(id)?;
            }

            NodeKind::Func { .. } => {
                return Err(CodegenError::Internal(
                    "nested function definition".into(),
                ));
            }
        }
        Ok(())
    }

    /// Pushes the address of an addressable node: a variable's frame
    /// slot or data label, the value of a dereferenced pointer, or a
    /// scaled array element address.
    fn gen_addr(&mut self, id: NodeId) -> Result<()> {
        match self.ast.nodes[id].kind.clone() {
            NodeKind::Var { var } => {
                let record = &self.ast.vars[var];
                if record.is_local {
                    writeln!(self.out, "  lea rax, [rbp-{}]", record.offset)?;
                    writeln!(self.out, "  push rax")?;
                } else {
                    writeln!(self.out, "  push offset {}", record.name)?;
                }
            }

            NodeKind::Deref { operand } => {
                // The pointer value is the address.
                self.gen(operand)?;
            }

            NodeKind::Index { base, index } => {
                self.gen_addr(base)?;
                self.gen(index)?;
                let elem_size = self
                    .node_ty(base)?
                    .referent()
                    .map(Type::size)
                    .ok_or_else(|| {
                        CodegenError::Internal("indexing a type with no element".into())
                    })?;
                writeln!(self.out, "  pop rdi")?;
                writeln!(self.out, "  pop rax")?;
                writeln!(self.out, "  imul rdi, {}", elem_size)?;
                writeln!(self.out, "  add rax, rdi")?;
                writeln!(self.out, "  push rax")?;
            }

            _ => {
                return Err(CodegenError::NotAddressable {
                    span: self.ast.nodes[id].span,
                })
            }
        }
        Ok(())
    }

    /// Replaces the address on top of the stack with the value it
    /// points at: a sign-extending 1-byte load for `byte`, an 8-byte
    /// load otherwise.
    fn load(&mut self, id: NodeId) -> Result<()> {
        let size = self.node_ty(id)?.size();
        writeln!(self.out, "  pop rax")?;
        if size == 1 {
            writeln!(self.out, "  movsx rax, byte ptr [rax]")?;
        } else {
            writeln!(self.out, "  mov rax, [rax]")?;
        }
        writeln!(self.out, "  push rax")?;
        Ok(())
    }

    /// Pops a value and an address and stores the value, leaving it
    /// pushed as the expression result.
    fn store(&mut self, lhs: NodeId) -> Result<()> {
        let size = self.node_ty(lhs)?.size();
        writeln!(self.out, "  pop rdi")?;
        writeln!(self.out, "  pop rax")?;
        if size == 1 {
            writeln!(self.out, "  mov [rax], dil")?;
        } else {
            writeln!(self.out, "  mov [rax], rdi")?;
        }
        writeln!(self.out, "  push rdi")?;
        Ok(())
    }

    /// Pops both operands, applies the operation, pushes the result.
    /// Comparisons materialise 0/1 through the flag-setting idiom.
    fn gen_binary(&mut self, op: BinOp) -> Result<()> {
        writeln!(self.out, "  pop rdi")?;
        writeln!(self.out, "  pop rax")?;
        match op {
            BinOp::Add => writeln!(self.out, "  add rax, rdi")?,
            BinOp::Sub => writeln!(self.out, "  sub rax, rdi")?,
            BinOp::Mul => writeln!(self.out, "  imul rax, rdi")?,
            BinOp::Div => {
                writeln!(self.out, "  cqo")?;
                writeln!(self.out, "  idiv rdi")?;
            }
            BinOp::Eq => self.gen_compare("sete")?,
            BinOp::Ne => self.gen_compare("setne")?,
            BinOp::Lt => self.gen_compare("setl")?,
            BinOp::Le => self.gen_compare("setle")?,
        }
        writeln!(self.out, "  push rax")?;
        Ok(())
    }

    fn gen_compare(&mut self, set_instruction: &str) -> Result<()> {
        writeln!(self.out, "  cmp rax, rdi")?;
        writeln!(self.out, "  {} al", set_instruction)?;
        writeln!(self.out, "  movzb rax, al")?;
        Ok(())
    }

    /// Next unique label number.
    fn seq(&mut self) -> u32 {
        let s = self.labels;
        self.labels += 1;
        s
    }

    /// The variable behind a parameter's `Var` node.
    fn param_var(&self, param: NodeId) -> Result<VarId> {
        match self.ast.nodes[param].kind {
            NodeKind::Var { var } => Ok(var),
            _ => Err(CodegenError::Internal(
                "parameter is not a variable node".into(),
            )),
        }
    }

    fn var_size(&self, var: VarId) -> Result<u64> {
        self.ast.vars[var]
            .ty
            .as_ref()
            .map(Type::size)
            .ok_or_else(|| CodegenError::Internal("variable with no type".into()))
    }

    fn node_ty(&self, id: NodeId) -> Result<&Type> {
        self.ast.nodes[id]
            .ty
            .as_ref()
            .ok_or_else(|| CodegenError::Internal("expression with no type".into()))
    }
}
