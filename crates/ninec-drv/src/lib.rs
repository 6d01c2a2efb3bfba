//! ninec-drv - The compiler driver.
//!
//! Threads one source string through the four pipeline stages in
//! strict order: tokenize, parse, annotate, generate. Data only flows
//! forward; the first error from any stage ends compilation.
//!
//! ```text
//! source &str
//!      │
//!      ▼
//! [ninec-lex]  tokenize ──▶ TokenStream
//!      │
//!      ▼
//! [ninec-par]  parse ──▶ Ast (+ symbol tables)
//!      │
//!      ▼
//! [ninec-sem]  annotate ──▶ typed Ast (in place)
//!      │
//!      ▼
//! [ninec-gen]  generate ──▶ assembly text on the output sink
//! ```
//!
//! # Example
//!
//! ```
//! use ninec_drv::compile;
//!
//! let mut asm = Vec::new();
//! compile("func main() int { return 0 }", &mut asm).unwrap();
//! assert!(String::from_utf8(asm).unwrap().contains(".global main"));
//! ```

use std::io::Write;

use thiserror::Error;

/// Any error the pipeline can produce, one variant per stage.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Tokenization failed.
    #[error(transparent)]
    Lex(#[from] ninec_lex::LexError),

    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ninec_par::ParseError),

    /// Type annotation failed.
    #[error(transparent)]
    Type(#[from] ninec_sem::TypeError),

    /// Code generation (or writing the output) failed.
    #[error(transparent)]
    Codegen(#[from] ninec_gen::CodegenError),
}

/// Compiles one source string, writing assembly to `out`.
///
/// The generator writes incrementally in emission order; on error the
/// sink may have received a partial program.
pub fn compile(source: &str, out: &mut impl Write) -> Result<(), CompileError> {
    let tokens = ninec_lex::tokenize(source)?;
    let mut ast = ninec_par::parse(tokens)?;
    ninec_sem::annotate(&mut ast)?;
    ninec_gen::generate(&mut ast, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_to_string(source: &str) -> Result<String, CompileError> {
        let mut asm = Vec::new();
        compile(source, &mut asm)?;
        Ok(String::from_utf8(asm).expect("assembly is not UTF-8"))
    }

    #[test]
    fn stages_compose() {
        let asm = compile_to_string("func main() int { return 0 }").unwrap();
        assert!(asm.starts_with(".intel_syntax noprefix\n"));
        assert!(asm.contains(".global main"));
    }

    #[test]
    fn lex_errors_surface() {
        assert!(matches!(
            compile_to_string("func main() { # }"),
            Err(CompileError::Lex(_))
        ));
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            compile_to_string("func main() { return missing }"),
            Err(CompileError::Parse(_))
        ));
    }

    #[test]
    fn type_errors_surface() {
        assert!(matches!(
            compile_to_string("func main() { var x int; return *x }"),
            Err(CompileError::Type(_))
        ));
    }

    #[test]
    fn codegen_errors_surface() {
        assert!(matches!(
            compile_to_string("func main() { f(1, 2, 3, 4, 5, 6, 7) }"),
            Err(CompileError::Codegen(_))
        ));
    }
}
