//! The runner (§4.9, §6): loads the root module and its imports, builds
//! `argv` from CLI-style inputs, and invokes `main` on the configured
//! thread pool.
//!
//! Typed file loading and argv construction are the "external interface"
//! ambient concerns named in §6, kept here, at the edge, rather than
//! inside the evaluator.

use std::path::Path;
use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::error::{RailwayError, RailwayResult};
use crate::eval_stmt::{self, Direction};
use crate::registry::ModuleRegistry;
use crate::scope::Scope;
use crate::sync::SyncHub;
use crate::thread_ctx::ThreadContext;
use crate::value::Value;

/// One CLI-specified contribution to `argv`, in the order given on the
/// command line (§6).
#[derive(Debug, Clone)]
pub enum ArgvItem {
    Int(i64),
    F32File(String),
    F64File(String),
    I32File(String),
    I64File(String),
}

#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub argv_items: Vec<ArgvItem>,
    pub threads: usize,
}

pub fn run_file(path: &Path, config: &RunConfig) -> RailwayResult<()> {
    let (registry, root_name) = ModuleRegistry::load_root(path)?;
    run(Arc::new(registry), &root_name, config)
}

pub fn run(registry: Arc<ModuleRegistry>, root_name: &str, config: &RunConfig) -> RailwayResult<()> {
    let argv = build_argv(&config.argv_items)?;
    let main_fn = registry.function(root_name, "main")?.clone();
    let hub = SyncHub::new();
    let n_threads = config.threads.max(1);

    if n_threads == 1 {
        let mut ctx = ThreadContext::new(0, 1, root_name.to_string(), registry, hub);
        return run_main(&main_fn, argv, &mut ctx);
    }

    let mut handles = Vec::with_capacity(n_threads);
    for tid in 0..n_threads {
        let registry = Arc::clone(&registry);
        let hub = Arc::clone(&hub);
        let root_name = root_name.to_string();
        let main_fn = main_fn.clone();
        let argv = argv.clone();
        handles.push(std::thread::spawn(move || -> RailwayResult<()> {
            let mut ctx = ThreadContext::new(tid, n_threads, root_name, registry, hub);
            run_main(&main_fn, argv, &mut ctx)
        }));
    }
    for handle in handles {
        handle.join().map_err(|_| RailwayError::sync_error("main thread panicked"))??;
    }
    Ok(())
}

fn run_main(main_fn: &crate::ast::Function, argv: Vec<Value>, ctx: &mut ThreadContext) -> RailwayResult<()> {
    let mut frame = Scope::new();
    frame.let_("argv", Value::Array(argv))?;
    ctx.push_frame(frame);
    let result = (|| {
        eval_stmt::exec_top_level(&main_fn.body, Direction::Forward, ctx)?;
        // `argv` is seeded by the runner, not by a `let` in `main`'s body,
        // so (like a function's own parameters) it is exempt from the
        // "every let has a matching unlet" check.
        let stray: Vec<String> = ctx.scope().names_bidirectional().into_iter().filter(|n| n != "argv").collect();
        if !stray.is_empty() {
            return Err(RailwayError::scope_error(format!("'main' returned with unbound locals: {stray:?}")));
        }
        Ok(())
    })();
    ctx.pop_frame();
    result
}

fn build_argv(items: &[ArgvItem]) -> RailwayResult<Vec<Value>> {
    items
        .iter()
        .map(|item| match item {
            ArgvItem::Int(n) => Ok(Value::from_i64(*n)),
            ArgvItem::F32File(path) => load_typed_file(path, 4, |bytes| {
                f64_to_rational(f32::from_le_bytes(bytes.try_into().unwrap()) as f64)
            }),
            ArgvItem::F64File(path) => load_typed_file(path, 8, |bytes| f64_to_rational(f64::from_le_bytes(bytes.try_into().unwrap()))),
            ArgvItem::I32File(path) => load_typed_file(path, 4, |bytes| {
                Ok(BigRational::from_integer(BigInt::from(i32::from_le_bytes(bytes.try_into().unwrap()))))
            }),
            ArgvItem::I64File(path) => load_typed_file(path, 8, |bytes| {
                Ok(BigRational::from_integer(BigInt::from(i64::from_le_bytes(bytes.try_into().unwrap()))))
            }),
        })
        .collect()
}

fn load_typed_file(path: &str, width: usize, convert: impl Fn(&[u8]) -> RailwayResult<BigRational>) -> RailwayResult<Value> {
    let bytes = std::fs::read(path).map_err(|e| RailwayError::load_error(format!("reading '{path}': {e}")))?;
    if bytes.len() % width != 0 {
        return Err(RailwayError::load_error(format!(
            "'{path}' length {} is not a multiple of the element width {width}",
            bytes.len()
        )));
    }
    let values = bytes
        .chunks_exact(width)
        .map(|chunk| convert(chunk).map(Value::Number))
        .collect::<RailwayResult<Vec<_>>>()?;
    Ok(Value::Array(values))
}

/// The exact rational value of a finite `f64`, via its IEEE-754 bit
/// decomposition (no precision is lost or approximated beyond what the
/// float itself already discarded).
fn f64_to_rational(f: f64) -> RailwayResult<BigRational> {
    if !f.is_finite() {
        return Err(RailwayError::load_error("typed file contains a non-finite float"));
    }
    if f == 0.0 {
        return Ok(BigRational::from_integer(BigInt::from(0)));
    }
    let bits = f.to_bits();
    let sign: i64 = if bits >> 63 == 1 { -1 } else { 1 };
    let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
    let mantissa_bits = bits & 0x000f_ffff_ffff_ffff;
    let (mantissa, exponent) = if biased_exponent == 0 {
        (mantissa_bits, -1074i64)
    } else {
        (mantissa_bits | (1u64 << 52), biased_exponent - 1075)
    };
    let signed_mantissa = BigInt::from(mantissa) * BigInt::from(sign);
    Ok(if exponent >= 0 {
        BigRational::from_integer(signed_mantissa * BigInt::from(2).pow(exponent as u32))
    } else {
        BigRational::new(signed_mantissa, BigInt::from(2).pow((-exponent) as u32))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Function, Module, Stmt};

    /// A `main` that consumes `argv` with a self-referencing unlet check
    /// (always true), so it leaves no unbound locals behind.
    fn echo_module() -> Module {
        Module {
            name: "main".into(),
            globals: vec![],
            functions: vec![Function {
                name: "main".into(),
                borrow_params: vec![],
                inout_params: vec![],
                body: vec![Stmt::Unlet { name: "argv".into(), expr: Some(Expr::var("argv")) }],
            }],
            imports: vec![],
        }
    }

    #[test]
    fn f64_roundtrips_exactly() {
        let r = f64_to_rational(0.25).unwrap();
        assert_eq!(r, BigRational::new(BigInt::from(1), BigInt::from(4)));
    }

    #[test]
    fn negative_f64_roundtrips() {
        let r = f64_to_rational(-2.5).unwrap();
        assert_eq!(r, BigRational::new(BigInt::from(-5), BigInt::from(2)));
    }

    #[test]
    fn run_main_seeds_argv_from_cli_ints() {
        let registry = Arc::new(ModuleRegistry::from_modules(vec![echo_module()], "main").unwrap());
        let config = RunConfig { argv_items: vec![ArgvItem::Int(7)], threads: 1 };
        run(registry, "main", &config).unwrap();
    }
}
