//! The call dispatcher (§4.8): alias binding of actual arguments to a
//! function's two parameter lists, forward/reverse invocation, and the
//! parallel `call f{N}(...)` fan-out across OS threads.

use std::sync::Arc;

use num_traits::Signed;

use crate::ast::{CallStmt, Function};
use crate::error::{RailwayError, RailwayResult};
use crate::eval_stmt::{self, Direction};
use crate::scope::Scope;
use crate::thread_ctx::ThreadContext;

pub fn dispatch(call: &CallStmt, dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<()> {
    let n_threads = match &call.threads {
        Some(expr) => {
            let v = eval_stmt_eval(expr, ctx)?;
            let n = v.as_number()?;
            if !n.is_integer() || n.is_negative() {
                return Err(RailwayError::type_error("'call f{N}' thread count must be a non-negative integer"));
            }
            n.to_integer()
                .to_string()
                .parse::<usize>()
                .map_err(|_| RailwayError::type_error("thread count out of representable range"))?
        }
        None => 1,
    };

    if n_threads <= 1 {
        return invoke(call, dir, ctx);
    }

    // Parallel form: every thread gets its own ThreadContext sharing the
    // registry and sync hub, and its own aliased cells into the caller's
    // storage, so mutations through different threads are genuinely
    // visible to each other (§4.7, §5).
    let module = ctx.module.clone();
    let registry = ctx.registry.clone();
    let hub = ctx.hub.clone();
    let borrow_cells: Vec<_> = call.args.iter().map(|n| ctx.scope().alias_cell(n)).collect::<RailwayResult<_>>()?;
    let inout_cells: Vec<_> = call.outs.iter().map(|n| ctx.scope().alias_cell(n)).collect::<RailwayResult<_>>()?;

    let function = registry.function(&module, &call.function)?.clone();
    let call = call.clone();

    let mut handles = Vec::with_capacity(n_threads);
    for tid in 0..n_threads {
        let module = module.clone();
        let registry = Arc::clone(&registry);
        let hub = Arc::clone(&hub);
        let borrow_cells = borrow_cells.clone();
        let inout_cells = inout_cells.clone();
        let function = function.clone();
        let call = call.clone();
        handles.push(std::thread::spawn(move || -> RailwayResult<()> {
            let mut thread_ctx = ThreadContext::new(tid, n_threads, module, registry, hub);
            invoke_function(&function, &call, dir, &mut thread_ctx, borrow_cells, inout_cells)
        }));
    }
    for handle in handles {
        handle
            .join()
            .map_err(|_| RailwayError::sync_error("a parallel call thread panicked"))??;
    }
    Ok(())
}

fn eval_stmt_eval(expr: &crate::ast::Expr, ctx: &ThreadContext) -> RailwayResult<crate::value::Value> {
    crate::eval_expr::eval(expr, ctx.scope(), ctx)
}

fn invoke(call: &CallStmt, dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<()> {
    let function = ctx.registry.function(&ctx.module, &call.function)?.clone();
    let borrow_cells: Vec<_> = call.args.iter().map(|n| ctx.scope().alias_cell(n)).collect::<RailwayResult<_>>()?;
    let inout_cells: Vec<_> = call.outs.iter().map(|n| ctx.scope().alias_cell(n)).collect::<RailwayResult<_>>()?;
    invoke_function(&function, call, dir, ctx, borrow_cells, inout_cells)
}

/// Bind `borrow_cells`/`inout_cells` into a fresh frame under the
/// function's parameter names, run its body in `dir`, then check the
/// frame is empty of bidirectional names before popping it (§4.8's
/// dynamic check).
fn invoke_function(
    function: &Function,
    call: &CallStmt,
    dir: Direction,
    ctx: &mut ThreadContext,
    borrow_cells: Vec<crate::scope::Cell>,
    inout_cells: Vec<crate::scope::Cell>,
) -> RailwayResult<()> {
    if borrow_cells.len() != function.borrow_params.len() {
        return Err(RailwayError::scope_error(format!(
            "'{}' expects {} borrowed argument(s), got {}",
            function.name,
            function.borrow_params.len(),
            borrow_cells.len()
        )));
    }
    if inout_cells.len() != function.inout_params.len() {
        return Err(RailwayError::scope_error(format!(
            "'{}' expects {} in-out argument(s), got {}",
            function.name,
            function.inout_params.len(),
            inout_cells.len()
        )));
    }

    let mut frame = Scope::new();
    for (param, cell) in function.borrow_params.iter().zip(borrow_cells) {
        frame.let_cell(param, cell)?;
    }
    for (param, cell) in function.inout_params.iter().zip(inout_cells) {
        frame.let_cell(param, cell)?;
    }

    ctx.push_frame(frame);
    let result = (|| -> RailwayResult<()> {
        eval_stmt::exec_top_level(&function.body, dir, ctx)?;
        // Parameters are bound by the dispatcher, not by a `let` in the
        // body, so they are exempt from the "every let has an unlet"
        // check, only names the body itself introduced must be gone.
        let stray: Vec<String> = ctx
            .scope()
            .names_bidirectional()
            .into_iter()
            .filter(|n| !function.borrow_params.contains(n) && !function.inout_params.contains(n))
            .collect();
        if !stray.is_empty() {
            return Err(RailwayError::scope_error(format!("call to '{}' returned with unbound locals: {stray:?}", call.function)));
        }
        Ok(())
    })();
    ctx.pop_frame();
    result
}
