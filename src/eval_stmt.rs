//! The statement evaluator (§4.4): the reversible heart of the language.
//!
//! Every construct is dispatched through [`Direction`], which picks
//! between a construct's forward and reverse semantics. `try`/`catch`
//! (§4.5) additionally communicates outward through [`Flow`], since a
//! `catch` deep inside nested `if`/`loop`/`for` blocks must be able to
//! unwind all the way back up to its enclosing `try`.

use crate::ast::{CallDirection, ModOp, Stmt};
use crate::call;
use crate::error::{RailwayError, RailwayResult};
use crate::eval_expr;
use crate::scope::ScopeSnapshot;
use crate::thread_ctx::ThreadContext;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Whether a block completed normally, or is unwinding/committing out of
/// a `try` search (§4.5). Only [`Stmt::Catch`] produces a non-`Normal`
/// flow; every compound statement must propagate it upward untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Normal,
    CatchCommit,
    CatchAbandon,
}

pub fn exec_block(stmts: &[Stmt], dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<Flow> {
    match dir {
        Direction::Forward => {
            for stmt in stmts {
                let flow = exec_stmt(stmt, dir, ctx)?;
                if flow != Flow::Normal {
                    return Ok(flow);
                }
            }
        }
        Direction::Reverse => {
            for stmt in stmts.iter().rev() {
                let flow = exec_stmt(stmt, dir, ctx)?;
                if flow != Flow::Normal {
                    return Ok(flow);
                }
            }
        }
    }
    Ok(Flow::Normal)
}

/// Run `body` at the top of a call or thread: any `catch` that escapes
/// unconsumed is a programmer error (§4.5's `try` is the only legal home
/// for `catch`).
pub fn exec_top_level(stmts: &[Stmt], dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<()> {
    match exec_block(stmts, dir, ctx)? {
        Flow::Normal => Ok(()),
        _ => Err(RailwayError::scope_error("'catch' used outside of an enclosing 'try'")),
    }
}

fn eval(expr: &crate::ast::Expr, ctx: &ThreadContext) -> RailwayResult<Value> {
    eval_expr::eval(expr, ctx.scope(), ctx)
}

fn exec_stmt(stmt: &Stmt, dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<Flow> {
    match stmt {
        Stmt::Let { name, expr } => {
            exec_let_unlet(name, expr.as_ref(), dir, ctx, /* is_let */ true)?;
            Ok(Flow::Normal)
        }
        Stmt::Unlet { name, expr } => {
            exec_let_unlet(name, expr.as_ref(), dir, ctx, /* is_let */ false)?;
            Ok(Flow::Normal)
        }
        Stmt::Push { name, stack } => {
            exec_push_pop(name, stack, dir, ctx, /* is_push */ true)?;
            Ok(Flow::Normal)
        }
        Stmt::Pop { name, stack } => {
            exec_push_pop(name, stack, dir, ctx, /* is_push */ false)?;
            Ok(Flow::Normal)
        }
        Stmt::Swap { a, b } => {
            let va = ctx.scope().get(a)?;
            let vb = ctx.scope().get(b)?;
            ctx.scope_mut().set(a, vb)?;
            ctx.scope_mut().set(b, va)?;
            Ok(Flow::Normal)
        }
        Stmt::Promote { from, to } => {
            match dir {
                Direction::Forward => {
                    let value = ctx.scope_mut().take_mono(from)?;
                    ctx.scope_mut().let_(to, value)?;
                }
                Direction::Reverse => {
                    let value = ctx.scope_mut().unlet(to, None)?;
                    ctx.scope_mut().let_(from, value)?;
                    if !ctx.scope().is_mono(from)? {
                        return Err(RailwayError::scope_error(format!(
                            "'promote' target '{from}' must be monodirectional (leading '.')"
                        )));
                    }
                }
            }
            Ok(Flow::Normal)
        }
        Stmt::ModOpStmt { target, op, expr } => {
            exec_modop(target, *op, expr, dir, ctx)?;
            Ok(Flow::Normal)
        }
        Stmt::If { cond, then_branch, else_branch, post_cond } => exec_if(cond, then_branch, else_branch, post_cond, dir, ctx),
        Stmt::Loop { entry, body, exit } => exec_loop(entry, exit, body, dir, ctx),
        Stmt::For { var, start, end, step, body } => exec_for(var, start, end, step, body, dir, ctx),
        Stmt::Barrier(name) => {
            ctx.hub.barrier(name, ctx.n_threads)?;
            Ok(Flow::Normal)
        }
        Stmt::Mutex { name, body } => {
            let hub = ctx.hub.clone();
            hub.with_mutex(name, || exec_block(body, dir, ctx))
        }
        Stmt::DoYieldUndo { do_block, yield_block } => {
            exec_block(do_block, Direction::Forward, ctx)?;
            let flow = exec_block(yield_block, dir, ctx)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
            exec_block(do_block, Direction::Reverse, ctx)?;
            Ok(Flow::Normal)
        }
        Stmt::Try { var, start, end, step, body } => exec_try(var, start, end, step, body, dir, ctx),
        Stmt::Catch(cond) => {
            let v = eval(cond, ctx)?;
            Ok(if v.truthy()? { Flow::CatchCommit } else { Flow::CatchAbandon })
        }
        Stmt::Call(call_stmt) => {
            let direction = match (call_stmt.direction, dir) {
                (CallDirection::Call, Direction::Forward) => Direction::Forward,
                (CallDirection::Call, Direction::Reverse) => Direction::Reverse,
                (CallDirection::Uncall, Direction::Forward) => Direction::Reverse,
                (CallDirection::Uncall, Direction::Reverse) => Direction::Forward,
            };
            call::dispatch(call_stmt, direction, ctx)?;
            Ok(Flow::Normal)
        }
        Stmt::Print { items, newline } => {
            exec_print(items, *newline, dir, ctx)?;
            Ok(Flow::Normal)
        }
    }
}

fn exec_let_unlet(
    name: &str,
    expr: Option<&crate::ast::Expr>,
    dir: Direction,
    ctx: &mut ThreadContext,
    is_let: bool,
) -> RailwayResult<()> {
    // `let` forward == `unlet` reverse; `unlet` forward == `let` reverse.
    let acts_as_let = is_let == (dir == Direction::Forward);
    if acts_as_let {
        let value = match expr {
            Some(e) => eval(e, ctx)?,
            None => Value::zero(),
        };
        ctx.scope_mut().let_(name, value)
    } else {
        let expected = match expr {
            Some(e) => eval(e, ctx)?,
            None => Value::zero(),
        };
        ctx.scope_mut().unlet(name, Some(&expected)).map(|_| ())
    }
}

fn exec_push_pop(name: &str, stack: &str, dir: Direction, ctx: &mut ThreadContext, is_push: bool) -> RailwayResult<()> {
    // `push` forward == `pop` reverse; `pop` forward == `push` reverse.
    let acts_as_push = is_push == (dir == Direction::Forward);
    if acts_as_push {
        let value = ctx.scope().get(name)?;
        ctx.scope().with_value_mut(stack, |s| {
            s.as_array_mut()?.push(value.clone());
            Ok(())
        })?;
        ctx.scope_mut().unlet(name, None)?;
    } else {
        let value = ctx.scope().with_value_mut(stack, |s| {
            s.as_array_mut()?
                .pop()
                .ok_or_else(|| RailwayError::reversibility(format!("pop from empty stack '{stack}'")))
        })?;
        ctx.scope_mut().let_(name, value)?;
    }
    Ok(())
}

fn collect_lookup_names<'a>(expr: &'a crate::ast::Expr, out: &mut Vec<&'a str>) {
    use crate::ast::Expr::*;
    match expr {
        Number(_) | ThreadId | NumThreads => {}
        Lookup(l) => {
            out.push(&l.name);
            for idx in &l.indices {
                collect_lookup_names(idx, out);
            }
        }
        ArrayLiteral(items) => items.iter().for_each(|e| collect_lookup_names(e, out)),
        ArrayRange { start, end, step } => {
            collect_lookup_names(start, out);
            collect_lookup_names(end, out);
            if let Some(s) = step {
                collect_lookup_names(s, out);
            }
        }
        ArrayTensor { fill, shape } => {
            collect_lookup_names(fill, out);
            shape.iter().for_each(|e| collect_lookup_names(e, out));
        }
        Len(e) | UnOp(_, e) => collect_lookup_names(e, out),
        BinOp(_, l, r) => {
            collect_lookup_names(l, out);
            collect_lookup_names(r, out);
        }
    }
}

fn apply_modop(op: ModOp, current: &Value, rhs: &Value) -> RailwayResult<Value> {
    match op {
        ModOp::AddAssign => current.add(rhs),
        ModOp::SubAssign => current.sub(rhs),
        ModOp::MulAssign => current.mul(rhs),
        ModOp::DivAssign => current.div(rhs),
        ModOp::XorAssign => current.bitxor(rhs),
    }
}

fn exec_modop(target: &crate::ast::Lookup, op: ModOp, rhs_expr: &crate::ast::Expr, dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<()> {
    let mut refs = Vec::new();
    collect_lookup_names(rhs_expr, &mut refs);
    if refs.iter().any(|n| *n == target.name) {
        return Err(RailwayError::reversibility(format!(
            "modop on '{}' reads its own value on the right-hand side",
            target.name
        )));
    }
    let rhs = eval(rhs_expr, ctx)?;
    let index_values = target
        .indices
        .iter()
        .map(|e| eval(e, ctx))
        .collect::<RailwayResult<Vec<_>>>()?;
    let effective_op = match dir {
        Direction::Forward => op,
        Direction::Reverse => op.inverse(),
    };
    ctx.scope().with_value_mut(&target.name, |root| {
        let mut cur = root;
        for idx_val in &index_values {
            let n = idx_val.as_number()?;
            let items = cur.as_array_mut()?;
            let i = Value::resolve_index(items.len(), n)?;
            cur = &mut items[i];
        }
        *cur = apply_modop(effective_op, cur, &rhs)?;
        Ok(())
    })
}

fn exec_if(
    cond: &crate::ast::Expr,
    then_branch: &[Stmt],
    else_branch: &[Stmt],
    post_cond: &Option<crate::ast::Expr>,
    dir: Direction,
    ctx: &mut ThreadContext,
) -> RailwayResult<Flow> {
    let effective_post = post_cond.as_ref().unwrap_or(cond);
    match dir {
        Direction::Forward => {
            let guard = eval(cond, ctx)?.truthy()?;
            let branch = if guard { then_branch } else { else_branch };
            let flow = exec_block(branch, dir, ctx)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
            let check = eval(effective_post, ctx)?.truthy()?;
            if check != guard {
                return Err(RailwayError::reversibility("'if' post-predicate did not match the original guard"));
            }
            Ok(Flow::Normal)
        }
        Direction::Reverse => {
            let select = eval(effective_post, ctx)?.truthy()?;
            let branch = if select { then_branch } else { else_branch };
            let flow = exec_block(branch, dir, ctx)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
            let check = eval(cond, ctx)?.truthy()?;
            if check != select {
                return Err(RailwayError::reversibility("'if' guard did not match the post-predicate on reverse"));
            }
            Ok(Flow::Normal)
        }
    }
}

fn exec_loop(entry: &crate::ast::Expr, exit: &crate::ast::Expr, body: &[Stmt], dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<Flow> {
    match dir {
        Direction::Forward => {
            if !eval(entry, ctx)?.truthy()? {
                return Err(RailwayError::reversibility("loop entry predicate was false on entry"));
            }
            loop {
                let flow = exec_block(body, Direction::Forward, ctx)?;
                if flow != Flow::Normal {
                    return Ok(flow);
                }
                if eval(exit, ctx)?.truthy()? {
                    continue;
                }
                if eval(entry, ctx)?.truthy()? {
                    return Err(RailwayError::reversibility(
                        "loop invariant violated: entry predicate still true after exit predicate went false",
                    ));
                }
                return Ok(Flow::Normal);
            }
        }
        // A forward run's own termination check guarantees both predicates
        // are false in the state reverse begins from: `exit` went false to
        // stop the loop, and `entry` was checked false right alongside it.
        // So reverse can't re-use forward's "check true to proceed" shape
        // with the predicates merely swapped in; it has to walk backward
        // while `entry` stays false, stopping once `entry` becomes true
        // again, which is exactly the state the forward loop started from.
        Direction::Reverse => {
            if eval(exit, ctx)?.truthy()? {
                return Err(RailwayError::reversibility("loop exit predicate was true entering reverse execution"));
            }
            if eval(entry, ctx)?.truthy()? {
                return Err(RailwayError::reversibility("loop entry predicate was true entering reverse execution"));
            }
            loop {
                let flow = exec_block(body, Direction::Reverse, ctx)?;
                if flow != Flow::Normal {
                    return Ok(flow);
                }
                if !eval(entry, ctx)?.truthy()? {
                    continue;
                }
                return Ok(Flow::Normal);
            }
        }
    }
}

fn range_values(start: &crate::ast::Expr, end: &crate::ast::Expr, step: &Option<crate::ast::Expr>, ctx: &ThreadContext) -> RailwayResult<Vec<Value>> {
    let range_expr = crate::ast::Expr::ArrayRange {
        start: Box::new(start.clone()),
        end: Box::new(end.clone()),
        step: step.clone().map(Box::new),
    };
    Ok(eval(&range_expr, ctx)?.as_array()?.to_vec())
}

fn exec_for(
    var: &str,
    start: &crate::ast::Expr,
    end: &crate::ast::Expr,
    step: &Option<crate::ast::Expr>,
    body: &[Stmt],
    dir: Direction,
    ctx: &mut ThreadContext,
) -> RailwayResult<Flow> {
    let values = range_values(start, end, step, ctx)?;
    let (iter_values, body_dir): (Vec<Value>, Direction) = match dir {
        Direction::Forward => (values, Direction::Forward),
        Direction::Reverse => (values.into_iter().rev().collect(), Direction::Reverse),
    };
    for v in iter_values {
        ctx.scope_mut().let_(var, v)?;
        let flow = exec_block(body, body_dir, ctx)?;
        ctx.scope_mut().unlet(var, None)?;
        if flow != Flow::Normal {
            return Ok(flow);
        }
    }
    Ok(Flow::Normal)
}

fn exec_try(
    var: &str,
    start: &crate::ast::Expr,
    end: &crate::ast::Expr,
    step: &Option<crate::ast::Expr>,
    body: &[Stmt],
    dir: Direction,
    ctx: &mut ThreadContext,
) -> RailwayResult<Flow> {
    match dir {
        Direction::Forward => {
            let candidates = range_values(start, end, step, ctx)?;
            for candidate in candidates {
                let snapshot: ScopeSnapshot = ctx.scope().snapshot();
                ctx.scope_mut().let_(var, candidate)?;
                let flow = exec_block(body, Direction::Forward, ctx)?;
                match flow {
                    Flow::CatchCommit => return Ok(Flow::Normal),
                    Flow::CatchAbandon | Flow::Normal => {
                        ctx.scope_mut().restore(snapshot);
                    }
                }
            }
            Err(RailwayError::try_exhausted(format!("no value of '{var}' satisfied any 'catch'")))
        }
        Direction::Reverse => {
            // `var` is already bound (the committed value from the
            // forward search, or a caller-supplied input); we run the
            // body once, backward, treating any `catch` we pass through
            // as a no-op, since we already know which branch committed.
            if !ctx.scope().contains(var) {
                return Err(RailwayError::scope_error(format!(
                    "reversing 'try' requires '{var}' to already be bound"
                )));
            }
            exec_block_ignoring_catch(body, Direction::Reverse, ctx)?;
            Ok(Flow::Normal)
        }
    }
}

/// Runs a block in reverse for an already-resolved `try`. The committing
/// forward attempt only ever ran the statements up to (and including) its
/// `catch`; anything after it never executed, so reversing must stop at
/// that same point rather than walking the whole body (see [`exec_try`]'s
/// reverse case).
fn exec_block_ignoring_catch(stmts: &[Stmt], dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<()> {
    let ran = match stmts.iter().position(|s| matches!(s, Stmt::Catch(_))) {
        Some(idx) => &stmts[..idx],
        None => stmts,
    };
    for stmt in ran.iter().rev() {
        exec_stmt(stmt, dir, ctx)?;
    }
    Ok(())
}

fn exec_print(items: &[crate::ast::PrintItem], newline: bool, dir: Direction, ctx: &mut ThreadContext) -> RailwayResult<()> {
    // Silent under reverse (§9(c)).
    if dir == Direction::Reverse {
        return Ok(());
    }
    let mut rendered = Vec::with_capacity(items.len());
    for item in items {
        match item {
            crate::ast::PrintItem::Str(s) => rendered.push(s.clone()),
            crate::ast::PrintItem::Expr(e) => rendered.push(eval(e, ctx)?.to_string()),
        }
    }
    print!("{}", rendered.join(" "));
    if newline {
        println!();
    }
    Ok(())
}
