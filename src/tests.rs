//! End-to-end scenarios (§8): whole functions built from the AST and run
//! through the real call dispatcher and runner, as opposed to the
//! per-construct unit tests living alongside each module.

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::call;
    use crate::eval_stmt::{exec_top_level, Direction};
    use crate::registry::ModuleRegistry;
    use crate::sync::SyncHub;
    use crate::thread_ctx::ThreadContext;
    use crate::value::Value;
    use num_bigint::BigInt;
    use num_rational::BigRational;
    use std::sync::Arc;

    fn ctx_for(registry: ModuleRegistry) -> ThreadContext {
        ThreadContext::new(0, 1, "main".into(), Arc::new(registry), SyncHub::new())
    }

    // §8: "Fibonacci forward/reverse", start (a, b) = (0, 1); for n
    // iterations, b += a then swap(a, b); after n = 10 iterations
    // a = Fib(10) = 55 and b = Fib(9) = 34. Uncalling restores (0, 1).
    #[test]
    fn fibonacci_forward_and_reverse() {
        let module = Module {
            name: "main".into(),
            globals: vec![],
            functions: vec![Function {
                name: "fib".into(),
                borrow_params: vec!["n".into()],
                inout_params: vec!["a".into(), "b".into()],
                body: vec![Stmt::For {
                    var: ".i".into(),
                    start: Expr::int(0),
                    end: Expr::var("n"),
                    step: None,
                    body: vec![
                        Stmt::ModOpStmt { target: Lookup::plain("b"), op: ModOp::AddAssign, expr: Expr::var("a") },
                        Stmt::Swap { a: "a".into(), b: "b".into() },
                    ],
                }],
            }],
            imports: vec![],
        };
        let registry = ModuleRegistry::from_modules(vec![module], "main").unwrap();
        let mut ctx = ctx_for(registry);
        ctx.scope_mut().let_("n", Value::from_i64(10)).unwrap();
        ctx.scope_mut().let_("a", Value::from_i64(0)).unwrap();
        ctx.scope_mut().let_("b", Value::from_i64(1)).unwrap();

        let call = CallStmt { direction: CallDirection::Call, function: "fib".into(), args: vec!["n".into()], outs: vec!["a".into(), "b".into()], threads: None };
        call::dispatch(&call, Direction::Forward, &mut ctx).unwrap();
        assert_eq!(ctx.scope().get("a").unwrap(), Value::from_i64(55));
        assert_eq!(ctx.scope().get("b").unwrap(), Value::from_i64(34));

        call::dispatch(&call, Direction::Reverse, &mut ctx).unwrap();
        assert_eq!(ctx.scope().get("a").unwrap(), Value::from_i64(0));
        assert_eq!(ctx.scope().get("b").unwrap(), Value::from_i64(1));
    }

    // §8: run-length encoding. `input` carries a sentinel one past its
    // real length so the inner loop's entry/exit predicate can always
    // index safely, even on the run that reaches the end of the data.
    fn rle_module() -> Module {
        let idx_i = || Lookup::indexed("input", vec![Expr::var("i")]);
        let same_run = Expr::BinOp(
            BinOp::And,
            Box::new(Expr::BinOp(BinOp::Lt, Box::new(Expr::var("i")), Box::new(Expr::var("l")))),
            Box::new(Expr::BinOp(BinOp::Eq, Box::new(Expr::Lookup(idx_i())), Box::new(Expr::var("value")))),
        );
        Module {
            name: "main".into(),
            globals: vec![],
            functions: vec![Function {
                name: "compress".into(),
                borrow_params: vec!["input".into(), "l".into()],
                inout_params: vec!["out".into()],
                body: vec![
                    Stmt::Let { name: "i".into(), expr: Some(Expr::int(0)) },
                    Stmt::Loop {
                        // `entry` is a marker true only at the very first
                        // iteration of this loop (i == 0); `exit` is the
                        // continue-while-work-remains condition. They must
                        // stay distinct for the loop to be reversible: an
                        // identical entry/exit collapses the reverse path's
                        // "both false at the state we start undoing from"
                        // precondition into a contradiction.
                        entry: Expr::BinOp(BinOp::Eq, Box::new(Expr::var("i")), Box::new(Expr::int(0))),
                        exit: Expr::BinOp(BinOp::Lt, Box::new(Expr::var("i")), Box::new(Expr::var("l"))),
                        body: vec![
                            Stmt::Let { name: "value".into(), expr: Some(Expr::Lookup(idx_i())) },
                            Stmt::Let { name: "count".into(), expr: Some(Expr::int(0)) },
                            Stmt::Loop {
                                entry: Expr::BinOp(BinOp::Eq, Box::new(Expr::var("count")), Box::new(Expr::int(0))),
                                exit: same_run.clone(),
                                body: vec![
                                    Stmt::ModOpStmt { target: Lookup::plain("count"), op: ModOp::AddAssign, expr: Expr::int(1) },
                                    Stmt::ModOpStmt { target: Lookup::plain("i"), op: ModOp::AddAssign, expr: Expr::int(1) },
                                ],
                            },
                            Stmt::Push { name: "count".into(), stack: "out".into() },
                            Stmt::Push { name: "value".into(), stack: "out".into() },
                        ],
                    },
                    Stmt::Unlet { name: "i".into(), expr: Some(Expr::var("l")) },
                ],
            }],
            imports: vec![],
        }
    }

    #[test]
    fn run_length_encoding_compress_and_uncall() {
        let registry = ModuleRegistry::from_modules(vec![rle_module()], "main").unwrap();
        let mut ctx = ctx_for(registry);
        let data = [0, 0, 0, 3, 3, 3, 3, 3, 3, 3, 5, 5, 5, 0, 0, 0];
        let mut with_sentinel: Vec<Value> = data.iter().map(|n| Value::from_i64(*n)).collect();
        with_sentinel.push(Value::from_i64(-1)); // sentinel, distinct from any real value
        ctx.scope_mut().let_("input", Value::Array(with_sentinel)).unwrap();
        ctx.scope_mut().let_("l", Value::from_i64(data.len() as i64)).unwrap();
        ctx.scope_mut().let_("out", Value::Array(vec![])).unwrap();

        let call = CallStmt {
            direction: CallDirection::Call,
            function: "compress".into(),
            args: vec!["input".into(), "l".into()],
            outs: vec!["out".into()],
            threads: None,
        };
        call::dispatch(&call, Direction::Forward, &mut ctx).unwrap();

        let expected: Vec<Value> = [3, 0, 7, 3, 3, 5, 3, 0].iter().map(|n| Value::from_i64(*n)).collect();
        assert_eq!(ctx.scope().get("out").unwrap(), Value::Array(expected));

        call::dispatch(&call, Direction::Reverse, &mut ctx).unwrap();
        assert_eq!(ctx.scope().get("out").unwrap(), Value::Array(vec![]));
    }

    // §8: argmax via try/catch, "uncalling does not unbind it because
    // best is a try-bound output". `try`'s reverse case leaves its
    // variable exactly as bound as the forward search left it (§4.5);
    // running the construct backward is not the same as unletting it.
    #[test]
    fn argmax_via_try_catch_survives_reverse() {
        let registry = ModuleRegistry::from_modules(vec![Module { name: "main".into(), ..Default::default() }], "main").unwrap();
        let mut ctx = ctx_for(registry);
        ctx.scope_mut().let_("row", Value::Array(vec![Value::from_i64(3), Value::from_i64(9), Value::from_i64(1)])).unwrap();
        let stmt = Stmt::Try {
            var: "best".into(),
            start: Expr::int(0),
            end: Expr::Len(Box::new(Expr::var("row"))),
            step: None,
            body: vec![Stmt::Catch(Expr::BinOp(
                BinOp::Eq,
                Box::new(Expr::Lookup(Lookup::indexed("row", vec![Expr::var("best")]))),
                Box::new(Expr::int(9)),
            ))],
        };
        exec_top_level(&[stmt.clone()], Direction::Forward, &mut ctx).unwrap();
        assert_eq!(ctx.scope().get("best").unwrap(), Value::from_i64(1));

        exec_top_level(&[stmt], Direction::Reverse, &mut ctx).unwrap();
        assert!(ctx.scope().contains("best"));
        assert_eq!(ctx.scope().get("best").unwrap(), Value::from_i64(1));
    }

    // A `try` over an *aliased* in-out array, scanning past a couple of
    // non-matching (and so abandoned-and-rolled-back) candidates before
    // committing, then mutating that same array again after the commit.
    // Every rollback along the way must restore values into the caller's
    // own storage, not sever the alias by rebinding to fresh cells.
    #[test]
    fn try_over_aliased_array_preserves_caller_alias_through_rollback() {
        let module = Module {
            name: "main".into(),
            globals: vec![],
            functions: vec![Function {
                name: "find_and_bump".into(),
                borrow_params: vec!["target".into()],
                inout_params: vec!["row".into()],
                body: vec![
                    Stmt::Try {
                        var: "best".into(),
                        start: Expr::int(0),
                        end: Expr::Len(Box::new(Expr::var("row"))),
                        step: None,
                        body: vec![Stmt::Catch(Expr::BinOp(
                            BinOp::Eq,
                            Box::new(Expr::Lookup(Lookup::indexed("row", vec![Expr::var("best")]))),
                            Box::new(Expr::var("target")),
                        ))],
                    },
                    Stmt::ModOpStmt {
                        target: Lookup::indexed("row", vec![Expr::var("best")]),
                        op: ModOp::AddAssign,
                        expr: Expr::int(100),
                    },
                    Stmt::Unlet { name: "best".into(), expr: Some(Expr::int(2)) },
                ],
            }],
            imports: vec![],
        };
        let registry = ModuleRegistry::from_modules(vec![module], "main").unwrap();
        let mut ctx = ctx_for(registry);
        ctx.scope_mut().let_("target", Value::from_i64(9)).unwrap();
        ctx.scope_mut()
            .let_("row", Value::Array(vec![3, 5, 9].into_iter().map(Value::from_i64).collect()))
            .unwrap();

        let call = CallStmt {
            direction: CallDirection::Call,
            function: "find_and_bump".into(),
            args: vec!["target".into()],
            outs: vec!["row".into()],
            threads: None,
        };
        let row_cell = ctx.scope().alias_cell("row").unwrap();

        call::dispatch(&call, Direction::Forward, &mut ctx).unwrap();

        // The two abandoned candidates (index 0, then 1) each snapshot and
        // roll back the callee's frame; neither should have rebound "row"
        // to a fresh cell, so the caller's own storage is still the one
        // carrying the post-commit mutation.
        assert_eq!(
            ctx.scope().get("row").unwrap(),
            Value::Array(vec![3, 5, 109].into_iter().map(Value::from_i64).collect())
        );
        assert!(Arc::ptr_eq(&row_cell, &ctx.scope().alias_cell("row").unwrap()));
    }

    // §8: self-modifying modop is a reversibility violation, exercised
    // here through the real call path rather than `exec_stmt` directly.
    #[test]
    fn self_modifying_modop_rejected_through_call() {
        let module = Module {
            name: "main".into(),
            globals: vec![],
            functions: vec![Function {
                name: "bad".into(),
                borrow_params: vec!["i".into()],
                inout_params: vec!["a".into()],
                body: vec![Stmt::ModOpStmt {
                    target: Lookup::indexed("a", vec![Expr::var("i")]),
                    op: ModOp::AddAssign,
                    expr: Expr::Lookup(Lookup::indexed("a", vec![Expr::var("i")])),
                }],
            }],
            imports: vec![],
        };
        let registry = ModuleRegistry::from_modules(vec![module], "main").unwrap();
        let mut ctx = ctx_for(registry);
        ctx.scope_mut().let_("i", Value::from_i64(0)).unwrap();
        ctx.scope_mut().let_("a", Value::Array(vec![Value::from_i64(1)])).unwrap();
        let call = CallStmt { direction: CallDirection::Call, function: "bad".into(), args: vec!["i".into()], outs: vec!["a".into()], threads: None };
        let err = call::dispatch(&call, Direction::Forward, &mut ctx).unwrap_err();
        assert!(matches!(err, crate::error::RailwayError::ReversibilityViolation(_)));
    }

    // §8: "parallel mean/variance with 4 threads (deterministic, matches
    // single-threaded computation)". Two passes over a shared array,
    // each accumulating into mutex-protected shared cells, partitioned
    // by thread id into contiguous chunks.
    #[test]
    fn parallel_mean_and_variance_match_single_threaded() {
        let chunk_start = Expr::BinOp(
            BinOp::Mul,
            Box::new(Expr::ThreadId),
            Box::new(Expr::BinOp(BinOp::FloorDiv, Box::new(Expr::Len(Box::new(Expr::var("data")))), Box::new(Expr::NumThreads))),
        );
        let chunk_end = Expr::BinOp(
            BinOp::Mul,
            Box::new(Expr::BinOp(BinOp::Add, Box::new(Expr::ThreadId), Box::new(Expr::int(1)))),
            Box::new(Expr::BinOp(BinOp::FloorDiv, Box::new(Expr::Len(Box::new(Expr::var("data")))), Box::new(Expr::NumThreads))),
        );
        let module = Module {
            name: "main".into(),
            globals: vec![],
            functions: vec![Function {
                name: "stats".into(),
                borrow_params: vec!["data".into()],
                inout_params: vec!["sum_acc".into(), "sqsum_acc".into()],
                body: vec![
                    Stmt::Let { name: ".local_sum".into(), expr: Some(Expr::int(0)) },
                    Stmt::For {
                        var: ".i".into(),
                        start: chunk_start.clone(),
                        end: chunk_end.clone(),
                        step: None,
                        body: vec![Stmt::ModOpStmt {
                            target: Lookup::plain(".local_sum"),
                            op: ModOp::AddAssign,
                            expr: Expr::Lookup(Lookup::indexed("data", vec![Expr::var(".i")])),
                        }],
                    },
                    Stmt::Mutex {
                        name: "stats_lock".into(),
                        body: vec![Stmt::ModOpStmt { target: Lookup::plain("sum_acc"), op: ModOp::AddAssign, expr: Expr::var(".local_sum") }],
                    },
                    Stmt::Barrier("after_sum".into()),
                    Stmt::Let {
                        name: ".mean".into(),
                        expr: Some(Expr::BinOp(BinOp::Div, Box::new(Expr::var("sum_acc")), Box::new(Expr::Len(Box::new(Expr::var("data")))))),
                    },
                    Stmt::Let { name: ".local_sqsum".into(), expr: Some(Expr::int(0)) },
                    Stmt::For {
                        var: ".i".into(),
                        start: chunk_start,
                        end: chunk_end,
                        step: None,
                        body: vec![Stmt::ModOpStmt {
                            target: Lookup::plain(".local_sqsum"),
                            op: ModOp::AddAssign,
                            expr: Expr::BinOp(
                                BinOp::Pow,
                                Box::new(Expr::BinOp(
                                    BinOp::Sub,
                                    Box::new(Expr::Lookup(Lookup::indexed("data", vec![Expr::var(".i")]))),
                                    Box::new(Expr::var(".mean")),
                                )),
                                Box::new(Expr::int(2)),
                            ),
                        }],
                    },
                    Stmt::Mutex {
                        name: "stats_lock".into(),
                        body: vec![Stmt::ModOpStmt { target: Lookup::plain("sqsum_acc"), op: ModOp::AddAssign, expr: Expr::var(".local_sqsum") }],
                    },
                ],
            }],
            imports: vec![],
        };
        let registry = ModuleRegistry::from_modules(vec![module], "main").unwrap();
        let mut ctx = ctx_for(registry);
        let data: Vec<Value> = (1..=100).map(Value::from_i64).collect();
        ctx.scope_mut().let_("data", Value::Array(data.clone())).unwrap();
        ctx.scope_mut().let_("sum_acc", Value::zero()).unwrap();
        ctx.scope_mut().let_("sqsum_acc", Value::zero()).unwrap();

        let call = CallStmt {
            direction: CallDirection::Call,
            function: "stats".into(),
            args: vec!["data".into()],
            outs: vec!["sum_acc".into(), "sqsum_acc".into()],
            threads: Some(Expr::int(4)),
        };
        call::dispatch(&call, Direction::Forward, &mut ctx).unwrap();

        let expected_sum: BigRational = data.iter().map(|v| v.as_number().unwrap().clone()).sum();
        let mean = &expected_sum / BigRational::from_integer(BigInt::from(data.len() as i64));
        let expected_sqsum: BigRational = data
            .iter()
            .map(|v| {
                let d = v.as_number().unwrap() - &mean;
                &d * &d
            })
            .sum();

        assert_eq!(ctx.scope().get("sum_acc").unwrap(), Value::Number(expected_sum));
        assert_eq!(ctx.scope().get("sqsum_acc").unwrap(), Value::Number(expected_sqsum));
    }

    // §8: a reversible lattice update, composed from modop (xor) + swap
    // alone, no resets, no self-modification; run 20 generations
    // forward then 20 in reverse restores the initial grid bit-for-bit.
    #[test]
    fn reversible_lattice_round_trip() {
        let module = Module {
            name: "main".into(),
            globals: vec![],
            functions: vec![Function {
                name: "evolve".into(),
                borrow_params: vec![],
                inout_params: vec!["grid".into(), "partner".into()],
                body: vec![Stmt::For {
                    var: ".gen".into(),
                    start: Expr::int(0),
                    end: Expr::int(20),
                    step: None,
                    body: vec![
                        Stmt::For {
                            var: ".i".into(),
                            start: Expr::int(0),
                            end: Expr::Len(Box::new(Expr::var("grid"))),
                            step: None,
                            body: vec![Stmt::ModOpStmt {
                                target: Lookup::indexed("grid", vec![Expr::var(".i")]),
                                op: ModOp::XorAssign,
                                expr: Expr::Lookup(Lookup::indexed("partner", vec![Expr::var(".i")])),
                            }],
                        },
                        Stmt::Swap { a: "grid".into(), b: "partner".into() },
                    ],
                }],
            }],
            imports: vec![],
        };
        let registry = ModuleRegistry::from_modules(vec![module], "main").unwrap();
        let mut ctx = ctx_for(registry);
        let grid0 = Value::Array(vec![1, 0, 1, 1, 0, 0].into_iter().map(Value::from_i64).collect());
        let partner0 = Value::Array(vec![0, 1, 0, 0, 1, 1].into_iter().map(Value::from_i64).collect());
        ctx.scope_mut().let_("grid", grid0.clone()).unwrap();
        ctx.scope_mut().let_("partner", partner0.clone()).unwrap();

        let call = CallStmt { direction: CallDirection::Call, function: "evolve".into(), args: vec![], outs: vec!["grid".into(), "partner".into()], threads: None };
        call::dispatch(&call, Direction::Forward, &mut ctx).unwrap();
        // After 20 generations the two arrays have changed.
        assert_ne!(ctx.scope().get("grid").unwrap(), grid0);

        // Uncalling reverses all 20 generations in one pass (the `for`
        // loop's reverse runs its 20 iterations in reverse order).
        call::dispatch(&call, Direction::Reverse, &mut ctx).unwrap();
        assert_eq!(ctx.scope().get("grid").unwrap(), grid0);
        assert_eq!(ctx.scope().get("partner").unwrap(), partner0);
    }

    // §8 universal properties, exercised directly against `exec_top_level`
    // rather than through a named function: the inverse law for a small
    // mixed program (let/modop/if/swap): running it forward then its
    // reverse restores every name and every value exactly.
    #[test]
    fn inverse_law_for_a_mixed_program() {
        let registry = ModuleRegistry::from_modules(vec![Module { name: "main".into(), ..Default::default() }], "main").unwrap();
        let mut ctx = ctx_for(registry);
        let program = vec![
            Stmt::Let { name: "x".into(), expr: Some(Expr::int(4)) },
            Stmt::Let { name: "y".into(), expr: Some(Expr::int(10)) },
            Stmt::If {
                cond: Expr::var("x"),
                then_branch: vec![Stmt::ModOpStmt { target: Lookup::plain("y"), op: ModOp::AddAssign, expr: Expr::var("x") }],
                else_branch: vec![],
                post_cond: None,
            },
            Stmt::Swap { a: "x".into(), b: "y".into() },
        ];
        exec_top_level(&program, Direction::Forward, &mut ctx).unwrap();
        assert_eq!(ctx.scope().get("x").unwrap(), Value::from_i64(14));
        assert_eq!(ctx.scope().get("y").unwrap(), Value::from_i64(4));

        exec_top_level(&program, Direction::Reverse, &mut ctx).unwrap();
        assert!(!ctx.scope().contains("x"));
        assert!(!ctx.scope().contains("y"));
    }

    // §8 universal properties, generalized across arbitrary inputs rather
    // than a single hand-picked example each.
    mod universal_properties {
        use super::*;
        use proptest::prelude::*;

        fn run(stmts: &[Stmt], dir: Direction, ctx: &mut ThreadContext) -> crate::error::RailwayResult<()> {
            exec_top_level(stmts, dir, ctx)
        }

        proptest! {
            // Running a `let`/modop/swap/`let` program forward then its
            // exact reverse always restores every name it touched.
            #[test]
            fn inverse_law_holds_for_arbitrary_integers(a in -1000i64..1000, b in -1000i64..1000, step in -1000i64..1000) {
                let registry = ModuleRegistry::from_modules(vec![Module { name: "main".into(), ..Default::default() }], "main").unwrap();
                let mut ctx = ctx_for(registry);
                let program = vec![
                    Stmt::Let { name: "x".into(), expr: Some(Expr::int(a)) },
                    Stmt::Let { name: "y".into(), expr: Some(Expr::int(b)) },
                    Stmt::ModOpStmt { target: Lookup::plain("x"), op: ModOp::AddAssign, expr: Expr::int(step) },
                    Stmt::Swap { a: "x".into(), b: "y".into() },
                ];
                run(&program, Direction::Forward, &mut ctx).unwrap();
                run(&program, Direction::Reverse, &mut ctx).unwrap();
                prop_assert!(!ctx.scope().contains("x"));
                prop_assert!(!ctx.scope().contains("y"));
            }

            // Swap is its own inverse for any pair of values, any number of
            // applications.
            #[test]
            fn swap_is_involutive(a in -1000i64..1000, b in -1000i64..1000) {
                let registry = ModuleRegistry::from_modules(vec![Module { name: "main".into(), ..Default::default() }], "main").unwrap();
                let mut ctx = ctx_for(registry);
                ctx.scope_mut().let_("x", Value::from_i64(a)).unwrap();
                ctx.scope_mut().let_("y", Value::from_i64(b)).unwrap();
                let stmt = Stmt::Swap { a: "x".into(), b: "y".into() };
                run(&[stmt.clone()], Direction::Forward, &mut ctx).unwrap();
                run(&[stmt], Direction::Forward, &mut ctx).unwrap();
                prop_assert_eq!(ctx.scope().get("x").unwrap(), Value::from_i64(a));
                prop_assert_eq!(ctx.scope().get("y").unwrap(), Value::from_i64(b));
            }

            // A modop applied then run with its direction reversed is the
            // identity, for every operator and every nonzero right-hand
            // side (avoiding division by zero).
            #[test]
            fn modop_reversal_is_identity(
                start in -1000i64..1000,
                rhs in proptest::collection::vec(1i64..50, 1).prop_map(|v| v[0]),
                op_idx in 0usize..3,
            ) {
                let op = [ModOp::AddAssign, ModOp::SubAssign, ModOp::XorAssign][op_idx];
                let registry = ModuleRegistry::from_modules(vec![Module { name: "main".into(), ..Default::default() }], "main").unwrap();
                let mut ctx = ctx_for(registry);
                ctx.scope_mut().let_("x", Value::from_i64(start)).unwrap();
                let stmt = Stmt::ModOpStmt { target: Lookup::plain("x"), op, expr: Expr::int(rhs) };
                run(&[stmt.clone()], Direction::Forward, &mut ctx).unwrap();
                run(&[stmt], Direction::Reverse, &mut ctx).unwrap();
                prop_assert_eq!(ctx.scope().get("x").unwrap(), Value::from_i64(start));
            }

            // `unlet` only ever succeeds when the expression matches the
            // name's current value; any mismatch is rejected rather than
            // silently discarding the wrong value.
            #[test]
            fn unlet_rejects_any_value_mismatch(actual in -1000i64..1000, claimed in -1000i64..1000) {
                prop_assume!(actual != claimed);
                let registry = ModuleRegistry::from_modules(vec![Module { name: "main".into(), ..Default::default() }], "main").unwrap();
                let mut ctx = ctx_for(registry);
                run(&[Stmt::Let { name: "x".into(), expr: Some(Expr::int(actual)) }], Direction::Forward, &mut ctx).unwrap();
                let err = run(&[Stmt::Unlet { name: "x".into(), expr: Some(Expr::int(claimed)) }], Direction::Forward, &mut ctx).unwrap_err();
                prop_assert!(matches!(err, crate::error::RailwayError::ReversibilityViolation(_)));
            }
        }
    }
}
