//! Abstract syntax tree for Railway programs.
//!
//! The grammar-driven parser that produces this tree is an external
//! collaborator (§1); this crate is handed an already-built [`Module`],
//! either constructed in Rust directly (as the tests below do) or
//! deserialized from a `.rail.json` file (see [`crate::registry`]).

use serde::{Deserialize, Serialize};

use num_rational::BigRational;

/// A name, optionally monodirectional (leading `.`) and/or module-qualified
/// (`<module>.<name>`).
pub type Name = String;

/// Is this name monodirectional, exempt from reversibility obligations?
pub fn is_mono(name: &str) -> bool {
    name.starts_with('.')
}

/// Split a possibly module-qualified name into `(module, name)`.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.split_once('.').filter(|(m, _)| !m.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Xor,
    And,
    Or,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

/// A modop's operator; each has a spec-defined inverse (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModOp {
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    XorAssign,
}

impl ModOp {
    /// The inverse modop used on reverse execution.
    pub fn inverse(self) -> ModOp {
        match self {
            ModOp::AddAssign => ModOp::SubAssign,
            ModOp::SubAssign => ModOp::AddAssign,
            ModOp::MulAssign => ModOp::DivAssign,
            ModOp::DivAssign => ModOp::MulAssign,
            ModOp::XorAssign => ModOp::XorAssign,
        }
    }
}

/// A lookup path: a name plus zero or more index expressions (`a[i][j]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub name: Name,
    pub indices: Vec<Expr>,
}

impl Lookup {
    pub fn plain(name: impl Into<String>) -> Self {
        Lookup { name: name.into(), indices: Vec::new() }
    }

    pub fn indexed(name: impl Into<String>, indices: Vec<Expr>) -> Self {
        Lookup { name: name.into(), indices }
    }
}

/// A pure expression. `eval(expr, scope) -> Value` never has side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(BigRational),
    Lookup(Lookup),
    ArrayLiteral(Vec<Expr>),
    ArrayRange { start: Box<Expr>, end: Box<Expr>, step: Option<Box<Expr>> },
    ArrayTensor { fill: Box<Expr>, shape: Vec<Expr> },
    Len(Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    UnOp(UnOp, Box<Expr>),
    ThreadId,
    NumThreads,
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Number(BigRational::from_integer(n.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Lookup(Lookup::plain(name))
    }
}

/// A single Railway statement. The evaluator (`eval_stmt`) is the sole
/// place that knows the forward-vs-reverse semantics of each variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Let { name: Name, expr: Option<Expr> },
    Unlet { name: Name, expr: Option<Expr> },
    Push { name: Name, stack: Name },
    Pop { name: Name, stack: Name },
    Swap { a: Name, b: Name },
    Promote { from: Name, to: Name },
    ModOpStmt { target: Lookup, op: ModOp, expr: Expr },
    If { cond: Expr, then_branch: Vec<Stmt>, else_branch: Vec<Stmt>, post_cond: Option<Expr> },
    Loop { entry: Expr, body: Vec<Stmt>, exit: Expr },
    For { var: Name, start: Expr, end: Expr, step: Option<Expr>, body: Vec<Stmt> },
    Barrier(String),
    Mutex { name: String, body: Vec<Stmt> },
    DoYieldUndo { do_block: Vec<Stmt>, yield_block: Vec<Stmt> },
    Try { var: Name, start: Expr, end: Expr, step: Option<Expr>, body: Vec<Stmt> },
    Catch(Expr),
    Call(CallStmt),
    Print { items: Vec<PrintItem>, newline: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrintItem {
    Str(String),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallDirection {
    Call,
    Uncall,
}

/// `(outs) <= call f{threads}(args)` / `(args) => call f => (outs)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallStmt {
    pub direction: CallDirection,
    pub function: Name,
    /// Arguments bound by alias to the callee's borrow list.
    pub args: Vec<Name>,
    /// Names bound by alias to the callee's in-out list.
    pub outs: Vec<Name>,
    /// `Some(n)` for the parallel form `call f{n}(...)`.
    pub threads: Option<Expr>,
}

/// A function declaration: `func f(borrow)(inout) { body }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: Name,
    pub borrow_params: Vec<Name>,
    pub inout_params: Vec<Name>,
    pub body: Vec<Stmt>,
}

/// A module: globals (evaluated once, in declaration order), functions,
/// and import aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    pub name: Name,
    pub globals: Vec<(Name, Expr)>,
    pub functions: Vec<Function>,
    /// alias -> imported module name.
    pub imports: Vec<(Name, Name)>,
}

impl Module {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
