//! Closed syntax tree for Python modules.
//!
//! Parsers build this tree; checks consume it through [`crate::visit::Visit`].
//! Lines are 1-indexed, columns are 0-indexed UTF-8 byte offsets.

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    /// Top-level statements.
    pub body: Vec<Stmt>,
}

impl Module {
    /// Returns the module docstring, if the first statement is one.
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        docstring_of(&self.body)
    }
}

/// A statement with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    /// Line of the statement's first token.
    pub line: usize,
    /// Column of the statement's first token.
    pub column: usize,
    /// What kind of statement.
    pub kind: StmtKind,
}

impl Stmt {
    /// Creates a statement.
    #[must_use]
    pub fn new(line: usize, column: usize, kind: StmtKind) -> Self {
        Self { line, column, kind }
    }
}

/// Every statement form of the language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// `def` / `async def`.
    FunctionDef(FunctionDef),
    /// `class`.
    ClassDef(ClassDef),
    /// `if`; an `elif` is a nested `If` as the sole statement of `orelse`.
    If(If),
    /// `for` / `async for`.
    For(For),
    /// `while`.
    While(While),
    /// `try` with handlers, `else` and `finally`.
    Try(Try),
    /// `with` / `async with`.
    With(With),
    /// `match`.
    Match(Match),
    /// `return [value]`.
    Return(Option<Expr>),
    /// `a = b = value`.
    Assign {
        /// Left-hand sides, outermost first.
        targets: Vec<Expr>,
        /// Right-hand side.
        value: Expr,
    },
    /// `target op= value`.
    AugAssign {
        /// Left-hand side.
        target: Expr,
        /// Right-hand side.
        value: Expr,
    },
    /// `target: annotation [= value]`.
    AnnAssign {
        /// Left-hand side.
        target: Expr,
        /// Type annotation.
        annotation: Expr,
        /// Optional right-hand side.
        value: Option<Expr>,
    },
    /// `del a, b`.
    Delete(Vec<Expr>),
    /// `raise [exc [from cause]]`.
    Raise(Vec<Expr>),
    /// `assert test[, msg]`.
    Assert(Vec<Expr>),
    /// A bare expression.
    Expr(Expr),
    /// `type X = ...`.
    TypeAlias(Vec<Expr>),
    /// `import` / `from ... import`.
    Import,
    /// `global` / `nonlocal` names.
    Global(Vec<String>),
    /// `pass`.
    Pass,
    /// `break`.
    Break,
    /// `continue`.
    Continue,
}

/// A function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    /// Function name.
    pub name: String,
    /// Declared with `async def`.
    pub is_async: bool,
    /// Decorator expressions.
    pub decorators: Vec<Expr>,
    /// Parameter defaults and annotations.
    pub params: Vec<Expr>,
    /// Return annotation.
    pub returns: Option<Expr>,
    /// Body statements.
    pub body: Vec<Stmt>,
}

impl FunctionDef {
    /// Returns the docstring, if the first body statement is one.
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        docstring_of(&self.body)
    }
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Class name.
    pub name: String,
    /// Decorator expressions.
    pub decorators: Vec<Expr>,
    /// Base classes and keywords.
    pub bases: Vec<Expr>,
    /// Body statements.
    pub body: Vec<Stmt>,
}

impl ClassDef {
    /// Returns the docstring, if the first body statement is one.
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        docstring_of(&self.body)
    }
}

/// `if test: body else: orelse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    /// Condition.
    pub test: Expr,
    /// Consequence.
    pub body: Vec<Stmt>,
    /// `elif` / `else` part.
    pub orelse: Vec<Stmt>,
}

/// `for target in iter: body else: orelse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct For {
    /// Declared with `async for`.
    pub is_async: bool,
    /// Loop variable(s), in store context.
    pub target: Expr,
    /// Iterated expression.
    pub iter: Expr,
    /// Loop body.
    pub body: Vec<Stmt>,
    /// `else` part.
    pub orelse: Vec<Stmt>,
}

/// `while test: body else: orelse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct While {
    /// Condition.
    pub test: Expr,
    /// Loop body.
    pub body: Vec<Stmt>,
    /// `else` part.
    pub orelse: Vec<Stmt>,
}

/// `try` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Try {
    /// Protected body.
    pub body: Vec<Stmt>,
    /// `except` clauses.
    pub handlers: Vec<ExceptHandler>,
    /// `else` part.
    pub orelse: Vec<Stmt>,
    /// `finally` part.
    pub finalbody: Vec<Stmt>,
}

/// One `except` clause. The `as name` binding is not an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptHandler {
    /// Line of the `except` keyword.
    pub line: usize,
    /// Exception type expression.
    pub kind: Option<Expr>,
    /// Bound name.
    pub name: Option<String>,
    /// Handler body.
    pub body: Vec<Stmt>,
}

/// `with` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct With {
    /// Declared with `async with`.
    pub is_async: bool,
    /// Context managers.
    pub items: Vec<WithItem>,
    /// Body statements.
    pub body: Vec<Stmt>,
}

/// `context [as target]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithItem {
    /// Context manager expression.
    pub context: Expr,
    /// Optional target, in store context.
    pub target: Option<Expr>,
}

/// `match` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Subject expressions.
    pub subjects: Vec<Expr>,
    /// `case` clauses.
    pub cases: Vec<MatchCase>,
}

/// One `case` clause. Patterns bind names but are not expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCase {
    /// `if` guard.
    pub guard: Option<Expr>,
    /// Case body.
    pub body: Vec<Stmt>,
}

/// How a name is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameContext {
    /// Read.
    Load,
    /// Bound.
    Store,
    /// Deleted.
    Del,
}

/// An expression with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    /// Line of the expression's first token.
    pub line: usize,
    /// Column of the expression's first token.
    pub column: usize,
    /// What kind of expression.
    pub kind: ExprKind,
}

impl Expr {
    /// Creates an expression.
    #[must_use]
    pub fn new(line: usize, column: usize, kind: ExprKind) -> Self {
        Self { line, column, kind }
    }

    /// Returns the callee name if this is a call to a bare identifier.
    #[must_use]
    pub fn called_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Call { func, .. } => match &func.kind {
                ExprKind::Name { id, .. } => Some(id.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// String literal flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrKind {
    /// Plain or raw text string.
    Text,
    /// `b"..."`.
    Bytes,
    /// `f"..."`.
    Formatted,
}

/// The expression forms checks distinguish; everything else is [`ExprKind::Compound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// An identifier.
    Name {
        /// Identifier text.
        id: String,
        /// Load, store or delete.
        ctx: NameContext,
    },
    /// `func(args)`.
    Call {
        /// Callee.
        func: Box<Expr>,
        /// Positional and keyword argument values.
        args: Vec<Expr>,
    },
    /// `value.attr`.
    Attribute {
        /// Object expression.
        value: Box<Expr>,
        /// Attribute name.
        attr: String,
    },
    /// A string literal (implicitly concatenated parts are joined).
    Str {
        /// Literal flavour.
        kind: StrKind,
        /// Raw text between the quotes.
        value: String,
        /// Interpolated expressions of an f-string.
        parts: Vec<Expr>,
    },
    /// Any other expression, reduced to its sub-expressions.
    Compound(Vec<Expr>),
}

fn docstring_of(body: &[Stmt]) -> Option<&str> {
    let first = body.first()?;
    match &first.kind {
        StmtKind::Expr(Expr {
            kind:
                ExprKind::Str {
                    kind: StrKind::Text,
                    value,
                    ..
                },
            ..
        }) if !value.trim().is_empty() => Some(value.as_str()),
        _ => None,
    }
}
