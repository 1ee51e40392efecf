//! Syntax tree traversal in the style of `syn::visit`.
//!
//! Override the `visit_*` methods you care about and call the matching
//! `walk_*` function to continue into children.

use crate::tree::{ClassDef, Expr, ExprKind, FunctionDef, Module, Stmt, StmtKind};

/// Tree visitor. Every method defaults to walking all children.
pub trait Visit<'ast> {
    /// Visits a module.
    fn visit_module(&mut self, node: &'ast Module) {
        walk_module(self, node);
    }

    /// Visits a statement.
    fn visit_stmt(&mut self, node: &'ast Stmt) {
        walk_stmt(self, node);
    }

    /// Visits a function definition; `stmt` carries its position.
    fn visit_function_def(&mut self, stmt: &'ast Stmt, node: &'ast FunctionDef) {
        let _ = stmt;
        walk_function_def(self, node);
    }

    /// Visits a class definition; `stmt` carries its position.
    fn visit_class_def(&mut self, stmt: &'ast Stmt, node: &'ast ClassDef) {
        let _ = stmt;
        walk_class_def(self, node);
    }

    /// Visits an expression.
    fn visit_expr(&mut self, node: &'ast Expr) {
        walk_expr(self, node);
    }
}

/// Visits every top-level statement.
pub fn walk_module<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Module) {
    walk_body(v, &node.body);
}

/// Visits each statement of a block.
pub fn walk_body<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, body: &'ast [Stmt]) {
    for stmt in body {
        v.visit_stmt(stmt);
    }
}

fn walk_exprs<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, exprs: &'ast [Expr]) {
    for expr in exprs {
        v.visit_expr(expr);
    }
}

/// Visits the children of a statement.
pub fn walk_stmt<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Stmt) {
    match &node.kind {
        StmtKind::FunctionDef(f) => v.visit_function_def(node, f),
        StmtKind::ClassDef(c) => v.visit_class_def(node, c),
        StmtKind::If(i) => {
            v.visit_expr(&i.test);
            walk_body(v, &i.body);
            walk_body(v, &i.orelse);
        }
        StmtKind::For(f) => {
            v.visit_expr(&f.target);
            v.visit_expr(&f.iter);
            walk_body(v, &f.body);
            walk_body(v, &f.orelse);
        }
        StmtKind::While(w) => {
            v.visit_expr(&w.test);
            walk_body(v, &w.body);
            walk_body(v, &w.orelse);
        }
        StmtKind::Try(t) => {
            walk_body(v, &t.body);
            for handler in &t.handlers {
                if let Some(kind) = &handler.kind {
                    v.visit_expr(kind);
                }
                walk_body(v, &handler.body);
            }
            walk_body(v, &t.orelse);
            walk_body(v, &t.finalbody);
        }
        StmtKind::With(w) => {
            for item in &w.items {
                v.visit_expr(&item.context);
                if let Some(target) = &item.target {
                    v.visit_expr(target);
                }
            }
            walk_body(v, &w.body);
        }
        StmtKind::Match(m) => {
            walk_exprs(v, &m.subjects);
            for case in &m.cases {
                if let Some(guard) = &case.guard {
                    v.visit_expr(guard);
                }
                walk_body(v, &case.body);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        StmtKind::Assign { targets, value } => {
            walk_exprs(v, targets);
            v.visit_expr(value);
        }
        StmtKind::AugAssign { target, value } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
        } => {
            v.visit_expr(target);
            v.visit_expr(annotation);
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        StmtKind::Delete(exprs)
        | StmtKind::Raise(exprs)
        | StmtKind::Assert(exprs)
        | StmtKind::TypeAlias(exprs) => walk_exprs(v, exprs),
        StmtKind::Expr(expr) => v.visit_expr(expr),
        StmtKind::Import
        | StmtKind::Global(_)
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue => {}
    }
}

/// Visits decorators, parameter expressions, return annotation and body.
pub fn walk_function_def<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast FunctionDef) {
    walk_exprs(v, &node.decorators);
    walk_exprs(v, &node.params);
    if let Some(returns) = &node.returns {
        v.visit_expr(returns);
    }
    walk_body(v, &node.body);
}

/// Visits decorators, bases and body.
pub fn walk_class_def<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast ClassDef) {
    walk_exprs(v, &node.decorators);
    walk_exprs(v, &node.bases);
    walk_body(v, &node.body);
}

/// Visits the sub-expressions of an expression.
pub fn walk_expr<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Expr) {
    match &node.kind {
        ExprKind::Name { .. } => {}
        ExprKind::Call { func, args } => {
            v.visit_expr(func);
            walk_exprs(v, args);
        }
        ExprKind::Attribute { value, .. } => v.visit_expr(value),
        ExprKind::Str { parts, .. } => walk_exprs(v, parts),
        ExprKind::Compound(children) => walk_exprs(v, children),
    }
}
