//! Python parser using Tree-sitter.

use pyreview_core::tree::{
    ClassDef, ExceptHandler, Expr, ExprKind, For, FunctionDef, If, Match, MatchCase, Module,
    NameContext, Stmt, StmtKind, StrKind, Try, While, With, WithItem,
};
use pyreview_core::{SourceParser, SyntaxError};
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

/// Deepest statement/expression nesting accepted before the source is
/// rejected as a syntax error.
pub const MAX_NESTING: usize = 200;

/// Parses Python 3 source into the pyreview syntax tree.
pub struct PythonParser {
    language: Language,
}

impl PythonParser {
    /// Creates a new Python parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for PythonParser {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, source: &str) -> Result<Module, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| SyntaxError::new(None, format!("failed to load Python grammar: {e}")))?;

        let src = source.as_bytes();
        let tree = parser
            .parse(src, None)
            .ok_or_else(|| SyntaxError::new(None, "parser produced no tree"))?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(first_error(root).map_or_else(
                || SyntaxError::new(None, "invalid syntax"),
                |node| {
                    let line = Some(node.start_position().row + 1);
                    if node.is_missing() {
                        SyntaxError::new(line, format!("expected '{}'", node.kind()))
                    } else {
                        SyntaxError::new(line, "invalid syntax")
                    }
                },
            ));
        }

        let mut lower = Lower { src, depth: 0 };
        let body = lower.body(root)?;
        debug!("Lowered {} top-level statements", body.len());
        Ok(Module { body })
    }
}

/// Finds the first ERROR or MISSING node in document order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Named, non-comment children.
fn named(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .collect()
}

fn starts_async(node: Node<'_>) -> bool {
    node.child(0).is_some_and(|c| c.kind() == "async")
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// CST to syntax tree lowering.
struct Lower<'s> {
    src: &'s [u8],
    depth: usize,
}

impl<'s> Lower<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.src).unwrap_or("")
    }

    fn descend(&mut self, node: Node<'_>) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(SyntaxError::new(
                Some(line_of(node)),
                "too many nested blocks or expressions",
            ));
        }
        Ok(())
    }

    // ---- statements ----------------------------------------------------

    fn body(&mut self, node: Node<'_>) -> Result<Vec<Stmt>, SyntaxError> {
        named(node).into_iter().map(|n| self.stmt(n)).collect()
    }

    fn block(&mut self, node: Option<Node<'_>>) -> Result<Vec<Stmt>, SyntaxError> {
        node.map_or_else(|| Ok(Vec::new()), |n| self.body(n))
    }

    fn stmt(&mut self, node: Node<'_>) -> Result<Stmt, SyntaxError> {
        self.descend(node)?;
        let result = self.stmt_kind(node, &[]);
        self.depth -= 1;
        let anchor = if node.kind() == "decorated_definition" {
            node.child_by_field_name("definition").unwrap_or(node)
        } else {
            node
        };
        Ok(Stmt::new(line_of(anchor), anchor.start_position().column, result?))
    }

    #[allow(clippy::too_many_lines)]
    fn stmt_kind(
        &mut self,
        node: Node<'_>,
        decorators: &[Node<'_>],
    ) -> Result<StmtKind, SyntaxError> {
        let kind = match node.kind() {
            "function_definition" => StmtKind::FunctionDef(self.function(node, decorators)?),
            "class_definition" => StmtKind::ClassDef(self.class(node, decorators)?),
            "decorated_definition" => return self.decorated(node),
            "if_statement" => StmtKind::If(If {
                test: self.field_expr(node, "condition")?,
                body: self.block(node.child_by_field_name("consequence"))?,
                orelse: self.alternatives(node)?,
            }),
            "for_statement" => StmtKind::For(For {
                is_async: starts_async(node),
                target: self.field_expr_in(node, "left", NameContext::Store)?,
                iter: self.field_expr(node, "right")?,
                body: self.block(node.child_by_field_name("body"))?,
                orelse: self.else_body(node.child_by_field_name("alternative"))?,
            }),
            "while_statement" => StmtKind::While(While {
                test: self.field_expr(node, "condition")?,
                body: self.block(node.child_by_field_name("body"))?,
                orelse: self.else_body(node.child_by_field_name("alternative"))?,
            }),
            "try_statement" => StmtKind::Try(self.try_stmt(node)?),
            "with_statement" => StmtKind::With(self.with_stmt(node)?),
            "match_statement" => StmtKind::Match(self.match_stmt(node)?),
            "expression_statement" => self.expression_statement(node)?,
            "return_statement" => {
                let value = named(node).into_iter().next();
                StmtKind::Return(value.map(|v| self.expr(v, NameContext::Load)).transpose()?)
            }
            "delete_statement" => StmtKind::Delete(self.exprs(node, NameContext::Del)?),
            "raise_statement" => StmtKind::Raise(self.exprs(node, NameContext::Load)?),
            "assert_statement" => StmtKind::Assert(self.exprs(node, NameContext::Load)?),
            "type_alias_statement" => StmtKind::TypeAlias(self.exprs(node, NameContext::Load)?),
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                StmtKind::Import
            }
            "global_statement" | "nonlocal_statement" => StmtKind::Global(
                named(node)
                    .into_iter()
                    .map(|n| self.text(n).to_string())
                    .collect(),
            ),
            "pass_statement" => StmtKind::Pass,
            "break_statement" => StmtKind::Break,
            "continue_statement" => StmtKind::Continue,
            "print_statement" => {
                return Err(SyntaxError::new(
                    Some(line_of(node)),
                    "Missing parentheses in call to 'print'",
                ))
            }
            "exec_statement" => {
                return Err(SyntaxError::new(
                    Some(line_of(node)),
                    "Missing parentheses in call to 'exec'",
                ))
            }
            _ => StmtKind::Expr(self.expr(node, NameContext::Load)?),
        };
        Ok(kind)
    }

    fn decorated(&mut self, node: Node<'_>) -> Result<StmtKind, SyntaxError> {
        let decorators: Vec<Node<'_>> = named(node)
            .into_iter()
            .filter(|n| n.kind() == "decorator")
            .collect();
        let definition = node
            .child_by_field_name("definition")
            .ok_or_else(|| SyntaxError::new(Some(line_of(node)), "decorator without definition"))?;
        self.stmt_kind(definition, &decorators)
    }

    fn decorator_exprs(&mut self, decorators: &[Node<'_>]) -> Result<Vec<Expr>, SyntaxError> {
        let mut exprs = Vec::new();
        for decorator in decorators {
            for child in named(*decorator) {
                exprs.push(self.expr(child, NameContext::Load)?);
            }
        }
        Ok(exprs)
    }

    fn function(
        &mut self,
        node: Node<'_>,
        decorators: &[Node<'_>],
    ) -> Result<FunctionDef, SyntaxError> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        Ok(FunctionDef {
            name,
            is_async: starts_async(node),
            decorators: self.decorator_exprs(decorators)?,
            params: self.params(node.child_by_field_name("parameters"))?,
            returns: node
                .child_by_field_name("return_type")
                .map(|n| self.expr(n, NameContext::Load))
                .transpose()?,
            body: self.block(node.child_by_field_name("body"))?,
        })
    }

    /// Defaults and annotations; parameter names are not expressions.
    fn params(&mut self, node: Option<Node<'_>>) -> Result<Vec<Expr>, SyntaxError> {
        let mut exprs = Vec::new();
        let Some(node) = node else {
            return Ok(exprs);
        };
        for param in named(node) {
            for field in ["type", "value"] {
                if let Some(child) = param.child_by_field_name(field) {
                    exprs.push(self.expr(child, NameContext::Load)?);
                }
            }
        }
        Ok(exprs)
    }

    fn class(&mut self, node: Node<'_>, decorators: &[Node<'_>]) -> Result<ClassDef, SyntaxError> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let bases = match node.child_by_field_name("superclasses") {
            Some(args) => self.exprs(args, NameContext::Load)?,
            None => Vec::new(),
        };
        Ok(ClassDef {
            name,
            decorators: self.decorator_exprs(decorators)?,
            bases,
            body: self.block(node.child_by_field_name("body"))?,
        })
    }

    /// `elif` chains become nested `If` statements.
    fn alternatives(&mut self, node: Node<'_>) -> Result<Vec<Stmt>, SyntaxError> {
        let mut cursor = node.walk();
        let clauses: Vec<Node<'_>> = node
            .children_by_field_name("alternative", &mut cursor)
            .collect();
        self.chain(&clauses)
    }

    fn chain(&mut self, clauses: &[Node<'_>]) -> Result<Vec<Stmt>, SyntaxError> {
        let Some((first, rest)) = clauses.split_first() else {
            return Ok(Vec::new());
        };
        if first.kind() != "elif_clause" {
            return self.else_body(Some(*first));
        }
        self.descend(*first)?;
        let branch = self.elif(*first, rest);
        self.depth -= 1;
        Ok(vec![Stmt::new(
            line_of(*first),
            first.start_position().column,
            StmtKind::If(branch?),
        )])
    }

    fn elif(&mut self, clause: Node<'_>, rest: &[Node<'_>]) -> Result<If, SyntaxError> {
        Ok(If {
            test: self.field_expr(clause, "condition")?,
            body: self.block(clause.child_by_field_name("consequence"))?,
            orelse: self.chain(rest)?,
        })
    }

    fn else_body(&mut self, clause: Option<Node<'_>>) -> Result<Vec<Stmt>, SyntaxError> {
        let Some(clause) = clause else {
            return Ok(Vec::new());
        };
        let body = clause
            .child_by_field_name("body")
            .or_else(|| named(clause).into_iter().find(|n| n.kind() == "block"));
        self.block(body)
    }

    fn try_stmt(&mut self, node: Node<'_>) -> Result<Try, SyntaxError> {
        let mut stmt = Try {
            body: self.block(node.child_by_field_name("body"))?,
            handlers: Vec::new(),
            orelse: Vec::new(),
            finalbody: Vec::new(),
        };
        for clause in named(node) {
            match clause.kind() {
                "except_clause" | "except_group_clause" => {
                    stmt.handlers.push(self.handler(clause)?);
                }
                "else_clause" => stmt.orelse = self.else_body(Some(clause))?,
                "finally_clause" => stmt.finalbody = self.else_body(Some(clause))?,
                _ => {}
            }
        }
        Ok(stmt)
    }

    fn handler(&mut self, clause: Node<'_>) -> Result<ExceptHandler, SyntaxError> {
        let mut handler = ExceptHandler {
            line: line_of(clause),
            kind: None,
            name: None,
            body: Vec::new(),
        };
        let mut after_as = false;
        let mut cursor = clause.walk();
        let children: Vec<Node<'_>> = clause.children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "as" => after_as = true,
                "," => {
                    return Err(SyntaxError::new(
                        Some(line_of(child)),
                        "multiple exception types must be parenthesized",
                    ))
                }
                "block" => handler.body = self.body(child)?,
                "as_pattern" => {
                    if let Some(value) = named(child).into_iter().next() {
                        handler.kind = Some(self.expr(value, NameContext::Load)?);
                    }
                    handler.name = child
                        .child_by_field_name("alias")
                        .map(|a| self.text(a).to_string());
                }
                _ if child.is_named() && !child.is_extra() => {
                    if after_as {
                        handler.name = Some(self.text(child).to_string());
                    } else if handler.kind.is_none() {
                        handler.kind = Some(self.expr(child, NameContext::Load)?);
                    }
                }
                _ => {}
            }
        }
        Ok(handler)
    }

    fn with_stmt(&mut self, node: Node<'_>) -> Result<With, SyntaxError> {
        let mut items = Vec::new();
        for clause in named(node).into_iter().filter(|n| n.kind() == "with_clause") {
            for item in named(clause) {
                if item.kind() != "with_item" {
                    continue;
                }
                let value = item
                    .child_by_field_name("value")
                    .or_else(|| named(item).into_iter().next());
                let Some(value) = value else {
                    continue;
                };
                items.push(self.with_item(value)?);
            }
        }
        Ok(With {
            is_async: starts_async(node),
            items,
            body: self.block(node.child_by_field_name("body"))?,
        })
    }

    fn with_item(&mut self, value: Node<'_>) -> Result<WithItem, SyntaxError> {
        if value.kind() != "as_pattern" {
            return Ok(WithItem {
                context: self.expr(value, NameContext::Load)?,
                target: None,
            });
        }

        let children = named(value);
        let context = match children.first() {
            Some(first) => self.expr(*first, NameContext::Load)?,
            None => Expr::new(
                line_of(value),
                value.start_position().column,
                ExprKind::Compound(Vec::new()),
            ),
        };
        let target = match value.child_by_field_name("alias") {
            Some(alias) => Some(self.target(alias)?),
            None => None,
        };
        Ok(WithItem { context, target })
    }

    /// An `as` target: the alias node wraps the bound expression.
    fn target(&mut self, alias: Node<'_>) -> Result<Expr, SyntaxError> {
        match named(alias).into_iter().next() {
            Some(inner) => self.expr(inner, NameContext::Store),
            None if matches!(alias.kind(), "as_pattern_target" | "identifier") => {
                Ok(Expr::new(
                    line_of(alias),
                    alias.start_position().column,
                    ExprKind::Name {
                        id: self.text(alias).to_string(),
                        ctx: NameContext::Store,
                    },
                ))
            }
            None => self.expr(alias, NameContext::Store),
        }
    }

    fn match_stmt(&mut self, node: Node<'_>) -> Result<Match, SyntaxError> {
        let subjects = {
            let mut cursor = node.walk();
            let nodes: Vec<Node<'_>> = node
                .children_by_field_name("subject", &mut cursor)
                .collect();
            nodes
                .into_iter()
                .map(|n| self.expr(n, NameContext::Load))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut cases = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for case in named(body).into_iter().filter(|n| n.kind() == "case_clause") {
                let guard = match case.child_by_field_name("guard") {
                    Some(clause) => named(clause)
                        .into_iter()
                        .next()
                        .map(|g| self.expr(g, NameContext::Load))
                        .transpose()?,
                    None => None,
                };
                cases.push(MatchCase {
                    guard,
                    body: self.block(case.child_by_field_name("consequence"))?,
                });
            }
        }
        Ok(Match { subjects, cases })
    }

    fn expression_statement(&mut self, node: Node<'_>) -> Result<StmtKind, SyntaxError> {
        let children = named(node);
        match children.as_slice() {
            [single] if single.kind() == "assignment" => self.assignment(*single),
            [single] if single.kind() == "augmented_assignment" => Ok(StmtKind::AugAssign {
                target: self.field_expr_in(*single, "left", NameContext::Store)?,
                value: self.field_expr(*single, "right")?,
            }),
            [single] => Ok(StmtKind::Expr(self.expr(*single, NameContext::Load)?)),
            _ => Ok(StmtKind::Expr(self.compound(node, &children, NameContext::Load)?)),
        }
    }

    /// `a = b = value` and `target: annotation [= value]`.
    fn assignment(&mut self, node: Node<'_>) -> Result<StmtKind, SyntaxError> {
        let target = self.field_expr_in(node, "left", NameContext::Store)?;

        if let Some(annotation) = node.child_by_field_name("type") {
            return Ok(StmtKind::AnnAssign {
                target,
                annotation: self.expr(annotation, NameContext::Load)?,
                value: node
                    .child_by_field_name("right")
                    .map(|v| self.expr(v, NameContext::Load))
                    .transpose()?,
            });
        }

        let mut targets = vec![target];
        let mut right = node.child_by_field_name("right");
        while let Some(next) =
            right.filter(|n| n.kind() == "assignment" && n.child_by_field_name("type").is_none())
        {
            targets.push(self.field_expr_in(next, "left", NameContext::Store)?);
            right = next.child_by_field_name("right");
        }
        let value = match right {
            Some(value) => self.expr(value, NameContext::Load)?,
            None => Expr::new(
                line_of(node),
                node.start_position().column,
                ExprKind::Compound(Vec::new()),
            ),
        };
        Ok(StmtKind::Assign { targets, value })
    }

    // ---- expressions ---------------------------------------------------

    fn field_expr(&mut self, node: Node<'_>, field: &str) -> Result<Expr, SyntaxError> {
        self.field_expr_in(node, field, NameContext::Load)
    }

    fn field_expr_in(
        &mut self,
        node: Node<'_>,
        field: &str,
        ctx: NameContext,
    ) -> Result<Expr, SyntaxError> {
        match node.child_by_field_name(field) {
            Some(child) => self.expr(child, ctx),
            None => Err(SyntaxError::new(
                Some(line_of(node)),
                format!("{} without {}", node.kind(), field),
            )),
        }
    }

    fn exprs(&mut self, node: Node<'_>, ctx: NameContext) -> Result<Vec<Expr>, SyntaxError> {
        named(node).into_iter().map(|n| self.expr(n, ctx)).collect()
    }

    fn compound(
        &mut self,
        node: Node<'_>,
        children: &[Node<'_>],
        ctx: NameContext,
    ) -> Result<Expr, SyntaxError> {
        let parts = children
            .iter()
            .map(|c| self.expr(*c, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::new(
            line_of(node),
            node.start_position().column,
            ExprKind::Compound(parts),
        ))
    }

    fn expr(&mut self, node: Node<'_>, ctx: NameContext) -> Result<Expr, SyntaxError> {
        self.descend(node)?;
        let result = self.expr_kind(node, ctx);
        self.depth -= 1;
        Ok(Expr::new(line_of(node), node.start_position().column, result?))
    }

    fn expr_kind(&mut self, node: Node<'_>, ctx: NameContext) -> Result<ExprKind, SyntaxError> {
        let kind = match node.kind() {
            "identifier" => ExprKind::Name {
                id: self.text(node).to_string(),
                ctx,
            },
            "call" => {
                let func = self.field_expr(node, "function")?;
                let args = match node.child_by_field_name("arguments") {
                    Some(args) if args.kind() == "argument_list" => {
                        self.exprs(args, NameContext::Load)?
                    }
                    Some(generator) => vec![self.expr(generator, NameContext::Load)?],
                    None => Vec::new(),
                };
                ExprKind::Call {
                    func: Box::new(func),
                    args,
                }
            }
            "attribute" => ExprKind::Attribute {
                value: Box::new(self.field_expr(node, "object")?),
                attr: node
                    .child_by_field_name("attribute")
                    .map(|a| self.text(a).to_string())
                    .unwrap_or_default(),
            },
            "binary_operator" | "boolean_operator" => {
                ExprKind::Compound(self.operator_chain(node)?)
            }
            "string" => self.string(node)?,
            "concatenated_string" => self.concatenated(node)?,
            "named_expression" => ExprKind::Compound(vec![
                self.field_expr_in(node, "name", NameContext::Store)?,
                self.field_expr(node, "value")?,
            ]),
            "keyword_argument" => ExprKind::Compound(vec![self.field_expr(node, "value")?]),
            "for_in_clause" => {
                let mut parts = vec![self.field_expr_in(node, "left", NameContext::Store)?];
                let mut cursor = node.walk();
                let right: Vec<Node<'_>> = node
                    .children_by_field_name("right", &mut cursor)
                    .collect();
                for r in right {
                    parts.push(self.expr(r, NameContext::Load)?);
                }
                ExprKind::Compound(parts)
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list" | "expression_list"
            | "parenthesized_expression" | "list_splat_pattern" | "list_splat" => {
                let parts = self.exprs(node, ctx)?;
                ExprKind::Compound(parts)
            }
            _ => ExprKind::Compound(self.exprs(node, NameContext::Load)?),
        };
        Ok(kind)
    }

    /// Operands of a `+`/`and`-style chain in source order.
    ///
    /// The grammar nests `a + b + c` as `(a + b) + c`; the spine is walked
    /// with a worklist so chain length does not count as nesting.
    fn operator_chain(&mut self, node: Node<'_>) -> Result<Vec<Expr>, SyntaxError> {
        let kind = node.kind();
        let mut pending = vec![node];
        let mut operands = Vec::new();
        while let Some(current) = pending.pop() {
            if current.kind() != kind {
                operands.push(current);
                continue;
            }
            for field in ["right", "left"] {
                if let Some(child) = current.child_by_field_name(field) {
                    pending.push(child);
                }
            }
        }
        operands
            .into_iter()
            .map(|n| self.expr(n, NameContext::Load))
            .collect()
    }

    fn string(&mut self, node: Node<'_>) -> Result<ExprKind, SyntaxError> {
        let mut prefix = "";
        let mut start = node.start_byte();
        let mut end = node.end_byte();
        let mut parts = Vec::new();

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "string_start" => {
                    prefix = self.text(child);
                    start = child.end_byte();
                }
                "string_end" => end = child.start_byte(),
                "interpolation" => {
                    if let Some(expr) = child.child_by_field_name("expression") {
                        parts.push(self.expr(expr, NameContext::Load)?);
                    }
                }
                _ => {}
            }
        }

        let prefix = prefix.to_ascii_lowercase();
        let kind = if prefix.contains('f') {
            StrKind::Formatted
        } else if prefix.contains('b') {
            StrKind::Bytes
        } else {
            StrKind::Text
        };
        let value = self
            .src
            .get(start..end.max(start))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        Ok(ExprKind::Str { kind, value, parts })
    }

    /// Implicitly concatenated literals; any formatted part makes the whole formatted.
    fn concatenated(&mut self, node: Node<'_>) -> Result<ExprKind, SyntaxError> {
        let mut kind = StrKind::Text;
        let mut value = String::new();
        let mut parts = Vec::new();
        for child in named(node) {
            if let ExprKind::Str {
                kind: part_kind,
                value: part_value,
                parts: part_parts,
            } = self.expr(child, NameContext::Load)?.kind
            {
                if part_kind != StrKind::Text {
                    kind = part_kind;
                }
                value.push_str(&part_value);
                parts.extend(part_parts);
            }
        }
        Ok(ExprKind::Str { kind, value, parts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Module {
        PythonParser::new().parse(src).unwrap()
    }

    fn parse_err(src: &str) -> SyntaxError {
        PythonParser::new().parse(src).unwrap_err()
    }

    fn function(stmt: &Stmt) -> &FunctionDef {
        match &stmt.kind {
            StmtKind::FunctionDef(f) => f,
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn module_docstring() {
        let module = parse("\"\"\"Module docs.\"\"\"\n\nx = 1\n");
        assert_eq!(module.docstring(), Some("Module docs."));
        assert_eq!(module.body.len(), 2);
    }

    #[test]
    fn formatted_and_bytes_strings_are_not_docstrings() {
        assert_eq!(parse("f\"docs {x}\"\n").docstring(), None);
        assert_eq!(parse("b\"docs\"\n").docstring(), None);
        assert_eq!(parse("r\"docs\"\n").docstring(), Some("docs"));
    }

    #[test]
    fn function_positions_and_docstring() {
        let module = parse(
            "class A:\n    \"\"\"A.\"\"\"\n\n    async def run(self):\n        \"\"\"Run.\"\"\"\n        return 1\n",
        );
        let StmtKind::ClassDef(class) = &module.body[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.docstring(), Some("A."));
        let method = &class.body[1];
        assert_eq!((method.line, method.column), (4, 4));
        let f = function(method);
        assert!(f.is_async);
        assert_eq!(f.name, "run");
        assert_eq!(f.docstring(), Some("Run."));
    }

    #[test]
    fn decorated_function_uses_def_line() {
        let module = parse("@app.route(\"/\")\ndef index():\n    pass\n");
        let stmt = &module.body[0];
        assert_eq!(stmt.line, 2);
        assert_eq!(function(stmt).decorators.len(), 1);
    }

    #[test]
    fn elif_becomes_nested_if() {
        let module = parse("if a:\n    pass\nelif b:\n    pass\nelse:\n    x = 1\n");
        let StmtKind::If(outer) = &module.body[0].kind else {
            panic!("expected if");
        };
        assert_eq!(outer.orelse.len(), 1);
        assert_eq!(outer.orelse[0].line, 3);
        let StmtKind::If(inner) = &outer.orelse[0].kind else {
            panic!("expected elif");
        };
        assert!(matches!(inner.orelse[0].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn chained_and_annotated_assignments() {
        let module = parse("a = b = 1\nc: int = 2\nd += 3\n");
        let StmtKind::Assign { targets, .. } = &module.body[0].kind else {
            panic!("expected assign");
        };
        assert_eq!(targets.len(), 2);
        assert!(matches!(module.body[1].kind, StmtKind::AnnAssign { .. }));
        assert!(matches!(module.body[2].kind, StmtKind::AugAssign { .. }));
    }

    #[test]
    fn unpacking_targets_are_store() {
        let module = parse("a, *b = items\n");
        let StmtKind::Assign { targets, .. } = &module.body[0].kind else {
            panic!("expected assign");
        };
        let mut stores = Vec::new();
        collect_stores(&targets[0], &mut stores);
        assert_eq!(stores, vec!["a", "b"]);
    }

    fn collect_stores(expr: &Expr, out: &mut Vec<String>) {
        match &expr.kind {
            ExprKind::Name {
                id,
                ctx: NameContext::Store,
            } => out.push(id.clone()),
            ExprKind::Compound(children) => children.iter().for_each(|c| collect_stores(c, out)),
            _ => {}
        }
    }

    #[test]
    fn call_of_bare_name_and_attribute() {
        let module = parse("eval(x)\nos.system(cmd)\n");
        let StmtKind::Expr(first) = &module.body[0].kind else {
            panic!("expected expression");
        };
        assert_eq!(first.called_name(), Some("eval"));
        let StmtKind::Expr(second) = &module.body[1].kind else {
            panic!("expected expression");
        };
        assert_eq!(second.called_name(), None);
    }

    #[test]
    fn try_with_and_match_are_lowered() {
        let src = "\
try:
    pass
except ValueError as e:
    pass
finally:
    pass
with open(p) as fh, lock:
    pass
match cmd:
    case [x] if x > 0:
        pass
    case _:
        pass
";
        let module = parse(src);
        let StmtKind::Try(t) = &module.body[0].kind else {
            panic!("expected try");
        };
        assert_eq!(t.handlers.len(), 1);
        assert_eq!(t.handlers[0].name.as_deref(), Some("e"));
        assert_eq!(t.finalbody.len(), 1);

        let StmtKind::With(w) = &module.body[1].kind else {
            panic!("expected with");
        };
        assert_eq!(w.items.len(), 2);
        assert!(w.items[0].target.is_some());
        assert!(w.items[1].target.is_none());

        let StmtKind::Match(m) = &module.body[2].kind else {
            panic!("expected match");
        };
        assert_eq!(m.cases.len(), 2);
        assert!(m.cases[0].guard.is_some());
    }

    #[test]
    fn syntax_error_reports_line() {
        let err = parse_err("x = 1\ndef broken(:\n    pass\n");
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn python2_print_is_rejected() {
        let err = parse_err("x = 1\nprint \"hello\"\n");
        assert_eq!(err.line, Some(2));
        assert!(err.message.contains("print"));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let depth = MAX_NESTING + 10;
        let src = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        assert!(PythonParser::new().parse(&src).is_err());
    }

    #[test]
    fn long_operator_chains_are_not_nesting() {
        let terms = vec!["a"; 300];
        let sum = format!("x = {}\n", terms.join(" + "));
        let cond = format!("if {}:\n    pass\n", terms.join(" and "));

        let module = parse(&sum);
        let StmtKind::Assign { value, .. } = &module.body[0].kind else {
            panic!("expected assign");
        };
        let ExprKind::Compound(operands) = &value.kind else {
            panic!("expected flattened chain");
        };
        assert_eq!(operands.len(), 300);

        assert_eq!(parse(&cond).body.len(), 1);
    }

    #[test]
    fn chain_operands_keep_source_order() {
        let module = parse("x = a * b + c - d\n");
        let StmtKind::Assign { value, .. } = &module.body[0].kind else {
            panic!("expected assign");
        };
        let ExprKind::Compound(operands) = &value.kind else {
            panic!("expected flattened chain");
        };
        let names: Vec<&str> = operands
            .iter()
            .filter_map(|e| match &e.kind {
                ExprKind::Name { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn print_and_exec_calls_are_python3() {
        let module = parse("import sys\nprint(\"a\", file=sys.stderr)\nprint()\nexec(code)\n");
        assert_eq!(module.body.len(), 4);
        let StmtKind::Expr(call) = &module.body[3].kind else {
            panic!("expected expression");
        };
        assert_eq!(call.called_name(), Some("exec"));
    }

    #[test]
    fn empty_source_is_empty_module() {
        assert!(parse("").body.is_empty());
        assert!(parse("# only a comment\n").body.is_empty());
    }
}
