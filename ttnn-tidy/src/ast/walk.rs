//! Single pre-order traversal over a translation unit.
//!
//! The walker keeps the chain of enclosing scopes so that declaration context
//! (namespaces, records, functions) is available to every visited node without
//! parent pointers in the tree.

use super::{Decl, Expr, Stmt, TranslationUnit, TypeLoc};

/// Kind of an enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// `namespace`; the name is empty when anonymous.
    Namespace,
    /// `struct` or `class` body.
    Record,
    /// Function or closure body.
    Function,
}

/// One enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope<'a> {
    /// What opened the scope.
    pub kind: ScopeKind,
    /// Name of the declaration that opened it.
    pub name: &'a str,
}

/// A node offered to the visitor callback.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// A declaration.
    Decl(&'a Decl),
    /// An expression.
    Expr(&'a Expr),
    /// A written type.
    TypeLoc(&'a TypeLoc),
}

impl NodeRef<'_> {
    /// Whether the node was produced by a macro expansion.
    #[must_use]
    pub fn from_macro(&self) -> bool {
        match self {
            Self::Decl(d) => d.from_macro(),
            Self::Expr(e) => e.from_macro(),
            Self::TypeLoc(t) => t.from_macro,
        }
    }
}

/// Enclosing namespace names, innermost first.
///
/// Derived once per struct/alias candidate and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamingContext {
    names: Vec<String>,
}

impl NamingContext {
    /// Builds the context from an outermost-first scope chain.
    ///
    /// Only named namespaces contribute; records, functions and anonymous
    /// namespaces are skipped.
    #[must_use]
    pub fn from_scopes(scopes: &[Scope<'_>]) -> Self {
        let names = scopes
            .iter()
            .rev()
            .filter(|s| s.kind == ScopeKind::Namespace && !s.name.is_empty())
            .map(|s| s.name.to_owned())
            .collect();
        Self { names }
    }

    /// Builds the context from names already ordered innermost first.
    #[must_use]
    pub fn from_innermost<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Innermost-first iterator over scope names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Whether no named namespace encloses the node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Pre-order walker over a [`TranslationUnit`].
pub struct Walker<'a, F>
where
    F: FnMut(NodeRef<'a>, &[Scope<'a>]),
{
    scopes: Vec<Scope<'a>>,
    visit: F,
}

impl<'a, F> Walker<'a, F>
where
    F: FnMut(NodeRef<'a>, &[Scope<'a>]),
{
    /// Creates a walker that reports every node to `visit`.
    pub fn new(visit: F) -> Self {
        Self {
            scopes: Vec::new(),
            visit,
        }
    }

    /// Walks every top-level declaration of the unit.
    pub fn walk_unit(&mut self, unit: &'a TranslationUnit) {
        for decl in &unit.decls {
            self.walk_decl(decl);
        }
    }

    fn emit(&mut self, node: NodeRef<'a>) {
        (self.visit)(node, &self.scopes);
    }

    /// Visits a declaration and its children.
    pub fn walk_decl(&mut self, decl: &'a Decl) {
        tracing::trace!(range = ?decl.range(), "visit decl");
        self.emit(NodeRef::Decl(decl));

        match decl {
            Decl::Namespace(ns) => {
                self.scopes.push(Scope {
                    kind: ScopeKind::Namespace,
                    name: &ns.name,
                });
                for d in &ns.decls {
                    self.walk_decl(d);
                }
                self.scopes.pop();
            }
            Decl::Record(rec) => {
                self.scopes.push(Scope {
                    kind: ScopeKind::Record,
                    name: &rec.name,
                });
                for d in &rec.members {
                    self.walk_decl(d);
                }
                self.scopes.pop();
            }
            Decl::TypeAlias(alias) => self.walk_type_loc(&alias.underlying),
            Decl::Function(func) => {
                if let Some(ret) = &func.return_type {
                    self.walk_type_loc(ret);
                }
                for param in &func.params {
                    if let Some(ty) = &param.ty {
                        self.walk_type_loc(ty);
                    }
                }
                if let Some(body) = &func.body {
                    self.scopes.push(Scope {
                        kind: ScopeKind::Function,
                        name: &func.name,
                    });
                    self.walk_stmt(body);
                    self.scopes.pop();
                }
            }
            Decl::Var(var) => {
                self.walk_type_loc(&var.ty);
                if let Some(init) = &var.init {
                    self.walk_expr(init);
                }
            }
            Decl::Other(_) => {}
        }
    }

    /// Visits the children of a statement. Statements themselves are not reported.
    pub fn walk_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Compound { stmts, .. } => {
                for s in stmts {
                    self.walk_stmt(s);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.walk_expr(value);
                }
            }
            Stmt::Expr { expr } => self.walk_expr(expr),
            Stmt::Decl { decl } => self.walk_decl(decl),
            Stmt::Other { .. } => {}
        }
    }

    /// Visits an expression and its sub-expressions.
    pub fn walk_expr(&mut self, expr: &'a Expr) {
        self.emit(NodeRef::Expr(expr));

        match expr {
            Expr::Call(call) | Expr::OperatorCall(call) => {
                self.walk_expr(&call.callee.expr);
                for arg in &call.args {
                    self.walk_expr(arg);
                }
            }
            Expr::Construct(construct) => {
                if let Some(ty) = &construct.type_loc {
                    self.walk_type_loc(ty);
                }
                for arg in &construct.args {
                    self.walk_expr(arg);
                }
            }
            Expr::Lambda(lambda) => {
                for param in &lambda.params {
                    if let Some(ty) = &param.ty {
                        self.walk_type_loc(ty);
                    }
                }
                self.walk_stmt(&lambda.body);
            }
            Expr::ImplicitCast(w)
            | Expr::BindTemporary(w)
            | Expr::MaterializeTemporary(w)
            | Expr::Paren(w) => self.walk_expr(&w.inner),
            Expr::Literal(leaf) | Expr::Other(leaf) => {
                for child in &leaf.children {
                    self.walk_expr(child);
                }
            }
            Expr::DeclRef(_) => {}
        }
    }

    /// Visits a type location and the type locations nested in it.
    pub fn walk_type_loc(&mut self, ty: &'a TypeLoc) {
        self.emit(NodeRef::TypeLoc(ty));
        for child in ty.children() {
            self.walk_type_loc(child);
        }
    }
}
