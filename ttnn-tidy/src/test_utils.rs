//! Helpers for building translation units by hand.
//!
//! A [`Fixture`] holds the text of one main file and hands out ranges located by
//! searching snippets in it, so tests can assemble the nodes a front-end would
//! produce without hard-coding byte offsets. The free functions build nodes.

use crate::ast::{
    CallExpr, Callee, ConstructExpr, Decl, DeclRefExpr, Expr, FileId, FunctionDecl, LambdaExpr,
    LeafExpr, NamespaceDecl, ParamDecl, RecordDecl, SourceFile, SourceRange, Stmt,
    TranslationUnit, TypeAliasDecl, TypeLoc, TypeLocKind, VarDecl, WrapperExpr,
};
use std::path::PathBuf;

/// Source text of a main file plus snippet-based range lookup.
#[derive(Debug, Clone)]
pub struct Fixture {
    path: PathBuf,
    text: String,
    file: FileId,
}

impl Fixture {
    /// Id given to the main file of every fixture unit.
    pub const MAIN: FileId = FileId(0);

    /// Creates a fixture for the file at `path`.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            file: Self::MAIN,
        }
    }

    /// The fixture source.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn range_at(&self, start: usize, len: usize) -> SourceRange {
        let to_u32 = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        SourceRange::new(self.file, to_u32(start), to_u32(start + len))
    }

    /// Range of the `n`-th (0-based) occurrence of `snippet`.
    ///
    /// # Panics
    /// If the snippet does not occur that often.
    #[must_use]
    pub fn nth(&self, snippet: &str, n: usize) -> SourceRange {
        match self.text.match_indices(snippet).nth(n) {
            Some((start, _)) => self.range_at(start, snippet.len()),
            None => panic!("snippet {snippet:?} occurs fewer than {} times", n + 1),
        }
    }

    /// Range of the first occurrence of `snippet`.
    #[must_use]
    pub fn find(&self, snippet: &str) -> SourceRange {
        self.nth(snippet, 0)
    }

    /// Range of the first occurrence of `snippet` at or after the start of `anchor`.
    ///
    /// # Panics
    /// If either snippet is missing.
    #[must_use]
    pub fn find_after(&self, anchor: &str, snippet: &str) -> SourceRange {
        let from = self.find(anchor).start.unwrap_or_default() as usize;
        match self.text[from..].find(snippet) {
            Some(pos) => self.range_at(from + pos, snippet.len()),
            None => panic!("snippet {snippet:?} not found after {anchor:?}"),
        }
    }

    /// Range from the start of `from` through the end of the first `to` after it.
    #[must_use]
    pub fn span(&self, from: &str, to: &str) -> SourceRange {
        let start = self.find(from);
        let end = self.find_after(from, to);
        SourceRange {
            file: self.file,
            start: start.start,
            end: end.end,
        }
    }

    /// Range covering the whole file.
    #[must_use]
    pub fn whole(&self) -> SourceRange {
        self.range_at(0, self.text.len())
    }

    /// The main file as a [`SourceFile`].
    #[must_use]
    pub fn source_file(&self) -> SourceFile {
        SourceFile {
            id: self.file,
            path: self.path.clone(),
            text: self.text.clone(),
        }
    }

    /// Wraps `decls` into a unit whose main file is this fixture.
    #[must_use]
    pub fn unit(&self, decls: Vec<Decl>) -> TranslationUnit {
        TranslationUnit {
            main_file: self.file,
            files: vec![self.source_file()],
            decls,
        }
    }
}

/// `namespace name { decls }`
#[must_use]
pub fn namespace(name: &str, range: SourceRange, decls: Vec<Decl>) -> Decl {
    Decl::Namespace(NamespaceDecl {
        name: name.to_owned(),
        range,
        decls,
    })
}

/// A struct definition.
#[must_use]
pub fn record(name: &str, range: SourceRange, name_range: SourceRange, members: Vec<Decl>) -> Decl {
    Decl::Record(RecordDecl {
        name: name.to_owned(),
        range,
        name_range,
        is_definition: true,
        members,
        from_macro: false,
    })
}

/// `using name = underlying` with `range` stopping before the `;`.
#[must_use]
pub fn alias(name: &str, range: SourceRange, name_range: SourceRange, underlying: TypeLoc) -> Decl {
    Decl::TypeAlias(TypeAliasDecl {
        name: name.to_owned(),
        range,
        name_range,
        underlying,
        from_macro: false,
    })
}

/// A function with a body.
#[must_use]
pub fn function(
    name: &str,
    range: SourceRange,
    return_type: Option<TypeLoc>,
    params: Vec<ParamDecl>,
    body: Stmt,
) -> Decl {
    Decl::Function(FunctionDecl {
        name: name.to_owned(),
        range,
        return_type,
        params,
        body: Some(body),
        from_macro: false,
    })
}

/// A variable declaration.
#[must_use]
pub fn var(name: &str, range: SourceRange, ty: TypeLoc, init: Option<Expr>) -> Decl {
    Decl::Var(VarDecl {
        name: name.to_owned(),
        range,
        ty,
        init,
        from_macro: false,
    })
}

/// A parameter named `name`.
#[must_use]
pub fn param(name: &str, range: SourceRange) -> ParamDecl {
    ParamDecl {
        name: name.to_owned(),
        range,
        ty: None,
    }
}

/// A parameter with a written type.
#[must_use]
pub fn typed_param(name: &str, range: SourceRange, ty: TypeLoc) -> ParamDecl {
    ParamDecl {
        name: name.to_owned(),
        range,
        ty: Some(ty),
    }
}

fn type_loc(kind: TypeLocKind, range: SourceRange, spelled: &str, canonical: &str) -> TypeLoc {
    TypeLoc {
        range,
        kind,
        spelled: spelled.to_owned(),
        canonical: canonical.to_owned(),
        from_macro: false,
    }
}

/// A written struct/class type.
#[must_use]
pub fn record_type(range: SourceRange, spelled: &str, canonical: &str) -> TypeLoc {
    type_loc(TypeLocKind::Record, range, spelled, canonical)
}

/// A written alias type.
#[must_use]
pub fn typedef_type(range: SourceRange, spelled: &str, canonical: &str) -> TypeLoc {
    type_loc(TypeLocKind::Typedef, range, spelled, canonical)
}

/// A written template specialization.
#[must_use]
pub fn template_type(range: SourceRange, spelled: &str, args: Vec<TypeLoc>) -> TypeLoc {
    type_loc(TypeLocKind::Template { args }, range, spelled, spelled)
}

/// `{ stmts }`
#[must_use]
pub fn compound(range: SourceRange, stmts: Vec<Stmt>) -> Stmt {
    Stmt::Compound { range, stmts }
}

/// `return value;`
#[must_use]
pub fn ret(range: SourceRange, value: Expr) -> Stmt {
    Stmt::Return {
        range,
        value: Some(value),
    }
}

/// Expression statement.
#[must_use]
pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr { expr }
}

/// Reference to `name`.
#[must_use]
pub fn decl_ref(range: SourceRange, name: &str) -> Expr {
    Expr::DeclRef(DeclRefExpr {
        range,
        name: name.to_owned(),
        ty: String::new(),
    })
}

/// Call through `callee`; `qualified_name` is set for calls to named functions.
#[must_use]
pub fn call(range: SourceRange, qualified_name: Option<&str>, callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        range,
        ty: String::new(),
        callee: Callee {
            qualified_name: qualified_name.map(ToOwned::to_owned),
            expr: Box::new(callee),
        },
        args,
        from_macro: false,
    })
}

/// `object(args...)` resolved to `operator()`; `object` becomes argument 0.
#[must_use]
pub fn operator_call(range: SourceRange, object: Expr, args: Vec<Expr>) -> Expr {
    let callee = Expr::Other(LeafExpr {
        range,
        ty: String::new(),
        children: Vec::new(),
    });
    let mut all = vec![object];
    all.extend(args);
    Expr::OperatorCall(CallExpr {
        range,
        ty: String::new(),
        callee: Callee {
            qualified_name: Some("operator()".to_owned()),
            expr: Box::new(callee),
        },
        args: all,
        from_macro: false,
    })
}

/// Construction of `ty` from `args`.
#[must_use]
pub fn construct(range: SourceRange, ty: &str, args: Vec<Expr>) -> Expr {
    Expr::Construct(ConstructExpr {
        range,
        ty: ty.to_owned(),
        type_loc: None,
        args,
        from_macro: false,
    })
}

/// An inline closure.
#[must_use]
pub fn lambda(range: SourceRange, params: Vec<ParamDecl>, body: Stmt) -> Expr {
    Expr::Lambda(LambdaExpr {
        range,
        params,
        body: Box::new(body),
        from_macro: false,
    })
}

/// A literal of type `ty`.
#[must_use]
pub fn literal(range: SourceRange, ty: &str) -> Expr {
    Expr::Literal(LeafExpr {
        range,
        ty: ty.to_owned(),
        children: Vec::new(),
    })
}

/// Compiler-inserted conversion around `inner`.
#[must_use]
pub fn implicit(inner: Expr) -> Expr {
    let range = inner.range();
    let ty = inner.ty().to_owned();
    Expr::ImplicitCast(WrapperExpr {
        range,
        ty,
        inner: Box::new(inner),
    })
}

/// Temporary materialization around `inner`.
#[must_use]
pub fn materialize(inner: Expr) -> Expr {
    let range = inner.range();
    let ty = inner.ty().to_owned();
    Expr::MaterializeTemporary(WrapperExpr {
        range,
        ty,
        inner: Box::new(inner),
    })
}
