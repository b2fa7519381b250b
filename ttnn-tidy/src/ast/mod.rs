//! Read-only facade over the front-end's parse tree.
//!
//! The core never parses C++ itself. A front-end lowers its AST into the closed
//! node families below (declarations, statements, expressions, type locations)
//! and hands the result over as a [`TranslationUnit`], either in memory or as a
//! JSON interchange document.
//!
//! Every node carries a [`SourceRange`]. Ranges may be partially invalid (the
//! front-end could not map an endpoint back to a file offset); consumers must go
//! through [`SourceRange::text_range`] and reject such ranges.

pub mod walk;

use ruff_text_size::{TextRange, TextSize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use walk::{NamingContext, NodeRef, Scope, ScopeKind, Walker};

/// Identity of one source buffer inside a translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

/// Half-open byte interval `[start, end)` in one file.
///
/// `None` marks an endpoint the front-end could not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    /// File the range belongs to.
    pub file: FileId,
    /// Start offset (inclusive).
    pub start: Option<u32>,
    /// End offset (exclusive).
    pub end: Option<u32>,
}

impl SourceRange {
    /// Creates a fully valid range.
    #[must_use]
    pub const fn new(file: FileId, start: u32, end: u32) -> Self {
        Self {
            file,
            start: Some(start),
            end: Some(end),
        }
    }

    /// Creates a range with both endpoints invalid.
    #[must_use]
    pub const fn invalid(file: FileId) -> Self {
        Self {
            file,
            start: None,
            end: None,
        }
    }

    /// Returns the byte range if both endpoints are valid and ordered.
    #[must_use]
    pub fn text_range(&self) -> Option<TextRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => {
                Some(TextRange::new(TextSize::new(start), TextSize::new(end)))
            }
            _ => None,
        }
    }

    /// Valid start offset, if any.
    #[must_use]
    pub fn begin(&self) -> Option<TextSize> {
        self.start.map(TextSize::new)
    }

    /// Whether both endpoints are usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.text_range().is_some()
    }
}

/// One source buffer of the translation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Identity referenced by ranges.
    pub id: FileId,
    /// Path as reported by the front-end.
    pub path: PathBuf,
    /// Raw file contents.
    pub text: String,
}

/// A parsed main file together with every buffer its ranges may point into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// The file being analyzed; findings are only produced for it.
    pub main_file: FileId,
    /// All buffers (main file and included files).
    pub files: Vec<SourceFile>,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
}

impl TranslationUnit {
    /// Looks up a buffer by id.
    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Path of the primary analyzed file.
    #[must_use]
    pub fn main_path(&self) -> Option<&Path> {
        self.file(self.main_file).map(|f| f.path.as_path())
    }

    /// File name (last path component) of a buffer.
    #[must_use]
    pub fn file_name(&self, id: FileId) -> Option<&str> {
        self.file(id)
            .and_then(|f| f.path.file_name())
            .and_then(|name| name.to_str())
    }

    /// Whether the range lies in the primary analyzed file (not an included header).
    #[must_use]
    pub fn is_in_main_file(&self, range: &SourceRange) -> bool {
        range.file == self.main_file && range.start.is_some()
    }
}

/// Declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Decl {
    /// `namespace name { ... }`; anonymous namespaces have an empty name.
    Namespace(NamespaceDecl),
    /// `struct` / `class` declaration.
    Record(RecordDecl),
    /// `using name = type;`
    TypeAlias(TypeAliasDecl),
    /// Function or method.
    Function(FunctionDecl),
    /// Variable or field.
    Var(VarDecl),
    /// Anything the rules never look at.
    Other(OtherDecl),
}

impl Decl {
    /// Full range of the declaration.
    #[must_use]
    pub fn range(&self) -> SourceRange {
        match self {
            Self::Namespace(d) => d.range,
            Self::Record(d) => d.range,
            Self::TypeAlias(d) => d.range,
            Self::Function(d) => d.range,
            Self::Var(d) => d.range,
            Self::Other(d) => d.range,
        }
    }

    /// Whether the declaration was produced by a macro expansion.
    #[must_use]
    pub fn from_macro(&self) -> bool {
        match self {
            Self::Namespace(_) | Self::Other(_) => false,
            Self::Record(d) => d.from_macro,
            Self::TypeAlias(d) => d.from_macro,
            Self::Function(d) => d.from_macro,
            Self::Var(d) => d.from_macro,
        }
    }
}

/// `namespace name { decls }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDecl {
    /// Last component of the name; empty when anonymous.
    pub name: String,
    /// From `namespace` to the closing brace.
    pub range: SourceRange,
    /// Nested declarations in source order.
    #[serde(default)]
    pub decls: Vec<Decl>,
}

/// A struct or class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDecl {
    /// Unqualified record name.
    pub name: String,
    /// Whole declaration.
    pub range: SourceRange,
    /// Range of the name token alone.
    pub name_range: SourceRange,
    /// False for forward declarations.
    #[serde(default)]
    pub is_definition: bool,
    /// Member declarations, including nested aliases.
    #[serde(default)]
    pub members: Vec<Decl>,
    /// Set when the declaration comes from a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// A `using` type alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    /// Alias name.
    pub name: String,
    /// From `using` up to, but excluding, the terminating `;`.
    pub range: SourceRange,
    /// Range of the name token alone.
    pub name_range: SourceRange,
    /// The aliased type as written.
    pub underlying: TypeLoc,
    /// Set when the declaration comes from a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// A function, method or function template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Unqualified function name.
    pub name: String,
    /// Whole declaration, body included.
    pub range: SourceRange,
    /// Written return type; absent for constructors and deduced returns.
    #[serde(default)]
    pub return_type: Option<TypeLoc>,
    /// Parameters in order.
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Body, when this is a definition.
    #[serde(default)]
    pub body: Option<Stmt>,
    /// Set when the declaration comes from a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// A variable or data member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    /// Variable name.
    pub name: String,
    /// Whole declaration.
    pub range: SourceRange,
    /// Declared type as written.
    pub ty: TypeLoc,
    /// Initializer, if any.
    #[serde(default)]
    pub init: Option<Expr>,
    /// Set when the declaration comes from a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// A declaration kind the rules do not inspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherDecl {
    /// Whole declaration.
    pub range: SourceRange,
}

/// A function or closure parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Parameter name; empty when unnamed.
    pub name: String,
    /// Whole parameter declaration.
    pub range: SourceRange,
    /// Written type; absent for `auto` closure parameters.
    #[serde(default)]
    pub ty: Option<TypeLoc>,
}

/// Statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    /// `{ stmts }`
    Compound {
        /// Braces included.
        range: SourceRange,
        /// Nested statements in order.
        #[serde(default)]
        stmts: Vec<Stmt>,
    },
    /// `return value;`
    Return {
        /// Statement range.
        range: SourceRange,
        /// Returned expression; absent for a bare `return;`.
        #[serde(default)]
        value: Option<Expr>,
    },
    /// Expression statement.
    Expr {
        /// The evaluated expression.
        expr: Expr,
    },
    /// Declaration statement.
    Decl {
        /// The declared entity.
        decl: Box<Decl>,
    },
    /// Anything else (control flow the rules never descend into).
    Other {
        /// Statement range.
        range: SourceRange,
    },
}

/// How a call names its target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Callee {
    /// Fully qualified name of the directly called function, when resolved.
    #[serde(default)]
    pub qualified_name: Option<String>,
    /// The callee expression (e.g. a reference to a closure parameter).
    pub expr: Box<Expr>,
}

/// `f(args)` and `obj(args)` style calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallExpr {
    /// From the callee to the closing parenthesis.
    pub range: SourceRange,
    /// Result type.
    #[serde(default)]
    pub ty: String,
    /// What is being called.
    pub callee: Callee,
    /// Call arguments in order.
    #[serde(default)]
    pub args: Vec<Expr>,
    /// Set when the call comes from a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// Constructor calls, temporary objects and brace initializers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructExpr {
    /// Whole construction expression.
    pub range: SourceRange,
    /// Constructed type, e.g. `ttnn::nanobind_overload_t<...>`.
    pub ty: String,
    /// The type as written, when the construction names one.
    #[serde(default)]
    pub type_loc: Option<TypeLoc>,
    /// Constructor arguments in order.
    #[serde(default)]
    pub args: Vec<Expr>,
    /// Set when the construction comes from a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// An inline closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambdaExpr {
    /// From the capture list to the closing brace of the body.
    pub range: SourceRange,
    /// Closure parameters in order.
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Closure body.
    pub body: Box<Stmt>,
    /// Set when the closure comes from a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// A reference to a named declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclRefExpr {
    /// The written name.
    pub range: SourceRange,
    /// Name of the referenced declaration.
    pub name: String,
    /// Type of the referenced declaration.
    #[serde(default)]
    pub ty: String,
}

/// A compiler-inserted or syntactic wrapper around a single sub-expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperExpr {
    /// Same as the inner range for compiler-inserted wrappers.
    pub range: SourceRange,
    /// Type after the wrapper is applied.
    #[serde(default)]
    pub ty: String,
    /// The wrapped expression.
    pub inner: Box<Expr>,
}

/// A literal or an expression kind the rules treat as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafExpr {
    /// Expression range.
    pub range: SourceRange,
    /// Expression type.
    #[serde(default)]
    pub ty: String,
    /// Sub-expressions still visited by the walker.
    #[serde(default)]
    pub children: Vec<Expr>,
}

/// Expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    /// Plain function or closure call.
    Call(CallExpr),
    /// Overloaded-operator call; `args[0]` is the object the operator is applied to.
    OperatorCall(CallExpr),
    /// Constructor call or brace initialization.
    Construct(ConstructExpr),
    /// Inline closure.
    Lambda(LambdaExpr),
    /// Reference to a named declaration.
    DeclRef(DeclRefExpr),
    /// Compiler-inserted conversion.
    ImplicitCast(WrapperExpr),
    /// Temporary bound for destruction.
    BindTemporary(WrapperExpr),
    /// Temporary materialized to bind a reference.
    MaterializeTemporary(WrapperExpr),
    /// `(inner)`
    Paren(WrapperExpr),
    /// Literal value.
    Literal(LeafExpr),
    /// Opaque expression.
    Other(LeafExpr),
}

impl Expr {
    /// Source range of the expression.
    #[must_use]
    pub fn range(&self) -> SourceRange {
        match self {
            Self::Call(e) | Self::OperatorCall(e) => e.range,
            Self::Construct(e) => e.range,
            Self::Lambda(e) => e.range,
            Self::DeclRef(e) => e.range,
            Self::ImplicitCast(e)
            | Self::BindTemporary(e)
            | Self::MaterializeTemporary(e)
            | Self::Paren(e) => e.range,
            Self::Literal(e) | Self::Other(e) => e.range,
        }
    }

    /// Spelled static type of the expression.
    #[must_use]
    pub fn ty(&self) -> &str {
        match self {
            Self::Call(e) | Self::OperatorCall(e) => &e.ty,
            Self::Construct(e) => &e.ty,
            Self::Lambda(_) => "",
            Self::DeclRef(e) => &e.ty,
            Self::ImplicitCast(e)
            | Self::BindTemporary(e)
            | Self::MaterializeTemporary(e)
            | Self::Paren(e) => &e.ty,
            Self::Literal(e) | Self::Other(e) => &e.ty,
        }
    }

    /// Whether the expression was produced by a macro expansion.
    #[must_use]
    pub fn from_macro(&self) -> bool {
        match self {
            Self::Call(e) | Self::OperatorCall(e) => e.from_macro,
            Self::Construct(e) => e.from_macro,
            Self::Lambda(e) => e.from_macro,
            _ => false,
        }
    }

    /// Strips compiler-inserted wrappers (implicit conversions, temporaries).
    ///
    /// Parentheses are written by the user and are kept.
    #[must_use]
    pub fn ignore_implicit(&self) -> &Expr {
        let mut current = self;
        while let Self::ImplicitCast(w) | Self::BindTemporary(w) | Self::MaterializeTemporary(w) =
            current
        {
            current = &w.inner;
        }
        current
    }
}

/// A type as written at some position in the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeLoc {
    /// Written range, including any namespace qualifier.
    pub range: SourceRange,
    /// What the written type names.
    pub kind: TypeLocKind,
    /// The type printed as written (sugar preserved), e.g. `slice::tensor_return_value_t`.
    pub spelled: String,
    /// Fully resolved spelling, e.g. `struct ttnn::operations::slice::operation_attributes_t`.
    #[serde(default)]
    pub canonical: String,
    /// Set when the type is written inside a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

/// What a [`TypeLoc`] names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeLocKind {
    /// A struct/class name.
    Record,
    /// A typedef or alias name.
    Typedef,
    /// `int`, `bool` and the like.
    Builtin,
    /// `name<args...>`
    Template {
        /// Written template arguments that are types.
        #[serde(default)]
        args: Vec<TypeLoc>,
    },
    /// `pointee*`
    Pointer {
        /// The pointed-to type.
        pointee: Box<TypeLoc>,
    },
    /// `pointee&` or `pointee&&`
    Reference {
        /// The referenced type.
        pointee: Box<TypeLoc>,
    },
    /// Anything else.
    Other,
}

impl TypeLoc {
    /// Directly nested type locations.
    #[must_use]
    pub fn children(&self) -> &[TypeLoc] {
        match &self.kind {
            TypeLocKind::Template { args } => args,
            TypeLocKind::Pointer { pointee } | TypeLocKind::Reference { pointee } => {
                std::slice::from_ref(pointee.as_ref())
            }
            TypeLocKind::Record | TypeLocKind::Typedef | TypeLocKind::Builtin | TypeLocKind::Other => {
                &[]
            }
        }
    }
}

/// Error raised when an interchange document cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// The document could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The document is not a valid translation unit.
    #[error("invalid translation unit in {path}: {source}")]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

impl TranslationUnit {
    /// Loads a JSON interchange document produced by a front-end.
    pub fn from_json_file(path: &Path) -> Result<Self, FrontendError> {
        let content = std::fs::read_to_string(path).map_err(|source| FrontendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| FrontendError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
