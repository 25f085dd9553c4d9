//! Stable node-type enumeration.
//!
//! Node-type ids are part of the public contract consumed by checks and
//! configuration files. New grammar constructs are appended with the next
//! free id; existing ids are never renumbered or reused.

use serde::{Serialize, Serializer};
use std::fmt;

macro_rules! node_types {
    ($( $(#[$meta:meta])* $variant:ident = $id:literal => $name:literal, )*) => {
        /// Type of an AST node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum NodeType {
            $( $(#[$meta])* $variant = $id, )*
        }

        impl NodeType {
            /// Every node type, in id order.
            pub const ALL: &'static [NodeType] = &[$(NodeType::$variant,)*];

            /// Stable numeric id.
            #[must_use]
            pub const fn id(self) -> u16 {
                self as u16
            }

            /// Stable upper-case name used in configuration (e.g. `LITERAL_IF`).
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(NodeType::$variant => $name,)*
                }
            }

            /// Looks up a node type by numeric id.
            #[must_use]
            pub fn from_id(id: u16) -> Option<Self> {
                match id {
                    $($id => Some(NodeType::$variant),)*
                    _ => None,
                }
            }

            /// Looks up a node type by its configuration name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(NodeType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

node_types! {
    /// Root of every file.
    CompilationUnit = 1 => "COMPILATION_UNIT",
    /// `package a.b;`
    PackageDef = 2 => "PACKAGE_DEF",
    /// `import a.b.C;`
    Import = 3 => "IMPORT",
    /// `import static a.b.C.d;`
    StaticImport = 4 => "STATIC_IMPORT",
    /// Class declaration.
    ClassDef = 5 => "CLASS_DEF",
    /// Interface declaration.
    InterfaceDef = 6 => "INTERFACE_DEF",
    /// Enum declaration.
    EnumDef = 7 => "ENUM_DEF",
    /// Enum constant inside an enum body.
    EnumConstantDef = 8 => "ENUM_CONSTANT_DEF",
    /// Type body in braces.
    Objblock = 9 => "OBJBLOCK",
    /// Modifier list, possibly empty.
    Modifiers = 10 => "MODIFIERS",
    /// `@Name`, `@Name(value)` or `@Name(k = v)`.
    Annotation = 11 => "ANNOTATION",
    /// `k = v` inside an annotation.
    AnnotationMemberValuePair = 12 => "ANNOTATION_MEMBER_VALUE_PAIR",
    /// `<T, U extends V>` on a declaration.
    TypeParameters = 13 => "TYPE_PARAMETERS",
    /// One type parameter.
    TypeParameter = 14 => "TYPE_PARAMETER",
    /// `<A, B>` on a type use.
    TypeArguments = 15 => "TYPE_ARGUMENTS",
    /// `extends` bound of a type parameter.
    TypeUpperBounds = 16 => "TYPE_UPPER_BOUNDS",
    /// `?` type argument.
    WildcardType = 17 => "WILDCARD_TYPE",
    /// `extends` clause of a type declaration.
    ExtendsClause = 18 => "EXTENDS_CLAUSE",
    /// `implements` clause of a type declaration.
    ImplementsClause = 19 => "IMPLEMENTS_CLAUSE",
    /// Field, local variable, or for-each variable.
    VariableDef = 20 => "VARIABLE_DEF",
    /// Method declaration.
    MethodDef = 21 => "METHOD_DEF",
    /// Constructor declaration.
    CtorDef = 22 => "CTOR_DEF",
    /// Formal parameter list.
    Parameters = 23 => "PARAMETERS",
    /// One formal parameter.
    ParameterDef = 24 => "PARAMETER_DEF",
    /// Type use.
    Type = 25 => "TYPE",
    /// `[]` dimension, optionally with a size expression.
    ArrayDeclarator = 26 => "ARRAY_DECLARATOR",
    /// `throws` clause.
    LiteralThrows = 27 => "LITERAL_THROWS",
    /// `static { ... }`
    StaticInit = 28 => "STATIC_INIT",
    /// `{ ... }` instance initializer.
    InstanceInit = 29 => "INSTANCE_INIT",
    /// Statement list in braces.
    Slist = 30 => "SLIST",
    /// `if` statement.
    LiteralIf = 31 => "LITERAL_IF",
    /// `else` branch.
    LiteralElse = 32 => "LITERAL_ELSE",
    /// `while` loop.
    LiteralWhile = 33 => "LITERAL_WHILE",
    /// `do ... while` loop.
    LiteralDo = 34 => "LITERAL_DO",
    /// `for` loop, classic or enhanced.
    LiteralFor = 35 => "LITERAL_FOR",
    /// Initializer part of a classic `for`.
    ForInit = 36 => "FOR_INIT",
    /// Condition part of a classic `for`.
    ForCondition = 37 => "FOR_CONDITION",
    /// Update part of a classic `for`.
    ForIterator = 38 => "FOR_ITERATOR",
    /// `Type x : expr` of an enhanced `for`.
    ForEachClause = 39 => "FOR_EACH_CLAUSE",
    /// `switch` statement.
    LiteralSwitch = 40 => "LITERAL_SWITCH",
    /// Labels and statements of one switch group.
    CaseGroup = 41 => "CASE_GROUP",
    /// `case` label.
    LiteralCase = 42 => "LITERAL_CASE",
    /// `default` label or modifier.
    LiteralDefault = 43 => "LITERAL_DEFAULT",
    /// `try` statement.
    LiteralTry = 44 => "LITERAL_TRY",
    /// `catch` clause.
    LiteralCatch = 45 => "LITERAL_CATCH",
    /// `finally` clause.
    LiteralFinally = 46 => "LITERAL_FINALLY",
    /// `return` statement.
    LiteralReturn = 47 => "LITERAL_RETURN",
    /// `break` statement.
    LiteralBreak = 48 => "LITERAL_BREAK",
    /// `continue` statement.
    LiteralContinue = 49 => "LITERAL_CONTINUE",
    /// `throw` statement.
    LiteralThrow = 50 => "LITERAL_THROW",
    /// `label: statement`
    LabeledStat = 51 => "LABELED_STAT",
    /// Lone `;`.
    EmptyStat = 52 => "EMPTY_STAT",
    /// Expression wrapper in statement and argument position.
    Expr = 53 => "EXPR",
    /// `=`
    Assign = 54 => "ASSIGN",
    /// `+=`
    PlusAssign = 55 => "PLUS_ASSIGN",
    /// `-=`
    MinusAssign = 56 => "MINUS_ASSIGN",
    /// `*=`
    StarAssign = 57 => "STAR_ASSIGN",
    /// `/=`
    DivAssign = 58 => "DIV_ASSIGN",
    /// `%=`
    ModAssign = 59 => "MOD_ASSIGN",
    /// `<<=`
    SlAssign = 60 => "SL_ASSIGN",
    /// `>>=`
    SrAssign = 61 => "SR_ASSIGN",
    /// `>>>=`
    BsrAssign = 62 => "BSR_ASSIGN",
    /// `&=`
    BandAssign = 63 => "BAND_ASSIGN",
    /// `|=`
    BorAssign = 64 => "BOR_ASSIGN",
    /// `^=`
    BxorAssign = 65 => "BXOR_ASSIGN",
    /// `c ? a : b`
    Question = 66 => "QUESTION",
    /// `||`
    Lor = 67 => "LOR",
    /// `&&`
    Land = 68 => "LAND",
    /// `|`
    Bor = 69 => "BOR",
    /// `^`
    Bxor = 70 => "BXOR",
    /// `&`
    Band = 71 => "BAND",
    /// `==`
    Equal = 72 => "EQUAL",
    /// `!=`
    NotEqual = 73 => "NOT_EQUAL",
    /// `<`
    Lt = 74 => "LT",
    /// `>`
    Gt = 75 => "GT",
    /// `<=`
    Le = 76 => "LE",
    /// `>=`
    Ge = 77 => "GE",
    /// `instanceof`
    LiteralInstanceof = 78 => "LITERAL_INSTANCEOF",
    /// `<<`
    Sl = 79 => "SL",
    /// `>>`
    Sr = 80 => "SR",
    /// `>>>`
    Bsr = 81 => "BSR",
    /// Binary `+`
    Plus = 82 => "PLUS",
    /// Binary `-`
    Minus = 83 => "MINUS",
    /// `*`
    Star = 84 => "STAR",
    /// `/`
    Div = 85 => "DIV",
    /// `%`
    Mod = 86 => "MOD",
    /// Prefix `+`
    UnaryPlus = 87 => "UNARY_PLUS",
    /// Prefix `-`
    UnaryMinus = 88 => "UNARY_MINUS",
    /// Prefix `++`
    Inc = 89 => "INC",
    /// Prefix `--`
    Dec = 90 => "DEC",
    /// `!`
    Lnot = 91 => "LNOT",
    /// `~`
    Bnot = 92 => "BNOT",
    /// Postfix `++`
    PostInc = 93 => "POST_INC",
    /// Postfix `--`
    PostDec = 94 => "POST_DEC",
    /// `(Type) expr`
    Typecast = 95 => "TYPECAST",
    /// Parenthesized sub-expression.
    ParenExpr = 96 => "PAREN_EXPR",
    /// Method or constructor invocation.
    MethodCall = 97 => "METHOD_CALL",
    /// Argument list.
    Elist = 98 => "ELIST",
    /// Qualified name or member access.
    Dot = 99 => "DOT",
    /// `a[i]`
    IndexOp = 100 => "INDEX_OP",
    /// `new` expression.
    LiteralNew = 101 => "LITERAL_NEW",
    /// `{a, b}` array initializer.
    ArrayInit = 102 => "ARRAY_INIT",
    /// Lambda expression.
    Lambda = 103 => "LAMBDA",
    /// Identifier.
    Ident = 104 => "IDENT",
    /// Integer literal.
    NumInt = 105 => "NUM_INT",
    /// Long literal.
    NumLong = 106 => "NUM_LONG",
    /// Float literal.
    NumFloat = 107 => "NUM_FLOAT",
    /// Double literal.
    NumDouble = 108 => "NUM_DOUBLE",
    /// Character literal.
    CharLiteral = 109 => "CHAR_LITERAL",
    /// String literal.
    StringLiteral = 110 => "STRING_LITERAL",
    /// `true`
    LiteralTrue = 111 => "LITERAL_TRUE",
    /// `false`
    LiteralFalse = 112 => "LITERAL_FALSE",
    /// `null`
    LiteralNull = 113 => "LITERAL_NULL",
    /// `this`
    LiteralThis = 114 => "LITERAL_THIS",
    /// `super`
    LiteralSuper = 115 => "LITERAL_SUPER",
    /// `void`
    LiteralVoid = 116 => "LITERAL_VOID",
    /// `boolean`
    LiteralBoolean = 117 => "LITERAL_BOOLEAN",
    /// `byte`
    LiteralByte = 118 => "LITERAL_BYTE",
    /// `char`
    LiteralChar = 119 => "LITERAL_CHAR",
    /// `short`
    LiteralShort = 120 => "LITERAL_SHORT",
    /// `int`
    LiteralInt = 121 => "LITERAL_INT",
    /// `long`
    LiteralLong = 122 => "LITERAL_LONG",
    /// `float`
    LiteralFloat = 123 => "LITERAL_FLOAT",
    /// `double`
    LiteralDouble = 124 => "LITERAL_DOUBLE",
    /// `public`
    LiteralPublic = 125 => "LITERAL_PUBLIC",
    /// `private`
    LiteralPrivate = 126 => "LITERAL_PRIVATE",
    /// `protected`
    LiteralProtected = 127 => "LITERAL_PROTECTED",
    /// `static`
    LiteralStatic = 128 => "LITERAL_STATIC",
    /// `final`
    Final = 129 => "FINAL",
    /// `abstract`
    Abstract = 130 => "ABSTRACT",
    /// `synchronized` modifier.
    LiteralSynchronized = 131 => "LITERAL_SYNCHRONIZED",
    /// `native`
    LiteralNative = 132 => "LITERAL_NATIVE",
    /// `transient`
    LiteralTransient = 133 => "LITERAL_TRANSIENT",
    /// `volatile`
    LiteralVolatile = 134 => "LITERAL_VOLATILE",
    /// `strictfp`
    Strictfp = 135 => "STRICTFP",
    /// `*` of an on-demand import.
    StarImport = 136 => "STAR_IMPORT",
    /// `...` of a variable-arity parameter.
    Ellipsis = 137 => "ELLIPSIS",
    /// `.class` suffix.
    LiteralClass = 138 => "LITERAL_CLASS",
    /// `assert` statement.
    LiteralAssert = 139 => "LITERAL_ASSERT",
    /// `super` bound of a wildcard.
    TypeLowerBounds = 140 => "TYPE_LOWER_BOUNDS",
}

impl NodeType {
    /// Returns true for assignment operators, compound forms included.
    #[must_use]
    pub fn is_assignment(self) -> bool {
        (Self::Assign.id()..=Self::BxorAssign.id()).contains(&self.id())
    }

    /// Returns true for binary operators (two operand children).
    #[must_use]
    pub fn is_binary_operator(self) -> bool {
        (Self::Lor.id()..=Self::Mod.id()).contains(&self.id())
    }

    /// Returns true for prefix and postfix unary operators.
    #[must_use]
    pub fn is_unary_operator(self) -> bool {
        (Self::UnaryPlus.id()..=Self::PostDec.id()).contains(&self.id())
    }

    /// Returns true for literal leaves.
    #[must_use]
    pub fn is_literal(self) -> bool {
        (Self::NumInt.id()..=Self::LiteralNull.id()).contains(&self.id())
    }

    /// Returns true for numeric literal leaves.
    #[must_use]
    pub fn is_numeric_literal(self) -> bool {
        (Self::NumInt.id()..=Self::NumDouble.id()).contains(&self.id())
    }

    /// Returns true for type declarations.
    #[must_use]
    pub fn is_type_definition(self) -> bool {
        matches!(self, Self::ClassDef | Self::InterfaceDef | Self::EnumDef)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
