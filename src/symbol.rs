//! Symbol vocabulary - stable string tokens for declaration metadata
//!
//! Every declaration in a record carries three tagged values:
//! - `SymbolKind`: what the entity is (function, class, macro, ...)
//! - `SymbolSubKind`: a refinement of the kind (copy constructor, Swift accessor, ...)
//! - `SymbolLanguage`: the source language it was declared in
//!
//! Each enumeration maps totally onto a token via an exhaustive `match`, so a
//! new enumerator without a token is a compile error rather than a silent default.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Unknown,
    Module,
    Namespace,
    NamespaceAlias,
    Macro,
    Enum,
    Struct,
    Class,
    Protocol,
    Extension,
    Union,
    TypeAlias,
    Function,
    Variable,
    Field,
    EnumConstant,
    InstanceMethod,
    ClassMethod,
    StaticMethod,
    InstanceProperty,
    ClassProperty,
    StaticProperty,
    Constructor,
    Destructor,
    ConversionFunction,
    Parameter,
    Using,
    CommentTag,
    TemplateTypeParm,
    TemplateTemplateParm,
    NonTypeTemplateParm,
}

impl SymbolKind {
    /// Get the stored token for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Unknown => "Unknown",
            SymbolKind::Module => "Module",
            SymbolKind::Namespace => "Namespace",
            SymbolKind::NamespaceAlias => "NamespaceAlias",
            SymbolKind::Macro => "Macro",
            SymbolKind::Enum => "Enum",
            SymbolKind::Struct => "Struct",
            SymbolKind::Class => "Class",
            SymbolKind::Protocol => "Protocol",
            SymbolKind::Extension => "Extension",
            SymbolKind::Union => "Union",
            SymbolKind::TypeAlias => "TypeAlias",
            SymbolKind::Function => "Function",
            SymbolKind::Variable => "Variable",
            SymbolKind::Field => "Field",
            SymbolKind::EnumConstant => "EnumConstant",
            SymbolKind::InstanceMethod => "InstanceMethod",
            SymbolKind::ClassMethod => "ClassMethod",
            SymbolKind::StaticMethod => "StaticMethod",
            SymbolKind::InstanceProperty => "InstanceProperty",
            SymbolKind::ClassProperty => "ClassProperty",
            SymbolKind::StaticProperty => "StaticProperty",
            SymbolKind::Constructor => "Constructor",
            SymbolKind::Destructor => "Destructor",
            SymbolKind::ConversionFunction => "ConversionFunction",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::Using => "Using",
            SymbolKind::CommentTag => "CommentTag",
            SymbolKind::TemplateTypeParm => "TemplateTypeParm",
            SymbolKind::TemplateTemplateParm => "TemplateTemplateParm",
            SymbolKind::NonTypeTemplateParm => "NonTypeTemplateParm",
        }
    }

    /// Get all symbol kinds
    pub fn all() -> &'static [SymbolKind] {
        &[
            SymbolKind::Unknown,
            SymbolKind::Module,
            SymbolKind::Namespace,
            SymbolKind::NamespaceAlias,
            SymbolKind::Macro,
            SymbolKind::Enum,
            SymbolKind::Struct,
            SymbolKind::Class,
            SymbolKind::Protocol,
            SymbolKind::Extension,
            SymbolKind::Union,
            SymbolKind::TypeAlias,
            SymbolKind::Function,
            SymbolKind::Variable,
            SymbolKind::Field,
            SymbolKind::EnumConstant,
            SymbolKind::InstanceMethod,
            SymbolKind::ClassMethod,
            SymbolKind::StaticMethod,
            SymbolKind::InstanceProperty,
            SymbolKind::ClassProperty,
            SymbolKind::StaticProperty,
            SymbolKind::Constructor,
            SymbolKind::Destructor,
            SymbolKind::ConversionFunction,
            SymbolKind::Parameter,
            SymbolKind::Using,
            SymbolKind::CommentTag,
            SymbolKind::TemplateTypeParm,
            SymbolKind::TemplateTemplateParm,
            SymbolKind::NonTypeTemplateParm,
        ]
    }
}

impl FromStr for SymbolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SymbolKind::all()
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidToken(format!("Unknown symbol kind: {}", s)))
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Refinement of a `SymbolKind`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolSubKind {
    #[default]
    None,
    CXXCopyConstructor,
    CXXMoveConstructor,
    AccessorGetter,
    AccessorSetter,
    UsingTypename,
    UsingValue,
    // Swift sub-kinds
    SwiftAccessorWillSet,
    SwiftAccessorDidSet,
    SwiftAccessorAddressor,
    SwiftAccessorMutableAddressor,
    SwiftAccessorRead,
    SwiftAccessorModify,
    SwiftExtensionOfStruct,
    SwiftExtensionOfClass,
    SwiftExtensionOfEnum,
    SwiftExtensionOfProtocol,
    SwiftPrefixOperator,
    SwiftPostfixOperator,
    SwiftInfixOperator,
    SwiftSubscript,
    SwiftAssociatedType,
    SwiftGenericTypeParam,
}

impl SymbolSubKind {
    /// Get the stored token for this sub-kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolSubKind::None => "None",
            SymbolSubKind::CXXCopyConstructor => "CXXCopyConstructor",
            SymbolSubKind::CXXMoveConstructor => "CXXMoveConstructor",
            SymbolSubKind::AccessorGetter => "AccessorGetter",
            SymbolSubKind::AccessorSetter => "AccessorSetter",
            SymbolSubKind::UsingTypename => "UsingTypename",
            SymbolSubKind::UsingValue => "UsingValue",
            SymbolSubKind::SwiftAccessorWillSet => "SwiftAccessorWillSet",
            SymbolSubKind::SwiftAccessorDidSet => "SwiftAccessorDidSet",
            SymbolSubKind::SwiftAccessorAddressor => "SwiftAccessorAddressor",
            SymbolSubKind::SwiftAccessorMutableAddressor => "SwiftAccessorMutableAddressor",
            SymbolSubKind::SwiftAccessorRead => "SwiftAccessorRead",
            SymbolSubKind::SwiftAccessorModify => "SwiftAccessorModify",
            SymbolSubKind::SwiftExtensionOfStruct => "SwiftExtensionOfStruct",
            SymbolSubKind::SwiftExtensionOfClass => "SwiftExtensionOfClass",
            SymbolSubKind::SwiftExtensionOfEnum => "SwiftExtensionOfEnum",
            SymbolSubKind::SwiftExtensionOfProtocol => "SwiftExtensionOfProtocol",
            SymbolSubKind::SwiftPrefixOperator => "SwiftPrefixOperator",
            SymbolSubKind::SwiftPostfixOperator => "SwiftPostfixOperator",
            SymbolSubKind::SwiftInfixOperator => "SwiftInfixOperator",
            SymbolSubKind::SwiftSubscript => "SwiftSubscript",
            SymbolSubKind::SwiftAssociatedType => "SwiftAssociatedType",
            SymbolSubKind::SwiftGenericTypeParam => "SwiftGenericTypeParam",
        }
    }

    /// Get all symbol sub-kinds
    pub fn all() -> &'static [SymbolSubKind] {
        &[
            SymbolSubKind::None,
            SymbolSubKind::CXXCopyConstructor,
            SymbolSubKind::CXXMoveConstructor,
            SymbolSubKind::AccessorGetter,
            SymbolSubKind::AccessorSetter,
            SymbolSubKind::UsingTypename,
            SymbolSubKind::UsingValue,
            SymbolSubKind::SwiftAccessorWillSet,
            SymbolSubKind::SwiftAccessorDidSet,
            SymbolSubKind::SwiftAccessorAddressor,
            SymbolSubKind::SwiftAccessorMutableAddressor,
            SymbolSubKind::SwiftAccessorRead,
            SymbolSubKind::SwiftAccessorModify,
            SymbolSubKind::SwiftExtensionOfStruct,
            SymbolSubKind::SwiftExtensionOfClass,
            SymbolSubKind::SwiftExtensionOfEnum,
            SymbolSubKind::SwiftExtensionOfProtocol,
            SymbolSubKind::SwiftPrefixOperator,
            SymbolSubKind::SwiftPostfixOperator,
            SymbolSubKind::SwiftInfixOperator,
            SymbolSubKind::SwiftSubscript,
            SymbolSubKind::SwiftAssociatedType,
            SymbolSubKind::SwiftGenericTypeParam,
        ]
    }
}

impl FromStr for SymbolSubKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SymbolSubKind::all()
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidToken(format!("Unknown symbol sub-kind: {}", s)))
    }
}

impl fmt::Display for SymbolSubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source language of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolLanguage {
    C,
    ObjC,
    Cxx,
    Swift,
}

impl SymbolLanguage {
    /// Get the stored token for this language
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolLanguage::C => "c",
            SymbolLanguage::ObjC => "objc",
            SymbolLanguage::Cxx => "cxx",
            SymbolLanguage::Swift => "swift",
        }
    }

    /// Get all languages
    pub fn all() -> &'static [SymbolLanguage] {
        &[
            SymbolLanguage::C,
            SymbolLanguage::ObjC,
            SymbolLanguage::Cxx,
            SymbolLanguage::Swift,
        ]
    }
}

impl FromStr for SymbolLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "c" => Ok(SymbolLanguage::C),
            "objc" | "objective-c" => Ok(SymbolLanguage::ObjC),
            "cxx" | "c++" | "cpp" => Ok(SymbolLanguage::Cxx),
            "swift" => Ok(SymbolLanguage::Swift),
            _ => Err(Error::InvalidToken(format!("Unknown symbol language: {}", s))),
        }
    }
}

impl fmt::Display for SymbolLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The tagged metadata attached to every declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    #[serde(default)]
    pub subkind: SymbolSubKind,
    pub language: SymbolLanguage,
}

impl SymbolInfo {
    pub fn new(kind: SymbolKind, subkind: SymbolSubKind, language: SymbolLanguage) -> Self {
        Self { kind, subkind, language }
    }

    /// Token for the `kind` column
    pub fn kind_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Token for the `subkind` column
    pub fn subkind_name(&self) -> &'static str {
        self.subkind.as_str()
    }

    /// Token for the `language` column
    pub fn language_name(&self) -> &'static str {
        self.language.as_str()
    }
}
