use crate::{compiler::SourceId, diagnostic::Span};

/// The kind of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // Single Character tokens
    LeftCurly,
    RightCurly,
    Less,
    Greater,
    Comma,
    Dot,
    LeftParen,
    RightParen,
    LeftSquare,
    RightSquare,
    Hyphen,
    Colon,
    SemiColon,
    At,
    Pipe,
    Exclamation,
    Caret,

    // Compound Tokens
    Assignment,
    Range,
    Ellipsis,
    Number,
    CString,
    BString,
    HString,

    /// Starts with a lower case letter
    Identifier,

    /// Starts with an upper case letter and contains a lower case letter
    TypeReference,

    /// Only upper case letters, digits and hyphens.  Could be a type reference,
    /// an object class reference or a literal in a defined syntax.
    Word,

    /// `&` followed by an upper case reference
    TypeField,

    /// `&` followed by a lower case identifier
    ValueField,

    // Keywords
    KwAll,
    KwApplication,
    KwAutomatic,
    KwBegin,
    KwBit,
    KwBmpString,
    KwBoolean,
    KwChoice,
    KwClass,
    KwComponents,
    KwDefault,
    KwDefinitions,
    KwEnd,
    KwEnumerated,
    KwExplicit,
    KwExports,
    KwExtensibility,
    KwFalse,
    KwFrom,
    KwGeneralizedTime,
    KwGeneralString,
    KwGraphicString,
    KwIA5String,
    KwIdentifier,
    KwImplicit,
    KwImplied,
    KwImports,
    KwInteger,
    KwISO646String,
    KwNull,
    KwNumericString,
    KwObject,
    KwObjectDescriptor,
    KwOctet,
    KwOf,
    KwOptional,
    KwPrintableString,
    KwPrivate,
    KwReal,
    KwRelativeOid,
    KwSequence,
    KwSet,
    KwSize,
    KwString,
    KwSyntax,
    KwT61String,
    KwTags,
    KwTeletexString,
    KwTrue,
    KwUnion,
    KwUnique,
    KwUniversal,
    KwUniversalString,
    KwUTCTime,
    KwUTF8String,
    KwVideotexString,
    KwVisibleString,
    KwWith,

    /// Any other reserved word that has no special meaning to the parser
    KwReserved,
}

/// Data relating to a single lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token<'a> {
    /// The type of this token
    pub(crate) kind: TokenKind,

    /// The string value of the token, will be a valid string for the token kind
    /// so it can be parsed further, e.g. into a number.
    pub(crate) value: &'a str,

    /// Byte offset into the file that the token starts at.  The end location
    /// can be derived from this offset + the length of the value string.
    pub(crate) offset: usize,

    /// The file ID of the file the token was lexed from
    pub(crate) id: SourceId,
}

/// Data relating to a single lexed token, owning the string value of the token,
/// rather than holding a reference to the source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenBuffer {
    /// The type of this token
    pub(crate) kind: TokenKind,

    /// The string value of the token, will be a valid string for the token kind
    /// so it can be parsed further, e.g. into a number.
    pub(crate) value: String,

    /// Byte offset into the file that the token starts at.  The end location
    /// can be derived from this offset + the length of the value string.
    pub(crate) offset: usize,

    /// The file ID of the file the token was lexed from
    pub(crate) id: SourceId,
}

impl Token<'_> {
    /// Convert a token to one that owns its value
    pub fn to_owned(&self) -> TokenBuffer {
        TokenBuffer {
            kind: self.kind,
            value: self.value.to_string(),
            offset: self.offset,
            id: self.id,
        }
    }

    /// Location of the token in its source file
    pub fn span(&self) -> Span {
        Span::new(self.id, self.offset, self.offset + self.value.len())
    }

    /// Could this token be used as a literal within a `WITH SYNTAX` grammar or
    /// a defined syntax object.  Any word made of upper case letters, digits
    /// and hyphens qualifies, including reserved words, as the reserved words
    /// that cannot be literals are rejected when the grammar is compiled.
    pub fn is_word(&self) -> bool {
        match self.kind {
            TokenKind::Word => true,
            kind if kind.is_keyword() => self
                .value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-'),
            _ => false,
        }
    }
}

impl TokenBuffer {
    /// Get a non-owning reference token to this owned token
    pub fn as_token(&self) -> Token<'_> {
        Token {
            kind: self.kind,
            value: &self.value,
            offset: self.offset,
            id: self.id,
        }
    }
}

impl TokenKind {
    /// Is this token kind a reserved word
    pub fn is_keyword(self) -> bool {
        self >= TokenKind::KwAll
    }

    /// Does this token start a type or value when found inside a defined
    /// syntax object rather than being read as a literal
    pub fn starts_setting(self) -> bool {
        matches!(
            self,
            TokenKind::KwBit
                | TokenKind::KwBmpString
                | TokenKind::KwBoolean
                | TokenKind::KwChoice
                | TokenKind::KwEnumerated
                | TokenKind::KwFalse
                | TokenKind::KwGeneralizedTime
                | TokenKind::KwGeneralString
                | TokenKind::KwGraphicString
                | TokenKind::KwIA5String
                | TokenKind::KwInteger
                | TokenKind::KwISO646String
                | TokenKind::KwNull
                | TokenKind::KwNumericString
                | TokenKind::KwObject
                | TokenKind::KwObjectDescriptor
                | TokenKind::KwOctet
                | TokenKind::KwPrintableString
                | TokenKind::KwReal
                | TokenKind::KwRelativeOid
                | TokenKind::KwSequence
                | TokenKind::KwSet
                | TokenKind::KwT61String
                | TokenKind::KwTeletexString
                | TokenKind::KwTrue
                | TokenKind::KwUniversalString
                | TokenKind::KwUTCTime
                | TokenKind::KwUTF8String
                | TokenKind::KwVideotexString
                | TokenKind::KwVisibleString
        )
    }
}

/// String/Enum mapping for keywords.  `TYPE-IDENTIFIER` and `ABSTRACT-SYNTAX`
/// are reserved, but are lexed as words so that they can be defined as
/// ordinary object classes.
pub const KEYWORD_DATA: &[(&str, TokenKind)] = &[
    ("ABSENT", TokenKind::KwReserved),
    ("ALL", TokenKind::KwAll),
    ("APPLICATION", TokenKind::KwApplication),
    ("AUTOMATIC", TokenKind::KwAutomatic),
    ("BEGIN", TokenKind::KwBegin),
    ("BIT", TokenKind::KwBit),
    ("BMPString", TokenKind::KwBmpString),
    ("BOOLEAN", TokenKind::KwBoolean),
    ("BY", TokenKind::KwReserved),
    ("CHARACTER", TokenKind::KwReserved),
    ("CHOICE", TokenKind::KwChoice),
    ("CLASS", TokenKind::KwClass),
    ("COMPONENT", TokenKind::KwReserved),
    ("COMPONENTS", TokenKind::KwComponents),
    ("CONSTRAINED", TokenKind::KwReserved),
    ("CONTAINING", TokenKind::KwReserved),
    ("DATE", TokenKind::KwReserved),
    ("DATE-TIME", TokenKind::KwReserved),
    ("DEFAULT", TokenKind::KwDefault),
    ("DEFINITIONS", TokenKind::KwDefinitions),
    ("DURATION", TokenKind::KwReserved),
    ("EMBEDDED", TokenKind::KwReserved),
    ("ENCODED", TokenKind::KwReserved),
    ("ENCODING-CONTROL", TokenKind::KwReserved),
    ("END", TokenKind::KwEnd),
    ("ENUMERATED", TokenKind::KwEnumerated),
    ("EXCEPT", TokenKind::KwReserved),
    ("EXPLICIT", TokenKind::KwExplicit),
    ("EXPORTS", TokenKind::KwExports),
    ("EXTENSIBILITY", TokenKind::KwExtensibility),
    ("EXTERNAL", TokenKind::KwReserved),
    ("FALSE", TokenKind::KwFalse),
    ("FROM", TokenKind::KwFrom),
    ("GeneralizedTime", TokenKind::KwGeneralizedTime),
    ("GeneralString", TokenKind::KwGeneralString),
    ("GraphicString", TokenKind::KwGraphicString),
    ("IA5String", TokenKind::KwIA5String),
    ("IDENTIFIER", TokenKind::KwIdentifier),
    ("IMPLICIT", TokenKind::KwImplicit),
    ("IMPLIED", TokenKind::KwImplied),
    ("IMPORTS", TokenKind::KwImports),
    ("INCLUDES", TokenKind::KwReserved),
    ("INSTANCE", TokenKind::KwReserved),
    ("INSTRUCTIONS", TokenKind::KwReserved),
    ("INTEGER", TokenKind::KwInteger),
    ("INTERSECTION", TokenKind::KwReserved),
    ("ISO646String", TokenKind::KwISO646String),
    ("MAX", TokenKind::KwReserved),
    ("MIN", TokenKind::KwReserved),
    ("MINUS-INFINITY", TokenKind::KwReserved),
    ("NOT-A-NUMBER", TokenKind::KwReserved),
    ("NULL", TokenKind::KwNull),
    ("NumericString", TokenKind::KwNumericString),
    ("OBJECT", TokenKind::KwObject),
    ("ObjectDescriptor", TokenKind::KwObjectDescriptor),
    ("OCTET", TokenKind::KwOctet),
    ("OF", TokenKind::KwOf),
    ("OID-IRI", TokenKind::KwReserved),
    ("OPTIONAL", TokenKind::KwOptional),
    ("PATTERN", TokenKind::KwReserved),
    ("PDV", TokenKind::KwReserved),
    ("PLUS-INFINITY", TokenKind::KwReserved),
    ("PRESENT", TokenKind::KwReserved),
    ("PrintableString", TokenKind::KwPrintableString),
    ("PRIVATE", TokenKind::KwPrivate),
    ("REAL", TokenKind::KwReal),
    ("RELATIVE-OID", TokenKind::KwRelativeOid),
    ("RELATIVE-OID-IRI", TokenKind::KwReserved),
    ("SEQUENCE", TokenKind::KwSequence),
    ("SET", TokenKind::KwSet),
    ("SETTINGS", TokenKind::KwReserved),
    ("SIZE", TokenKind::KwSize),
    ("STRING", TokenKind::KwString),
    ("SYNTAX", TokenKind::KwSyntax),
    ("T61String", TokenKind::KwT61String),
    ("TAGS", TokenKind::KwTags),
    ("TeletexString", TokenKind::KwTeletexString),
    ("TIME", TokenKind::KwReserved),
    ("TIME-OF-DAY", TokenKind::KwReserved),
    ("TRUE", TokenKind::KwTrue),
    ("UNION", TokenKind::KwUnion),
    ("UNIQUE", TokenKind::KwUnique),
    ("UNIVERSAL", TokenKind::KwUniversal),
    ("UniversalString", TokenKind::KwUniversalString),
    ("UTCTime", TokenKind::KwUTCTime),
    ("UTF8String", TokenKind::KwUTF8String),
    ("VideotexString", TokenKind::KwVideotexString),
    ("VisibleString", TokenKind::KwVisibleString),
    ("WITH", TokenKind::KwWith),
];

/// Words that may never be used as a literal inside a `WITH SYNTAX` grammar
/// (X.681 10.6), as they would be confused with the start of a type or value.
pub const LITERAL_RESERVED_WORDS: &[&str] = &[
    "BIT",
    "BOOLEAN",
    "CHARACTER",
    "CHOICE",
    "DATE",
    "DATE-TIME",
    "DURATION",
    "EMBEDDED",
    "END",
    "ENUMERATED",
    "EXTERNAL",
    "FALSE",
    "INSTANCE",
    "INTEGER",
    "INTERSECTION",
    "MINUS-INFINITY",
    "NULL",
    "OBJECT",
    "OCTET",
    "PLUS-INFINITY",
    "REAL",
    "RELATIVE-OID",
    "SEQUENCE",
    "SET",
    "TIME",
    "TIME-OF-DAY",
    "TRUE",
    "UNION",
];

/// Is the given word forbidden as a `WITH SYNTAX` literal
pub fn is_literal_reserved(word: &str) -> bool {
    LITERAL_RESERVED_WORDS.contains(&word)
}
