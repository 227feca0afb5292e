//! Parser DSL - grammar definition in Rust
//!
//! Grammars are written as trees of [`Parslet`] values and built into a
//! [`Grammar`] arena by a [`GrammarBuilder`]. A parslet is only turned into
//! rules when it is handed to the builder, so whole expressions can be
//! composed before the builder is touched.
//!
//! # Example
//!
//! ```rust
//! use parr::engine::parser_dsl::*;
//! use parr::{choice, seq};
//!
//! let mut builder = GrammarBuilder::new();
//! let digit = builder.rule("digit", class(CharClass::Digit));
//! let number = builder.rule("number", digit.plus());
//! let list = builder.rule("list", seq![number, seq![",", number].star()]);
//! let grammar = builder.build(list).unwrap();
//! assert_eq!(grammar.find("number"), Some(number));
//! ```
//!
//! Recursive rules are declared first and defined later:
//!
//! ```rust
//! use parr::engine::parser_dsl::*;
//! use parr::{choice, seq};
//!
//! let mut builder = GrammarBuilder::new();
//! let nested = builder.declare("nested");
//! builder.define(nested, choice![seq!["(", nested, ")"], "x"]);
//! let grammar = builder.build(nested).unwrap();
//! assert_eq!(grammar.name(nested), Some("nested"));
//! ```

pub use super::char_class::CharClass;
use super::error::GrammarError;
use super::grammar::{Grammar, Rule, RuleId};
use ahash::AHashMap;

/// Anything that can be built into a grammar rule
pub trait Parslet {
    /// Add this parslet's rules to the builder and return the top rule
    fn build(self, builder: &mut GrammarBuilder) -> RuleId;
}

/// Grammar builder
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<Rule>,
    names: AHashMap<String, RuleId>,
    pending: Vec<RuleId>,
    errors: Vec<GrammarError>,
}

impl GrammarBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw rule to the arena
    pub fn add(&mut self, rule: Rule) -> RuleId {
        let id = RuleId(self.rules.len() as u32);
        self.rules.push(rule);
        id
    }

    /// Define a named rule
    ///
    /// A name that was previously [`declare`](Self::declare)d is defined in
    /// place; a name that is already defined is recorded as a duplicate.
    pub fn rule(&mut self, name: &str, parslet: impl Parslet) -> RuleId {
        match self.names.get(name).copied() {
            Some(id) if self.pending.contains(&id) => {
                self.define(id, parslet);
                id
            }
            Some(_) => {
                self.errors
                    .push(GrammarError::DuplicateRule(name.to_string()));
                parslet.build(self)
            }
            None => {
                let body = parslet.build(self);
                let id = self.add(Rule::Named {
                    name: name.to_string(),
                    rule: body,
                });
                self.names.insert(name.to_string(), id);
                id
            }
        }
    }

    /// Reserve a named rule so it can be referenced before it is defined
    pub fn declare(&mut self, name: &str) -> RuleId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = RuleId(self.rules.len() as u32);
        self.rules.push(Rule::Named {
            name: name.to_string(),
            rule: id,
        });
        self.names.insert(name.to_string(), id);
        self.pending.push(id);
        id
    }

    /// Give a declared rule its body
    pub fn define(&mut self, id: RuleId, parslet: impl Parslet) {
        let body = parslet.build(self);
        let Some(position) = self.pending.iter().position(|&p| p == id) else {
            let name = match self.rules.get(id.index()) {
                Some(Rule::Named { name, .. }) => name.clone(),
                _ => id.to_string(),
            };
            self.errors.push(GrammarError::DuplicateRule(name));
            return;
        };
        self.pending.swap_remove(position);
        if let Some(Rule::Named { rule, .. }) = self.rules.get_mut(id.index()) {
            *rule = body;
        }
    }

    /// Number of rules added so far
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if nothing has been added yet
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Finish the grammar with `root` as the top-level rule
    pub fn build(mut self, root: impl Parslet) -> Result<Grammar, GrammarError> {
        let root = root.build(&mut self);
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        if let Some(&id) = self.pending.iter().min() {
            let name = match &self.rules[id.index()] {
                Rule::Named { name, .. } => name.clone(),
                _ => id.to_string(),
            };
            return Err(GrammarError::UndefinedRule(name));
        }
        Ok(Grammar::from_parts(self.rules, root))
    }
}

// ============================================================================
// Primitive parslets
// ============================================================================

impl Parslet for RuleId {
    fn build(self, _builder: &mut GrammarBuilder) -> RuleId {
        self
    }
}

impl Parslet for &str {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        builder.add(Rule::Literal {
            bytes: self.as_bytes().to_vec(),
        })
    }
}

/// Match a literal byte string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lit(pub Vec<u8>);

impl Parslet for Lit {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        builder.add(Rule::Literal { bytes: self.0 })
    }
}

/// Match one byte from a set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOf(pub Vec<u8>);

impl Parslet for OneOf {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        builder.add(Rule::OneOf { set: self.0 })
    }
}

/// Match one byte of a character class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Class(pub CharClass);

impl Parslet for Class {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        builder.add(Rule::Class { class: self.0 })
    }
}

/// Match a single rule that takes no children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf(Rule);

impl Parslet for Leaf {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        builder.add(self.0)
    }
}

// ============================================================================
// Combinators
// ============================================================================

/// Greedy repetition with a lower bound
#[derive(Debug, Clone, Copy)]
pub struct Repeat<P> {
    inner: P,
    min: usize,
}

impl<P: Parslet> Parslet for Repeat<P> {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        let rule = self.inner.build(builder);
        builder.add(Rule::Repeat {
            rule,
            min: self.min,
        })
    }
}

/// Zero or one match
#[derive(Debug, Clone, Copy)]
pub struct Optional<P>(P);

impl<P: Parslet> Parslet for Optional<P> {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        let rule = self.0.build(builder);
        builder.add(Rule::Optional { rule })
    }
}

/// Lookahead; consumes nothing
#[derive(Debug, Clone, Copy)]
pub struct Lookahead<P> {
    inner: P,
    positive: bool,
}

impl<P: Parslet> Parslet for Lookahead<P> {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        let rule = self.inner.build(builder);
        if self.positive {
            builder.add(Rule::And { rule })
        } else {
            builder.add(Rule::Not { rule })
        }
    }
}

/// Repeat a body until a terminator would match
#[derive(Debug, Clone, Copy)]
pub struct Until<T, B> {
    terminator: T,
    body: B,
}

impl<T: Parslet, B: Parslet> Parslet for Until<T, B> {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        let terminator = self.terminator.build(builder);
        let body = self.body.build(builder);
        builder.add(Rule::Until { terminator, body })
    }
}

/// A type-erased parslet (for heterogeneous sequences/choices)
pub struct Dynamic(Box<dyn DynParslet>);

/// Trait for type-erased parslets
pub trait DynParslet {
    /// Build this parslet into a grammar
    fn build_boxed(self: Box<Self>, builder: &mut GrammarBuilder) -> RuleId;
}

impl<P: Parslet + 'static> DynParslet for P {
    fn build_boxed(self: Box<Self>, builder: &mut GrammarBuilder) -> RuleId {
        (*self).build(builder)
    }
}

impl Parslet for Dynamic {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        self.0.build_boxed(builder)
    }
}

/// Convert any parslet to a dynamic one
pub fn dynamic<P: Parslet + 'static>(p: P) -> Dynamic {
    Dynamic(Box::new(p))
}

/// All parslets in order
pub struct Sequence(pub Vec<Dynamic>);

impl Parslet for Sequence {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        let rules = self.0.into_iter().map(|p| p.build(builder)).collect();
        builder.add(Rule::Sequence { rules })
    }
}

/// The first parslet that matches
pub struct Choice(pub Vec<Dynamic>);

impl Parslet for Choice {
    fn build(self, builder: &mut GrammarBuilder) -> RuleId {
        let rules = self.0.into_iter().map(|p| p.build(builder)).collect();
        builder.add(Rule::Choice { rules })
    }
}

// ============================================================================
// Extension trait for Parslet
// ============================================================================

/// Extension trait for Parslet with builder methods
pub trait ParsletExt: Parslet + Sized {
    /// Match zero or more times
    fn star(self) -> Repeat<Self> {
        Repeat {
            inner: self,
            min: 0,
        }
    }

    /// Match one or more times
    fn plus(self) -> Repeat<Self> {
        Repeat {
            inner: self,
            min: 1,
        }
    }

    /// Match at least `min` times
    fn at_least(self, min: usize) -> Repeat<Self> {
        Repeat { inner: self, min }
    }

    /// Match zero or one time
    fn opt(self) -> Optional<Self> {
        Optional(self)
    }

    /// Positive lookahead (must match, doesn't consume)
    fn at(self) -> Lookahead<Self> {
        Lookahead {
            inner: self,
            positive: true,
        }
    }

    /// Negative lookahead (must NOT match, doesn't consume)
    fn not_at(self) -> Lookahead<Self> {
        Lookahead {
            inner: self,
            positive: false,
        }
    }
}

impl<T: Parslet + Sized> ParsletExt for T {}

// ============================================================================
// Helper functions
// ============================================================================

/// Match a literal string
pub fn lit(s: &str) -> Lit {
    Lit(s.as_bytes().to_vec())
}

/// Match literal bytes
pub fn bytes(b: &[u8]) -> Lit {
    Lit(b.to_vec())
}

/// Match one byte from `set`
pub fn one_of(set: &str) -> OneOf {
    OneOf(set.as_bytes().to_vec())
}

/// Match one byte of a character class
pub fn class(class: CharClass) -> Class {
    Class(class)
}

/// Match any single character
pub fn any() -> Leaf {
    Leaf(Rule::Any)
}

/// Zero-width: start of input
pub fn bof() -> Leaf {
    Leaf(Rule::StartOfFile)
}

/// Zero-width: end of input
pub fn eof() -> Leaf {
    Leaf(Rule::EndOfFile)
}

/// Zero-width: first byte of a line
pub fn line_start() -> Leaf {
    Leaf(Rule::StartOfLine)
}

/// Zero-width: before a line terminator or at end of input
pub fn line_end() -> Leaf {
    Leaf(Rule::EndOfLine)
}

/// Repeat `body` while `terminator` does not match; the terminator is left
/// unconsumed
pub fn until<T: Parslet, B: Parslet>(terminator: T, body: B) -> Until<T, B> {
    Until { terminator, body }
}

/// Create a sequence from parslets of one type
pub fn seq<I, P>(items: I) -> Sequence
where
    I: IntoIterator<Item = P>,
    P: Parslet + 'static,
{
    Sequence(items.into_iter().map(dynamic).collect())
}

/// Create a choice from parslets of one type
pub fn choice<I, P>(items: I) -> Choice
where
    I: IntoIterator<Item = P>,
    P: Parslet + 'static,
{
    Choice(items.into_iter().map(dynamic).collect())
}

// ============================================================================
// Macros for heterogeneous sequences and choices
// ============================================================================

/// Create a sequence of parslets of any types
///
/// ```
/// use parr::engine::parser_dsl::*;
/// use parr::seq;
///
/// let mut builder = GrammarBuilder::new();
/// let root = builder.rule("kv", seq![class(CharClass::Alpha).plus(), "=", any()]);
/// assert!(builder.build(root).is_ok());
/// ```
#[macro_export]
macro_rules! seq {
    ($($p:expr),+ $(,)?) => {
        $crate::engine::parser_dsl::Sequence(vec![$($crate::engine::parser_dsl::dynamic($p)),+])
    };
}

/// Create an ordered choice of parslets of any types
#[macro_export]
macro_rules! choice {
    ($($p:expr),+ $(,)?) => {
        $crate::engine::parser_dsl::Choice(vec![$($crate::engine::parser_dsl::dynamic($p)),+])
    };
}
