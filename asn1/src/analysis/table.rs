use std::{collections::BTreeMap, rc::Rc};

use super::{
    class::CompiledObjectClass,
    object::CompiledObject,
    object_set::CompiledObjectSet,
    ty::CompiledType,
    value::{CompiledValueSet, TypedValue},
};

/// Anything an assignment or a dummy parameter can name
#[derive(Debug, Clone)]
pub enum Symbol {
    Type(Rc<CompiledType>),
    Value(Rc<TypedValue>),
    ValueSet(Rc<CompiledValueSet>),
    Class(Rc<CompiledObjectClass>),
    Object(Rc<CompiledObject>),
    ObjectSet(Rc<CompiledObjectSet>),
}

/// Compiled assignments of a single module, by name
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl Symbol {
    /// Kind of the symbol, used in errors
    pub fn describe(&self) -> &'static str {
        match self {
            Symbol::Type(_) => "a type",
            Symbol::Value(_) => "a value",
            Symbol::ValueSet(_) => "a value set",
            Symbol::Class(_) => "an object class",
            Symbol::Object(_) => "an object",
            Symbol::ObjectSet(_) => "an object set",
        }
    }
}

impl SymbolTable {
    pub(super) fn insert(&mut self, name: String, symbol: Symbol) {
        self.symbols.insert(name, symbol);
    }

    /// Look up any kind of symbol
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// All symbols, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> + '_ {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn class(&self, name: &str) -> Option<&Rc<CompiledObjectClass>> {
        match self.get(name)? {
            Symbol::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn object(&self, name: &str) -> Option<&Rc<CompiledObject>> {
        match self.get(name)? {
            Symbol::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn object_set(&self, name: &str) -> Option<&Rc<CompiledObjectSet>> {
        match self.get(name)? {
            Symbol::ObjectSet(set) => Some(set),
            _ => None,
        }
    }

    pub fn ty(&self, name: &str) -> Option<&Rc<CompiledType>> {
        match self.get(name)? {
            Symbol::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn value(&self, name: &str) -> Option<&Rc<TypedValue>> {
        match self.get(name)? {
            Symbol::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_set(&self, name: &str) -> Option<&Rc<CompiledValueSet>> {
        match self.get(name)? {
            Symbol::ValueSet(set) => Some(set),
            _ => None,
        }
    }

    /// All object classes, sorted by name
    pub fn classes(&self) -> impl Iterator<Item = (&str, &Rc<CompiledObjectClass>)> + '_ {
        self.iter().filter_map(|(name, symbol)| match symbol {
            Symbol::Class(class) => Some((name, class)),
            _ => None,
        })
    }

    /// All objects, sorted by name
    pub fn objects(&self) -> impl Iterator<Item = (&str, &Rc<CompiledObject>)> + '_ {
        self.iter().filter_map(|(name, symbol)| match symbol {
            Symbol::Object(object) => Some((name, object)),
            _ => None,
        })
    }

    /// All object sets, sorted by name
    pub fn object_sets(&self) -> impl Iterator<Item = (&str, &Rc<CompiledObjectSet>)> + '_ {
        self.iter().filter_map(|(name, symbol)| match symbol {
            Symbol::ObjectSet(set) => Some((name, set)),
            _ => None,
        })
    }
}
