use std::mem;

use crate::{Chunk, Gc, Str, Table, Value};

/// The data of a heap allocated object. Every runtime entity that other
/// objects can point at lives in one of these variants; the collector marks,
/// traces, and frees them uniformly by matching on the sum.
#[derive(Debug)]
pub enum Obj {
    /// An interned string
    Str(ObjString),
    /// A function prototype produced by the compiler
    Fun(ObjFun),
    /// A function prototype paired with its captured upvalues
    Closure(ObjClosure),
    /// A structure for managing a closed-over value
    Upvalue(ObjUpvalue),
    /// A class and its method table
    Class(ObjClass),
    /// An instance of a class
    Instance(ObjInstance),
    /// A closure paired with the instance it was accessed through
    BoundMethod(ObjBoundMethod),
}

impl Obj {
    /// Rough number of bytes this object keeps alive, used by the collector's
    /// allocation accounting.
    pub fn size_estimate(&self) -> usize {
        mem::size_of::<Self>()
            + match self {
                Self::Str(s) => s.text.len(),
                Self::Fun(f) => {
                    f.chunk.len() + f.chunk.const_count() * mem::size_of::<Value>()
                }
                Self::Closure(c) => c.upvalues.len() * mem::size_of::<Gc<ObjUpvalue>>(),
                Self::Upvalue(_) => 0,
                Self::Class(c) => c.methods.byte_estimate(),
                Self::Instance(i) => i.fields.byte_estimate(),
                Self::BoundMethod(_) => 0,
            }
    }
}

/// An immutable interned string and its precomputed FNV-1a hash.
#[derive(Debug)]
pub struct ObjString {
    /// The character data
    pub text: Box<str>,
    /// FNV-1a hash of the character data
    pub hash: u32,
}

/// A function object that holds the bytecode of the function along with other
/// metadata. Immutable once the compiler finishes it.
#[derive(Debug)]
pub struct ObjFun {
    /// The name of the function, or `None` for the top-level script
    pub name: Option<Str>,
    /// Number of parameters the function has
    pub arity: u8,
    /// Number of variables captured from enclosing scopes
    pub upvalue_count: u16,
    /// The bytecode chunk of this function
    pub chunk: Chunk,
}

impl ObjFun {
    /// Create a named function prototype with an empty chunk.
    pub fn named(name: Option<Str>) -> Self {
        Self {
            name,
            arity: 0,
            upvalue_count: 0,
            chunk: Chunk::default(),
        }
    }
}

/// A structure for managing a closed-over value
#[derive(Debug)]
pub enum ObjUpvalue {
    /// This variant stores a stack slot which points to a value that was captured
    Open(usize),
    /// This variant stores the closed-over value itself
    Closed(Value),
}

/// A function that captures its surrounding environment
#[derive(Debug)]
pub struct ObjClosure {
    /// The base function of this closure
    pub fun: Gc<ObjFun>,
    /// Upvalues for indirect access to closed-over variables
    pub upvalues: Vec<Gc<ObjUpvalue>>,
}

/// A class and the methods defined on it
#[derive(Debug)]
pub struct ObjClass {
    /// The name of the class
    pub name: Str,
    /// Methods, keyed by name. Inheriting copies the superclass's entries in.
    pub methods: Table,
}

impl ObjClass {
    /// Create a class with no methods.
    pub fn new(name: Str) -> Self {
        Self {
            name,
            methods: Table::default(),
        }
    }
}

/// A class instance and its fields
#[derive(Debug)]
pub struct ObjInstance {
    /// The class this is an instance of
    pub class: Gc<ObjClass>,
    /// Fields set on this instance, keyed by name
    pub fields: Table,
}

impl ObjInstance {
    /// Create an instance with no fields.
    pub fn new(class: Gc<ObjClass>) -> Self {
        Self {
            class,
            fields: Table::default(),
        }
    }
}

/// A method bound to the instance it was accessed through
#[derive(Debug)]
pub struct ObjBoundMethod {
    /// The receiver that `this` resolves to inside the method
    pub receiver: Value,
    /// The underlying closure
    pub method: Gc<ObjClosure>,
}
