use std::fmt;
use std::marker::PhantomData;

use crate::{
    table, Obj, ObjBoundMethod, ObjClass, ObjClosure, ObjFun, ObjInstance, ObjString, ObjUpvalue,
    Table, Value, ValueDisplay,
};

/// The collection threshold starts here and doubles over the live size after
/// every cycle.
const GC_INITIAL_THRESHOLD: usize = 1024 * 1024;
const GC_GROWTH_FACTOR: usize = 2;

/// A handle to a garbage collected object.
///
/// The handle is a typed index into the [`Heap`]'s slot array; it stays valid
/// for as long as the object is reachable. Two handles are equal exactly when
/// they point at the same object.
pub struct Gc<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Gc<T> {
    pub(crate) fn from_index(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }
}

impl<T> Copy for Gc<T> {}

impl<T> Clone for Gc<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Gc<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Gc<T> {}

impl<T> fmt::Debug for Gc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gc({})", self.index)
    }
}

/// A handle to an interned string, carrying the string's hash so table probes
/// never have to touch the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Str {
    /// The underlying string object
    pub raw: Gc<ObjString>,
    /// FNV-1a hash of the string's content
    pub hash: u32,
}

struct Slot {
    obj: Obj,
    marked: bool,
    size: usize,
}

/// The garbage collected heap.
///
/// All runtime objects live in a slot array; freed slots go on a free list
/// for reuse. The heap owns the interned-string table and the allocation
/// accounting that decides when the virtual machine should collect. The
/// collection cycle itself is split into the phases the VM drives: the VM
/// marks its roots, then calls [`Heap::trace`], [`Heap::sweep`].
pub struct Heap {
    slots: Vec<Option<Slot>>,
    free: Vec<u32>,
    strings: Table,
    gray: Vec<u32>,
    bytes_allocated: usize,
    next_gc: usize,
}

impl Default for Heap {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            strings: Table::default(),
            gray: Vec::new(),
            bytes_allocated: 0,
            next_gc: GC_INITIAL_THRESHOLD,
        }
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("live", &self.live_count())
            .field("bytes_allocated", &self.bytes_allocated)
            .field("next_gc", &self.next_gc)
            .finish()
    }
}

impl Heap {
    /// Intern a string, returning the handle of the existing object when one
    /// with the same content is already live.
    pub fn intern(&mut self, text: &str) -> Str {
        let hash = table::hash_str(text);
        let slots = &self.slots;
        let found = self.strings.find_string(text, hash, |key| {
            match &slots[key.raw.index as usize]
                .as_ref()
                .expect("interned strings are live")
                .obj
            {
                Obj::Str(s) => &*s.text,
                _ => unreachable!("string table keys are strings"),
            }
        });
        if let Some(existing) = found {
            return existing;
        }
        let raw = self.alloc(Obj::Str(ObjString {
            text: text.into(),
            hash,
        }));
        let key = Str {
            raw: Gc::from_index(raw),
            hash,
        };
        self.strings.set(key, Value::Nil);
        key
    }

    /// Allocate a function prototype.
    pub fn alloc_fun(&mut self, fun: ObjFun) -> Gc<ObjFun> {
        Gc::from_index(self.alloc(Obj::Fun(fun)))
    }

    /// Allocate a closure.
    pub fn alloc_closure(&mut self, closure: ObjClosure) -> Gc<ObjClosure> {
        Gc::from_index(self.alloc(Obj::Closure(closure)))
    }

    /// Allocate an upvalue.
    pub fn alloc_upvalue(&mut self, upvalue: ObjUpvalue) -> Gc<ObjUpvalue> {
        Gc::from_index(self.alloc(Obj::Upvalue(upvalue)))
    }

    /// Allocate a class.
    pub fn alloc_class(&mut self, class: ObjClass) -> Gc<ObjClass> {
        Gc::from_index(self.alloc(Obj::Class(class)))
    }

    /// Allocate an instance.
    pub fn alloc_instance(&mut self, instance: ObjInstance) -> Gc<ObjInstance> {
        Gc::from_index(self.alloc(Obj::Instance(instance)))
    }

    /// Allocate a bound method.
    pub fn alloc_bound_method(&mut self, bound: ObjBoundMethod) -> Gc<ObjBoundMethod> {
        Gc::from_index(self.alloc(Obj::BoundMethod(bound)))
    }

    /// The content of an interned string.
    pub fn string(&self, key: Str) -> &str {
        match self.obj(key.raw.index) {
            Obj::Str(s) => &s.text,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve a function handle.
    pub fn fun(&self, gc: Gc<ObjFun>) -> &ObjFun {
        match self.obj(gc.index) {
            Obj::Fun(f) => f,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve a closure handle.
    pub fn closure(&self, gc: Gc<ObjClosure>) -> &ObjClosure {
        match self.obj(gc.index) {
            Obj::Closure(c) => c,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve a closure handle mutably, used while its upvalues are wired up.
    pub fn closure_mut(&mut self, gc: Gc<ObjClosure>) -> &mut ObjClosure {
        match self.obj_mut(gc.index) {
            Obj::Closure(c) => c,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve an upvalue handle.
    pub fn upvalue(&self, gc: Gc<ObjUpvalue>) -> &ObjUpvalue {
        match self.obj(gc.index) {
            Obj::Upvalue(u) => u,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve an upvalue handle mutably, used when writing through it or
    /// closing it.
    pub fn upvalue_mut(&mut self, gc: Gc<ObjUpvalue>) -> &mut ObjUpvalue {
        match self.obj_mut(gc.index) {
            Obj::Upvalue(u) => u,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve a class handle.
    pub fn class(&self, gc: Gc<ObjClass>) -> &ObjClass {
        match self.obj(gc.index) {
            Obj::Class(c) => c,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve a class handle mutably, used when defining methods.
    pub fn class_mut(&mut self, gc: Gc<ObjClass>) -> &mut ObjClass {
        match self.obj_mut(gc.index) {
            Obj::Class(c) => c,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve an instance handle.
    pub fn instance(&self, gc: Gc<ObjInstance>) -> &ObjInstance {
        match self.obj(gc.index) {
            Obj::Instance(i) => i,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve an instance handle mutably, used when setting fields.
    pub fn instance_mut(&mut self, gc: Gc<ObjInstance>) -> &mut ObjInstance {
        match self.obj_mut(gc.index) {
            Obj::Instance(i) => i,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Resolve a bound method handle.
    pub fn bound_method(&self, gc: Gc<ObjBoundMethod>) -> &ObjBoundMethod {
        match self.obj(gc.index) {
            Obj::BoundMethod(b) => b,
            _ => unreachable!("handle type mismatch"),
        }
    }

    /// Render a value in Lox's human-readable format.
    pub fn display(&self, value: Value) -> ValueDisplay<'_> {
        ValueDisplay::new(self, value)
    }

    /// True once allocations have outgrown the current collection threshold.
    pub fn should_collect(&self) -> bool {
        self.bytes_allocated > self.next_gc
    }

    /// Mark an object as reachable and queue it for tracing. Marking twice is
    /// a no-op.
    pub fn mark<T>(&mut self, handle: Gc<T>) {
        self.mark_raw(handle.index);
    }

    /// Mark an interned string as reachable.
    pub fn mark_str(&mut self, key: Str) {
        self.mark_raw(key.raw.index);
    }

    /// Mark whatever object a value points at, if any.
    pub fn mark_value(&mut self, value: Value) {
        match value {
            Value::Nil | Value::Bool(_) | Value::Number(_) | Value::NativeFun(_) => {}
            Value::Str(s) => self.mark_raw(s.raw.index),
            Value::Fun(f) => self.mark_raw(f.index),
            Value::Closure(c) => self.mark_raw(c.index),
            Value::Class(c) => self.mark_raw(c.index),
            Value::Instance(i) => self.mark_raw(i.index),
            Value::BoundMethod(b) => self.mark_raw(b.index),
        }
    }

    /// Mark every key and value of a table.
    pub fn mark_table(&mut self, table: &Table) {
        for (key, value) in table.iter() {
            self.mark_raw(key.raw.index);
            self.mark_value(value);
        }
    }

    /// Trace the gray worklist until every reachable object is blackened.
    pub fn trace(&mut self) {
        let mut pending = Vec::new();
        while let Some(index) = self.gray.pop() {
            #[cfg(feature = "trace-gc")]
            eprintln!("-- gc blacken {}", index);
            pending.clear();
            references(&self.slot(index).obj, &mut pending);
            for &child in &pending {
                self.mark_raw(child);
            }
        }
    }

    /// Free every unmarked object, un-intern dead strings, clear the
    /// surviving marks, and raise the next collection threshold.
    pub fn sweep(&mut self) {
        self.remove_white_strings();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            match slot {
                Some(entry) if entry.marked => entry.marked = false,
                Some(entry) => {
                    #[cfg(feature = "trace-gc")]
                    eprintln!("-- gc free {}", index);
                    self.bytes_allocated -= entry.size;
                    *slot = None;
                    self.free.push(index as u32);
                }
                None => {}
            }
        }
        self.next_gc = self.bytes_allocated * GC_GROWTH_FACTOR;
    }

    /// Number of live objects on the heap.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    // Interned strings are weak references: an entry whose string did not get
    // marked is about to be swept, so drop it before probing can observe it.
    fn remove_white_strings(&mut self) {
        let slots = &self.slots;
        let dead: Vec<Str> = self
            .strings
            .iter()
            .filter(|(key, _)| {
                !slots[key.raw.index as usize]
                    .as_ref()
                    .expect("interned strings are live until swept")
                    .marked
            })
            .map(|(key, _)| key)
            .collect();
        for key in dead {
            self.strings.delete(key);
        }
    }

    fn alloc(&mut self, obj: Obj) -> u32 {
        let size = obj.size_estimate();
        self.bytes_allocated += size;
        let slot = Slot {
            obj,
            marked: false,
            size,
        };
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                (self.slots.len() - 1) as u32
            }
        }
    }

    fn obj(&self, index: u32) -> &Obj {
        &self.slot(index).obj
    }

    fn obj_mut(&mut self, index: u32) -> &mut Obj {
        &mut self.slots[index as usize]
            .as_mut()
            .expect("object accessed after free")
            .obj
    }

    fn slot(&self, index: u32) -> &Slot {
        self.slots[index as usize]
            .as_ref()
            .expect("object accessed after free")
    }

    fn mark_raw(&mut self, index: u32) {
        let slot = self.slots[index as usize]
            .as_mut()
            .expect("marked object is live");
        if !slot.marked {
            slot.marked = true;
            self.gray.push(index);
        }
    }
}

// The outgoing references of an object, pushed as raw slot indices. Strings
// have none; native functions never reach here because they are not heap
// objects.
fn references(obj: &Obj, out: &mut Vec<u32>) {
    match obj {
        Obj::Str(_) => {}
        Obj::Fun(fun) => {
            if let Some(name) = fun.name {
                out.push(name.raw.index);
            }
            for constant in fun.chunk.constants() {
                value_reference(constant, out);
            }
        }
        Obj::Closure(closure) => {
            out.push(closure.fun.index);
            for upvalue in &closure.upvalues {
                out.push(upvalue.index);
            }
        }
        Obj::Upvalue(upvalue) => match upvalue {
            ObjUpvalue::Open(_) => {}
            ObjUpvalue::Closed(value) => value_reference(value, out),
        },
        Obj::Class(class) => {
            out.push(class.name.raw.index);
            for (key, value) in class.methods.iter() {
                out.push(key.raw.index);
                value_reference(&value, out);
            }
        }
        Obj::Instance(instance) => {
            out.push(instance.class.index);
            for (key, value) in instance.fields.iter() {
                out.push(key.raw.index);
                value_reference(&value, out);
            }
        }
        Obj::BoundMethod(bound) => {
            value_reference(&bound.receiver, out);
            out.push(bound.method.index);
        }
    }
}

fn value_reference(value: &Value, out: &mut Vec<u32>) {
    match value {
        Value::Nil | Value::Bool(_) | Value::Number(_) | Value::NativeFun(_) => {}
        Value::Str(s) => out.push(s.raw.index),
        Value::Fun(f) => out.push(f.index),
        Value::Closure(c) => out.push(c.index),
        Value::Class(c) => out.push(c.index),
        Value::Instance(i) => out.push(i.index),
        Value::BoundMethod(b) => out.push(b.index),
    }
}
