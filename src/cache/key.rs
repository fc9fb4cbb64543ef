//! Cache Key Module
//!
//! Component constructors, instance ids and the composite key the cache is indexed by.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::Value;

use crate::emitter::Emitter;
use crate::state::State;

/// A constructed component instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

type ConstructFn =
    dyn Fn(&InstanceId, &State, &Emitter, &[Value]) -> anyhow::Result<Instance> + Send + Sync;

// == Instance Id ==
/// Caller-chosen key distinguishing instances built by the same constructor.
///
/// Compared by value. Integers are normalised so that equal numbers compare
/// equal whatever their source type; `Unsigned` only holds values above
/// `i64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceId {
    Int(i64),
    Unsigned(u64),
    Text(String),
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceId::Int(n) => write!(f, "{}", n),
            InstanceId::Unsigned(n) => write!(f, "{}", n),
            InstanceId::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_signed_id {
    ($($t:ty),*) => {
        $(impl From<$t> for InstanceId {
            fn from(n: $t) -> Self {
                InstanceId::Int(i64::from(n))
            }
        })*
    };
}

macro_rules! impl_unsigned_id {
    ($($t:ty),*) => {
        $(impl From<$t> for InstanceId {
            fn from(n: $t) -> Self {
                match i64::try_from(n) {
                    Ok(n) => InstanceId::Int(n),
                    Err(_) => InstanceId::Unsigned(n as u64),
                }
            }
        })*
    };
}

impl_signed_id!(i32, i64, u32);
impl_unsigned_id!(u64, usize);

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        InstanceId::Text(s.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        InstanceId::Text(s)
    }
}

// == Constructor ==
/// Shared handle to a component construction function.
///
/// Two handles are equal only if they were cloned from the same
/// `Constructor::new` call; the closure itself is never compared.
#[derive(Clone)]
pub struct Constructor {
    name: &'static str,
    build: Arc<ConstructFn>,
}

impl Constructor {
    // == Constructor ==
    /// Wraps a construction function.
    ///
    /// The function receives `(id, state, emit, args)`; `args` are whatever the
    /// caller passed to `State::cache` on the miss that triggered construction.
    pub fn new<F, T>(build: F) -> Self
    where
        F: Fn(&InstanceId, &State, &Emitter, &[Value]) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Self {
            name: short_type_name::<T>(),
            build: Arc::new(
                move |id: &InstanceId,
                      state: &State,
                      emit: &Emitter,
                      args: &[Value]|
                      -> anyhow::Result<Instance> {
                    Ok(Arc::new(build(id, state, emit, args)?))
                },
            ),
        }
    }

    /// Overrides the name used in logs and errors.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the construction function.
    pub fn construct(
        &self,
        id: &InstanceId,
        state: &State,
        emit: &Emitter,
        args: &[Value],
    ) -> anyhow::Result<Instance> {
        (self.build)(id, state, emit, args)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.build) as *const ()
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Constructor {}

impl Hash for Constructor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("addr", &self.addr())
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// == Component Key ==
/// `(constructor, id)` pair indexing the instance cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    pub constructor: Constructor,
    pub id: InstanceId,
}

impl ComponentKey {
    pub fn new(constructor: Constructor, id: InstanceId) -> Self {
        Self { constructor, id }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.constructor.name(), self.id)
    }
}
