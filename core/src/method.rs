use crate::{
    error::*,
    field::FieldOptions,
    value::{Map, Value},
};
use std::{any::TypeId, collections::HashMap, sync::Arc};

pub type Getter<S> = Arc<dyn Fn(&S, &Value) -> Result<Value> + Send + Sync>;
pub type Setter<S> = Arc<dyn Fn(&S, &mut Map, Value) -> Result<()> + Send + Sync>;

/// Field computed by methods of the schema instead of read from an attribute
/// path.
///
/// Without explicit names the methods `get_<name>` and `set_<name>` are used.
#[derive(Debug, Clone)]
pub struct MethodField {
    options: FieldOptions,
    getter: Option<String>,
    setter: Option<String>,
}

impl MethodField {
    pub fn new() -> Self {
        Self {
            options: FieldOptions::new(),
            getter: None,
            setter: None,
        }
    }

    pub fn named(getter: impl ToString, setter: impl ToString) -> Self {
        Self {
            options: FieldOptions::new(),
            getter: Some(getter.to_string()),
            setter: Some(setter.to_string()),
        }
    }

    pub fn key(mut self, key: impl ToString) -> Self {
        self.options.key = Some(key.to_string());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.options.read_only = read_only;
        self
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn getter_name(&self, field: &str) -> String {
        self.getter
            .clone()
            .unwrap_or_else(|| format!("get_{}", field))
    }

    pub fn setter_name(&self, field: &str) -> String {
        self.setter
            .clone()
            .unwrap_or_else(|| format!("set_{}", field))
    }
}

impl Default for MethodField {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Method<F> {
    origin: TypeId,
    f: F,
}

/// Named methods a schema class can bind method fields to, including the
/// ones inherited from its ancestors.
pub(crate) struct MethodTable<S> {
    getters: HashMap<String, Method<Getter<S>>>,
    setters: HashMap<String, Method<Setter<S>>>,
}

impl<S> Default for MethodTable<S> {
    fn default() -> Self {
        Self {
            getters: Default::default(),
            setters: Default::default(),
        }
    }
}

impl<S> MethodTable<S>
where
    S: 'static,
{
    pub fn getter(&self, name: &str) -> Option<Getter<S>> {
        self.getters.get(name).map(|method| method.f.clone())
    }

    pub fn setter(&self, name: &str) -> Option<Setter<S>> {
        self.setters.get(name).map(|method| method.f.clone())
    }

    pub fn add_getter(&mut self, name: String, f: Getter<S>) {
        let origin = TypeId::of::<S>();
        self.getters.insert(name, Method { origin, f });
    }

    pub fn add_setter(&mut self, name: String, f: Setter<S>) {
        let origin = TypeId::of::<S>();
        self.setters.insert(name, Method { origin, f });
    }

    /// Rebinds every method to a descendant schema that can view itself as `S`.
    pub fn project<C>(&self, view: fn(&C) -> &S) -> MethodTable<C>
    where
        C: 'static,
    {
        let getters = self
            .getters
            .iter()
            .map(|(name, method)| {
                let f = method.f.clone();
                let getter: Getter<C> = Arc::new(move |schema: &C, source: &Value| {
                    f(view(schema), source)
                });
                let method = Method {
                    origin: method.origin,
                    f: getter,
                };
                (name.to_owned(), method)
            })
            .collect();
        let setters = self
            .setters
            .iter()
            .map(|(name, method)| {
                let f = method.f.clone();
                let setter: Setter<C> =
                    Arc::new(move |schema: &C, data: &mut Map, value: Value| {
                        f(view(schema), data, value)
                    });
                let method = Method {
                    origin: method.origin,
                    f: setter,
                };
                (name.to_owned(), method)
            })
            .collect();
        MethodTable { getters, setters }
    }

    /// Fills in methods from `other`; on a name clash the method defined by
    /// the class with the lower `rank` wins.
    pub fn inherit(&mut self, other: MethodTable<S>, rank: impl Fn(TypeId) -> usize) {
        merge(&mut self.getters, other.getters, &rank);
        merge(&mut self.setters, other.setters, &rank);
    }
}

fn merge<F>(
    target: &mut HashMap<String, Method<F>>,
    source: HashMap<String, Method<F>>,
    rank: &impl Fn(TypeId) -> usize,
) {
    for (name, method) in source {
        match target.get(&name) {
            Some(current) if rank(current.origin) <= rank(method.origin) => {}
            _ => {
                target.insert(name, method);
            }
        }
    }
}
