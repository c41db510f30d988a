use crate::{
    error::*,
    field::{Context, Descriptor, FieldOptions},
    method::{Getter, MethodField, MethodTable, Setter},
    resolve::split_path,
    schema::Schema,
    value::{Map, Value},
};
use std::{
    any::{type_name, Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    sync::{Arc, RwLock},
};

lazy_static::lazy_static! {
    pub(crate) static ref CLASSES: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>> = Default::default();
}

thread_local! {
    static DEFINING: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone)]
enum Declaration {
    Field(Arc<dyn Descriptor>),
    Method(MethodField),
}

impl Declaration {
    fn options(&self) -> &FieldOptions {
        match self {
            Self::Field(descriptor) => descriptor.options(),
            Self::Method(field) => field.options(),
        }
    }
}

/// Fields declared directly by one schema class.
struct Ancestor {
    id: TypeId,
    name: &'static str,
    declarations: Vec<(String, Declaration)>,
}

enum Binding<S> {
    Field(Arc<dyn Descriptor>),
    Method {
        getter: Getter<S>,
        setter: Option<Setter<S>>,
        setter_name: String,
    },
}

/// Field of a registered schema class, bound to its name, output key and
/// attribute path.
pub struct BoundField<S> {
    name: String,
    key: String,
    path: Vec<String>,
    required: bool,
    read_only: bool,
    binding: Binding<S>,
}

impl<S> BoundField<S>
where
    S: Schema,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn context(&self) -> Context<'_> {
        Context {
            name: &self.name,
            path: &self.path,
            resolver: S::RESOLVER,
        }
    }

    fn read(&self, schema: &S, source: &Value) -> Result<Option<Value>> {
        match &self.binding {
            Binding::Field(descriptor) => descriptor.read(&self.context(), source),
            Binding::Method { getter, .. } => getter(schema, source).map(Some),
        }
    }

    fn write(&self, schema: &S, data: &mut Map, value: Value) -> Result<()> {
        match &self.binding {
            Binding::Field(descriptor) => descriptor.write(&self.context(), data, value),
            Binding::Method {
                setter: Some(setter),
                ..
            } => setter(schema, data, value),
            Binding::Method {
                setter: None,
                setter_name,
                ..
            } => Err(Error::MissingMethod {
                field: self.name.to_owned(),
                method: setter_name.to_owned(),
            }),
        }
    }
}

/// Collects the declarations of a schema class. Passed to [`Schema::define`].
pub struct ClassBuilder<S> {
    declarations: Vec<(String, Declaration)>,
    parents: Vec<Vec<Arc<Ancestor>>>,
    inherited_keys: Vec<String>,
    methods: MethodTable<S>,
    inherited: Vec<MethodTable<S>>,
    error: Option<Error>,
}

impl<S> ClassBuilder<S>
where
    S: Schema,
{
    fn new() -> Self {
        Self {
            declarations: vec![],
            parents: vec![],
            inherited_keys: vec![],
            methods: Default::default(),
            inherited: vec![],
            error: None,
        }
    }

    /// Inherits fields and methods of `P`.
    ///
    /// Inherited fields come first in emitted output, in the order of
    /// `extends` calls and then of each parent's own field order.
    pub fn extends<P>(&mut self) -> &mut Self
    where
        P: Schema,
        S: AsRef<P>,
    {
        match SchemaClass::<P>::of() {
            Ok(class) => {
                for key in class.keys() {
                    if !self.inherited_keys.iter().any(|item| item == key) {
                        self.inherited_keys.push(key.to_owned());
                    }
                }
                self.parents.push(class.lineage.clone());
                self.inherited
                    .push(class.methods.project(<S as AsRef<P>>::as_ref));
            }
            Err(error) => {
                self.error.get_or_insert(error);
            }
        }
        self
    }

    pub fn field<D>(&mut self, name: impl ToString, descriptor: D) -> &mut Self
    where
        D: Descriptor,
    {
        self.declarations
            .push((name.to_string(), Declaration::Field(Arc::new(descriptor))));
        self
    }

    pub fn method(&mut self, name: impl ToString, field: MethodField) -> &mut Self {
        self.declarations
            .push((name.to_string(), Declaration::Method(field)));
        self
    }

    pub fn getter<F>(&mut self, name: impl ToString, f: F) -> &mut Self
    where
        F: Fn(&S, &Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.add_getter(name.to_string(), Arc::new(f));
        self
    }

    pub fn setter<F>(&mut self, name: impl ToString, f: F) -> &mut Self
    where
        F: Fn(&S, &mut Map, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.methods.add_setter(name.to_string(), Arc::new(f));
        self
    }

    fn build(self) -> Result<SchemaClass<S>> {
        let name = type_name::<S>();
        if let Some(error) = self.error {
            return Err(error);
        }
        let own = Arc::new(Ancestor {
            id: TypeId::of::<S>(),
            name,
            declarations: self.declarations,
        });
        let lineage = linearize(own, self.parents, name)?;
        let rank = |id: TypeId| {
            lineage
                .iter()
                .position(|ancestor| ancestor.id == id)
                .unwrap_or(usize::MAX)
        };
        let mut methods = self.methods;
        for table in self.inherited {
            methods.inherit(table, &rank);
        }

        // Keys of the parents keep their slots; new keys follow in
        // declaration order. The declaration nearest in the lineage wins.
        let mut keys = self.inherited_keys;
        let mut merged = HashMap::<String, (String, Declaration)>::new();
        for ancestor in lineage.iter().rev() {
            for (field, declaration) in &ancestor.declarations {
                let key = declaration
                    .options()
                    .key
                    .clone()
                    .unwrap_or_else(|| field.to_owned());
                if !keys.contains(&key) {
                    keys.push(key.to_owned());
                }
                merged.insert(key, (field.to_owned(), declaration.clone()));
            }
        }

        let fields = keys
            .into_iter()
            .filter_map(|key| {
                merged
                    .remove(&key)
                    .map(|(field, declaration)| (field, key, declaration))
            })
            .map(|(field, key, declaration)| bind(name, &methods, field, key, declaration))
            .collect::<Result<Vec<_>>>()?;
        Ok(SchemaClass {
            name,
            lineage,
            methods,
            fields,
        })
    }
}

fn bind<S>(
    class: &'static str,
    methods: &MethodTable<S>,
    name: String,
    key: String,
    declaration: Declaration,
) -> Result<BoundField<S>>
where
    S: Schema,
{
    let options = declaration.options();
    let path = split_path(options.attr.as_deref().unwrap_or(&name));
    let required = options.required;
    let read_only = options.read_only;
    let binding = match declaration {
        Declaration::Field(descriptor) => Binding::Field(descriptor),
        Declaration::Method(field) => {
            let getter_name = field.getter_name(&name);
            let setter_name = field.setter_name(&name);
            let getter = methods
                .getter(&getter_name)
                .ok_or_else(|| Error::MissingMethod {
                    field: name.to_owned(),
                    method: getter_name,
                })?;
            let setter = methods.setter(&setter_name);
            if setter.is_none() && !read_only {
                log::debug!(
                    "method field `{}` of `{}` has no setter `{}`",
                    name,
                    class,
                    setter_name
                );
            }
            Binding::Method {
                getter,
                setter,
                setter_name,
            }
        }
    };
    Ok(BoundField {
        name,
        key,
        path,
        required,
        read_only,
        binding,
    })
}

/// C3 linearization of `own` and the lineages of its direct parents.
fn linearize(
    own: Arc<Ancestor>,
    parents: Vec<Vec<Arc<Ancestor>>>,
    name: &'static str,
) -> Result<Vec<Arc<Ancestor>>> {
    let bases = parents
        .iter()
        .filter_map(|lineage| lineage.first().cloned())
        .collect::<Vec<_>>();
    let mut sequences = parents;
    sequences.push(bases);
    let mut result = vec![own];
    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }
        let head = sequences
            .iter()
            .map(|sequence| &sequence[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|sequence| sequence[1..].iter().any(|item| item.id == head.id))
            })
            .cloned()
            .ok_or(Error::InconsistentHierarchy(name))?;
        for sequence in &mut sequences {
            if sequence[0].id == head.id {
                sequence.remove(0);
            }
        }
        result.push(head);
    }
}

/// Frozen, ordered field list of a schema type, shared by all its instances.
pub struct SchemaClass<S> {
    name: &'static str,
    lineage: Vec<Arc<Ancestor>>,
    methods: MethodTable<S>,
    fields: Vec<BoundField<S>>,
}

impl<S> SchemaClass<S>
where
    S: Schema,
{
    /// Returns the registered class of `S`, defining it on first use.
    pub fn of() -> Result<Arc<Self>> {
        let id = TypeId::of::<S>();
        let registered = CLASSES
            .read()
            .unwrap_or_else(|error| {
                log::warn!("schema registry lock poisoned, recovering");
                error.into_inner()
            })
            .get(&id)
            .cloned();
        if let Some(class) = registered {
            return Self::downcast(class);
        }
        let cyclic = DEFINING.with(|defining| {
            let mut defining = defining.borrow_mut();
            if defining.contains(&id) {
                return true;
            }
            defining.push(id);
            false
        });
        if cyclic {
            return Err(Error::CyclicInheritance(type_name::<S>()));
        }
        let mut builder = ClassBuilder::<S>::new();
        S::define(&mut builder);
        let built = builder.build();
        DEFINING.with(|defining| defining.borrow_mut().retain(|item| *item != id));
        let class = Arc::new(built?);
        log::debug!(
            "registered schema `{}` with fields: {:?}",
            class.name,
            class.keys().collect::<Vec<_>>()
        );
        let class = CLASSES
            .write()
            .unwrap_or_else(|error| {
                log::warn!("schema registry lock poisoned, recovering");
                error.into_inner()
            })
            .entry(id)
            .or_insert(class)
            .clone();
        Self::downcast(class)
    }

    fn downcast(class: Arc<dyn Any + Send + Sync>) -> Result<Arc<Self>> {
        class.downcast::<Self>().map_err(|_| {
            Error::Message(format!(
                "registered class is not a schema of: {}",
                type_name::<S>()
            ))
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[BoundField<S>] {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.key.as_str())
    }

    /// Names of this class and its ancestors, in method resolution order.
    pub fn ancestors(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.lineage.iter().map(|ancestor| ancestor.name)
    }

    pub(crate) fn serialize(&self, schema: &S, source: &Value) -> Result<Map> {
        let mut result = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            if let Some(value) = field.read(schema, source)? {
                result.insert(&field.key, value);
            }
        }
        Ok(result)
    }

    /// Collects reconstruction data from one input mapping; absent keys are
    /// skipped.
    pub(crate) fn accumulate(&self, schema: &S, input: &Value) -> Result<Map> {
        let entries = input
            .as_entries()
            .ok_or_else(|| Error::NotMap(input.clone()))?;
        let mut data = Map::new();
        for field in self.fields.iter().filter(|field| !field.read_only) {
            if let Some(value) = entries.get(&field.key) {
                field.write(schema, &mut data, value.clone())?;
            }
        }
        Ok(data)
    }
}
