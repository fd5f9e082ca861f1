//! A tiny object-oriented program model
//!
//! Methods with parameters, receivers, allocations, copies, casts, calls,
//! field stores/loads and throws. Field accesses are resolved through token
//! listeners on the base local, the way a points-to analysis grows its
//! graph as receiver objects arrive.

use codegraph_flow::features::propagation::{
    Context, EntityProcessor, FlowEngine, NodeId, Sensitivity, Symbol, SymbolSet, TokenListener,
    Variant, VariantId, VariantShape,
};
use codegraph_flow::{AnalysisDriver, FlowError, FlowResult, SolverConfig, TypedTokenManager};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ent {
    Method(&'static str),
    Local(&'static str, &'static str),
    Field(&'static str, Symbol),
    CallSite(&'static str, usize),
}

#[derive(Debug, Clone)]
pub enum Stmt {
    New {
        target: &'static str,
        class: &'static str,
        site: &'static str,
    },
    Copy {
        to: &'static str,
        from: &'static str,
    },
    Cast {
        to: &'static str,
        from: &'static str,
        class: &'static str,
    },
    Call {
        callee: &'static str,
        receiver: Option<&'static str>,
        args: Vec<&'static str>,
        result: Option<&'static str>,
    },
    Store {
        base: &'static str,
        field: &'static str,
        value: &'static str,
    },
    Load {
        target: &'static str,
        base: &'static str,
        field: &'static str,
    },
    Return(&'static str),
    Throw(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct MethodDef {
    pub params: Vec<&'static str>,
    pub has_this: bool,
    pub body: Vec<Stmt>,
}

impl MethodDef {
    pub fn new(params: &[&'static str], body: Vec<Stmt>) -> Self {
        Self {
            params: params.to_vec(),
            has_this: false,
            body,
        }
    }

    pub fn with_this(mut self) -> Self {
        self.has_this = true;
        self
    }
}

pub struct MiniProgram {
    methods: BTreeMap<&'static str, MethodDef>,
    tokens: Rc<TypedTokenManager>,
}

impl MiniProgram {
    pub fn new(tokens: Rc<TypedTokenManager>) -> Self {
        Self {
            methods: BTreeMap::new(),
            tokens,
        }
    }

    pub fn method(mut self, name: &'static str, def: MethodDef) -> Self {
        self.methods.insert(name, def);
        self
    }
}

pub type MiniEngine = FlowEngine<Ent, SymbolSet>;
pub type MiniDriver = AnalysisDriver<Ent, SymbolSet>;

fn value_node(engine: &MiniEngine, id: VariantId) -> FlowResult<NodeId> {
    engine
        .variant(id)
        .and_then(Variant::node)
        .ok_or_else(|| FlowError::processor("variant without value node"))
}

fn select(engine: &mut MiniEngine, entity: Ent, context: &Context<Ent>) -> FlowResult<VariantId> {
    engine
        .select(&entity, context)?
        .ok_or_else(|| FlowError::processor(format!("{:?} not selectable", entity)))
}

fn local(engine: &mut MiniEngine, method: &'static str, name: &'static str, context: &Context<Ent>) -> FlowResult<NodeId> {
    let id = select(engine, Ent::Local(method, name), context)?;
    value_node(engine, id)
}

/// Resolves `base.field` for every object arriving at the base local
struct FieldAccess {
    field: &'static str,
    other: NodeId,
    store: bool,
}

impl TokenListener<Ent, SymbolSet> for FieldAccess {
    fn on_new_tokens(&self, engine: &mut MiniEngine, _node: NodeId, tokens: &SymbolSet) -> FlowResult<()> {
        for object in tokens.iter() {
            let id = select(engine, Ent::Field(self.field, object), &Context::new())?;
            let field_node = value_node(engine, id)?;
            if self.store {
                engine.connect(self.other, field_node)?;
            } else {
                engine.connect(field_node, self.other)?;
            }
        }
        Ok(())
    }
}

pub struct MiniProcessor {
    program: Rc<MiniProgram>,
}

impl MiniProcessor {
    fn process_method(
        &self,
        engine: &mut MiniEngine,
        variant: VariantId,
        name: &'static str,
        context: &Context<Ent>,
    ) -> FlowResult<()> {
        let def = self
            .program
            .methods
            .get(name)
            .ok_or_else(|| FlowError::processor(format!("unknown method {}", name)))?;
        let method = engine
            .variant(variant)
            .cloned()
            .ok_or_else(|| FlowError::processor("unknown variant"))?;

        if let Some(this) = method.this_node() {
            let target = local(engine, name, "this", context)?;
            engine.connect(this, target)?;
        }
        for (i, param) in def.params.iter().enumerate() {
            if let Some(node) = method.param_node(i) {
                let target = local(engine, name, *param, context)?;
                engine.connect(node, target)?;
            }
        }

        for (idx, stmt) in def.body.iter().enumerate() {
            match stmt.clone() {
                Stmt::New { target, class, site } => {
                    if !engine.environment()?.has_class(class) {
                        return Err(FlowError::processor(format!("unknown class {}", class)));
                    }
                    let object = self.program.tokens.object(class, site);
                    let node = local(engine, name, target, context)?;
                    engine.inject(node, SymbolSet::singleton(object))?;
                }
                Stmt::Copy { to, from } => {
                    let from = local(engine, name, from, context)?;
                    let to = local(engine, name, to, context)?;
                    engine.connect(from, to)?;
                }
                Stmt::Cast { to, from, class } => {
                    let from = local(engine, name, from, context)?;
                    let to = local(engine, name, to, context)?;
                    let cast = engine.new_node();
                    engine.filter_by_type(cast, class)?;
                    engine.connect(from, cast)?;
                    engine.connect(cast, to)?;
                }
                Stmt::Call {
                    callee,
                    receiver,
                    args,
                    result,
                } => {
                    let callee_context = engine.push_call(context, Ent::Method(callee));
                    let callee_id = select(engine, Ent::Method(callee), &callee_context)?;
                    let callee_variant = engine
                        .variant(callee_id)
                        .cloned()
                        .ok_or_else(|| FlowError::processor("unknown callee variant"))?;
                    let site = select(engine, Ent::CallSite(name, idx), context)?;
                    let site_variant = engine
                        .variant(site)
                        .cloned()
                        .ok_or_else(|| FlowError::processor("unknown call site"))?;

                    for (i, arg) in args.into_iter().enumerate() {
                        let param = callee_variant
                            .param_node(i)
                            .ok_or_else(|| FlowError::processor(format!("{} has no parameter {}", callee, i)))?;
                        let arg = local(engine, name, arg, context)?;
                        engine.connect(arg, param)?;
                    }
                    if let (Some(receiver), Some(this)) = (receiver, callee_variant.this_node()) {
                        let receiver = local(engine, name, receiver, context)?;
                        engine.connect(receiver, this)?;
                    }
                    if let (Some(ret), Some(site_node)) = (callee_variant.return_node(), site_variant.node()) {
                        engine.connect(ret, site_node)?;
                        if let Some(result) = result {
                            let result = local(engine, name, result, context)?;
                            engine.connect(site_node, result)?;
                        }
                    }
                    if let (Some(thrown), Some(site_thrown), Some(own_thrown)) = (
                        callee_variant.thrown_node(),
                        site_variant.thrown_node(),
                        method.thrown_node(),
                    ) {
                        engine.connect(thrown, site_thrown)?;
                        engine.connect(site_thrown, own_thrown)?;
                    }
                }
                Stmt::Store { base, field, value } => {
                    let base = local(engine, name, base, context)?;
                    let value = local(engine, name, value, context)?;
                    engine.add_listener(
                        base,
                        Rc::new(FieldAccess {
                            field,
                            other: value,
                            store: true,
                        }),
                    )?;
                }
                Stmt::Load { target, base, field } => {
                    let base = local(engine, name, base, context)?;
                    let target = local(engine, name, target, context)?;
                    engine.add_listener(
                        base,
                        Rc::new(FieldAccess {
                            field,
                            other: target,
                            store: false,
                        }),
                    )?;
                }
                Stmt::Return(value) => {
                    if let Some(ret) = method.return_node() {
                        let value = local(engine, name, value, context)?;
                        engine.connect(value, ret)?;
                    }
                }
                Stmt::Throw(value) => {
                    if let Some(thrown) = method.thrown_node() {
                        let value = local(engine, name, value, context)?;
                        engine.connect(value, thrown)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl EntityProcessor<Ent, SymbolSet> for MiniProcessor {
    fn shape(&self, entity: &Ent) -> VariantShape {
        match entity {
            Ent::Method(name) => {
                let def = self.program.methods.get(name);
                VariantShape::Method {
                    params: def.map_or(0, |d| d.params.len()),
                    has_this: def.is_some_and(|d| d.has_this),
                    returns_value: true,
                }
            }
            Ent::CallSite(..) => VariantShape::Invocation,
            Ent::Local(..) | Ent::Field(..) => VariantShape::Value,
        }
    }

    fn sensitivity(&self, entity: &Ent) -> Sensitivity {
        match entity {
            Ent::Field(..) => Sensitivity::INSENSITIVE,
            _ => Sensitivity::CALL_STRING,
        }
    }

    fn process(&self, engine: &mut MiniEngine, variant: VariantId) -> FlowResult<()> {
        let (entity, context) = {
            let v = engine
                .variant(variant)
                .ok_or_else(|| FlowError::processor("unknown variant"))?;
            (v.entity().clone(), v.context().clone())
        };
        match entity {
            Ent::Method(name) => self.process_method(engine, variant, name, &context),
            _ => Ok(()),
        }
    }
}

pub fn mini_driver(program: MiniProgram, config: SolverConfig) -> MiniDriver {
    let tokens = Rc::clone(&program.tokens);
    MiniDriver::new(config)
        .expect("valid config")
        .with_processor(Rc::new(MiniProcessor {
            program: Rc::new(program),
        }))
        .with_token_manager(tokens)
}

/// Context of `main` as seeded by the driver
pub fn main_context() -> Context<Ent> {
    Context::for_entry(Ent::Method("main"))
}
