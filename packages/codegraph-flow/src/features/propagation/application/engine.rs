//! Flow Engine
//!
//! Owns every piece of mutable solver state: the flow graph, the work
//! scheduler, the variant arena and the registered listeners and tasks.
//! Collaborators (entity processors, listeners, deferred tasks) receive
//! `&mut FlowEngine` and grow the graph through its API; the analysis
//! driver uses the round-level internals to run the fixpoint.
//!
//! # Lifecycle
//! - `Unstable`: a run is in progress, `select` may create variants
//! - `Stable`: the last run converged, `select` only looks up
//!
//! # Reentrancy
//! `select` registers a new variant before invoking `process`, so a
//! processor that (transitively) selects the same entity again gets the
//! registered variant back instead of recursing.

use super::stats::SolverStats;
use crate::config::SolverConfig;
use crate::errors::{FlowError, FlowResult};
use crate::features::propagation::domain::{
    Context, ListenerId, NodeId, NodeLabel, NodeRole, TaskId, Variant, VariantId, VariantKind,
    VariantShape, WorkItem,
};
use crate::features::propagation::infrastructure::{
    scc_optimizer, FlowGraph, SccPassStats, Scheduler, VariantManager,
};
use crate::features::propagation::ports::{
    Entity, EntityProcessor, Environment, FilterRef, TokenListener, TokenManager, TokenSet,
};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Work scheduled through [`FlowEngine::defer`]
pub type DeferredTask<E, T> = Box<dyn FnOnce(&mut FlowEngine<E, T>) -> FlowResult<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unstable,
    Stable,
}

pub struct FlowEngine<E, T: TokenSet> {
    config: SolverConfig,
    graph: FlowGraph<T>,
    scheduler: Scheduler<T>,
    variants: VariantManager<E>,
    listeners: Vec<Rc<dyn TokenListener<E, T>>>,
    tasks: FxHashMap<TaskId, DeferredTask<E, T>>,
    next_task: u32,
    processor: Option<Rc<dyn EntityProcessor<E, T>>>,
    token_manager: Option<Rc<dyn TokenManager<T>>>,
    environment: Option<Rc<dyn Environment>>,
    state: EngineState,
    stats: SolverStats,
    work_since_optimize: u64,
}

impl<E: Entity, T: TokenSet + 'static> FlowEngine<E, T> {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            graph: FlowGraph::new(),
            scheduler: Scheduler::new(config.bag_order),
            variants: VariantManager::new(config.index_strategy),
            listeners: Vec::new(),
            tasks: FxHashMap::default(),
            next_task: 0,
            processor: None,
            token_manager: None,
            environment: None,
            state: EngineState::Unstable,
            stats: SolverStats::default(),
            work_since_optimize: 0,
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------------

    pub fn set_processor(&mut self, processor: Rc<dyn EntityProcessor<E, T>>) {
        self.processor = Some(processor);
    }

    pub fn set_token_manager(&mut self, token_manager: Rc<dyn TokenManager<T>>) {
        self.token_manager = Some(token_manager);
    }

    pub fn set_environment(&mut self, environment: Rc<dyn Environment>) {
        self.environment = Some(environment);
    }

    fn processor(&self) -> FlowResult<Rc<dyn EntityProcessor<E, T>>> {
        self.processor
            .clone()
            .ok_or_else(|| FlowError::unconfigured("no entity processor installed"))
    }

    pub fn token_manager(&self) -> FlowResult<Rc<dyn TokenManager<T>>> {
        self.token_manager
            .clone()
            .ok_or_else(|| FlowError::unconfigured("no token manager installed"))
    }

    pub fn environment(&self) -> FlowResult<Rc<dyn Environment>> {
        self.environment
            .clone()
            .ok_or_else(|| FlowError::unconfigured("no environment installed"))
    }

    // ------------------------------------------------------------------------
    // Variants
    // ------------------------------------------------------------------------

    /// Variant of `entity` under `context`, created on demand
    ///
    /// Creation only happens while the engine is unstable. On a stable
    /// engine an unknown index yields `None` and nothing is mutated.
    pub fn select(&mut self, entity: &E, context: &Context<E>) -> FlowResult<Option<VariantId>> {
        let processor = self.processor()?;
        let projected = context.project(processor.sensitivity(entity));

        if let Some(id) = self.variants.lookup(entity, &projected) {
            return Ok(Some(id));
        }
        if self.state == EngineState::Stable {
            return Ok(None);
        }

        let kind = self.allocate_nodes(self.variants.next_id(), processor.shape(entity));
        let id = self.variants.register(entity.clone(), projected, kind);
        self.stats.variants_created += 1;
        trace!("created variant {:?} for {:?}", id, entity);

        processor.process(self, id)?;
        Ok(Some(id))
    }

    /// Variant of `entity` under `context`, never created
    pub fn query(&self, entity: &E, context: &Context<E>) -> Option<VariantId> {
        let processor = self.processor.as_ref()?;
        let projected = context.project(processor.sensitivity(entity));
        self.variants.lookup(entity, &projected)
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant<E>> {
        self.variants.variant(id)
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    fn allocate_nodes(&mut self, id: VariantId, shape: VariantShape) -> VariantKind {
        match shape {
            VariantShape::Value => VariantKind::Value {
                node: self.labeled_node(id, NodeRole::Value),
            },
            VariantShape::Method {
                params,
                has_this,
                returns_value,
            } => {
                let this = has_this.then(|| self.labeled_node(id, NodeRole::This));
                let params = (0..params)
                    .map(|i| self.labeled_node(id, NodeRole::Param(i)))
                    .collect();
                let ret = returns_value.then(|| self.labeled_node(id, NodeRole::Return));
                let thrown = self.labeled_node(id, NodeRole::Thrown);
                VariantKind::Method {
                    this,
                    params,
                    ret,
                    thrown,
                }
            }
            VariantShape::Invocation => VariantKind::Invocation {
                node: self.labeled_node(id, NodeRole::Value),
                thrown: self.labeled_node(id, NodeRole::Thrown),
            },
        }
    }

    fn labeled_node(&mut self, variant: VariantId, role: NodeRole) -> NodeId {
        self.stats.nodes_created += 1;
        self.graph.add_node(Some(NodeLabel::new(variant, role)))
    }

    /// Context for entering a call at `site`, k-limited by the configuration
    pub fn push_call(&self, context: &Context<E>, site: E) -> Context<E> {
        context.push_call(site, self.config.call_string_depth)
    }

    // ------------------------------------------------------------------------
    // Graph construction
    // ------------------------------------------------------------------------

    /// Auxiliary node not owned by any variant
    pub fn new_node(&mut self) -> NodeId {
        self.stats.nodes_created += 1;
        self.graph.add_node(Some(NodeLabel::auxiliary()))
    }

    fn check_node(&self, node: NodeId) -> FlowResult<()> {
        if self.graph.contains(node) {
            Ok(())
        } else {
            Err(FlowError::invalid_usage(format!("unknown node {}", node)))
        }
    }

    /// Add the edge `from -> to`; returns `false` if it already existed
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> FlowResult<bool> {
        self.check_node(from)?;
        self.check_node(to)?;
        Ok(self.graph.add_successor(from, to, &mut self.scheduler))
    }

    /// Inject tokens into `node` right away
    pub fn inject(&mut self, node: NodeId, tokens: T) -> FlowResult<bool> {
        self.check_node(node)?;
        Ok(self.graph.inject(node, tokens, &mut self.scheduler))
    }

    /// Queue tokens for `node`, merged into its pending work
    pub fn absorb(&mut self, node: NodeId, tokens: &T) -> FlowResult<bool> {
        self.check_node(node)?;
        Ok(self.graph.absorb_lazily(node, tokens, &mut self.scheduler))
    }

    pub fn set_filter(&mut self, node: NodeId, filter: FilterRef<T>) -> FlowResult<()> {
        self.check_node(node)?;
        self.graph.set_filter(node, filter)
    }

    /// Install the token manager's filter for `type_name`
    ///
    /// Returns `false` if the type is unknown to the token manager.
    pub fn filter_by_type(&mut self, node: NodeId, type_name: &str) -> FlowResult<bool> {
        let Some(filter) = self.token_manager()?.type_filter(type_name) else {
            return Ok(false);
        };
        self.set_filter(node, filter)?;
        Ok(true)
    }

    /// Notify `listener` of every new-token delta reaching `node`
    ///
    /// Tokens already present are delivered in the next round.
    pub fn add_listener(
        &mut self,
        node: NodeId,
        listener: Rc<dyn TokenListener<E, T>>,
    ) -> FlowResult<ListenerId> {
        self.check_node(node)?;
        let id = ListenerId(self.listeners.len() as u32);
        self.listeners.push(listener);
        self.graph.add_listener(node, id, &mut self.scheduler);
        Ok(id)
    }

    /// Run `task` in the next round
    pub fn defer<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce(&mut FlowEngine<E, T>) -> FlowResult<()> + 'static,
    {
        let id = TaskId(self.next_task);
        self.next_task += 1;
        self.tasks.insert(id, Box::new(task));
        self.scheduler.schedule(WorkItem::Task(id));
        id
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    pub fn tokens(&self, node: NodeId) -> Option<&T> {
        self.graph
            .contains(node)
            .then(|| self.graph.tokens(node))
    }

    /// Snapshot of the tokens at `node`, empty for unknown nodes
    pub fn values(&self, node: NodeId) -> Vec<T::Token> {
        self.tokens(node).map(TokenSet::values).unwrap_or_default()
    }

    pub fn graph(&self) -> &FlowGraph<T> {
        &self.graph
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_stable(&self) -> bool {
        self.state == EngineState::Stable
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    // ------------------------------------------------------------------------
    // Driver internals
    // ------------------------------------------------------------------------

    pub(crate) fn begin_run(&mut self) {
        self.state = EngineState::Unstable;
    }

    pub(crate) fn mark_stable(&mut self) {
        self.state = EngineState::Stable;
    }

    pub(crate) fn add_duration(&mut self, millis: u64) {
        self.stats.duration_ms += millis;
    }

    pub fn has_pending_work(&self) -> bool {
        self.scheduler.has_work()
    }

    /// Drain one round; `None` when no work is left
    ///
    /// Work created while draining is only visible in the next round.
    ///
    /// On error the items not yet executed go back to the scheduler, so a
    /// later drain resumes where this one stopped. A failed listener gets its
    /// delta again; a failed task is dropped.
    pub fn drain_round(&mut self) -> FlowResult<Option<usize>> {
        let Some(mut bag) = self.scheduler.begin_round() else {
            return Ok(None);
        };
        self.stats.rounds += 1;

        let mut executed = 0;
        let mut failure = None;
        while let Some(item) = bag.take_work() {
            match self.execute(item) {
                Ok(true) => executed += 1,
                Ok(false) => {}
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.stats.work_executed += executed as u64;
        self.work_since_optimize += executed as u64;
        if let Some(err) = failure {
            warn!(pending = bag.len(), error = %err, "round aborted, requeueing");
            self.scheduler.requeue(bag);
            return Err(err);
        }
        Ok(Some(executed))
    }

    fn execute(&mut self, item: WorkItem) -> FlowResult<bool> {
        match item {
            WorkItem::SendTokens { node } => {
                // Withdrawn items leave no delta behind
                let Some(delta) = self.scheduler.take_delta(&item) else {
                    return Ok(false);
                };
                self.graph.inject(node, delta, &mut self.scheduler);
                Ok(true)
            }
            WorkItem::NotifyListener { node, listener } => {
                let Some(delta) = self.scheduler.take_delta(&item) else {
                    return Ok(false);
                };
                let callback = self
                    .listeners
                    .get(listener.index())
                    .cloned()
                    .ok_or_else(|| FlowError::invalid_usage(format!("unknown listener {:?}", listener)))?;
                if let Err(err) = callback.on_new_tokens(self, node, &delta) {
                    self.scheduler.absorb(item, delta);
                    return Err(err);
                }
                Ok(true)
            }
            WorkItem::Task(id) => {
                let Some(task) = self.tasks.remove(&id) else {
                    return Ok(false);
                };
                task(self)?;
                Ok(true)
            }
        }
    }

    /// Optimizer pass if enough work completed since the last one
    pub fn maybe_optimize(&mut self) -> Option<SccPassStats> {
        if !self.config.optimizer_enabled() || self.work_since_optimize < self.config.scc_interval as u64 {
            return None;
        }
        Some(self.optimize())
    }

    /// Collapse the cycles of the whole live graph
    pub fn optimize(&mut self) -> SccPassStats {
        let roots: Vec<NodeId> = self.graph.node_ids().collect();
        let pass = scc_optimizer::optimize(&mut self.graph, &mut self.scheduler, &roots);

        self.work_since_optimize = 0;
        self.stats.optimizer_passes += 1;
        self.stats.components_collapsed += pass.multi_node_components;
        self.stats.nodes_collapsed += pass.nodes_collapsed;
        debug!(
            "SCC pass: visited {} nodes, collapsed {} components ({} nodes)",
            pass.nodes_visited, pass.multi_node_components, pass.nodes_collapsed
        );
        pass
    }

    /// Return to the initial empty state, keeping the installed collaborators
    pub fn reset(&mut self) {
        self.graph.clear();
        self.scheduler.clear();
        self.variants.reset();
        self.listeners.clear();
        self.tasks.clear();
        self.next_task = 0;
        self.state = EngineState::Unstable;
        self.stats = SolverStats::default();
        self.work_since_optimize = 0;
    }
}

impl<E, T: TokenSet> fmt::Debug for FlowEngine<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowEngine")
            .field("state", &self.state)
            .field("nodes", &self.stats.nodes_created)
            .field("variants", &self.stats.variants_created)
            .field("listeners", &self.listeners.len())
            .field("pending_tasks", &self.tasks.len())
            .finish()
    }
}
