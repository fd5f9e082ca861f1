//! Analysis Driver
//!
//! Orchestrates one analysis run over a [`FlowEngine`]:
//!
//! ```text
//! Unstable ─▶ select roots ─▶ drain round ─▶ (optimize?) ─┐
//!                                  ▲                       │
//!                                  └────── work left ──────┘
//!                                          no work ─▶ Stable
//! ```
//!
//! The cancellation flag is polled before every round. A cancelled run
//! keeps its partial (but consistent) token sets and stays unstable.
//!
//! # Example
//! ```rust,ignore
//! let mut driver = AnalysisDriver::new(SolverConfig::default())?
//!     .with_processor(Rc::new(MyProcessor));
//! let outcome = driver.analyze(Rc::new(program), vec![main])?;
//! let values = driver.get_values_for(&local, &Context::for_entry(main));
//! ```

use super::active_part::ActivePart;
use super::engine::FlowEngine;
use super::stats::SolverStats;
use crate::config::SolverConfig;
use crate::errors::{FlowError, FlowResult};
use crate::features::propagation::domain::{Context, NodeId, Variant, VariantId};
use crate::features::propagation::ports::{Entity, EntityProcessor, Environment, TokenManager, TokenSet};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Completion {
    /// No work left; the engine is stable
    Converged,
    /// Stopped through the [`ActivePart`]; results are incomplete
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub completion: Completion,
    pub stats: SolverStats,
}

impl AnalysisOutcome {
    pub fn converged(&self) -> bool {
        self.completion == Completion::Converged
    }
}

/// Owns the engine, the root set and the cancellation flag
pub struct AnalysisDriver<E: Entity, T: TokenSet> {
    engine: FlowEngine<E, T>,
    roots: Vec<E>,
    active: ActivePart,
}

impl<E: Entity, T: TokenSet + 'static> AnalysisDriver<E, T> {
    pub fn new(config: SolverConfig) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self {
            engine: FlowEngine::new(config),
            roots: Vec::new(),
            active: ActivePart::new(),
        })
    }

    pub fn with_processor(mut self, processor: Rc<dyn EntityProcessor<E, T>>) -> Self {
        self.engine.set_processor(processor);
        self
    }

    pub fn with_token_manager(mut self, token_manager: Rc<dyn TokenManager<T>>) -> Self {
        self.engine.set_token_manager(token_manager);
        self
    }

    /// Handle for cancelling a run from the outside
    pub fn active_part(&self) -> ActivePart {
        self.active.clone()
    }

    /// Run (or re-run) the solver from `roots`
    ///
    /// Fails before touching any state when `roots` is empty.
    pub fn analyze(&mut self, environment: Rc<dyn Environment>, roots: Vec<E>) -> FlowResult<AnalysisOutcome> {
        if roots.is_empty() {
            return Err(FlowError::invalid_argument("analyze requires at least one root entity"));
        }

        let started = Instant::now();
        info!("Starting analysis from {} root(s)", roots.len());

        self.engine.set_environment(environment);
        self.engine.begin_run();

        for root in roots {
            let context = Context::for_entry(root.clone());
            self.engine.select(&root, &context)?;
            if !self.roots.contains(&root) {
                self.roots.push(root);
            }
        }

        let completion = self.solve()?;

        let elapsed = started.elapsed().as_millis() as u64;
        self.engine.add_duration(elapsed);
        let stats = self.engine.stats().clone();

        match completion {
            Completion::Converged => {
                self.engine.mark_stable();
                info!(
                    "Analysis converged: {} variants, {} nodes, {} work items in {} rounds ({}ms)",
                    stats.variants_created, stats.nodes_created, stats.work_executed, stats.rounds, elapsed
                );
            }
            Completion::Cancelled => {
                warn!(
                    "Analysis cancelled after {} rounds; results are incomplete",
                    stats.rounds
                );
            }
        }

        Ok(AnalysisOutcome { completion, stats })
    }

    fn solve(&mut self) -> FlowResult<Completion> {
        loop {
            if !self.active.can_proceed() {
                return Ok(Completion::Cancelled);
            }
            let Some(executed) = self.engine.drain_round()? else {
                return Ok(Completion::Converged);
            };
            debug!("Round {}: {} work items", self.engine.stats().rounds, executed);
            self.engine.maybe_optimize();
        }
    }

    // ------------------------------------------------------------------------
    // Queries (never create variants; misses yield empty results)
    // ------------------------------------------------------------------------

    pub fn query_variant(&self, entity: &E, context: &Context<E>) -> Option<&Variant<E>> {
        let id = self.engine.query(entity, context)?;
        self.engine.variant(id)
    }

    fn values_at(&self, node: Option<NodeId>) -> Vec<T::Token> {
        node.map(|n| self.engine.values(n)).unwrap_or_default()
    }

    /// Values reaching `entity` (the return node for methods)
    pub fn get_values_for(&self, entity: &E, context: &Context<E>) -> Vec<T::Token> {
        self.values_at(self.query_variant(entity, context).and_then(Variant::node))
    }

    /// Values of parameter `index` of the method on top of the call stack
    pub fn get_values_for_parameter(&self, index: usize, context: &Context<E>) -> Vec<T::Token> {
        let node = context
            .current_method()
            .and_then(|method| self.query_variant(method, context))
            .and_then(|variant| variant.param_node(index));
        self.values_at(node)
    }

    /// Receiver values of the method on top of the call stack
    pub fn get_values_for_this(&self, context: &Context<E>) -> Vec<T::Token> {
        let node = context
            .current_method()
            .and_then(|method| self.query_variant(method, context))
            .and_then(Variant::this_node);
        self.values_at(node)
    }

    /// Exceptions escaping a method or call site
    pub fn get_thrown_values(&self, entity: &E, context: &Context<E>) -> Vec<T::Token> {
        self.values_at(self.query_variant(entity, context).and_then(Variant::thrown_node))
    }

    pub fn variant_id(&self, entity: &E, context: &Context<E>) -> Option<VariantId> {
        self.engine.query(entity, context)
    }

    pub fn is_stable(&self) -> bool {
        self.engine.is_stable()
    }

    pub fn roots(&self) -> &[E] {
        &self.roots
    }

    pub fn stats(&self) -> &SolverStats {
        self.engine.stats()
    }

    pub fn engine(&self) -> &FlowEngine<E, T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FlowEngine<E, T> {
        &mut self.engine
    }

    /// Return to the initial empty state and re-arm cancellation
    pub fn reset(&mut self) {
        self.engine.reset();
        if let Ok(token_manager) = self.engine.token_manager() {
            token_manager.reset();
        }
        self.roots.clear();
        self.active.activate();
    }
}

impl<E: Entity, T: TokenSet> fmt::Debug for AnalysisDriver<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisDriver")
            .field("engine", &self.engine)
            .field("roots", &self.roots.len())
            .field("active", &self.active.can_proceed())
            .finish()
    }
}
