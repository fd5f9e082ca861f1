//! Test fixtures: processors and environments

use super::builders::GraphProgram;
use codegraph_flow::features::propagation::{
    Context, EntityProcessor, Environment, FlowEngine, NodeId, Sensitivity, SymbolSet, VariantId,
    VariantShape,
};
use codegraph_flow::{AnalysisDriver, FlowError, FlowResult, SolverConfig};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

pub type GraphEngine = FlowEngine<u32, SymbolSet>;
pub type GraphDriver = AnalysisDriver<u32, SymbolSet>;

/// Environment backed by a fixed set of class names
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: BTreeSet<String>,
}

impl ClassTable {
    pub fn with(names: &[&str]) -> Self {
        Self {
            classes: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl Environment for ClassTable {
    fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }
}

/// Processor for [`GraphProgram`]s
pub struct GraphProcessor {
    program: Rc<GraphProgram>,
}

impl GraphProcessor {
    pub fn new(program: GraphProgram) -> Self {
        Self {
            program: Rc::new(program),
        }
    }
}

pub fn node_of(engine: &GraphEngine, variant: VariantId) -> FlowResult<NodeId> {
    engine
        .variant(variant)
        .and_then(|v| v.node())
        .ok_or_else(|| FlowError::processor("variant without value node"))
}

fn connect_successors(program: &GraphProgram, engine: &mut GraphEngine, entity: u32, node: NodeId) -> FlowResult<()> {
    let successors: Vec<u32> = program.successors(entity).collect();
    for succ in successors {
        let target = engine
            .select(&succ, &Context::new())?
            .ok_or_else(|| FlowError::processor(format!("entity {} not selectable", succ)))?;
        let target_node = node_of(engine, target)?;
        engine.connect(node, target_node)?;
    }
    Ok(())
}

impl EntityProcessor<u32, SymbolSet> for GraphProcessor {
    fn shape(&self, _entity: &u32) -> VariantShape {
        VariantShape::Value
    }

    fn sensitivity(&self, _entity: &u32) -> Sensitivity {
        Sensitivity::INSENSITIVE
    }

    fn process(&self, engine: &mut GraphEngine, variant: VariantId) -> FlowResult<()> {
        let entity = *engine
            .variant(variant)
            .ok_or_else(|| FlowError::processor("unknown variant"))?
            .entity();
        let node = node_of(engine, variant)?;

        if let Some(&modulus) = self.program.filters.get(&entity) {
            engine.set_filter(
                node,
                Arc::new(move |mut tokens: SymbolSet| {
                    tokens.retain(|t| t % modulus != 0);
                    tokens
                }),
            )?;
        }
        if let Some(seeds) = self.program.seeds.get(&entity) {
            engine.inject(node, seeds.iter().copied().collect())?;
        }

        if self.program.lazy_discovery {
            let program = Rc::clone(&self.program);
            engine.defer(move |engine: &mut GraphEngine| connect_successors(&program, engine, entity, node));
            Ok(())
        } else {
            connect_successors(&self.program, engine, entity, node)
        }
    }
}

pub fn graph_driver(program: &GraphProgram, config: SolverConfig) -> GraphDriver {
    GraphDriver::new(config)
        .expect("valid config")
        .with_processor(Rc::new(GraphProcessor::new(program.clone())))
}

/// Token values per entity, empty for undiscovered ones
pub fn graph_values(driver: &GraphDriver, node_count: u32) -> Vec<Vec<u32>> {
    (0..node_count)
        .map(|v| driver.get_values_for(&v, &Context::new()))
        .collect()
}

/// Analyze to convergence and return the token values per entity
pub fn solve_graph(program: &GraphProgram, roots: &[u32], config: SolverConfig) -> Vec<Vec<u32>> {
    let mut driver = graph_driver(program, config);
    let outcome = driver
        .analyze(Rc::new(ClassTable::default()), roots.to_vec())
        .expect("analysis succeeds");
    assert!(outcome.converged());
    graph_values(&driver, program.node_count)
}
