//! The omission pass: decides which tracking calls to delete and rewrites
//! the program accordingly.
//!
//! The cheap baseline always runs: operations on local, never-written
//! addresses (and the return-value slot) are omittable outright. When
//! dependence analysis is enabled, operations whose every dependence is
//! statically ordered by dominance join them, and the proven dependences
//! are accumulated into the module-wide [`OmissionTable`].

pub mod abi;
mod rewrite;
mod table;

pub use self::table::OmissionTable;

use crate::analysis::{
    analyze_predictability, DependenceGraph, InstructionCfg, Locality,
};
use crate::il;
use crate::Error;
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Pass configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Run the dominance-based predictability analysis. The baseline
    /// locality omission runs regardless.
    pub dependence_analysis: bool,
    /// Write the instruction CFG and dependence graph of every analyzed
    /// function as dot files.
    pub export_graphs: bool,
    /// Where exported dot files land.
    pub graph_directory: PathBuf,
    /// The filename stem of exported dot files:
    /// `<stem>_<function>.CFG.dot` and `<stem>_<function>.DG.dot`.
    pub graph_stem: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            dependence_analysis: false,
            export_graphs: false,
            graph_directory: PathBuf::from("."),
            graph_stem: "program".to_string(),
        }
    }
}

/// Pass diagnostics: how many tracking calls existed, and how many were
/// deleted.
#[derive(Clone, Copy, Debug, Default)]
pub struct Statistics {
    tracking_calls_seen: usize,
    tracking_calls_removed: usize,
}

impl Statistics {
    pub fn tracking_calls_seen(&self) -> usize {
        self.tracking_calls_seen
    }

    pub fn tracking_calls_removed(&self) -> usize {
        self.tracking_calls_removed
    }
}

/// The baseline omittable set: memory operations whose address is local
/// and never truly written, plus every operation on the return-value slot.
pub fn select_baseline(function: &il::Function, locality: &Locality) -> Vec<il::InstructionRef> {
    let mut omittable = Vec::new();
    for (reference, instruction) in function.instructions() {
        let address = match instruction.address() {
            Some(address) => address,
            None => continue,
        };
        if (locality.is_local(address) && !locality.is_written(address))
            || function.value_name(address) == abi::RETURN_SLOT
        {
            omittable.push(reference);
        }
    }
    omittable
}

/// The whole-program omission pass.
///
/// Functions are processed in index order, so the table's entry order and
/// its serialization are identical across runs on identical input.
#[derive(Debug, Default)]
pub struct OmissionPass {
    config: Config,
    table: OmissionTable,
    statistics: Statistics,
}

impl OmissionPass {
    pub fn new(config: Config) -> OmissionPass {
        OmissionPass {
            config,
            table: OmissionTable::new(),
            statistics: Statistics::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &OmissionTable {
        &self.table
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    /// Runs the pass over every function, then attaches the serialized
    /// table before the finalize call in the entry function.
    pub fn run(&mut self, program: &mut il::Program) -> Result<(), Error> {
        for index in program.function_indices() {
            if let Some(function) = program.function_mut(index) {
                self.run_function(function)?;
            }
        }
        if self.config.dependence_analysis {
            let encoded = self.table.encode();
            rewrite::attach_dependence_table(program, &encoded)?;
        }
        Ok(())
    }

    fn run_function(&mut self, function: &mut il::Function) -> Result<(), Error> {
        if function.instruction_count() == 0 {
            return Ok(());
        }

        let locality = Locality::classify(function);
        let mut omittable = select_baseline(function, &locality);
        let mut report_assignments: BTreeMap<usize, usize> = BTreeMap::new();

        if self.config.dependence_analysis {
            let cfg = InstructionCfg::new(function)?;
            let dg = DependenceGraph::new(function, &cfg)?;
            if self.config.export_graphs {
                self.export_graphs(function, &cfg, &dg)?;
            }
            let predictability = analyze_predictability(function, &cfg, &dg, &locality)?;
            for place in predictability.omittable() {
                if !omittable.contains(place) {
                    omittable.push(*place);
                }
            }
            for (block_index, descriptors) in predictability.block_dependences() {
                let table_index = self.table.push(descriptors.clone());
                report_assignments.insert(*block_index, table_index);
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            for (reference, instruction) in function.instructions() {
                if !instruction.is_memory_access() {
                    continue;
                }
                let mark = if omittable.contains(&reference) {
                    " [omit]"
                } else {
                    ""
                };
                debug!("{}: {}{}", function.name(), instruction, mark);
            }
        }

        self.statistics.tracking_calls_seen += rewrite::count_tracking_calls(function);
        self.statistics.tracking_calls_removed +=
            rewrite::remove_tracking_calls(function, &omittable)?;
        rewrite::insert_block_reports(function, &report_assignments)?;

        Ok(())
    }

    fn export_graphs(
        &self,
        function: &il::Function,
        cfg: &InstructionCfg,
        dg: &DependenceGraph,
    ) -> Result<(), Error> {
        std::fs::create_dir_all(&self.config.graph_directory)?;
        let cfg_path = self.config.graph_directory.join(format!(
            "{}_{}.CFG.dot",
            self.config.graph_stem,
            function.name()
        ));
        std::fs::write(cfg_path, cfg.graph().dot_graph())?;
        let dg_path = self.config.graph_directory.join(format!(
            "{}_{}.DG.dot",
            self.config.graph_stem,
            function.name()
        ));
        std::fs::write(dg_path, dg.graph().dot_graph())?;
        Ok(())
    }
}
