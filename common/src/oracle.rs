use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::debug;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::error::{Error, Result};

/// Satisfiability queries over one clue formula, backed by varisat.
pub struct Oracle {
    solver: Solver<'static>,
}

/// Per-variable statistics over a set of distinct models.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSample {
    pub vars: Vec<Var>,
    /// `false_counts[i]` is how many sampled models set `vars[i]` to false.
    pub false_counts: Vec<usize>,
    pub models: usize,
    /// Every model over `vars` was drawn.
    pub exhaustive: bool,
    /// Drawing stopped because the wall-clock cap ran out.
    pub timed_out: bool,
}

impl ModelSample {
    /// Fraction of sampled models in which `vars[i]` is false, `None` without any model.
    pub fn false_rate(&self, i: usize) -> Option<f64> {
        (self.models > 0).then(|| self.false_counts[i] as f64 / self.models as f64)
    }
}

impl Oracle {
    pub fn new(formula: &CnfFormula) -> Self {
        let mut solver = Solver::new();
        solver.add_formula(formula);
        Oracle { solver }
    }

    fn solve_assuming(&mut self, assumptions: &[Lit]) -> Result<bool> {
        self.solver.assume(assumptions);
        let result = self.solver.solve();
        // Clear assumptions for the next query.
        self.solver.assume(&[]);
        result.map_err(|e| Error::Oracle(e.to_string()))
    }

    pub fn is_satisfiable(&mut self) -> Result<bool> {
        self.solve_assuming(&[])
    }

    /// Whether the formula together with `probe` is unsatisfiable, i.e. the formula entails the
    /// negation of `probe`.
    ///
    /// The probe is an assumption and is retracted afterwards, so each call behaves like a fresh
    /// query over the formula plus one unit clause. A probe that contradicts the formula outright
    /// takes the same path as any other unsatisfiable result.
    pub fn refutes(&mut self, probe: Lit) -> Result<bool> {
        Ok(!self.solve_assuming(&[probe])?)
    }

    /// Draws distinct models, projected onto `vars`, until the formula has no model left, `limit`
    /// models were drawn, or `cap` has elapsed. Elapsed time is checked between draws and a
    /// partial sample is returned as is.
    ///
    /// Each drawn model is blocked with a clause over `vars`, so the oracle is consumed.
    pub fn sample(mut self, vars: &[Var], limit: usize, cap: Duration) -> Result<ModelSample> {
        let started = Instant::now();
        let mut sample = ModelSample {
            vars: vars.to_vec(),
            false_counts: vec![0; vars.len()],
            models: 0,
            exhaustive: false,
            timed_out: false,
        };

        loop {
            if sample.models >= limit {
                break;
            }
            if started.elapsed() >= cap {
                sample.timed_out = true;
                break;
            }
            // No assumptions are active here, and clearing them would discard the model.
            let satisfiable = self
                .solver
                .solve()
                .map_err(|e| Error::Oracle(e.to_string()))?;
            if !satisfiable {
                sample.exhaustive = true;
                break;
            }

            let model = self
                .solver
                .model()
                .ok_or_else(|| Error::Oracle("solver returned no model".to_string()))?;
            let mines: HashSet<Var> = model
                .iter()
                .filter(|lit| lit.is_positive())
                .map(|lit| lit.var())
                .collect();

            let mut blocking = Vec::with_capacity(vars.len());
            for (i, &var) in vars.iter().enumerate() {
                let is_mine = mines.contains(&var);
                if !is_mine {
                    sample.false_counts[i] += 1;
                }
                blocking.push(Lit::from_var(var, !is_mine));
            }
            sample.models += 1;

            if blocking.is_empty() {
                // Projected onto no variables there is exactly one model.
                sample.exhaustive = true;
                break;
            }
            self.solver.add_clause(&blocking);
        }

        debug!(
            models = sample.models,
            exhaustive = sample.exhaustive,
            timed_out = sample.timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model sampling finished"
        );
        Ok(sample)
    }
}
