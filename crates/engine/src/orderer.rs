// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock ordering over `(release, job)` nodes.
//!
//! An edge `A -> B` means A is locked before B. Nodes are layered by Kahn's
//! algorithm; within a layer they run in `(release, job)` order, so the plan
//! is the same on every run.

use crate::error::Error;
use bbr_core::{ArtifactKind, Job, JobIdentity};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};

pub struct LockOrderer {
    graph: DiGraph<JobIdentity, ()>,
    nodes: BTreeMap<JobIdentity, NodeIndex>,
}

impl LockOrderer {
    /// Build the graph for one phase's edge set.
    ///
    /// Every job is a node, so skipped jobs remain valid targets, but only
    /// jobs that run scripts contribute edges.
    pub fn new(jobs: &[Job], kind: ArtifactKind) -> Result<Self, Error> {
        let mut graph = DiGraph::new();
        let mut nodes = BTreeMap::new();
        for job in jobs {
            let identity = job.identity();
            if !nodes.contains_key(&identity) {
                let index = graph.add_node(identity.clone());
                nodes.insert(identity, index);
            }
        }

        for job in jobs.iter().filter(|job| !job.is_skipped()) {
            let edges = match kind {
                ArtifactKind::Backup => job.backup_should_be_locked_before(),
                ArtifactKind::Restore => job.restore_should_be_locked_before(),
            };
            let from = job.identity();
            for lock_before in edges {
                let target = JobIdentity::from(lock_before);
                let Some(&to) = nodes.get(&target) else {
                    return Err(Error::MissingLockTarget { job: from, target });
                };
                graph.update_edge(nodes[&from], to, ());
            }
        }

        Ok(Self { graph, nodes })
    }

    /// Total order over every node.
    pub fn order(&self) -> Result<Vec<JobIdentity>, Error> {
        self.check_acyclic()?;

        let mut in_degree: BTreeMap<JobIdentity, usize> = self
            .nodes
            .iter()
            .map(|(identity, &index)| {
                let degree = self.graph.neighbors_directed(index, Direction::Incoming).count();
                (identity.clone(), degree)
            })
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut level: BTreeSet<JobIdentity> =
            in_degree.iter().filter(|(_, d)| **d == 0).map(|(id, _)| id.clone()).collect();

        while !level.is_empty() {
            let mut next = BTreeSet::new();
            for identity in &level {
                let index = self.nodes[identity];
                for successor in self.graph.neighbors_directed(index, Direction::Outgoing) {
                    let target = &self.graph[successor];
                    if let Some(degree) = in_degree.get_mut(target) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.insert(target.clone());
                        }
                    }
                }
            }
            order.extend(level);
            level = next;
        }

        Ok(order)
    }

    fn check_acyclic(&self) -> Result<(), Error> {
        for component in algo::tarjan_scc(&self.graph) {
            let self_loop = component.len() == 1
                && self.graph.contains_edge(component[0], component[0]);
            if component.len() > 1 || self_loop {
                let mut cycle: Vec<JobIdentity> =
                    component.into_iter().map(|index| self.graph[index].clone()).collect();
                cycle.sort();
                return Err(Error::LockCycle(cycle));
            }
        }
        Ok(())
    }
}

/// Lock order for `jobs` in the given phase.
pub fn lock_order(jobs: &[Job], kind: ArtifactKind) -> Result<Vec<JobIdentity>, Error> {
    LockOrderer::new(jobs, kind)?.order()
}

#[cfg(test)]
#[path = "orderer_tests.rs"]
mod tests;
