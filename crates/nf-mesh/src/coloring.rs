//! Greedy edge coloring.
//!
//! Edges of one color share no node, so contributions of a color group can be
//! written to node-indexed storage concurrently without any two writers
//! touching the same row.

use nf_core::EdgeId;
use rayon::prelude::*;

use crate::mesh::Mesh;

#[derive(Debug, Clone)]
pub struct EdgeColoring {
    groups: Vec<Vec<EdgeId>>,
}

impl EdgeColoring {
    /// Color edges in ID order, giving each the smallest color unused at both endpoints.
    pub fn greedy(mesh: &Mesh) -> Self {
        let mut node_colors: Vec<Vec<usize>> = vec![Vec::new(); mesh.nodes().len()];
        let mut groups: Vec<Vec<EdgeId>> = Vec::new();

        for edge in mesh.edges() {
            let (i, j) = (edge.i().idx(), edge.j().idx());
            let color = (0..)
                .find(|c| !node_colors[i].contains(c) && !node_colors[j].contains(c))
                .unwrap_or(0);
            node_colors[i].push(color);
            node_colors[j].push(color);
            if color == groups.len() {
                groups.push(Vec::new());
            }
            groups[color].push(edge.id);
        }

        Self { groups }
    }

    pub fn n_colors(&self) -> usize {
        self.groups.len()
    }

    /// Edge groups, one per color.
    pub fn groups(&self) -> &[Vec<EdgeId>] {
        &self.groups
    }

    /// Check that every edge appears once and no color group shares a node.
    pub fn is_valid_for(&self, mesh: &Mesh) -> bool {
        let total: usize = self.groups.iter().map(Vec::len).sum();
        if total != mesh.edges().len() {
            return false;
        }
        self.groups.par_iter().all(|group| {
            let mut touched = vec![false; mesh.nodes().len()];
            group.iter().all(|&e| match mesh.edge(e) {
                Some(edge) => edge.nodes.iter().all(|n| {
                    let fresh = !touched[n.idx()];
                    touched[n.idx()] = true;
                    fresh
                }),
                None => false,
            })
        })
    }
}
