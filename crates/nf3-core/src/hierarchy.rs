//! Hierarchical breakdown of flow along an ordered list of dimensions.
//!
//! Leaves carry summed flow; every parent is the sum of its children, so the
//! root equals the total flow whatever the dimension order.

use std::collections::{BTreeMap, HashSet};

use nf3_common::{Dimension, Error, FlowUnit, Result};
use serde::Serialize;

use crate::record::FlowRecord;

pub const MAX_DEPTH: usize = 4;

pub const ROOT_NAME: &str = "total";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// Dimension this level groups by; `None` for the root.
    pub dimension: Option<Dimension>,
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

/// Treemap-style row: node id, parent id, label, value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapRow {
    pub id: String,
    pub parent: Option<String>,
    pub label: String,
    pub depth: usize,
    pub value: f64,
}

#[derive(Default)]
struct Builder {
    own: f64,
    children: BTreeMap<String, Builder>,
}

impl Builder {
    fn insert(&mut self, path: &[&str], value: f64) {
        match path.split_first() {
            None => self.own += value,
            Some((head, rest)) => self
                .children
                .entry((*head).to_string())
                .or_default()
                .insert(rest, value),
        }
    }

    fn finish(self, name: String, dims: &[Dimension], depth: usize) -> HierarchyNode {
        let dimension = depth.checked_sub(1).map(|d| dims[d]);
        if self.children.is_empty() {
            return HierarchyNode {
                dimension,
                name,
                value: self.own,
                children: Vec::new(),
            };
        }
        let children: Vec<HierarchyNode> = self
            .children
            .into_iter()
            .map(|(n, b)| b.finish(n, dims, depth + 1))
            .collect();
        HierarchyNode {
            dimension,
            name,
            value: children.iter().map(|c| c.value).sum(),
            children,
        }
    }
}

fn check_dims(dims: &[Dimension]) -> Result<()> {
    if dims.is_empty() || dims.len() > MAX_DEPTH {
        return Err(Error::Config(format!(
            "hierarchy needs 1 to {} dimensions, got {}",
            MAX_DEPTH,
            dims.len()
        )));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = dims.iter().find(|d| !seen.insert(**d)) {
        return Err(Error::Config(format!(
            "hierarchy dimension '{}' repeated",
            dup
        )));
    }
    Ok(())
}

/// Build the breakdown tree. Missing values appear as `unknown` nodes.
pub fn build_hierarchy<'a, I>(records: I, dims: &[Dimension], unit: FlowUnit) -> Result<HierarchyNode>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    check_dims(dims)?;
    let mut root = Builder::default();
    for r in records {
        let path: Vec<&str> = dims.iter().map(|d| r.category(*d)).collect();
        root.insert(&path, r.flow(unit));
    }
    Ok(root.finish(ROOT_NAME.to_string(), dims, 0))
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first rows with `/`-joined path ids.
    pub fn flatten(&self) -> Vec<TreemapRow> {
        let mut rows = Vec::new();
        self.flatten_into(None, 0, &mut rows);
        rows
    }

    fn flatten_into(&self, parent: Option<&str>, depth: usize, rows: &mut Vec<TreemapRow>) {
        let id = match parent {
            Some(p) => format!("{}/{}", p, self.name),
            None => self.name.clone(),
        };
        rows.push(TreemapRow {
            id: id.clone(),
            parent: parent.map(str::to_string),
            label: self.name.clone(),
            depth,
            value: self.value,
        });
        for child in &self.children {
            child.flatten_into(Some(&id), depth + 1, rows);
        }
    }

    /// Ids of non-leaf nodes whose value differs from the sum of their
    /// children by more than `tolerance` (relative).
    pub fn inconsistencies(&self, tolerance: f64) -> Vec<String> {
        let mut bad = Vec::new();
        self.collect_inconsistent(&self.name, tolerance, &mut bad);
        bad
    }

    fn collect_inconsistent(&self, id: &str, tolerance: f64, bad: &mut Vec<String>) {
        if self.is_leaf() {
            return;
        }
        let sum: f64 = self.children.iter().map(|c| c.value).sum();
        if (self.value - sum).abs() > tolerance * self.value.abs().max(sum.abs()).max(1.0) {
            bad.push(id.to_string());
        }
        for child in &self.children {
            child.collect_inconsistent(&format!("{}/{}", id, child.name), tolerance, bad);
        }
    }

    pub fn check_consistency(&self, tolerance: f64) -> bool {
        self.inconsistencies(tolerance).is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(HierarchyNode::leaf_count).sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordFields;

    fn rec(recipe: &str, op: &str, chamber: &str, sccm: f64) -> FlowRecord {
        FlowRecord::new(RecordFields {
            recipe: Some(recipe.into()),
            operation: Some(op.into()),
            chamber: Some(chamber.into()),
            tstamp: "2024010100".into(),
            flow_sccm: Some(sccm),
            ..Default::default()
        })
    }

    fn sample() -> Vec<FlowRecord> {
        vec![
            rec("R_BP", "OP1", "C1", 10.0),
            rec("R_BP", "OP1", "C2", 5.0),
            rec("R_BP", "OP2", "C1", 1.0),
            rec("R_AS", "OP1", "C1", 4.0),
            rec("R_none", "OP3", "C3", 2.0),
        ]
    }

    #[test]
    fn parents_sum_children() {
        let dims = [Dimension::Layer, Dimension::Operation, Dimension::Chamber];
        let root = build_hierarchy(&sample(), &dims, FlowUnit::Sccm).unwrap();
        assert_eq!(root.value, 22.0);
        assert!(root.check_consistency(1e-9));
        let bp = root.children.iter().find(|c| c.name == "BP").unwrap();
        assert_eq!(bp.value, 16.0);
        assert_eq!(bp.dimension, Some(Dimension::Layer));
        assert!(root.children.iter().any(|c| c.name == "unknown"));
        assert_eq!(root.leaf_count(), 5);
    }

    #[test]
    fn order_changes_shape_not_total() {
        let a = build_hierarchy(&sample(), &[Dimension::Layer, Dimension::Chamber], FlowUnit::Sccm)
            .unwrap();
        let b = build_hierarchy(&sample(), &[Dimension::Chamber, Dimension::Layer], FlowUnit::Sccm)
            .unwrap();
        assert_eq!(a.value, b.value);
        let top: Vec<&str> = b.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(top, vec!["C1", "C2", "C3"]);
        assert_ne!(a.children[0].name, b.children[0].name);
    }

    #[test]
    fn rejects_bad_dimension_lists() {
        assert!(build_hierarchy(&sample(), &[], FlowUnit::Sccm).is_err());
        let five = [
            Dimension::Layer,
            Dimension::Operation,
            Dimension::Sin,
            Dimension::Chamber,
            Dimension::Tool,
        ];
        assert!(build_hierarchy(&sample(), &five, FlowUnit::Sccm).is_err());
        assert!(build_hierarchy(&sample(), &[Dimension::Tool, Dimension::Tool], FlowUnit::Sccm).is_err());
        assert!(build_hierarchy(&sample(), &[Dimension::Tool], FlowUnit::Sccm).is_ok());
    }

    #[test]
    fn flatten_emits_parent_links() {
        let root = build_hierarchy(&sample(), &[Dimension::Layer], FlowUnit::Sccm).unwrap();
        let rows = root.flatten();
        assert_eq!(rows[0].id, "total");
        assert_eq!(rows[0].parent, None);
        assert!(rows.iter().any(|r| r.id == "total/BP" && r.parent.as_deref() == Some("total")));
        assert_eq!(rows.len(), 1 + root.children.len());
    }

    #[test]
    fn detects_tampered_node() {
        let mut root = build_hierarchy(&sample(), &[Dimension::Layer], FlowUnit::Sccm).unwrap();
        root.value += 1.0;
        assert_eq!(root.inconsistencies(1e-9), vec!["total".to_string()]);
    }
}
