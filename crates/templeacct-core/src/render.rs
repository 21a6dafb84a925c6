//! Hierarchical ledger-group renderer
//!
//! Turns a backend group tree into the flat, pre-ordered list of rows a
//! report table shows. Rendering never recomputes totals: every amount on a
//! row is the one the backend put on that node.

use std::collections::HashMap;

use serde::Serialize;

use crate::fiscal::DateRange;
use crate::models::{Balances, GroupNode, LedgerLeaf};
use crate::types::{ReportFormat, ReportView};

/// Per-report rendering inputs that are not view options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Pixels of indentation per tree level
    pub indent_unit: u32,
    /// Date range ledger drill-down links open, when the report has one
    pub drill: Option<DateRange>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            indent_unit: 20,
            drill: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Group,
    Ledger,
}

/// Link from a ledger row to its general ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrillDown {
    pub ledger_id: String,
    pub range: DateRange,
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow<B> {
    pub kind: RowKind,
    pub id: String,
    pub code: String,
    pub name: String,
    pub level: u32,
    pub indent: u32,
    pub balances: B,
    /// Ids of the group rows above this one, outermost first
    pub ancestors: Vec<String>,
    /// A group row followed by at least one row nested under it
    pub has_children: bool,
    pub drill_down: Option<DrillDown>,
}

/// Render one group and everything under it
pub fn render<B: Balances + Clone>(
    node: &GroupNode<B>,
    level: u32,
    view: &ReportView,
    ctx: &RenderContext,
) -> Vec<DisplayRow<B>> {
    let mut rows = Vec::new();
    let mut ancestors = Vec::new();
    render_into(node, level, view, ctx, &mut ancestors, &mut rows);
    rows
}

/// Render a list of roots, each at level 0
pub fn render_forest<B: Balances + Clone>(
    roots: &[GroupNode<B>],
    view: &ReportView,
    ctx: &RenderContext,
) -> Vec<DisplayRow<B>> {
    roots.iter().flat_map(|root| render(root, 0, view, ctx)).collect()
}

fn render_into<B: Balances + Clone>(
    node: &GroupNode<B>,
    level: u32,
    view: &ReportView,
    ctx: &RenderContext,
    ancestors: &mut Vec<String>,
    rows: &mut Vec<DisplayRow<B>>,
) {
    if !view.show_zero_balances && node.balances.is_zero() {
        return;
    }

    let header = if level > 0 || view.format == ReportFormat::Detailed {
        rows.push(DisplayRow {
            kind: RowKind::Group,
            id: node.id.clone(),
            code: node.code.clone(),
            name: node.name.clone(),
            level,
            indent: level * ctx.indent_unit,
            balances: node.balances.clone(),
            ancestors: ancestors.clone(),
            has_children: false,
            drill_down: None,
        });
        ancestors.push(node.id.clone());
        Some(rows.len() - 1)
    } else {
        None
    };

    if view.format == ReportFormat::Detailed {
        for ledger in &node.ledgers {
            if !view.show_zero_balances && ledger.balances.is_zero() {
                continue;
            }
            rows.push(ledger_row(ledger, level + 1, ctx, ancestors));
        }
    }

    if view.format != ReportFormat::Condensed {
        for child in &node.children {
            render_into(child, level + 1, view, ctx, ancestors, rows);
        }
    }

    if let Some(index) = header {
        ancestors.pop();
        rows[index].has_children = rows.len() > index + 1;
    }
}

fn ledger_row<B: Clone>(
    ledger: &LedgerLeaf<B>,
    level: u32,
    ctx: &RenderContext,
    ancestors: &[String],
) -> DisplayRow<B> {
    DisplayRow {
        kind: RowKind::Ledger,
        id: ledger.id.clone(),
        code: ledger.code.clone(),
        name: ledger.name.clone(),
        level,
        indent: level * ctx.indent_unit,
        balances: ledger.balances.clone(),
        ancestors: ancestors.to_vec(),
        has_children: false,
        drill_down: ctx.drill.map(|range| DrillDown {
            ledger_id: ledger.id.clone(),
            range,
        }),
    }
}

/// Recorded when the page's "Expand all" button is pressed
pub const EXPAND_ALL_ACTION: &str = "+all";
/// Recorded when the page's "Collapse all" button is pressed
pub const COLLAPSE_ALL_ACTION: &str = "-all";

/// Expanded/collapsed state of group rows (trial balance)
///
/// Pure view state: toggling never triggers a new render, only a change in
/// which rows are visible.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    default_expanded: bool,
    overrides: HashMap<String, bool>,
}

impl CollapseState {
    pub fn new(default_expanded: bool) -> Self {
        Self {
            default_expanded,
            overrides: HashMap::new(),
        }
    }

    pub fn is_expanded(&self, group_id: &str) -> bool {
        self.overrides.get(group_id).copied().unwrap_or(self.default_expanded)
    }

    pub fn toggle(&mut self, group_id: &str) {
        let expanded = self.is_expanded(group_id);
        self.overrides.insert(group_id.to_string(), !expanded);
    }

    pub fn expand_all(&mut self) {
        self.default_expanded = true;
        self.overrides.clear();
    }

    pub fn collapse_all(&mut self) {
        self.default_expanded = false;
        self.overrides.clear();
    }

    /// A row is visible when every group above it is expanded
    pub fn is_visible<B>(&self, row: &DisplayRow<B>) -> bool {
        row.ancestors.iter().all(|id| self.is_expanded(id))
    }

    pub fn visible_rows<'a, B>(&self, rows: &'a [DisplayRow<B>]) -> Vec<&'a DisplayRow<B>> {
        rows.iter().filter(|row| self.is_visible(row)).collect()
    }

    /// Apply the toggles a page recorded, oldest first
    ///
    /// [`EXPAND_ALL_ACTION`] and [`COLLAPSE_ALL_ACTION`] reset every group;
    /// any other action toggles the group with that id.
    pub fn replay<S: AsRef<str>>(&mut self, actions: &[S]) {
        for action in actions {
            match action.as_ref() {
                EXPAND_ALL_ACTION => self.expand_all(),
                COLLAPSE_ALL_ACTION => self.collapse_all(),
                group_id => self.toggle(group_id),
            }
        }
    }
}
