//! Layout roots: the schedulers that run the box passes.
//!
//! Each root owns a depth-ordered registry of the boxes beneath it. When a
//! tick is due, the next late update runs the fit pass deepest-first, then the
//! grow and placement passes shallowest-first, so children are measured before
//! their parents and parents are sized before their children.

use std::time::Duration;

use boxflow_core::LayoutError;
use tracing::{debug, error, warn};

use crate::registry::DepthRegistry;
use crate::tree::{NodeId, Role, Scene};

/// Options for a layout root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootOptions {
    /// Automatic ticks per second
    pub tick_rate: u32,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self { tick_rate: 60 }
    }
}

impl RootOptions {
    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Minimum time between automatic ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}

/// Scheduler state carried by a root node.
#[derive(Debug, Clone)]
pub struct LayoutRoot {
    options: RootOptions,
    registry: DepthRegistry<NodeId>,
    tick_interval: Duration,
    last_tick: Duration,
    due: bool,
}

impl LayoutRoot {
    /// A new root, due to tick on the first late update.
    pub fn new(options: RootOptions) -> Self {
        Self {
            options,
            registry: DepthRegistry::new(),
            tick_interval: options.tick_interval(),
            last_tick: Duration::ZERO,
            due: true,
        }
    }

    pub fn options(&self) -> &RootOptions {
        &self.options
    }

    /// Registered boxes, deepest first.
    pub fn registry(&self) -> &DepthRegistry<NodeId> {
        &self.registry
    }

    pub fn is_due(&self) -> bool {
        self.due
    }

    /// Timestamp of the last automatic tick.
    pub fn last_tick(&self) -> Duration {
        self.last_tick
    }

    /// Mark the root due once a full interval has passed since the last tick.
    pub(crate) fn poll(&mut self, now: Duration) {
        if now.saturating_sub(self.last_tick) >= self.tick_interval {
            self.due = true;
        }
    }

    fn ticked(&mut self, now: Duration) {
        self.last_tick = now;
        self.due = false;
    }
}

/// Visitation order of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassTrace {
    pub fit: Vec<NodeId>,
    pub grow: Vec<NodeId>,
    pub place: Vec<NodeId>,
}

impl Scene {
    /// Make `id` a layout root.
    ///
    /// Attach roots before the boxes beneath them; a box resolves its root
    /// once, when it is attached.
    pub fn attach_root(&mut self, id: NodeId, options: RootOptions) -> Result<(), LayoutError> {
        let node = self.nodes.get_mut(&id).ok_or(id.missing())?;
        if node.root.is_some() {
            return Err(LayoutError::RoleConflict {
                node: id.0,
                existing: "root",
            });
        }
        node.root = Some(LayoutRoot::new(options));
        debug!("Attached layout root to node {} ({} ticks/s)", id.0, options.tick_rate);
        Ok(())
    }

    /// Get a node's scheduler state.
    pub fn layout_root(&self, id: NodeId) -> Option<&LayoutRoot> {
        self.nodes.get(&id).and_then(|n| n.root.as_ref())
    }

    fn registration(&mut self, id: NodeId) -> Result<(&mut LayoutRoot, usize), LayoutError> {
        let node = self.nodes.get(&id).ok_or(id.missing())?;
        let Role::Box(layout) = &node.role else {
            return Err(LayoutError::NotABox { node: id.0 });
        };
        let root = layout.root.ok_or(LayoutError::NoScheduler { node: id.0 })?;
        let depth = layout.depth;
        let scheduler = self
            .nodes
            .get_mut(&root)
            .and_then(|n| n.root.as_mut())
            .ok_or(LayoutError::NotAScheduler { node: root.0 })?;
        Ok((scheduler, depth))
    }

    /// Add a box to its root's registry.
    pub fn register_node(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let (scheduler, depth) = self.registration(id)?;
        if !scheduler.registry.insert(id, depth) {
            warn!("Node {} is already registered", id.0);
            return Err(LayoutError::AlreadyRegistered { node: id.0 });
        }
        debug!("Registered node {} at depth [{}]", id.0, depth);
        Ok(())
    }

    /// Remove a box from its root's registry.
    pub fn unregister_node(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let (scheduler, _) = self.registration(id)?;
        if scheduler.registry.remove(id) {
            debug!("Removed node {}", id.0);
            Ok(())
        } else {
            error!("Failed to remove node {} (not found)", id.0);
            Err(LayoutError::NotRegistered { node: id.0 })
        }
    }

    fn active_order(&self) -> Vec<NodeId> {
        self.roots()
            .iter()
            .flat_map(|root| self.active_subtree(*root))
            .collect()
    }

    /// Per-frame bookkeeping: poll root timers, check box structure and
    /// refresh leaf items. Only active nodes take part.
    pub fn update(&mut self, now: Duration) {
        for id in self.active_order() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            if let Some(root) = node.root.as_mut() {
                root.poll(now);
            }
            let is_box = matches!(node.role, Role::Box(_));
            let is_item = matches!(node.role, Role::Item(_));
            if is_box {
                self.check_structure(id);
            } else if is_item {
                self.refresh_item(id);
            }
        }
    }

    /// Run the passes on every active root that is due.
    pub fn late_update(&mut self, now: Duration) -> Vec<(NodeId, PassTrace)> {
        let due: Vec<NodeId> = self
            .active_order()
            .into_iter()
            .filter(|id| self.layout_root(*id).is_some_and(LayoutRoot::is_due))
            .collect();

        due.into_iter()
            .map(|root| {
                let trace = self.run_passes(root);
                if let Some(scheduler) = self.nodes.get_mut(&root).and_then(|n| n.root.as_mut()) {
                    scheduler.ticked(now);
                }
                (root, trace)
            })
            .collect()
    }

    /// One frame: [`update`](Self::update) then [`late_update`](Self::late_update).
    pub fn frame(&mut self, now: Duration) -> Vec<(NodeId, PassTrace)> {
        self.update(now);
        self.late_update(now)
    }

    /// Run the passes on `root` now, whether or not it is due.
    ///
    /// The automatic tick timer is left untouched.
    pub fn force_update(&mut self, root: NodeId) -> Result<PassTrace, LayoutError> {
        let node = self.nodes.get(&root).ok_or(root.missing())?;
        if node.root.is_none() {
            return Err(LayoutError::NotAScheduler { node: root.0 });
        }
        Ok(self.run_passes(root))
    }

    fn run_passes(&mut self, root: NodeId) -> PassTrace {
        let Some(scheduler) = self.layout_root(root) else {
            return PassTrace::default();
        };
        let fit: Vec<NodeId> = scheduler.registry.iter().map(|(id, _)| id).collect();
        let shallow_first: Vec<NodeId> = fit.iter().rev().copied().collect();

        debug!("[Root {}] Fit size pass", root.0);
        for &id in &fit {
            self.compute_fit_size(id);
        }

        debug!("[Root {}] Grow size pass", root.0);
        for &id in &shallow_first {
            self.compute_grow_size(id);
        }

        debug!("[Root {}] Layout pass", root.0);
        for &id in &shallow_first {
            self.compute_layout(id);
        }

        PassTrace {
            fit,
            grow: shallow_first.clone(),
            place: shallow_first,
        }
    }
}
