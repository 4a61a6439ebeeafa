//! The process graph: workplaces (nodes) and the routes between them.
//!
//! The graph is a flat, identity-keyed collection. Cycles and disconnected
//! components are allowed; no ordering or connectivity is computed. The only
//! structural rule is that at most one workplace is flagged as the start node
//! and at most one as the end node.

use crate::error::{SimError, SimResult};
use crate::id::{EquipmentId, WorkplaceId, identity_keyed};
use crate::resource::{Equipment, Worker};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Workplace
// ---------------------------------------------------------------------------

/// A workplace on the factory floor. Compared and hashed by `workplace_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workplace {
    pub workplace_id: WorkplaceId,
    pub workplace_name: String,
    pub required_speciality: String,
    pub required_qualification: u32,
    pub worker: Option<Worker>,
    pub equipment: Option<Equipment>,
    /// Production stages performed here, in order.
    pub required_stages: Vec<String>,
    pub is_start_node: bool,
    pub is_end_node: bool,
    /// Successor workplaces, in order.
    pub next_workplace_ids: Vec<WorkplaceId>,
    /// Grid position on the floor plan, if placed.
    pub x: Option<i32>,
    pub y: Option<i32>,
}

identity_keyed!(Workplace, workplace_id);

impl Workplace {
    pub fn new(workplace_id: impl Into<WorkplaceId>, workplace_name: impl Into<String>) -> Self {
        Self {
            workplace_id: workplace_id.into(),
            workplace_name: workplace_name.into(),
            required_speciality: String::new(),
            required_qualification: 0,
            worker: None,
            equipment: None,
            required_stages: Vec::new(),
            is_start_node: false,
            is_end_node: false,
            next_workplace_ids: Vec::new(),
            x: None,
            y: None,
        }
    }

    /// Place the workplace on the floor plan.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// A copy with worker and equipment assignments removed.
    pub fn unassigned(&self) -> Self {
        Self {
            worker: None,
            equipment: None,
            ..self.clone()
        }
    }

    pub fn is_staffed(&self) -> bool {
        self.worker.is_some()
    }

    pub fn is_equipped(&self) -> bool {
        self.equipment.is_some()
    }
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// A directed route between two workplaces. Compared and hashed by the
/// `(from_workplace, to_workplace)` pair only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub from_workplace: WorkplaceId,
    pub to_workplace: WorkplaceId,
    pub length: u32,
    pub delivery_period: u32,
    pub cost: i64,
}

identity_keyed!(Route, from_workplace, to_workplace);

impl Route {
    pub fn new(from: impl Into<WorkplaceId>, to: impl Into<WorkplaceId>) -> Self {
        Self {
            from_workplace: from.into(),
            to_workplace: to.into(),
            length: 0,
            delivery_period: 0,
            cost: 0,
        }
    }

    pub fn connects(&self, from: &WorkplaceId, to: &WorkplaceId) -> bool {
        &self.from_workplace == from && &self.to_workplace == to
    }
}

// ---------------------------------------------------------------------------
// ProcessGraph
// ---------------------------------------------------------------------------

/// Workplaces and routes, each unique by identity. Insertion order is kept
/// so snapshots and records are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessGraph {
    pub id: String,
    workplaces: Vec<Workplace>,
    routes: Vec<Route>,
}

impl ProcessGraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            workplaces: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Build a graph from arbitrary collections, dropping later duplicates.
    pub fn with_contents(
        id: impl Into<String>,
        workplaces: impl IntoIterator<Item = Workplace>,
        routes: impl IntoIterator<Item = Route>,
    ) -> Self {
        let mut graph = Self::new(id);
        graph.update(workplaces, routes);
        graph
    }

    // -- Queries --

    pub fn workplaces(&self) -> &[Workplace] {
        &self.workplaces
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn workplace_count(&self) -> usize {
        self.workplaces.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn workplace(&self, id: &WorkplaceId) -> Option<&Workplace> {
        self.workplaces.iter().find(|w| &w.workplace_id == id)
    }

    pub fn workplace_mut(&mut self, id: &WorkplaceId) -> Option<&mut Workplace> {
        self.workplaces.iter_mut().find(|w| &w.workplace_id == id)
    }

    pub fn contains_workplace(&self, id: &WorkplaceId) -> bool {
        self.workplace(id).is_some()
    }

    pub fn get_route(&self, from: &WorkplaceId, to: &WorkplaceId) -> Option<&Route> {
        self.routes.iter().find(|r| r.connects(from, to))
    }

    pub fn start_node(&self) -> Option<&Workplace> {
        self.workplaces.iter().find(|w| w.is_start_node)
    }

    pub fn end_node(&self) -> Option<&Workplace> {
        self.workplaces.iter().find(|w| w.is_end_node)
    }

    /// Equipment installed anywhere in the graph.
    pub fn equipment(&self) -> impl Iterator<Item = &Equipment> {
        self.workplaces.iter().filter_map(|w| w.equipment.as_ref())
    }

    /// Workers staffing any workplace in the graph.
    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workplaces.iter().filter_map(|w| w.worker.as_ref())
    }

    /// Find equipment by id across every workplace.
    pub fn equipment_mut(&mut self, id: &EquipmentId) -> Option<&mut Equipment> {
        self.workplaces
            .iter_mut()
            .filter_map(|w| w.equipment.as_mut())
            .find(|e| &e.equipment_id == id)
    }

    // -- Set mutation --

    /// Insert a workplace. Returns `false` (and keeps the existing entry) if
    /// one with the same id is already present.
    ///
    /// A workplace arriving with a start or end flag takes that flag over,
    /// exactly as the flag setters would.
    pub fn add_workplace(&mut self, mut workplace: Workplace) -> bool {
        if self.contains_workplace(&workplace.workplace_id) {
            return false;
        }
        if workplace.is_start_node {
            for w in &mut self.workplaces {
                w.is_start_node = false;
            }
        }
        if workplace.is_end_node {
            for w in &mut self.workplaces {
                w.is_end_node = false;
            }
            workplace.next_workplace_ids.clear();
        }
        self.workplaces.push(workplace);
        true
    }

    /// Remove a workplace by id. Absent ids are a silent no-op.
    pub fn remove_workplace(&mut self, id: &WorkplaceId) -> Option<Workplace> {
        let index = self.workplaces.iter().position(|w| &w.workplace_id == id)?;
        Some(self.workplaces.remove(index))
    }

    /// Insert a route. Returns `false` (and keeps the existing entry) if a
    /// route between the same pair is already present.
    pub fn add_route(&mut self, route: Route) -> bool {
        if self.routes.contains(&route) {
            return false;
        }
        self.routes.push(route);
        true
    }

    /// Remove the route between a pair. Absent routes are a silent no-op.
    pub fn remove_route(&mut self, from: &WorkplaceId, to: &WorkplaceId) -> Option<Route> {
        let index = self.routes.iter().position(|r| r.connects(from, to))?;
        Some(self.routes.remove(index))
    }

    /// Replace both collections wholesale, dropping later duplicates. Only
    /// the first start flag and the first end flag survive.
    pub fn update(
        &mut self,
        workplaces: impl IntoIterator<Item = Workplace>,
        routes: impl IntoIterator<Item = Route>,
    ) {
        let mut seen = HashSet::new();
        let (mut has_start, mut has_end) = (false, false);
        self.workplaces = workplaces
            .into_iter()
            .filter(|w| seen.insert(w.workplace_id.clone()))
            .map(|mut w| {
                if w.is_start_node {
                    w.is_start_node = !has_start;
                    has_start = true;
                }
                if w.is_end_node {
                    w.is_end_node = !has_end;
                    has_end = true;
                }
                if w.is_end_node {
                    w.next_workplace_ids.clear();
                }
                w
            })
            .collect();

        let mut seen = HashSet::new();
        self.routes = routes
            .into_iter()
            .filter(|r| seen.insert((r.from_workplace.clone(), r.to_workplace.clone())))
            .collect();
    }

    // -- Node flags --

    /// Clear the start flag everywhere, then set it on `id`. Returns whether
    /// a workplace matched; with no match every flag ends up cleared.
    pub fn set_workplace_as_start_node(&mut self, id: &WorkplaceId) -> bool {
        for w in &mut self.workplaces {
            w.is_start_node = false;
        }
        match self.workplace_mut(id) {
            Some(w) => {
                w.is_start_node = true;
                true
            }
            None => false,
        }
    }

    /// Clear the end flag everywhere, then set it on `id` and clear its
    /// successor list. Returns whether a workplace matched.
    pub fn set_workplace_as_end_node(&mut self, id: &WorkplaceId) -> bool {
        for w in &mut self.workplaces {
            w.is_end_node = false;
        }
        match self.workplace_mut(id) {
            Some(w) => {
                w.is_end_node = true;
                w.next_workplace_ids.clear();
                true
            }
            None => false,
        }
    }

    // -- Assignments (silent no-op on unknown ids) --

    pub fn set_worker_on_workplace(&mut self, id: &WorkplaceId, worker: Worker) -> bool {
        match self.workplace_mut(id) {
            Some(w) => {
                w.worker = Some(worker);
                true
            }
            None => false,
        }
    }

    pub fn unset_worker_on_workplace(&mut self, id: &WorkplaceId) -> Option<Worker> {
        self.workplace_mut(id).and_then(|w| w.worker.take())
    }

    pub fn set_equipment_on_workplace(&mut self, id: &WorkplaceId, equipment: Equipment) -> bool {
        match self.workplace_mut(id) {
            Some(w) => {
                w.equipment = Some(equipment);
                true
            }
            None => false,
        }
    }

    pub fn unset_equipment_on_workplace(&mut self, id: &WorkplaceId) -> Option<Equipment> {
        self.workplace_mut(id).and_then(|w| w.equipment.take())
    }

    // -- Restricted merge --

    /// Merge layout changes from `incoming` into this graph.
    ///
    /// Every incoming workplace must already exist here; otherwise the call
    /// fails with `InvalidArgument` naming the unknown ids and nothing
    /// changes. On success the graph id is taken from `incoming` when
    /// non-empty, coordinates are copied onto matching workplaces (including
    /// unset ones), and incoming routes are added unless a route between the
    /// same pair already exists.
    pub fn merge_layout(&mut self, incoming: &ProcessGraph) -> SimResult<()> {
        let unknown: Vec<&str> = incoming
            .workplaces
            .iter()
            .filter(|w| !self.contains_workplace(&w.workplace_id))
            .map(|w| w.workplace_id.as_str())
            .collect();
        if !unknown.is_empty() {
            return Err(SimError::InvalidArgument(format!(
                "process graph references unknown workplaces: {}",
                unknown.join(", ")
            )));
        }

        if !incoming.id.is_empty() {
            self.id = incoming.id.clone();
        }
        for source in &incoming.workplaces {
            if let Some(target) = self.workplace_mut(&source.workplace_id) {
                target.x = source.x;
                target.y = source.y;
            }
        }
        for route in &incoming.routes {
            self.add_route(route.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    fn wp(id: &str) -> Workplace {
        Workplace::new(id, format!("Workplace {id}"))
    }

    fn id(s: &str) -> WorkplaceId {
        WorkplaceId::new(s)
    }

    fn graph_with(ids: &[&str]) -> ProcessGraph {
        ProcessGraph::with_contents("g1", ids.iter().map(|i| wp(i)), Vec::new())
    }

    #[test]
    fn workplace_identity_equality() {
        let a = wp("wp1");
        let mut b = wp("wp1");
        b.workplace_name = "Renamed".into();
        b.x = Some(4);
        assert_eq!(a, b);

        let set: HashSet<Workplace> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn route_identity_equality() {
        let mut a = Route::new("wp1", "wp2");
        a.cost = 10;
        let mut b = Route::new("wp1", "wp2");
        b.length = 99;
        assert_eq!(a, b);
        assert_ne!(a, Route::new("wp2", "wp1"));
    }

    #[test]
    fn add_and_remove_workplaces() {
        let mut g = ProcessGraph::new("g");
        assert!(g.add_workplace(wp("wp1")));
        assert!(g.add_workplace(wp("wp2")));
        assert!(!g.add_workplace(wp("wp1")));
        assert_eq!(g.workplace_count(), 2);

        assert!(g.remove_workplace(&id("wp1")).is_some());
        assert!(g.remove_workplace(&id("missing")).is_none());
        assert_eq!(g.workplace_count(), 1);
    }

    #[test]
    fn duplicate_workplace_keeps_existing_entry() {
        let mut g = ProcessGraph::new("g");
        g.add_workplace(wp("wp1"));
        let mut other = wp("wp1");
        other.workplace_name = "Other".into();
        g.add_workplace(other);
        assert_eq!(g.workplace(&id("wp1")).unwrap().workplace_name, "Workplace wp1");
    }

    #[test]
    fn add_get_remove_routes() {
        let mut g = graph_with(&["wp1", "wp2"]);
        let mut r = Route::new("wp1", "wp2");
        r.cost = 50;
        assert!(g.add_route(r));
        assert!(!g.add_route(Route::new("wp1", "wp2")));
        assert_eq!(g.route_count(), 1);
        assert_eq!(g.get_route(&id("wp1"), &id("wp2")).unwrap().cost, 50);
        assert!(g.get_route(&id("wp2"), &id("wp1")).is_none());

        assert!(g.remove_route(&id("wp2"), &id("wp1")).is_none());
        assert!(g.remove_route(&id("wp1"), &id("wp2")).is_some());
        assert_eq!(g.route_count(), 0);
    }

    #[test]
    fn start_node_is_unique() {
        let mut g = graph_with(&["wp1", "wp2", "wp3"]);
        assert!(g.set_workplace_as_start_node(&id("wp1")));
        assert!(g.set_workplace_as_start_node(&id("wp2")));
        let starts: Vec<_> = g.workplaces().iter().filter(|w| w.is_start_node).collect();
        assert_eq!(starts.len(), 1);
        assert_eq!(g.start_node().unwrap().workplace_id, id("wp2"));
    }

    #[test]
    fn unmatched_start_node_clears_all_flags() {
        let mut g = graph_with(&["wp1", "wp2"]);
        g.set_workplace_as_start_node(&id("wp1"));
        assert!(!g.set_workplace_as_start_node(&id("nope")));
        assert!(g.start_node().is_none());
    }

    #[test]
    fn end_node_clears_successors() {
        let mut g = graph_with(&["wp1", "wp2", "wp3"]);
        g.workplace_mut(&id("wp3")).unwrap().next_workplace_ids = vec![id("wp1")];
        g.workplace_mut(&id("wp2")).unwrap().next_workplace_ids = vec![id("wp3")];
        g.set_workplace_as_end_node(&id("wp2"));
        assert!(g.set_workplace_as_end_node(&id("wp3")));

        let end = g.end_node().unwrap();
        assert_eq!(end.workplace_id, id("wp3"));
        assert!(end.next_workplace_ids.is_empty());
        assert!(!g.workplace(&id("wp2")).unwrap().is_end_node);
        // Only the new end node loses its successors.
        assert_eq!(g.workplace(&id("wp2")).unwrap().next_workplace_ids, vec![id("wp3")]);
    }

    #[test]
    fn worker_and_equipment_assignment() {
        let mut g = graph_with(&["wp1"]);
        assert!(g.set_worker_on_workplace(&id("wp1"), Worker::new("w1", "Anna")));
        assert!(g.set_equipment_on_workplace(&id("wp1"), Equipment::new("eq1", "Lathe")));
        assert!(!g.set_worker_on_workplace(&id("missing"), Worker::new("w2", "Boris")));
        assert_eq!(g.workers().count(), 1);
        assert_eq!(g.equipment().count(), 1);

        assert!(g.unset_worker_on_workplace(&id("wp1")).is_some());
        assert!(g.unset_equipment_on_workplace(&id("wp1")).is_some());
        assert!(g.unset_equipment_on_workplace(&id("missing")).is_none());
        assert!(!g.workplace(&id("wp1")).unwrap().is_staffed());
        assert!(!g.workplace(&id("wp1")).unwrap().is_equipped());
    }

    #[test]
    fn equipment_found_across_workplaces() {
        let mut g = graph_with(&["wp1", "wp2"]);
        g.set_equipment_on_workplace(&id("wp2"), Equipment::new("eq7", "Press"));
        let eq = g.equipment_mut(&EquipmentId::new("eq7")).unwrap();
        eq.maintenance_period_days = 12;
        assert_eq!(
            g.workplace(&id("wp2")).unwrap().equipment.as_ref().unwrap().maintenance_period_days,
            12
        );
        assert!(g.equipment_mut(&EquipmentId::new("eq8")).is_none());
    }

    #[test]
    fn update_deduplicates_by_identity() {
        let mut g = ProcessGraph::new("g");
        let mut dup = wp("wp1");
        dup.workplace_name = "Second".into();
        g.update(
            vec![wp("wp1"), wp("wp2"), dup],
            vec![Route::new("wp1", "wp2"), Route::new("wp1", "wp2")],
        );
        assert_eq!(g.workplace_count(), 2);
        assert_eq!(g.route_count(), 1);
        assert_eq!(g.workplace(&id("wp1")).unwrap().workplace_name, "Workplace wp1");
    }

    #[test]
    fn added_flagged_workplace_takes_over_flags() {
        let mut g = graph_with(&["wp1"]);
        g.set_workplace_as_start_node(&id("wp1"));
        g.set_workplace_as_end_node(&id("wp1"));

        let mut start = wp("wp2");
        start.is_start_node = true;
        assert!(g.add_workplace(start));
        let mut end = wp("wp3");
        end.is_end_node = true;
        end.next_workplace_ids = vec![id("wp1")];
        assert!(g.add_workplace(end));

        assert_eq!(g.workplaces().iter().filter(|w| w.is_start_node).count(), 1);
        assert_eq!(g.workplaces().iter().filter(|w| w.is_end_node).count(), 1);
        assert_eq!(g.start_node().unwrap().workplace_id, id("wp2"));
        assert_eq!(g.end_node().unwrap().workplace_id, id("wp3"));
        assert!(g.end_node().unwrap().next_workplace_ids.is_empty());
    }

    #[test]
    fn update_keeps_first_start_and_end_flags() {
        let flagged = |name: &str, start: bool, end: bool| {
            let mut w = wp(name);
            w.is_start_node = start;
            w.is_end_node = end;
            w
        };
        let g = ProcessGraph::with_contents(
            "g",
            vec![
                flagged("wp1", true, false),
                flagged("wp2", true, true),
                flagged("wp3", false, true),
            ],
            Vec::new(),
        );
        assert_eq!(g.workplaces().iter().filter(|w| w.is_start_node).count(), 1);
        assert_eq!(g.workplaces().iter().filter(|w| w.is_end_node).count(), 1);
        assert_eq!(g.start_node().unwrap().workplace_id, id("wp1"));
        assert_eq!(g.end_node().unwrap().workplace_id, id("wp2"));
    }

    #[test]
    fn cycles_are_permitted() {
        let mut g = graph_with(&["wp1", "wp2"]);
        assert!(g.add_route(Route::new("wp1", "wp2")));
        assert!(g.add_route(Route::new("wp2", "wp1")));
        assert!(g.add_route(Route::new("wp1", "wp1")));
        assert_eq!(g.route_count(), 3);
    }

    #[test]
    fn merge_rejects_unknown_workplaces() {
        let mut g = graph_with(&["wp1", "wp2"]);
        g.workplace_mut(&id("wp1")).unwrap().x = Some(1);
        let before = g.clone();

        let incoming = ProcessGraph::with_contents(
            "g2",
            vec![wp("wp1").at(5, 5), wp("wp2"), wp("wp3"), wp("wp4")],
            vec![Route::new("wp1", "wp2")],
        );
        let err = g.merge_layout(&incoming).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("wp3, wp4"));
        assert_eq!(g, before);
        assert_eq!(g.workplace(&id("wp1")).unwrap().x, Some(1));
    }

    #[test]
    fn merge_copies_coordinates_and_adds_new_routes() {
        let mut g = graph_with(&["wp1", "wp2"]);
        g.workplace_mut(&id("wp2")).unwrap().x = Some(9);
        g.workplace_mut(&id("wp2")).unwrap().y = Some(9);
        let mut existing = Route::new("wp1", "wp2");
        existing.cost = 10;
        g.add_route(existing);

        let mut changed = Route::new("wp1", "wp2");
        changed.cost = 999;
        let incoming = ProcessGraph::with_contents(
            "layout-2",
            vec![wp("wp1").at(3, 4), wp("wp2")],
            vec![changed, Route::new("wp2", "wp1")],
        );
        g.merge_layout(&incoming).unwrap();

        assert_eq!(g.id, "layout-2");
        let wp1 = g.workplace(&id("wp1")).unwrap();
        assert_eq!((wp1.x, wp1.y), (Some(3), Some(4)));
        let wp2 = g.workplace(&id("wp2")).unwrap();
        assert_eq!((wp2.x, wp2.y), (None, None));
        assert_eq!(g.route_count(), 2);
        assert_eq!(g.get_route(&id("wp1"), &id("wp2")).unwrap().cost, 10);
    }

    #[test]
    fn merge_with_empty_id_keeps_current_id() {
        let mut g = graph_with(&["wp1"]);
        let incoming = ProcessGraph::with_contents("", vec![wp("wp1")], Vec::new());
        g.merge_layout(&incoming).unwrap();
        assert_eq!(g.id, "g1");
    }

    #[test]
    fn unassigned_strips_worker_and_equipment() {
        let mut w = wp("wp1");
        w.worker = Some(Worker::new("w1", "Anna"));
        w.equipment = Some(Equipment::new("eq1", "Lathe"));
        w.required_stages = vec!["cutting".into()];
        let stripped = w.unassigned();
        assert!(stripped.worker.is_none());
        assert!(stripped.equipment.is_none());
        assert_eq!(stripped.required_stages, vec!["cutting".to_string()]);
    }
}
