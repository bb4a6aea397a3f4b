//! In-process host backed by shared maps, for embedding demos and tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::host::{
    BoolParam, Candidate, FloatParam, HostError, ParamAccessor, SimId, SimulationHost,
};

/// Raw parameter set of one in-memory host object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub use_painted_rigidity: bool,
    pub weight: f32,
    pub drag: f32,
    pub gravity_multiplier: f32,
    pub main_rigidity: f32,
    pub tip_rigidity: f32,
    pub style_cling: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            use_painted_rigidity: false,
            weight: 1.0,
            drag: 0.1,
            gravity_multiplier: 1.0,
            main_rigidity: 0.025,
            tip_rigidity: 0.002,
            style_cling: 0.0,
        }
    }
}

impl SimParams {
    fn float(&self, param: FloatParam) -> f32 {
        match param {
            FloatParam::Weight => self.weight,
            FloatParam::Drag => self.drag,
            FloatParam::GravityMultiplier => self.gravity_multiplier,
            FloatParam::MainRigidity => self.main_rigidity,
            FloatParam::TipRigidity => self.tip_rigidity,
            FloatParam::StyleCling => self.style_cling,
        }
    }

    fn float_mut(&mut self, param: FloatParam) -> &mut f32 {
        match param {
            FloatParam::Weight => &mut self.weight,
            FloatParam::Drag => &mut self.drag,
            FloatParam::GravityMultiplier => &mut self.gravity_multiplier,
            FloatParam::MainRigidity => &mut self.main_rigidity,
            FloatParam::TipRigidity => &mut self.tip_rigidity,
            FloatParam::StyleCling => &mut self.style_cling,
        }
    }
}

#[derive(Debug)]
struct HostObject {
    label: String,
    kind: String,
    active: bool,
    params: SimParams,
    writes: usize,
    painted_locked: bool,
}

#[derive(Debug, Default)]
struct HostState {
    objects: BTreeMap<SimId, HostObject>,
    tilt: f32,
}

/// Cloneable handle onto a shared in-memory host.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<HostState>>,
}

fn lock(state: &Mutex<HostState>) -> MutexGuard<'_, HostState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active object and return its id.
    pub fn insert(&self, id: &str, label: &str, kind: &str, params: SimParams) -> SimId {
        let id = SimId::new(id);
        lock(&self.state).objects.insert(
            id.clone(),
            HostObject {
                label: label.to_owned(),
                kind: kind.to_owned(),
                active: true,
                params,
                writes: 0,
                painted_locked: false,
            },
        );
        id
    }

    /// Accessor for `id`; reports [`HostError::Gone`] once the object is destroyed.
    #[must_use]
    pub fn accessor(&self, id: &SimId) -> Box<dyn ParamAccessor> {
        Box::new(MemoryAccessor {
            id: id.clone(),
            state: Arc::clone(&self.state),
        })
    }

    /// Remove the object entirely; outstanding accessors start failing.
    pub fn destroy(&self, id: &SimId) -> bool {
        lock(&self.state).objects.remove(id).is_some()
    }

    /// Toggle whether the object is reported as active during enumeration.
    pub fn set_active(&self, id: &SimId, active: bool) {
        if let Some(object) = lock(&self.state).objects.get_mut(id) {
            object.active = active;
        }
    }

    pub fn set_param(&self, id: &SimId, param: FloatParam, value: f32) {
        if let Some(object) = lock(&self.state).objects.get_mut(id) {
            *object.params.float_mut(param) = value;
        }
    }

    pub fn set_painted_rigidity(&self, id: &SimId, enabled: bool) {
        if let Some(object) = lock(&self.state).objects.get_mut(id) {
            object.params.use_painted_rigidity = enabled;
        }
    }

    /// Make writes to the painted-rigidity flag fail with [`HostError::Rejected`].
    pub fn lock_painted_rigidity(&self, id: &SimId, locked: bool) {
        if let Some(object) = lock(&self.state).objects.get_mut(id) {
            object.painted_locked = locked;
        }
    }

    pub fn set_tilt(&self, angle: f32) {
        lock(&self.state).tilt = angle;
    }

    #[must_use]
    pub fn params(&self, id: &SimId) -> Option<SimParams> {
        lock(&self.state).objects.get(id).map(|object| object.params)
    }

    /// Number of accessor writes the object has received.
    #[must_use]
    pub fn writes(&self, id: &SimId) -> usize {
        lock(&self.state)
            .objects
            .get(id)
            .map_or(0, |object| object.writes)
    }
}

impl SimulationHost for MemoryHost {
    fn enumerate_candidates(&mut self) -> Vec<Candidate> {
        let state = lock(&self.state);
        state
            .objects
            .iter()
            .map(|(id, object)| Candidate {
                id: id.clone(),
                label: object.label.clone(),
                kind: object.kind.clone(),
                active: object.active,
                accessor: Box::new(MemoryAccessor {
                    id: id.clone(),
                    state: Arc::clone(&self.state),
                }),
            })
            .collect()
    }

    fn sample_tilt_angle(&mut self) -> f32 {
        lock(&self.state).tilt
    }
}

struct MemoryAccessor {
    id: SimId,
    state: Arc<Mutex<HostState>>,
}

impl MemoryAccessor {
    fn with_object<T>(&self, f: impl FnOnce(&mut HostObject) -> T) -> Result<T, HostError> {
        let mut state = lock(&self.state);
        state
            .objects
            .get_mut(&self.id)
            .map(f)
            .ok_or_else(|| HostError::Gone {
                id: self.id.clone(),
            })
    }
}

impl ParamAccessor for MemoryAccessor {
    fn get_float(&self, param: FloatParam) -> Result<f32, HostError> {
        self.with_object(|object| object.params.float(param))
    }

    fn set_float(&mut self, param: FloatParam, value: f32) -> Result<(), HostError> {
        self.with_object(|object| {
            *object.params.float_mut(param) = value;
            object.writes += 1;
        })
    }

    fn get_bool(&self, param: BoolParam) -> Result<bool, HostError> {
        match param {
            BoolParam::UsePaintedRigidity => {
                self.with_object(|object| object.params.use_painted_rigidity)
            }
        }
    }

    fn set_bool(&mut self, param: BoolParam, value: bool) -> Result<(), HostError> {
        match param {
            BoolParam::UsePaintedRigidity => self.with_object(|object| {
                if object.painted_locked {
                    return Err(HostError::Rejected {
                        param: param.host_name(),
                        reason: "locked by host".to_owned(),
                    });
                }
                object.params.use_painted_rigidity = value;
                object.writes += 1;
                Ok(())
            })?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessor_reads_and_writes_shared_state() {
        let host = MemoryHost::new();
        let id = host.insert("a", "A", "CustomHairItem", SimParams::default());
        let mut accessor = host.accessor(&id);
        accessor
            .set_float(FloatParam::Drag, 0.2)
            .expect("write drag");
        assert_eq!(accessor.get_float(FloatParam::Drag), Ok(0.2));
        assert_eq!(host.params(&id).expect("params").drag, 0.2);
        assert_eq!(host.writes(&id), 1);
    }

    #[test]
    fn destroyed_object_reports_gone() {
        let mut host = MemoryHost::new();
        let id = host.insert("a", "A", "CustomHairItem", SimParams::default());
        let accessor = host.accessor(&id);
        assert!(host.destroy(&id));
        assert_eq!(
            accessor.get_float(FloatParam::Weight),
            Err(HostError::Gone { id: id.clone() })
        );
        assert!(host.enumerate_candidates().is_empty());
    }

    #[test]
    fn locked_painted_rigidity_rejects_writes() {
        let host = MemoryHost::new();
        let id = host.insert("a", "A", "CustomHairItem", SimParams::default());
        let mut accessor = host.accessor(&id);
        host.lock_painted_rigidity(&id, true);
        let err = accessor
            .set_bool(BoolParam::UsePaintedRigidity, true)
            .expect_err("locked");
        assert!(matches!(err, HostError::Rejected { .. }));
        assert!(!host.params(&id).expect("params").use_painted_rigidity);
        assert_eq!(host.writes(&id), 0);
    }

    #[test]
    fn enumeration_reports_activity_and_kind() {
        let mut host = MemoryHost::new();
        let a = host.insert("a", "A", "CustomHairItem", SimParams::default());
        host.insert("b", "B", "Cloth", SimParams::default());
        host.set_active(&a, false);
        host.set_tilt(33.0);
        let candidates = host.enumerate_candidates();
        assert_eq!(candidates.len(), 2);
        assert!(!candidates[0].active);
        assert_eq!(candidates[1].kind, "Cloth");
        assert_eq!(host.sample_tilt_angle(), 33.0);
    }
}
