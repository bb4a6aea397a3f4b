use letloose_core::{
    Controller, ControllerConfig, ControllerDocument, ControllerStatus, FloatParam, MemoryHost,
    RangeField, SimId, SimParams,
};

const KIND: &str = "CustomHairItem";
const FRAME: f32 = 0.1;

fn hair(main_rigidity: f32, tip_rigidity: f32, style_cling: f32) -> SimParams {
    SimParams {
        main_rigidity,
        tip_rigidity,
        style_cling,
        ..SimParams::default()
    }
}

fn started(host: &MemoryHost) -> Controller<MemoryHost> {
    let mut controller =
        Controller::new(host.clone(), ControllerConfig::default()).expect("valid config");
    controller.update(0.0);
    controller.update(FRAME);
    controller
}

fn run(controller: &mut Controller<MemoryHost>, frames: usize) {
    for _ in 0..frames {
        controller.update(FRAME);
    }
}

#[test]
fn tilt_sweep_maps_window_onto_bounds() {
    let host = MemoryHost::new();
    let id = host.insert("hair", "Hair", KIND, hair(0.05, 0.004, 0.6));
    let mut controller = started(&host);
    controller
        .registry_mut()
        .edit_selected(RangeField::MinStyleCling, 0.2)
        .expect("edit");

    host.set_tilt(30.0);
    run(&mut controller, 1);
    let low = host.params(&id).expect("params");
    assert_eq!(low.main_rigidity, 0.005);
    assert_eq!(low.tip_rigidity, 0.0);
    assert_eq!(low.style_cling, 0.2);

    let mut previous = low.main_rigidity;
    for angle in [50.0, 60.0, 67.5, 80.0, 89.0] {
        host.set_tilt(angle);
        run(&mut controller, 1);
        let current = host.params(&id).expect("params").main_rigidity;
        assert!(current >= previous, "{current} < {previous} at {angle}");
        previous = current;
    }

    host.set_tilt(90.0);
    run(&mut controller, 1);
    let high = host.params(&id).expect("params");
    assert_eq!(high.main_rigidity, 0.05);
    assert_eq!(high.tip_rigidity, 0.004);
    assert_eq!(high.style_cling, 0.6);
}

#[test]
fn capped_baseline_seeds_bounds_at_ceiling() {
    let host = MemoryHost::new();
    let id = host.insert("hair", "Hair", KIND, hair(0.5, 0.002, 0.0));
    let controller = started(&host);
    let managed = controller.registry().get(&id).expect("tracked");
    assert_eq!(managed.range().get(RangeField::MaxMainRigidity), 0.1);
    assert_eq!(managed.range().get(RangeField::MinMainRigidity), 0.01);
    assert!(managed.last_advisory().contains("capped to 0.1"));
    assert_eq!(managed.baseline().expect("baseline").main_rigidity, 0.5);
}

#[test]
fn removing_one_object_restores_it_and_keeps_the_other() {
    let host = MemoryHost::new();
    let a = host.insert("a", "Hair A", KIND, hair(0.03, 0.002, 0.1));
    let b = host.insert("b", "Hair B", KIND, hair(0.04, 0.003, 0.2));
    let mut controller = started(&host);
    host.set_tilt(0.0);
    run(&mut controller, 3);
    let b_state = controller
        .registry()
        .get(&b)
        .map(|managed| (*managed.range(), managed.baseline().copied()));

    host.set_active(&a, false);
    run(&mut controller, 10);

    assert!(controller.registry().get(&a).is_none());
    assert_eq!(host.params(&a).expect("a").main_rigidity, 0.03);
    let b_after = controller
        .registry()
        .get(&b)
        .map(|managed| (*managed.range(), managed.baseline().copied()));
    assert_eq!(b_state, b_after);
    assert_eq!(controller.status(), ControllerStatus::Tracking { count: 1 });
    assert_eq!(controller.registry().selected_id(), Some(&b));
}

#[test]
fn toggling_twice_keeps_baseline_and_bounds() {
    let host = MemoryHost::new();
    let id = host.insert("hair", "Hair", KIND, hair(0.02, 0.001, 0.4));
    let mut controller = started(&host);
    let before = controller
        .registry()
        .get(&id)
        .map(|managed| (*managed.range(), managed.baseline().copied()));

    assert!(!controller.toggle_enable(&id).expect("disable"));
    assert_eq!(host.params(&id).expect("params"), hair(0.02, 0.001, 0.4));
    run(&mut controller, 5);
    assert!(controller.toggle_enable(&id).expect("enable"));

    let after = controller
        .registry()
        .get(&id)
        .map(|managed| (*managed.range(), managed.baseline().copied()));
    assert_eq!(before, after);
}

#[test]
fn search_gives_up_and_enable_restarts_it() {
    let host = MemoryHost::new();
    let mut controller =
        Controller::new(host.clone(), ControllerConfig::default()).expect("valid config");

    for _ in 0..59 {
        controller.update(1.0);
    }
    assert!(matches!(
        controller.status(),
        ControllerStatus::Searching { .. }
    ));
    controller.update(1.0);
    assert_eq!(
        controller.status(),
        ControllerStatus::Exhausted { waited: 60.0 }
    );

    let id = host.insert("late", "Late", KIND, SimParams::default());
    for _ in 0..5 {
        let report = controller.update(1.0);
        assert!(report.reconciled.is_none());
    }
    assert!(controller.registry().is_empty());

    controller.enable();
    controller.update(0.0);
    controller.update(FRAME);
    assert!(controller.registry().get(&id).is_some());
    assert_eq!(controller.status(), ControllerStatus::Tracking { count: 1 });
}

#[test]
fn disable_and_drop_restore_every_entry() {
    let host = MemoryHost::new();
    let a = host.insert("a", "A", KIND, hair(0.03, 0.002, 0.1));
    let b = host.insert("b", "B", KIND, hair(0.06, 0.005, 0.7));
    let mut controller = started(&host);
    controller.toggle_enable(&b).expect("disable b");
    host.set_tilt(-45.0);
    run(&mut controller, 3);
    assert_ne!(host.params(&a).expect("a").main_rigidity, 0.03);

    controller.disable();
    assert_eq!(host.params(&a).expect("a"), hair(0.03, 0.002, 0.1));
    assert_eq!(host.params(&b).expect("b"), hair(0.06, 0.005, 0.7));

    controller.enable();
    run(&mut controller, 2);
    assert_ne!(host.params(&a).expect("a").main_rigidity, 0.03);
    assert_eq!(host.params(&b).expect("b").main_rigidity, 0.06);

    drop(controller);
    assert_eq!(host.params(&a).expect("a"), hair(0.03, 0.002, 0.1));
}

#[test]
fn queued_document_replaces_fresh_capture() {
    let host = MemoryHost::new();
    let id = host.insert("hair", "Hair", KIND, hair(0.03, 0.002, 0.1));
    let document = {
        let mut controller = started(&host);
        controller
            .registry_mut()
            .edit_selected(RangeField::LowerAngleLimit, 0.0)
            .expect("edit");
        controller.toggle_enable(&id).expect("disable");
        controller.document()
    };
    assert_eq!(document.records.len(), 1);

    // Host values drift while the controller is not running.
    host.set_param(&id, FloatParam::MainRigidity, 0.09);

    let mut controller =
        Controller::new(host.clone(), ControllerConfig::default()).expect("valid config");
    let mut stale = document.records[0].clone();
    stale.id = SimId::new("removed");
    let mut queued = ControllerDocument::new(vec![stale]);
    queued.records.extend(document.records.iter().cloned());
    controller.load_document(queued);

    let report = controller.update(0.0);
    let applied = report.document.expect("document applied");
    assert_eq!(applied.applied, vec![id.clone()]);
    assert_eq!(applied.skipped, vec![SimId::new("removed")]);

    let managed = controller.registry().get(&id).expect("tracked");
    assert!(!managed.enabled());
    assert_eq!(managed.range().angle_window(), (0.0, 90.0));
    assert_eq!(managed.baseline().expect("baseline").main_rigidity, 0.03);
    assert_eq!(host.params(&id).expect("params").main_rigidity, 0.03);

    run(&mut controller, 3);
    assert_eq!(host.params(&id).expect("params").main_rigidity, 0.03);
}

#[test]
fn destroyed_object_is_dropped_without_failing_the_tick() {
    let host = MemoryHost::new();
    let a = host.insert("a", "A", KIND, SimParams::default());
    let b = host.insert("b", "B", KIND, SimParams::default());
    let mut controller = started(&host);

    host.destroy(&a);
    let report = controller.update(FRAME);
    let ticked = report.ticked.expect("tick ran");
    assert_eq!(ticked.dropped, vec![a.clone()]);
    assert_eq!(ticked.evaluated, 1);
    assert!(controller.registry().get(&b).is_some());
}
