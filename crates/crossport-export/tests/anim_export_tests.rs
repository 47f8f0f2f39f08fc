//! Transpiler tests for the animation-graph exporter
//!
//! These cover the structural transformation against an in-memory host:
//! - Document shapes and field naming
//! - Order preservation for transitions and conditions
//! - Blend-tree recursion (child count and depth)
//! - Leaf-clip scheduling and dedup
//! - Per-document failure isolation

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde_json::Value;

use crossport_core::{AssetKey, Error, Result, Vec3};
use crossport_export::anim::describe::MotionDoc;
use crossport_export::{AnimGraphExporter, ExportContext, ExportHost};
use crossport_model::{
    AnimLayer, AnimState, AnimationGraph, BlendTree, BlendTreeType, ChildMotion, ClipRef,
    Condition, ConditionMode, Motion, StateMachine, Transition,
};

type DocMap = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

/// Completed documents are committed to the shared map on drop, so the
/// transpiler's per-document stream scoping is exercised too.
struct DocSink {
    name: String,
    buf: Vec<u8>,
    out: DocMap,
}

impl Write for DocSink {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.write(data)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for DocSink {
    fn drop(&mut self) {
        self.out
            .lock()
            .insert(self.name.clone(), std::mem::take(&mut self.buf));
    }
}

/// In-memory host with a visibly decorating name rule (`@` prefix) so
/// tests can tell decorated output from raw authored names.
#[derive(Default)]
struct MemoryHost {
    documents: DocMap,
    scheduled: Mutex<HashSet<AssetKey>>,
    schedule_calls: Mutex<Vec<AssetKey>>,
    /// Output names whose creation should fail with an I/O error
    fail_on: Vec<String>,
}

impl MemoryHost {
    fn document(&self, name: &str) -> Option<Value> {
        let docs = self.documents.lock();
        let data = docs.get(name)?;
        serde_json::from_slice(data).ok()
    }

    fn document_names(&self) -> Vec<String> {
        self.documents.lock().keys().cloned().collect()
    }
}

impl ExportHost for MemoryHost {
    fn decorate_name(&self, raw: &str) -> String {
        format!("@{}", raw)
    }

    fn evaluate_output_name(&self, source_path: Option<&str>, extension: &str) -> Option<String> {
        Some(crossport_export::naming::replace_extension(source_path?, extension))
    }

    fn schedule_clip_export(&self, clip: &ClipRef, _context: &ExportContext) {
        self.schedule_calls.lock().push(clip.key);
        self.scheduled.lock().insert(clip.key);
    }

    fn try_create(
        &self,
        _key: AssetKey,
        output_name: &str,
        _source_modified: SystemTime,
    ) -> Result<Option<Box<dyn Write>>> {
        if self.fail_on.iter().any(|name| name == output_name) {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        Ok(Some(Box::new(DocSink {
            name: output_name.to_string(),
            buf: Vec::new(),
            out: Arc::clone(&self.documents),
        })))
    }
}

fn clip(name: &str, key: u64) -> Motion {
    Motion::Clip(ClipRef {
        name: name.to_string(),
        key: AssetKey::new(key),
        source_path: Some(format!("Animations/{}.fbx", name)),
    })
}

fn blend_tree(name: &str, children: Vec<ChildMotion>) -> Motion {
    Motion::BlendTree(BlendTree {
        name: name.to_string(),
        blend_parameter: "Speed".to_string(),
        blend_parameter_y: None,
        blend_type: BlendTreeType::Simple1d,
        min_threshold: 0.0,
        max_threshold: 1.0,
        use_automatic_thresholds: true,
        apparent_speed: 1.0,
        average_angular_speed: 0.0,
        average_duration: 0.8,
        average_speed: Vec3::new(0.0, 0.0, 1.0),
        is_human_motion: true,
        is_looping: true,
        legacy: false,
        children,
    })
}

fn child(motion: Motion) -> ChildMotion {
    ChildMotion {
        cycle_offset: 0.0,
        motion: Some(motion),
    }
}

fn state(name: &str, motion: Option<Motion>, transitions: Vec<Transition>) -> AnimState {
    AnimState {
        name: name.to_string(),
        motion,
        transitions,
    }
}

fn transition(destination: &str, conditions: Vec<Condition>) -> Transition {
    Transition {
        destination_state: destination.to_string(),
        duration: 0.25,
        conditions,
    }
}

fn condition(mode: ConditionMode, parameter: &str) -> Condition {
    Condition {
        mode,
        parameter: parameter.to_string(),
    }
}

fn graph(layers: Vec<AnimLayer>) -> AnimationGraph {
    AnimationGraph {
        name: "Player".to_string(),
        key: AssetKey::new(0x100),
        source_path: Some("Characters/Player.controller".to_string()),
        last_modified: SystemTime::UNIX_EPOCH,
        layers,
    }
}

fn single_layer(machine: StateMachine) -> Vec<AnimLayer> {
    vec![AnimLayer {
        name: "Base".to_string(),
        state_machine: machine,
    }]
}

fn context() -> ExportContext {
    ExportContext {
        source_key: AssetKey::new(0x100),
        last_modified: SystemTime::UNIX_EPOCH,
    }
}

#[test]
fn idle_graph_produces_root_and_one_machine_document() {
    let host = MemoryHost::default();
    let g = graph(single_layer(StateMachine {
        default_state: Some("Idle".to_string()),
        any_state_transitions: Vec::new(),
        states: vec![state("Idle", Some(clip("Idle", 7)), Vec::new())],
    }));

    AnimGraphExporter::new(&host).export(&g).unwrap();

    assert_eq!(
        host.document_names(),
        vec![
            "Characters/Player.SM0.json".to_string(),
            "Characters/Player.json".to_string(),
        ]
    );

    let root = host.document("Characters/Player.json").unwrap();
    assert_eq!(root["name"], "@Player");
    assert_eq!(root["layers"].as_array().unwrap().len(), 1);
    assert_eq!(root["layers"][0]["stateMachine"], "Characters/Player.SM0.json");

    let machine = host.document("Characters/Player.SM0.json").unwrap();
    assert_eq!(machine["defaultState"], "@Idle");
    assert_eq!(machine["anyStateTransitions"].as_array().unwrap().len(), 0);
    let states = machine["states"].as_array().unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0]["name"], "@Idle");
    assert_eq!(states[0]["transitions"].as_array().unwrap().len(), 0);
}

#[test]
fn machine_without_default_state_emits_null() {
    let host = MemoryHost::default();
    let g = graph(single_layer(StateMachine::default()));

    AnimGraphExporter::new(&host).export(&g).unwrap();

    let machine = host.document("Characters/Player.SM0.json").unwrap();
    assert_eq!(machine["defaultState"], Value::Null);
    assert_eq!(machine["states"].as_array().unwrap().len(), 0);
}

#[test]
fn condition_order_matches_authored_order() {
    let host = MemoryHost::default();
    let g = graph(single_layer(StateMachine {
        default_state: None,
        any_state_transitions: Vec::new(),
        states: vec![state(
            "Walk",
            None,
            vec![transition(
                "Run",
                vec![
                    condition(ConditionMode::Greater, "Speed"),
                    condition(ConditionMode::If, "Grounded"),
                    condition(ConditionMode::NotEqual, "Stance"),
                ],
            )],
        )],
    }));

    AnimGraphExporter::new(&host).export(&g).unwrap();

    let machine = host.document("Characters/Player.SM0.json").unwrap();
    let conditions = machine["states"][0]["transitions"][0]["conditions"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(conditions.len(), 3);
    assert_eq!(conditions[0]["parameter"], "Speed");
    assert_eq!(conditions[0]["mode"], "greater");
    assert_eq!(conditions[1]["parameter"], "Grounded");
    assert_eq!(conditions[1]["mode"], "if");
    assert_eq!(conditions[2]["parameter"], "Stance");
    assert_eq!(conditions[2]["mode"], "not_equal");
}

#[test]
fn any_state_transitions_keep_authoring_order() {
    // Two entries sharing a destination: first-match-wins is left to the
    // consumer, so both must survive in original order.
    let host = MemoryHost::default();
    let g = graph(single_layer(StateMachine {
        default_state: None,
        any_state_transitions: vec![
            transition("Dead", vec![condition(ConditionMode::If, "Died")]),
            transition("Dead", vec![condition(ConditionMode::Less, "Health")]),
        ],
        states: Vec::new(),
    }));

    AnimGraphExporter::new(&host).export(&g).unwrap();

    let machine = host.document("Characters/Player.SM0.json").unwrap();
    let any_state = machine["anyStateTransitions"].as_array().unwrap().clone();
    assert_eq!(any_state.len(), 2);
    assert_eq!(any_state[0]["destinationState"], "@Dead");
    assert_eq!(any_state[0]["conditions"][0]["parameter"], "Died");
    assert_eq!(any_state[1]["destinationState"], "@Dead");
    assert_eq!(any_state[1]["conditions"][0]["parameter"], "Health");
}

#[test]
fn transition_destination_is_decorated_not_resolved() {
    // Destinations are name references; a destination that names no
    // existing state still passes through untouched.
    let host = MemoryHost::default();
    let g = graph(single_layer(StateMachine {
        default_state: None,
        any_state_transitions: Vec::new(),
        states: vec![state("Idle", None, vec![transition("DoesNotExist", Vec::new())])],
    }));

    AnimGraphExporter::new(&host).export(&g).unwrap();

    let machine = host.document("Characters/Player.SM0.json").unwrap();
    assert_eq!(
        machine["states"][0]["transitions"][0]["destinationState"],
        "@DoesNotExist"
    );
}

#[test]
fn blend_tree_preserves_child_count_and_depth() {
    let host = MemoryHost::default();
    let motion = blend_tree(
        "Locomotion",
        vec![
            child(clip("Idle", 1)),
            child(blend_tree(
                "Run",
                vec![child(clip("RunFast", 2)), child(clip("RunSlow", 3))],
            )),
            child(clip("Walk", 4)),
        ],
    );

    let exporter = AnimGraphExporter::new(&host);
    let doc = exporter.transpile_motion(Some(&motion), &context()).unwrap();

    assert_eq!(doc.depth(), motion.depth());
    match &doc {
        MotionDoc::BlendTree(tree) => {
            assert_eq!(tree.name, "@Locomotion");
            assert_eq!(tree.children.len(), 3);
            match &tree.children[1].motion {
                Some(MotionDoc::BlendTree(inner)) => assert_eq!(inner.children.len(), 2),
                other => panic!("Expected nested blend tree, got {:?}", other),
            }
            match &tree.children[0].motion {
                Some(MotionDoc::Clip { animation_clip }) => {
                    assert_eq!(animation_clip, "Animations/Idle.ani")
                }
                other => panic!("Expected clip, got {:?}", other),
            }
        }
        other => panic!("Expected blend tree, got {:?}", other),
    }
}

#[test]
fn absent_motion_stays_absent() {
    let host = MemoryHost::default();
    let exporter = AnimGraphExporter::new(&host);
    assert!(exporter.transpile_motion(None, &context()).is_none());
}

#[test]
fn clip_without_source_degrades_to_absent_motion() {
    let host = MemoryHost::default();
    let motion = Motion::Clip(ClipRef {
        name: "Broken".to_string(),
        key: AssetKey::new(9),
        source_path: None,
    });

    let exporter = AnimGraphExporter::new(&host);
    assert!(exporter.transpile_motion(Some(&motion), &context()).is_none());
    assert!(host.scheduled.lock().is_empty());
}

#[test]
fn shared_clip_is_scheduled_once_per_distinct_clip() {
    let host = MemoryHost::default();
    let g = graph(single_layer(StateMachine {
        default_state: None,
        any_state_transitions: Vec::new(),
        states: vec![
            state(
                "Move",
                Some(blend_tree(
                    "Locomotion",
                    vec![child(clip("A", 1)), child(clip("B", 2))],
                )),
                Vec::new(),
            ),
            // Clip A referenced again from a second state
            state("Solo", Some(clip("A", 1)), Vec::new()),
        ],
    }));

    AnimGraphExporter::new(&host).export(&g).unwrap();

    let scheduled = host.scheduled.lock();
    assert_eq!(scheduled.len(), 2);
    assert!(scheduled.contains(&AssetKey::new(1)));
    assert!(scheduled.contains(&AssetKey::new(2)));
    // The transpiler itself does not dedup; it schedules every touch.
    assert_eq!(host.schedule_calls.lock().len(), 3);
}

#[test]
fn layer_write_failure_does_not_block_siblings() {
    let mut host = MemoryHost::default();
    host.fail_on = vec!["Characters/Player.SM0.json".to_string()];

    let machine = StateMachine {
        default_state: Some("Idle".to_string()),
        any_state_transitions: Vec::new(),
        states: vec![state("Idle", None, Vec::new())],
    };
    let g = graph(vec![
        AnimLayer { name: "Base".to_string(), state_machine: machine.clone() },
        AnimLayer { name: "Upper".to_string(), state_machine: machine },
    ]);

    let err = AnimGraphExporter::new(&host).export(&g).unwrap_err();
    match err {
        Error::DocumentWrite { path, .. } => assert_eq!(path, "Characters/Player.SM0.json"),
        other => panic!("Expected DocumentWrite, got {:?}", other),
    }

    // Root and the second layer were still written.
    assert!(host.document("Characters/Player.json").is_some());
    assert!(host.document("Characters/Player.SM1.json").is_some());
}

#[test]
fn graph_without_source_is_not_exportable() {
    let host = MemoryHost::default();
    let mut g = graph(single_layer(StateMachine::default()));
    g.source_path = None;

    let err = AnimGraphExporter::new(&host).export(&g).unwrap_err();
    match err {
        Error::NotExportable { name } => assert_eq!(name, "Player"),
        other => panic!("Expected NotExportable, got {:?}", other),
    }
    assert!(host.document_names().is_empty());
}

#[test]
fn per_layer_documents_follow_layer_order() {
    let host = MemoryHost::default();
    let g = graph(vec![
        AnimLayer { name: "Base".to_string(), state_machine: StateMachine::default() },
        AnimLayer { name: "Upper".to_string(), state_machine: StateMachine::default() },
        AnimLayer { name: "Face".to_string(), state_machine: StateMachine::default() },
    ]);

    AnimGraphExporter::new(&host).export(&g).unwrap();

    let root = host.document("Characters/Player.json").unwrap();
    let layers = root["layers"].as_array().unwrap().clone();
    assert_eq!(layers.len(), 3);
    for (index, layer) in layers.iter().enumerate() {
        assert_eq!(
            layer["stateMachine"],
            format!("Characters/Player.SM{}.json", index)
        );
    }
}
