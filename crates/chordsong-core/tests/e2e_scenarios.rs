// Chordsong End-to-End Test Scenarios
//
// These tests drive the capture engine the way a host would: leader press,
// key presses with explicit timestamps, then draining the deferred queue.
//
// Run with: cargo test -p chordsong-core --test e2e_scenarios

mod e2e_tests {
    use std::io::Write;
    use std::time::{Duration, Instant};

    use chordsong_core::config::Config;
    use chordsong_core::event::{ActionExecutor, DeferredAction, ExecutionError};
    use chordsong_core::mapping::{ActionPayload, ChordDefinition, RECENTS_OPERATOR};
    use chordsong_core::overlay::build_overlay;
    use chordsong_core::state::ChordHistory;
    use chordsong_core::transform::{CaptureConfig, CaptureEngine, CaptureState, Outcome, Step};
    use chordsong_core::{KeyEvent, KeyPhase, Settings};

    // =========================================================================
    // Test Helpers
    // =========================================================================

    fn def(chord: &str, operator: &str) -> ChordDefinition {
        ChordDefinition::new(chord, ActionPayload::operator(operator))
            .unwrap()
            .with_label(operator)
    }

    /// Two chords sharing the `g` prefix
    fn create_frame_engine() -> CaptureEngine {
        CaptureEngine::new(
            vec![def("g g", "view.frame_all"), def("g a", "view.frame_selected")],
            CaptureConfig::default(),
        )
    }

    /// Press a sequence of host keys at one instant, returning the last step
    fn press_all(engine: &mut CaptureEngine, keys: &[&str], now: Instant) -> Step {
        let mut last = Step::Ignored;
        for key in keys {
            last = engine.process_event(&KeyEvent::press(*key), now);
        }
        last
    }

    fn candidate_tokens(step: &Step) -> Vec<String> {
        match step {
            Step::Continue(candidates) => candidates
                .iter()
                .map(|c| c.next_token.as_str().to_string())
                .collect(),
            other => panic!("expected Continue, got {:?}", other),
        }
    }

    /// Executor recording the targets it ran
    struct RecordingExecutor {
        ran: Vec<String>,
    }

    impl ActionExecutor for RecordingExecutor {
        fn execute(&mut self, task: &DeferredAction) -> Result<(), ExecutionError> {
            match &task.action {
                ActionPayload::RunOperator { operator, .. } if operator == "broken.op" => {
                    Err(ExecutionError::OperatorNotFound(operator.clone()))
                }
                action => {
                    self.ran.push(action.target().to_string());
                    Ok(())
                }
            }
        }
    }

    // =========================================================================
    // Scenario: Shared Prefix
    // =========================================================================

    #[test]
    fn test_shared_prefix_executes() {
        let mut engine = create_frame_engine();
        let now = Instant::now();
        engine.start(now);
        assert_eq!(engine.state(), CaptureState::Capturing);

        let step = engine.process_event(&KeyEvent::press("G"), now);
        match &step {
            Step::Continue(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.iter().all(|c| c.is_final && c.count == 1));
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(candidate_tokens(&step), vec!["g", "a"]);

        match engine.process_event(&KeyEvent::press("G"), now) {
            Step::Finished(Outcome::Executed(def)) => assert_eq!(def.chord(), "g g"),
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(engine.state(), CaptureState::Idle);
    }

    #[test]
    fn test_unrelated_key_aborts() {
        let mut engine = create_frame_engine();
        let now = Instant::now();
        engine.start(now);

        match press_all(&mut engine, &["G", "Z"], now) {
            Step::Finished(Outcome::AbortedUnknown(buffer)) => {
                let typed: Vec<&str> = buffer.iter().map(|t| t.as_str()).collect();
                assert_eq!(typed, vec!["g", "z"]);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(engine.queue().is_empty());
        assert!(!engine.is_capturing());
    }

    // =========================================================================
    // Scenario: Backspace
    // =========================================================================

    #[test]
    fn test_backspace_restores_candidates() {
        let mut engine = CaptureEngine::new(
            vec![def("g x y", "test.deep"), def("g a", "test.a")],
            CaptureConfig::default(),
        );
        let now = Instant::now();
        engine.start(now);

        let after_g = press_all(&mut engine, &["G"], now);
        press_all(&mut engine, &["X"], now);
        assert_eq!(engine.buffer().len(), 2);

        let after_back = engine.process_event(&KeyEvent::press("BACK_SPACE"), now);
        assert_eq!(after_back, after_g);
        assert_eq!(engine.buffer().len(), 1);

        // Back on the emptied buffer leaves capture
        let root = engine.process_event(&KeyEvent::press("BACK_SPACE"), now);
        assert_eq!(candidate_tokens(&root), vec!["g"]);
        assert_eq!(
            engine.process_event(&KeyEvent::press("BACK_SPACE"), now),
            Step::Finished(Outcome::AbortedCancelled)
        );
        assert_eq!(engine.state(), CaptureState::Idle);
    }

    // =========================================================================
    // Scenario: Timeout
    // =========================================================================

    #[test]
    fn test_idle_timeout() {
        let mut engine = create_frame_engine();
        engine.set_timeout_ms(600);
        let start = Instant::now();
        engine.start(start);
        press_all(&mut engine, &["G"], start);

        assert_eq!(engine.tick(start + Duration::from_millis(300)), None);
        assert_eq!(
            engine.tick(start + Duration::from_millis(700)),
            Some(Outcome::AbortedTimeout)
        );
        assert!(engine.queue().is_empty());
    }

    #[test]
    fn test_input_refreshes_timeout() {
        let mut engine = CaptureEngine::new(
            vec![def("a b c", "test.abc")],
            CaptureConfig {
                timeout_ms: 600,
                context: None,
            },
        );
        let start = Instant::now();
        engine.start(start);
        engine.process_event(&KeyEvent::press("A"), start + Duration::from_millis(500));
        engine.process_event(&KeyEvent::press("B"), start + Duration::from_millis(1000));
        assert_eq!(engine.tick(start + Duration::from_millis(1500)), None);
        assert!(engine.is_capturing());
    }

    // =========================================================================
    // Scenario: Definitions
    // =========================================================================

    #[test]
    fn test_disabled_definitions_invisible() {
        let mut engine = CaptureEngine::new(
            vec![
                def("d", "test.disabled").with_enabled(false),
                def("e", "test.enabled"),
            ],
            CaptureConfig::default(),
        );
        let now = Instant::now();
        engine.start(now);

        let root = engine.current_candidates();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].next_token.as_str(), "e");

        assert!(matches!(
            press_all(&mut engine, &["D"], now),
            Step::Finished(Outcome::AbortedUnknown(_))
        ));
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let mut engine = CaptureEngine::new(
            vec![def("s", "test.first"), def("s", "test.second")],
            CaptureConfig::default(),
        );
        let now = Instant::now();
        engine.start(now);
        let root = engine.current_candidates();
        assert_eq!(root[0].count, 2);

        match press_all(&mut engine, &["S"], now) {
            Step::Finished(Outcome::Executed(def)) => assert_eq!(def.label, "test.first"),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_modifier_tokens() {
        let mut engine = CaptureEngine::new(
            vec![def("^s", "test.ctrl_s"), def("+grave", "test.tilde")],
            CaptureConfig::default(),
        );
        let now = Instant::now();

        engine.start(now);
        let step = engine.process_event(&KeyEvent::press("S").with_ctrl(), now);
        assert!(step == Step::Finished(Outcome::Executed(def("^s", "test.ctrl_s"))));

        engine.start(now);
        let step = engine.process_event(&KeyEvent::press("ACCENT_GRAVE").with_shift(), now);
        assert!(matches!(step, Step::Finished(Outcome::Executed(_))));

        // Releases never advance the buffer
        engine.start(now);
        let release = KeyEvent::press("S").with_ctrl().with_phase(KeyPhase::Release);
        assert_eq!(engine.process_event(&release, now), Step::Ignored);
    }

    #[test]
    fn test_context_filtering() {
        let defs = vec![
            def("a", "test.view"),
            def("n", "test.node").with_context("NODE_EDITOR"),
            def("x", "test.everywhere").with_context("ALL"),
        ];
        let mut engine = CaptureEngine::new(
            defs,
            CaptureConfig {
                context: Some("NODE_EDITOR".to_string()),
                ..CaptureConfig::default()
            },
        );
        let now = Instant::now();
        engine.start(now);
        let tokens: Vec<String> = engine
            .current_candidates()
            .iter()
            .map(|c| c.next_token.as_str().to_string())
            .collect();
        assert_eq!(tokens, vec!["n", "x"]);

        engine.set_context(None);
        engine.start(now);
        assert_eq!(engine.current_candidates().len(), 3);
    }

    // =========================================================================
    // Scenario: Deferred Execution
    // =========================================================================

    #[test]
    fn test_queue_runs_after_session_ends() {
        let mut engine = CaptureEngine::new(
            vec![
                def("a", "test.first"),
                def("b", "broken.op"),
                def("c", "test.third"),
            ],
            CaptureConfig::default(),
        );
        let now = Instant::now();

        for key in ["A", "B", "C"] {
            engine.start(now);
            let step = engine.process_event(&KeyEvent::press(key), now);
            assert!(matches!(step, Step::Finished(Outcome::Executed(_))));
            assert_eq!(engine.state(), CaptureState::Idle);
        }
        assert_eq!(engine.queue().len(), 3);

        let mut executor = RecordingExecutor { ran: vec![] };
        let ok = engine.queue_mut().run(&mut executor);
        assert_eq!(ok, 2);
        assert_eq!(executor.ran, vec!["test.first", "test.third"]);
        assert!(engine.queue().is_empty());
    }

    #[test]
    fn test_history_skips_recents() {
        let history = ChordHistory::shared(5);
        let mut engine = CaptureEngine::new(
            vec![
                def("s", "wm.save_mainfile"),
                def("r", RECENTS_OPERATOR),
                def("t", "wm.toggle"),
            ],
            CaptureConfig::default(),
        )
        .with_history(history.clone());
        let now = Instant::now();

        // Recents is reachable by chord but never listed at the root
        engine.start(now);
        let root: Vec<String> = engine
            .current_candidates()
            .iter()
            .map(|c| c.next_token.as_str().to_string())
            .collect();
        assert_eq!(root, vec!["s", "t"]);

        for key in ["S", "S", "R", "T", "S"] {
            engine.start(now);
            press_all(&mut engine, &[key], now);
        }

        let history = history.read();
        let labels: Vec<&str> = history.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["wm.save_mainfile", "wm.toggle", "wm.save_mainfile"]);
    }

    // =========================================================================
    // Scenario: Loading From Disk
    // =========================================================================

    #[test]
    fn test_config_and_settings_from_files() {
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        write!(
            config_file,
            r#"{{
                "version": 1,
                "timeout_ms": 1500,
                "mappings": [
                    {{ "chord": "g g", "label": "Frame All", "group": "View",
                       "operator": "view3d.view_all" }},
                    {{ "chord": "g s", "label": "Frame Selected", "group": "View",
                       "operator": "view3d.view_selected" }},
                    {{ "chord": "n a", "label": "Align", "context": "NODE_EDITOR",
                       "operator": "node.align" }}
                ]
            }}"#
        )
        .unwrap();

        let mut settings_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(settings_file, "[capture]\ncontext = \"VIEW_3D\"\ntimeout_ms = 600").unwrap();

        let mut config = Config::from_path(config_file.path()).unwrap();
        assert!(config.warnings.is_empty());
        let settings = Settings::from_file(settings_file.path()).unwrap();
        settings.apply_to(&mut config);
        assert_eq!(config.timeout_ms, 600);

        let mut engine = CaptureEngine::new(
            config.definitions.clone(),
            settings.capture_config(&config),
        );
        let start = Instant::now();
        engine.start(start);

        let root = engine.current_candidates();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].groups, vec!["View".to_string()]);

        let step = press_all(&mut engine, &["G"], start);
        let Step::Continue(candidates) = step else {
            panic!("expected candidates");
        };
        let model = build_overlay(engine.buffer(), &candidates, "space", &config.overlay);
        assert_eq!(model.header, "g");
        assert_eq!(model.columns[0].len(), 2);

        assert_eq!(
            engine.tick(start + Duration::from_millis(601)),
            Some(Outcome::AbortedTimeout)
        );
    }
}
