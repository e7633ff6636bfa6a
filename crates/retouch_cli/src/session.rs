//! Drive a script through the replay engine and report on it.

use crate::script::Script;
use color_eyre::Result;
use retouch_core::Hash;
use retouch_log::CanonicalEncode;
use retouch_replay::{ReplayConfig, ReplayEngine};
use serde::Serialize;
use tracing::info;

/// Summary of a `run`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Actions executed
    pub actions: usize,
    /// Actions skipped while executing
    pub skipped: usize,
    /// Undo steps taken
    pub undone: usize,
    /// Redo steps taken
    pub redone: usize,
    /// Final cursor
    pub cursor: i64,
    /// Retained non-genesis keyframes
    pub keyframes: Vec<i64>,
    /// Approximate keyframe memory
    pub retained_bytes: usize,
    /// Document extent
    pub full_dims: String,
    /// Mask pixels with coverage
    pub covered_pixels: usize,
    /// Final document fingerprint
    pub fingerprint: String,
}

/// Summary of a `verify`
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Actions in the script
    pub actions: usize,
    /// Replay targets checked
    pub targets_checked: usize,
    /// Undo-all reached the state it had live
    pub genesis_ok: bool,
    /// Redo-all reached the tip state
    pub tip_ok: bool,
    /// Indices whose replayed state differed from the live one
    pub mismatches: Vec<i64>,
}

impl VerifyReport {
    /// True if every check matched
    #[must_use]
    pub fn passed(&self) -> bool {
        self.genesis_ok && self.tip_ok && self.mismatches.is_empty()
    }
}

/// One decoded action, for `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct InspectEntry {
    /// Position in the script
    pub index: usize,
    /// Wire tag
    pub kind: String,
    /// Referenced asset, if any
    pub asset: Option<String>,
    /// Hash of the canonical encoding, stable across runs
    pub digest: String,
}

/// Build an engine and execute every scripted action on it.
///
/// Returns the engine, the number of actions skipped live, and the
/// fingerprint after each prefix (`[0]` is genesis).
fn execute_all(script: &Script, config: ReplayConfig) -> Result<(ReplayEngine, usize, Vec<Hash>)> {
    let mut engine = ReplayEngine::new(Default::default(), script.registry(), config)?;
    let mut prefixes = Vec::with_capacity(script.actions.len() + 1);
    prefixes.push(engine.document().fingerprint()?);

    let mut skipped = 0;
    for action in &script.actions {
        if !engine.execute(action.clone()).applied.is_applied() {
            skipped += 1;
        }
        prefixes.push(engine.document().fingerprint()?);
    }
    Ok((engine, skipped, prefixes))
}

/// Execute the script, then undo and redo as asked
///
/// # Errors
///
/// Returns error if the engine cannot be built or a replay fails
pub fn run(script: &Script, config: ReplayConfig, undo: usize, redo: usize) -> Result<(RunReport, ReplayEngine)> {
    let (mut engine, skipped, _) = execute_all(script, config)?;

    let mut undone = 0;
    for _ in 0..undo {
        if engine.undo()?.is_none() {
            break;
        }
        undone += 1;
    }
    let mut redone = 0;
    for _ in 0..redo {
        if engine.redo()?.is_none() {
            break;
        }
        redone += 1;
    }

    let document = engine.document();
    let report = RunReport {
        actions: engine.log().len(),
        skipped,
        undone,
        redone,
        cursor: engine.cursor(),
        keyframes: engine.keyframes().indices(),
        retained_bytes: engine.keyframes().retained_bytes(),
        full_dims: document.state.full_dims.to_string(),
        covered_pixels: document.mask.covered_pixels(),
        fingerprint: document.fingerprint()?.to_hex(),
    };
    info!(cursor = report.cursor, fingerprint = %report.fingerprint, "run complete");
    Ok((report, engine))
}

/// Check that every history index replays to the state it had live, and
/// that undo-all / redo-all round-trips
///
/// # Errors
///
/// Returns error if the engine cannot be built or a replay fails
pub fn verify(script: &Script, config: ReplayConfig) -> Result<VerifyReport> {
    let (mut engine, _, prefixes) = execute_all(script, config)?;
    let last = engine.log().last_index();

    // Walk backwards then forwards so both directions hit the keyframe window
    let mut mismatches = Vec::new();
    let targets: Vec<i64> = (-1..=last).rev().chain(-1..=last).collect();
    for &target in &targets {
        engine.replay_to(target)?;
        let expected = prefixes[(target + 1) as usize];
        if engine.document().fingerprint()? != expected && !mismatches.contains(&target) {
            mismatches.push(target);
        }
    }

    // Undo stops early when the setup run is protected
    while engine.undo()?.is_some() {}
    let floor = (engine.cursor() + 1) as usize;
    let genesis_ok = engine.document().fingerprint()? == prefixes[floor];
    while engine.redo()?.is_some() {}
    let tip_ok = engine.document().fingerprint()? == prefixes[prefixes.len() - 1];

    Ok(VerifyReport {
        actions: script.actions.len(),
        targets_checked: targets.len(),
        genesis_ok,
        tip_ok,
        mismatches,
    })
}

/// List the decoded actions
///
/// # Errors
///
/// Returns error if an action cannot be canonically encoded
pub fn inspect(script: &Script) -> Result<Vec<InspectEntry>> {
    script
        .actions
        .iter()
        .enumerate()
        .map(|(index, action)| {
            Ok(InspectEntry {
                index,
                kind: action.kind().to_string(),
                asset: action.asset_id().map(|id| id.to_string()),
                digest: action.canonical_hash()?.to_hex(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "assets": [
            { "name": "front", "w": 64, "h": 48 },
            { "name": "back", "w": 80, "h": 40 }
        ],
        "actions": [
            { "type": "LOAD_IMAGE", "payload": { "asset_id": "front", "slot": "A" } },
            { "type": "LOAD_IMAGE", "payload": { "asset_id": "back", "slot": "B" } },
            { "type": "STROKE", "payload": {
                "points": [{ "x": 0.1, "y": 0.1 }, { "x": 0.6, "y": 0.4 }],
                "brush": { "size": 0.1, "feather": 5.0 }
            } },
            { "type": "POLYLINE", "payload": {
                "points": [{ "x": 0.2, "y": 0.5 }, { "x": 0.8, "y": 0.5 }, { "x": 0.5, "y": 0.9 }],
                "session_id": 7, "fill": true, "brush_size": 0.02, "feather": 0.0, "mode": "erase"
            } },
            { "type": "ROTATE_VIEW" },
            { "type": "LOAD_IMAGE", "payload": { "asset_id": "missing", "slot": "A" } },
            { "type": "SET_OPACITY", "payload": { "value": 0.5 } }
        ]
    }"#;

    fn config() -> ReplayConfig {
        ReplayConfig::default().with_interval(2).with_buffer(2)
    }

    #[test]
    fn test_run_reports_state() {
        let script = Script::from_json(SCRIPT).unwrap();
        let (report, engine) = run(&script, config(), 0, 0).unwrap();
        assert_eq!(report.actions, 7);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.cursor, 6);
        assert_eq!(report.full_dims, "80x48");
        assert_eq!(report.keyframes, vec![4, 6]);
        assert!(report.covered_pixels > 0);
        assert_eq!(engine.document().state.opacity, 0.5);
    }

    #[test]
    fn test_run_undo_redo_counts() {
        let script = Script::from_json(SCRIPT).unwrap();
        let (report, _) = run(&script, config(), 3, 1).unwrap();
        assert_eq!(report.undone, 3);
        assert_eq!(report.redone, 1);
        assert_eq!(report.cursor, 4);

        let (report, _) = run(&script, config(), 50, 0).unwrap();
        assert_eq!(report.undone, 7);
        assert_eq!(report.cursor, -1);
    }

    #[test]
    fn test_undo_redo_restores_fingerprint() {
        let script = Script::from_json(SCRIPT).unwrap();
        let (tip, _) = run(&script, config(), 0, 0).unwrap();
        let (back, _) = run(&script, config(), 5, 5).unwrap();
        assert_eq!(tip.fingerprint, back.fingerprint);
    }

    #[test]
    fn test_protected_setup_survives_undo() {
        let script = Script::from_json(SCRIPT).unwrap();
        let (report, engine) = run(&script, config().with_protect_setup(true), 50, 0).unwrap();
        assert_eq!(report.undone, 5);
        assert_eq!(report.cursor, 1);
        assert!(engine.document().state.layer_b.is_occupied());

        let report = verify(&script, config().with_protect_setup(true)).unwrap();
        assert!(report.passed(), "{:?}", report);
    }

    #[test]
    fn test_verify_passes() {
        let script = Script::from_json(SCRIPT).unwrap();
        for interval in 1..4 {
            let report = verify(&script, config().with_interval(interval)).unwrap();
            assert!(report.passed(), "interval {}: {:?}", interval, report);
            assert_eq!(report.targets_checked, 16);
        }
    }

    #[test]
    fn test_inspect() {
        let script = Script::from_json(SCRIPT).unwrap();
        let entries = inspect(&script).unwrap();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].digest.len(), 64);
        assert_ne!(entries[0].digest, entries[1].digest);
        assert_eq!(entries[0].digest, inspect(&script).unwrap()[0].digest);
        assert_eq!(entries[2].kind, "STROKE");
        assert_eq!(entries[4].asset, None);
        assert!(entries[0].asset.as_deref().unwrap().starts_with("asset_"));
    }
}
