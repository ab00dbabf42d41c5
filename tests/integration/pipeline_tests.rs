//! End-to-end tests of the analysis pipeline on a small fixture project
//!
//! The fixture under `tests/fixtures/project` has two scenes, one prefab and
//! eight scripts:
//! - `Player` is attached in `Main.unity` and holds a `Weapon` field
//! - `Enemy` is attached in `Level.unity` with an upper-case guid
//! - `Pickup` is only attached in a prefab
//! - `Orphan` is only referenced by a field of the plain class `Helper`
//! - `Unused` is referenced nowhere
//! - `NoMeta` has no companion file

use scenesweep::error::AuditError;
use scenesweep::{
    Analysis, Config, FileFinder, ProjectAnalyzer, ReportFormat, Reporter, SceneSource,
    UsageReport,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MAIN_DUMP: &str = "Main Camera\nWorld\n--Ground\n--Player\n----Hand\nCanvas\n";
const LEVEL_DUMP: &str = "Spawner\n--Enemy\n--<prefab instance &900>\n";

const HELPER_GUID: &str = "4e5f60718293a4b5c6d7e8f90a1b2c3d";
const ORPHAN_GUID: &str = "5f60718293a4b5c6d7e8f90a1b2c3d4e";
const UNUSED_GUID: &str = "3d4e5f60718293a4b5c6d7e8f90a1b2c";
const ENEMY_GUID: &str = "2c3d4e5f60718293a4b5c6d7e8f90a1b";
const PICKUP_GUID: &str = "60718293a4b5c6d7e8f90a1b2c3d4e5f";

/// Get the path to the fixture project
fn fixture_project() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project")
}

/// Copy the fixture project so a test can add files to it
fn copy_project(to: &Path) {
    fn copy_dir(from: &Path, to: &Path) {
        fs::create_dir_all(to).unwrap();
        for entry in fs::read_dir(from).unwrap() {
            let entry = entry.unwrap();
            let target = to.join(entry.file_name());
            if entry.file_type().unwrap().is_dir() {
                copy_dir(&entry.path(), &target);
            } else {
                fs::copy(entry.path(), target).unwrap();
            }
        }
    }
    copy_dir(&fixture_project(), to);
}

/// Run discovery, analysis and the CSV report
fn run(project: &Path, output: &Path, config: &Config) -> Analysis {
    let files = FileFinder::new(config).find_files(project).unwrap().files;
    let analysis = ProjectAnalyzer::new(config)
        .analyze(project, &files, output)
        .unwrap();

    let path = Reporter::path_in(output, &config.report_file, ReportFormat::Csv);
    Reporter::new(ReportFormat::Csv, path)
        .report(&UsageReport::from_registry(&analysis.registry))
        .unwrap();

    analysis
}

fn read(path: PathBuf) -> String {
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

/// Every file in the output folder with its content, sorted by name
fn snapshot(output: &Path) -> Vec<(String, String)> {
    let mut files: Vec<_> = fs::read_dir(output)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, read(path))
        })
        .collect();
    files.sort();
    files
}

// ============================================================================
// Hierarchy dumps
// ============================================================================

#[test]
fn test_scene_dumps_match_hierarchy() {
    let out = TempDir::new().unwrap();
    let analysis = run(&fixture_project(), out.path(), &Config::default());

    assert_eq!(read(out.path().join("Main.unity.dump")), MAIN_DUMP);
    assert_eq!(read(out.path().join("Level.unity.dump")), LEVEL_DUMP);
    assert_eq!(analysis.dumps_written(), 2);
    assert_eq!(analysis.dumps_failed(), 0);
}

#[test]
fn test_prefabs_are_not_dumped() {
    let out = TempDir::new().unwrap();
    run(&fixture_project(), out.path(), &Config::default());

    assert!(!out.path().join("Pickup.prefab.dump").exists());
}

#[test]
fn test_custom_dump_marker() {
    let out = TempDir::new().unwrap();
    let config = Config {
        dump_marker: "  ".to_string(),
        ..Config::default()
    };
    run(&fixture_project(), out.path(), &config);

    assert_eq!(
        read(out.path().join("Level.unity.dump")),
        "Spawner\n  Enemy\n  <prefab instance &900>\n"
    );
}

#[test]
fn test_malformed_scene_skips_only_its_dump() {
    let project = TempDir::new().unwrap();
    copy_project(project.path());
    // Dangling child reference, plus a link to the otherwise unused script
    fs::write(
        project.path().join("Assets/Scenes/Broken.unity"),
        format!(
            "%YAML 1.1\n\
--- !u!1 &1\nGameObject:\n  m_Name: Root\n\
--- !u!4 &2\nTransform:\n  m_GameObject: {{fileID: 1}}\n  m_Children:\n  - {{fileID: 99}}\n  m_Father: {{fileID: 0}}\n\
--- !u!114 &3\nMonoBehaviour:\n  m_GameObject: {{fileID: 1}}\n  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n",
            UNUSED_GUID
        ),
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let analysis = run(project.path(), out.path(), &Config::default());

    assert!(!out.path().join("Broken.unity.dump").exists());
    assert_eq!(read(out.path().join("Main.unity.dump")), MAIN_DUMP);
    assert_eq!(analysis.dumps_failed(), 1);

    let broken = analysis
        .documents
        .iter()
        .find(|d| d.path.ends_with("Broken.unity"))
        .unwrap();
    assert!(matches!(
        broken.errors.as_slice(),
        [AuditError::DanglingReference { to: 99, .. }]
    ));

    // Links of the broken scene still count
    assert!(!analysis
        .registry
        .get_by_stable_id(UNUSED_GUID)
        .unwrap()
        .is_unused());
}

#[test]
fn test_unreachable_node_is_reported_but_dump_written() {
    let project = TempDir::new().unwrap();
    copy_project(project.path());
    // &6 names &2 as its father but &2 does not list it; &8 hangs off the
    // stripped placeholder &7, which lists no children
    fs::write(
        project.path().join("Assets/Scenes/Loose.unity"),
        "%YAML 1.1\n\
--- !u!1 &1\nGameObject:\n  m_Name: Root\n\
--- !u!4 &2\nTransform:\n  m_GameObject: {fileID: 1}\n  m_Children:\n  - {fileID: 7}\n  m_Father: {fileID: 0}\n\
--- !u!1 &5\nGameObject:\n  m_Name: Lost\n\
--- !u!4 &6\nTransform:\n  m_GameObject: {fileID: 5}\n  m_Children: []\n  m_Father: {fileID: 2}\n\
--- !u!4 &7 stripped\nTransform:\n  m_PrefabInstance: {fileID: 70}\n\
--- !u!1 &9\nGameObject:\n  m_Name: Added\n\
--- !u!4 &8\nTransform:\n  m_GameObject: {fileID: 9}\n  m_Children: []\n  m_Father: {fileID: 7}\n",
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let analysis = run(project.path(), out.path(), &Config::default());

    assert_eq!(
        read(out.path().join("Loose.unity.dump")),
        "Root\n--<prefab instance &7>\n----Added\n"
    );
    let loose = analysis
        .documents
        .iter()
        .find(|d| d.path.ends_with("Loose.unity"))
        .unwrap();
    assert!(!loose.dump_failed());
    assert!(matches!(
        loose.errors.as_slice(),
        [AuditError::DetachedNodes {
            count: 1,
            first: 6,
            ..
        }]
    ));
}

// ============================================================================
// Usage report
// ============================================================================

#[test]
fn test_report_lists_unused_scripts_sorted() {
    let out = TempDir::new().unwrap();
    run(&fixture_project(), out.path(), &Config::default());

    let expected = format!(
        "Relative Path,GUID\n\
Assets/Scripts/Helper.cs,{}\n\
Assets/Scripts/Orphan.cs,{}\n\
Assets/Scripts/Unused.cs,{}\n",
        HELPER_GUID, ORPHAN_GUID, UNUSED_GUID
    );
    assert_eq!(read(out.path().join("UnusedScripts.csv")), expected);
}

#[test]
fn test_guid_match_ignores_case() {
    let out = TempDir::new().unwrap();
    let analysis = run(&fixture_project(), out.path(), &Config::default());

    let enemy = analysis.registry.get_by_short_name("Enemy").unwrap();
    assert_eq!(enemy.stable_id, ENEMY_GUID);
    assert!(!enemy.is_unused());
}

#[test]
fn test_field_of_component_type_marks_used() {
    let out = TempDir::new().unwrap();
    let analysis = run(&fixture_project(), out.path(), &Config::default());

    // Weapon is never attached; Player holds a Weapon field
    assert!(!analysis
        .registry
        .get_by_short_name("Weapon")
        .unwrap()
        .is_unused());
    // Helper is not a component, so its Orphan field is no evidence
    assert!(analysis
        .registry
        .get_by_short_name("Orphan")
        .unwrap()
        .is_unused());
    assert!(analysis.field_links >= 1);
}

#[test]
fn test_prefab_evidence_can_be_disabled() {
    let out = TempDir::new().unwrap();
    let with_prefabs = run(&fixture_project(), out.path(), &Config::default());
    assert!(!with_prefabs
        .registry
        .get_by_stable_id(PICKUP_GUID)
        .unwrap()
        .is_unused());

    let out = TempDir::new().unwrap();
    let config = Config {
        sweep_prefabs: false,
        ..Config::default()
    };
    let without = run(&fixture_project(), out.path(), &config);
    assert!(without
        .registry
        .get_by_stable_id(PICKUP_GUID)
        .unwrap()
        .is_unused());
    assert!(read(out.path().join("UnusedScripts.csv")).contains("Assets/Scripts/Pickup.cs"));
}

#[test]
fn test_missing_companion_is_diagnosed() {
    let out = TempDir::new().unwrap();
    let analysis = run(&fixture_project(), out.path(), &Config::default());

    assert!(analysis.registry.get_by_short_name("NoMeta").is_none());
    assert!(analysis.diagnostics.iter().any(|d| matches!(
        d,
        AuditError::MissingCompanionFile { path } if path.ends_with("NoMeta.cs")
    )));
    assert_eq!(analysis.registry.len(), 7);
}

#[test]
fn test_every_record_is_used_or_reported() {
    let out = TempDir::new().unwrap();
    let analysis = run(&fixture_project(), out.path(), &Config::default());

    let report = UsageReport::from_registry(&analysis.registry);
    let used = analysis.registry.records().filter(|r| !r.is_unused()).count();
    assert_eq!(report.total, analysis.registry.len());
    assert_eq!(used + report.unused.len(), analysis.registry.len());
    for entry in &report.unused {
        let record = analysis.registry.get_by_stable_id(&entry.guid).unwrap();
        assert!(record.is_unused());
        assert_eq!(record.relative_path, entry.relative_path);
    }
}

// ============================================================================
// Scene sources
// ============================================================================

#[test]
fn test_build_settings_limits_scenes() {
    let out = TempDir::new().unwrap();
    let config = Config {
        scene_source: SceneSource::BuildSettings,
        ..Config::default()
    };
    let analysis = run(&fixture_project(), out.path(), &config);

    assert_eq!(read(out.path().join("Main.unity.dump")), MAIN_DUMP);
    assert!(!out.path().join("Level.unity.dump").exists());
    // Level is no longer a document, so nothing attaches Enemy
    assert!(analysis
        .registry
        .get_by_stable_id(ENEMY_GUID)
        .unwrap()
        .is_unused());
}

#[test]
fn test_duplicate_scene_names_dump_once() {
    let project = TempDir::new().unwrap();
    copy_project(project.path());
    let nested = project.path().join("Assets/Scenes/Other");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        nested.join("Main.unity"),
        "%YAML 1.1\n--- !u!1 &1\nGameObject:\n  m_Name: Impostor\n--- !u!4 &2\nTransform:\n  m_GameObject: {fileID: 1}\n  m_Children: []\n  m_Father: {fileID: 0}\n",
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let analysis = run(project.path(), out.path(), &Config::default());

    // Assets/Scenes/Main.unity sorts before Assets/Scenes/Other/Main.unity
    assert_eq!(read(out.path().join("Main.unity.dump")), MAIN_DUMP);
    assert!(analysis
        .diagnostics
        .iter()
        .any(|d| matches!(d, AuditError::DumpCollision { .. })));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_worker_count_does_not_change_output() {
    let sequential = TempDir::new().unwrap();
    let config = Config {
        workers: 1,
        ..Config::default()
    };
    run(&fixture_project(), sequential.path(), &config);

    let parallel = TempDir::new().unwrap();
    let config = Config {
        workers: 16,
        ..Config::default()
    };
    run(&fixture_project(), parallel.path(), &config);

    assert_eq!(snapshot(sequential.path()), snapshot(parallel.path()));
}

#[test]
fn test_rerun_is_idempotent() {
    let out = TempDir::new().unwrap();
    run(&fixture_project(), out.path(), &Config::default());
    let first = snapshot(out.path());

    run(&fixture_project(), out.path(), &Config::default());
    assert_eq!(snapshot(out.path()), first);
}
