use assert_matches::assert_matches;

use studio_docs::database::StudioDatabase;
use studio_docs::error::StudioError;
use studio_docs::record::{ProjectRecord, SigRecord};

fn sig(name: &str, abbreviation: &str) -> SigRecord {
    SigRecord {
        name: name.to_string(),
        abbreviation: abbreviation.to_string(),
        sig_heads: vec!["Alice".to_string(), "Bob".to_string()],
        faculty_mentors: vec!["Dr. X".to_string()],
        sig_time: "Mon 3pm".to_string(),
        sig_oh_time: "Tue 4pm".to_string(),
    }
}

fn project(sig_name: &str, name: &str, students: &[&str]) -> ProjectRecord {
    ProjectRecord {
        sig_name: sig_name.to_string(),
        students: students.iter().map(|student| student.to_string()).collect(),
        project_name: name.to_string(),
        sprint_log: "link1".to_string(),
        practical_research_canvas: "link2".to_string(),
        research_research_canvas: "link3".to_string(),
    }
}

#[test]
fn armbot_joins_robotics() {
    let db = StudioDatabase::assemble(
        vec![sig("Robotics", "RBT")],
        vec![project("Robotics", "ArmBot", &["Carl", "Dana"])],
    )
    .unwrap();

    let robotics = db.get("Robotics").unwrap();
    assert_eq!(robotics.students, vec!["Carl", "Dana"]);
    assert_eq!(robotics.projects.len(), 1);
    assert_eq!(robotics.projects[0].project_name, "ArmBot");
    assert_eq!(robotics.projects[0].documents.sprint_log, "link1");
    assert_eq!(robotics.sig_heads, vec!["Alice", "Bob"]);
}

#[test]
fn assembly_is_deterministic() {
    let sigs = vec![sig("Robotics", "RBT"), sig("Art", "ART"), sig("Bio", "BIO")];
    let projects = vec![
        project("Bio", "Cells", &["Zed"]),
        project("Robotics", "ArmBot", &["Carl", "Dana"]),
        project("Robotics", "LegBot", &["Eve", "Carl"]),
    ];

    let first = StudioDatabase::assemble(sigs.clone(), projects.clone()).unwrap();
    let second = StudioDatabase::assemble(sigs, projects).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.sig_names(), vec!["Robotics", "Art", "Bio"]);
    assert_eq!(
        first.get("Robotics").unwrap().students,
        vec!["Carl", "Dana", "Eve", "Carl"]
    );
    assert!(first.get("Art").unwrap().projects.is_empty());
    assert_eq!(first.project_count(), 3);
}

#[test]
fn unknown_sig_fails_without_creating_entry() {
    let err = StudioDatabase::assemble(
        vec![sig("Robotics", "RBT")],
        vec![project("Robotcs", "ArmBot", &["Carl"])],
    )
    .unwrap_err();

    assert_matches!(
        err,
        StudioError::UnknownSig { ref sig, ref project } if sig == "Robotcs" && project == "ArmBot"
    );
}

#[test]
fn duplicate_sig_is_rejected() {
    let err = StudioDatabase::assemble(
        vec![sig("Robotics", "RBT"), sig("Robotics", "RB2")],
        Vec::new(),
    )
    .unwrap_err();

    assert_matches!(err, StudioError::DuplicateSig(name) if name == "Robotics");
}
