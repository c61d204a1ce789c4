use chrono::NaiveDate;
use std::fs::{self, create_dir_all, write, File};
use std::io::Read;
use tempfile::tempdir;
use zip::ZipArchive;

use scenario_bucket::archive::{build_archive, ArchiveError};
use scenario_bucket::matcher::Matcher;
use scenario_bucket::scanner::{scan, ScanRoot, SourceLabel, Traversal};

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 31)
        .unwrap()
        .and_hms_opt(23, 59, 58)
        .unwrap()
}

#[test]
fn test_archive_holds_one_entry_per_record_at_label_paths() {
    let workshop = tempdir().unwrap();
    let scenarios = tempdir().unwrap();
    let out = tempdir().unwrap();

    create_dir_all(workshop.path().join("3001/sub")).unwrap();
    write(workshop.path().join("3001/shim_one.sce"), "one").unwrap();
    write(workshop.path().join("3001/sub/deep.sce"), "SearchTags=Shim").unwrap();
    write(scenarios.path().join("Shimmy.sce"), "three").unwrap();
    write(scenarios.path().join("skip.sce"), "nope").unwrap();

    let roots = vec![
        ScanRoot {
            path: workshop.path().to_path_buf(),
            label: SourceLabel::Workshop,
        },
        ScanRoot {
            path: scenarios.path().to_path_buf(),
            label: SourceLabel::Scenarios,
        },
    ];
    let matcher = Matcher::new("shim", "SearchTags").unwrap();
    let report = scan(&roots, "sce", Traversal::Recursive, &matcher);
    assert_eq!(report.matches(), 3);

    let result = build_archive(&report.records, out.path(), "shim_scenarios", timestamp())
        .expect("archive should build");

    assert_eq!(result.file_name, "shim_scenarios_20250131_235958.zip");
    assert_eq!(result.path, out.path().join(&result.file_name));
    assert_eq!(result.entries, 3);

    let mut zip = ZipArchive::new(File::open(&result.path).unwrap()).unwrap();
    assert_eq!(zip.len(), report.matches());

    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "scenarios/Shimmy.sce",
            "workshop/3001/shim_one.sce",
            "workshop/3001/sub/deep.sce",
        ]
    );

    let mut content = String::new();
    zip.by_name("workshop/3001/shim_one.sce")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "one");
}

#[test]
fn test_archive_aborts_when_member_disappears() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(src.path().join("shim_a.sce"), "a").unwrap();
    write(src.path().join("shim_b.sce"), "b").unwrap();

    let roots = vec![ScanRoot {
        path: src.path().to_path_buf(),
        label: SourceLabel::Scenarios,
    }];
    let matcher = Matcher::new("shim", "SearchTags").unwrap();
    let report = scan(&roots, "sce", Traversal::Recursive, &matcher);
    assert_eq!(report.matches(), 2);

    fs::remove_file(src.path().join("shim_b.sce")).unwrap();

    let err = build_archive(&report.records, out.path(), "shim_scenarios", timestamp())
        .expect_err("missing member must fail the archive");
    match &err {
        ArchiveError::MemberRead { path, .. } => {
            assert_eq!(path, &src.path().join("shim_b.sce"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("shim_b.sce"));

    let leftovers: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "partial archive should be removed");
}

#[test]
fn test_empty_record_list_produces_empty_archive() {
    let out = tempdir().unwrap();
    let result = build_archive(&[], out.path(), "empty", timestamp()).unwrap();
    assert_eq!(result.entries, 0);

    let zip = ZipArchive::new(File::open(&result.path).unwrap()).unwrap();
    assert_eq!(zip.len(), 0);
}
