//! Full runs against an in-memory resolver, writing to temporary files.

mod helpers;

use helpers::single_address_includes;
use spf_flattener::dns::StaticResolver;
use spf_flattener::{run_flatten_with, Config, SpfError};

fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        domain: "example.com".to_string(),
        spf_file: dir.path().join("example.com.zone"),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_writes_records_and_backup() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (resolver, text) = single_address_includes(StaticResolver::new(), "vendor.example", 11);
    let resolver = resolver.with_txt(
        "example.com",
        ["google-site-verification=abc123", text.as_str()],
    );
    let config = config_in(&dir);

    let outcome = run_flatten_with(config.clone(), &resolver)
        .await
        .expect("Run should succeed");
    assert_eq!(outcome.original, text);
    assert_eq!(outcome.backup_path, config.backup_path());
    assert_eq!(outcome.report.shards.len(), 1);

    let backup = std::fs::read_to_string(&outcome.backup_path).unwrap();
    assert_eq!(backup, text);

    let written = std::fs::read_to_string(&outcome.output_path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    let shard = &outcome.report.shards[0];
    assert_eq!(
        lines[0],
        format!(
            "TXT\t example.com\t v=spf1 include:{}.example.com -all",
            shard.name()
        )
    );
    assert_eq!(
        lines[1],
        format!("TXT\t {}.example.com\t {}", shard.name(), shard.txt())
    );
}

#[tokio::test]
async fn test_run_keeps_small_record() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let resolver = StaticResolver::new()
        .with_txt("example.com", ["v=spf1 ip4:1.2.3.4 mx -all"])
        .with_mx("example.com", ["mail.example.com"])
        .with_a("mail.example.com", ["192.0.2.25"]);

    let outcome = run_flatten_with(config_in(&dir), &resolver).await.unwrap();
    assert!(!outcome.report.is_split());
    assert_eq!(outcome.report.lookup_count, 1);
    // mx is expanded at parse time, so the kept record lists its address
    let written = std::fs::read_to_string(&outcome.output_path).unwrap();
    assert_eq!(
        written,
        "TXT\t example.com\t v=spf1 ip4:1.2.3.4 ip4:192.0.2.25 -all\n"
    );
    assert_eq!(
        std::fs::read_to_string(&outcome.backup_path).unwrap(),
        "v=spf1 ip4:1.2.3.4 mx -all"
    );
}

#[tokio::test]
async fn test_run_reads_record_file_instead_of_dns() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let record_file = dir.path().join("current.txt");
    std::fs::write(&record_file, "v=spf1 ip4:203.0.113.7 ~all\n").unwrap();

    let resolver = StaticResolver::new();
    let config = Config {
        record_file: Some(record_file),
        ..config_in(&dir)
    };
    let outcome = run_flatten_with(config, &resolver).await.unwrap();
    assert_eq!(outcome.original, "v=spf1 ip4:203.0.113.7 ~all");
    assert_eq!(resolver.query_count(), 0);
}

#[tokio::test]
async fn test_run_without_spf_record_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let resolver = StaticResolver::new().with_txt("example.com", ["v=DMARC1; p=none"]);
    let config = config_in(&dir);

    let err = run_flatten_with(config.clone(), &resolver)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SpfError>(),
        Some(SpfError::NoSpfRecord(domain)) if domain == "example.com"
    ));
    assert!(!config.spf_file.exists());
    assert!(!config.backup_path().exists());
}

#[tokio::test]
async fn test_run_rejects_non_spf_record_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let record_file = dir.path().join("current.txt");
    std::fs::write(&record_file, "spf1 ip4:203.0.113.7 ~all").unwrap();
    let config = Config {
        record_file: Some(record_file),
        ..config_in(&dir)
    };

    let err = run_flatten_with(config.clone(), &StaticResolver::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SpfError>(),
        Some(SpfError::NotAnSpfRecord(_))
    ));
    // backup is taken before parsing, output is not written
    assert!(config.backup_path().exists());
    assert!(!config.spf_file.exists());
}

#[tokio::test]
async fn test_run_finds_record_with_tab_separator() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let resolver =
        StaticResolver::new().with_txt("example.com", ["v=spf1\tip4:203.0.113.7 -all"]);

    let outcome = run_flatten_with(config_in(&dir), &resolver).await.unwrap();
    assert_eq!(outcome.original, "v=spf1\tip4:203.0.113.7 -all");
    assert_eq!(outcome.report.top.txt(), "v=spf1 ip4:203.0.113.7 -all");
}
