//! Tests for the `Augmenter` pipeline driver.

use std::fs;
use std::path::PathBuf;

use aura_core::{
    AugmenterBuilder, AuraError, NoProgress, Preset, ServiceError, ServiceErrorCode,
};
use aura_test_support::service::{ScriptedService, response};
use aura_test_support::tracing::RecordingLayer;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[fixture]
fn lines() -> Vec<String> {
    ["Customer ID", "Customer Name", "Order Date"]
        .iter()
        .map(|line| (*line).to_owned())
        .collect()
}

#[fixture]
fn workspace() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn output_path(dir: &TempDir) -> PathBuf {
    dir.path().join("descriptions.txt")
}

fn first_chunk_reply() -> Result<aura_core::GenerationResponse, ServiceError> {
    Ok(response(
        &["Customer ID", "Customer Name"],
        &["Müşteri Tekil Anahtarı", "Müşteri Adı"],
    ))
}

#[rstest]
fn end_to_end_writes_ordered_pairs(lines: Vec<String>, workspace: TempDir) {
    let output = output_path(&workspace);
    let service = ScriptedService::new(vec![
        first_chunk_reply(),
        Ok(response(&["Order Date"], &["Sipariş Tarihi"])),
    ]);
    let augmenter = AugmenterBuilder::new()
        .with_chunk_size(2)
        .build()
        .expect("configuration is valid");

    let summary = augmenter
        .run(&service, &lines, &output, &mut NoProgress)
        .expect("run must succeed");

    assert_eq!(summary.chunks, 2);
    assert_eq!(summary.lines, 3);
    assert_eq!(summary.entries, 3);
    assert_eq!(
        fs::read_to_string(&output).expect("output exists"),
        "Customer ID: Müşteri Tekil Anahtarı\nCustomer Name: Müşteri Adı\nOrder Date: Sipariş Tarihi"
    );

    let requests = service.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].user_content, "Customer ID\nCustomer Name");
    assert_eq!(requests[1].user_content, "Order Date");
    assert!(requests.iter().all(|request| request.model == "gpt-4o-mini"));
    assert!(
        requests
            .iter()
            .all(|request| request.schema == "attribute_description")
    );
}

#[rstest]
fn failure_mid_run_keeps_committed_chunks(lines: Vec<String>, workspace: TempDir) {
    let output = output_path(&workspace);
    let service = ScriptedService::new(vec![
        first_chunk_reply(),
        Err(ServiceError::upstream("connection reset")),
    ]);
    let augmenter = AugmenterBuilder::new()
        .with_chunk_size(2)
        .build()
        .expect("configuration is valid");

    let err = augmenter
        .run(&service, &lines, &output, &mut NoProgress)
        .expect_err("second chunk must fail the run");

    assert!(matches!(err, AuraError::Service { chunk: 2, .. }));
    assert_eq!(err.service_code(), Some(ServiceErrorCode::Upstream));
    assert_eq!(
        fs::read_to_string(&output).expect("partial output exists"),
        "Customer ID: Müşteri Tekil Anahtarı\nCustomer Name: Müşteri Adı"
    );
}

#[rstest]
fn schema_failure_aborts_like_upstream_failure(lines: Vec<String>, workspace: TempDir) {
    let output = output_path(&workspace);
    let service = ScriptedService::new(vec![
        first_chunk_reply(),
        Err(ServiceError::SchemaValidation {
            schema: "attribute_description".to_owned(),
            reason: "missing field `descriptions`".to_owned(),
        }),
        Ok(response(&["never"], &["sent"])),
    ]);
    let augmenter = AugmenterBuilder::new()
        .with_chunk_size(1)
        .build()
        .expect("configuration is valid");

    let err = augmenter
        .run(&service, &lines, &output, &mut NoProgress)
        .expect_err("schema violation must fail the run");

    assert_eq!(err.service_code(), Some(ServiceErrorCode::SchemaValidation));
    assert_eq!(service.requests().len(), 2);
    assert_eq!(
        fs::read_to_string(&output).expect("partial output exists"),
        "Customer ID: Müşteri Tekil Anahtarı\nCustomer Name: Müşteri Adı"
    );
}

#[rstest]
fn output_after_each_commit_holds_only_completed_chunks(lines: Vec<String>, workspace: TempDir) {
    let output = output_path(&workspace);
    let service = ScriptedService::new(vec![
        Ok(response(&["Customer ID"], &["one"])),
        Ok(response(&["Customer Name"], &["two"])),
        Ok(response(&["Order Date"], &["three"])),
    ]);
    let augmenter = AugmenterBuilder::new()
        .with_chunk_size(1)
        .build()
        .expect("configuration is valid");

    let mut snapshots = Vec::new();
    let mut progress = |completed: usize, total: usize| {
        let contents = fs::read_to_string(&output).expect("artifact written before progress");
        snapshots.push((completed, total, contents));
    };
    augmenter
        .run(&service, &lines, &output, &mut progress)
        .expect("run must succeed");

    assert_eq!(
        snapshots,
        vec![
            (1, 3, "Customer ID: one".to_owned()),
            (2, 3, "Customer ID: one\nCustomer Name: two".to_owned()),
            (
                3,
                3,
                "Customer ID: one\nCustomer Name: two\nOrder Date: three".to_owned()
            ),
        ]
    );
}

#[rstest]
fn mismatched_lengths_truncate_silently(workspace: TempDir) {
    let output = output_path(&workspace);
    let lines: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
    let service = ScriptedService::new(vec![Ok(response(&["a", "b", "c"], &["x", "y"]))]);
    let augmenter = AugmenterBuilder::new().build().expect("defaults valid");

    let summary = augmenter
        .run(&service, &lines, &output, &mut NoProgress)
        .expect("truncation is not an error");

    assert_eq!(summary.entries, 2);
    assert_eq!(fs::read_to_string(&output).expect("output"), "a: x\nb: y");
}

#[rstest]
fn empty_input_sends_nothing_and_writes_empty_artifact(workspace: TempDir) {
    let output = output_path(&workspace);
    let service = ScriptedService::default();
    let augmenter = AugmenterBuilder::new().build().expect("defaults valid");

    let summary = augmenter
        .run(&service, &[], &output, &mut NoProgress)
        .expect("empty input is valid");

    assert_eq!(summary.chunks, 0);
    assert!(service.requests().is_empty());
    assert_eq!(fs::read_to_string(&output).expect("output"), "");
}

#[rstest]
fn empty_input_clears_previous_artifact(workspace: TempDir) {
    let output = output_path(&workspace);
    fs::write(&output, "previous: result").expect("seed output");
    let service = ScriptedService::default();
    let augmenter = AugmenterBuilder::new().build().expect("defaults valid");

    augmenter
        .run(&service, &[], &output, &mut NoProgress)
        .expect("empty input is valid");

    assert_eq!(fs::read_to_string(&output).expect("output"), "");
}

#[rstest]
fn stereotype_preset_prefixes_entity(workspace: TempDir) {
    let output = output_path(&workspace);
    let lines: Vec<String> = vec!["Customer ID".into(), "Customer Middle Name".into()];
    let service = ScriptedService::new(vec![Ok(aura_core::GenerationResponse {
        attribute_names: lines.clone(),
        descriptions: vec!["core".into(), "-".into()],
        entity_name: Some("Customer".into()),
    })]);
    let augmenter = AugmenterBuilder::from_preset(&Preset::STEREOTYPES)
        .with_entity("Customer")
        .build()
        .expect("configuration is valid");

    augmenter
        .run(&service, &lines, &output, &mut NoProgress)
        .expect("run must succeed");

    let requests = service.requests();
    assert_eq!(
        requests[0].user_content,
        "Entity Name: Customer\nCustomer ID\nCustomer Middle Name"
    );
    assert_eq!(requests[0].model, "gpt-4o");
    assert_eq!(requests[0].schema, "attribute_stereotype");
    assert_eq!(
        fs::read_to_string(&output).expect("output"),
        "Customer ID: core\nCustomer Middle Name: -"
    );
}

#[rstest]
fn run_path_reads_input_file(workspace: TempDir) {
    let input = workspace.path().join("attributes.txt");
    fs::write(&input, "Customer ID\nOrder Date\n").expect("seed input");
    let output = output_path(&workspace);
    let service = ScriptedService::new(vec![Ok(response(
        &["Customer ID", "Order Date"],
        &["Müşteri Tekil Anahtarı", "Sipariş Tarihi"],
    ))]);
    let augmenter = AugmenterBuilder::new().build().expect("defaults valid");

    let summary = augmenter
        .run_path(&service, &input, &output, &mut NoProgress)
        .expect("run must succeed");

    assert_eq!(summary.lines, 2);
    assert_eq!(
        service.requests()[0].user_content,
        "Customer ID\nOrder Date"
    );
}

#[rstest]
fn run_path_reports_missing_input(workspace: TempDir) {
    let input = workspace.path().join("missing.txt");
    let output = output_path(&workspace);
    let service = ScriptedService::default();
    let augmenter = AugmenterBuilder::new().build().expect("defaults valid");

    let err = augmenter
        .run_path(&service, &input, &output, &mut NoProgress)
        .expect_err("missing input must fail");

    assert!(matches!(err, AuraError::ReadInput { .. }));
    assert!(!output.exists());
}

#[rstest]
#[case::zero_chunk(AugmenterBuilder::new().with_chunk_size(0), "chunk_size")]
#[case::blank_model(AugmenterBuilder::new().with_model("  "), "model")]
#[case::missing_entity(AugmenterBuilder::from_preset(&Preset::STEREOTYPES), "entity")]
#[case::blank_entity(
    AugmenterBuilder::from_preset(&Preset::STEREOTYPES).with_entity(""),
    "entity"
)]
fn builder_rejects_invalid_configuration(
    #[case] builder: AugmenterBuilder,
    #[case] expected: &str,
) {
    let err = builder.build().expect_err("configuration must be rejected");
    match err {
        AuraError::InvalidConfiguration { setting, .. } => assert_eq!(setting, expected),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn run_emits_tracing_fields(lines: Vec<String>, workspace: TempDir) {
    let output = output_path(&workspace);
    let service = ScriptedService::new(vec![
        first_chunk_reply(),
        Ok(response(&["Order Date"], &["Sipariş Tarihi"])),
    ]);
    let augmenter = AugmenterBuilder::new()
        .with_chunk_size(2)
        .build()
        .expect("configuration is valid");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        augmenter.run(&service, &lines, &output, &mut NoProgress)
    })
    .expect("run must succeed");

    let run = layer.span("core.run").expect("core.run span must exist");
    assert_eq!(run.fields.get("service"), Some(&"scripted".to_owned()));
    assert_eq!(run.fields.get("chunk_size"), Some(&"2".to_owned()));
    assert_eq!(run.fields.get("lines"), Some(&"3".to_owned()));

    let committed = layer.events_with_message("chunk committed");
    assert_eq!(committed.len(), 2);
    assert!(committed.iter().all(|event| event.level == Level::INFO));
    assert_eq!(committed[1].fields.get("entries"), Some(&"3".to_owned()));
}
