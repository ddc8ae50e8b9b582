use httpmock::prelude::*;
use snpedia_etl::domain::ports::Storage;
use snpedia_etl::{
    AnnotationPipeline, CliConfig, EtlEngine, FetchSettings, LocalStorage, MediaWikiClient,
    SnpAnnotation,
};
use std::io::Read;
use std::time::Duration;
use tempfile::TempDir;

const RS737865: &str = include_str!("fixtures/rs737865.wiki");

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn export_body(title: &str, text: &str) -> serde_json::Value {
    let xml = format!(
        r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.7/"><page><title>{}</title><revision><text xml:space="preserve">{}</text></revision></page></mediawiki>"#,
        title,
        xml_escape(text)
    );
    serde_json::json!({ "query": { "export": { "*": xml } } })
}

fn cli_config(server: &MockServer, output_path: &str, accessions: &[&str]) -> CliConfig {
    CliConfig {
        accessions: accessions.iter().map(|a| a.to_string()).collect(),
        api_endpoint: server.url("/api.php"),
        output_path: output_path.to_string(),
        bundle_filename: "annotations.zip".to_string(),
        output_formats: vec!["json".to_string(), "csv".to_string(), "tsv".to_string()],
        concurrent_requests: 2,
        user_agent: "snpedia-etl-tests".to_string(),
        timeout_seconds: 5,
        retry_attempts: 0,
        retry_delay_seconds: 0,
        strict_tables: false,
        verbose: false,
        json_logs: false,
    }
}

fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

#[tokio::test]
async fn test_end_to_end_annotation_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let comt_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api.php")
            .query_param("titles", "rs737865");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(export_body("Rs737865", RS737865));
    });
    let bare_mock = server.mock(|when, then| {
        when.method(GET).path("/api.php").query_param("titles", "rs53576");
        then.status(200)
            .json_body(export_body("Rs53576", "{{Rsnum|rs53576}} Linked to [[OXTR]]."));
    });
    let missing_mock = server.mock(|when, then| {
        when.method(GET).path("/api.php").query_param("titles", "rs0");
        then.status(200).json_body(serde_json::json!({ "query": {} }));
    });

    let config = cli_config(&server, &output_path, &["rs737865", "rs0", "rs53576"]);
    let fetcher = MediaWikiClient::new(config.fetch_settings()).unwrap();
    let storage = LocalStorage::new(output_path.clone());
    let engine = EtlEngine::new(AnnotationPipeline::new(storage, config, fetcher));

    let result = engine.run().await.unwrap();
    comt_mock.assert();
    bare_mock.assert();
    missing_mock.assert();
    assert!(result.ends_with("annotations.zip"));

    let zip_data = LocalStorage::new(output_path.clone())
        .read_file("annotations.zip")
        .await
        .unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 3);

    let annotations: Vec<SnpAnnotation> =
        serde_json::from_str(&read_entry(&mut archive, "annotations.json")).unwrap();
    let accessions: Vec<&str> = annotations.iter().map(|a| a.accession.as_str()).collect();
    assert_eq!(accessions, vec!["rs737865", "rs53576"]);
    assert_eq!(annotations[0].omim, vec!["116790.0001"]);
    assert_eq!(
        annotations[1].canonical_accession.as_deref(),
        Some("rs53576")
    );
    assert_eq!(annotations[1].summary, " Linked to OXTR.");

    let citations = read_entry(&mut archive, "citations.csv");
    assert_eq!(
        citations,
        "accession,pmid\nrs737865,17290255\nrs737865,18568034\nrs737865,17290255\n"
    );

    let diversity = read_entry(&mut archive, "diversity.tsv");
    // header plus 4 populations x 3 genotypes
    assert_eq!(diversity.lines().count(), 13);
    assert!(diversity.contains("rs737865\tCEU\tgeno1\t(C;C)\t21.2"));
}

#[tokio::test]
async fn test_all_fetches_failing_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api.php");
        then.status(404);
    });

    let config = cli_config(&server, &output_path, &["rs1", "rs2"]);
    let fetcher = MediaWikiClient::new(config.fetch_settings()).unwrap();
    let storage = LocalStorage::new(output_path.clone());
    let engine = EtlEngine::new(AnnotationPipeline::new(storage, config, fetcher));

    assert!(engine.run().await.is_err());
    assert!(!std::path::Path::new(&output_path)
        .join("annotations.zip")
        .exists());
}

#[test]
fn test_fetch_settings_follow_cli_flags() {
    let server = MockServer::start();
    let config = cli_config(&server, "./out", &["rs1"]);
    let settings: FetchSettings = config.fetch_settings();
    assert_eq!(settings.timeout, Duration::from_secs(5));
    assert_eq!(settings.retry_attempts, 0);
    assert_eq!(settings.user_agent, "snpedia-etl-tests");
}
