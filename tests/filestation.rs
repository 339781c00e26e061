mod utils;

use crate::utils::{body_from_file, bytes_from_file};
use qnap_file_station::client::{Qnap, QnapError};
use qnap_file_station::entities::{CopyOptions, EntryKind, FileStationStatus};
use qnap_file_station::filestation::FileStation;
use utils::form_param;
use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/cgi-bin/filemanager/utilRequest.cgi";
const SID: &str = "q3bs7x1c";

// Helper function to create an authorized File Station client with a mock server
async fn setup_station() -> (MockServer, FileStation) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/authLogin.cgi"))
        .and(form_param("user", "test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body_from_file("test-files/login_success.xml")),
        )
        .mount(&server)
        .await;

    let qnap = Qnap::builder()
        .host(server.uri())
        .username("test")
        .password("test123")
        .build()
        .unwrap();
    qnap.authorize().await.unwrap();

    (server, FileStation::new(qnap))
}

// Helper function to create a mock for any GET API call
async fn create_api_mock(
    server: &MockServer,
    func: &str,
    params: Vec<(&str, &str)>,
    response_file: &str,
) {
    let mut builder = Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("func", func))
        .and(query_param("sid", SID));
    for (key, value) in params {
        builder = builder.and(query_param(key, value));
    }
    builder
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("content-type", "application/json")
                .set_body_string(body_from_file(response_file)),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_share() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "get_tree",
        vec![("is_iso", "0"), ("node", "share_root")],
        "test-files/get_tree_success.json",
    )
    .await;

    let shares = station.list_share().await.unwrap();

    server.verify().await;
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].id, "/Public");
    assert_eq!(shares[0].cls.as_deref(), Some("w"));
    assert_eq!(shares[1].text, "Multimedia");
}

#[tokio::test]
async fn test_list() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "get_list",
        vec![("is_iso", "0"), ("limit", "10000"), ("path", "/Public")],
        "test-files/get_list_success.json",
    )
    .await;

    let list = station.list("/Public").await.unwrap();

    server.verify().await;
    assert_eq!(list.total, 2);
    assert_eq!(list.datas[0].filename, "photos");
    assert_eq!(list.datas[0].kind, EntryKind::Folder);
    assert_eq!(list.datas[1].filename, "report.pdf");
    assert_eq!(list.datas[1].size, 1_234_567);
    assert_eq!(list.datas[1].human_size(), "1.23 MB");
    assert_eq!(list.datas[1].modified_display(), "2024-03-02 08:30:00");
}

#[tokio::test]
async fn test_get_file_info() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "stat",
        vec![("path", "/Public/docs"), ("file_name", "report.pdf")],
        "test-files/stat_success.json",
    )
    .await;

    let entry = station.get_file_info("/Public/docs/report.pdf").await.unwrap();

    server.verify().await;
    assert_eq!(entry.filename, "report.pdf");
    assert_eq!(entry.owner.as_deref(), Some("test"));
    assert!(!entry.is_folder());
}

#[tokio::test]
async fn test_search() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "search",
        vec![
            ("limit", "10000"),
            ("start", "0"),
            ("source_path", "/Public"),
            ("keyword", "report"),
        ],
        "test-files/search_success.json",
    )
    .await;

    let result = station.search("/Public", "report").await.unwrap();

    server.verify().await;
    assert_eq!(result.total, 1);
    assert_eq!(result.datas[0].filename, "report.pdf");
}

#[tokio::test]
async fn test_delete() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "delete",
        vec![("path", "/Public/docs"), ("file_total", "1"), ("file_name", "report.pdf")],
        "test-files/status_success.json",
    )
    .await;

    station.delete("/Public/docs/report.pdf").await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn test_delete_missing_file() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "delete",
        vec![],
        "test-files/status_file_not_found.json",
    )
    .await;

    let err = station.delete("/Public/missing.txt").await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<QnapError>().and_then(QnapError::status),
        Some(FileStationStatus::FileNotFound)
    );
}

#[tokio::test]
async fn test_download() {
    let (server, station) = setup_station().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("func", "download"))
        .and(query_param("isfolder", "0"))
        .and(query_param("source_total", "1"))
        .and(query_param("source_path", "/Public"))
        .and(query_param("source_file", "download.txt"))
        .and(query_param("sid", SID))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("content-type", "application/octet-stream")
                .set_body_bytes(bytes_from_file("test-files/download.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let data = station.download("/Public/download.txt").await.unwrap();

    server.verify().await;
    assert_eq!(data, b"Hello from the NAS\n");
}

#[tokio::test]
async fn test_upload() {
    let (server, station) = setup_station().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(query_param("func", "upload"))
        .and(query_param("type", "standard"))
        .and(query_param("overwrite", "0"))
        .and(query_param("dest_path", "/Public/docs"))
        .and(query_param("progress", "-Public-docs-notes.txt"))
        .and(query_param("sid", SID))
        .and(header_regex("content-type", "multipart/form-data"))
        .and(body_string_contains("name=\"file\"; filename=\"notes.txt\""))
        .and(body_string_contains("application/octet-stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body_from_file("test-files/status_success.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    station
        .upload("/Public/docs/notes.txt", b"some notes", false)
        .await
        .unwrap();

    server.verify().await;
}

#[tokio::test]
async fn test_mkdir_rec_skips_existing() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "createdir",
        vec![("dest_folder", "a"), ("dest_path", "/Public")],
        "test-files/status_file_exists.json",
    )
    .await;
    create_api_mock(
        &server,
        "createdir",
        vec![("dest_folder", "b"), ("dest_path", "/Public/a")],
        "test-files/status_success.json",
    )
    .await;

    station.mkdir_rec("/Public/a/b").await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn test_copy() {
    let (server, station) = setup_station().await;

    create_api_mock(
        &server,
        "copy",
        vec![
            ("source_file", "report.pdf"),
            ("source_total", "1"),
            ("source_path", "/Public/docs"),
            ("dest_path", "/Backup"),
            ("mode", "1"),
            ("dup", "copy"),
        ],
        "test-files/status_success.json",
    )
    .await;

    station
        .copy("/Public/docs/report.pdf", "/Backup", &CopyOptions::default())
        .await
        .unwrap();

    server.verify().await;
}
