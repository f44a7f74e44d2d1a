//! Stored file endpoint tests.

use super::common::Harness;
use docgen_api::{file, Endpoint};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_list_files_pages() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listFiles"))
            .and(body_string_contains("page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "fileList": [
                    { "name": "reports/march.pdf", "contentType": "application/pdf" }
                ]
            })))
            .expect(1),
    );
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listFiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "fileList": [
                    { "name": "reports/january.pdf" },
                    { "name": "reports/february.pdf" }
                ],
                "nextPageMarker": "page-2"
            })))
            .expect(1),
    );

    let env = harness.environment(3);
    let first = file::list(env.context())
        .folder("reports")
        .page_size(2)
        .execute()
        .unwrap();
    assert_eq!(first.files().len(), 2);
    let marker = first.next_page_marker().unwrap().to_string();

    let second = file::list(env.context())
        .folder("reports")
        .page_size(2)
        .page_marker(marker)
        .execute()
        .unwrap();
    assert_eq!(second.files().len(), 1);
    assert_eq!(
        second.files()[0].content_type.as_deref(),
        Some("application/pdf")
    );
    assert!(second.next_page_marker().is_none());
    harness.verify();
}

#[test]
fn test_get_file_to_path() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/getFile"))
            .and(body_string_contains("reports/march.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-march".to_vec(), "application/pdf"))
            .expect(1),
    );

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("march.pdf");
    let response = file::get(harness.environment(3).context())
        .file_name("reports/march.pdf")
        .send_to(target.clone())
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-march");
    harness.verify();
}

#[test]
fn test_delete_files_in_folder() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/deleteFiles"))
            .and(body_string_contains("name=\"folder\""))
            .and(body_string_contains("march.pdf"))
            .and(body_string_contains("april.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "shortMsg": "2 files deleted"
            })))
            .expect(1),
    );

    let response = file::delete(harness.environment(3).context())
        .folder("reports")
        .file_name("march.pdf")
        .file_name("april.pdf")
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert_eq!(response.short_msg(), Some("2 files deleted"));
    harness.verify();
}
