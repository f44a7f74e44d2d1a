//! Template endpoint tests.

use std::io::Write;
use std::sync::{Arc, Mutex};

use super::common::Harness;
use docgen_api::{template, Endpoint, ErrorKind};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_upload_template_from_file() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/uploadTemplate"))
            .and(body_string_contains("name=\"accessKey\""))
            .and(body_string_contains("filename=\"welcome.txt\""))
            .and(body_string_contains("Dear {{name}},"))
            .and(body_string_contains("application/octet-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "shortMsg": "Template uploaded",
                "templateDetails": {
                    "name": "letters/welcome.txt",
                    "sizeBytes": 13,
                    "devTemplate": true
                }
            })))
            .expect(1),
    );

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("welcome.txt");
    let mut file = std::fs::File::create(&file_path).unwrap();
    file.write_all(b"Dear {{name}},").unwrap();
    drop(file);

    let response = template::upload(harness.environment(3).context())
        .template_name("letters/welcome.txt")
        .template_file(file_path.clone())
        .dev_template(true)
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert_eq!(response.short_msg(), Some("Template uploaded"));
    let details = response.details().unwrap();
    assert_eq!(details.name, "letters/welcome.txt");
    assert_eq!(details.size_bytes, Some(13));
    assert_eq!(details.dev_template, Some(true));
    harness.verify();
}

#[test]
fn test_upload_missing_file_makes_no_call() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/uploadTemplate"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0),
    );

    let dir = tempfile::tempdir().unwrap();
    let err = template::upload(harness.environment(3).context())
        .template_name("letters/welcome.docx")
        .template_file(dir.path().join("missing.docx"))
        .execute()
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::UnreadableFile { .. }));
    assert!(err.is_request_construction());
    harness.verify();
}

#[test]
fn test_list_templates_decodes_listing() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listTemplates"))
            .and(body_string_contains("letters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "templateList": [
                    { "name": "letters/welcome.docx", "md5": "abc" },
                    { "name": "letters/reminder.docx", "templateErrors": "unclosed tag" }
                ],
                "templateListStale": true,
                "nextPageMarker": "letters/reminder.docx"
            })))
            .expect(1),
    );

    let response = template::list(harness.environment(3).context())
        .folder("letters")
        .page_size(2)
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert_eq!(response.templates().len(), 2);
    assert_eq!(response.templates()[0].md5.as_deref(), Some("abc"));
    assert_eq!(
        response.templates()[1].template_errors.as_deref(),
        Some("unclosed tag")
    );
    assert!(response.is_list_stale());
    assert_eq!(response.next_page_marker(), Some("letters/reminder.docx"));
    harness.verify();
}

#[test]
fn test_get_templates_as_zip() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/getTemplate"))
            .and(body_string_contains("a.docx"))
            .and(body_string_contains("b.docx"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=templates.zip")
                    .set_body_raw(b"PK\x03\x04zip".to_vec(), "application/zip"),
            )
            .expect(1),
    );

    let sink = SharedSink::default();
    let response = template::get(harness.environment(3).context())
        .template_name("a.docx")
        .template_name("b.docx")
        .send_to(Box::new(sink.clone()) as Box<dyn Write + Send>)
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert_eq!(response.document_name(), Some("templates.zip"));
    assert!(response.is_closed());
    assert_eq!(*sink.0.lock().unwrap(), b"PK\x03\x04zip");

    // Nothing left to drain after send_to.
    let mut response = response.into_inner();
    let mut again = Vec::new();
    assert_eq!(response.send_document_to_writer(&mut again).unwrap(), 0);
    assert!(again.is_empty());
    harness.verify();
}

#[test]
fn test_delete_template_with_empty_body() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/deleteTemplate"))
            .and(body_string_contains("old.docx"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1),
    );

    let response = template::delete(harness.environment(3).context())
        .template_name("old.docx")
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert!(response.json().is_none());
    harness.verify();
}

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
