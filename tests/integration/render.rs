//! Render endpoint tests.

use super::common::Harness;
use docgen_api::{render, Endpoint, ErrorKind};
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const PDF: &[u8] = b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

#[test]
fn test_render_missing_output_name_makes_no_call() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/render"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0),
    );

    let err = render::render(harness.environment(3).context())
        .template_name("letters/welcome.docx")
        .data(r#"{"name":"Ann"}"#)
        .execute()
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::MissingRequiredParameter(ref name) if name == "outputName"));
    harness.verify();
}

#[test]
fn test_render_sends_json_body() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/render"))
            .and(header("content-type", "application/json; charset=utf-8"))
            .and(body_string(
                r#"{"accessKey":"test-key","templateName":"letters/welcome.docx","outputName":"welcome.pdf","data":{"name":"Ann"}}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PDF.to_vec(), "application/pdf"))
            .expect(1),
    );

    let mut response = render::render(harness.environment(3).context())
        .template_name("letters/welcome.docx")
        .output_name("welcome.pdf")
        .data(r#"{"name":"Ann"}"#)
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert_eq!(response.tries(), 1);
    assert!(response.has_document());
    response.cleanup();
    harness.verify();
}

#[test]
fn test_render_sends_xml_body() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/render"))
            .and(header("content-type", "application/xml; charset=utf-8"))
            .and(body_string_contains(
                r#"<render accessKey="test-key" templateName="a&amp;b.docx" outputName="out.pdf">"#,
            ))
            .and(body_string_contains("<data>  <name>Ann</name></data></render>"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PDF.to_vec(), "application/pdf"))
            .expect(1),
    );

    let response = render::render(harness.environment(3).context())
        .template_name("a&b.docx")
        .output_name("out.pdf")
        .data("  <name>Ann</name>")
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    harness.verify();
}

#[test]
fn test_render_send_to_file_is_byte_identical() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/render"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=\"welcome.pdf\"")
                    .set_body_raw(PDF.to_vec(), "application/pdf"),
            )
            .expect(1),
    );

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("welcome.pdf");

    let response = render::render(harness.environment(3).context())
        .template_name("letters/welcome.docx")
        .output_name("welcome.pdf")
        .send_to(target.clone())
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert!(!response.has_document());
    assert!(response.is_closed());
    assert_eq!(response.document_type(), Some("application/pdf"));
    assert_eq!(response.document_name(), Some("welcome.pdf"));
    assert_eq!(std::fs::read(&target).unwrap(), PDF);
    harness.verify();
}

#[test]
fn test_render_stored_output_returns_json() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/render"))
            .and(body_string_contains(r#""storeTo":"file:reports""#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "shortMsg": "Stored",
                "longMsg": "1 document stored"
            })))
            .expect(1),
    );

    let response = render::render(harness.environment(3).context())
        .template_name("letters/welcome.docx")
        .output_name("welcome.pdf")
        .store_to("file:reports")
        .execute()
        .unwrap();

    assert!(response.has_succeeded());
    assert!(!response.has_document());
    assert_eq!(response.short_msg(), Some("Stored"));
    assert_eq!(response.json().unwrap()["longMsg"], "1 document stored");
    harness.verify();
}
