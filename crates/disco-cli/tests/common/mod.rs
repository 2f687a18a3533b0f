#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a `disco` command isolated from the user's config and environment.
///
/// `config_dir` receives the (usually absent) config file.
pub fn disco_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("disco"));
    cmd.timeout(CMD_TIMEOUT);
    for key in [
        "DISCO_CONFIG",
        "DISCO_TIMEOUT_SECS",
        "DISCO_USER_AGENT",
        "DISCO_MAX_REDIRECTS",
        "DISCO_MAX_PASSES",
        "DISCO_MAX_REFERENCES",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("NO_COLOR", "1");
    cmd.arg("--config").arg(config_dir.join("config.toml"));
    cmd
}

/// Serve `body` as XML at `route`.
pub async fn serve_xml(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/xml"),
        )
        .mount(server)
        .await;
}

/// Serve `body` as HTML at `route`.
pub async fn serve_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html"),
        )
        .mount(server)
        .await;
}

/// Paths requested so far.
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

pub fn disco(children: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<discovery xmlns="http://schemas.xmlsoap.org/disco/">{children}</discovery>"#
    )
}

pub fn discovery_ref(href: &str) -> String {
    format!(r#"<discoveryRef ref="{href}"/>"#)
}

pub fn contract_ref(href: &str, doc: &str) -> String {
    format!(
        r#"<contractRef ref="{href}" docRef="{doc}" xmlns="http://schemas.xmlsoap.org/disco/scl/"/>"#
    )
}

pub fn schema_ref(href: &str) -> String {
    format!(r#"<schemaRef ref="{href}" xmlns="http://schemas.xmlsoap.org/disco/schema/"/>"#)
}

pub fn wsdl(name: &str, schema_location: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions name="{name}" targetNamespace="http://tempuri.org/"
    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" xmlns:s="http://www.w3.org/2001/XMLSchema">
  <wsdl:types>
    <s:schema targetNamespace="http://tempuri.org/">
      <s:import namespace="urn:types" schemaLocation="{schema_location}"/>
    </s:schema>
  </wsdl:types>
</wsdl:definitions>"#
    )
}

pub fn xsd(target_namespace: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<xs:schema targetNamespace="{target_namespace}" xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="item" type="xs:string"/>
</xs:schema>"#
    )
}
