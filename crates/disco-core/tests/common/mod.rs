#![allow(clippy::unwrap_used, dead_code)]

use async_trait::async_trait;
use disco_core::{DiscoveryConfig, Error, FetchedDocument, Location, ResolutionContext, Result, Transport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const XML: &str = "text/xml; charset=utf-8";
pub const HTML: &str = "text/html";

struct Response {
    final_url: Option<String>,
    content_type: String,
    body: Vec<u8>,
}

/// In-memory transport that counts every fetch.
#[derive(Default)]
pub struct StaticTransport {
    responses: HashMap<String, Response>,
    calls: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, content_type: &str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Response {
                final_url: None,
                content_type: content_type.to_string(),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    /// Serve `target`'s response when `url` is requested, reporting `target` as final.
    pub fn redirect(mut self, url: &str, target: &str, content_type: &str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Response {
                final_url: Some(target.to_string()),
                content_type: content_type.to_string(),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }

    pub fn into_session(self) -> (Arc<Self>, ResolutionContext) {
        self.into_session_with(DiscoveryConfig::default())
    }

    pub fn into_session_with(self, config: DiscoveryConfig) -> (Arc<Self>, ResolutionContext) {
        let transport = Arc::new(self);
        let session = ResolutionContext::with_transport(transport.clone(), config);
        (transport, session)
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn fetch(&self, url: &Location) -> Result<FetchedDocument> {
        self.calls.lock().unwrap().push(url.to_string());
        let response = self.responses.get(url.as_str()).ok_or_else(|| Error::Transport {
            url: url.to_string(),
            status: 404,
        })?;
        let final_url = match &response.final_url {
            Some(target) => Location::parse(target)?,
            None => url.clone(),
        };
        Ok(FetchedDocument {
            final_url,
            content_type: response.content_type.clone(),
            body: response.body.clone(),
        })
    }
}

pub fn loc(url: &str) -> Location {
    Location::parse(url).unwrap()
}

/// Pointer document with the given child elements.
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

/// Contract document importing `schema_location` from an embedded schema.
pub fn wsdl(name: &str, schema_location: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions name="{name}" targetNamespace="http://tempuri.org/"
    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" xmlns:s="http://www.w3.org/2001/XMLSchema">
  <wsdl:types>
    <s:schema targetNamespace="http://tempuri.org/">
      <s:import namespace="urn:c" schemaLocation="{schema_location}"/>
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
